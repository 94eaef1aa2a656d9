// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Extension configuration

use std::env;

use duckbridge_abi::constants::DEFAULT_API_VERSION;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const ENV_API_VERSION: &str = "DUCKBRIDGE_API_VERSION";
pub const ENV_LOG: &str = "DUCKBRIDGE_LOG";
pub const ENV_LOG_FORMAT: &str = "DUCKBRIDGE_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Text,
	Json,
}

/// Settings applied when an extension loads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Minimum host API version the extension requests
	pub api_version: String,
	/// `tracing_subscriber::EnvFilter` directives
	pub log_filter: String,
	pub log_format: LogFormat,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			api_version: DEFAULT_API_VERSION.to_string(),
			log_filter: "warn".to_string(),
			log_format: LogFormat::Text,
		}
	}
}

impl Config {
	/// Defaults overridden by `DUCKBRIDGE_*` environment variables
	pub fn from_env() -> Result<Self> {
		let mut config = Self::default();
		if let Ok(version) = env::var(ENV_API_VERSION) {
			config.api_version = version;
		}
		if let Ok(filter) = env::var(ENV_LOG) {
			config.log_filter = filter;
		}
		if let Ok(format) = env::var(ENV_LOG_FORMAT) {
			config.log_format = parse_format(&format)?;
		}
		Ok(config)
	}

	/// Parse a JSON document; missing fields keep their defaults
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
	}

	pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = version.into();
		self
	}

	pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
		self.log_filter = filter.into();
		self
	}

	pub fn with_log_format(mut self, format: LogFormat) -> Self {
		self.log_format = format;
		self
	}
}

fn parse_format(raw: &str) -> Result<LogFormat> {
	match raw.to_ascii_lowercase().as_str() {
		"text" => Ok(LogFormat::Text),
		"json" => Ok(LogFormat::Json),
		other => Err(Error::Config(format!("unknown log format '{other}'"))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = Config::default();
		assert_eq!(config.api_version, "duckbridge-v1.0");
		assert_eq!(config.log_filter, "warn");
		assert_eq!(config.log_format, LogFormat::Text);
	}

	#[test]
	fn test_from_json_partial() {
		let config = Config::from_json(r#"{ "log_filter": "duckbridge_sdk=trace", "log_format": "json" }"#).unwrap();
		assert_eq!(config.api_version, "duckbridge-v1.0");
		assert_eq!(config.log_filter, "duckbridge_sdk=trace");
		assert_eq!(config.log_format, LogFormat::Json);
	}

	#[test]
	fn test_from_json_invalid() {
		let err = Config::from_json(r#"{ "log_format": "yaml" }"#).unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn test_parse_format() {
		assert_eq!(parse_format("JSON").unwrap(), LogFormat::Json);
		assert!(parse_format("xml").is_err());
	}

	#[test]
	fn test_builder() {
		let config = Config::default().with_api_version("duckbridge-v1.1").with_log_filter("debug");
		assert_eq!(config.api_version, "duckbridge-v1.1");
		assert_eq!(config.log_filter, "debug");
	}
}
