// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Tracing subscriber setup for extensions

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{Config, LogFormat};

/// Install a global subscriber for the extension's own diagnostics
///
/// The host process may already have a subscriber; in that case this is a no-op and
/// returns `false`.
pub fn init(config: &Config) -> bool {
	let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
	let builder = fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr);
	match config.log_format {
		LogFormat::Text => builder.try_init().is_ok(),
		LogFormat::Json => builder.json().try_init().is_ok(),
	}
}
