// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Error types for the bridge

use crate::types::Type;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid type configuration: {0}")]
	InvalidTypeConfiguration(String),

	#[error("type mismatch: expected {expected}, got {actual}")]
	TypeMismatch {
		expected: String,
		actual: String,
	},

	#[error("error registering user defined function: {name}: {reason}")]
	Registration {
		name: String,
		reason: String,
	},

	#[error("{0}")]
	Bind(String),

	#[error("{0}")]
	Execution(String),

	#[error("host API table has not been installed")]
	ApiNotInitialized,

	#[error("host API table is already installed")]
	ApiAlreadyInitialized,

	#[error("host does not provide API version {version}")]
	ApiUnavailable {
		version: String,
	},

	#[error("connection failed: {0}")]
	Connection(String),

	#[error("invalid handle: {0:#x}")]
	InvalidHandle(usize),

	#[error("unexpected null pointer: {0}")]
	NullPointer(&'static str),

	#[error("string contains an interior NUL byte")]
	InvalidString,

	#[error("invalid configuration: {0}")]
	Config(String),
}

impl Error {
	pub(crate) fn mismatch(expected: impl ToString, actual: impl ToString) -> Self {
		Self::TypeMismatch {
			expected: expected.to_string(),
			actual: actual.to_string(),
		}
	}

	pub(crate) fn mismatch_type(expected: &Type, actual: &Type) -> Self {
		Self::mismatch(expected, actual)
	}
}

pub type Result<T> = std::result::Result<T, Error>;
