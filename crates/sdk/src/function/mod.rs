// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Scalar and table function registration, and the trampolines the host calls back into
//!
//! Every trampoline runs its body through [`guard`]: an `Err` or a panic never unwinds into
//! the host, it becomes the error string of the current phase instead.

use std::{
	any::Any,
	panic::{AssertUnwindSafe, catch_unwind},
};

use tracing::error;

use crate::error::Result;

mod scalar;
mod table;

pub use scalar::ScalarFunction;
pub use table::{BindParameters, Cardinality, ColumnInfo, TableFunction, TableFunctionData};

/// Run a callback body, turning errors and panics into a message for the host
pub(crate) fn guard<T>(function: &str, phase: &'static str, body: impl FnOnce() -> Result<T>) -> std::result::Result<T, String> {
	match catch_unwind(AssertUnwindSafe(body)) {
		Ok(Ok(value)) => Ok(value),
		Ok(Err(e)) => {
			let message = e.to_string();
			error!(function, phase, error = %message, "callback failed");
			Err(message)
		}
		Err(payload) => {
			let message = panic_message(payload.as_ref());
			error!(function, phase, panic = %message, "callback panicked");
			Err(message)
		}
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		message.to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"panic with a non-string payload".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;

	#[test]
	fn test_guard_passes_value() {
		assert_eq!(guard("f", "bind", || Ok(3)), Ok(3));
	}

	#[test]
	fn test_guard_error_message() {
		let result: std::result::Result<(), String> = guard("f", "bind", || Err(Error::Bind("no such file".into())));
		assert_eq!(result, Err("no such file".to_string()));
	}

	#[test]
	fn test_guard_catches_panic() {
		let result: std::result::Result<(), String> = guard("f", "execute", || panic!("row {} exploded", 7));
		assert_eq!(result, Err("row 7 exploded".to_string()));

		let result: std::result::Result<(), String> = guard("f", "execute", || panic!("static message"));
		assert_eq!(result, Err("static message".to_string()));
	}
}
