// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! In-process mock host for testing extensions without an engine
//!
//! The mock implements the complete host API table over plain Rust data: functions are
//! registered into a [`MockDatabase`], table functions are driven through bind, init and
//! execute by [`MockDatabase::query_table`], and scalar functions are evaluated by
//! [`MockDatabase::call_scalar`]. Counters of live logical types and values are kept per
//! thread so tests can check the bridge releases every handle it obtains.
//!
//! # Example
//!
//! ```ignore
//! use duckbridge_sdk::testing::*;
//!
//! #[test]
//! fn test_double() {
//! 	let db = MockDatabase::new();
//! 	let connection = db.connect().unwrap();
//! 	connection.register_unary_scalar_function("double", |x: i64| Ok(x * 2)).unwrap();
//!
//! 	let result = db.call_scalar("double", vec![vec![HostValue::Int64(21)]]).unwrap();
//! 	assert_eq!(result, vec![HostValue::Int64(42)]);
//! }
//! ```

use std::cell::Cell;

use duckbridge_abi::{constants::STANDARD_VECTOR_SIZE, types::ValueFFI};

use crate::api;

mod callbacks;
mod database;
mod value;
pub(crate) mod vector;

pub use database::{MockDatabase, QueryResult, ScalarSignature};
pub use value::HostValue;

thread_local! {
	static LIVE_TYPES: Cell<usize> = const { Cell::new(0) };
	static LIVE_VALUES: Cell<usize> = const { Cell::new(0) };
	static VECTOR_SIZE: Cell<u64> = const { Cell::new(STANDARD_VECTOR_SIZE) };
}

/// Install the mock API table unless a table is already installed
pub fn install() {
	api::get_or_init(|| callbacks::API);
}

/// Logical type handles created on this thread and not yet destroyed
pub fn live_logical_types() -> usize {
	LIVE_TYPES.with(Cell::get)
}

/// Value handles created on this thread and not yet destroyed
pub fn live_values() -> usize {
	LIVE_VALUES.with(Cell::get)
}

/// Create a host value handle; the caller owns it
pub fn create_value(value: HostValue) -> *mut ValueFFI {
	callbacks::new_value(value)
}

/// Override the chunk capacity for the current thread
pub fn set_vector_size(size: u64) {
	VECTOR_SIZE.with(|current| current.set(size));
}

pub fn vector_size() -> u64 {
	VECTOR_SIZE.with(Cell::get)
}
