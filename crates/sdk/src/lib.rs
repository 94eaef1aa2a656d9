// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! DuckBridge SDK
//!
//! Write scalar and table functions in safe Rust for an analytical engine whose extension
//! interface is a vectorized C ABI. The SDK maps semantic [`Type`](types::Type)s to host
//! logical types, reads bind arguments through [`ValueReader`](value::ValueReader), fills
//! output chunks through [`VectorWriter`](vector::VectorWriter), and keeps Rust state alive
//! behind opaque handles for as long as the host holds on to it.

// #![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod api;
pub mod config;
pub mod connection;
pub mod error;
pub mod extension;
mod ffi;
pub mod function;
pub mod handle;
pub mod logging;
pub mod logical_type;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;
pub mod value;
pub mod vector;

pub mod prelude {
	pub use crate::{
		connection::Connection,
		error::{Error, Result},
		function::{BindParameters, ColumnInfo, ScalarFunction, TableFunction, TableFunctionData},
		types::{Blob, Decimal, GetType, Type},
		value::ValueReader,
		vector::{DataChunkReader, VectorReader, VectorWriter},
	};
}

#[doc(hidden)]
pub mod __private {
	pub use duckbridge_abi::{extension::ExtensionAccessFFI, types::ExtensionInfoFFI};
	pub use paste;
}
