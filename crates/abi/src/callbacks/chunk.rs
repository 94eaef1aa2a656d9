// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::types::{DataChunkFFI, VectorFFI};

/// Data chunk access
#[repr(C)]
#[derive(Clone, Copy)]
pub struct DataChunkCallbacks {
	/// Number of columns in the chunk
	pub get_column_count: extern "C" fn(chunk: *mut DataChunkFFI) -> u64,

	/// Vector for column `index`
	pub get_vector: extern "C" fn(chunk: *mut DataChunkFFI, index: u64) -> *mut VectorFFI,

	/// Number of rows currently in the chunk
	pub get_size: extern "C" fn(chunk: *mut DataChunkFFI) -> u64,

	/// Set the number of rows in the chunk
	pub set_size: extern "C" fn(chunk: *mut DataChunkFFI, size: u64),
}
