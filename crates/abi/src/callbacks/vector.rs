// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::{c_char, c_void};

use crate::types::{LogicalTypeFFI, VectorFFI};

/// Column vector access
#[repr(C)]
#[derive(Clone, Copy)]
pub struct VectorCallbacks {
	/// Logical type of the vector (new handle, caller destroys)
	pub get_column_type: extern "C" fn(vector: *mut VectorFFI) -> *mut LogicalTypeFFI,

	/// Raw data buffer of the vector
	pub get_data: extern "C" fn(vector: *mut VectorFFI) -> *mut c_void,

	/// Validity mask of the vector, null while every row is valid
	pub get_validity: extern "C" fn(vector: *mut VectorFFI) -> *mut u64,

	/// Allocate the validity mask (all rows valid) if it is not writable yet
	pub ensure_validity_writable: extern "C" fn(vector: *mut VectorFFI),

	/// Copy a NUL-terminated string into the vector at `index`
	pub assign_string_element: extern "C" fn(vector: *mut VectorFFI, index: u64, value: *const c_char),

	/// Copy `length` bytes into the vector at `index`
	pub assign_string_element_len:
		extern "C" fn(vector: *mut VectorFFI, index: u64, value: *const c_char, length: u64),

	/// Child vector of a list vector
	pub list_get_child: extern "C" fn(vector: *mut VectorFFI) -> *mut VectorFFI,

	/// Number of child rows in use by a list vector
	pub list_get_size: extern "C" fn(vector: *mut VectorFFI) -> u64,

	/// Set the number of child rows in use by a list vector
	///
	/// # Returns
	/// - `STATE_SUCCESS` or `STATE_ERROR`
	pub list_set_size: extern "C" fn(vector: *mut VectorFFI, size: u64) -> i32,

	/// Make sure the child of a list vector can hold `capacity` rows
	///
	/// May move the child's data buffer.
	///
	/// # Returns
	/// - `STATE_SUCCESS` or `STATE_ERROR`
	pub list_reserve: extern "C" fn(vector: *mut VectorFFI, capacity: u64) -> i32,

	/// Child vector of an array vector (holds `array_size` rows per parent row)
	pub array_get_child: extern "C" fn(vector: *mut VectorFFI) -> *mut VectorFFI,

	/// Child vector of a struct vector for member `index`
	pub struct_get_child: extern "C" fn(vector: *mut VectorFFI, index: u64) -> *mut VectorFFI,
}
