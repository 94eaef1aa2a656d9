// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_char;

use crate::types::{HugeIntFFI, LogicalTypeFFI, UHugeIntFFI, ValueFFI};

/// Read-only access to host constant values
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ValueCallbacks {
	/// Destroy a value and null out the handle
	pub destroy: extern "C" fn(value: *mut *mut ValueFFI),

	/// Check if a value is NULL
	pub is_null: extern "C" fn(value: *mut ValueFFI) -> bool,

	/// Logical type of a value
	///
	/// The returned handle is owned by the value and must not be destroyed.
	pub get_type: extern "C" fn(value: *mut ValueFFI) -> *mut LogicalTypeFFI,

	pub get_bool: extern "C" fn(value: *mut ValueFFI) -> bool,
	pub get_int8: extern "C" fn(value: *mut ValueFFI) -> i8,
	pub get_int16: extern "C" fn(value: *mut ValueFFI) -> i16,
	pub get_int32: extern "C" fn(value: *mut ValueFFI) -> i32,
	pub get_int64: extern "C" fn(value: *mut ValueFFI) -> i64,
	pub get_hugeint: extern "C" fn(value: *mut ValueFFI) -> HugeIntFFI,
	pub get_uint8: extern "C" fn(value: *mut ValueFFI) -> u8,
	pub get_uint16: extern "C" fn(value: *mut ValueFFI) -> u16,
	pub get_uint32: extern "C" fn(value: *mut ValueFFI) -> u32,
	pub get_uint64: extern "C" fn(value: *mut ValueFFI) -> u64,
	pub get_uhugeint: extern "C" fn(value: *mut ValueFFI) -> UHugeIntFFI,
	pub get_float: extern "C" fn(value: *mut ValueFFI) -> f32,
	pub get_double: extern "C" fn(value: *mut ValueFFI) -> f64,

	/// String form of a value (host allocated, release with `HelperCallbacks::free`)
	pub get_varchar: extern "C" fn(value: *mut ValueFFI) -> *mut c_char,
}
