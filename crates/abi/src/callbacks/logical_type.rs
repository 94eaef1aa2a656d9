// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_char;

use crate::types::LogicalTypeFFI;

/// Logical type construction, introspection and destruction
///
/// Every constructor returns a new handle owned by the caller, which must eventually be
/// passed to `destroy`. Composite constructors copy their children; the caller keeps
/// ownership of the child handles it passed in.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct LogicalTypeCallbacks {
	/// Create a primitive logical type from a `TypeCode`
	pub create: extern "C" fn(type_id: u32) -> *mut LogicalTypeFFI,

	/// Create a decimal type
	///
	/// # Parameters
	/// - `width`: Total number of digits (1..=38)
	/// - `scale`: Digits after the decimal point (<= width)
	pub create_decimal: extern "C" fn(width: u8, scale: u8) -> *mut LogicalTypeFFI,

	/// Create a list type with the given element type
	pub create_list: extern "C" fn(child: *mut LogicalTypeFFI) -> *mut LogicalTypeFFI,

	/// Create a fixed-size array type
	pub create_array: extern "C" fn(child: *mut LogicalTypeFFI, size: u64) -> *mut LogicalTypeFFI,

	/// Create a map type
	pub create_map: extern "C" fn(key: *mut LogicalTypeFFI, value: *mut LogicalTypeFFI) -> *mut LogicalTypeFFI,

	/// Create a struct type
	///
	/// # Parameters
	/// - `member_types`: Array of `member_count` child types
	/// - `member_names`: Array of `member_count` NUL-terminated UTF-8 names
	/// - `member_count`: Number of members
	pub create_struct: extern "C" fn(
		member_types: *const *mut LogicalTypeFFI,
		member_names: *const *const c_char,
		member_count: u64,
	) -> *mut LogicalTypeFFI,

	/// Create an enum type from a dictionary of NUL-terminated UTF-8 names
	pub create_enum: extern "C" fn(member_names: *const *const c_char, member_count: u64) -> *mut LogicalTypeFFI,

	/// Get the `TypeCode` of a logical type
	pub get_type_id: extern "C" fn(ty: *mut LogicalTypeFFI) -> u32,

	/// Width of a decimal type
	pub decimal_width: extern "C" fn(ty: *mut LogicalTypeFFI) -> u8,

	/// Scale of a decimal type
	pub decimal_scale: extern "C" fn(ty: *mut LogicalTypeFFI) -> u8,

	/// `TypeCode` of the physical storage of a decimal type
	pub decimal_internal_type: extern "C" fn(ty: *mut LogicalTypeFFI) -> u32,

	/// Element type of a list type (new handle, caller destroys)
	pub list_child_type: extern "C" fn(ty: *mut LogicalTypeFFI) -> *mut LogicalTypeFFI,

	/// Element type of an array type (new handle, caller destroys)
	pub array_child_type: extern "C" fn(ty: *mut LogicalTypeFFI) -> *mut LogicalTypeFFI,

	/// Fixed size of an array type
	pub array_size: extern "C" fn(ty: *mut LogicalTypeFFI) -> u64,

	/// Key type of a map type (new handle, caller destroys)
	pub map_key_type: extern "C" fn(ty: *mut LogicalTypeFFI) -> *mut LogicalTypeFFI,

	/// Value type of a map type (new handle, caller destroys)
	pub map_value_type: extern "C" fn(ty: *mut LogicalTypeFFI) -> *mut LogicalTypeFFI,

	/// Number of members of a struct type
	pub struct_child_count: extern "C" fn(ty: *mut LogicalTypeFFI) -> u64,

	/// Name of a struct member (host allocated, release with `HelperCallbacks::free`)
	pub struct_child_name: extern "C" fn(ty: *mut LogicalTypeFFI, index: u64) -> *mut c_char,

	/// Type of a struct member (new handle, caller destroys)
	pub struct_child_type: extern "C" fn(ty: *mut LogicalTypeFFI, index: u64) -> *mut LogicalTypeFFI,

	/// `TypeCode` of the physical storage of an enum type
	pub enum_internal_type: extern "C" fn(ty: *mut LogicalTypeFFI) -> u32,

	/// Number of entries in an enum dictionary
	pub enum_dictionary_size: extern "C" fn(ty: *mut LogicalTypeFFI) -> u32,

	/// Dictionary entry of an enum (host allocated, release with `HelperCallbacks::free`)
	pub enum_dictionary_value: extern "C" fn(ty: *mut LogicalTypeFFI, index: u64) -> *mut c_char,

	/// Destroy a logical type and null out the handle
	pub destroy: extern "C" fn(ty: *mut *mut LogicalTypeFFI),
}
