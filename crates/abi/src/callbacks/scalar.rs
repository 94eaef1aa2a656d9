// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::{c_char, c_void};

use crate::types::{
	ConnectionFFI, DeleteCallback, FunctionInfoFFI, LogicalTypeFFI, ScalarFunctionCallback, ScalarFunctionFFI,
};

/// Scalar function construction and execution support
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ScalarFunctionCallbacks {
	/// Create an empty scalar function
	pub create: extern "C" fn() -> *mut ScalarFunctionFFI,

	/// Destroy a scalar function object and null out the handle
	///
	/// Extra info that was never handed over by a successful registration is destroyed here.
	pub destroy: extern "C" fn(function: *mut *mut ScalarFunctionFFI),

	/// Set the function name (NUL-terminated UTF-8)
	pub set_name: extern "C" fn(function: *mut ScalarFunctionFFI, name: *const c_char),

	/// Append a parameter type (the type is copied)
	pub add_parameter: extern "C" fn(function: *mut ScalarFunctionFFI, ty: *mut LogicalTypeFFI),

	/// Set the return type (the type is copied)
	pub set_return_type: extern "C" fn(function: *mut ScalarFunctionFFI, ty: *mut LogicalTypeFFI),

	/// Accept any number of trailing arguments of the given type
	pub set_varargs: extern "C" fn(function: *mut ScalarFunctionFFI, ty: *mut LogicalTypeFFI),

	/// Mark the function volatile (never constant-folded)
	pub set_volatile: extern "C" fn(function: *mut ScalarFunctionFFI),

	/// Let the function see NULL inputs instead of the host short-circuiting to NULL
	pub set_special_handling: extern "C" fn(function: *mut ScalarFunctionFFI),

	/// Attach registration-scoped state and its destructor
	pub set_extra_info:
		extern "C" fn(function: *mut ScalarFunctionFFI, extra_info: *mut c_void, destroy: DeleteCallback),

	/// Set the function body
	pub set_function: extern "C" fn(function: *mut ScalarFunctionFFI, callback: ScalarFunctionCallback),

	/// Register the function on a connection
	///
	/// # Returns
	/// - `STATE_SUCCESS`, or `STATE_ERROR` (e.g. duplicate name, incomplete definition)
	pub register: extern "C" fn(connection: *mut ConnectionFFI, function: *mut ScalarFunctionFFI) -> i32,

	/// Extra info from inside the function body
	pub get_extra_info: extern "C" fn(info: *mut FunctionInfoFFI) -> *mut c_void,

	/// Abort the running query with a NUL-terminated UTF-8 message
	pub set_error: extern "C" fn(info: *mut FunctionInfoFFI, error: *const c_char),
}
