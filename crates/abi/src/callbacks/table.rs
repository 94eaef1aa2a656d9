// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::{c_char, c_void};

use crate::types::{
	BindInfoFFI, ConnectionFFI, DeleteCallback, FunctionInfoFFI, LogicalTypeFFI, TableBindCallback,
	TableFunctionCallback, TableFunctionFFI, TableInitCallback, ValueFFI,
};

/// Table function construction, bind and execution support
#[repr(C)]
#[derive(Clone, Copy)]
pub struct TableFunctionCallbacks {
	/// Create an empty table function
	pub create: extern "C" fn() -> *mut TableFunctionFFI,

	/// Destroy a table function object and null out the handle
	///
	/// Extra info that was never handed over by a successful registration is destroyed here.
	pub destroy: extern "C" fn(function: *mut *mut TableFunctionFFI),

	/// Set the function name (NUL-terminated UTF-8)
	pub set_name: extern "C" fn(function: *mut TableFunctionFFI, name: *const c_char),

	/// Append a positional parameter type (the type is copied)
	pub add_parameter: extern "C" fn(function: *mut TableFunctionFFI, ty: *mut LogicalTypeFFI),

	/// Add a named parameter (the type is copied)
	pub add_named_parameter:
		extern "C" fn(function: *mut TableFunctionFFI, name: *const c_char, ty: *mut LogicalTypeFFI),

	/// Attach registration-scoped state and its destructor
	pub set_extra_info:
		extern "C" fn(function: *mut TableFunctionFFI, extra_info: *mut c_void, destroy: DeleteCallback),

	/// Set the bind callback
	pub set_bind: extern "C" fn(function: *mut TableFunctionFFI, bind: TableBindCallback),

	/// Set the init callback
	pub set_init: extern "C" fn(function: *mut TableFunctionFFI, init: TableInitCallback),

	/// Set the function body
	pub set_function: extern "C" fn(function: *mut TableFunctionFFI, function_callback: TableFunctionCallback),

	/// Register the function on a connection
	///
	/// # Returns
	/// - `STATE_SUCCESS`, or `STATE_ERROR` (e.g. duplicate name, incomplete definition)
	pub register: extern "C" fn(connection: *mut ConnectionFFI, function: *mut TableFunctionFFI) -> i32,

	// ==================== Bind ====================
	/// Extra info from inside bind
	pub bind_get_extra_info: extern "C" fn(info: *mut BindInfoFFI) -> *mut c_void,

	/// Number of positional parameters bound for this query
	pub bind_get_parameter_count: extern "C" fn(info: *mut BindInfoFFI) -> u64,

	/// Positional parameter (new handle, caller destroys)
	pub bind_get_parameter: extern "C" fn(info: *mut BindInfoFFI, index: u64) -> *mut ValueFFI,

	/// Named parameter, null if it was not supplied (new handle, caller destroys)
	pub bind_get_named_parameter: extern "C" fn(info: *mut BindInfoFFI, name: *const c_char) -> *mut ValueFFI,

	/// Declare an output column (the type is copied)
	pub bind_add_result_column:
		extern "C" fn(info: *mut BindInfoFFI, name: *const c_char, ty: *mut LogicalTypeFFI),

	/// Hand query-scoped state to the host together with its destructor
	pub bind_set_bind_data: extern "C" fn(info: *mut BindInfoFFI, bind_data: *mut c_void, destroy: DeleteCallback),

	/// Estimated number of rows the function will produce
	pub bind_set_cardinality: extern "C" fn(info: *mut BindInfoFFI, cardinality: u64, is_exact: bool),

	/// Fail planning with a NUL-terminated UTF-8 message
	pub bind_set_error: extern "C" fn(info: *mut BindInfoFFI, error: *const c_char),

	// ==================== Execute ====================
	/// Bind data from inside the function body
	pub function_get_bind_data: extern "C" fn(info: *mut FunctionInfoFFI) -> *mut c_void,

	/// Extra info from inside the function body
	pub function_get_extra_info: extern "C" fn(info: *mut FunctionInfoFFI) -> *mut c_void,

	/// Abort the running query with a NUL-terminated UTF-8 message
	pub function_set_error: extern "C" fn(info: *mut FunctionInfoFFI, error: *const c_char),
}
