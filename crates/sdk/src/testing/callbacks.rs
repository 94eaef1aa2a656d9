// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Host API implementation backing the mock host
//!
//! Unlike a real engine:
//! - Logical types are boxed [`Type`]s and values are boxed [`HostValue`]s
//! - Every string handed to the extension is a `CString`, so `free` only releases those
//! - Functions are registered into the [`MockDatabase`](super::MockDatabase) behind the connection

use std::{
	ffi::{CStr, CString, c_char, c_void},
	ptr::null_mut,
	slice::from_raw_parts,
};

use duckbridge_abi::{
	api::ApiFFI,
	callbacks::{
		ConnectionCallbacks, DataChunkCallbacks, HelperCallbacks, LogicalTypeCallbacks, ScalarFunctionCallbacks,
		TableFunctionCallbacks, ValueCallbacks, VectorCallbacks,
	},
	constants::{STATE_ERROR, STATE_SUCCESS},
	types::{
		BindInfoFFI, ConnectionFFI, DataChunkFFI, DatabaseFFI, DeleteCallback, FunctionInfoFFI, HugeIntFFI,
		LogicalTypeFFI, ScalarFunctionCallback, ScalarFunctionFFI, TableBindCallback, TableFunctionCallback,
		TableFunctionFFI, TableInitCallback, TypeCode, UHugeIntFFI, ValueFFI, VectorFFI,
	},
};

use super::{
	HostValue, LIVE_TYPES, LIVE_VALUES, VECTOR_SIZE,
	database::{DatabaseState, Registered, ScalarEntry, TableEntry},
	vector::{MockChunk, MockVector},
};
use crate::types::{Type, decimal_storage, enum_storage};

pub(crate) static API: ApiFFI = ApiFFI {
	logical_type: LogicalTypeCallbacks {
		create: test_type_create,
		create_decimal: test_type_create_decimal,
		create_list: test_type_create_list,
		create_array: test_type_create_array,
		create_map: test_type_create_map,
		create_struct: test_type_create_struct,
		create_enum: test_type_create_enum,
		get_type_id: test_type_id,
		decimal_width: test_type_decimal_width,
		decimal_scale: test_type_decimal_scale,
		decimal_internal_type: test_type_decimal_internal_type,
		list_child_type: test_type_list_child,
		array_child_type: test_type_array_child,
		array_size: test_type_array_size,
		map_key_type: test_type_map_key,
		map_value_type: test_type_map_value,
		struct_child_count: test_type_struct_child_count,
		struct_child_name: test_type_struct_child_name,
		struct_child_type: test_type_struct_child_type,
		enum_internal_type: test_type_enum_internal_type,
		enum_dictionary_size: test_type_enum_dictionary_size,
		enum_dictionary_value: test_type_enum_dictionary_value,
		destroy: test_type_destroy,
	},
	value: ValueCallbacks {
		destroy: test_value_destroy,
		is_null: test_value_is_null,
		get_type: test_value_get_type,
		get_bool: test_value_get_bool,
		get_int8: test_value_get_int8,
		get_int16: test_value_get_int16,
		get_int32: test_value_get_int32,
		get_int64: test_value_get_int64,
		get_hugeint: test_value_get_hugeint,
		get_uint8: test_value_get_uint8,
		get_uint16: test_value_get_uint16,
		get_uint32: test_value_get_uint32,
		get_uint64: test_value_get_uint64,
		get_uhugeint: test_value_get_uhugeint,
		get_float: test_value_get_float,
		get_double: test_value_get_double,
		get_varchar: test_value_get_varchar,
	},
	vector: VectorCallbacks {
		get_column_type: test_vector_column_type,
		get_data: test_vector_data,
		get_validity: test_vector_validity,
		ensure_validity_writable: test_vector_ensure_validity_writable,
		assign_string_element: test_vector_assign_string,
		assign_string_element_len: test_vector_assign_string_len,
		list_get_child: test_vector_list_child,
		list_get_size: test_vector_list_size,
		list_set_size: test_vector_list_set_size,
		list_reserve: test_vector_list_reserve,
		array_get_child: test_vector_array_child,
		struct_get_child: test_vector_struct_child,
	},
	chunk: DataChunkCallbacks {
		get_column_count: test_chunk_column_count,
		get_vector: test_chunk_vector,
		get_size: test_chunk_size,
		set_size: test_chunk_set_size,
	},
	scalar: ScalarFunctionCallbacks {
		create: test_scalar_create,
		destroy: test_scalar_destroy,
		set_name: test_scalar_set_name,
		add_parameter: test_scalar_add_parameter,
		set_return_type: test_scalar_set_return_type,
		set_varargs: test_scalar_set_varargs,
		set_volatile: test_scalar_set_volatile,
		set_special_handling: test_scalar_set_special_handling,
		set_extra_info: test_scalar_set_extra_info,
		set_function: test_scalar_set_function,
		register: test_scalar_register,
		get_extra_info: test_function_extra_info,
		set_error: test_function_set_error,
	},
	table: TableFunctionCallbacks {
		create: test_table_create,
		destroy: test_table_destroy,
		set_name: test_table_set_name,
		add_parameter: test_table_add_parameter,
		add_named_parameter: test_table_add_named_parameter,
		set_extra_info: test_table_set_extra_info,
		set_bind: test_table_set_bind,
		set_init: test_table_set_init,
		set_function: test_table_set_function,
		register: test_table_register,
		bind_get_extra_info: test_bind_extra_info,
		bind_get_parameter_count: test_bind_parameter_count,
		bind_get_parameter: test_bind_parameter,
		bind_get_named_parameter: test_bind_named_parameter,
		bind_add_result_column: test_bind_add_result_column,
		bind_set_bind_data: test_bind_set_bind_data,
		bind_set_cardinality: test_bind_set_cardinality,
		bind_set_error: test_bind_set_error,
		function_get_bind_data: test_function_bind_data,
		function_get_extra_info: test_function_extra_info,
		function_set_error: test_function_set_error,
	},
	connection: ConnectionCallbacks {
		connect: test_connect,
		disconnect: test_disconnect,
	},
	helper: HelperCallbacks {
		free: test_free,
		vector_size: test_vector_size,
	},
};

// ============================================================================
// Host-side objects behind the opaque handles
// ============================================================================

/// Extension state the host owns, released through its delete callback
pub(crate) struct ExtraInfo {
	pub(crate) data: *mut c_void,
	destroy: DeleteCallback,
}

impl Drop for ExtraInfo {
	fn drop(&mut self) {
		(self.destroy)(self.data);
	}
}

pub(crate) struct MockValue {
	ty: Type,
	value: HostValue,
}

#[derive(Default)]
pub(crate) struct MockScalarFunction {
	name: String,
	parameters: Vec<Type>,
	return_type: Option<Type>,
	varargs: Option<Type>,
	volatile: bool,
	special_handling: bool,
	extra_info: Option<ExtraInfo>,
	function: Option<ScalarFunctionCallback>,
}

#[derive(Default)]
pub(crate) struct MockTableFunction {
	name: String,
	parameters: Vec<Type>,
	named_parameters: Vec<(String, Type)>,
	extra_info: Option<ExtraInfo>,
	bind: Option<TableBindCallback>,
	init: Option<TableInitCallback>,
	function: Option<TableFunctionCallback>,
}

pub(crate) struct MockBindInfo {
	pub(crate) extra_info: *mut c_void,
	pub(crate) parameters: Vec<HostValue>,
	pub(crate) named: Vec<(String, HostValue)>,
	pub(crate) columns: Vec<(String, Type)>,
	pub(crate) bind_data: Option<ExtraInfo>,
	pub(crate) cardinality: Option<(u64, bool)>,
	pub(crate) error: Option<String>,
}

pub(crate) struct MockFunctionInfo {
	pub(crate) extra_info: *mut c_void,
	pub(crate) bind_data: *mut c_void,
	pub(crate) error: Option<String>,
}

pub(crate) struct MockConnection {
	database: *const DatabaseState,
}

pub(crate) fn new_value(value: HostValue) -> *mut ValueFFI {
	let ty = value.scalar_type().expect("the mock host only creates scalar values");
	LIVE_VALUES.with(|count| count.set(count.get() + 1));
	Box::into_raw(Box::new(MockValue {
		ty,
		value,
	}))
	.cast()
}

fn new_type(ty: Type) -> *mut LogicalTypeFFI {
	LIVE_TYPES.with(|count| count.set(count.get() + 1));
	Box::into_raw(Box::new(ty)).cast()
}

fn new_string(value: &str) -> *mut c_char {
	CString::new(value.replace('\0', " ")).unwrap_or_default().into_raw()
}

unsafe fn type_ref<'a>(ty: *mut LogicalTypeFFI) -> &'a Type {
	unsafe { &*ty.cast::<Type>() }
}

unsafe fn value_ref<'a>(value: *mut ValueFFI) -> &'a MockValue {
	unsafe { &*value.cast::<MockValue>() }
}

unsafe fn vector_mut<'a>(vector: *mut VectorFFI) -> &'a mut MockVector {
	unsafe { &mut *vector.cast::<MockVector>() }
}

unsafe fn chunk_mut<'a>(chunk: *mut DataChunkFFI) -> &'a mut MockChunk {
	unsafe { &mut *chunk.cast::<MockChunk>() }
}

unsafe fn text(ptr: *const c_char) -> String {
	unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

// ============================================================================
// Logical Type Callbacks
// ============================================================================

extern "C" fn test_type_create(type_id: u32) -> *mut LogicalTypeFFI {
	match TypeCode::from_u32(type_id).and_then(Type::from_primitive_code) {
		Some(ty) => new_type(ty),
		None => null_mut(),
	}
}

extern "C" fn test_type_create_decimal(width: u8, scale: u8) -> *mut LogicalTypeFFI {
	new_type(Type::decimal(width, scale))
}

extern "C" fn test_type_create_list(child: *mut LogicalTypeFFI) -> *mut LogicalTypeFFI {
	new_type(Type::list(unsafe { type_ref(child) }.clone()))
}

extern "C" fn test_type_create_array(child: *mut LogicalTypeFFI, size: u64) -> *mut LogicalTypeFFI {
	new_type(Type::array(unsafe { type_ref(child) }.clone(), size as usize))
}

extern "C" fn test_type_create_map(key: *mut LogicalTypeFFI, value: *mut LogicalTypeFFI) -> *mut LogicalTypeFFI {
	unsafe { new_type(Type::map(type_ref(key).clone(), type_ref(value).clone())) }
}

extern "C" fn test_type_create_struct(
	member_types: *const *mut LogicalTypeFFI,
	member_names: *const *const c_char,
	member_count: u64,
) -> *mut LogicalTypeFFI {
	let count = member_count as usize;
	let fields = unsafe {
		let types = from_raw_parts(member_types, count);
		let names = from_raw_parts(member_names, count);
		names.iter().zip(types).map(|(name, ty)| (text(*name), type_ref(*ty).clone())).collect()
	};
	new_type(Type::Struct(fields))
}

extern "C" fn test_type_create_enum(member_names: *const *const c_char, member_count: u64) -> *mut LogicalTypeFFI {
	let names = unsafe { from_raw_parts(member_names, member_count as usize) };
	new_type(Type::Enum(names.iter().map(|name| unsafe { text(*name) }).collect()))
}

extern "C" fn test_type_id(ty: *mut LogicalTypeFFI) -> u32 {
	unsafe { type_ref(ty) }.type_code().to_u32()
}

extern "C" fn test_type_decimal_width(ty: *mut LogicalTypeFFI) -> u8 {
	match unsafe { type_ref(ty) } {
		Type::Decimal {
			width,
			..
		} => *width,
		_ => 0,
	}
}

extern "C" fn test_type_decimal_scale(ty: *mut LogicalTypeFFI) -> u8 {
	match unsafe { type_ref(ty) } {
		Type::Decimal {
			scale,
			..
		} => *scale,
		_ => 0,
	}
}

extern "C" fn test_type_decimal_internal_type(ty: *mut LogicalTypeFFI) -> u32 {
	match unsafe { type_ref(ty) } {
		Type::Decimal {
			width,
			..
		} => decimal_storage(*width).0.to_u32(),
		_ => TypeCode::Invalid.to_u32(),
	}
}

extern "C" fn test_type_list_child(ty: *mut LogicalTypeFFI) -> *mut LogicalTypeFFI {
	match unsafe { type_ref(ty) } {
		Type::List(element) => new_type((**element).clone()),
		_ => null_mut(),
	}
}

extern "C" fn test_type_array_child(ty: *mut LogicalTypeFFI) -> *mut LogicalTypeFFI {
	match unsafe { type_ref(ty) } {
		Type::Array(element, _) => new_type((**element).clone()),
		_ => null_mut(),
	}
}

extern "C" fn test_type_array_size(ty: *mut LogicalTypeFFI) -> u64 {
	match unsafe { type_ref(ty) } {
		Type::Array(_, size) => *size as u64,
		_ => 0,
	}
}

extern "C" fn test_type_map_key(ty: *mut LogicalTypeFFI) -> *mut LogicalTypeFFI {
	match unsafe { type_ref(ty) } {
		Type::Map(key, _) => new_type((**key).clone()),
		_ => null_mut(),
	}
}

extern "C" fn test_type_map_value(ty: *mut LogicalTypeFFI) -> *mut LogicalTypeFFI {
	match unsafe { type_ref(ty) } {
		Type::Map(_, value) => new_type((**value).clone()),
		_ => null_mut(),
	}
}

extern "C" fn test_type_struct_child_count(ty: *mut LogicalTypeFFI) -> u64 {
	match unsafe { type_ref(ty) } {
		Type::Struct(fields) => fields.len() as u64,
		_ => 0,
	}
}

extern "C" fn test_type_struct_child_name(ty: *mut LogicalTypeFFI, index: u64) -> *mut c_char {
	match unsafe { type_ref(ty) } {
		Type::Struct(fields) => fields.get(index as usize).map_or(null_mut(), |(name, _)| new_string(name)),
		_ => null_mut(),
	}
}

extern "C" fn test_type_struct_child_type(ty: *mut LogicalTypeFFI, index: u64) -> *mut LogicalTypeFFI {
	match unsafe { type_ref(ty) } {
		Type::Struct(fields) => fields.get(index as usize).map_or(null_mut(), |(_, field)| new_type(field.clone())),
		_ => null_mut(),
	}
}

extern "C" fn test_type_enum_internal_type(ty: *mut LogicalTypeFFI) -> u32 {
	match unsafe { type_ref(ty) } {
		Type::Enum(dictionary) => enum_storage(dictionary.len()).0.to_u32(),
		_ => TypeCode::Invalid.to_u32(),
	}
}

extern "C" fn test_type_enum_dictionary_size(ty: *mut LogicalTypeFFI) -> u32 {
	match unsafe { type_ref(ty) } {
		Type::Enum(dictionary) => dictionary.len() as u32,
		_ => 0,
	}
}

extern "C" fn test_type_enum_dictionary_value(ty: *mut LogicalTypeFFI, index: u64) -> *mut c_char {
	match unsafe { type_ref(ty) } {
		Type::Enum(dictionary) => dictionary.get(index as usize).map_or(null_mut(), |entry| new_string(entry)),
		_ => null_mut(),
	}
}

extern "C" fn test_type_destroy(ty: *mut *mut LogicalTypeFFI) {
	if ty.is_null() || unsafe { (*ty).is_null() } {
		return;
	}
	unsafe {
		drop(Box::from_raw((*ty).cast::<Type>()));
		*ty = null_mut();
	}
	LIVE_TYPES.with(|count| count.set(count.get() - 1));
}

// ============================================================================
// Value Callbacks
// ============================================================================

extern "C" fn test_value_destroy(value: *mut *mut ValueFFI) {
	if value.is_null() || unsafe { (*value).is_null() } {
		return;
	}
	unsafe {
		drop(Box::from_raw((*value).cast::<MockValue>()));
		*value = null_mut();
	}
	LIVE_VALUES.with(|count| count.set(count.get() - 1));
}

extern "C" fn test_value_is_null(value: *mut ValueFFI) -> bool {
	unsafe { value_ref(value) }.value.is_null()
}

extern "C" fn test_value_get_type(value: *mut ValueFFI) -> *mut LogicalTypeFFI {
	// Borrowed: the type lives inside the value
	let value = unsafe { &mut *value.cast::<MockValue>() };
	(&mut value.ty as *mut Type).cast()
}

extern "C" fn test_value_get_bool(value: *mut ValueFFI) -> bool {
	unsafe { value_ref(value) }.value.as_i128() != 0
}

extern "C" fn test_value_get_int8(value: *mut ValueFFI) -> i8 {
	unsafe { value_ref(value) }.value.as_i128() as i8
}

extern "C" fn test_value_get_int16(value: *mut ValueFFI) -> i16 {
	unsafe { value_ref(value) }.value.as_i128() as i16
}

extern "C" fn test_value_get_int32(value: *mut ValueFFI) -> i32 {
	unsafe { value_ref(value) }.value.as_i128() as i32
}

extern "C" fn test_value_get_int64(value: *mut ValueFFI) -> i64 {
	unsafe { value_ref(value) }.value.as_i128() as i64
}

extern "C" fn test_value_get_hugeint(value: *mut ValueFFI) -> HugeIntFFI {
	HugeIntFFI::from(unsafe { value_ref(value) }.value.as_i128())
}

extern "C" fn test_value_get_uint8(value: *mut ValueFFI) -> u8 {
	unsafe { value_ref(value) }.value.as_i128() as u8
}

extern "C" fn test_value_get_uint16(value: *mut ValueFFI) -> u16 {
	unsafe { value_ref(value) }.value.as_i128() as u16
}

extern "C" fn test_value_get_uint32(value: *mut ValueFFI) -> u32 {
	unsafe { value_ref(value) }.value.as_i128() as u32
}

extern "C" fn test_value_get_uint64(value: *mut ValueFFI) -> u64 {
	unsafe { value_ref(value) }.value.as_i128() as u64
}

extern "C" fn test_value_get_uhugeint(value: *mut ValueFFI) -> UHugeIntFFI {
	let raw = match &unsafe { value_ref(value) }.value {
		HostValue::UInt128(v) => *v,
		other => other.as_i128() as u128,
	};
	UHugeIntFFI::from(raw)
}

extern "C" fn test_value_get_float(value: *mut ValueFFI) -> f32 {
	unsafe { value_ref(value) }.value.as_f64() as f32
}

extern "C" fn test_value_get_double(value: *mut ValueFFI) -> f64 {
	unsafe { value_ref(value) }.value.as_f64()
}

extern "C" fn test_value_get_varchar(value: *mut ValueFFI) -> *mut c_char {
	new_string(&unsafe { value_ref(value) }.value.to_string())
}

// ============================================================================
// Vector Callbacks
// ============================================================================

extern "C" fn test_vector_column_type(vector: *mut VectorFFI) -> *mut LogicalTypeFFI {
	new_type(unsafe { vector_mut(vector) }.ty.clone())
}

extern "C" fn test_vector_data(vector: *mut VectorFFI) -> *mut c_void {
	unsafe { vector_mut(vector) }.data_ptr().cast()
}

extern "C" fn test_vector_validity(vector: *mut VectorFFI) -> *mut u64 {
	unsafe { vector_mut(vector) }.validity_ptr()
}

extern "C" fn test_vector_ensure_validity_writable(vector: *mut VectorFFI) {
	unsafe { vector_mut(vector) }.ensure_validity();
}

extern "C" fn test_vector_assign_string(vector: *mut VectorFFI, index: u64, value: *const c_char) {
	let bytes = unsafe { CStr::from_ptr(value) }.to_bytes();
	unsafe { vector_mut(vector) }.assign(index as usize, bytes);
}

extern "C" fn test_vector_assign_string_len(vector: *mut VectorFFI, index: u64, value: *const c_char, length: u64) {
	let bytes = unsafe { from_raw_parts(value.cast::<u8>(), length as usize) };
	unsafe { vector_mut(vector) }.assign(index as usize, bytes);
}

extern "C" fn test_vector_list_child(vector: *mut VectorFFI) -> *mut VectorFFI {
	match &mut unsafe { vector_mut(vector) }.child {
		Some(child) => child.as_ptr(),
		None => null_mut(),
	}
}

extern "C" fn test_vector_list_size(vector: *mut VectorFFI) -> u64 {
	unsafe { vector_mut(vector) }.list_size as u64
}

extern "C" fn test_vector_list_set_size(vector: *mut VectorFFI, size: u64) -> i32 {
	let vector = unsafe { vector_mut(vector) };
	match &vector.child {
		Some(child) if size as usize <= child.capacity => {
			vector.list_size = size as usize;
			STATE_SUCCESS
		}
		_ => STATE_ERROR,
	}
}

extern "C" fn test_vector_list_reserve(vector: *mut VectorFFI, capacity: u64) -> i32 {
	match &mut unsafe { vector_mut(vector) }.child {
		Some(child) => {
			let capacity = capacity as usize;
			if capacity > child.capacity {
				// Grow geometrically so the child buffer moves, like the real host's does
				child.reserve(capacity.max(child.capacity * 2));
			}
			STATE_SUCCESS
		}
		None => STATE_ERROR,
	}
}

extern "C" fn test_vector_array_child(vector: *mut VectorFFI) -> *mut VectorFFI {
	test_vector_list_child(vector)
}

extern "C" fn test_vector_struct_child(vector: *mut VectorFFI, index: u64) -> *mut VectorFFI {
	match unsafe { vector_mut(vector) }.children.get_mut(index as usize) {
		Some(child) => child.as_ptr(),
		None => null_mut(),
	}
}

// ============================================================================
// Data Chunk Callbacks
// ============================================================================

extern "C" fn test_chunk_column_count(chunk: *mut DataChunkFFI) -> u64 {
	unsafe { chunk_mut(chunk) }.vectors.len() as u64
}

extern "C" fn test_chunk_vector(chunk: *mut DataChunkFFI, index: u64) -> *mut VectorFFI {
	match unsafe { chunk_mut(chunk) }.vectors.get_mut(index as usize) {
		Some(vector) => vector.as_ptr(),
		None => null_mut(),
	}
}

extern "C" fn test_chunk_size(chunk: *mut DataChunkFFI) -> u64 {
	unsafe { chunk_mut(chunk) }.size as u64
}

extern "C" fn test_chunk_set_size(chunk: *mut DataChunkFFI, size: u64) {
	unsafe { chunk_mut(chunk) }.size = size as usize;
}

// ============================================================================
// Scalar Function Callbacks
// ============================================================================

unsafe fn scalar_mut<'a>(function: *mut ScalarFunctionFFI) -> &'a mut MockScalarFunction {
	unsafe { &mut *function.cast::<MockScalarFunction>() }
}

extern "C" fn test_scalar_create() -> *mut ScalarFunctionFFI {
	Box::into_raw(Box::<MockScalarFunction>::default()).cast()
}

extern "C" fn test_scalar_destroy(function: *mut *mut ScalarFunctionFFI) {
	if function.is_null() || unsafe { (*function).is_null() } {
		return;
	}
	unsafe {
		drop(Box::from_raw((*function).cast::<MockScalarFunction>()));
		*function = null_mut();
	}
}

extern "C" fn test_scalar_set_name(function: *mut ScalarFunctionFFI, name: *const c_char) {
	unsafe { scalar_mut(function).name = text(name) };
}

extern "C" fn test_scalar_add_parameter(function: *mut ScalarFunctionFFI, ty: *mut LogicalTypeFFI) {
	unsafe { scalar_mut(function).parameters.push(type_ref(ty).clone()) };
}

extern "C" fn test_scalar_set_return_type(function: *mut ScalarFunctionFFI, ty: *mut LogicalTypeFFI) {
	unsafe { scalar_mut(function).return_type = Some(type_ref(ty).clone()) };
}

extern "C" fn test_scalar_set_varargs(function: *mut ScalarFunctionFFI, ty: *mut LogicalTypeFFI) {
	unsafe { scalar_mut(function).varargs = Some(type_ref(ty).clone()) };
}

extern "C" fn test_scalar_set_volatile(function: *mut ScalarFunctionFFI) {
	unsafe { scalar_mut(function) }.volatile = true;
}

extern "C" fn test_scalar_set_special_handling(function: *mut ScalarFunctionFFI) {
	unsafe { scalar_mut(function) }.special_handling = true;
}

extern "C" fn test_scalar_set_extra_info(function: *mut ScalarFunctionFFI, data: *mut c_void, destroy: DeleteCallback) {
	unsafe { scalar_mut(function) }.extra_info = Some(ExtraInfo {
		data,
		destroy,
	});
}

extern "C" fn test_scalar_set_function(function: *mut ScalarFunctionFFI, callback: ScalarFunctionCallback) {
	unsafe { scalar_mut(function) }.function = Some(callback);
}

extern "C" fn test_scalar_register(connection: *mut ConnectionFFI, function: *mut ScalarFunctionFFI) -> i32 {
	let function = unsafe { scalar_mut(function) };
	let (Some(return_type), Some(callback)) = (function.return_type.clone(), function.function) else {
		return STATE_ERROR;
	};
	let entry = Registered::Scalar(ScalarEntry {
		parameters: function.parameters.clone(),
		return_type,
		varargs: function.varargs.clone(),
		volatile: function.volatile,
		special_handling: function.special_handling,
		extra_info: None,
		function: callback,
	});
	register(connection, &function.name, entry, || function.extra_info.take())
}

extern "C" fn test_function_extra_info(info: *mut FunctionInfoFFI) -> *mut c_void {
	unsafe { &*info.cast::<MockFunctionInfo>() }.extra_info
}

extern "C" fn test_function_bind_data(info: *mut FunctionInfoFFI) -> *mut c_void {
	unsafe { &*info.cast::<MockFunctionInfo>() }.bind_data
}

extern "C" fn test_function_set_error(info: *mut FunctionInfoFFI, error: *const c_char) {
	unsafe { (*info.cast::<MockFunctionInfo>()).error = Some(text(error)) };
}

// ============================================================================
// Table Function Callbacks
// ============================================================================

unsafe fn table_mut<'a>(function: *mut TableFunctionFFI) -> &'a mut MockTableFunction {
	unsafe { &mut *function.cast::<MockTableFunction>() }
}

unsafe fn bind_mut<'a>(info: *mut BindInfoFFI) -> &'a mut MockBindInfo {
	unsafe { &mut *info.cast::<MockBindInfo>() }
}

extern "C" fn test_table_create() -> *mut TableFunctionFFI {
	Box::into_raw(Box::<MockTableFunction>::default()).cast()
}

extern "C" fn test_table_destroy(function: *mut *mut TableFunctionFFI) {
	if function.is_null() || unsafe { (*function).is_null() } {
		return;
	}
	unsafe {
		drop(Box::from_raw((*function).cast::<MockTableFunction>()));
		*function = null_mut();
	}
}

extern "C" fn test_table_set_name(function: *mut TableFunctionFFI, name: *const c_char) {
	unsafe { table_mut(function).name = text(name) };
}

extern "C" fn test_table_add_parameter(function: *mut TableFunctionFFI, ty: *mut LogicalTypeFFI) {
	unsafe { table_mut(function).parameters.push(type_ref(ty).clone()) };
}

extern "C" fn test_table_add_named_parameter(
	function: *mut TableFunctionFFI,
	name: *const c_char,
	ty: *mut LogicalTypeFFI,
) {
	unsafe { table_mut(function).named_parameters.push((text(name), type_ref(ty).clone())) };
}

extern "C" fn test_table_set_extra_info(function: *mut TableFunctionFFI, data: *mut c_void, destroy: DeleteCallback) {
	unsafe { table_mut(function) }.extra_info = Some(ExtraInfo {
		data,
		destroy,
	});
}

extern "C" fn test_table_set_bind(function: *mut TableFunctionFFI, bind: TableBindCallback) {
	unsafe { table_mut(function) }.bind = Some(bind);
}

extern "C" fn test_table_set_init(function: *mut TableFunctionFFI, init: TableInitCallback) {
	unsafe { table_mut(function) }.init = Some(init);
}

extern "C" fn test_table_set_function(function: *mut TableFunctionFFI, callback: TableFunctionCallback) {
	unsafe { table_mut(function) }.function = Some(callback);
}

extern "C" fn test_table_register(connection: *mut ConnectionFFI, function: *mut TableFunctionFFI) -> i32 {
	let function = unsafe { table_mut(function) };
	let (Some(bind), Some(init), Some(callback)) = (function.bind, function.init, function.function) else {
		return STATE_ERROR;
	};
	let entry = Registered::Table(TableEntry {
		parameters: function.parameters.clone(),
		named_parameters: function.named_parameters.clone(),
		extra_info: None,
		bind,
		init,
		function: callback,
	});
	register(connection, &function.name, entry, || function.extra_info.take())
}

// Extra info moves into the catalog only once registration has succeeded
fn register(
	connection: *mut ConnectionFFI,
	name: &str,
	mut entry: Registered,
	extra_info: impl FnOnce() -> Option<ExtraInfo>,
) -> i32 {
	if connection.is_null() || name.is_empty() {
		return STATE_ERROR;
	}
	let database = unsafe { &*(*connection.cast::<MockConnection>()).database };
	let mut functions = database.functions.borrow_mut();
	if functions.contains_key(name) {
		return STATE_ERROR;
	}
	match &mut entry {
		Registered::Scalar(scalar) => scalar.extra_info = extra_info(),
		Registered::Table(table) => table.extra_info = extra_info(),
	}
	functions.insert(name.to_string(), entry);
	STATE_SUCCESS
}

extern "C" fn test_bind_extra_info(info: *mut BindInfoFFI) -> *mut c_void {
	unsafe { bind_mut(info) }.extra_info
}

extern "C" fn test_bind_parameter_count(info: *mut BindInfoFFI) -> u64 {
	unsafe { bind_mut(info) }.parameters.len() as u64
}

extern "C" fn test_bind_parameter(info: *mut BindInfoFFI, index: u64) -> *mut ValueFFI {
	match unsafe { bind_mut(info) }.parameters.get(index as usize) {
		Some(value) => new_value(value.clone()),
		None => null_mut(),
	}
}

extern "C" fn test_bind_named_parameter(info: *mut BindInfoFFI, name: *const c_char) -> *mut ValueFFI {
	let name = unsafe { text(name) };
	match unsafe { bind_mut(info) }.named.iter().find(|(candidate, _)| *candidate == name) {
		Some((_, value)) => new_value(value.clone()),
		None => null_mut(),
	}
}

extern "C" fn test_bind_add_result_column(info: *mut BindInfoFFI, name: *const c_char, ty: *mut LogicalTypeFFI) {
	unsafe { bind_mut(info).columns.push((text(name), type_ref(ty).clone())) };
}

extern "C" fn test_bind_set_bind_data(info: *mut BindInfoFFI, data: *mut c_void, destroy: DeleteCallback) {
	unsafe { bind_mut(info) }.bind_data = Some(ExtraInfo {
		data,
		destroy,
	});
}

extern "C" fn test_bind_set_cardinality(info: *mut BindInfoFFI, cardinality: u64, is_exact: bool) {
	unsafe { bind_mut(info) }.cardinality = Some((cardinality, is_exact));
}

extern "C" fn test_bind_set_error(info: *mut BindInfoFFI, error: *const c_char) {
	unsafe { bind_mut(info).error = Some(text(error)) };
}

// ============================================================================
// Connection and Helper Callbacks
// ============================================================================

extern "C" fn test_connect(database: *mut DatabaseFFI, out: *mut *mut ConnectionFFI) -> i32 {
	if database.is_null() || out.is_null() {
		return STATE_ERROR;
	}
	let state = database.cast::<DatabaseState>();
	unsafe {
		let open = &(*state).open_connections;
		open.set(open.get() + 1);
		*out = Box::into_raw(Box::new(MockConnection {
			database: state,
		}))
		.cast();
	}
	STATE_SUCCESS
}

extern "C" fn test_disconnect(connection: *mut *mut ConnectionFFI) {
	if connection.is_null() || unsafe { (*connection).is_null() } {
		return;
	}
	unsafe {
		let connection_box = Box::from_raw((*connection).cast::<MockConnection>());
		let open = &(*connection_box.database).open_connections;
		open.set(open.get() - 1);
		*connection = null_mut();
	}
}

extern "C" fn test_free(ptr: *mut c_void) {
	if !ptr.is_null() {
		drop(unsafe { CString::from_raw(ptr.cast()) });
	}
}

extern "C" fn test_vector_size() -> u64 {
	VECTOR_SIZE.with(|size| size.get())
}
