// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Typed, null-aware access to host constant values

use std::mem::ManuallyDrop;

use duckbridge_abi::{
	callbacks::ValueCallbacks,
	types::{TypeCode, ValueFFI},
};

use crate::{
	api::api,
	error::{Error, Result},
	ffi::take_host_string,
	logical_type::{LogicalType, type_code_of},
	types::Type,
};

/// A host constant value, destroyed on drop
///
/// Bind parameters arrive as `ValueReader`s; they are dropped before bind returns.
#[derive(Debug)]
pub struct ValueReader {
	ptr: *mut ValueFFI,
}

impl ValueReader {
	/// Take ownership of a value handle returned by the host
	pub(crate) fn from_raw(ptr: *mut ValueFFI) -> Result<Self> {
		if ptr.is_null() {
			return Err(Error::NullPointer("value"));
		}
		Ok(Self {
			ptr,
		})
	}

	pub fn as_ptr(&self) -> *mut ValueFFI {
		self.ptr
	}

	pub fn is_null(&self) -> bool {
		(api().value.is_null)(self.ptr)
	}

	/// Host type id of the value
	pub fn type_code(&self) -> Result<TypeCode> {
		type_code_of((api().value.get_type)(self.ptr))
	}

	/// Semantic type of the value
	pub fn value_type(&self) -> Result<Type> {
		// The type handle belongs to the value and must not be destroyed
		let borrowed = ManuallyDrop::new(LogicalType::from_raw((api().value.get_type)(self.ptr))?);
		borrowed.to_type()
	}

	/// Extract the value as `T`
	///
	/// Fails with [`Error::TypeMismatch`] if the value is NULL or of a different type;
	/// check [`is_null`](Self::is_null) or use [`get_opt`](Self::get_opt) when NULL is expected.
	pub fn get<T: FromValue>(&self) -> Result<T> {
		if self.is_null() {
			return Err(Error::mismatch(T::TYPE_CODE.name(), "NULL"));
		}
		let actual = self.type_code()?;
		if actual != T::TYPE_CODE {
			return Err(Error::mismatch(T::TYPE_CODE.name(), actual.name()));
		}
		T::read(&api().value, self.ptr)
	}

	/// Like [`get`](Self::get) but NULL becomes `None`
	pub fn get_opt<T: FromValue>(&self) -> Result<Option<T>> {
		if self.is_null() {
			return Ok(None);
		}
		self.get().map(Some)
	}
}

impl Drop for ValueReader {
	fn drop(&mut self) {
		if !self.ptr.is_null() {
			(api().value.destroy)(&mut self.ptr);
		}
	}
}

/// Rust types a [`ValueReader`] can extract
pub trait FromValue: Sized {
	const TYPE_CODE: TypeCode;

	fn read(callbacks: &ValueCallbacks, value: *mut ValueFFI) -> Result<Self>;
}

macro_rules! impl_from_value {
	($($ty:ty => $code:ident, $getter:ident);* $(;)?) => {
		$(
			impl FromValue for $ty {
				const TYPE_CODE: TypeCode = TypeCode::$code;

				fn read(callbacks: &ValueCallbacks, value: *mut ValueFFI) -> Result<Self> {
					Ok((callbacks.$getter)(value).into())
				}
			}
		)*
	};
}

impl_from_value! {
	bool => Boolean, get_bool;
	i8 => TinyInt, get_int8;
	i16 => SmallInt, get_int16;
	i32 => Integer, get_int32;
	i64 => BigInt, get_int64;
	i128 => HugeInt, get_hugeint;
	u8 => UTinyInt, get_uint8;
	u16 => USmallInt, get_uint16;
	u32 => UInteger, get_uint32;
	u64 => UBigInt, get_uint64;
	u128 => UHugeInt, get_uhugeint;
	f32 => Float, get_float;
	f64 => Double, get_double;
}

impl FromValue for String {
	const TYPE_CODE: TypeCode = TypeCode::Varchar;

	fn read(callbacks: &ValueCallbacks, value: *mut ValueFFI) -> Result<Self> {
		take_host_string((callbacks.get_varchar)(value))
	}
}

trait TypeCodeName {
	fn name(self) -> &'static str;
}

impl TypeCodeName for TypeCode {
	fn name(self) -> &'static str {
		match Type::from_primitive_code(self) {
			Some(Type::Boolean) => "BOOLEAN",
			Some(Type::Int8) => "TINYINT",
			Some(Type::Int16) => "SMALLINT",
			Some(Type::Int32) => "INTEGER",
			Some(Type::Int64) => "BIGINT",
			Some(Type::Int128) => "HUGEINT",
			Some(Type::UInt8) => "UTINYINT",
			Some(Type::UInt16) => "USMALLINT",
			Some(Type::UInt32) => "UINTEGER",
			Some(Type::UInt64) => "UBIGINT",
			Some(Type::UInt128) => "UHUGEINT",
			Some(Type::Float32) => "FLOAT",
			Some(Type::Float64) => "DOUBLE",
			Some(Type::Varchar) => "VARCHAR",
			Some(Type::Blob) => "BLOB",
			_ => match self {
				TypeCode::Decimal => "DECIMAL",
				TypeCode::List => "LIST",
				TypeCode::Array => "ARRAY",
				TypeCode::Map => "MAP",
				TypeCode::Struct => "STRUCT",
				TypeCode::Enum => "ENUM",
				_ => "UNSUPPORTED",
			},
		}
	}
}
