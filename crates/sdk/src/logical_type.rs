// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Owned host logical types and the mapping to and from [`Type`]

use std::ffi::c_char;

use duckbridge_abi::types::{LogicalTypeFFI, TypeCode};

use crate::{
	api::api,
	error::{Error, Result},
	ffi::{take_host_string, to_cstring},
	types::Type,
};

/// An owned host logical type, destroyed on drop
///
/// Never cache one across host calls: build it, hand it to the host, let it drop.
#[derive(Debug)]
pub struct LogicalType {
	ptr: *mut LogicalTypeFFI,
}

impl LogicalType {
	/// Take ownership of a handle returned by the host
	pub(crate) fn from_raw(ptr: *mut LogicalTypeFFI) -> Result<Self> {
		if ptr.is_null() {
			return Err(Error::NullPointer("logical type"));
		}
		Ok(Self {
			ptr,
		})
	}

	pub fn as_ptr(&self) -> *mut LogicalTypeFFI {
		self.ptr
	}

	/// Build the host logical type for `ty`
	///
	/// Invalid configurations (decimal width/scale, empty structs, ...) fail here with
	/// [`Error::InvalidTypeConfiguration`] before anything reaches the host.
	pub fn from_type(ty: &Type) -> Result<Self> {
		ty.validate()?;
		Self::build(ty)
	}

	fn build(ty: &Type) -> Result<Self> {
		let callbacks = &api().logical_type;
		let ptr = match ty {
			Type::Decimal {
				width,
				scale,
			} => (callbacks.create_decimal)(*width, *scale),
			Type::List(element) => {
				let element = Self::build(element)?;
				(callbacks.create_list)(element.as_ptr())
			}
			Type::Array(element, size) => {
				let element = Self::build(element)?;
				(callbacks.create_array)(element.as_ptr(), *size as u64)
			}
			Type::Map(key, value) => {
				let key = Self::build(key)?;
				let value = Self::build(value)?;
				(callbacks.create_map)(key.as_ptr(), value.as_ptr())
			}
			Type::Struct(fields) => {
				let members = fields.iter().map(|(_, ty)| Self::build(ty)).collect::<Result<Vec<_>>>()?;
				let names = fields.iter().map(|(name, _)| to_cstring(name)).collect::<Result<Vec<_>>>()?;
				let member_ptrs: Vec<*mut LogicalTypeFFI> = members.iter().map(Self::as_ptr).collect();
				let name_ptrs: Vec<*const c_char> = names.iter().map(|name| name.as_ptr()).collect();
				(callbacks.create_struct)(member_ptrs.as_ptr(), name_ptrs.as_ptr(), fields.len() as u64)
			}
			Type::Enum(dictionary) => {
				let names = dictionary.iter().map(|entry| to_cstring(entry)).collect::<Result<Vec<_>>>()?;
				let name_ptrs: Vec<*const c_char> = names.iter().map(|name| name.as_ptr()).collect();
				(callbacks.create_enum)(name_ptrs.as_ptr(), dictionary.len() as u64)
			}
			primitive => (callbacks.create)(primitive.type_code().to_u32()),
		};
		Self::from_raw(ptr)
	}

	/// Host type id
	pub fn type_code(&self) -> Result<TypeCode> {
		type_code_of(self.ptr)
	}

	/// Read the full semantic type back from the host
	pub fn to_type(&self) -> Result<Type> {
		let code = self.type_code()?;
		let ty = match code {
			TypeCode::Decimal => Type::decimal(self.decimal_width()?, self.decimal_scale()?),
			TypeCode::List => Type::list(self.list_child()?.to_type()?),
			TypeCode::Array => Type::array(self.array_child()?.to_type()?, self.array_size()? as usize),
			TypeCode::Map => Type::map(self.map_key()?.to_type()?, self.map_value()?.to_type()?),
			TypeCode::Struct => {
				let count = self.struct_child_count()?;
				let mut fields = Vec::with_capacity(count);
				for index in 0..count {
					fields.push((self.struct_child_name(index)?, self.struct_child(index)?.to_type()?));
				}
				Type::Struct(fields)
			}
			TypeCode::Enum => Type::Enum(self.enum_dictionary()?),
			other => Type::from_primitive_code(other).ok_or_else(|| {
				Error::InvalidTypeConfiguration(format!("unsupported host type {other:?}"))
			})?,
		};
		Ok(ty)
	}

	fn expect(&self, expected: TypeCode) -> Result<()> {
		let actual = self.type_code()?;
		if actual != expected {
			return Err(Error::mismatch(format!("{expected:?}"), format!("{actual:?}")));
		}
		Ok(())
	}

	pub fn decimal_width(&self) -> Result<u8> {
		self.expect(TypeCode::Decimal)?;
		Ok((api().logical_type.decimal_width)(self.ptr))
	}

	pub fn decimal_scale(&self) -> Result<u8> {
		self.expect(TypeCode::Decimal)?;
		Ok((api().logical_type.decimal_scale)(self.ptr))
	}

	/// Type id of the integer the host stores decimals of this width in
	pub fn decimal_internal_type(&self) -> Result<TypeCode> {
		self.expect(TypeCode::Decimal)?;
		let raw = (api().logical_type.decimal_internal_type)(self.ptr);
		TypeCode::from_u32(raw).ok_or_else(|| unknown_type_id(raw))
	}

	pub fn list_child(&self) -> Result<LogicalType> {
		self.expect(TypeCode::List)?;
		Self::from_raw((api().logical_type.list_child_type)(self.ptr))
	}

	pub fn array_child(&self) -> Result<LogicalType> {
		self.expect(TypeCode::Array)?;
		Self::from_raw((api().logical_type.array_child_type)(self.ptr))
	}

	pub fn array_size(&self) -> Result<u64> {
		self.expect(TypeCode::Array)?;
		Ok((api().logical_type.array_size)(self.ptr))
	}

	pub fn map_key(&self) -> Result<LogicalType> {
		self.expect(TypeCode::Map)?;
		Self::from_raw((api().logical_type.map_key_type)(self.ptr))
	}

	pub fn map_value(&self) -> Result<LogicalType> {
		self.expect(TypeCode::Map)?;
		Self::from_raw((api().logical_type.map_value_type)(self.ptr))
	}

	pub fn struct_child_count(&self) -> Result<usize> {
		self.expect(TypeCode::Struct)?;
		Ok((api().logical_type.struct_child_count)(self.ptr) as usize)
	}

	pub fn struct_child_name(&self, index: usize) -> Result<String> {
		self.expect(TypeCode::Struct)?;
		take_host_string((api().logical_type.struct_child_name)(self.ptr, index as u64))
	}

	pub fn struct_child(&self, index: usize) -> Result<LogicalType> {
		self.expect(TypeCode::Struct)?;
		Self::from_raw((api().logical_type.struct_child_type)(self.ptr, index as u64))
	}

	pub fn enum_internal_type(&self) -> Result<TypeCode> {
		self.expect(TypeCode::Enum)?;
		let raw = (api().logical_type.enum_internal_type)(self.ptr);
		TypeCode::from_u32(raw).ok_or_else(|| unknown_type_id(raw))
	}

	pub fn enum_dictionary(&self) -> Result<Vec<String>> {
		self.expect(TypeCode::Enum)?;
		let size = (api().logical_type.enum_dictionary_size)(self.ptr);
		(0..size as u64)
			.map(|index| take_host_string((api().logical_type.enum_dictionary_value)(self.ptr, index)))
			.collect()
	}
}

impl Drop for LogicalType {
	fn drop(&mut self) {
		if !self.ptr.is_null() {
			(api().logical_type.destroy)(&mut self.ptr);
		}
	}
}

/// Type id of a logical type handle the caller does not own
pub(crate) fn type_code_of(ptr: *mut LogicalTypeFFI) -> Result<TypeCode> {
	if ptr.is_null() {
		return Err(Error::NullPointer("logical type"));
	}
	let raw = (api().logical_type.get_type_id)(ptr);
	TypeCode::from_u32(raw).ok_or_else(|| unknown_type_id(raw))
}

fn unknown_type_id(raw: u32) -> Error {
	Error::InvalidTypeConfiguration(format!("unknown host type id {raw}"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing;

	fn round_trip(ty: Type) {
		testing::install();
		let logical = LogicalType::from_type(&ty).unwrap();
		assert_eq!(logical.to_type().unwrap(), ty);
	}

	#[test]
	fn test_primitive_round_trip() {
		for ty in [
			Type::Boolean,
			Type::Int8,
			Type::Int16,
			Type::Int32,
			Type::Int64,
			Type::Int128,
			Type::UInt8,
			Type::UInt16,
			Type::UInt32,
			Type::UInt64,
			Type::UInt128,
			Type::Float32,
			Type::Float64,
			Type::Varchar,
			Type::Blob,
		] {
			round_trip(ty);
		}
	}

	#[test]
	fn test_composite_round_trip() {
		round_trip(Type::list(Type::Varchar));
		round_trip(Type::list(Type::list(Type::Int32)));
		round_trip(Type::array(Type::Float64, 3));
		round_trip(Type::map(Type::Varchar, Type::list(Type::Int64)));
		round_trip(Type::structure([("id", Type::Int64), ("tags", Type::list(Type::Varchar))]));
		round_trip(Type::enumeration(["red", "green", "blue"]));
		round_trip(Type::decimal(18, 4));
	}

	#[test]
	fn test_decimal_introspection() {
		testing::install();
		for (width, scale) in [(1, 0), (4, 2), (9, 9), (18, 0), (38, 10)] {
			let logical = LogicalType::from_type(&Type::decimal(width, scale)).unwrap();
			assert_eq!(logical.decimal_width().unwrap(), width);
			assert_eq!(logical.decimal_scale().unwrap(), scale);
		}
		let wide = LogicalType::from_type(&Type::decimal(38, 0)).unwrap();
		assert_eq!(wide.decimal_internal_type().unwrap(), TypeCode::HugeInt);
	}

	#[test]
	fn test_invalid_decimal() {
		testing::install();
		for (width, scale) in [(0, 0), (39, 0), (10, 11), (255, 1)] {
			let err = LogicalType::from_type(&Type::decimal(width, scale)).unwrap_err();
			assert!(matches!(err, Error::InvalidTypeConfiguration(_)), "{width},{scale}: {err}");
		}
	}

	#[test]
	fn test_children_released() {
		testing::install();
		let before = testing::live_logical_types();
		{
			let ty = Type::structure([
				("a", Type::map(Type::Varchar, Type::array(Type::Int8, 2))),
				("b", Type::enumeration(["x"])),
			]);
			let logical = LogicalType::from_type(&ty).unwrap();
			assert_eq!(testing::live_logical_types(), before + 1);
			assert_eq!(logical.to_type().unwrap(), ty);
			assert_eq!(testing::live_logical_types(), before + 1);
		}
		assert_eq!(testing::live_logical_types(), before);
	}

	#[test]
	fn test_introspection_on_wrong_type() {
		testing::install();
		let logical = LogicalType::from_type(&Type::Int32).unwrap();
		assert!(matches!(logical.decimal_width(), Err(Error::TypeMismatch { .. })));
		assert!(matches!(logical.list_child(), Err(Error::TypeMismatch { .. })));
	}
}
