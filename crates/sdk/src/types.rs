// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Semantic value types exposed to extension authors

use std::{
	collections::{BTreeMap, HashMap},
	fmt::{self, Display, Formatter},
	ops::Deref,
};

use bigdecimal::BigDecimal;
use duckbridge_abi::{
	constants::DECIMAL_MAX_WIDTH,
	types::{HugeIntFFI, StringFFI, TypeCode, UHugeIntFFI},
};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Semantic type of a parameter, return value or output column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
	Boolean,
	Int8,
	Int16,
	Int32,
	Int64,
	Int128,
	UInt8,
	UInt16,
	UInt32,
	UInt64,
	UInt128,
	Float32,
	Float64,
	Decimal {
		width: u8,
		scale: u8,
	},
	Varchar,
	Blob,
	List(Box<Type>),
	Array(Box<Type>, usize),
	Map(Box<Type>, Box<Type>),
	Struct(Vec<(String, Type)>),
	Enum(Vec<String>),
}

impl Type {
	pub fn decimal(width: u8, scale: u8) -> Self {
		Type::Decimal {
			width,
			scale,
		}
	}

	pub fn list(element: Type) -> Self {
		Type::List(Box::new(element))
	}

	pub fn array(element: Type, size: usize) -> Self {
		Type::Array(Box::new(element), size)
	}

	pub fn map(key: Type, value: Type) -> Self {
		Type::Map(Box::new(key), Box::new(value))
	}

	pub fn structure<N: Into<String>>(fields: impl IntoIterator<Item = (N, Type)>) -> Self {
		Type::Struct(fields.into_iter().map(|(name, ty)| (name.into(), ty)).collect())
	}

	pub fn enumeration<S: Into<String>>(dictionary: impl IntoIterator<Item = S>) -> Self {
		Type::Enum(dictionary.into_iter().map(Into::into).collect())
	}

	/// Host type id for this type
	pub fn type_code(&self) -> TypeCode {
		match self {
			Type::Boolean => TypeCode::Boolean,
			Type::Int8 => TypeCode::TinyInt,
			Type::Int16 => TypeCode::SmallInt,
			Type::Int32 => TypeCode::Integer,
			Type::Int64 => TypeCode::BigInt,
			Type::Int128 => TypeCode::HugeInt,
			Type::UInt8 => TypeCode::UTinyInt,
			Type::UInt16 => TypeCode::USmallInt,
			Type::UInt32 => TypeCode::UInteger,
			Type::UInt64 => TypeCode::UBigInt,
			Type::UInt128 => TypeCode::UHugeInt,
			Type::Float32 => TypeCode::Float,
			Type::Float64 => TypeCode::Double,
			Type::Decimal {
				..
			} => TypeCode::Decimal,
			Type::Varchar => TypeCode::Varchar,
			Type::Blob => TypeCode::Blob,
			Type::List(_) => TypeCode::List,
			Type::Array(..) => TypeCode::Array,
			Type::Map(..) => TypeCode::Map,
			Type::Struct(_) => TypeCode::Struct,
			Type::Enum(_) => TypeCode::Enum,
		}
	}

	/// The primitive type for a host type id, `None` for composite or unsupported ids
	pub fn from_primitive_code(code: TypeCode) -> Option<Self> {
		Some(match code {
			TypeCode::Boolean => Type::Boolean,
			TypeCode::TinyInt => Type::Int8,
			TypeCode::SmallInt => Type::Int16,
			TypeCode::Integer => Type::Int32,
			TypeCode::BigInt => Type::Int64,
			TypeCode::HugeInt => Type::Int128,
			TypeCode::UTinyInt => Type::UInt8,
			TypeCode::USmallInt => Type::UInt16,
			TypeCode::UInteger => Type::UInt32,
			TypeCode::UBigInt => Type::UInt64,
			TypeCode::UHugeInt => Type::UInt128,
			TypeCode::Float => Type::Float32,
			TypeCode::Double => Type::Float64,
			TypeCode::Varchar => Type::Varchar,
			TypeCode::Blob => Type::Blob,
			_ => return None,
		})
	}

	/// Byte width of one element in a flat vector, `None` for nested and string types
	pub fn fixed_width(&self) -> Option<usize> {
		Some(match self {
			Type::Boolean | Type::Int8 | Type::UInt8 => 1,
			Type::Int16 | Type::UInt16 => 2,
			Type::Int32 | Type::UInt32 | Type::Float32 => 4,
			Type::Int64 | Type::UInt64 | Type::Float64 => 8,
			Type::Int128 | Type::UInt128 => 16,
			Type::Decimal {
				width,
				..
			} => decimal_storage(*width).1,
			Type::Enum(dictionary) => enum_storage(dictionary.len()).1,
			_ => return None,
		})
	}

	/// Check the structural constraints the host places on a type
	pub fn validate(&self) -> Result<()> {
		match self {
			Type::Decimal {
				width,
				scale,
			} => {
				if *width == 0 || *width > DECIMAL_MAX_WIDTH {
					return Err(Error::InvalidTypeConfiguration(format!(
						"decimal width must be between 1 and {DECIMAL_MAX_WIDTH}, got {width}"
					)));
				}
				if scale > width {
					return Err(Error::InvalidTypeConfiguration(format!(
						"decimal scale {scale} exceeds width {width}"
					)));
				}
				Ok(())
			}
			Type::List(element) => element.validate(),
			Type::Array(element, size) => {
				if *size == 0 {
					return Err(Error::InvalidTypeConfiguration("array size must be positive".to_string()));
				}
				element.validate()
			}
			Type::Map(key, value) => {
				key.validate()?;
				value.validate()
			}
			Type::Struct(fields) => {
				if fields.is_empty() {
					return Err(Error::InvalidTypeConfiguration(
						"struct must have at least one field".to_string(),
					));
				}
				for (i, (name, ty)) in fields.iter().enumerate() {
					check_name(name)?;
					if fields[..i].iter().any(|(other, _)| other == name) {
						return Err(Error::InvalidTypeConfiguration(format!(
							"duplicate struct field '{name}'"
						)));
					}
					ty.validate()?;
				}
				Ok(())
			}
			Type::Enum(dictionary) => {
				if dictionary.is_empty() {
					return Err(Error::InvalidTypeConfiguration("enum dictionary is empty".to_string()));
				}
				if dictionary.len() > u32::MAX as usize {
					return Err(Error::InvalidTypeConfiguration("enum dictionary is too large".to_string()));
				}
				for (i, entry) in dictionary.iter().enumerate() {
					check_name(entry)?;
					if dictionary[..i].contains(entry) {
						return Err(Error::InvalidTypeConfiguration(format!(
							"duplicate enum entry '{entry}'"
						)));
					}
				}
				Ok(())
			}
			_ => Ok(()),
		}
	}
}

fn check_name(name: &str) -> Result<()> {
	if name.contains('\0') {
		return Err(Error::InvalidTypeConfiguration(format!("name '{}' contains a NUL byte", name.escape_debug())));
	}
	Ok(())
}

/// Physical storage of a decimal of the given width: type id and byte width
pub fn decimal_storage(width: u8) -> (TypeCode, usize) {
	match width {
		0..=4 => (TypeCode::SmallInt, 2),
		5..=9 => (TypeCode::Integer, 4),
		10..=18 => (TypeCode::BigInt, 8),
		_ => (TypeCode::HugeInt, 16),
	}
}

/// Physical storage of an enum with the given dictionary size: type id and byte width
pub fn enum_storage(size: usize) -> (TypeCode, usize) {
	if size <= u8::MAX as usize {
		(TypeCode::UTinyInt, 1)
	} else if size <= u16::MAX as usize {
		(TypeCode::USmallInt, 2)
	} else {
		(TypeCode::UInteger, 4)
	}
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Type::Boolean => f.write_str("BOOLEAN"),
			Type::Int8 => f.write_str("TINYINT"),
			Type::Int16 => f.write_str("SMALLINT"),
			Type::Int32 => f.write_str("INTEGER"),
			Type::Int64 => f.write_str("BIGINT"),
			Type::Int128 => f.write_str("HUGEINT"),
			Type::UInt8 => f.write_str("UTINYINT"),
			Type::UInt16 => f.write_str("USMALLINT"),
			Type::UInt32 => f.write_str("UINTEGER"),
			Type::UInt64 => f.write_str("UBIGINT"),
			Type::UInt128 => f.write_str("UHUGEINT"),
			Type::Float32 => f.write_str("FLOAT"),
			Type::Float64 => f.write_str("DOUBLE"),
			Type::Decimal {
				width,
				scale,
			} => write!(f, "DECIMAL({width},{scale})"),
			Type::Varchar => f.write_str("VARCHAR"),
			Type::Blob => f.write_str("BLOB"),
			Type::List(element) => write!(f, "{element}[]"),
			Type::Array(element, size) => write!(f, "{element}[{size}]"),
			Type::Map(key, value) => write!(f, "MAP({key}, {value})"),
			Type::Struct(fields) => {
				f.write_str("STRUCT(")?;
				for (i, (name, ty)) in fields.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{name} {ty}")?;
				}
				f.write_str(")")
			}
			Type::Enum(dictionary) => {
				f.write_str("ENUM(")?;
				for (i, entry) in dictionary.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "'{entry}'")?;
				}
				f.write_str(")")
			}
		}
	}
}

/// Maps a Rust type to its semantic [`Type`]
pub trait GetType {
	fn get_type() -> Type;
}

macro_rules! impl_get_type {
	($($ty:ty => $variant:ident),* $(,)?) => {
		$(
			impl GetType for $ty {
				fn get_type() -> Type {
					Type::$variant
				}
			}
		)*
	};
}

impl_get_type! {
	bool => Boolean,
	i8 => Int8,
	i16 => Int16,
	i32 => Int32,
	i64 => Int64,
	i128 => Int128,
	u8 => UInt8,
	u16 => UInt16,
	u32 => UInt32,
	u64 => UInt64,
	u128 => UInt128,
	f32 => Float32,
	f64 => Float64,
	String => Varchar,
	Blob => Blob,
}

impl GetType for &str {
	fn get_type() -> Type {
		Type::Varchar
	}
}

impl<T: GetType> GetType for Option<T> {
	fn get_type() -> Type {
		T::get_type()
	}
}

impl<T: GetType> GetType for Vec<T> {
	fn get_type() -> Type {
		Type::list(T::get_type())
	}
}

impl<T: GetType, const N: usize> GetType for [T; N] {
	fn get_type() -> Type {
		Type::array(T::get_type(), N)
	}
}

impl<K: GetType, V: GetType> GetType for BTreeMap<K, V> {
	fn get_type() -> Type {
		Type::map(K::get_type(), V::get_type())
	}
}

impl<K: GetType, V: GetType, S> GetType for HashMap<K, V, S> {
	fn get_type() -> Type {
		Type::map(K::get_type(), V::get_type())
	}
}

/// Binary payload, written to and read from BLOB columns
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Blob(pub Vec<u8>);

impl Blob {
	pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
		Self(bytes.into())
	}

	pub fn into_inner(self) -> Vec<u8> {
		self.0
	}
}

impl Deref for Blob {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		&self.0
	}
}

impl From<Vec<u8>> for Blob {
	fn from(bytes: Vec<u8>) -> Self {
		Self(bytes)
	}
}

impl From<&[u8]> for Blob {
	fn from(bytes: &[u8]) -> Self {
		Self(bytes.to_vec())
	}
}

/// Fixed-point value in the host's representation: an unscaled integer and a scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decimal {
	pub unscaled: i128,
	pub scale: u8,
}

impl Decimal {
	pub fn new(unscaled: i128, scale: u8) -> Self {
		Self {
			unscaled,
			scale,
		}
	}

	pub fn to_big_decimal(&self) -> BigDecimal {
		BigDecimal::new(BigInt::from(self.unscaled), self.scale as i64)
	}
}

impl From<Decimal> for BigDecimal {
	fn from(value: Decimal) -> Self {
		value.to_big_decimal()
	}
}

impl Display for Decimal {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.to_big_decimal(), f)
	}
}

// ============================================================================
// Flat vector element types
// ============================================================================

/// A Rust type stored by value in a flat vector buffer
///
/// `Native` is the in-buffer layout the host uses for the type.
pub trait Primitive: Copy + GetType {
	type Native: Copy;

	fn to_native(self) -> Self::Native;

	fn from_native(native: Self::Native) -> Self;
}

macro_rules! impl_primitive_identity {
	($($ty:ty),* $(,)?) => {
		$(
			impl Primitive for $ty {
				type Native = $ty;

				fn to_native(self) -> $ty {
					self
				}

				fn from_native(native: $ty) -> Self {
					native
				}
			}
		)*
	};
}

impl_primitive_identity!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl Primitive for bool {
	type Native = u8;

	fn to_native(self) -> u8 {
		self as u8
	}

	fn from_native(native: u8) -> Self {
		native != 0
	}
}

impl Primitive for i128 {
	type Native = HugeIntFFI;

	fn to_native(self) -> HugeIntFFI {
		HugeIntFFI::from(self)
	}

	fn from_native(native: HugeIntFFI) -> Self {
		native.into()
	}
}

impl Primitive for u128 {
	type Native = UHugeIntFFI;

	fn to_native(self) -> UHugeIntFFI {
		UHugeIntFFI::from(self)
	}

	fn from_native(native: UHugeIntFFI) -> Self {
		native.into()
	}
}

/// Size of one string cell, used for varchar and blob vectors
pub const STRING_CELL_WIDTH: usize = size_of::<StringFFI>();
