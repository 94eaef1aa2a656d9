// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use crate::types::{Decimal, Type};

/// A single value as the mock host sees it: bind arguments going in, cells coming out
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
	/// NULL of the given type
	Null(Type),
	Boolean(bool),
	Int8(i8),
	Int16(i16),
	Int32(i32),
	Int64(i64),
	Int128(i128),
	UInt8(u8),
	UInt16(u16),
	UInt32(u32),
	UInt64(u64),
	UInt128(u128),
	Float32(f32),
	Float64(f64),
	Decimal(Decimal),
	Varchar(String),
	Blob(Vec<u8>),
	Enum(String),
	List(Vec<HostValue>),
	Array(Vec<HostValue>),
	Map(Vec<(HostValue, HostValue)>),
	Struct(Vec<(String, HostValue)>),
}

impl HostValue {
	/// Type of a scalar value; nested values and decimals carry no complete type
	pub fn scalar_type(&self) -> Option<Type> {
		Some(match self {
			HostValue::Null(ty) => ty.clone(),
			HostValue::Boolean(_) => Type::Boolean,
			HostValue::Int8(_) => Type::Int8,
			HostValue::Int16(_) => Type::Int16,
			HostValue::Int32(_) => Type::Int32,
			HostValue::Int64(_) => Type::Int64,
			HostValue::Int128(_) => Type::Int128,
			HostValue::UInt8(_) => Type::UInt8,
			HostValue::UInt16(_) => Type::UInt16,
			HostValue::UInt32(_) => Type::UInt32,
			HostValue::UInt64(_) => Type::UInt64,
			HostValue::UInt128(_) => Type::UInt128,
			HostValue::Float32(_) => Type::Float32,
			HostValue::Float64(_) => Type::Float64,
			HostValue::Varchar(_) => Type::Varchar,
			HostValue::Blob(_) => Type::Blob,
			_ => return None,
		})
	}

	pub fn is_null(&self) -> bool {
		matches!(self, HostValue::Null(_))
	}

	// Integer view used by the host's implicit numeric casts
	pub(crate) fn as_i128(&self) -> i128 {
		match self {
			HostValue::Boolean(v) => *v as i128,
			HostValue::Int8(v) => *v as i128,
			HostValue::Int16(v) => *v as i128,
			HostValue::Int32(v) => *v as i128,
			HostValue::Int64(v) => *v as i128,
			HostValue::Int128(v) => *v,
			HostValue::UInt8(v) => *v as i128,
			HostValue::UInt16(v) => *v as i128,
			HostValue::UInt32(v) => *v as i128,
			HostValue::UInt64(v) => *v as i128,
			HostValue::UInt128(v) => *v as i128,
			HostValue::Float32(v) => *v as i128,
			HostValue::Float64(v) => *v as i128,
			_ => 0,
		}
	}

	pub(crate) fn as_f64(&self) -> f64 {
		match self {
			HostValue::Float32(v) => *v as f64,
			HostValue::Float64(v) => *v,
			HostValue::UInt128(v) => *v as f64,
			other => other.as_i128() as f64,
		}
	}
}

impl Display for HostValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			HostValue::Null(_) => f.write_str("NULL"),
			HostValue::Boolean(v) => write!(f, "{v}"),
			HostValue::Float32(v) => write!(f, "{v}"),
			HostValue::Float64(v) => write!(f, "{v}"),
			HostValue::UInt128(v) => write!(f, "{v}"),
			HostValue::Decimal(v) => write!(f, "{v}"),
			HostValue::Varchar(v) | HostValue::Enum(v) => f.write_str(v),
			HostValue::Blob(bytes) => {
				for byte in bytes {
					write!(f, "\\x{byte:02X}")?;
				}
				Ok(())
			}
			HostValue::List(items) | HostValue::Array(items) => {
				f.write_str("[")?;
				for (idx, item) in items.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{item}")?;
				}
				f.write_str("]")
			}
			HostValue::Map(entries) => {
				f.write_str("{")?;
				for (idx, (key, value)) in entries.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{key}={value}")?;
				}
				f.write_str("}")
			}
			HostValue::Struct(fields) => {
				f.write_str("{")?;
				for (idx, (name, value)) in fields.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "'{name}': {value}")?;
				}
				f.write_str("}")
			}
			other => write!(f, "{}", other.as_i128()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display() {
		assert_eq!(HostValue::Int64(-3).to_string(), "-3");
		assert_eq!(HostValue::Null(Type::Int64).to_string(), "NULL");
		assert_eq!(HostValue::Blob(vec![0xAB, 0x01]).to_string(), "\\xAB\\x01");
		assert_eq!(
			HostValue::List(vec![HostValue::Int32(1), HostValue::Null(Type::Int32)]).to_string(),
			"[1, NULL]"
		);
		assert_eq!(
			HostValue::Struct(vec![("a".into(), HostValue::Varchar("x".into()))]).to_string(),
			"{'a': x}"
		);
	}

	#[test]
	fn test_scalar_type() {
		assert_eq!(HostValue::Varchar(String::new()).scalar_type(), Some(Type::Varchar));
		assert_eq!(HostValue::Null(Type::Blob).scalar_type(), Some(Type::Blob));
		assert_eq!(HostValue::List(vec![]).scalar_type(), None);
	}
}
