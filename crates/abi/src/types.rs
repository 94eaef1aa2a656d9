// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! FFI-safe type definitions for extension-host communication

use core::ffi::c_void;

use crate::constants::STRING_INLINE_LENGTH;

// ============================================================================
// Opaque host handles
// ============================================================================

/// Opaque handle to a host database instance
#[repr(C)]
pub struct DatabaseFFI {
	_private: [u8; 0],
}

/// Opaque handle to a host connection
#[repr(C)]
pub struct ConnectionFFI {
	_private: [u8; 0],
}

/// Opaque handle to a host logical type descriptor
#[repr(C)]
pub struct LogicalTypeFFI {
	_private: [u8; 0],
}

/// Opaque handle to a host constant value
#[repr(C)]
pub struct ValueFFI {
	_private: [u8; 0],
}

/// Opaque handle to one column vector inside a data chunk
#[repr(C)]
pub struct VectorFFI {
	_private: [u8; 0],
}

/// Opaque handle to a batch of column vectors
#[repr(C)]
pub struct DataChunkFFI {
	_private: [u8; 0],
}

/// Opaque handle to a scalar function under construction
#[repr(C)]
pub struct ScalarFunctionFFI {
	_private: [u8; 0],
}

/// Opaque handle to a table function under construction
#[repr(C)]
pub struct TableFunctionFFI {
	_private: [u8; 0],
}

/// Opaque handle passed to a table function's bind callback
#[repr(C)]
pub struct BindInfoFFI {
	_private: [u8; 0],
}

/// Opaque handle passed to a table function's init callback
#[repr(C)]
pub struct InitInfoFFI {
	_private: [u8; 0],
}

/// Opaque handle passed to scalar and table function execute callbacks
#[repr(C)]
pub struct FunctionInfoFFI {
	_private: [u8; 0],
}

/// Opaque handle identifying an extension during load
#[repr(C)]
pub struct ExtensionInfoFFI {
	_private: [u8; 0],
}

// ============================================================================
// Callback signatures
// ============================================================================

/// Destructor the host invokes for extra info and bind data
pub type DeleteCallback = extern "C" fn(data: *mut c_void);

/// Scalar function body: read `input`, fill `output` for every input row
pub type ScalarFunctionCallback =
	extern "C" fn(info: *mut FunctionInfoFFI, input: *mut DataChunkFFI, output: *mut VectorFFI);

/// Table function bind callback, called once per query
pub type TableBindCallback = extern "C" fn(info: *mut BindInfoFFI);

/// Table function init callback, called once per scan
pub type TableInitCallback = extern "C" fn(info: *mut InitInfoFFI);

/// Table function body, called until it produces an empty chunk
pub type TableFunctionCallback = extern "C" fn(info: *mut FunctionInfoFFI, output: *mut DataChunkFFI);

// ============================================================================
// Type codes
// ============================================================================

/// Host type identifier (maps to the engine's logical type ids)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
	Invalid = 0,
	Boolean = 1,
	TinyInt = 2,
	SmallInt = 3,
	Integer = 4,
	BigInt = 5,
	UTinyInt = 6,
	USmallInt = 7,
	UInteger = 8,
	UBigInt = 9,
	Float = 10,
	Double = 11,
	Timestamp = 12,
	Date = 13,
	Time = 14,
	Interval = 15,
	HugeInt = 16,
	Varchar = 17,
	Blob = 18,
	Decimal = 19,
	TimestampS = 20,
	TimestampMs = 21,
	TimestampNs = 22,
	Enum = 23,
	List = 24,
	Struct = 25,
	Map = 26,
	Uuid = 27,
	Union = 28,
	Bit = 29,
	TimeTz = 30,
	TimestampTz = 31,
	UHugeInt = 32,
	Array = 33,
	Any = 34,
	VarInt = 35,
	SqlNull = 36,
}

impl TypeCode {
	/// Convert a raw host type id, `None` for ids this ABI does not know
	pub const fn from_u32(raw: u32) -> Option<Self> {
		Some(match raw {
			0 => Self::Invalid,
			1 => Self::Boolean,
			2 => Self::TinyInt,
			3 => Self::SmallInt,
			4 => Self::Integer,
			5 => Self::BigInt,
			6 => Self::UTinyInt,
			7 => Self::USmallInt,
			8 => Self::UInteger,
			9 => Self::UBigInt,
			10 => Self::Float,
			11 => Self::Double,
			12 => Self::Timestamp,
			13 => Self::Date,
			14 => Self::Time,
			15 => Self::Interval,
			16 => Self::HugeInt,
			17 => Self::Varchar,
			18 => Self::Blob,
			19 => Self::Decimal,
			20 => Self::TimestampS,
			21 => Self::TimestampMs,
			22 => Self::TimestampNs,
			23 => Self::Enum,
			24 => Self::List,
			25 => Self::Struct,
			26 => Self::Map,
			27 => Self::Uuid,
			28 => Self::Union,
			29 => Self::Bit,
			30 => Self::TimeTz,
			31 => Self::TimestampTz,
			32 => Self::UHugeInt,
			33 => Self::Array,
			34 => Self::Any,
			35 => Self::VarInt,
			36 => Self::SqlNull,
			_ => return None,
		})
	}

	/// Raw host type id
	pub const fn to_u32(self) -> u32 {
		self as u32
	}
}

// ============================================================================
// Value layouts
// ============================================================================

/// Signed 128-bit integer as laid out by the host
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HugeIntFFI {
	pub lower: u64,
	pub upper: i64,
}

impl From<i128> for HugeIntFFI {
	fn from(value: i128) -> Self {
		Self {
			lower: value as u64,
			upper: (value >> 64) as i64,
		}
	}
}

impl From<HugeIntFFI> for i128 {
	fn from(value: HugeIntFFI) -> Self {
		((value.upper as i128) << 64) | value.lower as i128
	}
}

/// Unsigned 128-bit integer as laid out by the host
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UHugeIntFFI {
	pub lower: u64,
	pub upper: u64,
}

impl From<u128> for UHugeIntFFI {
	fn from(value: u128) -> Self {
		Self {
			lower: value as u64,
			upper: (value >> 64) as u64,
		}
	}
}

impl From<UHugeIntFFI> for u128 {
	fn from(value: UHugeIntFFI) -> Self {
		((value.upper as u128) << 64) | value.lower as u128
	}
}

/// One entry of a list vector: the child rows `offset..offset + length`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListEntryFFI {
	pub offset: u64,
	pub length: u64,
}

/// Out-of-line string: length, 4-byte prefix and a pointer into host storage
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct StringPointerFFI {
	pub length: u32,
	pub prefix: [u8; 4],
	pub ptr: *mut u8,
}

/// Inline string: length and up to 12 payload bytes
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct StringInlinedFFI {
	pub length: u32,
	pub inlined: [u8; STRING_INLINE_LENGTH],
}

/// Varchar/blob cell inside a string vector's data buffer
#[repr(C)]
#[derive(Clone, Copy)]
pub union StringFFI {
	pub pointer: StringPointerFFI,
	pub inlined: StringInlinedFFI,
}

impl StringFFI {
	/// Build an inline cell. `bytes` must not exceed the inline length.
	pub fn inlined(bytes: &[u8]) -> Self {
		assert!(bytes.len() <= STRING_INLINE_LENGTH, "string too long to inline");
		let mut inlined = [0u8; STRING_INLINE_LENGTH];
		inlined[..bytes.len()].copy_from_slice(bytes);
		Self {
			inlined: StringInlinedFFI {
				length: bytes.len() as u32,
				inlined,
			},
		}
	}

	/// Build an out-of-line cell pointing at `len` bytes owned by the host
	pub fn pointer(ptr: *mut u8, len: usize) -> Self {
		let mut prefix = [0u8; 4];
		// SAFETY: caller hands over a buffer of at least `len` bytes
		let head = unsafe { core::slice::from_raw_parts(ptr, len.min(4)) };
		prefix[..head.len()].copy_from_slice(head);
		Self {
			pointer: StringPointerFFI {
				length: len as u32,
				prefix,
				ptr,
			},
		}
	}

	/// Payload length in bytes
	pub fn len(&self) -> usize {
		// SAFETY: both variants start with the length field
		unsafe { self.inlined.length as usize }
	}

	/// Check if the payload is empty
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Get the payload bytes
	///
	/// # Safety
	/// For out-of-line strings the pointer must still reference live host storage.
	pub unsafe fn as_bytes(&self) -> &[u8] {
		let len = self.len();
		if len <= STRING_INLINE_LENGTH {
			// SAFETY: short strings are always stored inline
			unsafe { &self.inlined.inlined[..len] }
		} else {
			// SAFETY: caller guarantees the pointer is live for `len` bytes
			unsafe { core::slice::from_raw_parts(self.pointer.ptr, len) }
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_type_code_round_trip() {
		for raw in 0..=36 {
			let code = TypeCode::from_u32(raw).unwrap();
			assert_eq!(code.to_u32(), raw);
		}
		assert_eq!(TypeCode::from_u32(99), None);
	}

	#[test]
	fn test_hugeint_layout() {
		let value: i128 = -170141183460469231731687303715884105728;
		let ffi = HugeIntFFI::from(value);
		assert_eq!(i128::from(ffi), value);

		let ffi = HugeIntFFI::from(-1i128);
		assert_eq!(ffi.lower, u64::MAX);
		assert_eq!(ffi.upper, -1);
	}

	#[test]
	fn test_uhugeint_layout() {
		let value = u128::MAX - 7;
		assert_eq!(u128::from(UHugeIntFFI::from(value)), value);
	}

	#[test]
	fn test_string_inlined() {
		let cell = StringFFI::inlined(b"duck");
		assert_eq!(cell.len(), 4);
		assert_eq!(unsafe { cell.as_bytes() }, b"duck");
	}

	#[test]
	fn test_string_pointer() {
		let mut payload = b"a string that does not fit inline".to_vec();
		let cell = StringFFI::pointer(payload.as_mut_ptr(), payload.len());
		assert_eq!(cell.len(), payload.len());
		assert_eq!(unsafe { cell.pointer.prefix }, *b"a st");
		assert_eq!(unsafe { cell.as_bytes() }, payload.as_slice());
	}

	#[test]
	fn test_string_layout_size() {
		assert_eq!(core::mem::size_of::<StringFFI>(), 16);
		assert_eq!(core::mem::size_of::<ListEntryFFI>(), 16);
		assert_eq!(core::mem::size_of::<HugeIntFFI>(), 16);
	}
}
