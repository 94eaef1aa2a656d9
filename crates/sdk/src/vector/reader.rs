// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use duckbridge_abi::{
	constants::VALIDITY_BITS_PER_ENTRY,
	types::{DataChunkFFI, HugeIntFFI, StringFFI, VectorFFI},
};

use crate::{
	api::api,
	error::{Error, Result},
	logical_type::LogicalType,
	types::{Blob, Decimal, Primitive, Type, decimal_storage},
};

/// Read-only view of a scalar function's input chunk
#[derive(Debug)]
pub struct DataChunkReader {
	chunk: *mut DataChunkFFI,
	len: usize,
	columns: Vec<VectorReader>,
}

impl DataChunkReader {
	pub(crate) fn new(chunk: *mut DataChunkFFI) -> Result<Self> {
		if chunk.is_null() {
			return Err(Error::NullPointer("data chunk"));
		}
		let callbacks = &api().chunk;
		let len = (callbacks.get_size)(chunk) as usize;
		let columns = (0..(callbacks.get_column_count)(chunk))
			.map(|idx| VectorReader::new((callbacks.get_vector)(chunk, idx), len))
			.collect::<Result<Vec<_>>>()?;

		Ok(Self {
			chunk,
			len,
			columns,
		})
	}

	pub fn as_ptr(&self) -> *mut DataChunkFFI {
		self.chunk
	}

	/// Number of rows in the chunk
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn column_count(&self) -> usize {
		self.columns.len()
	}

	pub fn column(&self, index: usize) -> Result<&VectorReader> {
		self.columns.get(index).ok_or_else(|| {
			Error::Execution(format!("column {index} out of range, chunk has {} columns", self.columns.len()))
		})
	}

	pub fn columns(&self) -> &[VectorReader] {
		&self.columns
	}
}

/// Read-only view of one input vector
#[derive(Debug)]
pub struct VectorReader {
	vector: *mut VectorFFI,
	ty: Type,
	len: usize,
	data: *const u8,
	validity: *const u64,
}

impl VectorReader {
	pub(crate) fn new(vector: *mut VectorFFI, len: usize) -> Result<Self> {
		if vector.is_null() {
			return Err(Error::NullPointer("vector"));
		}
		let callbacks = &api().vector;
		let ty = LogicalType::from_raw((callbacks.get_column_type)(vector))?.to_type()?;

		Ok(Self {
			vector,
			ty,
			len,
			data: (callbacks.get_data)(vector) as *const u8,
			validity: (callbacks.get_validity)(vector),
		})
	}

	pub fn as_ptr(&self) -> *mut VectorFFI {
		self.vector
	}

	pub fn ty(&self) -> &Type {
		&self.ty
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Panics if `row` is not within the chunk.
	pub fn is_valid(&self, row: usize) -> bool {
		assert!(row < self.len, "row {row} out of range for chunk of {} rows", self.len);
		if self.validity.is_null() {
			return true;
		}
		let row = row as u64;
		// SAFETY: the mask covers every row of the chunk
		let entry = unsafe { *self.validity.add((row / VALIDITY_BITS_PER_ENTRY) as usize) };
		entry & (1 << (row % VALIDITY_BITS_PER_ENTRY)) != 0
	}

	/// Value at `row`, `None` when the row is NULL
	///
	/// Panics if `row` is not within the chunk.
	pub fn get<T: ReadValue>(&self, row: usize) -> Result<Option<T>> {
		assert!(row < self.len, "row {row} out of range for chunk of {} rows", self.len);
		if !self.is_valid(row) {
			return Ok(None);
		}
		T::read_from(self, row).map(Some)
	}

	fn data(&self) -> Result<*const u8> {
		if self.data.is_null() {
			return Err(Error::NullPointer("vector data"));
		}
		Ok(self.data)
	}

	fn string_bytes(&self, row: usize) -> Result<&[u8]> {
		let cell = self.data()?.cast::<StringFFI>();
		// SAFETY: string vectors hold `len` cells whose payload outlives the chunk
		Ok(unsafe { (*cell.add(row)).as_bytes() })
	}
}

/// A Rust value that can be read out of a [`VectorReader`]
pub trait ReadValue: Sized {
	fn read_from(reader: &VectorReader, row: usize) -> Result<Self>;
}

macro_rules! impl_read_primitive {
	($($ty:ty),* $(,)?) => {
		$(
			impl ReadValue for $ty {
				fn read_from(reader: &VectorReader, row: usize) -> Result<Self> {
					read_primitive(reader, row)
				}
			}
		)*
	};
}

impl_read_primitive!(bool, i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64);

fn read_primitive<T: Primitive>(reader: &VectorReader, row: usize) -> Result<T> {
	let expected = T::get_type();
	if reader.ty != expected {
		return Err(Error::mismatch_type(&expected, &reader.ty));
	}
	let data = reader.data()?.cast::<T::Native>();
	// SAFETY: the buffer holds `len` elements of `T::Native`
	Ok(T::from_native(unsafe { data.add(row).read() }))
}

impl ReadValue for String {
	fn read_from(reader: &VectorReader, row: usize) -> Result<Self> {
		if reader.ty != Type::Varchar {
			return Err(Error::mismatch_type(&Type::Varchar, &reader.ty));
		}
		let bytes = reader.string_bytes(row)?;
		String::from_utf8(bytes.to_vec()).map_err(|_| Error::Execution(format!("row {row} is not valid UTF-8")))
	}
}

impl ReadValue for Blob {
	fn read_from(reader: &VectorReader, row: usize) -> Result<Self> {
		if reader.ty != Type::Blob {
			return Err(Error::mismatch_type(&Type::Blob, &reader.ty));
		}
		Ok(Blob::from(reader.string_bytes(row)?))
	}
}

impl ReadValue for Decimal {
	fn read_from(reader: &VectorReader, row: usize) -> Result<Self> {
		let Type::Decimal {
			width,
			scale,
		} = reader.ty
		else {
			return Err(Error::mismatch("DECIMAL", &reader.ty));
		};
		let data = reader.data()?;
		// SAFETY: the buffer holds `len` values of the width's storage type
		let unscaled = unsafe {
			match decimal_storage(width).1 {
				2 => data.cast::<i16>().add(row).read() as i128,
				4 => data.cast::<i32>().add(row).read() as i128,
				8 => data.cast::<i64>().add(row).read() as i128,
				_ => data.cast::<HugeIntFFI>().add(row).read().into(),
			}
		};
		Ok(Decimal::new(unscaled, scale))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{self, HostValue, vector::MockChunk};

	fn chunk(ty: Type, values: &[HostValue]) -> MockChunk {
		testing::install();
		let mut chunk = MockChunk::new(&[ty], values.len());
		for (row, value) in values.iter().enumerate() {
			chunk.vectors[0].set(row, value);
		}
		chunk.size = values.len();
		chunk
	}

	#[test]
	fn test_get_with_nulls() {
		let mut chunk = chunk(Type::Int64, &[HostValue::Int64(1), HostValue::Null(Type::Int64), HostValue::Int64(3)]);
		let reader = DataChunkReader::new(chunk.as_ptr()).unwrap();
		let column = reader.column(0).unwrap();

		assert_eq!(reader.len(), 3);
		assert_eq!(column.ty(), &Type::Int64);
		assert!(column.is_valid(0));
		assert!(!column.is_valid(1));
		assert_eq!(column.get::<i64>(0).unwrap(), Some(1));
		assert_eq!(column.get::<i64>(1).unwrap(), None);
		assert_eq!(column.get::<i64>(2).unwrap(), Some(3));
		assert!(column.get::<i32>(0).is_err());
	}

	#[test]
	fn test_missing_column() {
		let mut chunk = chunk(Type::Varchar, &[HostValue::Varchar("a".into())]);
		let reader = DataChunkReader::new(chunk.as_ptr()).unwrap();
		assert!(reader.column(1).is_err());
	}

	#[test]
	#[should_panic(expected = "out of range")]
	fn test_is_valid_out_of_range() {
		let mut chunk = chunk(Type::Int64, &[HostValue::Int64(1), HostValue::Null(Type::Int64)]);
		let reader = DataChunkReader::new(chunk.as_ptr()).unwrap();
		reader.column(0).unwrap().is_valid(1 << 40);
	}

	#[test]
	#[should_panic(expected = "out of range")]
	fn test_get_out_of_range() {
		let mut chunk = chunk(Type::Int64, &[HostValue::Int64(1)]);
		let reader = DataChunkReader::new(chunk.as_ptr()).unwrap();
		let _ = reader.column(0).unwrap().get::<i64>(1);
	}
}
