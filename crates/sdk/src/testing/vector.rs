// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! In-memory vectors and chunks laid out the way the host lays them out

use duckbridge_abi::{
	constants::STRING_INLINE_LENGTH,
	types::{DataChunkFFI, HugeIntFFI, ListEntryFFI, StringFFI, UHugeIntFFI, VectorFFI},
};

use super::HostValue;
use crate::types::{Decimal, STRING_CELL_WIDTH, Type, decimal_storage, enum_storage};

/// One column vector
///
/// Cells live in a `u128` backed buffer so every element type is suitably aligned.
/// Out-of-line strings are kept alive in `heap` until the vector is dropped.
pub(crate) struct MockVector {
	pub(crate) ty: Type,
	pub(crate) capacity: usize,
	data: Vec<u128>,
	validity: Option<Vec<u64>>,
	heap: Vec<Box<[u8]>>,
	pub(crate) child: Option<Box<MockVector>>,
	pub(crate) children: Vec<MockVector>,
	pub(crate) list_size: usize,
}

impl MockVector {
	pub(crate) fn new(ty: &Type, capacity: usize) -> Self {
		let mut child = None;
		let mut children = Vec::new();
		match ty {
			Type::List(element) => child = Some(Box::new(MockVector::new(element, capacity))),
			Type::Map(key, value) => {
				let entry = Type::structure([("key", (**key).clone()), ("value", (**value).clone())]);
				child = Some(Box::new(MockVector::new(&entry, capacity)));
			}
			Type::Array(element, size) => child = Some(Box::new(MockVector::new(element, capacity * size))),
			Type::Struct(fields) => {
				children = fields.iter().map(|(_, field)| MockVector::new(field, capacity)).collect();
			}
			_ => {}
		}

		Self {
			ty: ty.clone(),
			capacity,
			data: vec![0; words(capacity * cell_width(ty))],
			validity: None,
			heap: Vec::new(),
			child,
			children,
			list_size: 0,
		}
	}

	pub(crate) fn as_ptr(&mut self) -> *mut VectorFFI {
		(self as *mut Self).cast()
	}

	pub(crate) fn data_ptr(&mut self) -> *mut u8 {
		self.data.as_mut_ptr().cast()
	}

	pub(crate) fn validity_ptr(&mut self) -> *mut u64 {
		match &mut self.validity {
			Some(mask) => mask.as_mut_ptr(),
			None => std::ptr::null_mut(),
		}
	}

	pub(crate) fn ensure_validity(&mut self) {
		if self.validity.is_none() {
			self.validity = Some(vec![u64::MAX; self.capacity.div_ceil(64)]);
		}
	}

	pub(crate) fn is_valid(&self, row: usize) -> bool {
		match &self.validity {
			Some(mask) => mask[row / 64] & (1 << (row % 64)) != 0,
			None => true,
		}
	}

	/// Grow to hold `capacity` rows; existing cells keep their values
	pub(crate) fn reserve(&mut self, capacity: usize) {
		if capacity <= self.capacity {
			return;
		}
		self.capacity = capacity;
		self.data.resize(words(capacity * cell_width(&self.ty)), 0);
		if let Some(mask) = &mut self.validity {
			mask.resize(capacity.div_ceil(64), u64::MAX);
		}
		if let Type::Array(_, size) = self.ty {
			if let Some(child) = &mut self.child {
				child.reserve(capacity * size);
			}
		}
		for child in &mut self.children {
			child.reserve(capacity);
		}
	}

	pub(crate) fn assign(&mut self, row: usize, bytes: &[u8]) {
		let cell = if bytes.len() <= STRING_INLINE_LENGTH {
			StringFFI::inlined(bytes)
		} else {
			let mut owned: Box<[u8]> = bytes.into();
			let cell = StringFFI::pointer(owned.as_mut_ptr(), owned.len());
			self.heap.push(owned);
			cell
		};
		self.put(row, cell);
	}

	/// Store `value` at `row`, the way the host fills an input vector
	pub(crate) fn set(&mut self, row: usize, value: &HostValue) {
		if let HostValue::Null(_) = value {
			self.ensure_validity();
			if let Some(mask) = &mut self.validity {
				mask[row / 64] &= !(1 << (row % 64));
			}
			for child in &mut self.children {
				child.set(row, value);
			}
			return;
		}
		if let Some(mask) = &mut self.validity {
			mask[row / 64] |= 1 << (row % 64);
		}

		let ty = self.ty.clone();
		match (&ty, value) {
			(Type::Boolean, HostValue::Boolean(v)) => self.put(row, *v as u8),
			(Type::Int8, HostValue::Int8(v)) => self.put(row, *v),
			(Type::Int16, HostValue::Int16(v)) => self.put(row, *v),
			(Type::Int32, HostValue::Int32(v)) => self.put(row, *v),
			(Type::Int64, HostValue::Int64(v)) => self.put(row, *v),
			(Type::Int128, HostValue::Int128(v)) => self.put(row, HugeIntFFI::from(*v)),
			(Type::UInt8, HostValue::UInt8(v)) => self.put(row, *v),
			(Type::UInt16, HostValue::UInt16(v)) => self.put(row, *v),
			(Type::UInt32, HostValue::UInt32(v)) => self.put(row, *v),
			(Type::UInt64, HostValue::UInt64(v)) => self.put(row, *v),
			(Type::UInt128, HostValue::UInt128(v)) => self.put(row, UHugeIntFFI::from(*v)),
			(Type::Float32, HostValue::Float32(v)) => self.put(row, *v),
			(Type::Float64, HostValue::Float64(v)) => self.put(row, *v),
			(Type::Varchar, HostValue::Varchar(v)) => self.assign(row, v.as_bytes()),
			(Type::Blob, HostValue::Blob(v)) => self.assign(row, v),
			(
				Type::Decimal {
					width,
					..
				},
				HostValue::Decimal(v),
			) => match decimal_storage(*width).1 {
				2 => self.put(row, v.unscaled as i16),
				4 => self.put(row, v.unscaled as i32),
				8 => self.put(row, v.unscaled as i64),
				_ => self.put(row, HugeIntFFI::from(v.unscaled)),
			},
			(Type::Enum(dictionary), HostValue::Enum(v)) => {
				let idx = dictionary.iter().position(|entry| entry == v).expect("value not in enum dictionary");
				match enum_storage(dictionary.len()).1 {
					1 => self.put(row, idx as u8),
					2 => self.put(row, idx as u16),
					_ => self.put(row, idx as u32),
				}
			}
			(Type::List(_), HostValue::List(items)) => {
				let offset = self.list_size;
				let child = self.child.as_mut().expect("list vector without child");
				child.reserve(offset + items.len());
				for (idx, item) in items.iter().enumerate() {
					child.set(offset + idx, item);
				}
				self.finish_list(row, offset, items.len());
			}
			(Type::Map(..), HostValue::Map(entries)) => {
				let offset = self.list_size;
				let child = self.child.as_mut().expect("map vector without child");
				child.reserve(offset + entries.len());
				for (idx, (key, value)) in entries.iter().enumerate() {
					child.children[0].set(offset + idx, key);
					child.children[1].set(offset + idx, value);
				}
				self.finish_list(row, offset, entries.len());
			}
			(Type::Array(_, size), HostValue::Array(items)) => {
				assert_eq!(items.len(), *size, "array value of the wrong length");
				let child = self.child.as_mut().expect("array vector without child");
				for (idx, item) in items.iter().enumerate() {
					child.set(row * size + idx, item);
				}
			}
			(Type::Struct(fields), HostValue::Struct(values)) => {
				for (idx, (name, _)) in fields.iter().enumerate() {
					let (_, value) =
						values.iter().find(|(field, _)| field == name).expect("struct value is missing a field");
					self.children[idx].set(row, value);
				}
			}
			(ty, value) => panic!("cannot store {value:?} in a {ty} vector"),
		}
	}

	/// Read the cell at `row` back as a value
	pub(crate) fn get(&self, row: usize) -> HostValue {
		if !self.is_valid(row) {
			return HostValue::Null(self.ty.clone());
		}
		match &self.ty {
			Type::Boolean => HostValue::Boolean(self.fetch::<u8>(row) != 0),
			Type::Int8 => HostValue::Int8(self.fetch(row)),
			Type::Int16 => HostValue::Int16(self.fetch(row)),
			Type::Int32 => HostValue::Int32(self.fetch(row)),
			Type::Int64 => HostValue::Int64(self.fetch(row)),
			Type::Int128 => HostValue::Int128(self.fetch::<HugeIntFFI>(row).into()),
			Type::UInt8 => HostValue::UInt8(self.fetch(row)),
			Type::UInt16 => HostValue::UInt16(self.fetch(row)),
			Type::UInt32 => HostValue::UInt32(self.fetch(row)),
			Type::UInt64 => HostValue::UInt64(self.fetch(row)),
			Type::UInt128 => HostValue::UInt128(self.fetch::<UHugeIntFFI>(row).into()),
			Type::Float32 => HostValue::Float32(self.fetch(row)),
			Type::Float64 => HostValue::Float64(self.fetch(row)),
			Type::Varchar => HostValue::Varchar(String::from_utf8_lossy(&self.bytes(row)).into_owned()),
			Type::Blob => HostValue::Blob(self.bytes(row)),
			Type::Decimal {
				width,
				scale,
			} => {
				let unscaled = match decimal_storage(*width).1 {
					2 => self.fetch::<i16>(row) as i128,
					4 => self.fetch::<i32>(row) as i128,
					8 => self.fetch::<i64>(row) as i128,
					_ => self.fetch::<HugeIntFFI>(row).into(),
				};
				HostValue::Decimal(Decimal::new(unscaled, *scale))
			}
			Type::Enum(dictionary) => {
				let idx = match enum_storage(dictionary.len()).1 {
					1 => self.fetch::<u8>(row) as usize,
					2 => self.fetch::<u16>(row) as usize,
					_ => self.fetch::<u32>(row) as usize,
				};
				HostValue::Enum(dictionary[idx].clone())
			}
			Type::List(_) => {
				let (child, range) = self.list_range(row);
				HostValue::List(range.map(|idx| child.get(idx)).collect())
			}
			Type::Map(..) => {
				let (child, range) = self.list_range(row);
				HostValue::Map(range.map(|idx| (child.children[0].get(idx), child.children[1].get(idx))).collect())
			}
			Type::Array(_, size) => {
				let child = self.child.as_ref().expect("array vector without child");
				HostValue::Array((row * size..(row + 1) * size).map(|idx| child.get(idx)).collect())
			}
			Type::Struct(fields) => HostValue::Struct(
				fields.iter().zip(&self.children).map(|((name, _), child)| (name.clone(), child.get(row))).collect(),
			),
		}
	}

	fn finish_list(&mut self, row: usize, offset: usize, length: usize) {
		self.list_size = offset + length;
		self.put(
			row,
			ListEntryFFI {
				offset: offset as u64,
				length: length as u64,
			},
		);
	}

	fn list_range(&self, row: usize) -> (&MockVector, std::ops::Range<usize>) {
		let entry = self.fetch::<ListEntryFFI>(row);
		let child = self.child.as_deref().expect("list vector without child");
		let start = entry.offset as usize;
		(child, start..start + entry.length as usize)
	}

	fn bytes(&self, row: usize) -> Vec<u8> {
		let cell = self.fetch::<StringFFI>(row);
		// SAFETY: out-of-line payloads are owned by `heap`
		unsafe { cell.as_bytes() }.to_vec()
	}

	fn put<T: Copy>(&mut self, row: usize, value: T) {
		assert!(row < self.capacity, "row {row} beyond vector capacity {}", self.capacity);
		// SAFETY: the buffer holds `capacity` cells of the vector's cell width
		unsafe { self.data.as_mut_ptr().cast::<T>().add(row).write(value) }
	}

	fn fetch<T: Copy>(&self, row: usize) -> T {
		assert!(row < self.capacity, "row {row} beyond vector capacity {}", self.capacity);
		// SAFETY: the buffer holds `capacity` cells of the vector's cell width
		unsafe { self.data.as_ptr().cast::<T>().add(row).read() }
	}
}

fn cell_width(ty: &Type) -> usize {
	match ty {
		Type::Varchar | Type::Blob => STRING_CELL_WIDTH,
		Type::List(_) | Type::Map(..) => size_of::<ListEntryFFI>(),
		Type::Array(..) | Type::Struct(_) => 0,
		other => other.fixed_width().unwrap_or(0),
	}
}

fn words(bytes: usize) -> usize {
	bytes.div_ceil(size_of::<u128>())
}

/// A chunk of equally sized column vectors
pub(crate) struct MockChunk {
	pub(crate) vectors: Vec<MockVector>,
	pub(crate) size: usize,
}

impl MockChunk {
	pub(crate) fn new(types: &[Type], capacity: usize) -> Self {
		Self {
			vectors: types.iter().map(|ty| MockVector::new(ty, capacity)).collect(),
			size: 0,
		}
	}

	pub(crate) fn as_ptr(&mut self) -> *mut DataChunkFFI {
		(self as *mut Self).cast()
	}

	/// Rows `0..size` of every column
	pub(crate) fn rows(&self) -> Vec<Vec<HostValue>> {
		(0..self.size).map(|row| self.vectors.iter().map(|vector| vector.get(row)).collect()).collect()
	}
}
