// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::{BTreeMap, HashMap},
	os::raw::c_char,
};

use bigdecimal::{BigDecimal, RoundingMode};
use duckbridge_abi::{
	constants::is_success,
	types::{HugeIntFFI, ListEntryFFI, VectorFFI},
};
use num_traits::ToPrimitive;

use super::Validity;
use crate::{
	api::api,
	error::{Error, Result},
	types::{Blob, Decimal, Primitive, Type, decimal_storage, enum_storage},
};

/// Row-indexed writer over one output vector
///
/// The writer's layout is chosen once from the column's [`Type`] when it is built; each
/// [`write`](Self::write) then goes straight to the right buffer. Rows at or beyond the
/// writer's capacity panic.
#[derive(Debug)]
pub struct VectorWriter {
	vector: *mut VectorFFI,
	ty: Type,
	capacity: usize,
	validity: Validity,
	layout: Layout,
}

#[derive(Debug)]
enum Layout {
	Primitive {
		data: *mut u8,
	},
	Decimal {
		data: *mut u8,
		width: u8,
		scale: u8,
		storage: usize,
	},
	String,
	Enum {
		data: *mut u8,
		storage: usize,
		index: HashMap<String, u32>,
	},
	List {
		entries: *mut ListEntryFFI,
		element: Type,
	},
	Array {
		child: Box<VectorWriter>,
		size: usize,
	},
	Struct {
		children: Vec<VectorWriter>,
	},
}

impl VectorWriter {
	/// Wrap `vector`, which must hold at least `capacity` rows of `ty`
	pub(crate) fn new(vector: *mut VectorFFI, ty: &Type, capacity: usize) -> Result<Self> {
		if vector.is_null() {
			return Err(Error::NullPointer("vector"));
		}
		let callbacks = &api().vector;

		let layout = match ty {
			Type::Varchar | Type::Blob => Layout::String,
			Type::List(element) => Layout::List {
				entries: data_of(vector)?.cast(),
				element: (**element).clone(),
			},
			Type::Map(key, value) => Layout::List {
				entries: data_of(vector)?.cast(),
				element: map_entry(key, value),
			},
			Type::Array(element, size) => {
				let child = (callbacks.array_get_child)(vector);
				Layout::Array {
					child: Box::new(VectorWriter::new(child, element, capacity * size)?),
					size: *size,
				}
			}
			Type::Struct(fields) => {
				let children = fields
					.iter()
					.enumerate()
					.map(|(idx, (_, field))| {
						let child = (callbacks.struct_get_child)(vector, idx as u64);
						VectorWriter::new(child, field, capacity)
					})
					.collect::<Result<Vec<_>>>()?;
				Layout::Struct {
					children,
				}
			}
			Type::Decimal {
				width,
				scale,
			} => Layout::Decimal {
				data: data_of(vector)?,
				width: *width,
				scale: *scale,
				storage: decimal_storage(*width).1,
			},
			Type::Enum(dictionary) => Layout::Enum {
				data: data_of(vector)?,
				storage: enum_storage(dictionary.len()).1,
				index: dictionary.iter().enumerate().map(|(idx, value)| (value.clone(), idx as u32)).collect(),
			},
			_ => Layout::Primitive {
				data: data_of(vector)?,
			},
		};

		Ok(Self {
			vector,
			ty: ty.clone(),
			capacity,
			validity: Validity::new(vector, capacity),
			layout,
		})
	}

	pub fn as_ptr(&self) -> *mut VectorFFI {
		self.vector
	}

	/// Column type this writer was built for
	pub fn ty(&self) -> &Type {
		&self.ty
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn validity(&self) -> &Validity {
		&self.validity
	}

	/// Write `value` at `row`
	///
	/// `Option<T>` writes NULL for `None`. A value whose Rust type does not fit the column
	/// fails with [`Error::TypeMismatch`].
	pub fn write<T: WriteValue>(&mut self, row: usize, value: T) -> Result<()> {
		value.write_to(self, row)
	}

	/// Mark `row` NULL
	///
	/// For structs every field is nulled at the same row; arrays null their whole child
	/// region; lists get an empty entry.
	pub fn write_null(&mut self, row: usize) -> Result<()> {
		self.check_row(row);
		self.validity.set_invalid(row)?;
		match &mut self.layout {
			Layout::Struct {
				children,
			} => {
				for child in children {
					child.write_null(row)?;
				}
			}
			Layout::Array {
				child,
				size,
			} => {
				for idx in row * *size..(row + 1) * *size {
					child.write_null(idx)?;
				}
			}
			Layout::List {
				entries,
				..
			} => {
				let offset = (api().vector.list_get_size)(self.vector);
				// SAFETY: row < capacity, checked above
				unsafe {
					entries.add(row).write(ListEntryFFI {
						offset,
						length: 0,
					})
				};
			}
			_ => {}
		}
		Ok(())
	}

	/// Store a fixed-width value
	pub fn write_primitive<T: Primitive>(&mut self, row: usize, value: T) -> Result<()> {
		let Layout::Primitive {
			data,
		} = self.layout
		else {
			return Err(Error::mismatch_type(&self.ty, &T::get_type()));
		};
		let actual = T::get_type();
		if actual != self.ty {
			return Err(Error::mismatch_type(&self.ty, &actual));
		}
		self.check_row(row);
		// SAFETY: the buffer holds `capacity` elements of `T::Native`, row < capacity
		unsafe { data.cast::<T::Native>().add(row).write(value.to_native()) };
		self.validity.set_valid(row);
		Ok(())
	}

	/// Store text into a VARCHAR column or look it up in an ENUM dictionary
	pub fn write_str(&mut self, row: usize, value: &str) -> Result<()> {
		match &self.layout {
			Layout::String if self.ty == Type::Varchar => self.assign(row, value.as_bytes()),
			Layout::Enum {
				data,
				storage,
				index,
			} => {
				let Some(&position) = index.get(value) else {
					return Err(Error::Execution(format!("'{value}' is not a value of {}", self.ty)));
				};
				let (data, storage) = (*data, *storage);
				self.check_row(row);
				// SAFETY: the buffer holds `capacity` indices of `storage` bytes, row < capacity
				unsafe {
					match storage {
						1 => data.cast::<u8>().add(row).write(position as u8),
						2 => data.cast::<u16>().add(row).write(position as u16),
						_ => data.cast::<u32>().add(row).write(position),
					}
				}
				self.validity.set_valid(row);
				Ok(())
			}
			_ => Err(Error::mismatch_type(&self.ty, &Type::Varchar)),
		}
	}

	/// Store raw bytes into a BLOB column
	pub fn write_bytes(&mut self, row: usize, value: &[u8]) -> Result<()> {
		if self.ty != Type::Blob {
			return Err(Error::mismatch_type(&self.ty, &Type::Blob));
		}
		self.assign(row, value)
	}

	/// Store a decimal, rescaled to the column's scale with half-even rounding
	pub fn write_decimal(&mut self, row: usize, value: &BigDecimal) -> Result<()> {
		let Layout::Decimal {
			scale,
			..
		} = self.layout
		else {
			return Err(Error::mismatch(&self.ty, "DECIMAL"));
		};
		let (unscaled, _) = value.with_scale_round(scale as i64, RoundingMode::HalfEven).as_bigint_and_exponent();
		let unscaled = unscaled
			.to_i128()
			.ok_or_else(|| Error::Execution(format!("{value} does not fit {}", self.ty)))?;
		self.write_unscaled(row, unscaled)
	}

	/// Store an already scaled integer into a DECIMAL column
	pub fn write_unscaled(&mut self, row: usize, unscaled: i128) -> Result<()> {
		let Layout::Decimal {
			data,
			width,
			storage,
			..
		} = self.layout
		else {
			return Err(Error::mismatch(&self.ty, "DECIMAL"));
		};
		if unscaled.unsigned_abs() >= 10u128.pow(width as u32) {
			return Err(Error::Execution(format!("{unscaled} overflows {}", self.ty)));
		}
		self.check_row(row);
		// SAFETY: the buffer holds `capacity` values of `storage` bytes, row < capacity;
		// the width check above keeps the value within the storage type
		unsafe {
			match storage {
				2 => data.cast::<i16>().add(row).write(unscaled as i16),
				4 => data.cast::<i32>().add(row).write(unscaled as i32),
				8 => data.cast::<i64>().add(row).write(unscaled as i64),
				_ => data.cast::<HugeIntFFI>().add(row).write(HugeIntFFI::from(unscaled)),
			}
		}
		self.validity.set_valid(row);
		Ok(())
	}

	/// Store a sequence into a LIST column, or into an ARRAY column of matching size
	pub fn write_list<I>(&mut self, row: usize, items: I) -> Result<()>
	where
		I: IntoIterator,
		I::IntoIter: ExactSizeIterator,
		I::Item: WriteValue,
	{
		if let Layout::Array {
			..
		} = self.layout
		{
			return self.write_array(row, items);
		}
		if !matches!(self.ty, Type::List(_)) {
			return Err(Error::mismatch(&self.ty, "LIST"));
		}
		let items = items.into_iter();
		self.append_child(row, items.len(), |child, offset| {
			for (idx, item) in items.enumerate() {
				item.write_to(child, offset + idx)?;
			}
			Ok(())
		})
	}

	/// Store key/value pairs into a MAP column
	pub fn write_map<I, K, V>(&mut self, row: usize, entries: I) -> Result<()>
	where
		I: IntoIterator<Item = (K, V)>,
		I::IntoIter: ExactSizeIterator,
		K: WriteValue,
		V: WriteValue,
	{
		if !matches!(self.ty, Type::Map(..)) {
			return Err(Error::mismatch(&self.ty, "MAP"));
		}
		let entries = entries.into_iter();
		self.append_child(row, entries.len(), |child, offset| {
			for (idx, (key, value)) in entries.enumerate() {
				key.write_to(child.field(0)?, offset + idx)?;
				value.write_to(child.field(1)?, offset + idx)?;
				child.validity.set_valid(offset + idx);
			}
			Ok(())
		})
	}

	/// Store exactly `N` elements into a fixed-size ARRAY column
	pub fn write_array<I>(&mut self, row: usize, items: I) -> Result<()>
	where
		I: IntoIterator,
		I::IntoIter: ExactSizeIterator,
		I::Item: WriteValue,
	{
		self.check_row(row);
		let Layout::Array {
			child,
			size,
		} = &mut self.layout
		else {
			return Err(Error::mismatch(&self.ty, "ARRAY"));
		};
		let size = *size;
		let items = items.into_iter();
		if items.len() != size {
			return Err(Error::Execution(format!(
				"array value has {} elements, {} expects {size}",
				items.len(),
				self.ty
			)));
		}
		for (idx, item) in items.enumerate() {
			item.write_to(child, row * size + idx)?;
		}
		self.validity.set_valid(row);
		Ok(())
	}

	/// Writer of the struct field at `index`, addressed with the same row numbers
	pub fn field(&mut self, index: usize) -> Result<&mut VectorWriter> {
		let Layout::Struct {
			children,
		} = &mut self.layout
		else {
			return Err(Error::mismatch(&self.ty, "STRUCT"));
		};
		let count = children.len();
		children.get_mut(index).ok_or_else(|| {
			Error::Execution(format!("struct field {index} out of range, struct has {count} fields"))
		})
	}

	pub fn field_by_name(&mut self, name: &str) -> Result<&mut VectorWriter> {
		let Type::Struct(fields) = &self.ty else {
			return Err(Error::mismatch(&self.ty, "STRUCT"));
		};
		let Some(index) = fields.iter().position(|(field, _)| field == name) else {
			return Err(Error::Execution(format!("{} has no field named {name}", self.ty)));
		};
		self.field(index)
	}

	/// Mark a struct row valid after its fields have been written
	pub fn set_valid(&mut self, row: usize) {
		self.check_row(row);
		self.validity.set_valid(row);
	}

	fn assign(&mut self, row: usize, bytes: &[u8]) -> Result<()> {
		self.check_row(row);
		(api().vector.assign_string_element_len)(
			self.vector,
			row as u64,
			bytes.as_ptr() as *const c_char,
			bytes.len() as u64,
		);
		self.validity.set_valid(row);
		Ok(())
	}

	// Appends `len` child rows for the list at `row`. The child buffer may move on
	// reserve, so the child writer is only built afterwards.
	fn append_child(
		&mut self,
		row: usize,
		len: usize,
		fill: impl FnOnce(&mut VectorWriter, usize) -> Result<()>,
	) -> Result<()> {
		self.check_row(row);
		let Layout::List {
			entries,
			element,
		} = &self.layout
		else {
			return Err(Error::mismatch(&self.ty, "LIST"));
		};
		let entries = *entries;
		let callbacks = &api().vector;

		let offset = (callbacks.list_get_size)(self.vector);
		let size = offset + len as u64;
		if !is_success((callbacks.list_reserve)(self.vector, size)) {
			return Err(Error::Execution(format!("failed to reserve {size} list elements")));
		}
		let mut child = VectorWriter::new((callbacks.list_get_child)(self.vector), element, size as usize)?;
		fill(&mut child, offset as usize)?;
		if !is_success((callbacks.list_set_size)(self.vector, size)) {
			return Err(Error::Execution(format!("failed to resize list to {size} elements")));
		}

		// SAFETY: row < capacity, checked above
		unsafe {
			entries.add(row).write(ListEntryFFI {
				offset,
				length: len as u64,
			})
		};
		self.validity.set_valid(row);
		Ok(())
	}

	fn check_row(&self, row: usize) {
		assert!(row < self.capacity, "row {row} out of range for {} vector of capacity {}", self.ty, self.capacity);
	}
}

fn data_of(vector: *mut VectorFFI) -> Result<*mut u8> {
	let data = (api().vector.get_data)(vector) as *mut u8;
	if data.is_null() {
		return Err(Error::NullPointer("vector data"));
	}
	Ok(data)
}

fn map_entry(key: &Type, value: &Type) -> Type {
	Type::Struct(vec![("key".to_string(), key.clone()), ("value".to_string(), value.clone())])
}

// ============================================================================
// WriteValue
// ============================================================================

/// A Rust value that can be stored into a [`VectorWriter`]
pub trait WriteValue {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()>;
}

macro_rules! impl_write_primitive {
	($($ty:ty),* $(,)?) => {
		$(
			impl WriteValue for $ty {
				fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
					writer.write_primitive(row, self)
				}
			}
		)*
	};
}

impl_write_primitive!(bool, i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64);

impl WriteValue for &str {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		writer.write_str(row, self)
	}
}

impl WriteValue for String {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		writer.write_str(row, &self)
	}
}

impl WriteValue for &String {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		writer.write_str(row, self)
	}
}

impl WriteValue for &[u8] {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		writer.write_bytes(row, self)
	}
}

impl WriteValue for Blob {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		writer.write_bytes(row, &self)
	}
}

impl WriteValue for &Blob {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		writer.write_bytes(row, self)
	}
}

impl WriteValue for Decimal {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		match writer.ty {
			Type::Decimal {
				scale,
				..
			} if scale == self.scale => writer.write_unscaled(row, self.unscaled),
			_ => writer.write_decimal(row, &self.to_big_decimal()),
		}
	}
}

impl WriteValue for BigDecimal {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		writer.write_decimal(row, &self)
	}
}

impl WriteValue for &BigDecimal {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		writer.write_decimal(row, self)
	}
}

impl<T: WriteValue> WriteValue for Option<T> {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		match self {
			Some(value) => value.write_to(writer, row),
			None => writer.write_null(row),
		}
	}
}

impl<T: WriteValue> WriteValue for Vec<T> {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		writer.write_list(row, self)
	}
}

impl<T: WriteValue, const N: usize> WriteValue for [T; N] {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		writer.write_list(row, self)
	}
}

impl<K: WriteValue, V: WriteValue> WriteValue for BTreeMap<K, V> {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		writer.write_map(row, self)
	}
}

impl<K: WriteValue, V: WriteValue, S> WriteValue for HashMap<K, V, S> {
	fn write_to(self, writer: &mut VectorWriter, row: usize) -> Result<()> {
		writer.write_map(row, self)
	}
}
