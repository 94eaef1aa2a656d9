// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use duckbridge_abi::{constants::VALIDITY_BITS_PER_ENTRY, types::VectorFFI};

use crate::{
	api::api,
	error::{Error, Result},
};

/// Validity mask of one vector
///
/// A vector starts without a mask, meaning every row is valid. The mask is only made
/// writable by the first [`set_invalid`](Self::set_invalid); vectors that never hold a
/// NULL never carry one.
///
/// Rows at or beyond the vector's capacity panic.
#[derive(Debug)]
pub struct Validity {
	vector: *mut VectorFFI,
	mask: *mut u64,
	capacity: usize,
}

impl Validity {
	pub(crate) fn new(vector: *mut VectorFFI, capacity: usize) -> Self {
		Self {
			vector,
			mask: (api().vector.get_validity)(vector),
			capacity,
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Check whether the mask has been materialized
	pub fn is_promoted(&self) -> bool {
		!self.current().is_null()
	}

	pub fn is_valid(&self, row: usize) -> bool {
		self.check_row(row);
		let mask = self.current();
		if mask.is_null() {
			return true;
		}
		let (entry, bit) = position(row);
		// SAFETY: the mask covers every row of the vector's capacity
		unsafe { *mask.add(entry) & bit != 0 }
	}

	/// Mark `row` NULL, promoting the mask on first use
	pub fn set_invalid(&mut self, row: usize) -> Result<()> {
		self.check_row(row);
		if self.mask.is_null() {
			(api().vector.ensure_validity_writable)(self.vector);
			self.mask = (api().vector.get_validity)(self.vector);
			if self.mask.is_null() {
				return Err(Error::NullPointer("validity mask"));
			}
		}
		let (entry, bit) = position(row);
		// SAFETY: the mask covers every row of the vector's capacity
		unsafe { *self.mask.add(entry) &= !bit };
		Ok(())
	}

	/// Mark `row` valid; a no-op while no mask exists
	pub fn set_valid(&mut self, row: usize) {
		self.check_row(row);
		if self.mask.is_null() {
			self.mask = (api().vector.get_validity)(self.vector);
			if self.mask.is_null() {
				return;
			}
		}
		let (entry, bit) = position(row);
		// SAFETY: the mask covers every row of the vector's capacity
		unsafe { *self.mask.add(entry) |= bit };
	}

	fn check_row(&self, row: usize) {
		assert!(row < self.capacity, "row {row} out of range for validity of {} rows", self.capacity);
	}

	fn current(&self) -> *mut u64 {
		if self.mask.is_null() {
			(api().vector.get_validity)(self.vector)
		} else {
			self.mask
		}
	}
}

fn position(row: usize) -> (usize, u64) {
	let row = row as u64;
	((row / VALIDITY_BITS_PER_ENTRY) as usize, 1u64 << (row % VALIDITY_BITS_PER_ENTRY))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		testing::{self, vector::MockVector},
		types::Type,
	};

	fn vector(capacity: usize) -> MockVector {
		testing::install();
		MockVector::new(&Type::Int32, capacity)
	}

	#[test]
	fn test_lazy_promotion() {
		let mut vector = vector(130);
		let mut validity = Validity::new(vector.as_ptr(), 130);
		assert!(!validity.is_promoted());
		validity.set_valid(3);
		assert!(!validity.is_promoted());
		assert!(validity.is_valid(129));

		validity.set_invalid(129).unwrap();
		assert!(validity.is_promoted());
		assert!(!validity.is_valid(129));
		assert!(validity.is_valid(128));
		assert!(validity.is_valid(0));

		validity.set_valid(129);
		assert!(validity.is_valid(129));
	}

	#[test]
	#[should_panic(expected = "row 130 out of range")]
	fn test_is_valid_out_of_range() {
		let mut vector = vector(130);
		let mut validity = Validity::new(vector.as_ptr(), 130);
		validity.set_invalid(0).unwrap();
		validity.is_valid(130);
	}

	#[test]
	#[should_panic(expected = "out of range")]
	fn test_set_invalid_out_of_range() {
		let mut vector = vector(8);
		let mut validity = Validity::new(vector.as_ptr(), 8);
		let _ = validity.set_invalid(1 << 40);
	}

	#[test]
	#[should_panic(expected = "out of range")]
	fn test_set_valid_out_of_range() {
		let mut vector = vector(8);
		let mut validity = Validity::new(vector.as_ptr(), 8);
		validity.set_invalid(1).unwrap();
		validity.set_valid(64);
	}

	#[test]
	fn test_position() {
		assert_eq!(position(0), (0, 1));
		assert_eq!(position(63), (0, 1 << 63));
		assert_eq!(position(64), (1, 1));
		assert_eq!(position(130), (2, 1 << 2));
	}
}
