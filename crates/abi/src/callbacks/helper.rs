// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::c_void;

/// Miscellaneous host services
#[repr(C)]
#[derive(Clone, Copy)]
pub struct HelperCallbacks {
	/// Free memory the host allocated on behalf of the extension
	pub free: extern "C" fn(ptr: *mut c_void),

	/// Capacity of every vector in a chunk
	pub vector_size: extern "C" fn() -> u64,
}
