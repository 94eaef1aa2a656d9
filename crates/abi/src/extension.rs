// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::{c_char, c_void};

use crate::types::{DatabaseFFI, ExtensionInfoFFI};

/// Services the host offers while an extension is loading
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ExtensionAccessFFI {
	/// Report a load failure (NUL-terminated UTF-8)
	pub set_error: extern "C" fn(info: *mut ExtensionInfoFFI, error: *const c_char),

	/// Database the extension is being loaded into
	pub get_database: extern "C" fn(info: *mut ExtensionInfoFFI) -> *mut *mut DatabaseFFI,

	/// API table for the requested version (an `ApiFFI`), null if unsupported
	pub get_api: extern "C" fn(info: *mut ExtensionInfoFFI, version: *const c_char) -> *const c_void,
}

/// Signature of the `<name>_duckbridge_init` symbol an extension exports
pub type ExtensionEntry = unsafe extern "C" fn(info: *mut ExtensionInfoFFI, access: *const ExtensionAccessFFI) -> bool;
