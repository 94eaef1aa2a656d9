// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::types::{ConnectionFFI, DatabaseFFI};

/// Connection management
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ConnectionCallbacks {
	/// Open a connection to a database
	///
	/// # Returns
	/// - `STATE_SUCCESS` and a connection in `out`, or `STATE_ERROR`
	pub connect: extern "C" fn(database: *mut DatabaseFFI, out: *mut *mut ConnectionFFI) -> i32,

	/// Close a connection and null out the handle
	pub disconnect: extern "C" fn(connection: *mut *mut ConnectionFFI),
}
