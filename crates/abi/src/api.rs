// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::callbacks::{
	ConnectionCallbacks, DataChunkCallbacks, HelperCallbacks, LogicalTypeCallbacks, ScalarFunctionCallbacks,
	TableFunctionCallbacks, ValueCallbacks, VectorCallbacks,
};

/// Host API function table
///
/// Handed to the extension once at load time and treated as read-only afterwards.
/// All function pointers must be valid (non-null).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ApiFFI {
	pub logical_type: LogicalTypeCallbacks,
	pub value: ValueCallbacks,
	pub vector: VectorCallbacks,
	pub chunk: DataChunkCallbacks,
	pub scalar: ScalarFunctionCallbacks,
	pub table: TableFunctionCallbacks,
	pub connection: ConnectionCallbacks,
	pub helper: HelperCallbacks,
}
