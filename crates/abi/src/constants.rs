// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Constants and version information for the host API

/// Host call succeeded
pub const STATE_SUCCESS: i32 = 0;

/// Host call failed
pub const STATE_ERROR: i32 = 1;

/// API version requested by default when an extension loads
///
/// Versions are namespaced: an engine's native extension table is never requested.
pub const DEFAULT_API_VERSION: &str = "duckbridge-v1.0";

/// Every version sharing this prefix has the `ApiFFI` layout of this crate
pub const API_VERSION_PREFIX: &str = "duckbridge-v1.";

/// Default number of rows in one vector when the host does not say otherwise
pub const STANDARD_VECTOR_SIZE: u64 = 2048;

/// Maximum width of a decimal type
pub const DECIMAL_MAX_WIDTH: u8 = 38;

/// Strings up to this many bytes are stored inline in `StringFFI`
pub const STRING_INLINE_LENGTH: usize = 12;

/// Bits per validity mask entry
pub const VALIDITY_BITS_PER_ENTRY: u64 = 64;

/// Helper to check whether a host call succeeded
///
/// # Example
/// ```
/// use duckbridge_abi::constants::*;
///
/// assert!(is_success(STATE_SUCCESS));
/// assert!(!is_success(STATE_ERROR));
/// ```
#[inline]
pub const fn is_success(state: i32) -> bool {
	state == STATE_SUCCESS
}
