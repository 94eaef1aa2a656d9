// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! String marshalling between Rust and the host

use std::ffi::{CStr, CString, c_char};

use crate::{
	api::api,
	error::{Error, Result},
};

/// NUL-terminated copy of `value`, failing on interior NUL bytes
pub(crate) fn to_cstring(value: &str) -> Result<CString> {
	CString::new(value).map_err(|_| Error::InvalidString)
}

/// NUL-terminated copy of an error message; interior NUL bytes are replaced so the
/// message always reaches the host
pub(crate) fn message_cstring(message: &str) -> CString {
	match CString::new(message) {
		Ok(message) => message,
		Err(_) => {
			let cleaned: String = message.chars().map(|c| if c == '\0' { ' ' } else { c }).collect();
			CString::new(cleaned).unwrap_or_default()
		}
	}
}

/// Copy a host-allocated string into Rust and free the host allocation
pub(crate) fn take_host_string(ptr: *mut c_char) -> Result<String> {
	if ptr.is_null() {
		return Err(Error::NullPointer("host string"));
	}
	// SAFETY: the host hands out NUL-terminated strings that stay valid until freed
	let result = unsafe { CStr::from_ptr(ptr) }.to_str().map(str::to_owned).map_err(|_| Error::InvalidString);
	(api().helper.free)(ptr.cast());
	result
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_to_cstring() {
		assert_eq!(to_cstring("name").unwrap().as_bytes(), b"name");
		assert!(matches!(to_cstring("na\0me"), Err(Error::InvalidString)));
	}

	#[test]
	fn test_message_cstring_strips_nul() {
		assert_eq!(message_cstring("bad\0input").as_bytes(), b"bad input");
		assert_eq!(message_cstring("plain").as_bytes(), b"plain");
	}
}
