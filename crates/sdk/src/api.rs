// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Process-wide host API table
//!
//! The host hands the extension its function table once, at load time. Every other part of
//! the bridge reads it through [`api`]; there is no way to replace it afterwards.

use std::{process::abort, sync::OnceLock};

use duckbridge_abi::api::ApiFFI;
use tracing::{debug, error};

use crate::error::{Error, Result};

static API: OnceLock<ApiFFI> = OnceLock::new();

/// Install the host API table. Fails if a table is already installed.
pub fn init(table: ApiFFI) -> Result<&'static ApiFFI> {
	let mut installed = false;
	let api = API.get_or_init(|| {
		installed = true;
		table
	});
	if !installed {
		return Err(Error::ApiAlreadyInitialized);
	}
	debug!("host API table installed");
	Ok(api)
}

/// Install the host API table unless one is present, returning whichever is installed
pub fn get_or_init(table: impl FnOnce() -> ApiFFI) -> &'static ApiFFI {
	API.get_or_init(table)
}

/// The installed host API table
pub fn get() -> Result<&'static ApiFFI> {
	API.get().ok_or(Error::ApiNotInitialized)
}

/// Check whether the host API table is installed
pub fn is_initialized() -> bool {
	API.get().is_some()
}

/// The installed host API table, for code that only runs once the host has called in
///
/// Every native handle the bridge holds was obtained through the table, so reaching this
/// without one is unrecoverable.
pub(crate) fn api() -> &'static ApiFFI {
	match API.get() {
		Some(api) => api,
		None => {
			error!("host API table used before installation - aborting");
			abort();
		}
	}
}
