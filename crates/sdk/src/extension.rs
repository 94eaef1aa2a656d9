// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Extension load entry point

use duckbridge_abi::{api::ApiFFI, extension::ExtensionAccessFFI, types::ExtensionInfoFFI};
use tracing::{error, info};

use crate::{
	api,
	config::Config,
	connection::Connection,
	error::{Error, Result},
	ffi::{message_cstring, to_cstring},
	function::guard,
	logging,
};

pub struct Extension;

impl Extension {
	/// Load an extension into the host
	///
	/// Installs the host API table for `config.api_version`, opens a connection, runs
	/// `register` on it and closes the connection again. Any failure is reported to the host
	/// through `access` and `false` is returned.
	pub fn init<F>(info: *mut ExtensionInfoFFI, access: *const ExtensionAccessFFI, config: &Config, register: F) -> bool
	where
		F: FnOnce(&Connection) -> Result<()>,
	{
		logging::init(config);
		if access.is_null() {
			error!("extension loaded without host access");
			return false;
		}
		// SAFETY: the host keeps the access table alive for the duration of the load
		let access = unsafe { &*access };

		match guard("extension", "load", || load(info, access, config, register)) {
			Ok(()) => true,
			Err(message) => {
				let message = message_cstring(&message);
				(access.set_error)(info, message.as_ptr());
				false
			}
		}
	}
}

fn load<F>(info: *mut ExtensionInfoFFI, access: &ExtensionAccessFFI, config: &Config, register: F) -> Result<()>
where
	F: FnOnce(&Connection) -> Result<()>,
{
	let version = to_cstring(&config.api_version)?;
	let table = (access.get_api)(info, version.as_ptr()) as *const ApiFFI;
	if table.is_null() {
		return Err(Error::ApiUnavailable {
			version: config.api_version.clone(),
		});
	}
	// SAFETY: a non-null table returned by the host is a valid `ApiFFI` for the requested version
	let table = unsafe { *table };
	api::get_or_init(|| table);

	let database = (access.get_database)(info);
	if database.is_null() {
		return Err(Error::NullPointer("database"));
	}
	// SAFETY: checked non-null above; the host owns the slot for the duration of the load
	let connection = Connection::open(unsafe { *database })?;
	register(&connection)?;

	info!(api_version = %config.api_version, "extension loaded");
	Ok(())
}

/// Export the `<name>_duckbridge_init` symbol the host looks up when loading an extension
///
/// ```ignore
/// fn register(connection: &Connection) -> duckbridge_sdk::error::Result<()> {
///     connection.register_unary_scalar_function("double", |x: i64| Ok(x * 2))
/// }
///
/// duckbridge_sdk::export_extension!(doubler, register);
/// ```
#[macro_export]
macro_rules! export_extension {
	($name:ident, $register:path) => {
		$crate::__private::paste::paste! {
			#[unsafe(no_mangle)]
			pub unsafe extern "C" fn [<$name _duckbridge_init>](
				info: *mut $crate::__private::ExtensionInfoFFI,
				access: *const $crate::__private::ExtensionAccessFFI,
			) -> bool {
				let config = $crate::config::Config::from_env().unwrap_or_default();
				$crate::extension::Extension::init(info, access, &config, $register)
			}
		}
	};
}
