// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use duckbridge_sdk::{
	__private::{ExtensionAccessFFI, ExtensionInfoFFI},
	config::Config,
	connection::Connection,
	error::{Error, Result},
	extension::Extension,
	export_extension,
	function::{ColumnInfo, TableFunctionData},
	testing::{HostValue, MockDatabase},
	types::Type,
};

fn register(connection: &Connection) -> Result<()> {
	connection.register_unary_scalar_function("double", |x: i64| Ok(x * 2))?;
	connection.register_table_function(
		"greetings",
		[Type::Int32],
		|parameters| {
			let count: i32 = parameters.get(0)?.get()?;
			Ok(TableFunctionData::new(vec![ColumnInfo::new("greeting", Type::Varchar)], 0..count))
		},
		|idx: &i32, writers, row| writers[0].write(row, format!("hello #{idx}")),
	)
}

export_extension!(greeter, register);

fn register_failing(connection: &Connection) -> Result<()> {
	connection.register_unary_scalar_function("first", |x: i32| Ok(x))?;
	Err(Error::Execution("license file not found".to_string()))
}

export_extension!(failing, register_failing);

unsafe extern "C" fn future_duckbridge_init(info: *mut ExtensionInfoFFI, access: *const ExtensionAccessFFI) -> bool {
	let config = Config::default().with_api_version("v9.0.0");
	Extension::init(info, access, &config, register)
}

unsafe extern "C" fn native_version_duckbridge_init(
	info: *mut ExtensionInfoFFI,
	access: *const ExtensionAccessFFI,
) -> bool {
	let config = Config::default().with_api_version("v1.2.0");
	Extension::init(info, access, &config, register)
}

#[test]
fn test_load_registers_functions() {
	let db = MockDatabase::new();
	db.load_extension(greeter_duckbridge_init).unwrap();

	assert!(db.contains("double"));
	assert!(db.contains("greetings"));
	assert_eq!(db.open_connections(), 0);

	let result = db.call_scalar("double", vec![vec![HostValue::Int64(21)]]).unwrap();
	assert_eq!(result, vec![HostValue::Int64(42)]);

	let result = db.query_table("greetings", vec![HostValue::Int32(2)], vec![]).unwrap();
	assert_eq!(result.column(0), vec![
		HostValue::Varchar("hello #0".into()),
		HostValue::Varchar("hello #1".into())
	]);
}

#[test]
fn test_register_error_fails_the_load() {
	let db = MockDatabase::new();
	let err = db.load_extension(failing_duckbridge_init).unwrap_err();
	assert_eq!(err, "license file not found");
	assert_eq!(db.open_connections(), 0);
}

#[test]
fn test_unsupported_api_version() {
	let db = MockDatabase::new();
	let err = db.load_extension(future_duckbridge_init).unwrap_err();
	assert_eq!(err, "host does not provide API version v9.0.0");
	assert!(!db.contains("double"));
	assert_eq!(db.open_connections(), 0);
}

#[test]
fn test_engine_native_api_version_is_not_requested() {
	assert!(Config::default().api_version.starts_with("duckbridge-"));

	let db = MockDatabase::new();
	let err = db.load_extension(native_version_duckbridge_init).unwrap_err();
	assert_eq!(err, "host does not provide API version v1.2.0");
	assert!(!db.contains("double"));
}

#[test]
fn test_loading_twice_reports_duplicate() {
	let db = MockDatabase::new();
	db.load_extension(greeter_duckbridge_init).unwrap();

	let err = db.load_extension(greeter_duckbridge_init).unwrap_err();
	assert_eq!(err, "error registering user defined function: double: rejected by the host");
	assert_eq!(db.open_connections(), 0);
}

#[test]
fn test_separate_databases_are_independent() {
	let first = MockDatabase::new();
	let second = MockDatabase::new();
	first.load_extension(greeter_duckbridge_init).unwrap();
	second.load_extension(greeter_duckbridge_init).unwrap();

	drop(first);
	let result = second.call_scalar("double", vec![vec![HostValue::Int64(-4)]]).unwrap();
	assert_eq!(result, vec![HostValue::Int64(-8)]);
}
