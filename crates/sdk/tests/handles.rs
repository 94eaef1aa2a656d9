// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Registry-wide handle accounting
//!
//! The handle registry is process global, so this binary holds a single test.

use duckbridge_sdk::{
	function::{ColumnInfo, TableFunctionData},
	handle::live_handles,
	testing::{HostValue, MockDatabase, set_vector_size},
	types::Type,
};

#[test]
fn test_every_handle_is_released_after_teardown() {
	set_vector_size(2);
	assert_eq!(live_handles(), 0);

	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection.register_unary_scalar_function("square", |x: i64| Ok(x * x)).unwrap();
	connection
		.register_table_function(
			"letters",
			[],
			|_| Ok(TableFunctionData::new(vec![ColumnInfo::new("letter", Type::Varchar)], ["a", "b", "c"].map(String::from))),
			|letter: &String, writers, row| writers[0].write(row, letter.as_str()),
		)
		.unwrap();
	drop(connection);
	assert_eq!(live_handles(), 2);

	db.query_table("letters", vec![], vec![]).unwrap();
	db.call_scalar("square", vec![vec![HostValue::Int64(3)]]).unwrap();
	assert_eq!(live_handles(), 2);

	drop(db);
	assert_eq!(live_handles(), 0);
}
