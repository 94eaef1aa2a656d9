// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Table functions driven through bind, init and execute by the mock host

use std::sync::{
	Arc,
	atomic::{AtomicBool, AtomicUsize, Ordering},
};

use duckbridge_sdk::{
	error::{Error, Result},
	function::{ColumnInfo, TableFunction, TableFunctionData},
	handle::is_live,
	testing::{HostValue, MockDatabase, live_logical_types, live_values, set_vector_size},
	types::Type,
};
use parking_lot::Mutex;

fn register_numbers(db: &MockDatabase, values: Vec<i64>) -> Result<()> {
	let connection = db.connect()?;
	connection.register_table_function(
		"numbers",
		[],
		move |_| Ok(TableFunctionData::new(vec![ColumnInfo::new("n", Type::Int64)], values.clone())),
		|value: &i64, writers, row| writers[0].write(row, *value),
	)
}

#[test]
fn test_rows_split_across_chunks() {
	set_vector_size(2);
	let db = MockDatabase::new();
	register_numbers(&db, vec![10, 20, 30]).unwrap();

	let result = db.query_table("numbers", vec![], vec![]).unwrap();
	assert_eq!(result.columns, vec![("n".to_string(), Type::Int64)]);
	assert_eq!(result.chunk_sizes, vec![2, 1, 0]);
	assert_eq!(result.column(0), vec![HostValue::Int64(10), HostValue::Int64(20), HostValue::Int64(30)]);
}

#[test]
fn test_chunk_count_is_ceil_of_rows_over_capacity() {
	for (rows, capacity) in [(0usize, 4u64), (1, 4), (4, 4), (5, 4), (9, 3), (17, 16), (100, 7)] {
		set_vector_size(capacity);
		let db = MockDatabase::new();
		register_numbers(&db, (0..rows as i64).collect()).unwrap();

		let result = db.query_table("numbers", vec![], vec![]).unwrap();
		let full_chunks = rows.div_ceil(capacity as usize);
		assert_eq!(result.chunk_sizes.len(), full_chunks + 1, "{rows} rows at capacity {capacity}");
		assert_eq!(result.chunk_sizes.last(), Some(&0));
		assert!(result.chunk_sizes.iter().all(|size| *size <= capacity as usize));
		assert_eq!(result.rows.len(), rows);
		assert_eq!(result.column(0), (0..rows as i64).map(HostValue::Int64).collect::<Vec<_>>());
	}
}

#[test]
fn test_empty_source_yields_single_empty_chunk() {
	set_vector_size(8);
	let db = MockDatabase::new();
	register_numbers(&db, vec![]).unwrap();

	let result = db.query_table("numbers", vec![], vec![]).unwrap();
	assert_eq!(result.chunk_sizes, vec![0]);
	assert!(result.rows.is_empty());
}

#[test]
fn test_positional_parameters_reach_bind() {
	set_vector_size(16);
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_table_function(
			"range_of",
			[Type::Int64, Type::Varchar],
			|parameters| {
				let count: i64 = parameters.get(0)?.get()?;
				let prefix: String = parameters.get(1)?.get()?;
				Ok(TableFunctionData::new(
					vec![ColumnInfo::new("label", Type::Varchar), ColumnInfo::new("idx", Type::Int32)],
					(0..count as i32).map(move |idx| (format!("{prefix}-{idx}"), idx)),
				))
			},
			|(label, idx): &(String, i32), writers, row| {
				writers[0].write(row, label.as_str())?;
				writers[1].write(row, *idx)
			},
		)
		.unwrap();

	let result = db
		.query_table("range_of", vec![HostValue::Int64(3), HostValue::Varchar("a fairly long row prefix".into())], vec![])
		.unwrap();
	assert_eq!(result.rows, vec![
		vec![HostValue::Varchar("a fairly long row prefix-0".into()), HostValue::Int32(0)],
		vec![HostValue::Varchar("a fairly long row prefix-1".into()), HostValue::Int32(1)],
		vec![HostValue::Varchar("a fairly long row prefix-2".into()), HostValue::Int32(2)],
	]);
}

#[test]
fn test_named_parameters_and_cardinality() {
	set_vector_size(16);
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_table(
			TableFunction::new(
				"repeat_text",
				|parameters| {
					let text: String = parameters.get(0)?.get()?;
					let times = match parameters.named("times") {
						Some(value) => value.get::<i32>()? as usize,
						None => 1,
					};
					Ok(TableFunctionData::new(
						vec![ColumnInfo::new("text", Type::Varchar)],
						std::iter::repeat_n(text, times),
					)
					.with_cardinality(times as u64, true))
				},
				|text: &String, writers, row| writers[0].write(row, text.as_str()),
			)
			.parameter(Type::Varchar)
			.named_parameter("times", Type::Int32),
		)
		.unwrap();

	assert_eq!(db.named_parameters("repeat_text"), Some(vec![("times".to_string(), Type::Int32)]));

	let result = db
		.query_table("repeat_text", vec![HostValue::Varchar("hi".into())], vec![("times", HostValue::Int32(3))])
		.unwrap();
	assert_eq!(result.cardinality, Some((3, true)));
	assert_eq!(result.column(0), vec![HostValue::Varchar("hi".into()); 3]);

	let result = db.query_table("repeat_text", vec![HostValue::Varchar("hi".into())], vec![]).unwrap();
	assert_eq!(result.cardinality, Some((1, true)));
	assert_eq!(result.rows.len(), 1);
}

#[test]
fn test_bind_error_is_reported_and_mapper_never_runs() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	let mapped = Arc::new(AtomicBool::new(false));
	let flag = mapped.clone();
	connection
		.register_table_function(
			"read_missing",
			[Type::Varchar],
			|parameters| {
				let path: String = parameters.get(0)?.get()?;
				Err::<TableFunctionData<i64>, _>(Error::Bind(format!("IO Error: No files found that match the pattern \"{path}\"")))
			},
			move |_: &i64, _, _| {
				flag.store(true, Ordering::SeqCst);
				Ok(())
			},
		)
		.unwrap();

	let err = db.query_table("read_missing", vec![HostValue::Varchar("data/*.csv".into())], vec![]).unwrap_err();
	assert_eq!(err, "IO Error: No files found that match the pattern \"data/*.csv\"");
	assert!(!mapped.load(Ordering::SeqCst));
}

#[test]
fn test_zero_columns_is_a_bind_error() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_table_function(
			"nothing",
			[],
			|_| Ok(TableFunctionData::new(vec![], Vec::<i64>::new())),
			|_: &i64, _, _| Ok(()),
		)
		.unwrap();

	let err = db.query_table("nothing", vec![], vec![]).unwrap_err();
	assert_eq!(err, "nothing must return at least one column");
}

#[test]
fn test_bind_panic_becomes_error() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_table_function(
			"explode",
			[],
			|_| -> Result<TableFunctionData<i64>> { panic!("bind exploded") },
			|_: &i64, _, _| Ok(()),
		)
		.unwrap();

	assert_eq!(db.query_table("explode", vec![], vec![]).unwrap_err(), "bind exploded");
}

#[test]
fn test_mapper_error_stops_the_scan() {
	set_vector_size(4);
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	connection
		.register_table_function(
			"fragile",
			[],
			|_| Ok(TableFunctionData::new(vec![ColumnInfo::new("n", Type::Int64)], 0..10i64)),
			move |value: &i64, writers, row| {
				counter.fetch_add(1, Ordering::SeqCst);
				if *value == 2 {
					return Err(Error::Execution(format!("cannot map row {value}")));
				}
				writers[0].write(row, *value)
			},
		)
		.unwrap();

	assert_eq!(db.query_table("fragile", vec![], vec![]).unwrap_err(), "cannot map row 2");
	assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_mapper_panic_becomes_error() {
	set_vector_size(4);
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_table_function(
			"panicky",
			[],
			|_| Ok(TableFunctionData::new(vec![ColumnInfo::new("n", Type::Int64)], vec![1i64])),
			|value: &i64, _, _| panic!("mapper saw {value}"),
		)
		.unwrap();

	assert_eq!(db.query_table("panicky", vec![], vec![]).unwrap_err(), "mapper saw 1");
}

#[test]
fn test_argument_checks_happen_before_bind() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	let bound = Arc::new(AtomicBool::new(false));
	let flag = bound.clone();
	connection
		.register_table_function(
			"one_int",
			[Type::Int32],
			move |_| {
				flag.store(true, Ordering::SeqCst);
				Ok(TableFunctionData::new(vec![ColumnInfo::new("n", Type::Int32)], Vec::<i32>::new()))
			},
			|_: &i32, _, _| Ok(()),
		)
		.unwrap();

	let err = db.query_table("one_int", vec![HostValue::Varchar("x".into())], vec![]).unwrap_err();
	assert!(err.starts_with("Binder Error"), "{err}");
	let err = db.query_table("one_int", vec![], vec![]).unwrap_err();
	assert!(err.starts_with("Binder Error"), "{err}");
	let err = db.query_table("two_int", vec![], vec![]).unwrap_err();
	assert!(err.starts_with("Catalog Error"), "{err}");
	assert!(!bound.load(Ordering::SeqCst));
}

#[test]
fn test_bind_data_and_extra_info_are_released() {
	set_vector_size(2);
	let types_before = live_logical_types();
	let values_before = live_values();

	let db = MockDatabase::new();
	register_numbers(&db, vec![1, 2, 3]).unwrap();
	let extra_info = db.extra_info("numbers").unwrap();
	assert!(is_live(extra_info));

	let result = db.query_table("numbers", vec![], vec![]).unwrap();
	let bind_data = result.bind_data.unwrap() as *mut std::ffi::c_void;
	assert!(!is_live(bind_data));
	assert!(is_live(extra_info));

	drop(db);
	assert!(!is_live(extra_info));
	assert_eq!(live_logical_types(), types_before);
	assert_eq!(live_values(), values_before);
}

#[test]
fn test_parameters_do_not_leak_values() {
	let values_before = live_values();
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_table_function(
			"echo",
			[Type::Varchar],
			|parameters| {
				let text: String = parameters.get(0)?.get()?;
				Ok(TableFunctionData::new(vec![ColumnInfo::new("text", Type::Varchar)], vec![text]))
			},
			|text: &String, writers, row| writers[0].write(row, text.as_str()),
		)
		.unwrap();

	for _ in 0..3 {
		db.query_table("echo", vec![HostValue::Varchar("again".into())], vec![]).unwrap();
	}
	assert_eq!(live_values(), values_before);
}

#[test]
fn test_validity_mask_is_promoted_only_by_nulls() {
	set_vector_size(16);
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	let observed = Arc::new(Mutex::new(None));
	let slot = observed.clone();
	connection
		.register_table_function(
			"sparse",
			[],
			|_| {
				Ok(TableFunctionData::new(
					vec![ColumnInfo::new("id", Type::Int64), ColumnInfo::new("score", Type::Int32)],
					vec![(1i64, Some(10i32)), (2, None), (3, Some(30))],
				))
			},
			move |(id, score): &(i64, Option<i32>), writers, row| {
				writers[0].write(row, *id)?;
				writers[1].write(row, *score)?;
				if row == 2 {
					let (ids, scores) = (writers[0].validity(), writers[1].validity());
					*slot.lock() = Some((
						ids.is_promoted(),
						scores.is_promoted(),
						(0..3).map(|row| ids.is_valid(row)).collect::<Vec<_>>(),
						(0..3).map(|row| scores.is_valid(row)).collect::<Vec<_>>(),
					));
				}
				Ok(())
			},
		)
		.unwrap();

	let result = db.query_table("sparse", vec![], vec![]).unwrap();
	assert_eq!(result.column(1), vec![HostValue::Int32(10), HostValue::Null(Type::Int32), HostValue::Int32(30)]);

	let (ids_promoted, scores_promoted, ids_valid, scores_valid) = observed.lock().take().unwrap();
	assert!(!ids_promoted);
	assert!(scores_promoted);
	assert_eq!(ids_valid, vec![true, true, true]);
	assert_eq!(scores_valid, vec![true, false, true]);
}

#[test]
fn test_duplicate_registration_is_rejected() {
	let db = MockDatabase::new();
	register_numbers(&db, vec![1]).unwrap();

	let err = register_numbers(&db, vec![2]).unwrap_err();
	match err {
		Error::Registration {
			name,
			..
		} => assert_eq!(name, "numbers"),
		other => panic!("unexpected error: {other}"),
	}
	assert_eq!(db.query_table("numbers", vec![], vec![]).unwrap().column(0), vec![HostValue::Int64(1)]);
}
