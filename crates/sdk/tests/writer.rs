// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Nested and fixed-point output written through scalar functions

use std::{
	collections::{BTreeMap, HashMap},
	str::FromStr,
};

use bigdecimal::BigDecimal;
use duckbridge_sdk::{
	error::{Error, Result},
	testing::{HostValue, MockDatabase},
	types::{Blob, Decimal, Type},
};

fn varchar(value: &str) -> HostValue {
	HostValue::Varchar(value.to_string())
}

fn strings(values: &[&str]) -> Vec<HostValue> {
	values.iter().map(|value| varchar(value)).collect()
}

#[test]
fn test_list_of_strings() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_unary_scalar_function("split_words", |text: String| {
			Ok(text.split_whitespace().map(str::to_string).collect::<Vec<String>>())
		})
		.unwrap();
	assert_eq!(db.scalar_signature("split_words").unwrap().return_type, Type::list(Type::Varchar));

	let result = db
		.call_scalar("split_words", vec![vec![
			varchar("the quick brown fox"),
			HostValue::Null(Type::Varchar),
			varchar(""),
			varchar("jumps over a considerably lazy dog"),
		]])
		.unwrap();
	assert_eq!(result, vec![
		HostValue::List(strings(&["the", "quick", "brown", "fox"])),
		HostValue::Null(Type::list(Type::Varchar)),
		HostValue::List(vec![]),
		HostValue::List(strings(&["jumps", "over", "a", "considerably", "lazy", "dog"])),
	]);
}

#[test]
fn test_list_child_grows_past_capacity() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection.register_unary_scalar_function("series", |n: i32| Ok((0..n).collect::<Vec<i32>>())).unwrap();

	let result = db
		.call_scalar("series", vec![vec![HostValue::Int32(3000), HostValue::Int32(2), HostValue::Int32(5000)]])
		.unwrap();
	assert_eq!(result.len(), 3);
	assert_eq!(result[0], HostValue::List((0..3000).map(HostValue::Int32).collect()));
	assert_eq!(result[1], HostValue::List(vec![HostValue::Int32(0), HostValue::Int32(1)]));
	assert_eq!(result[2], HostValue::List((0..5000).map(HostValue::Int32).collect()));
}

#[test]
fn test_list_of_lists_with_null_elements() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_unary_scalar_function("triangle", |n: i32| {
			Ok((0..n)
				.map(|row| (0..row).map(|idx| (idx % 2 == 0).then_some(idx)).collect::<Vec<Option<i32>>>())
				.collect::<Vec<_>>())
		})
		.unwrap();
	assert_eq!(db.scalar_signature("triangle").unwrap().return_type, Type::list(Type::list(Type::Int32)));

	let result = db.call_scalar("triangle", vec![vec![HostValue::Int32(4)]]).unwrap();
	let null = HostValue::Null(Type::Int32);
	assert_eq!(result, vec![HostValue::List(vec![
		HostValue::List(vec![]),
		HostValue::List(vec![HostValue::Int32(0)]),
		HostValue::List(vec![HostValue::Int32(0), null.clone()]),
		HostValue::List(vec![HostValue::Int32(0), null, HostValue::Int32(2)]),
	])]);
}

#[test]
fn test_map() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_unary_scalar_function("word_counts", |text: String| {
			let mut counts = BTreeMap::new();
			for word in text.split_whitespace() {
				*counts.entry(word.to_string()).or_insert(0i64) += 1;
			}
			Ok(counts)
		})
		.unwrap();
	assert_eq!(db.scalar_signature("word_counts").unwrap().return_type, Type::map(Type::Varchar, Type::Int64));

	let result =
		db.call_scalar("word_counts", vec![vec![varchar("b a b c b"), varchar(""), varchar("z")]]).unwrap();
	assert_eq!(result, vec![
		HostValue::Map(vec![
			(varchar("a"), HostValue::Int64(1)),
			(varchar("b"), HostValue::Int64(3)),
			(varchar("c"), HostValue::Int64(1)),
		]),
		HostValue::Map(vec![]),
		HostValue::Map(vec![(varchar("z"), HostValue::Int64(1))]),
	]);
}

#[test]
fn test_hash_map_single_entry() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_unary_scalar_function("tag", |id: u32| Ok(HashMap::from([(id, format!("tag-{id}"))])))
		.unwrap();

	let result = db.call_scalar("tag", vec![vec![HostValue::UInt32(7)]]).unwrap();
	assert_eq!(result, vec![HostValue::Map(vec![(HostValue::UInt32(7), varchar("tag-7"))])]);
}

#[test]
fn test_fixed_size_array() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection.register_unary_scalar_function("multiples", |x: i32| Ok([x, x * 2, x * 3])).unwrap();
	assert_eq!(db.scalar_signature("multiples").unwrap().return_type, Type::array(Type::Int32, 3));

	let result =
		db.call_scalar("multiples", vec![vec![HostValue::Int32(1), HostValue::Null(Type::Int32), HostValue::Int32(-2)]]).unwrap();
	assert_eq!(result, vec![
		HostValue::Array(vec![HostValue::Int32(1), HostValue::Int32(2), HostValue::Int32(3)]),
		HostValue::Null(Type::array(Type::Int32, 3)),
		HostValue::Array(vec![HostValue::Int32(-2), HostValue::Int32(-4), HostValue::Int32(-6)]),
	]);
}

#[test]
fn test_array_length_mismatch() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_scalar_function("short_array", [Type::Int32], Type::array(Type::Int32, 3), |input, output| {
			for row in 0..input.len() {
				output.write(row, vec![1i32, 2])?;
			}
			Ok(())
		})
		.unwrap();

	let err = db.call_scalar("short_array", vec![vec![HostValue::Int32(0)]]).unwrap_err();
	assert_eq!(err, "array value has 2 elements, INTEGER[3] expects 3");
}

fn file_info_type() -> Type {
	Type::structure([("name", Type::Varchar), ("size", Type::Int64), ("tags", Type::list(Type::Varchar))])
}

#[test]
fn test_struct_fields() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_scalar_function("file_info", [Type::Varchar], file_info_type(), |input, output| {
			let paths = input.column(0)?;
			for row in 0..input.len() {
				let Some(path) = paths.get::<String>(row)? else {
					output.write_null(row)?;
					continue;
				};
				let name = path.rsplit('/').next().unwrap_or_default().to_string();
				let tags: Vec<String> = path.split('/').filter(|part| !part.is_empty()).map(str::to_string).collect();
				output.field_by_name("name")?.write(row, name)?;
				output.field(1)?.write(row, path.len() as i64)?;
				output.field_by_name("tags")?.write(row, tags)?;
				output.set_valid(row);
			}
			Ok(())
		})
		.unwrap();

	let result = db
		.call_scalar("file_info", vec![vec![varchar("/data/events.parquet"), HostValue::Null(Type::Varchar), varchar("x")]])
		.unwrap();
	assert_eq!(result, vec![
		HostValue::Struct(vec![
			("name".to_string(), varchar("events.parquet")),
			("size".to_string(), HostValue::Int64(20)),
			("tags".to_string(), HostValue::List(strings(&["data", "events.parquet"]))),
		]),
		HostValue::Null(file_info_type()),
		HostValue::Struct(vec![
			("name".to_string(), varchar("x")),
			("size".to_string(), HostValue::Int64(1)),
			("tags".to_string(), HostValue::List(strings(&["x"]))),
		]),
	]);
}

#[test]
fn test_unknown_struct_field() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_scalar_function("bad_field", [Type::Int32], file_info_type(), |input, output| {
			for row in 0..input.len() {
				output.field_by_name("owner")?.write(row, "root")?;
			}
			Ok(())
		})
		.unwrap();

	let err = db.call_scalar("bad_field", vec![vec![HostValue::Int32(0)]]).unwrap_err();
	assert_eq!(err, "STRUCT(name VARCHAR, size BIGINT, tags VARCHAR[]) has no field named owner");
}

fn level_type() -> Type {
	Type::enumeration(["low", "mid", "high"])
}

#[test]
fn test_enum_values() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_scalar_function("level", [Type::Int32], level_type(), |input, output| {
			let scores = input.column(0)?;
			for row in 0..input.len() {
				let level = match scores.get::<i32>(row)? {
					None => None,
					Some(score) if score < 10 => Some("low"),
					Some(score) if score < 100 => Some("mid"),
					Some(score) if score < 1000 => Some("high"),
					Some(_) => Some("extreme"),
				};
				output.write(row, level)?;
			}
			Ok(())
		})
		.unwrap();

	let result = db
		.call_scalar("level", vec![vec![HostValue::Int32(5), HostValue::Int32(50), HostValue::Null(Type::Int32), HostValue::Int32(500)]])
		.unwrap();
	assert_eq!(result, vec![
		HostValue::Enum("low".into()),
		HostValue::Enum("mid".into()),
		HostValue::Null(level_type()),
		HostValue::Enum("high".into()),
	]);

	let err = db.call_scalar("level", vec![vec![HostValue::Int32(5000)]]).unwrap_err();
	assert_eq!(err, "'extreme' is not a value of ENUM('low', 'mid', 'high')");
}

fn register_parse_decimal(db: &MockDatabase, name: &str, ty: Type) -> Result<()> {
	db.connect()?.register_scalar_function(name, [Type::Varchar], ty, |input, output| {
		let texts = input.column(0)?;
		for row in 0..input.len() {
			match texts.get::<String>(row)? {
				Some(text) => {
					let value = BigDecimal::from_str(&text).map_err(|e| Error::Execution(e.to_string()))?;
					output.write(row, value)?;
				}
				None => output.write_null(row)?,
			}
		}
		Ok(())
	})
}

#[test]
fn test_decimal_rounds_half_even() {
	let db = MockDatabase::new();
	register_parse_decimal(&db, "to_money", Type::decimal(9, 2)).unwrap();

	let result = db
		.call_scalar("to_money", vec![strings(&["1.005", "1.015", "-2.345", "42", "0.1"])])
		.unwrap();
	assert_eq!(result, vec![
		HostValue::Decimal(Decimal::new(100, 2)),
		HostValue::Decimal(Decimal::new(102, 2)),
		HostValue::Decimal(Decimal::new(-234, 2)),
		HostValue::Decimal(Decimal::new(4200, 2)),
		HostValue::Decimal(Decimal::new(10, 2)),
	]);
}

#[test]
fn test_decimal_storage_widths() {
	let db = MockDatabase::new();
	for (name, width) in [("dec4", 4u8), ("dec9", 9), ("dec18", 18), ("dec38", 38)] {
		register_parse_decimal(&db, name, Type::decimal(width, 1)).unwrap();
		let result = db.call_scalar(name, vec![strings(&["-12.3", "99.9"])]).unwrap();
		assert_eq!(result, vec![HostValue::Decimal(Decimal::new(-123, 1)), HostValue::Decimal(Decimal::new(999, 1))]);
	}

	let result = db.call_scalar("dec38", vec![strings(&["1234567890123456789012345678901234567.8"])]).unwrap();
	assert_eq!(result, vec![HostValue::Decimal(Decimal::new(12345678901234567890123456789012345678, 1))]);
}

#[test]
fn test_decimal_overflow() {
	let db = MockDatabase::new();
	register_parse_decimal(&db, "small_money", Type::decimal(4, 2)).unwrap();

	assert_eq!(
		db.call_scalar("small_money", vec![strings(&["99.99"])]).unwrap(),
		vec![HostValue::Decimal(Decimal::new(9999, 2))]
	);
	let err = db.call_scalar("small_money", vec![strings(&["123.45"])]).unwrap_err();
	assert_eq!(err, "12345 overflows DECIMAL(4,2)");
}

#[test]
fn test_decimal_value_is_rescaled() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_scalar_function("rescale", [Type::Int32], Type::decimal(9, 2), |input, output| {
			for row in 0..input.len() {
				output.write(row, Decimal::new(12345, 3))?;
			}
			Ok(())
		})
		.unwrap();

	let result = db.call_scalar("rescale", vec![vec![HostValue::Int32(0)]]).unwrap();
	assert_eq!(result, vec![HostValue::Decimal(Decimal::new(1234, 2))]);
}

#[test]
fn test_blob() {
	let db = MockDatabase::new();
	let connection = db.connect().unwrap();
	connection
		.register_unary_scalar_function("to_bytes", |text: String| Ok(Blob::new(text.into_bytes())))
		.unwrap();
	connection.register_unary_scalar_function("blob_len", |blob: Blob| Ok(blob.len() as i64)).unwrap();

	let result = db.call_scalar("to_bytes", vec![strings(&["\u{1}abc", "a string longer than twelve bytes"])]).unwrap();
	assert_eq!(result, vec![
		HostValue::Blob(b"\x01abc".to_vec()),
		HostValue::Blob(b"a string longer than twelve bytes".to_vec()),
	]);

	let result = db
		.call_scalar("blob_len", vec![vec![HostValue::Blob(vec![0, 1, 2]), HostValue::Null(Type::Blob)]])
		.unwrap();
	assert_eq!(result, vec![HostValue::Int64(3), HostValue::Null(Type::Int64)]);
}
