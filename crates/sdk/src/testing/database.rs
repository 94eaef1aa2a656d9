// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	cell::{Cell, RefCell},
	collections::HashMap,
	ffi::{CStr, c_char, c_void},
	ptr::null_mut,
};

use duckbridge_abi::{
	constants::API_VERSION_PREFIX,
	extension::{ExtensionAccessFFI, ExtensionEntry},
	types::{
		BindInfoFFI, DatabaseFFI, ExtensionInfoFFI, FunctionInfoFFI, InitInfoFFI, ScalarFunctionCallback,
		TableBindCallback, TableFunctionCallback, TableInitCallback,
	},
};

use super::{
	HostValue, vector_size,
	callbacks::{API, ExtraInfo, MockBindInfo, MockFunctionInfo},
	vector::{MockChunk, MockVector},
};
use crate::{connection::Connection, error::Result, types::Type};

pub(crate) enum Registered {
	Scalar(ScalarEntry),
	Table(TableEntry),
}

pub(crate) struct ScalarEntry {
	pub(crate) parameters: Vec<Type>,
	pub(crate) return_type: Type,
	pub(crate) varargs: Option<Type>,
	pub(crate) volatile: bool,
	pub(crate) special_handling: bool,
	pub(crate) extra_info: Option<ExtraInfo>,
	pub(crate) function: ScalarFunctionCallback,
}

pub(crate) struct TableEntry {
	pub(crate) parameters: Vec<Type>,
	pub(crate) named_parameters: Vec<(String, Type)>,
	pub(crate) extra_info: Option<ExtraInfo>,
	pub(crate) bind: TableBindCallback,
	pub(crate) init: TableInitCallback,
	pub(crate) function: TableFunctionCallback,
}

/// Catalog shared by every connection to one database
#[derive(Default)]
pub(crate) struct DatabaseState {
	pub(crate) functions: RefCell<HashMap<String, Registered>>,
	pub(crate) open_connections: Cell<usize>,
}

/// Scalar function signature as the host recorded it
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSignature {
	pub parameters: Vec<Type>,
	pub return_type: Type,
	pub varargs: Option<Type>,
	pub volatile: bool,
	pub special_handling: bool,
}

/// Everything one table function call produced
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
	/// Columns declared by bind
	pub columns: Vec<(String, Type)>,
	/// Row count of every execute call, ending with the empty chunk
	pub chunk_sizes: Vec<usize>,
	pub rows: Vec<Vec<HostValue>>,
	pub cardinality: Option<(u64, bool)>,
	/// Bind data handle the extension installed, already released
	pub bind_data: Option<usize>,
}

impl QueryResult {
	/// All values of one column
	pub fn column(&self, index: usize) -> Vec<HostValue> {
		self.rows.iter().map(|row| row[index].clone()).collect()
	}
}

/// An in-process host database
///
/// Functions registered through its connections are torn down, and their extra info
/// destroyed, when the database is dropped.
pub struct MockDatabase {
	state: Box<DatabaseState>,
}

impl Default for MockDatabase {
	fn default() -> Self {
		Self::new()
	}
}

impl MockDatabase {
	/// A new empty database; also installs the mock API table
	pub fn new() -> Self {
		super::install();
		Self {
			state: Box::default(),
		}
	}

	pub fn as_ptr(&self) -> *mut DatabaseFFI {
		(&*self.state as *const DatabaseState).cast_mut().cast()
	}

	pub fn connect(&self) -> Result<Connection> {
		Connection::open(self.as_ptr())
	}

	pub fn open_connections(&self) -> usize {
		self.state.open_connections.get()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.state.functions.borrow().contains_key(name)
	}

	/// Extra info handle attached to a registered function
	pub fn extra_info(&self, name: &str) -> Option<*mut c_void> {
		match self.state.functions.borrow().get(name)? {
			Registered::Scalar(entry) => entry.extra_info.as_ref().map(|info| info.data),
			Registered::Table(entry) => entry.extra_info.as_ref().map(|info| info.data),
		}
	}

	pub fn scalar_signature(&self, name: &str) -> Option<ScalarSignature> {
		match self.state.functions.borrow().get(name)? {
			Registered::Scalar(entry) => Some(ScalarSignature {
				parameters: entry.parameters.clone(),
				return_type: entry.return_type.clone(),
				varargs: entry.varargs.clone(),
				volatile: entry.volatile,
				special_handling: entry.special_handling,
			}),
			Registered::Table(_) => None,
		}
	}

	/// Named parameters a table function accepts
	pub fn named_parameters(&self, name: &str) -> Option<Vec<(String, Type)>> {
		match self.state.functions.borrow().get(name)? {
			Registered::Table(entry) => Some(entry.named_parameters.clone()),
			Registered::Scalar(_) => None,
		}
	}

	/// Run `SELECT * FROM name(parameters..., named := ...)` to completion
	///
	/// Drives bind, init and execute until an empty chunk comes back, then releases the
	/// bind data. Errors are the strings the extension reported.
	pub fn query_table(
		&self,
		name: &str,
		parameters: Vec<HostValue>,
		named: Vec<(&str, HostValue)>,
	) -> std::result::Result<QueryResult, String> {
		let (declared, extra_info, bind, init, function) = match self.state.functions.borrow().get(name) {
			Some(Registered::Table(entry)) => (
				entry.parameters.clone(),
				entry.extra_info.as_ref().map_or(null_mut(), |info| info.data),
				entry.bind,
				entry.init,
				entry.function,
			),
			_ => return Err(format!("Catalog Error: Table Function with name {name} does not exist!")),
		};
		check_arguments(name, &declared, None, &parameters)?;

		let mut bind_info = MockBindInfo {
			extra_info,
			parameters,
			named: named.into_iter().map(|(key, value)| (key.to_string(), value)).collect(),
			columns: Vec::new(),
			bind_data: None,
			cardinality: None,
			error: None,
		};
		bind((&mut bind_info as *mut MockBindInfo).cast::<BindInfoFFI>());
		if let Some(error) = bind_info.error.take() {
			return Err(error);
		}
		let bind_data = bind_info.bind_data.take();
		let bind_data_ptr = bind_data.as_ref().map_or(null_mut(), |data| data.data);

		let mut init_info = ();
		init((&mut init_info as *mut ()).cast::<InitInfoFFI>());

		let types: Vec<Type> = bind_info.columns.iter().map(|(_, ty)| ty.clone()).collect();
		let mut chunk_sizes = Vec::new();
		let mut rows = Vec::new();
		loop {
			let mut chunk = MockChunk::new(&types, vector_size() as usize);
			let mut function_info = MockFunctionInfo {
				extra_info,
				bind_data: bind_data_ptr,
				error: None,
			};
			function((&mut function_info as *mut MockFunctionInfo).cast::<FunctionInfoFFI>(), chunk.as_ptr());
			if let Some(error) = function_info.error {
				return Err(error);
			}
			chunk_sizes.push(chunk.size);
			if chunk.size == 0 {
				break;
			}
			rows.extend(chunk.rows());
		}
		drop(bind_data);

		Ok(QueryResult {
			columns: bind_info.columns,
			chunk_sizes,
			rows,
			cardinality: bind_info.cardinality,
			bind_data: (!bind_data_ptr.is_null()).then_some(bind_data_ptr as usize),
		})
	}

	/// Evaluate a scalar function over argument columns of equal length
	pub fn call_scalar(&self, name: &str, arguments: Vec<Vec<HostValue>>) -> std::result::Result<Vec<HostValue>, String> {
		let (declared, varargs, return_type, extra_info, function) = match self.state.functions.borrow().get(name) {
			Some(Registered::Scalar(entry)) => (
				entry.parameters.clone(),
				entry.varargs.clone(),
				entry.return_type.clone(),
				entry.extra_info.as_ref().map_or(null_mut(), |info| info.data),
				entry.function,
			),
			_ => return Err(format!("Catalog Error: Scalar Function with name {name} does not exist!")),
		};
		let first: Vec<HostValue> = arguments
			.iter()
			.map(|column| column.first().cloned().unwrap_or(HostValue::Null(Type::Varchar)))
			.collect();
		check_arguments(name, &declared, varargs.as_ref(), &first)?;

		let len = arguments.first().map_or(0, Vec::len);
		let capacity = (vector_size() as usize).max(len);
		let types: Vec<Type> = (0..arguments.len())
			.map(|idx| declared.get(idx).or(varargs.as_ref()).cloned().unwrap_or(Type::Varchar))
			.collect();
		let mut input = MockChunk::new(&types, capacity);
		for (vector, column) in input.vectors.iter_mut().zip(&arguments) {
			assert_eq!(column.len(), len, "argument columns must have equal length");
			for (row, value) in column.iter().enumerate() {
				vector.set(row, value);
			}
		}
		input.size = len;

		let mut output = MockVector::new(&return_type, capacity);
		let mut function_info = MockFunctionInfo {
			extra_info,
			bind_data: null_mut(),
			error: None,
		};
		function(
			(&mut function_info as *mut MockFunctionInfo).cast::<FunctionInfoFFI>(),
			input.as_ptr(),
			output.as_ptr(),
		);
		if let Some(error) = function_info.error {
			return Err(error);
		}
		Ok((0..len).map(|row| output.get(row)).collect())
	}

	/// Load an extension through its `<name>_duckbridge_init` entry point
	pub fn load_extension(&self, entry: ExtensionEntry) -> std::result::Result<(), String> {
		let mut database = self.as_ptr();
		let mut info = MockExtensionInfo {
			database: &mut database,
			error: None,
		};
		let access = ExtensionAccessFFI {
			set_error: test_extension_set_error,
			get_database: test_extension_database,
			get_api: test_extension_api,
		};
		let loaded = unsafe { entry((&mut info as *mut MockExtensionInfo).cast(), &access) };
		match (loaded, info.error) {
			(true, None) => Ok(()),
			(_, Some(error)) => Err(error),
			(false, None) => Err("extension failed to load".to_string()),
		}
	}
}

fn check_arguments(
	name: &str,
	declared: &[Type],
	varargs: Option<&Type>,
	arguments: &[HostValue],
) -> std::result::Result<(), String> {
	let arity_ok = match varargs {
		Some(_) => arguments.len() >= declared.len(),
		None => arguments.len() == declared.len(),
	};
	if !arity_ok {
		return Err(format!(
			"Binder Error: {name} takes {} arguments, {} given",
			declared.len(),
			arguments.len()
		));
	}
	for (idx, argument) in arguments.iter().enumerate() {
		let Some(expected) = declared.get(idx).or(varargs) else {
			continue;
		};
		if let Some(actual) = argument.scalar_type() {
			if !argument.is_null() && actual != *expected {
				return Err(format!("Binder Error: argument {idx} of {name} must be {expected}, got {actual}"));
			}
		}
	}
	Ok(())
}

struct MockExtensionInfo {
	database: *mut *mut DatabaseFFI,
	error: Option<String>,
}

extern "C" fn test_extension_set_error(info: *mut ExtensionInfoFFI, error: *const c_char) {
	let message = unsafe { CStr::from_ptr(error) }.to_string_lossy().into_owned();
	unsafe { (*info.cast::<MockExtensionInfo>()).error = Some(message) };
}

extern "C" fn test_extension_database(info: *mut ExtensionInfoFFI) -> *mut *mut DatabaseFFI {
	unsafe { (*info.cast::<MockExtensionInfo>()).database }
}

extern "C" fn test_extension_api(_info: *mut ExtensionInfoFFI, version: *const c_char) -> *const c_void {
	let version = unsafe { CStr::from_ptr(version) }.to_string_lossy();
	if version.starts_with(API_VERSION_PREFIX) {
		std::ptr::from_ref(&API).cast()
	} else {
		std::ptr::null()
	}
}
