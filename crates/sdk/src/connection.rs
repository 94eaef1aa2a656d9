// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ptr::null_mut;

use duckbridge_abi::{
	constants::is_success,
	types::{ConnectionFFI, DatabaseFFI},
};
use tracing::debug;

use crate::{
	api::{self, api},
	error::{Error, Result},
	function::{BindParameters, ScalarFunction, TableFunction, TableFunctionData},
	types::{GetType, Type},
	vector::{DataChunkReader, ReadValue, VectorWriter, WriteValue},
};

/// A host connection functions are registered through
///
/// Connections obtained with [`Connection::open`] are closed on drop; borrowed ones from
/// [`Connection::from_raw`] are left to their owner.
#[derive(Debug)]
pub struct Connection {
	ptr: *mut ConnectionFFI,
	owned: bool,
}

impl Connection {
	/// Borrow a connection the host handed out
	pub fn from_raw(ptr: *mut ConnectionFFI) -> Result<Self> {
		api::get()?;
		if ptr.is_null() {
			return Err(Error::NullPointer("connection"));
		}
		Ok(Self {
			ptr,
			owned: false,
		})
	}

	/// Open a new connection to `database`
	pub fn open(database: *mut DatabaseFFI) -> Result<Self> {
		let callbacks = &api::get()?.connection;
		if database.is_null() {
			return Err(Error::NullPointer("database"));
		}
		let mut ptr = null_mut();
		if !is_success((callbacks.connect)(database, &mut ptr)) || ptr.is_null() {
			return Err(Error::Connection("could not connect to the database".to_string()));
		}
		debug!("connection opened");
		Ok(Self {
			ptr,
			owned: true,
		})
	}

	pub fn as_ptr(&self) -> *mut ConnectionFFI {
		self.ptr
	}

	/// Register a vectorized scalar function
	///
	/// `compute` receives the whole input chunk and writes one output row per input row.
	pub fn register_scalar_function<F>(
		&self,
		name: &str,
		parameter_types: impl IntoIterator<Item = Type>,
		return_type: Type,
		compute: F,
	) -> Result<()>
	where
		F: Fn(&DataChunkReader, &mut VectorWriter) -> Result<()> + Send + Sync + 'static,
	{
		self.register_scalar(ScalarFunction::new(name, return_type, compute).parameters(parameter_types))
	}

	/// Register a single argument function with NULL propagation
	pub fn register_unary_scalar_function<A, R, F>(&self, name: &str, f: F) -> Result<()>
	where
		A: ReadValue + GetType,
		R: WriteValue + GetType,
		F: Fn(A) -> Result<R> + Send + Sync + 'static,
	{
		self.register_scalar(ScalarFunction::unary(name, f))
	}

	/// Register a two argument function with NULL propagation
	pub fn register_binary_scalar_function<A, B, R, F>(&self, name: &str, f: F) -> Result<()>
	where
		A: ReadValue + GetType,
		B: ReadValue + GetType,
		R: WriteValue + GetType,
		F: Fn(A, B) -> Result<R> + Send + Sync + 'static,
	{
		self.register_scalar(ScalarFunction::binary(name, f))
	}

	pub fn register_scalar(&self, function: ScalarFunction) -> Result<()> {
		function.register(self.ptr)
	}

	/// Register a table function
	///
	/// `bind` runs once per query and declares the columns plus a lazy row source; `mapper`
	/// writes one source row into the output writers at the given row index.
	pub fn register_table_function<R, B, M>(
		&self,
		name: &str,
		parameter_types: impl IntoIterator<Item = Type>,
		bind: B,
		mapper: M,
	) -> Result<()>
	where
		R: 'static,
		B: Fn(&BindParameters) -> Result<TableFunctionData<R>> + Send + Sync + 'static,
		M: Fn(&R, &mut [VectorWriter], usize) -> Result<()> + Send + Sync + 'static,
	{
		self.register_table(TableFunction::new(name, bind, mapper).parameters(parameter_types))
	}

	pub fn register_table<R: 'static>(&self, function: TableFunction<R>) -> Result<()> {
		function.register(self.ptr)
	}
}

impl Drop for Connection {
	fn drop(&mut self) {
		if self.owned {
			(api().connection.disconnect)(&mut self.ptr);
			debug!("connection closed");
		}
	}
}
