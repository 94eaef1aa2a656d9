// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{fmt, iter::Fuse};

use duckbridge_abi::{
	constants::is_success,
	types::{BindInfoFFI, ConnectionFFI, DataChunkFFI, FunctionInfoFFI, InitInfoFFI, TableFunctionFFI},
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::guard;
use crate::{
	api::api,
	error::{Error, Result},
	ffi::{message_cstring, to_cstring},
	handle::{destroy_handle, from_handle, to_handle},
	logical_type::LogicalType,
	types::Type,
	value::ValueReader,
	vector::VectorWriter,
};

/// A result column declared by bind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
	pub name: String,
	pub ty: Type,
}

impl ColumnInfo {
	pub fn new(name: impl Into<String>, ty: Type) -> Self {
		Self {
			name: name.into(),
			ty,
		}
	}
}

/// Row count hint forwarded to the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
	pub rows: u64,
	pub exact: bool,
}

type Rows<R> = Box<dyn Iterator<Item = R> + Send>;

/// What bind produces: the result columns and a lazy source of rows
pub struct TableFunctionData<R> {
	columns: Vec<ColumnInfo>,
	data: Rows<R>,
	cardinality: Option<Cardinality>,
}

impl<R> TableFunctionData<R> {
	/// The source is not touched until the first execute call
	pub fn new<I>(columns: Vec<ColumnInfo>, data: I) -> Self
	where
		I: IntoIterator<Item = R>,
		I::IntoIter: Send + 'static,
	{
		Self {
			columns,
			data: Box::new(data.into_iter()),
			cardinality: None,
		}
	}

	pub fn with_cardinality(mut self, rows: u64, exact: bool) -> Self {
		self.cardinality = Some(Cardinality {
			rows,
			exact,
		});
		self
	}

	pub fn columns(&self) -> &[ColumnInfo] {
		&self.columns
	}

	pub fn cardinality(&self) -> Option<Cardinality> {
		self.cardinality
	}
}

impl<R> fmt::Debug for TableFunctionData<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TableFunctionData")
			.field("columns", &self.columns)
			.field("cardinality", &self.cardinality)
			.finish_non_exhaustive()
	}
}

/// Arguments of one table function call
///
/// The values are released when bind returns.
#[derive(Debug)]
pub struct BindParameters {
	positional: Vec<ValueReader>,
	named: Vec<(String, ValueReader)>,
}

impl BindParameters {
	fn read(info: *mut BindInfoFFI, named: &[(String, Type)]) -> Result<Self> {
		let callbacks = &api().table;

		let positional = (0..(callbacks.bind_get_parameter_count)(info))
			.map(|idx| ValueReader::from_raw((callbacks.bind_get_parameter)(info, idx)))
			.collect::<Result<Vec<_>>>()?;

		let mut values = Vec::new();
		for (name, _) in named {
			let c_name = to_cstring(name)?;
			let value = (callbacks.bind_get_named_parameter)(info, c_name.as_ptr());
			if !value.is_null() {
				values.push((name.clone(), ValueReader::from_raw(value)?));
			}
		}

		Ok(Self {
			positional,
			named: values,
		})
	}

	pub fn len(&self) -> usize {
		self.positional.len()
	}

	pub fn is_empty(&self) -> bool {
		self.positional.is_empty()
	}

	/// Positional argument at `index`
	pub fn get(&self, index: usize) -> Result<&ValueReader> {
		self.positional
			.get(index)
			.ok_or_else(|| Error::Bind(format!("missing argument {index}, got {}", self.positional.len())))
	}

	pub fn positional(&self) -> &[ValueReader] {
		&self.positional
	}

	/// Named argument, `None` if the caller did not pass it
	pub fn named(&self, name: &str) -> Option<&ValueReader> {
		self.named.iter().find(|(candidate, _)| candidate == name).map(|(_, value)| value)
	}
}

type Bind<R> = dyn Fn(&BindParameters) -> Result<TableFunctionData<R>> + Send + Sync;
type Mapper<R> = dyn Fn(&R, &mut [VectorWriter], usize) -> Result<()> + Send + Sync;

/// A table function: bind declares columns and a row source, the mapper writes each row
pub struct TableFunction<R> {
	name: String,
	parameters: Vec<Type>,
	named_parameters: Vec<(String, Type)>,
	bind: Box<Bind<R>>,
	mapper: Box<Mapper<R>>,
}

impl<R: 'static> TableFunction<R> {
	pub fn new<B, M>(name: impl Into<String>, bind: B, mapper: M) -> Self
	where
		B: Fn(&BindParameters) -> Result<TableFunctionData<R>> + Send + Sync + 'static,
		M: Fn(&R, &mut [VectorWriter], usize) -> Result<()> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			parameters: Vec::new(),
			named_parameters: Vec::new(),
			bind: Box::new(bind),
			mapper: Box::new(mapper),
		}
	}

	pub fn parameter(mut self, ty: Type) -> Self {
		self.parameters.push(ty);
		self
	}

	pub fn parameters(mut self, types: impl IntoIterator<Item = Type>) -> Self {
		self.parameters.extend(types);
		self
	}

	/// Optional `name := value` argument
	pub fn named_parameter(mut self, name: impl Into<String>, ty: Type) -> Self {
		self.named_parameters.push((name.into(), ty));
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub(crate) fn register(self, connection: *mut ConnectionFFI) -> Result<()> {
		let name = self.name.clone();
		self.register_native(connection).map_err(|e| Error::Registration {
			name,
			reason: e.to_string(),
		})
	}

	fn register_native(self, connection: *mut ConnectionFFI) -> Result<()> {
		let callbacks = &api().table;
		let function = NativeTableFunction::create()?;

		let name = to_cstring(&self.name)?;
		(callbacks.set_name)(function.0, name.as_ptr());
		for parameter in &self.parameters {
			let ty = LogicalType::from_type(parameter)?;
			(callbacks.add_parameter)(function.0, ty.as_ptr());
		}
		for (name, parameter) in &self.named_parameters {
			let name = to_cstring(name)?;
			let ty = LogicalType::from_type(parameter)?;
			(callbacks.add_named_parameter)(function.0, name.as_ptr(), ty.as_ptr());
		}

		debug!(
			function = %self.name,
			parameters = self.parameters.len(),
			named = self.named_parameters.len(),
			"registering table function"
		);
		let extra_info = to_handle(TableExtraInfo {
			name: self.name,
			named_parameters: self.named_parameters,
			bind: self.bind,
			mapper: self.mapper,
		});
		(callbacks.set_extra_info)(function.0, extra_info, destroy_handle);
		(callbacks.set_bind)(function.0, bind::<R>);
		(callbacks.set_init)(function.0, init);
		(callbacks.set_function)(function.0, execute::<R>);

		if !is_success((callbacks.register)(connection, function.0)) {
			return Err(Error::Execution("rejected by the host".to_string()));
		}
		Ok(())
	}
}

// Per-registration state, owned by the host through a handle
struct TableExtraInfo<R> {
	name: String,
	named_parameters: Vec<(String, Type)>,
	bind: Box<Bind<R>>,
	mapper: Box<Mapper<R>>,
}

// Per-query state; the cursor only moves forward and stays exhausted once it is
struct BindData<R> {
	columns: Vec<ColumnInfo>,
	cursor: Mutex<Fuse<Rows<R>>>,
}

struct NativeTableFunction(*mut TableFunctionFFI);

impl NativeTableFunction {
	fn create() -> Result<Self> {
		let ptr = (api().table.create)();
		if ptr.is_null() {
			return Err(Error::NullPointer("table function"));
		}
		Ok(Self(ptr))
	}
}

impl Drop for NativeTableFunction {
	fn drop(&mut self) {
		(api().table.destroy)(&mut self.0);
	}
}

// ============================================================================
// Trampolines
// ============================================================================

extern "C" fn bind<R: 'static>(info: *mut BindInfoFFI) {
	let callbacks = &api().table;

	let result = from_handle::<TableExtraInfo<R>>((callbacks.bind_get_extra_info)(info))
		.map_err(|e| e.to_string())
		.and_then(|extra| {
			guard(&extra.name, "bind", || {
				let data = {
					let parameters = BindParameters::read(info, &extra.named_parameters)?;
					(extra.bind)(&parameters)?
				};
				if data.columns.is_empty() {
					return Err(Error::Bind(format!("{} must return at least one column", extra.name)));
				}

				for column in &data.columns {
					let name = to_cstring(&column.name)?;
					let ty = LogicalType::from_type(&column.ty)?;
					(callbacks.bind_add_result_column)(info, name.as_ptr(), ty.as_ptr());
				}
				if let Some(cardinality) = data.cardinality {
					(callbacks.bind_set_cardinality)(info, cardinality.rows, cardinality.exact);
				}

				let bind_data = to_handle(BindData {
					columns: data.columns,
					cursor: Mutex::new(data.data.fuse()),
				});
				(callbacks.bind_set_bind_data)(info, bind_data, destroy_handle);
				Ok(())
			})
		});

	if let Err(message) = result {
		let message = message_cstring(&message);
		(callbacks.bind_set_error)(info, message.as_ptr());
	}
}

extern "C" fn init(_info: *mut InitInfoFFI) {}

extern "C" fn execute<R: 'static>(info: *mut FunctionInfoFFI, output: *mut DataChunkFFI) {
	let callbacks = &api().table;

	let result = from_handle::<TableExtraInfo<R>>((callbacks.function_get_extra_info)(info))
		.map_err(|e| e.to_string())
		.and_then(|extra| {
			guard(&extra.name, "execute", || {
				let bind_data = from_handle::<BindData<R>>((callbacks.function_get_bind_data)(info))?;
				let capacity = (api().helper.vector_size)() as usize;

				let mut writers = bind_data
					.columns
					.iter()
					.enumerate()
					.map(|(idx, column)| {
						VectorWriter::new((api().chunk.get_vector)(output, idx as u64), &column.ty, capacity)
					})
					.collect::<Result<Vec<_>>>()?;

				let mut cursor = bind_data.cursor.lock();
				let mut rows = 0;
				while rows < capacity {
					let Some(row) = cursor.next() else {
						break;
					};
					(extra.mapper)(&row, &mut writers, rows)?;
					rows += 1;
				}

				(api().chunk.set_size)(output, rows as u64);
				trace!(function = %extra.name, rows, capacity, "chunk filled");
				Ok(())
			})
		});

	if let Err(message) = result {
		let message = message_cstring(&message);
		(callbacks.function_set_error)(info, message.as_ptr());
	}
}
