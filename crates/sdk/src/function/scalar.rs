// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use duckbridge_abi::{
	constants::is_success,
	types::{ConnectionFFI, DataChunkFFI, FunctionInfoFFI, ScalarFunctionFFI, VectorFFI},
};
use tracing::debug;

use super::guard;
use crate::{
	api::api,
	error::{Error, Result},
	ffi::{message_cstring, to_cstring},
	handle::{destroy_handle, from_handle, to_handle},
	logical_type::LogicalType,
	types::{GetType, Type},
	vector::{DataChunkReader, ReadValue, VectorWriter, WriteValue},
};

type Compute = dyn Fn(&DataChunkReader, &mut VectorWriter) -> Result<()> + Send + Sync;

/// A vectorized scalar function: one input chunk in, one output vector out
pub struct ScalarFunction {
	name: String,
	parameters: Vec<Type>,
	return_type: Type,
	varargs: Option<Type>,
	volatile: bool,
	special_handling: bool,
	compute: Box<Compute>,
}

impl ScalarFunction {
	pub fn new<F>(name: impl Into<String>, return_type: Type, compute: F) -> Self
	where
		F: Fn(&DataChunkReader, &mut VectorWriter) -> Result<()> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			parameters: Vec::new(),
			return_type,
			varargs: None,
			volatile: false,
			special_handling: false,
			compute: Box::new(compute),
		}
	}

	/// A single argument function; NULL in gives NULL out
	pub fn unary<A, R, F>(name: impl Into<String>, f: F) -> Self
	where
		A: ReadValue + GetType,
		R: WriteValue + GetType,
		F: Fn(A) -> Result<R> + Send + Sync + 'static,
	{
		Self::new(name, R::get_type(), move |input, output| {
			let column = input.column(0)?;
			for row in 0..input.len() {
				match column.get::<A>(row)? {
					Some(a) => output.write(row, f(a)?)?,
					None => output.write_null(row)?,
				}
			}
			Ok(())
		})
		.parameter(A::get_type())
	}

	/// A two argument function; NULL in either argument gives NULL out
	pub fn binary<A, B, R, F>(name: impl Into<String>, f: F) -> Self
	where
		A: ReadValue + GetType,
		B: ReadValue + GetType,
		R: WriteValue + GetType,
		F: Fn(A, B) -> Result<R> + Send + Sync + 'static,
	{
		Self::new(name, R::get_type(), move |input, output| {
			let (left, right) = (input.column(0)?, input.column(1)?);
			for row in 0..input.len() {
				match (left.get::<A>(row)?, right.get::<B>(row)?) {
					(Some(a), Some(b)) => output.write(row, f(a, b)?)?,
					_ => output.write_null(row)?,
				}
			}
			Ok(())
		})
		.parameter(A::get_type())
		.parameter(B::get_type())
	}

	pub fn parameter(mut self, ty: Type) -> Self {
		self.parameters.push(ty);
		self
	}

	pub fn parameters(mut self, types: impl IntoIterator<Item = Type>) -> Self {
		self.parameters.extend(types);
		self
	}

	/// Accept any number of trailing arguments of `ty`
	pub fn varargs(mut self, ty: Type) -> Self {
		self.varargs = Some(ty);
		self
	}

	/// Results may differ between calls with the same input
	pub fn volatile(mut self) -> Self {
		self.volatile = true;
		self
	}

	/// Pass NULL inputs to the function instead of short-circuiting them
	pub fn special_handling(mut self) -> Self {
		self.special_handling = true;
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
		let callbacks = &api().scalar;
		let function = NativeScalarFunction::create()?;

		let name = to_cstring(&self.name)?;
		(callbacks.set_name)(function.0, name.as_ptr());
		for parameter in &self.parameters {
			let ty = LogicalType::from_type(parameter)?;
			(callbacks.add_parameter)(function.0, ty.as_ptr());
		}
		let return_type = LogicalType::from_type(&self.return_type)?;
		(callbacks.set_return_type)(function.0, return_type.as_ptr());
		if let Some(varargs) = &self.varargs {
			let ty = LogicalType::from_type(varargs)?;
			(callbacks.set_varargs)(function.0, ty.as_ptr());
		}
		if self.volatile {
			(callbacks.set_volatile)(function.0);
		}
		if self.special_handling {
			(callbacks.set_special_handling)(function.0);
		}

		debug!(function = %self.name, parameters = self.parameters.len(), "registering scalar function");
		let extra_info = to_handle(ScalarExtraInfo {
			name: self.name,
			return_type: self.return_type,
			compute: self.compute,
		});
		(callbacks.set_extra_info)(function.0, extra_info, destroy_handle);
		(callbacks.set_function)(function.0, execute);

		if !is_success((callbacks.register)(connection, function.0)) {
			return Err(Error::Execution("rejected by the host".to_string()));
		}
		Ok(())
	}
}

// Per-registration state, owned by the host through a handle
struct ScalarExtraInfo {
	name: String,
	return_type: Type,
	compute: Box<Compute>,
}

struct NativeScalarFunction(*mut ScalarFunctionFFI);

impl NativeScalarFunction {
	fn create() -> Result<Self> {
		let ptr = (api().scalar.create)();
		if ptr.is_null() {
			return Err(Error::NullPointer("scalar function"));
		}
		Ok(Self(ptr))
	}
}

impl Drop for NativeScalarFunction {
	fn drop(&mut self) {
		(api().scalar.destroy)(&mut self.0);
	}
}

extern "C" fn execute(info: *mut FunctionInfoFFI, input: *mut DataChunkFFI, output: *mut VectorFFI) {
	let callbacks = &api().scalar;
	let extra_info = (callbacks.get_extra_info)(info);

	let result = from_handle::<ScalarExtraInfo>(extra_info).map_err(|e| e.to_string()).and_then(|extra| {
		guard(&extra.name, "execute", || {
			let input = DataChunkReader::new(input)?;
			let mut output = VectorWriter::new(output, &extra.return_type, input.len())?;
			(extra.compute)(&input, &mut output)
		})
	});

	if let Err(message) = result {
		let message = message_cstring(&message);
		(callbacks.set_error)(info, message.as_ptr());
	}
}
