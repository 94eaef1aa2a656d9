// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Grouped host callbacks making up the API function table

mod chunk;
mod connection;
mod helper;
mod logical_type;
mod scalar;
mod table;
mod value;
mod vector;

pub use chunk::*;
pub use connection::*;
pub use helper::*;
pub use logical_type::*;
pub use scalar::*;
pub use table::*;
pub use value::*;
pub use vector::*;
