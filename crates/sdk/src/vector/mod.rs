// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Row-indexed access to host column vectors

mod reader;
mod validity;
mod writer;

pub use reader::{DataChunkReader, ReadValue, VectorReader};
pub use validity::Validity;
pub use writer::{VectorWriter, WriteValue};
