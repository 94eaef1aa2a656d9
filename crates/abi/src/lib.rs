// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! C ABI definitions for duckbridge extensions
//!
//! This crate describes the native surface an extension consumes from the host engine:
//! opaque handle types, type codes, value layouts, and the function table the host hands
//! to the extension at load time. It contains no logic.

// #![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod api;
pub mod callbacks;
pub mod constants;
pub mod extension;
pub mod types;
