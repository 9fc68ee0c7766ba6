/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! In-process engine for integration tests.
//!
//! Implements the engine side of the GDExtension interface functions that godot-rust loads: variants and builtin types,
//! the class database, objects with reference counting and instance bindings, method binds of `Object` and `RefCounted`,
//! and signals. A library is driven through [`load()`] and the functions of the [`host`] module, which play the part of
//! editor and scripts.
//!
//! The engine is process-wide, like the real one. Only one library should be loaded at a time.

mod callables;
mod classdb;
mod containers;
mod error;
mod interface;
mod objects;
mod slots;
mod state;
mod strings;
mod value;

pub mod host;

pub use error::EngineError;
pub use host::*;
