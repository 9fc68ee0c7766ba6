/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Registration of user classes with the engine: class records, methods, properties, signals and the callbacks behind them.

// Note: final re-exports from godot-core are in lib.rs and private.rs.
// These are public here for simplicity, but many are not imported by the main crate.

pub mod callbacks;
pub mod class;
pub mod method;
pub mod plugin;
pub mod property;
pub mod signal;
