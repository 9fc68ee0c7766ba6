/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! # Internal crate of [**godot-rust**](https://godot-rust.github.io)
//!
//! Do not depend on this crate directly, instead use the `godot` crate.
//! No SemVer or other guarantees are provided.

#![cfg_attr(test, allow(unused))]

pub mod builtin;
pub mod classes;
pub mod global;
pub mod init;
pub mod meta;
pub mod obj;
pub mod registry;

#[doc(hidden)]
pub mod private;

mod storage;

pub use godot_ffi as sys;

#[doc(hidden)]
pub use godot_ffi::out;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Validations

#[cfg(all(test, feature = "double-precision"))]
mod precision_check {
    crate::sys::static_assert!(std::mem::size_of::<crate::builtin::real>() == 8);
}
