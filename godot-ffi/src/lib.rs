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
//!
//! Low-level layer over the GDExtension C ABI: the function table resolved at load time, per-type lifecycle tables, the pointer-call
//! [`CallFrame`] and the [`pointer_manager`] that tracks ownership of every engine value held by Rust.

#![cfg_attr(test, allow(unused))]

#[allow(
    non_camel_case_types,
    non_upper_case_globals,
    non_snake_case,
    dead_code
)]
mod gdextension_interface;

mod assertions;
mod binding;
mod builtin_tables;
mod call_frame;
mod global;
mod init_level;
mod interface_init;
mod opaque;
mod plugins;
mod toolbox;
mod variant_type;

pub mod pointer_manager;

#[cfg(target_os = "linux")]
pub mod linux_reload_workaround;

pub use binding::*;
pub use builtin_tables::{BuiltinTables, BuiltinTypeOps};
pub use call_frame::{CallFrame, FrameArgs, FrameSlot, SlotInfo};
pub use gdextension_interface::*;
pub use global::{Global, GlobalGuard};
pub use init_level::InitLevel;
pub use interface_init::{read_version_string, runtime_version, GDExtensionInterface, InterfaceError};
pub use opaque::*;
pub use pointer_manager::{Handle, HandleId, Lookup, Ownership, PointerError};
pub use toolbox::*;
pub use variant_type::{VariantOperator, VariantType};

/// Allocates through the engine's allocator.
///
/// # Safety
/// The binding must be initialized. The block must be released with [`mem_free`].
pub unsafe fn mem_alloc(bytes: usize) -> *mut std::ffi::c_void {
    crate::interface_fn!(mem_alloc)(bytes)
}

/// # Safety
/// `ptr` must come from [`mem_alloc`] and not be used afterwards.
pub unsafe fn mem_free(ptr: *mut std::ffi::c_void) {
    crate::interface_fn!(mem_free)(ptr)
}
