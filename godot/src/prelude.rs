/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Often-imported symbols.

pub use super::builtin::__prelude_reexport::*;
pub use super::builtin::math::ApproxEq;
pub use super::classes::{INode, IObject, IRefCounted, IResource, Node, Object, RefCounted, Resource};
pub use super::global::{godot_error, godot_print, godot_script_error, godot_warn};
pub use super::init::{gdextension, ExtensionLibrary, InitLevel};
pub use super::meta::error::{CallError, ConvertError};
pub use super::meta::{FromGodot, GodotConvert, PropertyInfo, ToGodot};
pub use super::obj::{Base, Gd, GdMut, GdRef, GodotClass, Inherits, InstanceId};
pub use super::register::property::{Export, Var};
// Re-export macros.
pub use super::register::{godot_api, GodotClass};

// Make trait methods available.
#[rustfmt::skip] // One per line.
mod trait_reexports {
    pub use crate::obj::NewAlloc as _;
    pub use crate::obj::NewGd as _;
    pub use crate::obj::WithBaseField as _; // base(), to_gd()
}

pub use trait_reexports::*;
