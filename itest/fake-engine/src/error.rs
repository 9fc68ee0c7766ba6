/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use godot_ffi as sys;
use sys::VariantType;

/// Failure of a host operation, as seen by the test driving the engine.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum EngineError {
    /// The library's entry symbol returned false.
    EntryFailed,

    /// The class is not registered.
    UnknownClass { class: String },

    /// The class exists, but cannot be instantiated (abstract, or its constructor failed).
    NotInstantiable { class: String },

    /// No live object has this instance ID.
    UnknownObject { id: u64 },

    /// The object's class does not override the virtual method.
    NoVirtual { class: String, method: String },

    /// The object's class has no method of this name.
    UnknownMethod { class: String, method: String },

    /// A variant call reported an error code (`GDExtensionCallErrorType`).
    CallFailed { method: String, error: u32 },

    /// A host value cannot be passed as the given type.
    UnsupportedType { variant_type: VariantType },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntryFailed => write!(f, "library entry symbol reported failure"),
            Self::UnknownClass { class } => write!(f, "class `{class}` is not registered"),
            Self::NotInstantiable { class } => write!(f, "class `{class}` cannot be instantiated"),
            Self::UnknownObject { id } => write!(f, "no live object with instance ID {id}"),
            Self::NoVirtual { class, method } => {
                write!(f, "class `{class}` does not override virtual `{method}`")
            }
            Self::UnknownMethod { class, method } => {
                write!(f, "class `{class}` has no method `{method}`")
            }
            Self::CallFailed { method, error } => {
                write!(f, "call to `{method}` failed with call error {error}")
            }
            Self::UnsupportedType { variant_type } => {
                write!(f, "host values cannot be passed as {variant_type:?}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
