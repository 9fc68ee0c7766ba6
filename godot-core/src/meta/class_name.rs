/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;
use std::ffi::c_void;
use std::fmt;

use godot_ffi as sys;
use sys::Global;

use crate::builtin::{GString, StringName};

// Class tags by class name. Tags are engine pointers, stored as integers to keep the map `Send`.
static CLASS_TAGS: Global<HashMap<&'static str, usize>> = Global::default();

/// Clears the class tag cache; tags are only valid for the engine session that produced them.
pub(crate) fn cleanup() {
    CLASS_TAGS.lock().clear();
}

/// Name of a class registered with Godot.
///
/// Holds the Rust-side `&'static str`; conversions to engine strings allocate on demand. Comparison and hashing look at the name
/// only, so the same class always compares equal, whether it was named by an engine wrapper or by a user class.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ClassName {
    name: &'static str,
}

impl ClassName {
    /// Construct from a static string. Used by generated code for engine classes and `#[derive(GodotClass)]`.
    #[doc(hidden)]
    pub const fn __cached(name: &'static str) -> Self {
        Self { name }
    }

    /// Class name of "no class", used for properties and parameters that are not objects.
    pub const fn none() -> Self {
        Self { name: "" }
    }

    pub fn is_none(&self) -> bool {
        self.name.is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        self.name
    }

    /// Converts the class name to a `GString`.
    pub fn to_gstring(&self) -> GString {
        GString::from(self.name)
    }

    /// Converts the class name to a `StringName`.
    pub fn to_string_name(&self) -> StringName {
        StringName::from(self.name)
    }

    /// Engine-side tag used by `object_cast_to`, cached after the first lookup.
    ///
    /// Null if the engine does not know the class.
    pub(crate) fn class_tag(&self) -> *mut c_void {
        if let Some(tag) = CLASS_TAGS.lock().get(self.name) {
            return *tag as *mut c_void;
        }

        let string_name = self.to_string_name();

        // SAFETY: binding is initialized whenever classes are looked up.
        let tag = unsafe { sys::interface_fn!(classdb_get_class_tag)(string_name.string_sys()) };
        if !tag.is_null() {
            CLASS_TAGS.lock().insert(self.name, tag as usize);
        }

        tag
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl fmt::Debug for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "ClassName(none)")
        } else {
            write!(f, "ClassName({:?})", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_empty() {
        let none = ClassName::none();
        assert!(none.is_none());
        assert_eq!(none.as_str(), "");
        assert_eq!(none.to_string(), "(none)");
    }

    #[test]
    fn equality_by_name() {
        let a = ClassName::__cached("Node");
        let b = ClassName::__cached("Node");

        assert_eq!(a, b);
        assert_ne!(a, ClassName::__cached("Resource"));
        assert_eq!(format!("{a:?}"), "ClassName(\"Node\")");
    }
}
