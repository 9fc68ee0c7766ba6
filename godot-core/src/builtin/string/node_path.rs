/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use godot_ffi as sys;

use super::{construct_converted, ctor, impl_string_sys, GString, StringName};
use crate::builtin::opaque_handle::OpaqueHandle;
use crate::meta::ArrayElement;

/// A pre-parsed scene tree path, such as `"../Player:position"`.
pub struct NodePath {
    handle: OpaqueHandle<sys::OpaqueNodePath>,
}

impl NodePath {
    pub fn new() -> Self {
        Self {
            handle: OpaqueHandle::new_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        GString::from(self).is_empty()
    }
}

impl_builtin_opaque!(NodePath => sys::OpaqueNodePath, nil_value = NodePath::new());
impl_string_sys!(NodePath);

impl ArrayElement for NodePath {}

impl Default for NodePath {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&GString::from(self), f)
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "^\"{self}\"")
    }
}

impl PartialEq for NodePath {
    fn eq(&self, other: &Self) -> bool {
        GString::from(self) == GString::from(other)
    }
}

impl Eq for NodePath {}

impl From<&GString> for NodePath {
    fn from(string: &GString) -> Self {
        // SAFETY: converting constructor with a valid `String` argument.
        Self::from_opaque(unsafe {
            construct_converted(ctor::NODE_PATH_FROM_STRING, string.string_sys())
        })
    }
}

impl From<GString> for NodePath {
    fn from(string: GString) -> Self {
        Self::from(&string)
    }
}

impl From<&str> for NodePath {
    fn from(s: &str) -> Self {
        Self::from(&GString::from(s))
    }
}

impl From<&String> for NodePath {
    fn from(s: &String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&StringName> for NodePath {
    fn from(name: &StringName) -> Self {
        Self::from(&GString::from(name))
    }
}
