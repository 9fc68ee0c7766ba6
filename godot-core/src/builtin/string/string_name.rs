/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ffi::c_char;
use std::fmt;
use std::hash::{Hash, Hasher};

use godot_ffi as sys;

use super::{construct_converted, ctor, impl_string_sys, GString, NodePath};
use crate::builtin::opaque_handle::OpaqueHandle;
use crate::meta::ArrayElement;

/// A string optimized for unique names.
///
/// StringNames are immutable strings designed for representing unique names. StringName ensures that only
/// one instance of a given name exists.
///
/// Method, signal and property names are passed to the engine as `StringName`s.
pub struct StringName {
    handle: OpaqueHandle<sys::OpaqueStringName>,
}

impl StringName {
    pub fn new() -> Self {
        Self {
            handle: OpaqueHandle::new_default(),
        }
    }

    /// Number of UTF-8 bytes of the name.
    pub fn len(&self) -> usize {
        GString::from(self).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn from_utf8_str(s: &str) -> Self {
        // SAFETY: the engine copies the bytes into a new name.
        unsafe {
            Self::new_with_uninit(|string_ptr| {
                sys::interface_fn!(string_name_new_with_utf8_chars_and_len)(
                    string_ptr,
                    s.as_ptr() as *const c_char,
                    s.len() as i64,
                );
            })
        }
    }
}

impl_builtin_opaque!(StringName => sys::OpaqueStringName, nil_value = StringName::new());
impl_string_sys!(StringName);

impl ArrayElement for StringName {}

impl Default for StringName {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StringName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&GString::from(self), f)
    }
}

impl fmt::Debug for StringName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "&\"{self}\"")
    }
}

impl PartialEq for StringName {
    fn eq(&self, other: &Self) -> bool {
        GString::from(self) == GString::from(other)
    }
}

impl Eq for StringName {}

impl PartialEq<&str> for StringName {
    fn eq(&self, other: &&str) -> bool {
        GString::from(self) == *other
    }
}

impl Hash for StringName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        GString::from(self).hash(state)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Conversions

impl From<&str> for StringName {
    fn from(s: &str) -> Self {
        Self::from_utf8_str(s)
    }
}

impl From<String> for StringName {
    fn from(s: String) -> Self {
        Self::from_utf8_str(&s)
    }
}

impl From<&String> for StringName {
    fn from(s: &String) -> Self {
        Self::from_utf8_str(s)
    }
}

impl From<&GString> for StringName {
    fn from(string: &GString) -> Self {
        // SAFETY: converting constructor with a valid `String` argument.
        Self::from_opaque(unsafe {
            construct_converted(ctor::STRING_NAME_FROM_STRING, string.string_sys())
        })
    }
}

impl From<GString> for StringName {
    fn from(string: GString) -> Self {
        Self::from(&string)
    }
}

impl From<&NodePath> for StringName {
    fn from(path: &NodePath) -> Self {
        Self::from(&GString::from(path))
    }
}

#[cfg(feature = "serde")]
mod serialize {
    use std::fmt::Formatter;

    use serde::de::{Error, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    impl Serialize for StringName {
        #[inline]
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for StringName {
        #[inline]
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            struct StringNameVisitor;
            impl Visitor<'_> for StringNameVisitor {
                type Value = StringName;

                fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
                    formatter.write_str("a StringName")
                }

                fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
                where
                    E: Error,
                {
                    Ok(StringName::from(s))
                }
            }

            deserializer.deserialize_str(StringNameVisitor)
        }
    }
}
