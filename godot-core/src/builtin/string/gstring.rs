/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cmp::Ordering;
use std::ffi::c_char;
use std::fmt;
use std::hash::{Hash, Hasher};

use godot_ffi as sys;

use super::{construct_converted, ctor, impl_string_sys, NodePath, StringName};
use crate::builtin::opaque_handle::OpaqueHandle;
use crate::meta::ArrayElement;

/// Godot's reference counted string type.
///
/// This is the Rust binding of GDScript's `String` type. It represents the native string class used within the Godot engine,
/// and as such has different memory layout and characteristics than `std::string::String`.
///
/// The engine-side value is held in the pointer manager and destroyed when the last Rust owner drops it. Cloning creates a new
/// reference to the same copy-on-write buffer.
///
/// # Conversions
/// UTF-8 in both directions: `GString::from(&str)` and `to_string()` preserve the byte sequence of valid UTF-8.
#[doc(alias = "String")]
pub struct GString {
    handle: OpaqueHandle<sys::OpaqueString>,
}

impl GString {
    /// Construct a new empty `GString`.
    pub fn new() -> Self {
        Self {
            handle: OpaqueHandle::new_default(),
        }
    }

    /// Number of UTF-8 bytes in the string.
    pub fn len(&self) -> usize {
        // SAFETY: a null buffer with length 0 only queries the size.
        let len = unsafe {
            sys::interface_fn!(string_to_utf8_chars)(self.string_sys(), std::ptr::null_mut(), 0)
        };
        len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the string into a UTF-8 byte buffer.
    pub fn to_utf8_bytes(&self) -> Vec<u8> {
        let len = self.len();
        let mut buffer = vec![0u8; len];

        // SAFETY: `buffer` holds exactly `len` bytes.
        unsafe {
            sys::interface_fn!(string_to_utf8_chars)(
                self.string_sys(),
                buffer.as_mut_ptr() as *mut c_char,
                len as i64,
            );
        }
        buffer
    }

    fn from_utf8_str(s: &str) -> Self {
        // SAFETY: the engine copies the bytes into a new string.
        unsafe {
            Self::new_with_uninit(|string_ptr| {
                sys::interface_fn!(string_new_with_utf8_chars_and_len)(
                    string_ptr,
                    s.as_ptr() as *const c_char,
                    s.len() as i64,
                );
            })
        }
    }
}

impl_builtin_opaque!(GString => sys::OpaqueString, nil_value = GString::new());
impl_string_sys!(GString);

impl ArrayElement for GString {}

impl Default for GString {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_utf8_bytes();
        f.write_str(&String::from_utf8_lossy(&bytes))
    }
}

impl fmt::Debug for GString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl PartialEq for GString {
    fn eq(&self, other: &Self) -> bool {
        self.to_utf8_bytes() == other.to_utf8_bytes()
    }
}

impl Eq for GString {}

impl PartialEq<&str> for GString {
    fn eq(&self, other: &&str) -> bool {
        self.to_utf8_bytes() == other.as_bytes()
    }
}

impl PartialOrd for GString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_utf8_bytes().cmp(&other.to_utf8_bytes())
    }
}

impl Hash for GString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_utf8_bytes().hash(state)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Conversion from/into Rust string-types

impl From<&str> for GString {
    fn from(s: &str) -> Self {
        Self::from_utf8_str(s)
    }
}

impl From<String> for GString {
    fn from(s: String) -> Self {
        Self::from_utf8_str(&s)
    }
}

impl From<&String> for GString {
    fn from(s: &String) -> Self {
        Self::from_utf8_str(s)
    }
}

impl From<&GString> for String {
    fn from(string: &GString) -> Self {
        string.to_string()
    }
}

impl From<GString> for String {
    fn from(string: GString) -> Self {
        string.to_string()
    }
}

impl std::str::FromStr for GString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_utf8_str(s))
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Conversion from other Godot string-types

impl From<&StringName> for GString {
    fn from(string: &StringName) -> Self {
        // SAFETY: converting constructor with a valid `StringName` argument.
        Self::from_opaque(unsafe {
            construct_converted(ctor::STRING_FROM_STRING_NAME, string.string_sys())
        })
    }
}

impl From<StringName> for GString {
    fn from(string: StringName) -> Self {
        Self::from(&string)
    }
}

impl From<&NodePath> for GString {
    fn from(path: &NodePath) -> Self {
        // SAFETY: converting constructor with a valid `NodePath` argument.
        Self::from_opaque(unsafe { construct_converted(ctor::STRING_FROM_NODE_PATH, path.string_sys()) })
    }
}

impl From<NodePath> for GString {
    fn from(path: NodePath) -> Self {
        Self::from(&path)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(feature = "serde")]
mod serialize {
    use std::fmt::Formatter;

    use serde::de::{Error, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    impl Serialize for GString {
        #[inline]
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for GString {
        #[inline]
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            struct GStringVisitor;
            impl Visitor<'_> for GStringVisitor {
                type Value = GString;

                fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
                    formatter.write_str("a GString")
                }

                fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
                where
                    E: Error,
                {
                    Ok(GString::from(s))
                }
            }

            deserializer.deserialize_str(GStringVisitor)
        }
    }
}
