/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Functions and macros that are not very specific to the binding, but come in handy.

use std::ffi::c_char;

use crate as sys;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Macros

/// Trace output, enabled with the `debug-log` feature.
#[cfg(feature = "debug-log")]
#[macro_export]
macro_rules! out {
    ()                          => (eprintln!());
    ($fmt:literal)              => (eprintln!($fmt));
    ($fmt:literal, $($arg:tt)*) => (eprintln!($fmt, $($arg)*));
}

/// Trace output, enabled with the `debug-log` feature.
#[cfg(not(feature = "debug-log"))]
#[macro_export]
macro_rules! out {
    ()                          => ({});
    ($fmt:literal)              => ({ if false { eprintln!($fmt); } });
    ($fmt:literal, $($arg:tt)*) => ({ if false { eprintln!($fmt, $($arg)*); } });
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Utility functions

/// Returns a C `const char*` for a null-terminated byte string.
#[inline]
pub fn c_str(s: &[u8]) -> *const c_char {
    debug_assert!(!s.is_empty() && s[s.len() - 1] == 0);

    s.as_ptr() as *const c_char
}

/// Explicitly cast away `const` from a pointer, similar to C++ `const_cast`.
pub fn force_mut_ptr<T>(ptr: *const T) -> *mut T {
    ptr as *mut T
}

/// If `ptr` is not null, returns `Some(mapper(ptr))`; otherwise `None`.
#[inline]
pub fn ptr_then<T, R, F>(ptr: *mut T, mapper: F) -> Option<R>
where
    F: FnOnce(*mut T) -> R,
{
    if ptr.is_null() {
        None
    } else {
        Some(mapper(ptr))
    }
}

/// Converts a Rust bool into the engine's 8-bit representation.
#[inline]
pub fn conv_bool(value: bool) -> sys::GDExtensionBool {
    if value {
        sys::SYS_TRUE
    } else {
        sys::SYS_FALSE
    }
}

/// Error code outside the engine's range, marking a call error whose details are stored on the Rust side.
pub const GODOT_RUST_CUSTOM_CALL_ERROR: sys::GDExtensionCallErrorType = 40;

/// A call error signaling success.
pub const fn default_call_error() -> sys::GDExtensionCallError {
    sys::GDExtensionCallError {
        error: sys::GDEXTENSION_CALL_OK,
        argument: -1,
        expected: -1,
    }
}

/// Message for a method bind that the engine could not resolve.
pub fn method_bind_failure(class_name: &str, method_name: &str, hash: i64) -> String {
    format!(
        "failed to load class method {class_name}::{method_name} (hash {hash}).\n\
        Make sure the binding and the engine versions are compatible."
    )
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_bind_failure_names_everything() {
        let msg = method_bind_failure("Node", "get_child_count", 894402480);
        assert!(msg.contains("Node::get_child_count"));
        assert!(msg.contains("894402480"));
    }

    #[test]
    fn ptr_then_skips_null() {
        let mut value = 5;
        assert_eq!(ptr_then(&mut value as *mut i32, |p| unsafe { *p }), Some(5));
        assert_eq!(ptr_then(std::ptr::null_mut::<i32>(), |p| unsafe { *p }), None);
    }
}
