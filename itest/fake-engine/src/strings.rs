/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! `String`, `StringName` and `NodePath` slots.
//!
//! All three are one word holding a boxed Rust string. A null word is the empty string, so zeroed memory is a valid value.

use std::ffi::{c_char, c_void, CStr};
use std::ptr;

use godot_ffi as sys;

pub(crate) unsafe fn str_ref<'a>(slot: *const c_void) -> &'a str {
    let boxed = *(slot as *const *const String);
    if boxed.is_null() {
        ""
    } else {
        (*boxed).as_str()
    }
}

pub(crate) unsafe fn read(slot: *const c_void) -> String {
    str_ref(slot).to_string()
}

/// Writes into an uninitialized slot.
pub(crate) unsafe fn write(slot: *mut c_void, text: String) {
    let boxed = if text.is_empty() {
        ptr::null_mut()
    } else {
        Box::into_raw(Box::new(text))
    };
    ptr::write(slot as *mut *mut String, boxed);
}

/// Moves the string out, leaving an empty one behind.
pub(crate) unsafe fn take(slot: *mut c_void) -> String {
    let boxed = ptr::replace(slot as *mut *mut String, ptr::null_mut());
    if boxed.is_null() {
        String::new()
    } else {
        *Box::from_raw(boxed)
    }
}

pub(crate) unsafe fn assign(slot: *mut c_void, text: String) {
    drop(take(slot));
    write(slot, text);
}

/// Engine-owned string, for passing names into the library.
pub(crate) struct StringSlot {
    word: *mut String,
}

impl StringSlot {
    pub fn new(text: &str) -> Self {
        let mut slot = Self {
            word: ptr::null_mut(),
        };
        // SAFETY: the word is plain memory owned by `slot`.
        unsafe { write(slot.ptr(), text.to_string()) };
        slot
    }

    pub fn empty() -> Self {
        Self {
            word: ptr::null_mut(),
        }
    }

    pub fn ptr(&mut self) -> *mut c_void {
        &mut self.word as *mut *mut String as *mut c_void
    }

    pub fn into_string(mut self) -> String {
        // SAFETY: the word always holds a valid string.
        unsafe { take(self.ptr()) }
    }
}

impl Drop for StringSlot {
    fn drop(&mut self) {
        // SAFETY: see above.
        drop(unsafe { take(self.ptr()) });
    }
}

/// Decodes `len` bytes of UTF-8; a negative length means NUL-terminated.
unsafe fn decode(chars: *const c_char, len: sys::GDExtensionInt) -> String {
    if chars.is_null() {
        return String::new();
    }

    let bytes = if len < 0 {
        CStr::from_ptr(chars).to_bytes()
    } else {
        std::slice::from_raw_parts(chars as *const u8, len as usize)
    };
    String::from_utf8_lossy(bytes).into_owned()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Interface functions

pub(crate) unsafe extern "C" fn string_new_with_utf8_chars_and_len(
    dst: sys::GDExtensionUninitializedStringPtr,
    chars: *const c_char,
    len: sys::GDExtensionInt,
) {
    write(dst, decode(chars, len));
}

pub(crate) unsafe extern "C" fn string_name_new_with_utf8_chars_and_len(
    dst: sys::GDExtensionUninitializedStringNamePtr,
    chars: *const c_char,
    len: sys::GDExtensionInt,
) {
    write(dst, decode(chars, len));
}

/// Returns the full byte length; copies at most `max_len` bytes if `buffer` is non-null.
pub(crate) unsafe extern "C" fn string_to_utf8_chars(
    string: sys::GDExtensionConstStringPtr,
    buffer: *mut c_char,
    max_len: sys::GDExtensionInt,
) -> sys::GDExtensionInt {
    let text = str_ref(string);
    if !buffer.is_null() && max_len > 0 {
        let count = text.len().min(max_len as usize);
        ptr::copy_nonoverlapping(text.as_ptr(), buffer as *mut u8, count);
    }
    text.len() as sys::GDExtensionInt
}

/// Ptr-constructor between the three string types: the argument's text is copied.
pub(crate) unsafe extern "C" fn convert_string(
    dst: sys::GDExtensionUninitializedTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
) {
    write(dst, read(*args));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_round_trips_through_interface() {
        let text = "héllo";
        let mut slot = StringSlot::empty();
        unsafe {
            string_new_with_utf8_chars_and_len(slot.ptr(), text.as_ptr() as *const c_char, text.len() as i64);
            assert_eq!(string_to_utf8_chars(slot.ptr(), ptr::null_mut(), 0), 6);

            let mut buf = [0u8; 3];
            string_to_utf8_chars(slot.ptr(), buf.as_mut_ptr() as *mut c_char, 3);
            assert_eq!(&buf, b"h\xc3\xa9");
        }
        assert_eq!(slot.into_string(), "héllo");
    }

    #[test]
    fn null_word_is_empty() {
        let slot = StringSlot::empty();
        assert_eq!(slot.into_string(), "");
    }
}
