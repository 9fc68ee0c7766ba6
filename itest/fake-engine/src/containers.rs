/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! `Array`, `Dictionary` and the packed arrays: storage, builtin methods and element access.
//!
//! `Array` and `Dictionary` slots hold one `Arc` pointer, so copies share their contents like in the engine.
//! Packed array slots hold a boxed [`PackedData`] in their first word; copies are deep.

use std::ffi::c_void;
use std::hash::{Hash, Hasher};
use std::ptr;
use std::sync::{Arc, Mutex};

use godot_ffi as sys;
use sys::VariantType;

use crate::slots;
use crate::strings;
use crate::value::{self, lock, ArrayRef, DictEntry, DictRef, RawVariant, Value, REAL_SIZE};

/// Byte size of one element of a packed array type.
pub(crate) fn packed_element_size(ty: VariantType) -> Option<usize> {
    let size = match ty {
        VariantType::PackedByteArray => 1,
        VariantType::PackedInt32Array | VariantType::PackedFloat32Array => 4,
        VariantType::PackedInt64Array | VariantType::PackedFloat64Array => 8,
        // One string word per element.
        VariantType::PackedStringArray => 8,
        VariantType::PackedVector2Array => 2 * REAL_SIZE,
        VariantType::PackedVector3Array => 3 * REAL_SIZE,
        VariantType::PackedVector4Array => 4 * REAL_SIZE,
        VariantType::PackedColorArray => 16,
        _ => return None,
    };
    Some(size)
}

/// Contiguous element buffer of a packed array, backed by `u64` words so every element type is aligned.
pub(crate) struct PackedData {
    ty: VariantType,
    element_size: usize,
    len: usize,
    words: Vec<u64>,
}

impl PackedData {
    pub fn new(ty: VariantType) -> Self {
        Self {
            ty,
            element_size: packed_element_size(ty).unwrap_or(1),
            len: 0,
            words: Vec::new(),
        }
    }

    pub fn variant_type(&self) -> VariantType {
        self.ty
    }

    pub fn len(&self) -> usize {
        self.len
    }

    fn is_strings(&self) -> bool {
        self.ty == VariantType::PackedStringArray
    }

    pub fn bytes(&self) -> &[u8] {
        let count = self.len * self.element_size;
        // SAFETY: `words` covers at least `count` bytes.
        unsafe { std::slice::from_raw_parts(self.words.as_ptr() as *const u8, count) }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        let count = self.words.len() * 8;
        // SAFETY: `words` covers exactly `count` bytes.
        unsafe { std::slice::from_raw_parts_mut(self.words.as_mut_ptr() as *mut u8, count) }
    }

    /// Pointer to the element, or null if out of bounds.
    pub fn element_ptr(&mut self, index: usize) -> *mut c_void {
        if index >= self.len {
            return ptr::null_mut();
        }
        let offset = index * self.element_size;
        self.bytes_mut()[offset..].as_mut_ptr() as *mut c_void
    }

    /// New elements are zero, which is also the empty string for string arrays.
    pub fn resize(&mut self, new_len: usize) {
        if self.is_strings() {
            for index in new_len..self.len {
                let element = self.element_ptr(index);
                // SAFETY: each element of a string array is a string word.
                drop(unsafe { strings::take(element) });
            }
        }

        let old_bytes = self.len * self.element_size;
        let new_bytes = new_len * self.element_size;
        self.words.resize(new_bytes.div_ceil(8), 0);
        if new_bytes > old_bytes {
            self.bytes_mut()[old_bytes..new_bytes].fill(0);
        }
        self.len = new_len;
    }

    pub fn push_bytes(&mut self, element: &[u8]) {
        let index = self.len;
        self.resize(index + 1);
        let offset = index * self.element_size;
        let size = self.element_size.min(element.len());
        self.bytes_mut()[offset..offset + size].copy_from_slice(&element[..size]);
    }

    pub fn push_string(&mut self, text: String) {
        let index = self.len;
        self.resize(index + 1);
        let element = self.element_ptr(index);
        // SAFETY: the fresh element is a null string word.
        unsafe { strings::write(element, text) };
    }

    pub fn strings(&self) -> Vec<String> {
        if !self.is_strings() {
            return Vec::new();
        }
        self.bytes()
            .chunks_exact(8)
            // SAFETY: each chunk is a string word.
            .map(|word| unsafe { strings::read(word.as_ptr() as *const c_void) })
            .collect()
    }

    pub fn content_eq(&self, other: &PackedData) -> bool {
        if self.ty != other.ty || self.len != other.len {
            return false;
        }
        if self.is_strings() {
            self.strings() == other.strings()
        } else {
            self.bytes() == other.bytes()
        }
    }

    pub fn hash_into(&self, state: &mut impl Hasher) {
        self.ty.hash(state);
        if self.is_strings() {
            self.strings().hash(state);
        } else {
            self.bytes().hash(state);
        }
    }

    pub fn element_strings(&self) -> Vec<String> {
        if self.is_strings() {
            return self.strings().into_iter().map(|s| format!("\"{s}\"")).collect();
        }

        let bytes = self.bytes();
        match self.ty {
            VariantType::PackedByteArray => bytes.iter().map(u8::to_string).collect(),
            VariantType::PackedInt32Array => bytes
                .chunks_exact(4)
                .map(|c| i32::from_ne_bytes([c[0], c[1], c[2], c[3]]).to_string())
                .collect(),
            VariantType::PackedInt64Array => bytes
                .chunks_exact(8)
                .map(|c| i64::from_ne_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]).to_string())
                .collect(),
            VariantType::PackedFloat32Array => bytes
                .chunks_exact(4)
                .map(|c| value::format_float(f32::from_ne_bytes([c[0], c[1], c[2], c[3]]) as f64))
                .collect(),
            VariantType::PackedFloat64Array => bytes
                .chunks_exact(8)
                .map(|c| value::format_float(f64::from_ne_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])))
                .collect(),
            _ => bytes
                .chunks_exact(self.element_size)
                .map(|element| {
                    let parts: Vec<String> = value::reals(element).into_iter().map(value::format_float).collect();
                    format!("({})", parts.join(", "))
                })
                .collect(),
        }
    }
}

impl Clone for PackedData {
    fn clone(&self) -> Self {
        if !self.is_strings() {
            return Self {
                ty: self.ty,
                element_size: self.element_size,
                len: self.len,
                words: self.words.clone(),
            };
        }

        let mut copy = Self::new(self.ty);
        for text in self.strings() {
            copy.push_string(text);
        }
        copy
    }
}

impl Drop for PackedData {
    fn drop(&mut self) {
        self.resize(0);
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Slot access

/// Clones the shared handle stored in an `Array` or `Dictionary` slot.
pub(crate) unsafe fn read_shared<T>(slot: *const c_void) -> Arc<T> {
    let raw = *(slot as *const *const T);
    Arc::increment_strong_count(raw);
    Arc::from_raw(raw)
}

pub(crate) unsafe fn write_shared<T>(slot: *mut c_void, shared: Arc<T>) {
    ptr::write(slot as *mut *const T, Arc::into_raw(shared));
}

pub(crate) unsafe fn take_shared<T>(slot: *mut c_void) -> Arc<T> {
    Arc::from_raw(*(slot as *const *const T))
}

pub(crate) unsafe fn packed_of<'a>(slot: *mut c_void) -> &'a mut PackedData {
    &mut **(slot as *mut *mut PackedData)
}

pub(crate) unsafe fn write_packed(slot: *mut c_void, data: PackedData) {
    // Second word is unused.
    ptr::write(slot as *mut [usize; 2], [Box::into_raw(Box::new(data)) as usize, 0]);
}

pub(crate) unsafe fn take_packed(slot: *mut c_void) -> PackedData {
    *Box::from_raw(*(slot as *mut *mut PackedData))
}

unsafe fn arg(args: *const sys::GDExtensionConstTypePtr, index: usize) -> *const c_void {
    *args.add(index)
}

unsafe fn arg_variant<'a>(args: *const sys::GDExtensionConstTypePtr, index: usize) -> &'a RawVariant {
    value::variant_ref(arg(args, index))
}

unsafe fn ret_i64(ret: sys::GDExtensionTypePtr, value: usize) {
    *(ret as *mut i64) = value as i64;
}

unsafe fn ret_bool(ret: sys::GDExtensionTypePtr, value: bool) {
    *(ret as *mut u8) = value as u8;
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Array

pub(crate) unsafe extern "C" fn array_size(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let array: ArrayRef = read_shared(base);
    ret_i64(ret, lock(&array).len());
}

pub(crate) unsafe extern "C" fn array_clear(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    _ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let array: ArrayRef = read_shared(base);
    let removed = std::mem::take(&mut *lock(&array));
    drop(removed);
}

pub(crate) unsafe extern "C" fn array_push_back(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    _ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let array: ArrayRef = read_shared(base);
    let element = arg_variant(args, 0).clone();
    lock(&array).push(element);
}

pub(crate) unsafe extern "C" fn array_operator_index(
    base: sys::GDExtensionTypePtr,
    index: sys::GDExtensionInt,
) -> sys::GDExtensionVariantPtr {
    let array: ArrayRef = read_shared(base);
    let mut elements = lock(&array);
    match usize::try_from(index).ok().and_then(|i| elements.get_mut(i)) {
        Some(element) => element as *mut RawVariant as sys::GDExtensionVariantPtr,
        None => ptr::null_mut(),
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Dictionary

type DictContents = Mutex<Vec<Box<DictEntry>>>;

fn find_key(entries: &[Box<DictEntry>], key: &Value) -> Option<usize> {
    entries.iter().position(|entry| entry.key.value().equals(key))
}

pub(crate) unsafe extern "C" fn dictionary_size(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let dict: DictRef = read_shared::<DictContents>(base);
    ret_i64(ret, lock(&dict).len());
}

pub(crate) unsafe extern "C" fn dictionary_clear(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    _ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let dict: DictRef = read_shared::<DictContents>(base);
    let removed = std::mem::take(&mut *lock(&dict));
    drop(removed);
}

pub(crate) unsafe extern "C" fn dictionary_has(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let dict: DictRef = read_shared::<DictContents>(base);
    let key = arg_variant(args, 0).value();
    let found = find_key(&lock(&dict), key).is_some();
    ret_bool(ret, found);
}

pub(crate) unsafe extern "C" fn dictionary_erase(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let dict: DictRef = read_shared::<DictContents>(base);
    let key = arg_variant(args, 0).value();

    let removed = {
        let mut entries = lock(&dict);
        find_key(&entries, key).map(|index| entries.remove(index))
    };
    ret_bool(ret, removed.is_some());
}

unsafe fn collect_entries(base: sys::GDExtensionTypePtr, ret: sys::GDExtensionTypePtr, keys: bool) {
    let dict: DictRef = read_shared::<DictContents>(base);
    let elements: Vec<RawVariant> = lock(&dict)
        .iter()
        .map(|entry| if keys { entry.key.clone() } else { entry.value.clone() })
        .collect();

    // The return slot holds an initialized array.
    slots::assign_typed(VariantType::Array, ret, Value::Array(Arc::new(Mutex::new(elements))));
}

pub(crate) unsafe extern "C" fn dictionary_keys(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    collect_entries(base, ret, true);
}

pub(crate) unsafe extern "C" fn dictionary_values(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    collect_entries(base, ret, false);
}

/// Returns the value slot for `key`, inserting nil if absent.
pub(crate) unsafe extern "C" fn dictionary_operator_index(
    base: sys::GDExtensionTypePtr,
    key: sys::GDExtensionConstVariantPtr,
) -> sys::GDExtensionVariantPtr {
    let dict: DictRef = read_shared::<DictContents>(base);
    let key = value::variant_ref(key);

    let mut entries = lock(&dict);
    let index = match find_key(&entries, key.value()) {
        Some(index) => index,
        None => {
            entries.push(Box::new(DictEntry {
                key: key.clone(),
                value: RawVariant::default(),
            }));
            entries.len() - 1
        }
    };
    &mut entries[index].value as *mut RawVariant as sys::GDExtensionVariantPtr
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Packed arrays

pub(crate) unsafe extern "C" fn packed_size(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    ret_i64(ret, packed_of(base).len());
}

pub(crate) unsafe extern "C" fn packed_clear(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    _ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    packed_of(base).resize(0);
}

pub(crate) unsafe extern "C" fn packed_resize(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let new_len = *(arg(args, 0) as *const i64);
    let error = match usize::try_from(new_len) {
        Ok(new_len) => {
            packed_of(base).resize(new_len);
            0
        }
        // ERR_INVALID_PARAMETER
        Err(_) => 31,
    };
    ret_i64(ret, error);
}

/// The argument has the pointer-call representation of the element: `i64` for integers, `f64` for floats, raw bytes otherwise.
pub(crate) unsafe extern "C" fn packed_push_back(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let data = packed_of(base);
    let element = arg(args, 0);

    match data.variant_type() {
        VariantType::PackedStringArray => data.push_string(strings::read(element)),
        VariantType::PackedByteArray => data.push_bytes(&[*(element as *const i64) as u8]),
        VariantType::PackedInt32Array => data.push_bytes(&(*(element as *const i64) as i32).to_ne_bytes()),
        VariantType::PackedInt64Array => data.push_bytes(&(*(element as *const i64)).to_ne_bytes()),
        VariantType::PackedFloat32Array => data.push_bytes(&(*(element as *const f64) as f32).to_ne_bytes()),
        VariantType::PackedFloat64Array => data.push_bytes(&(*(element as *const f64)).to_ne_bytes()),
        _ => {
            let size = packed_element_size(data.variant_type()).unwrap_or(0);
            let bytes = std::slice::from_raw_parts(element as *const u8, size);
            data.push_bytes(bytes);
        }
    }
    ret_bool(ret, true);
}

/// Shared by all `packed_*_array_operator_index` functions; they differ only in the pointee type.
pub(crate) unsafe extern "C" fn packed_operator_index(
    base: sys::GDExtensionTypePtr,
    index: sys::GDExtensionInt,
) -> *mut c_void {
    match usize::try_from(index) {
        Ok(index) => packed_of(base).element_ptr(index),
        Err(_) => ptr::null_mut(),
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn string_elements_are_deep_copied() {
        let mut original = PackedData::new(VariantType::PackedStringArray);
        original.push_string("a".into());
        original.push_string("bc".into());

        let copy = original.clone();
        original.resize(1);

        assert_eq!(original.strings(), vec!["a"]);
        assert_eq!(copy.strings(), vec!["a", "bc"]);
        assert_eq!(copy.element_strings(), vec!["\"a\"", "\"bc\""]);
    }

    #[test]
    fn element_pointers_are_aligned() {
        let mut data = PackedData::new(VariantType::PackedFloat64Array);
        data.resize(3);
        for i in 0..3 {
            assert_eq!(data.element_ptr(i) as usize % 8, 0);
        }
        assert!(data.element_ptr(3).is_null());
    }

    proptest! {
        #[test]
        fn regrown_bytes_are_zero(bytes in proptest::collection::vec(any::<u8>(), 1..40), keep in 0usize..40) {
            let mut data = PackedData::new(VariantType::PackedByteArray);
            for b in &bytes {
                data.push_bytes(&[*b]);
            }

            let keep = keep.min(bytes.len());
            data.resize(keep);
            data.resize(bytes.len());

            prop_assert_eq!(&data.bytes()[..keep], &bytes[..keep]);
            prop_assert!(data.bytes()[keep..].iter().all(|&b| b == 0));
        }
    }
}
