/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use godot_ffi as sys;
use sys::VariantType;

use super::hashes;
use crate::builtin::opaque_handle::OpaqueHandle;
use crate::builtin::{builtin_ptrcall, Variant, VariantArray};
use crate::meta::{ArrayElement, ToGodot};

const HAS_HASH: i64 = 3680194679;
const ERASE_HASH: i64 = 1776646889;
const KEYS_HASH: i64 = 4144163970;
const VALUES_HASH: i64 = 4144163970;

/// Godot's `Dictionary` type.
///
/// The keys and values of the dictionary are all `Variant`s, so they can be of different types.
/// Variants are designed to be generally cheap to clone.
///
/// # Dictionary example
///
/// ```no_run
/// # use godot::prelude::*;
/// // Create empty dictionary and add key-values pairs.
/// let mut dict = Dictionary::new();
/// dict.set("str", "Hello");
/// dict.set("num", 23);
///
/// // Keys don't need to be strings.
/// let coord = Vector2i::new(0, 1);
/// dict.set(coord, "Tile77");
///
/// // Or create the same dictionary in a single expression.
/// let dict = dict! {
///    "str": "Hello",
///    "num": 23,
///    coord: "Tile77",
/// };
///
/// // Access elements.
/// let value: Variant = dict.at("str");
/// let value: GString = dict.at("str").to(); // Variant::to() extracts GString.
/// let maybe: Option<Variant> = dict.get("absent_key");
///
/// // Iterate over key-value pairs as (Variant, Variant).
/// for (key, value) in dict.iter_shared() {
///     println!("{key} => {value}");
/// }
/// ```
///
/// # Thread safety
///
/// The same principles apply as for [`VariantArray`]. Consult its documentation for details.
pub struct Dictionary {
    handle: OpaqueHandle<sys::OpaqueDictionary>,
}

impl Dictionary {
    /// Constructs an empty `Dictionary`.
    pub fn new() -> Self {
        Self {
            handle: OpaqueHandle::new_default(),
        }
    }

    /// Returns the number of entries in the dictionary.
    ///
    /// This is equivalent to `size` in Godot.
    #[doc(alias = "size")]
    pub fn len(&self) -> usize {
        // SAFETY: `self` is a valid dictionary.
        let size: i64 = unsafe {
            builtin_ptrcall(
                VariantType::Dictionary,
                "size",
                hashes::SIZE,
                sys::force_mut_ptr(self.sys()),
                (),
            )
        };
        crate::builtin::to_usize(size)
    }

    /// Returns true if the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all key-value pairs from the dictionary.
    pub fn clear(&mut self) {
        // SAFETY: `self` is a valid dictionary.
        unsafe {
            builtin_ptrcall::<(), ()>(
                VariantType::Dictionary,
                "clear",
                hashes::CLEAR,
                self.sys_mut(),
                (),
            )
        }
    }

    /// Returns the value for the given key, or `None`.
    ///
    /// Note that `NIL` values are returned as `Some(Variant::nil())`, while absent values are returned as `None`.
    pub fn get<K: ToGodot>(&self, key: K) -> Option<Variant> {
        self.get_by_variant(&key.to_variant())
    }

    /// ⚠️ Returns the value for the given key, or panics.
    ///
    /// # Panics
    /// If there is no value for the given key.
    pub fn at<K: ToGodot>(&self, key: K) -> Variant {
        let key = key.to_variant();
        assert!(
            self.contains_variant_key(&key),
            "key {key:?} missing in dictionary: {self:?}"
        );

        self.value_at(&key)
    }

    /// Returns the value at the key in the dictionary, or `NIL` otherwise.
    pub fn get_or_nil<K: ToGodot>(&self, key: K) -> Variant {
        self.get(key).unwrap_or_default()
    }

    /// Returns `true` if the dictionary contains the given key.
    ///
    /// _Godot equivalent: `has`_
    #[doc(alias = "has")]
    pub fn contains_key<K: ToGodot>(&self, key: K) -> bool {
        self.contains_variant_key(&key.to_variant())
    }

    /// Set a key to a given value.
    ///
    /// If you are interested in the previous value, use [`insert()`][Self::insert] instead.
    ///
    /// _Godot equivalent: `dict[key] = value`_
    pub fn set<K: ToGodot, V: ToGodot>(&mut self, key: K, value: V) {
        let key = key.to_variant();

        // SAFETY: the engine inserts the key if absent and returns the value slot, which holds an initialized variant.
        unsafe {
            let slot = self.value_ptr(&key) as *mut Variant;
            *slot = value.to_variant();
        }
    }

    /// Insert a value at the given key, returning the previous value for that key (if available).
    ///
    /// If you don't need the previous value, use [`set()`][Self::set] instead.
    #[must_use]
    pub fn insert<K: ToGodot, V: ToGodot>(&mut self, key: K, value: V) -> Option<Variant> {
        let key = key.to_variant();
        let old_value = self.get_by_variant(&key);
        self.set(key, value);
        old_value
    }

    /// Removes a key from the map, and returns the value associated with
    /// the key if the key was in the dictionary.
    ///
    /// _Godot equivalent: `erase`_
    #[doc(alias = "erase")]
    pub fn remove<K: ToGodot>(&mut self, key: K) -> Option<Variant> {
        let key = key.to_variant();
        let old_value = self.get_by_variant(&key)?;

        // SAFETY: `self` is a valid dictionary; the key is copied by the engine.
        let _erased: bool = unsafe {
            builtin_ptrcall(
                VariantType::Dictionary,
                "erase",
                ERASE_HASH,
                self.sys_mut(),
                (key,),
            )
        };

        Some(old_value)
    }

    /// Creates a new `Array` containing all the keys currently in the dictionary.
    ///
    /// _Godot equivalent: `keys`_
    #[doc(alias = "keys")]
    pub fn keys_array(&self) -> VariantArray {
        // SAFETY: `self` is a valid dictionary; the returned array is owned.
        unsafe {
            builtin_ptrcall(
                VariantType::Dictionary,
                "keys",
                KEYS_HASH,
                sys::force_mut_ptr(self.sys()),
                (),
            )
        }
    }

    /// Creates a new `Array` containing all the values currently in the dictionary.
    ///
    /// _Godot equivalent: `values`_
    #[doc(alias = "values")]
    pub fn values_array(&self) -> VariantArray {
        // SAFETY: `self` is a valid dictionary; the returned array is owned.
        unsafe {
            builtin_ptrcall(
                VariantType::Dictionary,
                "values",
                VALUES_HASH,
                sys::force_mut_ptr(self.sys()),
                (),
            )
        }
    }

    /// Returns an iterator over the key-value pairs of the `Dictionary`.
    ///
    /// The keys are collected up front; entries inserted while iterating are not visited, entries removed while iterating are
    /// skipped.
    pub fn iter_shared(&self) -> Iter<'_> {
        Iter {
            dictionary: self,
            keys: self.keys_array(),
            next_idx: 0,
        }
    }

    /// Copies all key-value pairs into a `Vec`, in the dictionary's iteration order.
    pub fn to_vec(&self) -> Vec<(Variant, Variant)> {
        self.iter_shared().collect()
    }

    fn get_by_variant(&self, key: &Variant) -> Option<Variant> {
        if !self.contains_variant_key(key) {
            return None;
        }

        Some(self.value_at(key))
    }

    fn contains_variant_key(&self, key: &Variant) -> bool {
        // SAFETY: `self` is a valid dictionary; `has` does not modify it.
        unsafe {
            builtin_ptrcall(
                VariantType::Dictionary,
                "has",
                HAS_HASH,
                sys::force_mut_ptr(self.sys()),
                (key.clone(),),
            )
        }
    }

    /// Copy of the value for a key that is known to exist.
    fn value_at(&self, key: &Variant) -> Variant {
        // SAFETY: the key exists, so indexing does not insert; the slot holds an initialized variant.
        unsafe { Variant::borrow_var_sys(self.value_ptr(key)) }.clone()
    }

    fn value_ptr(&self, key: &Variant) -> sys::GDExtensionVariantPtr {
        // SAFETY: `self` and `key` are valid for the duration of the call.
        unsafe {
            sys::interface_fn!(dictionary_operator_index)(
                sys::force_mut_ptr(self.sys()),
                key.var_sys(),
            )
        }
    }
}

impl_builtin_opaque!(Dictionary => sys::OpaqueDictionary, nil_value = Dictionary::new());

impl ArrayElement for Dictionary {}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.to_vec();
        f.debug_map().entries(entries.iter().map(|(k, v)| (k, v))).finish()
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter_shared()
                .all(|(key, value)| other.get_by_variant(&key).is_some_and(|other_value| other_value == value))
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Conversion traits

/// Insert iterator range into dictionary.
///
/// Inserts all key-value pairs from the iterator into the dictionary. Previous values for keys appearing
/// in `iter` will be overwritten.
impl<K: ToGodot, V: ToGodot> Extend<(K, V)> for Dictionary {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter.into_iter() {
            self.set(k, v)
        }
    }
}

impl<K: ToGodot, V: ToGodot> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        dict.extend(iter);
        dict
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Iterator over key-value pairs in a [`Dictionary`], see [`Dictionary::iter_shared()`].
pub struct Iter<'a> {
    dictionary: &'a Dictionary,
    keys: VariantArray,
    next_idx: usize,
}

impl Iterator for Iter<'_> {
    type Item = (Variant, Variant);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = self.keys.get(self.next_idx)?;
            self.next_idx += 1;

            if let Some(value) = self.dictionary.get_by_variant(&key) {
                return Some((key, value));
            }
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Constructs [`Dictionary`] literals, close to Godot's own syntax.
///
/// Any value can be used as a key, but to use an expression you need to surround it
/// in `()` or `{}`.
///
/// # Example
/// ```no_run
/// use godot::builtin::{dict, Variant};
///
/// let key = "my_key";
/// let d = dict! {
///     "key1": 10,
///     "another": Variant::nil(),
///     key: true,
///     (1 + 2): "final",
/// };
/// ```
#[macro_export]
macro_rules! dict {
    ($($key:tt: $value:expr),* $(,)?) => {
        {
            let mut d = $crate::builtin::Dictionary::new();
            $(
                d.set($key, $value);
            )*
            d
        }
    };
}
