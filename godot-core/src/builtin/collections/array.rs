/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::marker::PhantomData;

use godot_ffi as sys;
use sys::VariantType;

use super::hashes;
use crate::builtin::opaque_handle::{copy_from_ptr, OpaqueHandle};
use crate::builtin::{builtin_ptrcall, Variant};
use crate::meta::error::{ConvertError, FromGodotError};
use crate::meta::traits::{ffi_from_variant_via_type, ffi_to_variant_via_type};
use crate::meta::{
    ArrayElement, FromGodot, GodotConvert, GodotFfiVariant, GodotType, PropertyHintInfo, ToGodot,
};

const PUSH_BACK_HASH: i64 = 3316032543;

/// Godot's `Array` type.
///
/// Unlike GDScript, all indices and sizes are unsigned, so negative indices are not supported.
///
/// # Typed arrays
///
/// Godot's `Array` can be either typed or untyped.
///
/// An untyped array can contain any kind of [`Variant`], even different types in the same array.
/// We represent this in Rust as `VariantArray`, which is just a type alias for `Array<Variant>`.
///
/// `Array<T>` for any other `T` only accepts and returns values of that type. Arrays coming from the engine are checked
/// element by element when converted to `Array<T>`; a mismatch is a conversion error.
///
/// # Reference semantics
///
/// Like in GDScript, `Array` acts as a reference type: multiple `Array` instances may
/// refer to the same underlying array, and changes to one are visible in the other.
///
/// # Example
///
/// ```no_run
/// # use godot::prelude::*;
/// let mut array = Array::new();
/// array.push(10);
/// array.push(20);
///
/// let value: i64 = array.at(0); // 10
/// let maybe: Option<i64> = array.get(3); // None
///
/// for value in array.iter_shared() {
///    println!("{value}");
/// }
/// ```
pub struct Array<T: ArrayElement> {
    // Invariant: every element converts to `T`.
    handle: OpaqueHandle<sys::OpaqueArray>,
    _phantom: PhantomData<T>,
}

/// A Godot `Array` without an assigned type.
pub type VariantArray = Array<Variant>;

impl<T: ArrayElement> Array<T> {
    /// Constructs an empty `Array`.
    pub fn new() -> Self {
        Self::from_handle(OpaqueHandle::new_default())
    }

    fn from_handle(handle: OpaqueHandle<sys::OpaqueArray>) -> Self {
        Self {
            handle,
            _phantom: PhantomData,
        }
    }

    #[doc(hidden)]
    pub fn sys(&self) -> sys::GDExtensionConstTypePtr {
        self.handle.sys()
    }

    #[doc(hidden)]
    pub fn sys_mut(&mut self) -> sys::GDExtensionTypePtr {
        self.handle.sys_mut()
    }

    /// Returns the number of elements in the array. Equivalent of `size()` in Godot.
    #[doc(alias = "size")]
    pub fn len(&self) -> usize {
        // SAFETY: `self` is a valid array; `size` does not modify it.
        let size: i64 = unsafe {
            builtin_ptrcall(
                VariantType::Array,
                "size",
                hashes::SIZE,
                sys::force_mut_ptr(self.sys()),
                (),
            )
        };
        crate::builtin::to_usize(size)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the array, removing all elements.
    pub fn clear(&mut self) {
        // SAFETY: `self` is a valid array.
        unsafe {
            builtin_ptrcall::<(), ()>(
                VariantType::Array,
                "clear",
                hashes::CLEAR,
                self.sys_mut(),
                (),
            )
        }
    }

    /// Appends an element to the end of the array.
    #[doc(alias = "append")]
    #[doc(alias = "push_back")]
    pub fn push(&mut self, value: T) {
        let variant = value.to_variant();

        // SAFETY: `self` is a valid array; the engine copies the argument.
        unsafe {
            builtin_ptrcall::<(Variant,), ()>(
                VariantType::Array,
                "push_back",
                PUSH_BACK_HASH,
                self.sys_mut(),
                (variant,),
            )
        }
    }

    /// Returns the value at the specified index, or `None` if the index is out-of-bounds.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }

        Some(self.element_at(index))
    }

    /// Returns the value at the specified index.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn at(&self, index: usize) -> T {
        self.check_bounds(index);
        self.element_at(index)
    }

    /// Sets the value at the specified index.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: T) {
        self.check_bounds(index);

        let slot = self.variant_ptr(index) as *mut Variant;

        // SAFETY: the slot holds an initialized variant, which is dropped (destroyed) by the assignment.
        unsafe { *slot = value.to_variant() };
    }

    /// Returns an iterator over the elements of the `Array`. Elements are converted on the fly, each one is an owned copy.
    pub fn iter_shared(&self) -> Iter<'_, T> {
        Iter {
            array: self,
            next_idx: 0,
        }
    }

    /// Copies all elements into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter_shared().collect()
    }

    /// Untyped copy of the array, sharing the engine-side storage.
    pub fn to_variant_array(&self) -> VariantArray {
        Array::from_handle(self.handle.clone())
    }

    fn check_bounds(&self, index: usize) {
        let len = self.len();
        assert!(
            index < len,
            "Array index {index} is out of bounds: length is {len}"
        );
    }

    fn variant_ptr(&self, index: usize) -> sys::GDExtensionVariantPtr {
        // SAFETY: `index` was bounds-checked by the caller.
        unsafe {
            sys::interface_fn!(array_operator_index)(
                sys::force_mut_ptr(self.sys()),
                crate::builtin::to_i64(index),
            )
        }
    }

    fn variant_at(&self, index: usize) -> Variant {
        // SAFETY: the engine returns a pointer to an initialized variant inside the array.
        unsafe { Variant::borrow_var_sys(self.variant_ptr(index)) }.clone()
    }

    fn element_at(&self, index: usize) -> T {
        let variant = self.variant_at(index);
        T::try_from_variant(&variant).unwrap_or_else(|err| {
            panic!("Array<{}> holds element of wrong type at {index}: {err}", T::godot_type_name())
        })
    }

    /// Checks that every element converts to `T`.
    fn validated(self) -> Result<Self, ConvertError> {
        if !T::is_typed_element() {
            return Ok(self);
        }

        let expected = T::variant_type();
        for index in 0..self.len() {
            let element = self.variant_at(index);
            if T::try_from_variant(&element).is_err() {
                let actual = element.get_type();
                return Err(FromGodotError::BadArrayType { expected, actual }.into_error(self));
            }
        }

        Ok(self)
    }
}

impl<T: ArrayElement> Default for Array<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ArrayElement> Clone for Array<T> {
    fn clone(&self) -> Self {
        Self::from_handle(self.handle.clone())
    }
}

impl<T: ArrayElement> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elements: Vec<Variant> = (0..self.len()).map(|i| self.variant_at(i)).collect();
        f.debug_list().entries(elements.iter()).finish()
    }
}

impl<T: ArrayElement> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        let len = self.len();
        len == other.len() && (0..len).all(|i| self.variant_at(i) == other.variant_at(i))
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Conversions

impl<T: ArrayElement> From<&[T]> for Array<T> {
    fn from(slice: &[T]) -> Self {
        let mut array = Self::new();
        for element in slice {
            array.push(element.to_godot());
        }
        array
    }
}

impl<T: ArrayElement, const N: usize> From<&[T; N]> for Array<T> {
    fn from(arr: &[T; N]) -> Self {
        Self::from(&arr[..])
    }
}

impl<T: ArrayElement> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T: ArrayElement> Extend<T> for Array<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.push(element);
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Engine conversions

impl<T: ArrayElement> GodotConvert for Array<T> {
    type Via = Self;
}

impl<T: ArrayElement> ToGodot for Array<T> {
    fn to_godot(&self) -> Self::Via {
        self.clone()
    }

    fn into_godot(self) -> Self::Via {
        self
    }

    fn to_variant(&self) -> Variant {
        if !self.handle.is_live() {
            return Variant::nil();
        }

        self.handle.raw().ffi_to_variant()
    }
}

impl<T: ArrayElement> FromGodot for Array<T> {
    fn try_from_godot(via: Self::Via) -> Result<Self, ConvertError> {
        Ok(via)
    }
}

impl<T: ArrayElement> GodotType for Array<T> {
    type Ffi = sys::OpaqueArray;

    fn to_ffi(&self) -> Self::Ffi {
        self.handle.raw()
    }

    fn into_ffi(self) -> Self::Ffi {
        self.handle.into_owned_copy()
    }

    fn try_from_ffi(ffi: Self::Ffi) -> Result<Self, ConvertError> {
        Self::from_handle(OpaqueHandle::from_owned(ffi)).validated()
    }

    fn property_hint_info() -> PropertyHintInfo {
        PropertyHintInfo::array_element::<T>()
    }

    fn nil_value() -> Option<Self> {
        Some(Self::new())
    }
}

impl GodotFfiVariant for sys::OpaqueArray {
    fn ffi_to_variant(&self) -> Variant {
        ffi_to_variant_via_type(self)
    }

    fn ffi_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        ffi_from_variant_via_type(variant)
    }

    unsafe fn ffi_copy_from_ptr(ptr: sys::GDExtensionConstTypePtr) -> Self {
        copy_from_ptr(ptr)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Iteration

/// Iterator over the elements of an [`Array`], see [`Array::iter_shared()`].
pub struct Iter<'a, T: ArrayElement> {
    array: &'a Array<T>,
    next_idx: usize,
}

impl<T: ArrayElement> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.array.get(self.next_idx)?;
        self.next_idx += 1;
        Some(element)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Macros

/// Constructs [`Array`] literals, similar to Rust's standard `vec!` macro.
///
/// The type of the array is inferred from the arguments.
///
/// # Example
/// ```no_run
/// # use godot::prelude::*;
/// let arr = array![3, 1, 4];  // Array<i64>
/// ```
#[macro_export]
macro_rules! array {
    ($($elements:expr),* $(,)?) => {
        {
            let mut array = $crate::builtin::Array::default();
            $(
                array.push($elements);
            )*
            array
        }
    };
}

/// Constructs [`VariantArray`] literals, similar to Rust's standard `vec!` macro.
///
/// The type of each element is converted to `Variant` through [`ToGodot::to_variant()`].
///
/// # Example
/// ```no_run
/// # use godot::prelude::*;
/// let arr: VariantArray = varray![42_i64, "hello", true];
/// ```
#[macro_export]
macro_rules! varray {
    ($($elements:expr),* $(,)?) => {
        {
            use $crate::meta::ToGodot as _;
            let mut array = $crate::builtin::VariantArray::default();
            $(
                array.push($elements.to_variant());
            )*
            array
        }
    };
}
