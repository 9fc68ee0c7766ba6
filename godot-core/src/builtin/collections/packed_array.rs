/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops};

use godot_ffi as sys;
use sys::FrameSlot;

use super::hashes;
use crate::builtin::opaque_handle::{copy_from_ptr, OpaqueHandle};
use crate::builtin::{
    builtin_ptrcall, Color, GString, Variant, Vector2, Vector3, Vector4,
};
use crate::meta::error::ConvertError;
use crate::meta::traits::{ffi_from_variant_via_type, ffi_to_variant_via_type};
use crate::meta::{
    ArrayElement, FromGodot, GodotConvert, GodotFfiVariant, GodotType, PackedArrayElement,
    ToGodot,
};

/// Space-efficient array of `u8` bytes.
pub type PackedByteArray = PackedArray<u8>;
pub type PackedInt32Array = PackedArray<i32>;
pub type PackedInt64Array = PackedArray<i64>;
pub type PackedFloat32Array = PackedArray<f32>;
pub type PackedFloat64Array = PackedArray<f64>;
pub type PackedStringArray = PackedArray<GString>;
pub type PackedVector2Array = PackedArray<Vector2>;
pub type PackedVector3Array = PackedArray<Vector3>;
pub type PackedVector4Array = PackedArray<Vector4>;
pub type PackedColorArray = PackedArray<Color>;

/// Packed array type, storing elements contiguously in engine memory.
///
/// Packed arrays are Godot's space-efficient, typed counterpart of [`Array`](crate::builtin::Array). Unlike `Array`, they have value
/// semantics: cloning gives an independent array (engine-side copy-on-write).
///
/// This generic type can be instantiated for a finite number of element types, which all implement [`PackedArrayElement`].
/// Use the aliases such as [`PackedByteArray`] to name them.
///
/// # Views
///
/// [`view()`](Self::view) borrows the engine buffer as a Rust slice without copying. The view must be released before the array
/// can be mutated again; the borrow checker enforces this, since mutation needs `&mut self`.
pub struct PackedArray<T: PackedArrayElement> {
    handle: OpaqueHandle<T::Array>,
}

impl<T: PackedArrayElement> PackedArray<T> {
    /// Constructs an empty array.
    pub fn new() -> Self {
        Self {
            handle: OpaqueHandle::new_default(),
        }
    }

    fn variant_type() -> sys::VariantType {
        <T::Array as FrameSlot>::VARIANT_TYPE
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
        // SAFETY: `self` is a valid packed array.
        let size: i64 = unsafe {
            builtin_ptrcall(
                Self::variant_type(),
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
        // SAFETY: `self` is a valid packed array.
        unsafe {
            builtin_ptrcall::<(), ()>(
                Self::variant_type(),
                "clear",
                hashes::CLEAR,
                self.sys_mut(),
                (),
            )
        }
    }

    /// Appends an element to the end of the array. Equivalent of `append` and `push_back` in GDScript.
    #[doc(alias = "append")]
    #[doc(alias = "push_back")]
    pub fn push(&mut self, value: T) {
        // SAFETY: `self` is a valid packed array; the engine copies the argument.
        let _appended: bool = unsafe {
            builtin_ptrcall(
                Self::variant_type(),
                "push_back",
                T::PUSH_BACK_HASH,
                self.sys_mut(),
                (value,),
            )
        };
    }

    /// Resizes the array to contain a different number of elements.
    ///
    /// If the new size is smaller, elements are removed from the end. If the new size is larger, new elements are set to
    /// [`Default::default()`].
    pub fn resize(&mut self, size: usize) {
        // SAFETY: `self` is a valid packed array.
        let _error: i64 = unsafe {
            builtin_ptrcall(
                Self::variant_type(),
                "resize",
                hashes::RESIZE,
                self.sys_mut(),
                (crate::builtin::to_i64(size),),
            )
        };
    }

    /// Returns a copy of the value at the specified index, or `None` if out-of-bounds.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }

        // SAFETY: `index` is in bounds.
        Some(unsafe { T::from_raw(self.element_ptr(index)) })
    }

    /// Sets the value at the specified index.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: T) {
        let len = self.len();
        assert!(
            index < len,
            "Packed array index {index} is out of bounds: length is {len}"
        );

        // SAFETY: `index` is in bounds and the array is uniquely borrowed.
        unsafe { T::assign_raw(self.element_ptr(index), &value) };
    }

    /// Copies all elements into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        (0..self.len())
            // SAFETY: all indices are in bounds.
            .map(|index| unsafe { T::from_raw(self.element_ptr(index)) })
            .collect()
    }

    fn element_ptr(&self, index: usize) -> *mut T::Raw {
        // SAFETY: callers check bounds.
        unsafe { T::element_ptr(sys::force_mut_ptr(self.sys()), crate::builtin::to_i64(index)) }
    }
}

impl<T> PackedArray<T>
where
    T: PackedArrayElement<Raw = T>,
{
    /// Borrows the elements as a slice of engine memory, without copying.
    ///
    /// The view lives as long as the shared borrow of `self`; the array cannot be changed meanwhile.
    pub fn view(&self) -> PackedView<'_, T> {
        let len = self.len();
        let slice = if len == 0 {
            &[]
        } else {
            // SAFETY: elements are stored contiguously in the engine buffer; no mutation can happen while `&self` is borrowed.
            unsafe { std::slice::from_raw_parts(self.element_ptr(0), len) }
        };

        PackedView { slice }
    }
}

impl<T: PackedArrayElement> Default for PackedArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PackedArrayElement> Clone for PackedArray<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}

impl<T: PackedArrayElement + PartialEq> PartialEq for PackedArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.to_vec() == other.to_vec()
    }
}

impl<T: PackedArrayElement> fmt::Debug for PackedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Views

/// Read-only slice view into the buffer of a [`PackedArray`], see [`PackedArray::view()`].
pub struct PackedView<'a, T> {
    slice: &'a [T],
}

impl<T> ops::Deref for PackedView<'_, T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.slice
    }
}

impl<T: fmt::Debug> fmt::Debug for PackedView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.slice, f)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Conversions

impl<T: PackedArrayElement> From<&[T]> for PackedArray<T> {
    fn from(slice: &[T]) -> Self {
        let mut array = Self::new();
        array.resize(slice.len());

        for (index, value) in slice.iter().enumerate() {
            // SAFETY: `resize` made every index valid.
            unsafe { T::assign_raw(array.element_ptr(index), value) };
        }
        array
    }
}

impl<T: PackedArrayElement, const N: usize> From<&[T; N]> for PackedArray<T> {
    fn from(arr: &[T; N]) -> Self {
        Self::from(&arr[..])
    }
}

impl<T: PackedArrayElement> From<Vec<T>> for PackedArray<T> {
    fn from(vec: Vec<T>) -> Self {
        Self::from(vec.as_slice())
    }
}

impl<T: PackedArrayElement> FromIterator<T> for PackedArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let elements: Vec<T> = iter.into_iter().collect();
        Self::from(elements.as_slice())
    }
}

impl<T: PackedArrayElement> GodotConvert for PackedArray<T> {
    type Via = Self;
}

impl<T: PackedArrayElement> ToGodot for PackedArray<T> {
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

impl<T: PackedArrayElement> FromGodot for PackedArray<T> {
    fn try_from_godot(via: Self::Via) -> Result<Self, ConvertError> {
        Ok(via)
    }
}

impl<T: PackedArrayElement> GodotType for PackedArray<T> {
    type Ffi = T::Array;

    fn to_ffi(&self) -> Self::Ffi {
        self.handle.raw()
    }

    fn into_ffi(self) -> Self::Ffi {
        self.handle.into_owned_copy()
    }

    fn try_from_ffi(ffi: Self::Ffi) -> Result<Self, ConvertError> {
        Ok(Self {
            handle: OpaqueHandle::from_owned(ffi),
        })
    }

    fn nil_value() -> Option<Self> {
        Some(Self::new())
    }
}

impl<T: PackedArrayElement> ArrayElement for PackedArray<T> {}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Element types

macro_rules! impl_packed_array_ffi {
    ($( $Opaque:ty ),* $(,)?) => {
        $(
            impl GodotFfiVariant for $Opaque {
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
        )*
    };
}

impl_packed_array_ffi!(
    sys::OpaquePackedByteArray,
    sys::OpaquePackedInt32Array,
    sys::OpaquePackedInt64Array,
    sys::OpaquePackedFloat32Array,
    sys::OpaquePackedFloat64Array,
    sys::OpaquePackedStringArray,
    sys::OpaquePackedVector2Array,
    sys::OpaquePackedVector3Array,
    sys::OpaquePackedVector4Array,
    sys::OpaquePackedColorArray,
);

/// Elements that are stored in the engine buffer with their Rust layout.
macro_rules! impl_packed_element_plain {
    ($( $T:ty => $Opaque:ty, $index_fn:ident, $push_hash:literal; )*) => {
        $(
            impl PackedArrayElement for $T {
                type Array = $Opaque;
                type Raw = $T;

                const PUSH_BACK_HASH: i64 = $push_hash;

                unsafe fn element_ptr(array: sys::GDExtensionTypePtr, index: i64) -> *mut Self::Raw {
                    sys::interface_fn!($index_fn)(array, index) as *mut Self::Raw
                }

                unsafe fn from_raw(raw: *const Self::Raw) -> Self {
                    *raw
                }

                unsafe fn assign_raw(dst: *mut Self::Raw, value: &Self) {
                    *dst = *value;
                }
            }
        )*
    };
}

impl_packed_element_plain! {
    u8 => sys::OpaquePackedByteArray, packed_byte_array_operator_index, 694024632;
    i32 => sys::OpaquePackedInt32Array, packed_int32_array_operator_index, 694024632;
    i64 => sys::OpaquePackedInt64Array, packed_int64_array_operator_index, 694024632;
    f32 => sys::OpaquePackedFloat32Array, packed_float32_array_operator_index, 4094791666;
    f64 => sys::OpaquePackedFloat64Array, packed_float64_array_operator_index, 4094791666;
    Vector2 => sys::OpaquePackedVector2Array, packed_vector2_array_operator_index, 4188891560;
    Vector3 => sys::OpaquePackedVector3Array, packed_vector3_array_operator_index, 3295363524;
    Vector4 => sys::OpaquePackedVector4Array, packed_vector4_array_operator_index, 3289167688;
    Color => sys::OpaquePackedColorArray, packed_color_array_operator_index, 1007858200;
}

impl PackedArrayElement for GString {
    type Array = sys::OpaquePackedStringArray;
    type Raw = sys::OpaqueString;

    const PUSH_BACK_HASH: i64 = 816187996;

    unsafe fn element_ptr(array: sys::GDExtensionTypePtr, index: i64) -> *mut Self::Raw {
        sys::interface_fn!(packed_string_array_operator_index)(array, index) as *mut Self::Raw
    }

    unsafe fn from_raw(raw: *const Self::Raw) -> Self {
        GString::new_from_string_sys(raw as *mut std::ffi::c_void)
    }

    unsafe fn assign_raw(dst: *mut Self::Raw, value: &Self) {
        value.assign_to_string_sys(dst as *mut std::ffi::c_void);
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Specialized API

impl PackedByteArray {
    /// Copies the bytes into a `Vec<u8>`, with a single slice copy.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.view().to_vec()
    }
}

impl From<&str> for PackedByteArray {
    fn from(s: &str) -> Self {
        Self::from(s.as_bytes())
    }
}
