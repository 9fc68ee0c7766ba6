/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

// Note: transmute not supported for const generics; see
// https://users.rust-lang.org/t/transmute-in-the-context-of-constant-generics/56827

use crate as sys;
use crate::{FrameSlot, VariantType};

/// Stores an opaque object of a certain size, with very restricted operations.
///
/// Due to `align(8)` and not `packed` repr, this type may be bigger than `N` bytes, which is fine since the engine only reads and
/// writes those `N` bytes.
#[cfg_attr(target_pointer_width = "32", repr(C, align(4)))]
#[cfg_attr(target_pointer_width = "64", repr(C, align(8)))]
#[derive(Copy, Clone)]
pub struct Opaque<const N: usize> {
    storage: [u8; N],
    marker: std::marker::PhantomData<*const u8>, // disable Send/Sync
}

impl<const N: usize> Opaque<N> {
    /// All-zero bytes. Only meaningful as a placeholder the engine overwrites.
    pub const fn zeroed() -> Self {
        Self {
            storage: [0; N],
            marker: std::marker::PhantomData,
        }
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.storage
    }
}

impl<const N: usize> std::fmt::Debug for Opaque<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Opaque<{N}>({:02x?})", self.storage)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

macro_rules! opaque_types {
    ( $( $(#[$attr:meta])* $Name:ident = $size:literal as $Variant:ident; )* ) => {
        $(
            $(#[$attr])*
            #[repr(transparent)]
            #[derive(Copy, Clone, Debug)]
            pub struct $Name(Opaque<$size>);

            impl $Name {
                pub const SIZE: usize = $size;

                pub fn sys(&self) -> sys::GDExtensionConstTypePtr {
                    self as *const Self as sys::GDExtensionConstTypePtr
                }

                pub fn sys_mut(&mut self) -> sys::GDExtensionTypePtr {
                    self as *mut Self as sys::GDExtensionTypePtr
                }
            }

            // SAFETY: the default constructor and destructor are the engine's own for this type.
            unsafe impl FrameSlot for $Name {
                const VARIANT_TYPE: VariantType = VariantType::$Variant;

                unsafe fn write_default(dst: *mut Self) {
                    sys::builtin_ops(VariantType::$Variant).construct_default_into(dst as sys::GDExtensionUninitializedTypePtr);
                }

                unsafe fn destroy(ptr: *mut Self) {
                    sys::builtin_ops(VariantType::$Variant).destroy_at(ptr as sys::GDExtensionTypePtr);
                }
            }
        )*
    };
}

opaque_types! {
    /// Engine `String`.
    OpaqueString = 8 as String;
    /// Engine `StringName`.
    OpaqueStringName = 8 as StringName;
    /// Engine `NodePath`.
    OpaqueNodePath = 8 as NodePath;
    /// Engine `Callable`.
    OpaqueCallable = 16 as Callable;
    /// Engine `Signal`.
    OpaqueSignal = 16 as Signal;
    /// Engine `Dictionary`.
    OpaqueDictionary = 8 as Dictionary;
    /// Engine `Array`.
    OpaqueArray = 8 as Array;
    OpaquePackedByteArray = 16 as PackedByteArray;
    OpaquePackedInt32Array = 16 as PackedInt32Array;
    OpaquePackedInt64Array = 16 as PackedInt64Array;
    OpaquePackedFloat32Array = 16 as PackedFloat32Array;
    OpaquePackedFloat64Array = 16 as PackedFloat64Array;
    OpaquePackedStringArray = 16 as PackedStringArray;
    OpaquePackedVector2Array = 16 as PackedVector2Array;
    OpaquePackedVector3Array = 16 as PackedVector3Array;
    OpaquePackedColorArray = 16 as PackedColorArray;
    OpaquePackedVector4Array = 16 as PackedVector4Array;
}

/// Engine `Variant`: three machine words, the first holding the type tag.
#[repr(transparent)]
#[derive(Copy, Clone, Debug)]
pub struct OpaqueVariant(Opaque<24>);

impl OpaqueVariant {
    pub const SIZE: usize = 24;

    pub fn sys(&self) -> sys::GDExtensionConstVariantPtr {
        self as *const Self as sys::GDExtensionConstVariantPtr
    }

    pub fn sys_mut(&mut self) -> sys::GDExtensionVariantPtr {
        self as *mut Self as sys::GDExtensionVariantPtr
    }
}

// SAFETY: a Nil variant is the engine's default, and `variant_destroy` releases any payload.
unsafe impl FrameSlot for OpaqueVariant {
    const VARIANT_TYPE: VariantType = VariantType::Nil;

    unsafe fn write_default(dst: *mut Self) {
        crate::interface_fn!(variant_new_nil)(dst as sys::GDExtensionUninitializedVariantPtr);
    }

    unsafe fn destroy(ptr: *mut Self) {
        crate::interface_fn!(variant_destroy)(ptr as sys::GDExtensionVariantPtr);
    }
}

#[cfg(target_pointer_width = "64")]
crate::static_assert!(std::mem::size_of::<OpaqueVariant>() == 24);
#[cfg(target_pointer_width = "64")]
crate::static_assert!(std::mem::size_of::<OpaquePackedByteArray>() == 16);
