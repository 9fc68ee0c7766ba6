/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

#![macro_use]

/// Wires up a `#[repr(C)]` value type whose pointer-call representation is its own layout: frame slot, variant conversion,
/// `GodotType` and `ArrayElement`. The type name must equal its `VariantType` enumerator.
macro_rules! impl_builtin_plain {
    ($( $T:ident ),* $(,)?) => {
        $(
            // SAFETY: plain bytes, default is the engine's zero value for this type.
            unsafe impl $crate::sys::FrameSlot for $T {
                const VARIANT_TYPE: $crate::sys::VariantType = $crate::sys::VariantType::$T;

                unsafe fn write_default(dst: *mut Self) {
                    dst.write(<$T as Default>::default());
                }
            }

            $crate::meta::traits::impl_ffi_variant_plain!($T);
            $crate::impl_godot_as_self!($T);

            impl $crate::meta::GodotType for $T {
                type Ffi = $T;

                fn to_ffi(&self) -> Self::Ffi {
                    *self
                }

                fn into_ffi(self) -> Self::Ffi {
                    self
                }

                fn try_from_ffi(ffi: Self::Ffi) -> Result<Self, $crate::meta::error::ConvertError> {
                    Ok(ffi)
                }

                fn nil_value() -> Option<Self> {
                    Some(<$T as Default>::default())
                }
            }

            impl $crate::meta::ArrayElement for $T {}
        )*
    };
}

/// Wires up a wrapper around an engine-allocated builtin that lives in the pointer manager as an [`OpaqueHandle`].
///
/// The wrapper must be a struct with a single field `handle: OpaqueHandle<$Opaque>`.
///
/// [`OpaqueHandle`]: crate::builtin::opaque_handle::OpaqueHandle
macro_rules! impl_builtin_opaque {
    ($T:ident => $Opaque:ty $(, nil_value = $nil:expr)?) => {
        impl $T {
            /// Wraps an owned engine value; it is destroyed when the last clone of the wrapper is dropped.
            pub(crate) fn from_opaque(opaque: $Opaque) -> Self {
                Self {
                    handle: $crate::builtin::opaque_handle::OpaqueHandle::from_owned(opaque),
                }
            }

            /// Initializes a new value in place.
            ///
            /// # Safety
            /// `init_fn` must fully initialize the pointed-to memory with a valid value of this type.
            #[doc(hidden)]
            pub unsafe fn new_with_uninit(
                init_fn: impl FnOnce($crate::sys::GDExtensionUninitializedTypePtr),
            ) -> Self {
                Self {
                    handle: $crate::builtin::opaque_handle::OpaqueHandle::new_with_uninit(init_fn),
                }
            }

            /// Borrowed copy of the engine bytes; valid while `self` lives.
            pub(crate) fn opaque(&self) -> $Opaque {
                self.handle.raw()
            }

            #[doc(hidden)]
            pub fn sys(&self) -> $crate::sys::GDExtensionConstTypePtr {
                self.handle.sys()
            }

            #[doc(hidden)]
            pub fn sys_mut(&mut self) -> $crate::sys::GDExtensionTypePtr {
                self.handle.sys_mut()
            }
        }

        impl Clone for $T {
            fn clone(&self) -> Self {
                Self {
                    handle: self.handle.clone(),
                }
            }
        }

        impl $crate::meta::GodotConvert for $T {
            type Via = $T;
        }

        impl $crate::meta::ToGodot for $T {
            fn to_godot(&self) -> Self::Via {
                self.clone()
            }

            fn into_godot(self) -> Self::Via {
                self
            }

            // A wrapper whose entry has ended (after teardown) converts to Nil.
            fn to_variant(&self) -> $crate::builtin::Variant {
                if !self.handle.is_live() {
                    return $crate::builtin::Variant::nil();
                }

                $crate::meta::GodotFfiVariant::ffi_to_variant(&self.handle.raw())
            }
        }

        impl $crate::meta::FromGodot for $T {
            fn try_from_godot(via: Self::Via) -> Result<Self, $crate::meta::error::ConvertError> {
                Ok(via)
            }
        }

        impl $crate::meta::GodotType for $T {
            type Ffi = $Opaque;

            fn to_ffi(&self) -> Self::Ffi {
                self.handle.raw()
            }

            fn into_ffi(self) -> Self::Ffi {
                self.handle.into_owned_copy()
            }

            fn try_from_ffi(ffi: Self::Ffi) -> Result<Self, $crate::meta::error::ConvertError> {
                Ok(Self::from_opaque(ffi))
            }

            $(
                fn nil_value() -> Option<Self> {
                    Some($nil)
                }
            )?
        }

        impl $crate::meta::GodotFfiVariant for $Opaque {
            fn ffi_to_variant(&self) -> $crate::builtin::Variant {
                $crate::meta::traits::ffi_to_variant_via_type(self)
            }

            fn ffi_from_variant(
                variant: &$crate::builtin::Variant,
            ) -> Result<Self, $crate::meta::error::ConvertError> {
                $crate::meta::traits::ffi_from_variant_via_type(variant)
            }

            unsafe fn ffi_copy_from_ptr(ptr: $crate::sys::GDExtensionConstTypePtr) -> Self {
                $crate::builtin::opaque_handle::copy_from_ptr::<$Opaque>(ptr)
            }
        }
    };
}
