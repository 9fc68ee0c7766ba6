/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Godot's three string types: [`GString`], [`StringName`] and [`NodePath`].

mod gstring;
mod node_path;
mod string_name;

pub use gstring::GString;
pub use node_path::NodePath;
pub use string_name::StringName;

use godot_ffi as sys;
use sys::FrameSlot;

/// Pointer access shared by all string types, in the form the interface functions take them.
macro_rules! impl_string_sys {
    ($T:ident) => {
        impl $T {
            #[doc(hidden)]
            pub fn string_sys(&self) -> $crate::sys::GDExtensionConstTypePtr {
                self.sys()
            }

            #[doc(hidden)]
            pub fn string_sys_mut(&mut self) -> $crate::sys::GDExtensionTypePtr {
                self.sys_mut()
            }

            /// Owned copy of an engine string.
            ///
            /// # Safety
            /// `ptr` must point to a valid value of this string type.
            #[doc(hidden)]
            pub unsafe fn new_from_string_sys(ptr: *mut std::ffi::c_void) -> Self {
                Self::from_opaque($crate::builtin::opaque_handle::copy_from_ptr(ptr))
            }

            /// Replaces the engine string at `dst` with a copy of `self`.
            ///
            /// # Safety
            /// `dst` must point to a valid, engine-owned value of this string type.
            #[doc(hidden)]
            pub unsafe fn assign_to_string_sys(&self, dst: *mut std::ffi::c_void) {
                $crate::builtin::string::assign_copy(self.opaque(), dst as *mut _);
            }
        }
    };
}

pub(crate) use impl_string_sys;

/// Destroys the value at `dst` and copy-constructs `src` in its place.
///
/// # Safety
/// `dst` must point to a valid value of `T`.
pub(crate) unsafe fn assign_copy<T: FrameSlot>(src: T, dst: *mut T) {
    T::destroy(dst);
    sys::builtin_ops(T::VARIANT_TYPE).construct_copy_into(
        dst as sys::GDExtensionUninitializedTypePtr,
        &src as *const T as sys::GDExtensionConstTypePtr,
    );
}

/// Runs converting constructor `index` of `T`'s engine type with a single argument (e.g. `String(StringName)`).
///
/// # Safety
/// `arg` must point to a valid value of the constructor's parameter type.
pub(crate) unsafe fn construct_converted<T: FrameSlot>(
    index: i32,
    arg: sys::GDExtensionConstTypePtr,
) -> T {
    let variant_type = T::VARIANT_TYPE;
    let ctor = sys::interface_fn!(variant_get_ptr_constructor)(variant_type.sys(), index)
        .unwrap_or_else(|| {
            panic!(
                "engine does not provide constructor #{index} of {}",
                variant_type.godot_name()
            )
        });

    let mut raw = std::mem::MaybeUninit::<T>::uninit();
    let args = [arg];
    ctor(raw.as_mut_ptr() as sys::GDExtensionUninitializedTypePtr, args.as_ptr());

    raw.assume_init()
}

/// Constructor indices shared with the engine's API description.
pub(crate) mod ctor {
    pub const STRING_FROM_STRING_NAME: i32 = 2;
    pub const STRING_FROM_NODE_PATH: i32 = 3;
    pub const STRING_NAME_FROM_STRING: i32 = 2;
    pub const NODE_PATH_FROM_STRING: i32 = 2;
}
