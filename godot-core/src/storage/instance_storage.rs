/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::any::type_name;
use std::cell;

use godot_ffi as sys;

use crate::global::godot_error;
use crate::obj::{Base, GodotClass};
use crate::out;

/// Manages storage and lifecycle of user's extension class instances.
///
/// Lives in a `Box` whose address is the engine's "class instance" pointer for the object.
pub struct InstanceStorage<T: GodotClass> {
    user_instance: cell::RefCell<T>,
    base: Base<T::Base>,
}

impl<T: GodotClass> InstanceStorage<T> {
    pub fn construct(user_instance: T, base: Base<T::Base>) -> Self {
        out!("    Storage::construct             <{}>", type_name::<T>());

        Self {
            user_instance: cell::RefCell::new(user_instance),
            base,
        }
    }

    pub fn is_bound(&self) -> bool {
        // Needs to borrow mutably, otherwise it succeeds if shared borrows are alive.
        self.user_instance.try_borrow_mut().is_err()
    }

    pub fn base(&self) -> &Base<T::Base> {
        &self.base
    }

    pub fn get(&self) -> cell::Ref<'_, T> {
        self.user_instance.try_borrow().unwrap_or_else(|_e| {
            panic!(
                "Gd<T>::bind() failed, already bound; T = {}.\n  \
                 Make sure there is no &mut T live at the time.\n  \
                 This often occurs when a signal or engine callback re-enters Rust code on the same object.",
                type_name::<T>()
            )
        })
    }

    pub fn get_mut(&self) -> cell::RefMut<'_, T> {
        self.user_instance.try_borrow_mut().unwrap_or_else(|_e| {
            panic!(
                "Gd<T>::bind_mut() failed, already bound; T = {}.\n  \
                 Make sure there is no &T or &mut T live at the time.\n  \
                 This often occurs when a signal or engine callback re-enters Rust code on the same object.",
                type_name::<T>()
            )
        })
    }
}

impl<T: GodotClass> Drop for InstanceStorage<T> {
    fn drop(&mut self) {
        out!("    Storage::drop                  <{}>", type_name::<T>());
    }
}

/// Interprets an opaque class instance pointer as the storage of a `T`.
///
/// # Safety
/// `instance_ptr` must have been produced by [`into_instance_ptr()`] for the same `T`, and the instance must not be destroyed during `'u`.
pub unsafe fn as_storage<'u, T: GodotClass>(
    instance_ptr: sys::GDExtensionClassInstancePtr,
) -> &'u InstanceStorage<T> {
    &*(instance_ptr as *mut InstanceStorage<T>)
}

/// Moves the storage to the heap; the returned pointer is handed to the engine as class instance.
pub(crate) fn into_instance_ptr<T: GodotClass>(
    storage: InstanceStorage<T>,
) -> sys::GDExtensionClassInstancePtr {
    Box::into_raw(Box::new(storage)) as sys::GDExtensionClassInstancePtr
}

/// # Safety
/// `instance_ptr` is assumed to point to a valid instance. This function must only be invoked once for a pointer.
pub(crate) unsafe fn destroy_storage<T: GodotClass>(instance_ptr: sys::GDExtensionClassInstancePtr) {
    let raw = instance_ptr as *mut InstanceStorage<T>;

    // Unwinding into the engine is not an option, so a destruction during an active bind leaks the Rust object instead of dropping
    // it under the live reference.
    if (*raw).is_bound() {
        godot_error!(
            "Destroyed an object from Godot side, while a bind() or bind_mut() call was active.\n  \
             Make sure that objects are not destroyed while you still hold a Rust reference to them.\n  \
             class: {}; the Rust instance is leaked.",
            T::class_name()
        );
        return;
    }

    let _drop = Box::from_raw(raw);
}
