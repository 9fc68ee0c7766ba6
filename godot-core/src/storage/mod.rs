/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Rust-side state of user class instances, and the engine-side bindings that point to it.

mod borrow_scope;
mod instance_storage;

pub use borrow_scope::BorrowScope;
pub use instance_storage::*;

use std::ffi::c_void;

use godot_ffi as sys;

/// Callbacks attached to every object the extension holds a `Gd` to.
///
/// The free callback is the engine's notification that the object is gone; it ends the object's pointer manager entry, so that all
/// `Gd` pointers to it observe the object as dead.
pub(crate) fn instance_binding_callbacks() -> &'static sys::GDExtensionInstanceBindingCallbacks {
    static CALLBACKS: sys::GDExtensionInstanceBindingCallbacks =
        sys::GDExtensionInstanceBindingCallbacks {
            create_callback: Some(binding_create),
            free_callback: Some(binding_free),
            reference_callback: Some(binding_reference),
        };

    &CALLBACKS
}

/// Ensures that `object_ptr` carries this library's binding, creating a marker binding for engine classes.
///
/// # Safety
/// `object_ptr` must point to a live object.
pub(crate) unsafe fn attach_instance_binding(object_ptr: sys::GDExtensionObjectPtr) -> *mut c_void {
    let token = sys::get_library();
    sys::interface_fn!(object_get_instance_binding)(object_ptr, token, instance_binding_callbacks())
}

unsafe extern "C" fn binding_create(_token: *mut c_void, instance: *mut c_void) -> *mut c_void {
    // Engine classes have no Rust state; any non-null value marks the binding as present.
    instance
}

unsafe extern "C" fn binding_free(_token: *mut c_void, instance: *mut c_void, _binding: *mut c_void) {
    let had_entry = sys::pointer_manager::invalidate_key(instance as usize);
    sys::out!("binding_free: {instance:?} (entry ended: {had_entry})");
}

unsafe extern "C" fn binding_reference(
    _token: *mut c_void,
    _binding: *mut c_void,
    _reference: sys::GDExtensionBool,
) -> sys::GDExtensionBool {
    sys::SYS_TRUE
}
