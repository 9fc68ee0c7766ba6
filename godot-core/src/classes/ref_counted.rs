/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use godot_ffi as sys;

use crate::builtin::{GString, StringName, Variant};
use crate::classes::{engine_class, Object};
use crate::meta::{ClassMethodBind, PropertyInfo, Signature};
use crate::obj::Base;
use crate::private::You_forgot_the_attribute__godot_api;

engine_class! {
    /// Godot class `RefCounted`: base class of all reference-counted objects.
    ///
    /// Every `Gd<T>` with `T: Inherits<RefCounted>` holds one engine reference; the object is destroyed when the last reference, in
    /// Rust or in the engine, is released.
    RefCounted: Object {
        memory: MemRefCounted,
        init_level: Core,
        ancestors: [Object],
    }
}

const CLASS: &str = "RefCounted";

impl RefCounted {
    /// Sets the reference count to 1 for an object that nobody references yet. Returns `false` if the count was not zero.
    ///
    /// # Safety
    /// `object_ptr` must point to a live ref-counted object.
    pub(crate) unsafe fn raw_init_ref(object_ptr: sys::GDExtensionObjectPtr) -> bool {
        let bind = ClassMethodBind::load(CLASS, "init_ref", 2240911060);
        Signature::<(), bool>::out_class_ptrcall(bind, object_ptr, ())
    }

    /// # Safety
    /// `object_ptr` must point to a live ref-counted object.
    pub(crate) unsafe fn raw_reference(object_ptr: sys::GDExtensionObjectPtr) -> bool {
        let bind = ClassMethodBind::load(CLASS, "reference", 2240911060);
        Signature::<(), bool>::out_class_ptrcall(bind, object_ptr, ())
    }

    /// Returns `true` if the count dropped to zero, in which case the caller must destroy the object.
    ///
    /// # Safety
    /// `object_ptr` must point to a live ref-counted object, with a reference owned by the caller.
    pub(crate) unsafe fn raw_unreference(object_ptr: sys::GDExtensionObjectPtr) -> bool {
        let bind = ClassMethodBind::load(CLASS, "unreference", 2240911060);
        Signature::<(), bool>::out_class_ptrcall(bind, object_ptr, ())
    }

    /// # Safety
    /// `object_ptr` must point to a live ref-counted object.
    pub(crate) unsafe fn raw_get_reference_count(object_ptr: sys::GDExtensionObjectPtr) -> i32 {
        let bind = ClassMethodBind::load(CLASS, "get_reference_count", 3905245786);
        Signature::<(), i32>::out_class_ptrcall(bind, object_ptr, ())
    }
}

/// Virtual methods of class `RefCounted`.
#[allow(unused_variables)]
pub trait IRefCounted: crate::obj::GodotClass + You_forgot_the_attribute__godot_api {
    /// Godot constructor, accepting an injected `base` object.
    fn init(base: Base<Self::Base>) -> Self {
        unimplemented!()
    }

    /// String representation of the Godot instance.
    fn to_string(&self) -> GString {
        unimplemented!()
    }

    fn on_notification(&mut self, what: i32) {
        unimplemented!()
    }

    fn get_property(&self, property: StringName) -> Option<Variant> {
        unimplemented!()
    }

    fn set_property(&mut self, property: StringName, value: Variant) -> bool {
        unimplemented!()
    }

    fn get_property_list(&mut self) -> Vec<PropertyInfo> {
        unimplemented!()
    }

    fn property_get_revert(&self, property: StringName) -> Option<Variant> {
        unimplemented!()
    }

    fn validate_property(&self, property: &mut PropertyInfo) {
        unimplemented!()
    }
}
