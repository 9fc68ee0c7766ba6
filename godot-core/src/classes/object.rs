/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use godot_ffi as sys;

use crate::builtin::{Callable, GString, StringName, Variant};
use crate::classes::engine_class;
use crate::global::Error;
use crate::meta::{CallResult, ClassMethodBind, PropertyInfo, Signature};
use crate::obj::{Base, NoBase};
use crate::private::You_forgot_the_attribute__godot_api;

engine_class! {
    /// Godot class `Object`, the root of the class hierarchy.
    ///
    /// A `Gd<Object>` may point to a ref-counted or a manually managed instance; which one is decided per instance.
    Object: NoBase {
        memory: MemDynamic,
        init_level: Core,
        ancestors: [],
    }
}

const CLASS: &str = "Object";

impl Object {
    /// # Safety
    /// `object_ptr` must point to a live object.
    pub(crate) unsafe fn raw_get_class(object_ptr: sys::GDExtensionObjectPtr) -> GString {
        let bind = ClassMethodBind::load(CLASS, "get_class", 201670096);
        Signature::<(), GString>::out_class_ptrcall(bind, object_ptr, ())
    }

    /// # Safety
    /// `object_ptr` must point to a live object.
    pub(crate) unsafe fn raw_is_class(object_ptr: sys::GDExtensionObjectPtr, class: GString) -> bool {
        let bind = ClassMethodBind::load(CLASS, "is_class", 3927539163);
        Signature::<(GString,), bool>::out_class_ptrcall(bind, object_ptr, (class,))
    }

    /// # Safety
    /// `object_ptr` must point to a live object.
    pub(crate) unsafe fn raw_get(object_ptr: sys::GDExtensionObjectPtr, property: StringName) -> Variant {
        let bind = ClassMethodBind::load(CLASS, "get", 2760726917);
        Signature::<(StringName,), Variant>::out_class_ptrcall(bind, object_ptr, (property,))
    }

    /// # Safety
    /// `object_ptr` must point to a live object.
    pub(crate) unsafe fn raw_set(
        object_ptr: sys::GDExtensionObjectPtr,
        property: StringName,
        value: Variant,
    ) {
        let bind = ClassMethodBind::load(CLASS, "set", 3776071444);
        Signature::<(StringName, Variant), ()>::out_class_ptrcall(bind, object_ptr, (property, value))
    }

    /// # Safety
    /// `object_ptr` must point to a live object.
    pub(crate) unsafe fn raw_call(
        object_ptr: sys::GDExtensionObjectPtr,
        method: StringName,
        varargs: &[Variant],
    ) -> CallResult<Variant> {
        let bind = ClassMethodBind::load(CLASS, "call", 3400424181);
        let method_name = method.to_string();

        Signature::<(StringName,), Variant>::out_class_varcall(bind, object_ptr, (method,), varargs).map_err(|err| {
            let class_name = Self::raw_get_class(object_ptr).to_string();
            err.into_dynamic_call(class_name, &method_name, varargs)
        })
    }

    /// # Safety
    /// `object_ptr` must point to a live object.
    pub(crate) unsafe fn raw_connect(
        object_ptr: sys::GDExtensionObjectPtr,
        signal: StringName,
        callable: Callable,
        flags: u32,
    ) -> Error {
        let bind = ClassMethodBind::load(CLASS, "connect", 1518946055);
        Signature::<(StringName, Callable, u32), Error>::out_class_ptrcall(
            bind,
            object_ptr,
            (signal, callable, flags),
        )
    }

    /// # Safety
    /// `object_ptr` must point to a live object.
    pub(crate) unsafe fn raw_emit_signal(
        object_ptr: sys::GDExtensionObjectPtr,
        signal: StringName,
        varargs: &[Variant],
    ) -> CallResult<Error> {
        let bind = ClassMethodBind::load(CLASS, "emit_signal", 4047867050);
        Signature::<(StringName,), Error>::out_class_varcall(bind, object_ptr, (signal,), varargs)
    }
}

/// Virtual methods of class `Object`.
///
/// Implement in a `#[godot_api] impl IObject for MyClass` block. Methods that are not implemented keep the engine's behavior.
#[allow(unused_variables)]
pub trait IObject: crate::obj::GodotClass + You_forgot_the_attribute__godot_api {
    /// Godot constructor, accepting an injected `base` object.
    ///
    /// `base` refers to the base instance of the class, which can either be stored in a `Base<T>` field or discarded.
    /// This method returns a fully-constructed instance, which will then be moved into a [`Gd<T>`][crate::obj::Gd] pointer.
    fn init(base: Base<Self::Base>) -> Self {
        unimplemented!()
    }

    /// String representation of the Godot instance.
    ///
    /// Override this method to define how the instance is represented as a string.
    /// Used by `impl Display for Gd<T>`, as well as `str()` and `print()` in GDScript.
    fn to_string(&self) -> GString {
        unimplemented!()
    }

    /// Called when the object receives a Godot notification.
    ///
    /// The type of notification can be identified through `what`.
    fn on_notification(&mut self, what: i32) {
        unimplemented!()
    }

    /// Called whenever [`get()`](crate::obj::Gd::get) is called or Godot gets the value of a property.
    ///
    /// Should return the given `property`'s value as `Some(value)`, or `None` if the property should be handled normally.
    fn get_property(&self, property: StringName) -> Option<Variant> {
        unimplemented!()
    }

    /// Called whenever Godot [`set()`](crate::obj::Gd::set) is called or Godot sets the value of a property.
    ///
    /// Should set `property` to the given `value` and return `true`, or return `false` to indicate the `property`
    /// should be handled normally.
    fn set_property(&mut self, property: StringName, value: Variant) -> bool {
        unimplemented!()
    }

    /// Called whenever Godot retrieves the property list. Returned properties are shown in addition to the registered ones.
    fn get_property_list(&mut self) -> Vec<PropertyInfo> {
        unimplemented!()
    }

    /// Returns the value the editor's "revert" button restores for `property`, or `None` if it cannot be reverted.
    fn property_get_revert(&self, property: StringName) -> Option<Variant> {
        unimplemented!()
    }

    /// Called whenever the engine validates a property, e.g. before showing it in the inspector.
    ///
    /// Hints and usage flags of `property` may be adjusted in place.
    fn validate_property(&self, property: &mut PropertyInfo) {
        unimplemented!()
    }
}
