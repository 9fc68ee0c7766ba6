/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::{GString, StringName, Variant};
use crate::classes::{engine_class, Object, RefCounted};
use crate::meta::PropertyInfo;
use crate::obj::Base;
use crate::private::You_forgot_the_attribute__godot_api;

engine_class! {
    /// Godot class `Resource`: ref-counted data that can be saved, loaded and shared between scenes.
    Resource: RefCounted {
        memory: MemRefCounted,
        init_level: Core,
        ancestors: [Object, RefCounted],
    }
}

/// Virtual methods of class `Resource`.
#[allow(unused_variables)]
pub trait IResource: crate::obj::GodotClass + You_forgot_the_attribute__godot_api {
    fn init(base: Base<Self::Base>) -> Self {
        unimplemented!()
    }

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

    /// Called when a resource marked "local to scene" is duplicated for a scene instance.
    ///
    /// _Godot virtual: `_setup_local_to_scene`_
    fn setup_local_to_scene(&mut self) {
        unimplemented!()
    }
}
