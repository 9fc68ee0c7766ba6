/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::{GString, PackedStringArray, StringName, Variant};
use crate::classes::{engine_class, Object};
use crate::meta::PropertyInfo;
use crate::obj::Base;
use crate::private::You_forgot_the_attribute__godot_api;

engine_class! {
    /// Godot class `Node`: base class of everything in the scene tree.
    ///
    /// Nodes are manually managed. Once added to a tree, the tree frees them; otherwise call [`Gd::free()`][crate::obj::Gd::free].
    Node: Object {
        memory: MemManual,
        init_level: Scene,
        ancestors: [Object],
    }
}

/// Virtual methods of class `Node`.
///
/// Implement in a `#[godot_api] impl INode for MyClass` block. Only implemented methods are reported to the engine as overridden.
#[allow(unused_variables)]
pub trait INode: crate::obj::GodotClass + You_forgot_the_attribute__godot_api {
    /// Godot constructor, accepting an injected `base` object.
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

    /// Called when the node and all its children have entered the scene tree.
    ///
    /// _Godot virtual: `_ready`_
    fn ready(&mut self) {
        unimplemented!()
    }

    /// Called every idle frame, with the elapsed time since the previous frame in seconds.
    ///
    /// _Godot virtual: `_process`_
    fn process(&mut self, delta: f64) {
        unimplemented!()
    }

    /// Called every physics frame, with the fixed physics step in seconds.
    ///
    /// _Godot virtual: `_physics_process`_
    fn physics_process(&mut self, delta: f64) {
        unimplemented!()
    }

    /// _Godot virtual: `_enter_tree`_
    fn enter_tree(&mut self) {
        unimplemented!()
    }

    /// _Godot virtual: `_exit_tree`_
    fn exit_tree(&mut self) {
        unimplemented!()
    }

    /// Warnings the editor shows next to the node in the scene dock. An empty array means the node is configured correctly.
    ///
    /// _Godot virtual: `_get_configuration_warnings`_
    fn get_configuration_warnings(&self) -> PackedStringArray {
        unimplemented!()
    }
}
