/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use fake_engine::{EngineError, HostValue};
use godot::prelude::*;
use godot::sys::pointer_manager;

use crate::framework::{itest, suppress_godot_print};

#[derive(GodotClass)]
#[class(init, base = Node)]
struct WarningNode {
    ready_calls: u32,
    notifications: Vec<i32>,
    base: Base<Node>,
}

#[godot_api]
impl INode for WarningNode {
    fn to_string(&self) -> GString {
        "hello".into()
    }

    fn on_notification(&mut self, what: i32) {
        self.notifications.push(what);
    }

    fn ready(&mut self) {
        self.ready_calls += 1;
    }

    fn get_configuration_warnings(&self) -> PackedStringArray {
        PackedStringArray::from(&[GString::from("hello")])
    }
}

#[derive(GodotClass)]
#[class(init, base = Node)]
struct ProcessNode {
    elapsed: f64,
    physics_ticks: u32,
    base: Base<Node>,
}

#[godot_api]
impl INode for ProcessNode {
    fn process(&mut self, delta: f64) {
        self.elapsed += delta;
    }

    fn physics_process(&mut self, _delta: f64) {
        self.physics_ticks += 1;
    }

    fn ready(&mut self) {
        panic!("ready() of ProcessNode");
    }
}

#[derive(GodotClass)]
#[class(base = RefCounted)]
struct Greeter {
    greeting: GString,
    base: Base<RefCounted>,
}

#[godot_api]
impl IRefCounted for Greeter {
    fn init(base: Base<RefCounted>) -> Self {
        Self {
            greeting: "hi".into(),
            base,
        }
    }

    fn to_string(&self) -> GString {
        self.greeting.clone()
    }
}

#[derive(GodotClass)]
#[class(init, base = Resource)]
struct LocalResource {
    setups: u32,
}

#[godot_api]
impl IResource for LocalResource {
    fn setup_local_to_scene(&mut self) {
        self.setups += 1;
    }
}

fn gd_of<T: GodotClass>(id: u64) -> Gd<T> {
    Gd::from_instance_id(InstanceId::try_from_u64(id).expect("non-null ID"))
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[itest]
fn virtual_configuration_warnings() {
    let id = fake_engine::instantiate("WarningNode").unwrap();
    let warnings = fake_engine::call_virtual_warnings(id).unwrap();
    assert_eq!(warnings, vec!["hello".to_string()]);

    fake_engine::free_object(id).unwrap();
}

#[itest]
fn virtual_to_string() {
    let id = fake_engine::instantiate("WarningNode").unwrap();
    assert_eq!(fake_engine::object_to_string(id), "hello");

    let node = gd_of::<WarningNode>(id);
    assert_eq!(node.to_string(), "hello");

    node.free();
    assert!(!fake_engine::is_alive(id));
}

#[itest]
fn virtual_ready_and_notification() {
    let id = fake_engine::instantiate("WarningNode").unwrap();
    fake_engine::call_virtual(id, "_ready", &[], None).unwrap();
    fake_engine::call_virtual(id, "_ready", &[], None).unwrap();
    fake_engine::notify(id, 42).unwrap();

    let node = gd_of::<WarningNode>(id);
    {
        let guard = node.bind();
        assert_eq!(guard.ready_calls, 2);
        assert_eq!(guard.notifications, vec![42]);
    }

    node.free();
}

#[itest]
fn virtual_not_overridden_is_absent() {
    let id = fake_engine::instantiate("WarningNode").unwrap();

    let err = fake_engine::call_virtual(id, "_process", &[HostValue::Float(0.5)], None).unwrap_err();
    assert_eq!(
        err,
        EngineError::NoVirtual {
            class: "WarningNode".to_string(),
            method: "_process".to_string(),
        }
    );

    let err = fake_engine::call_virtual(id, "_unknown_virtual", &[], None).unwrap_err();
    assert!(matches!(err, EngineError::NoVirtual { .. }));

    fake_engine::free_object(id).unwrap();
}

#[itest]
fn virtual_with_arguments() {
    let id = fake_engine::instantiate("ProcessNode").unwrap();
    for _ in 0..4 {
        fake_engine::call_virtual(id, "_process", &[HostValue::Float(0.25)], None).unwrap();
    }
    fake_engine::call_virtual(id, "_physics_process", &[HostValue::Float(1.0)], None).unwrap();

    let node = gd_of::<ProcessNode>(id);
    assert_eq!(node.bind().elapsed, 1.0);
    assert_eq!(node.bind().physics_ticks, 1);

    // Not overridden by ProcessNode.
    assert!(fake_engine::call_virtual_warnings(id).is_err());

    node.free();
}

#[itest]
fn virtual_panic_is_contained() {
    let id = fake_engine::instantiate("ProcessNode").unwrap();

    suppress_godot_print(|| {
        fake_engine::call_virtual(id, "_ready", &[], None).unwrap();
    });
    assert_eq!(pointer_manager::stats().borrowed, 0);

    fake_engine::call_virtual(id, "_process", &[HostValue::Float(0.5)], None).unwrap();
    assert_eq!(pointer_manager::stats().borrowed, 0);

    // The instance is neither bound nor destroyed after the panic.
    let mut node = gd_of::<ProcessNode>(id);
    assert_eq!(node.bind().elapsed, 0.5);
    node.bind_mut().elapsed = 3.0;
    assert_eq!(node.bind().elapsed, 3.0);

    node.free();
}

#[itest]
fn virtual_user_init() {
    let greeter = Greeter::new_gd();
    assert_eq!(greeter.bind().greeting, GString::from("hi"));
    assert_eq!(greeter.to_string(), "hi");

    let id = fake_engine::instantiate("Greeter").unwrap();
    assert_eq!(fake_engine::object_to_string(id), "hi");
    fake_engine::release(id);
    assert!(!fake_engine::is_alive(id));
}

#[itest]
fn virtual_resource_setup() {
    let res = LocalResource::new_gd();
    let id = res.instance_id().to_u64();

    fake_engine::call_virtual(id, "_setup_local_to_scene", &[], None).unwrap();
    assert_eq!(res.bind().setups, 1);
    assert!(res.is_class("Resource"));
}
