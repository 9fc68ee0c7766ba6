/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::atomic::{AtomicUsize, Ordering};

use godot::prelude::*;

use crate::framework::{expect_panic, expect_panic_message, itest};

static DROPS: AtomicUsize = AtomicUsize::new(0);

#[derive(GodotClass)]
#[class(init)]
struct DropCounter {
    #[var]
    value: i64,
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        DROPS.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(GodotClass)]
#[class(init, base = Node)]
struct ObjNode {
    #[init(val = 7)]
    counter: i32,

    base: Base<Node>,
}

#[godot_api]
impl ObjNode {
    #[func]
    fn increment(&mut self) -> i32 {
        self.counter += 1;
        self.counter
    }

    #[func]
    fn self_class(&self) -> GString {
        self.base().get_class()
    }

    #[func]
    fn spawn_counter(&self) -> Gd<DropCounter> {
        DropCounter::new_gd()
    }
}

fn drops() -> usize {
    DROPS.load(Ordering::SeqCst)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Lifecycle

#[itest]
fn object_refcounted_lifecycle() {
    let drops_before = drops();
    let destroyed_before = fake_engine::destructor_runs();

    let obj = DropCounter::new_gd();
    let id = obj.instance_id();
    assert!(id.is_ref_counted());
    assert_eq!(obj.get_reference_count(), 1);
    assert_eq!(fake_engine::reference_count(id.to_u64()), Some(1));

    // Clones share the single reference held by the Rust side.
    let copy = obj.clone();
    assert_eq!(obj.get_reference_count(), 1);
    drop(copy);
    assert!(fake_engine::is_alive(id.to_u64()));

    drop(obj);
    assert!(!fake_engine::is_alive(id.to_u64()));
    assert_eq!(drops(), drops_before + 1);
    assert_eq!(fake_engine::destructor_runs(), destroyed_before + 1);
}

#[itest]
fn object_refcounted_created_by_engine() {
    let drops_before = drops();
    let id = fake_engine::instantiate("DropCounter").unwrap();
    assert_eq!(fake_engine::reference_count(id), Some(1));
    assert_eq!(fake_engine::class_of(id).as_deref(), Some("DropCounter"));

    // A Rust pointer adds its own reference, and gives it back when dropped.
    let obj = Gd::<DropCounter>::from_instance_id(InstanceId::try_from_u64(id).unwrap());
    assert_eq!(fake_engine::reference_count(id), Some(2));
    assert_eq!(obj.bind().value, 0);
    drop(obj);
    assert_eq!(fake_engine::reference_count(id), Some(1));
    assert_eq!(drops(), drops_before);

    fake_engine::release(id);
    assert!(!fake_engine::is_alive(id));
    assert_eq!(drops(), drops_before + 1);
}

#[itest]
fn object_returned_and_discarded_by_engine() {
    let node = ObjNode::new_alloc();
    let id = node.instance_id().to_u64();
    let drops_before = drops();
    let destroyed_before = fake_engine::destructor_runs();

    fake_engine::ptrcall_method_discarding(id, "spawn_counter", &[]).unwrap();

    // Nobody took the returned reference, so the object dies with the call.
    assert_eq!(drops(), drops_before + 1);
    assert_eq!(fake_engine::destructor_runs(), destroyed_before + 1);

    node.free();
}

#[itest]
fn object_manual_free() {
    let node = ObjNode::new_alloc();
    let id = node.instance_id();
    assert!(!id.is_ref_counted());

    let copy = node.clone();
    assert!(copy.is_instance_valid());

    node.free();
    assert!(!copy.is_instance_valid());
    assert!(!fake_engine::is_alive(id.to_u64()));
    assert_eq!(copy.to_string(), "<Freed Object>");

    expect_panic("free() on dead object", move || copy.free());
}

#[itest]
fn object_free_refcounted_through_base_panics() {
    let obj = DropCounter::new_gd().upcast::<Object>();
    expect_panic("free() on RefCounted", || obj.clone().free());
    assert!(obj.is_instance_valid());
}

#[itest]
fn object_from_instance_id() {
    let node = ObjNode::new_alloc();
    let id = node.instance_id();

    let same = Gd::<ObjNode>::try_from_instance_id(id).expect("live object");
    assert_eq!(same, node);
    assert_eq!(same.instance_id(), id);

    // Wrong class is rejected.
    assert!(Gd::<RefCounted>::try_from_instance_id(id).is_none());

    node.free();
    assert!(Gd::<ObjNode>::try_from_instance_id(id).is_none());
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Casts and class queries

#[itest]
fn object_upcast_downcast() {
    let node = ObjNode::new_alloc();
    let id = node.instance_id();

    let as_object: Gd<Object> = node.upcast();
    assert_eq!(as_object.instance_id(), id);
    assert_eq!(as_object.get_class(), GString::from("ObjNode"));
    assert!(as_object.is_class("Node"));
    assert!(as_object.is_class("Object"));
    assert!(!as_object.is_class("RefCounted"));

    let as_refcounted = as_object.clone().try_cast::<RefCounted>();
    let as_object = as_refcounted.expect_err("Node is not RefCounted");
    assert!(as_object.as_refcounted().is_none());

    let back: Gd<ObjNode> = as_object.cast();
    assert_eq!(back.bind().counter, 7);
    back.free();
}

#[itest]
fn object_construct_by_name() {
    let obj = Gd::<RefCounted>::construct("DropCounter").expect("registered RefCounted class");
    assert_eq!(obj.get_class(), GString::from("DropCounter"));

    assert!(Gd::<Node>::construct("DropCounter").is_none());
    assert!(Gd::<Object>::construct("NoSuchClass").is_none());
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Dynamic access

#[itest]
fn object_get_set_call() {
    let mut obj = DropCounter::new_gd();
    obj.set("value", &42i64.to_variant());
    assert_eq!(obj.get("value"), 42i64.to_variant());
    assert_eq!(obj.bind().value, 42);

    let mut node = ObjNode::new_alloc();
    assert_eq!(node.call("increment", &[]), 8i32.to_variant());
    assert_eq!(node.call("self_class", &[]), GString::from("ObjNode").to_variant());

    let err = node.try_call("no_such_method", &[]).expect_err("unknown method");
    assert_eq!(err.class_name(), Some("Object"));
    assert_eq!(err.method_name(), "call");

    node.free();
}

#[itest]
fn object_bind_mut_twice_panics() {
    let mut obj = DropCounter::new_gd();
    let mut copy = obj.clone();

    {
        let mut guard = obj.bind_mut();
        guard.value = 3;

        let msg = expect_panic_message("second bind_mut()", || {
            let _second = copy.bind_mut();
        });
        assert!(msg.contains("already bound"), "{msg}");
    }

    assert_eq!(copy.bind().value, 3);
}

#[itest]
fn object_base_to_gd() {
    let node = ObjNode::new_alloc();
    let base = node.bind().base();
    assert_eq!(base.instance_id(), node.instance_id());

    let self_gd = node.bind().to_gd();
    assert_eq!(self_gd, node);

    node.free();
}

#[itest]
fn object_display_and_debug() {
    let obj = DropCounter::new_gd();
    let id = obj.instance_id();

    assert_eq!(obj.to_string(), format!("<DropCounter#{}>", id.to_u64()));
    assert!(format!("{obj:?}").contains("DropCounter"));
}
