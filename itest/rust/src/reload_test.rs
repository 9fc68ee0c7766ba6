/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use fake_engine::EngineError;
use godot::init::InitLevel;
use godot::prelude::*;
use godot::sys;

use crate::framework::{itest, scene_level_counts, suppress_godot_print, take_engine_messages, TestContext};

#[derive(GodotClass)]
#[class(init, base = Node)]
struct AlphaNode {
    #[var]
    generation: i64,

    base: Base<Node>,
}

#[derive(GodotClass)]
#[class(init)]
struct ReloadedRes {}

const CLASSES: [&str; 2] = ["AlphaNode", "ReloadedRes"];

fn registered() -> Vec<&'static str> {
    CLASSES
        .into_iter()
        .filter(|class| fake_engine::is_class_registered(class))
        .collect()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[itest]
fn reload_runs_level_callbacks(ctx: &TestContext) {
    let mut engine = ctx.engine();
    assert!(engine.is_initialized());

    let (inits, deinits) = scene_level_counts();
    engine.reload();

    assert!(engine.is_initialized());
    assert_eq!(scene_level_counts(), (inits + 1, deinits + 1));
}

#[itest]
fn user_class_init_level_follows_base() {
    assert_eq!(<ReloadedRes as GodotClass>::INIT_LEVEL, InitLevel::Scene);
    assert_eq!(<AlphaNode as GodotClass>::INIT_LEVEL, InitLevel::Scene);
    assert!(fake_engine::is_class_registered("ReloadedRes"));
    assert!(fake_engine::is_class_registered("AlphaNode"));
}

#[itest]
fn reload_unregisters_and_registers_classes(ctx: &TestContext) {
    let mut engine = ctx.engine();

    assert_eq!(registered(), CLASSES);
    assert_eq!(fake_engine::class_parent("AlphaNode").as_deref(), Some("Node"));
    assert_eq!(fake_engine::class_parent("ReloadedRes").as_deref(), Some("RefCounted"));
    assert!(fake_engine::is_extension_class("AlphaNode"));
    assert!(!fake_engine::is_extension_class("Node"));

    engine.unload();
    assert!(registered().is_empty());
    assert!(!sys::is_initialized());

    // Engine classes stay.
    assert!(fake_engine::is_class_registered("Node"));

    engine.initialize();
    assert_eq!(registered(), CLASSES);

    let node = AlphaNode::new_alloc();
    assert!(node.is_class("Node"));
    node.free();
}

#[itest]
fn reload_releases_objects_of_previous_load(ctx: &TestContext) {
    let mut engine = ctx.engine();

    let objects_before = fake_engine::live_objects();
    let res = ReloadedRes::new_gd();
    assert_eq!(fake_engine::live_objects(), objects_before + 1);
    drop(res);
    assert_eq!(fake_engine::live_objects(), objects_before);

    engine.reload();

    // A fresh load hands out working pointers again.
    let mut node = AlphaNode::new_alloc();
    node.bind_mut().generation = 2;
    assert_eq!(node.get("generation"), 2i64.to_variant());
    node.free();
}

#[itest]
fn reload_rejected_class_rolls_back_level(ctx: &TestContext) {
    let mut engine = ctx.engine();

    engine.unload();
    take_engine_messages();

    // Registration goes by name, so AlphaNode is registered before ReloadedRes is refused.
    fake_engine::reject_class_registration("ReloadedRes");
    suppress_godot_print(|| engine.initialize());

    assert!(registered().is_empty(), "{:?}", registered());
    let messages = take_engine_messages();
    assert!(
        messages.iter().any(|m| m.contains("ReloadedRes") && m.contains("rejected")),
        "{messages:?}"
    );

    fake_engine::reset_failures();
    engine.reload();
    assert_eq!(registered(), CLASSES);
}

#[itest]
fn reload_missing_interface_function_fails_load(ctx: &TestContext) {
    let mut engine = ctx.engine();
    engine.unload();

    fake_engine::withhold_interface_function("object_method_bind_ptrcall");
    let result = suppress_godot_print(|| fake_engine::load(crate::gdext_rust_init));
    fake_engine::reset_failures();

    assert!(matches!(result, Err(EngineError::EntryFailed)));
    assert!(!sys::is_initialized());

    engine.initialize();
    assert!(sys::is_initialized());
    assert_eq!(registered(), CLASSES);
}
