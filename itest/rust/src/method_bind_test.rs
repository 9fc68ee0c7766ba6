/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use godot::prelude::*;

use crate::framework::{expect_panic_message, itest, TestContext};

#[derive(GodotClass)]
#[class(init)]
struct BindProbe {}

#[itest]
fn method_bind_missing_panics_with_names(ctx: &TestContext) {
    let mut engine = ctx.engine();

    // Start without cached binds; the last deinit empties the cache.
    engine.unload();
    fake_engine::fail_method_bind("Object", "is_class");
    engine.initialize();

    let probe = BindProbe::new_gd().upcast::<Object>();
    let msg = expect_panic_message("is_class() with null method bind", || {
        probe.is_class("Object");
    });

    assert!(msg.contains("Object::is_class"), "{msg}");
    assert!(msg.contains("3927539163"), "{msg}");

    // A failed lookup is not cached; the next call asks the engine again.
    fake_engine::reset_failures();
    assert!(probe.is_class("RefCounted"));
}

#[itest]
fn method_bind_other_methods_unaffected(ctx: &TestContext) {
    let mut engine = ctx.engine();

    engine.unload();
    fake_engine::fail_method_bind("Object", "call");
    engine.initialize();

    let mut probe = BindProbe::new_gd().upcast::<Object>();
    assert_eq!(probe.get_class(), GString::from("BindProbe"));

    let msg = expect_panic_message("call() with null method bind", || {
        probe.call("get_class", &[]);
    });
    assert!(msg.contains("Object::call"), "{msg}");

    fake_engine::reset_failures();
}
