/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cell::RefCell;
use std::rc::Rc;

use fake_engine::{HostValue, SignalRecord};
use godot::builtin::VariantType;
use godot::global::Error;
use godot::prelude::*;

use crate::framework::itest;

#[derive(GodotClass)]
#[class(init)]
struct Baz {
    count: i64,
    last_value: i64,
}

#[godot_api]
impl Baz {
    #[signal]
    fn pinged(value: i64);

    #[signal]
    fn reset();

    #[func]
    fn on_pinged(&mut self, value: i64) {
        self.count += 1;
        self.last_value = value;
    }

    #[func]
    fn on_reset(&mut self) {
        self.count = 0;
    }
}

/// Collects the arguments of every call into a shared list.
fn recording_callable(name: &str) -> (Callable, Rc<RefCell<Vec<i64>>>) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&calls);

    let callable = Callable::from_local_fn(name, move |args: &[&Variant]| {
        let value = args.first().map_or(0, |arg| arg.to::<i64>());
        recorded.borrow_mut().push(value);
        Ok(Variant::nil())
    });

    (callable, calls)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[itest]
fn signal_registered() {
    let signals = fake_engine::signal_list("Baz");
    assert_eq!(
        signals,
        vec![
            SignalRecord {
                name: "pinged".to_string(),
                params: vec![("value".to_string(), VariantType::Int)],
            },
            SignalRecord {
                name: "reset".to_string(),
                params: vec![],
            },
        ]
    );
}

#[itest]
fn signal_emit_to_method() {
    let mut baz = Baz::new_gd();
    let callable = baz.callable("on_pinged");
    assert_eq!(baz.connect("pinged", &callable), Error::OK);

    for _ in 0..3 {
        assert_eq!(baz.emit_signal("pinged", &[42i64.to_variant()]), Error::OK);
    }

    let guard = baz.bind();
    assert_eq!(guard.count, 3);
    assert_eq!(guard.last_value, 42);
}

#[itest]
fn signal_emit_from_engine() {
    let baz = Baz::new_gd();
    let id = baz.instance_id().to_u64();

    fake_engine::connect_method(id, "pinged", id, "on_pinged").unwrap();
    assert_eq!(fake_engine::connection_count(id, "pinged"), 1);

    for value in [1, 2, 42] {
        fake_engine::emit_signal(id, "pinged", &[HostValue::Int(value)]).unwrap();
    }
    assert_eq!(baz.bind().count, 3);
    assert_eq!(baz.bind().last_value, 42);

    fake_engine::connect_method(id, "reset", id, "on_reset").unwrap();
    fake_engine::emit_signal(id, "reset", &[]).unwrap();
    assert_eq!(baz.bind().count, 0);
}

#[itest]
fn signal_connect_rejects_duplicates_and_unknown() {
    let mut baz = Baz::new_gd();
    let callable = baz.callable("on_pinged");

    assert_eq!(baz.connect("pinged", &callable), Error::OK);
    assert_eq!(baz.connect("pinged", &callable), Error::ERR_INVALID_PARAMETER);
    assert_eq!(baz.connect("no_such_signal", &callable), Error::ERR_INVALID_PARAMETER);

    let id = baz.instance_id().to_u64();
    assert_eq!(fake_engine::connection_count(id, "pinged"), 1);
    fake_engine::take_messages();
}

#[itest]
fn signal_builtin_type() {
    let baz = Baz::new_gd();
    let signal = baz.signal("pinged");
    assert!(!signal.is_null());
    assert_eq!(signal.name(), StringName::from("pinged"));

    let (callable, calls) = recording_callable("record_pinged");
    assert_eq!(signal.connect(&callable), Error::OK);

    for _ in 0..3 {
        signal.emit(&[42i64.to_variant()]);
    }

    assert_eq!(*calls.borrow(), vec![42, 42, 42]);
    assert!(Signal::invalid().is_null());
}

#[itest]
fn signal_one_shot_connection() {
    let baz = Baz::new_gd();
    let signal = baz.signal("pinged");

    // CONNECT_ONE_SHOT
    let (callable, calls) = recording_callable("once");
    assert_eq!(signal.connect_flags(&callable, 4), Error::OK);

    signal.emit(&[5i64.to_variant()]);
    signal.emit(&[6i64.to_variant()]);

    assert_eq!(*calls.borrow(), vec![5]);
    assert_eq!(fake_engine::connection_count(baz.instance_id().to_u64(), "pinged"), 0);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Custom callables

#[itest]
fn callable_from_local_fn_call() {
    let sum = Callable::from_local_fn("sum", |args: &[&Variant]| {
        let sum: i64 = args.iter().map(|arg| arg.to::<i64>()).sum();
        Ok(sum.to_variant())
    });

    assert!(sum.is_valid());
    let result = sum.call(&[1i64.to_variant(), 2i64.to_variant(), 39i64.to_variant()]);
    assert_eq!(result.to::<i64>(), 42);
}

#[itest]
fn callable_from_local_fn_counts_calls() {
    let (callable, calls) = recording_callable("counter");
    for value in 0..5i64 {
        callable.call(&[value.to_variant()]);
    }

    assert_eq!(*calls.borrow(), vec![0, 1, 2, 3, 4]);
}

#[itest]
fn callable_released_with_connection() {
    let baz = Baz::new_gd();
    let (callable, calls) = recording_callable("released");
    baz.signal("pinged").connect(&callable);
    drop(callable);

    // The connection keeps the closure alive.
    assert_eq!(Rc::strong_count(&calls), 2);

    drop(baz);
    assert_eq!(Rc::strong_count(&calls), 1);
}

#[itest]
fn callable_to_object_method() {
    let baz = Baz::new_gd();
    let callable = baz.callable("on_pinged");
    assert!(callable.is_valid());

    callable.call(&[7i64.to_variant()]);
    assert_eq!(baz.bind().last_value, 7);

    assert!(!Callable::invalid().is_valid());
}
