/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use fake_engine::{EngineError, HostValue};
use godot::meta::trace;
use godot::prelude::*;
use godot::sys;

use crate::framework::{itest, suppress_godot_print, take_engine_messages};

#[derive(GodotClass)]
#[class(init)]
struct Calc {
    stored: f64,
}

#[godot_api]
impl Calc {
    #[func]
    fn add(&self, a: i64, b: i64) -> i64 {
        a + b
    }

    #[func(rename = greet_by_name)]
    fn greet(&self, name: GString) -> GString {
        format!("Hello, {name}").into()
    }

    #[func]
    fn store(&mut self, value: f64) {
        self.stored = value;
    }

    #[func]
    fn stored(&self) -> f64 {
        self.stored
    }

    #[func]
    fn fail(&self) -> i64 {
        panic!("fail() was called");
    }
}

fn calc_id(calc: &Gd<Calc>) -> u64 {
    calc.instance_id().to_u64()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[itest]
fn func_registered_names() {
    let names = fake_engine::method_names("Calc");
    assert_eq!(names, ["add", "fail", "greet_by_name", "store", "stored"]);
}

#[itest]
fn func_varcall() {
    let calc = Calc::new_gd();
    let id = calc_id(&calc);

    let ret = fake_engine::call_method(id, "add", &[HostValue::Int(40), HostValue::Int(2)]);
    assert_eq!(ret, Ok(HostValue::Int(42)));

    let report = trace::pop();
    assert_eq!(report.class, "Calc");
    assert_eq!(report.method, "add");
    assert!(report.is_inbound);
    assert!(!report.is_ptrcall);
}

#[itest]
fn func_ptrcall() {
    let calc = Calc::new_gd();
    let id = calc_id(&calc);

    let ret = fake_engine::ptrcall_method(id, "add", &[HostValue::Int(-8), HostValue::Int(50)]);
    assert_eq!(ret, Ok(HostValue::Int(42)));

    let report = trace::pop();
    assert_eq!(report.method, "add");
    assert!(report.is_inbound);
    assert!(report.is_ptrcall);
}

#[itest]
fn func_renamed_with_string() {
    let mut calc = Calc::new_gd();
    let id = calc_id(&calc);

    let ret = fake_engine::call_method(id, "greet_by_name", &[HostValue::String("Ann".to_string())]);
    assert_eq!(ret, Ok(HostValue::String("Hello, Ann".to_string())));

    let ret = fake_engine::ptrcall_method(id, "greet_by_name", &[HostValue::String("Bo".to_string())]);
    assert_eq!(ret, Ok(HostValue::String("Hello, Bo".to_string())));

    let err = calc.try_call("greet", &[]).expect_err("Rust name is not registered");
    assert_eq!(err.method_name(), "call");
}

#[itest]
fn func_mut_receiver_and_unit_return() {
    let mut calc = Calc::new_gd();
    let id = calc_id(&calc);

    assert_eq!(fake_engine::call_method(id, "store", &[HostValue::Float(2.5)]), Ok(HostValue::Nil));
    assert_eq!(calc.bind().stored, 2.5);

    assert_eq!(fake_engine::ptrcall_method(id, "store", &[HostValue::Float(-1.0)]), Ok(HostValue::Nil));
    assert_eq!(calc.call("stored", &[]), (-1.0f64).to_variant());
}

#[itest]
fn func_argument_count_mismatch() {
    let mut calc = Calc::new_gd();
    let id = calc_id(&calc);

    suppress_godot_print(|| {
        let err = fake_engine::call_method(id, "add", &[HostValue::Int(1)]).unwrap_err();
        assert!(matches!(err, EngineError::CallFailed { ref method, .. } if method == "add"), "{err:?}");
    });

    let err = fake_engine::ptrcall_method(id, "add", &[HostValue::Int(1), HostValue::Int(2), HostValue::Int(3)]);
    assert_eq!(
        err,
        Err(EngineError::CallFailed {
            method: "add".to_string(),
            error: sys::GDEXTENSION_CALL_ERROR_TOO_MANY_ARGUMENTS,
        })
    );

    let err = suppress_godot_print(|| calc.try_call("add", &[1i64.to_variant()]));
    let msg = err.expect_err("one argument missing").to_string();
    assert!(msg.contains("Calc::add"), "{msg}");
    assert!(msg.contains("function has 2 parameters, but received 1 argument"), "{msg}");
}

#[itest]
fn func_argument_conversion_error() {
    let calc = Calc::new_gd();
    let id = calc_id(&calc);
    take_engine_messages();

    let err = fake_engine::call_method(id, "add", &[HostValue::String("one".to_string()), HostValue::Int(1)]);
    assert!(matches!(err, Err(EngineError::CallFailed { .. })), "{err:?}");

    let messages = take_engine_messages();
    assert!(
        messages.iter().any(|m| m.contains("Calc::add") && m.contains("parameter #0")),
        "{messages:?}"
    );
}

#[itest]
fn func_panic_is_reported() {
    let calc = Calc::new_gd();
    let id = calc_id(&calc);

    suppress_godot_print(|| {
        let err = fake_engine::call_method(id, "fail", &[]).unwrap_err();
        assert!(matches!(err, EngineError::CallFailed { .. }), "{err:?}");
    });

    // Still usable.
    let ret = fake_engine::call_method(id, "add", &[HostValue::Int(1), HostValue::Int(1)]);
    assert_eq!(ret, Ok(HostValue::Int(2)));
}
