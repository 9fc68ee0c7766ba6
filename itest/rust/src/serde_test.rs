/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

// Strings are engine values; math types are tested without engine in godot-core.

use godot::prelude::*;

use crate::framework::itest;

#[itest]
fn serde_gstring() {
    let value = GString::from("Héllo \"quoted\"");
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, r#""Héllo \"quoted\"""#);

    let back: GString = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);
}

#[itest]
fn serde_string_name() {
    let value = StringName::from("signal_name");
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, r#""signal_name""#);

    let back: StringName = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);
}

#[itest]
fn serde_rejects_wrong_type() {
    assert!(serde_json::from_str::<GString>("42").is_err());
}
