/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Entry of `cargo test -p itest`. Free arguments filter tests by name: `cargo test -p itest -- reload`.

use std::process::ExitCode;

fn main() -> ExitCode {
    let filters: Vec<String> = std::env::args()
        .skip(1)
        .filter(|arg| !arg.starts_with('-'))
        .collect();

    if itest::framework::run_all_tests(&filters) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
