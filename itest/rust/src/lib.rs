/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Integration tests of the library, running against the in-process engine of the `fake-engine` crate.
//!
//! This crate is the extension library under test: it provides the `#[gdextension]` entry point and declares the test classes
//! next to the `#[itest]` functions that use them. The `itest` test target loads the library into the engine and runs all of
//! them through [`framework::run_all_tests()`].

use godot::init::{gdextension, ExtensionLibrary, InitLevel};

pub mod framework;

mod func_test;
mod method_bind_test;
mod object_test;
mod packed_array_test;
mod property_test;
mod reload_test;
#[cfg(feature = "serde")]
mod serde_test;
mod signal_test;
mod virtual_methods_test;

pub struct IntegrationTests;

#[gdextension]
unsafe impl ExtensionLibrary for IntegrationTests {
    fn on_level_init(level: InitLevel) {
        if level == InitLevel::Scene {
            framework::on_scene_init();
        }
    }

    fn on_level_deinit(level: InitLevel) {
        if level == InitLevel::Scene {
            framework::on_scene_deinit();
        }
    }
}
