/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Test harness: collects the `#[itest]` functions, loads the library into the in-process engine and runs them.

use std::cell::{RefCell, RefMut};
use std::collections::HashSet;
use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use fake_engine::{EngineError, Extension};
use godot::sys;

mod runner;

/// Allow re-import as `crate::framework::itest`.
pub use godot::test::itest;
pub use runner::*;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Plugin registration

// Registers all the `#[itest]` tests.
sys::plugin_registry!(pub(crate) __GODOT_ITEST: RustTestCase);

/// Finds all `#[itest]` tests.
fn collect_rust_tests(filters: &[String]) -> (Vec<RustTestCase>, HashSet<&'static str>, bool) {
    let mut all_files = HashSet::new();
    let mut tests: Vec<RustTestCase> = vec![];
    let mut is_focus_run = false;

    sys::plugin_foreach!(__GODOT_ITEST; |test: &RustTestCase| {
        // First time a focused test is encountered, switch to "focused" mode and throw everything away.
        if !is_focus_run && test.focused {
            tests.clear();
            all_files.clear();
            is_focus_run = true;
        }

        // Only collect tests if normal mode, or focus mode and test is focused.
        if (!is_focus_run || test.focused) && passes_filter(filters, test.name) {
            all_files.insert(test.file);
            tests.push(*test);
        }
    });

    // Sort by file, then by line, for a deterministic run order.
    tests.sort_by_key(|test| (test.file, test.line));

    (tests, all_files, is_focus_run)
}

pub fn passes_filter(filters: &[String], test_name: &str) -> bool {
    filters.is_empty() || filters.iter().any(|x| test_name.contains(x))
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Shared types

/// Handed to every `#[itest]` function.
pub struct TestContext {
    engine: RefCell<EngineGuard>,
}

impl TestContext {
    fn new(engine: EngineGuard) -> Self {
        Self {
            engine: RefCell::new(engine),
        }
    }

    /// The engine with the library loaded, for tests that unload or reload it.
    pub fn engine(&self) -> RefMut<'_, EngineGuard> {
        self.engine.borrow_mut()
    }
}

#[derive(Copy, Clone)]
pub struct RustTestCase {
    pub name: &'static str,
    pub file: &'static str,
    pub skipped: bool,
    /// If one or more tests are focused, only they will be executed. Helpful for debugging and working on specific features.
    pub focused: bool,
    pub line: u32,
    pub function: fn(&TestContext),
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Engine access

// The engine is one process-wide instance; tests take turns through this lock.
static ENGINE: Mutex<Option<LoadedLibrary>> = Mutex::new(None);

static SCENE_INITS: AtomicUsize = AtomicUsize::new(0);
static SCENE_DEINITS: AtomicUsize = AtomicUsize::new(0);

struct LoadedLibrary {
    extension: Extension,
}

// SAFETY: the initialization struct only carries the library's callbacks and a null userdata. The lock ensures that a single
// thread drives the engine at a time.
unsafe impl Send for LoadedLibrary {}

/// Exclusive access to the engine, with the library loaded and all levels initialized.
pub struct EngineGuard {
    library: MutexGuard<'static, Option<LoadedLibrary>>,
}

/// Waits until no other thread uses the engine, then loads the library if that did not happen yet.
fn engine() -> EngineGuard {
    // A panicking holder must not block the others; the engine state stays usable after a panic.
    let library = ENGINE.lock().unwrap_or_else(PoisonError::into_inner);

    let mut guard = EngineGuard { library };
    guard.initialize();
    guard
}

impl EngineGuard {
    /// Loads the library through its entry symbol (if not loaded) and initializes all levels.
    pub fn initialize(&mut self) {
        if self.library.is_none() {
            let extension = load_library().unwrap_or_else(|err| panic!("cannot load library: {err}"));
            *self.library = Some(LoadedLibrary { extension });
        }

        if let Some(loaded) = self.library.as_mut() {
            loaded.extension.initialize();
        }
    }

    /// Deinitializes all levels and forgets the library, like the engine does before reloading it.
    pub fn unload(&mut self) {
        if let Some(mut loaded) = self.library.take() {
            loaded.extension.deinitialize();
        }
    }

    /// Unloads the library, then loads and initializes it again.
    pub fn reload(&mut self) {
        self.unload();
        self.initialize();
    }

    pub fn is_initialized(&self) -> bool {
        self.library
            .as_ref()
            .is_some_and(|loaded| loaded.extension.is_initialized())
    }
}

fn load_library() -> Result<Extension, EngineError> {
    fake_engine::load(crate::gdext_rust_init)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Level hooks

pub(crate) fn on_scene_init() {
    SCENE_INITS.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn on_scene_deinit() {
    SCENE_DEINITS.fetch_add(1, Ordering::Relaxed);
}

/// How often the `Scene` level was initialized and deinitialized in this process.
pub fn scene_level_counts() -> (usize, usize) {
    (
        SCENE_INITS.load(Ordering::Relaxed),
        SCENE_DEINITS.load(Ordering::Relaxed),
    )
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Panic helpers

/// Disable printing errors from Godot. Ideally we should catch and handle errors, ensuring they happened when
/// expected. But that isn't possible, so for now we can just disable printing the error to avoid spamming
/// the terminal when tests should error.
pub fn suppress_godot_print<R>(f: impl FnOnce() -> R) -> R {
    let prev_level = godot::private::set_error_print_level(0);
    let res = f();
    godot::private::set_error_print_level(prev_level);
    res
}

/// Runs `callback` with the panic hook and Godot's error printing disabled.
pub fn suppress_panic_log<R>(callback: impl FnOnce() -> R) -> R {
    // DISABLE following lines to *temporarily* debug panics.
    let prev_hook = panic::take_hook();
    panic::set_hook(Box::new(
        |_panic_info| { /* suppress panic hook; do nothing */ },
    ));

    // Keep following lines.
    let prev_print_level = godot::private::set_error_print_level(0);
    let res = callback();
    godot::private::set_error_print_level(prev_print_level);

    // DISABLE following line to *temporarily* debug panics.
    panic::set_hook(prev_hook);

    res
}

pub fn expect_panic(context: &str, code: impl FnOnce()) {
    let _ = expect_panic_message(context, code);
}

/// Like [`expect_panic`], but returns the panic message for further checks.
pub fn expect_panic_message(context: &str, code: impl FnOnce()) -> String {
    // Generally, types should be unwind safe, and this helps ergonomics in testing (especially around &mut in expect_panic closures).
    let code = panic::AssertUnwindSafe(code);
    let panic = suppress_panic_log(move || panic::catch_unwind(code));

    match panic {
        Ok(()) => panic!("code should have panicked but did not: {context}"),
        Err(payload) => godot::private::extract_panic_message(payload),
    }
}

/// Engine errors and warnings reported since the last call, as text.
pub fn take_engine_messages() -> Vec<String> {
    fake_engine::take_messages()
        .into_iter()
        .map(|message| message.text)
        .collect()
}
