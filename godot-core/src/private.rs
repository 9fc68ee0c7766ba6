/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub use crate::registry::callbacks;
pub use crate::registry::method::ClassMethodInfo;
pub use crate::registry::plugin::{
    ClassPlugin, ErasedRegisterFn, ITraitImpl, InherentImpl, PluginItem, Struct,
};
pub use crate::registry::property::{export_info_functions, register_var};
pub use crate::registry::signal::register_signal_typed;
pub use crate::storage::{as_storage, InstanceStorage};
pub use sys::out;

#[cfg(feature = "trace")]
pub use crate::meta::trace;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::{atomic, Once};

use sys::Global;

use crate::global::godot_error;
use crate::meta::error::CallError;
use crate::meta::CallContext;
use crate::sys;

/// Inheritance macros for `#[derive(GodotClass)]`, one per engine class.
pub mod class_macros {
    pub use crate::{
        unsafe_inherits_transitive_Node, unsafe_inherits_transitive_Object,
        unsafe_inherits_transitive_RefCounted, unsafe_inherits_transitive_Resource,
    };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Global variables

static CALL_ERRORS: Global<CallErrors> = Global::default();

/// Level:
/// - 0: no error printing (during `expect_panic` in test)
/// - 1: not yet implemented, but intended for `try_` function calls (which are expected to fail, so error is annoying)
/// - 2: normal printing
static ERROR_PRINT_LEVEL: atomic::AtomicU8 = atomic::AtomicU8::new(2);

sys::plugin_registry!(pub __GODOT_PLUGIN_REGISTRY: ClassPlugin);

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Call error handling

#[derive(Default)]
struct CallErrors {
    map: HashMap<i32, CallError>,
    next_id: i32,
}

impl CallErrors {
    fn insert(&mut self, err: CallError) -> i32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        self.map.insert(id, err);
        id
    }

    fn remove(&mut self, id: i32) -> Option<CallError> {
        self.map.remove(&id)
    }
}

fn call_error_insert(err: CallError, out_error: &mut sys::GDExtensionCallError) {
    // Wraps around once the whole i32 range is used; the oldest errors are overwritten then.
    let id = CALL_ERRORS.lock().insert(err);

    // The engine passes the struct through unchanged, so `argument` can carry the ID.
    out_error.argument = id;
}

pub(crate) fn call_error_remove(in_error: &sys::GDExtensionCallError) -> Option<CallError> {
    // Diagnostics only; never panic here.
    if in_error.error != sys::GODOT_RUST_CUSTOM_CALL_ERROR {
        godot_error!("Tried to remove non-godot-rust call error {in_error:?}");
        return None;
    }

    let call_error = CALL_ERRORS.lock().remove(in_error.argument);
    if call_error.is_none() {
        godot_error!("Failed to remove call error {in_error:?}");
    }

    call_error
}

/// Drops call errors that were never picked up. Runs on deinitialization.
pub(crate) fn cleanup() {
    CALL_ERRORS.lock().map.clear();
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Plugin handling

/// Visits all class plugins. The registry is not locked while `visitor` runs, so it may register further plugins.
pub(crate) fn iterate_plugins(mut visitor: impl FnMut(&ClassPlugin)) {
    let mut plugins = Vec::new();
    sys::plugin_foreach!(__GODOT_PLUGIN_REGISTRY; |plugin: &ClassPlugin| plugins.push(plugin.clone()));

    for plugin in &plugins {
        visitor(plugin);
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Traits and types

// If someone forgets #[godot_api], this causes a compile error, rather than virtual functions not being called at runtime.
#[allow(non_camel_case_types)]
#[diagnostic::on_unimplemented(
    message = "`impl` blocks for Godot classes require the `#[godot_api]` attribute",
    label = "missing `#[godot_api]` before `impl`"
)]
pub trait You_forgot_the_attribute__godot_api {}

pub fn flush_stdout() {
    use std::io::Write;
    // Nothing to recover if stdout is gone.
    let _ = std::io::stdout().flush();
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Panic handling

#[derive(Debug)]
struct GodotPanicInfo {
    line: u32,
    file: String,
}

thread_local! {
    // Number of `handle_panic` frames active on this thread. The hook stays quiet while it is non-zero.
    static CATCH_DEPTH: Cell<u32> = const { Cell::new(0) };
    static LAST_PANIC: RefCell<Option<GodotPanicInfo>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

/// Installs a process-wide panic hook once. Panics outside of `handle_panic` are forwarded to the previous hook; panics inside only
/// record their location, which `handle_panic` reports through Godot.
fn install_panic_hook() {
    INSTALL_HOOK.call_once(|| {
        let prev_hook = std::panic::take_hook();

        std::panic::set_hook(Box::new(move |panic_info| {
            let is_caught = CATCH_DEPTH.try_with(Cell::get).unwrap_or(0) > 0;
            if !is_caught {
                prev_hook(panic_info);
                return;
            }

            let info = panic_info.location().map(|location| GodotPanicInfo {
                file: location.file().to_string(),
                line: location.line(),
            });

            let _ = LAST_PANIC.try_with(|last| *last.borrow_mut() = info);
        }));
    });
}

/// Restores the catch depth even if the guarded code unwinds.
struct CatchScope;

impl CatchScope {
    fn enter() -> Self {
        CATCH_DEPTH.with(|depth| depth.set(depth.get() + 1));
        CatchScope
    }
}

impl Drop for CatchScope {
    fn drop(&mut self) {
        let _ = CATCH_DEPTH.try_with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

pub fn extract_panic_message(err: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = err.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        format!("(panic of type ID {:?})", err.type_id())
    }
}

fn format_panic_message(msg: String) -> String {
    // If the message contains newlines, print all of the lines after a line break, and indent them.
    let lbegin = "\n  ";
    let indented = msg.replace('\n', lbegin);

    if indented.len() != msg.len() {
        format!("[panic]{lbegin}{indented}")
    } else {
        format!("[panic]  {msg}")
    }
}

pub fn set_error_print_level(level: u8) -> u8 {
    assert!(level <= 2);
    ERROR_PRINT_LEVEL.swap(level, atomic::Ordering::Relaxed)
}

pub(crate) fn has_error_print_level(level: u8) -> bool {
    assert!(level <= 2);
    ERROR_PRINT_LEVEL.load(atomic::Ordering::Relaxed) >= level
}

/// Executes `code`. If a panic is thrown, it is caught and an error message is printed to Godot.
///
/// Returns `Err(message)` if a panic occurred, and `Ok(result)` with the result of `code` otherwise.
pub fn handle_panic<E, F, R, S>(error_context: E, code: F) -> Result<R, String>
where
    E: FnOnce() -> S,
    F: FnOnce() -> R + std::panic::UnwindSafe,
    S: std::fmt::Display,
{
    handle_panic_with_print(error_context, code, has_error_print_level(1))
}

/// Runs an inbound varcall. Call errors and panics are reported to the engine through `out_err`; the details stay on the Rust side
/// until the caller picks them up with [`CallError`]'s outbound check.
pub fn handle_varcall_panic<F, R>(
    call_ctx: &CallContext,
    out_err: &mut sys::GDExtensionCallError,
    code: F,
) where
    F: FnOnce() -> Result<R, CallError> + std::panic::UnwindSafe,
{
    let outcome: Result<Result<R, CallError>, String> =
        handle_panic_with_print(|| call_ctx, code, false);

    let call_error = match outcome {
        Ok(Ok(_result)) => return,

        // Argument count or conversion failure.
        Ok(Err(err)) => err,

        // Panic in user code: forward its message.
        Err(panic_msg) => CallError::failed_by_user_panic(call_ctx, panic_msg),
    };

    if has_error_print_level(2) {
        godot_error!("{call_error}");
    }

    out_err.error = sys::GODOT_RUST_CUSTOM_CALL_ERROR;
    call_error_insert(call_error, out_err);
}

fn handle_panic_with_print<E, F, R, S>(error_context: E, code: F, print: bool) -> Result<R, String>
where
    E: FnOnce() -> S,
    F: FnOnce() -> R + std::panic::UnwindSafe,
    S: std::fmt::Display,
{
    install_panic_hook();

    let panic = {
        let _scope = CatchScope::enter();
        std::panic::catch_unwind(code)
    };

    match panic {
        Ok(result) => Ok(result),
        Err(err) => {
            // Make sure previous Rust output (e.g. debug prints) appears before the error.
            flush_stdout();

            let info = LAST_PANIC.with(|last| last.borrow_mut().take());

            if print {
                let location = match &info {
                    Some(info) => format!("{}:{}", info.file, info.line),
                    None => "<unknown location>".to_string(),
                };

                godot_error!(
                    "Rust function panicked at {location}.\n  Context: {}",
                    error_context()
                );
            }

            let msg = extract_panic_message(err);
            let msg = format_panic_message(msg);

            if print {
                godot_error!("{msg}");
            }

            Err(msg)
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_is_indented() {
        assert_eq!(format_panic_message("boom".into()), "[panic]  boom");
        assert_eq!(
            format_panic_message("first\nsecond".into()),
            "[panic]\n  first\n  second"
        );
    }

    #[test]
    fn extracts_string_payloads() {
        let static_str: Box<dyn std::any::Any + Send> = Box::new("static");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));

        assert_eq!(extract_panic_message(static_str), "static");
        assert_eq!(extract_panic_message(owned), "owned");
    }

    #[test]
    fn catch_depth_restored_after_panic() {
        let before = CATCH_DEPTH.with(Cell::get);

        let result = handle_panic_with_print(|| "test", || panic!("inner"), false);

        assert_eq!(result, Err("[panic]  inner".to_string()));
        assert_eq!(CATCH_DEPTH.with(Cell::get), before);
    }
}
