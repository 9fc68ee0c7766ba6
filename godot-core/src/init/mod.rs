/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::atomic::{AtomicU8, Ordering};

use godot_ffi as sys;

use crate::global::godot_error;
use crate::out;

pub use sys::GdextConfig;

// Bit per initialized level, so the last deinitialization is detected regardless of the minimum level.
static INITIALIZED_LEVELS: AtomicU8 = AtomicU8::new(0);

#[doc(hidden)]
pub unsafe fn __gdext_load_library<E: ExtensionLibrary>(
    get_proc_address: sys::GDExtensionInterfaceGetProcAddress,
    library: sys::GDExtensionClassLibraryPtr,
    init: *mut sys::GDExtensionInitialization,
) -> sys::GDExtensionBool {
    let init_code = || {
        // Decide about hot reloading first: anything that registers TLS destructors must already see the final setting.
        let hot_reload = E::override_hot_reload().unwrap_or(cfg!(debug_assertions));

        #[cfg(target_os = "linux")]
        sys::linux_reload_workaround::set_hot_reload(hot_reload);

        let config = GdextConfig { hot_reload };

        // SAFETY: pointers come straight from the engine's call to the entry symbol.
        if let Err(err) = unsafe { sys::initialize(get_proc_address, library, config) } {
            // The binding is not available, so this goes to stderr.
            godot_error!("Failed to load GDExtension interface: {err}");
            return sys::SYS_FALSE;
        }

        let godot_init_params = sys::GDExtensionInitialization {
            minimum_initialization_level: E::min_level().to_sys(),
            userdata: std::ptr::null_mut(),
            initialize: Some(ffi_initialize_layer::<E>),
            deinitialize: Some(ffi_deinitialize_layer::<E>),
        };

        // SAFETY: the engine passes a valid pointer to its initialization struct.
        unsafe { *init = godot_init_params };

        sys::SYS_TRUE
    };

    let ctx = || "error when loading GDExtension library";
    let is_success = crate::private::handle_panic(ctx, init_code);

    is_success.unwrap_or(sys::SYS_FALSE)
}

unsafe extern "C" fn ffi_initialize_layer<E: ExtensionLibrary>(
    _userdata: *mut std::ffi::c_void,
    init_level: sys::GDExtensionInitializationLevel,
) {
    let level = InitLevel::from_sys(init_level);
    let ctx = || format!("failed to initialize GDExtension level `{level:?}`");

    // Swallow panics; they are reported through Godot.
    let _ = crate::private::handle_panic(ctx, || {
        if level < E::min_level() {
            return;
        }

        INITIALIZED_LEVELS.fetch_or(level_bit(level), Ordering::AcqRel);

        gdext_on_level_init(level);
        E::on_level_init(level);
    });
}

unsafe extern "C" fn ffi_deinitialize_layer<E: ExtensionLibrary>(
    _userdata: *mut std::ffi::c_void,
    init_level: sys::GDExtensionInitializationLevel,
) {
    let level = InitLevel::from_sys(init_level);
    let ctx = || format!("failed to deinitialize GDExtension level `{level:?}`");

    // Swallow panics.
    let _ = crate::private::handle_panic(ctx, || {
        let bit = level_bit(level);
        let previous = INITIALIZED_LEVELS.fetch_and(!bit, Ordering::AcqRel);
        if previous & bit == 0 {
            return;
        }

        E::on_level_deinit(level);
        gdext_on_level_deinit(level, previous == bit);
    });
}

fn level_bit(level: InitLevel) -> u8 {
    1 << level as u8
}

/// Tasks done internally upon loading an initialization level. Called before user code.
fn gdext_on_level_init(level: InitLevel) {
    out!("Initialize level `{level:?}`");
    crate::registry::class::auto_register_classes(level);
}

/// Tasks done internally upon unloading an initialization level. Called after user code.
///
/// After the last level, every process-wide cache is emptied so that a reload starts from a clean state.
fn gdext_on_level_deinit(level: InitLevel, is_last: bool) {
    crate::registry::class::unregister_classes(level);

    if is_last {
        out!("Last level `{level:?}` unloaded; global cleanup");

        crate::meta::cleanup();
        crate::private::cleanup();

        let released = sys::pointer_manager::teardown();
        out!("Pointer manager released {released} remaining entries");

        // SAFETY: called after all other logic, so no interface function is used afterwards.
        unsafe { sys::deinitialize() };
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Defines the entry point for a GDExtension Rust library.
///
/// Every library should have exactly one implementation of this trait. It is always used in combination with the
/// [`#[gdextension]`][gdextension] proc-macro attribute.
///
/// The simplest usage is as follows. This will automatically perform the necessary init and cleanup routines, and register
/// all classes marked with `#[derive(GodotClass)]`, without needing to mention them in a central list.
///
/// ```no_run
/// # use godot::init::*;
/// // This is just a type tag without any functionality.
/// // Its name is irrelevant.
/// struct MyExtension;
///
/// #[gdextension]
/// unsafe impl ExtensionLibrary for MyExtension {}
/// ```
///
/// # Safety
/// The library cannot enforce any safety guarantees outside Rust code, which means that **you as a user** are
/// responsible to uphold them: namely in GDScript code or other GDExtension bindings loaded by the engine.
///
/// [gdextension]: attr.gdextension.html
pub unsafe trait ExtensionLibrary {
    /// Determines the initialization level at which the extension is loaded (`Scene` by default).
    ///
    /// If the level is lower than [`InitLevel::Scene`], the engine needs to be restarted to take effect.
    fn min_level() -> InitLevel {
        InitLevel::Scene
    }

    /// Custom logic when a certain init-level of Godot is loaded.
    ///
    /// This will only be invoked for levels >= [`Self::min_level()`], in ascending order. Use `if` or `match` to hook to specific levels.
    #[allow(unused_variables)]
    fn on_level_init(level: InitLevel) {
        // Nothing by default.
    }

    /// Custom logic when a certain init-level of Godot is unloaded.
    ///
    /// This will only be invoked for levels >= [`Self::min_level()`], in descending order. Use `if` or `match` to hook to specific levels.
    #[allow(unused_variables)]
    fn on_level_deinit(level: InitLevel) {
        // Nothing by default.
    }

    /// Whether to enable hot reloading of this library. Return `None` to use the default behavior.
    ///
    /// By default, this is enabled for debug builds and disabled for release builds. On Linux, enabling it keeps thread-local
    /// destructors from pinning the library in memory, at the cost of leaking them.
    ///
    /// This is only checked *once* upon loading the library.
    fn override_hot_reload() -> Option<bool> {
        None
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Stage of the Godot initialization process.
///
/// Godot's initialization and deinitialization processes are split into multiple stages, like a stack. At each level,
/// a different amount of engine functionality is available. Deinitialization happens in reverse order.
///
/// See also:
/// - [`ExtensionLibrary::on_level_init()`]
/// - [`ExtensionLibrary::on_level_deinit()`]
pub type InitLevel = sys::InitLevel;

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bits_are_distinct() {
        let all = InitLevel::ALL
            .iter()
            .fold(0u8, |acc, level| {
                assert_eq!(acc & level_bit(*level), 0);
                acc | level_bit(*level)
            });

        assert_eq!(all, 0b1111);
    }
}
