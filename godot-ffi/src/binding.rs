/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Process-wide storage of the loaded interface.
//!
//! The binding is created once per load and zeroed on the last deinitialization, so that a reloaded library starts from a clean state.

use std::sync::atomic::{AtomicPtr, Ordering};

use crate as sys;
use crate::{BuiltinTables, BuiltinTypeOps, GDExtensionInterface, InterfaceError, VariantType};

/// Settings fixed at load time.
#[derive(Clone, Debug)]
pub struct GdextConfig {
    /// Whether the library was built with hot reload support enabled.
    pub hot_reload: bool,
}

pub(crate) struct GodotBinding {
    interface: GDExtensionInterface,
    library: sys::GDExtensionClassLibraryPtr,
    builtin_tables: BuiltinTables,
    version: sys::GDExtensionGodotVersion,
    config: GdextConfig,
}

static BINDING: AtomicPtr<GodotBinding> = AtomicPtr::new(std::ptr::null_mut());

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Public API

/// Resolves the interface and the per-type tables, then stores them process-wide.
///
/// On error, nothing is stored and the binding stays uninitialized.
///
/// # Safety
/// - `get_proc_address` and `library` must be the pointers the engine passed to the entry symbol.
/// - Must not race with other functions of this module.
pub unsafe fn initialize(
    get_proc_address: sys::GDExtensionInterfaceGetProcAddress,
    library: sys::GDExtensionClassLibraryPtr,
    config: GdextConfig,
) -> Result<(), InterfaceError> {
    let interface = GDExtensionInterface::load(get_proc_address)?;
    let builtin_tables = BuiltinTables::load(&interface)?;

    let mut version = std::mem::MaybeUninit::<sys::GDExtensionGodotVersion>::zeroed();
    interface.get_godot_version.unwrap_unchecked()(version.as_mut_ptr());
    let version = version.assume_init();

    crate::out!(
        "initialize binding: Godot {}",
        crate::read_version_string(&version)
    );

    let binding = Box::new(GodotBinding {
        interface,
        library,
        builtin_tables,
        version,
        config,
    });

    let previous = BINDING.swap(Box::into_raw(binding), Ordering::AcqRel);
    if !previous.is_null() {
        // Library initialized twice without deinit in between; the old table is stale.
        drop(Box::from_raw(previous));
    }

    Ok(())
}

/// Drops the stored interface. Any later access panics until [`initialize`] runs again.
///
/// # Safety
/// No reference obtained from [`get_interface()`] or [`builtin_ops()`] may be used afterwards.
pub unsafe fn deinitialize() {
    let previous = BINDING.swap(std::ptr::null_mut(), Ordering::AcqRel);
    if !previous.is_null() {
        crate::out!("deinitialize binding");
        drop(Box::from_raw(previous));
    }
}

#[inline]
pub fn is_initialized() -> bool {
    !BINDING.load(Ordering::Acquire).is_null()
}

/// # Safety
/// The binding must be initialized, and the returned reference must not outlive [`deinitialize`].
#[inline]
pub unsafe fn get_interface() -> &'static GDExtensionInterface {
    &get_binding().interface
}

/// # Safety
/// The binding must be initialized.
#[inline]
pub unsafe fn get_library() -> sys::GDExtensionClassLibraryPtr {
    get_binding().library
}

/// Lifecycle operations of a builtin type.
///
/// # Safety
/// The binding must be initialized, and the returned reference must not outlive [`deinitialize`].
#[inline]
pub unsafe fn builtin_ops(variant_type: VariantType) -> &'static BuiltinTypeOps {
    get_binding().builtin_tables.get(variant_type)
}

/// Version reported by the engine at load time.
///
/// # Safety
/// The binding must be initialized.
pub unsafe fn runtime_godot_version() -> sys::GDExtensionGodotVersion {
    get_binding().version
}

/// # Safety
/// The binding must be initialized.
pub unsafe fn config() -> &'static GdextConfig {
    &get_binding().config
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Implementation

#[inline]
unsafe fn get_binding() -> &'static GodotBinding {
    let ptr = BINDING.load(Ordering::Acquire);
    debug_assert!(
        !ptr.is_null(),
        "Godot engine not available; make sure you are not calling it from unit/doc tests"
    );

    &*ptr
}

/// Calls an interface function by field name.
///
/// Panics in debug builds if the binding has not been initialized.
#[macro_export]
#[doc(hidden)]
macro_rules! interface_fn {
    ($name:ident) => {{
        unsafe { $crate::get_interface().$name.unwrap_unchecked() }
    }};
}
