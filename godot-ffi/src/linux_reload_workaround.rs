/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Linux-specific configuration for reloadable libraries.
//!
//! TLS destructors registered through glibc keep a shared library mapped, which prevents `dlclose` from unloading it. With hot
//! reload enabled, the extension exports its own `__cxa_thread_atexit_impl` that drops those registrations.
//!
//! See: https://fasterthanli.me/articles/so-you-want-to-live-reload-rust#what-can-prevent-dlclose-from-unloading-a-library

use std::ffi::c_void;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

type ThreadAtexitFn = unsafe extern "C" fn(*mut c_void, *mut c_void, *mut c_void);

const UNSET: u8 = 0;
const DISABLED: u8 = 1;
const ENABLED: u8 = 2;

static HOT_RELOAD: AtomicU8 = AtomicU8::new(UNSET);
static SYSTEM_THREAD_ATEXIT: OnceLock<Option<ThreadAtexitFn>> = OnceLock::new();

/// Exports the `__cxa_thread_atexit_impl` override. Expanded once per library by `#[gdextension]`.
#[macro_export]
macro_rules! register_hot_reload_workaround {
    () => {
        #[no_mangle]
        #[doc(hidden)]
        pub unsafe extern "C" fn __cxa_thread_atexit_impl(
            func: *mut ::std::ffi::c_void,
            obj: *mut ::std::ffi::c_void,
            dso_symbol: *mut ::std::ffi::c_void,
        ) {
            $crate::linux_reload_workaround::thread_atexit(func, obj, dso_symbol);
        }
    };
}

/// Fixes the hot-reload setting for this load. Later calls do not change an enabled setting.
pub fn set_hot_reload(enabled: bool) {
    let new = if enabled { ENABLED } else { DISABLED };
    // Sticky once enabled: dropped TLS registrations cannot be restored.
    let _ = HOT_RELOAD.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
        (current != ENABLED).then_some(new)
    });
}

/// Hot reload is assumed off until configured, e.g. in unit tests that create TLS destructors without loading the library.
pub fn is_hot_reload_enabled() -> bool {
    HOT_RELOAD.load(Ordering::Acquire) == ENABLED
}

/// Forwards to the system's `__cxa_thread_atexit_impl` unless hot reload is enabled.
///
/// # Safety
/// Must only be called by the C runtime, as the exported `__cxa_thread_atexit_impl`.
pub unsafe fn thread_atexit(func: *mut c_void, obj: *mut c_void, dso_symbol: *mut c_void) {
    if is_hot_reload_enabled() {
        return;
    }

    // Without a system implementation, the destructor leaks.
    if let Some(system_thread_atexit) = *system_thread_atexit() {
        system_thread_atexit(func, obj, dso_symbol);
    }
}

fn system_thread_atexit() -> &'static Option<ThreadAtexitFn> {
    SYSTEM_THREAD_ATEXIT.get_or_init(|| {
        // SAFETY: RTLD_NEXT lookup of a C symbol; null maps to `None`.
        unsafe {
            let symbol = libc::dlsym(libc::RTLD_NEXT, c"__cxa_thread_atexit_impl".as_ptr());
            std::mem::transmute::<*mut c_void, Option<ThreadAtexitFn>>(symbol)
        }
    })
}
