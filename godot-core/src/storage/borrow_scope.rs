/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use godot_ffi as sys;
use sys::pointer_manager as pm;
use sys::{Handle, Ownership};

use crate::obj::GodotClass;
use crate::storage::{as_storage, InstanceStorage};

/// Borrowed pointer manager entry for a class instance the engine lends to Rust during one callback.
///
/// Ends its entry when dropped, also when the callback unwinds.
pub struct BorrowScope {
    handle: Option<Handle<sys::GDExtensionClassInstancePtr>>,
}

impl BorrowScope {
    pub fn enter(instance_ptr: sys::GDExtensionClassInstancePtr) -> Self {
        Self {
            handle: Some(pm::new(instance_ptr, Ownership::Borrowed, None)),
        }
    }

    /// Instance pointer, as long as the entry is live.
    ///
    /// # Panics
    /// If the entry was reclaimed, e.g. by a pointer manager cycle during the callback.
    pub fn instance_ptr(&self) -> sys::GDExtensionClassInstancePtr {
        let handle = self
            .handle
            .as_ref()
            .unwrap_or_else(|| panic!("borrow scope already ended"));

        match pm::get(handle) {
            // SAFETY: the entry holds an instance pointer and is live.
            Ok(ptr) => unsafe { *ptr.as_ptr() },
            Err(err) => panic!("instance borrowed by engine callback is no longer accessible: {err}"),
        }
    }

    /// Storage of the borrowed instance.
    ///
    /// # Safety
    /// The instance must be of class `T`.
    pub unsafe fn storage<T: GodotClass>(&self) -> &InstanceStorage<T> {
        as_storage::<T>(self.instance_ptr())
    }
}

impl Drop for BorrowScope {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        // A cycle may have reclaimed the entry already; nothing is released for borrowed entries either way.
        if let Err(err) = pm::end(handle) {
            sys::out!("BorrowScope::drop: {err}");
        }
    }
}
