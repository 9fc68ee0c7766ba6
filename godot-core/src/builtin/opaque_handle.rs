/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::mem::{ManuallyDrop, MaybeUninit};

use godot_ffi as sys;
use sys::{pointer_manager as pm, FrameSlot, Handle, Ownership, PointerError};

/// Owned engine value of an opaque builtin type (string, array, ...), stored in the pointer manager.
///
/// The bytes never leave the manager's entry; this type only keeps the handle. Dropping it ends the entry, which runs the
/// engine destructor exactly once. Values that outlive the binding (dropped after teardown) find their entry gone and release nothing.
pub(crate) struct OpaqueHandle<T: FrameSlot> {
    handle: ManuallyDrop<Handle<T>>,
}

impl<T: FrameSlot> OpaqueHandle<T> {
    /// Takes ownership of `raw`.
    pub fn from_owned(raw: T) -> Self {
        Self {
            handle: ManuallyDrop::new(pm::new(raw, Ownership::Owned, Some(release::<T>))),
        }
    }

    /// The engine's default value of the type.
    pub fn new_default() -> Self {
        // SAFETY: `write_default` fully initializes the slot.
        unsafe { Self::new_with_uninit(|ptr| T::write_default(ptr as *mut T)) }
    }

    /// # Safety
    /// `init_fn` must fully initialize the memory it receives.
    pub unsafe fn new_with_uninit(init_fn: impl FnOnce(sys::GDExtensionUninitializedTypePtr)) -> Self {
        let mut raw = MaybeUninit::<T>::uninit();
        init_fn(raw.as_mut_ptr() as sys::GDExtensionUninitializedTypePtr);

        Self::from_owned(raw.assume_init())
    }

    /// Address of the value inside the manager's entry.
    ///
    /// # Panics (Debug)
    /// If the entry has ended, i.e. the binding was torn down while this value was alive. Release builds report the access
    /// and hand out a detached default value instead.
    pub fn ptr(&self) -> *mut T {
        match pm::get(&self.handle) {
            Ok(ptr) => ptr.as_ptr(),
            Err(err) => released_access::<T>(err),
        }
    }

    /// Bitwise copy of the value. Borrowed: the engine resources stay owned by `self`.
    pub fn raw(&self) -> T {
        // SAFETY: the entry is live, checked by `ptr()`.
        unsafe { *self.ptr() }
    }

    pub fn sys(&self) -> sys::GDExtensionConstTypePtr {
        self.ptr() as sys::GDExtensionConstTypePtr
    }

    pub fn sys_mut(&mut self) -> sys::GDExtensionTypePtr {
        self.ptr() as sys::GDExtensionTypePtr
    }

    pub fn is_live(&self) -> bool {
        pm::is_valid(self.handle.id())
    }

    /// Engine-side copy of the value that the receiver owns; `self` is released.
    pub fn into_owned_copy(self) -> T {
        // SAFETY: the entry is live and holds a valid value.
        unsafe { copy_from_ptr::<T>(self.sys()) }
    }
}

impl<T: FrameSlot> Clone for OpaqueHandle<T> {
    fn clone(&self) -> Self {
        // SAFETY: copy-constructs from a live value.
        Self::from_owned(unsafe { copy_from_ptr::<T>(self.sys()) })
    }
}

impl<T: FrameSlot> Drop for OpaqueHandle<T> {
    fn drop(&mut self) {
        // SAFETY: `handle` is not used after this.
        let handle = unsafe { ManuallyDrop::take(&mut self.handle) };

        // After teardown, the entry no longer exists and the engine value was already released.
        if let Err(err) = pm::end(handle) {
            sys::out!("OpaqueHandle<{}> outlived its entry: {err}", std::any::type_name::<T>());
        }
    }
}

impl<T: FrameSlot> std::fmt::Debug for OpaqueHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", *self.handle)
    }
}

#[cfg(debug_assertions)]
fn released_access<T: FrameSlot>(err: PointerError) -> *mut T {
    panic!("access to released {}: {err}", std::any::type_name::<T>())
}

#[cfg(not(debug_assertions))]
fn released_access<T: FrameSlot>(err: PointerError) -> *mut T {
    crate::global::godot_error!("access to released {}: {err}", std::any::type_name::<T>());

    // Opaque values are plain bytes; all zeroes is the engine's null representation.
    let mut raw = MaybeUninit::<T>::zeroed();
    if sys::is_initialized() {
        // SAFETY: `raw` is valid for writes.
        unsafe { T::write_default(raw.as_mut_ptr()) };
    }

    // Leaked: nothing owns the detached value, and the engine must not release it.
    // SAFETY: zeroed or default-constructed above.
    Box::into_raw(Box::new(unsafe { raw.assume_init() }))
}

/// Copy-constructs a new, independently owned value from the engine value behind `ptr`.
///
/// # Safety
/// `ptr` must point to a valid value of `T`'s engine type.
pub(crate) unsafe fn copy_from_ptr<T: FrameSlot>(ptr: sys::GDExtensionConstTypePtr) -> T {
    let mut raw = MaybeUninit::<T>::uninit();
    sys::builtin_ops(T::VARIANT_TYPE)
        .construct_copy_into(raw.as_mut_ptr() as sys::GDExtensionUninitializedTypePtr, ptr);

    raw.assume_init()
}

unsafe fn release<T: FrameSlot>(ptr: *mut T) {
    // Entries released after the engine went away only drop their bytes.
    if sys::is_initialized() {
        T::destroy(ptr);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use super::*;

    #[test]
    fn access_after_teardown() {
        let handle = OpaqueHandle::<i64>::from_owned(42);
        assert!(handle.is_live());
        assert_eq!(handle.raw(), 42);

        pm::teardown();
        assert!(!handle.is_live());

        let access = catch_unwind(AssertUnwindSafe(|| handle.raw()));
        if cfg!(debug_assertions) {
            assert!(access.is_err(), "debug builds panic on released values");
        } else {
            assert_eq!(access.ok(), Some(0));
        }
    }
}
