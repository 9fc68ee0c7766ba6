/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use godot_ffi as sys;
use sys::pointer_manager as pm;
use sys::{interface_fn, Handle, Lookup, Ownership};

use crate::builtin::Variant;
use crate::classes::RefCounted;
use crate::meta::error::{ConvertError, FromVariantError};
use crate::meta::traits::{ffi_from_variant_via_type, ffi_to_variant_via_type};
use crate::meta::GodotFfiVariant;
use crate::obj::{bounds, Bounds, GdMut, GdRef, GodotClass, InstanceId};
use crate::out;
use crate::storage::{as_storage, attach_instance_binding, InstanceStorage};

/// Low-level bindings for object pointers in Godot.
///
/// Holds one pointer manager entry per engine object: ref-counted objects are `Shared` (the entry owns exactly one engine reference,
/// however many `RawGd` hold it), all others `EngineOwned` (the engine's free notification ends the entry).
///
/// This should not be used directly, you should either use [`Gd<T>`](super::Gd) or [`Option<Gd<T>>`]
/// depending on whether you need a nullable object pointer or not.
#[doc(hidden)]
pub struct RawGd<T: GodotClass> {
    handle: Option<Handle<sys::GDExtensionObjectPtr>>,

    // Must not be changed after initialization.
    instance_id: Option<InstanceId>,

    _marker: PhantomData<*const T>,
}

impl<T: GodotClass> RawGd<T> {
    pub(crate) fn null() -> Self {
        Self {
            handle: None,
            instance_id: None,
            _marker: PhantomData,
        }
    }

    /// Takes over the engine reference that `obj` carries (if ref-counted).
    ///
    /// Null pointers and objects without instance ID yield the null state.
    ///
    /// # Safety
    /// `obj` must be a valid object pointer or a null pointer.
    pub(crate) unsafe fn from_obj_sys_owned(obj: sys::GDExtensionObjectPtr) -> Self {
        Self::adopt(obj, RefTransfer::Carried)
    }

    /// Observes `obj` without an engine reference of the caller; a reference is taken if this is the first `RawGd` to the object.
    ///
    /// # Safety
    /// `obj` must be a valid object pointer or a null pointer.
    pub(crate) unsafe fn from_obj_sys_borrowed(obj: sys::GDExtensionObjectPtr) -> Self {
        Self::adopt(obj, RefTransfer::Borrowed)
    }

    /// Adopts an object the engine just constructed, whose reference count (if any) has not been initialized yet.
    ///
    /// # Safety
    /// `obj` must be a valid object pointer or a null pointer.
    pub(crate) unsafe fn from_obj_sys_fresh(obj: sys::GDExtensionObjectPtr) -> Self {
        Self::adopt(obj, RefTransfer::Fresh)
    }

    unsafe fn adopt(obj: sys::GDExtensionObjectPtr, transfer: RefTransfer) -> Self {
        if obj.is_null() {
            return Self::null();
        }

        // An ID of 0 means the pointer does not refer to a registered object.
        let Some(instance_id) = instance_id_of(obj) else {
            return Self::null();
        };

        let is_ref_counted = instance_id.is_ref_counted();
        let (mode, release) = if is_ref_counted {
            (
                Ownership::Shared,
                Some(release_ref_counted as pm::Release<sys::GDExtensionObjectPtr>),
            )
        } else {
            (Ownership::EngineOwned, None)
        };

        let (handle, lookup) = pm::new_keyed(obj as usize, obj, mode, release);

        // The entry owns exactly one reference.
        if is_ref_counted {
            match (lookup, transfer) {
                (Lookup::Inserted, RefTransfer::Borrowed) => {
                    RefCounted::raw_reference(obj);
                }
                (Lookup::Inserted, RefTransfer::Fresh) => {
                    RefCounted::raw_init_ref(obj);
                }
                (Lookup::Found, RefTransfer::Carried) => {
                    RefCounted::raw_unreference(obj);
                }
                _ => {}
            }
        }

        if lookup == Lookup::Inserted {
            // Registers the free notification that ends the entry.
            attach_instance_binding(obj);
        }

        out!("RawGd::adopt:     {obj:?} id={instance_id} {lookup:?}");

        Self {
            handle: Some(handle),
            instance_id: Some(instance_id),
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the object is null.
    ///
    /// This does not check if the object is dead. For that, use [`is_instance_valid()`](Self::is_instance_valid).
    pub(crate) fn is_null(&self) -> bool {
        self.handle.is_none()
    }

    pub(crate) fn instance_id_unchecked(&self) -> Option<InstanceId> {
        self.instance_id
    }

    pub(crate) fn is_instance_valid(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| pm::is_valid(handle.id()))
    }

    /// Object pointer, or null if this is null or the object is dead.
    pub(crate) fn obj_sys(&self) -> sys::GDExtensionObjectPtr {
        let Some(handle) = self.handle.as_ref() else {
            return ptr::null_mut();
        };

        match pm::get(handle) {
            // SAFETY: the live entry holds an object pointer.
            Ok(slot) => unsafe { *slot.as_ptr() },
            Err(_) => ptr::null_mut(),
        }
    }

    /// Object pointer of a live object.
    ///
    /// # Panics
    /// If the object is null or dead.
    pub(crate) fn live_obj_sys(&self, method_name: &str) -> sys::GDExtensionObjectPtr {
        let obj = self.obj_sys();
        if obj.is_null() {
            panic!(
                "{method_name}() called on freed object; instance ID {}",
                self.instance_id.map_or(0, InstanceId::to_i64)
            );
        }
        obj
    }

    /// Returns `Ok(cast_obj)` on success, `Err(self)` on error.
    ///
    /// Null casts to anything; a dead object casts to nothing.
    pub(crate) fn owned_cast<U>(self) -> Result<RawGd<U>, Self>
    where
        U: GodotClass,
    {
        if self.is_null() {
            return Ok(self.retype());
        }

        let obj = self.obj_sys();
        if obj.is_null() {
            return Err(self);
        }

        let class_tag = U::class_name().class_tag();

        // SAFETY: `obj` is live.
        let cast = unsafe { interface_fn!(object_cast_to)(obj, class_tag) };

        if cast.is_null() {
            Err(self)
        } else {
            Ok(self.retype())
        }
    }

    /// Same entry, different static type. Does not touch the reference count.
    pub(crate) fn retype<U: GodotClass>(mut self) -> RawGd<U> {
        RawGd {
            handle: self.handle.take(),
            instance_id: self.instance_id,
            _marker: PhantomData,
        }
    }

    /// Gives the caller one engine reference of its own, and the raw pointer. `self` keeps holding its entry.
    pub(crate) fn to_owned_obj_sys(&self) -> sys::GDExtensionObjectPtr {
        let obj = self.obj_sys();
        // SAFETY: pointer is null or live.
        unsafe { take_engine_ref(obj) };
        obj
    }
}

impl<T> RawGd<T>
where
    T: GodotClass + Bounds<Declarer = bounds::DeclUser>,
{
    /// Hands out a guard for a shared borrow, through which the user instance can be read.
    ///
    /// See [`crate::obj::Gd::bind()`] for a more in depth explanation.
    pub(crate) fn bind(&self) -> GdRef<'_, T> {
        let storage = self
            .storage()
            .unwrap_or_else(|| panic!("bind() called on freed object of class {}", T::class_name()));

        GdRef::from_guard(storage.get())
    }

    /// Hands out a guard for an exclusive borrow, through which the user instance can be read and written.
    ///
    /// See [`crate::obj::Gd::bind_mut()`] for a more in depth explanation.
    pub(crate) fn bind_mut(&mut self) -> GdMut<'_, T> {
        let storage = self.storage().unwrap_or_else(|| {
            panic!(
                "bind_mut() called on freed object of class {}",
                T::class_name()
            )
        });

        GdMut::from_guard(storage.get_mut())
    }

    /// Storage object associated with the extension instance.
    ///
    /// Returns `None` if self is null or dead.
    pub(crate) fn storage(&self) -> Option<&InstanceStorage<T>> {
        let obj = self.obj_sys();
        if obj.is_null() {
            return None;
        }

        // SAFETY: `obj` is live; the binding of a user class object is its storage, set on creation. The storage cannot be destroyed
        // while `self` holds the entry live, except through `free()`, which consumes a `Gd`.
        unsafe {
            let binding = attach_instance_binding(obj);
            sys::ptr_then(binding, |binding| as_storage::<T>(binding))
        }
    }
}

/// Destructor with semantics depending on memory strategy.
///
/// * If this `RawGd` smart pointer is the last holder of a reference-counted object, the entry's engine reference is released.
///   If that was the last reference, the object is destroyed.
///
/// * If the held object is manually-managed, **nothing happens** on the engine side.
///   To destroy manually-managed `RawGd` pointers, you need to call [`crate::obj::Gd::free()`].
impl<T: GodotClass> Drop for RawGd<T> {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        out!("RawGd::drop:      {:?}", self.instance_id);

        // Entries are gone after teardown, and the table may be destroyed during thread exit.
        if let Err(err) = pm::end(handle) {
            out!("RawGd::drop: {err}");
        }
    }
}

impl<T: GodotClass> Clone for RawGd<T> {
    fn clone(&self) -> Self {
        let Some(handle) = self.handle.as_ref() else {
            return Self::null();
        };

        let handle = pm::share(handle)
            .unwrap_or_else(|err| panic!("cannot clone object pointer: {err}"));

        Self {
            handle: Some(handle),
            instance_id: self.instance_id,
            _marker: PhantomData,
        }
    }
}

impl<T: GodotClass> fmt::Debug for RawGd<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instance_id {
            None => write!(f, "RawGd {{ null }}"),
            Some(id) if self.is_instance_valid() => {
                write!(f, "RawGd {{ id: {id}, class: {} }}", T::class_name())
            }
            Some(id) => write!(f, "RawGd {{ id: {id}, freed obj }}"),
        }
    }
}

/// What the caller of [`RawGd::adopt()`] brings along, for ref-counted objects.
#[derive(Copy, Clone, Debug)]
enum RefTransfer {
    /// One engine reference, handed over.
    Carried,
    /// No reference.
    Borrowed,
    /// No reference, and the count was never initialized.
    Fresh,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Object pointers as FFI representation

/// Object pointers cross the pointer-call ABI as `Object*`. Values produced for a receiver carry one engine reference (ref-counted
/// objects only), which the receiver adopts.
impl GodotFfiVariant for sys::GDExtensionObjectPtr {
    fn ffi_to_variant(&self) -> Variant {
        if self.is_null() {
            return Variant::nil();
        }

        // The engine's object-to-variant constructor takes its own reference.
        ffi_to_variant_via_type(self)
    }

    fn ffi_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        let obj: Self = ffi_from_variant_via_type(variant)?;

        // The engine yields null for a variant whose object was freed.
        if obj.is_null() {
            return Err(FromVariantError::DeadObject.into_error(variant));
        }

        // SAFETY: `obj` was just validated by the engine.
        unsafe { take_engine_ref(obj) };
        Ok(obj)
    }

    unsafe fn ffi_copy_from_ptr(ptr: sys::GDExtensionConstTypePtr) -> Self {
        let obj = *(ptr as *const Self);
        take_engine_ref(obj);
        obj
    }
}

/// Instance ID of a live object, `None` if the engine does not know it.
///
/// # Safety
/// `obj` must be a valid object pointer.
unsafe fn instance_id_of(obj: sys::GDExtensionObjectPtr) -> Option<InstanceId> {
    let raw_id = interface_fn!(object_get_instance_id)(obj);
    InstanceId::try_from_u64(raw_id)
}

/// Takes one engine reference for the caller if `obj` is ref-counted.
///
/// # Safety
/// `obj` must be a valid object pointer or null.
pub(crate) unsafe fn take_engine_ref(obj: sys::GDExtensionObjectPtr) {
    if obj.is_null() {
        return;
    }

    if instance_id_of(obj).is_some_and(InstanceId::is_ref_counted) {
        RefCounted::raw_reference(obj);
    }
}

/// Release routine of `Shared` object entries: gives back the entry's engine reference.
unsafe fn release_ref_counted(slot: *mut sys::GDExtensionObjectPtr) {
    // After deinitialization, the engine has already reclaimed everything.
    if !sys::is_initialized() {
        return;
    }

    let obj = *slot;
    if RefCounted::raw_unreference(obj) {
        out!("release_ref_counted: destroy {obj:?}");
        interface_fn!(object_destroy)(obj);
    }
}
