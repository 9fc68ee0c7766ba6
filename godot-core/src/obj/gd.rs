/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::ptr;

use godot_ffi as sys;
use sys::{interface_fn, VariantType};

use crate::builtin::{Callable, GString, Signal, StringName, Variant};
use crate::classes::{self, Node, Object, RefCounted, Resource};
use crate::global::Error;
use crate::meta::error::{CallError, ConvertError, FromFfiError, FromVariantError};
use crate::meta::traits::object_hint_info;
use crate::meta::{
    ArrayElement, CallResult, ClassName, FromGodot, GodotConvert, GodotFfiVariant, GodotType,
    PropertyHint, PropertyHintInfo, ToGodot,
};
use crate::obj::{bounds, cap, Bounds, GdMut, GdRef, GodotClass, Inherits, InstanceId, RawGd};
use crate::out;
use crate::registry::callbacks;

/// Smart pointer to objects owned by the Godot engine.
///
/// This smart pointer can only hold _objects_ in the Godot sense: instances of Godot classes (`Node`, `RefCounted`, etc.)
/// or user-declared structs (declared with `#[derive(GodotClass)]`). It does **not** hold built-in types (`Vector3`, `Color`, `i32`).
///
/// `Gd<T>` never holds null objects. If you need nullability, use `Option<Gd<T>>`.
///
/// # Memory management
///
/// Every `Gd` is a handle into the pointer manager. All `Gd` pointers to the same object share one entry.
///
/// - **Reference-counted**<br>
///   Objects of type [`RefCounted`] or inherited from it hold one engine reference per entry. When the last `Gd` is dropped,
///   the reference is released; if it was the last one on the engine side as well, the object is destroyed.<br><br>
///
/// - **Manual**<br>
///   Objects inheriting from [`Object`] which are not `RefCounted` are **manually-managed**. Dropping a `Gd` does nothing on
///   the engine side. You are responsible for deallocating such objects using [`free()`][Self::free]. Once the engine frees
///   the object, every `Gd` pointing to it observes it as dead.<br><br>
///
/// - **Dynamic**<br>
///   For `T=Object`, the memory strategy is determined per instance.
///
/// # Construction
///
/// | Type \ Memory Strategy | Ref-counted          | Manually managed      |
/// |------------------------|----------------------|-----------------------|
/// | **Engine type**        | `Resource::new_gd()` | `Node::new_alloc()`   |
/// | **User type**          | `MyClass::new_gd()`  | `MyClass::new_alloc()`|
///
/// In addition, the smart pointer can be constructed in multiple ways:
///
/// * [`Gd::default()`] for reference-counted types that are constructible.
/// * [`Gd::from_init_fn(function)`][Gd::from_init_fn] for Rust objects with `Base<T>` field, which are constructed inside the smart pointer.
/// * [`Gd::from_object(rust_obj)`][Gd::from_object] for existing Rust objects without a `Base<T>` field.
/// * [`Gd::from_instance_id(id)`][Gd::from_instance_id] and [`Gd::try_from_instance_id(id)`][Gd::try_from_instance_id]
///   to obtain a pointer to an object which is already alive in the engine.
/// * [`Gd::construct(class)`][Gd::construct] to instantiate a class by its engine name.
///
/// # Binds
///
/// The [`bind()`][Self::bind] and [`bind_mut()`][Self::bind_mut] methods allow you to obtain a shared or exclusive guard to the user instance.
/// These provide interior mutability similar to [`RefCell`][std::cell::RefCell].
///
/// When you declare a `#[func]` method on your own class and it accepts `&self` or `&mut self`, an implicit `bind()` or `bind_mut()` call
/// on the owning `Gd<T>` is performed. This is important to keep in mind, as you can get into situations that violate dynamic borrow rules; for
/// example if you are inside a `&mut self` method, make a call to the engine and indirectly call another method on the same object (re-entrancy).
pub struct Gd<T: GodotClass> {
    pub(crate) raw: RawGd<T>,
}

/// _The methods in this impl block are only available for user-declared `T`, that is,
/// structs with `#[derive(GodotClass)]` but not Godot classes like `Node` or `RefCounted`._ <br><br>
impl<T> Gd<T>
where
    T: GodotClass + Bounds<Declarer = bounds::DeclUser>,
{
    /// Creates a `Gd<T>` using a function that constructs a `T` from a provided base.
    ///
    /// Imagine you have a type `T`, which has a base field that you cannot default-initialize.
    /// The `init` function provides you with a `Base<T::Base>` object that you can use inside your `T`, which
    /// is then wrapped in a `Gd<T>`.
    ///
    /// ```no_run
    /// # use godot::prelude::*;
    /// #[derive(GodotClass)]
    /// #[class(init, base=Node)]
    /// struct MyClass {
    ///     my_base: Base<Node>,
    ///     other_field: i32,
    /// }
    ///
    /// let obj = Gd::from_init_fn(|my_base| {
    ///     // accepts the base and returns a constructed object containing it
    ///     MyClass { my_base, other_field: 732 }
    /// });
    /// ```
    ///
    /// # Panics
    /// If `init` panics. The half-constructed object is destroyed first.
    pub fn from_init_fn<F>(init: F) -> Self
    where
        F: FnOnce(crate::obj::Base<T::Base>) -> T,
    {
        let object_ptr = callbacks::create_custom(init)
            .unwrap_or_else(|msg| panic!("Gd::from_init_fn() for class {} failed: {msg}", T::class_name()));

        // SAFETY: `create_custom` returns a freshly constructed object of class `T`.
        unsafe { Gd::from_obj_sys_fresh(object_ptr) }
    }

    /// Moves a user-created object into this smart pointer, submitting ownership to the Godot engine.
    ///
    /// This is only useful for types `T` which do not store their base objects (if they have a base,
    /// you cannot construct them standalone).
    pub fn from_object(user_object: T) -> Self {
        Self::from_init_fn(move |_base| user_object)
    }

    /// Hands out a guard for a shared borrow, through which the user instance can be read.
    ///
    /// The pattern is very similar to interior mutability with standard [`RefCell`][std::cell::RefCell].
    /// You can either have multiple `GdRef` shared guards, or a single `GdMut` exclusive guard to a Rust
    /// `GodotClass` instance, independently of how many `Gd` smart pointers point to it.
    ///
    /// # Panics
    /// * If another `Gd` smart pointer pointing to the same Rust instance has a live `GdMut` guard bound.
    /// * If there is an ongoing call from the engine to Rust, which currently holds a `&mut T` reference to the user instance.
    /// * If the object is dead.
    pub fn bind(&self) -> GdRef<'_, T> {
        self.raw.bind()
    }

    /// Hands out a guard for an exclusive borrow, through which the user instance can be read and written.
    ///
    /// # Panics
    /// * If another `Gd` smart pointer pointing to the same Rust instance has a live `GdRef` or `GdMut` guard bound.
    /// * If there is an ongoing call from the engine to Rust, which currently holds a `&T` or `&mut T` reference to the user instance.
    /// * If the object is dead.
    pub fn bind_mut(&mut self) -> GdMut<'_, T> {
        self.raw.bind_mut()
    }
}

/// _The methods in this impl block are available for any `T`._ <br><br>
impl<T: GodotClass> Gd<T> {
    /// Default-constructs an instance of `T`, ref-counted or manually managed depending on `T`.
    ///
    /// For ref-counted classes, [`NewGd::new_gd()`](crate::obj::NewGd::new_gd) is the shorter form; manually managed ones use
    /// [`NewAlloc::new_alloc()`](crate::obj::NewAlloc::new_alloc), which reminds you to free the object.
    pub fn new() -> Self
    where
        T: cap::GodotDefault,
    {
        T::__godot_default()
    }

    /// Instantiates the class registered under `class_name` in the engine, if it is `T` or derived from it.
    ///
    /// Returns `None` if the engine does not know the class, cannot instantiate it, or if it does not inherit `T`.
    /// In the latter case, a manually managed instance is freed again.
    pub fn construct(class_name: &str) -> Option<Self> {
        let class_name = StringName::from(class_name);

        // SAFETY: the class name is a valid StringName.
        let object_ptr = unsafe { interface_fn!(classdb_construct_object)(class_name.string_sys()) };

        // SAFETY: a non-null result is a freshly constructed object.
        let untyped = unsafe { RawGd::<Object>::from_obj_sys_fresh(object_ptr) };
        if untyped.is_null() {
            return None;
        }

        match untyped.owned_cast::<T>() {
            Ok(raw) => Some(Self { raw }),
            Err(untyped) => {
                let obj = untyped.obj_sys();
                let is_ref_counted = untyped
                    .instance_id_unchecked()
                    .is_some_and(InstanceId::is_ref_counted);

                // Ref-counted instances go away with the last reference.
                if !is_ref_counted && !obj.is_null() {
                    // SAFETY: `obj` is live and nobody else has seen it yet.
                    unsafe { interface_fn!(object_destroy)(obj) };
                }
                None
            }
        }
    }

    /// Looks up the given instance ID and returns the associated object, if possible.
    ///
    /// If no such instance ID is registered, or if the dynamic type of the object behind that instance ID
    /// is not compatible with `T`, then `None` is returned.
    pub fn try_from_instance_id(instance_id: InstanceId) -> Option<Self> {
        // SAFETY: the engine returns either null or a live object.
        let untyped = unsafe {
            let object_ptr = interface_fn!(object_get_instance_from_id)(instance_id.to_u64());
            RawGd::<Object>::from_obj_sys_borrowed(object_ptr)
        };

        if untyped.is_null() {
            return None;
        }

        untyped.owned_cast::<T>().ok().map(|raw| Self { raw })
    }

    /// ⚠️ Looks up the given instance ID and returns the associated object.
    ///
    /// # Panics
    /// If no such instance ID is registered, or if the dynamic type of the object behind that instance ID
    /// is not compatible with `T`.
    pub fn from_instance_id(instance_id: InstanceId) -> Self {
        Self::try_from_instance_id(instance_id).unwrap_or_else(|| {
            panic!(
                "Instance ID {} does not belong to a valid object of class '{}'",
                instance_id,
                T::class_name()
            )
        })
    }

    /// Returns the instance ID of this object, or `None` if the object is dead.
    pub fn instance_id_or_none(&self) -> Option<InstanceId> {
        if self.raw.is_instance_valid() {
            Some(self.instance_id_unchecked())
        } else {
            None
        }
    }

    /// ⚠️ Returns the instance ID of this object (panics when dead).
    ///
    /// # Panics
    /// If this object is no longer alive (registered in Godot's object database).
    pub fn instance_id(&self) -> InstanceId {
        self.instance_id_or_none().unwrap_or_else(|| {
            panic!(
                "failed to call instance_id() on destroyed object; \
                use instance_id_or_none() or keep your objects alive"
            )
        })
    }

    /// Returns the last known, possibly invalid instance ID of this object.
    ///
    /// This function does not check that the returned instance ID points to a valid instance!
    /// Unless performance is a problem, use [`instance_id()`][Self::instance_id] instead.
    pub fn instance_id_unchecked(&self) -> InstanceId {
        self.raw
            .instance_id_unchecked()
            .expect("`Gd` is never null")
    }

    /// Checks if this smart pointer points to a live object (read description!).
    ///
    /// Using this method is often indicative of bad design -- you should dispose of your pointers once an object is
    /// destroyed. However, this method exists because GDScript offers it and there may be **rare** use cases.
    ///
    /// Do not use this method to check if you can safely access an object. Accessing dead objects is generally safe
    /// and will panic in a defined manner.
    pub fn is_instance_valid(&self) -> bool {
        self.raw.is_instance_valid()
    }

    /// **Upcast:** convert into a smart pointer to a base class. Always succeeds.
    ///
    /// Moves out of this value, keeping the same pointer manager entry. To keep the original, upcast a clone:
    /// ```no_run
    /// # use godot::prelude::*;
    /// #[derive(GodotClass)]
    /// #[class(init, base=Node)]
    /// struct MyClass {}
    ///
    /// let obj: Gd<MyClass> = MyClass::new_alloc();
    /// let base = obj.clone().upcast::<Node>();
    /// ```
    pub fn upcast<Base>(self) -> Gd<Base>
    where
        Base: GodotClass,
        T: Inherits<Base>,
    {
        Gd {
            raw: self.raw.retype(),
        }
    }

    /// **Downcast:** try to convert into a smart pointer to a derived class.
    ///
    /// If `T`'s dynamic type is not `Derived` or one of its subclasses, `Err(self)` is returned, meaning you can reuse the original
    /// object for further casts (or free it, if manually managed).
    pub fn try_cast<Derived>(self) -> Result<Gd<Derived>, Self>
    where
        Derived: GodotClass + Inherits<T>,
    {
        self.owned_cast()
    }

    /// ⚠️ **Downcast:** convert into a smart pointer to a derived class. Panics on error.
    ///
    /// # Panics
    /// If the class' dynamic type is not `Derived` or one of its subclasses. Use [`Self::try_cast()`] if you want to check the result.
    pub fn cast<Derived>(self) -> Gd<Derived>
    where
        Derived: GodotClass + Inherits<T>,
    {
        self.owned_cast().unwrap_or_else(|from_obj| {
            panic!(
                "downcast from {from} to {to} failed; instance {from_obj:?}",
                from = T::class_name(),
                to = Derived::class_name(),
            )
        })
    }

    /// Returns `Ok(cast_obj)` on success, `Err(self)` on error.
    fn owned_cast<U>(self) -> Result<Gd<U>, Self>
    where
        U: GodotClass,
    {
        self.raw
            .owned_cast()
            .map(|raw| Gd { raw })
            .map_err(|raw| Self { raw })
    }

    /// Returns a `Gd<RefCounted>` to the same object, if its dynamic type is reference-counted.
    pub fn as_refcounted(&self) -> Option<Gd<RefCounted>> {
        if !self.instance_id_unchecked().is_ref_counted() {
            return None;
        }

        self.raw.clone().owned_cast::<RefCounted>().ok().map(|raw| Gd { raw })
    }

    /// Engine reference count, for debug output. `None` for manually managed or dead objects.
    pub(crate) fn maybe_refcount(&self) -> Option<usize> {
        if !self.instance_id_unchecked().is_ref_counted() {
            return None;
        }

        let obj = self.raw.obj_sys();
        if obj.is_null() {
            return None;
        }

        // SAFETY: `obj` is live and ref-counted.
        let count = unsafe { RefCounted::raw_get_reference_count(obj) };
        usize::try_from(count).ok()
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Methods of `Object`, available on every class

    /// Name of the dynamic class of this object, as the engine knows it.
    ///
    /// # Panics
    /// If the object is dead.
    pub fn get_class(&self) -> GString {
        let obj = self.raw.live_obj_sys("get_class");

        // SAFETY: `obj` is live.
        unsafe { Object::raw_get_class(obj) }
    }

    /// Returns whether the object's dynamic class is `class` or inherits from it.
    pub fn is_class(&self, class: &str) -> bool {
        let obj = self.raw.live_obj_sys("is_class");

        // SAFETY: `obj` is live.
        unsafe { Object::raw_is_class(obj, GString::from(class)) }
    }

    /// Reads the property `property` through the engine, including properties registered by user classes.
    ///
    /// Returns a nil variant if the property does not exist.
    pub fn get(&self, property: impl Into<StringName>) -> Variant {
        let obj = self.raw.live_obj_sys("get");

        // SAFETY: `obj` is live.
        unsafe { Object::raw_get(obj, property.into()) }
    }

    /// Assigns `value` to the property `property` through the engine.
    pub fn set(&mut self, property: impl Into<StringName>, value: &Variant) {
        let obj = self.raw.live_obj_sys("set");

        // SAFETY: `obj` is live.
        unsafe { Object::raw_set(obj, property.into(), value.clone()) }
    }

    /// Dynamically calls `method` with `args`, the way a script would.
    ///
    /// # Panics
    /// If the call fails, e.g. because the method does not exist or an argument has the wrong type.
    /// Use [`try_call()`](Self::try_call) to handle these cases.
    pub fn call(&mut self, method: impl Into<StringName>, args: &[Variant]) -> Variant {
        self.try_call(method, args)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Dynamically calls `method` with `args`, returning a [`CallError`] on failure.
    pub fn try_call(
        &mut self,
        method: impl Into<StringName>,
        args: &[Variant],
    ) -> CallResult<Variant> {
        let obj = self.raw.live_obj_sys("call");

        // SAFETY: `obj` is live.
        unsafe { Object::raw_call(obj, method.into(), args) }
    }

    /// Connects `signal` of this object to `callable`.
    pub fn connect(&mut self, signal: impl Into<StringName>, callable: &Callable) -> Error {
        self.connect_flags(signal, callable, 0)
    }

    /// Like [`connect()`](Self::connect), with the engine's `ConnectFlags` bitmask.
    pub fn connect_flags(
        &mut self,
        signal: impl Into<StringName>,
        callable: &Callable,
        flags: u32,
    ) -> Error {
        let obj = self.raw.live_obj_sys("connect");

        // SAFETY: `obj` is live.
        unsafe { Object::raw_connect(obj, signal.into(), callable.clone(), flags) }
    }

    /// Emits `signal` with `args`. Connected callables are invoked synchronously.
    ///
    /// # Panics
    /// If the engine rejects the call itself (not if the signal is unknown; that is reported through the returned [`Error`]).
    pub fn emit_signal(&mut self, signal: impl Into<StringName>, args: &[Variant]) -> Error {
        self.try_emit_signal(signal, args)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Emits `signal` with `args`, returning a [`CallError`] if the engine rejects the call.
    pub fn try_emit_signal(
        &mut self,
        signal: impl Into<StringName>,
        args: &[Variant],
    ) -> Result<Error, CallError> {
        let obj = self.raw.live_obj_sys("emit_signal");

        // SAFETY: `obj` is live.
        unsafe { Object::raw_emit_signal(obj, signal.into(), args) }
    }

    /// Returns a callable referencing a method from this object named `method_name`.
    pub fn callable<S: Into<StringName>>(&self, method_name: S) -> Callable {
        Callable::from_object_method(self, method_name)
    }

    /// Returns the signal `signal_name` of this object as a first-class value.
    pub fn signal<S: Into<StringName>>(&self, signal_name: S) -> Signal {
        Signal::from_object_signal(self, signal_name)
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // FFI

    /// Object pointer, or null if the object is dead. The pointer is borrowed from this `Gd`.
    #[doc(hidden)]
    pub fn obj_sys(&self) -> sys::GDExtensionObjectPtr {
        self.raw.obj_sys()
    }

    /// # Safety
    /// `obj` must be a freshly constructed object, whose reference count (if any) was never initialized.
    pub(crate) unsafe fn from_obj_sys_fresh(obj: sys::GDExtensionObjectPtr) -> Self {
        Self::from_raw_nonnull(RawGd::from_obj_sys_fresh(obj), "from_obj_sys_fresh")
    }

    /// # Safety
    /// `obj` must be a live object of class `T` carrying one engine reference for the caller (if ref-counted).
    pub(crate) unsafe fn from_obj_sys_owned(obj: sys::GDExtensionObjectPtr) -> Self {
        Self::from_raw_nonnull(RawGd::from_obj_sys_owned(obj), "from_obj_sys_owned")
    }

    /// # Safety
    /// `obj` must be a live object of class `T`.
    pub(crate) unsafe fn from_obj_sys_borrowed(obj: sys::GDExtensionObjectPtr) -> Self {
        Self::from_raw_nonnull(RawGd::from_obj_sys_borrowed(obj), "from_obj_sys_borrowed")
    }

    fn from_raw_nonnull(raw: RawGd<T>, context: &str) -> Self {
        assert!(
            !raw.is_null(),
            "Gd::{context}(): null object pointer for class {}",
            T::class_name()
        );
        Self { raw }
    }

    /// Adopts an object pointer carrying one engine reference, checking that its dynamic class is `T`.
    ///
    /// # Safety
    /// `obj` must be null or a live object.
    unsafe fn try_from_owned_ptr(obj: sys::GDExtensionObjectPtr) -> Result<Self, OwnedPtrError> {
        let untyped = RawGd::<Object>::from_obj_sys_owned(obj);
        if untyped.is_null() {
            return Err(OwnedPtrError::Null);
        }

        untyped
            .owned_cast::<T>()
            .map(|raw| Self { raw })
            .map_err(|_| OwnedPtrError::WrongClass)
    }
}

/// _The methods in this impl block are only available for objects `T` that are manually managed,
/// i.e. anything that is not `RefCounted` or inherited from it._ <br><br>
impl<T> Gd<T>
where
    T: GodotClass,
    T::Memory: bounds::PossiblyManual,
{
    /// Destroy the manually-managed Godot object.
    ///
    /// Consumes this smart pointer and renders all other `Gd` smart pointers to the same object immediately invalid.
    /// Using those `Gd` instances will lead to panics, but not undefined behavior.
    ///
    /// Not calling `free()` on manually-managed instances causes memory leaks, unless their ownership is delegated, for
    /// example to the node tree in case of nodes.
    ///
    /// # Panics
    /// - When the referred-to object has already been destroyed.
    /// - When this is invoked on an upcast `Gd<Object>` that dynamically points to a reference-counted type.
    /// - When the object is bound by an ongoing `bind()` or `bind_mut()` call (through a separate `Gd` pointer).
    pub fn free(self) {
        assert!(
            !self.instance_id_unchecked().is_ref_counted(),
            "called free() on Gd<Object> which points to a RefCounted dynamic type; free() only supported for manually managed types\n\
            object: {self:?}"
        );

        assert!(
            self.is_instance_valid(),
            "called free() on already destroyed object"
        );

        let bound = <T::Declarer as bounds::Declarer>::is_currently_bound(&self.raw);
        assert!(
            !bound,
            "called free() while a bind() or bind_mut() call is active"
        );

        let obj = self.raw.obj_sys();
        out!("Gd::free:         {obj:?}");

        // SAFETY: object is alive, as checked above. The engine's free notification ends the pointer manager entry, so dropping
        // `self` afterwards releases nothing.
        unsafe { interface_fn!(object_destroy)(obj) };
    }
}

/// _Methods for reference-counted classes._ <br><br>
impl<T> Gd<T>
where
    T: GodotClass + Inherits<RefCounted>,
{
    /// Current engine reference count. All `Gd` pointers to the object together hold one reference.
    ///
    /// # Panics
    /// If the object is dead.
    pub fn get_reference_count(&self) -> i32 {
        let obj = self.raw.live_obj_sys("get_reference_count");

        // SAFETY: `obj` is live and ref-counted.
        unsafe { RefCounted::raw_get_reference_count(obj) }
    }
}

enum OwnedPtrError {
    Null,
    WrongClass,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Trait impls

impl<T: GodotClass> GodotConvert for Gd<T> {
    type Via = Gd<T>;
}

impl<T: GodotClass> ToGodot for Gd<T> {
    fn to_godot(&self) -> Self::Via {
        self.clone()
    }

    fn into_godot(self) -> Self::Via {
        self
    }
}

impl<T: GodotClass> FromGodot for Gd<T> {
    fn try_from_godot(via: Self::Via) -> Result<Self, ConvertError> {
        Ok(via)
    }
}

impl<T: GodotClass> GodotType for Gd<T> {
    type Ffi = sys::GDExtensionObjectPtr;

    fn to_ffi(&self) -> Self::Ffi {
        self.raw.obj_sys()
    }

    fn into_ffi(self) -> Self::Ffi {
        self.raw.to_owned_obj_sys()
    }

    fn try_from_ffi(ffi: Self::Ffi) -> Result<Self, ConvertError> {
        // SAFETY: pointer-call values are null or live objects, carrying one reference for the receiver.
        unsafe { Self::try_from_owned_ptr(ffi) }.map_err(|err| match err {
            OwnedPtrError::Null => FromFfiError::NullRawGd.into_error(()),
            OwnedPtrError::WrongClass => FromFfiError::WrongObjectType.into_error(()),
        })
    }

    fn class_name() -> ClassName {
        T::class_name()
    }

    fn property_hint_info() -> PropertyHintInfo {
        object_hint_info(
            T::class_name(),
            T::inherits::<Resource>(),
            T::inherits::<Node>(),
        )
    }

    fn godot_type_name() -> String {
        T::class_name().to_string()
    }

    fn try_from_variant_via(variant: &Variant) -> Result<Self, ConvertError> {
        let obj = sys::GDExtensionObjectPtr::ffi_from_variant(variant)?;

        // SAFETY: `obj` is live and carries one reference, as returned by `ffi_from_variant()`.
        unsafe { Self::try_from_owned_ptr(obj) }.map_err(|err| match err {
            OwnedPtrError::Null => FromVariantError::DeadObject.into_error(variant),
            OwnedPtrError::WrongClass => FromVariantError::WrongClass {
                expected: T::class_name(),
            }
            .into_error(variant),
        })
    }
}

impl<T: GodotClass> ArrayElement for Gd<T> {
    fn element_type_string() -> String {
        object_element_type_string::<T>()
    }
}

/// Typed-array hint string for elements of class `T`: `"24/17:MyResource"`, `"24/34:MyNode"` or `"24:MyObject"`.
fn object_element_type_string<T: GodotClass>() -> String {
    let object_type = VariantType::Object.ord();

    let hint = if T::inherits::<Resource>() {
        PropertyHint::RESOURCE_TYPE
    } else if T::inherits::<Node>() {
        PropertyHint::NODE_TYPE
    } else {
        return format!("{object_type}:{}", T::class_name());
    };

    format!("{object_type}/{}:{}", hint.ord(), T::class_name())
}

// `Option<Gd<T>>` is the nullable object pointer: null and freed objects are `None`.

impl<T: GodotClass> GodotConvert for Option<Gd<T>> {
    type Via = Self;
}

impl<T: GodotClass> ToGodot for Option<Gd<T>> {
    fn to_godot(&self) -> Self::Via {
        self.clone()
    }

    fn into_godot(self) -> Self::Via {
        self
    }
}

impl<T: GodotClass> FromGodot for Option<Gd<T>> {
    fn try_from_godot(via: Self::Via) -> Result<Self, ConvertError> {
        Ok(via)
    }
}

impl<T: GodotClass> GodotType for Option<Gd<T>> {
    type Ffi = sys::GDExtensionObjectPtr;

    fn to_ffi(&self) -> Self::Ffi {
        self.as_ref().map_or(ptr::null_mut(), Gd::obj_sys)
    }

    fn into_ffi(self) -> Self::Ffi {
        self.map_or(ptr::null_mut(), <Gd<T> as GodotType>::into_ffi)
    }

    fn try_from_ffi(ffi: Self::Ffi) -> Result<Self, ConvertError> {
        if ffi.is_null() {
            return Ok(None);
        }

        Gd::<T>::try_from_ffi(ffi).map(Some)
    }

    fn class_name() -> ClassName {
        T::class_name()
    }

    fn property_hint_info() -> PropertyHintInfo {
        Gd::<T>::property_hint_info()
    }

    fn godot_type_name() -> String {
        T::class_name().to_string()
    }

    fn nil_value() -> Option<Self> {
        Some(None)
    }

    fn try_from_variant_via(variant: &Variant) -> Result<Self, ConvertError> {
        if variant.is_nil() {
            return Ok(None);
        }

        match Gd::<T>::try_from_variant_via(variant) {
            Ok(obj) => Ok(Some(obj)),
            Err(err) if err.is_dead_object() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl<T: GodotClass> ArrayElement for Option<Gd<T>> {
    fn element_type_string() -> String {
        object_element_type_string::<T>()
    }
}

impl<T> Default for Gd<T>
where
    T: cap::GodotDefault + Bounds<Memory = bounds::MemRefCounted>,
{
    /// Creates a default-constructed `T` inside a smart pointer.
    ///
    /// This is equivalent to the GDScript expression `T.new()`, and to the shorter Rust expression `T::new_gd()`.
    ///
    /// This trait is only implemented for reference-counted classes. Classes with manually-managed memory (e.g. `Node`) are not covered,
    /// because they need explicit memory management, and deriving `Default` has a high chance of the user forgetting to call `free()` on those.
    /// `T::new_alloc()` should be used for those instead.
    fn default() -> Self {
        T::__godot_default()
    }
}

impl<T: GodotClass> Clone for Gd<T> {
    fn clone(&self) -> Self {
        out!("Gd::clone");
        Self {
            raw: self.raw.clone(),
        }
    }
}

impl<T: GodotClass> PartialEq for Gd<T> {
    /// ⚠️ Returns whether two `Gd` pointers point to the same object.
    ///
    /// Compares the instance IDs, which are never reused, so two dead pointers to different objects still compare unequal.
    fn eq(&self, other: &Self) -> bool {
        self.instance_id_unchecked() == other.instance_id_unchecked()
    }
}

impl<T: GodotClass> Eq for Gd<T> {}

impl<T: GodotClass> Display for Gd<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        classes::display_string(self, f)
    }
}

impl<T: GodotClass> Debug for Gd<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        classes::debug_string(self, f, "Gd")
    }
}

// Gd unwinding across panics does not invalidate any invariants;
// its mutability is anyway present, in the Godot engine.
impl<T: GodotClass> std::panic::UnwindSafe for Gd<T> {}
impl<T: GodotClass> std::panic::RefUnwindSafe for Gd<T> {}
