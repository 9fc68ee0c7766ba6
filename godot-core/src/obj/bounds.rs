/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Different ways how bounds of a `GodotClass` can be checked.
//!
//! This module contains two traits that can be used to check the characteristics of a `GodotClass` type:
//!
//! 1. [`Declarer`] tells you whether the class is provided by the engine or user-defined.
//!    - [`DeclEngine`] is used for all classes provided by the engine (e.g. `Node`).
//!    - [`DeclUser`] is used for all classes defined by the user, typically through `#[derive(GodotClass)]`.<br><br>
//!
//! 2. [`Memory`] is used to check the memory strategy of the **static** type.
//!    - [`MemRefCounted`] is used for `RefCounted` classes and derived.
//!    - [`MemManual`] is used for classes inheriting `Object` which are not `RefCounted` (e.g. `Node`).
//!    - [`MemDynamic`] is used for `Object` itself: a `Gd<Object>` may point to either kind, so only the instance knows.
//!
//! The memory strategy of an *instance* is always read from its [`InstanceId`][crate::obj::InstanceId], which encodes whether
//! the object is ref-counted.
//!
//! # Example
//!
//! Declare a custom smart pointer which wraps `Gd<T>` pointers, but only accepts `T` objects that are manually managed.
//! ```
//! use godot::prelude::*;
//! use godot::obj::{bounds, Bounds};
//!
//! struct MyGd<T>
//! where T: GodotClass + Bounds<Memory = bounds::MemManual>
//! {
//!    inner: Gd<T>,
//! }
//! ```

use crate::obj::cap::GodotDefault;
use crate::obj::{Bounds, Gd, GodotClass, RawGd};
use crate::registry::callbacks;
use crate::sys;
use private::Sealed;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Sealed trait

pub(super) mod private {
    use super::{Declarer, Memory};

    // Bounds trait declared here for code locality; re-exported in crate::obj.

    /// Library-implemented trait to check bounds on `GodotClass` types.
    ///
    /// See [`bounds`](crate::obj::bounds) module for how to use this for bounds checking.
    ///
    /// # Safety
    ///
    /// Must not be implemented manually: the memory strategy has to match the engine's class hierarchy.
    pub unsafe trait Bounds {
        /// Defines the memory strategy of the static type.
        type Memory: Memory;

        /// Whether this class is a core Godot class provided by the engine, or declared by the user as a Rust struct.
        type Declarer: Declarer;
    }

    pub trait Sealed {}
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Memory bounds

/// Specifies the memory strategy of the static type.
pub trait Memory: Sealed {
    /// `Some(true)` for ref-counted, `Some(false)` for manual, `None` if only the instance knows.
    #[doc(hidden)]
    const IS_REF_COUNTED: Option<bool>;
}

/// Memory managed through Godot reference counter (always present).
/// This is used for `RefCounted` classes and derived.
pub struct MemRefCounted {}
impl Sealed for MemRefCounted {}
impl Memory for MemRefCounted {
    const IS_REF_COUNTED: Option<bool> = Some(true);
}

/// Memory managed manually by the user or the engine's scene tree.
pub struct MemManual {}
impl Sealed for MemManual {}
impl Memory for MemManual {
    const IS_REF_COUNTED: Option<bool> = Some(false);
}

/// Memory strategy only known per instance. Used for `Object`.
pub struct MemDynamic {}
impl Sealed for MemDynamic {}
impl Memory for MemDynamic {
    const IS_REF_COUNTED: Option<bool> = None;
}

/// Memory strategies under which an instance may be manually managed: [`MemManual`] always, [`MemDynamic`] depending on the instance.
pub trait PossiblyManual: Memory {}
impl PossiblyManual for MemManual {}
impl PossiblyManual for MemDynamic {}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Declarer bounds

/// Specifies who declares a given `GodotClass`.
pub trait Declarer: Sealed {
    /// Check if the object is a user object *and* currently locked by a `bind()` or `bind_mut()` guard.
    #[doc(hidden)]
    fn is_currently_bound<T>(obj: &RawGd<T>) -> bool
    where
        T: GodotClass + Bounds<Declarer = Self>;

    #[doc(hidden)]
    fn create_gd<T>() -> Gd<T>
    where
        T: GodotDefault + Bounds<Declarer = Self>;
}

/// Expresses that a class is declared by the Godot engine.
pub enum DeclEngine {}
impl Sealed for DeclEngine {}
impl Declarer for DeclEngine {
    fn is_currently_bound<T>(_obj: &RawGd<T>) -> bool
    where
        T: GodotClass + Bounds<Declarer = Self>,
    {
        false
    }

    fn create_gd<T>() -> Gd<T>
    where
        T: GodotDefault + Bounds<Declarer = Self>,
    {
        let class_name = T::class_name().to_string_name();

        // SAFETY: the class name is a valid StringName; a non-null result is a freshly constructed object.
        unsafe {
            let object_ptr = sys::interface_fn!(classdb_construct_object)(class_name.string_sys());
            Gd::from_obj_sys_fresh(object_ptr)
        }
    }
}

/// Expresses that a class is declared by the user.
pub enum DeclUser {}
impl Sealed for DeclUser {}
impl Declarer for DeclUser {
    fn is_currently_bound<T>(obj: &RawGd<T>) -> bool
    where
        T: GodotClass + Bounds<Declarer = Self>,
    {
        obj.storage().is_some_and(|storage| storage.is_bound())
    }

    fn create_gd<T>() -> Gd<T>
    where
        T: GodotDefault + Bounds<Declarer = Self>,
    {
        let object_ptr = match callbacks::create_custom::<T, _>(T::__godot_user_init) {
            Ok(ptr) => ptr,
            Err(msg) => panic!("{}::init() failed: {msg}", T::class_name()),
        };

        // SAFETY: `create_custom` returns a freshly constructed object of class `T`.
        unsafe { Gd::from_obj_sys_fresh(object_ptr) }
    }
}
