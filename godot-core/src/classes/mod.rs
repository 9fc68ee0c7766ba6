/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Maps the Godot class API to Rust.
//!
//! This module contains the following symbols:
//! * Classes: `Object`, `RefCounted`, `Node`, `Resource`.
//! * Interface traits: `IObject`, `IRefCounted`, `INode`, `IResource`.
//!
//! Classes are marker types: they are never instantiated in Rust, only named in `Gd<T>` pointers and as `base` of user classes.
//! Their engine methods are exposed on `Gd<T>` for every `T` inheriting the class.

mod class_runtime;
mod node;
mod object;
mod ref_counted;
mod resource;

pub use node::{INode, Node};
pub use object::{IObject, Object};
pub use ref_counted::{IRefCounted, RefCounted};
pub use resource::{IResource, Resource};

pub(crate) use class_runtime::*;

/// Declares an engine class marker with its memory strategy, init level and ancestors.
macro_rules! engine_class {
    (
        $( #[$attr:meta] )*
        $Class:ident: $Base:ty {
            memory: $Memory:ident,
            init_level: $Level:ident,
            ancestors: [ $( $Ancestor:ty ),* ],
        }
    ) => {
        $( #[$attr] )*
        ///
        /// This is a marker type without values. Refer to instances through [`Gd`][crate::obj::Gd] pointers.
        #[derive(Debug)]
        pub enum $Class {}

        impl $crate::obj::GodotClass for $Class {
            type Base = $Base;

            fn class_name() -> $crate::meta::ClassName {
                $crate::meta::ClassName::__cached(stringify!($Class))
            }

            const INIT_LEVEL: $crate::init::InitLevel = $crate::init::InitLevel::$Level;
        }

        // SAFETY: memory strategy matches the engine's class hierarchy.
        unsafe impl $crate::obj::Bounds for $Class {
            type Memory = $crate::obj::bounds::$Memory;
            type Declarer = $crate::obj::bounds::DeclEngine;
        }

        $(
            // SAFETY: listed ancestors are base classes in the engine.
            unsafe impl $crate::obj::Inherits<$Ancestor> for $Class {}
        )*

        impl $crate::obj::cap::GodotDefault for $Class {}
    };
}

pub(crate) use engine_class;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Inheritance for user classes

// One macro per engine class, used by `#[derive(GodotClass)]` to declare a user class as subclass of its base and all ancestors.
// `$crate` resolves to this crate even when invoked through the `godot` facade.

#[doc(hidden)]
#[macro_export]
macro_rules! unsafe_inherits_transitive_Object {
    ($Class:ty) => {
        // SAFETY: the derive only invokes this for classes declared with this base.
        unsafe impl $crate::obj::Inherits<$crate::classes::Object> for $Class {}
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! unsafe_inherits_transitive_RefCounted {
    ($Class:ty) => {
        // SAFETY: the derive only invokes this for classes declared with this base.
        unsafe impl $crate::obj::Inherits<$crate::classes::RefCounted> for $Class {}
        $crate::unsafe_inherits_transitive_Object!($Class);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! unsafe_inherits_transitive_Node {
    ($Class:ty) => {
        // SAFETY: the derive only invokes this for classes declared with this base.
        unsafe impl $crate::obj::Inherits<$crate::classes::Node> for $Class {}
        $crate::unsafe_inherits_transitive_Object!($Class);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! unsafe_inherits_transitive_Resource {
    ($Class:ty) => {
        // SAFETY: the derive only invokes this for classes declared with this base.
        unsafe impl $crate::obj::Inherits<$crate::classes::Resource> for $Class {}
        $crate::unsafe_inherits_transitive_RefCounted!($Class);
    };
}
