/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! # Rust bindings for Godot 4
//!
//! The **gdext** library implements Rust bindings for the [Godot](https://godotengine.org) engine, more precisely its version 4.
//! It does so using the C API called GDExtension: the engine loads the Rust library, which registers classes and methods.
//!
//! # API levels
//!
//! 1. **Low-level:** [`sys`] mirrors the C interface: raw pointers, function tables and type layouts.
//! 2. **Builtin and object types:** [`builtin`] contains value types such as [`Variant`][builtin::Variant], strings and
//!    containers; [`obj`] contains the [`Gd`][obj::Gd] smart pointer for engine objects.
//! 3. **Registration:** `#[derive(GodotClass)]`, [`#[godot_api]`][register::godot_api] and [`#[gdextension]`][init::gdextension]
//!    expose user-defined classes, methods, properties and signals to the engine.
//!
//! # Ergonomics and panics
//!
//! Methods like [`Gd::cast()`][obj::Gd::cast] panic with a message naming the involved classes when they fail. Where failure is
//! an expected outcome, an overload with an `Option` or `Result` return type exists, e.g. `try_cast()`.
//!
//! Panics inside functions called by the engine are caught at the boundary and reported through the engine's error log. They
//! never unwind into the engine.
//!
//! # Cargo features
//!
//! All features are off by default.
//!
//! * **`double-precision`**
//!
//!   Use `f64` instead of `f32` for the floating-point type [`real`][type@builtin::real]. Requires an engine compiled with
//!   `precision=double`.<br><br>
//!
//! * **`serde`**
//!
//!   Implement the [serde](https://docs.rs/serde) traits `Serialize` and `Deserialize` for math types. The representation has no
//!   stability guarantees.
//!
//! # Public API
//!
//! Symbols annotated with `#[doc(hidden)]`, modules named `private`, and the dependency crates are not part of the public API.
//! They exist for proc-macros and may change at any time.

#[doc(inline)]
pub use godot_core::{builtin, classes, global, meta, obj};

#[doc(hidden)]
pub use godot_core::{private, sys};

pub mod init {
    pub use godot_core::init::*;

    // Re-exports
    pub use godot_macros::gdextension;
}

/// Register/export Rust symbols to the engine: classes, methods, properties and signals.
pub mod register {
    pub use godot_macros::{godot_api, GodotClass};

    /// Traits for `#[var]` and `#[export]` fields.
    pub mod property {
        pub use godot_core::registry::property::{export_info_functions, Export, SimpleVar, Var};
    }
}

/// Testing facilities (unstable).
#[doc(hidden)]
pub mod test {
    pub use godot_macros::itest;
}

pub mod prelude;
