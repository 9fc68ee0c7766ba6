/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Built-in types like `Vector2`, `GString` and `Variant`.
//!
//! Two families live here:
//!
//! - Plain math types (`Vector2`, `Transform3D`, `Color`, ...) are `#[repr(C)]` Rust structs with the engine's layout. They are passed by
//!   value and never touch the pointer manager.
//! - Opaque types (`GString`, `Array`, `Dictionary`, packed arrays, `Callable`, `Signal`) are engine allocations. Each wrapper owns one
//!   pointer manager entry, which runs the engine destructor exactly once when the wrapper is dropped.

// Re-export macros.
pub use crate::{array, dict, real, varray};

pub use crate::sys::{VariantOperator, VariantType};

#[doc(hidden)]
pub mod __prelude_reexport {
    use super::*;

    pub use aabb::*;
    pub use basis::*;
    pub use callable::*;
    pub use collections::containers::*;
    pub use color::*;
    pub use plane::*;
    pub use projection::*;
    pub use quaternion::*;
    pub use real_inner::*;
    pub use rect2::*;
    pub use rid::*;
    pub use signal::*;
    pub use string::{GString, NodePath, StringName};
    pub use transform2d::*;
    pub use transform3d::*;
    pub use variant::*;
    pub use vectors::*;

    pub use super::{VariantOperator, VariantType};
    pub use crate::{array, dict, real, varray};
}

pub use __prelude_reexport::*;

/// Math-related functions and traits like [`ApproxEq`][math::ApproxEq].
pub mod math;

/// Iterator types for arrays and dictionaries.
pub mod iter {
    pub use super::collections::iterators::*;
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Implementation

// Modules exporting declarative macros must appear first.
mod macros;

pub(crate) mod opaque_handle;

mod aabb;
mod basis;
mod callable;
mod collections;
mod color;
mod plane;
mod projection;
mod quaternion;
mod rect2;
mod rid;
mod signal;
mod string;
mod transform2d;
mod transform3d;
mod variant;
mod vectors;

// Rename imports because we re-export a subset of types under same module names.
#[path = "real.rs"]
mod real_inner;

/// Calls a method of a builtin type through the pointer-call convention.
///
/// # Safety
/// `type_ptr` must point to a valid value of type `ty`, and `P`/`R` must match the method's signature.
pub(crate) unsafe fn builtin_ptrcall<P, R>(
    ty: VariantType,
    method: &'static str,
    hash: i64,
    type_ptr: crate::sys::GDExtensionTypePtr,
    args: P,
) -> R
where
    P: crate::meta::OutParamTuple,
    R: crate::meta::FromGodot,
{
    let method_bind = crate::meta::BuiltinMethodBind::load(ty, method, hash);

    crate::meta::Signature::<P, R>::out_builtin_ptrcall(
        method_bind,
        ty.godot_name(),
        method,
        type_ptr,
        args,
    )
}

pub(crate) fn to_i64(i: usize) -> i64 {
    i.try_into().unwrap()
}

pub(crate) fn to_usize(i: i64) -> usize {
    i.try_into().unwrap()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Test utils

#[cfg(all(test, feature = "serde"))]
pub(crate) mod test_utils {
    use serde::{Deserialize, Serialize};

    pub(crate) fn roundtrip<T>(value: &T, expected_json: &str)
    where
        T: for<'a> Deserialize<'a> + Serialize + PartialEq + std::fmt::Debug,
    {
        let json: String = serde_json::to_string(value).unwrap();
        let back: T = serde_json::from_str(json.as_str()).unwrap();

        assert_eq!(back, *value, "serde round-trip changes value");
        assert_eq!(
            json, expected_json,
            "value does not conform to expected JSON"
        );
    }
}
