/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Registration support for property types.

use godot_ffi as sys;

use crate::builtin::*;
use crate::meta::{
    ArrayElement, ClassName, FromGodot, GodotConvert, GodotType, PackedArrayElement,
    PropertyHintInfo, PropertyInfo, ToGodot,
};
use crate::obj::{Gd, GodotClass};

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Var trait

/// Trait implemented for types that can be used as `#[var]` fields.
///
/// This creates a copy of the value, according to copy semantics provided by `Clone`. For example, `Array` and `Gd` are returned by
/// shared reference instead of copying the actual data.
///
/// This does not require [`FromGodot`] or [`ToGodot`], so that something can be used as a property even if it can't be used in function
/// arguments/return types.
#[diagnostic::on_unimplemented(
    message = "`#[var]` properties require `Var` trait; #[export] ones require `Export` trait",
    label = "type cannot be used as a property"
)]
pub trait Var: GodotConvert {
    /// Get property value. Called when reading a property from Godot.
    fn var_get(field: &Self) -> Self::Via;

    /// Set property value. Called when writing a property from Godot.
    fn var_set(field: &mut Self, value: Self::Via);

    /// Specific property hints. Only override if they deviate from [`GodotType::property_info`].
    fn var_hint() -> PropertyHintInfo {
        Self::Via::property_hint_info()
    }
}

/// Simplified way to implement the [`Var`] trait, for types with standard Godot conversion.
pub trait SimpleVar: ToGodot + FromGodot + Clone {}

impl<T> Var for T
where
    T: SimpleVar,
{
    fn var_get(field: &Self) -> Self::Via {
        field.to_godot()
    }

    fn var_set(field: &mut Self, value: Self::Via) {
        *field = T::from_godot(value);
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Export trait

/// Trait implemented for types that can be used as `#[export]` fields.
#[diagnostic::on_unimplemented(
    message = "`#[var]` properties require `Var` trait; #[export] ones require `Export` trait",
    label = "type cannot be used as a property"
)]
pub trait Export: Var {
    /// The export info to use for an exported field of this type, if no other export info is specified.
    fn export_hint() -> PropertyHintInfo {
        <Self as Var>::var_hint()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Implementations

macro_rules! impl_property_by_godot_convert {
    ($( $Ty:ty ),* $(,)?) => {
        $(
            impl SimpleVar for $Ty {}
            impl Export for $Ty {}
        )*
    };
}

impl_property_by_godot_convert!(
    bool, i64, i32, i16, i8, u32, u16, u8, f64, f32, String,
    Aabb, Basis, Callable, Color, Dictionary, GString, NodePath, Plane, Projection, Quaternion, Rect2, Rect2i, Rid, Signal,
    StringName, Transform2D, Transform3D, Variant, Vector2, Vector2i, Vector3, Vector3i, Vector4, Vector4i,
);

impl<T: ArrayElement> SimpleVar for Array<T> {}
impl<T: ArrayElement> Export for Array<T> {}

impl<T: PackedArrayElement> SimpleVar for PackedArray<T> {}
impl<T: PackedArrayElement> Export for PackedArray<T> {}

impl<T: GodotClass> SimpleVar for Gd<T> {}

impl<T: GodotClass> Export for Gd<T> {}

impl<T: GodotClass> SimpleVar for Option<Gd<T>> {}

impl<T: GodotClass> Export for Option<Gd<T>> {}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Hint helpers for #[export(...)]

/// Functions used to translate user-provided arguments into export hints.
pub mod export_info_functions {
    use crate::meta::PropertyHintInfo;

    /// Hint for `#[export(range = (min, max))]` and `#[export(range = (min, max, step))]`.
    ///
    /// Bounds are formatted the way the editor parses them: `0.0` becomes `"0"`, `0.5` stays `"0.5"`.
    pub fn export_range(min: f64, max: f64, step: Option<f64>) -> PropertyHintInfo {
        PropertyHintInfo::range(&range_hint_string(min, max, step))
    }

    pub(crate) fn range_hint_string(min: f64, max: f64, step: Option<f64>) -> String {
        match step {
            Some(step) => format!("{min},{max},{step}"),
            None => format!("{min},{max}"),
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Registration

/// Registers a property on class `class_name`, whose reads and writes go through the methods `getter` and `setter`.
///
/// The accessor methods must have been registered before.
pub fn register_var(class_name: ClassName, info: &PropertyInfo, getter: &str, setter: &str) {
    let info_sys = info.to_sys();
    let class_string_name = class_name.to_string_name();
    let getter_name = StringName::from(getter);
    let setter_name = StringName::from(setter);

    // SAFETY: all pointers refer to values that live until the end of this function.
    unsafe {
        sys::interface_fn!(classdb_register_extension_class_property)(
            sys::get_library(),
            class_string_name.string_sys(),
            info_sys.raw(),
            setter_name.string_sys(),
            getter_name.string_sys(),
        );
    }

    sys::out!("Registered property {class_name}::{}", info.property_name);
}

#[cfg(test)]
mod tests {
    use super::export_info_functions::range_hint_string;

    #[test]
    fn range_hint_formats_bounds() {
        assert_eq!(range_hint_string(0.0, 100.0, None), "0,100");
        assert_eq!(range_hint_string(-1.5, 2.0, Some(0.25)), "-1.5,2,0.25");
    }
}
