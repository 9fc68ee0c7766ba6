/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use godot_ffi as sys;
use sys::VariantType;

use crate::builtin::{GString, StringName};
use crate::meta::{ArrayElement, ClassName, GodotType};
use crate::registry::property::{Export, Var};

/// Describes a property in Godot.
///
/// Abstraction of the low-level `sys::GDExtensionPropertyInfo`.
///
/// Keeps the actual allocated values (the `sys` equivalent only keeps pointers, which fall out of scope).
#[derive(Clone, Debug)]
// Note: is not #[non_exhaustive], so adding fields is a breaking change. Mostly used internally at the moment though.
pub struct PropertyInfo {
    /// Which type this property has.
    ///
    /// For objects this should be set to [`VariantType::Object`], and the `class_name` field to the actual name of the class.
    ///
    /// For [`Variant`][crate::builtin::Variant], this should be set to [`VariantType::Nil`].
    pub variant_type: VariantType,

    /// Which class this property is.
    ///
    /// This should be set to [`ClassName::none()`] unless the variant type is `Object`.
    pub class_name: ClassName,

    /// The name of this property in Godot.
    pub property_name: StringName,

    /// Additional type information for this property, e.g. about array types or enum values. Split into `hint` and `hint_string` members.
    pub hint_info: PropertyHintInfo,

    /// How this property should be used. See [`PropertyUsageFlags`] for more information.
    pub usage: PropertyUsageFlags,
}

impl PropertyInfo {
    /// Create a new `PropertyInfo` representing a property named `property_name` with type `T`.
    ///
    /// This will generate property info equivalent to what a `#[var]` attribute would.
    pub fn new_var<T: Var>(property_name: &str) -> Self {
        T::Via::property_info(property_name).with_hint_info(T::var_hint())
    }

    /// Create a new `PropertyInfo` for an exported property named `property_name` with type `T`.
    ///
    /// This will generate property info equivalent to what an `#[export]` attribute would.
    pub fn new_export<T: Export>(property_name: &str) -> Self {
        T::Via::property_info(property_name).with_hint_info(T::export_hint())
    }

    /// Change the `hint` and `hint_string` to be the given `hint_info`.
    pub fn with_hint_info(self, hint_info: PropertyHintInfo) -> Self {
        Self { hint_info, ..self }
    }

    /// Change the usage flags.
    pub fn with_usage(self, usage: PropertyUsageFlags) -> Self {
        Self { usage, ..self }
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // FFI conversion functions

    /// Engine representation pointing into a private copy of the strings, valid as long as the returned value lives.
    pub(crate) fn to_sys(&self) -> PropertyInfoSys {
        let name = self.property_name.clone();
        let class_name = self.class_name.to_string_name();
        let hint_string = self.hint_info.hint_string.clone();

        let raw = sys::GDExtensionPropertyInfo {
            type_: self.variant_type.sys(),
            name: sys::force_mut_ptr(name.string_sys()),
            class_name: sys::force_mut_ptr(class_name.string_sys()),
            hint: self.hint_info.hint.ord(),
            hint_string: sys::force_mut_ptr(hint_string.string_sys()),
            usage: self.usage.ord(),
        };

        PropertyInfoSys {
            raw,
            _name: name,
            _class_name: class_name,
            _hint_string: hint_string,
        }
    }

    /// Overwrites an engine-owned property info with the values of `self`, assigning into the engine's own strings.
    ///
    /// The class name is only written if `self` has one.
    ///
    /// # Safety
    /// `property_info_ptr` must be valid, with `name` and `hint_string` pointing to engine values of their types.
    pub(crate) unsafe fn write_into_property_info_ptr(
        &self,
        property_info_ptr: *mut sys::GDExtensionPropertyInfo,
    ) {
        let ptr = &mut *property_info_ptr;

        ptr.usage = self.usage.ord();
        ptr.hint = self.hint_info.hint.ord();
        ptr.type_ = self.variant_type.sys();

        self.property_name.assign_to_string_sys(ptr.name);
        self.hint_info.hint_string.assign_to_string_sys(ptr.hint_string);

        if !self.class_name.is_none() && !ptr.class_name.is_null() {
            self.class_name
                .to_string_name()
                .assign_to_string_sys(ptr.class_name);
        }
    }

    /// Copies an engine-owned property info. The class name is not read back.
    ///
    /// # Safety
    /// `property_info_ptr` must be valid, with `name` and `hint_string` pointing to engine values of their types.
    pub(crate) unsafe fn new_from_sys(property_info_ptr: *const sys::GDExtensionPropertyInfo) -> Self {
        let ptr = *property_info_ptr;

        Self {
            variant_type: VariantType::from_sys(ptr.type_),
            class_name: ClassName::none(),
            property_name: StringName::new_from_string_sys(ptr.name),
            hint_info: PropertyHintInfo {
                hint: PropertyHint::from_ord(ptr.hint),
                hint_string: GString::new_from_string_sys(ptr.hint_string),
            },
            usage: PropertyUsageFlags::from_ord(ptr.usage),
        }
    }
}

/// `GDExtensionPropertyInfo` together with the strings its pointers refer to.
pub(crate) struct PropertyInfoSys {
    raw: sys::GDExtensionPropertyInfo,
    _name: StringName,
    _class_name: StringName,
    _hint_string: GString,
}

impl PropertyInfoSys {
    pub fn raw(&self) -> &sys::GDExtensionPropertyInfo {
        &self.raw
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Info needed by Godot, for how to export a type to the editor.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PropertyHintInfo {
    pub hint: PropertyHint,
    pub hint_string: GString,
}

impl PropertyHintInfo {
    /// Create a new `PropertyHintInfo` with a property hint of [`PROPERTY_HINT_NONE`](PropertyHint::NONE), and no hint string.
    pub fn none() -> Self {
        Self {
            hint: PropertyHint::NONE,
            hint_string: GString::new(),
        }
    }

    /// Numeric range, shown as a slider in the editor. `range` is the textual `"min,max"` form.
    pub fn range(range: &str) -> Self {
        Self {
            hint: PropertyHint::RANGE,
            hint_string: GString::from(range),
        }
    }

    /// Use for `#[var]` and `#[export]` properties of typed arrays.
    pub fn array_element<T: ArrayElement>() -> Self {
        if !T::is_typed_element() {
            return Self::none();
        }

        Self {
            hint: PropertyHint::ARRAY_TYPE,
            hint_string: GString::from(T::element_type_string()),
        }
    }

    /// Use for `#[var]` properties whose type hint is just the type name.
    pub fn type_name<T: GodotType>() -> Self {
        Self {
            hint: PropertyHint::NONE,
            hint_string: GString::from(T::godot_type_name()),
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Engine enums

/// Godot enum name: `PropertyHint`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct PropertyHint {
    ord: u32,
}

macro_rules! property_hints {
    ($( $NAME:ident = $ord:literal, )*) => {
        impl PropertyHint {
            $(
                pub const $NAME: Self = Self { ord: $ord };
            )*

            pub fn as_str(&self) -> &'static str {
                match self.ord {
                    $( $ord => stringify!($NAME), )*
                    _ => "(unknown)",
                }
            }
        }
    };
}

property_hints! {
    NONE = 0,
    RANGE = 1,
    ENUM = 2,
    ENUM_SUGGESTION = 3,
    EXP_EASING = 4,
    LINK = 5,
    FLAGS = 6,
    LAYERS_2D_RENDER = 7,
    LAYERS_2D_PHYSICS = 8,
    LAYERS_2D_NAVIGATION = 9,
    LAYERS_3D_RENDER = 10,
    LAYERS_3D_PHYSICS = 11,
    LAYERS_3D_NAVIGATION = 12,
    FILE = 13,
    DIR = 14,
    GLOBAL_FILE = 15,
    GLOBAL_DIR = 16,
    RESOURCE_TYPE = 17,
    MULTILINE_TEXT = 18,
    EXPRESSION = 19,
    PLACEHOLDER_TEXT = 20,
    COLOR_NO_ALPHA = 21,
    OBJECT_ID = 22,
    TYPE_STRING = 23,
    NODE_PATH_TO_EDITED_NODE = 24,
    OBJECT_TOO_BIG = 25,
    NODE_PATH_VALID_TYPES = 26,
    SAVE_FILE = 27,
    GLOBAL_SAVE_FILE = 28,
    INT_IS_OBJECTID = 29,
    INT_IS_POINTER = 30,
    ARRAY_TYPE = 31,
    LOCALE_ID = 32,
    LOCALIZABLE_STRING = 33,
    NODE_TYPE = 34,
    HIDE_QUATERNION_EDIT = 35,
    PASSWORD = 36,
}

impl PropertyHint {
    /// Unknown ordinals are kept as-is; the engine may add hints in newer versions.
    pub fn from_ord(ord: u32) -> Self {
        Self { ord }
    }

    pub fn ord(self) -> u32 {
        self.ord
    }
}

impl fmt::Debug for PropertyHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyHint::{}", self.as_str())
    }
}

/// Godot bitfield name: `PropertyUsageFlags`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PropertyUsageFlags {
    ord: u32,
}

impl PropertyUsageFlags {
    pub const NONE: Self = Self { ord: 0 };
    pub const STORAGE: Self = Self { ord: 2 };
    pub const EDITOR: Self = Self { ord: 4 };
    pub const INTERNAL: Self = Self { ord: 8 };
    pub const CHECKABLE: Self = Self { ord: 16 };
    pub const CHECKED: Self = Self { ord: 32 };
    pub const GROUP: Self = Self { ord: 64 };
    pub const CATEGORY: Self = Self { ord: 128 };
    pub const SUBGROUP: Self = Self { ord: 256 };
    pub const READ_ONLY: Self = Self { ord: 8192 };
    pub const SCRIPT_VARIABLE: Self = Self { ord: 4096 };
    pub const NIL_IS_VARIANT: Self = Self { ord: 131072 };
    pub const DEFAULT: Self = Self { ord: 6 };

    pub fn from_ord(ord: u32) -> Self {
        Self { ord }
    }

    pub fn ord(self) -> u32 {
        self.ord
    }

    pub fn is_set(self, flag: Self) -> bool {
        self.ord & flag.ord == flag.ord
    }
}

impl BitOr for PropertyUsageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            ord: self.ord | rhs.ord,
        }
    }
}

impl BitOrAssign for PropertyUsageFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_flags_combine() {
        let usage = PropertyUsageFlags::STORAGE | PropertyUsageFlags::EDITOR;

        assert_eq!(usage, PropertyUsageFlags::DEFAULT);
        assert!(usage.is_set(PropertyUsageFlags::EDITOR));
        assert!(!usage.is_set(PropertyUsageFlags::GROUP));
    }

    #[test]
    fn hint_names() {
        assert_eq!(PropertyHint::RANGE.ord(), 1);
        assert_eq!(PropertyHint::ARRAY_TYPE.as_str(), "ARRAY_TYPE");
        assert_eq!(format!("{:?}", PropertyHint::from_ord(999)), "PropertyHint::(unknown)");
    }
}
