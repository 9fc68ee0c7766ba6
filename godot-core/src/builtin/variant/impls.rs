/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use godot_ffi as sys;
use sys::VariantType;

use super::Variant;
use crate::meta::error::ConvertError;
use crate::meta::{
    ArrayElement, GodotFfiVariant, GodotType, PropertyHintInfo, PropertyInfo, PropertyUsageFlags,
};

// Variants cross the pointer-call boundary as their own 24 bytes.
impl GodotFfiVariant for sys::OpaqueVariant {
    fn ffi_to_variant(&self) -> Variant {
        // SAFETY: `self` is a valid variant; the copy is independent.
        unsafe { Variant::borrow_var_sys(self.sys()) }.clone()
    }

    fn ffi_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        Ok(variant.clone().into_opaque())
    }

    unsafe fn ffi_copy_from_ptr(ptr: sys::GDExtensionConstTypePtr) -> Self {
        Variant::borrow_var_sys(ptr).clone().into_opaque()
    }
}

crate::impl_godot_as_self!(Variant);

impl GodotType for Variant {
    type Ffi = sys::OpaqueVariant;

    fn to_ffi(&self) -> Self::Ffi {
        self.opaque()
    }

    fn into_ffi(self) -> Self::Ffi {
        self.into_opaque()
    }

    fn try_from_ffi(ffi: Self::Ffi) -> Result<Self, ConvertError> {
        Ok(Variant::from_opaque(ffi))
    }

    fn property_info(property_name: &str) -> PropertyInfo {
        PropertyInfo {
            variant_type: VariantType::Nil,
            class_name: crate::meta::ClassName::none(),
            property_name: property_name.into(),
            hint_info: PropertyHintInfo::none(),
            usage: PropertyUsageFlags::DEFAULT | PropertyUsageFlags::NIL_IS_VARIANT,
        }
    }

    fn godot_type_name() -> String {
        "Variant".to_string()
    }

    // Any variant, including Nil, is a valid `Variant`.
    fn nil_value() -> Option<Self> {
        Some(Variant::nil())
    }

    fn try_from_variant_via(variant: &Variant) -> Result<Self, ConvertError> {
        Ok(variant.clone())
    }
}

impl ArrayElement for Variant {
    fn is_typed_element() -> bool {
        false
    }
}
