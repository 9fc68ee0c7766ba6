/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use godot_ffi as sys;

use crate::builtin::{GString, StringName, Variant, VariantType};
use crate::meta::error::{ConvertError, FromVariantError};
use crate::meta::{
    sealed, ClassName, FromGodot, GodotConvert, PropertyHint, PropertyHintInfo, PropertyInfo,
    PropertyUsageFlags, ToGodot,
};
use crate::registry::method::MethodParamOrReturnInfo;

/// Conversion of an FFI representation to and from [`Variant`], plus access to values the engine lends.
///
/// Implemented once per pointer-call representation: plain bytes, opaque handle bytes, object pointers and variants.
#[doc(hidden)]
pub trait GodotFfiVariant: sys::FrameSlot {
    /// Writes a new variant holding a copy of `self`. `self` stays owned by the caller.
    fn ffi_to_variant(&self) -> Variant;

    /// Extracts an owned value of exactly this type from the variant.
    fn ffi_from_variant(variant: &Variant) -> Result<Self, ConvertError>;

    /// Owned copy of a value behind a pointer the engine passed in a pointer call.
    ///
    /// # Safety
    /// `ptr` must point to a valid value of this type.
    unsafe fn ffi_copy_from_ptr(ptr: sys::GDExtensionConstTypePtr) -> Self;

    fn default_param_metadata() -> sys::GDExtensionClassMethodArgumentMetadata {
        sys::GDEXTENSION_METHOD_ARGUMENT_METADATA_NONE
    }
}

/// Type that is directly representable in the engine.
///
/// This trait cannot be implemented for custom user types; for those, [`GodotConvert`] exists instead.
/// A type implements `GodotType` when Godot has an immediate, native representation for it. For instance:
/// - [`i64`] implements `GodotType`, since it can be directly represented by Godot's `int` type.
/// - But [`VariantType`] does not implement `GodotType`. While it is an enum Godot uses, we have no native way to indicate
///   to Godot that a value should be one of the variants of `VariantType`.
//
// Types implementing this trait don't need to fully represent their Godot counterpart. `i32` cannot hold every value of Godot's
// `int`, but it is a `GodotType` because the metadata of such values tells the engine that they are 32 bits large.
pub trait GodotType: GodotConvert<Via = Self> + ToGodot + FromGodot + sealed::Sealed + 'static {
    #[doc(hidden)]
    type Ffi: GodotFfiVariant;

    /// Representation borrowed from `self`: valid while `self` lives, never released by the receiver.
    #[doc(hidden)]
    fn to_ffi(&self) -> Self::Ffi;

    /// Representation the receiver owns and must release.
    #[doc(hidden)]
    fn into_ffi(self) -> Self::Ffi;

    /// Takes ownership of `ffi`.
    #[doc(hidden)]
    fn try_from_ffi(ffi: Self::Ffi) -> Result<Self, ConvertError>;

    #[doc(hidden)]
    fn from_ffi(ffi: Self::Ffi) -> Self {
        Self::try_from_ffi(ffi).unwrap_or_else(|err| panic!("GodotType::from_ffi() failed: {err}"))
    }

    #[doc(hidden)]
    fn param_metadata() -> sys::GDExtensionClassMethodArgumentMetadata {
        Self::Ffi::default_param_metadata()
    }

    #[doc(hidden)]
    fn variant_type() -> VariantType {
        <Self::Ffi as sys::FrameSlot>::VARIANT_TYPE
    }

    #[doc(hidden)]
    fn class_name() -> ClassName {
        ClassName::none()
    }

    #[doc(hidden)]
    fn property_info(property_name: &str) -> PropertyInfo {
        PropertyInfo {
            variant_type: Self::variant_type(),
            class_name: Self::class_name(),
            property_name: StringName::from(property_name),
            hint_info: Self::property_hint_info(),
            usage: PropertyUsageFlags::DEFAULT,
        }
    }

    #[doc(hidden)]
    fn property_hint_info() -> PropertyHintInfo {
        // The default implementation is mostly good for builtin types.
        PropertyHintInfo::none()
    }

    #[doc(hidden)]
    fn argument_info(property_name: &str) -> MethodParamOrReturnInfo {
        MethodParamOrReturnInfo::new(Self::property_info(property_name), Self::param_metadata())
    }

    #[doc(hidden)]
    fn return_info() -> Option<MethodParamOrReturnInfo> {
        Some(MethodParamOrReturnInfo::new(
            Self::property_info(""),
            Self::param_metadata(),
        ))
    }

    /// Returns a string representation of the Godot type name, as it is used in several property hint contexts.
    ///
    /// Examples:
    /// - `MyClass` for objects
    /// - `StringName`, `AABB` or `int` for builtins
    /// - `Array` for arrays
    #[doc(hidden)]
    fn godot_type_name() -> String {
        Self::variant_type().godot_name().to_string()
    }

    /// Value produced when a `Nil` variant is extracted as this type, if the type has one.
    #[doc(hidden)]
    fn nil_value() -> Option<Self> {
        None
    }

    /// Extraction from a variant, shared by every [`FromGodot`] implementation that goes through this type.
    #[doc(hidden)]
    fn try_from_variant_via(variant: &Variant) -> Result<Self, ConvertError> {
        if variant.is_nil() {
            if let Some(zero) = Self::nil_value() {
                return Ok(zero);
            }
        }

        let ffi = Self::Ffi::ffi_from_variant(variant)?;
        Self::try_from_ffi(ffi)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Marker trait to identify types that can be stored in [`Array<T>`][crate::builtin::Array].
///
/// The types, for which this trait is implemented, overlap mostly with [`GodotType`].
///
/// Notable differences are:
/// - Only `VariantArray`, not `Array<T>` is allowed (typed arrays cannot be nested).
/// - `Option` is only supported for `Option<Gd<T>>`, but not e.g. `Option<i32>`.
#[diagnostic::on_unimplemented(
    message = "`Array<T>` can only store element types supported in Godot arrays (no nesting).",
    label = "has invalid element type"
)]
pub trait ArrayElement: GodotType + sealed::Sealed {
    /// Hint string of a typed array property holding this element type.
    #[doc(hidden)]
    fn element_type_string() -> String {
        Self::godot_type_name()
    }

    /// Whether arrays of this type are typed on the engine side. Only `Variant` produces untyped arrays.
    #[doc(hidden)]
    fn is_typed_element() -> bool {
        true
    }
}

/// Marker trait to identify types that can be stored in `Packed*Array` types.
#[diagnostic::on_unimplemented(
    message = "`Packed*Array` can only store element types supported in Godot packed arrays.",
    label = "has invalid element type"
)]
pub trait PackedArrayElement: GodotType + Clone + std::fmt::Debug + sealed::Sealed {
    /// Engine representation of the packed array holding this element type.
    #[doc(hidden)]
    type Array: GodotFfiVariant;

    /// Layout of one element inside the engine's buffer.
    #[doc(hidden)]
    type Raw: Copy + 'static;

    /// Hash of the array's `push_back` method, which differs per element type.
    #[doc(hidden)]
    const PUSH_BACK_HASH: i64;

    /// Address of element `index` in the engine buffer.
    ///
    /// # Safety
    /// `array` must point to a valid `Self::Array`, and `index` must be in bounds.
    #[doc(hidden)]
    unsafe fn element_ptr(array: sys::GDExtensionTypePtr, index: i64) -> *mut Self::Raw;

    /// Owned copy of an element.
    ///
    /// # Safety
    /// `raw` must point to a valid element.
    #[doc(hidden)]
    unsafe fn from_raw(raw: *const Self::Raw) -> Self;

    /// Overwrites an element with a copy of `value`.
    ///
    /// # Safety
    /// `dst` must point to a valid element of a uniquely borrowed array.
    #[doc(hidden)]
    unsafe fn assign_raw(dst: *mut Self::Raw, value: &Self);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Shared implementations of GodotFfiVariant

/// `ffi_to_variant()` through the engine's variant-from-type constructor.
pub(crate) fn ffi_to_variant_via_type<F: sys::FrameSlot>(ffi: &F) -> Variant {
    // SAFETY: `F` is the pointer-call representation of `F::VARIANT_TYPE`; the constructor copies it.
    unsafe {
        let ops = sys::builtin_ops(F::VARIANT_TYPE);
        Variant::new_with_var_uninit(|var_ptr| {
            (ops.from_type)(
                var_ptr,
                sys::force_mut_ptr(ffi as *const F) as sys::GDExtensionTypePtr,
            )
        })
    }
}

/// `ffi_from_variant()` through the engine's type-from-variant constructor, after checking the variant's type.
pub(crate) fn ffi_from_variant_via_type<F: sys::FrameSlot>(
    variant: &Variant,
) -> Result<F, ConvertError> {
    let actual = variant.get_type();
    if actual != F::VARIANT_TYPE {
        return Err(FromVariantError::BadType {
            expected: F::VARIANT_TYPE,
            actual,
        }
        .into_error(variant));
    }

    let mut out = std::mem::MaybeUninit::<F>::uninit();

    // SAFETY: the variant holds a value of `F::VARIANT_TYPE`; the constructor initializes `out` with an owned copy.
    unsafe {
        let ops = sys::builtin_ops(F::VARIANT_TYPE);
        (ops.to_type)(
            out.as_mut_ptr() as sys::GDExtensionUninitializedTypePtr,
            sys::force_mut_ptr(variant.var_sys()),
        );
        Ok(out.assume_init())
    }
}

/// Hint for a property holding an object of class `class_name`: resources and nodes get pickers in the editor.
pub(crate) fn object_hint_info(class_name: ClassName, is_resource: bool, is_node: bool) -> PropertyHintInfo {
    let hint = if is_resource {
        PropertyHint::RESOURCE_TYPE
    } else if is_node {
        PropertyHint::NODE_TYPE
    } else {
        return PropertyHintInfo::none();
    };

    PropertyHintInfo {
        hint,
        hint_string: GString::from(class_name.as_str()),
    }
}

/// Implements [`GodotFfiVariant`] for plain types whose pointer-call representation is their Rust layout.
macro_rules! impl_ffi_variant_plain {
    ($( $T:ty $(=> $metadata:expr)? ),* $(,)?) => {
        $(
            impl $crate::meta::GodotFfiVariant for $T {
                fn ffi_to_variant(&self) -> $crate::builtin::Variant {
                    $crate::meta::traits::ffi_to_variant_via_type(self)
                }

                fn ffi_from_variant(
                    variant: &$crate::builtin::Variant,
                ) -> Result<Self, $crate::meta::error::ConvertError> {
                    $crate::meta::traits::ffi_from_variant_via_type(variant)
                }

                unsafe fn ffi_copy_from_ptr(ptr: $crate::sys::GDExtensionConstTypePtr) -> Self {
                    std::ptr::read(ptr as *const Self)
                }

                $(
                    fn default_param_metadata() -> $crate::sys::GDExtensionClassMethodArgumentMetadata {
                        $metadata
                    }
                )?
            }
        )*
    };
}

pub(crate) use impl_ffi_variant_plain;
