/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use godot_ffi as sys;

use crate::builtin::Variant;
use crate::meta::error::{ConvertError, FromFfiError, FromVariantError};
use crate::meta::traits::impl_ffi_variant_plain;
use crate::meta::{ArrayElement, GodotFfiVariant, GodotType};

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Scalars

impl_ffi_variant_plain! {
    bool,
    i64 => sys::GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_INT64,
    f64 => sys::GDEXTENSION_METHOD_ARGUMENT_METADATA_REAL_IS_DOUBLE,
}

macro_rules! impl_godot_native {
    ($( $T:ty ),*) => {
        $(
            crate::impl_godot_as_self!($T);

            impl GodotType for $T {
                type Ffi = $T;

                fn to_ffi(&self) -> Self::Ffi {
                    *self
                }

                fn into_ffi(self) -> Self::Ffi {
                    self
                }

                fn try_from_ffi(ffi: Self::Ffi) -> Result<Self, ConvertError> {
                    Ok(ffi)
                }

                fn nil_value() -> Option<Self> {
                    Some(Self::default())
                }
            }

            impl ArrayElement for $T {}
        )*
    };
}

impl_godot_native!(bool, i64, f64);

macro_rules! impl_godot_scalar {
    ($T:ty as $Via:ty, $err:expr, $param_metadata:expr) => {
        crate::impl_godot_as_self!($T);

        impl GodotType for $T {
            type Ffi = $Via;

            fn to_ffi(&self) -> Self::Ffi {
                (*self).into()
            }

            fn into_ffi(self) -> Self::Ffi {
                self.into()
            }

            fn try_from_ffi(ffi: Self::Ffi) -> Result<Self, ConvertError> {
                // The std error only says "out of range integral type conversion attempted"; the value is more useful.
                Self::try_from(ffi).map_err(|_rust_err| $err.into_error(ffi))
            }

            fn param_metadata() -> sys::GDExtensionClassMethodArgumentMetadata {
                $param_metadata
            }

            fn nil_value() -> Option<Self> {
                Some(0)
            }
        }

        impl ArrayElement for $T {}
    };
}

impl_godot_scalar!(
    i8 as i64,
    FromFfiError::I8,
    sys::GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_INT8
);
impl_godot_scalar!(
    u8 as i64,
    FromFfiError::U8,
    sys::GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_UINT8
);
impl_godot_scalar!(
    i16 as i64,
    FromFfiError::I16,
    sys::GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_INT16
);
impl_godot_scalar!(
    u16 as i64,
    FromFfiError::U16,
    sys::GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_UINT16
);
impl_godot_scalar!(
    i32 as i64,
    FromFfiError::I32,
    sys::GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_INT32
);
impl_godot_scalar!(
    u32 as i64,
    FromFfiError::U32,
    sys::GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_UINT32
);

crate::impl_godot_as_self!(f32);

impl GodotType for f32 {
    type Ffi = f64;

    fn to_ffi(&self) -> Self::Ffi {
        f64::from(*self)
    }

    fn into_ffi(self) -> Self::Ffi {
        f64::from(self)
    }

    // Lossy by definition; Godot stores every float as 64 bits.
    fn try_from_ffi(ffi: Self::Ffi) -> Result<Self, ConvertError> {
        Ok(ffi as f32)
    }

    fn param_metadata() -> sys::GDExtensionClassMethodArgumentMetadata {
        sys::GDEXTENSION_METHOD_ARGUMENT_METADATA_REAL_IS_FLOAT
    }

    fn nil_value() -> Option<Self> {
        Some(0.0)
    }
}

impl ArrayElement for f32 {}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Unit type, used for methods without return value

impl GodotFfiVariant for () {
    fn ffi_to_variant(&self) -> Variant {
        Variant::nil()
    }

    fn ffi_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        if variant.is_nil() {
            return Ok(());
        }

        Err(FromVariantError::BadType {
            expected: crate::builtin::VariantType::Nil,
            actual: variant.get_type(),
        }
        .into_error(variant))
    }

    unsafe fn ffi_copy_from_ptr(_ptr: sys::GDExtensionConstTypePtr) -> Self {}
}

crate::impl_godot_as_self!(());

impl GodotType for () {
    type Ffi = ();

    fn to_ffi(&self) -> Self::Ffi {}

    fn into_ffi(self) -> Self::Ffi {}

    fn try_from_ffi(_ffi: Self::Ffi) -> Result<Self, ConvertError> {
        Ok(())
    }

    fn return_info() -> Option<crate::registry::method::MethodParamOrReturnInfo> {
        None
    }

    fn godot_type_name() -> String {
        "void".to_string()
    }

    fn nil_value() -> Option<Self> {
        Some(())
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Rust types without a native Godot counterpart

impl crate::meta::GodotConvert for String {
    type Via = crate::builtin::GString;
}

impl crate::meta::ToGodot for String {
    fn to_godot(&self) -> Self::Via {
        crate::builtin::GString::from(self.as_str())
    }
}

impl crate::meta::FromGodot for String {
    fn try_from_godot(via: Self::Via) -> Result<Self, ConvertError> {
        Ok(via.to_string())
    }
}

impl<T: crate::meta::ArrayElement> crate::meta::GodotConvert for Vec<T> {
    type Via = crate::builtin::Array<T>;
}

impl<T: crate::meta::ArrayElement> crate::meta::ToGodot for Vec<T> {
    fn to_godot(&self) -> Self::Via {
        crate::builtin::Array::from(self.as_slice())
    }
}

impl<T: crate::meta::ArrayElement> crate::meta::FromGodot for Vec<T> {
    fn try_from_godot(via: Self::Via) -> Result<Self, ConvertError> {
        Ok(via.to_vec())
    }
}
