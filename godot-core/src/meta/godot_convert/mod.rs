/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod impls;

use crate::builtin::Variant;
use crate::meta::error::ConvertError;
use crate::meta::traits::GodotFfiVariant;
use crate::meta::GodotType;

/// Names the engine-representable type a Rust type travels as.
///
/// `Via` is the [`GodotType`] that crosses the boundary in pointer calls and inside variants. Engine types use themselves;
/// enums and newtypes use an integer or string representation.
#[doc(alias = "via")]
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot cross the engine boundary: `#[func]` signatures and `#[var]`/`#[export]` fields need `GodotConvert`",
    note = "implement `GodotConvert` with a `Via` type the engine knows"
)]
pub trait GodotConvert {
    type Via: GodotType;
}

/// Conversion of a Rust value into its engine representation.
///
/// Conversions are expected to be pure, and to round-trip with [`FromGodot`] where both exist.
pub trait ToGodot: Sized + GodotConvert {
    fn to_godot(&self) -> Self::Via;

    /// Consuming variant of [`to_godot()`](Self::to_godot); saves a copy for types that own engine handles.
    fn into_godot(self) -> Self::Via {
        self.to_godot()
    }

    /// Builds an engine-side copy wrapped in a new [`Variant`]. The variant owns its payload.
    fn to_variant(&self) -> Variant {
        self.to_godot().to_ffi().ffi_to_variant()
    }
}

/// Conversion from the engine representation back into a Rust value.
pub trait FromGodot: Sized + GodotConvert {
    fn try_from_godot(via: Self::Via) -> Result<Self, ConvertError>;

    /// ⚠️ Like [`try_from_godot()`](Self::try_from_godot), but panics on failure.
    fn from_godot(via: Self::Via) -> Self {
        Self::try_from_godot(via)
            .unwrap_or_else(|err| panic!("FromGodot::from_godot() failed: {err}"))
    }

    /// Extracts a value from a variant.
    ///
    /// The variant must hold exactly the `Via` type, with one exception: `Nil` yields the zero value of value types
    /// (`0`, `false`, empty strings, containers and packed arrays, zero vectors). Object types reject `Nil` unless the target is
    /// `Option<Gd<T>>`.
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        Self::try_from_godot(Self::Via::try_from_variant_via(variant)?)
    }

    /// ⚠️ Like [`try_from_variant()`](Self::try_from_variant), but panics on failure.
    fn from_variant(variant: &Variant) -> Self {
        Self::try_from_variant(variant)
            .unwrap_or_else(|err| panic!("FromGodot::from_variant() failed -- {err}"))
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Impls

#[macro_export]
macro_rules! impl_godot_as_self {
    ($T:ty) => {
        impl $crate::meta::GodotConvert for $T {
            type Via = $T;
        }

        impl $crate::meta::ToGodot for $T {
            #[inline]
            fn to_godot(&self) -> Self::Via {
                self.clone()
            }

            #[inline]
            fn into_godot(self) -> Self::Via {
                self
            }
        }

        impl $crate::meta::FromGodot for $T {
            #[inline]
            fn try_from_godot(via: Self::Via) -> Result<Self, $crate::meta::error::ConvertError> {
                Ok(via)
            }
        }
    };
}
