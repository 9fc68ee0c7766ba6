/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Meta-information about variant types, properties, class names and call signatures.

mod class_name;
mod godot_convert;
mod method_bind;
mod param_tuple;
mod property_info;
mod signature;

pub(crate) mod sealed;
pub(crate) mod traits;

pub mod error;
pub use class_name::ClassName;
pub use godot_convert::{FromGodot, GodotConvert, ToGodot};
pub use method_bind::{BuiltinMethodBind, ClassMethodBind};
pub use param_tuple::{InParamTuple, OutParamTuple, ParamTuple};
pub use property_info::{PropertyHint, PropertyHintInfo, PropertyInfo, PropertyUsageFlags};
pub use traits::{ArrayElement, GodotType, PackedArrayElement};

pub(crate) use property_info::PropertyInfoSys;

#[doc(hidden)]
pub use traits::GodotFfiVariant;

#[doc(hidden)]
pub use signature::*;

#[cfg(feature = "trace")]
pub use signature::trace;

/// Clears every cache that holds engine pointers. Runs on deinitialization.
pub(crate) fn cleanup() {
    method_bind::cleanup();
    class_name::cleanup();
}
