/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use godot_ffi as sys;

use crate::builtin::Variant;
use crate::meta::signature::CallResult;
use crate::meta::{CallContext, PropertyInfo};
use crate::registry::method::MethodParamOrReturnInfo;

mod impls;

/// Represents a parameter list as Rust tuple where each tuple element is one parameter.
///
/// This trait only contains metadata for the parameter list, the actual functionality is contained in [`InParamTuple`] and
/// [`OutParamTuple`].
pub trait ParamTuple: Sized {
    /// The number of elements in this parameter list.
    const LEN: usize;

    /// The param info of the parameter at index `index`.
    #[doc(hidden)]
    fn param_info(index: usize, param_name: &str) -> Option<MethodParamOrReturnInfo>;

    /// The property info of the parameter at index `index`.
    fn property_info(index: usize, param_name: &str) -> Option<PropertyInfo> {
        Self::param_info(index, param_name).map(|param| param.info)
    }

    /// Return a string representing the arguments.
    fn format_args(&self) -> String;
}

/// Represents a parameter list that is received from the engine, for functions that Godot calls.
pub trait InParamTuple: ParamTuple {
    /// Converts `args_ptr` to `Self`. The argument count must have been checked before.
    ///
    /// # Safety
    /// `args_ptr` must point to [`Self::LEN`](ParamTuple::LEN) valid variant pointers, alive for the duration of the call.
    #[doc(hidden)]
    unsafe fn from_varcall_args(
        args_ptr: *const sys::GDExtensionConstVariantPtr,
        call_ctx: &CallContext,
    ) -> CallResult<Self>;

    /// Converts `args_ptr` to `Self`. Values are copied, the engine keeps ownership of the originals.
    ///
    /// # Safety
    /// `args_ptr` must point to [`Self::LEN`](ParamTuple::LEN) pointers, each pointing to a valid value of the FFI type of the
    /// corresponding parameter.
    #[doc(hidden)]
    unsafe fn from_ptrcall_args(
        args_ptr: *const sys::GDExtensionConstTypePtr,
        call_ctx: &CallContext,
    ) -> Self;

    /// Converts `array` to `Self` by calling [`try_from_variant`](crate::meta::FromGodot::try_from_variant) on each argument.
    fn try_from_variant_array(array: &[&Variant], call_ctx: &CallContext) -> CallResult<Self>;
}

/// Represents a parameter list that is used to call engine functions.
pub trait OutParamTuple: ParamTuple {
    /// Tuple of the parameters' FFI representations, laid out as the slots of a [`CallFrame`](sys::CallFrame).
    #[doc(hidden)]
    type Ffi: sys::FrameArgs;

    /// Call `f` with the FFI representations of all arguments. They borrow from temporaries that live until `f` returns.
    #[doc(hidden)]
    fn with_ffi_args<F, R>(&self, f: F) -> R
    where
        F: FnOnce(Self::Ffi) -> R;

    /// Converts `self` to an array of [`Variant`]s.
    fn to_variant_array(&self) -> Vec<Variant>;
}
