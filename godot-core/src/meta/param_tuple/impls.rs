/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

#![allow(unused_attributes)]

use std::fmt;

use godot_ffi as sys;

use crate::builtin::Variant;
use crate::meta::error::{CallError, ConvertError};
use crate::meta::signature::CallResult;
use crate::meta::{
    CallContext, FromGodot, GodotConvert, GodotFfiVariant, GodotType, InParamTuple,
    OutParamTuple, ParamTuple, ToGodot,
};
use crate::registry::method::MethodParamOrReturnInfo;

macro_rules! count_idents {
    () => { 0 };
    ($id:ident $($rest:ident)*) => { 1 + count_idents!($($rest)*)};
}

macro_rules! impl_param_tuple {
    ($(($p:ident, $n:tt): $P:ident),*) => {
        impl<$($P),*> ParamTuple for ($($P,)*) where $($P: GodotConvert + fmt::Debug),* {
            const LEN: usize = count_idents!($($P)*);

            fn param_info(index: usize, param_name: &str) -> Option<MethodParamOrReturnInfo> {
                match index {
                    $(
                        $n => Some($P::Via::argument_info(param_name)),
                    )*
                    _ => None,
                }
            }

            fn format_args(&self) -> String {
                format!(
                    concat!("" $(, "{", $n, ":?}",)", "*),
                    $(self.$n),*
                )
            }
        }

        impl<$($P),*> InParamTuple for ($($P,)*) where $($P: FromGodot + fmt::Debug),* {
            unsafe fn from_varcall_args(
                args_ptr: *const sys::GDExtensionConstVariantPtr,
                call_ctx: &CallContext,
            ) -> CallResult<Self> {
                Ok((
                    $(
                        varcall_arg::<$P>(*args_ptr.add($n), call_ctx, $n)?,
                    )*
                ))
            }

            unsafe fn from_ptrcall_args(
                args_ptr: *const sys::GDExtensionConstTypePtr,
                call_ctx: &CallContext,
            ) -> Self {
                (
                    $(
                        ptrcall_arg::<$P>(*args_ptr.add($n), call_ctx, $n),
                    )*
                )
            }

            fn try_from_variant_array(array: &[&Variant], call_ctx: &CallContext) -> CallResult<Self> {
                CallError::check_arg_count(call_ctx, array.len(), Self::LEN)?;

                Ok((
                    $(
                        $P::try_from_variant(array[$n])
                            .map_err(|err| CallError::failed_param_conversion::<$P>(call_ctx, $n, err))?,
                    )*
                ))
            }
        }

        impl<$($P),*> OutParamTuple for ($($P,)*) where $($P: ToGodot + fmt::Debug),* {
            type Ffi = ($( <$P::Via as GodotType>::Ffi, )*);

            fn with_ffi_args<F, R>(&self, f: F) -> R
            where
                F: FnOnce(Self::Ffi) -> R,
            {
                // Converted values own their engine resources until `f` returns; the FFI tuple only borrows them.
                let vias = (
                    $(
                        ToGodot::to_godot(&self.$n),
                    )*
                );

                let ffi_args = (
                    $(
                        GodotType::to_ffi(&vias.$n),
                    )*
                );

                f(ffi_args)
            }

            fn to_variant_array(&self) -> Vec<Variant> {
                let ($($p,)*) = self;

                vec![
                    $( $p.to_variant(), )*
                ]
            }
        }
    };
}

#[allow(unused_variables, unused_mut, clippy::unused_unit)]
mod unit_impl {
    use super::*;
    impl_param_tuple!();
}
impl_param_tuple!((p0, 0): P0);
impl_param_tuple!((p0, 0): P0, (p1, 1): P1);
impl_param_tuple!((p0, 0): P0, (p1, 1): P1, (p2, 2): P2);
impl_param_tuple!((p0, 0): P0, (p1, 1): P1, (p2, 2): P2, (p3, 3): P3);
impl_param_tuple!((p0, 0): P0, (p1, 1): P1, (p2, 2): P2, (p3, 3): P3, (p4, 4): P4);
impl_param_tuple!((p0, 0): P0, (p1, 1): P1, (p2, 2): P2, (p3, 3): P3, (p4, 4): P4, (p5, 5): P5);
impl_param_tuple!((p0, 0): P0, (p1, 1): P1, (p2, 2): P2, (p3, 3): P3, (p4, 4): P4, (p5, 5): P5, (p6, 6): P6);
impl_param_tuple!((p0, 0): P0, (p1, 1): P1, (p2, 2): P2, (p3, 3): P3, (p4, 4): P4, (p5, 5): P5, (p6, 6): P6, (p7, 7): P7);
impl_param_tuple!((p0, 0): P0, (p1, 1): P1, (p2, 2): P2, (p3, 3): P3, (p4, 4): P4, (p5, 5): P5, (p6, 6): P6, (p7, 7): P7, (p8, 8): P8);
impl_param_tuple!((p0, 0): P0, (p1, 1): P1, (p2, 2): P2, (p3, 3): P3, (p4, 4): P4, (p5, 5): P5, (p6, 6): P6, (p7, 7): P7, (p8, 8): P8, (p9, 9): P9);

unsafe fn ptrcall_arg<P: FromGodot>(
    arg_ptr: sys::GDExtensionConstTypePtr,
    call_ctx: &CallContext,
    index: usize,
) -> P {
    let ffi = <P::Via as GodotType>::Ffi::ffi_copy_from_ptr(arg_ptr);

    <P::Via as GodotType>::try_from_ffi(ffi)
        .and_then(P::try_from_godot)
        .unwrap_or_else(|err| param_error::<P>(call_ctx, index, err))
}

unsafe fn varcall_arg<P: FromGodot>(
    arg: sys::GDExtensionConstVariantPtr,
    call_ctx: &CallContext,
    index: usize,
) -> CallResult<P> {
    let variant = Variant::borrow_var_sys(arg);

    P::try_from_variant(variant)
        .map_err(|err| CallError::failed_param_conversion::<P>(call_ctx, index, err))
}

fn param_error<P>(call_ctx: &CallContext, index: usize, err: ConvertError) -> ! {
    let param_ty = std::any::type_name::<P>();
    panic!("in function `{call_ctx}` at parameter [{index}] of type {param_ty}: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_args_test() {
        assert_eq!(&().format_args(), "");
        assert_eq!(&(1i64, 2i64, 3i64).format_args(), "1, 2, 3");
    }

    #[test]
    fn count_idents_test() {
        assert_eq!(2, count_idents!(a b));
        assert_eq!(0, count_idents!());
        assert_eq!(5, count_idents!(a b b a d));
    }

    #[test]
    fn tuple_len() {
        assert_eq!(<(i64, bool, f64) as ParamTuple>::LEN, 3);
        assert_eq!(<() as ParamTuple>::LEN, 0);
    }
}
