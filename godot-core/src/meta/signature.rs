/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use godot_ffi as sys;
use sys::CallFrame;

use crate::builtin::Variant;
use crate::meta::error::{CallError, ConvertError};
use crate::meta::{
    BuiltinMethodBind, ClassMethodBind, FromGodot, GodotConvert, GodotType, InParamTuple,
    OutParamTuple, ParamTuple, ToGodot,
};
use crate::obj::GodotClass;
use crate::registry::method::MethodParamOrReturnInfo;

/// Result of a varcall, either inbound or outbound.
pub type CallResult<R> = Result<R, CallError>;

/// Static description of a function signature: parameter tuple `Params` and return type `Ret`.
///
/// Holds all the typed marshalling between the engine's calling conventions and Rust values. Inbound calls (engine to Rust) go through
/// `in_*`, outbound calls (Rust to engine) through `out_*`.
pub struct Signature<Params, Ret> {
    _p: PhantomData<Params>,
    _r: PhantomData<Ret>,
}

impl<Params: ParamTuple, Ret: GodotConvert> Signature<Params, Ret> {
    pub fn param_info(index: usize, param_name: &str) -> Option<MethodParamOrReturnInfo> {
        Params::param_info(index, param_name)
    }

    pub fn return_info() -> Option<MethodParamOrReturnInfo> {
        Ret::Via::return_info()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Inbound calls

impl<Params: InParamTuple, Ret: ToGodot> Signature<Params, Ret> {
    /// Receives a varcall from the engine: checks the argument count, converts every argument and writes the return value.
    ///
    /// # Safety
    /// - `args_ptr` must point to `arg_count` valid variant pointers.
    /// - `ret` must point to an initialized variant.
    pub unsafe fn in_varcall(
        instance_ptr: sys::GDExtensionClassInstancePtr,
        call_ctx: &CallContext,
        args_ptr: *const sys::GDExtensionConstVariantPtr,
        arg_count: i64,
        ret: sys::GDExtensionVariantPtr,
        err: *mut sys::GDExtensionCallError,
        func: impl FnOnce(sys::GDExtensionClassInstancePtr, Params) -> Ret,
    ) -> CallResult<()> {
        #[cfg(feature = "trace")]
        trace::push(true, false, call_ctx);

        CallError::check_arg_count(call_ctx, arg_count as usize, Params::LEN)?;

        let args = Params::from_varcall_args(args_ptr, call_ctx)?;
        let rust_result = func(instance_ptr, args);

        varcall_return::<Ret>(rust_result, ret, err);
        Ok(())
    }

    /// Receives a pointer call from the engine.
    ///
    /// # Safety
    /// - `args_ptr` must point to `Params::LEN` pointers, each to a valid value of the parameter's FFI type.
    /// - `ret` must point to an initialized value of the return type's FFI type (or be null for `()`).
    pub unsafe fn in_ptrcall(
        instance_ptr: sys::GDExtensionClassInstancePtr,
        call_ctx: &CallContext,
        args_ptr: *const sys::GDExtensionConstTypePtr,
        ret: sys::GDExtensionTypePtr,
        func: impl FnOnce(sys::GDExtensionClassInstancePtr, Params) -> Ret,
    ) {
        #[cfg(feature = "trace")]
        trace::push(true, true, call_ctx);

        let args = Params::from_ptrcall_args(args_ptr, call_ctx);

        // Panics from `func` unwind through here; the caller converts them at the boundary.
        ptrcall_return::<Ret>(func(instance_ptr, args), ret);
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Outbound calls

impl<Params: OutParamTuple, Ret: FromGodot> Signature<Params, Ret> {
    /// Calls an engine class method through the pointer-call convention.
    ///
    /// # Safety
    /// `object_ptr` must point to a live object of the bind's class (or be null for static methods).
    pub unsafe fn out_class_ptrcall(
        method_bind: ClassMethodBind,
        object_ptr: sys::GDExtensionObjectPtr,
        args: Params,
    ) -> Ret {
        let call_ctx = CallContext::outbound(method_bind.class_name(), method_bind.method_name());

        #[cfg(feature = "trace")]
        trace::push(false, true, &call_ctx);

        let class_fn = sys::interface_fn!(object_method_bind_ptrcall);

        Self::raw_ptrcall(args, &call_ctx, |arg_ptrs, ret_ptr| {
            class_fn(method_bind.sys(), object_ptr, arg_ptrs.as_ptr(), ret_ptr);
        })
    }

    /// Calls a method of a builtin type (e.g. `Array::size`) through the pointer-call convention.
    ///
    /// # Safety
    /// `type_ptr` must point to a valid value of the builtin type.
    pub unsafe fn out_builtin_ptrcall(
        method_bind: BuiltinMethodBind,
        class_name: &'static str,
        method_name: &'static str,
        type_ptr: sys::GDExtensionTypePtr,
        args: Params,
    ) -> Ret {
        let call_ctx = CallContext::outbound(class_name, method_name);

        #[cfg(feature = "trace")]
        trace::push(false, true, &call_ctx);

        Self::raw_ptrcall(args, &call_ctx, |arg_ptrs, ret_ptr| {
            method_bind.call(type_ptr, arg_ptrs, ret_ptr);
        })
    }

    /// Calls an engine class method with variant arguments. Extra `varargs` are appended after `args`.
    ///
    /// Errors reported by the engine, including those raised inside Rust functions called through it, come back as [`CallError`].
    ///
    /// # Safety
    /// `object_ptr` must point to a live object of the bind's class.
    pub unsafe fn out_class_varcall(
        method_bind: ClassMethodBind,
        object_ptr: sys::GDExtensionObjectPtr,
        args: Params,
        varargs: &[Variant],
    ) -> CallResult<Ret> {
        let call_ctx = CallContext::outbound(method_bind.class_name(), method_bind.method_name());

        #[cfg(feature = "trace")]
        trace::push(false, false, &call_ctx);

        let mut variants = args.to_variant_array();
        variants.extend(varargs.iter().cloned());

        let arg_ptrs: Vec<sys::GDExtensionConstVariantPtr> =
            variants.iter().map(Variant::var_sys).collect();

        let class_fn = sys::interface_fn!(object_method_bind_call);
        let mut err = sys::default_call_error();

        let variant = Variant::new_with_var_uninit(|return_ptr| {
            class_fn(
                method_bind.sys(),
                object_ptr,
                arg_ptrs.as_ptr(),
                arg_ptrs.len() as i64,
                return_ptr,
                &raw mut err,
            );
        });

        CallError::check_out_varcall(&call_ctx, err, &variants)?;

        Ret::try_from_variant(&variant)
            .map_err(|err| CallError::failed_return_conversion::<Ret>(&call_ctx, err))
    }

    unsafe fn raw_ptrcall(
        args: Params,
        call_ctx: &CallContext,
        f: impl FnOnce(&[sys::GDExtensionConstTypePtr], sys::GDExtensionTypePtr),
    ) -> Ret {
        let ffi = args.with_ffi_args(|ffi_args| {
            let mut frame = CallFrame::<Params::Ffi, <Ret::Via as GodotType>::Ffi>::with_args(ffi_args);
            let ret_ptr = frame.ret_slot();

            f(frame.array().as_ref(), ret_ptr);
            frame.take_ret()
        });

        Ret::Via::try_from_ffi(ffi)
            .and_then(Ret::try_from_godot)
            .unwrap_or_else(|err| return_error::<Ret>(call_ctx, err))
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Return value marshalling

/// Writes `ret_val` into an initialized engine variant, replacing its previous content.
unsafe fn varcall_return<R: ToGodot>(
    ret_val: R,
    ret: sys::GDExtensionVariantPtr,
    err: *mut sys::GDExtensionCallError,
) {
    let ret_variant = ret_val.to_variant();
    *(ret as *mut Variant) = ret_variant;
    (*err).error = sys::GDEXTENSION_CALL_OK;
}

/// Writes `ret_val` into an initialized return slot of its FFI type, releasing the previous content.
///
/// A null slot means the caller discards the result; `ret_val` is then dropped on the Rust side.
unsafe fn ptrcall_return<R: ToGodot>(ret_val: R, ret: sys::GDExtensionTypePtr) {
    if ret.is_null() {
        return;
    }

    let ffi = ret_val.into_godot().into_ffi();
    let slot = ret as *mut <R::Via as GodotType>::Ffi;
    sys::FrameSlot::destroy(slot);
    slot.write(ffi);
}

fn return_error<R>(call_ctx: &CallContext, err: ConvertError) -> ! {
    let return_ty = std::any::type_name::<R>();
    panic!("in function `{call_ctx}` at return type {return_ty}: {err}");
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Information about function and method calls.
#[derive(Clone, Debug)]
pub struct CallContext<'a> {
    pub(crate) class_name: Cow<'a, str>,
    pub(crate) function_name: &'a str,
}

impl<'a> CallContext<'a> {
    /// Call from Godot into a user-defined #[func] function.
    pub const fn func(class_name: &'a str, function_name: &'a str) -> Self {
        Self {
            class_name: Cow::Borrowed(class_name),
            function_name,
        }
    }

    /// Call from Godot into a custom Callable.
    pub fn custom_callable(function_name: &'a str) -> Self {
        Self {
            class_name: Cow::Borrowed("<Callable>"),
            function_name,
        }
    }

    /// Outbound call from Rust into the engine, class/builtin APIs.
    pub const fn outbound(class_name: &'a str, function_name: &'a str) -> Self {
        Self {
            class_name: Cow::Borrowed(class_name),
            function_name,
        }
    }

    /// Outbound call from Rust into the engine, via Gd methods.
    pub fn gd<T: GodotClass>(function_name: &'a str) -> Self {
        Self {
            class_name: Cow::Borrowed(T::class_name().as_str()),
            function_name,
        }
    }
}

impl fmt::Display for CallContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class_name, self.function_name)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Trace diagnostics for integration tests

#[cfg(feature = "trace")]
pub mod trace {
    use std::cell::Cell;

    use super::CallContext;

    /// Stores information about the last call, for tests that check whether pointer or variant calls were used.
    #[derive(Clone, Debug)]
    pub struct CallReport {
        pub class: String,
        pub method: String,
        pub is_inbound: bool,
        pub is_ptrcall: bool,
    }

    pub fn pop() -> CallReport {
        let lock = TRACE.take();
        lock.expect("trace::pop() had no prior call stored.")
    }

    pub(crate) fn push(inbound: bool, ptrcall: bool, call_ctx: &CallContext) {
        if call_ctx.function_name.contains("notrace") {
            return;
        }

        let report = CallReport {
            class: call_ctx.class_name.to_string(),
            method: call_ctx.function_name.to_string(),
            is_inbound: inbound,
            is_ptrcall: ptrcall,
        };

        TRACE.set(Some(report));
    }

    thread_local! {
        static TRACE: Cell<Option<CallReport>> = Cell::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_context_display() {
        let ctx = CallContext::func("Player", "jump");
        assert_eq!(ctx.to_string(), "Player::jump");

        let ctx = CallContext::custom_callable("on_hit");
        assert_eq!(ctx.to_string(), "<Callable>::on_hit");
    }
}
