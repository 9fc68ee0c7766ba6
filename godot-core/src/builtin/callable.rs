/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use godot_ffi as sys;
use sys::VariantType;

use crate::builtin::opaque_handle::OpaqueHandle;
use crate::builtin::{builtin_ptrcall, GString, StringName, Variant};
use crate::meta::{ArrayElement, BuiltinMethodBind, ToGodot};
use crate::obj::{Gd, GodotClass};

const CALL_HASH: i64 = 3643564216;
const IS_VALID_HASH: i64 = 3918633141;
const FROM_OBJECT_METHOD_CTOR: i32 = 2;

/// A `Callable` represents a function in Godot.
///
/// Usually a callable is a reference to an `Object` and a method name, this is a standard callable. It can also be a custom callable
/// backed by a Rust closure, see [`Callable::from_local_fn()`].
pub struct Callable {
    handle: OpaqueHandle<sys::OpaqueCallable>,
}

impl Callable {
    /// Create a callable for the method `object::method_name`.
    ///
    /// _Godot equivalent: `Callable(Object object, StringName method)`_
    pub fn from_object_method<T, S>(object: &Gd<T>, method_name: S) -> Self
    where
        T: GodotClass,
        S: Into<StringName>,
    {
        let method = method_name.into();
        let object_ptr = object.obj_sys();

        // SAFETY: constructor (Object, StringName) with arguments in their pointer-call representation.
        unsafe {
            Self::new_with_uninit(|self_ptr| {
                let ctor = sys::interface_fn!(variant_get_ptr_constructor)(
                    VariantType::Callable.sys(),
                    FROM_OBJECT_METHOD_CTOR,
                )
                .unwrap_or_else(|| panic!("engine does not provide Callable(Object, StringName)"));

                let args = [
                    &object_ptr as *const sys::GDExtensionObjectPtr as sys::GDExtensionConstTypePtr,
                    method.string_sys(),
                ];
                ctor(self_ptr, args.as_ptr());
            })
        }
    }

    /// Create a callable from a Rust function or closure.
    ///
    /// `name` is used for the string representation of the closure, which helps debugging.
    ///
    /// The closure lives until the engine releases the last copy of the callable, e.g. when a signal it is connected to is
    /// disconnected or its object is freed. It is only invoked on the thread that created it.
    ///
    /// # Example
    /// ```no_run
    /// # use godot::prelude::*;
    /// let callable = Callable::from_local_fn("sum", |args: &[&Variant]| {
    ///     let sum: i64 = args.iter().map(|arg| arg.to::<i64>()).sum();
    ///     Ok(sum.to_variant())
    /// });
    /// ```
    pub fn from_local_fn<F, S>(name: S, rust_function: F) -> Self
    where
        F: FnMut(&[&Variant]) -> Result<Variant, ()> + 'static,
        S: Into<GString>,
    {
        let userdata = CallableUserdata {
            inner: FnWrapper {
                rust_function,
                name: name.into(),
            },
        };

        let userdata_ptr = Box::into_raw(Box::new(userdata)) as *mut std::ffi::c_void;

        // The engine owns this holder and ends it through the free callback. Entries still alive at teardown are leaked, since
        // the engine may call into the closure until it drops its last copy.
        let (handle, _lookup) = sys::pointer_manager::new_keyed(
            userdata_ptr as usize,
            userdata_ptr,
            sys::Ownership::HostAllocated,
            Some(release_userdata::<FnWrapper<F>>),
        );
        std::mem::forget(handle);

        let mut info = sys::GDExtensionCallableCustomInfo2 {
            callable_userdata: userdata_ptr,
            // SAFETY: the binding is initialized while Rust code creates callables.
            token: unsafe { sys::get_library() },
            object_id: 0,
            call_func: Some(rust_callable_call_fn::<F>),
            is_valid_func: None,
            free_func: Some(rust_callable_destroy),
            hash_func: None,
            equal_func: None,
            less_than_func: None,
            to_string_func: Some(rust_callable_to_string_named::<F>),
            get_argument_count_func: None,
        };

        // SAFETY: `info` is fully initialized; the engine copies it.
        unsafe {
            Self::new_with_uninit(|self_ptr| {
                sys::interface_fn!(callable_custom_create2)(self_ptr, &raw mut info);
            })
        }
    }

    /// Creates an invalid/empty object that is not able to be called.
    ///
    /// _Godot equivalent: `Callable()`_
    pub fn invalid() -> Self {
        Self {
            handle: OpaqueHandle::new_default(),
        }
    }

    /// Calls the method represented by this callable.
    ///
    /// Arguments passed should match the method's signature.
    ///
    /// - If called with more arguments than expected by the method, the extra arguments will be ignored and
    ///   the call continues as normal.
    /// - If called with fewer arguments than expected it will crash Godot, without triggering UB.
    /// - If called with arguments of the wrong type then an error will be printed and the call will return
    ///   `NIL`.
    /// - If called on an invalid Callable then no error is printed, and `NIL` is returned.
    ///
    /// _Godot equivalent: `call`_
    pub fn call(&self, arguments: &[Variant]) -> Variant {
        let method_bind = BuiltinMethodBind::load(VariantType::Callable, "call", CALL_HASH);
        let arg_ptrs: Vec<sys::GDExtensionConstTypePtr> =
            arguments.iter().map(Variant::var_sys).collect();

        let mut result = Variant::nil();

        // SAFETY: vararg builtin method: each argument is a variant pointer, the return slot an initialized variant.
        unsafe {
            method_bind.call(
                sys::force_mut_ptr(self.sys()),
                &arg_ptrs,
                result.var_sys_mut(),
            );
        }

        result
    }

    /// Returns `true` if the callable's object exists and has a valid method name assigned, or is a custom callable.
    pub fn is_valid(&self) -> bool {
        // SAFETY: `self` is a valid callable.
        unsafe {
            builtin_ptrcall(
                VariantType::Callable,
                "is_valid",
                IS_VALID_HASH,
                sys::force_mut_ptr(self.sys()),
                (),
            )
        }
    }
}

impl_builtin_opaque!(Callable => sys::OpaqueCallable);

impl ArrayElement for Callable {}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({})", self.to_variant().stringify())
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_variant().stringify())
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Callbacks for custom implementations

use custom_callable::*;

mod custom_callable {
    use super::*;
    use crate::meta::error::CallError;
    use crate::meta::CallContext;

    pub struct CallableUserdata<T> {
        pub inner: T,
    }

    impl<T> CallableUserdata<T> {
        /// # Safety
        /// Returns an unbounded reference. `void_ptr` must be a valid pointer to a `CallableUserdata`.
        unsafe fn inner_from_raw<'a>(void_ptr: *mut std::ffi::c_void) -> &'a mut T {
            let ptr = void_ptr as *mut CallableUserdata<T>;
            &mut (*ptr).inner
        }
    }

    pub(crate) struct FnWrapper<F> {
        pub(crate) rust_function: F,
        pub(crate) name: GString,
    }

    pub unsafe extern "C" fn rust_callable_call_fn<F>(
        callable_userdata: *mut std::ffi::c_void,
        p_args: *const sys::GDExtensionConstVariantPtr,
        p_argument_count: sys::GDExtensionInt,
        r_return: sys::GDExtensionVariantPtr,
        r_error: *mut sys::GDExtensionCallError,
    ) where
        F: FnMut(&[&Variant]) -> Result<Variant, ()>,
    {
        let arg_refs: &[&Variant] = Variant::borrow_ref_slice(p_args, p_argument_count as usize);

        let wrapper: &mut FnWrapper<F> = CallableUserdata::inner_from_raw(callable_userdata);
        let name = wrapper.name.to_string();
        let call_ctx = CallContext::custom_callable(&name);

        (*r_error).error = sys::GDEXTENSION_CALL_OK;

        let code = std::panic::AssertUnwindSafe(|| match (wrapper.rust_function)(arg_refs) {
            Ok(value) => {
                // SAFETY: the engine passes an initialized return variant, which the assignment drops.
                *(r_return as *mut Variant) = value;
                Ok(())
            }
            Err(()) => Err(CallError::failed_by_user_result(&call_ctx)),
        });

        crate::private::handle_varcall_panic(&call_ctx, &mut *r_error, move || code());
    }

    pub unsafe extern "C" fn rust_callable_destroy(callable_userdata: *mut std::ffi::c_void) {
        // After teardown, the entry is gone and the userdata stays leaked.
        if let Err(err) = sys::pointer_manager::end_keyed(callable_userdata as usize) {
            sys::out!("custom callable freed after its entry ended: {err}");
        }
    }

    pub unsafe fn release_userdata<T>(raw: *mut *mut std::ffi::c_void) {
        let rust_ptr = *raw as *mut CallableUserdata<T>;
        let _drop = Box::from_raw(rust_ptr);
    }

    pub unsafe extern "C" fn rust_callable_to_string_named<F>(
        callable_userdata: *mut std::ffi::c_void,
        r_is_valid: *mut sys::GDExtensionBool,
        r_out: sys::GDExtensionStringPtr,
    ) {
        let w: &mut FnWrapper<F> = CallableUserdata::inner_from_raw(callable_userdata);

        w.name.assign_to_string_sys(r_out);
        *r_is_valid = sys::SYS_TRUE;
    }
}
