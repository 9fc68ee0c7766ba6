/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! `Callable` and `Signal` builtins.

use std::ffi::c_void;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use godot_ffi as sys;
use sys::VariantType;

use crate::objects;
use crate::slots;
use crate::state::{report, MessageKind};
use crate::strings::{self, StringSlot};
use crate::value::{self, RawVariant, SignalValue, Value};

pub(crate) enum CallableData {
    /// Method of an object, looked up by name at call time.
    Method { object_id: u64, method: String },

    /// Created by the library through `callable_custom_create2`.
    Custom(CustomCallable),
}

/// Copy of `GDExtensionCallableCustomInfo2`. The userdata is released through `free_func` when the last copy goes away.
pub(crate) struct CustomCallable {
    userdata: usize,
    object_id: u64,
    call: sys::GDExtensionCallableCustomCall,
    is_valid: sys::GDExtensionCallableCustomIsValid,
    free: sys::GDExtensionCallableCustomFree,
    hash: sys::GDExtensionCallableCustomHash,
    equal: sys::GDExtensionCallableCustomEqual,
    to_string: sys::GDExtensionCallableCustomToString,
}

impl Drop for CustomCallable {
    fn drop(&mut self) {
        if let Some(free) = self.free {
            // SAFETY: the library handed out this userdata together with its free function.
            unsafe { free(self.userdata as *mut c_void) };
        }
    }
}

/// Invokes the callable with variant arguments.
pub(crate) fn call(data: &CallableData, args: &[sys::GDExtensionConstVariantPtr]) -> (RawVariant, sys::GDExtensionCallError) {
    match data {
        CallableData::Method { object_id, method } => objects::call_by_id(*object_id, method, args),
        CallableData::Custom(custom) => {
            let mut ret = RawVariant::default();
            let mut error = ok_error();

            if let Some(call) = custom.call {
                // SAFETY: `ret` is an initialized variant; argument pointers outlive the call.
                unsafe {
                    call(
                        custom.userdata as *mut c_void,
                        args.as_ptr(),
                        args.len() as sys::GDExtensionInt,
                        &mut ret as *mut RawVariant as sys::GDExtensionVariantPtr,
                        &mut error,
                    )
                };
            } else {
                error.error = sys::GDEXTENSION_CALL_ERROR_INVALID_METHOD;
            }
            (ret, error)
        }
    }
}

pub(crate) fn ok_error() -> sys::GDExtensionCallError {
    sys::GDExtensionCallError {
        error: sys::GDEXTENSION_CALL_OK,
        argument: 0,
        expected: 0,
    }
}

pub(crate) fn is_valid(data: &Option<Arc<CallableData>>) -> bool {
    match data.as_deref() {
        None => false,
        Some(CallableData::Method { object_id, method }) => objects::has_method(*object_id, method),
        Some(CallableData::Custom(custom)) => {
            if custom.object_id != 0 && !objects::is_alive(custom.object_id) {
                return false;
            }
            match custom.is_valid {
                // SAFETY: userdata is alive as long as `custom`.
                Some(is_valid) => unsafe { is_valid(custom.userdata as *mut c_void) != 0 },
                None => true,
            }
        }
    }
}

pub(crate) fn equal(a: &Option<Arc<CallableData>>, b: &Option<Arc<CallableData>>) -> bool {
    match (a.as_deref(), b.as_deref()) {
        (None, None) => true,
        (Some(CallableData::Method { object_id: ia, method: ma }), Some(CallableData::Method { object_id: ib, method: mb })) => {
            ia == ib && ma == mb
        }
        (Some(CallableData::Custom(ca)), Some(CallableData::Custom(cb))) => {
            if ca.userdata == cb.userdata {
                return true;
            }
            match (ca.equal, cb.equal) {
                // SAFETY: both userdata pointers are alive as long as their callables.
                (Some(eq), Some(_)) => unsafe { eq(ca.userdata as *mut c_void, cb.userdata as *mut c_void) != 0 },
                _ => false,
            }
        }
        _ => false,
    }
}

pub(crate) fn hash(data: &Option<Arc<CallableData>>) -> u32 {
    let mut hasher = DefaultHasher::new();
    match data.as_deref() {
        None => 0u8.hash(&mut hasher),
        Some(CallableData::Method { object_id, method }) => {
            object_id.hash(&mut hasher);
            method.hash(&mut hasher);
        }
        Some(CallableData::Custom(custom)) => match custom.hash {
            // SAFETY: userdata is alive as long as `custom`.
            Some(hash) => return unsafe { hash(custom.userdata as *mut c_void) },
            None => custom.userdata.hash(&mut hasher),
        },
    }
    hasher.finish() as u32
}

pub(crate) fn describe(data: &Option<Arc<CallableData>>) -> String {
    match data.as_deref() {
        None => "null::null".to_string(),
        Some(CallableData::Method { object_id, method }) => {
            format!("{}::{method}", objects::describe(*object_id))
        }
        Some(CallableData::Custom(custom)) => {
            let Some(to_string) = custom.to_string else {
                return "<CallableCustom>".to_string();
            };

            let mut valid: sys::GDExtensionBool = 0;
            let mut out = StringSlot::empty();
            // SAFETY: `out` is an initialized, empty string.
            unsafe { to_string(custom.userdata as *mut c_void, &mut valid, out.ptr()) };

            if valid != 0 {
                out.into_string()
            } else {
                "<CallableCustom>".to_string()
            }
        }
    }
}

unsafe fn read_callable(slot: *const c_void) -> Option<Arc<CallableData>> {
    match slots::read_typed(VariantType::Callable, slot) {
        Value::Callable(data) => data,
        _ => None,
    }
}

unsafe fn read_signal(slot: *const c_void) -> SignalValue {
    match slots::read_typed(VariantType::Signal, slot) {
        Value::Signal(signal) => signal,
        _ => SignalValue::default(),
    }
}

unsafe fn variant_args<'a>(args: *const sys::GDExtensionConstTypePtr, count: i32) -> &'a [sys::GDExtensionConstVariantPtr] {
    if args.is_null() || count <= 0 {
        return &[];
    }
    std::slice::from_raw_parts(args, count as usize)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Constructors

pub(crate) unsafe extern "C" fn callable_custom_create2(
    dst: sys::GDExtensionUninitializedTypePtr,
    info: *mut sys::GDExtensionCallableCustomInfo2,
) {
    let info = &*info;
    let custom = CustomCallable {
        userdata: info.callable_userdata as usize,
        object_id: info.object_id,
        call: info.call_func,
        is_valid: info.is_valid_func,
        free: info.free_func,
        hash: info.hash_func,
        equal: info.equal_func,
        to_string: info.to_string_func,
    };

    let data = Arc::new(CallableData::Custom(custom));
    slots::write_typed(VariantType::Callable, dst, Value::Callable(Some(data)));
}

/// `Callable(Object, StringName)`
pub(crate) unsafe extern "C" fn callable_from_object_method(
    dst: sys::GDExtensionUninitializedTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
) {
    let address = *(*args as *const usize);
    let data = CallableData::Method {
        object_id: objects::id_of_address(address),
        method: strings::read(*args.add(1)),
    };
    slots::write_typed(VariantType::Callable, dst, Value::Callable(Some(Arc::new(data))));
}

/// `Signal(Object, StringName)`
pub(crate) unsafe extern "C" fn signal_from_object_signal(
    dst: sys::GDExtensionUninitializedTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
) {
    let address = *(*args as *const usize);
    let signal = SignalValue {
        object_id: objects::id_of_address(address),
        name: strings::read(*args.add(1)),
    };
    slots::write_typed(VariantType::Signal, dst, Value::Signal(signal));
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Builtin methods

/// Vararg: arguments are variants, the return slot an initialized variant.
pub(crate) unsafe extern "C" fn callable_call(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    arg_count: i32,
) {
    let Some(data) = read_callable(base) else {
        return;
    };

    let (result, error) = call(&data, variant_args(args, arg_count));
    if error.error != sys::GDEXTENSION_CALL_OK {
        let text = format!(
            "Error calling method from 'Callable': {} (call error {})",
            describe(&Some(data)),
            error.error
        );
        report(MessageKind::Error, text);
        return;
    }

    if !ret.is_null() {
        value::variant_assign(ret, result);
    }
}

pub(crate) unsafe extern "C" fn callable_is_valid(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let valid = is_valid(&read_callable(base));
    *(ret as *mut u8) = valid as u8;
}

pub(crate) unsafe extern "C" fn signal_emit(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    _ret: sys::GDExtensionTypePtr,
    arg_count: i32,
) {
    let signal = read_signal(base);
    objects::emit(signal.object_id, &signal.name, variant_args(args, arg_count));
}

/// Arguments: `Callable`, flags as `i64`. Returns the error code as `i64`.
pub(crate) unsafe extern "C" fn signal_connect(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let signal = read_signal(base);
    let callable = read_callable(*args);
    let flags = *(*args.add(1) as *const i64);

    let code = match callable {
        Some(callable) => objects::connect(signal.object_id, &signal.name, callable, flags as u32),
        None => objects::ERR_INVALID_PARAMETER,
    };
    *(ret as *mut i64) = code;
}

pub(crate) unsafe extern "C" fn signal_get_name(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let signal = read_signal(base);
    strings::assign(ret, signal.name);
}

pub(crate) unsafe extern "C" fn signal_is_null(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    _arg_count: i32,
) {
    let signal = read_signal(base);
    *(ret as *mut u8) = (signal.object_id == 0 || signal.name.is_empty()) as u8;
}
