/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Typed slots: the pointer-call representation of each builtin type, and the per-type function tables built on it.
//!
//! Object slots hold a bare pointer without a reference; the owner of the slot keeps the object alive.

use std::ffi::c_void;
use std::ptr;
use std::sync::{Arc, Mutex};

use godot_ffi as sys;
use sys::VariantType;

use crate::callables::{self, CallableData};
use crate::containers::{self, PackedData};
use crate::objects;
use crate::strings;
use crate::value::{self, plain_size, ObjectRef, RawVariant, SignalValue, Value};

pub(crate) fn default_value(ty: VariantType) -> Value {
    match ty {
        VariantType::Nil | VariantType::Object => Value::Nil,
        VariantType::Bool => Value::Bool(false),
        VariantType::Int => Value::Int(0),
        VariantType::Float => Value::Float(0.0),
        VariantType::String => Value::String(String::new()),
        VariantType::StringName => Value::StringName(String::new()),
        VariantType::NodePath => Value::NodePath(String::new()),
        VariantType::Callable => Value::Callable(None),
        VariantType::Signal => Value::Signal(SignalValue::default()),
        VariantType::Dictionary => Value::Dictionary(Arc::new(Mutex::new(Vec::new()))),
        VariantType::Array => Value::Array(Arc::new(Mutex::new(Vec::new()))),
        ty => match plain_size(ty) {
            Some(size) => Value::Plain(ty, vec![0; size]),
            None => Value::Packed(PackedData::new(ty)),
        },
    }
}

/// Converts `value` to `ty` the way a variant-to-type constructor does; incompatible values yield the type's default.
pub(crate) fn coerce(ty: VariantType, value: &Value) -> Value {
    if value.variant_type() == ty {
        return value.clone();
    }

    match (ty, value) {
        (VariantType::Float, Value::Int(i)) => Value::Float(*i as f64),
        (VariantType::Int, Value::Float(f)) => Value::Int(*f as i64),
        (VariantType::Int, Value::Bool(b)) => Value::Int(*b as i64),
        (VariantType::Bool, Value::Int(i)) => Value::Bool(*i != 0),
        (VariantType::String, v) if v.text().is_some() => Value::String(v.text().unwrap_or_default().to_string()),
        (VariantType::StringName, v) if v.text().is_some() => {
            Value::StringName(v.text().unwrap_or_default().to_string())
        }
        (VariantType::NodePath, v) if v.text().is_some() => Value::NodePath(v.text().unwrap_or_default().to_string()),
        _ => default_value(ty),
    }
}

/// Reads a copy of the value at `ptr`.
pub(crate) unsafe fn read_typed(ty: VariantType, ptr: *const c_void) -> Value {
    match ty {
        VariantType::Nil => Value::Nil,
        VariantType::Bool => Value::Bool(*(ptr as *const u8) != 0),
        VariantType::Int => Value::Int(*(ptr as *const i64)),
        VariantType::Float => Value::Float(*(ptr as *const f64)),
        VariantType::String => Value::String(strings::read(ptr)),
        VariantType::StringName => Value::StringName(strings::read(ptr)),
        VariantType::NodePath => Value::NodePath(strings::read(ptr)),
        VariantType::Object => {
            let address = *(ptr as *const usize);
            match objects::id_of_address(address) {
                0 => Value::Nil,
                id => Value::Object(ObjectRef::new(id)),
            }
        }
        VariantType::Callable => {
            let raw = *(ptr as *const *const CallableData);
            if raw.is_null() {
                Value::Callable(None)
            } else {
                Arc::increment_strong_count(raw);
                Value::Callable(Some(Arc::from_raw(raw)))
            }
        }
        VariantType::Signal => Value::Signal(SignalValue {
            object_id: *(ptr as *const u64),
            name: strings::read((ptr as *const u8).add(8) as *const c_void),
        }),
        VariantType::Dictionary => Value::Dictionary(containers::read_shared(ptr)),
        VariantType::Array => Value::Array(containers::read_shared(ptr)),
        ty => match plain_size(ty) {
            Some(size) => Value::Plain(ty, std::slice::from_raw_parts(ptr as *const u8, size).to_vec()),
            None => Value::Packed(containers::packed_of(ptr as *mut c_void).clone()),
        },
    }
}

/// Writes into uninitialized memory. Values of another type are converted first.
pub(crate) unsafe fn write_typed(ty: VariantType, dst: *mut c_void, value: Value) {
    let value = if value.variant_type() == ty || (ty == VariantType::Object && matches!(value, Value::Nil)) {
        value
    } else {
        coerce(ty, &value)
    };

    match (ty, value) {
        (VariantType::Nil, _) => {}
        (VariantType::Bool, Value::Bool(b)) => *(dst as *mut u8) = b as u8,
        (VariantType::Int, Value::Int(i)) => *(dst as *mut i64) = i,
        (VariantType::Float, Value::Float(f)) => *(dst as *mut f64) = f,
        (VariantType::String, Value::String(s))
        | (VariantType::StringName, Value::StringName(s))
        | (VariantType::NodePath, Value::NodePath(s)) => strings::write(dst, s),
        (VariantType::Object, Value::Object(obj)) => {
            // The slot carries no reference; `obj` is released when it goes out of scope.
            *(dst as *mut usize) = objects::address_of(obj.id());
        }
        (VariantType::Object, _) => *(dst as *mut usize) = 0,
        (VariantType::Callable, Value::Callable(data)) => {
            let raw = data.map_or(ptr::null(), Arc::into_raw);
            ptr::write(dst as *mut [usize; 2], [raw as usize, 0]);
        }
        (VariantType::Signal, Value::Signal(signal)) => {
            *(dst as *mut u64) = signal.object_id;
            strings::write((dst as *mut u8).add(8) as *mut c_void, signal.name);
        }
        (VariantType::Dictionary, Value::Dictionary(dict)) => containers::write_shared(dst, dict),
        (VariantType::Array, Value::Array(array)) => containers::write_shared(dst, array),
        (_, Value::Plain(_, bytes)) => {
            ptr::copy_nonoverlapping(bytes.as_ptr(), dst as *mut u8, bytes.len());
        }
        (_, Value::Packed(data)) => containers::write_packed(dst, data),
        (ty, _) => {
            // Unreachable after coercion; keep the slot valid anyway.
            write_typed(ty, dst, default_value(ty));
        }
    }
}

/// Moves the value out; the slot must not be used afterwards.
pub(crate) unsafe fn take_typed(ty: VariantType, ptr: *mut c_void) -> Value {
    match ty {
        VariantType::String => Value::String(strings::take(ptr)),
        VariantType::StringName => Value::StringName(strings::take(ptr)),
        VariantType::NodePath => Value::NodePath(strings::take(ptr)),
        VariantType::Callable => {
            let raw = *(ptr as *const *const CallableData);
            Value::Callable((!raw.is_null()).then(|| Arc::from_raw(raw)))
        }
        VariantType::Signal => Value::Signal(SignalValue {
            object_id: *(ptr as *const u64),
            name: strings::take((ptr as *mut u8).add(8) as *mut c_void),
        }),
        VariantType::Dictionary => Value::Dictionary(containers::take_shared(ptr)),
        VariantType::Array => Value::Array(containers::take_shared(ptr)),
        ty if plain_size(ty).is_none() && !matches!(ty, VariantType::Nil | VariantType::Object) => {
            Value::Packed(containers::take_packed(ptr))
        }
        // Plain types and objects own nothing.
        ty => read_typed(ty, ptr),
    }
}

/// Replaces an initialized value.
pub(crate) unsafe fn assign_typed(ty: VariantType, dst: *mut c_void, value: Value) {
    drop(take_typed(ty, dst));
    write_typed(ty, dst, value);
}

/// Bytes needed to hold any pointer-call value of `ty`.
pub(crate) fn slot_size(ty: VariantType) -> usize {
    match ty {
        VariantType::Callable | VariantType::Signal => 16,
        // Packed arrays use 16 bytes in the library; only the first word is ours.
        ty if containers::packed_element_size(ty).is_some() => 16,
        ty => plain_size(ty).unwrap_or(8).max(8),
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Per-type functions, instantiated for every tag

pub(crate) type FromTypeFn = unsafe extern "C" fn(sys::GDExtensionUninitializedVariantPtr, sys::GDExtensionTypePtr);
pub(crate) type ToTypeFn = unsafe extern "C" fn(sys::GDExtensionUninitializedTypePtr, sys::GDExtensionVariantPtr);
pub(crate) type CtorFn = unsafe extern "C" fn(sys::GDExtensionUninitializedTypePtr, *const sys::GDExtensionConstTypePtr);
pub(crate) type DtorFn = unsafe extern "C" fn(sys::GDExtensionTypePtr);

macro_rules! per_type {
    ($tag:expr, $func:ident as $Fn:ty) => {
        per_type!(@arms $tag, $func, $Fn;
            1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19
            20 21 22 23 24 25 26 27 28 29 30 31 32 33 34 35 36 37 38)
    };
    (@arms $tag:expr, $func:ident, $Fn:ty; $( $n:tt )*) => {
        match $tag {
            $( $n => Some($func::<$n> as $Fn), )*
            _ => None,
        }
    };
}

unsafe extern "C" fn from_type<const T: u32>(dst: sys::GDExtensionUninitializedVariantPtr, src: sys::GDExtensionTypePtr) {
    let value = read_typed(VariantType::from_sys(T), src);
    value::variant_write(dst, RawVariant::new(value));
}

unsafe extern "C" fn to_type<const T: u32>(dst: sys::GDExtensionUninitializedTypePtr, src: sys::GDExtensionVariantPtr) {
    let ty = VariantType::from_sys(T);
    let converted = coerce(ty, value::variant_ref(src).value());
    write_typed(ty, dst, converted);
}

unsafe extern "C" fn construct_default<const T: u32>(
    dst: sys::GDExtensionUninitializedTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
) {
    let ty = VariantType::from_sys(T);
    write_typed(ty, dst, default_value(ty));
}

unsafe extern "C" fn construct_copy<const T: u32>(
    dst: sys::GDExtensionUninitializedTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
) {
    let ty = VariantType::from_sys(T);
    write_typed(ty, dst, read_typed(ty, *args));
}

unsafe extern "C" fn destroy<const T: u32>(ptr: sys::GDExtensionTypePtr) {
    drop(take_typed(VariantType::from_sys(T), ptr));
}

pub(crate) fn from_type_fn(tag: sys::GDExtensionVariantType) -> sys::GDExtensionVariantFromTypeConstructorFunc {
    per_type!(tag, from_type as FromTypeFn)
}

pub(crate) fn to_type_fn(tag: sys::GDExtensionVariantType) -> sys::GDExtensionTypeFromVariantConstructorFunc {
    per_type!(tag, to_type as ToTypeFn)
}

/// Constructor `index` of a type: 0 is default, 1 is copy, higher indices are conversions.
pub(crate) fn ptr_constructor(tag: sys::GDExtensionVariantType, index: i32) -> sys::GDExtensionPtrConstructor {
    let ty = VariantType::from_sys(tag);
    if matches!(ty, VariantType::Nil | VariantType::Object) {
        return None;
    }

    match (ty, index) {
        (_, 0) => per_type!(tag, construct_default as CtorFn),
        (_, 1) => per_type!(tag, construct_copy as CtorFn),
        // String from StringName, String from NodePath.
        (VariantType::String, 2 | 3) => Some(strings::convert_string as CtorFn),
        (VariantType::StringName | VariantType::NodePath, 2) => Some(strings::convert_string as CtorFn),
        (VariantType::Callable, 2) => Some(callables::callable_from_object_method as CtorFn),
        (VariantType::Signal, 2) => Some(callables::signal_from_object_signal as CtorFn),
        _ => None,
    }
}

/// Plain types and objects have no destructor.
pub(crate) fn ptr_destructor(tag: sys::GDExtensionVariantType) -> sys::GDExtensionPtrDestructor {
    let ty = VariantType::from_sys(tag);
    if ty.is_plain() || ty == VariantType::Object {
        return None;
    }
    per_type!(tag, destroy as DtorFn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_cover_all_builtin_types() {
        for &ty in VariantType::BUILTINS {
            assert!(from_type_fn(ty.sys()).is_some(), "{ty:?}");
            assert!(to_type_fn(ty.sys()).is_some(), "{ty:?}");

            if ty != VariantType::Object {
                assert!(ptr_constructor(ty.sys(), 0).is_some(), "{ty:?}");
                assert!(ptr_constructor(ty.sys(), 1).is_some(), "{ty:?}");
            }
            assert_eq!(
                ptr_destructor(ty.sys()).is_some(),
                !ty.is_plain() && ty != VariantType::Object,
                "{ty:?}"
            );
        }
        assert!(from_type_fn(0).is_none());
    }

    #[test]
    fn string_survives_variant_round_trip() {
        let mut slot = [0u64; 2];
        let mut variant = RawVariant::default();
        let mut back = [0u64; 2];

        unsafe {
            write_typed(VariantType::String, slot.as_mut_ptr() as *mut c_void, Value::String("abc".into()));
            variant_from(VariantType::String, slot.as_mut_ptr() as *mut c_void, &mut variant);

            let to = to_type_fn(VariantType::String.sys()).unwrap();
            to(back.as_mut_ptr() as *mut c_void, &mut variant as *mut RawVariant as *mut c_void);

            assert_eq!(strings::read(back.as_ptr() as *const c_void), "abc");
            drop(take_typed(VariantType::String, slot.as_mut_ptr() as *mut c_void));
            drop(take_typed(VariantType::String, back.as_mut_ptr() as *mut c_void));
        }
    }

    unsafe fn variant_from(ty: VariantType, src: *mut c_void, dst: &mut RawVariant) {
        let from = from_type_fn(ty.sys()).unwrap();
        // Overwrites the nil value, which owns nothing.
        from(dst as *mut RawVariant as *mut c_void, src);
    }

    #[test]
    fn coercion_falls_back_to_default() {
        assert!(matches!(coerce(VariantType::Float, &Value::Int(3)), Value::Float(f) if f == 3.0));
        assert!(matches!(coerce(VariantType::Int, &Value::String("x".into())), Value::Int(0)));
        assert!(matches!(coerce(VariantType::StringName, &Value::String("x".into())), Value::StringName(s) if s == "x"));
    }
}
