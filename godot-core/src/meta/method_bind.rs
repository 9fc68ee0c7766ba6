/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Lazily resolved engine method pointers.
//!
//! Pointers are looked up once per `(class, method)` and kept in process-wide maps until deinitialization. A lookup that the
//! engine cannot satisfy means the binding and the engine disagree on the API, which is not recoverable.

use std::collections::HashMap;

use godot_ffi as sys;
use sys::{Global, VariantType};

use crate::builtin::StringName;

// Pointers stored as integers, so the maps are `Send`.
static CLASS_METHOD_BINDS: Global<HashMap<(&'static str, &'static str), usize>> = Global::default();
static BUILTIN_METHOD_BINDS: Global<HashMap<(VariantType, &'static str), usize>> = Global::default();

pub(crate) fn cleanup() {
    CLASS_METHOD_BINDS.lock().clear();
    BUILTIN_METHOD_BINDS.lock().clear();
}

/// Method of an engine class, resolved through `classdb_get_method_bind`.
#[derive(Copy, Clone, Debug)]
pub struct ClassMethodBind {
    class_name: &'static str,
    method_name: &'static str,
    ptr: sys::GDExtensionMethodBindPtr,
}

impl ClassMethodBind {
    /// Returns the cached pointer, or asks the engine on first use.
    ///
    /// # Panics
    /// If the engine has no method with this name and hash.
    pub fn load(class_name: &'static str, method_name: &'static str, hash: i64) -> Self {
        let cached = CLASS_METHOD_BINDS
            .lock()
            .get(&(class_name, method_name))
            .copied();

        let ptr = match cached {
            Some(ptr) => ptr as sys::GDExtensionMethodBindPtr,
            None => {
                let ptr = Self::fetch(class_name, method_name, hash);
                CLASS_METHOD_BINDS
                    .lock()
                    .insert((class_name, method_name), ptr as usize);
                ptr
            }
        };

        Self {
            class_name,
            method_name,
            ptr,
        }
    }

    fn fetch(
        class_name: &'static str,
        method_name: &'static str,
        hash: i64,
    ) -> sys::GDExtensionMethodBindPtr {
        let class_sname = StringName::from(class_name);
        let method_sname = StringName::from(method_name);

        // SAFETY: both names are valid engine strings for the duration of the call.
        let ptr = unsafe {
            sys::interface_fn!(classdb_get_method_bind)(
                class_sname.string_sys(),
                method_sname.string_sys(),
                hash,
            )
        };

        if ptr.is_null() {
            panic!("{}", sys::method_bind_failure(class_name, method_name, hash));
        }

        sys::out!("loaded method bind {class_name}::{method_name}");
        ptr
    }

    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    pub fn method_name(&self) -> &'static str {
        self.method_name
    }

    pub fn sys(&self) -> sys::GDExtensionMethodBindPtr {
        self.ptr
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Method of a builtin type (e.g. `Array::size`), resolved through `variant_get_ptr_builtin_method`.
#[derive(Copy, Clone)]
pub struct BuiltinMethodBind {
    func: unsafe extern "C" fn(
        sys::GDExtensionTypePtr,
        *const sys::GDExtensionConstTypePtr,
        sys::GDExtensionTypePtr,
        i32,
    ),
}

impl BuiltinMethodBind {
    /// # Panics
    /// If the engine has no method with this name and hash.
    pub fn load(variant_type: VariantType, method_name: &'static str, hash: i64) -> Self {
        let cached = BUILTIN_METHOD_BINDS
            .lock()
            .get(&(variant_type, method_name))
            .copied();

        let raw = match cached {
            Some(raw) => raw,
            None => {
                let raw = Self::fetch(variant_type, method_name, hash);
                BUILTIN_METHOD_BINDS
                    .lock()
                    .insert((variant_type, method_name), raw);
                raw
            }
        };

        // SAFETY: only non-null pointers of this exact signature are stored.
        let func = unsafe { std::mem::transmute::<usize, _>(raw) };
        Self { func }
    }

    fn fetch(variant_type: VariantType, method_name: &'static str, hash: i64) -> usize {
        let method_sname = StringName::from(method_name);

        // SAFETY: the name is a valid engine string for the duration of the call.
        let func = unsafe {
            sys::interface_fn!(variant_get_ptr_builtin_method)(
                variant_type.sys(),
                method_sname.string_sys(),
                hash,
            )
        };

        match func {
            Some(func) => func as usize,
            None => panic!(
                "{}",
                sys::method_bind_failure(variant_type.godot_name(), method_name, hash)
            ),
        }
    }

    /// # Safety
    /// `base` must point to a value of the method's builtin type, `args` to values of the parameter types, and `ret` to
    /// initialized storage of the return type (or null without return value).
    pub unsafe fn call(
        &self,
        base: sys::GDExtensionTypePtr,
        args: &[sys::GDExtensionConstTypePtr],
        ret: sys::GDExtensionTypePtr,
    ) {
        (self.func)(base, args.as_ptr(), ret, args.len() as i32);
    }
}
