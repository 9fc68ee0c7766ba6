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
use crate::builtin::{builtin_ptrcall, Callable, StringName, Variant};
use crate::global::Error;
use crate::meta::{ArrayElement, BuiltinMethodBind, ToGodot};
use crate::obj::{Gd, GodotClass};

const EMIT_HASH: i64 = 3286317445;
const CONNECT_HASH: i64 = 979702392;
const GET_NAME_HASH: i64 = 1825232092;
const IS_NULL_HASH: i64 = 3918633141;
const FROM_OBJECT_SIGNAL_CTOR: i32 = 2;

/// A `Signal` represents a signal of an Object instance in Godot.
///
/// Signals are composed of a reference to an `Object` and the name of the signal on this object.
pub struct Signal {
    handle: OpaqueHandle<sys::OpaqueSignal>,
}

impl Signal {
    /// Create a signal for the signal `object::signal_name`.
    ///
    /// _Godot equivalent: `Signal(Object object, StringName signal)`_
    pub fn from_object_signal<T, S>(object: &Gd<T>, signal_name: S) -> Self
    where
        T: GodotClass,
        S: Into<StringName>,
    {
        let signal_name = signal_name.into();
        let object_ptr = object.obj_sys();

        // SAFETY: constructor (Object, StringName) with arguments in their pointer-call representation.
        unsafe {
            Self::new_with_uninit(|self_ptr| {
                let ctor = sys::interface_fn!(variant_get_ptr_constructor)(
                    VariantType::Signal.sys(),
                    FROM_OBJECT_SIGNAL_CTOR,
                )
                .unwrap_or_else(|| panic!("engine does not provide Signal(Object, StringName)"));

                let args = [
                    &object_ptr as *const sys::GDExtensionObjectPtr as sys::GDExtensionConstTypePtr,
                    signal_name.string_sys(),
                ];
                ctor(self_ptr, args.as_ptr());
            })
        }
    }

    /// Creates an invalid/empty signal that cannot be connected to or emitted.
    ///
    /// _Godot equivalent: `Signal()`_
    pub fn invalid() -> Self {
        Self {
            handle: OpaqueHandle::new_default(),
        }
    }

    /// Connects this signal to the specified callable.
    ///
    /// A signal can only be connected once to the same [`Callable`]. If the signal is already connected, returns
    /// [`Error::ERR_INVALID_PARAMETER`].
    pub fn connect(&self, callable: &Callable) -> Error {
        self.connect_flags(callable, 0)
    }

    /// Like [`connect()`](Self::connect), with the engine's `ConnectFlags` bitmask.
    pub fn connect_flags(&self, callable: &Callable, flags: i64) -> Error {
        // SAFETY: `self` is a valid signal.
        let code: i64 = unsafe {
            builtin_ptrcall(
                VariantType::Signal,
                "connect",
                CONNECT_HASH,
                sys::force_mut_ptr(self.sys()),
                (callable.clone(), flags),
            )
        };

        Error::from_ord(code as i32)
    }

    /// Emits this signal.
    ///
    /// All Callables connected to this signal will be triggered.
    pub fn emit(&self, varargs: &[Variant]) {
        let method_bind = BuiltinMethodBind::load(VariantType::Signal, "emit", EMIT_HASH);
        let arg_ptrs: Vec<sys::GDExtensionConstTypePtr> =
            varargs.iter().map(Variant::var_sys).collect();

        // SAFETY: vararg builtin method without return value.
        unsafe {
            method_bind.call(
                sys::force_mut_ptr(self.sys()),
                &arg_ptrs,
                std::ptr::null_mut(),
            );
        }
    }

    /// Returns the name of the signal.
    pub fn name(&self) -> StringName {
        // SAFETY: `self` is a valid signal.
        unsafe {
            builtin_ptrcall(
                VariantType::Signal,
                "get_name",
                GET_NAME_HASH,
                sys::force_mut_ptr(self.sys()),
                (),
            )
        }
    }

    /// Returns `true` if this signal has no object or no signal name.
    pub fn is_null(&self) -> bool {
        // SAFETY: `self` is a valid signal.
        unsafe {
            builtin_ptrcall(
                VariantType::Signal,
                "is_null",
                IS_NULL_HASH,
                sys::force_mut_ptr(self.sys()),
                (),
            )
        }
    }
}

impl_builtin_opaque!(Signal => sys::OpaqueSignal);

impl ArrayElement for Signal {}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal({})", self.to_variant().stringify())
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_variant().stringify())
    }
}
