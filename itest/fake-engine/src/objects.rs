/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Object lifecycle, instance bindings, reference counting, signals, and the native methods of `Object` and `RefCounted`.

use std::ffi::c_void;
use std::ptr;
use std::sync::Arc;

use godot_ffi as sys;
use sys::VariantType;

use crate::callables::{self, ok_error, CallableData};
use crate::slots;
use crate::state::{engine, report, Binding, Connection, ExtensionClass, MessageKind};
use crate::strings::{self, StringSlot};
use crate::value::{self, RawVariant, Value};

pub(crate) const OK: i64 = 0;
pub(crate) const ERR_UNAVAILABLE: i64 = 2;
pub(crate) const ERR_INVALID_PARAMETER: i64 = 31;

const NOTIFICATION_PREDELETE: i32 = 1;
const CONNECT_ONE_SHOT: u32 = 4;

type CallOutcome = (RawVariant, sys::GDExtensionCallError);

fn call_error(error: sys::GDExtensionCallErrorType, expected: usize) -> CallOutcome {
    let mut e = ok_error();
    e.error = error;
    e.expected = expected as i32;
    (RawVariant::default(), e)
}

pub(crate) fn id_of_address(address: usize) -> u64 {
    engine().object(address).map_or(0, |o| o.id)
}

pub(crate) fn address_of(id: u64) -> usize {
    engine().address_of(id)
}

pub(crate) fn is_alive(id: u64) -> bool {
    let engine = engine();
    let address = engine.address_of(id);
    engine.object(address).is_some_and(|o| !o.destroying)
}

pub(crate) fn class_of(id: u64) -> Option<String> {
    let engine = engine();
    let address = engine.address_of(id);
    engine.object(address).map(|o| o.class.clone())
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Lifecycle

/// Creates an object of `class`. Extension classes are created through their library's constructor.
pub(crate) fn construct(class: &str) -> *mut c_void {
    let plan = {
        let mut engine = engine();
        match engine.classes.get(class).map(|c| c.extension) {
            None => Err(format!("Class '{class}' not found")),
            Some(Some(extension)) => Ok(extension),
            Some(None) => return engine.alloc_object(class) as *mut c_void,
        }
    };

    let create = match plan {
        Ok(ExtensionClass {
            create_instance: Some(create),
            userdata,
            ..
        }) => (create, userdata),
        Ok(_) => {
            report(MessageKind::Error, format!("Class '{class}' is abstract and cannot be instantiated"));
            return ptr::null_mut();
        }
        Err(msg) => {
            report(MessageKind::Error, msg);
            return ptr::null_mut();
        }
    };

    // SAFETY: the library registered this constructor together with its userdata.
    unsafe { (create.0)(create.1 as *mut c_void) }
}

/// Takes one reference on a ref-counted object; no-op for other objects.
pub(crate) fn reference_id(id: u64) {
    let mut engine = engine();
    let address = engine.address_of(id);
    if let Some(refs) = engine.object_mut(address).and_then(|o| o.refs.as_mut()) {
        refs.count += 1;
    }
}

/// Gives back a reference; destroys the object when the last one goes.
pub(crate) fn release_id(id: u64) {
    let address = {
        let mut engine = engine();
        let address = engine.address_of(id);
        let Some(record) = engine.object_mut(address) else {
            return;
        };
        let destroying = record.destroying;
        let Some(refs) = record.refs.as_mut() else {
            return;
        };

        refs.count = refs.count.saturating_sub(1);
        if refs.count > 0 || !refs.initialized || destroying {
            return;
        }
        address
    };
    destroy(address);
}

pub(crate) fn init_ref(address: usize) -> bool {
    let mut engine = engine();
    match engine.object_mut(address).and_then(|o| o.refs.as_mut()) {
        Some(refs) => {
            refs.initialized = true;
            refs.count += 1;
            true
        }
        None => false,
    }
}

/// Returns `true` when the count reached zero. The caller then destroys the object.
fn unreference(address: usize) -> bool {
    let mut engine = engine();
    match engine.object_mut(address).and_then(|o| o.refs.as_mut()) {
        Some(refs) => {
            refs.count = refs.count.saturating_sub(1);
            refs.count == 0
        }
        None => false,
    }
}

fn reference_count(address: usize) -> i64 {
    engine()
        .object(address)
        .and_then(|o| o.refs)
        .map_or(0, |refs| refs.count as i64)
}

/// Runs the destruction sequence: predelete notification, instance free, binding free callbacks, record removal.
pub(crate) fn destroy(address: usize) {
    let target = {
        let mut engine = engine();
        match engine.object_mut(address) {
            Some(record) if !record.destroying => {
                record.destroying = true;
                let (class, instance) = (record.class.clone(), record.instance);
                Some((instance, engine.extension_of(&class)))
            }
            _ => None,
        }
    };

    let Some((instance, extension)) = target else {
        report(MessageKind::Error, format!("object_destroy: no live object at {address:#x}"));
        return;
    };

    if let (Some(extension), true) = (extension, instance != 0) {
        // SAFETY: the instance was set by the library and stays valid until `free_instance`.
        unsafe {
            if let Some(notification) = extension.notification {
                notification(instance as *mut c_void, NOTIFICATION_PREDELETE, sys::SYS_TRUE);
            }
            if let Some(free) = extension.free_instance {
                free(extension.userdata as *mut c_void, instance as *mut c_void);
            }
        }
    }

    let bindings = engine()
        .object_mut(address)
        .map(|o| std::mem::take(&mut o.bindings))
        .unwrap_or_default();

    for binding in bindings {
        if let Some(free) = binding.free {
            // SAFETY: token and binding data were handed out by the library for this object.
            unsafe { free(binding.token as *mut c_void, address as *mut c_void, binding.data as *mut c_void) };
        }
    }

    let removed = {
        let mut engine = engine();
        let removed = engine.objects.remove(&address);
        if let Some(record) = &removed {
            engine.addresses.remove(&record.id);
            engine.destructor_runs += 1;
        }
        removed
    };

    // Connections may own callables whose release calls into the library.
    drop(removed);
}

/// Text representation: the class's `to_string` callback if it provides one, `<Class#id>` otherwise.
pub(crate) fn describe(id: u64) -> String {
    let target = {
        let engine = engine();
        let address = engine.address_of(id);
        engine
            .object(address)
            .map(|o| (o.class.clone(), o.instance, engine.extension_of(&o.class)))
    };

    let Some((class, instance, extension)) = target else {
        return "<Freed Object>".to_string();
    };

    let to_string = extension.and_then(|e| e.to_string);
    if let (Some(to_string), true) = (to_string, instance != 0) {
        let mut valid: sys::GDExtensionBool = 0;
        let mut out = StringSlot::empty();
        // SAFETY: `out` is an initialized empty string.
        unsafe { to_string(instance as *mut c_void, &mut valid, out.ptr()) };

        if valid != 0 {
            return out.into_string();
        }
    }

    format!("<{class}#{id}>")
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Methods and properties

const NATIVE_CALLABLE: [&str; 3] = ["get_class", "get_instance_id", "is_class"];

pub(crate) fn has_method(id: u64, method: &str) -> bool {
    let engine = engine();
    let address = engine.address_of(id);
    engine
        .object(address)
        .is_some_and(|o| engine.find_method(&o.class, method).is_some() || NATIVE_CALLABLE.contains(&method))
}

pub(crate) fn call_by_id(id: u64, method: &str, args: &[sys::GDExtensionConstVariantPtr]) -> CallOutcome {
    match address_of(id) {
        0 => call_error(sys::GDEXTENSION_CALL_ERROR_INSTANCE_IS_NULL, 0),
        address => call_method(address, method, args),
    }
}

/// Variant call of a registered method, filling in default arguments.
pub(crate) fn call_method(address: usize, method: &str, args: &[sys::GDExtensionConstVariantPtr]) -> CallOutcome {
    let lookup = {
        let engine = engine();
        engine
            .object(address)
            .map(|o| (o.id, o.class.clone(), o.instance, engine.find_method(&o.class, method)))
    };

    let Some((id, class, instance, found)) = lookup else {
        return call_error(sys::GDEXTENSION_CALL_ERROR_INSTANCE_IS_NULL, 0);
    };
    let Some(record) = found else {
        return call_native(id, &class, method, args);
    };
    let Some(call) = record.call else {
        return call_error(sys::GDEXTENSION_CALL_ERROR_INVALID_METHOD, 0);
    };
    if instance == 0 {
        return call_error(sys::GDEXTENSION_CALL_ERROR_INSTANCE_IS_NULL, 0);
    }

    let expected = record.argument_types.len();
    if args.len() > expected {
        return call_error(sys::GDEXTENSION_CALL_ERROR_TOO_MANY_ARGUMENTS, expected);
    }
    let missing = expected - args.len();
    let defaults = &record.defaults;
    if missing > defaults.len() {
        return call_error(sys::GDEXTENSION_CALL_ERROR_TOO_FEW_ARGUMENTS, expected);
    }

    let mut all_args = args.to_vec();
    all_args.extend(
        defaults[defaults.len() - missing..]
            .iter()
            .map(|d| d as *const RawVariant as sys::GDExtensionConstVariantPtr),
    );

    let mut ret = RawVariant::default();
    let mut error = ok_error();
    // SAFETY: `ret` is an initialized variant; the argument pointers live until the call returns.
    unsafe {
        call(
            record.userdata as *mut c_void,
            instance as *mut c_void,
            all_args.as_ptr(),
            all_args.len() as sys::GDExtensionInt,
            &mut ret as *mut RawVariant as sys::GDExtensionVariantPtr,
            &mut error,
        )
    };
    (ret, error)
}

/// The few `Object` methods reachable through `call()` without registration.
fn call_native(id: u64, class: &str, method: &str, args: &[sys::GDExtensionConstVariantPtr]) -> CallOutcome {
    let value = match method {
        "get_class" => Value::String(class.to_string()),
        "get_instance_id" => Value::Int(id as i64),
        "is_class" => {
            let Some(&arg) = args.first() else {
                return call_error(sys::GDEXTENSION_CALL_ERROR_TOO_FEW_ARGUMENTS, 1);
            };
            // SAFETY: arguments are initialized variants.
            let ancestor = unsafe { value::variant_ref(arg) }.value().text().unwrap_or_default().to_string();
            Value::Bool(engine().inherits(class, &ancestor))
        }
        _ => return call_error(sys::GDEXTENSION_CALL_ERROR_INVALID_METHOD, 0),
    };
    (RawVariant::new(value), ok_error())
}

/// Reads a property through the class's `get` callback, then through the registered getter.
pub(crate) fn get_property(address: usize, name: &str) -> RawVariant {
    let lookup = {
        let engine = engine();
        engine.object(address).map(|o| {
            (
                o.instance,
                engine.extension_of(&o.class),
                engine.find_property(&o.class, name),
            )
        })
    };
    let Some((instance, extension, property)) = lookup else {
        return RawVariant::default();
    };

    if let (Some(get), true) = (extension.and_then(|e| e.get), instance != 0) {
        let mut ret = RawVariant::default();
        let mut name_slot = StringSlot::new(name);
        // SAFETY: `ret` is an initialized variant.
        let handled = unsafe {
            get(
                instance as *mut c_void,
                name_slot.ptr(),
                &mut ret as *mut RawVariant as sys::GDExtensionVariantPtr,
            )
        };
        if handled != 0 {
            return ret;
        }
    }

    match property {
        Some(property) if !property.getter.is_empty() => call_method(address, &property.getter, &[]).0,
        _ => RawVariant::default(),
    }
}

/// Returns `false` if no callback or setter took the value.
pub(crate) fn set_property(address: usize, name: &str, value: sys::GDExtensionConstVariantPtr) -> bool {
    let lookup = {
        let engine = engine();
        engine.object(address).map(|o| {
            (
                o.instance,
                engine.extension_of(&o.class),
                engine.find_property(&o.class, name),
            )
        })
    };
    let Some((instance, extension, property)) = lookup else {
        return false;
    };

    if let (Some(set), true) = (extension.and_then(|e| e.set), instance != 0) {
        let mut name_slot = StringSlot::new(name);
        // SAFETY: `value` is an initialized variant.
        if unsafe { set(instance as *mut c_void, name_slot.ptr(), value) } != 0 {
            return true;
        }
    }

    match property {
        Some(property) if !property.setter.is_empty() => {
            let (_, error) = call_method(address, &property.setter, &[value]);
            error.error == sys::GDEXTENSION_CALL_OK
        }
        _ => false,
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Signals

pub(crate) fn connect(id: u64, signal: &str, callable: Arc<CallableData>, flags: u32) -> i64 {
    let existing: Vec<Arc<CallableData>> = {
        let engine = engine();
        let address = engine.address_of(id);
        let Some(record) = engine.object(address) else {
            return ERR_INVALID_PARAMETER;
        };
        if !engine.has_signal(&record.class, signal) {
            drop(engine);
            report(MessageKind::Error, format!("Attempt to connect nonexistent signal '{signal}'"));
            return ERR_INVALID_PARAMETER;
        }
        record
            .connections
            .iter()
            .filter(|c| c.signal == signal)
            .map(|c| Arc::clone(&c.callable))
            .collect()
    };

    let candidate = Some(Arc::clone(&callable));
    if existing.iter().any(|c| callables::equal(&Some(Arc::clone(c)), &candidate)) {
        report(MessageKind::Error, format!("Signal '{signal}' is already connected to the given callable"));
        return ERR_INVALID_PARAMETER;
    }

    let mut engine = engine();
    let address = engine.address_of(id);
    match engine.object_mut(address) {
        Some(record) => {
            record.connections.push(Connection {
                signal: signal.to_string(),
                callable,
                flags,
            });
            OK
        }
        None => ERR_INVALID_PARAMETER,
    }
}

pub(crate) fn connection_count(id: u64, signal: &str) -> usize {
    let engine = engine();
    let address = engine.address_of(id);
    engine
        .object(address)
        .map_or(0, |o| o.connections.iter().filter(|c| c.signal == signal).count())
}

fn disconnect(id: u64, signal: &str, callable: &Arc<CallableData>) {
    let removed: Vec<Connection> = {
        let mut engine = engine();
        let address = engine.address_of(id);
        match engine.object_mut(address) {
            Some(record) => {
                let (removed, kept) = std::mem::take(&mut record.connections)
                    .into_iter()
                    .partition(|c| c.signal == signal && Arc::ptr_eq(&c.callable, callable));
                record.connections = kept;
                removed
            }
            None => Vec::new(),
        }
    };
    drop(removed);
}

/// Calls every connected callable in connection order.
pub(crate) fn emit(id: u64, signal: &str, args: &[sys::GDExtensionConstVariantPtr]) -> i64 {
    let targets: Vec<(Arc<CallableData>, u32)> = {
        let engine = engine();
        let address = engine.address_of(id);
        let Some(record) = engine.object(address) else {
            return ERR_UNAVAILABLE;
        };
        if !engine.has_signal(&record.class, signal) {
            return ERR_UNAVAILABLE;
        }
        record
            .connections
            .iter()
            .filter(|c| c.signal == signal)
            .map(|c| (Arc::clone(&c.callable), c.flags))
            .collect()
    };

    for (callable, flags) in &targets {
        let (_ret, error) = callables::call(callable, args);
        if error.error != sys::GDEXTENSION_CALL_OK {
            let text = format!(
                "Error calling from signal '{signal}' to callable '{}': call error {}",
                callables::describe(&Some(Arc::clone(callable))),
                error.error
            );
            report(MessageKind::Error, text);
        }
        if flags & CONNECT_ONE_SHOT != 0 {
            disconnect(id, signal, callable);
        }
    }
    OK
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Native method binds

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum NativeMethod {
    GetClass,
    IsClass,
    Get,
    Set,
    Call,
    Connect,
    EmitSignal,
    InitRef,
    Reference,
    Unreference,
    GetReferenceCount,
}

struct NativeBind {
    class: &'static str,
    name: &'static str,
    method: NativeMethod,
}

/// Method binds handed to the library are addresses of these entries.
static NATIVE_BINDS: [NativeBind; 11] = [
    NativeBind { class: "Object", name: "get_class", method: NativeMethod::GetClass },
    NativeBind { class: "Object", name: "is_class", method: NativeMethod::IsClass },
    NativeBind { class: "Object", name: "get", method: NativeMethod::Get },
    NativeBind { class: "Object", name: "set", method: NativeMethod::Set },
    NativeBind { class: "Object", name: "call", method: NativeMethod::Call },
    NativeBind { class: "Object", name: "connect", method: NativeMethod::Connect },
    NativeBind { class: "Object", name: "emit_signal", method: NativeMethod::EmitSignal },
    NativeBind { class: "RefCounted", name: "init_ref", method: NativeMethod::InitRef },
    NativeBind { class: "RefCounted", name: "reference", method: NativeMethod::Reference },
    NativeBind { class: "RefCounted", name: "unreference", method: NativeMethod::Unreference },
    NativeBind { class: "RefCounted", name: "get_reference_count", method: NativeMethod::GetReferenceCount },
];

fn native_method(bind: sys::GDExtensionMethodBindPtr) -> Option<NativeMethod> {
    NATIVE_BINDS
        .iter()
        .find(|entry| ptr::eq(*entry as *const NativeBind as *const c_void, bind))
        .map(|entry| entry.method)
}

/// Null if the class or method is unknown, or if the bind was configured to fail. The hash is not checked.
pub(crate) unsafe extern "C" fn classdb_get_method_bind(
    class: sys::GDExtensionConstStringNamePtr,
    method: sys::GDExtensionConstStringNamePtr,
    _hash: sys::GDExtensionInt,
) -> sys::GDExtensionMethodBindPtr {
    let class = strings::str_ref(class);
    let method = strings::str_ref(method);

    let engine = engine();
    let fails = engine.failing_binds.iter().any(|(c, m)| c == class && m == method);
    if fails || !engine.classes.contains_key(class) {
        return ptr::null();
    }

    NATIVE_BINDS
        .iter()
        .find(|entry| entry.name == method && engine.inherits(class, entry.class))
        .map_or(ptr::null(), |entry| entry as *const NativeBind as sys::GDExtensionMethodBindPtr)
}

/// Pointer call of a native method. The return slot is initialized.
pub(crate) unsafe extern "C" fn object_method_bind_ptrcall(
    bind: sys::GDExtensionMethodBindPtr,
    object: sys::GDExtensionObjectPtr,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
) {
    let Some(method) = native_method(bind) else {
        report(MessageKind::Error, "object_method_bind_ptrcall: unknown method bind");
        return;
    };
    let address = object as usize;
    let arg = |index: usize| *args.add(index);

    match method {
        NativeMethod::GetClass => {
            let class = class_of(id_of_address(address)).unwrap_or_default();
            strings::assign(ret, class);
        }
        NativeMethod::IsClass => {
            let ancestor = strings::read(arg(0));
            let is = {
                let engine = engine();
                engine.object(address).is_some_and(|o| engine.inherits(&o.class, &ancestor))
            };
            *(ret as *mut u8) = is as u8;
        }
        NativeMethod::Get => {
            let value = get_property(address, strings::str_ref(arg(0)));
            value::variant_assign(ret, value);
        }
        NativeMethod::Set => {
            set_property(address, strings::str_ref(arg(0)), arg(1));
        }
        NativeMethod::Connect => {
            let signal = strings::read(arg(0));
            let callable = match slots::read_typed(VariantType::Callable, arg(1)) {
                Value::Callable(data) => data,
                _ => None,
            };
            let flags = *(arg(2) as *const i64);

            let code = match callable {
                Some(callable) => connect(id_of_address(address), &signal, callable, flags as u32),
                None => ERR_INVALID_PARAMETER,
            };
            *(ret as *mut i64) = code;
        }
        NativeMethod::InitRef => *(ret as *mut u8) = init_ref(address) as u8,
        NativeMethod::Reference => {
            let id = id_of_address(address);
            reference_id(id);
            *(ret as *mut u8) = (id != 0) as u8;
        }
        NativeMethod::Unreference => *(ret as *mut u8) = unreference(address) as u8,
        NativeMethod::GetReferenceCount => *(ret as *mut i64) = reference_count(address),
        NativeMethod::Call | NativeMethod::EmitSignal => {
            report(MessageKind::Error, format!("{method:?} is a vararg method and cannot be ptrcalled"));
        }
    }
}

/// Variant call of a native method. The return slot is uninitialized and always written.
pub(crate) unsafe extern "C" fn object_method_bind_call(
    bind: sys::GDExtensionMethodBindPtr,
    object: sys::GDExtensionObjectPtr,
    args: *const sys::GDExtensionConstVariantPtr,
    arg_count: sys::GDExtensionInt,
    ret: sys::GDExtensionUninitializedVariantPtr,
    error: *mut sys::GDExtensionCallError,
) {
    value::variant_write(ret, RawVariant::default());
    *error = ok_error();

    let args: &[sys::GDExtensionConstVariantPtr] = if args.is_null() || arg_count <= 0 {
        &[]
    } else {
        std::slice::from_raw_parts(args, arg_count as usize)
    };

    let Some((&name, rest)) = args.split_first() else {
        (*error).error = sys::GDEXTENSION_CALL_ERROR_TOO_FEW_ARGUMENTS;
        (*error).expected = 1;
        return;
    };
    let name = value::variant_ref(name).value().text().unwrap_or_default().to_string();
    let address = object as usize;

    match native_method(bind) {
        Some(NativeMethod::Call) => {
            let (result, call_error) = call_method(address, &name, rest);
            value::variant_assign(ret, result);
            *error = call_error;
        }
        Some(NativeMethod::EmitSignal) => {
            let code = emit(id_of_address(address), &name, rest);
            value::variant_assign(ret, RawVariant::new(Value::Int(code)));
        }
        _ => (*error).error = sys::GDEXTENSION_CALL_ERROR_INVALID_METHOD,
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Object interface functions

pub(crate) unsafe extern "C" fn object_destroy(object: sys::GDExtensionObjectPtr) {
    destroy(object as usize);
}

pub(crate) unsafe extern "C" fn object_get_instance_id(object: sys::GDExtensionConstObjectPtr) -> sys::GDObjectInstanceID {
    id_of_address(object as usize)
}

pub(crate) unsafe extern "C" fn object_get_instance_from_id(id: sys::GDObjectInstanceID) -> sys::GDExtensionObjectPtr {
    address_of(id) as sys::GDExtensionObjectPtr
}

/// Returns `object` if its class derives from the class of `tag`, null otherwise.
pub(crate) unsafe extern "C" fn object_cast_to(
    object: sys::GDExtensionConstObjectPtr,
    tag: *mut c_void,
) -> sys::GDExtensionObjectPtr {
    let engine = engine();
    let Some(target) = engine.class_by_tag(tag as usize) else {
        return ptr::null_mut();
    };

    match engine.object(object as usize) {
        Some(record) if engine.inherits(&record.class, target) => object as sys::GDExtensionObjectPtr,
        _ => ptr::null_mut(),
    }
}

pub(crate) unsafe extern "C" fn object_set_instance(
    object: sys::GDExtensionObjectPtr,
    class: sys::GDExtensionConstStringNamePtr,
    instance: sys::GDExtensionClassInstancePtr,
) {
    let class = strings::read(class);
    let mut engine = engine();
    if let Some(record) = engine.object_mut(object as usize) {
        record.class = class;
        record.instance = instance as usize;
    }
}

pub(crate) unsafe extern "C" fn object_get_instance_binding(
    object: sys::GDExtensionObjectPtr,
    token: *mut c_void,
    callbacks: *const sys::GDExtensionInstanceBindingCallbacks,
) -> *mut c_void {
    let address = object as usize;
    let existing = {
        let engine = engine();
        let Some(record) = engine.object(address) else {
            return ptr::null_mut();
        };
        record.bindings.iter().find(|b| b.token == token as usize).map(|b| b.data)
    };

    if let Some(data) = existing {
        return data as *mut c_void;
    }
    if callbacks.is_null() {
        return ptr::null_mut();
    }
    let Some(create) = (*callbacks).create_callback else {
        return ptr::null_mut();
    };

    let data = create(token, object);
    if let Some(record) = engine().object_mut(address) {
        record.bindings.push(Binding {
            token: token as usize,
            data: data as usize,
            free: (*callbacks).free_callback,
        });
    }
    data
}

pub(crate) unsafe extern "C" fn object_set_instance_binding(
    object: sys::GDExtensionObjectPtr,
    token: *mut c_void,
    data: *mut c_void,
    callbacks: *const sys::GDExtensionInstanceBindingCallbacks,
) {
    let free = if callbacks.is_null() {
        None
    } else {
        (*callbacks).free_callback
    };
    let binding = Binding {
        token: token as usize,
        data: data as usize,
        free,
    };

    let mut engine = engine();
    let Some(record) = engine.object_mut(object as usize) else {
        return;
    };
    record.bindings.retain(|b| b.token != binding.token);
    record.bindings.push(binding);
}
