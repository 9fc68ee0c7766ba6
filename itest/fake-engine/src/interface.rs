/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! `get_proc_address` and the interface functions that do not belong to a more specific module.

use std::cmp::Ordering;
use std::ffi::{c_char, c_void, CStr};

use godot_ffi as sys;
use sys::VariantType;

use crate::state::{engine, report, MessageKind};
use crate::value::{self, RawVariant, Value};
use crate::{callables, classdb, containers, objects, slots, strings};

pub(crate) const VERSION_MAJOR: u32 = 4;
pub(crate) const VERSION_MINOR: u32 = 3;
pub(crate) const VERSION_PATCH: u32 = 0;
const VERSION_STRING: &CStr = c"4.3.stable.fake-engine";

macro_rules! interface_table {
    ( $( $name:literal => $func:path ),* $(,)? ) => {
        /// Names of all functions the engine provides.
        pub(crate) const FUNCTION_NAMES: &[&str] = &[ $( $name, )* ];

        fn lookup(name: &str) -> sys::GDExtensionInterfaceFunctionPtr {
            match name {
                $(
                    // SAFETY: the library transmutes back to the signature that belongs to this name.
                    $name => Some(unsafe {
                        std::mem::transmute::<*const (), unsafe extern "C" fn()>($func as *const ())
                    }),
                )*
                _ => None,
            }
        }
    };
}

interface_table! {
    "get_godot_version" => get_godot_version,
    "mem_alloc" => mem_alloc,
    "mem_realloc" => mem_realloc,
    "mem_free" => mem_free,
    "print_error" => print_error,
    "print_warning" => print_warning,
    "print_script_error" => print_script_error,

    "variant_new_copy" => variant_new_copy,
    "variant_new_nil" => variant_new_nil,
    "variant_destroy" => variant_destroy,
    "variant_get_type" => variant_get_type,
    "variant_stringify" => variant_stringify,
    "variant_booleanize" => variant_booleanize,
    "variant_hash" => variant_hash,
    "variant_evaluate" => variant_evaluate,
    "get_variant_from_type_constructor" => get_variant_from_type_constructor,
    "get_variant_to_type_constructor" => get_variant_to_type_constructor,
    "variant_get_ptr_constructor" => variant_get_ptr_constructor,
    "variant_get_ptr_destructor" => variant_get_ptr_destructor,
    "variant_get_ptr_builtin_method" => variant_get_ptr_builtin_method,

    "string_new_with_utf8_chars_and_len" => strings::string_new_with_utf8_chars_and_len,
    "string_to_utf8_chars" => strings::string_to_utf8_chars,
    "string_name_new_with_utf8_chars_and_len" => strings::string_name_new_with_utf8_chars_and_len,
    "array_operator_index" => containers::array_operator_index,
    "dictionary_operator_index" => containers::dictionary_operator_index,
    "packed_byte_array_operator_index" => containers::packed_operator_index,
    "packed_int32_array_operator_index" => containers::packed_operator_index,
    "packed_int64_array_operator_index" => containers::packed_operator_index,
    "packed_float32_array_operator_index" => containers::packed_operator_index,
    "packed_float64_array_operator_index" => containers::packed_operator_index,
    "packed_string_array_operator_index" => containers::packed_operator_index,
    "packed_vector2_array_operator_index" => containers::packed_operator_index,
    "packed_vector3_array_operator_index" => containers::packed_operator_index,
    "packed_color_array_operator_index" => containers::packed_operator_index,
    "packed_vector4_array_operator_index" => containers::packed_operator_index,

    "classdb_construct_object" => classdb::classdb_construct_object,
    "classdb_get_method_bind" => objects::classdb_get_method_bind,
    "classdb_get_class_tag" => classdb::classdb_get_class_tag,
    "object_destroy" => objects::object_destroy,
    "object_method_bind_ptrcall" => objects::object_method_bind_ptrcall,
    "object_method_bind_call" => objects::object_method_bind_call,
    "object_cast_to" => objects::object_cast_to,
    "object_get_instance_id" => objects::object_get_instance_id,
    "object_get_instance_from_id" => objects::object_get_instance_from_id,
    "object_set_instance" => objects::object_set_instance,
    "object_get_instance_binding" => objects::object_get_instance_binding,
    "object_set_instance_binding" => objects::object_set_instance_binding,
    "callable_custom_create2" => callables::callable_custom_create2,

    "classdb_register_extension_class3" => classdb::classdb_register_extension_class3,
    "classdb_register_extension_class_method" => classdb::classdb_register_extension_class_method,
    "classdb_register_extension_class_property" => classdb::classdb_register_extension_class_property,
    "classdb_register_extension_class_signal" => classdb::classdb_register_extension_class_signal,
    "classdb_unregister_extension_class" => classdb::classdb_unregister_extension_class,
}

/// Resolves interface functions by name. Functions withheld through the host API resolve to null.
pub(crate) unsafe extern "C" fn get_proc_address(name: *const c_char) -> sys::GDExtensionInterfaceFunctionPtr {
    if name.is_null() {
        return None;
    }
    let Ok(name) = CStr::from_ptr(name).to_str() else {
        return None;
    };

    if engine().withheld_functions.iter().any(|withheld| withheld == name) {
        return None;
    }
    lookup(name)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Version, memory, printing

unsafe extern "C" fn get_godot_version(version: *mut sys::GDExtensionGodotVersion) {
    *version = sys::GDExtensionGodotVersion {
        major: VERSION_MAJOR,
        minor: VERSION_MINOR,
        patch: VERSION_PATCH,
        string: VERSION_STRING.as_ptr(),
    };
}

unsafe extern "C" fn mem_alloc(bytes: usize) -> *mut c_void {
    libc::malloc(bytes)
}

unsafe extern "C" fn mem_realloc(ptr: *mut c_void, bytes: usize) -> *mut c_void {
    libc::realloc(ptr, bytes)
}

unsafe extern "C" fn mem_free(ptr: *mut c_void) {
    libc::free(ptr)
}

unsafe fn c_text(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

unsafe fn print_message(kind: MessageKind, description: *const c_char, function: *const c_char, file: *const c_char, line: i32) {
    let description = c_text(description);
    eprintln!("   at: {} ({}:{line})", c_text(function), c_text(file));
    report(kind, description);
}

unsafe extern "C" fn print_error(
    description: *const c_char,
    function: *const c_char,
    file: *const c_char,
    line: i32,
    _editor_notify: sys::GDExtensionBool,
) {
    print_message(MessageKind::Error, description, function, file, line);
}

unsafe extern "C" fn print_warning(
    description: *const c_char,
    function: *const c_char,
    file: *const c_char,
    line: i32,
    _editor_notify: sys::GDExtensionBool,
) {
    print_message(MessageKind::Warning, description, function, file, line);
}

unsafe extern "C" fn print_script_error(
    description: *const c_char,
    function: *const c_char,
    file: *const c_char,
    line: i32,
    _editor_notify: sys::GDExtensionBool,
) {
    print_message(MessageKind::ScriptError, description, function, file, line);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Variant

unsafe extern "C" fn variant_new_copy(dst: sys::GDExtensionUninitializedVariantPtr, src: sys::GDExtensionConstVariantPtr) {
    value::variant_write(dst, value::variant_ref(src).clone());
}

unsafe extern "C" fn variant_new_nil(dst: sys::GDExtensionUninitializedVariantPtr) {
    value::variant_write(dst, RawVariant::default());
}

unsafe extern "C" fn variant_destroy(variant: sys::GDExtensionVariantPtr) {
    std::ptr::drop_in_place(variant as *mut RawVariant);
}

unsafe extern "C" fn variant_get_type(variant: sys::GDExtensionConstVariantPtr) -> sys::GDExtensionVariantType {
    value::variant_ref(variant).variant_type().sys()
}

/// Assigns to an initialized string.
unsafe extern "C" fn variant_stringify(variant: sys::GDExtensionConstVariantPtr, ret: sys::GDExtensionStringPtr) {
    let text = value::variant_ref(variant).value().stringify();
    strings::assign(ret, text);
}

unsafe extern "C" fn variant_booleanize(variant: sys::GDExtensionConstVariantPtr) -> sys::GDExtensionBool {
    value::variant_ref(variant).value().booleanize() as sys::GDExtensionBool
}

unsafe extern "C" fn variant_hash(variant: sys::GDExtensionConstVariantPtr) -> sys::GDExtensionInt {
    value::variant_ref(variant).value().hash32() as sys::GDExtensionInt
}

/// Supports the comparison operators. The result is always initialized; `r_valid` reports whether the operation applied.
unsafe extern "C" fn variant_evaluate(
    op: sys::GDExtensionVariantOperator,
    a: sys::GDExtensionConstVariantPtr,
    b: sys::GDExtensionConstVariantPtr,
    ret: sys::GDExtensionUninitializedVariantPtr,
    valid: *mut sys::GDExtensionBool,
) {
    let lhs = value::variant_ref(a).value();
    let rhs = value::variant_ref(b).value();

    let outcome = match op {
        sys::GDEXTENSION_VARIANT_OP_EQUAL => Some(lhs.equals(rhs)),
        sys::GDEXTENSION_VARIANT_OP_NOT_EQUAL => Some(!lhs.equals(rhs)),
        sys::GDEXTENSION_VARIANT_OP_LESS => lhs.compare(rhs).map(Ordering::is_lt),
        sys::GDEXTENSION_VARIANT_OP_LESS_EQUAL => lhs.compare(rhs).map(Ordering::is_le),
        sys::GDEXTENSION_VARIANT_OP_GREATER => lhs.compare(rhs).map(Ordering::is_gt),
        sys::GDEXTENSION_VARIANT_OP_GREATER_EQUAL => lhs.compare(rhs).map(Ordering::is_ge),
        _ => None,
    };

    let result = outcome.map_or(Value::Nil, Value::Bool);
    value::variant_write(ret, RawVariant::new(result));
    if !valid.is_null() {
        *valid = outcome.is_some() as sys::GDExtensionBool;
    }
}

unsafe extern "C" fn get_variant_from_type_constructor(
    ty: sys::GDExtensionVariantType,
) -> sys::GDExtensionVariantFromTypeConstructorFunc {
    slots::from_type_fn(ty)
}

unsafe extern "C" fn get_variant_to_type_constructor(
    ty: sys::GDExtensionVariantType,
) -> sys::GDExtensionTypeFromVariantConstructorFunc {
    slots::to_type_fn(ty)
}

unsafe extern "C" fn variant_get_ptr_constructor(
    ty: sys::GDExtensionVariantType,
    index: i32,
) -> sys::GDExtensionPtrConstructor {
    slots::ptr_constructor(ty, index)
}

unsafe extern "C" fn variant_get_ptr_destructor(ty: sys::GDExtensionVariantType) -> sys::GDExtensionPtrDestructor {
    slots::ptr_destructor(ty)
}

/// Builtin methods by type and name. Hashes are not checked.
unsafe extern "C" fn variant_get_ptr_builtin_method(
    ty: sys::GDExtensionVariantType,
    method: sys::GDExtensionConstStringNamePtr,
    _hash: sys::GDExtensionInt,
) -> sys::GDExtensionPtrBuiltInMethod {
    builtin_method(VariantType::from_sys(ty), strings::str_ref(method))
}

type BuiltinFn = unsafe extern "C" fn(
    sys::GDExtensionTypePtr,
    *const sys::GDExtensionConstTypePtr,
    sys::GDExtensionTypePtr,
    i32,
);

fn builtin_method(ty: VariantType, method: &str) -> sys::GDExtensionPtrBuiltInMethod {
    let func: BuiltinFn = match (ty, method) {
        (VariantType::Array, "size") => containers::array_size,
        (VariantType::Array, "clear") => containers::array_clear,
        (VariantType::Array, "push_back") => containers::array_push_back,

        (VariantType::Dictionary, "size") => containers::dictionary_size,
        (VariantType::Dictionary, "clear") => containers::dictionary_clear,
        (VariantType::Dictionary, "has") => containers::dictionary_has,
        (VariantType::Dictionary, "erase") => containers::dictionary_erase,
        (VariantType::Dictionary, "keys") => containers::dictionary_keys,
        (VariantType::Dictionary, "values") => containers::dictionary_values,

        (VariantType::Callable, "call") => callables::callable_call,
        (VariantType::Callable, "is_valid") => callables::callable_is_valid,

        (VariantType::Signal, "emit") => callables::signal_emit,
        (VariantType::Signal, "connect") => callables::signal_connect,
        (VariantType::Signal, "get_name") => callables::signal_get_name,
        (VariantType::Signal, "is_null") => callables::signal_is_null,

        (ty, "size") if containers::packed_element_size(ty).is_some() => containers::packed_size,
        (ty, "clear") if containers::packed_element_size(ty).is_some() => containers::packed_clear,
        (ty, "resize") if containers::packed_element_size(ty).is_some() => containers::packed_resize,
        (ty, "push_back") if containers::packed_element_size(ty).is_some() => containers::packed_push_back,

        _ => return None,
    };
    Some(func)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_function_the_library_loads_is_provided() {
        for name in sys::GDExtensionInterface::FUNCTION_NAMES {
            assert!(FUNCTION_NAMES.contains(name), "missing interface function `{name}`");
            assert!(lookup(name).is_some());
        }
    }

    #[test]
    fn unknown_names_resolve_to_null() {
        assert!(lookup("object_free_everything").is_none());
        // SAFETY: null is handled.
        assert!(unsafe { get_proc_address(std::ptr::null()) }.is_none());
    }

    #[test]
    fn builtin_methods_exist_for_all_packed_types() {
        for &ty in VariantType::BUILTINS {
            if containers::packed_element_size(ty).is_some() {
                for method in ["size", "clear", "resize", "push_back"] {
                    assert!(builtin_method(ty, method).is_some(), "{ty:?}::{method}");
                }
            }
        }
        assert!(builtin_method(VariantType::Int, "size").is_none());
    }
}
