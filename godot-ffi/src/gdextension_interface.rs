/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! C declarations of the GDExtension ABI.
//!
//! Mirrors `gdextension_interface.h` (API 4.3) for the subset used by this crate. Naming follows the header, so that
//! symbols can be looked up in Godot's documentation.

#![allow(non_camel_case_types, non_upper_case_globals, non_snake_case, dead_code)]

use std::ffi::{c_char, c_void};

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Scalars and opaque pointers

pub type GDExtensionBool = u8;
pub type GDExtensionInt = i64;
pub type GDObjectInstanceID = u64;

pub type GDExtensionVariantPtr = *mut c_void;
pub type GDExtensionConstVariantPtr = *const c_void;
pub type GDExtensionUninitializedVariantPtr = *mut c_void;
pub type GDExtensionStringNamePtr = *mut c_void;
pub type GDExtensionConstStringNamePtr = *const c_void;
pub type GDExtensionUninitializedStringNamePtr = *mut c_void;
pub type GDExtensionStringPtr = *mut c_void;
pub type GDExtensionConstStringPtr = *const c_void;
pub type GDExtensionUninitializedStringPtr = *mut c_void;
pub type GDExtensionObjectPtr = *mut c_void;
pub type GDExtensionConstObjectPtr = *const c_void;
pub type GDExtensionTypePtr = *mut c_void;
pub type GDExtensionConstTypePtr = *const c_void;
pub type GDExtensionUninitializedTypePtr = *mut c_void;
pub type GDExtensionMethodBindPtr = *const c_void;
pub type GDExtensionClassInstancePtr = *mut c_void;
pub type GDExtensionClassLibraryPtr = *mut c_void;

pub const SYS_TRUE: GDExtensionBool = 1;
pub const SYS_FALSE: GDExtensionBool = 0;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Enumerations

pub type GDExtensionVariantType = u32;

pub const GDEXTENSION_VARIANT_TYPE_NIL: GDExtensionVariantType = 0;
pub const GDEXTENSION_VARIANT_TYPE_BOOL: GDExtensionVariantType = 1;
pub const GDEXTENSION_VARIANT_TYPE_INT: GDExtensionVariantType = 2;
pub const GDEXTENSION_VARIANT_TYPE_FLOAT: GDExtensionVariantType = 3;
pub const GDEXTENSION_VARIANT_TYPE_STRING: GDExtensionVariantType = 4;
pub const GDEXTENSION_VARIANT_TYPE_VECTOR2: GDExtensionVariantType = 5;
pub const GDEXTENSION_VARIANT_TYPE_VECTOR2I: GDExtensionVariantType = 6;
pub const GDEXTENSION_VARIANT_TYPE_RECT2: GDExtensionVariantType = 7;
pub const GDEXTENSION_VARIANT_TYPE_RECT2I: GDExtensionVariantType = 8;
pub const GDEXTENSION_VARIANT_TYPE_VECTOR3: GDExtensionVariantType = 9;
pub const GDEXTENSION_VARIANT_TYPE_VECTOR3I: GDExtensionVariantType = 10;
pub const GDEXTENSION_VARIANT_TYPE_TRANSFORM2D: GDExtensionVariantType = 11;
pub const GDEXTENSION_VARIANT_TYPE_VECTOR4: GDExtensionVariantType = 12;
pub const GDEXTENSION_VARIANT_TYPE_VECTOR4I: GDExtensionVariantType = 13;
pub const GDEXTENSION_VARIANT_TYPE_PLANE: GDExtensionVariantType = 14;
pub const GDEXTENSION_VARIANT_TYPE_QUATERNION: GDExtensionVariantType = 15;
pub const GDEXTENSION_VARIANT_TYPE_AABB: GDExtensionVariantType = 16;
pub const GDEXTENSION_VARIANT_TYPE_BASIS: GDExtensionVariantType = 17;
pub const GDEXTENSION_VARIANT_TYPE_TRANSFORM3D: GDExtensionVariantType = 18;
pub const GDEXTENSION_VARIANT_TYPE_PROJECTION: GDExtensionVariantType = 19;
pub const GDEXTENSION_VARIANT_TYPE_COLOR: GDExtensionVariantType = 20;
pub const GDEXTENSION_VARIANT_TYPE_STRING_NAME: GDExtensionVariantType = 21;
pub const GDEXTENSION_VARIANT_TYPE_NODE_PATH: GDExtensionVariantType = 22;
pub const GDEXTENSION_VARIANT_TYPE_RID: GDExtensionVariantType = 23;
pub const GDEXTENSION_VARIANT_TYPE_OBJECT: GDExtensionVariantType = 24;
pub const GDEXTENSION_VARIANT_TYPE_CALLABLE: GDExtensionVariantType = 25;
pub const GDEXTENSION_VARIANT_TYPE_SIGNAL: GDExtensionVariantType = 26;
pub const GDEXTENSION_VARIANT_TYPE_DICTIONARY: GDExtensionVariantType = 27;
pub const GDEXTENSION_VARIANT_TYPE_ARRAY: GDExtensionVariantType = 28;
pub const GDEXTENSION_VARIANT_TYPE_PACKED_BYTE_ARRAY: GDExtensionVariantType = 29;
pub const GDEXTENSION_VARIANT_TYPE_PACKED_INT32_ARRAY: GDExtensionVariantType = 30;
pub const GDEXTENSION_VARIANT_TYPE_PACKED_INT64_ARRAY: GDExtensionVariantType = 31;
pub const GDEXTENSION_VARIANT_TYPE_PACKED_FLOAT32_ARRAY: GDExtensionVariantType = 32;
pub const GDEXTENSION_VARIANT_TYPE_PACKED_FLOAT64_ARRAY: GDExtensionVariantType = 33;
pub const GDEXTENSION_VARIANT_TYPE_PACKED_STRING_ARRAY: GDExtensionVariantType = 34;
pub const GDEXTENSION_VARIANT_TYPE_PACKED_VECTOR2_ARRAY: GDExtensionVariantType = 35;
pub const GDEXTENSION_VARIANT_TYPE_PACKED_VECTOR3_ARRAY: GDExtensionVariantType = 36;
pub const GDEXTENSION_VARIANT_TYPE_PACKED_COLOR_ARRAY: GDExtensionVariantType = 37;
pub const GDEXTENSION_VARIANT_TYPE_PACKED_VECTOR4_ARRAY: GDExtensionVariantType = 38;
pub const GDEXTENSION_VARIANT_TYPE_VARIANT_MAX: GDExtensionVariantType = 39;

pub type GDExtensionVariantOperator = u32;

pub const GDEXTENSION_VARIANT_OP_EQUAL: GDExtensionVariantOperator = 0;
pub const GDEXTENSION_VARIANT_OP_NOT_EQUAL: GDExtensionVariantOperator = 1;
pub const GDEXTENSION_VARIANT_OP_LESS: GDExtensionVariantOperator = 2;
pub const GDEXTENSION_VARIANT_OP_LESS_EQUAL: GDExtensionVariantOperator = 3;
pub const GDEXTENSION_VARIANT_OP_GREATER: GDExtensionVariantOperator = 4;
pub const GDEXTENSION_VARIANT_OP_GREATER_EQUAL: GDExtensionVariantOperator = 5;
pub const GDEXTENSION_VARIANT_OP_MAX: GDExtensionVariantOperator = 25;

pub type GDExtensionCallErrorType = u32;

pub const GDEXTENSION_CALL_OK: GDExtensionCallErrorType = 0;
pub const GDEXTENSION_CALL_ERROR_INVALID_METHOD: GDExtensionCallErrorType = 1;
pub const GDEXTENSION_CALL_ERROR_INVALID_ARGUMENT: GDExtensionCallErrorType = 2;
pub const GDEXTENSION_CALL_ERROR_TOO_MANY_ARGUMENTS: GDExtensionCallErrorType = 3;
pub const GDEXTENSION_CALL_ERROR_TOO_FEW_ARGUMENTS: GDExtensionCallErrorType = 4;
pub const GDEXTENSION_CALL_ERROR_INSTANCE_IS_NULL: GDExtensionCallErrorType = 5;
pub const GDEXTENSION_CALL_ERROR_METHOD_NOT_CONST: GDExtensionCallErrorType = 6;

pub type GDExtensionInitializationLevel = u32;

pub const GDEXTENSION_INITIALIZATION_CORE: GDExtensionInitializationLevel = 0;
pub const GDEXTENSION_INITIALIZATION_SERVERS: GDExtensionInitializationLevel = 1;
pub const GDEXTENSION_INITIALIZATION_SCENE: GDExtensionInitializationLevel = 2;
pub const GDEXTENSION_INITIALIZATION_EDITOR: GDExtensionInitializationLevel = 3;
pub const GDEXTENSION_MAX_INITIALIZATION_LEVEL: GDExtensionInitializationLevel = 4;

pub type GDExtensionClassMethodFlags = u32;

pub const GDEXTENSION_METHOD_FLAG_NORMAL: GDExtensionClassMethodFlags = 1;
pub const GDEXTENSION_METHOD_FLAG_EDITOR: GDExtensionClassMethodFlags = 2;
pub const GDEXTENSION_METHOD_FLAG_CONST: GDExtensionClassMethodFlags = 4;
pub const GDEXTENSION_METHOD_FLAG_VIRTUAL: GDExtensionClassMethodFlags = 8;
pub const GDEXTENSION_METHOD_FLAG_VARARG: GDExtensionClassMethodFlags = 16;
pub const GDEXTENSION_METHOD_FLAG_STATIC: GDExtensionClassMethodFlags = 32;
pub const GDEXTENSION_METHOD_FLAGS_DEFAULT: GDExtensionClassMethodFlags = GDEXTENSION_METHOD_FLAG_NORMAL;

pub type GDExtensionClassMethodArgumentMetadata = u32;

pub const GDEXTENSION_METHOD_ARGUMENT_METADATA_NONE: GDExtensionClassMethodArgumentMetadata = 0;
pub const GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_INT8: GDExtensionClassMethodArgumentMetadata = 1;
pub const GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_INT16: GDExtensionClassMethodArgumentMetadata = 2;
pub const GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_INT32: GDExtensionClassMethodArgumentMetadata = 3;
pub const GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_INT64: GDExtensionClassMethodArgumentMetadata = 4;
pub const GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_UINT8: GDExtensionClassMethodArgumentMetadata = 5;
pub const GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_UINT16: GDExtensionClassMethodArgumentMetadata = 6;
pub const GDEXTENSION_METHOD_ARGUMENT_METADATA_INT_IS_UINT32: GDExtensionClassMethodArgumentMetadata = 7;
pub const GDEXTENSION_METHOD_ARGUMENT_METADATA_REAL_IS_FLOAT: GDExtensionClassMethodArgumentMetadata = 9;
pub const GDEXTENSION_METHOD_ARGUMENT_METADATA_REAL_IS_DOUBLE: GDExtensionClassMethodArgumentMetadata = 10;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Structs

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GDExtensionCallError {
    pub error: GDExtensionCallErrorType,
    pub argument: i32,
    pub expected: i32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GDExtensionGodotVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub string: *const c_char,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GDExtensionPropertyInfo {
    pub type_: GDExtensionVariantType,
    pub name: GDExtensionStringNamePtr,
    pub class_name: GDExtensionStringNamePtr,
    pub hint: u32,
    pub hint_string: GDExtensionStringPtr,
    pub usage: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GDExtensionClassMethodInfo {
    pub name: GDExtensionStringNamePtr,
    pub method_userdata: *mut c_void,
    pub call_func: GDExtensionClassMethodCall,
    pub ptrcall_func: GDExtensionClassMethodPtrCall,
    pub method_flags: u32,
    pub has_return_value: GDExtensionBool,
    pub return_value_info: *mut GDExtensionPropertyInfo,
    pub return_value_metadata: GDExtensionClassMethodArgumentMetadata,
    pub argument_count: u32,
    pub arguments_info: *mut GDExtensionPropertyInfo,
    pub arguments_metadata: *mut GDExtensionClassMethodArgumentMetadata,
    pub default_argument_count: u32,
    pub default_arguments: *mut GDExtensionVariantPtr,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GDExtensionClassCreationInfo3 {
    pub is_virtual: GDExtensionBool,
    pub is_abstract: GDExtensionBool,
    pub is_exposed: GDExtensionBool,
    pub is_runtime: GDExtensionBool,
    pub set_func: GDExtensionClassSet,
    pub get_func: GDExtensionClassGet,
    pub get_property_list_func: GDExtensionClassGetPropertyList,
    pub free_property_list_func: GDExtensionClassFreePropertyList2,
    pub property_can_revert_func: GDExtensionClassPropertyCanRevert,
    pub property_get_revert_func: GDExtensionClassPropertyGetRevert,
    pub validate_property_func: GDExtensionClassValidateProperty,
    pub notification_func: GDExtensionClassNotification2,
    pub to_string_func: GDExtensionClassToString,
    pub reference_func: GDExtensionClassReference,
    pub unreference_func: GDExtensionClassUnreference,
    pub create_instance_func: GDExtensionClassCreateInstance,
    pub free_instance_func: GDExtensionClassFreeInstance,
    pub recreate_instance_func: GDExtensionClassRecreateInstance,
    pub get_virtual_func: GDExtensionClassGetVirtual,
    pub get_virtual_call_data_func: GDExtensionClassGetVirtualCallData,
    pub call_virtual_with_data_func: GDExtensionClassCallVirtualWithData,
    pub get_rid_func: GDExtensionClassGetRID,
    pub class_userdata: *mut c_void,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GDExtensionInstanceBindingCallbacks {
    pub create_callback: GDExtensionInstanceBindingCreateCallback,
    pub free_callback: GDExtensionInstanceBindingFreeCallback,
    pub reference_callback: GDExtensionInstanceBindingReferenceCallback,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GDExtensionCallableCustomInfo2 {
    pub callable_userdata: *mut c_void,
    pub token: *mut c_void,
    pub object_id: GDObjectInstanceID,
    pub call_func: GDExtensionCallableCustomCall,
    pub is_valid_func: GDExtensionCallableCustomIsValid,
    pub free_func: GDExtensionCallableCustomFree,
    pub hash_func: GDExtensionCallableCustomHash,
    pub equal_func: GDExtensionCallableCustomEqual,
    pub less_than_func: GDExtensionCallableCustomLessThan,
    pub to_string_func: GDExtensionCallableCustomToString,
    pub get_argument_count_func: GDExtensionCallableCustomGetArgumentCount,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GDExtensionInitialization {
    pub minimum_initialization_level: GDExtensionInitializationLevel,
    pub userdata: *mut c_void,
    pub initialize: GDExtensionInitializeCallback,
    pub deinitialize: GDExtensionDeinitializeCallback,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Function pointer types: type operations

pub type GDExtensionVariantFromTypeConstructorFunc =
    Option<unsafe extern "C" fn(GDExtensionUninitializedVariantPtr, GDExtensionTypePtr)>;
pub type GDExtensionTypeFromVariantConstructorFunc =
    Option<unsafe extern "C" fn(GDExtensionUninitializedTypePtr, GDExtensionVariantPtr)>;
pub type GDExtensionPtrConstructor =
    Option<unsafe extern "C" fn(GDExtensionUninitializedTypePtr, *const GDExtensionConstTypePtr)>;
pub type GDExtensionPtrDestructor = Option<unsafe extern "C" fn(GDExtensionTypePtr)>;
pub type GDExtensionPtrBuiltInMethod = Option<
    unsafe extern "C" fn(
        p_base: GDExtensionTypePtr,
        p_args: *const GDExtensionConstTypePtr,
        r_return: GDExtensionTypePtr,
        p_argument_count: i32,
    ),
>;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Function pointer types: class callbacks

pub type GDExtensionClassSet = Option<
    unsafe extern "C" fn(
        p_instance: GDExtensionClassInstancePtr,
        p_name: GDExtensionConstStringNamePtr,
        p_value: GDExtensionConstVariantPtr,
    ) -> GDExtensionBool,
>;
pub type GDExtensionClassGet = Option<
    unsafe extern "C" fn(
        p_instance: GDExtensionClassInstancePtr,
        p_name: GDExtensionConstStringNamePtr,
        r_ret: GDExtensionVariantPtr,
    ) -> GDExtensionBool,
>;
pub type GDExtensionClassGetRID = Option<unsafe extern "C" fn(p_instance: GDExtensionClassInstancePtr) -> u64>;
pub type GDExtensionClassGetPropertyList = Option<
    unsafe extern "C" fn(
        p_instance: GDExtensionClassInstancePtr,
        r_count: *mut u32,
    ) -> *const GDExtensionPropertyInfo,
>;
pub type GDExtensionClassFreePropertyList2 = Option<
    unsafe extern "C" fn(
        p_instance: GDExtensionClassInstancePtr,
        p_list: *const GDExtensionPropertyInfo,
        p_count: u32,
    ),
>;
pub type GDExtensionClassPropertyCanRevert = Option<
    unsafe extern "C" fn(
        p_instance: GDExtensionClassInstancePtr,
        p_name: GDExtensionConstStringNamePtr,
    ) -> GDExtensionBool,
>;
pub type GDExtensionClassPropertyGetRevert = Option<
    unsafe extern "C" fn(
        p_instance: GDExtensionClassInstancePtr,
        p_name: GDExtensionConstStringNamePtr,
        r_ret: GDExtensionVariantPtr,
    ) -> GDExtensionBool,
>;
pub type GDExtensionClassValidateProperty = Option<
    unsafe extern "C" fn(
        p_instance: GDExtensionClassInstancePtr,
        p_property: *mut GDExtensionPropertyInfo,
    ) -> GDExtensionBool,
>;
pub type GDExtensionClassNotification2 = Option<
    unsafe extern "C" fn(p_instance: GDExtensionClassInstancePtr, p_what: i32, p_reversed: GDExtensionBool),
>;
pub type GDExtensionClassToString = Option<
    unsafe extern "C" fn(
        p_instance: GDExtensionClassInstancePtr,
        r_is_valid: *mut GDExtensionBool,
        p_out: GDExtensionStringPtr,
    ),
>;
pub type GDExtensionClassReference = Option<unsafe extern "C" fn(p_instance: GDExtensionClassInstancePtr)>;
pub type GDExtensionClassUnreference = Option<unsafe extern "C" fn(p_instance: GDExtensionClassInstancePtr)>;
pub type GDExtensionClassCallVirtual = Option<
    unsafe extern "C" fn(
        p_instance: GDExtensionClassInstancePtr,
        p_args: *const GDExtensionConstTypePtr,
        r_ret: GDExtensionTypePtr,
    ),
>;
pub type GDExtensionClassCreateInstance =
    Option<unsafe extern "C" fn(p_class_userdata: *mut c_void) -> GDExtensionObjectPtr>;
pub type GDExtensionClassFreeInstance =
    Option<unsafe extern "C" fn(p_class_userdata: *mut c_void, p_instance: GDExtensionClassInstancePtr)>;
pub type GDExtensionClassRecreateInstance = Option<
    unsafe extern "C" fn(p_class_userdata: *mut c_void, p_object: GDExtensionObjectPtr) -> GDExtensionClassInstancePtr,
>;
pub type GDExtensionClassGetVirtual = Option<
    unsafe extern "C" fn(
        p_class_userdata: *mut c_void,
        p_name: GDExtensionConstStringNamePtr,
    ) -> GDExtensionClassCallVirtual,
>;
pub type GDExtensionClassGetVirtualCallData = Option<
    unsafe extern "C" fn(p_class_userdata: *mut c_void, p_name: GDExtensionConstStringNamePtr) -> *mut c_void,
>;
pub type GDExtensionClassCallVirtualWithData = Option<
    unsafe extern "C" fn(
        p_instance: GDExtensionClassInstancePtr,
        p_name: GDExtensionConstStringNamePtr,
        p_virtual_call_userdata: *mut c_void,
        p_args: *const GDExtensionConstTypePtr,
        r_ret: GDExtensionTypePtr,
    ),
>;
pub type GDExtensionClassMethodCall = Option<
    unsafe extern "C" fn(
        method_userdata: *mut c_void,
        p_instance: GDExtensionClassInstancePtr,
        p_args: *const GDExtensionConstVariantPtr,
        p_argument_count: GDExtensionInt,
        r_return: GDExtensionVariantPtr,
        r_error: *mut GDExtensionCallError,
    ),
>;
pub type GDExtensionClassMethodPtrCall = Option<
    unsafe extern "C" fn(
        method_userdata: *mut c_void,
        p_instance: GDExtensionClassInstancePtr,
        p_args: *const GDExtensionConstTypePtr,
        r_ret: GDExtensionTypePtr,
    ),
>;

pub type GDExtensionInstanceBindingCreateCallback =
    Option<unsafe extern "C" fn(p_token: *mut c_void, p_instance: *mut c_void) -> *mut c_void>;
pub type GDExtensionInstanceBindingFreeCallback =
    Option<unsafe extern "C" fn(p_token: *mut c_void, p_instance: *mut c_void, p_binding: *mut c_void)>;
pub type GDExtensionInstanceBindingReferenceCallback = Option<
    unsafe extern "C" fn(p_token: *mut c_void, p_binding: *mut c_void, p_reference: GDExtensionBool) -> GDExtensionBool,
>;

pub type GDExtensionCallableCustomCall = Option<
    unsafe extern "C" fn(
        callable_userdata: *mut c_void,
        p_args: *const GDExtensionConstVariantPtr,
        p_argument_count: GDExtensionInt,
        r_return: GDExtensionVariantPtr,
        r_error: *mut GDExtensionCallError,
    ),
>;
pub type GDExtensionCallableCustomIsValid =
    Option<unsafe extern "C" fn(callable_userdata: *mut c_void) -> GDExtensionBool>;
pub type GDExtensionCallableCustomFree = Option<unsafe extern "C" fn(callable_userdata: *mut c_void)>;
pub type GDExtensionCallableCustomHash = Option<unsafe extern "C" fn(callable_userdata: *mut c_void) -> u32>;
pub type GDExtensionCallableCustomEqual = Option<
    unsafe extern "C" fn(callable_userdata_a: *mut c_void, callable_userdata_b: *mut c_void) -> GDExtensionBool,
>;
pub type GDExtensionCallableCustomLessThan = Option<
    unsafe extern "C" fn(callable_userdata_a: *mut c_void, callable_userdata_b: *mut c_void) -> GDExtensionBool,
>;
pub type GDExtensionCallableCustomToString = Option<
    unsafe extern "C" fn(callable_userdata: *mut c_void, r_is_valid: *mut GDExtensionBool, r_out: GDExtensionStringPtr),
>;
pub type GDExtensionCallableCustomGetArgumentCount = Option<
    unsafe extern "C" fn(callable_userdata: *mut c_void, r_is_valid: *mut GDExtensionBool) -> GDExtensionInt,
>;

pub type GDExtensionInitializeCallback =
    Option<unsafe extern "C" fn(userdata: *mut c_void, p_level: GDExtensionInitializationLevel)>;
pub type GDExtensionDeinitializeCallback =
    Option<unsafe extern "C" fn(userdata: *mut c_void, p_level: GDExtensionInitializationLevel)>;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Function pointer types: interface loading

pub type GDExtensionInterfaceFunctionPtr = Option<unsafe extern "C" fn()>;
pub type GDExtensionInterfaceGetProcAddress =
    Option<unsafe extern "C" fn(p_function_name: *const c_char) -> GDExtensionInterfaceFunctionPtr>;
pub type GDExtensionInitializationFunction = Option<
    unsafe extern "C" fn(
        p_get_proc_address: GDExtensionInterfaceGetProcAddress,
        p_library: GDExtensionClassLibraryPtr,
        r_initialization: *mut GDExtensionInitialization,
    ) -> GDExtensionBool,
>;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Function pointer types: interface functions

pub type GDExtensionInterfaceGetGodotVersion = Option<unsafe extern "C" fn(r_godot_version: *mut GDExtensionGodotVersion)>;
pub type GDExtensionInterfaceMemAlloc = Option<unsafe extern "C" fn(p_bytes: usize) -> *mut c_void>;
pub type GDExtensionInterfaceMemRealloc = Option<unsafe extern "C" fn(p_ptr: *mut c_void, p_bytes: usize) -> *mut c_void>;
pub type GDExtensionInterfaceMemFree = Option<unsafe extern "C" fn(p_ptr: *mut c_void)>;
pub type GDExtensionInterfacePrintError = Option<
    unsafe extern "C" fn(
        p_description: *const c_char,
        p_function: *const c_char,
        p_file: *const c_char,
        p_line: i32,
        p_editor_notify: GDExtensionBool,
    ),
>;
pub type GDExtensionInterfacePrintWarning = GDExtensionInterfacePrintError;
pub type GDExtensionInterfacePrintScriptError = GDExtensionInterfacePrintError;

pub type GDExtensionInterfaceVariantNewCopy =
    Option<unsafe extern "C" fn(r_dest: GDExtensionUninitializedVariantPtr, p_src: GDExtensionConstVariantPtr)>;
pub type GDExtensionInterfaceVariantNewNil = Option<unsafe extern "C" fn(r_dest: GDExtensionUninitializedVariantPtr)>;
pub type GDExtensionInterfaceVariantDestroy = Option<unsafe extern "C" fn(p_self: GDExtensionVariantPtr)>;
pub type GDExtensionInterfaceVariantGetType =
    Option<unsafe extern "C" fn(p_self: GDExtensionConstVariantPtr) -> GDExtensionVariantType>;
pub type GDExtensionInterfaceVariantStringify =
    Option<unsafe extern "C" fn(p_self: GDExtensionConstVariantPtr, r_ret: GDExtensionStringPtr)>;
pub type GDExtensionInterfaceVariantBooleanize =
    Option<unsafe extern "C" fn(p_self: GDExtensionConstVariantPtr) -> GDExtensionBool>;
pub type GDExtensionInterfaceVariantHash = Option<unsafe extern "C" fn(p_self: GDExtensionConstVariantPtr) -> GDExtensionInt>;
pub type GDExtensionInterfaceVariantEvaluate = Option<
    unsafe extern "C" fn(
        p_op: GDExtensionVariantOperator,
        p_a: GDExtensionConstVariantPtr,
        p_b: GDExtensionConstVariantPtr,
        r_return: GDExtensionUninitializedVariantPtr,
        r_valid: *mut GDExtensionBool,
    ),
>;
pub type GDExtensionInterfaceGetVariantFromTypeConstructor =
    Option<unsafe extern "C" fn(p_type: GDExtensionVariantType) -> GDExtensionVariantFromTypeConstructorFunc>;
pub type GDExtensionInterfaceGetVariantToTypeConstructor =
    Option<unsafe extern "C" fn(p_type: GDExtensionVariantType) -> GDExtensionTypeFromVariantConstructorFunc>;
pub type GDExtensionInterfaceVariantGetPtrConstructor = Option<
    unsafe extern "C" fn(p_type: GDExtensionVariantType, p_constructor: i32) -> GDExtensionPtrConstructor,
>;
pub type GDExtensionInterfaceVariantGetPtrDestructor =
    Option<unsafe extern "C" fn(p_type: GDExtensionVariantType) -> GDExtensionPtrDestructor>;
pub type GDExtensionInterfaceVariantGetPtrBuiltinMethod = Option<
    unsafe extern "C" fn(
        p_type: GDExtensionVariantType,
        p_method: GDExtensionConstStringNamePtr,
        p_hash: GDExtensionInt,
    ) -> GDExtensionPtrBuiltInMethod,
>;

pub type GDExtensionInterfaceStringNewWithUtf8CharsAndLen = Option<
    unsafe extern "C" fn(r_dest: GDExtensionUninitializedStringPtr, p_contents: *const c_char, p_size: GDExtensionInt),
>;
pub type GDExtensionInterfaceStringToUtf8Chars = Option<
    unsafe extern "C" fn(
        p_self: GDExtensionConstStringPtr,
        r_text: *mut c_char,
        p_max_write_length: GDExtensionInt,
    ) -> GDExtensionInt,
>;
pub type GDExtensionInterfaceStringNameNewWithUtf8CharsAndLen = Option<
    unsafe extern "C" fn(r_dest: GDExtensionUninitializedStringNamePtr, p_contents: *const c_char, p_size: GDExtensionInt),
>;

pub type GDExtensionInterfaceArrayOperatorIndex =
    Option<unsafe extern "C" fn(p_self: GDExtensionTypePtr, p_index: GDExtensionInt) -> GDExtensionVariantPtr>;
pub type GDExtensionInterfaceDictionaryOperatorIndex = Option<
    unsafe extern "C" fn(p_self: GDExtensionTypePtr, p_key: GDExtensionConstVariantPtr) -> GDExtensionVariantPtr,
>;
pub type GDExtensionInterfacePackedByteArrayOperatorIndex =
    Option<unsafe extern "C" fn(p_self: GDExtensionTypePtr, p_index: GDExtensionInt) -> *mut u8>;
pub type GDExtensionInterfacePackedInt32ArrayOperatorIndex =
    Option<unsafe extern "C" fn(p_self: GDExtensionTypePtr, p_index: GDExtensionInt) -> *mut i32>;
pub type GDExtensionInterfacePackedInt64ArrayOperatorIndex =
    Option<unsafe extern "C" fn(p_self: GDExtensionTypePtr, p_index: GDExtensionInt) -> *mut i64>;
pub type GDExtensionInterfacePackedFloat32ArrayOperatorIndex =
    Option<unsafe extern "C" fn(p_self: GDExtensionTypePtr, p_index: GDExtensionInt) -> *mut f32>;
pub type GDExtensionInterfacePackedFloat64ArrayOperatorIndex =
    Option<unsafe extern "C" fn(p_self: GDExtensionTypePtr, p_index: GDExtensionInt) -> *mut f64>;
pub type GDExtensionInterfacePackedStringArrayOperatorIndex =
    Option<unsafe extern "C" fn(p_self: GDExtensionTypePtr, p_index: GDExtensionInt) -> GDExtensionStringPtr>;
pub type GDExtensionInterfacePackedVector2ArrayOperatorIndex =
    Option<unsafe extern "C" fn(p_self: GDExtensionTypePtr, p_index: GDExtensionInt) -> GDExtensionTypePtr>;
pub type GDExtensionInterfacePackedVector3ArrayOperatorIndex = GDExtensionInterfacePackedVector2ArrayOperatorIndex;
pub type GDExtensionInterfacePackedVector4ArrayOperatorIndex = GDExtensionInterfacePackedVector2ArrayOperatorIndex;
pub type GDExtensionInterfacePackedColorArrayOperatorIndex = GDExtensionInterfacePackedVector2ArrayOperatorIndex;

pub type GDExtensionInterfaceObjectMethodBindCall = Option<
    unsafe extern "C" fn(
        p_method_bind: GDExtensionMethodBindPtr,
        p_instance: GDExtensionObjectPtr,
        p_args: *const GDExtensionConstVariantPtr,
        p_arg_count: GDExtensionInt,
        r_ret: GDExtensionUninitializedVariantPtr,
        r_error: *mut GDExtensionCallError,
    ),
>;
pub type GDExtensionInterfaceObjectMethodBindPtrcall = Option<
    unsafe extern "C" fn(
        p_method_bind: GDExtensionMethodBindPtr,
        p_instance: GDExtensionObjectPtr,
        p_args: *const GDExtensionConstTypePtr,
        r_ret: GDExtensionTypePtr,
    ),
>;
pub type GDExtensionInterfaceObjectDestroy = Option<unsafe extern "C" fn(p_o: GDExtensionObjectPtr)>;
pub type GDExtensionInterfaceObjectGetInstanceBinding = Option<
    unsafe extern "C" fn(
        p_o: GDExtensionObjectPtr,
        p_token: *mut c_void,
        p_callbacks: *const GDExtensionInstanceBindingCallbacks,
    ) -> *mut c_void,
>;
pub type GDExtensionInterfaceObjectSetInstanceBinding = Option<
    unsafe extern "C" fn(
        p_o: GDExtensionObjectPtr,
        p_token: *mut c_void,
        p_binding: *mut c_void,
        p_callbacks: *const GDExtensionInstanceBindingCallbacks,
    ),
>;
pub type GDExtensionInterfaceObjectSetInstance = Option<
    unsafe extern "C" fn(
        p_o: GDExtensionObjectPtr,
        p_classname: GDExtensionConstStringNamePtr,
        p_instance: GDExtensionClassInstancePtr,
    ),
>;
pub type GDExtensionInterfaceObjectCastTo =
    Option<unsafe extern "C" fn(p_object: GDExtensionConstObjectPtr, p_class_tag: *mut c_void) -> GDExtensionObjectPtr>;
pub type GDExtensionInterfaceObjectGetInstanceFromId =
    Option<unsafe extern "C" fn(p_instance_id: GDObjectInstanceID) -> GDExtensionObjectPtr>;
pub type GDExtensionInterfaceObjectGetInstanceId =
    Option<unsafe extern "C" fn(p_object: GDExtensionConstObjectPtr) -> GDObjectInstanceID>;
pub type GDExtensionInterfaceCallableCustomCreate2 = Option<
    unsafe extern "C" fn(r_callable: GDExtensionUninitializedTypePtr, p_callable_custom_info: *mut GDExtensionCallableCustomInfo2),
>;

pub type GDExtensionInterfaceClassdbConstructObject =
    Option<unsafe extern "C" fn(p_classname: GDExtensionConstStringNamePtr) -> GDExtensionObjectPtr>;
pub type GDExtensionInterfaceClassdbGetMethodBind = Option<
    unsafe extern "C" fn(
        p_classname: GDExtensionConstStringNamePtr,
        p_methodname: GDExtensionConstStringNamePtr,
        p_hash: GDExtensionInt,
    ) -> GDExtensionMethodBindPtr,
>;
pub type GDExtensionInterfaceClassdbGetClassTag =
    Option<unsafe extern "C" fn(p_classname: GDExtensionConstStringNamePtr) -> *mut c_void>;
pub type GDExtensionInterfaceClassdbRegisterExtensionClass3 = Option<
    unsafe extern "C" fn(
        p_library: GDExtensionClassLibraryPtr,
        p_class_name: GDExtensionConstStringNamePtr,
        p_parent_class_name: GDExtensionConstStringNamePtr,
        p_extension_funcs: *const GDExtensionClassCreationInfo3,
    ),
>;
pub type GDExtensionInterfaceClassdbRegisterExtensionClassMethod = Option<
    unsafe extern "C" fn(
        p_library: GDExtensionClassLibraryPtr,
        p_class_name: GDExtensionConstStringNamePtr,
        p_method_info: *const GDExtensionClassMethodInfo,
    ),
>;
pub type GDExtensionInterfaceClassdbRegisterExtensionClassProperty = Option<
    unsafe extern "C" fn(
        p_library: GDExtensionClassLibraryPtr,
        p_class_name: GDExtensionConstStringNamePtr,
        p_info: *const GDExtensionPropertyInfo,
        p_setter: GDExtensionConstStringNamePtr,
        p_getter: GDExtensionConstStringNamePtr,
    ),
>;
pub type GDExtensionInterfaceClassdbRegisterExtensionClassSignal = Option<
    unsafe extern "C" fn(
        p_library: GDExtensionClassLibraryPtr,
        p_class_name: GDExtensionConstStringNamePtr,
        p_signal_name: GDExtensionConstStringNamePtr,
        p_argument_info: *const GDExtensionPropertyInfo,
        p_argument_count: GDExtensionInt,
    ),
>;
pub type GDExtensionInterfaceClassdbUnregisterExtensionClass = Option<
    unsafe extern "C" fn(p_library: GDExtensionClassLibraryPtr, p_class_name: GDExtensionConstStringNamePtr),
>;
