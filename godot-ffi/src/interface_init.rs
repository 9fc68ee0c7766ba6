/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Loading of the GDExtension function table.
//!
//! The extension entry point is passed a `get_proc_address` function pointer, which is used to resolve every other
//! interface function by name. Loading is all-or-nothing: the table only exists once every symbol has been found.

use std::ffi::{c_char, CStr};
use std::fmt;

use crate as sys;

/// Error raised while resolving the engine's function table.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum InterfaceError {
    /// The engine passed a null `get_proc_address` pointer.
    NullProcAddress,

    /// `get_proc_address` returned null for a function the binding requires.
    MissingFunction { name: &'static str },

    /// A per-type operation (variant conversion) is missing for a builtin type.
    MissingTypeOperation {
        variant_type: sys::VariantType,
        operation: &'static str,
    },
}

impl fmt::Display for InterfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullProcAddress => write!(f, "engine passed a null `get_proc_address` pointer"),
            Self::MissingFunction { name } => {
                write!(f, "engine does not provide required interface function `{name}`")
            }
            Self::MissingTypeOperation {
                variant_type,
                operation,
            } => write!(
                f,
                "engine does not provide `{operation}` for builtin type {variant_type:?}"
            ),
        }
    }
}

impl std::error::Error for InterfaceError {}

// ----------------------------------------------------------------------------------------------------------------------------------------------

macro_rules! declare_interface {
    ( $( $field:ident : $Fn:ident ),* $(,)? ) => {
        /// Function table provided by the engine, resolved once at load time.
        ///
        /// Every field is guaranteed to be `Some` after [`load()`](Self::load) succeeded.
        #[derive(Copy, Clone)]
        pub struct GDExtensionInterface {
            $( pub $field: sys::$Fn, )*
        }

        impl GDExtensionInterface {
            /// Names of all functions this table resolves, in declaration order.
            pub const FUNCTION_NAMES: &'static [&'static str] = &[ $( stringify!($field), )* ];

            /// Resolves every function by name.
            ///
            /// Stops at the first missing symbol. Nothing resolved so far is retained in that case.
            ///
            /// # Safety
            /// `get_proc_address` must be the pointer the engine passed to the entry symbol.
            pub unsafe fn load(
                get_proc_address: sys::GDExtensionInterfaceGetProcAddress,
            ) -> Result<Self, InterfaceError> {
                let get_proc_address = get_proc_address.ok_or(InterfaceError::NullProcAddress)?;

                Ok(Self {
                    $(
                        $field: {
                            let name = concat!(stringify!($field), "\0");
                            let raw = get_proc_address(name.as_ptr() as *const c_char);
                            if raw.is_none() {
                                return Err(InterfaceError::MissingFunction { name: stringify!($field) });
                            }

                            // SAFETY: the engine returns the function registered under this name, whose signature is `$Fn`.
                            std::mem::transmute::<sys::GDExtensionInterfaceFunctionPtr, sys::$Fn>(raw)
                        },
                    )*
                })
            }
        }
    };
}

declare_interface! {
    get_godot_version: GDExtensionInterfaceGetGodotVersion,
    mem_alloc: GDExtensionInterfaceMemAlloc,
    mem_realloc: GDExtensionInterfaceMemRealloc,
    mem_free: GDExtensionInterfaceMemFree,
    print_error: GDExtensionInterfacePrintError,
    print_warning: GDExtensionInterfacePrintWarning,
    print_script_error: GDExtensionInterfacePrintScriptError,

    variant_new_copy: GDExtensionInterfaceVariantNewCopy,
    variant_new_nil: GDExtensionInterfaceVariantNewNil,
    variant_destroy: GDExtensionInterfaceVariantDestroy,
    variant_get_type: GDExtensionInterfaceVariantGetType,
    variant_stringify: GDExtensionInterfaceVariantStringify,
    variant_booleanize: GDExtensionInterfaceVariantBooleanize,
    variant_hash: GDExtensionInterfaceVariantHash,
    variant_evaluate: GDExtensionInterfaceVariantEvaluate,
    get_variant_from_type_constructor: GDExtensionInterfaceGetVariantFromTypeConstructor,
    get_variant_to_type_constructor: GDExtensionInterfaceGetVariantToTypeConstructor,
    variant_get_ptr_constructor: GDExtensionInterfaceVariantGetPtrConstructor,
    variant_get_ptr_destructor: GDExtensionInterfaceVariantGetPtrDestructor,
    variant_get_ptr_builtin_method: GDExtensionInterfaceVariantGetPtrBuiltinMethod,

    string_new_with_utf8_chars_and_len: GDExtensionInterfaceStringNewWithUtf8CharsAndLen,
    string_to_utf8_chars: GDExtensionInterfaceStringToUtf8Chars,
    string_name_new_with_utf8_chars_and_len: GDExtensionInterfaceStringNameNewWithUtf8CharsAndLen,
    array_operator_index: GDExtensionInterfaceArrayOperatorIndex,
    dictionary_operator_index: GDExtensionInterfaceDictionaryOperatorIndex,
    packed_byte_array_operator_index: GDExtensionInterfacePackedByteArrayOperatorIndex,
    packed_int32_array_operator_index: GDExtensionInterfacePackedInt32ArrayOperatorIndex,
    packed_int64_array_operator_index: GDExtensionInterfacePackedInt64ArrayOperatorIndex,
    packed_float32_array_operator_index: GDExtensionInterfacePackedFloat32ArrayOperatorIndex,
    packed_float64_array_operator_index: GDExtensionInterfacePackedFloat64ArrayOperatorIndex,
    packed_string_array_operator_index: GDExtensionInterfacePackedStringArrayOperatorIndex,
    packed_vector2_array_operator_index: GDExtensionInterfacePackedVector2ArrayOperatorIndex,
    packed_vector3_array_operator_index: GDExtensionInterfacePackedVector3ArrayOperatorIndex,
    packed_color_array_operator_index: GDExtensionInterfacePackedColorArrayOperatorIndex,
    packed_vector4_array_operator_index: GDExtensionInterfacePackedVector4ArrayOperatorIndex,

    classdb_construct_object: GDExtensionInterfaceClassdbConstructObject,
    classdb_get_method_bind: GDExtensionInterfaceClassdbGetMethodBind,
    classdb_get_class_tag: GDExtensionInterfaceClassdbGetClassTag,
    object_destroy: GDExtensionInterfaceObjectDestroy,
    object_method_bind_ptrcall: GDExtensionInterfaceObjectMethodBindPtrcall,
    object_method_bind_call: GDExtensionInterfaceObjectMethodBindCall,
    object_cast_to: GDExtensionInterfaceObjectCastTo,
    object_get_instance_id: GDExtensionInterfaceObjectGetInstanceId,
    object_get_instance_from_id: GDExtensionInterfaceObjectGetInstanceFromId,
    object_set_instance: GDExtensionInterfaceObjectSetInstance,
    object_get_instance_binding: GDExtensionInterfaceObjectGetInstanceBinding,
    object_set_instance_binding: GDExtensionInterfaceObjectSetInstanceBinding,
    callable_custom_create2: GDExtensionInterfaceCallableCustomCreate2,

    classdb_register_extension_class3: GDExtensionInterfaceClassdbRegisterExtensionClass3,
    classdb_register_extension_class_method: GDExtensionInterfaceClassdbRegisterExtensionClassMethod,
    classdb_register_extension_class_property: GDExtensionInterfaceClassdbRegisterExtensionClassProperty,
    classdb_register_extension_class_signal: GDExtensionInterfaceClassdbRegisterExtensionClassSignal,
    classdb_unregister_extension_class: GDExtensionInterfaceClassdbUnregisterExtensionClass,
}

impl fmt::Debug for GDExtensionInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GDExtensionInterface")
            .field("functions", &Self::FUNCTION_NAMES.len())
            .finish()
    }
}

/// Queries the engine version through `get_godot_version`.
///
/// # Safety
/// `get_proc_address` must be the pointer the engine passed to the entry symbol.
pub unsafe fn runtime_version(
    get_proc_address: sys::GDExtensionInterfaceGetProcAddress,
) -> Result<sys::GDExtensionGodotVersion, InterfaceError> {
    let get_proc_address = get_proc_address.ok_or(InterfaceError::NullProcAddress)?;

    let raw = get_proc_address(sys::c_str(b"get_godot_version\0"));
    let get_godot_version = std::mem::transmute::<
        sys::GDExtensionInterfaceFunctionPtr,
        sys::GDExtensionInterfaceGetGodotVersion,
    >(raw)
    .ok_or(InterfaceError::MissingFunction {
        name: "get_godot_version",
    })?;

    let mut version = std::mem::MaybeUninit::<sys::GDExtensionGodotVersion>::zeroed();
    get_godot_version(version.as_mut_ptr());

    Ok(version.assume_init())
}

/// Renders a version struct as `major.minor.patch (full string)`.
pub fn read_version_string(version: &sys::GDExtensionGodotVersion) -> String {
    let full = if version.string.is_null() {
        String::new()
    } else {
        // SAFETY: the engine provides a null-terminated static string.
        unsafe { CStr::from_ptr(version.string) }
            .to_string_lossy()
            .into_owned()
    };

    format!(
        "{}.{}.{} ({full})",
        version.major, version.minor, version.patch
    )
}
