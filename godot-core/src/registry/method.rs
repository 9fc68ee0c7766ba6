/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use godot_ffi as sys;
use sys::interface_fn;

use crate::builtin::{StringName, Variant};
use crate::meta::{ClassName, GodotConvert, ParamTuple, PropertyInfo, PropertyInfoSys, Signature};
use crate::obj::GodotClass;

/// Info relating to an argument or return type in a method.
pub struct MethodParamOrReturnInfo {
    pub(crate) info: PropertyInfo,
    pub(crate) metadata: sys::GDExtensionClassMethodArgumentMetadata,
}

impl MethodParamOrReturnInfo {
    pub fn new(info: PropertyInfo, metadata: sys::GDExtensionClassMethodArgumentMetadata) -> Self {
        Self { info, metadata }
    }
}

/// All info needed to register a method for a class with Godot.
pub struct ClassMethodInfo {
    class_name: ClassName,
    method_name: StringName,
    call_func: sys::GDExtensionClassMethodCall,
    ptrcall_func: sys::GDExtensionClassMethodPtrCall,
    method_flags: sys::GDExtensionClassMethodFlags,
    return_value: Option<MethodParamOrReturnInfo>,
    arguments: Vec<MethodParamOrReturnInfo>,
    /// Pre-set values filling in for missing trailing arguments.
    default_arguments: Vec<Variant>,
}

impl ClassMethodInfo {
    /// # Safety
    ///
    /// `ptrcall_func`, if provided, must:
    ///
    /// - Interpret its parameters according to the types specified in `Params`.
    /// - Return the value that is specified in `Ret`, or return nothing if the return value is `()`.
    ///
    /// `call_func`, if provided, must:
    ///
    /// - Interpret its parameters as a list of `Params::LEN` `Variant`s.
    /// - Return a `Variant`.
    pub unsafe fn from_signature<C: GodotClass, Params: ParamTuple, Ret: GodotConvert>(
        method_name: StringName,
        call_func: sys::GDExtensionClassMethodCall,
        ptrcall_func: sys::GDExtensionClassMethodPtrCall,
        method_flags: sys::GDExtensionClassMethodFlags,
        param_names: &[&str],
        default_arguments: Vec<Variant>,
    ) -> Self {
        assert_eq!(
            param_names.len(),
            Params::LEN,
            "method {}::{method_name}: {} parameter names for {} parameters",
            C::class_name(),
            param_names.len(),
            Params::LEN,
        );

        let arguments: Vec<MethodParamOrReturnInfo> = param_names
            .iter()
            .enumerate()
            .filter_map(|(index, name)| Signature::<Params, Ret>::param_info(index, name))
            .collect();

        assert!(
            default_arguments.len() <= arguments.len(),
            "cannot have more default arguments than arguments"
        );

        Self {
            class_name: C::class_name(),
            method_name,
            call_func,
            ptrcall_func,
            method_flags,
            return_value: Signature::<Params, Ret>::return_info(),
            arguments,
            default_arguments,
        }
    }

    pub fn method_name(&self) -> &StringName {
        &self.method_name
    }

    pub fn argument_count(&self) -> u32 {
        u32::try_from(self.arguments.len()).unwrap_or_else(|_| panic!("argument count of {} exceeds u32", self.method_name))
    }

    pub fn register_extension_class_method(&self) {
        let (return_owner, return_value_metadata) = match &self.return_value {
            Some(info) => (Some(info.info.to_sys()), info.metadata),
            None => (None, sys::GDEXTENSION_METHOD_ARGUMENT_METADATA_NONE),
        };

        let mut return_value_sys = return_owner.as_ref().map(|owner| *owner.raw());

        // The owners keep the strings alive that the raw infos point to.
        let argument_owners: Vec<PropertyInfoSys> =
            self.arguments.iter().map(|arg| arg.info.to_sys()).collect();

        let mut arguments_info_sys: Vec<sys::GDExtensionPropertyInfo> =
            argument_owners.iter().map(|owner| *owner.raw()).collect();

        let mut arguments_metadata: Vec<sys::GDExtensionClassMethodArgumentMetadata> =
            self.arguments.iter().map(|arg| arg.metadata).collect();

        let mut default_arguments_sys: Vec<sys::GDExtensionVariantPtr> = self
            .default_arguments
            .iter()
            .map(|v| sys::force_mut_ptr(v.var_sys()))
            .collect();

        let method_info_sys = sys::GDExtensionClassMethodInfo {
            name: sys::force_mut_ptr(self.method_name.string_sys()),
            method_userdata: std::ptr::null_mut(),
            call_func: self.call_func,
            ptrcall_func: self.ptrcall_func,
            method_flags: self.method_flags,
            has_return_value: sys::conv_bool(return_value_sys.is_some()),
            return_value_info: return_value_sys
                .as_mut()
                .map_or(std::ptr::null_mut(), |info| info as *mut _),
            return_value_metadata,
            argument_count: self.argument_count(),
            arguments_info: arguments_info_sys.as_mut_ptr(),
            arguments_metadata: arguments_metadata.as_mut_ptr(),
            default_argument_count: self.default_arguments.len() as u32,
            default_arguments: default_arguments_sys.as_mut_ptr(),
        };

        let class_name = self.class_name.to_string_name();

        // SAFETY: everything the info points to lives until the end of this function; the engine copies what it keeps.
        unsafe {
            interface_fn!(classdb_register_extension_class_method)(
                sys::get_library(),
                class_name.string_sys(),
                &raw const method_info_sys,
            );
        }

        sys::out!("Registered method {}::{}", self.class_name, self.method_name);
    }
}
