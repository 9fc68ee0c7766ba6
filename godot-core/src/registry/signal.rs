/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use godot_ffi as sys;

use crate::meta::{ClassName, ParamTuple, PropertyInfo, PropertyInfoSys};

/// Declares signal `signal_name` on class `class_name`, with one parameter per entry of `parameters`.
pub fn register_signal(class_name: ClassName, signal_name: &str, parameters: &[PropertyInfo]) {
    let owners: Vec<PropertyInfoSys> = parameters.iter().map(PropertyInfo::to_sys).collect();
    let parameters_sys: Vec<sys::GDExtensionPropertyInfo> =
        owners.iter().map(|owner| *owner.raw()).collect();

    let class_string_name = class_name.to_string_name();
    let signal_string_name = crate::builtin::StringName::from(signal_name);

    // SAFETY: the parameter infos and their strings live until the end of this function.
    unsafe {
        sys::interface_fn!(classdb_register_extension_class_signal)(
            sys::get_library(),
            class_string_name.string_sys(),
            signal_string_name.string_sys(),
            parameters_sys.as_ptr(),
            parameters_sys.len() as sys::GDExtensionInt,
        );
    }

    sys::out!("Registered signal {class_name}::{signal_name} ({} params)", parameters.len());
}

/// Declares a signal whose parameters are the tuple `P`, named by `param_names`. Used by `#[signal]`.
pub fn register_signal_typed<P: ParamTuple>(class_name: ClassName, signal_name: &str, param_names: &[&str]) {
    assert_eq!(
        param_names.len(),
        P::LEN,
        "signal {class_name}::{signal_name}: parameter names do not match parameter types"
    );

    let parameters: Vec<PropertyInfo> = param_names
        .iter()
        .enumerate()
        .filter_map(|(index, name)| P::property_info(index, name))
        .collect();

    register_signal(class_name, signal_name, &parameters);
}
