/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Class database: construction by name and the registration functions used by libraries.

use std::collections::BTreeMap;
use std::ffi::c_void;
use std::ptr;
use std::sync::Arc;

use godot_ffi as sys;
use sys::VariantType;

use crate::objects;
use crate::state::{engine, report, ClassRecord, ExtensionClass, MessageKind, MethodRecord, PropertyRecord, SignalRecord};
use crate::strings;
use crate::value::{self, RawVariant};

pub(crate) unsafe extern "C" fn classdb_construct_object(class: sys::GDExtensionConstStringNamePtr) -> sys::GDExtensionObjectPtr {
    objects::construct(strings::str_ref(class))
}

/// Null for unknown classes; libraries use this to check whether a registration went through.
pub(crate) unsafe extern "C" fn classdb_get_class_tag(class: sys::GDExtensionConstStringNamePtr) -> *mut c_void {
    let class = strings::str_ref(class);
    engine()
        .classes
        .get(class)
        .map_or(ptr::null_mut(), |record| record.tag as *mut c_void)
}

pub(crate) unsafe extern "C" fn classdb_register_extension_class3(
    library: sys::GDExtensionClassLibraryPtr,
    class: sys::GDExtensionConstStringNamePtr,
    parent: sys::GDExtensionConstStringNamePtr,
    info: *const sys::GDExtensionClassCreationInfo3,
) {
    let class = strings::read(class);
    let parent = strings::read(parent);
    let info = &*info;

    let rejection = {
        let mut engine = engine();
        if engine.rejected_classes.contains(&class) {
            Some(format!("Class '{class}' was rejected by the engine"))
        } else if engine.classes.contains_key(&class) {
            Some(format!("Class '{class}' is already registered"))
        } else if !engine.classes.contains_key(&parent) {
            Some(format!("Parent class '{parent}' of '{class}' does not exist"))
        } else {
            let create_instance = if info.is_abstract != 0 {
                None
            } else {
                info.create_instance_func
            };

            let extension = ExtensionClass {
                library: library as usize,
                userdata: info.class_userdata as usize,
                create_instance,
                free_instance: info.free_instance_func,
                get_virtual: info.get_virtual_func,
                to_string: info.to_string_func,
                notification: info.notification_func,
                set: info.set_func,
                get: info.get_func,
                get_property_list: info.get_property_list_func,
                free_property_list: info.free_property_list_func,
                property_can_revert: info.property_can_revert_func,
                property_get_revert: info.property_get_revert_func,
                validate_property: info.validate_property_func,
            };

            let tag = engine.next_tag();
            engine.classes.insert(
                class.clone(),
                ClassRecord {
                    parent: Some(parent),
                    tag,
                    extension: Some(extension),
                    methods: BTreeMap::new(),
                    properties: Vec::new(),
                    signals: Vec::new(),
                },
            );
            None
        }
    };

    if let Some(text) = rejection {
        report(MessageKind::Error, text);
    }
}

/// Reads a property info coming from the library.
pub(crate) unsafe fn read_property_info(info: &sys::GDExtensionPropertyInfo) -> PropertyRecord {
    PropertyRecord {
        name: strings::read(info.name),
        variant_type: VariantType::from_sys(info.type_),
        class_name: strings::read(info.class_name),
        hint: info.hint,
        hint_string: strings::read(info.hint_string),
        usage: info.usage,
        getter: String::new(),
        setter: String::new(),
    }
}

unsafe fn slice_of<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len)
    }
}

pub(crate) unsafe extern "C" fn classdb_register_extension_class_method(
    _library: sys::GDExtensionClassLibraryPtr,
    class: sys::GDExtensionConstStringNamePtr,
    info: *const sys::GDExtensionClassMethodInfo,
) {
    let class = strings::read(class);
    let info = &*info;
    let name = strings::read(info.name);

    let argument_types = slice_of(info.arguments_info, info.argument_count as usize)
        .iter()
        .map(|arg| VariantType::from_sys(arg.type_))
        .collect();

    let return_type = match (info.has_return_value != 0, info.return_value_info.is_null()) {
        (true, false) => Some(VariantType::from_sys((*info.return_value_info).type_)),
        _ => None,
    };

    // Copies are made before locking: they may reference objects.
    let defaults: Vec<RawVariant> = slice_of(info.default_arguments, info.default_argument_count as usize)
        .iter()
        .map(|&ptr| value::variant_ref(ptr).clone())
        .collect();

    let record = MethodRecord {
        userdata: info.method_userdata as usize,
        call: info.call_func,
        ptrcall: info.ptrcall_func,
        argument_types,
        return_type,
        defaults: Arc::new(defaults),
    };

    let rejected = {
        let mut engine = engine();
        match engine.classes.get_mut(&class) {
            Some(class_record) => {
                class_record.methods.insert(name.clone(), record);
                None
            }
            None => Some(record),
        }
    };

    if rejected.is_some() {
        drop(rejected);
        report(MessageKind::Error, format!("Cannot register method '{name}': class '{class}' does not exist"));
    }
}

pub(crate) unsafe extern "C" fn classdb_register_extension_class_property(
    _library: sys::GDExtensionClassLibraryPtr,
    class: sys::GDExtensionConstStringNamePtr,
    info: *const sys::GDExtensionPropertyInfo,
    setter: sys::GDExtensionConstStringNamePtr,
    getter: sys::GDExtensionConstStringNamePtr,
) {
    let class = strings::read(class);
    let mut property = read_property_info(&*info);
    property.setter = strings::read(setter);
    property.getter = strings::read(getter);

    let error = {
        let mut engine = engine();
        let getter_missing = !property.getter.is_empty() && engine.find_method(&class, &property.getter).is_none();

        match engine.classes.get_mut(&class) {
            None => Some(format!("Cannot register property '{}': class '{class}' does not exist", property.name)),
            Some(_) if getter_missing => Some(format!(
                "Invalid getter '{class}::{}' for property '{}'",
                property.getter, property.name
            )),
            Some(record) => {
                record.properties.push(property);
                None
            }
        }
    };

    if let Some(text) = error {
        report(MessageKind::Error, text);
    }
}

pub(crate) unsafe extern "C" fn classdb_register_extension_class_signal(
    _library: sys::GDExtensionClassLibraryPtr,
    class: sys::GDExtensionConstStringNamePtr,
    signal: sys::GDExtensionConstStringNamePtr,
    arguments: *const sys::GDExtensionPropertyInfo,
    argument_count: sys::GDExtensionInt,
) {
    let class = strings::read(class);
    let params = slice_of(arguments, argument_count.max(0) as usize)
        .iter()
        .map(|arg| (strings::read(arg.name), VariantType::from_sys(arg.type_)))
        .collect();

    let record = SignalRecord {
        name: strings::read(signal),
        params,
    };

    let error = {
        let mut engine = engine();
        match engine.classes.get_mut(&class) {
            Some(class_record) if class_record.signals.iter().any(|s| s.name == record.name) => {
                Some(format!("Signal '{}' already exists in class '{class}'", record.name))
            }
            Some(class_record) => {
                class_record.signals.push(record);
                None
            }
            None => Some(format!("Cannot register signal '{}': class '{class}' does not exist", record.name)),
        }
    };

    if let Some(text) = error {
        report(MessageKind::Error, text);
    }
}

pub(crate) unsafe extern "C" fn classdb_unregister_extension_class(
    _library: sys::GDExtensionClassLibraryPtr,
    class: sys::GDExtensionConstStringNamePtr,
) {
    let class = strings::read(class);

    let outcome = {
        let mut engine = engine();
        let has_children = engine
            .classes
            .values()
            .any(|record| record.parent.as_deref() == Some(class.as_str()));
        let is_extension = engine.classes.get(&class).is_some_and(|record| record.extension.is_some());

        if !is_extension {
            Err(format!("Cannot unregister '{class}': not an extension class"))
        } else if has_children {
            Err(format!("Cannot unregister '{class}': other classes still derive from it"))
        } else {
            Ok(engine.classes.remove(&class))
        }
    };

    // Removed records hold default arguments, which are dropped outside the lock.
    match outcome {
        Ok(removed) => drop(removed),
        Err(text) => report(MessageKind::Error, text),
    }
}
