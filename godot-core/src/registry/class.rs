/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::ptr;

use crate::global::godot_error;
use crate::init::InitLevel;
use crate::meta::ClassName;
use crate::private::{ClassPlugin, PluginItem};
use crate::registry::plugin::ErasedRegisterFn;
use crate::sys;
use sys::{interface_fn, out, Global, GlobalGuard};

// Needed for class unregistering. Populated during registration; Godot calls register/unregister on the main thread, the mutex is only
// there to make the static safe.
static LOADED_CLASSES: Global<HashMap<InitLevel, Vec<LoadedClass>>> = Global::default();

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Represents a class which is currently loaded and retained in memory.
#[derive(Copy, Clone, Debug)]
pub struct LoadedClass {
    name: ClassName,
}

impl LoadedClass {
    pub fn name(&self) -> ClassName {
        self.name
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Everything known about one class before it is handed to Godot: its record, and the functions that register its members.
#[derive(Debug)]
pub(crate) struct ClassRegistrationInfo {
    class_name: ClassName,
    parent_class_name: Option<ClassName>,

    // Stored separately, since their order matters.
    register_methods_fn: Option<ErasedRegisterFn>,
    register_properties_fn: Option<ErasedRegisterFn>,
    register_signals_fn: Option<ErasedRegisterFn>,

    /// Set by `#[derive(GodotClass)]`.
    default_virtual_fn: sys::GDExtensionClassGetVirtual,
    /// Set if there is a `#[godot_api] impl I*`.
    user_virtual_fn: sys::GDExtensionClassGetVirtual,

    /// Field defaults from `#[init(val)]`, used unless the interface impl overrides revert behavior.
    default_can_revert_fn: sys::GDExtensionClassPropertyCanRevert,
    default_get_revert_fn: sys::GDExtensionClassPropertyGetRevert,

    /// Godot low-level class creation parameters.
    godot_params: sys::GDExtensionClassCreationInfo3,

    /// Used to ensure that each component is only filled once.
    component_already_filled: [bool; 3],
}

impl ClassRegistrationInfo {
    fn validate_unique(&mut self, item: &PluginItem) {
        // Note: when changing this match, make sure the array has sufficient size.
        let index = match item {
            PluginItem::Struct(_) => 0,
            PluginItem::InherentImpl(_) => 1,
            PluginItem::ITraitImpl(_) => 2,
        };

        if self.component_already_filled[index] {
            panic!(
                "Godot class `{}` is defined multiple times in Rust; you can rename it with #[class(rename=NewName)]",
                self.class_name,
            )
        }

        self.component_already_filled[index] = true;
    }

    fn parent_name(&self) -> Option<ClassName> {
        self.parent_class_name
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Registration

/// Lets Godot know about all classes that have self-registered through the plugin system.
///
/// The batch of one level is all-or-nothing: if Godot rejects one class, the classes registered before it are unregistered again, and
/// none of the batch's methods, properties or signals are registered.
pub fn auto_register_classes(init_level: InitLevel) {
    out!("Auto-register classes at level `{init_level:?}`...");

    // Ordered by name so that registration order does not depend on link order.
    let mut map = BTreeMap::<ClassName, ClassRegistrationInfo>::new();

    crate::private::iterate_plugins(|elem: &ClassPlugin| {
        // Filter per ClassPlugin and not PluginItem, because all components of all classes are mixed together in one list.
        if elem.init_level != init_level {
            return;
        }

        let name = elem.class_name;
        let class_info = map
            .entry(name)
            .or_insert_with(|| default_registration_info(name));

        fill_class_info(elem.item.clone(), class_info);
    });

    // A class may derive from another class of the same batch; Godot needs the parent first.
    let infos = parents_first(
        map.into_values().collect(),
        |info| info.class_name,
        ClassRegistrationInfo::parent_name,
    );

    let mut registered: Vec<LoadedClass> = Vec::with_capacity(infos.len());
    for info in &infos {
        out!("Register class:   {} at level `{init_level:?}`", info.class_name);

        if let Err(failed) = register_class_raw(info) {
            godot_error!(
                "Failed to register class `{failed}`; unregistering {} classes of level `{init_level:?}` registered before it",
                registered.len()
            );

            for class in registered.into_iter().rev() {
                unregister_class_raw(class);
            }
            return;
        }

        registered.push(LoadedClass {
            name: info.class_name,
        });
    }

    // Order of the following registrations is crucial:
    // 1. Methods (properties refer to their accessors).
    // 2. Properties.
    // 3. Signals.
    for info in &infos {
        if let Some(register_fn) = info.register_methods_fn {
            (register_fn.raw)();
        }

        if let Some(register_fn) = info.register_properties_fn {
            (register_fn.raw)();
        }

        if let Some(register_fn) = info.register_signals_fn {
            (register_fn.raw)();
        }

        out!("Class {} loaded", info.class_name);
    }

    global_loaded_classes()
        .entry(init_level)
        .or_default()
        .extend(registered);

    out!("All classes for level `{init_level:?}` auto-registered.");
}

/// Unregisters the classes of `init_level`, in reverse registration order.
pub fn unregister_classes(init_level: InitLevel) {
    let loaded_classes_current_level = global_loaded_classes()
        .remove(&init_level)
        .unwrap_or_default();

    out!("Unregistering classes of level {init_level:?}...");
    for class in loaded_classes_current_level.into_iter().rev() {
        unregister_class_raw(class);
    }
}

/// Classes currently registered at `init_level`, in registration order.
pub fn loaded_classes(init_level: InitLevel) -> Vec<LoadedClass> {
    global_loaded_classes()
        .get(&init_level)
        .cloned()
        .unwrap_or_default()
}

fn global_loaded_classes() -> GlobalGuard<'static, HashMap<InitLevel, Vec<LoadedClass>>> {
    LOADED_CLASSES.lock()
}

/// Populate `c` with all the relevant data from `item` (depending on component type).
fn fill_class_info(item: PluginItem, c: &mut ClassRegistrationInfo) {
    c.validate_unique(&item);

    match item {
        PluginItem::Struct(s) => {
            c.parent_class_name = Some(s.base_class_name);
            c.default_virtual_fn = s.default_get_virtual_fn;
            c.default_can_revert_fn = s.default_can_revert_fn;
            c.default_get_revert_fn = s.default_get_revert_fn;
            c.register_properties_fn = Some(s.register_properties_fn);

            c.godot_params.free_instance_func = s.free_fn;
            c.godot_params.reference_func = s.reference_fn;
            c.godot_params.unreference_func = s.unreference_fn;

            fill_into(&mut c.godot_params.create_instance_func, s.generated_create_fn)
                .unwrap_or_else(|_| panic!("duplicate: create_instance_func (def) of {}", c.class_name));
        }

        PluginItem::InherentImpl(imp) => {
            c.register_methods_fn = Some(imp.register_methods_fn);
            c.register_signals_fn = Some(imp.register_signals_fn);
        }

        PluginItem::ITraitImpl(imp) => {
            // rustc rejects multiple `impl I{Class} for Thing` definitions, and an interface `init()` excludes `#[class(init)]`.
            fill_into(&mut c.godot_params.create_instance_func, imp.user_create_fn)
                .unwrap_or_else(|_| panic!("duplicate: create_instance_func (i) of {}", c.class_name));

            c.godot_params.to_string_func = imp.user_to_string_fn;
            c.godot_params.notification_func = imp.user_on_notification_fn;
            c.godot_params.set_func = imp.user_set_fn;
            c.godot_params.get_func = imp.user_get_fn;
            c.godot_params.get_property_list_func = imp.user_get_property_list_fn;
            c.godot_params.free_property_list_func = imp.user_free_property_list_fn;
            c.godot_params.property_can_revert_func = imp.user_property_can_revert_fn;
            c.godot_params.property_get_revert_func = imp.user_property_get_revert_fn;
            c.godot_params.validate_property_func = imp.validate_property_fn;
            c.user_virtual_fn = imp.get_virtual_fn;
        }
    }
}

/// If `src` is occupied, it moves the value into `dst`, while ensuring that no previous value is present in `dst`.
fn fill_into<T>(dst: &mut Option<T>, src: Option<T>) -> Result<(), ()> {
    match (dst, src) {
        (dst @ None, src) => *dst = src,
        (Some(_), Some(_)) => return Err(()),
        (Some(_), None) => { /* do nothing */ }
    }
    Ok(())
}

/// Hands the class record to Godot. Returns the class name if Godot did not accept it.
fn register_class_raw(info: &ClassRegistrationInfo) -> Result<(), ClassName> {
    let class_name = info.class_name;
    let Some(parent_class_name) = info.parent_class_name else {
        godot_error!("Class `{class_name}` has `#[godot_api]` blocks but no `#[derive(GodotClass)]` struct");
        return Err(class_name);
    };

    let mut godot_params = info.godot_params;

    // Classes without constructor (#[class(no_init)]) are "abstract" in Godot, which disables `ClassName.new()`.
    godot_params.is_abstract = sys::conv_bool(godot_params.create_instance_func.is_none());

    // Virtual functions: the ones from `#[godot_api] impl I*` if present, otherwise the ones generated alongside #[derive(GodotClass)].
    if godot_params.get_virtual_func.is_none() {
        godot_params.get_virtual_func = info.user_virtual_fn.or(info.default_virtual_fn);
    }

    // Revert: an interface override also consults the field defaults, so the struct's callbacks only fill gaps.
    if godot_params.property_can_revert_func.is_none() {
        godot_params.property_can_revert_func = info.default_can_revert_fn;
        godot_params.property_get_revert_func = info.default_get_revert_fn;
    }

    let class_string_name = class_name.to_string_name();
    let parent_string_name = parent_class_name.to_string_name();

    // SAFETY: the creation info and names outlive the call; Godot copies what it keeps.
    let registration_failed = unsafe {
        // The explicit () type notifies us if the API ever adds a return type.
        let _: () = interface_fn!(classdb_register_extension_class3)(
            sys::get_library(),
            class_string_name.string_sys(),
            parent_string_name.string_sys(),
            &raw const godot_params,
        );

        // The registration does not report errors (apart from console output), so check the outcome.
        let tag = interface_fn!(classdb_get_class_tag)(class_string_name.string_sys());
        tag.is_null()
    };

    if registration_failed {
        Err(class_name)
    } else {
        Ok(())
    }
}

fn unregister_class_raw(class: LoadedClass) {
    let class_name = class.name;
    out!("Unregister class: {class_name}");

    let class_string_name = class_name.to_string_name();

    // SAFETY: the class was registered by this library.
    unsafe {
        interface_fn!(classdb_unregister_extension_class)(
            sys::get_library(),
            class_string_name.string_sys(),
        );
    }

    out!("Class {class_name} unloaded");
}

/// Reorders `items` so that every item comes after its parent, if the parent is part of `items`. Otherwise, the order is kept.
///
/// Items caught in an inheritance cycle keep their relative order at the end.
fn parents_first<T, K, N, P>(items: Vec<T>, name: N, parent: P) -> Vec<T>
where
    K: Copy + Eq + Hash,
    N: Fn(&T) -> K,
    P: Fn(&T) -> Option<K>,
{
    let in_batch: HashSet<K> = items.iter().map(&name).collect();
    let mut placed: HashSet<K> = HashSet::with_capacity(items.len());
    let mut remaining = items;
    let mut ordered = Vec::with_capacity(remaining.len());

    loop {
        let before = remaining.len();
        let mut deferred = Vec::new();

        for item in remaining {
            let ready = match parent(&item) {
                Some(p) => !in_batch.contains(&p) || placed.contains(&p),
                None => true,
            };

            if ready {
                placed.insert(name(&item));
                ordered.push(item);
            } else {
                deferred.push(item);
            }
        }

        remaining = deferred;
        if remaining.is_empty() || remaining.len() == before {
            break;
        }
    }

    ordered.extend(remaining);
    ordered
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Substitutes for Default impl

// For FFI types, explicit initialization is clearer than a derived Default.
fn default_registration_info(class_name: ClassName) -> ClassRegistrationInfo {
    ClassRegistrationInfo {
        class_name,
        parent_class_name: None,
        register_methods_fn: None,
        register_properties_fn: None,
        register_signals_fn: None,
        default_virtual_fn: None,
        user_virtual_fn: None,
        default_can_revert_fn: None,
        default_get_revert_fn: None,
        godot_params: default_creation_info(),
        component_already_filled: Default::default(), // [false; N]
    }
}

fn default_creation_info() -> sys::GDExtensionClassCreationInfo3 {
    sys::GDExtensionClassCreationInfo3 {
        is_virtual: sys::SYS_FALSE,
        is_abstract: sys::SYS_FALSE,
        is_exposed: sys::SYS_TRUE,
        is_runtime: sys::SYS_FALSE,
        set_func: None,
        get_func: None,
        get_property_list_func: None,
        free_property_list_func: None,
        property_can_revert_func: None,
        property_get_revert_func: None,
        validate_property_func: None,
        notification_func: None,
        to_string_func: None,
        reference_func: None,
        unreference_func: None,
        create_instance_func: None,
        free_instance_func: None,
        recreate_instance_func: None,
        get_virtual_func: None,
        get_virtual_call_data_func: None,
        call_virtual_with_data_func: None,
        get_rid_func: None,
        class_userdata: ptr::null_mut(),
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn order(items: &[(&'static str, Option<&'static str>)]) -> Vec<&'static str> {
        parents_first(items.to_vec(), |item| item.0, |item| item.1)
            .into_iter()
            .map(|item| item.0)
            .collect()
    }

    #[test]
    fn parents_first_keeps_independent_order() {
        let ordered = order(&[("A", Some("Node")), ("B", Some("Object")), ("C", None)]);
        assert_eq!(ordered, ["A", "B", "C"]);
    }

    #[test]
    fn parents_first_moves_children_behind_parents() {
        let ordered = order(&[
            ("Grandchild", Some("Child")),
            ("Child", Some("Parent")),
            ("Parent", Some("Node")),
            ("Other", Some("RefCounted")),
        ]);
        assert_eq!(ordered, ["Parent", "Other", "Child", "Grandchild"]);
    }

    #[test]
    fn parents_first_keeps_cycles() {
        let ordered = order(&[("X", Some("Y")), ("Y", Some("X")), ("Z", None)]);
        assert_eq!(ordered, ["Z", "X", "Y"]);
    }

    #[test]
    fn fill_into_rejects_second_value() {
        let mut dst = None;
        assert!(fill_into(&mut dst, Some(1)).is_ok());
        assert!(fill_into(&mut dst, None).is_ok());
        assert_eq!(fill_into(&mut dst, Some(2)), Err(()));
        assert_eq!(dst, Some(1));
    }

    #[test]
    #[should_panic(expected = "defined multiple times")]
    fn duplicate_component_panics() {
        let mut info = default_registration_info(ClassName::__cached("Twice"));
        let item = PluginItem::ITraitImpl(crate::private::ITraitImpl::default());

        info.validate_unique(&item);
        info.validate_unique(&item);
    }
}
