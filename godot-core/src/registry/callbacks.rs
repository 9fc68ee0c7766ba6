/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Callbacks that are passed as function pointers to Godot upon class registration.
//!
//! Every callback that reaches a user instance enters it through a [`BorrowScope`] and runs the user code inside
//! [`handle_panic`]: a panic is reported and the engine sees a neutral answer (null, `false`, untouched return slot).
//!
//! Re-exported to `crate::private`.
#![allow(clippy::missing_safety_doc)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::panic::AssertUnwindSafe;
use std::ptr;

use godot_ffi as sys;
use sys::interface_fn;

use crate::builtin::{StringName, Variant};
use crate::global::godot_error;
use crate::meta::{CallContext, InParamTuple, PropertyInfo, PropertyInfoSys, Signature, ToGodot};
use crate::obj::{cap, Base, GodotClass, InstanceId, UserClass};
use crate::private::{handle_panic, handle_varcall_panic};
use crate::storage::{
    as_storage, destroy_storage, instance_binding_callbacks, into_instance_ptr, BorrowScope,
    InstanceStorage,
};

thread_local! {
    // Property lists handed to the engine, keyed by list address, with the strings their entries point to.
    static PROPERTY_LISTS: RefCell<HashMap<usize, Vec<PropertyInfoSys>>> = RefCell::new(HashMap::new());
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Lifecycle

/// Godot FFI default constructor.
///
/// If the `init()` constructor panics, null is returned.
pub unsafe extern "C" fn create<T: cap::GodotDefault>(
    _class_userdata: *mut c_void,
) -> sys::GDExtensionObjectPtr {
    create_custom(T::__godot_user_init).unwrap_or(ptr::null_mut())
}

/// Constructs the engine part of a `T` (an object of the base class), then the Rust part with `make_user_instance`, and links them.
///
/// On failure, the engine part is destroyed again and the message is returned.
pub(crate) fn create_custom<T, F>(make_user_instance: F) -> Result<sys::GDExtensionObjectPtr, String>
where
    T: GodotClass,
    F: FnOnce(Base<T::Base>) -> T,
{
    let class_name = T::class_name();
    let base_class_name = T::Base::class_name().to_string_name();

    // SAFETY: the class name is a valid StringName.
    let base_ptr = unsafe { interface_fn!(classdb_construct_object)(base_class_name.string_sys()) };
    if base_ptr.is_null() {
        let msg = format!("engine could not construct base class of {class_name}");
        godot_error!("{msg}");
        return Err(msg);
    }

    // SAFETY: `base_ptr` is a freshly constructed object.
    let raw_id = unsafe { interface_fn!(object_get_instance_id)(base_ptr) };
    let Some(instance_id) = InstanceId::try_from_u64(raw_id) else {
        // SAFETY: nothing else refers to the object yet.
        unsafe { interface_fn!(object_destroy)(base_ptr) };
        return Err(format!("base object of {class_name} has no instance ID"));
    };

    let base = Base::<T::Base>::from_instance_id(instance_id);
    let field_base = base.share();

    // User constructor init() can panic, which must not reach the engine.
    let context = || format!("panic during {class_name}::init() constructor");
    let code = AssertUnwindSafe(move || make_user_instance(field_base));

    let user_instance = match handle_panic(context, code) {
        Ok(user_instance) => user_instance,
        Err(msg) => {
            // SAFETY: nothing else refers to the object yet.
            unsafe { interface_fn!(object_destroy)(base_ptr) };
            return Err(msg);
        }
    };

    let storage = InstanceStorage::<T>::construct(user_instance, base);
    let instance_ptr = into_instance_ptr(storage);
    let class_string_name = class_name.to_string_name();

    // SAFETY: `base_ptr` is live; the instance pointer stays valid until the engine invokes `free`.
    unsafe {
        interface_fn!(object_set_instance)(base_ptr, class_string_name.string_sys(), instance_ptr);
        interface_fn!(object_set_instance_binding)(
            base_ptr,
            sys::get_library(),
            instance_ptr,
            instance_binding_callbacks(),
        );

        as_storage::<T>(instance_ptr).base().mark_initialized();
    }

    sys::out!("create_custom: {class_name} id={instance_id} at {base_ptr:?}");
    Ok(base_ptr)
}

pub unsafe extern "C" fn free<T: GodotClass>(
    _class_user_data: *mut c_void,
    instance: sys::GDExtensionClassInstancePtr,
) {
    // User `Drop` impls run here.
    let context = || format!("panic while dropping {}", T::class_name());
    let _ = handle_panic(context, AssertUnwindSafe(|| destroy_storage::<T>(instance)));
}

// Ref-counting is entirely handled by the engine and the pointer manager; the Rust instance has no count of its own.
pub unsafe extern "C" fn reference<T: GodotClass>(_instance: sys::GDExtensionClassInstancePtr) {}

pub unsafe extern "C" fn unreference<T: GodotClass>(_instance: sys::GDExtensionClassInstancePtr) {}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Virtual dispatch

pub unsafe extern "C" fn get_virtual<T: cap::ImplementsGodotVirtual>(
    _class_user_data: *mut c_void,
    name: sys::GDExtensionConstStringNamePtr,
) -> sys::GDExtensionClassCallVirtual {
    // This string is not ours, so we cannot call the destructor on it.
    let method_name = StringName::new_from_string_sys(sys::force_mut_ptr(name));
    let method_name = method_name.to_string();

    let context = || format!("{}::get_virtual({method_name})", T::class_name());
    handle_panic(context, || T::__virtual_call(&method_name)).unwrap_or(None)
}

pub unsafe extern "C" fn default_get_virtual<T: UserClass>(
    _class_user_data: *mut c_void,
    name: sys::GDExtensionConstStringNamePtr,
) -> sys::GDExtensionClassCallVirtual {
    let method_name = StringName::new_from_string_sys(sys::force_mut_ptr(name));
    let method_name = method_name.to_string();

    let context = || format!("{}::get_virtual({method_name})", T::class_name());
    handle_panic(context, || T::__default_virtual_call(&method_name)).unwrap_or(None)
}

/// Body of a generated trampoline: unmarshals pointer-call arguments, invokes `call` on the instance and writes the return slot.
///
/// Used for overridden virtuals and the pointer-call entry of `#[func]` methods. A panic leaves the return slot untouched.
///
/// # Safety
/// `instance` must be a live instance of `T`; `args` and `ret` must follow the pointer-call layout of `P` and `R`.
pub unsafe fn ptrcall<T, P, R>(
    instance: sys::GDExtensionClassInstancePtr,
    args: *const sys::GDExtensionConstTypePtr,
    ret: sys::GDExtensionTypePtr,
    method_name: &'static str,
    call: impl FnOnce(&InstanceStorage<T>, P) -> R,
) where
    T: GodotClass,
    P: InParamTuple,
    R: ToGodot,
{
    let call_ctx = CallContext::func(T::class_name().as_str(), method_name);
    let scope = BorrowScope::enter(instance);

    let code = AssertUnwindSafe(|| {
        Signature::<P, R>::in_ptrcall(
            scope.instance_ptr(),
            &call_ctx,
            args,
            ret,
            |instance_ptr, params| call(as_storage::<T>(instance_ptr), params),
        )
    });

    let _ = handle_panic(|| &call_ctx, code);
    drop(scope);
}

/// Body of the variant-call entry of a `#[func]` method. Argument and panic failures are reported through `err`.
///
/// # Safety
/// `instance` must be a live instance of `T`; `args` must point to `arg_count` variant pointers; `ret` and `err` must be valid.
pub unsafe fn varcall<T, P, R>(
    instance: sys::GDExtensionClassInstancePtr,
    args: *const sys::GDExtensionConstVariantPtr,
    arg_count: sys::GDExtensionInt,
    ret: sys::GDExtensionVariantPtr,
    err: *mut sys::GDExtensionCallError,
    method_name: &'static str,
    call: impl FnOnce(&InstanceStorage<T>, P) -> R,
) where
    T: GodotClass,
    P: InParamTuple,
    R: ToGodot,
{
    let call_ctx = CallContext::func(T::class_name().as_str(), method_name);
    let scope = BorrowScope::enter(instance);

    let call_err = err;
    let code = AssertUnwindSafe(|| {
        Signature::<P, R>::in_varcall(
            scope.instance_ptr(),
            &call_ctx,
            args,
            arg_count,
            ret,
            call_err,
            |instance_ptr, params| call(as_storage::<T>(instance_ptr), params),
        )
    });

    handle_varcall_panic(&call_ctx, &mut *err, code);
    drop(scope);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Interface callbacks

/// Runs `f` on the storage of `instance`, with the instance borrowed for the duration and panics caught.
///
/// Returns `None` if `f` panicked.
unsafe fn with_storage<T, R>(
    instance: sys::GDExtensionClassInstancePtr,
    callback_name: &str,
    f: impl FnOnce(&InstanceStorage<T>) -> R,
) -> Option<R>
where
    T: GodotClass,
{
    let scope = BorrowScope::enter(instance);
    let context = || format!("{}::{callback_name}", T::class_name());

    let result = handle_panic(context, AssertUnwindSafe(|| f(scope.storage::<T>())));
    drop(scope);

    result.ok()
}

pub unsafe extern "C" fn to_string<T: cap::GodotToString>(
    instance: sys::GDExtensionClassInstancePtr,
    is_valid: *mut sys::GDExtensionBool,
    out_string: sys::GDExtensionStringPtr,
) {
    // Note: to_string currently always succeeds, as it is only provided for classes that have a working implementation.
    let Some(string) = with_storage::<T, _>(instance, "to_string", |storage| {
        T::__godot_to_string(&storage.get())
    }) else {
        return;
    };

    // Transfer ownership to Godot.
    string.assign_to_string_sys(out_string);
    *is_valid = sys::SYS_TRUE;
}

pub unsafe extern "C" fn on_notification<T: cap::GodotNotification>(
    instance: sys::GDExtensionClassInstancePtr,
    what: i32,
    _reversed: sys::GDExtensionBool,
) {
    with_storage::<T, _>(instance, "on_notification", |storage| {
        T::__godot_notification(&mut storage.get_mut(), what);
    });
}

pub unsafe extern "C" fn get_property<T: cap::GodotGet>(
    instance: sys::GDExtensionClassInstancePtr,
    name: sys::GDExtensionConstStringNamePtr,
    ret: sys::GDExtensionVariantPtr,
) -> sys::GDExtensionBool {
    let property = StringName::new_from_string_sys(sys::force_mut_ptr(name));

    let value = with_storage::<T, _>(instance, "get_property", |storage| {
        T::__godot_get_property(&storage.get(), property)
    });

    match value.flatten() {
        Some(value) => {
            *(ret as *mut Variant) = value;
            sys::SYS_TRUE
        }
        None => sys::SYS_FALSE,
    }
}

pub unsafe extern "C" fn set_property<T: cap::GodotSet>(
    instance: sys::GDExtensionClassInstancePtr,
    name: sys::GDExtensionConstStringNamePtr,
    value: sys::GDExtensionConstVariantPtr,
) -> sys::GDExtensionBool {
    let property = StringName::new_from_string_sys(sys::force_mut_ptr(name));
    let value = Variant::borrow_var_sys(value).clone();

    let handled = with_storage::<T, _>(instance, "set_property", |storage| {
        T::__godot_set_property(&mut storage.get_mut(), property, value)
    });

    sys::conv_bool(handled.unwrap_or(false))
}

pub unsafe extern "C" fn get_property_list<T: cap::GodotGetPropertyList>(
    instance: sys::GDExtensionClassInstancePtr,
    count: *mut u32,
) -> *const sys::GDExtensionPropertyInfo {
    let Some(property_list) = with_storage::<T, _>(instance, "get_property_list", |storage| {
        T::__godot_get_property_list(&mut storage.get_mut())
    }) else {
        *count = 0;
        return ptr::null();
    };

    let Some(len) = property_count(T::class_name().as_str(), property_list.len()) else {
        *count = 0;
        return ptr::null();
    };

    let owners: Vec<PropertyInfoSys> = property_list.iter().map(PropertyInfo::to_sys).collect();
    let raw_list: Box<[sys::GDExtensionPropertyInfo]> = owners.iter().map(|info| *info.raw()).collect();
    *count = len;

    let list_ptr = Box::into_raw(raw_list) as *const sys::GDExtensionPropertyInfo;
    PROPERTY_LISTS.with(|lists| lists.borrow_mut().insert(list_ptr as usize, owners));

    list_ptr
}

/// Length of a property list in the engine's count type. Reports lists that exceed it.
fn property_count(class_name: &str, len: usize) -> Option<u32> {
    let count = u32::try_from(len).ok();
    if count.is_none() {
        godot_error!("get_property_list: {class_name} returned {len} properties, more than the engine can take");
    }
    count
}

pub unsafe extern "C" fn free_property_list<T: cap::GodotGetPropertyList>(
    _instance: sys::GDExtensionClassInstancePtr,
    list: *const sys::GDExtensionPropertyInfo,
    count: u32,
) {
    if list.is_null() {
        return;
    }

    let owners = PROPERTY_LISTS.with(|lists| lists.borrow_mut().remove(&(list as usize)));
    if owners.is_none() {
        godot_error!("free_property_list: list {list:?} of {} not known", T::class_name());
        return;
    }

    // SAFETY: `list` was produced by `get_property_list` from a boxed slice of `count` elements.
    let raw_list = ptr::slice_from_raw_parts_mut(list as *mut sys::GDExtensionPropertyInfo, count as usize);
    drop(Box::from_raw(raw_list));
}

pub unsafe extern "C" fn property_can_revert<T: UserClass + cap::GodotPropertyGetRevert>(
    instance: sys::GDExtensionClassInstancePtr,
    name: sys::GDExtensionConstStringNamePtr,
) -> sys::GDExtensionBool {
    let property = StringName::new_from_string_sys(sys::force_mut_ptr(name));

    let revert = with_storage::<T, _>(instance, "property_can_revert", |storage| {
        user_or_field_revert(&*storage.get(), property)
    });

    sys::conv_bool(revert.flatten().is_some())
}

pub unsafe extern "C" fn property_get_revert<T: UserClass + cap::GodotPropertyGetRevert>(
    instance: sys::GDExtensionClassInstancePtr,
    name: sys::GDExtensionConstStringNamePtr,
    ret: sys::GDExtensionVariantPtr,
) -> sys::GDExtensionBool {
    let property = StringName::new_from_string_sys(sys::force_mut_ptr(name));

    let revert = with_storage::<T, _>(instance, "property_get_revert", |storage| {
        user_or_field_revert(&*storage.get(), property)
    });

    write_revert(revert.flatten(), ret)
}

fn user_or_field_revert<T: UserClass + cap::GodotPropertyGetRevert>(
    instance: &T,
    property: StringName,
) -> Option<Variant> {
    let field_name = property.to_string();

    instance
        .__godot_property_get_revert(property)
        .or_else(|| T::__field_revert(&field_name))
}

/// Revert lookup for classes without a `property_get_revert` override: only `#[init(val = ...)]` field defaults.
pub unsafe extern "C" fn field_can_revert<T: UserClass>(
    instance: sys::GDExtensionClassInstancePtr,
    name: sys::GDExtensionConstStringNamePtr,
) -> sys::GDExtensionBool {
    let property = StringName::new_from_string_sys(sys::force_mut_ptr(name)).to_string();
    let revert = with_storage::<T, _>(instance, "property_can_revert", |_storage| T::__field_revert(&property));

    sys::conv_bool(revert.flatten().is_some())
}

pub unsafe extern "C" fn field_get_revert<T: UserClass>(
    instance: sys::GDExtensionClassInstancePtr,
    name: sys::GDExtensionConstStringNamePtr,
    ret: sys::GDExtensionVariantPtr,
) -> sys::GDExtensionBool {
    let property = StringName::new_from_string_sys(sys::force_mut_ptr(name)).to_string();
    let revert = with_storage::<T, _>(instance, "property_get_revert", |_storage| T::__field_revert(&property));

    write_revert(revert.flatten(), ret)
}

unsafe fn write_revert(revert: Option<Variant>, ret: sys::GDExtensionVariantPtr) -> sys::GDExtensionBool {
    match revert {
        Some(value) => {
            *(ret as *mut Variant) = value;
            sys::SYS_TRUE
        }
        None => sys::SYS_FALSE,
    }
}

pub unsafe extern "C" fn validate_property<T: cap::GodotValidateProperty>(
    instance: sys::GDExtensionClassInstancePtr,
    property_info_ptr: *mut sys::GDExtensionPropertyInfo,
) -> sys::GDExtensionBool {
    let mut property_info = PropertyInfo::new_from_sys(property_info_ptr);

    let validated = with_storage::<T, _>(instance, "validate_property", move |storage| {
        T::__godot_validate_property(&storage.get(), &mut property_info);
        property_info
    });

    match validated {
        Some(property_info) => {
            property_info.write_into_property_info_ptr(property_info_ptr);
            sys::SYS_TRUE
        }
        None => sys::SYS_FALSE,
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Safe, higher-level methods

pub fn register_user_properties<T: cap::ImplementsGodotExports>() {
    T::__register_exports();
}

pub fn register_user_methods<T: cap::ImplementsGodotApi>() {
    T::__register_methods();
}

pub fn register_user_signals<T: cap::ImplementsGodotApi>() {
    T::__register_signals();
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Number of property lists handed out and not yet freed; for leak checks in tests.
#[doc(hidden)]
pub fn outstanding_property_lists() -> usize {
    PROPERTY_LISTS.with(|lists| lists.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_count_rejects_oversized_lists() {
        assert_eq!(property_count("Holder", 0), Some(0));
        assert_eq!(property_count("Holder", 3), Some(3));
        assert_eq!(property_count("Holder", u32::MAX as usize), Some(u32::MAX));

        #[cfg(target_pointer_width = "64")]
        assert_eq!(property_count("Holder", u32::MAX as usize + 1), None);
    }
}
