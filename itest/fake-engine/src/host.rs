/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Engine-side API used by tests: loading a library, creating objects, calling into classes and inspecting what was registered.
//!
//! Everything here acts like the engine would. Objects are addressed by instance ID; values cross the boundary as [`HostValue`].

use std::ffi::c_void;
use std::ptr;
use std::sync::{Arc, Mutex};

use godot_ffi as sys;
use sys::VariantType;

use crate::callables::CallableData;
use crate::containers::PackedData;
use crate::error::EngineError;
use crate::state::{engine, ExtensionClass};
use crate::strings::{self, StringSlot};
use crate::value::{self, DictEntry, ObjectRef, RawVariant, Value};
use crate::{interface, objects, slots};

pub use crate::state::{Message, MessageKind, PropertyRecord, SignalRecord};

/// Signature of a library entry symbol, such as the `gdext_rust_init` generated by `#[gdextension]`.
pub type EntryFn = unsafe extern "C" fn(
    sys::GDExtensionInterfaceGetProcAddress,
    sys::GDExtensionClassLibraryPtr,
    *mut sys::GDExtensionInitialization,
) -> sys::GDExtensionBool;

/// Identity of the loaded library; its address is passed as the library pointer.
static LIBRARY_TOKEN: u8 = 0;

/// Runs the entry symbol. Levels are not initialized yet; see [`Extension::initialize()`].
pub fn load(entry: EntryFn) -> Result<Extension, EngineError> {
    let mut initialization = sys::GDExtensionInitialization {
        minimum_initialization_level: sys::GDEXTENSION_INITIALIZATION_CORE,
        userdata: ptr::null_mut(),
        initialize: None,
        deinitialize: None,
    };

    let library = &LIBRARY_TOKEN as *const u8 as sys::GDExtensionClassLibraryPtr;

    // SAFETY: the entry symbol is called like the engine calls it, with a valid initialization struct.
    let success = unsafe { entry(Some(interface::get_proc_address), library, &mut initialization) };
    if success == sys::SYS_FALSE {
        return Err(EngineError::EntryFailed);
    }

    Ok(Extension {
        initialization,
        initialized_up_to: None,
    })
}

/// A library whose entry symbol succeeded.
pub struct Extension {
    initialization: sys::GDExtensionInitialization,
    initialized_up_to: Option<sys::GDExtensionInitializationLevel>,
}

impl Extension {
    pub fn min_level(&self) -> sys::GDExtensionInitializationLevel {
        self.initialization.minimum_initialization_level
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized_up_to.is_some()
    }

    /// Initializes every level from the library's minimum up to `Editor`, in ascending order.
    pub fn initialize(&mut self) {
        if self.initialized_up_to.is_some() {
            return;
        }
        let Some(initialize) = self.initialization.initialize else {
            return;
        };

        for level in self.min_level()..=sys::GDEXTENSION_INITIALIZATION_EDITOR {
            // SAFETY: callbacks and userdata come from the entry symbol.
            unsafe { initialize(self.initialization.userdata, level) };
            self.initialized_up_to = Some(level);
        }
    }

    /// Deinitializes the levels in reverse order.
    pub fn deinitialize(&mut self) {
        let Some(top) = self.initialized_up_to.take() else {
            return;
        };
        let Some(deinitialize) = self.initialization.deinitialize else {
            return;
        };

        for level in (self.min_level()..=top).rev() {
            // SAFETY: see `initialize()`.
            unsafe { deinitialize(self.initialization.userdata, level) };
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Values

/// Value crossing between a test and the engine.
#[derive(Clone, PartialEq, Debug)]
pub enum HostValue {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    StringName(String),
    /// Instance ID; 0 is the null object.
    Object(u64),
    Array(Vec<HostValue>),
    Dictionary(Vec<(HostValue, HostValue)>),
    PackedBytes(Vec<u8>),
    PackedStrings(Vec<String>),
    /// Any other type, in its text form. Only `NodePath` can be passed back into the engine.
    Other { variant_type: VariantType, text: String },
}

impl HostValue {
    pub fn variant_type(&self) -> VariantType {
        match self {
            Self::Nil => VariantType::Nil,
            Self::Bool(_) => VariantType::Bool,
            Self::Int(_) => VariantType::Int,
            Self::Float(_) => VariantType::Float,
            Self::String(_) => VariantType::String,
            Self::StringName(_) => VariantType::StringName,
            Self::Object(_) => VariantType::Object,
            Self::Array(_) => VariantType::Array,
            Self::Dictionary(_) => VariantType::Dictionary,
            Self::PackedBytes(_) => VariantType::PackedByteArray,
            Self::PackedStrings(_) => VariantType::PackedStringArray,
            Self::Other { variant_type, .. } => *variant_type,
        }
    }

    fn into_value(self) -> Result<Value, EngineError> {
        let value = match self {
            Self::Nil | Self::Object(0) => Value::Nil,
            Self::Bool(b) => Value::Bool(b),
            Self::Int(i) => Value::Int(i),
            Self::Float(f) => Value::Float(f),
            Self::String(s) => Value::String(s),
            Self::StringName(s) => Value::StringName(s),
            Self::Object(id) => Value::Object(ObjectRef::new(id)),
            Self::Array(items) => {
                let elements = items
                    .into_iter()
                    .map(|item| item.into_value().map(RawVariant::new))
                    .collect::<Result<Vec<_>, _>>()?;
                Value::Array(Arc::new(Mutex::new(elements)))
            }
            Self::Dictionary(entries) => {
                let mut converted = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    converted.push(Box::new(DictEntry {
                        key: RawVariant::new(key.into_value()?),
                        value: RawVariant::new(value.into_value()?),
                    }));
                }
                Value::Dictionary(Arc::new(Mutex::new(converted)))
            }
            Self::PackedBytes(bytes) => {
                let mut data = PackedData::new(VariantType::PackedByteArray);
                for byte in bytes {
                    data.push_bytes(&[byte]);
                }
                Value::Packed(data)
            }
            Self::PackedStrings(strings) => {
                let mut data = PackedData::new(VariantType::PackedStringArray);
                for s in strings {
                    data.push_string(s);
                }
                Value::Packed(data)
            }
            Self::Other {
                variant_type: VariantType::NodePath,
                text,
            } => Value::NodePath(text),
            Self::Other { variant_type, .. } => return Err(EngineError::UnsupportedType { variant_type }),
        };
        Ok(value)
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Nil => Self::Nil,
            Value::Bool(b) => Self::Bool(*b),
            Value::Int(i) => Self::Int(*i),
            Value::Float(f) => Self::Float(*f),
            Value::String(s) => Self::String(s.clone()),
            Value::StringName(s) => Self::StringName(s.clone()),
            Value::Object(obj) => Self::Object(obj.id()),
            Value::Array(array) => Self::Array(
                value::lock(array)
                    .iter()
                    .map(|element| Self::from_value(element.value()))
                    .collect(),
            ),
            Value::Dictionary(dict) => Self::Dictionary(
                value::lock(dict)
                    .iter()
                    .map(|entry| (Self::from_value(entry.key.value()), Self::from_value(entry.value.value())))
                    .collect(),
            ),
            Value::Packed(data) if data.variant_type() == VariantType::PackedByteArray => {
                Self::PackedBytes(data.bytes().to_vec())
            }
            Value::Packed(data) if data.variant_type() == VariantType::PackedStringArray => {
                Self::PackedStrings(data.strings())
            }
            other => Self::Other {
                variant_type: other.variant_type(),
                text: other.stringify(),
            },
        }
    }
}

impl From<RawVariant> for HostValue {
    fn from(variant: RawVariant) -> Self {
        Self::from_value(variant.value())
    }
}

/// Pointer-call storage for one value. `Nil` stands for a `Variant` parameter.
struct Slot {
    ty: VariantType,
    words: Vec<u64>,
    live: bool,
}

impl Slot {
    fn new(ty: VariantType, value: Value) -> Self {
        let size = slots::slot_size(ty).max(std::mem::size_of::<RawVariant>());
        let mut slot = Self {
            ty,
            words: vec![0; size.div_ceil(8)],
            live: true,
        };

        let ptr = slot.ptr();
        // SAFETY: the buffer is large and aligned enough for any value of `ty`.
        unsafe {
            if ty == VariantType::Nil {
                value::variant_write(ptr, RawVariant::new(value));
            } else {
                slots::write_typed(ty, ptr, value);
            }
        }
        slot
    }

    fn default_for(ty: VariantType) -> Self {
        Self::new(ty, slots::default_value(ty))
    }

    fn ptr(&mut self) -> *mut c_void {
        self.words.as_mut_ptr() as *mut c_void
    }

    /// Moves the value out. A returned object carries a reference, which the result takes over.
    fn take_returned(mut self) -> Value {
        self.live = false;
        let ptr = self.ptr();

        // SAFETY: the slot holds a valid value of `ty`.
        unsafe {
            match self.ty {
                VariantType::Nil => ptr::read(ptr as *const RawVariant).into_value(),
                VariantType::Object => match objects::id_of_address(*(ptr as *const usize)) {
                    0 => Value::Nil,
                    id => Value::Object(ObjectRef::adopt(id)),
                },
                ty => slots::take_typed(ty, ptr),
            }
        }
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        if !self.live || self.ty == VariantType::Object {
            return;
        }

        let ptr = self.ptr();
        // SAFETY: the slot still holds a valid value of `ty`.
        unsafe {
            if self.ty == VariantType::Nil {
                ptr::drop_in_place(ptr as *mut RawVariant);
            } else {
                drop(slots::take_typed(self.ty, ptr));
            }
        }
    }
}

fn to_variants(args: &[HostValue]) -> Result<Vec<RawVariant>, EngineError> {
    args.iter()
        .map(|arg| arg.clone().into_value().map(RawVariant::new))
        .collect()
}

fn variant_ptrs(variants: &[RawVariant]) -> Vec<sys::GDExtensionConstVariantPtr> {
    variants
        .iter()
        .map(|v| v as *const RawVariant as sys::GDExtensionConstVariantPtr)
        .collect()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Objects

struct Target {
    address: usize,
    class: String,
    instance: usize,
    extension: Option<ExtensionClass>,
}

fn target(id: u64) -> Result<Target, EngineError> {
    let engine = engine();
    let address = engine.address_of(id);
    match engine.object(address) {
        Some(record) if !record.destroying => Ok(Target {
            address,
            class: record.class.clone(),
            instance: record.instance,
            extension: engine.extension_of(&record.class),
        }),
        _ => Err(EngineError::UnknownObject { id }),
    }
}

/// Creates an object the way `ClassDB.instantiate()` does. The test holds the initial reference of ref-counted objects.
pub fn instantiate(class: &str) -> Result<u64, EngineError> {
    if !is_class_registered(class) {
        return Err(EngineError::UnknownClass {
            class: class.to_string(),
        });
    }

    let address = objects::construct(class) as usize;
    let id = objects::id_of_address(address);
    if id == 0 {
        return Err(EngineError::NotInstantiable {
            class: class.to_string(),
        });
    }

    objects::init_ref(address);
    Ok(id)
}

/// Gives back the test's reference on a ref-counted object.
pub fn release(id: u64) {
    objects::release_id(id);
}

/// Destroys a manually managed object, like `Object.free()`.
pub fn free_object(id: u64) -> Result<(), EngineError> {
    let target = target(id)?;
    objects::destroy(target.address);
    Ok(())
}

pub fn is_alive(id: u64) -> bool {
    objects::is_alive(id)
}

pub fn class_of(id: u64) -> Option<String> {
    objects::class_of(id)
}

/// `None` for objects that are not reference-counted or not alive.
pub fn reference_count(id: u64) -> Option<u32> {
    let engine = engine();
    let address = engine.address_of(id);
    engine.object(address).and_then(|o| o.refs).map(|refs| refs.count)
}

pub fn live_objects() -> usize {
    engine().live_objects()
}

/// Number of objects destroyed since the process started.
pub fn destructor_runs() -> u64 {
    engine().destructor_runs
}

pub fn object_to_string(id: u64) -> String {
    objects::describe(id)
}

pub fn notify(id: u64, what: i32) -> Result<(), EngineError> {
    let target = target(id)?;
    let notification = target.extension.and_then(|e| e.notification);

    if let (Some(notification), true) = (notification, target.instance != 0) {
        // SAFETY: the instance belongs to a live object.
        unsafe { notification(target.instance as *mut c_void, what, sys::SYS_FALSE) };
    }
    Ok(())
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Calls

/// Calls a virtual method override through a pointer call. `ret_type` is `None` for virtuals without return value.
pub fn call_virtual(
    id: u64,
    method: &str,
    args: &[HostValue],
    ret_type: Option<VariantType>,
) -> Result<HostValue, EngineError> {
    let target = target(id)?;
    let no_virtual = || EngineError::NoVirtual {
        class: target.class.clone(),
        method: method.to_string(),
    };

    let extension = target.extension.ok_or_else(no_virtual)?;
    let get_virtual = extension.get_virtual.ok_or_else(no_virtual)?;

    let mut name = StringSlot::new(method);
    // SAFETY: the class userdata was registered alongside this callback.
    let call = unsafe { get_virtual(extension.userdata as *mut c_void, name.ptr()) }.ok_or_else(no_virtual)?;

    let mut arg_slots = Vec::with_capacity(args.len());
    for arg in args {
        arg_slots.push(Slot::new(arg.variant_type(), arg.clone().into_value()?));
    }
    let arg_ptrs: Vec<sys::GDExtensionConstTypePtr> = arg_slots.iter_mut().map(|s| s.ptr() as *const c_void).collect();

    let mut ret = ret_type.map(Slot::default_for);
    let ret_ptr = ret.as_mut().map_or(ptr::null_mut(), Slot::ptr);

    // SAFETY: argument and return slots match the types the override expects.
    unsafe { call(target.instance as *mut c_void, arg_ptrs.as_ptr(), ret_ptr) };

    Ok(ret.map_or(HostValue::Nil, |slot| HostValue::from_value(&slot.take_returned())))
}

/// `Node._get_configuration_warnings()`.
pub fn call_virtual_warnings(id: u64) -> Result<Vec<String>, EngineError> {
    let ret = call_virtual(id, "_get_configuration_warnings", &[], Some(VariantType::PackedStringArray))?;
    match ret {
        HostValue::PackedStrings(warnings) => Ok(warnings),
        _ => Ok(Vec::new()),
    }
}

/// Variant call of a method, like `Object.call()`.
pub fn call_method(id: u64, method: &str, args: &[HostValue]) -> Result<HostValue, EngineError> {
    let target = target(id)?;
    let variants = to_variants(args)?;

    let (ret, error) = objects::call_method(target.address, method, &variant_ptrs(&variants));
    match error.error {
        sys::GDEXTENSION_CALL_OK => Ok(HostValue::from(ret)),
        sys::GDEXTENSION_CALL_ERROR_INVALID_METHOD => Err(EngineError::UnknownMethod {
            class: target.class,
            method: method.to_string(),
        }),
        error => Err(EngineError::CallFailed {
            method: method.to_string(),
            error,
        }),
    }
}

/// Pointer call of a registered method, with the argument types it was registered with.
pub fn ptrcall_method(id: u64, method: &str, args: &[HostValue]) -> Result<HostValue, EngineError> {
    ptrcall_registered(id, method, args, true)
}

/// Like [`ptrcall_method()`], but passes a null return slot, as the engine does when it discards the result.
pub fn ptrcall_method_discarding(id: u64, method: &str, args: &[HostValue]) -> Result<(), EngineError> {
    ptrcall_registered(id, method, args, false).map(|_| ())
}

fn ptrcall_registered(id: u64, method: &str, args: &[HostValue], keep_return: bool) -> Result<HostValue, EngineError> {
    let target = target(id)?;
    let record = engine().find_method(&target.class, method);

    let unknown = || EngineError::UnknownMethod {
        class: target.class.clone(),
        method: method.to_string(),
    };
    let record = record.ok_or_else(unknown)?;
    let ptrcall = record.ptrcall.ok_or_else(unknown)?;

    if args.len() != record.argument_types.len() {
        return Err(EngineError::CallFailed {
            method: method.to_string(),
            error: if args.len() > record.argument_types.len() {
                sys::GDEXTENSION_CALL_ERROR_TOO_MANY_ARGUMENTS
            } else {
                sys::GDEXTENSION_CALL_ERROR_TOO_FEW_ARGUMENTS
            },
        });
    }

    let mut arg_slots = Vec::with_capacity(args.len());
    for (arg, &ty) in args.iter().zip(&record.argument_types) {
        arg_slots.push(Slot::new(ty, arg.clone().into_value()?));
    }
    let arg_ptrs: Vec<sys::GDExtensionConstTypePtr> = arg_slots.iter_mut().map(|s| s.ptr() as *const c_void).collect();

    let mut ret = record.return_type.filter(|_| keep_return).map(Slot::default_for);
    let ret_ptr = ret.as_mut().map_or(ptr::null_mut(), Slot::ptr);

    // SAFETY: slots follow the registered signature.
    unsafe {
        ptrcall(
            record.userdata as *mut c_void,
            target.instance as *mut c_void,
            arg_ptrs.as_ptr(),
            ret_ptr,
        )
    };

    Ok(ret.map_or(HostValue::Nil, |slot| HostValue::from_value(&slot.take_returned())))
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Properties

/// Properties registered for exactly this class, without inherited ones.
pub fn property_list(class: &str) -> Vec<PropertyRecord> {
    engine()
        .classes
        .get(class)
        .map(|record| record.properties.clone())
        .unwrap_or_default()
}

/// Property list of an object as the editor sees it: registered properties of the class chain, followed by the ones
/// returned by the instance's `get_property_list`, all passed through `validate_property`.
pub fn validated_property_list(id: u64) -> Result<Vec<PropertyRecord>, EngineError> {
    let target = target(id)?;

    let mut properties = Vec::new();
    {
        let engine = engine();
        let mut current = Some(target.class.clone());
        let mut chain = Vec::new();
        while let Some(name) = current {
            let record = engine.classes.get(&name);
            current = record.and_then(|r| r.parent.clone());
            chain.push(record.map(|r| r.properties.clone()).unwrap_or_default());
        }
        for own in chain.into_iter().rev() {
            properties.extend(own);
        }
    }

    let Some(extension) = target.extension else {
        return Ok(properties);
    };
    let instance = target.instance as *mut c_void;
    if instance.is_null() {
        return Ok(properties);
    }

    if let Some(get_list) = extension.get_property_list {
        let mut count = 0u32;
        // SAFETY: the list is valid until handed back to `free_property_list`.
        unsafe {
            let list = get_list(instance, &mut count);
            if !list.is_null() {
                for info in std::slice::from_raw_parts(list, count as usize) {
                    properties.push(crate::classdb::read_property_info(info));
                }
                if let Some(free_list) = extension.free_property_list {
                    free_list(instance, list, count);
                }
            }
        }
    }

    if let Some(validate) = extension.validate_property {
        for property in &mut properties {
            let mut name = StringSlot::new(&property.name);
            let mut class_name = StringSlot::new(&property.class_name);
            let mut hint_string = StringSlot::new(&property.hint_string);

            let mut info = sys::GDExtensionPropertyInfo {
                type_: property.variant_type.sys(),
                name: name.ptr(),
                class_name: class_name.ptr(),
                hint: property.hint,
                hint_string: hint_string.ptr(),
                usage: property.usage,
            };

            // SAFETY: the strings live until the end of this iteration.
            unsafe {
                if validate(instance, &mut info) != 0 {
                    property.variant_type = VariantType::from_sys(info.type_);
                    property.name = strings::read(info.name);
                    property.class_name = strings::read(info.class_name);
                    property.hint = info.hint;
                    property.hint_string = strings::read(info.hint_string);
                    property.usage = info.usage;
                }
            }
        }
    }

    Ok(properties)
}

pub fn get_property(id: u64, name: &str) -> Result<HostValue, EngineError> {
    let target = target(id)?;
    Ok(HostValue::from(objects::get_property(target.address, name)))
}

/// Returns whether the object accepted the value.
pub fn set_property(id: u64, name: &str, value: HostValue) -> Result<bool, EngineError> {
    let target = target(id)?;
    let variant = RawVariant::new(value.into_value()?);
    let ptr = &variant as *const RawVariant as sys::GDExtensionConstVariantPtr;
    Ok(objects::set_property(target.address, name, ptr))
}

/// Value the editor would revert the property to, if the class provides one.
pub fn property_get_revert(id: u64, name: &str) -> Result<Option<HostValue>, EngineError> {
    let target = target(id)?;
    let Some(extension) = target.extension else {
        return Ok(None);
    };
    let (Some(can_revert), Some(get_revert)) = (extension.property_can_revert, extension.property_get_revert) else {
        return Ok(None);
    };

    let instance = target.instance as *mut c_void;
    let mut name_slot = StringSlot::new(name);
    let mut ret = RawVariant::default();

    // SAFETY: `ret` is an initialized variant, the instance belongs to a live object.
    let reverted = unsafe {
        can_revert(instance, name_slot.ptr()) != 0
            && get_revert(instance, name_slot.ptr(), &mut ret as *mut RawVariant as sys::GDExtensionVariantPtr) != 0
    };

    Ok(reverted.then(|| HostValue::from(ret)))
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Signals and registration

/// Signals registered for exactly this class.
pub fn signal_list(class: &str) -> Vec<SignalRecord> {
    engine()
        .classes
        .get(class)
        .map(|record| record.signals.clone())
        .unwrap_or_default()
}

/// Names of the methods registered for exactly this class, sorted.
pub fn method_names(class: &str) -> Vec<String> {
    engine()
        .classes
        .get(class)
        .map(|record| record.methods.keys().cloned().collect())
        .unwrap_or_default()
}

pub fn emit_signal(id: u64, signal: &str, args: &[HostValue]) -> Result<(), EngineError> {
    target(id)?;
    let variants = to_variants(args)?;

    match objects::emit(id, signal, &variant_ptrs(&variants)) {
        objects::OK => Ok(()),
        code => Err(EngineError::CallFailed {
            method: signal.to_string(),
            error: code as u32,
        }),
    }
}

/// Connects `signal` of `id` to `method` of `target_id`.
pub fn connect_method(id: u64, signal: &str, target_id: u64, method: &str) -> Result<(), EngineError> {
    target(id)?;
    let callable = Arc::new(CallableData::Method {
        object_id: target_id,
        method: method.to_string(),
    });

    match objects::connect(id, signal, callable, 0) {
        objects::OK => Ok(()),
        code => Err(EngineError::CallFailed {
            method: signal.to_string(),
            error: code as u32,
        }),
    }
}

pub fn connection_count(id: u64, signal: &str) -> usize {
    objects::connection_count(id, signal)
}

pub fn is_class_registered(class: &str) -> bool {
    engine().classes.contains_key(class)
}

pub fn class_parent(class: &str) -> Option<String> {
    engine().classes.get(class).and_then(|record| record.parent.clone())
}

/// Whether the class was registered by a library, as opposed to being built into the engine.
pub fn is_extension_class(class: &str) -> bool {
    engine().classes.get(class).is_some_and(|record| record.extension.is_some())
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Failure simulation and diagnostics

/// `classdb_get_method_bind` returns null for this method from now on.
pub fn fail_method_bind(class: &str, method: &str) {
    engine().failing_binds.push((class.to_string(), method.to_string()));
}

/// The next registrations of `class` are refused.
pub fn reject_class_registration(class: &str) {
    engine().rejected_classes.push(class.to_string());
}

/// `get_proc_address` returns null for this function from now on.
pub fn withhold_interface_function(name: &str) {
    engine().withheld_functions.push(name.to_string());
}

pub fn reset_failures() {
    let mut engine = engine();
    engine.failing_binds.clear();
    engine.rejected_classes.clear();
    engine.withheld_functions.clear();
}

/// Every message printed so far.
pub fn messages() -> Vec<Message> {
    engine().messages.clone()
}

pub fn take_messages() -> Vec<Message> {
    std::mem::take(&mut engine().messages)
}

pub fn engine_version() -> (u32, u32, u32) {
    (interface::VERSION_MAJOR, interface::VERSION_MINOR, interface::VERSION_PATCH)
}

/// Names of all interface functions `get_proc_address` can resolve.
pub fn provided_functions() -> &'static [&'static str] {
    interface::FUNCTION_NAMES
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_objects_follow_reference_counting() {
        let id = instantiate("RefCounted").unwrap();
        assert_eq!(reference_count(id), Some(1));
        assert_ne!(id & crate::state::REF_COUNTED_ID_BIT, 0);

        let copy = HostValue::Object(id).into_value().unwrap();
        assert_eq!(reference_count(id), Some(2));
        drop(copy);
        assert_eq!(reference_count(id), Some(1));

        let before = destructor_runs();
        release(id);
        assert!(!is_alive(id));
        assert!(destructor_runs() > before);
    }

    #[test]
    fn manual_objects_need_free() {
        let id = instantiate("Node").unwrap();
        assert_eq!(reference_count(id), None);
        assert_eq!(class_of(id).as_deref(), Some("Node"));

        free_object(id).unwrap();
        assert!(!is_alive(id));
        assert_eq!(free_object(id), Err(EngineError::UnknownObject { id }));
    }

    #[test]
    fn unknown_class_is_reported() {
        assert_eq!(
            instantiate("NoSuchClass"),
            Err(EngineError::UnknownClass {
                class: "NoSuchClass".to_string()
            })
        );
    }

    #[test]
    fn native_signals_are_known() {
        let names: Vec<String> = signal_list("Node").into_iter().map(|s| s.name).collect();
        assert!(names.contains(&"ready".to_string()));
        assert_eq!(class_parent("Resource").as_deref(), Some("RefCounted"));
        assert!(!is_extension_class("Node"));
    }

    #[test]
    fn host_values_convert_both_ways() {
        let original = HostValue::Dictionary(vec![
            (HostValue::String("key".into()), HostValue::Array(vec![HostValue::Int(1), HostValue::Float(2.5)])),
            (HostValue::Int(7), HostValue::PackedBytes(vec![1, 2, 3])),
            (HostValue::Nil, HostValue::PackedStrings(vec!["a".into(), "b".into()])),
        ]);

        let value = original.clone().into_value().unwrap();
        assert_eq!(HostValue::from_value(&value), original);
    }

    #[test]
    fn unsupported_host_values_are_rejected() {
        let vector = HostValue::Other {
            variant_type: VariantType::Vector2,
            text: "(1.0, 2.0)".into(),
        };
        assert!(matches!(vector.into_value(), Err(EngineError::UnsupportedType { .. })));
    }
}
