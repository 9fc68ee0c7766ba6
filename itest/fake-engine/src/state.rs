/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Process-wide engine state.
//!
//! Everything lives behind one mutex. Code holding the guard must not call into the library, nor create or drop values that
//! may hold objects or callables: both can re-enter the engine.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use godot_ffi as sys;
use sys::VariantType;

use crate::callables::CallableData;
use crate::value::RawVariant;

static ENGINE: Mutex<Engine> = Mutex::new(Engine::new());

/// Locks the engine state. A panic inside a previous critical section does not poison later tests.
pub(crate) fn engine() -> MutexGuard<'static, Engine> {
    let mut guard = ENGINE.lock().unwrap_or_else(PoisonError::into_inner);
    if !guard.natives_installed {
        guard.install_natives();
    }
    guard
}

/// Records an engine message and mirrors it to stderr.
pub(crate) fn report(kind: MessageKind, text: impl Into<String>) {
    let text = text.into();
    eprintln!("{}: {text}", kind.label());
    engine().messages.push(Message { kind, text });
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MessageKind {
    Error,
    Warning,
    ScriptError,
}

impl MessageKind {
    fn label(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::ScriptError => "SCRIPT ERROR",
        }
    }
}

/// Diagnostic printed through the engine, by the library or by the engine itself.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

/// Property as registered through `classdb_register_extension_class_property`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PropertyRecord {
    pub name: String,
    pub variant_type: VariantType,
    pub class_name: String,
    pub hint: u32,
    pub hint_string: String,
    pub usage: u32,
    pub getter: String,
    pub setter: String,
}

/// Signal as registered through `classdb_register_extension_class_signal`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SignalRecord {
    pub name: String,
    pub params: Vec<(String, VariantType)>,
}

/// Callbacks of an extension class, copied out of `GDExtensionClassCreationInfo3`.
#[derive(Copy, Clone)]
pub(crate) struct ExtensionClass {
    pub library: usize,
    pub userdata: usize,
    pub create_instance: sys::GDExtensionClassCreateInstance,
    pub free_instance: sys::GDExtensionClassFreeInstance,
    pub get_virtual: sys::GDExtensionClassGetVirtual,
    pub to_string: sys::GDExtensionClassToString,
    pub notification: sys::GDExtensionClassNotification2,
    pub set: sys::GDExtensionClassSet,
    pub get: sys::GDExtensionClassGet,
    pub get_property_list: sys::GDExtensionClassGetPropertyList,
    pub free_property_list: sys::GDExtensionClassFreePropertyList2,
    pub property_can_revert: sys::GDExtensionClassPropertyCanRevert,
    pub property_get_revert: sys::GDExtensionClassPropertyGetRevert,
    pub validate_property: sys::GDExtensionClassValidateProperty,
}

#[derive(Clone)]
pub(crate) struct MethodRecord {
    pub userdata: usize,
    pub call: sys::GDExtensionClassMethodCall,
    pub ptrcall: sys::GDExtensionClassMethodPtrCall,
    pub argument_types: Vec<VariantType>,
    pub return_type: Option<VariantType>,
    pub defaults: Arc<Vec<RawVariant>>,
}

pub(crate) struct ClassRecord {
    pub parent: Option<String>,
    pub tag: usize,
    pub extension: Option<ExtensionClass>,
    pub methods: BTreeMap<String, MethodRecord>,
    pub properties: Vec<PropertyRecord>,
    pub signals: Vec<SignalRecord>,
}

impl ClassRecord {
    fn native(parent: Option<&str>, tag: usize, signals: &[&str]) -> Self {
        Self {
            parent: parent.map(str::to_string),
            tag,
            extension: None,
            methods: BTreeMap::new(),
            properties: Vec::new(),
            signals: signals
                .iter()
                .map(|name| SignalRecord {
                    name: name.to_string(),
                    params: Vec::new(),
                })
                .collect(),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct RefState {
    pub count: u32,
    pub initialized: bool,
}

pub(crate) struct Binding {
    pub token: usize,
    pub data: usize,
    pub free: sys::GDExtensionInstanceBindingFreeCallback,
}

pub(crate) struct Connection {
    pub signal: String,
    pub callable: Arc<CallableData>,
    pub flags: u32,
}

pub(crate) struct ObjectRecord {
    pub id: u64,
    pub class: String,
    pub refs: Option<RefState>,
    pub instance: usize,
    pub bindings: Vec<Binding>,
    pub connections: Vec<Connection>,
    pub destroying: bool,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Bit set in the instance IDs of reference-counted objects.
pub(crate) const REF_COUNTED_ID_BIT: u64 = 1 << 63;

/// Object addresses are handed out from here and never reused, so stale pointers can always be recognized.
const OBJECT_ADDRESS_BASE: usize = 0x1000_0000;
const OBJECT_ADDRESS_STRIDE: usize = 0x40;

pub(crate) struct Engine {
    pub classes: BTreeMap<String, ClassRecord>,
    pub objects: BTreeMap<usize, ObjectRecord>,
    pub addresses: BTreeMap<u64, usize>,
    pub messages: Vec<Message>,
    pub destructor_runs: u64,
    pub failing_binds: Vec<(String, String)>,
    pub rejected_classes: Vec<String>,
    pub withheld_functions: Vec<String>,
    next_serial: u64,
    next_tag: usize,
    natives_installed: bool,
}

impl Engine {
    const fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
            objects: BTreeMap::new(),
            addresses: BTreeMap::new(),
            messages: Vec::new(),
            destructor_runs: 0,
            failing_binds: Vec::new(),
            rejected_classes: Vec::new(),
            withheld_functions: Vec::new(),
            next_serial: 1,
            next_tag: 1,
            natives_installed: false,
        }
    }

    fn install_natives(&mut self) {
        let natives: [(&str, Option<&str>, &[&str]); 4] = [
            ("Object", None, &["script_changed", "property_list_changed"]),
            ("RefCounted", Some("Object"), &[]),
            ("Node", Some("Object"), &["ready", "tree_entered", "tree_exiting"]),
            ("Resource", Some("RefCounted"), &["changed"]),
        ];

        for (name, parent, signals) in natives {
            let tag = self.next_tag();
            self.classes
                .insert(name.to_string(), ClassRecord::native(parent, tag, signals));
        }
        self.natives_installed = true;
    }

    pub fn next_tag(&mut self) -> usize {
        let tag = self.next_tag;
        self.next_tag += 1;
        tag
    }

    /// Whether `class` is `ancestor` or derives from it.
    pub fn inherits(&self, class: &str, ancestor: &str) -> bool {
        let mut current = Some(class);
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = self.classes.get(name).and_then(|c| c.parent.as_deref());
        }
        false
    }

    pub fn is_ref_counted(&self, class: &str) -> bool {
        self.inherits(class, "RefCounted")
    }

    /// Nearest class in the chain that was registered by a library.
    pub fn extension_of(&self, class: &str) -> Option<ExtensionClass> {
        let mut current = Some(class);
        while let Some(name) = current {
            let record = self.classes.get(name)?;
            if record.extension.is_some() {
                return record.extension;
            }
            current = record.parent.as_deref();
        }
        None
    }

    pub fn find_method(&self, class: &str, method: &str) -> Option<MethodRecord> {
        let mut current = Some(class);
        while let Some(name) = current {
            let record = self.classes.get(name)?;
            if let Some(found) = record.methods.get(method) {
                return Some(found.clone());
            }
            current = record.parent.as_deref();
        }
        None
    }

    pub fn find_property(&self, class: &str, property: &str) -> Option<PropertyRecord> {
        let mut current = Some(class);
        while let Some(name) = current {
            let record = self.classes.get(name)?;
            if let Some(found) = record.properties.iter().find(|p| p.name == property) {
                return Some(found.clone());
            }
            current = record.parent.as_deref();
        }
        None
    }

    pub fn has_signal(&self, class: &str, signal: &str) -> bool {
        let mut current = Some(class);
        while let Some(name) = current {
            let Some(record) = self.classes.get(name) else {
                return false;
            };
            if record.signals.iter().any(|s| s.name == signal) {
                return true;
            }
            current = record.parent.as_deref();
        }
        false
    }

    pub fn class_by_tag(&self, tag: usize) -> Option<&str> {
        self.classes
            .iter()
            .find(|(_, record)| record.tag == tag)
            .map(|(name, _)| name.as_str())
    }

    /// Allocates a record for a new object of `class`, returning its address.
    pub fn alloc_object(&mut self, class: &str) -> usize {
        let serial = self.next_serial;
        self.next_serial += 1;

        let ref_counted = self.is_ref_counted(class);
        let id = if ref_counted {
            serial | REF_COUNTED_ID_BIT
        } else {
            serial
        };
        let address = OBJECT_ADDRESS_BASE + serial as usize * OBJECT_ADDRESS_STRIDE;

        let record = ObjectRecord {
            id,
            class: class.to_string(),
            refs: ref_counted.then_some(RefState {
                count: 0,
                initialized: false,
            }),
            instance: 0,
            bindings: Vec::new(),
            connections: Vec::new(),
            destroying: false,
        };

        self.objects.insert(address, record);
        self.addresses.insert(id, address);
        address
    }

    pub fn object(&self, address: usize) -> Option<&ObjectRecord> {
        self.objects.get(&address)
    }

    pub fn object_mut(&mut self, address: usize) -> Option<&mut ObjectRecord> {
        self.objects.get_mut(&address)
    }

    /// Address of a live object, or 0.
    pub fn address_of(&self, id: u64) -> usize {
        match self.addresses.get(&id) {
            Some(&address) if self.object(address).is_some() => address,
            _ => 0,
        }
    }

    pub fn live_objects(&self) -> usize {
        self.objects.values().filter(|o| !o.destroying).count()
    }
}
