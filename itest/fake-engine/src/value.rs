/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Engine-side value model: what a `Variant` holds, and the semantics of comparing, hashing and printing it.

use std::cmp::Ordering;
use std::ffi::c_void;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use godot_ffi as sys;
use sys::VariantType;

use crate::callables::{self, CallableData};
use crate::containers::PackedData;
use crate::objects;

/// Byte size of `real_t`.
pub(crate) const REAL_SIZE: usize = if cfg!(feature = "double-precision") { 8 } else { 4 };

/// Byte size of the plain types; `None` for types with non-trivial representation.
pub(crate) fn plain_size(ty: VariantType) -> Option<usize> {
    let r = REAL_SIZE;
    let size = match ty {
        VariantType::Bool => 1,
        VariantType::Int | VariantType::Float | VariantType::Rid | VariantType::Vector2i => 8,
        VariantType::Vector2 => 2 * r,
        VariantType::Rect2 => 4 * r,
        VariantType::Rect2i | VariantType::Vector4i | VariantType::Color => 16,
        VariantType::Vector3 => 3 * r,
        VariantType::Vector3i => 12,
        VariantType::Transform2D => 6 * r,
        VariantType::Vector4 | VariantType::Plane | VariantType::Quaternion => 4 * r,
        VariantType::Aabb => 6 * r,
        VariantType::Basis => 9 * r,
        VariantType::Transform3D => 12 * r,
        VariantType::Projection => 16 * r,
        _ => return None,
    };
    Some(size)
}

pub(crate) type ArrayRef = Arc<Mutex<Vec<RawVariant>>>;
pub(crate) type DictRef = Arc<Mutex<Vec<Box<DictEntry>>>>;

/// Dictionary entries are boxed, so that pointers returned by `dictionary_operator_index` survive insertions.
pub(crate) struct DictEntry {
    pub key: RawVariant,
    pub value: RawVariant,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub(crate) struct SignalValue {
    pub object_id: u64,
    pub name: String,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Counted reference to an engine object, held by a value.
///
/// Only reference-counted objects are affected; for manually managed ones this is just an ID.
pub(crate) struct ObjectRef {
    id: u64,
}

impl ObjectRef {
    /// Takes a new reference on the object.
    pub fn new(id: u64) -> Self {
        objects::reference_id(id);
        Self { id }
    }

    /// Takes over a reference that was already counted for the receiver.
    pub fn adopt(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Clone for ObjectRef {
    fn clone(&self) -> Self {
        Self::new(self.id)
    }
}

impl Drop for ObjectRef {
    fn drop(&mut self) {
        objects::release_id(self.id);
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[derive(Clone)]
pub(crate) enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    StringName(String),
    NodePath(String),
    /// Any other plain type, as its raw bytes.
    Plain(VariantType, Vec<u8>),
    Object(ObjectRef),
    Callable(Option<Arc<CallableData>>),
    Signal(SignalValue),
    Dictionary(DictRef),
    Array(ArrayRef),
    Packed(PackedData),
}

static NIL: Value = Value::Nil;

impl Value {
    pub fn variant_type(&self) -> VariantType {
        match self {
            Self::Nil => VariantType::Nil,
            Self::Bool(_) => VariantType::Bool,
            Self::Int(_) => VariantType::Int,
            Self::Float(_) => VariantType::Float,
            Self::String(_) => VariantType::String,
            Self::StringName(_) => VariantType::StringName,
            Self::NodePath(_) => VariantType::NodePath,
            Self::Plain(ty, _) => *ty,
            Self::Object(_) => VariantType::Object,
            Self::Callable(_) => VariantType::Callable,
            Self::Signal(_) => VariantType::Signal,
            Self::Dictionary(_) => VariantType::Dictionary,
            Self::Array(_) => VariantType::Array,
            Self::Packed(packed) => packed.variant_type(),
        }
    }

    /// Text of `String`, `StringName` and `NodePath` values.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::StringName(s) | Self::NodePath(s) => Some(s),
            _ => None,
        }
    }

    pub fn booleanize(&self) -> bool {
        match self {
            Self::Nil => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) | Self::StringName(s) | Self::NodePath(s) => !s.is_empty(),
            Self::Plain(_, bytes) => bytes.iter().any(|&b| b != 0),
            Self::Object(obj) => objects::is_alive(obj.id()),
            Self::Callable(data) => data.is_some(),
            Self::Signal(signal) => signal.object_id != 0,
            Self::Dictionary(dict) => !lock(dict).is_empty(),
            Self::Array(array) => !lock(array).is_empty(),
            Self::Packed(packed) => packed.len() != 0,
        }
    }

    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(i), Self::Float(f)) | (Self::Float(f), Self::Int(i)) => *i as f64 == *f,
            (Self::NodePath(a), Self::NodePath(b)) => a == b,
            (Self::String(a) | Self::StringName(a), Self::String(b) | Self::StringName(b)) => a == b,
            (Self::Plain(ta, a), Self::Plain(tb, b)) => ta == tb && a == b,
            (Self::Object(a), Self::Object(b)) => a.id() == b.id(),
            (Self::Callable(a), Self::Callable(b)) => callables::equal(a, b),
            (Self::Signal(a), Self::Signal(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (lock(a), lock(b));
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.value().equals(y.value()))
            }
            (Self::Dictionary(a), Self::Dictionary(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (lock(a), lock(b));
                a.len() == b.len()
                    && a.iter().all(|entry| {
                        b.iter().any(|other| {
                            other.key.value().equals(entry.key.value())
                                && other.value.value().equals(entry.value.value())
                        })
                    })
            }
            (Self::Packed(a), Self::Packed(b)) => a.content_eq(b),
            _ => false,
        }
    }

    /// Consistent with [`equals()`](Self::equals): equal values hash equally, also across `Int`/`Float` and `String`/`StringName`.
    pub fn hash_into(&self, state: &mut impl Hasher) {
        match self {
            Self::Nil => 0u8.hash(state),
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    (*f as i64).hash(state)
                } else {
                    f.to_bits().hash(state)
                }
            }
            Self::String(s) | Self::StringName(s) | Self::NodePath(s) => s.hash(state),
            Self::Plain(ty, bytes) => {
                ty.hash(state);
                bytes.hash(state);
            }
            Self::Object(obj) => obj.id().hash(state),
            Self::Callable(data) => callables::hash(data).hash(state),
            Self::Signal(signal) => signal.hash_into(state),
            Self::Array(array) => {
                let array = lock(array);
                array.len().hash(state);
                for element in array.iter() {
                    element.value().hash_into(state);
                }
            }
            // Entry order is not part of equality.
            Self::Dictionary(dict) => lock(dict).len().hash(state),
            Self::Packed(packed) => packed.hash_into(state),
        }
    }

    pub fn hash32(&self) -> u32 {
        let mut hasher = DefaultHasher::new();
        self.hash_into(&mut hasher);
        hasher.finish() as u32
    }

    /// Ordering for the comparison operators; `None` where the engine reports an invalid operation.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(i), Self::Float(f)) => (*i as f64).partial_cmp(f),
            (Self::Float(f), Self::Int(i)) => f.partial_cmp(&(*i as f64)),
            (Self::String(a) | Self::StringName(a), Self::String(b) | Self::StringName(b)) => Some(a.cmp(b)),
            (Self::Object(a), Self::Object(b)) => Some(a.id().cmp(&b.id())),
            _ => None,
        }
    }

    pub fn stringify(&self) -> String {
        match self {
            Self::Nil => "<null>".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => format_float(*f),
            Self::String(s) | Self::StringName(s) | Self::NodePath(s) => s.clone(),
            Self::Plain(ty, bytes) => stringify_plain(*ty, bytes),
            Self::Object(obj) => objects::describe(obj.id()),
            Self::Callable(data) => callables::describe(data),
            Self::Signal(signal) => {
                format!("{}::[signal]{}", objects::describe(signal.object_id), signal.name)
            }
            Self::Dictionary(dict) => {
                let dict = lock(dict);
                if dict.is_empty() {
                    return "{}".to_string();
                }
                let entries: Vec<String> = dict
                    .iter()
                    .map(|e| format!("{}: {}", e.key.value().stringify_nested(), e.value.value().stringify_nested()))
                    .collect();
                format!("{{ {} }}", entries.join(", "))
            }
            Self::Array(array) => {
                let elements: Vec<String> = lock(array).iter().map(|e| e.value().stringify_nested()).collect();
                format!("[{}]", elements.join(", "))
            }
            Self::Packed(packed) => format!("[{}]", packed.element_strings().join(", ")),
        }
    }

    /// Inside containers, text is quoted.
    fn stringify_nested(&self) -> String {
        match self {
            Self::String(s) => format!("\"{s}\""),
            Self::StringName(s) => format!("&\"{s}\""),
            Self::NodePath(s) => format!("^\"{s}\""),
            other => other.stringify(),
        }
    }
}

impl SignalValue {
    fn hash_into(&self, state: &mut impl Hasher) {
        self.object_id.hash(state);
        self.name.hash(state);
    }
}

pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

fn stringify_plain(ty: VariantType, bytes: &[u8]) -> String {
    let components: Vec<String> = match ty {
        VariantType::Vector2i | VariantType::Vector3i | VariantType::Vector4i | VariantType::Rect2i => bytes
            .chunks_exact(4)
            .map(|c| i32::from_ne_bytes([c[0], c[1], c[2], c[3]]).to_string())
            .collect(),
        VariantType::Color => bytes
            .chunks_exact(4)
            .map(|c| format_float(f32::from_ne_bytes([c[0], c[1], c[2], c[3]]) as f64))
            .collect(),
        VariantType::Rid => {
            let id = bytes
                .try_into()
                .map(u64::from_ne_bytes)
                .unwrap_or_default();
            return format!("RID({id})");
        }
        _ => reals(bytes).into_iter().map(format_float).collect(),
    };
    format!("({})", components.join(", "))
}

/// Splits the bytes of a real-based type into its components.
pub(crate) fn reals(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(REAL_SIZE)
        .map(|c| match c.len() {
            8 => f64::from_ne_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]),
            _ => f32::from_ne_bytes([c[0], c[1], c[2], c[3]]) as f64,
        })
        .collect()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Memory layout of a `Variant` as seen by the library: 24 bytes, type tag in the first word.
///
/// A zero-filled block is a valid nil variant. Dropping releases the value, cloning copies it with the engine's semantics.
#[repr(C)]
#[derive(Clone, Default)]
pub(crate) struct RawVariant {
    tag: u64,
    payload: Option<Box<Value>>,
    _reserved: u64,
}

impl RawVariant {
    pub fn new(value: Value) -> Self {
        match value {
            Value::Nil => Self::default(),
            value => Self {
                tag: value.variant_type().sys() as u64,
                payload: Some(Box::new(value)),
                _reserved: 0,
            },
        }
    }

    pub fn value(&self) -> &Value {
        self.payload.as_deref().unwrap_or(&NIL)
    }

    pub fn into_value(self) -> Value {
        self.payload.map_or(Value::Nil, |boxed| *boxed)
    }

    pub fn variant_type(&self) -> VariantType {
        VariantType::from_sys(self.tag as sys::GDExtensionVariantType)
    }
}

/// # Safety
/// `ptr` must point to an initialized variant that outlives `'a`.
pub(crate) unsafe fn variant_ref<'a>(ptr: *const c_void) -> &'a RawVariant {
    &*(ptr as *const RawVariant)
}

/// Writes into uninitialized variant memory.
///
/// # Safety
/// `ptr` must be valid for a 24-byte write.
pub(crate) unsafe fn variant_write(ptr: *mut c_void, variant: RawVariant) {
    std::ptr::write(ptr as *mut RawVariant, variant);
}

/// Replaces an initialized variant, dropping the previous value.
///
/// # Safety
/// `ptr` must point to an initialized variant.
pub(crate) unsafe fn variant_assign(ptr: *mut c_void, variant: RawVariant) {
    *(ptr as *mut RawVariant) = variant;
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nil_variant_is_zeroed() {
        assert_eq!(std::mem::size_of::<RawVariant>(), 24);

        let zeroed = [0u64; 3];
        // SAFETY: all-zero bytes are a nil variant with no payload.
        let variant = unsafe { variant_ref(zeroed.as_ptr() as *const c_void) };
        assert_eq!(variant.variant_type(), VariantType::Nil);
        assert!(matches!(variant.value(), Value::Nil));
    }

    #[test]
    fn stringify_scalars_and_containers() {
        assert_eq!(Value::Nil.stringify(), "<null>");
        assert_eq!(Value::Float(1.0).stringify(), "1.0");
        assert_eq!(Value::Float(0.25).stringify(), "0.25");

        let array = Arc::new(Mutex::new(vec![
            RawVariant::new(Value::Int(1)),
            RawVariant::new(Value::String("a".into())),
        ]));
        assert_eq!(Value::Array(array).stringify(), "[1, \"a\"]");
    }

    #[test]
    fn strings_compare_across_kinds() {
        let s = Value::String("x".into());
        let n = Value::StringName("x".into());
        let p = Value::NodePath("x".into());

        assert!(s.equals(&n));
        assert!(!s.equals(&p));
        assert_eq!(s.hash32(), n.hash32());
    }

    proptest! {
        #[test]
        fn int_float_equality_agrees_with_hash(i in -1_000_000i64..1_000_000) {
            let int = Value::Int(i);
            let float = Value::Float(i as f64);

            prop_assert!(int.equals(&float));
            prop_assert_eq!(int.hash32(), float.hash32());
        }

        #[test]
        fn comparison_is_antisymmetric(a in any::<i64>(), b in any::<i64>()) {
            let (va, vb) = (Value::Int(a), Value::Int(b));
            prop_assert_eq!(va.compare(&vb), vb.compare(&va).map(Ordering::reverse));
        }
    }
}
