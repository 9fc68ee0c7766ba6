/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::error::Error;
use std::fmt;

use crate::builtin::{Variant, VariantType};
use crate::meta::{ClassName, ToGodot};

type Cause = Box<dyn Error + Send + Sync>;

/// A value coming from the engine could not be converted to the requested Rust type.
///
/// Returned by [`Variant::try_to()`] and the `try_from_*` family. The offending value is kept as its debug text, which makes the
/// error `Send + Sync` regardless of the engine value it was created from.
///
/// User code creates its own errors with [`ConvertError::new()`] or [`ConvertError::with_error_value()`].
#[derive(Debug)]
pub struct ConvertError {
    kind: ErrorKind,
    value: Option<String>,
}

impl ConvertError {
    /// Error with a user-defined message.
    pub fn new(user_message: impl Into<String>) -> Self {
        Self::custom(Some(user_message.into().into()), None)
    }

    /// Error caused by a Rust error, together with the value that could not be converted.
    pub fn with_error_value<E, V>(error: E, value: V) -> Self
    where
        E: Into<Cause>,
        V: ToGodot,
    {
        Self::custom(Some(error.into()), Some(describe(&value.to_variant())))
    }

    fn custom(cause: Option<Cause>, value: Option<String>) -> Self {
        Self {
            kind: ErrorKind::Custom(cause),
            value,
        }
    }

    /// The Rust error behind a custom conversion failure.
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match &self.kind {
            ErrorKind::Custom(Some(cause)) => Some(&**cause),
            _ => None,
        }
    }

    /// Debug representation of the value that failed to convert, if it was recorded.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The source was a variant of another type than the target expects.
    pub fn is_bad_type(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::FromVariant(FromVariantError::BadType { .. })
        )
    }

    /// The variant held an object that was freed before extraction.
    pub(crate) fn is_dead_object(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::FromVariant(FromVariantError::DeadObject)
        )
    }

    /// Text of the failure without the value.
    pub(crate) fn reason(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {value}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl Error for ConvertError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause().map(|cause| cause as &(dyn Error + 'static))
    }
}

impl Default for ConvertError {
    /// Custom error without description.
    fn default() -> Self {
        Self::custom(None, None)
    }
}

fn describe(variant: &Variant) -> String {
    format!("{variant:?}")
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Failure kinds

#[derive(Debug)]
enum ErrorKind {
    FromGodot(FromGodotError),
    FromFfi(FromFfiError),
    FromVariant(FromVariantError),
    Custom(Option<Cause>),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FromGodot(err) => fmt::Display::fmt(err, f),
            Self::FromFfi(err) => fmt::Display::fmt(err, f),
            Self::FromVariant(err) => fmt::Display::fmt(err, f),
            Self::Custom(Some(cause)) => fmt::Display::fmt(cause, f),
            Self::Custom(None) => f.write_str("custom error"),
        }
    }
}

/// `FromGodot::try_from_godot()` rejected the intermediate value.
#[derive(Eq, PartialEq, Debug)]
pub(crate) enum FromGodotError {
    /// Source array is typed with another element type.
    BadArrayType {
        expected: VariantType,
        actual: VariantType,
    },

    /// No enumerator has this integer.
    InvalidEnum,

    ZeroInstanceId,
}

impl FromGodotError {
    pub fn into_error<V: ToGodot>(self, value: V) -> ConvertError {
        ConvertError {
            kind: ErrorKind::FromGodot(self),
            value: Some(describe(&value.to_variant())),
        }
    }
}

impl fmt::Display for FromGodotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadArrayType { expected, actual } => {
                write!(f, "array of {actual:?} where array of {expected:?} was expected")
            }
            Self::InvalidEnum => f.write_str("integer is not a known engine enumerator"),
            Self::ZeroInstanceId => f.write_str("instance ID 0 does not name an object"),
        }
    }
}

/// A pointer-call value is out of range for the Rust type, or an object pointer is unusable.
#[derive(Eq, PartialEq, Debug)]
pub(crate) enum FromFfiError {
    NullRawGd,
    WrongObjectType,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
}

impl FromFfiError {
    pub fn into_error<V: ToGodot>(self, value: V) -> ConvertError {
        ConvertError {
            kind: ErrorKind::FromFfi(self),
            value: Some(describe(&value.to_variant())),
        }
    }

    fn target(&self) -> Option<&'static str> {
        let target = match self {
            Self::NullRawGd | Self::WrongObjectType => return None,
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
        };
        Some(target)
    }
}

impl fmt::Display for FromFfiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.target()) {
            (_, Some(target)) => write!(f, "value does not fit into `{target}`"),
            (Self::NullRawGd, _) => f.write_str("object pointer is null"),
            _ => f.write_str("object is not an instance of the target class"),
        }
    }
}

/// Extraction from a [`Variant`] failed.
#[derive(Eq, PartialEq, Debug)]
pub(crate) enum FromVariantError {
    BadType {
        expected: VariantType,
        actual: VariantType,
    },

    /// Right type, but outside of the target's domain.
    BadValue,

    WrongClass {
        expected: ClassName,
    },

    /// Object variant whose object has been freed.
    DeadObject,
}

impl FromVariantError {
    pub fn into_error(self, value: &Variant) -> ConvertError {
        ConvertError {
            kind: ErrorKind::FromVariant(self),
            value: Some(describe(value)),
        }
    }
}

impl fmt::Display for FromVariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadType { expected, actual } => {
                write!(f, "variant of type {actual:?} where {expected:?} was expected")
            }
            Self::BadValue => f.write_str("value is outside the target type's domain"),
            Self::WrongClass { expected } => write!(f, "object is not a {expected}"),
            Self::DeadObject => f.write_str("variant holds a freed object"),
        }
    }
}

fn __ensure_send_sync() {
    fn check<T: Send + Sync>() {}
    check::<ConvertError>();
}
