/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::error::Error;
use std::fmt;

use crate::builtin::{Variant, VariantType};
use crate::meta::error::ConvertError;
use crate::meta::CallContext;
use crate::sys;

/// A varcall failed.
///
/// Returned by outbound dynamic calls such as [`Gd::try_call()`](crate::obj::Gd::try_call), and produced by registered `#[func]`
/// methods and custom callables when the engine hands them arguments of the wrong count or type. Errors raised inside Rust
/// functions that were called through the engine travel back as the [`source`](Error::source) of the outbound error.
pub struct CallError {
    b: Box<Inner>,
}

#[derive(Debug)]
struct Inner {
    class_name: String,
    method_name: String,
    /// Debug text of the arguments, for outbound calls.
    args: Option<String>,
    kind: CallErrorKind,
    source: Option<Source>,
}

#[derive(Debug)]
enum Source {
    Convert(ConvertError),
    Call(CallError),
}

/// What went wrong in a [`CallError`].
#[derive(Clone, Eq, PartialEq, Debug)]
#[non_exhaustive]
pub enum CallErrorKind {
    /// Number of arguments differs from the number of parameters.
    ArgumentCount { expected: usize, actual: usize },

    /// A Rust parameter could not be created from the passed argument.
    ArgumentConversion {
        index: usize,
        param_type: &'static str,
    },

    /// The engine rejected an argument of the wrong variant type.
    ArgumentType {
        index: usize,
        expected: VariantType,
        actual: VariantType,
    },

    /// The returned variant could not be converted to the Rust return type.
    ReturnConversion { return_type: &'static str },

    MethodNotFound,
    InstanceIsNull,
    MethodNotConst,

    /// The called Rust function panicked.
    Panic { message: String },

    /// A custom callable returned `Err(())`.
    UserResult,

    /// A Rust function reached through the engine failed; see [`Error::source`].
    Forwarded,

    /// Engine error code without a dedicated kind.
    Unknown { code: u32 },
}

impl fmt::Display for CallErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgumentCount { expected, actual } => write!(
                f,
                "function has {expected} parameter{}, but received {actual} argument{}",
                plural(*expected),
                plural(*actual)
            ),
            Self::ArgumentConversion { index, param_type } => {
                write!(f, "parameter #{index} ({param_type}) conversion")
            }
            Self::ArgumentType {
                index,
                expected,
                actual,
            } => write!(
                f,
                "parameter #{index} cannot convert from {actual:?} to {expected:?}"
            ),
            Self::ReturnConversion { return_type } => {
                write!(f, "return value {return_type} conversion")
            }
            Self::MethodNotFound => f.write_str("method not found"),
            Self::InstanceIsNull => f.write_str("instance is null"),
            Self::MethodNotConst => f.write_str("method is not const"),
            Self::Panic { message } => write!(f, "function panicked: {message}"),
            Self::UserResult => f.write_str("function returned Err(())"),
            Self::Forwarded => f.write_str("error in called function"),
            Self::Unknown { code } => write!(f, "unknown reason (error code {code})"),
        }
    }
}

impl CallError {
    /// Class or builtin whose method failed. `None` for calls without class.
    pub fn class_name(&self) -> Option<&str> {
        Some(self.b.class_name.as_str()).filter(|name| !name.is_empty())
    }

    pub fn method_name(&self) -> &str {
        &self.b.method_name
    }

    pub fn kind(&self) -> &CallErrorKind {
        &self.b.kind
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Checks

    pub(crate) fn check_arg_count(
        call_ctx: &CallContext,
        arg_count: usize,
        param_count: usize,
    ) -> Result<(), Self> {
        if arg_count == param_count {
            Ok(())
        } else {
            Err(Self::new(
                call_ctx,
                CallErrorKind::ArgumentCount {
                    expected: param_count,
                    actual: arg_count,
                },
            ))
        }
    }

    /// Turns the error slot of an outbound varcall into a result.
    pub(crate) fn check_out_varcall(
        call_ctx: &CallContext,
        err: sys::GDExtensionCallError,
        args: &[Variant],
    ) -> Result<(), Self> {
        if err.error == sys::GDEXTENSION_CALL_OK {
            return Ok(());
        }

        let index = usize::try_from(err.argument).unwrap_or(0);
        let kind = match err.error {
            sys::GDEXTENSION_CALL_ERROR_INVALID_METHOD => CallErrorKind::MethodNotFound,
            sys::GDEXTENSION_CALL_ERROR_INVALID_ARGUMENT => CallErrorKind::ArgumentType {
                index,
                expected: VariantType::from_sys(err.expected as sys::GDExtensionVariantType),
                actual: args.get(index).map_or(VariantType::Nil, Variant::get_type),
            },
            sys::GDEXTENSION_CALL_ERROR_TOO_MANY_ARGUMENTS
            | sys::GDEXTENSION_CALL_ERROR_TOO_FEW_ARGUMENTS => CallErrorKind::ArgumentCount {
                expected: usize::try_from(err.expected).unwrap_or(0),
                actual: args.len(),
            },
            sys::GDEXTENSION_CALL_ERROR_INSTANCE_IS_NULL => CallErrorKind::InstanceIsNull,
            sys::GDEXTENSION_CALL_ERROR_METHOD_NOT_CONST => CallErrorKind::MethodNotConst,
            sys::GODOT_RUST_CUSTOM_CALL_ERROR => CallErrorKind::Forwarded,
            code => CallErrorKind::Unknown { code },
        };

        let mut call_error = Self::new(call_ctx, kind);
        call_error.b.args = Some(join_args(args));

        // `argument` carries the ID of the error stored by the inbound side.
        if err.error == sys::GODOT_RUST_CUSTOM_CALL_ERROR {
            call_error.b.source = crate::private::call_error_remove(&err).map(Source::Call);
        }

        Err(call_error)
    }

    /// Relabels a failed `Object::call()` as a failure of the method it dispatched to.
    ///
    /// The engine counts the method name as first argument; `args` are only the ones passed on to `method_name`.
    pub(crate) fn into_dynamic_call(mut self, class_name: String, method_name: &str, args: &[Variant]) -> Self {
        let inner = &mut *self.b;
        match &mut inner.kind {
            CallErrorKind::ArgumentCount { actual, .. } => *actual = args.len(),
            CallErrorKind::ArgumentType { index, actual, .. } => {
                *actual = args.get(*index).map_or(VariantType::Nil, Variant::get_type);
            }
            _ => {}
        }

        inner.class_name = class_name;
        inner.method_name = method_name.to_string();
        inner.args = Some(join_args(args));
        self
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Failures

    pub(crate) fn failed_param_conversion<P>(
        call_ctx: &CallContext,
        param_index: usize,
        convert_error: ConvertError,
    ) -> Self {
        let kind = CallErrorKind::ArgumentConversion {
            index: param_index,
            param_type: std::any::type_name::<P>(),
        };

        Self::new(call_ctx, kind).with_convert_source(convert_error)
    }

    pub(crate) fn failed_return_conversion<R>(
        call_ctx: &CallContext,
        convert_error: ConvertError,
    ) -> Self {
        let kind = CallErrorKind::ReturnConversion {
            return_type: std::any::type_name::<R>(),
        };

        Self::new(call_ctx, kind).with_convert_source(convert_error)
    }

    #[doc(hidden)]
    pub fn failed_by_user_result(call_ctx: &CallContext) -> Self {
        Self::new(call_ctx, CallErrorKind::UserResult)
    }

    #[doc(hidden)]
    pub fn failed_by_user_panic(call_ctx: &CallContext, message: String) -> Self {
        Self::new(call_ctx, CallErrorKind::Panic { message })
    }

    fn new(call_ctx: &CallContext, kind: CallErrorKind) -> Self {
        let inner = Inner {
            class_name: call_ctx.class_name.to_string(),
            method_name: call_ctx.function_name.to_string(),
            args: None,
            kind,
            source: None,
        };

        Self { b: Box::new(inner) }
    }

    fn with_convert_source(mut self, convert_error: ConvertError) -> Self {
        self.b.source = Some(Source::Convert(convert_error));
        self
    }

    fn write_call(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Inner {
            class_name,
            method_name,
            args,
            kind,
            source,
        } = &*self.b;

        if class_name.is_empty() {
            write!(f, "{method_name}")?;
        } else {
            write!(f, "{class_name}::{method_name}")?;
        }
        write!(f, "({})\n    Reason: {kind}", args.as_deref().unwrap_or(""))?;

        match source {
            Some(Source::Convert(err)) => {
                write!(f, "\n  Source: {}", err.reason())?;
                if let Some(value) = err.value() {
                    write!(f, ": {value}")?;
                }
                Ok(())
            }
            Some(Source::Call(err)) => {
                write!(f, "\n  Source: ")?;
                err.write_call(f)
            }
            None => Ok(()),
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "godot-rust function call failed: ")?;
        self.write_call(f)
    }
}

impl fmt::Debug for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.b, f)
    }
}

impl Error for CallError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.b.source {
            Some(Source::Convert(err)) => Some(err),
            Some(Source::Call(err)) => Some(err),
            None => None,
        }
    }
}

fn join_args(args: &[Variant]) -> String {
    args.iter()
        .map(|arg| format!("{arg:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn __ensure_send_sync() {
    fn check<T: Send + Sync>() {}
    check::<CallError>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_mismatch_names_both_numbers() {
        let ctx = CallContext::func("Calc", "add");
        let err = CallError::check_arg_count(&ctx, 1, 2).expect_err("count differs");

        assert_eq!(
            err.kind(),
            &CallErrorKind::ArgumentCount {
                expected: 2,
                actual: 1
            }
        );
        let text = err.to_string();
        assert!(text.contains("Calc::add()"), "{text}");
        assert!(text.contains("function has 2 parameters, but received 1 argument"), "{text}");
    }

    #[test]
    fn conversion_failure_keeps_source() {
        let ctx = CallContext::func("Calc", "add");
        let err = CallError::failed_param_conversion::<i64>(&ctx, 0, ConvertError::new("not a number"));

        assert!(err.source().is_some());
        let text = err.to_string();
        assert!(text.contains("parameter #0 (i64) conversion"), "{text}");
        assert!(text.contains("Source: not a number"), "{text}");
    }

    #[test]
    fn dynamic_call_names_target_method() {
        let ctx = CallContext::func("Object", "call");
        let mut raw = sys::default_call_error();
        raw.error = sys::GDEXTENSION_CALL_ERROR_TOO_FEW_ARGUMENTS;
        raw.expected = 2;

        let err = CallError::check_out_varcall(&ctx, raw, &[])
            .expect_err("call failed")
            .into_dynamic_call("Calc".to_string(), "add", &[]);

        assert_eq!(err.class_name(), Some("Calc"));
        assert_eq!(err.method_name(), "add");
        assert_eq!(
            err.kind(),
            &CallErrorKind::ArgumentCount {
                expected: 2,
                actual: 0
            }
        );
        assert!(err.to_string().contains("Calc::add()"), "{err}");
    }

    #[test]
    fn empty_class_is_none() {
        let ctx = CallContext::func("", "free_fn");
        let err = CallError::failed_by_user_result(&ctx);

        assert_eq!(err.class_name(), None);
        assert_eq!(err.method_name(), "free_fn");
    }
}
