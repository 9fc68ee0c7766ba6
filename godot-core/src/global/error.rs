/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::meta::error::{ConvertError, FromGodotError};
use crate::meta::{FromGodot, GodotConvert, ToGodot};

/// Engine error code, as returned by many engine methods.
///
/// Modeled as a newtype over the integer code, so that codes unknown to this version of the library still round-trip.
///
/// _Godot equivalent: [`@GlobalScope.Error`](https://docs.godotengine.org/en/stable/classes/class_@globalscope.html#enum-globalscope-error)_.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Error {
    ord: i32,
}

impl Error {
    pub const OK: Error = Error { ord: 0 };
    pub const FAILED: Error = Error { ord: 1 };
    pub const ERR_UNAVAILABLE: Error = Error { ord: 2 };
    pub const ERR_UNCONFIGURED: Error = Error { ord: 3 };
    pub const ERR_UNAUTHORIZED: Error = Error { ord: 4 };
    pub const ERR_PARAMETER_RANGE_ERROR: Error = Error { ord: 5 };
    pub const ERR_OUT_OF_MEMORY: Error = Error { ord: 6 };
    pub const ERR_FILE_NOT_FOUND: Error = Error { ord: 7 };
    pub const ERR_FILE_BAD_DRIVE: Error = Error { ord: 8 };
    pub const ERR_FILE_BAD_PATH: Error = Error { ord: 9 };
    pub const ERR_FILE_NO_PERMISSION: Error = Error { ord: 10 };
    pub const ERR_FILE_ALREADY_IN_USE: Error = Error { ord: 11 };
    pub const ERR_FILE_CANT_OPEN: Error = Error { ord: 12 };
    pub const ERR_FILE_CANT_WRITE: Error = Error { ord: 13 };
    pub const ERR_FILE_CANT_READ: Error = Error { ord: 14 };
    pub const ERR_FILE_UNRECOGNIZED: Error = Error { ord: 15 };
    pub const ERR_FILE_CORRUPT: Error = Error { ord: 16 };
    pub const ERR_FILE_MISSING_DEPENDENCIES: Error = Error { ord: 17 };
    pub const ERR_FILE_EOF: Error = Error { ord: 18 };
    pub const ERR_CANT_OPEN: Error = Error { ord: 19 };
    pub const ERR_CANT_CREATE: Error = Error { ord: 20 };
    pub const ERR_QUERY_FAILED: Error = Error { ord: 21 };
    pub const ERR_ALREADY_IN_USE: Error = Error { ord: 22 };
    pub const ERR_LOCKED: Error = Error { ord: 23 };
    pub const ERR_TIMEOUT: Error = Error { ord: 24 };
    pub const ERR_CANT_CONNECT: Error = Error { ord: 25 };
    pub const ERR_CANT_RESOLVE: Error = Error { ord: 26 };
    pub const ERR_CONNECTION_ERROR: Error = Error { ord: 27 };
    pub const ERR_CANT_ACQUIRE_RESOURCE: Error = Error { ord: 28 };
    pub const ERR_CANT_FORK: Error = Error { ord: 29 };
    pub const ERR_INVALID_DATA: Error = Error { ord: 30 };
    pub const ERR_INVALID_PARAMETER: Error = Error { ord: 31 };
    pub const ERR_ALREADY_EXISTS: Error = Error { ord: 32 };
    pub const ERR_DOES_NOT_EXIST: Error = Error { ord: 33 };
    pub const ERR_DATABASE_CANT_READ: Error = Error { ord: 34 };
    pub const ERR_DATABASE_CANT_WRITE: Error = Error { ord: 35 };
    pub const ERR_COMPILATION_FAILED: Error = Error { ord: 36 };
    pub const ERR_METHOD_NOT_FOUND: Error = Error { ord: 37 };
    pub const ERR_LINK_FAILED: Error = Error { ord: 38 };
    pub const ERR_SCRIPT_FAILED: Error = Error { ord: 39 };
    pub const ERR_CYCLIC_LINK: Error = Error { ord: 40 };
    pub const ERR_INVALID_DECLARATION: Error = Error { ord: 41 };
    pub const ERR_DUPLICATE_SYMBOL: Error = Error { ord: 42 };
    pub const ERR_PARSE_ERROR: Error = Error { ord: 43 };
    pub const ERR_BUSY: Error = Error { ord: 44 };
    pub const ERR_SKIP: Error = Error { ord: 45 };
    pub const ERR_HELP: Error = Error { ord: 46 };
    pub const ERR_BUG: Error = Error { ord: 47 };
    pub const ERR_PRINTER_ON_FIRE: Error = Error { ord: 48 };

    /// Highest known code.
    pub const MAX: i32 = 48;

    /// Converts an engine code. Unknown codes yield `None`.
    pub fn try_from_ord(ord: i32) -> Option<Self> {
        (0..=Self::MAX).contains(&ord).then_some(Self { ord })
    }

    /// Converts an engine code.
    ///
    /// # Panics
    /// If `ord` is not a known error code.
    pub fn from_ord(ord: i32) -> Self {
        Self::try_from_ord(ord).unwrap_or_else(|| panic!("invalid engine error code {ord}"))
    }

    pub fn ord(self) -> i32 {
        self.ord
    }

    /// Name of the engine constant, e.g. `"ERR_FILE_NOT_FOUND"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OK => "OK",
            Self::FAILED => "FAILED",
            Self::ERR_UNAVAILABLE => "ERR_UNAVAILABLE",
            Self::ERR_UNCONFIGURED => "ERR_UNCONFIGURED",
            Self::ERR_UNAUTHORIZED => "ERR_UNAUTHORIZED",
            Self::ERR_PARAMETER_RANGE_ERROR => "ERR_PARAMETER_RANGE_ERROR",
            Self::ERR_OUT_OF_MEMORY => "ERR_OUT_OF_MEMORY",
            Self::ERR_FILE_NOT_FOUND => "ERR_FILE_NOT_FOUND",
            Self::ERR_FILE_BAD_DRIVE => "ERR_FILE_BAD_DRIVE",
            Self::ERR_FILE_BAD_PATH => "ERR_FILE_BAD_PATH",
            Self::ERR_FILE_NO_PERMISSION => "ERR_FILE_NO_PERMISSION",
            Self::ERR_FILE_ALREADY_IN_USE => "ERR_FILE_ALREADY_IN_USE",
            Self::ERR_FILE_CANT_OPEN => "ERR_FILE_CANT_OPEN",
            Self::ERR_FILE_CANT_WRITE => "ERR_FILE_CANT_WRITE",
            Self::ERR_FILE_CANT_READ => "ERR_FILE_CANT_READ",
            Self::ERR_FILE_UNRECOGNIZED => "ERR_FILE_UNRECOGNIZED",
            Self::ERR_FILE_CORRUPT => "ERR_FILE_CORRUPT",
            Self::ERR_FILE_MISSING_DEPENDENCIES => "ERR_FILE_MISSING_DEPENDENCIES",
            Self::ERR_FILE_EOF => "ERR_FILE_EOF",
            Self::ERR_CANT_OPEN => "ERR_CANT_OPEN",
            Self::ERR_CANT_CREATE => "ERR_CANT_CREATE",
            Self::ERR_QUERY_FAILED => "ERR_QUERY_FAILED",
            Self::ERR_ALREADY_IN_USE => "ERR_ALREADY_IN_USE",
            Self::ERR_LOCKED => "ERR_LOCKED",
            Self::ERR_TIMEOUT => "ERR_TIMEOUT",
            Self::ERR_CANT_CONNECT => "ERR_CANT_CONNECT",
            Self::ERR_CANT_RESOLVE => "ERR_CANT_RESOLVE",
            Self::ERR_CONNECTION_ERROR => "ERR_CONNECTION_ERROR",
            Self::ERR_CANT_ACQUIRE_RESOURCE => "ERR_CANT_ACQUIRE_RESOURCE",
            Self::ERR_CANT_FORK => "ERR_CANT_FORK",
            Self::ERR_INVALID_DATA => "ERR_INVALID_DATA",
            Self::ERR_INVALID_PARAMETER => "ERR_INVALID_PARAMETER",
            Self::ERR_ALREADY_EXISTS => "ERR_ALREADY_EXISTS",
            Self::ERR_DOES_NOT_EXIST => "ERR_DOES_NOT_EXIST",
            Self::ERR_DATABASE_CANT_READ => "ERR_DATABASE_CANT_READ",
            Self::ERR_DATABASE_CANT_WRITE => "ERR_DATABASE_CANT_WRITE",
            Self::ERR_COMPILATION_FAILED => "ERR_COMPILATION_FAILED",
            Self::ERR_METHOD_NOT_FOUND => "ERR_METHOD_NOT_FOUND",
            Self::ERR_LINK_FAILED => "ERR_LINK_FAILED",
            Self::ERR_SCRIPT_FAILED => "ERR_SCRIPT_FAILED",
            Self::ERR_CYCLIC_LINK => "ERR_CYCLIC_LINK",
            Self::ERR_INVALID_DECLARATION => "ERR_INVALID_DECLARATION",
            Self::ERR_DUPLICATE_SYMBOL => "ERR_DUPLICATE_SYMBOL",
            Self::ERR_PARSE_ERROR => "ERR_PARSE_ERROR",
            Self::ERR_BUSY => "ERR_BUSY",
            Self::ERR_SKIP => "ERR_SKIP",
            Self::ERR_HELP => "ERR_HELP",
            Self::ERR_BUG => "ERR_BUG",
            Self::ERR_PRINTER_ON_FIRE => "ERR_PRINTER_ON_FIRE",
            _ => "UNKNOWN",
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::OK
    }

    /// `Ok(())` for [`Error::OK`], `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error::{}", self.as_str())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for Error {}

impl GodotConvert for Error {
    type Via = i64;
}

impl ToGodot for Error {
    fn to_godot(&self) -> i64 {
        self.ord as i64
    }
}

impl FromGodot for Error {
    fn try_from_godot(via: i64) -> Result<Self, ConvertError> {
        i32::try_from(via)
            .ok()
            .and_then(Self::try_from_ord)
            .ok_or_else(|| FromGodotError::InvalidEnum.into_error(via))
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_engine() {
        assert_eq!(Error::OK.ord(), 0);
        assert_eq!(Error::ERR_FILE_NOT_FOUND.ord(), 7);
        assert_eq!(Error::ERR_PRINTER_ON_FIRE.ord(), 48);
        assert_eq!(Error::from_ord(31), Error::ERR_INVALID_PARAMETER);
    }

    #[test]
    fn unknown_codes_rejected() {
        assert_eq!(Error::try_from_ord(-1), None);
        assert_eq!(Error::try_from_ord(49), None);
    }

    #[test]
    fn into_result() {
        assert_eq!(Error::OK.into_result(), Ok(()));
        assert_eq!(Error::ERR_BUSY.into_result(), Err(Error::ERR_BUSY));
        assert_eq!(Error::ERR_BUSY.to_string(), "ERR_BUSY");
    }
}
