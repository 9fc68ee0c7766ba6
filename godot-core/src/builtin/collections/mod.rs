/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod array;
mod dictionary;
mod packed_array;

// Re-export in godot::builtin.
pub(crate) mod containers {
    pub use super::array::{Array, VariantArray};
    pub use super::dictionary::Dictionary;
    pub use super::packed_array::*;
}

// Re-export in godot::builtin::iter.
pub(crate) mod iterators {
    pub use super::array::Iter as ArrayIter;
    pub use super::dictionary::Iter as DictIter;
}

/// Hashes of builtin methods that share their signature across container types.
pub(crate) mod hashes {
    pub const SIZE: i64 = 3173160232;
    pub const CLEAR: i64 = 3218959716;
    pub const RESIZE: i64 = 848867239;
}
