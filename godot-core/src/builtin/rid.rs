/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::num::NonZeroU64;

/// A RID ("resource ID") is an opaque handle that refers to a low-level resource held by a server.
///
/// A plain 64-bit value: it does not keep the resource alive and is not tracked by the pointer manager. The ID `0` is the invalid RID.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Rid {
    id: u64,
}

impl Rid {
    /// The invalid RID.
    pub const INVALID: Rid = Rid { id: 0 };

    pub const fn new(id: u64) -> Self {
        Self { id }
    }

    pub const fn to_u64(self) -> u64 {
        self.id
    }

    pub const fn to_non_zero(self) -> Option<NonZeroU64> {
        NonZeroU64::new(self.id)
    }

    pub const fn is_valid(self) -> bool {
        self.id != 0
    }

    pub const fn is_invalid(self) -> bool {
        !self.is_valid()
    }
}

impl_builtin_plain!(Rid);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validity() {
        assert!(Rid::INVALID.is_invalid());
        assert_eq!(Rid::default(), Rid::INVALID);
        assert_eq!(Rid::new(42).to_non_zero().map(NonZeroU64::get), Some(42));
    }
}
