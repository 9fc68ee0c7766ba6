/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod approx_eq;
mod glam_helpers;

pub use crate::{assert_eq_approx, assert_ne_approx};
pub use approx_eq::{is_equal_approx, ApproxEq, CMP_EPSILON};

pub(crate) use approx_eq::impl_approx_eq_fields;
pub(crate) use glam_helpers::*;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn equal_approx() {
        assert_eq_approx!(1.0, 1.000001);
        assert_ne_approx!(1.0, 2.0);
        assert_eq_approx!(1.0, 1.000001, "Message {}", "formatted");
    }
}
