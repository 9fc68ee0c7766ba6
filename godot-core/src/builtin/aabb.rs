/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::math::impl_approx_eq_fields;
use crate::builtin::{real, Vector3};

/// Axis-aligned bounding box in 3D space.
///
/// `Aabb` consists of a position, a size, and several utility functions. It is typically used for fast overlap tests.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
#[doc(alias = "AABB")]
pub struct Aabb {
    pub position: Vector3,
    pub size: Vector3,
}

impl Aabb {
    pub const fn new(position: Vector3, size: Vector3) -> Self {
        Self { position, size }
    }

    pub fn end(self) -> Vector3 {
        self.position + self.size
    }

    pub fn volume(self) -> real {
        self.size.x * self.size.y * self.size.z
    }

    /// Same box with non-negative size.
    pub fn abs(self) -> Self {
        let end = self.end();
        let min = Vector3::new(
            self.position.x.min(end.x),
            self.position.y.min(end.y),
            self.position.z.min(end.z),
        );
        let size = Vector3::new(self.size.x.abs(), self.size.y.abs(), self.size.z.abs());

        Self::new(min, size)
    }

    pub fn has_point(self, point: Vector3) -> bool {
        let end = self.end();
        point.x >= self.position.x
            && point.y >= self.position.y
            && point.z >= self.position.z
            && point.x < end.x
            && point.y < end.y
            && point.z < end.z
    }
}

impl_approx_eq_fields!(Aabb => (position, size));
impl_builtin_plain!(Aabb);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn abs_flips_negative_size() {
        let aabb = Aabb::new(Vector3::new(2.0, 2.0, 2.0), Vector3::new(-2.0, 1.0, -1.0));
        let abs = aabb.abs();

        assert_eq!(abs.position, Vector3::new(0.0, 2.0, 1.0));
        assert_eq!(abs.size, Vector3::new(2.0, 1.0, 1.0));
        assert_eq!(abs.volume(), 2.0);
        assert!(abs.has_point(Vector3::new(1.0, 2.5, 1.5)));
    }
}
