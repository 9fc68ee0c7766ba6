/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::math::{impl_approx_eq_fields, ApproxEq};
use crate::builtin::{real, Vector3};

/// 3D plane in [Hessian normal form](https://mathworld.wolfram.com/HessianNormalForm.html).
///
/// The points on the plane satisfy `normal.dot(point) == d`.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Plane {
    pub normal: Vector3,
    pub d: real,
}

impl Plane {
    /// Plane through the point `normal * d`. `normal` is normalized.
    ///
    /// # Panics
    /// If `normal` is the zero vector.
    pub fn new(normal: Vector3, d: real) -> Self {
        assert!(
            !normal.approx_eq(&Vector3::ZERO),
            "normal vector must not be zero"
        );

        Self {
            normal: normal.normalized(),
            d,
        }
    }

    /// Plane through `point` with the given normal.
    pub fn from_point_normal(point: Vector3, normal: Vector3) -> Self {
        let normal = normal.normalized();
        Self {
            normal,
            d: normal.dot(point),
        }
    }

    /// Signed distance; positive on the side the normal points to.
    pub fn distance_to(self, point: Vector3) -> real {
        self.normal.dot(point) - self.d
    }

    pub fn project(self, point: Vector3) -> Vector3 {
        point - self.normal * self.distance_to(point)
    }
}

// The engine's zero plane has a zero normal, which `new()` rejects.
impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vector3::ZERO,
            d: 0.0,
        }
    }
}

impl_approx_eq_fields!(Plane => (normal, d));
impl_builtin_plain!(Plane);

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_eq_approx;

    #[test]
    fn distance_and_projection() {
        let plane = Plane::new(Vector3::new(0.0, 2.0, 0.0), 1.0);

        assert_eq!(plane.normal, Vector3::UP);
        assert_eq_approx!(plane.distance_to(Vector3::new(5.0, 3.0, 0.0)), 2.0);
        assert_eq_approx!(
            plane.project(Vector3::new(5.0, 3.0, 0.0)),
            Vector3::new(5.0, 1.0, 0.0)
        );
    }

    #[test]
    #[should_panic]
    fn zero_normal_panics() {
        Plane::new(Vector3::ZERO, 1.0);
    }
}
