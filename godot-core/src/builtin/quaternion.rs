/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::Mul;

use crate::builtin::math::{impl_approx_eq_fields, impl_glam_conv, GlamConv, GlamType};
use crate::builtin::{real, RQuat, Vector3};

/// Unit quaternion to represent 3D rotations.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Quaternion {
    pub x: real,
    pub y: real,
    pub z: real,
    pub w: real,
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: real, y: real, z: real, w: real) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation by `angle` radians around `axis`, which must be normalized.
    pub fn from_axis_angle(axis: Vector3, angle: real) -> Self {
        RQuat::from_axis_angle(axis.to_glam(), angle).to_front()
    }

    pub fn length(self) -> real {
        self.glam(|q| q.length())
    }

    pub fn normalized(self) -> Self {
        self.glam(|q| q.normalize())
    }

    pub fn inverse(self) -> Self {
        self.glam(|q| q.inverse())
    }

    pub fn dot(self, with: Self) -> real {
        self.glam2(&with, |a, b| a.dot(b))
    }

    /// Spherical linear interpolation.
    pub fn slerp(self, to: Self, weight: real) -> Self {
        self.glam2(&to, |a, b| a.slerp(b, weight))
    }

    pub fn is_normalized(self) -> bool {
        self.glam(|q| q.is_normalized())
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.glam2(&rhs, |a, b| a * b)
    }
}

/// Rotates the vector.
impl Mul<Vector3> for Quaternion {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        self.glam2(&rhs, |q, v| q * v)
    }
}

impl_glam_conv!(Quaternion => RQuat, |q| RQuat::from_xyzw(q.x, q.y, q.z, q.w), |g| Quaternion::new(g.x, g.y, g.z, g.w));
impl_approx_eq_fields!(Quaternion => (x, y, z, w));
impl_builtin_plain!(Quaternion);

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;
    use crate::assert_eq_approx;

    #[test]
    fn rotation() {
        let quarter = Quaternion::from_axis_angle(Vector3::UP, std::f64::consts::FRAC_PI_2 as real);

        assert_eq_approx!(quarter * Vector3::RIGHT, Vector3::FORWARD);
        assert_eq_approx!(quarter * quarter.inverse(), Quaternion::IDENTITY);
        assert!(quarter.is_normalized());
    }

    fn any_rotation() -> impl Strategy<Value = Quaternion> {
        let unit = (-1.0 as real)..(1.0 as real);
        ((unit.clone(), unit.clone(), unit), (-3.0 as real)..(3.0 as real))
            .prop_filter("axis needs a direction", |((x, y, z), _)| Vector3::new(*x, *y, *z).length() > 0.1)
            .prop_map(|((x, y, z), angle)| Quaternion::from_axis_angle(Vector3::new(x, y, z).normalized(), angle))
    }

    // `q` and `-q` are the same rotation.
    fn same_rotation(a: Quaternion, b: Quaternion) -> bool {
        (a.dot(b).abs() - 1.0).abs() < 1e-4
    }

    proptest! {
        #[test]
        fn slerp_hits_endpoints(from in any_rotation(), to in any_rotation()) {
            prop_assert!(same_rotation(from.slerp(to, 0.0), from));
            prop_assert!(same_rotation(from.slerp(to, 1.0), to));
        }

        #[test]
        fn slerp_stays_normalized(from in any_rotation(), to in any_rotation(), weight in (0.0 as real)..(1.0 as real)) {
            let length = from.slerp(to, weight).length();
            prop_assert!((length - 1.0).abs() < 1e-3, "length {length}");
        }
    }
}
