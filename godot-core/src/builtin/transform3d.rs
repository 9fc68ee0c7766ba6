/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::Mul;

use crate::builtin::math::{impl_approx_eq_fields, impl_glam_conv, GlamConv, GlamType};
use crate::builtin::{Basis, RAffine3, RMat3, RVec3, Vector3};

/// Affine 3D transform (3x4 matrix).
///
/// Used for 3D linear transformations. Made of a [`Basis`] for rotation and scaling, and an `origin` for translation.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Transform3D {
    pub basis: Basis,
    pub origin: Vector3,
}

impl Transform3D {
    pub const IDENTITY: Self = Self::new(Basis::IDENTITY, Vector3::ZERO);

    pub const fn new(basis: Basis, origin: Vector3) -> Self {
        Self { basis, origin }
    }

    /// From the three basis vectors and the origin.
    pub const fn from_cols(a: Vector3, b: Vector3, c: Vector3, origin: Vector3) -> Self {
        Self::new(Basis::from_cols(a, b, c), origin)
    }

    pub fn translated(self, offset: Vector3) -> Self {
        Self::new(self.basis, self.origin + offset)
    }

    /// # Panics
    /// If the basis is not invertible.
    pub fn affine_inverse(self) -> Self {
        let basis = self.basis.inverse();
        Self::new(basis, -(basis * self.origin))
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.glam2(&rhs, |a, b| a * b)
    }
}

/// Transforms the point.
impl Mul<Vector3> for Transform3D {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        self.glam2(&rhs, |t, v| t.transform_point3(v))
    }
}

impl_glam_conv!(
    Transform3D => RAffine3,
    |t| RAffine3::from_mat3_translation(t.basis.to_glam(), t.origin.to_glam()),
    |g| Transform3D::new(
        RMat3::from(g.matrix3).to_front(),
        Vector3::from_glam(RVec3::from(g.translation))
    )
);
impl_approx_eq_fields!(Transform3D => (basis, origin));
impl_builtin_plain!(Transform3D);

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_eq_approx;
    use crate::builtin::{real, Quaternion};

    #[test]
    fn compose_and_invert() {
        let rotation = Basis::from_quat(Quaternion::from_axis_angle(Vector3::UP, 1.0));
        let xform = Transform3D::new(rotation, Vector3::new(1.0, 2.0, 3.0));

        assert_eq_approx!(xform * xform.affine_inverse(), Transform3D::IDENTITY);
        assert_eq_approx!(
            Transform3D::IDENTITY.translated(Vector3::ONE) * Vector3::ZERO,
            Vector3::ONE
        );
    }

    #[test]
    fn layout_is_twelve_reals() {
        assert_eq!(
            std::mem::size_of::<Transform3D>(),
            12 * std::mem::size_of::<real>()
        );
    }
}
