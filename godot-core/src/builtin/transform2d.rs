/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::Mul;

use crate::builtin::math::{impl_approx_eq_fields, impl_glam_conv, GlamConv};
use crate::builtin::{real, RAffine2, RVec2, Vector2};

/// Affine 2D transform (2x3 matrix).
///
/// Represents transformations such as translation, rotation, or scaling. Stored as three column vectors: `a` and `b` are the
/// transformed X and Y axes, `origin` the translation.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Transform2D {
    pub a: Vector2,
    pub b: Vector2,
    pub origin: Vector2,
}

impl Transform2D {
    pub const IDENTITY: Self = Self::from_cols(Vector2::RIGHT, Vector2::new(0.0, 1.0), Vector2::ZERO);

    pub const fn from_cols(a: Vector2, b: Vector2, origin: Vector2) -> Self {
        Self { a, b, origin }
    }

    /// Rotation by `angle` radians followed by translation to `origin`.
    pub fn from_angle_origin(angle: real, origin: Vector2) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_cols(Vector2::new(cos, sin), Vector2::new(-sin, cos), origin)
    }

    pub fn rotation(self) -> real {
        self.a.angle()
    }

    /// # Panics
    /// If the transform is not invertible.
    pub fn affine_inverse(self) -> Self {
        let det = self.a.x * self.b.y - self.a.y * self.b.x;
        assert_ne!(det, 0.0, "transform is not invertible");

        self.glam(|t| t.inverse())
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform2D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.glam2(&rhs, |a, b| a * b)
    }
}

/// Transforms the point.
impl Mul<Vector2> for Transform2D {
    type Output = Vector2;

    fn mul(self, rhs: Vector2) -> Vector2 {
        self.glam2(&rhs, |t, v| t.transform_point2(v))
    }
}

impl_glam_conv!(
    Transform2D => RAffine2,
    |t| RAffine2::from_cols(t.a.to_glam(), t.b.to_glam(), t.origin.to_glam()),
    |g| Transform2D::from_cols(
        Vector2::from_glam(g.matrix2.x_axis),
        Vector2::from_glam(g.matrix2.y_axis),
        Vector2::from_glam(RVec2::from(g.translation))
    )
);
impl_approx_eq_fields!(Transform2D => (a, b, origin));
impl_builtin_plain!(Transform2D);

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_eq_approx;

    #[test]
    fn transform_point() {
        let xform = Transform2D::from_angle_origin(std::f64::consts::FRAC_PI_2 as real, Vector2::new(10.0, 0.0));

        assert_eq_approx!(xform * Vector2::RIGHT, Vector2::new(10.0, 1.0));
        assert_eq_approx!(xform * xform.affine_inverse(), Transform2D::IDENTITY);
        assert_eq_approx!(xform.rotation(), std::f64::consts::FRAC_PI_2 as real);
    }
}
