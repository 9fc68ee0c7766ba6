/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::Mul;

use crate::builtin::math::{impl_approx_eq_fields, impl_glam_conv, GlamConv};
use crate::builtin::{real, RMat4, Vector4};

/// 4x4 matrix for 3D projective transformations, stored as four column vectors.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Projection {
    pub cols: [Vector4; 4],
}

impl Projection {
    pub const IDENTITY: Self = Self::from_diagonal(1.0, 1.0, 1.0, 1.0);

    pub const ZERO: Self = Self::from_diagonal(0.0, 0.0, 0.0, 0.0);

    pub const fn new(cols: [Vector4; 4]) -> Self {
        Self { cols }
    }

    pub const fn from_diagonal(x: real, y: real, z: real, w: real) -> Self {
        Self::new([
            Vector4::new(x, 0.0, 0.0, 0.0),
            Vector4::new(0.0, y, 0.0, 0.0),
            Vector4::new(0.0, 0.0, z, 0.0),
            Vector4::new(0.0, 0.0, 0.0, w),
        ])
    }

    pub fn determinant(self) -> real {
        self.glam(|m| m.determinant())
    }

    pub fn inverse(self) -> Self {
        self.glam(|m| m.inverse())
    }

    pub fn transposed(self) -> Self {
        self.glam(|m| m.transpose())
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Projection {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.glam2(&rhs, |a, b| a * b)
    }
}

impl Mul<Vector4> for Projection {
    type Output = Vector4;

    fn mul(self, rhs: Vector4) -> Vector4 {
        self.glam2(&rhs, |m, v| m * v)
    }
}

impl_glam_conv!(
    Projection => RMat4,
    |p| RMat4::from_cols(
        p.cols[0].to_glam(),
        p.cols[1].to_glam(),
        p.cols[2].to_glam(),
        p.cols[3].to_glam()
    ),
    |g| Projection::new([
        Vector4::from_glam(g.x_axis),
        Vector4::from_glam(g.y_axis),
        Vector4::from_glam(g.z_axis),
        Vector4::from_glam(g.w_axis),
    ])
);
impl_approx_eq_fields!(Projection => (cols));
impl_builtin_plain!(Projection);

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_eq_approx;

    #[test]
    fn diagonal_math() {
        let scale = Projection::from_diagonal(2.0, 2.0, 2.0, 1.0);

        assert_eq_approx!(scale.determinant(), 8.0);
        assert_eq_approx!(scale * scale.inverse(), Projection::IDENTITY);
        assert_eq!(
            scale * Vector4::new(1.0, 2.0, 3.0, 1.0),
            Vector4::new(2.0, 4.0, 6.0, 1.0)
        );
    }
}
