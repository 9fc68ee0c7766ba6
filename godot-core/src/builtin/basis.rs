/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::Mul;

use crate::builtin::math::{impl_approx_eq_fields, impl_glam_conv, GlamConv, GlamType};
use crate::builtin::{real, Quaternion, RMat3, RQuat, Vector3};

/// A 3x3 matrix, typically used as an orthogonal basis for [`Transform3D`](crate::builtin::Transform3D).
///
/// Indexing into a `Basis` is done in row-major order, matching the engine's memory layout. The columns are the basis vectors.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Basis {
    /// The rows of the matrix. These are *not* the basis vectors.
    pub rows: [Vector3; 3],
}

impl Basis {
    pub const IDENTITY: Self = Self::from_diagonal(1.0, 1.0, 1.0);

    /// Basis that maps every vector to zero.
    pub const ZERO: Self = Self::from_diagonal(0.0, 0.0, 0.0);

    pub const fn from_rows(x: Vector3, y: Vector3, z: Vector3) -> Self {
        Self { rows: [x, y, z] }
    }

    /// Basis from its basis vectors, i.e. the columns of the matrix.
    pub const fn from_cols(a: Vector3, b: Vector3, c: Vector3) -> Self {
        Self::from_rows(
            Vector3::new(a.x, b.x, c.x),
            Vector3::new(a.y, b.y, c.y),
            Vector3::new(a.z, b.z, c.z),
        )
    }

    pub const fn from_diagonal(x: real, y: real, z: real) -> Self {
        Self::from_rows(
            Vector3::new(x, 0.0, 0.0),
            Vector3::new(0.0, y, 0.0),
            Vector3::new(0.0, 0.0, z),
        )
    }

    /// Pure rotation. The quaternion must be normalized.
    pub fn from_quat(quat: Quaternion) -> Self {
        RMat3::from_quat(quat.to_glam()).to_front()
    }

    pub fn col_a(self) -> Vector3 {
        Vector3::new(self.rows[0].x, self.rows[1].x, self.rows[2].x)
    }

    pub fn col_b(self) -> Vector3 {
        Vector3::new(self.rows[0].y, self.rows[1].y, self.rows[2].y)
    }

    pub fn col_c(self) -> Vector3 {
        Vector3::new(self.rows[0].z, self.rows[1].z, self.rows[2].z)
    }

    pub fn determinant(self) -> real {
        self.glam(|m| m.determinant())
    }

    pub fn transposed(self) -> Self {
        Self::from_cols(self.rows[0], self.rows[1], self.rows[2])
    }

    /// # Panics
    /// If the determinant is zero.
    pub fn inverse(self) -> Self {
        assert_ne!(self.determinant(), 0.0, "basis is not invertible");
        self.glam(|m| m.inverse())
    }

    pub fn to_quat(self) -> Quaternion {
        RQuat::from_mat3(&self.to_glam()).to_front()
    }
}

impl Default for Basis {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Basis {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.glam2(&rhs, |a, b| a * b)
    }
}

impl Mul<Vector3> for Basis {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        self.glam2(&rhs, |a, b| a * b)
    }
}

impl_glam_conv!(
    Basis => RMat3,
    |b| RMat3::from_cols(b.col_a().to_glam(), b.col_b().to_glam(), b.col_c().to_glam()),
    |g| Basis::from_cols(
        Vector3::from_glam(g.x_axis),
        Vector3::from_glam(g.y_axis),
        Vector3::from_glam(g.z_axis)
    )
);
impl_approx_eq_fields!(Basis => (rows));
impl_builtin_plain!(Basis);

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;
    use crate::assert_eq_approx;

    #[test]
    fn rows_and_cols() {
        let basis = Basis::from_cols(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(4.0, 5.0, 6.0),
            Vector3::new(7.0, 8.0, 10.0),
        );

        assert_eq!(basis.rows[0], Vector3::new(1.0, 4.0, 7.0));
        assert_eq!(basis.col_b(), Vector3::new(4.0, 5.0, 6.0));
        assert_eq!(basis.transposed().transposed(), basis);
        assert_eq_approx!(basis * basis.inverse(), Basis::IDENTITY);
    }

    #[test]
    fn quat_roundtrip() {
        let quat = Quaternion::from_axis_angle(Vector3::UP, 0.5);
        let basis = Basis::from_quat(quat);

        assert_eq_approx!(basis.to_quat(), quat);
        assert_eq_approx!(basis.determinant(), 1.0);
    }

    fn rotation_axis() -> impl Strategy<Value = Vector3> {
        let unit = (-1.0 as real)..(1.0 as real);
        (unit.clone(), unit.clone(), unit)
            .prop_map(|(x, y, z)| Vector3::new(x, y, z))
            .prop_filter("axis needs a direction", |axis| axis.length() > 0.1)
            .prop_map(Vector3::normalized)
    }

    proptest! {
        #[test]
        fn inverse_undoes_rotation_and_scale(
            axis in rotation_axis(),
            angle in (-3.0 as real)..(3.0 as real),
            scale in ((0.5 as real)..(4.0 as real), (0.5 as real)..(4.0 as real), (0.5 as real)..(4.0 as real)),
        ) {
            let rotation = Basis::from_quat(Quaternion::from_axis_angle(axis, angle));
            let basis = rotation * Basis::from_diagonal(scale.0, scale.1, scale.2);
            let product = basis * basis.inverse();

            for (row, expected) in product.rows.iter().zip(Basis::IDENTITY.rows) {
                for (actual, expected) in [(row.x, expected.x), (row.y, expected.y), (row.z, expected.z)] {
                    prop_assert!((actual - expected).abs() < 1e-3, "{product:?}");
                }
            }
        }
    }
}
