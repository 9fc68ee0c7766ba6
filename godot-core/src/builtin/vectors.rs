/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops;

use crate::builtin::math::{impl_approx_eq_fields, impl_glam_conv, GlamConv};
use crate::builtin::{real, RVec2, RVec3, RVec4};

macro_rules! impl_vector {
    (
        $(#[$attr:meta])*
        $Vector:ident($Scalar:ty) { $($comp:ident),+ }
        glam $Glam:ty;
    ) => {
        $(#[$attr])*
        #[derive(Default, Copy, Clone, PartialEq, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(C)]
        pub struct $Vector {
            $( pub $comp: $Scalar, )+
        }

        impl $Vector {
            /// Vector with all components set to `0`.
            pub const ZERO: Self = Self::splat(0 as $Scalar);

            /// Vector with all components set to `1`.
            pub const ONE: Self = Self::splat(1 as $Scalar);

            pub const fn new($($comp: $Scalar),+) -> Self {
                Self { $($comp),+ }
            }

            /// Vector with all components set to `value`.
            pub const fn splat(value: $Scalar) -> Self {
                Self { $($comp: value),+ }
            }

            pub(crate) fn from_glam(v: $Glam) -> Self {
                Self { $($comp: v.$comp),+ }
            }
        }

        impl_glam_conv!($Vector => $Glam, |v| <$Glam>::new($(v.$comp),+), |g| $Vector::from_glam(*g));

        impl ops::Add for $Vector {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self { $($comp: self.$comp + rhs.$comp),+ }
            }
        }

        impl ops::Sub for $Vector {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self { $($comp: self.$comp - rhs.$comp),+ }
            }
        }

        impl ops::Mul<$Scalar> for $Vector {
            type Output = Self;

            fn mul(self, rhs: $Scalar) -> Self {
                Self { $($comp: self.$comp * rhs),+ }
            }
        }

        impl ops::Neg for $Vector {
            type Output = Self;

            fn neg(self) -> Self {
                Self { $($comp: -self.$comp),+ }
            }
        }

        impl ops::AddAssign for $Vector {
            fn add_assign(&mut self, rhs: Self) {
                *self = *self + rhs;
            }
        }

        impl ops::SubAssign for $Vector {
            fn sub_assign(&mut self, rhs: Self) {
                *self = *self - rhs;
            }
        }
    };
}

/// Float vector operations, computed in glam.
macro_rules! impl_float_vector_fns {
    ($Vector:ident, ($($comp:ident),+)) => {
        impl $Vector {
            pub fn length(self) -> real {
                self.glam(|v| v.length())
            }

            pub fn length_squared(self) -> real {
                self.glam(|v| v.length_squared())
            }

            pub fn dot(self, with: Self) -> real {
                self.glam2(&with, |a, b| a.dot(b))
            }

            /// Vector scaled to unit length; the zero vector stays zero.
            pub fn normalized(self) -> Self {
                self.glam(|v| v.normalize_or_zero())
            }

            pub fn lerp(self, to: Self, weight: real) -> Self {
                self.glam2(&to, |a, b| a.lerp(b, weight))
            }

            pub fn is_finite(self) -> bool {
                $( self.$comp.is_finite() )&&+
            }
        }

        impl ops::Div<real> for $Vector {
            type Output = Self;

            fn div(self, rhs: real) -> Self {
                Self { $($comp: self.$comp / rhs),+ }
            }
        }

        impl_approx_eq_fields!($Vector => ($($comp),+));
    };
}

impl_vector! {
    /// Vector used for 2D math using floating point coordinates.
    ///
    /// 2-element structure that can be used to represent positions in 2D space or any other pair of numeric values.
    Vector2(real) { x, y }
    glam RVec2;
}

impl_vector! {
    /// Vector used for 3D math using floating point coordinates.
    Vector3(real) { x, y, z }
    glam RVec3;
}

impl_vector! {
    /// Vector used for 4D math using floating point coordinates.
    Vector4(real) { x, y, z, w }
    glam RVec4;
}

impl_vector! {
    /// Vector used for 2D math using integer coordinates.
    ///
    /// Useful for grid positions or pixel coordinates, where exactness matters.
    #[derive(Eq, Hash)]
    Vector2i(i32) { x, y }
    glam glam::IVec2;
}

impl_vector! {
    /// Vector used for 3D math using integer coordinates.
    #[derive(Eq, Hash)]
    Vector3i(i32) { x, y, z }
    glam glam::IVec3;
}

impl_vector! {
    /// Vector used for 4D math using integer coordinates.
    #[derive(Eq, Hash)]
    Vector4i(i32) { x, y, z, w }
    glam glam::IVec4;
}

impl_float_vector_fns!(Vector2, (x, y));
impl_float_vector_fns!(Vector3, (x, y, z));
impl_float_vector_fns!(Vector4, (x, y, z, w));

impl Vector2 {
    pub const UP: Self = Self::new(0.0, -1.0);
    pub const DOWN: Self = Self::new(0.0, 1.0);
    pub const LEFT: Self = Self::new(-1.0, 0.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0);

    /// Angle of the vector with respect to the positive X axis, in radians.
    pub fn angle(self) -> real {
        self.y.atan2(self.x)
    }

    pub fn cast_int(self) -> Vector2i {
        Vector2i::new(self.x as i32, self.y as i32)
    }
}

impl Vector3 {
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    pub const DOWN: Self = Self::new(0.0, -1.0, 0.0);
    pub const LEFT: Self = Self::new(-1.0, 0.0, 0.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 0.0, -1.0);
    pub const BACK: Self = Self::new(0.0, 0.0, 1.0);

    pub fn cross(self, with: Self) -> Self {
        self.glam2(&with, |a, b| a.cross(b))
    }

    pub fn cast_int(self) -> Vector3i {
        Vector3i::new(self.x as i32, self.y as i32, self.z as i32)
    }
}

impl Vector2i {
    pub fn cast_float(self) -> Vector2 {
        Vector2::new(self.x as real, self.y as real)
    }
}

impl Vector3i {
    pub fn cast_float(self) -> Vector3 {
        Vector3::new(self.x as real, self.y as real, self.z as real)
    }
}

impl_builtin_plain!(Vector2, Vector3, Vector4, Vector2i, Vector3i, Vector4i);

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;
    use crate::assert_eq_approx;

    #[test]
    fn arithmetic() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(3.0, 5.0);

        assert_eq!(a + b, Vector2::new(4.0, 7.0));
        assert_eq!(b - a, Vector2::new(2.0, 3.0));
        assert_eq!(a * 2.0, Vector2::new(2.0, 4.0));
        assert_eq!(-a, Vector2::new(-1.0, -2.0));
        assert_eq!(Vector2i::new(1, 2) + Vector2i::ONE, Vector2i::new(2, 3));
    }

    #[test]
    fn glam_backed_fns() {
        assert_eq_approx!(Vector2::new(3.0, 4.0).length(), 5.0);
        assert_eq_approx!(Vector2::new(0.0, 5.0).normalized(), Vector2::new(0.0, 1.0));
        assert_eq!(Vector2::ZERO.normalized(), Vector2::ZERO);
        assert_eq!(Vector3::RIGHT.cross(Vector3::UP), Vector3::BACK);
        assert_eq_approx!(Vector3::new(1.0, 2.0, 3.0).dot(Vector3::ONE), 6.0);
    }

    #[test]
    fn layout() {
        assert_eq!(std::mem::size_of::<Vector3i>(), 12);
        assert_eq!(std::mem::size_of::<Vector4>(), 4 * std::mem::size_of::<real>());
    }

    fn coord() -> impl Strategy<Value = real> {
        (-1000.0 as real)..(1000.0 as real)
    }

    proptest! {
        #[test]
        fn normalized_has_unit_length(x in coord(), y in coord()) {
            let vector = Vector2::new(x, y);
            prop_assume!(vector.length() > 0.01);

            let length = vector.normalized().length();
            prop_assert!((length - 1.0).abs() < 1e-4, "length {length} of {vector:?}");
        }

        #[test]
        fn integer_vector_sum_commutes(a in any::<(i16, i16)>(), b in any::<(i16, i16)>()) {
            let (a, b) = (Vector2i::new(a.0.into(), a.1.into()), Vector2i::new(b.0.into(), b.1.into()));
            prop_assert_eq!(a + b, b + a);
            prop_assert_eq!(a + b - b, a);
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let vector = Vector2i::new(3, -7);
        crate::builtin::test_utils::roundtrip(&vector, r#"{"x":3,"y":-7}"#);
    }
}
