/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::real;

/// Tolerance of approximate float comparisons, equal to the engine's `CMP_EPSILON`.
pub const CMP_EPSILON: real = 0.00001;

/// Approximate equality-comparison of geometric types.
///
/// The implementation is specific to the type. It's mostly used for tests, but you may use it for your own code.
/// Note that we give no guarantees about precision, and implementation can change at any time.
pub trait ApproxEq: PartialEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

/// Same semantics as the engine's `Math::is_equal_approx()`: tolerance grows with the magnitude of the operands.
pub fn is_equal_approx(a: real, b: real) -> bool {
    if a == b {
        return true;
    }

    let tolerance = (CMP_EPSILON * a.abs()).max(CMP_EPSILON);
    (a - b).abs() < tolerance
}

impl ApproxEq for f32 {
    fn approx_eq(&self, other: &Self) -> bool {
        is_equal_approx(*self as real, *other as real)
    }
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        is_equal_approx(*self as real, *other as real)
    }
}

impl<T: ApproxEq, const N: usize> ApproxEq for [T; N] {
    fn approx_eq(&self, other: &Self) -> bool {
        self.iter().zip(other).all(|(a, b)| a.approx_eq(b))
    }
}

/// Implements [`ApproxEq`] component-wise for types whose fields all implement it.
macro_rules! impl_approx_eq_fields {
    ($( $T:ty => ($($field:tt),+) ),* $(,)?) => {
        $(
            impl $crate::builtin::math::ApproxEq for $T {
                fn approx_eq(&self, other: &Self) -> bool {
                    $( $crate::builtin::math::ApproxEq::approx_eq(&self.$field, &other.$field) )&&+
                }
            }
        )*
    };
}

pub(crate) use impl_approx_eq_fields;

/// Asserts that two values are approximately equal
///
/// For comparison, this uses `ApproxEq::approx_eq` by default, or the provided `fn = ...` function.
#[macro_export]
macro_rules! assert_eq_approx {
    ($actual:expr, $expected:expr, fn = $func:expr $(,)?) => {
        match ($actual, $expected) {
            (a, b) => assert!(($func)(&a, &b), "\n  left: {:?},\n right: {:?}", $actual, $expected)
        }
    };
    ($actual:expr, $expected:expr $(,)?) => {
        match ($actual, $expected) {
            (a, b) => assert!($crate::builtin::math::ApproxEq::approx_eq(&a, &b), "\n  left: {:?},\n right: {:?}", $actual, $expected),
        }
    };
    ($actual:expr, $expected:expr, $($t:tt)+) => {
        match ($actual, $expected) {
            (a, b) => assert!($crate::builtin::math::ApproxEq::approx_eq(&a, &b), "\n  left: {:?},\n right: {:?},\n{}", $actual, $expected, format_args!($($t)+)),
        }
    };
}

/// Asserts that two values are not approximately equal.
#[macro_export]
macro_rules! assert_ne_approx {
    ($actual:expr, $expected:expr $(, $($t:tt)* )?) => {
        #[allow(clippy::redundant_closure_call)]
        {
            $crate::assert_eq_approx!($actual, $expected, fn = |a, b| !$crate::builtin::math::ApproxEq::approx_eq(a, b) $(, $($t)* )?)
        }
    };
}
