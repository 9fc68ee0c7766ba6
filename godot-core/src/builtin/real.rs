/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

#[cfg(not(feature = "double-precision"))]
pub use single::*;

#[cfg(feature = "double-precision")]
pub use double::*;

#[cfg(not(feature = "double-precision"))]
mod single {
    /// Floating-point type used throughout the engine's math types. This is the equivalent of `real_t` in the engine's C++ code.
    ///
    /// This is `f32` by default; enable the `double-precision` feature for engines compiled with `precision=double`.
    #[allow(non_camel_case_types)]
    pub type real = f32;

    pub(crate) type RVec2 = glam::f32::Vec2;
    pub(crate) type RVec3 = glam::f32::Vec3;
    pub(crate) type RVec4 = glam::f32::Vec4;
    pub(crate) type RQuat = glam::f32::Quat;
    pub(crate) type RMat3 = glam::f32::Mat3;
    pub(crate) type RMat4 = glam::f32::Mat4;
    pub(crate) type RAffine2 = glam::f32::Affine2;
    pub(crate) type RAffine3 = glam::f32::Affine3A;
}

#[cfg(feature = "double-precision")]
mod double {
    /// Floating-point type used throughout the engine's math types. This is the equivalent of `real_t` in the engine's C++ code.
    ///
    /// This is `f64`, because the `double-precision` feature is enabled.
    #[allow(non_camel_case_types)]
    pub type real = f64;

    pub(crate) type RVec2 = glam::f64::DVec2;
    pub(crate) type RVec3 = glam::f64::DVec3;
    pub(crate) type RVec4 = glam::f64::DVec4;
    pub(crate) type RQuat = glam::f64::DQuat;
    pub(crate) type RMat3 = glam::f64::DMat3;
    pub(crate) type RMat4 = glam::f64::DMat4;
    pub(crate) type RAffine2 = glam::f64::DAffine2;
    pub(crate) type RAffine3 = glam::f64::DAffine3;
}

/// A macro to coerce float-literals into the [`real`] type.
///
/// Mostly used in tests and samples, so the same code compiles with and without `double-precision`.
#[macro_export]
macro_rules! real {
    ($f:literal) => {{
        let f: $crate::builtin::real = $f;
        f
    }};
}
