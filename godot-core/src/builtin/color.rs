/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::math::impl_approx_eq_fields;

/// Color built-in type, in floating-point RGBA format.
///
/// Channel values are _typically_ in the range of 0 to 1, but this is not a requirement, and values outside this range are
/// explicitly allowed for e.g. High Dynamic Range (HDR). Always `f32`, independent of `double-precision`.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT_BLACK: Color = Self::from_rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Self::from_rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Self::from_rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Self::from_rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Self::from_rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Self::from_rgb(0.0, 0.0, 1.0);

    /// Constructs a new `Color` with the given components.
    pub const fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Constructs a new `Color` with the given color components, and the alpha channel set to 1.
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::from_rgba(r, g, b, 1.0)
    }

    /// Constructs a new `Color` from 8-bit channels, each mapped from `0..=255` to `0.0..=1.0`.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_rgba(from_u8(r), from_u8(g), from_u8(b), from_u8(a))
    }

    /// Packs the color into 32 bits, 8 bits per channel, in RGBA order (red in the most significant byte).
    pub fn to_rgba32(self) -> u32 {
        [self.r, self.g, self.b, self.a]
            .into_iter()
            .fold(0, |acc, channel| (acc << 8) | u32::from(to_u8(channel)))
    }

    /// Channels clamped to `0.0..=1.0`, each quantized to 8 bits.
    pub fn to_rgba8(self) -> [u8; 4] {
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    /// Linear interpolation of all four channels.
    pub fn lerp(self, to: Color, weight: f64) -> Self {
        let weight = weight as f32;
        let mix = |from: f32, to: f32| from + (to - from) * weight;

        Self::from_rgba(mix(self.r, to.r), mix(self.g, to.g), mix(self.b, to.b), mix(self.a, to.a))
    }

    /// Same color, with alpha replaced.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Inverted color; alpha stays.
    pub fn inverted(self) -> Self {
        Self::from_rgba(1.0 - self.r, 1.0 - self.g, 1.0 - self.b, self.a)
    }
}

/// Opaque black, like the engine's default-constructed `Color`.
impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

fn from_u8(channel: u8) -> f32 {
    channel as f32 / 255.0
}

fn to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl_approx_eq_fields!(Color => (r, g, b, a));
impl_builtin_plain!(Color);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rgba8_conversions() {
        let color = Color::from_rgba8(255, 0, 128, 255);

        assert_eq!(color.to_rgba8(), [255, 0, 128, 255]);
        assert_eq!(color.to_rgba32(), 0xFF0080FF);
        assert_eq!(Color::WHITE.inverted(), Color::BLACK);
    }

    #[test]
    fn out_of_range_channels_clamp_on_quantization() {
        let hdr = Color::from_rgb(2.0, -1.0, 0.5);
        assert_eq!(hdr.to_rgba8(), [255, 0, 128, 255]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let color = Color::from_rgba(0.5, 0.25, 1.0, 1.0);
        crate::builtin::test_utils::roundtrip(&color, r#"{"r":0.5,"g":0.25,"b":1.0,"a":1.0}"#);
    }
}
