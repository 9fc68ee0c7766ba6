/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::math::impl_approx_eq_fields;
use crate::builtin::{real, Vector2, Vector2i};

/// 2D axis-aligned bounding box.
///
/// `Rect2` consists of a position, a size, and several utility functions. It is typically used for fast overlap tests.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Rect2 {
    pub position: Vector2,
    pub size: Vector2,
}

impl Rect2 {
    pub const fn new(position: Vector2, size: Vector2) -> Self {
        Self { position, size }
    }

    pub const fn from_components(x: real, y: real, width: real, height: real) -> Self {
        Self {
            position: Vector2::new(x, y),
            size: Vector2::new(width, height),
        }
    }

    /// Corner opposite to `position`.
    pub fn end(self) -> Vector2 {
        self.position + self.size
    }

    pub fn area(self) -> real {
        self.size.x * self.size.y
    }

    /// Whether `point` lies inside; the lower and right edges are exclusive, like in the engine.
    pub fn has_point(self, point: Vector2) -> bool {
        let end = self.end();
        point.x >= self.position.x && point.y >= self.position.y && point.x < end.x && point.y < end.y
    }

    pub fn intersects(self, other: Rect2) -> bool {
        let (a_end, b_end) = (self.end(), other.end());
        self.position.x < b_end.x
            && other.position.x < a_end.x
            && self.position.y < b_end.y
            && other.position.y < a_end.y
    }
}

/// 2D axis-aligned bounding box using integer coordinates.
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Rect2i {
    pub position: Vector2i,
    pub size: Vector2i,
}

impl Rect2i {
    pub const fn new(position: Vector2i, size: Vector2i) -> Self {
        Self { position, size }
    }

    pub const fn from_components(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            position: Vector2i::new(x, y),
            size: Vector2i::new(width, height),
        }
    }

    pub fn end(self) -> Vector2i {
        self.position + self.size
    }

    pub fn area(self) -> i32 {
        self.size.x * self.size.y
    }

    pub fn has_point(self, point: Vector2i) -> bool {
        let end = self.end();
        point.x >= self.position.x && point.y >= self.position.y && point.x < end.x && point.y < end.y
    }

    pub fn cast_float(self) -> Rect2 {
        Rect2::new(self.position.cast_float(), self.size.cast_float())
    }
}

impl_approx_eq_fields!(Rect2 => (position, size));
impl_builtin_plain!(Rect2, Rect2i);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn has_point_excludes_far_edges() {
        let rect = Rect2i::from_components(0, 0, 10, 5);

        assert!(rect.has_point(Vector2i::new(0, 0)));
        assert!(rect.has_point(Vector2i::new(9, 4)));
        assert!(!rect.has_point(Vector2i::new(10, 4)));
        assert_eq!(rect.area(), 50);
    }

    #[test]
    fn intersects() {
        let a = Rect2::from_components(0.0, 0.0, 2.0, 2.0);
        let b = Rect2::from_components(1.0, 1.0, 2.0, 2.0);
        let c = Rect2::from_components(2.0, 0.0, 1.0, 1.0);

        assert!(a.intersects(b));
        assert!(!a.intersects(c));
        assert_eq!(a.end(), Vector2::new(2.0, 2.0));
    }

    #[test]
    fn integer_rects_as_keys() {
        let mut seen = std::collections::HashSet::new();
        seen.insert(Rect2i::from_components(0, 0, 4, 4));
        seen.insert(Rect2i::from_components(0, 0, 4, 4));
        seen.insert(Rect2i::new(Vector2i::ONE, Vector2i::new(4, 4)));

        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&Rect2i::from_components(1, 1, 4, 4)));
    }
}
