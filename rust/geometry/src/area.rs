// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integer axis-aligned areas.
//!
//! An [`Area`] is the bounding region used throughout the room model: world
//! bounds, polygon bounds, quadtree node bounds and sweep spans. Containment
//! is tested on closed intervals, overlap on open intervals, so two areas that
//! merely touch along a side do not overlap.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// An axis-aligned integer region `[min_x, max_x] x [min_y, max_y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Area {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Area {
    /// Creates an area from its extremes. The extremes are swapped if given
    /// in the wrong order.
    pub fn of(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            max_x: min_x.max(max_x),
            min_y: min_y.min(max_y),
            max_y: min_y.max(max_y),
        }
    }

    /// Creates an area from two opposite corners.
    pub fn from_corners(a: Point2<i32>, b: Point2<i32>) -> Self {
        Self::of(a.x, b.x, a.y, b.y)
    }

    /// Creates an area from a corner and a size.
    pub fn from_origin(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::of(x, x.saturating_add(width), y, y.saturating_add(height))
    }

    pub fn width(&self) -> i64 {
        self.max_x as i64 - self.min_x as i64
    }

    pub fn height(&self) -> i64 {
        self.max_y as i64 - self.min_y as i64
    }

    /// Returns `true` if the area has zero width or zero height.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Returns `true` if `other` lies entirely inside this area (closed).
    pub fn contains(&self, other: &Area) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Returns `true` if the point lies inside this area (closed).
    pub fn contains_point(&self, p: Point2<i32>) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Returns `true` if the interiors of the two areas intersect.
    pub fn overlaps(&self, other: &Area) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Returns `true` if the closed areas share at least one point.
    pub fn touches(&self, other: &Area) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Returns the area grown by `amount` on every side.
    pub fn expanded(&self, amount: i32) -> Self {
        Self::of(
            self.min_x.saturating_sub(amount),
            self.max_x.saturating_add(amount),
            self.min_y.saturating_sub(amount),
            self.max_y.saturating_add(amount),
        )
    }

    /// Returns the smallest area containing a point, grown by one unit in
    /// every direction. Used for point queries against the polygon index.
    pub fn around_point(p: Point2<i32>) -> Self {
        Self::of(p.x, p.x, p.y, p.y).expanded(1)
    }

    /// Splits the area into four quadrants sharing the center lines.
    ///
    /// Order: `[min/min, max/min, min/max, max/max]` by x then y.
    pub fn quadrants(&self) -> [Area; 4] {
        let cx = (self.min_x as i64 + self.width() / 2) as i32;
        let cy = (self.min_y as i64 + self.height() / 2) as i32;
        [
            Area::of(self.min_x, cx, self.min_y, cy),
            Area::of(cx, self.max_x, self.min_y, cy),
            Area::of(self.min_x, cx, cy, self.max_y),
            Area::of(cx, self.max_x, cy, self.max_y),
        ]
    }
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}
