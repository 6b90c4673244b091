// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line segment intersection, normals and bounds.

use nalgebra::{Point2, Vector2};

use crate::area::Area;

/// Solves for the parameters `(ua, ub)` at which the infinite lines through
/// `a` and `b` meet. Returns `None` for parallel or collinear lines.
fn parameters(
    a0: &Point2<f64>,
    a1: &Point2<f64>,
    b0: &Point2<f64>,
    b1: &Point2<f64>,
) -> Option<(f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;

    let denom = db.y * da.x - db.x * da.y;
    if denom == 0.0 {
        return None;
    }

    let d = a0 - b0;
    let ua = (db.x * d.y - db.y * d.x) / denom;
    let ub = (da.x * d.y - da.y * d.x) / denom;
    Some((ua, ub))
}

fn within_unit(t: f64) -> bool {
    (0.0..=1.0).contains(&t)
}

/// Returns `true` if the closed segments `a0-a1` and `b0-b1` intersect.
///
/// Parallel segments never intersect, including collinear overlapping ones.
pub fn segment_intersects(
    a0: &Point2<f64>,
    a1: &Point2<f64>,
    b0: &Point2<f64>,
    b1: &Point2<f64>,
) -> bool {
    matches!(parameters(a0, a1, b0, b1), Some((ua, ub)) if within_unit(ua) && within_unit(ub))
}

/// Returns the point at which the closed segments `a0-a1` and `b0-b1`
/// intersect, if they do.
pub fn segment_intersection(
    a0: &Point2<f64>,
    a1: &Point2<f64>,
    b0: &Point2<f64>,
    b1: &Point2<f64>,
) -> Option<Point2<f64>> {
    let (ua, ub) = parameters(a0, a1, b0, b1)?;
    if within_unit(ua) && within_unit(ub) {
        Some(a0 + (a1 - a0) * ua)
    } else {
        None
    }
}

/// Integer-point form of [`segment_intersects`].
pub fn segment_intersects_i(
    a0: Point2<i32>,
    a1: Point2<i32>,
    b0: Point2<i32>,
    b1: Point2<i32>,
) -> bool {
    segment_intersects(&to_f64(a0), &to_f64(a1), &to_f64(b0), &to_f64(b1))
}

/// Integer-point form of [`segment_intersection`].
pub fn segment_intersection_i(
    a0: Point2<i32>,
    a1: Point2<i32>,
    b0: Point2<i32>,
    b1: Point2<i32>,
) -> Option<Point2<f64>> {
    segment_intersection(&to_f64(a0), &to_f64(a1), &to_f64(b0), &to_f64(b1))
}

/// Unit normal of the edge `p0 -> p1`: the perpendicular `(e.y, -e.x)` of
/// `e = p0 - p1`. Zero-length edges yield the zero vector.
pub fn edge_normal(p0: Point2<i32>, p1: Point2<i32>) -> Vector2<f64> {
    let e = to_f64(p0) - to_f64(p1);
    let perp = Vector2::new(e.y, -e.x);
    perp.try_normalize(0.0).unwrap_or_else(Vector2::zeros)
}

/// Axis-aligned bounds of a segment.
pub fn edge_bounds(p0: Point2<i32>, p1: Point2<i32>) -> Area {
    Area::from_corners(p0, p1)
}

pub(crate) fn to_f64(p: Point2<i32>) -> Point2<f64> {
    Point2::new(p.x as f64, p.y as f64)
}
