// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Predicates and measures over integer polygons.
//!
//! All functions take the polygon as an ordered slice of positions with an
//! implicit closing edge from the last point back to the first. Products of
//! coordinate differences are carried out in `i128`, so results are exact
//! for any `i32` input.

use nalgebra::Point2;

use crate::area::Area;

/// Winding order of a polygon, as given by the sign of its signed area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Winding {
    /// Positive signed area.
    CounterClockwise,
    /// Negative signed area.
    Clockwise,
    /// Zero signed area (collinear or fewer than three points).
    Degenerate,
}

/// Cross product of `BA x BC` for the turn `A -> B -> C`.
fn turn(a: Point2<i32>, b: Point2<i32>, c: Point2<i32>) -> i128 {
    let bax = a.x as i128 - b.x as i128;
    let bay = a.y as i128 - b.y as i128;
    let bcx = c.x as i128 - b.x as i128;
    let bcy = c.y as i128 - b.y as i128;
    bax * bcy - bay * bcx
}

/// Returns `true` if every turn of the polygon bends the same way.
///
/// Collinear triples are ignored, so a polygon whose points are all collinear
/// is considered convex here. Use [`is_degenerate`] to reject those.
pub fn is_convex(points: &[Point2<i32>]) -> bool {
    let n = points.len();
    let mut negative = false;
    let mut positive = false;

    for a in 0..n {
        let b = (a + 1) % n;
        let c = (b + 1) % n;

        let cross = turn(points[a], points[b], points[c]);
        if cross < 0 {
            negative = true;
        } else if cross > 0 {
            positive = true;
        }
        if negative && positive {
            return false;
        }
    }

    true
}

/// Twice the signed area of the polygon (shoelace formula).
///
/// Positive = counter-clockwise, negative = clockwise.
pub fn signed_area_doubled(points: &[Point2<i32>]) -> i128 {
    if points.len() < 3 {
        return 0;
    }

    let n = points.len();
    let mut area = 0i128;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x as i128 * points[j].y as i128;
        area -= points[j].x as i128 * points[i].y as i128;
    }
    area
}

/// Returns the winding order of the polygon.
pub fn winding(points: &[Point2<i32>]) -> Winding {
    match signed_area_doubled(points) {
        a if a > 0 => Winding::CounterClockwise,
        a if a < 0 => Winding::Clockwise,
        _ => Winding::Degenerate,
    }
}

/// Returns `true` if the polygon is wound clockwise.
pub fn is_clockwise_order(points: &[Point2<i32>]) -> bool {
    winding(points) == Winding::Clockwise
}

/// Returns `true` if the polygon cannot bound a region: fewer than three
/// points, a repeated point, or zero area.
pub fn is_degenerate(points: &[Point2<i32>]) -> bool {
    if points.len() < 3 {
        return true;
    }

    for (i, p) in points.iter().enumerate() {
        if points[i + 1..].contains(p) {
            return true;
        }
    }

    signed_area_doubled(points) == 0
}

/// Even-odd test for whether `point` lies inside the polygon.
///
/// Points exactly on the boundary may land on either side.
pub fn contains_point(points: &[Point2<i32>], point: Point2<i32>) -> bool {
    if points.len() < 3 {
        return false;
    }

    let px = point.x as i128;
    let py = point.y as i128;
    let mut inside = false;
    let mut j = points.len() - 1;

    for i in 0..points.len() {
        let (p0x, p0y) = (points[i].x as i128, points[i].y as i128);
        let (p1x, p1y) = (points[j].x as i128, points[j].y as i128);

        if (p0y > py) != (p1y > py) {
            let crossing = (p1x - p0x) * (py - p0y) / (p1y - p0y) + p0x;
            if px < crossing {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Axis-aligned bounds of a point set, or `None` for an empty set.
pub fn bounds(points: &[Point2<i32>]) -> Option<Area> {
    let first = points.first()?;
    let mut area = Area::of(first.x, first.x, first.y, first.y);

    for p in &points[1..] {
        area.min_x = area.min_x.min(p.x);
        area.max_x = area.max_x.max(p.x);
        area.min_y = area.min_y.min(p.y);
        area.max_y = area.max_y.max(p.y);
    }

    Some(area)
}

/// Arithmetic mean of the points. Returns the origin for an empty set.
pub fn barycenter(points: &[Point2<i32>]) -> Point2<f64> {
    if points.is_empty() {
        return Point2::origin();
    }

    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| {
        (sx + p.x as f64, sy + p.y as f64)
    });
    let n = points.len() as f64;
    Point2::new(sx / n, sy / n)
}
