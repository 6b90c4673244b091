// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RoomModel Geometry
//!
//! Planar geometry primitives for the room model: integer areas, polygon
//! predicates (convexity, winding, point containment) and segment
//! intersection. Everything here is a pure function over `nalgebra` points;
//! the stateful mesh lives in `roommodel-mesh`.

pub mod area;
pub mod polygon;
pub mod segment;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use area::Area;
pub use polygon::{
    barycenter, bounds, contains_point, is_clockwise_order, is_convex, is_degenerate,
    signed_area_doubled, winding, Winding,
};
pub use segment::{
    edge_bounds, edge_normal, segment_intersection, segment_intersection_i, segment_intersects,
    segment_intersects_i,
};

/// An integer position in the plane.
pub type Position = Point2<i32>;
