// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for mesh operations.

use crate::ids::{PolygonId, VertexId};

/// Result type alias for mesh operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during mesh operations.
///
/// Every error is raised before the failing operation writes any state, so a
/// mesh that returned an error is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A referenced vertex is not live in the mesh.
    #[error("vertex {0} does not exist")]
    VertexNonexistent(VertexId),

    /// A vertex with the requested id is already live.
    #[error("vertex already exists with the given id {0}")]
    VertexDuplicate(VertexId),

    /// A vertex cannot be removed while polygons still reference it.
    #[error("vertex {0} is still referenced by a polygon")]
    VertexReferenced(VertexId),

    /// A referenced polygon is not live in the mesh.
    #[error("polygon {0} does not exist")]
    PolygonNonexistent(PolygonId),

    /// A polygon with the requested id is already live.
    #[error("polygon already exists with the given id {0}")]
    PolygonDuplicate(PolygonId),

    /// A polygon needs at least three vertices.
    #[error("polygon must have at least three vertices (got {0})")]
    PolygonTooFewVertices(usize),

    /// The polygon (or a polygon affected by a vertex move) would be
    /// degenerate or not convex.
    #[error("polygon is not convex: {0}")]
    PolygonNotConvex(String),

    /// The polygon (or a polygon affected by a vertex move) would not fit
    /// into the world bounds.
    #[error("polygon cannot fit into the room: {0}")]
    PolygonOutsideBounds(String),

    /// A command yielded a different kind of output than its caller asked
    /// for.
    #[error("command produced unexpected output: {0}")]
    UnexpectedOutput(String),

    /// Editor configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
