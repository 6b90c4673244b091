// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier types for mesh entities.
//!
//! Vertices and polygons are keyed by monotonically increasing integers that
//! are never reused for the lifetime of a mesh. Unlike generational arena
//! keys, these ids can be replayed: undoing a deletion re-creates an entity
//! under the exact id it had before, so anything else holding that id keeps
//! referring to the same thing.

use serde::{Deserialize, Serialize};

/// Identifier of a mesh vertex.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VertexId(pub u64);

/// Identifier of a mesh polygon.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PolygonId(pub u64);

/// Identifier of an edge: the unordered pair of its vertex ids, stored with
/// the lower id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId {
    low: VertexId,
    high: VertexId,
}

impl VertexId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl PolygonId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl EdgeId {
    /// Creates the edge id for the pair `(a, b)` in either order.
    pub fn new(a: VertexId, b: VertexId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// The lower of the two vertex ids.
    pub fn low(self) -> VertexId {
        self.low
    }

    /// The higher of the two vertex ids.
    pub fn high(self) -> VertexId {
        self.high
    }

    /// Returns `true` if the edge ends at `v`.
    pub fn touches(self, v: VertexId) -> bool {
        self.low == v || self.high == v
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for PolygonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.low, self.high)
    }
}

/// Issues fresh ids for one id space.
///
/// A fresh id is `max(next, highest live id + 1)`; every issued or replayed
/// id advances `next` so a deleted id is never handed out again.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdCounter {
    next: u64,
}

impl IdCounter {
    pub(crate) fn fresh(&mut self, highest_live: Option<u64>) -> u64 {
        let candidate = match highest_live {
            Some(h) => self.next.max(h.saturating_add(1)),
            None => self.next,
        };
        self.next = candidate.saturating_add(1);
        candidate
    }

    /// Records that `id` is in use so it is never issued fresh.
    pub(crate) fn reserve(&mut self, id: u64) {
        self.next = self.next.max(id.saturating_add(1));
    }
}
