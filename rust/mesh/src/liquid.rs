// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decomposition of the free space around the mesh into liquid cells.
//!
//! The room is cut into horizontal spans at every distinct vertex Y. Within
//! a span, every external non-horizontal edge crosses the whole span, so the
//! free space between two consecutive edges (or an edge and a room wall) is a
//! trapezoid, or a triangle where two edges meet. Each such region becomes a
//! convex polygon ("cell") in a separate mesh, and cells in consecutive spans
//! whose shared boundary overlaps are linked above/below.
//!
//! Spans run from the room's minimum Y downward in index order: the first
//! span starts at `bounds.min_y`, and a cell's "above" neighbors live in the
//! previous span.

use std::collections::{BTreeMap, BTreeSet};

use roommodel_geometry::{self as geometry, Area, Position};

use crate::ids::{PolygonId, VertexId};
use crate::mesh::Mesh;

/// A free-space region in one span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    id: PolygonId,
    span: usize,
    top: Option<(i32, i32)>,
    bottom: Option<(i32, i32)>,
    above: BTreeSet<PolygonId>,
    below: BTreeSet<PolygonId>,
}

impl Cell {
    /// The cell's polygon in [`LiquidCells::mesh`].
    pub fn id(&self) -> PolygonId {
        self.id
    }

    /// Index of the span the cell belongs to.
    pub fn span(&self) -> usize {
        self.span
    }

    /// X-range of the cell's edge on the span's top line, if it has one.
    pub fn top(&self) -> Option<(i32, i32)> {
        self.top
    }

    /// X-range of the cell's edge on the span's bottom line, if it has one.
    pub fn bottom(&self) -> Option<(i32, i32)> {
        self.bottom
    }

    /// Cells in the previous span sharing part of this cell's top edge.
    pub fn above(&self) -> &BTreeSet<PolygonId> {
        &self.above
    }

    /// Cells in the next span sharing part of this cell's bottom edge.
    pub fn below(&self) -> &BTreeSet<PolygonId> {
        &self.below
    }
}

/// Where a vertical boundary crosses a span: its X on the top and bottom
/// lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Crossing {
    top: Position,
    bottom: Position,
}

impl Crossing {
    fn wall(x: i32, span: &Area) -> Self {
        Self {
            top: Position::new(x, span.min_y),
            bottom: Position::new(x, span.max_y),
        }
    }

    fn sort_key(&self) -> (i32, i32) {
        (
            self.top.x.min(self.bottom.x),
            self.top.x.max(self.bottom.x),
        )
    }
}

/// The free space of a mesh, decomposed into linked convex cells.
#[derive(Debug, Clone)]
pub struct LiquidCells {
    mesh: Mesh,
    cells: BTreeMap<PolygonId, Cell>,
    roots: BTreeSet<PolygonId>,
    spans: Vec<(i32, i32)>,
}

impl LiquidCells {
    /// Decomposes the free space of `source`.
    pub fn generate(source: &Mesh) -> Self {
        let bounds = source.bounds();
        let mut builder = Builder {
            source,
            cells: LiquidCells {
                mesh: Mesh::new(bounds),
                cells: BTreeMap::new(),
                roots: BTreeSet::new(),
                spans: Vec::new(),
            },
            previous: Vec::new(),
        };

        let mut ys: BTreeSet<i32> = source.vertices().map(|v| v.position().y).collect();
        ys.insert(bounds.max_y);

        let mut y_previous = bounds.min_y;
        for y in ys {
            if y <= y_previous || y > bounds.max_y {
                continue;
            }
            builder.span(Area::of(bounds.min_x, bounds.max_x, y_previous, y));
            y_previous = y;
        }

        let cells = builder.cells;
        tracing::debug!(
            spans = cells.spans.len(),
            cells = cells.cells.len(),
            "Generated liquid cells"
        );
        cells
    }

    /// The mesh holding one polygon per cell.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Cells in the first span, which have nothing above them.
    pub fn cell_roots(&self) -> &BTreeSet<PolygonId> {
        &self.roots
    }

    /// All cells in ascending id order.
    pub fn cells_all(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.values()
    }

    pub fn cell(&self, id: PolygonId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of non-empty spans the room was cut into.
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// `(top, bottom)` Y of a span.
    pub fn span_bounds(&self, span: usize) -> Option<(i32, i32)> {
        self.spans.get(span).copied()
    }
}

struct Builder<'a> {
    source: &'a Mesh,
    cells: LiquidCells,
    // Cells built in the most recent span
    previous: Vec<PolygonId>,
}

impl Builder<'_> {
    fn span(&mut self, span: Area) {
        let index = self.cells.spans.len();
        self.cells.spans.push((span.min_y, span.max_y));

        let crossings = self.crossings(&span);
        if crossings.len() % 2 != 0 {
            tracing::warn!(
                top = span.min_y,
                bottom = span.max_y,
                crossings = crossings.len(),
                "Odd number of edge crossings, input polygons probably overlap"
            );
        }

        let mut built = Vec::new();
        for pair in crossings.chunks_exact(2) {
            if let Some(id) = self.cell(index, pair[0], pair[1]) {
                built.push(id);
            }
        }
        tracing::debug!(
            top = span.min_y,
            bottom = span.max_y,
            crossings = crossings.len(),
            cells = built.len(),
            "Processed span"
        );

        if index == 0 {
            self.cells.roots.extend(built.iter().copied());
        }
        self.link(&built);
        self.previous = built;
    }

    /// Crossings of the span by external edges, bracketed by the room walls
    /// and sorted left to right.
    fn crossings(&self, span: &Area) -> Vec<Crossing> {
        let mesh = self.source;
        let mut crossings = vec![Crossing::wall(span.min_x, span)];

        for pid in mesh.polygons_overlapping(span) {
            let Some(polygon) = mesh.polygon(pid) else {
                continue;
            };
            for &edge_id in polygon.edges() {
                let Some(edge) = mesh.edge(edge_id) else {
                    continue;
                };
                if !edge.is_external() {
                    continue;
                }
                let Some((p0, p1)) = mesh.edge_positions(edge_id) else {
                    continue;
                };
                if geometry::edge_normal(p0, p1).x == 0.0 {
                    continue;
                }
                let extent = geometry::edge_bounds(p0, p1);
                if extent.min_y >= span.max_y || extent.max_y <= span.min_y {
                    continue;
                }

                let top = geometry::segment_intersection_i(
                    p0,
                    p1,
                    Position::new(span.min_x, span.min_y),
                    Position::new(span.max_x, span.min_y),
                );
                let bottom = geometry::segment_intersection_i(
                    p0,
                    p1,
                    Position::new(span.min_x, span.max_y),
                    Position::new(span.max_x, span.max_y),
                );
                match (top, bottom) {
                    (Some(top), Some(bottom)) => crossings.push(Crossing {
                        top: Position::new(top.x as i32, span.min_y),
                        bottom: Position::new(bottom.x as i32, span.max_y),
                    }),
                    _ => tracing::warn!(edge = %edge_id, "Edge does not cross its span"),
                }
            }
        }

        crossings.push(Crossing::wall(span.max_x, span));
        crossings.sort_by_key(Crossing::sort_key);
        crossings
    }

    /// Builds the cell between two consecutive crossings.
    fn cell(&mut self, span: usize, left: Crossing, right: Crossing) -> Option<PolygonId> {
        let mut corners: Vec<Position> = Vec::with_capacity(4);
        for p in [left.bottom, left.top, right.top, right.bottom] {
            if !corners.contains(&p) {
                corners.push(p);
            }
        }
        if corners.len() < 3 {
            return None;
        }

        let mesh = &mut self.cells.mesh;
        let mut vertices: Vec<VertexId> = Vec::with_capacity(corners.len());
        let mut created = Vec::new();
        for &p in &corners {
            match mesh.vertex_find(p) {
                Some(v) => vertices.push(v),
                None => {
                    let v = mesh.vertex_create(p);
                    created.push(v);
                    vertices.push(v);
                }
            }
        }

        let id = match mesh.polygon_create(&vertices) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(?corners, error = %e, "Skipping rejected cell");
                for v in created {
                    let _ = mesh.vertex_delete(v);
                }
                return None;
            }
        };

        let top = (left.top != right.top).then_some((left.top.x, right.top.x));
        let bottom = (left.bottom != right.bottom).then_some((left.bottom.x, right.bottom.x));
        self.cells.cells.insert(
            id,
            Cell {
                id,
                span,
                top,
                bottom,
                above: BTreeSet::new(),
                below: BTreeSet::new(),
            },
        );
        Some(id)
    }

    /// Links new cells to the cells of the previous span whose bottom edge
    /// overlaps their top edge.
    fn link(&mut self, built: &[PolygonId]) {
        let mut links = Vec::new();
        for &upper in &self.previous {
            let Some(bottom) = self.cells.cells.get(&upper).and_then(Cell::bottom) else {
                continue;
            };
            for &lower in built {
                let Some(top) = self.cells.cells.get(&lower).and_then(Cell::top) else {
                    continue;
                };
                if top.0 < bottom.1 && top.1 > bottom.0 {
                    links.push((upper, lower));
                }
            }
        }

        for (upper, lower) in links {
            if let Some(cell) = self.cells.cells.get_mut(&upper) {
                cell.below.insert(lower);
            }
            if let Some(cell) = self.cells.cells.get_mut(&lower) {
                cell.above.insert(upper);
            }
        }
    }
}
