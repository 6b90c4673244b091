// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interactive editing models.
//!
//! These hold the in-progress state of a user gesture (a polygon being
//! clicked out, a vertex being dragged) and turn it into a single command on
//! the [`EditingSession`] when the gesture completes.

use roommodel_geometry::{self as geometry, Position};

use crate::command::{MeshCommand, VertexStep};
use crate::error::Result;
use crate::ids::{PolygonId, VertexId};
use crate::session::EditingSession;

/// Accumulates the corners of a new polygon.
#[derive(Debug, Clone, Default)]
pub struct PolygonCreator {
    positions: Vec<Position>,
}

impl PolygonCreator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a corner. Returns `true`, without adding it, when `position`
    /// closes the ring by repeating the first corner.
    pub fn add_vertex(&mut self, position: Position) -> bool {
        if self.positions.first() == Some(&position) {
            return true;
        }
        self.positions.push(position);
        false
    }

    /// Corners added so far.
    pub fn vertices(&self) -> &[Position] {
        &self.positions
    }

    /// Submits the polygon. The accumulated corners are cleared whether or
    /// not creation succeeds.
    pub fn create(&mut self, session: &mut EditingSession) -> Result<PolygonId> {
        let positions = std::mem::take(&mut self.positions);
        let steps = positions
            .into_iter()
            .map(|p| match session.mesh().vertex_find(p) {
                Some(v) => VertexStep::Existing(v),
                None => VertexStep::Create(p),
            })
            .collect();

        session.evaluate_polygon(MeshCommand::bind(steps))
    }
}

/// Preview of a polygon affected by a vertex drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryPolygon {
    polygon: PolygonId,
    positions: Vec<Position>,
    moving: Vec<usize>,
    convex: bool,
}

impl TemporaryPolygon {
    /// The mesh polygon this previews.
    pub fn polygon(&self) -> PolygonId {
        self.polygon
    }

    /// Corner positions, with the dragged vertex at its new position.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Whether the polygon would still be a valid convex polygon.
    pub fn is_convex(&self) -> bool {
        self.convex
    }

    fn update(&mut self, position: Position) {
        for &i in &self.moving {
            self.positions[i] = position;
        }
        self.convex =
            !geometry::is_degenerate(&self.positions) && geometry::is_convex(&self.positions);
    }
}

/// Drags one vertex, previewing the polygons that use it.
#[derive(Debug, Clone, Default)]
pub struct VertexMover {
    vertex: Option<VertexId>,
    position: Option<Position>,
    polygons: Vec<TemporaryPolygon>,
}

impl VertexMover {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the polygon vertex at `position`. Returns `false` if there is
    /// none, leaving any previous selection in place.
    pub fn select_vertex(&mut self, session: &EditingSession, position: Position) -> bool {
        let mesh = session.mesh();
        let Some(vertex) = mesh.vertex_find(position) else {
            return false;
        };
        let Some(current) = mesh.vertex(vertex) else {
            return false;
        };

        let mut polygon_ids: Vec<PolygonId> = current.polygons().iter().copied().collect();
        polygon_ids.sort_unstable();

        self.polygons = polygon_ids
            .into_iter()
            .filter_map(|pid| {
                let polygon = mesh.polygon(pid)?;
                let positions = mesh.polygon_positions(pid)?;
                let moving = polygon
                    .vertices()
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| **v == vertex)
                    .map(|(i, _)| i)
                    .collect();
                let mut preview = TemporaryPolygon {
                    polygon: pid,
                    positions,
                    moving,
                    convex: true,
                };
                preview.update(current.position());
                Some(preview)
            })
            .collect();
        self.vertex = Some(vertex);
        self.position = Some(current.position());
        true
    }

    pub fn is_vertex_selected(&self) -> bool {
        self.vertex.is_some()
    }

    pub fn selected_vertex(&self) -> Option<VertexId> {
        self.vertex
    }

    /// Where the selected vertex would be moved to.
    pub fn vertex_position(&self) -> Option<Position> {
        self.position
    }

    /// Drags the selected vertex. Does nothing without a selection.
    pub fn set_vertex_position(&mut self, position: Position) {
        if self.vertex.is_none() {
            return;
        }
        self.position = Some(position);
        for polygon in &mut self.polygons {
            polygon.update(position);
        }
    }

    /// Returns `true` if every affected polygon would stay convex.
    pub fn is_vertex_ok(&self) -> bool {
        self.polygons.iter().all(TemporaryPolygon::is_convex)
    }

    pub fn temporary_polygons(&self) -> &[TemporaryPolygon] {
        &self.polygons
    }

    /// Submits the move and clears the selection, whether or not the move
    /// succeeds. Returns `Ok(false)` if no vertex was selected.
    pub fn commit(&mut self, session: &mut EditingSession) -> Result<bool> {
        let (Some(vertex), Some(position)) = (self.vertex.take(), self.position.take()) else {
            return Ok(false);
        };
        self.polygons.clear();

        session.evaluate(MeshCommand::vertex_move(vertex, position))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use roommodel_geometry::Area;

    use super::*;
    use crate::config::EditorConfig;

    fn session() -> EditingSession {
        EditingSession::new(EditorConfig {
            world_bounds: Area::of(0, 100, 0, 100),
            ..EditorConfig::default()
        })
        .unwrap()
    }

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn creator_closes_ring_on_first_corner() {
        let mut creator = PolygonCreator::new();
        assert!(!creator.add_vertex(p(10, 10)));
        assert!(!creator.add_vertex(p(30, 10)));
        assert!(!creator.add_vertex(p(30, 30)));
        assert!(creator.add_vertex(p(10, 10)));
        assert_eq!(creator.vertices().len(), 3);

        let mut s = session();
        let polygon = creator.create(&mut s).unwrap();
        assert!(s.mesh().contains_polygon(polygon));
        assert!(creator.vertices().is_empty());
        assert_eq!(
            s.availability().undo_description,
            Some(format!("Create Polygon {polygon}"))
        );
    }

    #[test]
    fn creator_joins_existing_vertices() {
        let mut s = session();
        s.polygon_create(vec![p(10, 10), p(30, 10), p(30, 30)]).unwrap();

        let mut creator = PolygonCreator::new();
        for corner in [p(10, 10), p(30, 30), p(10, 30)] {
            creator.add_vertex(corner);
        }
        creator.create(&mut s).unwrap();

        assert_eq!(s.mesh().vertex_count(), 4);
        let a = s.mesh().vertex_find(p(10, 10)).unwrap();
        let c = s.mesh().vertex_find(p(30, 30)).unwrap();
        assert!(!s.mesh().edge_between(a, c).unwrap().is_external());
    }

    #[test]
    fn creator_clears_on_failure() {
        let mut s = session();
        let mut creator = PolygonCreator::new();
        for corner in [p(0, 0), p(10, 10), p(20, 20)] {
            creator.add_vertex(corner);
        }
        assert!(creator.create(&mut s).is_err());
        assert!(creator.vertices().is_empty());
        assert_eq!(s.mesh().vertex_count(), 0);
    }

    #[test]
    fn mover_previews_and_commits() {
        let mut s = session();
        s.polygon_create(vec![p(10, 10), p(30, 10), p(30, 30), p(10, 30)])
            .unwrap();

        let mut mover = VertexMover::new();
        assert!(!mover.select_vertex(&s, p(50, 50)));
        assert!(mover.select_vertex(&s, p(30, 30)));
        assert_eq!(mover.temporary_polygons().len(), 1);
        assert!(mover.is_vertex_ok());

        mover.set_vertex_position(p(20, 12));
        assert!(!mover.is_vertex_ok());
        assert!(mover.temporary_polygons()[0].positions().contains(&p(20, 12)));

        mover.set_vertex_position(p(40, 40));
        assert!(mover.is_vertex_ok());

        let v = mover.selected_vertex().unwrap();
        assert!(mover.commit(&mut s).unwrap());
        assert!(!mover.is_vertex_selected());
        assert_eq!(s.mesh().vertex_position(v), Some(p(40, 40)));
        assert!(!mover.commit(&mut s).unwrap());
    }

    #[test]
    fn mover_commit_of_bad_move_fails() {
        let mut s = session();
        s.polygon_create(vec![p(10, 10), p(30, 10), p(30, 30), p(10, 30)])
            .unwrap();

        let mut mover = VertexMover::new();
        mover.select_vertex(&s, p(30, 30));
        mover.set_vertex_position(p(20, 12));
        assert!(mover.commit(&mut s).is_err());
        assert!(!mover.is_vertex_selected());
        assert_eq!(s.executor().undo_stack_size(), 1);
    }
}
