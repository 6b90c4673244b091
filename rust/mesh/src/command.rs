// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Undoable mesh edits.
//!
//! Every edit made through an editing session is a [`MeshCommand`]. A command
//! captures whatever it needs to revert itself while it is evaluated, so the
//! inverse can restore the mesh exactly, original ids included.

use std::fmt;

use roommodel_geometry::Position;

use crate::error::{Error, Result};
use crate::ids::{PolygonId, VertexId};
use crate::mesh::Mesh;
use crate::undo::{UndoCommand, UndoExecutor};

/// Executor for mesh commands.
pub type MeshExecutor = UndoExecutor<Mesh, MeshCommand>;

/// What a [`MeshCommand`] yields when evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Vertex(VertexId),
    Polygon(PolygonId),
    Steps(Vec<CommandOutput>),
    Unit,
}

impl CommandOutput {
    pub fn vertex(&self) -> Option<VertexId> {
        match self {
            CommandOutput::Vertex(v) => Some(*v),
            _ => None,
        }
    }

    pub fn polygon(&self) -> Option<PolygonId> {
        match self {
            CommandOutput::Polygon(p) => Some(*p),
            _ => None,
        }
    }

    pub fn steps(&self) -> Option<&[CommandOutput]> {
        match self {
            CommandOutput::Steps(s) => Some(s),
            _ => None,
        }
    }
}

/// One vertex of a polygon being assembled by [`MeshCommand::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexStep {
    /// Reuse a vertex already in the mesh.
    Existing(VertexId),
    /// Create a new vertex at this position.
    Create(Position),
}

/// An undoable mesh edit.
#[derive(Debug, Clone)]
pub enum MeshCommand {
    VertexCreate(VertexCreate),
    VertexExisting(VertexExisting),
    VertexMove(VertexMove),
    PolygonCreate(PolygonCreate),
    PolygonDelete(PolygonDelete),
    Sequence(Sequence),
    Bind(Bind),
}

impl MeshCommand {
    pub fn vertex_create(position: Position) -> Self {
        MeshCommand::VertexCreate(VertexCreate {
            position,
            created: None,
        })
    }

    pub fn vertex_existing(vertex: VertexId) -> Self {
        MeshCommand::VertexExisting(VertexExisting { vertex })
    }

    pub fn vertex_move(vertex: VertexId, to: Position) -> Self {
        MeshCommand::VertexMove(VertexMove {
            vertex,
            to,
            from: None,
        })
    }

    /// Creates a polygon from positions, reusing any polygon vertex already
    /// at one of them.
    pub fn polygon_create(positions: Vec<Position>) -> Self {
        MeshCommand::PolygonCreate(PolygonCreate {
            positions,
            polygon: None,
        })
    }

    pub fn polygon_delete(polygon: PolygonId) -> Self {
        MeshCommand::PolygonDelete(PolygonDelete {
            polygon,
            snapshot: Vec::new(),
        })
    }

    /// Runs `steps` in order; undone in reverse.
    pub fn sequence(steps: Vec<MeshCommand>) -> Self {
        MeshCommand::Sequence(Sequence::new(steps))
    }

    /// Resolves each vertex step, then creates a polygon over the results.
    pub fn bind(steps: Vec<VertexStep>) -> Self {
        MeshCommand::Bind(Bind::new(steps))
    }
}

impl UndoCommand<Mesh> for MeshCommand {
    type Output = CommandOutput;
    type Error = Error;

    fn description(&self) -> String {
        self.to_string()
    }

    fn evaluate(&mut self, mesh: &mut Mesh) -> Result<CommandOutput> {
        match self {
            MeshCommand::VertexCreate(c) => c.evaluate(mesh).map(CommandOutput::Vertex),
            MeshCommand::VertexExisting(c) => c.evaluate(mesh).map(CommandOutput::Vertex),
            MeshCommand::VertexMove(c) => c.evaluate(mesh).map(|()| CommandOutput::Unit),
            MeshCommand::PolygonCreate(c) => c.evaluate(mesh).map(CommandOutput::Polygon),
            MeshCommand::PolygonDelete(c) => c.evaluate(mesh).map(|()| CommandOutput::Unit),
            MeshCommand::Sequence(c) => c.evaluate(mesh).map(CommandOutput::Steps),
            MeshCommand::Bind(c) => c.evaluate(mesh).map(CommandOutput::Polygon),
        }
    }

    fn undo(&mut self, mesh: &mut Mesh) -> Result<()> {
        match self {
            MeshCommand::VertexCreate(c) => c.undo(mesh),
            MeshCommand::VertexExisting(_) => Ok(()),
            MeshCommand::VertexMove(c) => c.undo(mesh),
            MeshCommand::PolygonCreate(c) => c.undo(mesh),
            MeshCommand::PolygonDelete(c) => c.undo(mesh),
            MeshCommand::Sequence(c) => c.undo(mesh),
            MeshCommand::Bind(c) => c.undo(mesh),
        }
    }
}

impl fmt::Display for MeshCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshCommand::VertexCreate(c) => match c.created {
                Some(v) => write!(f, "Create Vertex {v}"),
                None => write!(f, "Create Vertex"),
            },
            MeshCommand::VertexExisting(c) => write!(f, "Use Vertex {}", c.vertex),
            MeshCommand::VertexMove(c) => write!(f, "Move Vertex {}", c.vertex),
            MeshCommand::PolygonCreate(c) => match c.polygon {
                Some(p) => write!(f, "Create Polygon {p}"),
                None => write!(f, "Create Polygon"),
            },
            MeshCommand::PolygonDelete(c) => write!(f, "Delete Polygon {}", c.polygon),
            MeshCommand::Sequence(c) => match c.last_completed() {
                Some(step) => fmt::Display::fmt(step, f),
                None => write!(f, "Empty Sequence"),
            },
            MeshCommand::Bind(c) => match c.polygon {
                Some(p) => write!(f, "Create Polygon {p}"),
                None => write!(f, "Create Polygon"),
            },
        }
    }
}

/// Creates one vertex; undone by deleting it if it is still live.
#[derive(Debug, Clone)]
pub struct VertexCreate {
    position: Position,
    created: Option<VertexId>,
}

impl VertexCreate {
    fn evaluate(&mut self, mesh: &mut Mesh) -> Result<VertexId> {
        let v = mesh.vertex_create(self.position);
        tracing::debug!(vertex = %v, x = self.position.x, y = self.position.y, "Created vertex");
        self.created = Some(v);
        Ok(v)
    }

    fn undo(&mut self, mesh: &mut Mesh) -> Result<()> {
        // A cascading polygon delete may already have removed it.
        match self.created {
            Some(v) if mesh.contains_vertex(v) => mesh.vertex_delete(v),
            _ => Ok(()),
        }
    }
}

/// Yields a vertex that already exists.
#[derive(Debug, Clone)]
pub struct VertexExisting {
    vertex: VertexId,
}

impl VertexExisting {
    fn evaluate(&mut self, mesh: &Mesh) -> Result<VertexId> {
        if mesh.contains_vertex(self.vertex) {
            Ok(self.vertex)
        } else {
            Err(Error::VertexNonexistent(self.vertex))
        }
    }
}

/// Moves a vertex; remembers where it came from.
#[derive(Debug, Clone)]
pub struct VertexMove {
    vertex: VertexId,
    to: Position,
    from: Option<Position>,
}

impl VertexMove {
    fn evaluate(&mut self, mesh: &mut Mesh) -> Result<()> {
        let from = mesh
            .vertex_position(self.vertex)
            .ok_or(Error::VertexNonexistent(self.vertex))?;
        mesh.vertex_set_position(self.vertex, self.to)?;
        tracing::debug!(vertex = %self.vertex, ?from, to = ?self.to, "Moved vertex");
        self.from = Some(from);
        Ok(())
    }

    fn undo(&mut self, mesh: &mut Mesh) -> Result<()> {
        match self.from {
            Some(from) => mesh.vertex_set_position(self.vertex, from),
            None => Ok(()),
        }
    }
}

/// Creates a polygon from raw positions.
///
/// Positions without a polygon vertex get a new vertex. If the polygon is
/// then rejected those vertices are deleted again, so no live entity is left
/// behind, but they remain as tombstones and their ids stay consumed.
#[derive(Debug, Clone)]
pub struct PolygonCreate {
    positions: Vec<Position>,
    polygon: Option<PolygonId>,
}

impl PolygonCreate {
    fn evaluate(&mut self, mesh: &mut Mesh) -> Result<PolygonId> {
        tracing::debug!(positions = ?self.positions, "Creating polygon");

        let mut vertices = Vec::with_capacity(self.positions.len());
        let mut created = Vec::new();
        for &position in &self.positions {
            match mesh.vertex_find(position) {
                Some(v) => vertices.push(v),
                None => {
                    let v = mesh.vertex_create(position);
                    created.push(v);
                    vertices.push(v);
                }
            }
        }

        match mesh.polygon_create(&vertices) {
            Ok(p) => {
                tracing::debug!(polygon = %p, "Created polygon");
                self.polygon = Some(p);
                Ok(p)
            }
            Err(e) => {
                for v in created {
                    if let Err(cleanup) = mesh.vertex_delete(v) {
                        tracing::error!(vertex = %v, %cleanup, "Failed to discard vertex");
                    }
                }
                Err(e)
            }
        }
    }

    fn undo(&mut self, mesh: &mut Mesh) -> Result<()> {
        match self.polygon {
            Some(p) => {
                tracing::debug!(polygon = %p, "Undoing polygon creation");
                mesh.polygon_delete(p)
            }
            None => Ok(()),
        }
    }
}

/// Deletes a polygon; remembers its ring so it can be rebuilt.
#[derive(Debug, Clone)]
pub struct PolygonDelete {
    polygon: PolygonId,
    snapshot: Vec<(VertexId, Position)>,
}

impl PolygonDelete {
    fn evaluate(&mut self, mesh: &mut Mesh) -> Result<()> {
        let polygon = mesh
            .polygon(self.polygon)
            .filter(|p| !p.is_deleted())
            .ok_or(Error::PolygonNonexistent(self.polygon))?;
        let snapshot = polygon
            .vertices()
            .iter()
            .map(|&v| {
                mesh.vertex_position(v)
                    .map(|p| (v, p))
                    .ok_or(Error::VertexNonexistent(v))
            })
            .collect::<Result<Vec<_>>>()?;

        mesh.polygon_delete(self.polygon)?;
        tracing::debug!(polygon = %self.polygon, "Deleted polygon");
        self.snapshot = snapshot;
        Ok(())
    }

    fn undo(&mut self, mesh: &mut Mesh) -> Result<()> {
        tracing::debug!(polygon = %self.polygon, "Undoing polygon deletion");

        let mut restored = Vec::new();
        for &(v, position) in &self.snapshot {
            if !mesh.contains_vertex(v) {
                mesh.vertex_create_with_id(v, position)?;
                restored.push(v);
            }
        }

        let ring: Vec<VertexId> = self.snapshot.iter().map(|(v, _)| *v).collect();
        if let Err(e) = mesh.polygon_create_with_id(self.polygon, &ring) {
            for v in restored {
                if let Err(cleanup) = mesh.vertex_delete(v) {
                    tracing::error!(vertex = %v, %cleanup, "Failed to discard restored vertex");
                }
            }
            return Err(e);
        }
        Ok(())
    }
}

/// Runs a list of commands as one.
#[derive(Debug, Clone)]
pub struct Sequence {
    steps: Vec<MeshCommand>,
    completed: usize,
}

impl Sequence {
    fn new(steps: Vec<MeshCommand>) -> Self {
        Self {
            steps,
            completed: 0,
        }
    }

    fn last_completed(&self) -> Option<&MeshCommand> {
        self.completed.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    fn evaluate(&mut self, mesh: &mut Mesh) -> Result<Vec<CommandOutput>> {
        let mut outputs = Vec::with_capacity(self.steps.len());
        self.completed = 0;

        while self.completed < self.steps.len() {
            match self.steps[self.completed].evaluate(mesh) {
                Ok(output) => {
                    outputs.push(output);
                    self.completed += 1;
                }
                Err(e) => {
                    if let Err(rollback) = self.undo(mesh) {
                        tracing::error!(%rollback, "Failed to roll back partial sequence");
                    }
                    return Err(e);
                }
            }
        }

        Ok(outputs)
    }

    fn undo(&mut self, mesh: &mut Mesh) -> Result<()> {
        while self.completed > 0 {
            self.steps[self.completed - 1].undo(mesh)?;
            self.completed -= 1;
        }
        Ok(())
    }
}

/// Creates a polygon over vertices produced by a sequence of vertex steps.
#[derive(Debug, Clone)]
pub struct Bind {
    vertices: Sequence,
    polygon: Option<PolygonId>,
}

impl Bind {
    fn new(steps: Vec<VertexStep>) -> Self {
        let steps = steps
            .into_iter()
            .map(|step| match step {
                VertexStep::Existing(v) => MeshCommand::vertex_existing(v),
                VertexStep::Create(p) => MeshCommand::vertex_create(p),
            })
            .collect();
        Self {
            vertices: Sequence::new(steps),
            polygon: None,
        }
    }

    fn evaluate(&mut self, mesh: &mut Mesh) -> Result<PolygonId> {
        let ids: Vec<VertexId> = self
            .vertices
            .evaluate(mesh)?
            .iter()
            .filter_map(CommandOutput::vertex)
            .collect();

        match mesh.polygon_create(&ids) {
            Ok(p) => {
                tracing::debug!(polygon = %p, "Created polygon");
                self.polygon = Some(p);
                Ok(p)
            }
            Err(e) => {
                if let Err(rollback) = self.vertices.undo(mesh) {
                    tracing::error!(%rollback, "Failed to roll back polygon vertices");
                }
                Err(e)
            }
        }
    }

    fn undo(&mut self, mesh: &mut Mesh) -> Result<()> {
        if let Some(p) = self.polygon {
            if mesh.contains_polygon(p) {
                mesh.polygon_delete(p)?;
            }
            self.polygon = None;
        }
        self.vertices.undo(mesh)
    }
}

#[cfg(test)]
mod tests {
    use roommodel_geometry::Area;

    use super::*;

    fn world() -> Mesh {
        Mesh::new(Area::of(-2048, 2048, -2048, 2048))
    }

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn polygon_create_and_undo() {
        let mut mesh = world();
        let mut cmd = MeshCommand::polygon_create(vec![pos(0, 1), pos(0, 0), pos(1, 0)]);
        let p = cmd.evaluate(&mut mesh).unwrap().polygon().unwrap();
        assert_eq!(cmd.description(), format!("Create Polygon {p}"));
        assert_eq!(mesh.vertex_count(), 3);

        cmd.undo(&mut mesh).unwrap();
        assert_eq!(mesh.polygon_count(), 0);
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.check().is_empty());
    }

    #[test]
    fn polygon_create_reuses_vertices() {
        let mut mesh = world();
        MeshCommand::polygon_create(vec![pos(0, 0), pos(10, 0), pos(10, 10)])
            .evaluate(&mut mesh)
            .unwrap();
        MeshCommand::polygon_create(vec![pos(0, 0), pos(10, 10), pos(0, 10)])
            .evaluate(&mut mesh)
            .unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.edge_count(), 5);
    }

    #[test]
    fn failed_polygon_create_discards_new_vertices() {
        let mut mesh = world();
        let mut cmd =
            MeshCommand::polygon_create(vec![pos(0, 1), pos(0, 0), pos(1, 1), pos(1, 0)]);
        assert!(matches!(
            cmd.evaluate(&mut mesh),
            Err(Error::PolygonNotConvex(_))
        ));
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
        assert_eq!(mesh.tombstone_count(), 4);
        assert!(mesh.check().is_empty());

        // The discarded ids are not handed out again.
        let v = mesh.vertex_create(pos(5, 5));
        assert_eq!(v, VertexId(4));
    }

    #[test]
    fn polygon_delete_restores_ids() {
        let mut mesh = world();
        let p = MeshCommand::polygon_create(vec![pos(0, 0), pos(10, 0), pos(0, 10)])
            .evaluate(&mut mesh)
            .unwrap()
            .polygon()
            .unwrap();
        let ring = mesh.polygon(p).unwrap().vertices().to_vec();

        let mut cmd = MeshCommand::polygon_delete(p);
        cmd.evaluate(&mut mesh).unwrap();
        assert_eq!(cmd.description(), format!("Delete Polygon {p}"));
        assert_eq!(mesh.polygon_count(), 0);

        cmd.undo(&mut mesh).unwrap();
        assert!(mesh.contains_polygon(p));
        assert_eq!(mesh.polygon(p).unwrap().vertices(), ring.as_slice());
        assert!(mesh.check().is_empty());
    }

    #[test]
    fn polygon_delete_of_missing_polygon() {
        let mut mesh = world();
        let mut cmd = MeshCommand::polygon_delete(PolygonId(5));
        assert_eq!(
            cmd.evaluate(&mut mesh),
            Err(Error::PolygonNonexistent(PolygonId(5)))
        );
    }

    #[test]
    fn vertex_move_and_undo() {
        let mut mesh = world();
        MeshCommand::polygon_create(vec![pos(0, 0), pos(10, 0), pos(0, 10)])
            .evaluate(&mut mesh)
            .unwrap();
        let v = mesh.vertex_find(pos(10, 0)).unwrap();

        let mut cmd = MeshCommand::vertex_move(v, pos(20, 0));
        cmd.evaluate(&mut mesh).unwrap();
        assert_eq!(cmd.description(), format!("Move Vertex {v}"));
        assert_eq!(mesh.vertex_position(v), Some(pos(20, 0)));

        cmd.undo(&mut mesh).unwrap();
        assert_eq!(mesh.vertex_position(v), Some(pos(10, 0)));
    }

    #[test]
    fn sequence_rolls_back_completed_prefix() {
        let mut mesh = world();
        let mut cmd = MeshCommand::sequence(vec![
            MeshCommand::vertex_create(pos(1, 1)),
            MeshCommand::vertex_create(pos(2, 2)),
            MeshCommand::vertex_existing(VertexId(99)),
        ]);
        assert_eq!(
            cmd.evaluate(&mut mesh),
            Err(Error::VertexNonexistent(VertexId(99)))
        );
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn sequence_undoes_in_reverse() {
        let mut mesh = world();
        let mut cmd = MeshCommand::sequence(vec![
            MeshCommand::polygon_create(vec![pos(0, 0), pos(10, 0), pos(0, 10)]),
            MeshCommand::polygon_create(vec![pos(10, 0), pos(10, 10), pos(0, 10)]),
        ]);
        let out = cmd.evaluate(&mut mesh).unwrap();
        assert_eq!(out.steps().map(<[_]>::len), Some(2));
        assert_eq!(mesh.polygon_count(), 2);
        assert_eq!(cmd.description(), "Create Polygon 1");

        cmd.undo(&mut mesh).unwrap();
        assert_eq!(mesh.polygon_count(), 0);
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.check().is_empty());
    }

    #[test]
    fn bind_mixes_existing_and_new_vertices() {
        let mut mesh = world();
        MeshCommand::polygon_create(vec![pos(0, 0), pos(10, 0), pos(0, 10)])
            .evaluate(&mut mesh)
            .unwrap();
        let a = mesh.vertex_find(pos(10, 0)).unwrap();
        let b = mesh.vertex_find(pos(0, 10)).unwrap();

        let mut cmd = MeshCommand::bind(vec![
            VertexStep::Existing(a),
            VertexStep::Create(pos(10, 10)),
            VertexStep::Existing(b),
        ]);
        let p = cmd.evaluate(&mut mesh).unwrap().polygon().unwrap();
        assert_eq!(cmd.description(), format!("Create Polygon {p}"));
        assert_eq!(mesh.vertex_count(), 4);
        assert!(!mesh.edge_between(a, b).unwrap().is_external());

        cmd.undo(&mut mesh).unwrap();
        assert_eq!(mesh.polygon_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.check().is_empty());
    }

    #[test]
    fn failed_bind_leaves_no_vertices() {
        let mut mesh = world();
        let mut cmd = MeshCommand::bind(vec![
            VertexStep::Create(pos(0, 0)),
            VertexStep::Create(pos(5, 5)),
            VertexStep::Create(pos(10, 10)),
        ]);
        assert!(matches!(
            cmd.evaluate(&mut mesh),
            Err(Error::PolygonNotConvex(_))
        ));
        assert_eq!(mesh.vertex_count(), 0);
    }
}
