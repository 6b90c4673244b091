// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editing session: the write path for a room.
//!
//! An [`EditingSession`] owns the mesh (inside its undo executor) and is the
//! only way to change it. Readers borrow the mesh; writers submit commands.
//! The liquid-cell decomposition is derived from the mesh on demand and
//! cached until the next change.

use roommodel_geometry::Position;

use crate::command::{CommandOutput, MeshCommand, MeshExecutor};
use crate::config::EditorConfig;
use crate::error::{Error, Result};
use crate::ids::{PolygonId, VertexId};
use crate::liquid::LiquidCells;
use crate::mesh::Mesh;
use crate::undo::{SubscriptionId, UndoAvailability};

/// Mesh, undo history and derived data for one room.
#[derive(Debug)]
pub struct EditingSession {
    config: EditorConfig,
    executor: MeshExecutor,
    // Bumped on every successful change to the mesh
    revision: u64,
    liquid: Option<(u64, LiquidCells)>,
}

impl EditingSession {
    /// Creates a session over an empty mesh.
    pub fn new(config: EditorConfig) -> Result<Self> {
        config.validate()?;
        let mesh = Mesh::with_index_leaf_size(config.world_bounds, config.quadtree_min_size);
        let executor = MeshExecutor::new(mesh, config.undo_depth()?);
        Ok(Self {
            config,
            executor,
            revision: 0,
            liquid: None,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mesh(&self) -> &Mesh {
        self.executor.state()
    }

    pub fn executor(&self) -> &MeshExecutor {
        &self.executor
    }

    pub fn availability(&self) -> UndoAvailability {
        self.executor.availability()
    }

    /// Registers a callback for undo availability changes.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&UndoAvailability) + 'static,
    {
        self.executor.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.executor.unsubscribe(id)
    }

    /// Evaluates a command through the undo history.
    pub fn evaluate(&mut self, command: MeshCommand) -> Result<CommandOutput> {
        let output = self.executor.evaluate(command)?;
        self.revision += 1;
        Ok(output)
    }

    /// Creates a polygon from positions, joining existing vertices where
    /// positions match.
    pub fn polygon_create(&mut self, positions: Vec<Position>) -> Result<PolygonId> {
        self.evaluate_polygon(MeshCommand::polygon_create(positions))
    }

    /// Evaluates a command that yields a polygon.
    pub(crate) fn evaluate_polygon(&mut self, command: MeshCommand) -> Result<PolygonId> {
        let output = self.evaluate(command)?;
        output
            .polygon()
            .ok_or_else(|| Error::UnexpectedOutput(format!("{output:?}")))
    }

    /// Deletes the polygon containing `point`, if there is one.
    pub fn polygon_delete_at(&mut self, point: Position) -> Result<Option<PolygonId>> {
        let Some(polygon) = self.mesh().polygon_find(point) else {
            return Ok(None);
        };
        self.evaluate(MeshCommand::polygon_delete(polygon))?;
        Ok(Some(polygon))
    }

    /// Moves the polygon vertex at `from` to `to`, if there is one.
    pub fn vertex_move(&mut self, from: Position, to: Position) -> Result<Option<VertexId>> {
        let Some(vertex) = self.mesh().vertex_find(from) else {
            return Ok(None);
        };
        self.evaluate(MeshCommand::vertex_move(vertex, to))?;
        Ok(Some(vertex))
    }

    /// Reverts the most recent command. Returns `Ok(false)` if there was
    /// nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let undone = self.executor.undo()?;
        if undone {
            self.revision += 1;
        }
        Ok(undone)
    }

    /// The free-space decomposition of the current mesh.
    pub fn liquid_cells(&mut self) -> &LiquidCells {
        let revision = self.revision;
        if matches!(&self.liquid, Some((rev, _)) if *rev != revision) {
            self.liquid = None;
        }
        let mesh = self.executor.state();
        &self
            .liquid
            .get_or_insert_with(|| (revision, LiquidCells::generate(mesh)))
            .1
    }

    /// Drops mesh tombstones once nothing can be undone any more. Returns the
    /// number dropped, which is zero while undo history remains.
    pub fn purge_tombstones(&mut self) -> usize {
        if self.executor.undo_available() {
            return 0;
        }
        let purged = self.executor.with_state_mut(Mesh::purge_tombstones);
        tracing::debug!(purged, "Purged mesh tombstones");
        purged
    }
}
