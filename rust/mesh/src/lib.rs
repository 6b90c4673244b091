// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RoomModel Mesh
//!
//! Convex polygon mesh for interactive room editing.
//!
//! The [`Mesh`] stores vertices and polygons in id-keyed maps with
//! bidirectional adjacency (vertex to polygon, edge to polygon) and a region
//! [`QuadTree`] over polygon bounds. Every mutation is validated in full
//! before anything is written, so a failed call leaves the mesh untouched.
//!
//! Edits go through [`MeshCommand`]s evaluated by an [`UndoExecutor`], which
//! keeps a bounded undo history and notifies subscribers. An
//! [`EditingSession`] ties the executor to its [`EditorConfig`] and derives
//! the [`LiquidCells`] decomposition of the free space around the polygons.

pub mod check;
pub mod command;
pub mod config;
pub mod construction;
pub mod editing;
pub mod error;
pub mod ids;
pub mod liquid;
pub mod mesh;
pub mod quadtree;
pub mod query;
pub mod session;
pub mod undo;

pub use command::{CommandOutput, MeshCommand, MeshExecutor, VertexStep};
pub use config::EditorConfig;
pub use editing::{PolygonCreator, TemporaryPolygon, VertexMover};
pub use error::{Error, Result};
pub use ids::{EdgeId, PolygonId, VertexId};
pub use liquid::{Cell, LiquidCells};
pub use mesh::{Edge, Mesh, Polygon, Vertex};
pub use quadtree::{QuadTree, DEFAULT_MIN_SIZE};
pub use session::EditingSession;
pub use undo::{SubscriptionId, UndoAvailability, UndoCommand, UndoExecutor};
