// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Storage for the planar polygon mesh.
//!
//! The [`Mesh`] is the central owner of all vertices, edges and polygons.
//! Entities live in id-keyed maps and refer to each other only by id:
//! polygons list their vertex and edge ids, while vertices and edges keep the
//! upward back-references (which polygons use them) that make cascading
//! deletion and traversal cheap.
//!
//! ## Tombstones
//!
//! Deleted vertices and polygons are moved to tombstone maps rather than
//! forgotten. Their ids stay reserved forever and their last state remains
//! inspectable through [`Mesh::vertex`] and [`Mesh::polygon`], with
//! `is_deleted()` returning `true`.

use std::collections::BTreeMap;

use nalgebra::{Point2, Vector2};
use rustc_hash::{FxHashMap, FxHashSet};

use roommodel_geometry::{self as geometry, Area, Position};

use crate::ids::{EdgeId, IdCounter, PolygonId, VertexId};
use crate::quadtree::{QuadTree, DEFAULT_MIN_SIZE};

/// A mesh vertex: a position plus the set of polygons using it.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub(crate) id: VertexId,
    pub(crate) position: Position,
    pub(crate) polygons: FxHashSet<PolygonId>,
    pub(crate) deleted: bool,
}

impl Vertex {
    pub(crate) fn new(id: VertexId, position: Position) -> Self {
        Self {
            id,
            position,
            polygons: FxHashSet::default(),
            deleted: false,
        }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Polygons currently referencing this vertex.
    pub fn polygons(&self) -> &FxHashSet<PolygonId> {
        &self.polygons
    }

    /// Returns `true` once the vertex has been removed from the mesh.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// An edge between two vertices, shared by the polygons that border it.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) vertex0: VertexId,
    pub(crate) vertex1: VertexId,
    pub(crate) polygons: FxHashSet<PolygonId>,
}

impl Edge {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// First vertex, in the orientation the edge was created with.
    pub fn vertex0(&self) -> VertexId {
        self.vertex0
    }

    /// Second vertex, in the orientation the edge was created with.
    pub fn vertex1(&self) -> VertexId {
        self.vertex1
    }

    /// Polygons currently bordering this edge.
    pub fn polygons(&self) -> &FxHashSet<PolygonId> {
        &self.polygons
    }

    /// An edge is external if fewer than two polygons border it.
    pub fn is_external(&self) -> bool {
        self.polygons.len() < 2
    }
}

/// A convex polygon: an ordered ring of vertices.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub(crate) id: PolygonId,
    pub(crate) vertices: Vec<VertexId>,
    pub(crate) edges: Vec<EdgeId>,
    pub(crate) bounds: Area,
    pub(crate) deleted: bool,
}

impl Polygon {
    pub fn id(&self) -> PolygonId {
        self.id
    }

    /// Vertex ids in winding order.
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Edge ids in winding order; edge `i` joins vertex `i` to vertex `i + 1`.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Bounds of the polygon's vertex positions.
    pub fn bounds(&self) -> Area {
        self.bounds
    }

    /// Returns `true` once the polygon has been removed from the mesh.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// A planar mesh of convex polygons inside fixed world bounds.
///
/// # Example
///
/// ```
/// use roommodel_geometry::{Area, Position};
/// use roommodel_mesh::Mesh;
///
/// let mut mesh = Mesh::new(Area::of(-2048, 2048, -2048, 2048));
/// let v0 = mesh.vertex_create(Position::new(0, 1));
/// let v1 = mesh.vertex_create(Position::new(0, 0));
/// let v2 = mesh.vertex_create(Position::new(1, 0));
/// let p = mesh.polygon_create(&[v0, v1, v2]).unwrap();
///
/// assert_eq!(mesh.polygon_count(), 1);
/// assert!(mesh.polygon(p).unwrap().edges().iter().all(|&e| mesh.edge(e).unwrap().is_external()));
/// ```
#[derive(Debug, Clone)]
pub struct Mesh {
    // World bounds, immutable for the life of the mesh
    pub(crate) bounds: Area,

    // Live entities
    pub(crate) vertices: BTreeMap<VertexId, Vertex>,
    pub(crate) polygons: BTreeMap<PolygonId, Polygon>,
    pub(crate) edges: FxHashMap<EdgeId, Edge>,

    // Tombstones
    pub(crate) dead_vertices: FxHashMap<VertexId, Vertex>,
    pub(crate) dead_polygons: FxHashMap<PolygonId, Polygon>,

    pub(crate) tree: QuadTree,

    pub(crate) vertex_ids: IdCounter,
    pub(crate) polygon_ids: IdCounter,
}

impl Mesh {
    /// Creates an empty mesh covering `bounds`.
    pub fn new(bounds: Area) -> Self {
        Self::with_index_leaf_size(bounds, DEFAULT_MIN_SIZE)
    }

    /// Creates an empty mesh whose polygon index never splits below
    /// `leaf_size` units.
    pub fn with_index_leaf_size(bounds: Area, leaf_size: i32) -> Self {
        Self {
            bounds,
            vertices: BTreeMap::new(),
            polygons: BTreeMap::new(),
            edges: FxHashMap::default(),
            dead_vertices: FxHashMap::default(),
            dead_polygons: FxHashMap::default(),
            tree: QuadTree::new(bounds, leaf_size),
            vertex_ids: IdCounter::default(),
            polygon_ids: IdCounter::default(),
        }
    }

    /// The world bounds all polygons must fit into.
    pub fn bounds(&self) -> Area {
        self.bounds
    }

    /// The spatial index over live polygon bounds.
    pub fn polygon_tree(&self) -> &QuadTree {
        &self.tree
    }

    // --- Vertex access ---

    /// Returns a live vertex or a vertex tombstone.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices
            .get(&id)
            .or_else(|| self.dead_vertices.get(&id))
    }

    /// Returns `true` if the vertex is live.
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// Live vertices in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Position of a live vertex.
    pub fn vertex_position(&self, id: VertexId) -> Option<Position> {
        self.vertices.get(&id).map(|v| v.position)
    }

    // --- Polygon access ---

    /// Returns a live polygon or a polygon tombstone.
    pub fn polygon(&self, id: PolygonId) -> Option<&Polygon> {
        self.polygons
            .get(&id)
            .or_else(|| self.dead_polygons.get(&id))
    }

    /// Returns `true` if the polygon is live.
    pub fn contains_polygon(&self, id: PolygonId) -> bool {
        self.polygons.contains_key(&id)
    }

    /// Live polygons in ascending id order.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> + '_ {
        self.polygons.values()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Vertex positions of a live polygon, in winding order.
    pub fn polygon_positions(&self, id: PolygonId) -> Option<Vec<Position>> {
        let polygon = self.polygons.get(&id)?;
        polygon
            .vertices
            .iter()
            .map(|v| self.vertex_position(*v))
            .collect()
    }

    /// The external edges of a live polygon, in winding order.
    pub fn polygon_edges_external(&self, id: PolygonId) -> Option<Vec<EdgeId>> {
        let polygon = self.polygons.get(&id)?;
        Some(
            polygon
                .edges
                .iter()
                .copied()
                .filter(|e| self.edges.get(e).is_some_and(Edge::is_external))
                .collect(),
        )
    }

    /// Mean of a live polygon's vertex positions.
    pub fn polygon_barycenter(&self, id: PolygonId) -> Option<Point2<f64>> {
        self.polygon_positions(id)
            .map(|positions| geometry::barycenter(&positions))
    }

    // --- Edge access ---

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Returns the edge joining two vertices, in either direction.
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<&Edge> {
        self.edges.get(&EdgeId::new(a, b))
    }

    /// Live edges, in no particular order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// End positions of an edge in its `vertex0 -> vertex1` orientation.
    pub fn edge_positions(&self, id: EdgeId) -> Option<(Position, Position)> {
        let edge = self.edges.get(&id)?;
        Some((
            self.vertex_position(edge.vertex0)?,
            self.vertex_position(edge.vertex1)?,
        ))
    }

    /// Unit normal of an edge in its `vertex0 -> vertex1` orientation.
    pub fn edge_normal(&self, id: EdgeId) -> Option<Vector2<f64>> {
        self.edge_positions(id)
            .map(|(p0, p1)| geometry::edge_normal(p0, p1))
    }

    /// Bounds of an edge.
    pub fn edge_bounds(&self, id: EdgeId) -> Option<Area> {
        self.edge_positions(id)
            .map(|(p0, p1)| geometry::edge_bounds(p0, p1))
    }

    // --- Tombstones ---

    /// Number of deleted vertices and polygons still held as tombstones.
    pub fn tombstone_count(&self) -> usize {
        self.dead_vertices.len() + self.dead_polygons.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Area {
        Area::of(-2048, 2048, -2048, 2048)
    }

    #[test]
    fn new_mesh_is_empty() {
        let mesh = Mesh::new(world());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.polygon_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
        assert_eq!(mesh.tombstone_count(), 0);
        assert_eq!(mesh.bounds(), world());
        assert!(mesh.polygon_tree().is_empty());
    }

    #[test]
    fn polygon_read_path() {
        let mut mesh = Mesh::new(world());
        let v0 = mesh.vertex_create(Position::new(0, 0));
        let v1 = mesh.vertex_create(Position::new(4, 0));
        let v2 = mesh.vertex_create(Position::new(4, 4));
        let v3 = mesh.vertex_create(Position::new(0, 4));
        let p = mesh.polygon_create(&[v0, v1, v2, v3]).unwrap();

        assert_eq!(
            mesh.polygon_positions(p).unwrap(),
            vec![
                Position::new(0, 0),
                Position::new(4, 0),
                Position::new(4, 4),
                Position::new(0, 4)
            ]
        );
        assert_eq!(mesh.polygon(p).unwrap().bounds(), Area::of(0, 4, 0, 4));
        assert_eq!(mesh.polygon_barycenter(p), Some(Point2::new(2.0, 2.0)));
        assert_eq!(mesh.polygon_edges_external(p).unwrap().len(), 4);
        assert_eq!(mesh.polygon_tree().item_bounds(p), Some(Area::of(0, 4, 0, 4)));
    }

    #[test]
    fn edge_read_path() {
        let mut mesh = Mesh::new(world());
        let v0 = mesh.vertex_create(Position::new(0, 10));
        let v1 = mesh.vertex_create(Position::new(0, 0));
        let v2 = mesh.vertex_create(Position::new(10, 0));
        mesh.polygon_create(&[v0, v1, v2]).unwrap();

        let edge = mesh.edge_between(v1, v0).unwrap();
        assert_eq!(edge.vertex0(), v0);
        assert_eq!(edge.vertex1(), v1);
        assert_eq!(mesh.edge_bounds(edge.id()), Some(Area::of(0, 0, 0, 10)));

        let n = mesh.edge_normal(edge.id()).unwrap();
        assert_eq!(n, Vector2::new(1.0, 0.0));
    }

    #[test]
    fn tombstones_stay_inspectable() {
        let mut mesh = Mesh::new(world());
        let v0 = mesh.vertex_create(Position::new(0, 1));
        let v1 = mesh.vertex_create(Position::new(0, 0));
        let v2 = mesh.vertex_create(Position::new(1, 0));
        let p = mesh.polygon_create(&[v0, v1, v2]).unwrap();
        mesh.polygon_delete(p).unwrap();

        assert!(!mesh.contains_polygon(p));
        assert!(mesh.polygon(p).unwrap().is_deleted());
        assert_eq!(mesh.polygon(p).unwrap().vertices(), &[v0, v1, v2]);
        assert!(mesh.vertex(v0).unwrap().is_deleted());
        assert_eq!(mesh.vertex(v0).unwrap().position(), Position::new(0, 1));
        assert_eq!(mesh.vertex_position(v0), None);
        assert_eq!(mesh.tombstone_count(), 4);
    }
}
