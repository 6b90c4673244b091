// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mutation methods for mesh entities.
//!
//! Every mutation validates completely before it writes anything: a call that
//! returns an error leaves the mesh untouched. On success the edge map, the
//! back-references and the polygon index are updated together.

use roommodel_geometry::{self as geometry, Area, Position};

use crate::error::{Error, Result};
use crate::ids::{EdgeId, PolygonId, VertexId};
use crate::mesh::{Edge, Mesh, Polygon, Vertex};

/// A vertex ring that passed validation, already in counter-clockwise order.
struct CheckedRing {
    vertices: Vec<VertexId>,
    bounds: Area,
}

impl Mesh {
    // --- Vertices ---

    /// Creates a vertex under a fresh id.
    ///
    /// Vertices are not bounds-checked; the bounds are enforced on the
    /// polygons that use them.
    pub fn vertex_create(&mut self, position: Position) -> VertexId {
        let highest = self.vertices.keys().next_back().map(|v| v.0);
        let id = VertexId(self.vertex_ids.fresh(highest));
        self.vertices.insert(id, Vertex::new(id, position));
        id
    }

    /// Creates a vertex under a caller-chosen id, replacing any tombstone
    /// with that id.
    pub fn vertex_create_with_id(&mut self, id: VertexId, position: Position) -> Result<VertexId> {
        if self.vertices.contains_key(&id) {
            return Err(Error::VertexDuplicate(id));
        }

        self.dead_vertices.remove(&id);
        self.vertex_ids.reserve(id.0);
        self.vertices.insert(id, Vertex::new(id, position));
        Ok(id)
    }

    /// Deletes a vertex that no polygon references.
    pub fn vertex_delete(&mut self, id: VertexId) -> Result<()> {
        let vertex = self
            .vertices
            .get(&id)
            .ok_or(Error::VertexNonexistent(id))?;
        if !vertex.polygons.is_empty() {
            return Err(Error::VertexReferenced(id));
        }

        self.bury_vertex(id);
        Ok(())
    }

    /// Moves a vertex, re-validating every polygon that uses it.
    ///
    /// Fails with [`Error::PolygonNotConvex`] if an affected polygon would
    /// become degenerate or non-convex, and with
    /// [`Error::PolygonOutsideBounds`] if it would leave the world bounds.
    pub fn vertex_set_position(&mut self, id: VertexId, position: Position) -> Result<()> {
        let vertex = self
            .vertices
            .get(&id)
            .ok_or(Error::VertexNonexistent(id))?;

        let mut affected: Vec<PolygonId> = vertex.polygons.iter().copied().collect();
        affected.sort_unstable();

        let mut rebounded = Vec::with_capacity(affected.len());
        for pid in affected {
            let polygon = self
                .polygons
                .get(&pid)
                .ok_or(Error::PolygonNonexistent(pid))?;
            let positions = polygon
                .vertices
                .iter()
                .map(|&v| {
                    if v == id {
                        Ok(position)
                    } else {
                        self.vertex_position(v).ok_or(Error::VertexNonexistent(v))
                    }
                })
                .collect::<Result<Vec<_>>>()?;

            if geometry::is_degenerate(&positions) || !geometry::is_convex(&positions) {
                return Err(Error::PolygonNotConvex(format!(
                    "moving vertex {id} to ({}, {}) breaks polygon {pid}",
                    position.x, position.y
                )));
            }
            let bounds = geometry::bounds(&positions).unwrap_or(polygon.bounds);
            if !self.bounds.contains(&bounds) {
                return Err(Error::PolygonOutsideBounds(format!(
                    "moving vertex {id} stretches polygon {pid} to {bounds}, room is {}",
                    self.bounds
                )));
            }
            rebounded.push((pid, bounds));
        }

        if let Some(vertex) = self.vertices.get_mut(&id) {
            vertex.position = position;
        }
        for (pid, bounds) in rebounded {
            self.tree.remove(pid);
            if let Some(polygon) = self.polygons.get_mut(&pid) {
                polygon.bounds = bounds;
            }
            self.tree.insert(pid, bounds);
        }
        Ok(())
    }

    // --- Polygons ---

    /// Creates a polygon from existing vertices under a fresh id.
    ///
    /// Clockwise input is reversed so that stored polygons wind
    /// counter-clockwise.
    pub fn polygon_create(&mut self, vertices: &[VertexId]) -> Result<PolygonId> {
        let ring = self.check_ring(vertices)?;
        let highest = self.polygons.keys().next_back().map(|p| p.0);
        let id = PolygonId(self.polygon_ids.fresh(highest));
        self.link_polygon(id, ring);
        Ok(id)
    }

    /// Creates a polygon under a caller-chosen id, replacing any tombstone
    /// with that id.
    pub fn polygon_create_with_id(
        &mut self,
        id: PolygonId,
        vertices: &[VertexId],
    ) -> Result<PolygonId> {
        if self.polygons.contains_key(&id) {
            return Err(Error::PolygonDuplicate(id));
        }

        let ring = self.check_ring(vertices)?;
        self.dead_polygons.remove(&id);
        self.polygon_ids.reserve(id.0);
        self.link_polygon(id, ring);
        Ok(id)
    }

    /// Deletes a polygon.
    ///
    /// Edges left without polygons are removed, and vertices left without
    /// polygons are deleted along with it.
    pub fn polygon_delete(&mut self, id: PolygonId) -> Result<()> {
        let mut polygon = self
            .polygons
            .remove(&id)
            .ok_or(Error::PolygonNonexistent(id))?;

        self.tree.remove(id);

        for edge_id in &polygon.edges {
            let orphaned = match self.edges.get_mut(edge_id) {
                Some(edge) => {
                    edge.polygons.remove(&id);
                    edge.polygons.is_empty()
                }
                None => false,
            };
            if orphaned {
                self.edges.remove(edge_id);
            }
        }

        for vertex_id in &polygon.vertices {
            let orphaned = match self.vertices.get_mut(vertex_id) {
                Some(vertex) => {
                    vertex.polygons.remove(&id);
                    vertex.polygons.is_empty()
                }
                None => false,
            };
            if orphaned {
                self.bury_vertex(*vertex_id);
            }
        }

        polygon.deleted = true;
        self.dead_polygons.insert(id, polygon);
        Ok(())
    }

    // --- Tombstones ---

    /// Drops all tombstones, returning how many were discarded.
    ///
    /// Ids stay reserved afterwards; fresh ids never go backwards.
    pub fn purge_tombstones(&mut self) -> usize {
        let count = self.tombstone_count();
        self.dead_vertices.clear();
        self.dead_polygons.clear();
        count
    }

    // --- Internals ---

    fn bury_vertex(&mut self, id: VertexId) {
        if let Some(mut vertex) = self.vertices.remove(&id) {
            vertex.deleted = true;
            self.dead_vertices.insert(id, vertex);
        }
    }

    /// Validates a prospective polygon without touching the mesh.
    fn check_ring(&self, vertices: &[VertexId]) -> Result<CheckedRing> {
        if vertices.len() < 3 {
            return Err(Error::PolygonTooFewVertices(vertices.len()));
        }

        let positions = vertices
            .iter()
            .map(|&v| self.vertex_position(v).ok_or(Error::VertexNonexistent(v)))
            .collect::<Result<Vec<_>>>()?;

        let repeated = vertices
            .iter()
            .enumerate()
            .any(|(i, v)| vertices[i + 1..].contains(v));
        if repeated || geometry::is_degenerate(&positions) {
            return Err(Error::PolygonNotConvex(format!(
                "vertices {} do not enclose an area",
                list_ids(vertices)
            )));
        }
        if !geometry::is_convex(&positions) {
            return Err(Error::PolygonNotConvex(format!(
                "vertices {} turn both ways",
                list_ids(vertices)
            )));
        }

        let mut ordered = vertices.to_vec();
        if geometry::is_clockwise_order(&positions) {
            ordered.reverse();
        }

        let bounds = geometry::bounds(&positions)
            .ok_or(Error::PolygonTooFewVertices(vertices.len()))?;
        if !self.bounds.contains(&bounds) {
            return Err(Error::PolygonOutsideBounds(format!(
                "polygon bounds {bounds} exceed room {}",
                self.bounds
            )));
        }

        Ok(CheckedRing {
            vertices: ordered,
            bounds,
        })
    }

    /// Inserts a validated polygon and wires up edges, back-references and
    /// the spatial index.
    fn link_polygon(&mut self, id: PolygonId, ring: CheckedRing) {
        let n = ring.vertices.len();
        let mut edges = Vec::with_capacity(n);

        for i in 0..n {
            let a = ring.vertices[i];
            let b = ring.vertices[(i + 1) % n];
            let edge_id = EdgeId::new(a, b);
            self.edges
                .entry(edge_id)
                .or_insert_with(|| Edge {
                    id: edge_id,
                    vertex0: a,
                    vertex1: b,
                    polygons: Default::default(),
                })
                .polygons
                .insert(id);
            edges.push(edge_id);
        }

        for v in &ring.vertices {
            if let Some(vertex) = self.vertices.get_mut(v) {
                vertex.polygons.insert(id);
            }
        }

        self.tree.insert(id, ring.bounds);
        self.polygons.insert(
            id,
            Polygon {
                id,
                vertices: ring.vertices,
                edges,
                bounds: ring.bounds,
                deleted: false,
            },
        );
    }
}

fn list_ids(ids: &[VertexId]) -> String {
    let parts: Vec<String> = ids.iter().map(VertexId::to_string).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Area {
        Area::of(-2048, 2048, -2048, 2048)
    }

    fn triangle(mesh: &mut Mesh) -> [VertexId; 3] {
        [
            mesh.vertex_create(Position::new(0, 1)),
            mesh.vertex_create(Position::new(0, 0)),
            mesh.vertex_create(Position::new(1, 0)),
        ]
    }

    #[test]
    fn create_triangle() {
        let mut mesh = Mesh::new(world());
        let vs = triangle(&mut mesh);
        let p = mesh.polygon_create(&vs).unwrap();

        assert_eq!(mesh.polygon(p).unwrap().vertices(), &vs);
        assert_eq!(mesh.edge_count(), 3);
        for v in vs {
            assert!(mesh.vertex(v).unwrap().polygons().contains(&p));
        }
        assert!(mesh.check().is_empty());
    }

    #[test]
    fn clockwise_input_is_reversed() {
        let mut mesh = Mesh::new(world());
        let [a, b, c] = triangle(&mut mesh);
        let p = mesh.polygon_create(&[c, b, a]).unwrap();

        let stored = mesh.polygon_positions(p).unwrap();
        assert!(!geometry::is_clockwise_order(&stored));
        assert_eq!(mesh.polygon(p).unwrap().vertices(), &[a, b, c]);
    }

    #[test]
    fn too_few_vertices() {
        let mut mesh = Mesh::new(world());
        let [a, b, _] = triangle(&mut mesh);
        assert_eq!(
            mesh.polygon_create(&[a, b]),
            Err(Error::PolygonTooFewVertices(2))
        );
        assert_eq!(mesh.polygon_count(), 0);
    }

    #[test]
    fn unknown_vertex() {
        let mut mesh = Mesh::new(world());
        let [a, b, _] = triangle(&mut mesh);
        assert_eq!(
            mesh.polygon_create(&[a, b, VertexId(99)]),
            Err(Error::VertexNonexistent(VertexId(99)))
        );
    }

    #[test]
    fn bow_tie_is_rejected_without_side_effects() {
        let mut mesh = Mesh::new(world());
        let vs: Vec<_> = [(0, 1), (0, 0), (1, 1), (1, 0)]
            .iter()
            .map(|&(x, y)| mesh.vertex_create(Position::new(x, y)))
            .collect();

        assert!(matches!(
            mesh.polygon_create(&vs),
            Err(Error::PolygonNotConvex(_))
        ));
        assert_eq!(mesh.polygon_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
        assert!(mesh.polygon_tree().is_empty());
    }

    #[test]
    fn repeated_and_collinear_vertices_are_rejected() {
        let mut mesh = Mesh::new(world());
        let [a, b, _] = triangle(&mut mesh);
        assert!(matches!(
            mesh.polygon_create(&[a, b, a]),
            Err(Error::PolygonNotConvex(_))
        ));

        let c0 = mesh.vertex_create(Position::new(10, 10));
        let c1 = mesh.vertex_create(Position::new(20, 20));
        let c2 = mesh.vertex_create(Position::new(30, 30));
        assert!(matches!(
            mesh.polygon_create(&[c0, c1, c2]),
            Err(Error::PolygonNotConvex(_))
        ));
    }

    #[test]
    fn outside_bounds() {
        let mut mesh = Mesh::new(Area::of(0, 100, 0, 100));
        let a = mesh.vertex_create(Position::new(0, 0));
        let b = mesh.vertex_create(Position::new(200, 0));
        let c = mesh.vertex_create(Position::new(0, 50));
        assert!(matches!(
            mesh.polygon_create(&[a, b, c]),
            Err(Error::PolygonOutsideBounds(_))
        ));
    }

    #[test]
    fn polygon_touching_room_edge_fits() {
        let mut mesh = Mesh::new(Area::of(0, 100, 0, 100));
        let a = mesh.vertex_create(Position::new(0, 0));
        let b = mesh.vertex_create(Position::new(100, 0));
        let c = mesh.vertex_create(Position::new(100, 100));
        assert!(mesh.polygon_create(&[a, b, c]).is_ok());
    }

    #[test]
    fn shared_edge_is_internal() {
        let mut mesh = Mesh::new(world());
        let a = mesh.vertex_create(Position::new(0, 0));
        let b = mesh.vertex_create(Position::new(10, 0));
        let c = mesh.vertex_create(Position::new(10, 10));
        let d = mesh.vertex_create(Position::new(0, 10));
        let p0 = mesh.polygon_create(&[a, b, c]).unwrap();
        let p1 = mesh.polygon_create(&[a, c, d]).unwrap();

        assert_eq!(mesh.edge_count(), 5);
        let diagonal = mesh.edge_between(a, c).unwrap();
        assert!(!diagonal.is_external());
        assert_eq!(mesh.polygon_edges_external(p0).unwrap().len(), 2);

        mesh.polygon_delete(p1).unwrap();
        assert!(mesh.edge_between(a, c).unwrap().is_external());
        assert!(mesh.edge_between(c, d).is_none());
        assert!(!mesh.contains_vertex(d));
        assert!(mesh.contains_vertex(c));
        assert!(mesh.check().is_empty());
    }

    #[test]
    fn duplicate_ids() {
        let mut mesh = Mesh::new(world());
        let vs = triangle(&mut mesh);
        let p = mesh.polygon_create(&vs).unwrap();

        assert_eq!(
            mesh.vertex_create_with_id(vs[0], Position::new(5, 5)),
            Err(Error::VertexDuplicate(vs[0]))
        );
        assert_eq!(
            mesh.polygon_create_with_id(p, &vs),
            Err(Error::PolygonDuplicate(p))
        );
    }

    #[test]
    fn recreate_with_id_replaces_tombstone() {
        let mut mesh = Mesh::new(world());
        let vs = triangle(&mut mesh);
        let p = mesh.polygon_create(&vs).unwrap();
        mesh.polygon_delete(p).unwrap();
        assert_eq!(mesh.tombstone_count(), 4);

        for (v, pos) in vs.iter().zip([(0, 1), (0, 0), (1, 0)]) {
            mesh.vertex_create_with_id(*v, Position::new(pos.0, pos.1)).unwrap();
        }
        assert_eq!(mesh.polygon_create_with_id(p, &vs), Ok(p));
        assert_eq!(mesh.tombstone_count(), 0);
        assert!(!mesh.polygon(p).unwrap().is_deleted());
        assert!(mesh.check().is_empty());
    }

    #[test]
    fn ids_are_never_reused() {
        let mut mesh = Mesh::new(world());
        let vs = triangle(&mut mesh);
        let p = mesh.polygon_create(&vs).unwrap();
        mesh.polygon_delete(p).unwrap();
        assert_eq!(mesh.purge_tombstones(), 4);

        let fresh = triangle(&mut mesh);
        assert!(fresh.iter().all(|v| v.0 > vs[2].0));
        let q = mesh.polygon_create(&fresh).unwrap();
        assert!(q > p);
    }

    #[test]
    fn vertex_with_explicit_id_advances_counter() {
        let mut mesh = Mesh::new(world());
        mesh.vertex_create_with_id(VertexId(40), Position::new(0, 0))
            .unwrap();
        assert_eq!(mesh.vertex_create(Position::new(1, 1)), VertexId(41));
    }

    #[test]
    fn vertex_delete_requires_orphan() {
        let mut mesh = Mesh::new(world());
        let vs = triangle(&mut mesh);
        mesh.polygon_create(&vs).unwrap();
        let lonely = mesh.vertex_create(Position::new(50, 50));

        assert_eq!(mesh.vertex_delete(vs[0]), Err(Error::VertexReferenced(vs[0])));
        assert_eq!(mesh.vertex_delete(lonely), Ok(()));
        assert!(mesh.vertex(lonely).unwrap().is_deleted());
        assert_eq!(
            mesh.vertex_delete(lonely),
            Err(Error::VertexNonexistent(lonely))
        );
    }

    #[test]
    fn move_vertex_updates_bounds_and_index() {
        let mut mesh = Mesh::new(world());
        let vs = triangle(&mut mesh);
        let p = mesh.polygon_create(&vs).unwrap();

        mesh.vertex_set_position(vs[2], Position::new(30, 0)).unwrap();
        assert_eq!(mesh.vertex_position(vs[2]), Some(Position::new(30, 0)));
        assert_eq!(mesh.polygon(p).unwrap().bounds(), Area::of(0, 30, 0, 1));
        assert_eq!(mesh.polygon_tree().item_bounds(p), Some(Area::of(0, 30, 0, 1)));
        assert!(mesh.check().is_empty());
    }

    #[test]
    fn move_vertex_rejects_non_convex() {
        let mut mesh = Mesh::new(world());
        let a = mesh.vertex_create(Position::new(0, 0));
        let b = mesh.vertex_create(Position::new(10, 0));
        let c = mesh.vertex_create(Position::new(10, 10));
        let d = mesh.vertex_create(Position::new(0, 10));
        mesh.polygon_create(&[a, b, c, d]).unwrap();

        let err = mesh.vertex_set_position(c, Position::new(5, 2)).unwrap_err();
        assert!(matches!(err, Error::PolygonNotConvex(_)));
        assert_eq!(mesh.vertex_position(c), Some(Position::new(10, 10)));
    }

    #[test]
    fn move_vertex_checks_every_polygon_before_writing() {
        let mut mesh = Mesh::new(world());
        let a = mesh.vertex_create(Position::new(0, 0));
        let b = mesh.vertex_create(Position::new(10, 0));
        let c = mesh.vertex_create(Position::new(10, 10));
        let d = mesh.vertex_create(Position::new(0, 10));
        let e = mesh.vertex_create(Position::new(20, 5));
        // The triangle is validated first and would accept the move.
        let wedge = mesh.polygon_create(&[b, e, c]).unwrap();
        let square = mesh.polygon_create(&[a, b, c, d]).unwrap();

        let err = mesh.vertex_set_position(c, Position::new(5, 2)).unwrap_err();
        assert!(matches!(err, Error::PolygonNotConvex(_)));

        assert_eq!(mesh.vertex_position(c), Some(Position::new(10, 10)));
        assert_eq!(mesh.polygon(wedge).unwrap().bounds(), Area::of(10, 20, 0, 10));
        assert_eq!(mesh.polygon_tree().item_bounds(wedge), Some(Area::of(10, 20, 0, 10)));
        assert_eq!(mesh.polygon_tree().item_bounds(square), Some(Area::of(0, 10, 0, 10)));
        assert!(mesh.check().is_empty());
    }

    #[test]
    fn full_i32_room_accepts_extreme_polygon() {
        let (lo, hi) = (i32::MIN, i32::MAX);
        let mut mesh = Mesh::new(Area::of(lo, hi, lo, hi));
        let vs = [
            mesh.vertex_create(Position::new(lo, lo)),
            mesh.vertex_create(Position::new(hi, lo)),
            mesh.vertex_create(Position::new(hi, hi)),
        ];
        let p = mesh.polygon_create(&vs).unwrap();

        assert_eq!(mesh.polygon(p).unwrap().bounds(), Area::of(lo, hi, lo, hi));
        assert_eq!(mesh.polygon_find(Position::new(hi - 1, 0)), Some(p));
        assert_eq!(mesh.vertex_find(Position::new(hi, hi)), Some(vs[2]));
        assert!(mesh.check().is_empty());
    }

    #[test]
    fn move_vertex_rejects_leaving_room() {
        let mut mesh = Mesh::new(Area::of(0, 100, 0, 100));
        let a = mesh.vertex_create(Position::new(0, 0));
        let b = mesh.vertex_create(Position::new(10, 0));
        let c = mesh.vertex_create(Position::new(0, 10));
        mesh.polygon_create(&[a, b, c]).unwrap();

        let err = mesh.vertex_set_position(b, Position::new(150, 0)).unwrap_err();
        assert!(matches!(err, Error::PolygonOutsideBounds(_)));
        assert_eq!(mesh.vertex_position(b), Some(Position::new(10, 0)));
    }

    #[test]
    fn free_vertex_moves_anywhere() {
        let mut mesh = Mesh::new(Area::of(0, 100, 0, 100));
        let v = mesh.vertex_create(Position::new(0, 0));
        assert!(mesh.vertex_set_position(v, Position::new(500, 500)).is_ok());
        assert_eq!(
            mesh.vertex_set_position(VertexId(9), Position::new(0, 0)),
            Err(Error::VertexNonexistent(VertexId(9)))
        );
    }

    #[test]
    fn delete_unknown_polygon() {
        let mut mesh = Mesh::new(world());
        assert_eq!(
            mesh.polygon_delete(PolygonId(3)),
            Err(Error::PolygonNonexistent(PolygonId(3)))
        );
    }
}
