// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consistency audit for a mesh.
//!
//! [`Mesh::check`] walks every store and cross-reference and reports what it
//! finds as plain strings. It never fails and never mutates; an empty result
//! means the mesh is consistent.

use roommodel_geometry as geometry;

use crate::ids::{EdgeId, PolygonId, VertexId};
use crate::mesh::Mesh;

impl Mesh {
    /// Audits the mesh, returning one line per inconsistency found.
    pub fn check(&self) -> Vec<String> {
        let mut problems = Vec::new();
        self.check_vertices(&mut problems);
        self.check_polygons(&mut problems);
        self.check_edges(&mut problems);
        self.check_index(&mut problems);
        problems
    }

    fn describe_missing_polygon(&self, id: PolygonId) -> &'static str {
        if self.dead_polygons.contains_key(&id) {
            "deleted"
        } else {
            "nonexistent"
        }
    }

    fn describe_missing_vertex(&self, id: VertexId) -> &'static str {
        if self.dead_vertices.contains_key(&id) {
            "deleted"
        } else {
            "nonexistent"
        }
    }

    fn check_vertices(&self, problems: &mut Vec<String>) {
        for vertex in self.vertices.values() {
            let id = vertex.id;
            if vertex.deleted {
                problems.push(format!("live vertex {id} is marked deleted"));
            }

            for &pid in &vertex.polygons {
                match self.polygons.get(&pid) {
                    Some(polygon) if !polygon.vertices.contains(&id) => problems.push(format!(
                        "vertex {id} references polygon {pid} which does not use it"
                    )),
                    Some(_) => {}
                    None => problems.push(format!(
                        "vertex {id} references {} polygon {pid}",
                        self.describe_missing_polygon(pid)
                    )),
                }
            }

            if vertex.polygons.is_empty() {
                if let Some(edge) = self.edges.keys().find(|e| e.touches(id)) {
                    problems.push(format!(
                        "vertex {id} is unreferenced but still connected by edge {edge}"
                    ));
                }
            } else if !self.bounds.contains_point(vertex.position) {
                problems.push(format!(
                    "vertex {id} at ({}, {}) is outside the room {}",
                    vertex.position.x, vertex.position.y, self.bounds
                ));
            }
        }

        for (id, vertex) in &self.dead_vertices {
            if !vertex.deleted {
                problems.push(format!("vertex tombstone {id} is not marked deleted"));
            }
        }
    }

    fn check_polygons(&self, problems: &mut Vec<String>) {
        for polygon in self.polygons.values() {
            let id = polygon.id;
            if polygon.deleted {
                problems.push(format!("live polygon {id} is marked deleted"));
            }

            let mut positions = Vec::with_capacity(polygon.vertices.len());
            for &v in &polygon.vertices {
                match self.vertices.get(&v) {
                    Some(vertex) => {
                        if !vertex.polygons.contains(&id) {
                            problems.push(format!(
                                "polygon {id} uses vertex {v} which does not reference it"
                            ));
                        }
                        positions.push(vertex.position);
                    }
                    None => problems.push(format!(
                        "polygon {id} references {} vertex {v}",
                        self.describe_missing_vertex(v)
                    )),
                }
            }

            let n = polygon.vertices.len();
            if polygon.edges.len() != n {
                problems.push(format!(
                    "polygon {id} has {n} vertices but {} edges",
                    polygon.edges.len()
                ));
            }
            for (i, &edge_id) in polygon.edges.iter().enumerate() {
                if n > 0 && edge_id != EdgeId::new(polygon.vertices[i % n], polygon.vertices[(i + 1) % n]) {
                    problems.push(format!("polygon {id} edge {i} ({edge_id}) is out of order"));
                }
                match self.edges.get(&edge_id) {
                    Some(edge) if !edge.polygons.contains(&id) => problems.push(format!(
                        "polygon {id} uses edge {edge_id} which does not reference it"
                    )),
                    Some(_) => {}
                    None => problems.push(format!(
                        "polygon {id} references nonexistent edge {edge_id}"
                    )),
                }
            }

            if positions.len() == n {
                if geometry::is_degenerate(&positions) || !geometry::is_convex(&positions) {
                    problems.push(format!("polygon {id} is not convex"));
                }
                if geometry::bounds(&positions) != Some(polygon.bounds) {
                    problems.push(format!(
                        "polygon {id} stores bounds {} that do not match its vertices",
                        polygon.bounds
                    ));
                }
            }
            if !self.bounds.contains(&polygon.bounds) {
                problems.push(format!("polygon {id} is outside the room {}", self.bounds));
            }
        }

        for (id, polygon) in &self.dead_polygons {
            if !polygon.deleted {
                problems.push(format!("polygon tombstone {id} is not marked deleted"));
            }
        }
    }

    fn check_edges(&self, problems: &mut Vec<String>) {
        for (key, edge) in &self.edges {
            if *key != edge.id || edge.id != EdgeId::new(edge.vertex0, edge.vertex1) {
                problems.push(format!("edge {key} is stored under the wrong key"));
            }
            if edge.polygons.is_empty() {
                problems.push(format!("edge {key} borders no polygon"));
            }
            for v in [edge.vertex0, edge.vertex1] {
                if !self.vertices.contains_key(&v) {
                    problems.push(format!(
                        "edge {key} references {} vertex {v}",
                        self.describe_missing_vertex(v)
                    ));
                }
            }
            for &pid in &edge.polygons {
                match self.polygons.get(&pid) {
                    Some(polygon) if !polygon.edges.contains(key) => problems.push(format!(
                        "edge {key} references polygon {pid} which does not use it"
                    )),
                    Some(_) => {}
                    None => problems.push(format!(
                        "edge {key} references {} polygon {pid}",
                        self.describe_missing_polygon(pid)
                    )),
                }
            }
        }
    }

    fn check_index(&self, problems: &mut Vec<String>) {
        if self.tree.len() != self.polygons.len() {
            problems.push(format!(
                "quadtree holds {} items but the mesh has {} polygons",
                self.tree.len(),
                self.polygons.len()
            ));
        }
        for polygon in self.polygons.values() {
            match self.tree.item_bounds(polygon.id) {
                Some(bounds) if bounds == polygon.bounds => {}
                Some(bounds) => problems.push(format!(
                    "quadtree holds polygon {} under stale bounds {bounds}",
                    polygon.id
                )),
                None => problems.push(format!("polygon {} is missing from the quadtree", polygon.id)),
            }
        }
        for (pid, _) in self.tree.items() {
            if !self.polygons.contains_key(&pid) {
                problems.push(format!(
                    "quadtree holds {} polygon {pid}",
                    self.describe_missing_polygon(pid)
                ));
            }
        }
    }
}
