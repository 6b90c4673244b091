// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial lookups backed by the polygon quadtree.

use roommodel_geometry::{self as geometry, Area, Position};

use crate::ids::{PolygonId, VertexId};
use crate::mesh::Mesh;

impl Mesh {
    /// Live polygons whose bounds strictly overlap `area`, in ascending id
    /// order.
    pub fn polygons_overlapping(&self, area: &Area) -> Vec<PolygonId> {
        self.tree.overlapped_by(area)
    }

    /// Finds a polygon vertex exactly at `position`.
    ///
    /// Only vertices used by a polygon are found. Candidate polygons are
    /// visited in ascending id order, vertices in winding order.
    pub fn vertex_find(&self, position: Position) -> Option<VertexId> {
        self.tree
            .overlapped_by(&Area::around_point(position))
            .into_iter()
            .filter_map(|pid| self.polygons.get(&pid))
            .flat_map(|polygon| polygon.vertices.iter().copied())
            .find(|&v| self.vertex_position(v) == Some(position))
    }

    /// Finds the lowest-id polygon containing `position`.
    pub fn polygon_find(&self, position: Position) -> Option<PolygonId> {
        self.tree
            .overlapped_by(&Area::around_point(position))
            .into_iter()
            .find(|&pid| {
                self.polygon_positions(pid)
                    .is_some_and(|points| geometry::contains_point(&points, position))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_with_square() -> (Mesh, PolygonId) {
        let mut mesh = Mesh::new(Area::of(-100, 100, -100, 100));
        let vs: Vec<_> = [(0, 0), (10, 0), (10, 10), (0, 10)]
            .iter()
            .map(|&(x, y)| mesh.vertex_create(Position::new(x, y)))
            .collect();
        let p = mesh.polygon_create(&vs).unwrap();
        (mesh, p)
    }

    #[test]
    fn finds_vertex_by_exact_position() {
        let (mesh, _) = mesh_with_square();
        assert_eq!(mesh.vertex_find(Position::new(10, 10)), Some(VertexId(2)));
        assert_eq!(mesh.vertex_find(Position::new(10, 9)), None);
        assert_eq!(mesh.vertex_find(Position::new(50, 50)), None);
    }

    #[test]
    fn free_vertices_are_not_found() {
        let (mut mesh, _) = mesh_with_square();
        mesh.vertex_create(Position::new(5, 5));
        assert_eq!(mesh.vertex_find(Position::new(5, 5)), None);
    }

    #[test]
    fn finds_polygon_by_interior_point() {
        let (mesh, p) = mesh_with_square();
        assert_eq!(mesh.polygon_find(Position::new(5, 5)), Some(p));
        assert_eq!(mesh.polygon_find(Position::new(50, 5)), None);
    }

    #[test]
    fn lowest_id_wins() {
        let mut mesh = Mesh::new(Area::of(-100, 100, -100, 100));
        let a = mesh.vertex_create(Position::new(0, 0));
        let b = mesh.vertex_create(Position::new(10, 0));
        let c = mesh.vertex_create(Position::new(10, 10));
        let d = mesh.vertex_create(Position::new(0, 10));
        let p0 = mesh.polygon_create(&[a, b, c]).unwrap();
        let p1 = mesh.polygon_create(&[a, c, d]).unwrap();

        assert_eq!(mesh.vertex_find(Position::new(0, 0)), Some(a));
        assert_eq!(mesh.polygon_find(Position::new(8, 2)), Some(p0));
        assert_eq!(mesh.polygon_find(Position::new(2, 8)), Some(p1));
    }

    #[test]
    fn overlapping_query() {
        let (mesh, p) = mesh_with_square();
        assert_eq!(mesh.polygons_overlapping(&Area::of(5, 20, 5, 20)), vec![p]);
        assert!(mesh.polygons_overlapping(&Area::of(10, 20, 0, 10)).is_empty());
    }
}
