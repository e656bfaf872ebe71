// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric queries on boundary entities.
//!
//! Computes lengths, areas, normals and supporting planes using standard
//! computational geometry (no external kernel required). Area queries accept
//! an optional [`Transform`] so a face can be measured as placed in the model
//! without materialising transformed copies.

use nalgebra::{Point3, Vector3};

use crate::arena::TopologyArena;
use crate::keys::*;
use crate::predicates::Plane;
use crate::transform::Transform;

impl TopologyArena {
    /// Returns the 3D position of a vertex as a nalgebra Point3.
    pub fn vertex_point(&self, key: VertexKey) -> Option<Point3<f64>> {
        self.vertices
            .get(key)
            .map(|v| Point3::new(v.x, v.y, v.z))
    }

    /// Computes the Euclidean length of an edge.
    pub fn edge_length(&self, key: EdgeKey) -> Option<f64> {
        let edge = self.edges.get(key)?;
        let p0 = self.vertex_point(edge.start)?;
        let p1 = self.vertex_point(edge.end)?;
        Some((p1 - p0).norm())
    }

    /// Computes the face normal using Newell's method.
    ///
    /// Works for any planar polygon (convex or concave). The normal direction
    /// follows the right-hand rule relative to the outer loop winding.
    pub fn face_normal(&self, key: FaceKey) -> Option<Vector3<f64>> {
        let face = self.faces.get(key)?;
        let points = self.loop_points(face.outer_loop, None)?;

        if points.len() < 3 {
            return None;
        }

        let mut normal = Vector3::new(0.0, 0.0, 0.0);
        let n = points.len();

        for i in 0..n {
            let curr = points[i];
            let next = points[(i + 1) % n];

            normal.x += (curr.y - next.y) * (curr.z + next.z);
            normal.y += (curr.z - next.z) * (curr.x + next.x);
            normal.z += (curr.x - next.x) * (curr.y + next.y);
        }

        let len = normal.norm();
        if len < 1e-15 {
            return None; // degenerate face
        }

        Some(normal / len)
    }

    /// Returns the supporting plane of a face.
    pub fn face_plane(&self, key: FaceKey) -> Option<Plane> {
        self.face_plane_with(key, None)
    }

    /// Returns the supporting plane of a face after applying a transform.
    pub fn face_plane_with(&self, key: FaceKey, transform: Option<&Transform>) -> Option<Plane> {
        let normal = self.face_normal(key)?;
        let face = self.faces.get(key)?;
        let first = *self.loop_points(face.outer_loop, transform)?.first()?;
        let normal = match transform {
            Some(t) => t.apply_normal(&normal)?,
            None => normal,
        };
        Some(Plane::new(first, normal))
    }

    /// Computes the net area of a face (outer loop minus holes).
    pub fn face_area(&self, key: FaceKey) -> Option<f64> {
        self.face_area_with(key, None)
    }

    /// Computes the net area of a face as it appears under `transform`.
    ///
    /// Rigid motions leave the area unchanged; scaling and shearing do not.
    pub fn face_area_with(&self, key: FaceKey, transform: Option<&Transform>) -> Option<f64> {
        let face = self.faces.get(key)?;

        let mut total = self.loop_area(face.outer_loop, transform)?;
        for &il in &face.inner_loops {
            if let Some(hole_area) = self.loop_area(il, transform) {
                total -= hole_area;
            }
        }

        Some(total.abs())
    }

    /// Computes the area enclosed by a loop (assumes planar polygon).
    pub fn loop_area(&self, key: LoopKey, transform: Option<&Transform>) -> Option<f64> {
        let points = self.loop_points(key, transform)?;

        if points.len() < 3 {
            return Some(0.0);
        }

        // Sum of triangle-fan cross products from vertex 0
        let p0 = points[0];
        let mut total = Vector3::new(0.0, 0.0, 0.0);

        for i in 1..points.len() - 1 {
            let v1 = points[i] - p0;
            let v2 = points[i + 1] - p0;
            total += v1.cross(&v2);
        }

        Some(total.norm() / 2.0)
    }

    /// Returns the loop's vertex positions in traversal order.
    pub fn loop_points(
        &self,
        key: LoopKey,
        transform: Option<&Transform>,
    ) -> Option<Vec<Point3<f64>>> {
        let verts = self.loop_vertices_ordered(key)?;
        verts
            .into_iter()
            .map(|vk| {
                let p = self.vertex_point(vk)?;
                Some(match transform {
                    Some(t) => t.apply_point(&p),
                    None => p,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::make_rectangle;
    use approx::assert_relative_eq;

    fn rectangle(arena: &mut TopologyArena, w: f64, h: f64) -> FaceKey {
        let v0 = arena.add_vertex(0.0, 0.0, 0.0);
        let v1 = arena.add_vertex(w, 0.0, 0.0);
        let v2 = arena.add_vertex(w, h, 0.0);
        let v3 = arena.add_vertex(0.0, h, 0.0);
        make_rectangle(arena, v0, v1, v2, v3).unwrap().0
    }

    #[test]
    fn edge_length_3_4_5() {
        let mut arena = TopologyArena::new();
        let v0 = arena.add_vertex(0.0, 0.0, 0.0);
        let v1 = arena.add_vertex(3.0, 4.0, 0.0);
        let e = arena.add_edge(v0, v1).unwrap();
        assert_relative_eq!(arena.edge_length(e).unwrap(), 5.0);
    }

    #[test]
    fn face_normal_points_up_for_ccw() {
        let mut arena = TopologyArena::new();
        let face = rectangle(&mut arena, 2.0, 1.0);
        let n = arena.face_normal(face).unwrap();
        assert_relative_eq!(n, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn face_area_rectangle() {
        let mut arena = TopologyArena::new();
        let face = rectangle(&mut arena, 3.0, 2.0);
        assert_relative_eq!(arena.face_area(face).unwrap(), 6.0);
    }

    #[test]
    fn area_under_rigid_transform_is_unchanged() {
        let mut arena = TopologyArena::new();
        let face = rectangle(&mut arena, 3.0, 2.0);
        let t = Transform::translation(10.0, -4.0, 2.0).compose(&Transform::rotation_z(0.7));
        assert_relative_eq!(arena.face_area_with(face, Some(&t)).unwrap(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn area_under_scaling() {
        let mut arena = TopologyArena::new();
        let face = rectangle(&mut arena, 3.0, 2.0);
        let t = Transform::scaling(2.0, 1.0, 1.0);
        assert_relative_eq!(arena.face_area_with(face, Some(&t)).unwrap(), 12.0);
    }

    #[test]
    fn plane_follows_transform() {
        let mut arena = TopologyArena::new();
        let face = rectangle(&mut arena, 1.0, 1.0);
        let t = Transform::translation(0.0, 0.0, 5.0);
        let plane = arena.face_plane_with(face, Some(&t)).unwrap();
        assert_relative_eq!(plane.point.z, 5.0);
        assert_relative_eq!(plane.normal.z, 1.0);
    }
}
