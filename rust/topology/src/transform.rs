// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Affine transformations of the scene graph.
//!
//! Groups and component instances carry a [`Transform`]; the accumulated
//! transform of a nested entity is the product of its ancestors' transforms.
//! Boundary geometry is never moved in place: a face that must be examined
//! as placed is copied into scratch geometry with
//! [`TopologyArena::materialize_transformed_face`].

use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};
use rustc_hash::FxHashMap;

use crate::arena::TopologyArena;
use crate::error::{Error, Result};
use crate::keys::*;
use crate::scratch::Scratch;

/// A 4x4 affine transformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Matrix4<f64>,
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Wraps an existing homogeneous matrix.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Builds a transform from 16 values in row-major order.
    pub fn from_row_major(values: &[f64; 16]) -> Self {
        Self {
            matrix: Matrix4::from_row_slice(values),
        }
    }

    /// Returns the 16 matrix values in row-major order.
    pub fn to_row_major(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[row * 4 + col] = self.matrix[(row, col)];
            }
        }
        out
    }

    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vector3::new(dx, dy, dz)),
        }
    }

    /// Rotation about the Z axis through the origin, in radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self::rotation(&Vector3::z(), angle).unwrap_or_else(Self::identity)
    }

    /// Rotation about an arbitrary axis through the origin, in radians.
    ///
    /// Returns `None` for a degenerate axis.
    pub fn rotation(axis: &Vector3<f64>, angle: f64) -> Option<Self> {
        let unit_axis = Unit::try_new(*axis, 1e-15)?;
        let rotation = Rotation3::from_axis_angle(&unit_axis, angle);
        Some(Self {
            matrix: rotation.to_homogeneous(),
        })
    }

    pub fn scaling(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)),
        }
    }

    /// Returns `self * other`: `other` is applied first, then `self`.
    pub fn compose(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    pub fn apply_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(p)
    }

    pub fn apply_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.matrix.transform_vector(v)
    }

    /// Transforms a surface normal (inverse transpose of the linear part).
    ///
    /// Returns `None` if the transform is singular.
    pub fn apply_normal(&self, n: &Vector3<f64>) -> Option<Vector3<f64>> {
        let linear = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let inverse = linear.try_inverse()?;
        let mapped = inverse.transpose() * n;
        let len = mapped.norm();
        if len < 1e-15 {
            return None;
        }
        Some(mapped / len)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl TopologyArena {
    /// Creates a transformed copy of a face as scratch geometry.
    ///
    /// Every loop is duplicated with its vertices mapped through `transform`;
    /// loop and vertex order are preserved. All created entities are tracked
    /// in `scratch` so the caller can release them once done.
    pub fn materialize_transformed_face(
        &mut self,
        face: FaceKey,
        transform: &Transform,
        scratch: &mut Scratch,
    ) -> Result<FaceKey> {
        let loops = self.face_loops(face).ok_or(Error::FaceNotFound(face))?;
        self.materialize_loops(&loops, transform, scratch)
    }

    /// Creates a scratch face from copies of existing loops.
    ///
    /// The first loop becomes the outer boundary and the rest become holes,
    /// so a face can be rebuilt with only some of its original holes.
    pub fn materialize_loops(
        &mut self,
        loops: &[LoopKey],
        transform: &Transform,
        scratch: &mut Scratch,
    ) -> Result<FaceKey> {
        if loops.is_empty() {
            return Err(Error::EmptyLoop);
        }

        let mut vertex_map: FxHashMap<VertexKey, VertexKey> = FxHashMap::default();
        let mut new_loops = Vec::with_capacity(loops.len());

        for &lp in loops {
            let verts = self
                .loop_vertices_ordered(lp)
                .ok_or(Error::LoopNotFound(lp))?;

            let mut mapped = Vec::with_capacity(verts.len());
            for vk in verts {
                let new_vk = match vertex_map.get(&vk) {
                    Some(&existing) => existing,
                    None => {
                        let p = self.vertex_point(vk).ok_or(Error::VertexNotFound(vk))?;
                        let q = transform.apply_point(&p);
                        let new_vk = self.add_vertex(q.x, q.y, q.z);
                        scratch.track(new_vk);
                        vertex_map.insert(vk, new_vk);
                        new_vk
                    }
                };
                mapped.push(new_vk);
            }

            let new_loop = self.add_loop_by_vertices(&mapped)?;
            if let Some(edges) = self.loop_edges(new_loop) {
                for &ek in edges {
                    scratch.track(ek);
                }
            }
            scratch.track(new_loop);
            new_loops.push(new_loop);
        }

        let new_face = self.add_face_with_holes(new_loops[0], &new_loops[1..])?;
        scratch.track(new_face);
        Ok(new_face)
    }
}
