// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar projection of face geometry into 2D
//!
//! Faces lying in a principal plane drop the coordinate along their normal.
//! Slanted faces are unrolled around their first outer vertex using the
//! arbitrary-axis convention for the in-plane basis, which preserves every
//! distance measured in the face plane.

use nalgebra::{Point2, Point3, Vector3};

/// Tolerance for a normal to count as parallel to a principal axis
const AXIS_TOLERANCE: f64 = 1e-9;

/// Threshold of the arbitrary-axis algorithm
const ARBITRARY_AXIS_LIMIT: f64 = 1.0 / 64.0;

/// How 3D points of one face are mapped into the plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Normal along X: keep (y, z)
    DropX,
    /// Normal along Y: keep (x, z)
    DropY,
    /// Normal along Z: keep (x, y)
    DropZ,
    /// Slanted face: offsets from `base` measured along `u` and `w`
    Slanted {
        base: Point3<f64>,
        u: Vector3<f64>,
        w: Vector3<f64>,
    },
}

impl Projection {
    /// Picks the projection for a face with unit `normal` whose first outer
    /// vertex is `base`.
    pub fn for_face(normal: &Vector3<f64>, base: Point3<f64>) -> Self {
        if is_parallel(normal, &Vector3::x()) {
            Projection::DropX
        } else if is_parallel(normal, &Vector3::y()) {
            Projection::DropY
        } else if is_parallel(normal, &Vector3::z()) {
            Projection::DropZ
        } else {
            let (_, u) = arbitrary_axes(normal);
            let w = u.cross(normal);
            Projection::Slanted { base, u, w }
        }
    }

    /// Projects one point; the result lies in the z = 0 plane.
    pub fn project(&self, p: &Point3<f64>) -> Point2<f64> {
        match self {
            Projection::DropX => Point2::new(p.y, p.z),
            Projection::DropY => Point2::new(p.x, p.z),
            Projection::DropZ => Point2::new(p.x, p.y),
            Projection::Slanted { base, u, w } => {
                let e = p - base;
                Point2::new(base.x + e.dot(u), base.y + e.dot(w))
            }
        }
    }
}

/// In-plane axes for a normal, following the arbitrary-axis algorithm.
///
/// Returns `(x_axis, y_axis)`, both unit length and perpendicular to
/// `normal`, with `x_axis × y_axis` pointing along `normal`.
pub fn arbitrary_axes(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let n = normal.normalize();
    let reference = if n.x.abs() < ARBITRARY_AXIS_LIMIT && n.y.abs() < ARBITRARY_AXIS_LIMIT {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let x_axis = reference.cross(&n).normalize();
    let y_axis = n.cross(&x_axis);
    (x_axis, y_axis)
}

fn is_parallel(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    a.cross(b).norm() <= AXIS_TOLERANCE * a.norm() * b.norm()
}
