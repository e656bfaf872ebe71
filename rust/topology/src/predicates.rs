// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric predicates: plane/plane and line/line intersection and
//! point-versus-polygon classification.

use nalgebra::{Point2, Point3, Vector2, Vector3};

/// Tolerance for treating two directions as parallel.
const PARALLEL_EPSILON: f64 = 1e-10;

/// Distance below which a point counts as lying on a polygon boundary.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// An infinite plane through `point` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Creates a plane; the normal is normalised.
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        let len = normal.norm();
        let normal = if len > 0.0 { normal / len } else { normal };
        Self { point, normal }
    }

    /// Signed distance from the plane along its normal.
    pub fn offset(&self) -> f64 {
        self.normal.dot(&self.point.coords)
    }
}

/// An infinite 3D line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    pub point: Point3<f64>,
    pub direction: Vector3<f64>,
}

/// An infinite 2D line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line2 {
    pub point: Point2<f64>,
    pub direction: Vector2<f64>,
}

/// Where a point lies relative to a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClass {
    Inside,
    Outside,
    OnBoundary,
}

/// Intersects two planes.
///
/// Returns `None` when the planes are parallel (including coincident).
pub fn intersect_plane_plane(a: &Plane, b: &Plane) -> Option<Line3> {
    let direction = a.normal.cross(&b.normal);
    let denom = direction.norm_squared();
    if denom < PARALLEL_EPSILON * PARALLEL_EPSILON {
        return None;
    }

    let (d1, d2) = (a.offset(), b.offset());
    let n1n2 = a.normal.dot(&b.normal);
    let n1n1 = a.normal.norm_squared();
    let n2n2 = b.normal.norm_squared();

    let c1 = (d1 * n2n2 - d2 * n1n2) / denom;
    let c2 = (d2 * n1n1 - d1 * n1n2) / denom;
    let point = Point3::from(a.normal * c1 + b.normal * c2);

    Some(Line3 { point, direction })
}

/// Intersects two 3D lines.
///
/// Returns `None` for parallel lines and for skew lines that do not meet.
pub fn intersect_line_line(a: &Line3, b: &Line3) -> Option<Point3<f64>> {
    let w = a.point - b.point;
    let aa = a.direction.dot(&a.direction);
    let bb = b.direction.dot(&b.direction);
    let ab = a.direction.dot(&b.direction);
    let denom = aa * bb - ab * ab;
    if denom.abs() <= PARALLEL_EPSILON * aa * bb {
        return None;
    }

    let s = (ab * b.direction.dot(&w) - bb * a.direction.dot(&w)) / denom;
    let t = (aa * b.direction.dot(&w) - ab * a.direction.dot(&w)) / denom;
    let pa = a.point + a.direction * s;
    let pb = b.point + b.direction * t;

    let scale = 1.0 + pa.coords.norm().max(pb.coords.norm());
    if (pa - pb).norm() > 1e-9 * scale {
        return None;
    }
    Some(pa)
}

/// Intersects two 2D lines. Returns `None` for parallel lines.
pub fn intersect_line_line_2d(a: &Line2, b: &Line2) -> Option<Point2<f64>> {
    let denom = a.direction.perp(&b.direction);
    if denom.abs() <= PARALLEL_EPSILON * a.direction.norm() * b.direction.norm() {
        return None;
    }
    let t = (b.point - a.point).perp(&b.direction) / denom;
    Some(a.point + a.direction * t)
}

/// Classifies a point against a closed polygon (last vertex not repeated).
pub fn classify_point_vs_polygon(point: &Point2<f64>, polygon: &[Point2<f64>]) -> PointClass {
    let n = polygon.len();
    if n < 3 {
        return PointClass::Outside;
    }

    for i in 0..n {
        if distance_to_segment(point, &polygon[i], &polygon[(i + 1) % n]) <= BOUNDARY_EPSILON {
            return PointClass::OnBoundary;
        }
    }

    // Even-odd ray casting
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    if inside {
        PointClass::Inside
    } else {
        PointClass::Outside
    }
}

fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn parallel_planes_do_not_intersect() {
        let a = Plane::new(Point3::origin(), Vector3::z());
        let b = Plane::new(Point3::new(0.0, 0.0, 18.0), -Vector3::z());
        assert!(intersect_plane_plane(&a, &b).is_none());
    }

    #[test]
    fn perpendicular_planes_meet_in_line() {
        let a = Plane::new(Point3::new(0.0, 0.0, 2.0), Vector3::z());
        let b = Plane::new(Point3::new(3.0, 0.0, 0.0), Vector3::x());
        let line = intersect_plane_plane(&a, &b).unwrap();
        assert_relative_eq!(line.point.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(line.point.z, 2.0, epsilon = 1e-12);
        assert_relative_eq!(line.direction.normalize().y.abs(), 1.0);
    }

    #[test]
    fn crossing_lines_meet() {
        let a = Line3 {
            point: Point3::new(0.0, 0.0, 0.0),
            direction: Vector3::new(1.0, 1.0, 0.0),
        };
        let b = Line3 {
            point: Point3::new(4.0, 0.0, 0.0),
            direction: Vector3::new(-1.0, 1.0, 0.0),
        };
        let p = intersect_line_line(&a, &b).unwrap();
        assert_relative_eq!(p, Point3::new(2.0, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn skew_lines_do_not_meet() {
        let a = Line3 {
            point: Point3::origin(),
            direction: Vector3::x(),
        };
        let b = Line3 {
            point: Point3::new(0.0, 0.0, 1.0),
            direction: Vector3::y(),
        };
        assert!(intersect_line_line(&a, &b).is_none());
    }

    #[test]
    fn lines_2d() {
        let a = Line2 {
            point: Point2::new(0.0, 1.0),
            direction: Vector2::new(1.0, 0.0),
        };
        let b = Line2 {
            point: Point2::new(3.0, -5.0),
            direction: Vector2::new(0.0, 2.0),
        };
        assert_relative_eq!(
            intersect_line_line_2d(&a, &b).unwrap(),
            Point2::new(3.0, 1.0),
            epsilon = 1e-12
        );
        let c = Line2 {
            point: Point2::new(0.0, 7.0),
            direction: Vector2::new(-2.0, 0.0),
        };
        assert!(intersect_line_line_2d(&a, &c).is_none());
    }

    #[test]
    fn classify_point() {
        let poly = square();
        assert_eq!(
            classify_point_vs_polygon(&Point2::new(5.0, 5.0), &poly),
            PointClass::Inside
        );
        assert_eq!(
            classify_point_vs_polygon(&Point2::new(15.0, 5.0), &poly),
            PointClass::Outside
        );
        assert_eq!(
            classify_point_vs_polygon(&Point2::new(10.0, 5.0), &poly),
            PointClass::OnBoundary
        );
        assert_eq!(
            classify_point_vs_polygon(&Point2::new(0.0, 0.0), &poly),
            PointClass::OnBoundary
        );
    }
}
