// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Circle classification of polyline loops
//!
//! Modelling tools export bores as polygons with many short segments. For a
//! regular polygon every perpendicular bisector of an edge passes through
//! the centre, so the bisectors of consecutive edges all meet at the same
//! point. A loop whose bisector intersections coincide is emitted as a
//! circle primitive instead of a polygon.

use nalgebra::{Point2, Vector2};
use wikinest_topology::{intersect_line_line_2d, Line2};

/// Minimum number of segments for a loop to be considered a circle
pub const MIN_CIRCLE_SEGMENTS: usize = 24;

/// Maximum per-axis drift between consecutive bisector intersections
pub const CIRCLE_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
}

/// Intersection of the perpendicular bisectors of edges `p1-p2` and `p2-p3`,
/// for every cyclic vertex triple of the loop.
///
/// Entry `i` belongs to the triple starting at vertex `i`; it is `None` when
/// the two edges are parallel.
pub fn bisector_intersections(contour: &[Point2<f64>]) -> Vec<Option<Point2<f64>>> {
    let n = contour.len();
    if n < 3 {
        return vec![None; n];
    }

    (0..n)
        .map(|i| {
            let p1 = contour[i];
            let p2 = contour[(i + 1) % n];
            let p3 = contour[(i + 2) % n];
            let bisector1 = Line2 {
                point: nalgebra::center(&p1, &p2),
                direction: perpendicular(&(p2 - p1)),
            };
            let bisector2 = Line2 {
                point: nalgebra::center(&p2, &p3),
                direction: perpendicular(&(p3 - p2)),
            };
            intersect_line_line_2d(&bisector1, &bisector2)
        })
        .collect()
}

/// Classifies a loop as a circle from its bisector intersections.
pub fn detect_circle(
    contour: &[Point2<f64>],
    intersections: &[Option<Point2<f64>>],
) -> Option<Circle> {
    let n = intersections.len();
    if n < MIN_CIRCLE_SEGMENTS || contour.is_empty() {
        return None;
    }

    for j in 0..n {
        let c1 = intersections[j]?;
        let c2 = intersections[(j + 1) % n]?;
        if (c2.x - c1.x).abs() > CIRCLE_TOLERANCE || (c2.y - c1.y).abs() > CIRCLE_TOLERANCE {
            return None;
        }
    }

    let center = intersections[0]?;
    Some(Circle {
        center,
        radius: (center - contour[0]).norm(),
    })
}

fn perpendicular(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}
