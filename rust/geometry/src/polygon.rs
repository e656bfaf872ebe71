// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D contour utilities
//!
//! Winding, area, centroid and bounds of closed contours (last point not
//! repeated), plus the strict segment crossing test used by the nester.

use nalgebra::{Isometry2, Point2};
use wikinest_topology::{intersect_line_line_2d, Line2};

/// Parameter margin keeping crossings away from segment endpoints
const CROSSING_EPSILON: f64 = 1e-9;

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let area = compute_signed_area(contour);
    if area < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Ensure contour has clockwise winding (for holes)
pub fn ensure_cw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let area = compute_signed_area(contour);
    if area > 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Shoelace signed area and centroid of a contour.
///
/// Returns `(signed_area, centroid)`; the centroid is `None` for a contour
/// without area.
pub fn contour_centroid(contour: &[Point2<f64>]) -> (f64, Option<Point2<f64>>) {
    let n = contour.len();
    if n < 3 {
        return (0.0, None);
    }

    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p1 = contour[i];
        let p2 = contour[(i + 1) % n];
        let cross = p1.x * p2.y - p2.x * p1.y;
        area += cross;
        cx += (p1.x + p2.x) * cross;
        cy += (p1.y + p2.y) * cross;
    }
    area *= 0.5;

    if area == 0.0 {
        return (0.0, None);
    }
    (area, Some(Point2::new(cx / (6.0 * area), cy / (6.0 * area))))
}

/// Compute bounding box of a contour
pub fn contour_bounds(contour: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    if contour.is_empty() {
        return None;
    }

    let mut min = contour[0];
    let mut max = contour[0];

    for p in contour.iter().skip(1) {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    Some((min, max))
}

/// Check if two bounding boxes overlap
pub fn bounds_overlap(
    a_min: &Point2<f64>,
    a_max: &Point2<f64>,
    b_min: &Point2<f64>,
    b_max: &Point2<f64>,
) -> bool {
    a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
}

/// Apply a rigid 2D motion to every point of a contour
pub fn transform_contour(contour: &[Point2<f64>], motion: &Isometry2<f64>) -> Vec<Point2<f64>> {
    contour.iter().map(|p| motion * p).collect()
}

/// Check whether segments `a1-a2` and `b1-b2` cross.
///
/// Only intersections strictly inside both segments count: touching at an
/// endpoint, or running along a shared line, is not a crossing.
pub fn segments_cross(
    a1: &Point2<f64>,
    a2: &Point2<f64>,
    b1: &Point2<f64>,
    b2: &Point2<f64>,
) -> bool {
    let da = a2 - a1;
    let db = b2 - b1;
    let line_a = Line2 {
        point: *a1,
        direction: da,
    };
    let line_b = Line2 {
        point: *b1,
        direction: db,
    };
    let Some(hit) = intersect_line_line_2d(&line_a, &line_b) else {
        return false;
    };

    let within = |start: &Point2<f64>, dir: &nalgebra::Vector2<f64>| {
        let len_sq = dir.norm_squared();
        if len_sq == 0.0 {
            return false;
        }
        let t = (hit - start).dot(dir) / len_sq;
        t > CROSSING_EPSILON && t < 1.0 - CROSSING_EPSILON
    };

    within(a1, &da) && within(b1, &db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    fn unit_square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_compute_signed_area_ccw() {
        assert_relative_eq!(compute_signed_area(&unit_square()), 1.0);
    }

    #[test]
    fn test_compute_signed_area_cw() {
        let cw: Vec<_> = unit_square().into_iter().rev().collect();
        assert_relative_eq!(compute_signed_area(&cw), -1.0);
    }

    #[test]
    fn test_ensure_winding() {
        let cw: Vec<_> = unit_square().into_iter().rev().collect();
        assert!(compute_signed_area(&ensure_ccw(&cw)) > 0.0);
        assert!(compute_signed_area(&ensure_cw(&unit_square())) < 0.0);
        // already correct: untouched
        assert_eq!(ensure_ccw(&unit_square()), unit_square());
    }

    #[test]
    fn centroid_of_offset_rectangle() {
        let rect = vec![
            Point2::new(10.0, 20.0),
            Point2::new(14.0, 20.0),
            Point2::new(14.0, 22.0),
            Point2::new(10.0, 22.0),
        ];
        let (area, centroid) = contour_centroid(&rect);
        assert_relative_eq!(area, 8.0);
        assert_relative_eq!(centroid.unwrap(), Point2::new(12.0, 21.0), epsilon = 1e-12);

        // winding does not move the centroid
        let reversed: Vec<_> = rect.into_iter().rev().collect();
        let (area, centroid) = contour_centroid(&reversed);
        assert_relative_eq!(area, -8.0);
        assert_relative_eq!(centroid.unwrap(), Point2::new(12.0, 21.0), epsilon = 1e-12);
    }

    #[test]
    fn degenerate_contour_has_no_centroid() {
        let line = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
        assert_eq!(contour_centroid(&line).1, None);
    }

    #[test]
    fn bounds_and_overlap() {
        let (min, max) = contour_bounds(&unit_square()).unwrap();
        assert_eq!(min, Point2::new(0.0, 0.0));
        assert_eq!(max, Point2::new(1.0, 1.0));
        assert!(bounds_overlap(&min, &max, &Point2::new(1.0, 1.0), &Point2::new(2.0, 2.0)));
        assert!(!bounds_overlap(&min, &max, &Point2::new(1.5, 0.0), &Point2::new(2.0, 2.0)));
    }

    #[test]
    fn contour_motion() {
        let motion = Isometry2::new(Vector2::new(5.0, 0.0), std::f64::consts::FRAC_PI_2);
        let moved = transform_contour(&unit_square(), &motion);
        assert_relative_eq!(moved[1], Point2::new(5.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn proper_crossing() {
        assert!(segments_cross(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 2.0),
            &Point2::new(2.0, 0.0),
        ));
    }

    #[test]
    fn touching_and_collinear_are_not_crossings() {
        // T-junction at an endpoint
        assert!(!segments_cross(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(1.0, 2.0),
        ));
        // shared corner
        assert!(!segments_cross(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(2.0, 2.0),
        ));
        // overlapping along one line
        assert!(!segments_cross(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(3.0, 0.0),
        ));
        // lines cross beyond the segments
        assert!(!segments_cross(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(3.0, -1.0),
            &Point2::new(3.0, 1.0),
        ));
    }
}
