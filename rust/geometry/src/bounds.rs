// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal bounding rectangle by rotational search
//!
//! The outer contour is rotated about the origin through half a turn and the
//! axis-aligned bounds at each angle are compared. Rotations are evaluated in
//! parallel; the selection runs sequentially in angle order so the result
//! does not depend on scheduling.

use nalgebra::{Point2, Rotation2};
use rayon::prelude::*;

use crate::polygon::contour_bounds;

/// Slack allowed on size limits and required for an area improvement
pub const BOUNDS_SLACK: f64 = 0.1;

/// Angle step of the first search pass, in degrees
pub const COARSE_STEP_DEG: f64 = 0.5;

/// Angle step of the fallback pass, in degrees
pub const FINE_STEP_DEG: f64 = 0.1;

/// Axis-aligned bounds of a contour after rotating it by `angle` radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRect {
    pub angle: f64,
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl BoundingRect {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn rotation(&self) -> Rotation2<f64> {
        Rotation2::new(self.angle)
    }
}

/// Bounds of `contour` rotated about the origin by `angle` radians.
pub fn rotated_bounds(contour: &[Point2<f64>], angle: f64) -> Option<BoundingRect> {
    let rotation = Rotation2::new(angle);
    let rotated: Vec<Point2<f64>> = contour.iter().map(|p| rotation * p).collect();
    let (min, max) = contour_bounds(&rotated)?;
    Some(BoundingRect { angle, min, max })
}

/// Searches angles in `[0°, 180°)` at `step_deg` for the smallest bounds
/// that fit within `max_width × max_height` (with [`BOUNDS_SLACK`]).
///
/// A later angle only replaces the current best when its area is smaller by
/// more than the slack, so near-ties keep the earliest angle.
pub fn search_bounds(
    contour: &[Point2<f64>],
    step_deg: f64,
    max_width: f64,
    max_height: f64,
) -> Option<BoundingRect> {
    let steps = (180.0 / step_deg).round() as usize;

    let candidates: Vec<Option<BoundingRect>> = (0..steps)
        .into_par_iter()
        .map(|k| rotated_bounds(contour, (k as f64 * step_deg).to_radians()))
        .collect();

    candidates
        .into_iter()
        .flatten()
        .filter(|b| b.height() - max_height <= BOUNDS_SLACK && b.width() - max_width <= BOUNDS_SLACK)
        .fold(None, |best: Option<BoundingRect>, b| match best {
            Some(current) if current.area() - b.area() <= BOUNDS_SLACK => Some(current),
            _ => Some(b),
        })
}
