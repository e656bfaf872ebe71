// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WikiNest Geometry
//!
//! Planar analysis of panel faces: projection into 2D, loop walking,
//! winding normalisation, circle recognition and the rotational search for
//! a minimal bounding rectangle that fits the cutting sheet.

pub mod bounds;
pub mod circles;
pub mod error;
pub mod polygon;
pub mod profile;
pub mod projection;
pub mod walk;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry2, Point2, Point3, Rotation2, Vector2, Vector3};

pub use bounds::{search_bounds, BoundingRect};
pub use circles::Circle;
pub use error::{Error, Result};
pub use polygon::{compute_signed_area, contour_bounds, segments_cross, transform_contour};
pub use profile::{build_profile, profile_face, PaddingMode, PanelLimits, Profile};
pub use projection::Projection;
