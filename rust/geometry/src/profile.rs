// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel profiles: the flat 2D shape of one matched face
//!
//! A [`Profile`] is built once per panel candidate. The face is projected
//! into the plane, its loops are walked in connectivity order and given a
//! canonical winding, circular bores are recognised, and the whole shape is
//! rotated into the orientation with the smallest bounding rectangle that
//! still fits the cutting sheet.

use nalgebra::Point2;
use wikinest_topology::{Error as TopologyError, FaceKey, TopologyArena, Transform};

use crate::bounds::{search_bounds, BoundingRect, COARSE_STEP_DEG, FINE_STEP_DEG};
use crate::circles::{bisector_intersections, detect_circle, Circle};
use crate::error::{Error, Result};
use crate::polygon::{contour_centroid, ensure_ccw, ensure_cw};
use crate::projection::Projection;
use crate::walk::walk_loop;

/// Allowed difference between face area and profile area
pub const AREA_TOLERANCE: f64 = 0.1;

/// Size limits a profile must fit, derived from the sheet configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLimits {
    /// Inner sheet width less padding on both sides
    pub panel_width: f64,
    /// Inner sheet height less padding on both sides
    pub panel_height: f64,
    /// Inner sheet width
    pub panel_max_width: f64,
    /// Inner sheet height
    pub panel_max_height: f64,
    /// Total padding added across one dimension (both sides)
    pub padding: f64,
}

/// Which sides of a profile receive padding when nested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingMode {
    /// Padding on every side
    #[default]
    Full,
    /// Too wide to pad horizontally: only top and bottom are padded
    SkipWidth,
    /// Too tall to pad vertically: only left and right are padded
    SkipHeight,
}

/// Flat 2D shape of a panel, in its minimal-bounding orientation
#[derive(Debug, Clone)]
pub struct Profile {
    /// Outer loop first (counter-clockwise), then holes (clockwise)
    pub loops: Vec<Vec<Point2<f64>>>,
    /// Circle classification per loop
    pub circles: Vec<Option<Circle>>,
    /// Area-weighted centroid with holes subtracted
    pub centroid: Point2<f64>,
    /// Net area of the source face
    pub area: f64,
    /// Area enclosed by the outer loop alone
    pub shell_area: f64,
    /// Rotation applied and the resulting bounds
    pub bounds: BoundingRect,
    pub padding: PaddingMode,
    /// Too large to pad in either direction: cut alone on its own sheet
    pub singleton: bool,
}

impl Profile {
    pub fn outer(&self) -> &[Point2<f64>] {
        &self.loops[0]
    }

    pub fn holes(&self) -> &[Vec<Point2<f64>>] {
        &self.loops[1..]
    }

    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    pub fn height(&self) -> f64 {
        self.bounds.height()
    }
}

/// Builds the profile of `face` as placed by `transform`.
///
/// When the transform changes the face area (scaling), a transformed copy
/// of the face is materialised as scratch geometry and released before
/// returning; otherwise the untransformed face is projected directly, since
/// a rigid motion does not change the flat shape.
pub fn build_profile(
    arena: &mut TopologyArena,
    face: FaceKey,
    transform: &Transform,
    limits: &PanelLimits,
) -> Result<Profile> {
    let local_area = arena
        .face_area(face)
        .ok_or(TopologyError::FaceNotFound(face))?;
    let placed_area = arena
        .face_area_with(face, Some(transform))
        .ok_or(TopologyError::FaceNotFound(face))?;

    if (placed_area - local_area).abs() > AREA_TOLERANCE {
        arena.with_scratch(|arena, scratch| {
            let copy = arena.materialize_transformed_face(face, transform, scratch)?;
            profile_face(arena, copy, limits)
        })
    } else {
        profile_face(arena, face, limits)
    }
}

/// Builds the profile of a face exactly as stored.
pub fn profile_face(arena: &TopologyArena, face: FaceKey, limits: &PanelLimits) -> Result<Profile> {
    let total_area = arena
        .face_area(face)
        .ok_or(TopologyError::FaceNotFound(face))?;
    let normal = arena
        .face_normal(face)
        .ok_or(TopologyError::DegenerateFace)?;
    let outer_vertices = arena
        .face_vertices_ordered(face)
        .ok_or(TopologyError::FaceNotFound(face))?;
    let base = outer_vertices
        .first()
        .and_then(|&vk| arena.vertex_point(vk))
        .ok_or(TopologyError::DegenerateFace)?;
    let projection = Projection::for_face(&normal, base);

    let loop_keys = arena
        .face_loops(face)
        .ok_or(TopologyError::FaceNotFound(face))?;
    let mut loops = Vec::with_capacity(loop_keys.len());
    for (loop_index, &lp) in loop_keys.iter().enumerate() {
        let edges = arena
            .loop_edges(lp)
            .ok_or(TopologyError::LoopNotFound(lp))?
            .iter()
            .map(|&ek| arena.edge_vertices(ek).ok_or(TopologyError::EdgeNotFound(ek)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let walked =
            walk_loop(&edges).ok_or(Error::UnexpectedEdgeConnection { loop_index })?;
        let points = walked
            .into_iter()
            .map(|vk| {
                arena
                    .vertex_point(vk)
                    .map(|p| projection.project(&p))
                    .ok_or(TopologyError::VertexNotFound(vk))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        loops.push(if loop_index == 0 {
            ensure_ccw(&points)
        } else {
            ensure_cw(&points)
        });
    }

    assemble(loops, total_area, limits)
}

/// Turns projected loops into a profile: centroid, circles, orientation and
/// padding policy.
fn assemble(
    loops: Vec<Vec<Point2<f64>>>,
    total_area: f64,
    limits: &PanelLimits,
) -> Result<Profile> {
    let measures: Vec<(f64, Option<Point2<f64>>)> =
        loops.iter().map(|l| contour_centroid(l)).collect();
    let intersections: Vec<Vec<Option<Point2<f64>>>> =
        loops.iter().map(|l| bisector_intersections(l)).collect();

    let bounds = search_bounds(
        &loops[0],
        COARSE_STEP_DEG,
        limits.panel_width,
        limits.panel_height,
    )
    .or_else(|| {
        search_bounds(
            &loops[0],
            FINE_STEP_DEG,
            limits.panel_max_width,
            limits.panel_max_height,
        )
    })
    .ok_or(Error::NoFittingOrientation)?;

    let mut padding = PaddingMode::Full;
    let mut singleton = false;
    if bounds.width() + limits.padding > limits.panel_width {
        padding = PaddingMode::SkipWidth;
    }
    if bounds.height() + limits.padding > limits.panel_height {
        if padding == PaddingMode::SkipWidth {
            singleton = true;
            padding = PaddingMode::Full;
        } else {
            padding = PaddingMode::SkipHeight;
        }
    }

    // Outer contribution minus every hole
    let shell_area = measures[0].0.abs();
    let origin = Point2::origin();
    let mut net_area = shell_area;
    let mut moment = measures[0].1.unwrap_or(origin).coords * shell_area;
    for (area, centroid) in &measures[1..] {
        let area = area.abs();
        moment -= centroid.unwrap_or(origin).coords * area;
        net_area -= area;
    }

    if (total_area - net_area).abs() > AREA_TOLERANCE {
        return Err(Error::AreaMismatch {
            face_area: total_area,
            profile_area: net_area,
        });
    }

    let rotation = bounds.rotation();
    let centroid = rotation * Point2::from(moment / net_area);

    let circles = loops
        .iter()
        .zip(&intersections)
        .map(|(l, hits)| {
            detect_circle(l, hits).map(|c| Circle {
                center: rotation * c.center,
                radius: c.radius,
            })
        })
        .collect();

    let loops = loops
        .into_iter()
        .map(|l| l.into_iter().map(|p| rotation * p).collect())
        .collect();

    Ok(Profile {
        loops,
        circles,
        centroid,
        area: total_area,
        shell_area,
        bounds,
        padding,
        singleton,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    /// Limits for the standard 2400 x 1200 sheet with 2.5 margin, 12.5 padding
    fn sheet_limits() -> PanelLimits {
        PanelLimits {
            panel_width: 2395.0 - 25.0,
            panel_height: 1195.0 - 25.0,
            panel_max_width: 2395.0,
            panel_max_height: 1195.0,
            padding: 25.0,
        }
    }

    fn slab(arena: &mut TopologyArena, outer: &[[f64; 2]], holes: &[Vec<[f64; 2]>]) -> FaceKey {
        arena.make_prism(outer, holes, 0.0, 18.0).unwrap()[1]
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Vec<[f64; 2]> {
        vec![[x, y], [x + w, y], [x + w, y + h], [x, y + h]]
    }

    #[test]
    fn rectangle_with_hole() {
        let mut arena = TopologyArena::new();
        let face = slab(&mut arena, &rect(0.0, 0.0, 600.0, 300.0), &[rect(100.0, 100.0, 100.0, 100.0)]);

        let profile =
            build_profile(&mut arena, face, &Transform::identity(), &sheet_limits()).unwrap();
        assert_eq!(profile.loops.len(), 2);
        assert_relative_eq!(profile.area, 170000.0, epsilon = 1e-6);
        assert_relative_eq!(profile.shell_area, 180000.0, epsilon = 1e-6);
        assert_relative_eq!(profile.width(), 600.0, epsilon = 1e-6);
        assert_relative_eq!(profile.height(), 300.0, epsilon = 1e-6);
        assert_eq!(profile.padding, PaddingMode::Full);
        assert!(!profile.singleton);

        // (300,150)*180000 - (150,150)*10000, over 170000
        let expected_x = (300.0 * 180000.0 - 150.0 * 10000.0) / 170000.0;
        assert_relative_eq!(profile.centroid, Point2::new(expected_x, 150.0), epsilon = 1e-6);
        assert!(profile.circles.iter().all(Option::is_none));
    }

    /// Builds a 600 x 300 slab face with one hole in its own arena. `shift`
    /// rotates the start vertex, `reverse` flips the walking direction and
    /// `backwards_edges` stores every edge against the walking direction.
    fn reordered_face(shift: usize, reverse: bool, backwards_edges: bool) -> (TopologyArena, FaceKey) {
        let mut arena = TopologyArena::new();
        let ring = |arena: &mut TopologyArena, pts: &[[f64; 2]]| {
            let mut keys: Vec<_> = pts.iter().map(|p| arena.add_vertex(p[0], p[1], 18.0)).collect();
            if reverse {
                keys.reverse();
            }
            let n = keys.len();
            keys.rotate_left(shift % n);
            if backwards_edges {
                for i in 0..keys.len() {
                    arena.add_edge(keys[(i + 1) % keys.len()], keys[i]).unwrap();
                }
            }
            keys
        };
        let outer = ring(&mut arena, &rect(0.0, 0.0, 600.0, 300.0));
        let hole = ring(&mut arena, &[[400.0, 100.0], [400.0, 200.0], [500.0, 200.0], [450.0, 100.0]]);
        let face = arena.add_face_by_vertices_with_holes(&outer, &[hole]).unwrap();
        (arena, face)
    }

    fn same_up_to_rotation(a: &[Point2<f64>], b: &[Point2<f64>]) -> bool {
        a.len() == b.len()
            && (0..b.len()).any(|k| {
                a.iter()
                    .enumerate()
                    .all(|(i, p)| (p - b[(i + k) % b.len()]).norm() < 1e-6)
            })
    }

    #[test]
    fn retraversal_ignores_stored_order() {
        let (arena, face) = reordered_face(0, false, false);
        let reference = profile_face(&arena, face, &sheet_limits()).unwrap();

        for (shift, reverse, backwards) in [
            (0, true, false),
            (2, false, false),
            (1, true, true),
            (3, false, true),
        ] {
            let (arena, face) = reordered_face(shift, reverse, backwards);
            let profile = profile_face(&arena, face, &sheet_limits()).unwrap();
            assert!(
                same_up_to_rotation(profile.outer(), reference.outer()),
                "outer differs for shift {shift}, reverse {reverse}, backwards {backwards}"
            );
            assert!(
                same_up_to_rotation(&profile.holes()[0], &reference.holes()[0]),
                "hole differs for shift {shift}, reverse {reverse}, backwards {backwards}"
            );
            assert_relative_eq!(profile.centroid, reference.centroid, epsilon = 1e-6);
        }
    }

    #[test]
    fn winding_is_canonical() {
        let mut arena = TopologyArena::new();
        let faces = arena
            .make_prism(&rect(0.0, 0.0, 600.0, 300.0), &[rect(100.0, 100.0, 50.0, 50.0)], 0.0, 18.0)
            .unwrap();
        // bottom and top faces share the outline but not their stored edge order
        for face in [faces[0], faces[1]] {
            let profile = profile_face(&arena, face, &sheet_limits()).unwrap();
            assert!(crate::polygon::compute_signed_area(profile.outer()) > 0.0);
            assert!(crate::polygon::compute_signed_area(&profile.holes()[0]) < 0.0);
        }
    }

    #[test]
    fn circular_bore_detected() {
        let mut arena = TopologyArena::new();
        let bore: Vec<[f64; 2]> = (0..32)
            .map(|i| {
                let a = TAU * i as f64 / 32.0;
                [200.0 + 30.0 * a.cos(), 150.0 + 30.0 * a.sin()]
            })
            .collect();
        let face = slab(&mut arena, &rect(0.0, 0.0, 600.0, 300.0), &[bore]);

        let profile = profile_face(&arena, face, &sheet_limits()).unwrap();
        assert!(profile.circles[0].is_none());
        let circle = profile.circles[1].unwrap();
        assert_relative_eq!(circle.radius, 30.0, epsilon = 0.1);
        assert_relative_eq!(circle.center, Point2::new(200.0, 150.0), epsilon = 0.1);
    }

    #[test]
    fn wide_panel_skips_width_padding() {
        let mut arena = TopologyArena::new();
        let face = slab(&mut arena, &rect(0.0, 0.0, 2360.0, 400.0), &[]);
        let profile = profile_face(&arena, face, &sheet_limits()).unwrap();
        assert_eq!(profile.padding, PaddingMode::SkipWidth);
        assert!(!profile.singleton);
    }

    #[test]
    fn full_sheet_panel_is_singleton() {
        let mut arena = TopologyArena::new();
        let face = slab(&mut arena, &rect(0.0, 0.0, 2390.0, 1190.0), &[]);
        let profile = profile_face(&arena, face, &sheet_limits()).unwrap();
        assert!(profile.singleton);
        assert_eq!(profile.padding, PaddingMode::Full);
    }

    #[test]
    fn oversized_panel_has_no_orientation() {
        let mut arena = TopologyArena::new();
        let face = slab(&mut arena, &rect(0.0, 0.0, 3000.0, 1500.0), &[]);
        assert!(matches!(
            profile_face(&arena, face, &sheet_limits()),
            Err(Error::NoFittingOrientation)
        ));
    }

    #[test]
    fn tall_panel_is_turned_to_fit() {
        let mut arena = TopologyArena::new();
        let face = slab(&mut arena, &rect(0.0, 0.0, 300.0, 1800.0), &[]);
        let profile = profile_face(&arena, face, &sheet_limits()).unwrap();
        assert_relative_eq!(profile.width(), 1800.0, epsilon = 1e-6);
        assert_relative_eq!(profile.height(), 300.0, epsilon = 1e-6);
    }

    #[test]
    fn scaled_instance_is_materialised_and_released() {
        let mut arena = TopologyArena::new();
        let face = slab(&mut arena, &rect(0.0, 0.0, 200.0, 100.0), &[]);
        let before = (arena.vertex_count(), arena.edge_count(), arena.face_count());

        let t = Transform::scaling(2.0, 1.0, 1.0);
        let profile = build_profile(&mut arena, face, &t, &sheet_limits()).unwrap();
        assert_relative_eq!(profile.area, 40000.0, epsilon = 1e-6);
        assert_relative_eq!(profile.width(), 400.0, epsilon = 1e-6);
        assert_eq!(
            (arena.vertex_count(), arena.edge_count(), arena.face_count()),
            before
        );
    }

    #[test]
    fn rigid_transform_profiles_local_face() {
        let mut arena = TopologyArena::new();
        let face = slab(&mut arena, &rect(0.0, 0.0, 200.0, 100.0), &[]);
        let t = Transform::translation(1000.0, 0.0, 0.0).compose(&Transform::rotation_z(1.0));
        let profile = build_profile(&mut arena, face, &t, &sheet_limits()).unwrap();
        assert_relative_eq!(profile.area, 20000.0, epsilon = 1e-6);
        assert_relative_eq!(profile.width(), 200.0, epsilon = 1e-6);
    }

    #[test]
    fn wall_face_uses_principal_projection() {
        let mut arena = TopologyArena::new();
        // vertical face in the XZ plane
        let face = arena
            .add_face_by_coords(&[
                [0.0, 0.0, 0.0],
                [500.0, 0.0, 0.0],
                [500.0, 0.0, 250.0],
                [0.0, 0.0, 250.0],
            ])
            .unwrap();
        let profile = profile_face(&arena, face, &sheet_limits()).unwrap();
        assert_relative_eq!(profile.width(), 500.0, epsilon = 1e-6);
        assert_relative_eq!(profile.height(), 250.0, epsilon = 1e-6);
    }

    #[test]
    fn mismatched_hole_area_is_reported() {
        let loops = vec![
            ensure_ccw(&[
                Point2::new(0.0, 0.0),
                Point2::new(100.0, 0.0),
                Point2::new(100.0, 100.0),
                Point2::new(0.0, 100.0),
            ]),
        ];
        assert!(matches!(
            assemble(loops, 9000.0, &sheet_limits()),
            Err(Error::AreaMismatch { .. })
        ));
    }
}
