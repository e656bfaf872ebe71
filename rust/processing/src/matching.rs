// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face pairing within one container
//!
//! A sheet panel modelled as a solid has two large faces of equal area, one
//! on each side, joined vertex-to-vertex by edges as long as the stock is
//! thick. Pairing finds those two faces and keeps one of them as the
//! representative of the panel. Everything else in the container (the thin
//! side faces) is filtered out before pairing or left over as an orphan.

use std::f64::consts::PI;
use std::ops::AddAssign;

use rustc_hash::FxHashSet;
use serde::Serialize;
use wikinest_topology::{
    intersect_plane_plane, FaceKey, LoopKey, Scratch, TopologyArena, Transform, VertexKey,
};

use crate::error::Result;

/// Faces smaller than this are ignored entirely
pub const MIN_FACE_AREA: f64 = 5.0;

/// Maximum area difference between the two faces of a panel
pub const AREA_MATCH_TOLERANCE: f64 = 0.5;

/// Maximum angle between the normals of paired faces, in radians
pub const PARALLEL_TOLERANCE: f64 = 0.01;

/// Counters of how far candidate pairs got through the match checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    /// Faces skipped as side faces spanning the stock thickness
    pub depth_faces: usize,
    pub area_ok: usize,
    pub parallel_ok: usize,
    pub outer_connected: usize,
    pub matched: usize,
}

impl AddAssign for MatchStats {
    fn add_assign(&mut self, other: Self) {
        self.depth_faces += other.depth_faces;
        self.area_ok += other.area_ok;
        self.parallel_ok += other.parallel_ok;
        self.outer_connected += other.outer_connected;
        self.matched += other.matched;
    }
}

/// Result of pairing the faces of one container
#[derive(Debug, Default)]
pub struct PairedFaces {
    /// One representative face per matched pair, largest first
    pub found: Vec<FaceKey>,
    /// Faces that found no partner
    pub orphans: usize,
    pub stats: MatchStats,
}

/// Pairs the direct faces of a container.
///
/// Side faces are those with exactly four edges of which at least two have a
/// length strictly inside `depth_window`. Representative faces rebuilt with
/// a subset of their holes are created in `scratch`.
pub fn pair_faces(
    arena: &mut TopologyArena,
    faces: &[FaceKey],
    depth_window: (f64, f64),
    scratch: &mut Scratch,
) -> Result<PairedFaces> {
    let mut result = PairedFaces::default();

    let mut pool: Vec<(FaceKey, f64)> = Vec::with_capacity(faces.len());
    for &face in faces {
        if is_depth_face(arena, face, depth_window) {
            result.stats.depth_faces += 1;
            continue;
        }
        match arena.face_area(face) {
            Some(area) if area >= MIN_FACE_AREA => pool.push((face, area)),
            _ => {}
        }
    }

    // Ascending, so popping yields the largest remaining face
    pool.sort_by(|a, b| a.1.total_cmp(&b.1));

    while let Some((face1, area1)) = pool.pop() {
        let mut hit = None;
        for j in (0..pool.len()).rev() {
            let (face2, area2) = pool[j];
            if (area1 - area2).abs() >= AREA_MATCH_TOLERANCE {
                // everything further down is smaller still
                break;
            }
            result.stats.area_ok += 1;

            if !are_parallel(arena, face1, face2) {
                continue;
            }
            result.stats.parallel_ok += 1;

            if !outer_loops_connected(arena, face1, face2) {
                continue;
            }
            result.stats.outer_connected += 1;

            hit = Some((j, matched_holes(arena, face1, face2)));
            result.stats.matched += 1;
            break;
        }

        match hit {
            Some((j, holes)) => {
                pool.remove(j);
                let all_holes = arena.face_inner_loops(face1).map_or(0, <[_]>::len);
                let representative = if holes.len() == all_holes {
                    face1
                } else {
                    let mut loops = Vec::with_capacity(holes.len() + 1);
                    if let Some(outer) = arena.face_outer_loop(face1) {
                        loops.push(outer);
                    }
                    loops.extend(holes);
                    arena.materialize_loops(&loops, &Transform::identity(), scratch)?
                };
                result.found.push(representative);
            }
            None => result.orphans += 1,
        }
    }

    Ok(result)
}

/// Whether a face is a thin side face of a sheet panel.
pub fn is_depth_face(arena: &TopologyArena, face: FaceKey, (min, max): (f64, f64)) -> bool {
    let Some(edges) = arena.face_edges(face) else {
        return false;
    };
    if edges.len() != 4 {
        return false;
    }
    edges
        .iter()
        .filter_map(|&ek| arena.edge_length(ek))
        .filter(|&len| len > min && len < max)
        .count()
        >= 2
}

fn are_parallel(arena: &TopologyArena, a: FaceKey, b: FaceKey) -> bool {
    let (Some(pa), Some(pb)) = (arena.face_plane(a), arena.face_plane(b)) else {
        return false;
    };
    if intersect_plane_plane(&pa, &pb).is_none() {
        return true;
    }
    let angle = pa.normal.angle(&pb.normal);
    angle < PARALLEL_TOLERANCE || (PI - angle).abs() < PARALLEL_TOLERANCE
}

/// Every vertex of `a` has an edge to a distinct vertex of `b`.
fn loops_connected(arena: &TopologyArena, a: &[VertexKey], b: &[VertexKey]) -> bool {
    let mut used: FxHashSet<VertexKey> = FxHashSet::default();
    a.iter().all(|&va| {
        let partner = b
            .iter()
            .copied()
            .find(|vb| !used.contains(vb) && arena.common_edge(va, *vb).is_some());
        match partner {
            Some(vb) => {
                used.insert(vb);
                true
            }
            None => false,
        }
    })
}

fn outer_loops_connected(arena: &TopologyArena, a: FaceKey, b: FaceKey) -> bool {
    let outer = |f: FaceKey| {
        arena
            .face_outer_loop(f)
            .and_then(|lp| arena.loop_vertices_ordered(lp))
    };
    match (outer(a), outer(b)) {
        (Some(va), Some(vb)) => loops_connected(arena, &va, &vb),
        _ => false,
    }
}

/// Holes of `a` with a counterpart hole in `b` of the same size whose
/// vertices are all joined to it.
fn matched_holes(arena: &TopologyArena, a: FaceKey, b: FaceKey) -> Vec<LoopKey> {
    let hole_vertices = |f: FaceKey| -> Vec<(LoopKey, Vec<VertexKey>)> {
        arena
            .face_inner_loops(f)
            .unwrap_or_default()
            .iter()
            .filter_map(|&lp| arena.loop_vertices_ordered(lp).map(|v| (lp, v)))
            .collect()
    };
    let holes_b = hole_vertices(b);

    hole_vertices(a)
        .into_iter()
        .filter(|(_, va)| {
            holes_b
                .iter()
                .any(|(_, vb)| vb.len() == va.len() && loops_connected(arena, va, vb))
        })
        .map(|(lp, _)| lp)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Vec<[f64; 2]> {
        vec![[x, y], [x + w, y], [x + w, y + h], [x, y + h]]
    }

    #[test]
    fn slab_pairs_top_and_bottom() {
        let mut arena = TopologyArena::new();
        let faces = arena.make_prism(&rect(0.0, 0.0, 600.0, 300.0), &[], 0.0, 18.0).unwrap();
        let mut scratch = Scratch::new();

        let paired = pair_faces(&mut arena, &faces, (17.0, 19.0), &mut scratch).unwrap();
        assert_eq!(paired.found.len(), 1);
        assert!(paired.found[0] == faces[0] || paired.found[0] == faces[1]);
        assert_eq!(paired.orphans, 0);
        assert_eq!(paired.stats.depth_faces, 4);
        assert_eq!(paired.stats.matched, 1);
        assert!(scratch.is_empty());
    }

    #[test]
    fn thick_block_pairs_opposite_sides() {
        let mut arena = TopologyArena::new();
        // 40 thick: side faces are outside the depth window and pair up
        // through the top and bottom outline edges
        let faces = arena.make_prism(&rect(0.0, 0.0, 600.0, 300.0), &[], 0.0, 40.0).unwrap();
        let mut scratch = Scratch::new();

        let paired = pair_faces(&mut arena, &faces, (17.0, 19.0), &mut scratch).unwrap();
        assert_eq!(paired.stats.depth_faces, 0);
        assert_eq!(paired.found.len(), 3);
        assert_eq!(paired.orphans, 0);
    }

    #[test]
    fn lone_face_is_orphan() {
        let mut arena = TopologyArena::new();
        let face = arena
            .add_face_by_coords(&[[0.0, 0.0, 0.0], [100.0, 0.0, 0.0], [100.0, 100.0, 0.0], [0.0, 100.0, 0.0]])
            .unwrap();
        let mut scratch = Scratch::new();
        let paired = pair_faces(&mut arena, &[face], (17.0, 19.0), &mut scratch).unwrap();
        assert!(paired.found.is_empty());
        assert_eq!(paired.orphans, 1);
    }

    #[test]
    fn tiny_faces_are_dropped_silently() {
        let mut arena = TopologyArena::new();
        let face = arena
            .add_face_by_coords(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]])
            .unwrap();
        let mut scratch = Scratch::new();
        let paired = pair_faces(&mut arena, &[face], (17.0, 19.0), &mut scratch).unwrap();
        assert!(paired.found.is_empty());
        assert_eq!(paired.orphans, 0);
    }

    #[test]
    fn unconnected_equal_faces_do_not_pair() {
        let mut arena = TopologyArena::new();
        let a = arena.make_prism(&rect(0.0, 0.0, 100.0, 100.0), &[], 0.0, 18.0).unwrap()[1];
        let b = arena.make_prism(&rect(500.0, 0.0, 100.0, 100.0), &[], 0.0, 18.0).unwrap()[0];
        let mut scratch = Scratch::new();
        let paired = pair_faces(&mut arena, &[a, b], (17.0, 19.0), &mut scratch).unwrap();
        assert!(paired.found.is_empty());
        assert_eq!(paired.orphans, 2);
        assert_eq!(paired.stats.area_ok, 1);
        assert_eq!(paired.stats.parallel_ok, 1);
        assert_eq!(paired.stats.outer_connected, 0);
    }

    #[test]
    fn through_holes_are_kept() {
        let mut arena = TopologyArena::new();
        let faces = arena
            .make_prism(&rect(0.0, 0.0, 600.0, 300.0), &[rect(100.0, 100.0, 50.0, 50.0)], 0.0, 18.0)
            .unwrap();
        let mut scratch = Scratch::new();
        let paired = pair_faces(&mut arena, &faces, (17.0, 19.0), &mut scratch).unwrap();
        assert_eq!(paired.found.len(), 1);
        assert_eq!(arena.face_inner_loops(paired.found[0]).unwrap().len(), 1);
        assert!(scratch.is_empty());
    }

    #[test]
    fn unmatched_hole_is_dropped_from_representative() {
        let mut arena = TopologyArena::new();
        let faces = arena
            .make_prism(&rect(0.0, 0.0, 600.0, 300.0), &[rect(100.0, 100.0, 50.0, 50.0)], 0.0, 18.0)
            .unwrap();
        let (bottom, top) = (faces[0], faces[1]);

        // replace the top hole with one of equal size that does not go through
        let verts: Vec<_> = rect(300.0, 100.0, 50.0, 50.0)
            .iter()
            .map(|p| arena.add_vertex(p[0], p[1], 18.0))
            .collect();
        let pocket = arena.add_loop_by_vertices(&verts).unwrap();
        let top_outer = arena.face_outer_loop(top).unwrap();
        let new_top = arena.add_face_with_holes(top_outer, &[pocket]).unwrap();
        arena.remove_face(top);

        let mut scratch = Scratch::new();
        let paired = pair_faces(&mut arena, &[bottom, new_top], (17.0, 19.0), &mut scratch).unwrap();

        assert_eq!(paired.found.len(), 1);
        let representative = paired.found[0];
        assert_ne!(representative, bottom);
        assert_ne!(representative, new_top);
        assert!(arena.face_inner_loops(representative).unwrap().is_empty());
        assert_relative_eq!(arena.face_area(representative).unwrap(), 180000.0, epsilon = 1e-6);
        assert!(!scratch.is_empty());

        arena.release(scratch);
        assert_eq!(arena.face_count(), faces.len());
    }
}
