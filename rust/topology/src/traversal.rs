// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Traversal methods for navigating the boundary hierarchy.
//!
//! Downward traversal (face → loops → edges → vertices) plus the upward
//! lookups the extractor needs from the adjacency index.

use rustc_hash::FxHashSet;

use crate::arena::TopologyArena;
use crate::keys::*;

impl TopologyArena {
    /// Returns the start and end vertex keys of an edge.
    pub fn edge_vertices(&self, key: EdgeKey) -> Option<(VertexKey, VertexKey)> {
        self.edges.get(key).map(|e| (e.start, e.end))
    }

    /// Returns the edge keys of a loop, in stored order.
    pub fn loop_edges(&self, key: LoopKey) -> Option<&[EdgeKey]> {
        self.loops.get(key).map(|l| l.edges.as_slice())
    }

    /// Returns the vertices of a loop in traversal order.
    ///
    /// The order follows edge connectivity; the winding direction is
    /// whatever the loop was built with.
    pub fn loop_vertices_ordered(&self, key: LoopKey) -> Option<Vec<VertexKey>> {
        let lp = self.loops.get(key)?;
        let mut vertices = Vec::with_capacity(lp.edges.len());

        for (i, &ek) in lp.edges.iter().enumerate() {
            let edge = self.edges.get(ek)?;
            let start = if lp.orientations[i] {
                edge.start
            } else {
                edge.end
            };
            vertices.push(start);
        }

        Some(vertices)
    }

    /// Returns the outer loop of a face.
    pub fn face_outer_loop(&self, key: FaceKey) -> Option<LoopKey> {
        self.faces.get(key).map(|f| f.outer_loop)
    }

    /// Returns the inner (hole) loops of a face.
    pub fn face_inner_loops(&self, key: FaceKey) -> Option<&[LoopKey]> {
        self.faces.get(key).map(|f| f.inner_loops.as_slice())
    }

    /// Returns every loop of a face: the outer loop first, then the holes.
    pub fn face_loops(&self, key: FaceKey) -> Option<Vec<LoopKey>> {
        let face = self.faces.get(key)?;
        let mut loops = Vec::with_capacity(1 + face.inner_loops.len());
        loops.push(face.outer_loop);
        loops.extend_from_slice(&face.inner_loops);
        Some(loops)
    }

    /// Returns the outer-loop vertices of a face in traversal order.
    pub fn face_vertices_ordered(&self, key: FaceKey) -> Option<Vec<VertexKey>> {
        let face = self.faces.get(key)?;
        self.loop_vertices_ordered(face.outer_loop)
    }

    /// Returns all unique edge keys in a face, across every loop.
    pub fn face_edges(&self, key: FaceKey) -> Option<FxHashSet<EdgeKey>> {
        let face = self.faces.get(key)?;
        let mut set = FxHashSet::default();
        if let Some(lp) = self.loops.get(face.outer_loop) {
            set.extend(&lp.edges);
        }
        for &il in &face.inner_loops {
            if let Some(lp) = self.loops.get(il) {
                set.extend(&lp.edges);
            }
        }
        Some(set)
    }

    // =========================================================================
    // Upward traversal
    // =========================================================================

    /// Returns the edge joining two vertices, in either direction.
    pub fn common_edge(&self, a: VertexKey, b: VertexKey) -> Option<EdgeKey> {
        let edges = self.vertex_to_edges.get(&a)?;
        edges.iter().copied().find(|&ek| {
            self.edges
                .get(ek)
                .is_some_and(|e| (e.start == a && e.end == b) || (e.start == b && e.end == a))
        })
    }

    /// Returns the loops that use an edge.
    pub fn edge_loops(&self, key: EdgeKey) -> Vec<LoopKey> {
        self.edge_to_loops
            .get(&key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::make_rectangle;

    fn unit_square(arena: &mut TopologyArena) -> (FaceKey, [VertexKey; 4]) {
        let v = [
            arena.add_vertex(0.0, 0.0, 0.0),
            arena.add_vertex(1.0, 0.0, 0.0),
            arena.add_vertex(1.0, 1.0, 0.0),
            arena.add_vertex(0.0, 1.0, 0.0),
        ];
        let (face, _, _) = make_rectangle(arena, v[0], v[1], v[2], v[3]).unwrap();
        (face, v)
    }

    #[test]
    fn loop_vertices_follow_connectivity() {
        let mut arena = TopologyArena::new();
        let (face, v) = unit_square(&mut arena);
        let ordered = arena.face_vertices_ordered(face).unwrap();
        assert_eq!(ordered, v.to_vec());
    }

    #[test]
    fn face_edges_and_loops() {
        let mut arena = TopologyArena::new();
        let (face, _) = unit_square(&mut arena);
        assert_eq!(arena.face_edges(face).unwrap().len(), 4);
        assert_eq!(arena.face_loops(face).unwrap().len(), 1);
    }

    #[test]
    fn common_edge_lookup() {
        let mut arena = TopologyArena::new();
        let (_, v) = unit_square(&mut arena);
        assert!(arena.common_edge(v[0], v[1]).is_some());
        assert!(arena.common_edge(v[1], v[0]).is_some());
        assert!(arena.common_edge(v[0], v[2]).is_none());
    }

    #[test]
    fn box_edges_are_shared_by_two_loops() {
        let mut arena = TopologyArena::new();
        let faces = arena.make_box([0.0, 0.0, 0.0], 1.0, 1.0, 1.0).unwrap();
        for ek in arena.face_edges(faces[0]).unwrap() {
            assert_eq!(arena.edge_loops(ek).len(), 2);
        }
    }
}
