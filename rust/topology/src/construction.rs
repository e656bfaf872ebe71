// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction and removal of boundary entities.
//!
//! Each entity is created through the arena, which ensures referential
//! integrity (all referenced sub-entities must exist) and maintains the
//! upward adjacency index. Removal unlinks the entity from every index so
//! that scratch geometry can be discarded without leaving stale adjacency.

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

impl TopologyArena {
    /// Creates an edge between two existing vertices.
    ///
    /// Returns an error if either vertex does not exist in the arena.
    pub fn add_edge(&mut self, start: VertexKey, end: VertexKey) -> Result<EdgeKey> {
        if !self.vertices.contains_key(start) {
            return Err(Error::VertexNotFound(start));
        }
        if !self.vertices.contains_key(end) {
            return Err(Error::VertexNotFound(end));
        }

        let key = self.edges.insert(EdgeData { start, end });
        self.link_vertex_edge(start, key);
        self.link_vertex_edge(end, key);
        Ok(key)
    }

    /// Returns the existing edge between two vertices, or creates one.
    pub fn find_or_add_edge(&mut self, start: VertexKey, end: VertexKey) -> Result<EdgeKey> {
        match self.common_edge(start, end) {
            Some(existing) => Ok(existing),
            None => self.add_edge(start, end),
        }
    }

    /// Creates a loop from an ordered list of edges.
    ///
    /// The edges must form a connected chain: each edge shares a vertex with
    /// the next edge. The loop tracks the orientation of each edge to keep a
    /// consistent traversal direction.
    ///
    /// Returns an error if the edge list is empty or edges are not connected.
    pub fn add_loop(&mut self, edge_keys: &[EdgeKey]) -> Result<LoopKey> {
        if edge_keys.is_empty() {
            return Err(Error::EmptyLoop);
        }

        for &ek in edge_keys {
            if !self.edges.contains_key(ek) {
                return Err(Error::EdgeNotFound(ek));
            }
        }

        let mut orientations = Vec::with_capacity(edge_keys.len());

        if edge_keys.len() == 1 {
            orientations.push(true);
        } else {
            // First edge orientation follows from the second edge
            let first = &self.edges[edge_keys[0]];
            let second = &self.edges[edge_keys[1]];

            if first.end == second.start || first.end == second.end {
                orientations.push(true);
            } else if first.start == second.start || first.start == second.end {
                orientations.push(false);
            } else {
                return Err(Error::DisconnectedLoop(0, 1));
            }

            for i in 1..edge_keys.len() {
                let prev_edge = &self.edges[edge_keys[i - 1]];
                let curr_edge = &self.edges[edge_keys[i]];

                let prev_end = if orientations[i - 1] {
                    prev_edge.end
                } else {
                    prev_edge.start
                };

                if prev_end == curr_edge.start {
                    orientations.push(true);
                } else if prev_end == curr_edge.end {
                    orientations.push(false);
                } else {
                    return Err(Error::DisconnectedLoop(i - 1, i));
                }
            }
        }

        let key = self.loops.insert(LoopData {
            edges: edge_keys.to_vec(),
            orientations,
        });

        for &ek in edge_keys {
            self.link_edge_loop(ek, key);
        }

        Ok(key)
    }

    /// Creates a face from an outer boundary loop.
    ///
    /// The loop must have at least 3 edges to form a valid face.
    pub fn add_face(&mut self, outer_loop: LoopKey) -> Result<FaceKey> {
        self.add_face_with_holes(outer_loop, &[])
    }

    /// Creates a face with an outer boundary and inner boundary loops (holes).
    ///
    /// Loops may be shared with other faces; the new face only registers
    /// itself in the adjacency index.
    pub fn add_face_with_holes(
        &mut self,
        outer_loop: LoopKey,
        inner_loops: &[LoopKey],
    ) -> Result<FaceKey> {
        let outer = self
            .loops
            .get(outer_loop)
            .ok_or(Error::LoopNotFound(outer_loop))?;

        if outer.edges.len() < 3 {
            return Err(Error::DegenerateFace);
        }

        for &il in inner_loops {
            if !self.loops.contains_key(il) {
                return Err(Error::LoopNotFound(il));
            }
        }

        let key = self.faces.insert(FaceData {
            outer_loop,
            inner_loops: inner_loops.to_vec(),
        });

        self.link_loop_face(outer_loop, key);
        for &il in inner_loops {
            self.link_loop_face(il, key);
        }

        Ok(key)
    }

    // --- Removal ---

    /// Removes a face and unlinks it from its loops and parent container.
    ///
    /// The loops themselves are left in place.
    pub fn remove_face(&mut self, key: FaceKey) -> bool {
        let Some(face) = self.faces.remove(key) else {
            return false;
        };
        for lp in std::iter::once(face.outer_loop).chain(face.inner_loops) {
            if let Some(set) = self.loop_to_faces.get_mut(&lp) {
                set.remove(&key);
                if set.is_empty() {
                    self.loop_to_faces.remove(&lp);
                }
            }
        }
        if let Some(parent) = self.face_parent.remove(&key) {
            let entities = match parent {
                Container::Group(g) => self.groups.get_mut(g).map(|d| &mut d.entities),
                Container::Definition(d) => self.definitions.get_mut(d).map(|d| &mut d.entities),
            };
            if let Some(entities) = entities {
                entities.retain(|e| *e != Entity::Face(key));
            }
        }
        self.roots.retain(|e| *e != Entity::Face(key));
        true
    }

    /// Removes a loop and unlinks it from its edges.
    pub fn remove_loop(&mut self, key: LoopKey) -> bool {
        let Some(lp) = self.loops.remove(key) else {
            return false;
        };
        for ek in lp.edges {
            if let Some(set) = self.edge_to_loops.get_mut(&ek) {
                set.remove(&key);
                if set.is_empty() {
                    self.edge_to_loops.remove(&ek);
                }
            }
        }
        self.loop_to_faces.remove(&key);
        true
    }

    /// Removes an edge and unlinks it from its vertices.
    pub fn remove_edge(&mut self, key: EdgeKey) -> bool {
        let Some(edge) = self.edges.remove(key) else {
            return false;
        };
        for vk in [edge.start, edge.end] {
            if let Some(set) = self.vertex_to_edges.get_mut(&vk) {
                set.remove(&key);
                if set.is_empty() {
                    self.vertex_to_edges.remove(&vk);
                }
            }
        }
        self.edge_to_loops.remove(&key);
        true
    }

    /// Removes a vertex.
    pub fn remove_vertex(&mut self, key: VertexKey) -> bool {
        self.vertex_to_edges.remove(&key);
        self.vertices.remove(key).is_some()
    }

    /// Removes a boundary entity by generic key.
    ///
    /// Scene nodes are never removed this way and report `false`.
    pub fn remove(&mut self, key: TopologyKey) -> bool {
        match key {
            TopologyKey::Vertex(k) => self.remove_vertex(k),
            TopologyKey::Edge(k) => self.remove_edge(k),
            TopologyKey::Loop(k) => self.remove_loop(k),
            TopologyKey::Face(k) => self.remove_face(k),
            TopologyKey::Group(_) | TopologyKey::Definition(_) | TopologyKey::Instance(_) => false,
        }
    }
}

/// Helper to build a rectangular face from four corner vertices.
///
/// Creates (or reuses) 4 edges, 1 loop, and 1 face. Returns
/// `(face_key, loop_key, edge_keys)`.
pub fn make_rectangle(
    arena: &mut TopologyArena,
    v0: VertexKey,
    v1: VertexKey,
    v2: VertexKey,
    v3: VertexKey,
) -> Result<(FaceKey, LoopKey, [EdgeKey; 4])> {
    let e0 = arena.find_or_add_edge(v0, v1)?;
    let e1 = arena.find_or_add_edge(v1, v2)?;
    let e2 = arena.find_or_add_edge(v2, v3)?;
    let e3 = arena.find_or_add_edge(v3, v0)?;
    let lp = arena.add_loop(&[e0, e1, e2, e3])?;
    let face = arena.add_face(lp)?;
    Ok((face, lp, [e0, e1, e2, e3]))
}
