// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for boundary topology and the scene graph.
//!
//! The [`TopologyArena`] is the central owner of all model data. Boundary
//! entities (vertex, edge, loop, face) and scene nodes (group, component
//! definition, component instance) live inside slot maps with stable,
//! generational keys. Upward adjacency indices enable both downward
//! traversal (face → loops → edges → vertices) and upward traversal
//! (vertex → which edges use it), which is what panel matching relies on
//! to find the depth edge joining two opposite faces of a sheet.
//!
//! ## Shared edges
//!
//! Faces of the same solid are expected to share their edges: the edge that
//! runs from the top face of a panel to its bottom face is one entity, used
//! by both side faces. [`TopologyArena::add_loop_by_vertices`] reuses an
//! existing edge between two vertices instead of creating a parallel one.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::keys::*;
use crate::transform::Transform;

/// Data stored for a vertex: a point in 3D space.
#[derive(Debug, Clone)]
pub struct VertexData {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Data stored for an edge: a line segment between two vertices.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub start: VertexKey,
    pub end: VertexKey,
}

/// Data stored for a loop: a closed chain of connected edges.
#[derive(Debug, Clone)]
pub struct LoopData {
    /// Edges in order. Each edge shares a vertex with the next one; the
    /// traversal direction of each edge is tracked by `orientations`.
    pub edges: Vec<EdgeKey>,
    /// `true` if edge[i] is traversed forward (start→end), `false` if reversed.
    pub orientations: Vec<bool>,
}

/// Data stored for a face: a planar region bounded by one outer loop and
/// zero or more inner loops (holes).
#[derive(Debug, Clone)]
pub struct FaceData {
    pub outer_loop: LoopKey,
    pub inner_loops: Vec<LoopKey>,
}

/// A named container with its own transform that owns its entities.
#[derive(Debug, Clone)]
pub struct GroupData {
    pub name: String,
    pub transform: Transform,
    pub entities: Vec<Entity>,
}

/// A shared entity list referenced by any number of instances.
#[derive(Debug, Clone)]
pub struct DefinitionData {
    pub name: String,
    pub entities: Vec<Entity>,
}

/// A placement of a component definition.
#[derive(Debug, Clone)]
pub struct InstanceData {
    pub name: String,
    pub definition: DefinitionKey,
    pub transform: Transform,
}

/// The central arena that owns all entities and their adjacency indices.
///
/// # Example
///
/// ```
/// use wikinest_topology::TopologyArena;
///
/// let mut arena = TopologyArena::new();
/// let v0 = arena.add_vertex(0.0, 0.0, 0.0);
/// let v1 = arena.add_vertex(1.0, 0.0, 0.0);
/// let v2 = arena.add_vertex(1.0, 1.0, 0.0);
///
/// assert_eq!(arena.vertex_count(), 3);
/// ```
#[derive(Debug)]
pub struct TopologyArena {
    // Boundary storage
    pub(crate) vertices: SlotMap<VertexKey, VertexData>,
    pub(crate) edges: SlotMap<EdgeKey, EdgeData>,
    pub(crate) loops: SlotMap<LoopKey, LoopData>,
    pub(crate) faces: SlotMap<FaceKey, FaceData>,

    // Scene storage
    pub(crate) groups: SlotMap<GroupKey, GroupData>,
    pub(crate) definitions: SlotMap<DefinitionKey, DefinitionData>,
    pub(crate) instances: SlotMap<InstanceKey, InstanceData>,
    pub(crate) roots: Vec<Entity>,

    // Upward adjacency: child → parents
    pub(crate) vertex_to_edges: FxHashMap<VertexKey, FxHashSet<EdgeKey>>,
    pub(crate) edge_to_loops: FxHashMap<EdgeKey, FxHashSet<LoopKey>>,
    pub(crate) loop_to_faces: FxHashMap<LoopKey, FxHashSet<FaceKey>>,
    pub(crate) face_parent: FxHashMap<FaceKey, Container>,
}

impl TopologyArena {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            loops: SlotMap::with_key(),
            faces: SlotMap::with_key(),

            groups: SlotMap::with_key(),
            definitions: SlotMap::with_key(),
            instances: SlotMap::with_key(),
            roots: Vec::new(),

            vertex_to_edges: FxHashMap::default(),
            edge_to_loops: FxHashMap::default(),
            loop_to_faces: FxHashMap::default(),
            face_parent: FxHashMap::default(),
        }
    }

    // --- Vertex operations ---

    /// Adds a vertex at the given 3D coordinates.
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> VertexKey {
        self.vertices.insert(VertexData { x, y, z })
    }

    /// Returns the vertex data for the given key, or `None` if not found.
    pub fn vertex(&self, key: VertexKey) -> Option<&VertexData> {
        self.vertices.get(key)
    }

    /// Returns the number of vertices in the arena.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the coordinates of a vertex as `[x, y, z]`.
    pub fn vertex_coords(&self, key: VertexKey) -> Option<[f64; 3]> {
        self.vertices.get(key).map(|v| [v.x, v.y, v.z])
    }

    // --- Edge operations ---

    /// Returns the edge data for the given key, or `None` if not found.
    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeData> {
        self.edges.get(key)
    }

    /// Returns the number of edges in the arena.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // --- Loop operations ---

    /// Returns the loop data for the given key, or `None` if not found.
    pub fn loop_data(&self, key: LoopKey) -> Option<&LoopData> {
        self.loops.get(key)
    }

    /// Returns the number of loops in the arena.
    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    // --- Face operations ---

    /// Returns the face data for the given key, or `None` if not found.
    pub fn face(&self, key: FaceKey) -> Option<&FaceData> {
        self.faces.get(key)
    }

    /// Returns the number of faces in the arena.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    // --- Scene operations ---

    /// Returns the group data for the given key, or `None` if not found.
    pub fn group(&self, key: GroupKey) -> Option<&GroupData> {
        self.groups.get(key)
    }

    /// Returns the number of groups in the arena.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Returns the component definition for the given key.
    pub fn definition(&self, key: DefinitionKey) -> Option<&DefinitionData> {
        self.definitions.get(key)
    }

    /// Returns the number of component definitions in the arena.
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Returns the component instance for the given key.
    pub fn instance(&self, key: InstanceKey) -> Option<&InstanceData> {
        self.instances.get(key)
    }

    /// Returns the number of component instances in the arena.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Top-level entities of the model, in insertion order.
    pub fn roots(&self) -> &[Entity] {
        &self.roots
    }

    // --- Entity existence checks ---

    /// Returns `true` if the given key references a valid entity.
    pub fn contains(&self, key: TopologyKey) -> bool {
        match key {
            TopologyKey::Vertex(k) => self.vertices.contains_key(k),
            TopologyKey::Edge(k) => self.edges.contains_key(k),
            TopologyKey::Loop(k) => self.loops.contains_key(k),
            TopologyKey::Face(k) => self.faces.contains_key(k),
            TopologyKey::Group(k) => self.groups.contains_key(k),
            TopologyKey::Definition(k) => self.definitions.contains_key(k),
            TopologyKey::Instance(k) => self.instances.contains_key(k),
        }
    }

    // --- Adjacency index helpers ---

    /// Register that an edge uses a vertex (upward adjacency).
    pub(crate) fn link_vertex_edge(&mut self, vertex: VertexKey, edge: EdgeKey) {
        self.vertex_to_edges
            .entry(vertex)
            .or_default()
            .insert(edge);
    }

    /// Register that a loop uses an edge (upward adjacency).
    pub(crate) fn link_edge_loop(&mut self, edge: EdgeKey, lp: LoopKey) {
        self.edge_to_loops.entry(edge).or_default().insert(lp);
    }

    /// Register that a face uses a loop (upward adjacency).
    pub(crate) fn link_loop_face(&mut self, lp: LoopKey, face: FaceKey) {
        self.loop_to_faces.entry(lp).or_default().insert(face);
    }
}

impl Default for TopologyArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_no_entities_or_roots() {
        let arena = TopologyArena::default();
        assert_eq!(
            (arena.vertex_count(), arena.edge_count(), arena.loop_count()),
            (0, 0, 0)
        );
        assert_eq!(arena.face_count(), 0);
        assert_eq!(arena.group_count() + arena.definition_count() + arena.instance_count(), 0);
        assert!(arena.roots().is_empty());
    }

    #[test]
    fn vertex_reads_back_in_millimetres() {
        let mut arena = TopologyArena::new();
        let corner = arena.add_vertex(2400.0, -18.0, 1200.5);

        assert_eq!(arena.vertex_coords(corner), Some([2400.0, -18.0, 1200.5]));
        assert_eq!(arena.vertex(corner).map(|v| v.y), Some(-18.0));
    }

    #[test]
    fn stale_keys_are_not_contained() {
        let mut arena = TopologyArena::new();
        let kept = arena.add_vertex(0.0, 0.0, 0.0);
        let dropped = arena.add_vertex(1.0, 0.0, 0.0);
        arena.vertices.remove(dropped);

        assert!(arena.contains(TopologyKey::Vertex(kept)));
        assert!(!arena.contains(TopologyKey::Vertex(dropped)));
        assert_eq!(arena.vertex(dropped).map(|v| v.x), None);
    }
}
