// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based storage.
//!
//! Every boundary entity (vertex, edge, loop, face) and every scene node
//! (group, component definition, component instance) gets a unique,
//! type-safe key. Keys are created by `slotmap::SlotMap` and remain valid
//! even after other entities are removed (generational indices).

use slotmap::new_key_type;

new_key_type! {
    /// Key for a vertex (point in 3D space).
    pub struct VertexKey;

    /// Key for an edge (line segment between two vertices).
    pub struct EdgeKey;

    /// Key for a loop (closed chain of connected edges).
    pub struct LoopKey;

    /// Key for a face (planar polygon bounded by one outer loop and any holes).
    pub struct FaceKey;

    /// Key for a group (named, transformed container owning its entities).
    pub struct GroupKey;

    /// Key for a component definition (shared entity list).
    pub struct DefinitionKey;

    /// Key for a component instance (transformed reference to a definition).
    pub struct InstanceKey;
}

/// A key that can reference any entity stored in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyKey {
    Vertex(VertexKey),
    Edge(EdgeKey),
    Loop(LoopKey),
    Face(FaceKey),
    Group(GroupKey),
    Definition(DefinitionKey),
    Instance(InstanceKey),
}

/// A child entity of the scene graph: what a group or definition contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Face(FaceKey),
    Group(GroupKey),
    Instance(InstanceKey),
}

/// Something that owns a list of entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Group(GroupKey),
    Definition(DefinitionKey),
}

// Conversion impls from specific keys to TopologyKey
impl From<VertexKey> for TopologyKey {
    fn from(k: VertexKey) -> Self {
        TopologyKey::Vertex(k)
    }
}

impl From<EdgeKey> for TopologyKey {
    fn from(k: EdgeKey) -> Self {
        TopologyKey::Edge(k)
    }
}

impl From<LoopKey> for TopologyKey {
    fn from(k: LoopKey) -> Self {
        TopologyKey::Loop(k)
    }
}

impl From<FaceKey> for TopologyKey {
    fn from(k: FaceKey) -> Self {
        TopologyKey::Face(k)
    }
}

impl From<GroupKey> for TopologyKey {
    fn from(k: GroupKey) -> Self {
        TopologyKey::Group(k)
    }
}

impl From<DefinitionKey> for TopologyKey {
    fn from(k: DefinitionKey) -> Self {
        TopologyKey::Definition(k)
    }
}

impl From<InstanceKey> for TopologyKey {
    fn from(k: InstanceKey) -> Self {
        TopologyKey::Instance(k)
    }
}

impl From<Entity> for TopologyKey {
    fn from(e: Entity) -> Self {
        match e {
            Entity::Face(k) => TopologyKey::Face(k),
            Entity::Group(k) => TopologyKey::Group(k),
            Entity::Instance(k) => TopologyKey::Instance(k),
        }
    }
}

impl From<Container> for TopologyKey {
    fn from(c: Container) -> Self {
        match c {
            Container::Group(k) => TopologyKey::Group(k),
            Container::Definition(k) => TopologyKey::Definition(k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_nodes_convert_to_generic_keys() {
        let mut groups = slotmap::SlotMap::<GroupKey, ()>::with_key();
        let mut faces = slotmap::SlotMap::<FaceKey, ()>::with_key();
        let g = groups.insert(());
        let f = faces.insert(());

        assert_eq!(TopologyKey::from(Entity::Face(f)), TopologyKey::Face(f));
        assert_eq!(TopologyKey::from(Container::Group(g)), TopologyKey::Group(g));
        assert_eq!(TopologyKey::from(Entity::Group(g)), TopologyKey::from(g));
    }
}
