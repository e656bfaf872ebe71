// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON scene snapshots.
//!
//! A snapshot lists vertex positions, faces as vertex-index polygons, and
//! the scene graph (groups, component definitions, instances, top-level
//! entities). Transforms are 16 numbers in row-major order. Faces are
//! rebuilt with shared edges, so adjacent faces of a solid stay connected.
//!
//! ```json
//! {
//!   "vertices": [[0, 0, 0], [1200, 0, 0], ...],
//!   "faces": [{ "outer": [0, 1, 2, 3], "holes": [] }],
//!   "definitions": [{ "name": "Floor", "entities": [{ "face": 0 }] }],
//!   "instances": [{ "name": "F1", "definition": 0, "transform": [1, 0, 0, 0, ...] }],
//!   "groups": [],
//!   "roots": [{ "instance": 0 }]
//! }
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::arena::TopologyArena;
use crate::error::{Error, Result};
use crate::keys::*;
use crate::transform::Transform;

/// Serializable representation of a scene.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<FaceSnapshot>,
    #[serde(default)]
    pub definitions: Vec<DefinitionSnapshot>,
    #[serde(default)]
    pub groups: Vec<GroupSnapshot>,
    #[serde(default)]
    pub instances: Vec<InstanceSnapshot>,
    #[serde(default)]
    pub roots: Vec<EntityRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceSnapshot {
    pub outer: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entities: Vec<EntityRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default = "identity_row_major")]
    pub transform: [f64; 16],
    #[serde(default)]
    pub entities: Vec<EntityRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSnapshot {
    #[serde(default)]
    pub name: String,
    pub definition: usize,
    #[serde(default = "identity_row_major")]
    pub transform: [f64; 16],
}

/// Reference to a face, group or instance by snapshot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityRef {
    Face(usize),
    Group(usize),
    Instance(usize),
}

fn identity_row_major() -> [f64; 16] {
    Transform::identity().to_row_major()
}

fn pick<K: Copy>(keys: &[K], index: usize, kind: &'static str) -> Result<K> {
    keys.get(index)
        .copied()
        .ok_or(Error::DanglingReference { kind, index })
}

impl SceneSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl TopologyArena {
    /// Builds an arena from a JSON scene snapshot.
    pub fn from_scene_json(json: &str) -> Result<Self> {
        let snapshot = SceneSnapshot::from_json(json)?;
        Self::from_snapshot(&snapshot)
    }

    /// Serializes the scene to a JSON snapshot string.
    pub fn to_scene_json(&self) -> Result<String> {
        self.to_snapshot().to_json()
    }

    /// Reconstructs an arena from a snapshot.
    pub fn from_snapshot(snap: &SceneSnapshot) -> Result<Self> {
        let mut arena = TopologyArena::new();

        let vertex_keys: Vec<VertexKey> = snap
            .vertices
            .iter()
            .map(|p| arena.add_vertex(p[0], p[1], p[2]))
            .collect();

        let mut face_keys = Vec::with_capacity(snap.faces.len());
        for fs in &snap.faces {
            let outer = fs
                .outer
                .iter()
                .map(|&i| pick(&vertex_keys, i, "vertex"))
                .collect::<Result<Vec<_>>>()?;
            let holes = fs
                .holes
                .iter()
                .map(|hole| {
                    hole.iter()
                        .map(|&i| pick(&vertex_keys, i, "vertex"))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()?;
            face_keys.push(arena.add_face_by_vertices_with_holes(&outer, &holes)?);
        }

        let definition_keys: Vec<DefinitionKey> = snap
            .definitions
            .iter()
            .map(|d| arena.add_definition(d.name.clone()))
            .collect();

        let group_keys: Vec<GroupKey> = snap
            .groups
            .iter()
            .map(|g| arena.add_group(g.name.clone(), Transform::from_row_major(&g.transform)))
            .collect();

        let mut instance_keys = Vec::with_capacity(snap.instances.len());
        for is in &snap.instances {
            let def = pick(&definition_keys, is.definition, "definition")?;
            instance_keys.push(arena.add_instance(
                is.name.clone(),
                def,
                Transform::from_row_major(&is.transform),
            )?);
        }

        let resolve = |r: &EntityRef| -> Result<Entity> {
            Ok(match *r {
                EntityRef::Face(i) => Entity::Face(pick(&face_keys, i, "face")?),
                EntityRef::Group(i) => Entity::Group(pick(&group_keys, i, "group")?),
                EntityRef::Instance(i) => Entity::Instance(pick(&instance_keys, i, "instance")?),
            })
        };

        let mut links = Vec::new();
        for (ds, &dk) in snap.definitions.iter().zip(&definition_keys) {
            for r in &ds.entities {
                links.push((Container::Definition(dk), resolve(r)?));
            }
        }
        for (gs, &gk) in snap.groups.iter().zip(&group_keys) {
            for r in &gs.entities {
                links.push((Container::Group(gk), resolve(r)?));
            }
        }
        let roots = snap.roots.iter().map(resolve).collect::<Result<Vec<_>>>()?;

        for (container, entity) in links {
            arena.add_to_container(container, entity)?;
        }
        for entity in roots {
            arena.add_root(entity)?;
        }

        Ok(arena)
    }

    /// Creates a serializable snapshot of the scene.
    ///
    /// SlotMap keys are mapped to sequential integer IDs for portability.
    pub fn to_snapshot(&self) -> SceneSnapshot {
        let vertex_ids: FxHashMap<VertexKey, usize> = self
            .vertices
            .keys()
            .enumerate()
            .map(|(i, k)| (k, i))
            .collect();
        let face_ids: FxHashMap<FaceKey, usize> =
            self.faces.keys().enumerate().map(|(i, k)| (k, i)).collect();
        let group_ids: FxHashMap<GroupKey, usize> =
            self.groups.keys().enumerate().map(|(i, k)| (k, i)).collect();
        let definition_ids: FxHashMap<DefinitionKey, usize> = self
            .definitions
            .keys()
            .enumerate()
            .map(|(i, k)| (k, i))
            .collect();
        let instance_ids: FxHashMap<InstanceKey, usize> = self
            .instances
            .keys()
            .enumerate()
            .map(|(i, k)| (k, i))
            .collect();

        let loop_indices = |lp: LoopKey| -> Vec<usize> {
            self.loop_vertices_ordered(lp)
                .unwrap_or_default()
                .iter()
                .map(|vk| vertex_ids[vk])
                .collect()
        };
        let entity_ref = |e: &Entity| match *e {
            Entity::Face(f) => EntityRef::Face(face_ids[&f]),
            Entity::Group(g) => EntityRef::Group(group_ids[&g]),
            Entity::Instance(i) => EntityRef::Instance(instance_ids[&i]),
        };

        SceneSnapshot {
            vertices: self.vertices.values().map(|v| [v.x, v.y, v.z]).collect(),
            faces: self
                .faces
                .values()
                .map(|f| FaceSnapshot {
                    outer: loop_indices(f.outer_loop),
                    holes: f.inner_loops.iter().map(|&l| loop_indices(l)).collect(),
                })
                .collect(),
            definitions: self
                .definitions
                .values()
                .map(|d| DefinitionSnapshot {
                    name: d.name.clone(),
                    entities: d.entities.iter().map(entity_ref).collect(),
                })
                .collect(),
            groups: self
                .groups
                .values()
                .map(|g| GroupSnapshot {
                    name: g.name.clone(),
                    transform: g.transform.to_row_major(),
                    entities: g.entities.iter().map(entity_ref).collect(),
                })
                .collect(),
            instances: self
                .instances
                .values()
                .map(|i| InstanceSnapshot {
                    name: i.name.clone(),
                    definition: definition_ids[&i.definition],
                    transform: i.transform.to_row_major(),
                })
                .collect(),
            roots: self.roots.iter().map(entity_ref).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BOX_SCENE: &str = r#"{
        "vertices": [
            [0, 0, 0], [100, 0, 0], [100, 50, 0], [0, 50, 0],
            [0, 0, 18], [100, 0, 18], [100, 50, 18], [0, 50, 18]
        ],
        "faces": [
            { "outer": [0, 1, 2, 3] },
            { "outer": [4, 5, 6, 7] },
            { "outer": [0, 1, 5, 4] },
            { "outer": [1, 2, 6, 5] },
            { "outer": [2, 3, 7, 6] },
            { "outer": [3, 0, 4, 7] }
        ],
        "definitions": [
            { "name": "Panel", "entities": [
                { "face": 0 }, { "face": 1 }, { "face": 2 },
                { "face": 3 }, { "face": 4 }, { "face": 5 }
            ] }
        ],
        "instances": [
            { "name": "P1", "definition": 0 },
            { "name": "P2", "definition": 0,
              "transform": [1, 0, 0, 500, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1] }
        ],
        "roots": [{ "instance": 0 }, { "instance": 1 }]
    }"#;

    #[test]
    fn loads_shared_edges() {
        let arena = TopologyArena::from_scene_json(BOX_SCENE).unwrap();
        assert_eq!(arena.face_count(), 6);
        assert_eq!(arena.edge_count(), 12);
        assert_eq!(arena.instance_count(), 2);
        assert_eq!(arena.roots().len(), 2);
    }

    #[test]
    fn instance_transform_is_row_major() {
        let arena = TopologyArena::from_scene_json(BOX_SCENE).unwrap();
        let Entity::Instance(second) = arena.roots()[1] else {
            panic!("expected instance root");
        };
        let t = arena.instance(second).unwrap().transform;
        let p = t.apply_point(&nalgebra::Point3::origin());
        assert_relative_eq!(p.x, 500.0);
    }

    #[test]
    fn round_trip_preserves_scene() {
        let arena = TopologyArena::from_scene_json(BOX_SCENE).unwrap();
        let json = arena.to_scene_json().unwrap();
        let reloaded = TopologyArena::from_scene_json(&json).unwrap();
        assert_eq!(reloaded.face_count(), 6);
        assert_eq!(reloaded.edge_count(), 12);
        assert_eq!(reloaded.definition_count(), 1);
        assert_eq!(reloaded.roots().len(), 2);
    }

    #[test]
    fn dangling_reference_is_rejected() {
        let json = r#"{ "vertices": [[0,0,0]], "faces": [{ "outer": [0, 1, 2] }] }"#;
        assert!(matches!(
            TopologyArena::from_scene_json(json),
            Err(Error::DanglingReference { kind: "vertex", index: 1 })
        ));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        assert!(matches!(
            TopologyArena::from_scene_json("{"),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn self_nesting_definition_is_rejected() {
        let json = r#"{
            "vertices": [],
            "faces": [],
            "definitions": [{ "name": "Loop", "entities": [{ "instance": 0 }] }],
            "instances": [{ "name": "L1", "definition": 0 }],
            "roots": [{ "instance": 0 }]
        }"#;
        assert!(matches!(
            TopologyArena::from_scene_json(json),
            Err(Error::CyclicNesting { .. })
        ));
    }
}
