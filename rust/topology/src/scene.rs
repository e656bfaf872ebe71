// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene graph: groups, component definitions and component instances.
//!
//! A group owns its entity list directly. A component definition holds an
//! entity list shared by every instance that references it; each instance
//! adds its own transform and name. Faces remember which container they
//! were placed in, so unmatched faces can be reported against their parent.

use rustc_hash::FxHashSet;

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;
use crate::transform::Transform;

impl TopologyArena {
    /// Creates an empty group.
    pub fn add_group(&mut self, name: impl Into<String>, transform: Transform) -> GroupKey {
        self.groups.insert(GroupData {
            name: name.into(),
            transform,
            entities: Vec::new(),
        })
    }

    /// Creates an empty component definition.
    pub fn add_definition(&mut self, name: impl Into<String>) -> DefinitionKey {
        self.definitions.insert(DefinitionData {
            name: name.into(),
            entities: Vec::new(),
        })
    }

    /// Creates an instance of an existing component definition.
    pub fn add_instance(
        &mut self,
        name: impl Into<String>,
        definition: DefinitionKey,
        transform: Transform,
    ) -> Result<InstanceKey> {
        if !self.definitions.contains_key(definition) {
            return Err(Error::DefinitionNotFound(definition));
        }
        Ok(self.instances.insert(InstanceData {
            name: name.into(),
            definition,
            transform,
        }))
    }

    /// Appends an entity to a group or definition.
    ///
    /// Fails with [`Error::CyclicNesting`] when the entity already contains
    /// the container, directly or through nested groups and instances, so
    /// the scene graph stays acyclic.
    pub fn add_to_container(&mut self, container: Container, entity: Entity) -> Result<()> {
        self.check_entity(entity)?;
        if self.nests(entity, container) {
            return Err(Error::CyclicNesting { container, entity });
        }
        let entities = match container {
            Container::Group(g) => {
                &mut self
                    .groups
                    .get_mut(g)
                    .ok_or(Error::GroupNotFound(g))?
                    .entities
            }
            Container::Definition(d) => {
                &mut self
                    .definitions
                    .get_mut(d)
                    .ok_or(Error::DefinitionNotFound(d))?
                    .entities
            }
        };
        entities.push(entity);
        if let Entity::Face(f) = entity {
            self.face_parent.insert(f, container);
        }
        Ok(())
    }

    /// Appends an entity to the top level of the model.
    pub fn add_root(&mut self, entity: Entity) -> Result<()> {
        self.check_entity(entity)?;
        self.roots.push(entity);
        Ok(())
    }

    /// Returns the entities owned by a group or definition.
    pub fn container_entities(&self, container: Container) -> Option<&[Entity]> {
        match container {
            Container::Group(g) => self.groups.get(g).map(|d| d.entities.as_slice()),
            Container::Definition(d) => self.definitions.get(d).map(|d| d.entities.as_slice()),
        }
    }

    /// Returns the name of a group or definition.
    pub fn container_name(&self, container: Container) -> Option<&str> {
        match container {
            Container::Group(g) => self.groups.get(g).map(|d| d.name.as_str()),
            Container::Definition(d) => self.definitions.get(d).map(|d| d.name.as_str()),
        }
    }

    /// Returns the container a face was placed in, if any.
    pub fn face_parent(&self, face: FaceKey) -> Option<Container> {
        self.face_parent.get(&face).copied()
    }

    /// Returns the local transform of a group or instance.
    ///
    /// Faces carry no transform of their own and report the identity.
    pub fn entity_transform(&self, entity: Entity) -> Result<Transform> {
        match entity {
            Entity::Face(f) => {
                if self.faces.contains_key(f) {
                    Ok(Transform::identity())
                } else {
                    Err(Error::FaceNotFound(f))
                }
            }
            Entity::Group(g) => self
                .groups
                .get(g)
                .map(|d| d.transform)
                .ok_or(Error::GroupNotFound(g)),
            Entity::Instance(i) => self
                .instances
                .get(i)
                .map(|d| d.transform)
                .ok_or(Error::InstanceNotFound(i)),
        }
    }

    /// Returns the name of a group or instance, or `None` for faces.
    pub fn entity_name(&self, entity: Entity) -> Option<&str> {
        match entity {
            Entity::Face(_) => None,
            Entity::Group(g) => self.groups.get(g).map(|d| d.name.as_str()),
            Entity::Instance(i) => self.instances.get(i).map(|d| d.name.as_str()),
        }
    }

    /// Whether `target` is `entity`'s own container or lies anywhere below it.
    fn nests(&self, entity: Entity, target: Container) -> bool {
        let mut seen: FxHashSet<Container> = FxHashSet::default();
        let mut stack = vec![entity];
        while let Some(e) = stack.pop() {
            let container = match e {
                Entity::Face(_) => continue,
                Entity::Group(g) => Container::Group(g),
                Entity::Instance(i) => match self.instances.get(i) {
                    Some(data) => Container::Definition(data.definition),
                    None => continue,
                },
            };
            if container == target {
                return true;
            }
            if seen.insert(container) {
                if let Some(children) = self.container_entities(container) {
                    stack.extend(children.iter().copied());
                }
            }
        }
        false
    }

    fn check_entity(&self, entity: Entity) -> Result<()> {
        if self.contains(entity.into()) {
            Ok(())
        } else {
            Err(Error::NotFound(entity.into()))
        }
    }
}
