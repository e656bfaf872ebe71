// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # WikiNest Topology
//!
//! Boundary topology and scene graph for panelised building models.
//!
//! This crate provides an arena-based data structure where boundary entities
//! (vertices, edges, loops, faces) and scene nodes (groups, component
//! definitions, component instances) are stored in slot maps with upward
//! adjacency indices. Faces of a solid share their edges, which is what lets
//! the panel extractor find the two opposite faces of a sheet: their
//! vertices are joined one-to-one by the depth edges.
//!
//! Alongside storage the crate offers the geometric queries the pipeline
//! needs (areas under a transform, Newell normals, plane and line
//! intersection, point-in-polygon classification) and a scratch scope for
//! temporary faces that must never leak into the model.

pub mod arena;
pub mod builders;
pub mod construction;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod predicates;
pub mod scene;
pub mod scratch;
pub mod serialization;
pub mod transform;
pub mod traversal;

pub use arena::TopologyArena;
pub use error::{Error, Result};
pub use keys::{
    Container, DefinitionKey, EdgeKey, Entity, FaceKey, GroupKey, InstanceKey, LoopKey,
    TopologyKey, VertexKey,
};
pub use predicates::{
    classify_point_vs_polygon, intersect_line_line, intersect_line_line_2d,
    intersect_plane_plane, Line2, Line3, Plane, PointClass,
};
pub use scratch::Scratch;
pub use serialization::SceneSnapshot;
pub use transform::Transform;
