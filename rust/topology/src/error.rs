// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology and scene operations.

use crate::keys::*;

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during topology operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced entity was not found in the arena.
    #[error("topology entity not found: {0:?}")]
    NotFound(TopologyKey),

    /// Edges in a loop are not connected end-to-end.
    #[error("loop edges are not connected: edge {0} endpoint does not match edge {1}")]
    DisconnectedLoop(usize, usize),

    /// A loop must have at least one edge.
    #[error("loop must have at least one edge")]
    EmptyLoop,

    /// A face must have an outer boundary loop with three or more edges.
    #[error("face outer loop has fewer than 3 edges")]
    DegenerateFace,

    /// Vertex key not found in the arena.
    #[error("vertex not found: {0:?}")]
    VertexNotFound(VertexKey),

    /// Edge key not found in the arena.
    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeKey),

    /// Loop key not found in the arena.
    #[error("loop not found: {0:?}")]
    LoopNotFound(LoopKey),

    /// Face key not found in the arena.
    #[error("face not found: {0:?}")]
    FaceNotFound(FaceKey),

    /// Group key not found in the arena.
    #[error("group not found: {0:?}")]
    GroupNotFound(GroupKey),

    /// Component definition key not found in the arena.
    #[error("component definition not found: {0:?}")]
    DefinitionNotFound(DefinitionKey),

    /// Component instance key not found in the arena.
    #[error("component instance not found: {0:?}")]
    InstanceNotFound(InstanceKey),

    /// Linking the entity would make a container (transitively) contain itself.
    #[error("{entity:?} would nest {container:?} inside itself")]
    CyclicNesting { container: Container, entity: Entity },

    /// A snapshot references an id that it does not define.
    #[error("snapshot {kind} index {index} out of range")]
    DanglingReference { kind: &'static str, index: usize },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
