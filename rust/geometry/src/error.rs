// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while profiling a panel face
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unexpected edge connection in loop {loop_index}")]
    UnexpectedEdgeConnection { loop_index: usize },

    #[error("Surface area calculation differs: face {face_area:.3}, profile {profile_area:.3}")]
    AreaMismatch { face_area: f64, profile_area: f64 },

    #[error("Couldn't fit panel within cutting sheet")]
    NoFittingOrientation,

    #[error("Topology error: {0}")]
    Topology(#[from] wikinest_topology::Error),
}
