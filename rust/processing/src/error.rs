// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the panel pipeline.
//!
//! [`Error`] is returned for problems with the run as a whole: a bad
//! configuration or a scene that references missing entities. Problems with
//! a single panel never abort a run; they are collected as
//! [`PanelFailure`] values in the report.

use serde::Serialize;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid sheet configuration: {0}")]
    InvalidConfig(String),

    #[error("Topology error: {0}")]
    Topology(#[from] wikinest_topology::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] wikinest_geometry::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a panel did not make it onto a cutting sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PanelErrorKind {
    UnexpectedEdgeConnection,
    AreaMismatch,
    NoFittingOrientation,
    UnplaceableOnAnySheet,
}

impl PanelErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelErrorKind::UnexpectedEdgeConnection => "unexpected edge connection",
            PanelErrorKind::AreaMismatch => "area mismatch",
            PanelErrorKind::NoFittingOrientation => "no fitting orientation",
            PanelErrorKind::UnplaceableOnAnySheet => "unplaceable on any sheet",
        }
    }

    /// Maps a profile error onto a panel failure kind.
    ///
    /// Returns `None` for errors that are not specific to one panel.
    pub fn from_profile_error(err: &wikinest_geometry::Error) -> Option<Self> {
        match err {
            wikinest_geometry::Error::UnexpectedEdgeConnection { .. } => {
                Some(PanelErrorKind::UnexpectedEdgeConnection)
            }
            wikinest_geometry::Error::AreaMismatch { .. } => Some(PanelErrorKind::AreaMismatch),
            wikinest_geometry::Error::NoFittingOrientation => {
                Some(PanelErrorKind::NoFittingOrientation)
            }
            wikinest_geometry::Error::Topology(_) => None,
        }
    }
}

impl std::fmt::Display for PanelErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed panel (or one unplaceable copy of a panel)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelFailure {
    /// Panel identifier, e.g. `B-2`
    pub panel: String,
    pub kind: PanelErrorKind,
    pub detail: String,
}
