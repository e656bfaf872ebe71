// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WikiNest Processing
//!
//! Turns a panelised building model into nested CNC cutting sheets:
//!
//! 1. [`PanelExtractor`] pairs the two faces of every sheet panel and
//!    collapses repeated component instances into one candidate.
//! 2. Each candidate is profiled into a flat 2D shape by
//!    [`wikinest_geometry::build_profile`].
//! 3. [`SheetNester`] places every copy onto fixed-size stock sheets.
//! 4. [`SvgWriter`] renders the sheets.
//!
//! [`Pipeline`] runs all of it and collects a [`Report`].

pub mod config;
pub mod error;
pub mod extract;
pub mod layout;
pub mod matching;
pub mod pipeline;
pub mod svg;

pub use config::SheetConfig;
pub use error::{Error, PanelErrorKind, PanelFailure, Result};
pub use extract::{Extraction, OrphanReport, PanelCandidate, PanelExtractor, PanelSource};
pub use layout::{Layout, Outline, Panel, Placement, Sheet, SheetNester, Unplaceable};
pub use matching::MatchStats;
pub use pipeline::{Pipeline, Report, ReportSummary};
pub use svg::SvgWriter;
