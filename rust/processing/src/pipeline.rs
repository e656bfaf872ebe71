// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end run: extraction, profiling, nesting.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use wikinest_geometry::profile::AREA_TOLERANCE;
use wikinest_geometry::{build_profile, profile_face, Profile};
use wikinest_topology::TopologyArena;

use crate::config::SheetConfig;
use crate::error::{PanelErrorKind, PanelFailure, Result};
use crate::extract::{OrphanReport, PanelCandidate, PanelExtractor};
use crate::layout::{Layout, Panel, SheetNester};
use crate::matching::MatchStats;

/// Everything a run produced
#[derive(Debug)]
pub struct Report {
    /// Successfully profiled panels; placements index into this list
    pub panels: Vec<Panel>,
    /// Nested sheets followed by one sheet per singleton copy
    pub layout: Layout,
    pub failures: Vec<PanelFailure>,
    pub orphans: OrphanReport,
    pub stats: MatchStats,
    /// Physical panels found in the model
    pub items: usize,
    /// Panels laid out alone on their own sheet
    pub singletons: usize,
}

/// Serializable overview of a [`Report`]
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary<'a> {
    pub items: usize,
    pub panels: usize,
    pub sheets: usize,
    pub placements: usize,
    pub singletons: usize,
    pub orphans: &'a OrphanReport,
    pub failures: &'a [PanelFailure],
    pub stats: MatchStats,
}

impl Report {
    pub fn summary(&self) -> ReportSummary<'_> {
        ReportSummary {
            items: self.items,
            panels: self.panels.len(),
            sheets: self.layout.sheets.len(),
            placements: self.layout.placement_count(),
            singletons: self.singletons,
            orphans: &self.orphans,
            failures: &self.failures,
            stats: self.stats,
        }
    }

    /// Failures of one kind
    pub fn failures_of(&self, kind: PanelErrorKind) -> impl Iterator<Item = &PanelFailure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }
}

/// Runs the panel pipeline over a scene.
pub struct Pipeline {
    config: SheetConfig,
}

impl Pipeline {
    pub fn new(config: SheetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn run(&self, arena: &mut TopologyArena) -> Result<Report> {
        let extraction =
            PanelExtractor::new(self.config.depth_window()).extract(arena)?;

        let profiled = self.profile_candidates(arena, &extraction.candidates);
        arena.release(extraction.scratch);

        let mut panels = Vec::new();
        let mut failures = Vec::new();
        for (candidate, result) in extraction.candidates.iter().zip(profiled) {
            match result {
                Ok(profile) => {
                    debug!(
                        panel = %candidate.id,
                        copies = candidate.count(),
                        width = profile.width(),
                        height = profile.height(),
                        singleton = profile.singleton,
                        "Profiled panel"
                    );
                    panels.push(Panel {
                        id: candidate.id.clone(),
                        labels: candidate.labels.clone(),
                        profile,
                    });
                }
                Err(err) => match PanelErrorKind::from_profile_error(&err) {
                    Some(kind) => {
                        warn!(panel = %candidate.id, error = %err, "Panel skipped");
                        failures.push(PanelFailure {
                            panel: candidate.id.clone(),
                            kind,
                            detail: err.to_string(),
                        });
                    }
                    None => return Err(err.into()),
                },
            }
        }

        let nester = SheetNester::new(
            self.config.inner_width(),
            self.config.inner_height(),
            self.config.padding,
        );
        let mut layout = nester.nest(&panels);
        let singles = nester.lay_out_singletons(&panels);
        let singletons = singles.sheets.len();
        layout.sheets.extend(singles.sheets);
        layout.unplaceable.extend(singles.unplaceable);

        for unplaceable in &layout.unplaceable {
            let Some(panel) = panels.get(unplaceable.panel) else {
                continue;
            };
            failures.push(PanelFailure {
                panel: panel.id.clone(),
                kind: PanelErrorKind::UnplaceableOnAnySheet,
                detail: format!("copy {:?} fits on no sheet", unplaceable.label),
            });
        }

        let report = Report {
            panels,
            layout,
            failures,
            orphans: extraction.orphans,
            stats: extraction.stats,
            items: extraction
                .candidates
                .iter()
                .map(PanelCandidate::count)
                .sum(),
            singletons,
        };
        info!(
            items = report.items,
            sheets = report.layout.sheets.len(),
            placements = report.layout.placement_count(),
            failures = report.failures.len(),
            "Layout complete"
        );
        Ok(report)
    }

    /// Profiles candidates in parallel where the face can be used as is;
    /// candidates whose transform changes the face area need a scratch copy
    /// and are profiled one by one afterwards.
    fn profile_candidates(
        &self,
        arena: &mut TopologyArena,
        candidates: &[PanelCandidate],
    ) -> Vec<wikinest_geometry::Result<Profile>> {
        let limits = self.config.panel_limits();

        let shared: &TopologyArena = arena;
        let mut results: Vec<Option<wikinest_geometry::Result<Profile>>> = candidates
            .par_iter()
            .map(|c| {
                let local = shared.face_area(c.face)?;
                let placed = shared.face_area_with(c.face, Some(&c.transform))?;
                ((placed - local).abs() <= AREA_TOLERANCE)
                    .then(|| profile_face(shared, c.face, &limits))
            })
            .collect();

        for (candidate, slot) in candidates.iter().zip(results.iter_mut()) {
            if slot.is_none() {
                *slot = Some(build_profile(
                    arena,
                    candidate.face,
                    &candidate.transform,
                    &limits,
                ));
            }
        }

        results.into_iter().flatten().collect()
    }
}
