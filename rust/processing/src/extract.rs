// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel extraction from the scene graph
//!
//! The scene is walked depth-first with an explicit work list, composing
//! transforms on the way down. The direct faces of every group and
//! component definition are paired into panel faces once; a definition that
//! is instanced again only records the extra placement. Placements of one
//! container are then clustered by the area their first panel face has
//! under each transform, so congruent copies share one candidate.
//!
//! Loose faces at the top level are paired like any container's faces; only
//! the ones left unpaired are reported under [`UNGROUPED_NAME`].

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info, warn};
use wikinest_topology::{
    Container, DefinitionKey, Entity, FaceKey, GroupKey, Scratch, TopologyArena, Transform,
};

use crate::error::{Error, Result};
use crate::matching::{pair_faces, MatchStats};

/// Name of the orphan bucket for faces at the top level of the model
pub const UNGROUPED_NAME: &str = "Ungrouped Objects";

/// Area tolerance when deciding that two placements are congruent
pub const CLUSTER_TOLERANCE: f64 = 0.1;

/// Where the faces of a candidate were found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelSource {
    /// Loose faces at the top level of the model
    Ungrouped,
    Group(GroupKey),
    Definition(DefinitionKey),
}

impl From<Container> for PanelSource {
    fn from(c: Container) -> Self {
        match c {
            Container::Group(g) => PanelSource::Group(g),
            Container::Definition(d) => PanelSource::Definition(d),
        }
    }
}

/// One distinct flat panel shape, with one label per physical copy
#[derive(Debug, Clone)]
pub struct PanelCandidate {
    /// Identifier such as `A-1`
    pub id: String,
    pub face: FaceKey,
    pub transform: Transform,
    pub labels: Vec<String>,
    pub source: PanelSource,
}

impl PanelCandidate {
    /// Number of physical copies to cut
    pub fn count(&self) -> usize {
        self.labels.len()
    }
}

/// Unpaired faces, counted per parent container
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrphanReport {
    entries: Vec<OrphanEntry>,
    #[serde(skip)]
    index: FxHashMap<PanelSource, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrphanEntry {
    #[serde(skip)]
    pub source: PanelSource,
    pub name: String,
    pub count: usize,
}

impl OrphanReport {
    fn add(&mut self, source: PanelSource, name: &str, count: usize) {
        if count == 0 {
            return;
        }
        match self.index.get(&source) {
            Some(&i) => self.entries[i].count += count,
            None => {
                self.index.insert(source, self.entries.len());
                self.entries.push(OrphanEntry {
                    source,
                    name: name.to_string(),
                    count,
                });
            }
        }
    }

    /// Entries in the order their parents were first analysed
    pub fn entries(&self) -> &[OrphanEntry] {
        &self.entries
    }

    pub fn get(&self, source: PanelSource) -> Option<&OrphanEntry> {
        self.index.get(&source).map(|&i| &self.entries[i])
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of [`PanelExtractor::extract`]
#[derive(Debug)]
pub struct Extraction {
    pub candidates: Vec<PanelCandidate>,
    pub orphans: OrphanReport,
    pub stats: MatchStats,
    /// Representative faces rebuilt during pairing; release once the
    /// candidates have been profiled
    pub scratch: Scratch,
}

impl Extraction {
    /// Total number of physical panels across all candidates
    pub fn item_count(&self) -> usize {
        self.candidates.iter().map(PanelCandidate::count).sum()
    }
}

/// Paired faces of one container plus every place it occurs in the scene
struct Analysis {
    source: PanelSource,
    found: Vec<FaceKey>,
    placements: Vec<(Transform, String)>,
}

/// Walks the scene and produces panel candidates.
pub struct PanelExtractor {
    depth_window: (f64, f64),
}

impl PanelExtractor {
    /// `depth_window` is the open interval of edge lengths that span the
    /// stock thickness.
    pub fn new(depth_window: (f64, f64)) -> Self {
        Self { depth_window }
    }

    pub fn extract(&self, arena: &mut TopologyArena) -> Result<Extraction> {
        let mut scratch = Scratch::new();
        let mut orphans = OrphanReport::default();
        let mut stats = MatchStats::default();
        let mut analyses: Vec<Analysis> = Vec::new();
        let mut cache: FxHashMap<Container, usize> = FxHashMap::default();

        let mut loose: Vec<FaceKey> = Vec::new();
        let mut stack: Vec<(Entity, Transform)> = Vec::new();
        for &entity in arena.roots() {
            match entity {
                Entity::Face(f) => loose.push(f),
                other => stack.push((other, Transform::identity())),
            }
        }
        // Pop in model order
        stack.reverse();

        if !loose.is_empty() {
            let paired = pair_faces(arena, &loose, self.depth_window, &mut scratch)?;
            stats += paired.stats;
            orphans.add(PanelSource::Ungrouped, UNGROUPED_NAME, paired.orphans);
            analyses.push(Analysis {
                source: PanelSource::Ungrouped,
                found: paired.found,
                placements: vec![(Transform::identity(), String::new())],
            });
        }

        while let Some((entity, parent)) = stack.pop() {
            let container = match entity {
                Entity::Group(g) => Container::Group(g),
                Entity::Instance(i) => {
                    let data = arena.instance(i).ok_or(wikinest_topology::Error::InstanceNotFound(i))?;
                    Container::Definition(data.definition)
                }
                Entity::Face(_) => continue,
            };
            let transform = parent.compose(&arena.entity_transform(entity)?);
            let label = arena.entity_name(entity).unwrap_or_default().to_string();

            let children = arena
                .container_entities(container)
                .ok_or_else(|| missing(container))?
                .to_vec();

            if let Some(&i) = cache.get(&container) {
                analyses[i].placements.push((transform, label));
            } else {
                let faces: Vec<FaceKey> = children
                    .iter()
                    .filter_map(|e| match e {
                        Entity::Face(f) => Some(*f),
                        _ => None,
                    })
                    .collect();
                let paired = pair_faces(arena, &faces, self.depth_window, &mut scratch)?;
                stats += paired.stats;

                let name = arena.container_name(container).unwrap_or_default().to_string();
                if paired.orphans > 0 {
                    warn!(container = %name, orphans = paired.orphans, "Unpaired faces");
                }
                orphans.add(container.into(), &name, paired.orphans);
                debug!(container = %name, panels = paired.found.len(), "Analysed container");

                cache.insert(container, analyses.len());
                analyses.push(Analysis {
                    source: container.into(),
                    found: paired.found,
                    placements: vec![(transform, label)],
                });
            }

            // Children pushed in reverse so they pop in model order
            for &child in children.iter().rev() {
                if !matches!(child, Entity::Face(_)) {
                    stack.push((child, transform));
                }
            }
        }

        let candidates = assign_candidates(arena, &analyses);
        let extraction = Extraction {
            candidates,
            orphans,
            stats,
            scratch,
        };
        info!(
            candidates = extraction.candidates.len(),
            items = extraction.item_count(),
            orphans = extraction.orphans.total(),
            matched = extraction.stats.matched,
            "Panel extraction complete"
        );
        Ok(extraction)
    }
}

fn missing(container: Container) -> Error {
    match container {
        Container::Group(g) => wikinest_topology::Error::GroupNotFound(g).into(),
        Container::Definition(d) => wikinest_topology::Error::DefinitionNotFound(d).into(),
    }
}

/// Clusters placements and names every panel face.
fn assign_candidates(arena: &TopologyArena, analyses: &[Analysis]) -> Vec<PanelCandidate> {
    let mut candidates = Vec::new();
    let mut group_index = 0usize;

    for analysis in analyses {
        let Some(&first) = analysis.found.first() else {
            continue;
        };

        // (area, transform, labels)
        let mut clusters: Vec<(f64, Transform, Vec<String>)> = Vec::new();
        for (transform, label) in &analysis.placements {
            let area = arena.face_area_with(first, Some(transform)).unwrap_or(0.0);
            match clusters
                .iter_mut()
                .find(|(a, _, _)| (a - area).abs() < CLUSTER_TOLERANCE)
            {
                Some((_, _, labels)) => labels.push(label.clone()),
                None => clusters.push((area, *transform, vec![label.clone()])),
            }
        }

        for (_, transform, labels) in clusters {
            let group_id = group_letters(group_index);
            group_index += 1;
            for (face_index, &face) in analysis.found.iter().enumerate() {
                let id = format!("{group_id}-{}", face_index + 1);
                let labels = labels
                    .iter()
                    .map(|l| if l.is_empty() { id.clone() } else { l.clone() })
                    .collect();
                candidates.push(PanelCandidate {
                    id,
                    face,
                    transform,
                    labels,
                    source: analysis.source,
                });
            }
        }
    }

    candidates
}

/// Bijective base-26 letters: 0 → `A`, 25 → `Z`, 26 → `AA`.
pub fn group_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
