// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Greedy sheet nesting
//!
//! Every panel is represented by its bounding rectangle (the inner outline)
//! and that rectangle grown by the padding (the outer outline). Panels are
//! taken largest first. The first panel on a sheet goes in the corner; each
//! later one is tried with one of its outer corners on every corner of the
//! outer outlines already placed, in every allowed rotation, and the first
//! position that stays on the sheet without overlapping is kept.

use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Isometry2, Point2, Rotation2, Vector2};
use serde::Serialize;
use smallvec::SmallVec;
use tracing::{debug, warn};
use wikinest_geometry::{segments_cross, transform_contour, PaddingMode, Profile};
use wikinest_topology::{classify_point_vs_polygon, PointClass};

/// Tolerance for the sheet boundary check
const EPS: f64 = 1e-6;

/// A profiled panel ready for nesting
#[derive(Debug, Clone)]
pub struct Panel {
    pub id: String,
    /// One label per copy to cut
    pub labels: Vec<String>,
    pub profile: Profile,
}

/// Inner and padded outer rectangle of a panel in one rotation
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    /// Rotation about the profile origin, in radians
    pub angle: f64,
    pub inner: Vec<Point2<f64>>,
    pub outer: Vec<Point2<f64>>,
}

impl Outline {
    /// Outlines of a panel for every rotation it may be placed in.
    ///
    /// The unrotated outline comes first. Fully padded panels may also be
    /// turned by 180°, and by 90° and 270° when the turned padded rectangle
    /// still fits the sheet.
    pub fn candidates(
        profile: &Profile,
        padding: f64,
        inner_width: f64,
        inner_height: f64,
    ) -> SmallVec<[Outline; 4]> {
        let min = profile.bounds.min;
        let max = profile.bounds.max;
        let inner = rectangle(min, max);

        let (px, py) = match profile.padding {
            PaddingMode::Full => (padding, padding),
            PaddingMode::SkipWidth => (0.0, padding),
            PaddingMode::SkipHeight => (padding, 0.0),
        };
        let pad = Vector2::new(px, py);
        let outer = rectangle(min - pad, max + pad);
        let width = max.x - min.x + 2.0 * px;
        let height = max.y - min.y + 2.0 * py;

        let mut angles: SmallVec<[f64; 4]> = SmallVec::new();
        angles.push(0.0);
        if profile.padding == PaddingMode::Full {
            if inner_width > height && inner_height > width {
                angles.push(FRAC_PI_2);
                angles.push(3.0 * FRAC_PI_2);
            }
            angles.push(PI);
        }

        angles
            .into_iter()
            .map(|angle| {
                let rotation = Rotation2::new(angle);
                Outline {
                    angle,
                    inner: inner.iter().map(|p| rotation * p).collect(),
                    outer: outer.iter().map(|p| rotation * p).collect(),
                }
            })
            .collect()
    }

    pub fn padded_area(&self) -> f64 {
        wikinest_geometry::compute_signed_area(&self.outer).abs()
    }
}

fn rectangle(min: Point2<f64>, max: Point2<f64>) -> Vec<Point2<f64>> {
    vec![
        min,
        Point2::new(max.x, min.y),
        max,
        Point2::new(min.x, max.y),
    ]
}

/// One panel copy placed on a sheet
#[derive(Debug, Clone, Serialize)]
pub struct Placement {
    /// Index into the panel list handed to the nester
    pub panel: usize,
    pub label: String,
    /// Maps profile coordinates onto the sheet's inner area
    #[serde(skip)]
    pub motion: Isometry2<f64>,
    /// Padded outline as placed
    #[serde(skip)]
    pub outer: Vec<Point2<f64>>,
    /// Bounding rectangle as placed
    #[serde(skip)]
    pub inner: Vec<Point2<f64>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Sheet {
    pub placements: Vec<Placement>,
}

impl Sheet {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// A panel copy that fits on no sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unplaceable {
    pub panel: usize,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Layout {
    pub sheets: Vec<Sheet>,
    pub unplaceable: Vec<Unplaceable>,
}

impl Layout {
    pub fn placement_count(&self) -> usize {
        self.sheets.iter().map(Sheet::len).sum()
    }
}

/// Nesting state of one panel
struct Item {
    panel: usize,
    outlines: SmallVec<[Outline; 4]>,
    area: f64,
    labels: VecDeque<String>,
}

/// Places panels onto sheets of a fixed inner size.
#[derive(Debug, Clone, Copy)]
pub struct SheetNester {
    inner_width: f64,
    inner_height: f64,
    /// Padding per side
    padding: f64,
}

impl SheetNester {
    pub fn new(inner_width: f64, inner_height: f64, padding: f64) -> Self {
        Self {
            inner_width,
            inner_height,
            padding,
        }
    }

    /// Nests every non-singleton panel.
    pub fn nest(&self, panels: &[Panel]) -> Layout {
        let mut items: Vec<Item> = panels
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.profile.singleton && !p.labels.is_empty())
            .map(|(i, p)| {
                let outlines =
                    Outline::candidates(&p.profile, self.padding, self.inner_width, self.inner_height);
                let area = outlines[0].padded_area();
                Item {
                    panel: i,
                    outlines,
                    area,
                    labels: p.labels.iter().cloned().collect(),
                }
            })
            .collect();
        // Stable, so equal areas keep extraction order
        items.sort_by(|a, b| b.area.total_cmp(&a.area));

        let mut layout = Layout::default();
        let total_area = self.inner_width * self.inner_height;

        while !items.is_empty() {
            let mut sheet = Sheet::default();
            let mut available = total_area;
            let mut idx = 0;

            while available > 0.0 && idx < items.len() {
                let item = &items[idx];
                if item.area > available {
                    idx += 1;
                    continue;
                }

                let found = if sheet.is_empty() {
                    let placed = self.first_fit(&item.outlines[0]).map(|shift| (0, shift));
                    if placed.is_none() {
                        let item = items.remove(idx);
                        warn!(panel = item.panel, "Panel does not fit on an empty sheet");
                        layout.unplaceable.extend(item.labels.into_iter().map(|label| {
                            Unplaceable {
                                panel: item.panel,
                                label,
                            }
                        }));
                        continue;
                    }
                    placed
                } else {
                    self.find_position(&sheet, &item.outlines)
                };

                let Some((which, shift)) = found else {
                    idx += 1;
                    continue;
                };

                let item = &mut items[idx];
                let outline = &item.outlines[which];
                available -= item.area;
                let label = item.labels.pop_front().unwrap_or_default();
                sheet.placements.push(Placement {
                    panel: item.panel,
                    label,
                    motion: Isometry2::new(shift, outline.angle),
                    outer: outline.outer.iter().map(|p| p + shift).collect(),
                    inner: outline.inner.iter().map(|p| p + shift).collect(),
                });
                if item.labels.is_empty() {
                    items.remove(idx);
                }
            }

            if sheet.is_empty() {
                for item in items.drain(..) {
                    warn!(panel = item.panel, copies = item.labels.len(), "Panel could not be placed");
                    layout.unplaceable.extend(item.labels.into_iter().map(|label| Unplaceable {
                        panel: item.panel,
                        label,
                    }));
                }
                break;
            }

            debug!(sheet = layout.sheets.len(), placements = sheet.len(), "Sheet closed");
            layout.sheets.push(sheet);
        }

        layout
    }

    /// Lays out singleton panels, one copy per sheet, unpadded at the corner.
    pub fn lay_out_singletons(&self, panels: &[Panel]) -> Layout {
        let mut layout = Layout::default();
        for (i, panel) in panels.iter().enumerate().filter(|(_, p)| p.profile.singleton) {
            let bounds = &panel.profile.bounds;
            let fits = bounds.width() <= self.inner_width + EPS
                && bounds.height() <= self.inner_height + EPS;
            for label in &panel.labels {
                if !fits {
                    layout.unplaceable.push(Unplaceable {
                        panel: i,
                        label: label.clone(),
                    });
                    continue;
                }
                let motion = Isometry2::translation(-bounds.min.x, -bounds.min.y);
                let rect = rectangle(bounds.min, bounds.max);
                let placed = transform_contour(&rect, &motion);
                layout.sheets.push(Sheet {
                    placements: vec![Placement {
                        panel: i,
                        label: label.clone(),
                        motion,
                        outer: placed.clone(),
                        inner: placed,
                    }],
                });
            }
        }
        layout
    }

    fn in_sheet(&self, p: &Point2<f64>) -> bool {
        p.x >= -EPS && p.y >= -EPS && p.x <= self.inner_width + EPS && p.y <= self.inner_height + EPS
    }

    /// Corner placement on an empty sheet: the translation that puts the
    /// padded corner at the origin, if the panel then fits.
    fn first_fit(&self, outline: &Outline) -> Option<Vector2<f64>> {
        let shift = -outline.outer[0].coords;
        outline
            .inner
            .iter()
            .all(|p| self.in_sheet(&(p + shift)))
            .then_some(shift)
    }

    /// First position next to an already placed panel that fits, as the
    /// index of the outline used and its translation.
    fn find_position(&self, sheet: &Sheet, outlines: &[Outline]) -> Option<(usize, Vector2<f64>)> {
        for placed in &sheet.placements {
            for anchor in &placed.outer {
                for (which, outline) in outlines.iter().enumerate() {
                    for corner in outline.outer.iter().rev() {
                        let shift = anchor - corner;
                        if self.fits(sheet, outline, &shift) {
                            return Some((which, shift));
                        }
                    }
                }
            }
        }
        None
    }

    fn fits(&self, sheet: &Sheet, outline: &Outline, shift: &Vector2<f64>) -> bool {
        let inner: Vec<Point2<f64>> = outline.inner.iter().map(|p| p + shift).collect();
        let clear = inner.iter().all(|p| {
            self.in_sheet(p)
                && sheet
                    .placements
                    .iter()
                    .all(|placed| classify_point_vs_polygon(p, &placed.outer) == PointClass::Outside)
        });
        if !clear {
            return false;
        }

        let outer: Vec<Point2<f64>> = outline.outer.iter().map(|p| p + shift).collect();
        let n = outer.len();
        for placed in &sheet.placements {
            let m = placed.inner.len();
            for i in 0..n {
                let (a1, a2) = (&outer[i], &outer[(i + 1) % n]);
                for j in 0..m {
                    if segments_cross(a1, a2, &placed.inner[j], &placed.inner[(j + 1) % m]) {
                        return false;
                    }
                }
            }
            if placed
                .inner
                .iter()
                .any(|p| classify_point_vs_polygon(p, &outer) == PointClass::Inside)
            {
                return false;
            }
        }
        true
    }
}
