// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SVG cutting sheets
//!
//! Sheets are stacked vertically on one canvas. Every placed panel becomes a
//! group holding one `path` per polygon loop, a `circle` for each loop
//! recognised as a bore, and its label at the centroid.

use std::fmt::Write as _;

use nalgebra::Point2;

use crate::config::SheetConfig;
use crate::layout::{Layout, Panel, Placement};

/// Drawing units per millimetre used by default
pub const DEFAULT_SCALE: f64 = 8.0;

/// Renders a layout as an SVG document.
pub struct SvgWriter<'a> {
    config: &'a SheetConfig,
    scale: f64,
}

impl<'a> SvgWriter<'a> {
    pub fn new(config: &'a SheetConfig) -> Self {
        Self {
            config,
            scale: DEFAULT_SCALE,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn write(&self, layout: &Layout, panels: &[Panel]) -> String {
        let scale = self.scale;
        let sheet_height = self.config.sheet_height;
        let sheet_width = self.config.sheet_width;
        let margin = self.config.margin;
        let count = layout.sheets.len() as f64;

        let total_height = scale * (count * (sheet_height + 12.0 * margin) + 10.0 * margin);
        let total_width = scale * (sheet_width + 2.0 * margin);

        let mut svg = String::new();
        svg.push_str("<?xml version=\"1.0\" standalone=\"no\"?>\n");
        svg.push_str(
            "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
             \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n",
        );
        // Writing into a String cannot fail
        let _ = writeln!(
            svg,
            "<svg height=\"{total_height}\" width=\"{total_width}\" version=\"1.1\" \
             viewBox=\"0 0 {total_width} {total_height}\" xmlns=\"http://www.w3.org/2000/svg\" \
             style=\"background-color: #ffffff;\">"
        );
        svg.push_str("<desc>WikiNest Cutting Sheets</desc>\n");

        for (s, sheet) in layout.sheets.iter().enumerate() {
            let frame_x = scale * margin;
            let frame_y = scale * (s as f64 * (sheet_height + 12.0 * margin) + 9.0 * margin);
            let _ = writeln!(
                svg,
                "<rect x=\"{frame_x}\" y=\"{frame_y}\" width=\"{}\" height=\"{}\" \
                 fill=\"none\" stroke=\"rgb(210, 210, 210)\" stroke-width=\"1\" />",
                scale * sheet_width,
                scale * sheet_height
            );

            let origin = Point2::new(frame_x + scale * margin, frame_y + scale * margin);
            for placement in &sheet.placements {
                if let Some(panel) = panels.get(placement.panel) {
                    self.write_placement(&mut svg, &origin, panel, placement);
                }
            }
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn write_placement(
        &self,
        svg: &mut String,
        origin: &Point2<f64>,
        panel: &Panel,
        placement: &Placement,
    ) {
        let scale = self.scale;
        let to_canvas = |p: &Point2<f64>| {
            let q = placement.motion * p;
            (origin.x + scale * q.x, origin.y + scale * q.y)
        };
        let profile = &panel.profile;

        svg.push_str("<g fill=\"none\" stroke=\"rgb(255, 255, 255)\" stroke-width=\"1\">\n");
        for (i, lp) in profile.loops.iter().enumerate() {
            match profile.circles.get(i).copied().flatten() {
                Some(circle) => {
                    let (cx, cy) = to_canvas(&circle.center);
                    let _ = writeln!(
                        svg,
                        "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{}\" stroke=\"rgb(51, 51, 51)\" \
                         stroke-width=\"2\" fill=\"none\" />",
                        scale * circle.radius
                    );
                }
                None => {
                    let mut d = String::new();
                    for (k, p) in lp.iter().enumerate() {
                        let (x, y) = to_canvas(p);
                        let _ = write!(d, "{} {x} {y} ", if k == 0 { "M" } else { "L" });
                    }
                    d.push('Z');
                    let _ = writeln!(
                        svg,
                        "<path d=\"{d}\" stroke=\"rgb(0, 0, 0)\" stroke-width=\"2\" fill=\"none\" />"
                    );
                }
            }
        }

        if !placement.label.is_empty() {
            let (x, y) = to_canvas(&profile.centroid);
            let _ = writeln!(
                svg,
                "<text x=\"{x}\" y=\"{y}\" style=\"font-size: {}px; stroke: rgb(255, 0, 0); \
                 fill: rgb(255, 0, 0); font-family: monospace\">{}</text>",
                scale * self.config.font_height,
                escape(&placement.label)
            );
        }
        svg.push_str("</g>\n");
    }
}

/// Escapes text for use in XML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
