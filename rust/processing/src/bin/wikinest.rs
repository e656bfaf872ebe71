// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: lay out the panels of a scene snapshot onto cutting sheets
//!
//! Usage:
//!   wikinest <scene.json> [options]

use std::env;
use std::fs;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;
use wikinest_processing::{Pipeline, SheetConfig, SvgWriter};
use wikinest_topology::TopologyArena;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return Ok(());
    }

    let scene_path = &args[1];
    let mut output_path = String::from("sheets.svg");
    let mut report_path: Option<String> = None;
    let mut config_path: Option<String> = None;
    let mut scale: Option<f64> = None;

    let mut i = 2;
    while i < args.len() {
        let value = |i: usize| {
            args.get(i + 1)
                .with_context(|| format!("{} needs a value", args[i]))
        };
        match args[i].as_str() {
            "--output" | "-o" => {
                output_path = value(i)?.clone();
                i += 1;
            }
            "--scale" => {
                let raw = value(i)?;
                scale = Some(raw.parse().with_context(|| format!("Invalid scale {raw:?}"))?);
                i += 1;
            }
            "--config" => {
                config_path = Some(value(i)?.clone());
                i += 1;
            }
            "--report" => {
                report_path = Some(value(i)?.clone());
                i += 1;
            }
            other => bail!("Unknown option: {other}"),
        }
        i += 1;
    }

    let config = match &config_path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings {path}"))?;
            SheetConfig::from_json(&json).with_context(|| format!("Invalid settings in {path}"))?
        }
        None => SheetConfig::from_env(),
    };

    let json = fs::read_to_string(scene_path)
        .with_context(|| format!("Failed to read scene {scene_path}"))?;
    let mut arena = TopologyArena::from_scene_json(&json)
        .with_context(|| format!("Failed to load scene {scene_path}"))?;

    tracing::info!(
        scene = %scene_path,
        faces = arena.face_count(),
        sheet_width = config.sheet_width,
        sheet_height = config.sheet_height,
        "Loaded scene"
    );

    let pipeline = Pipeline::new(config)?;
    let report = pipeline.run(&mut arena)?;

    for entry in report.orphans.entries() {
        tracing::warn!(parent = %entry.name, count = entry.count, "Unmatched faces");
    }
    for failure in &report.failures {
        tracing::warn!(panel = %failure.panel, kind = %failure.kind, "{}", failure.detail);
    }

    let mut writer = SvgWriter::new(pipeline.config());
    if let Some(scale) = scale {
        writer = writer.with_scale(scale);
    }
    let svg = writer.write(&report.layout, &report.panels);
    fs::write(&output_path, svg).with_context(|| format!("Failed to write {output_path}"))?;

    if let Some(path) = &report_path {
        let summary = serde_json::to_string_pretty(&report.summary())?;
        fs::write(path, summary).with_context(|| format!("Failed to write {path}"))?;
    }

    tracing::info!(
        output = %output_path,
        sheets = report.layout.sheets.len(),
        items = report.items,
        "Wrote cutting sheets"
    );
    Ok(())
}

fn print_usage() {
    println!("Usage: wikinest <scene.json> [options]");
    println!();
    println!("Options:");
    println!("  -o, --output <file>   SVG output path (default: sheets.svg)");
    println!("      --scale <n>       drawing units per millimetre (default: 8)");
    println!("      --config <file>   JSON sheet settings (default: WIKINEST_* environment)");
    println!("      --report <file>   write a JSON run summary");
    println!("  -h, --help            show this message");
}
