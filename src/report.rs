//! Markdown points reference for one faction.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::bsdata::output::FactionDocument;
use crate::error::Result;
use crate::files::write_text;
use crate::sync::Comparison;

pub fn render_markdown(document: &FactionDocument, comparison: Option<&Comparison>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} points reference", document.faction);
    let _ = writeln!(
        out,
        "\nCatalogue revision {}, generated {}.",
        document.catalogue_revision, document.last_updated
    );

    let _ = writeln!(out, "\n## Units\n");
    for unit in &document.units {
        let points: Vec<String> = unit
            .points
            .iter()
            .map(|(count, pts)| format!("{count}: {pts}"))
            .collect();
        let _ = writeln!(out, "- **{}**: {} pts", unit.name, points.join(", "));
    }

    if !document.enhancements.is_empty() {
        let _ = writeln!(out, "\n## Enhancements\n");
        for enhancement in &document.enhancements {
            let _ = writeln!(out, "- **{}**: {} pts", enhancement.name, enhancement.points);
        }
    }

    if !document.detachments.is_empty() {
        let _ = writeln!(out, "\n## Detachments");
        for detachment in &document.detachments {
            let _ = writeln!(out, "\n### {}\n", detachment.name);
            let _ = writeln!(
                out,
                "*{}*: {}",
                detachment.rule_name, detachment.rule_description
            );
            if !detachment.enhancements.is_empty() {
                let _ = writeln!(out);
            }
            for enhancement in &detachment.enhancements {
                let _ = writeln!(out, "- **{}**: {} pts", enhancement.name, enhancement.points);
            }
        }
    }

    if let Some(comparison) = comparison {
        render_comparison(&mut out, comparison);
    }
    out
}

fn render_comparison(out: &mut String, comparison: &Comparison) {
    let _ = writeln!(out, "\n## Comparison with app data\n");
    let _ = writeln!(out, "- Matching units: {}", comparison.matching_units);
    let _ = writeln!(
        out,
        "- Matching enhancements: {}",
        comparison.matching_enhancements
    );

    let differences = [
        ("Unit point differences", &comparison.unit_differences),
        ("Enhancement point differences", &comparison.enhancement_differences),
    ];
    for (title, list) in differences {
        if list.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n### {title}\n");
        for diff in list {
            let _ = writeln!(out, "- {}: app={}, BSData={}", diff.name, diff.app, diff.bsdata);
        }
    }

    let missing = [
        ("Missing in app data", &comparison.missing_in_app),
        ("Missing in BSData", &comparison.missing_in_bsdata),
    ];
    for (title, list) in missing {
        if list.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n### {title}\n");
        for entry in list {
            match entry.points {
                Some(pts) => {
                    let _ = writeln!(out, "- {} ({}): {pts} pts", entry.name, entry.kind.as_str());
                }
                None => {
                    let _ = writeln!(out, "- {} ({})", entry.name, entry.kind.as_str());
                }
            }
        }
    }
}

/// `<parsed_dir>/<output stem>.md`.
pub fn report_path(parsed_dir: &Path, output_filename: &str) -> PathBuf {
    let stem = Path::new(output_filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| output_filename.to_string());
    parsed_dir.join(format!("{stem}.md"))
}

pub fn write_report(
    parsed_dir: &Path,
    output_filename: &str,
    document: &FactionDocument,
    comparison: Option<&Comparison>,
) -> Result<PathBuf> {
    let path = report_path(parsed_dir, output_filename);
    write_text(&path, &render_markdown(document, comparison))?;
    Ok(path)
}
