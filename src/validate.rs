//! Structural checks on a merged faction document before the app loads it.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use crate::bsdata::variants::NONE_CHOICE_ID;
use crate::error::Result;
use crate::files::read_json;

const REQUIRED_STATS: &[&str] = &["m", "t", "sv", "w", "ld", "oc"];
const DETACHMENT_SECTIONS: &[&str] = &["rules", "stratagems", "enhancements"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.count(ValidationSeverity::Error) > 0
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

pub fn validate_faction_file(path: &Path) -> Result<ValidationReport> {
    let document: Value = read_json(path)?;
    Ok(validate_document(&document))
}

pub fn validate_document(document: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    match document.get("units").and_then(Value::as_array) {
        Some(units) => {
            let mut seen_ids = HashSet::new();
            for (index, unit) in units.iter().enumerate() {
                let Some(object) = unit.as_object() else {
                    report.push(
                        ValidationSeverity::Error,
                        format!("units[{index}]"),
                        "unit is not an object",
                    );
                    continue;
                };
                validate_unit(&mut report, object, index, &mut seen_ids);
            }
        }
        None => report.push(ValidationSeverity::Error, "units", "missing 'units' array"),
    }

    if let Some(detachments) = document.get("detachments") {
        validate_detachments(&mut report, detachments);
    }

    report
}

fn validate_unit(
    report: &mut ValidationReport,
    unit: &Map<String, Value>,
    index: usize,
    seen_ids: &mut HashSet<String>,
) {
    let unit_id = match unit.get("id").and_then(Value::as_str) {
        Some(id) if !id.trim().is_empty() => {
            if !seen_ids.insert(id.to_string()) {
                report.push(
                    ValidationSeverity::Error,
                    format!("units[{index}].id"),
                    format!("duplicate id '{id}'"),
                );
            }
            id.to_string()
        }
        _ => {
            report.push(
                ValidationSeverity::Error,
                format!("units[{index}].id"),
                "missing non-empty 'id'",
            );
            "<missing-id>".to_string()
        }
    };
    let context = format!("units[{index}] id='{unit_id}'");

    validate_stats(report, unit, &context);
    validate_points(report, unit, &context);
    validate_loadout(report, unit, &context);
}

fn validate_stats(report: &mut ValidationReport, unit: &Map<String, Value>, context: &str) {
    let Some(stats) = unit.get("stats").and_then(Value::as_object) else {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.stats"),
            "missing 'stats' object",
        );
        return;
    };

    for stat in REQUIRED_STATS {
        if stats.get(*stat).map_or(true, Value::is_null) {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.stats.{stat}"),
                format!("missing stat '{stat}'"),
            );
        }
    }

    if let Some(wounds) = stats.get("w").filter(|value| !value.is_null()) {
        if !wounds.as_i64().is_some_and(|w| w > 0) {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.stats.w"),
                format!("wounds must be greater than 0, found {wounds}"),
            );
        }
    }
}

fn validate_points(report: &mut ValidationReport, unit: &Map<String, Value>, context: &str) {
    let points = unit.get("points").and_then(Value::as_object);
    match points {
        Some(points) if !points.is_empty() => {
            if !points.values().any(|pts| pts.as_f64().is_some_and(|p| p > 0.0)) {
                report.push(
                    ValidationSeverity::Error,
                    format!("{context}.points"),
                    "no positive points value",
                );
            }
        }
        _ => report.push(
            ValidationSeverity::Error,
            format!("{context}.points"),
            "missing or empty 'points'",
        ),
    }
}

/// Every weapon group must name exactly one choice, and every real choice
/// must be granted by at least one weapon.
fn validate_loadout(report: &mut ValidationReport, unit: &Map<String, Value>, context: &str) {
    let mut choice_counts: HashMap<&str, usize> = HashMap::new();
    for choice in unit
        .get("loadoutOptions")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|option| option.get("choices").and_then(Value::as_array))
        .flatten()
    {
        if let Some(id) = choice.get("id").and_then(Value::as_str) {
            *choice_counts.entry(id).or_default() += 1;
        }
    }

    let mut referenced = HashSet::new();
    let weapons = unit
        .get("weapons")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for (weapon_index, weapon) in weapons.iter().enumerate() {
        let Some(group) = weapon.get("loadoutGroup").and_then(Value::as_str) else {
            continue;
        };
        referenced.insert(group);
        let matches = choice_counts.get(group).copied().unwrap_or(0);
        if matches != 1 {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.weapons[{weapon_index}].loadoutGroup"),
                format!("group '{group}' matches {matches} choices, expected exactly one"),
            );
        }
    }

    let mut unused: Vec<&str> = choice_counts
        .keys()
        .copied()
        .filter(|id| *id != NONE_CHOICE_ID && !referenced.contains(id))
        .collect();
    unused.sort_unstable();
    for id in unused {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.loadoutOptions"),
            format!("choice '{id}' is not referenced by any weapon"),
        );
    }
}

/// Detachments are keyed by id in the app documents; a plain list is
/// accepted too.
fn validate_detachments(report: &mut ValidationReport, detachments: &Value) {
    let entries: Vec<(String, &Value)> = match detachments {
        Value::Object(map) => map.iter().map(|(key, value)| (key.clone(), value)).collect(),
        Value::Array(list) => list
            .iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
        _ => {
            report.push(
                ValidationSeverity::Error,
                "detachments",
                "expected object or array",
            );
            return;
        }
    };

    for (key, detachment) in entries {
        let context = format!("detachments[{key}]");
        match detachment.get("name").and_then(Value::as_str) {
            Some(name) if !name.trim().is_empty() => {}
            _ => report.push(
                ValidationSeverity::Error,
                format!("{context}.name"),
                "missing non-empty 'name'",
            ),
        }
        for section in DETACHMENT_SECTIONS {
            if detachment.get(*section).map_or(true, Value::is_null) {
                report.push(
                    ValidationSeverity::Warning,
                    context.clone(),
                    format!("missing '{section}'"),
                );
            }
        }
    }
}
