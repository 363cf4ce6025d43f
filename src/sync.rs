//! Compare engine output against the app's faction document and copy
//! points across.
//!
//! Units and enhancements are matched by display name, the only key the
//! hand-maintained app documents share with the catalogue. Enhancements
//! offered by a parsed detachment are compared like the flat ones.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::bsdata::output::FactionDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Unit,
    Enhancement,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Unit => "unit",
            EntryType::Enhancement => "enhancement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointsDifference {
    pub name: String,
    pub app: u64,
    pub bsdata: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryType,
    /// Base points on the side that has the entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub unit_differences: Vec<PointsDifference>,
    pub enhancement_differences: Vec<PointsDifference>,
    pub missing_in_app: Vec<MissingEntry>,
    pub missing_in_bsdata: Vec<MissingEntry>,
    pub matching_units: usize,
    pub matching_enhancements: usize,
}

impl Comparison {
    pub fn is_clean(&self) -> bool {
        self.unit_differences.is_empty()
            && self.enhancement_differences.is_empty()
            && self.missing_in_app.is_empty()
            && self.missing_in_bsdata.is_empty()
    }
}

/// Enhancements as the app stores them: nested under each detachment, which
/// is keyed by id (or, in older documents, listed).
fn app_enhancements(app: &Value) -> Vec<&Value> {
    let detachments: Vec<&Value> = match app.get("detachments") {
        Some(Value::Object(map)) => map.values().collect(),
        Some(Value::Array(list)) => list.iter().collect(),
        _ => Vec::new(),
    };
    detachments
        .into_iter()
        .filter_map(|detachment| detachment.get("enhancements").and_then(Value::as_array))
        .flatten()
        .collect()
}

fn app_units(app: &Value) -> Vec<&Value> {
    app.get("units")
        .and_then(Value::as_array)
        .map(|units| units.iter().collect())
        .unwrap_or_default()
}

fn name_of(value: &Value) -> Option<&str> {
    value.get("name").and_then(Value::as_str)
}

/// Points at the smallest model count of an app unit.
fn app_base_points(unit: &Value) -> Option<(String, u64)> {
    unit.get("points")?
        .as_object()?
        .iter()
        .filter_map(|(count, pts)| Some((count.parse::<u32>().ok()?, count, pts.as_u64()?)))
        .min_by_key(|(count, _, _)| *count)
        .map(|(_, key, pts)| (key.clone(), pts))
}

pub fn compare_documents(parsed: &FactionDocument, app: &Value) -> Comparison {
    let mut comparison = Comparison::default();
    let parsed_units: BTreeMap<&str, _> =
        parsed.units.iter().map(|u| (u.name.as_str(), u)).collect();
    let app_units = app_units(app);

    for app_unit in &app_units {
        let Some(name) = name_of(app_unit) else {
            continue;
        };
        let app_base = app_base_points(app_unit);
        let Some(unit) = parsed_units.get(name) else {
            comparison.missing_in_bsdata.push(MissingEntry {
                name: name.to_string(),
                kind: EntryType::Unit,
                points: app_base.map(|(_, pts)| pts),
            });
            continue;
        };
        let Some((count, app_pts)) = app_base else {
            log::debug!("app unit '{name}' has no points to compare");
            continue;
        };
        let bsdata_pts = count
            .parse::<u32>()
            .ok()
            .and_then(|count| unit.points.get(&count))
            .or_else(|| unit.points.values().min())
            .map(|pts| u64::from(*pts))
            .unwrap_or(0);
        if bsdata_pts == app_pts {
            comparison.matching_units += 1;
        } else {
            comparison.unit_differences.push(PointsDifference {
                name: name.to_string(),
                app: app_pts,
                bsdata: bsdata_pts,
            });
        }
    }

    for unit in &parsed.units {
        if !app_units.iter().any(|u| name_of(u) == Some(unit.name.as_str())) {
            comparison.missing_in_app.push(MissingEntry {
                name: unit.name.clone(),
                kind: EntryType::Unit,
                points: unit.base_points().map(|(_, pts)| u64::from(pts)),
            });
        }
    }

    let app_enhancements: BTreeMap<&str, u64> = app_enhancements(app)
        .into_iter()
        .filter_map(|e| Some((name_of(e)?, e.get("points")?.as_u64()?)))
        .collect();
    let mut compared = HashSet::new();
    for enhancement in parsed.all_enhancements() {
        if !compared.insert(enhancement.name.as_str()) {
            continue;
        }
        let bsdata_pts = u64::from(enhancement.points);
        match app_enhancements.get(enhancement.name.as_str()) {
            Some(app_pts) if *app_pts == bsdata_pts => comparison.matching_enhancements += 1,
            Some(app_pts) => comparison.enhancement_differences.push(PointsDifference {
                name: enhancement.name.clone(),
                app: *app_pts,
                bsdata: bsdata_pts,
            }),
            None => comparison.missing_in_app.push(MissingEntry {
                name: enhancement.name.clone(),
                kind: EntryType::Enhancement,
                points: Some(bsdata_pts),
            }),
        }
    }

    comparison
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub document: Value,
    pub changes: Vec<String>,
}

/// Copy per-model-count unit points and enhancement points from `parsed`
/// into a copy of the app document, listing every change made.
pub fn sync_points(parsed: &FactionDocument, mut app: Value) -> SyncOutcome {
    let mut changes = Vec::new();

    if let Some(units) = app.get_mut("units").and_then(Value::as_array_mut) {
        for unit in units.iter_mut() {
            let Some(name) = name_of(unit).map(str::to_string) else {
                continue;
            };
            let Some(source) = parsed.units.iter().find(|u| u.name == name) else {
                continue;
            };
            let Some(points) = unit.get_mut("points").and_then(Value::as_object_mut) else {
                continue;
            };
            for (count, pts) in &source.points {
                let key = count.to_string();
                let current = points.get(&key).and_then(Value::as_u64);
                if current != Some(u64::from(*pts)) {
                    changes.push(format!(
                        "Unit '{name}' ({count} models): {} -> {pts}",
                        display_points(current)
                    ));
                    points.insert(key, Value::from(*pts));
                }
            }
        }
    }

    let detachments: Vec<&mut Value> = match app.get_mut("detachments") {
        Some(Value::Object(map)) => map.values_mut().collect(),
        Some(Value::Array(list)) => list.iter_mut().collect(),
        _ => Vec::new(),
    };
    for enhancement in detachments
        .into_iter()
        .filter_map(|detachment| detachment.get_mut("enhancements"))
        .filter_map(Value::as_array_mut)
        .flatten()
    {
        let Some(name) = name_of(enhancement).map(str::to_string) else {
            continue;
        };
        let Some(source) = parsed.all_enhancements().find(|e| e.name == name) else {
            continue;
        };
        let current = enhancement.get("points").and_then(Value::as_u64);
        if current != Some(u64::from(source.points)) {
            changes.push(format!(
                "Enhancement '{name}': {} -> {}",
                display_points(current),
                source.points
            ));
            if let Some(object) = enhancement.as_object_mut() {
                object.insert("points".to_string(), Value::from(source.points));
            }
        }
    }

    SyncOutcome {
        document: app,
        changes,
    }
}

fn display_points(points: Option<u64>) -> String {
    points.map_or_else(|| "none".to_string(), |pts| pts.to_string())
}
