//! Generator: merge the parsed engine output with the hand-authored faction
//! document and apply the merge-time fixups the app relies on.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::bsdata::text::slugify;
use crate::config::Settings;
use crate::error::Result;
use crate::factions::Faction;
use crate::files::{read_json, write_json};

/// The only fields taken from the hand-authored document.
pub const MANUAL_FIELDS: &[&str] = &["detachments", "armyRules", "allies", "keywordGlossary"];

const LEADER_ABILITY: &str = "Leader";
const BULLETS: &[char] = &['■', '•', '-', '*'];

/// Copy the allow-listed manual fields onto the parsed document.
pub fn merge_documents(mut parsed: Value, manual: Option<&Value>) -> Value {
    let Some(source) = manual.and_then(Value::as_object) else {
        return parsed;
    };
    if let Some(target) = parsed.as_object_mut() {
        for field in MANUAL_FIELDS {
            if let Some(value) = source.get(*field) {
                target.insert((*field).to_string(), value.clone());
            }
        }
    }
    parsed
}

/// Null weapon AP becomes 0; a `Leader` ability becomes a `canLead` list.
pub fn apply_fixups(document: &mut Value) {
    let Some(units) = document.get_mut("units").and_then(Value::as_array_mut) else {
        return;
    };
    for unit in units.iter_mut().filter_map(Value::as_object_mut) {
        fix_null_ap(unit);
        if let Some(targets) = leader_targets_of(unit) {
            unit.insert(
                "canLead".to_string(),
                Value::Array(targets.into_iter().map(Value::String).collect()),
            );
        }
    }
}

fn fix_null_ap(unit: &mut Map<String, Value>) {
    let Some(weapons) = unit.get_mut("weapons").and_then(Value::as_array_mut) else {
        return;
    };
    for stats in weapons
        .iter_mut()
        .filter_map(|weapon| weapon.get_mut("stats"))
        .filter_map(Value::as_object_mut)
    {
        if stats.get("ap").is_some_and(Value::is_null) {
            stats.insert("ap".to_string(), Value::from(0));
        }
    }
}

fn leader_targets_of(unit: &Map<String, Value>) -> Option<Vec<String>> {
    let description = unit
        .get("abilities")?
        .as_array()?
        .iter()
        .find(|ability| ability.get("name").and_then(Value::as_str) == Some(LEADER_ABILITY))?
        .get("description")?
        .as_str()?;
    Some(leader_targets(description))
}

fn attached_to_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)attached to(?: the following units?)?:?\s*([^.:]+)").ok()
        })
        .as_ref()
}

/// Unit ids named by a Leader ability: bulleted lines, inline `■`/`•`
/// bullets, or the prose form "attached to X, Y, or Z".
pub fn leader_targets(description: &str) -> Vec<String> {
    let mut names: Vec<&str> = description
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix(BULLETS)?;
            rest.starts_with(char::is_whitespace).then_some(rest)
        })
        .collect();

    if names.is_empty() && description.contains(['■', '•']) {
        names = description.split(['■', '•']).skip(1).collect();
    }

    if names.is_empty() {
        if let Some(list) = attached_to_pattern()
            .and_then(|pattern| pattern.captures(description))
            .and_then(|caps| caps.get(1))
        {
            names = list
                .as_str()
                .split(',')
                .flat_map(|part| part.split(" or "))
                .flat_map(|part| part.split(" and "))
                .collect();
        }
    }

    let mut ids: Vec<String> = Vec::new();
    for name in names {
        let name = name
            .trim()
            .trim_start_matches("or ")
            .trim_start_matches("and ")
            .trim_end_matches(['.', ':', ';']);
        let id = slugify(name);
        if !id.is_empty() && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Merge one faction into `<output_dir>/<output file>`.
pub fn generate_faction(settings: &Settings, faction: &Faction) -> Result<Value> {
    let parsed: Value = read_json(&settings.parsed_dir.join(faction.output_filename))?;

    let manual_path = settings.manual_dir.join(faction.output_filename);
    let manual: Option<Value> = if manual_path.is_file() {
        Some(read_json(&manual_path)?)
    } else {
        log::warn!(
            "{}: no manual document at {}, merging engine output only",
            faction.id,
            manual_path.display()
        );
        None
    };

    let mut merged = merge_documents(parsed, manual.as_ref());
    apply_fixups(&mut merged);

    let output_path = settings.output_dir.join(faction.output_filename);
    write_json(&output_path, &merged)?;
    log::info!("{}: merged document written to {}", faction.id, output_path.display());
    Ok(merged)
}
