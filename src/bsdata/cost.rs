//! Cost resolver: model count -> points for one unit.

use std::collections::BTreeMap;

use crate::bsdata::schema::{
    selections_bound, Condition, ConstraintKind, EntryKind, Modifier, ModifierGroup,
    SelectionEntry, POINTS_TYPE_ID,
};
use crate::bsdata::variants::ModelVariant;

const AT_LEAST: &str = "atLeast";

/// Declared model-count range of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelBounds {
    pub min: u32,
    pub max: u32,
}

impl ModelBounds {
    fn new(min: u32, max: u32) -> Self {
        let min = min.max(1);
        ModelBounds {
            min,
            max: max.max(min),
        }
    }
}

/// Model-count bounds from the first variant-owning group that declares them,
/// else the sum of the variants' own constraints, else the unit's own
/// constraints, else a single model.
pub fn model_bounds(unit: &SelectionEntry, variants: &[ModelVariant<'_>]) -> ModelBounds {
    if unit.kind == EntryKind::Model {
        return ModelBounds::new(1, 1);
    }

    let declared = variants.iter().filter_map(|v| v.owner).find_map(|group| {
        let min = selections_bound(&group.constraints, ConstraintKind::Min);
        let max = selections_bound(&group.constraints, ConstraintKind::Max);
        match (min, max) {
            (None, None) => None,
            (min, max) => Some(ModelBounds::new(
                min.unwrap_or(1),
                max.or(min).unwrap_or(1),
            )),
        }
    });
    if let Some(bounds) = declared {
        return bounds;
    }

    let (min, max) = variants.iter().fold((0u32, 0u32), |(min, max), variant| {
        let variant_min = variant.min_models().unwrap_or(0);
        let variant_max = variant.max_models().unwrap_or(variant_min);
        (min + variant_min, max + variant_max)
    });
    if max > 0 {
        return ModelBounds::new(min, max);
    }

    let min = selections_bound(&unit.constraints, ConstraintKind::Min);
    let max = selections_bound(&unit.constraints, ConstraintKind::Max);
    ModelBounds::new(min.unwrap_or(1), max.or(min).unwrap_or(1))
}

/// Build the points table: seed the bounds, set the base cost at the minimum
/// count, apply `atLeast` threshold modifiers, then drop zero placeholders
/// except the minimum.
pub fn resolve_points(unit: &SelectionEntry, bounds: ModelBounds) -> BTreeMap<u32, u32> {
    let mut points = BTreeMap::new();
    points.insert(bounds.min, 0);
    points.insert(bounds.max, 0);

    match unit.base_points() {
        Some(base) => {
            points.insert(bounds.min, whole_points(base));
        }
        None => log::warn!("{}: no base points cost found", unit.name),
    }

    for (threshold, value) in threshold_costs(unit) {
        points.insert(threshold, value);
    }

    points.retain(|count, value| *value != 0 || *count == bounds.min);
    points
}

/// `(threshold, points)` pairs from points modifiers guarded by a positive
/// `atLeast` condition, searching nested modifier groups too.
fn threshold_costs(unit: &SelectionEntry) -> Vec<(u32, u32)> {
    let mut found = Vec::new();
    scan_modifiers(&unit.modifiers, &[], &mut found);
    for group in &unit.modifier_groups {
        scan_group(group, &[], &mut found);
    }
    found
}

fn scan_group(group: &ModifierGroup, inherited: &[&Condition], found: &mut Vec<(u32, u32)>) {
    let mut conditions: Vec<&Condition> = inherited.to_vec();
    conditions.extend(group.conditions.iter());
    scan_modifiers(&group.modifiers, &conditions, found);
    for nested in &group.modifier_groups {
        scan_group(nested, &conditions, found);
    }
}

fn scan_modifiers(modifiers: &[Modifier], inherited: &[&Condition], found: &mut Vec<(u32, u32)>) {
    for modifier in modifiers.iter().filter(|m| m.field == POINTS_TYPE_ID) {
        let threshold = modifier
            .conditions
            .iter()
            .chain(inherited.iter().copied())
            .find(|c| c.kind == AT_LEAST && c.value > 0.0)
            .map(|c| c.value.round() as u32);
        let Some(threshold) = threshold else {
            continue;
        };
        match modifier.value.trim().parse::<f64>() {
            Ok(value) => found.push((threshold, whole_points(value))),
            Err(_) => log::debug!(
                "ignoring non-numeric points modifier value '{}'",
                modifier.value
            ),
        }
    }
}

fn whole_points(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}
