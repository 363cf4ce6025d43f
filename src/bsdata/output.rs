//! Serialized output schema consumed by the app (and by `generate`,
//! `validate`, `compare`, `sync` and `report`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const SOURCE_TAG: &str = "BSData";

/// A characteristic value: a number when the text is a plain integer,
/// otherwise the verbatim text (`"2+"`, `"D6"`, `"Melee"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(i64),
    Text(String),
}

impl StatValue {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(number) => StatValue::Number(number),
            Err(_) => StatValue::Text(trimmed.to_string()),
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Number(number) => write!(f, "{number}"),
            StatValue::Text(text) => f.write_str(text),
        }
    }
}

/// The six mandatory unit characteristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub m: StatValue,
    pub t: StatValue,
    pub sv: StatValue,
    pub w: StatValue,
    pub ld: StatValue,
    pub oc: StatValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponType {
    Melee,
    Ranged,
    Equipment,
}

impl WeaponType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponType::Melee => "melee",
            WeaponType::Ranged => "ranged",
            WeaponType::Equipment => "equipment",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<StatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<StatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bs: Option<StatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws: Option<StatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<StatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ap: Option<StatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<StatValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatOperation {
    Set,
    Add,
    Subtract,
}

/// A per-model stat change granted by a piece of wargear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: String,
    pub operation: StatOperation,
    pub value: i64,
    pub scope: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WeaponType,
    pub stats: WeaponStats,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loadout_group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<StatModifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Choice,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionPattern {
    Replacement,
    Addition,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadoutChoice {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_models: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadoutOption {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub pattern: OptionPattern,
    pub choices: Vec<LoadoutChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelType {
    pub id: String,
    pub bsdata_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_models: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_models: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub leader: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub bsdata_id: String,
    pub name: String,
    /// Model count -> points. Serialized with string keys in numeric order.
    pub points: BTreeMap<u32, u32>,
    pub stats: UnitStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invuln: Option<String>,
    pub weapons: Vec<Weapon>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loadout_options: Vec<LoadoutOption>,
    pub abilities: Vec<Ability>,
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub model_types: Vec<ModelType>,
}

impl Unit {
    /// Points at the smallest model count.
    pub fn base_points(&self) -> Option<(u32, u32)> {
        self.points.iter().next().map(|(count, pts)| (*count, *pts))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enhancement {
    pub id: String,
    pub bsdata_id: String,
    pub name: String,
    pub points: u32,
    pub description: String,
}

/// A detachment with its rule and the enhancements only it offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detachment {
    pub id: String,
    pub bsdata_id: String,
    pub name: String,
    pub rule_name: String,
    pub rule_description: String,
    #[serde(default)]
    pub enhancements: Vec<Enhancement>,
}

/// One faction's engine output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionDocument {
    pub faction: String,
    pub faction_id: String,
    pub source: String,
    pub catalogue_id: String,
    pub catalogue_revision: String,
    /// `YYYY-MM-DD`; the only field that differs between runs on the same input.
    pub last_updated: String,
    pub units: Vec<Unit>,
    /// Enhancements not offered by any detachment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enhancements: Vec<Enhancement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detachments: Vec<Detachment>,
}

impl FactionDocument {
    /// Flat enhancements first, then each detachment's in order.
    pub fn all_enhancements(&self) -> impl Iterator<Item = &Enhancement> {
        self.enhancements
            .iter()
            .chain(self.detachments.iter().flat_map(|d| d.enhancements.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_values_keep_non_integer_text() {
        assert_eq!(StatValue::parse("6"), StatValue::Number(6));
        assert_eq!(StatValue::parse("-1"), StatValue::Number(-1));
        assert_eq!(StatValue::parse("D6"), StatValue::Text("D6".to_string()));
        assert_eq!(StatValue::parse("2+"), StatValue::Text("2+".to_string()));
        assert_eq!(
            serde_json::to_value(StatValue::parse("D6+1")).expect("serialize"),
            serde_json::json!("D6+1")
        );
    }

    #[test]
    fn points_keys_serialize_as_numeric_strings_in_order() {
        let mut points = BTreeMap::new();
        points.insert(10u32, 220u32);
        points.insert(5u32, 110u32);
        let json = serde_json::to_string(&points).expect("serialize");
        assert_eq!(json, r#"{"5":110,"10":220}"#);
        let back: BTreeMap<u32, u32> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, points);
    }

    #[test]
    fn loadout_choice_omits_false_default() {
        let choice = LoadoutChoice {
            id: "none".into(),
            name: "None".into(),
            default: false,
            max_models: None,
        };
        assert_eq!(
            serde_json::to_value(&choice).expect("serialize"),
            serde_json::json!({"id": "none", "name": "None"})
        );
    }
}
