//! Loadout synthesizer: turn classified model variants into explicit
//! loadout options and tag each weapon with the choice that grants it.

use std::collections::{HashMap, HashSet};

use crate::bsdata::extract::RawWeapon;
use crate::bsdata::output::{LoadoutChoice, LoadoutOption, OptionKind, OptionPattern, Weapon};
use crate::bsdata::variants::{ClassifiedVariant, NONE_CHOICE_ID};

pub const MAIN_WEAPON_OPTION_ID: &str = "main-weapon";
const MAIN_WEAPON_OPTION_NAME: &str = "Main Weapon";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loadout {
    pub options: Vec<LoadoutOption>,
    /// Per variant index: the choice id its weapons are tagged with, when
    /// that variant produced a choice.
    pub groups: Vec<Option<String>>,
}

/// Uncapped variants become one replacement choice when there are at least
/// two of them; every capped variant becomes its own optional addition.
/// Leader variants take no part in either partition.
pub fn synthesize(variants: &[ClassifiedVariant]) -> Loadout {
    let mut loadout = Loadout {
        options: Vec::new(),
        groups: vec![None; variants.len()],
    };
    if variants.len() <= 1 {
        return loadout;
    }

    let uncapped: Vec<&ClassifiedVariant> =
        variants.iter().filter(|v| !v.leader && !v.capped).collect();
    if uncapped.len() >= 2 {
        let choices = uncapped
            .iter()
            .map(|variant| LoadoutChoice {
                id: variant.group_id.clone(),
                name: variant.choice_name.clone(),
                default: variant.is_default,
                max_models: None,
            })
            .collect();
        loadout.options.push(LoadoutOption {
            id: MAIN_WEAPON_OPTION_ID.to_string(),
            name: MAIN_WEAPON_OPTION_NAME.to_string(),
            kind: OptionKind::Choice,
            pattern: OptionPattern::Replacement,
            choices,
        });
        for variant in &uncapped {
            loadout.groups[variant.index] = Some(variant.group_id.clone());
        }
    }

    for variant in variants.iter().filter(|v| !v.leader && v.capped) {
        loadout.options.push(LoadoutOption {
            id: format!("{}-option", variant.group_id),
            name: variant.choice_name.clone(),
            kind: OptionKind::Optional,
            pattern: OptionPattern::Addition,
            choices: vec![
                LoadoutChoice {
                    id: NONE_CHOICE_ID.to_string(),
                    name: "None".to_string(),
                    default: true,
                    max_models: None,
                },
                LoadoutChoice {
                    id: variant.group_id.clone(),
                    name: variant.choice_name.clone(),
                    default: false,
                    max_models: Some(1),
                },
            ],
        });
        loadout.groups[variant.index] = Some(variant.group_id.clone());
    }

    loadout
}

/// Deduplicate weapons by id (first occurrence wins) and set `loadoutGroup`.
///
/// A weapon found at unit level, or under every variant of a multi-variant
/// unit, is common to the unit and stays untagged.
pub fn assign_weapons(
    raw: Vec<RawWeapon>,
    groups: &[Option<String>],
    variant_count: usize,
) -> Vec<Weapon> {
    let mut carriers: HashMap<String, HashSet<Option<usize>>> = HashMap::new();
    for weapon in &raw {
        carriers
            .entry(weapon.weapon.id.clone())
            .or_default()
            .insert(weapon.variant);
    }

    let mut seen = HashSet::new();
    let mut weapons = Vec::new();
    for RawWeapon { mut weapon, variant } in raw {
        if !seen.insert(weapon.id.clone()) {
            continue;
        }
        let common = carriers.get(&weapon.id).is_some_and(|found| {
            found.contains(&None) || (variant_count >= 2 && found.len() >= variant_count)
        });
        weapon.loadout_group = match variant {
            Some(index) if !common => groups.get(index).cloned().flatten(),
            _ => None,
        };
        weapons.push(weapon);
    }
    weapons
}

/// Drop every choice no weapon is tagged with.
///
/// A variant whose weapons are all common to the unit has nothing to select,
/// so its choice goes. An option left without a real choice goes with it, and
/// a replacement that lost its default falls back to its first choice.
pub fn retain_referenced_choices(
    options: Vec<LoadoutOption>,
    weapons: &[Weapon],
) -> Vec<LoadoutOption> {
    let referenced: HashSet<&str> = weapons
        .iter()
        .filter_map(|weapon| weapon.loadout_group.as_deref())
        .collect();

    options
        .into_iter()
        .filter_map(|mut option| {
            option.choices.retain(|choice| {
                let keep = choice.id == NONE_CHOICE_ID || referenced.contains(choice.id.as_str());
                if !keep {
                    log::debug!(
                        "{}: choice '{}' grants no weapon of its own, dropped",
                        option.id,
                        choice.id
                    );
                }
                keep
            });
            if option.choices.iter().all(|choice| choice.id == NONE_CHOICE_ID) {
                return None;
            }
            if !option.choices.iter().any(|choice| choice.default) {
                if let Some(first) = option.choices.first_mut() {
                    first.default = true;
                }
            }
            Some(option)
        })
        .collect()
}
