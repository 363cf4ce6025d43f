//! Entity extractor: stats, weapons, abilities, keywords and invulnerable
//! saves for one exposed unit, resolved through the symbol table.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::bsdata::detachments::is_detachment_container;
use crate::bsdata::output::{
    Ability, Enhancement, StatModifier, StatOperation, StatValue, UnitStats, Weapon,
    WeaponStats, WeaponType,
};
use crate::bsdata::schema::{
    Catalogue, EntryKind, EntryLink, Modifier, ModifierKind, Profile, SelectionEntry,
    SelectionEntryGroup, ABILITIES_PROFILE, ARMOUR_PENETRATION_TYPE_ID, ATTACKS_TYPE_ID,
    BALLISTIC_SKILL_TYPE_ID, DAMAGE_TYPE_ID, LEADERSHIP_TYPE_ID, MELEE_WEAPONS_PROFILE,
    MOVEMENT_TYPE_ID, OBJECTIVE_CONTROL_TYPE_ID, RANGE_TYPE_ID, SAVE_TYPE_ID,
    STRENGTH_TYPE_ID, TOUGHNESS_TYPE_ID, UNIT_PROFILE, WEAPON_SKILL_TYPE_ID, WOUNDS_TYPE_ID,
};
use crate::bsdata::symbols::SymbolTable;
use crate::bsdata::text::{clean_text, slugify};
use crate::bsdata::variants::{discover, ModelVariant};
use crate::config::SpecialCases;

pub const INVULNERABLE_SAVE: &str = "Invulnerable Save";
const DESCRIPTION: &str = "Description";
const KEYWORDS: &str = "Keywords";
const FACTION_PREFIX: &str = "Faction:";
const CONFIGURATION_CATEGORY: &str = "Configuration";
const MAX_DEPTH: usize = 8;

/// A weapon before loadout tagging, remembering which variant it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWeapon {
    pub weapon: Weapon,
    /// Index into [`RawUnit::variants`]; `None` for unit-level wargear.
    pub variant: Option<usize>,
}

/// Everything extracted for one unit, still tied to the parse it came from.
#[derive(Debug, Clone)]
pub struct RawUnit<'a> {
    pub entry: &'a SelectionEntry,
    pub name: String,
    pub stats: UnitStats,
    pub invuln: Option<String>,
    pub abilities: Vec<Ability>,
    pub keywords: Vec<String>,
    pub variants: Vec<ModelVariant<'a>>,
    pub weapons: Vec<RawWeapon>,
}

/// Units and characters the catalogue exposes through its root entry links.
pub fn exposed_entries<'a>(
    catalogue: &'a Catalogue,
    symbols: &SymbolTable<'a>,
) -> Vec<&'a SelectionEntry> {
    catalogue
        .entry_links
        .iter()
        .filter_map(|link| {
            let target = symbols.entry(&link.target_id);
            if target.is_none() {
                log::debug!("root link '{}' -> {} does not resolve", link.name, link.target_id);
            }
            target
        })
        .filter(|entry| matches!(entry.kind, EntryKind::Unit | EntryKind::Model))
        .collect()
}

/// Extract one unit, or `None` (logged) when its six stats cannot be resolved.
pub fn extract_unit<'a>(
    entry: &'a SelectionEntry,
    symbols: &SymbolTable<'a>,
    special: &SpecialCases,
) -> Option<RawUnit<'a>> {
    let variants = discover(entry, symbols);
    let Some(stats) = resolve_stats(entry, &variants, symbols) else {
        log::warn!("{}: dropped, unit stats incomplete", entry.name);
        return None;
    };

    let walker = WeaponWalker { symbols, special };
    let mut weapons = Vec::new();
    for (index, variant) in variants.iter().enumerate() {
        walker.walk_entry_children(variant.entry, Some(index), 0, &mut weapons);
    }
    walker.walk(
        &entry.selection_entries,
        &entry.selection_entry_groups,
        &entry.entry_links,
        None,
        0,
        &mut weapons,
    );
    // Single-model characters carry their wargear on the model entry itself.
    if entry.kind == EntryKind::Model {
        walker.harvest(entry, None, &mut weapons);
    }

    Some(RawUnit {
        entry,
        name: entry.name.trim().to_string(),
        stats,
        invuln: invulnerable_save(entry, &variants, symbols),
        abilities: abilities(entry, symbols),
        keywords: keywords(entry, &variants),
        variants,
        weapons,
    })
}

fn resolve_stats(
    unit: &SelectionEntry,
    variants: &[ModelVariant<'_>],
    symbols: &SymbolTable<'_>,
) -> Option<UnitStats> {
    let own = unit.profiles.iter();
    let from_variants = variants.iter().flat_map(|v| v.entry.profiles.iter());
    let linked = linked_profiles(unit, symbols);
    let linked_from_variants = variants
        .iter()
        .flat_map(|v| linked_profiles(v.entry, symbols));

    own.chain(from_variants)
        .chain(linked)
        .chain(linked_from_variants)
        .filter(|profile| profile.type_name == UNIT_PROFILE)
        .find_map(unit_stats)
}

fn linked_profiles<'a, 'e>(
    entry: &'e SelectionEntry,
    symbols: &'e SymbolTable<'a>,
) -> impl Iterator<Item = &'a Profile> + 'e {
    entry
        .info_links
        .iter()
        .filter(|link| link.link_type == "profile")
        .filter_map(|link| symbols.profile(&link.target_id))
}

fn unit_stats(profile: &Profile) -> Option<UnitStats> {
    let read = |type_id: &str, name: &str| {
        profile
            .characteristic_by_type(type_id)
            .or_else(|| profile.characteristic_named(name))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };
    let w = match StatValue::parse(read(WOUNDS_TYPE_ID, "W")?) {
        StatValue::Number(wounds) if wounds > 0 => StatValue::Number(wounds),
        other => {
            log::warn!(
                "{} ({}): wounds '{other}' is not a positive number",
                profile.name,
                profile.id
            );
            return None;
        }
    };
    Some(UnitStats {
        m: dash_as_zero(read(MOVEMENT_TYPE_ID, "M")?.trim_end_matches('"')),
        t: StatValue::parse(read(TOUGHNESS_TYPE_ID, "T")?),
        sv: StatValue::parse(read(SAVE_TYPE_ID, "SV")?),
        w,
        ld: StatValue::parse(read(LEADERSHIP_TYPE_ID, "LD")?),
        oc: dash_as_zero(read(OBJECTIVE_CONTROL_TYPE_ID, "OC")?),
    })
}

fn dash_as_zero(raw: &str) -> StatValue {
    match raw.trim() {
        "-" | "–" | "—" => StatValue::Number(0),
        other => StatValue::parse(other),
    }
}

fn invuln_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)(\d)\+[^.]*?invulnerable").ok())
        .as_ref()
}

fn invulnerable_save(
    unit: &SelectionEntry,
    variants: &[ModelVariant<'_>],
    symbols: &SymbolTable<'_>,
) -> Option<String> {
    let owners = std::iter::once(unit).chain(variants.iter().map(|v| v.entry));
    for owner in owners {
        let linked = owner
            .info_links
            .iter()
            .filter(|link| link.name == INVULNERABLE_SAVE)
            .filter_map(|link| symbols.profile(&link.target_id));
        let inline = owner.profiles.iter().filter(|p| p.name == INVULNERABLE_SAVE);
        for profile in linked.chain(inline) {
            if let Some(save) = scan_invuln(profile) {
                return Some(save);
            }
        }
    }
    None
}

fn scan_invuln(profile: &Profile) -> Option<String> {
    let pattern = invuln_pattern()?;
    profile.characteristics.iter().find_map(|c| {
        pattern
            .captures(&c.value)
            .and_then(|caps| caps.get(1))
            .map(|digit| format!("{}+", digit.as_str()))
    })
}

fn abilities(unit: &SelectionEntry, symbols: &SymbolTable<'_>) -> Vec<Ability> {
    let mut seen = HashSet::new();
    unit.profiles
        .iter()
        .chain(linked_profiles(unit, symbols))
        .filter(|p| p.type_name == ABILITIES_PROFILE && p.name != INVULNERABLE_SAVE)
        .filter_map(|profile| {
            let description = profile.characteristic_named(DESCRIPTION)?;
            Some(Ability {
                id: slugify(&profile.name),
                name: profile.name.trim().to_string(),
                description: clean_text(description),
            })
        })
        .filter(|ability| seen.insert(ability.id.clone()))
        .collect()
}

fn keywords(unit: &SelectionEntry, variants: &[ModelVariant<'_>]) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(unit)
        .chain(variants.iter().map(|v| v.entry))
        .flat_map(|entry| entry.category_links.iter())
        .map(|link| link.name.trim())
        .filter(|name| {
            !name.is_empty() && !name.starts_with(FACTION_PREFIX) && *name != CONFIGURATION_CATEGORY
        })
        .filter(|name| seen.insert(name.to_string()))
        .map(str::to_string)
        .collect()
}

struct WeaponWalker<'s, 'a> {
    symbols: &'s SymbolTable<'a>,
    special: &'s SpecialCases,
}

impl<'a> WeaponWalker<'_, 'a> {
    fn walk_entry_children(
        &self,
        entry: &'a SelectionEntry,
        variant: Option<usize>,
        depth: usize,
        out: &mut Vec<RawWeapon>,
    ) {
        self.harvest(entry, variant, out);
        self.walk(
            &entry.selection_entries,
            &entry.selection_entry_groups,
            &entry.entry_links,
            variant,
            depth + 1,
            out,
        );
    }

    /// Visit wargear below a model or unit. Nested model entries belong to
    /// their own variant and are skipped here.
    fn walk(
        &self,
        entries: &'a [SelectionEntry],
        groups: &'a [SelectionEntryGroup],
        links: &'a [EntryLink],
        variant: Option<usize>,
        depth: usize,
        out: &mut Vec<RawWeapon>,
    ) {
        if depth > MAX_DEPTH {
            log::debug!("wargear nesting deeper than {MAX_DEPTH}, stopping");
            return;
        }
        for entry in entries.iter().filter(|e| e.kind != EntryKind::Model) {
            self.walk_entry_children(entry, variant, depth, out);
        }
        for group in groups {
            self.walk_group(group, variant, depth + 1, out);
        }
        for link in links {
            if link.link_type == "selectionEntryGroup" {
                match self.symbols.group(&link.target_id) {
                    Some(group) => self.walk_group(group, variant, depth + 1, out),
                    None => log::debug!("group link '{}' does not resolve", link.name),
                }
                continue;
            }
            match self.symbols.entry(&link.target_id) {
                Some(target) if target.kind != EntryKind::Model => {
                    self.walk_entry_children(target, variant, depth, out)
                }
                Some(_) => {}
                None => log::debug!("entry link '{}' does not resolve", link.name),
            }
        }
    }

    fn walk_group(
        &self,
        group: &'a SelectionEntryGroup,
        variant: Option<usize>,
        depth: usize,
        out: &mut Vec<RawWeapon>,
    ) {
        self.walk(
            &group.selection_entries,
            &group.selection_entry_groups,
            &group.entry_links,
            variant,
            depth,
            out,
        );
    }

    /// Turn the weapon profiles on `entry` into weapons, or the entry itself
    /// into an equipment weapon when it is ability-only wargear.
    fn harvest(&self, entry: &SelectionEntry, variant: Option<usize>, out: &mut Vec<RawWeapon>) {
        let modifiers = stat_modifiers(entry, self.special);
        let profiles: Vec<&Profile> = entry
            .profiles
            .iter()
            .chain(linked_profiles(entry, self.symbols))
            .collect();

        let mut found_weapon = false;
        for profile in profiles.iter().filter(|p| p.is_weapon()) {
            found_weapon = true;
            if let Some(mut weapon) = weapon_from_profile(profile) {
                weapon.modifiers = modifiers.clone();
                out.push(RawWeapon { weapon, variant });
            }
        }
        if found_weapon || entry.kind != EntryKind::Upgrade {
            return;
        }
        if entry.base_points().is_some_and(|pts| pts > 0.0) {
            return;
        }
        let description = profiles
            .iter()
            .filter(|p| p.type_name == ABILITIES_PROFILE && p.name != INVULNERABLE_SAVE)
            .find_map(|p| p.characteristic_named(DESCRIPTION));
        if let Some(description) = description {
            out.push(RawWeapon {
                weapon: Weapon {
                    id: weapon_id(&entry.name, WeaponType::Equipment),
                    name: entry.name.trim().to_string(),
                    kind: WeaponType::Equipment,
                    stats: WeaponStats::default(),
                    abilities: vec![clean_text(description)],
                    loadout_group: None,
                    modifiers,
                },
                variant,
            });
        }
    }
}

fn weapon_id(name: &str, kind: WeaponType) -> String {
    format!("{}-{}", slugify(name), kind.as_str())
}

fn weapon_from_profile(profile: &Profile) -> Option<Weapon> {
    let kind = if profile.type_name == MELEE_WEAPONS_PROFILE {
        WeaponType::Melee
    } else {
        WeaponType::Ranged
    };
    let read = |type_id: &str, name: &str| {
        profile
            .characteristic_by_type(type_id)
            .or_else(|| profile.characteristic_named(name))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };
    let skill = match kind {
        WeaponType::Melee => read(WEAPON_SKILL_TYPE_ID, "WS"),
        _ => read(BALLISTIC_SKILL_TYPE_ID, "BS"),
    };

    let (Some(range), Some(a), Some(skill), Some(s), Some(ap), Some(d)) = (
        read(RANGE_TYPE_ID, "Range"),
        read(ATTACKS_TYPE_ID, "A"),
        skill,
        read(STRENGTH_TYPE_ID, "S"),
        read(ARMOUR_PENETRATION_TYPE_ID, "AP"),
        read(DAMAGE_TYPE_ID, "D"),
    ) else {
        log::warn!("weapon '{}' skipped, missing characteristics", profile.name);
        return None;
    };

    let skill = Some(StatValue::parse(skill));
    let (bs, ws) = match kind {
        WeaponType::Melee => (None, skill),
        _ => (skill, None),
    };
    Some(Weapon {
        id: weapon_id(&profile.name, kind),
        name: profile.name.trim().to_string(),
        kind,
        stats: WeaponStats {
            range: Some(StatValue::parse(range.trim_end_matches('"'))),
            a: Some(StatValue::parse(a)),
            bs,
            ws,
            s: Some(StatValue::parse(s)),
            ap: Some(StatValue::parse(ap)),
            d: Some(StatValue::parse(d)),
        },
        abilities: weapon_keywords(profile.characteristic_named(KEYWORDS)),
        loadout_group: None,
        modifiers: Vec::new(),
    })
}

fn weapon_keywords(raw: Option<&str>) -> Vec<String> {
    match raw.map(str::trim) {
        None | Some("") | Some("-") => Vec::new(),
        Some(list) => list
            .split(',')
            .map(clean_text)
            .filter(|keyword| !keyword.is_empty())
            .collect(),
    }
}

fn stat_for_field(field: &str) -> Option<&'static str> {
    match field {
        WOUNDS_TYPE_ID => Some("w"),
        TOUGHNESS_TYPE_ID => Some("t"),
        MOVEMENT_TYPE_ID => Some("m"),
        LEADERSHIP_TYPE_ID => Some("ld"),
        OBJECTIVE_CONTROL_TYPE_ID => Some("oc"),
        _ => None,
    }
}

/// Per-model stat changes carried by a piece of wargear: its own stat
/// modifiers plus any configured bonus for profiles it links to.
fn stat_modifiers(entry: &SelectionEntry, special: &SpecialCases) -> Vec<StatModifier> {
    let source = entry.name.trim().to_string();
    let grouped = entry
        .modifier_groups
        .iter()
        .flat_map(|group| group.modifiers.iter());
    let mut modifiers: Vec<StatModifier> = entry
        .modifiers
        .iter()
        .chain(grouped)
        .filter_map(|modifier| catalogue_modifier(modifier, &source))
        .collect();

    for link in &entry.info_links {
        if let Some(bonus) = special.stat_bonus(&link.target_id) {
            modifiers.push(StatModifier {
                stat: bonus.stat.clone(),
                operation: bonus.operation,
                value: bonus.value,
                scope: "model".to_string(),
                source: source.clone(),
            });
        }
    }
    modifiers
}

fn catalogue_modifier(modifier: &Modifier, source: &str) -> Option<StatModifier> {
    let stat = stat_for_field(&modifier.field)?;
    let value = modifier
        .value
        .trim()
        .trim_end_matches(['"', '+'])
        .parse::<i64>()
        .ok()?;
    let operation = match modifier.kind {
        ModifierKind::Set => StatOperation::Set,
        ModifierKind::Decrement => StatOperation::Subtract,
        _ => StatOperation::Add,
    };
    Some(StatModifier {
        stat: stat.to_string(),
        operation,
        value,
        scope: "model".to_string(),
        source: source.to_string(),
    })
}

/// Shared upgrades with a positive points cost, searched through shared
/// groups other than a detachment container. Only the primary catalogue's
/// own entries are considered.
pub fn collect_enhancements(catalogue: &Catalogue) -> Vec<Enhancement> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    push_enhancements(&catalogue.shared_selection_entries, &mut seen, &mut found);
    for group in catalogue
        .shared_selection_entry_groups
        .iter()
        .filter(|group| !is_detachment_container(&group.name))
    {
        push_group_enhancements(group, 0, &mut seen, &mut found);
    }
    found
}

fn push_group_enhancements(
    group: &SelectionEntryGroup,
    depth: usize,
    seen: &mut HashSet<String>,
    found: &mut Vec<Enhancement>,
) {
    if depth > MAX_DEPTH {
        return;
    }
    push_enhancements(&group.selection_entries, seen, found);
    for nested in &group.selection_entry_groups {
        push_group_enhancements(nested, depth + 1, seen, found);
    }
}

fn push_enhancements(
    entries: &[SelectionEntry],
    seen: &mut HashSet<String>,
    found: &mut Vec<Enhancement>,
) {
    for candidate in entries.iter().filter_map(enhancement) {
        if seen.insert(candidate.id.clone()) {
            found.push(candidate);
        }
    }
}

/// An upgrade with a positive points cost, described by its first
/// Abilities profile.
pub fn enhancement(entry: &SelectionEntry) -> Option<Enhancement> {
    if entry.kind != EntryKind::Upgrade {
        return None;
    }
    let points = entry.base_points().filter(|pts| *pts > 0.0)?;
    let description = entry
        .profiles
        .iter()
        .filter(|p| p.type_name == ABILITIES_PROFILE)
        .find_map(|p| p.characteristic_named(DESCRIPTION))
        .map(clean_text)
        .unwrap_or_default();
    Some(Enhancement {
        id: slugify(&entry.name),
        bsdata_id: entry.id.clone(),
        name: entry.name.trim().to_string(),
        points: points.round() as u32,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdata::loader::LoadedCatalogue;
    use crate::bsdata::schema::Characteristic;
    use crate::bsdata::xml::parse_catalogue;
    use crate::config::StatBonus;
    use std::path::Path;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalogue id="cat-1" name="Test Legion" revision="3" xmlns="http://www.battlescribe.net/schema/catalogueSchema">
  <sharedProfiles>
    <profile id="p-invuln" name="Invulnerable Save" typeName="Abilities">
      <characteristics>
        <characteristic name="Description">Models in this unit have a 4+ invulnerable save.</characteristic>
      </characteristics>
    </profile>
    <profile id="p-deep" name="Deep Strike" typeName="Abilities">
      <characteristics>
        <characteristic name="Description">This unit can be set up in ^^**Reserves**^^.</characteristic>
      </characteristics>
    </profile>
    <profile id="p-shield" name="Praesidium Shield" typeName="Abilities">
      <characteristics>
        <characteristic name="Description">The bearer has +1 Wounds.</characteristic>
      </characteristics>
    </profile>
  </sharedProfiles>
  <sharedSelectionEntries>
    <selectionEntry id="u-guard" name="Guard" type="unit">
      <profiles>
        <profile id="p-guard" name="Guard" typeName="Unit">
          <characteristics>
            <characteristic name="M" typeId="e703-ecb6-5ce7-aec1">6"</characteristic>
            <characteristic name="T" typeId="d29d-cf75-fc2d-34a4">6</characteristic>
            <characteristic name="SV" typeId="450-a17e-9d5e-29da">2+</characteristic>
            <characteristic name="W" typeId="750a-a2ec-90d3-21fe">3</characteristic>
            <characteristic name="LD" typeId="58d2-b879-49c7-43bc">6+</characteristic>
            <characteristic name="OC" typeId="bef7-942a-1a23-59f8">2</characteristic>
          </characteristics>
        </profile>
      </profiles>
      <infoLinks>
        <infoLink id="il-1" name="Invulnerable Save" targetId="p-invuln" type="profile"/>
        <infoLink id="il-2" name="Deep Strike" targetId="p-deep" type="profile"/>
      </infoLinks>
      <categoryLinks>
        <categoryLink id="c-1" name="Faction: Test Legion" targetId="x1" primary="false"/>
        <categoryLink id="c-2" name="Infantry" targetId="x2" primary="false"/>
        <categoryLink id="c-3" name="Configuration" targetId="x3" primary="false"/>
      </categoryLinks>
      <selectionEntries>
        <selectionEntry id="m-spear" name="Guard (Spear)" type="model">
          <categoryLinks>
            <categoryLink id="c-4" name="Infantry" targetId="x2" primary="false"/>
            <categoryLink id="c-5" name="Guardian" targetId="x4" primary="false"/>
          </categoryLinks>
          <selectionEntries>
            <selectionEntry id="w-spear" name="Guardian spear" type="upgrade">
              <profiles>
                <profile id="pw-1" name="Guardian spear" typeName="Melee Weapons">
                  <characteristics>
                    <characteristic name="Range" typeId="914c-b413-91e3-a132">Melee</characteristic>
                    <characteristic name="A" typeId="2337-daa1-6682-b110">5</characteristic>
                    <characteristic name="WS" typeId="95d1-95f-45b4-11d6">2+</characteristic>
                    <characteristic name="S" typeId="ab33-d393-96ce-ccba">7</characteristic>
                    <characteristic name="AP" typeId="41a0-1301-112a-e2f2">-2</characteristic>
                    <characteristic name="D" typeId="3254-9fe6-d824-513e">D6</characteristic>
                    <characteristic name="Keywords">Lance, Sustained Hits 1</characteristic>
                  </characteristics>
                </profile>
              </profiles>
            </selectionEntry>
            <selectionEntry id="w-broken" name="Broken gun" type="upgrade">
              <profiles>
                <profile id="pw-2" name="Broken gun" typeName="Ranged Weapons">
                  <characteristics>
                    <characteristic name="Range" typeId="914c-b413-91e3-a132">24"</characteristic>
                    <characteristic name="A" typeId="2337-daa1-6682-b110">2</characteristic>
                  </characteristics>
                </profile>
              </profiles>
            </selectionEntry>
          </selectionEntries>
        </selectionEntry>
        <selectionEntry id="m-blade" name="Guard (Blade)" type="model">
          <selectionEntries>
            <selectionEntry id="w-shield" name="Praesidium shield" type="upgrade">
              <infoLinks>
                <infoLink id="il-3" name="Praesidium Shield" targetId="p-shield" type="profile"/>
              </infoLinks>
              <modifiers>
                <modifier type="increment" field="d29d-cf75-fc2d-34a4" value="1"/>
              </modifiers>
            </selectionEntry>
          </selectionEntries>
        </selectionEntry>
      </selectionEntries>
    </selectionEntry>
    <selectionEntry id="u-frail" name="Frail" type="unit">
      <profiles>
        <profile id="p-frail" name="Frail" typeName="Unit">
          <characteristics>
            <characteristic name="M" typeId="e703-ecb6-5ce7-aec1">6"</characteristic>
            <characteristic name="SV" typeId="450-a17e-9d5e-29da">2+</characteristic>
            <characteristic name="W" typeId="750a-a2ec-90d3-21fe">3</characteristic>
            <characteristic name="LD" typeId="58d2-b879-49c7-43bc">6+</characteristic>
            <characteristic name="OC" typeId="bef7-942a-1a23-59f8">-</characteristic>
          </characteristics>
        </profile>
      </profiles>
    </selectionEntry>
    <selectionEntry id="e-relic" name="Auric Mantle" type="upgrade">
      <profiles>
        <profile id="p-relic" name="Auric Mantle" typeName="Abilities">
          <characteristics>
            <characteristic name="Description">Add 2 to the bearer's ^^Wounds^^.</characteristic>
          </characteristics>
        </profile>
      </profiles>
      <costs>
        <cost name="pts" typeId="51b2-306e-1021-d207" value="15"/>
      </costs>
    </selectionEntry>
  </sharedSelectionEntries>
  <entryLinks>
    <entryLink id="r-1" name="Guard" targetId="u-guard" type="selectionEntry"/>
    <entryLink id="r-2" name="Frail" targetId="u-frail" type="selectionEntry"/>
    <entryLink id="r-3" name="Auric Mantle" targetId="e-relic" type="selectionEntry"/>
    <entryLink id="r-4" name="Ghost" targetId="missing" type="selectionEntry"/>
  </entryLinks>
</catalogue>"#;

    fn loaded() -> LoadedCatalogue {
        let catalogue = parse_catalogue(FIXTURE, Path::new("test.cat")).expect("fixture parses");
        LoadedCatalogue::standalone(catalogue)
    }

    #[test]
    fn exposes_only_resolvable_units_and_models() {
        let loaded = loaded();
        let symbols = SymbolTable::build(&loaded);
        let names: Vec<_> = exposed_entries(&loaded.catalogue, &symbols)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Guard", "Frail"]);
    }

    #[test]
    fn extracts_stats_abilities_keywords_and_invuln() {
        let loaded = loaded();
        let symbols = SymbolTable::build(&loaded);
        let guard = symbols.entry("u-guard").expect("guard");
        let unit = extract_unit(guard, &symbols, &SpecialCases::default()).expect("extracted");

        assert_eq!(unit.stats.m, StatValue::Number(6));
        assert_eq!(unit.stats.sv, StatValue::Text("2+".into()));
        assert_eq!(unit.invuln.as_deref(), Some("4+"));
        assert_eq!(unit.abilities.len(), 1);
        assert_eq!(unit.abilities[0].id, "deep-strike");
        assert_eq!(unit.abilities[0].description, "This unit can be set up in Reserves.");
        assert_eq!(unit.keywords, vec!["Infantry", "Guardian"]);
        assert_eq!(unit.variants.len(), 2);
    }

    #[test]
    fn unit_missing_toughness_is_dropped() {
        let loaded = loaded();
        let symbols = SymbolTable::build(&loaded);
        let frail = symbols.entry("u-frail").expect("frail");
        assert!(extract_unit(frail, &symbols, &SpecialCases::default()).is_none());
    }

    fn unit_profile_with_wounds(wounds: &str) -> Profile {
        let stat = |name: &str, type_id: &str, value: &str| Characteristic {
            name: name.to_string(),
            type_id: type_id.to_string(),
            value: value.to_string(),
        };
        Profile {
            id: "p-drone".to_string(),
            name: "Drone".to_string(),
            type_name: UNIT_PROFILE.to_string(),
            characteristics: vec![
                stat("M", MOVEMENT_TYPE_ID, "10\""),
                stat("T", TOUGHNESS_TYPE_ID, "4"),
                stat("SV", SAVE_TYPE_ID, "4+"),
                stat("W", WOUNDS_TYPE_ID, wounds),
                stat("LD", LEADERSHIP_TYPE_ID, "7+"),
                stat("OC", OBJECTIVE_CONTROL_TYPE_ID, "0"),
            ],
        }
    }

    #[test]
    fn wounds_must_be_a_positive_number() {
        let stats = unit_stats(&unit_profile_with_wounds("2")).expect("two wounds");
        assert_eq!(stats.w, StatValue::Number(2));
        for wounds in ["0", "-1", "-", "D3"] {
            assert!(
                unit_stats(&unit_profile_with_wounds(wounds)).is_none(),
                "W {wounds} accepted"
            );
        }
    }

    #[test]
    fn weapons_keep_text_values_and_skip_incomplete_profiles() {
        let loaded = loaded();
        let symbols = SymbolTable::build(&loaded);
        let guard = symbols.entry("u-guard").expect("guard");
        let unit = extract_unit(guard, &symbols, &SpecialCases::default()).expect("extracted");

        let spear = unit
            .weapons
            .iter()
            .find(|w| w.weapon.id == "guardian-spear-melee")
            .expect("spear extracted");
        assert_eq!(spear.variant, Some(0));
        assert_eq!(spear.weapon.stats.d, Some(StatValue::Text("D6".into())));
        assert_eq!(spear.weapon.stats.ap, Some(StatValue::Number(-2)));
        assert_eq!(spear.weapon.stats.ws, Some(StatValue::Text("2+".into())));
        assert_eq!(spear.weapon.stats.bs, None);
        assert_eq!(spear.weapon.abilities, vec!["Lance", "Sustained Hits 1"]);
        assert!(unit.weapons.iter().all(|w| w.weapon.name != "Broken gun"));
    }

    #[test]
    fn ability_only_wargear_becomes_equipment_with_modifiers() {
        let loaded = loaded();
        let symbols = SymbolTable::build(&loaded);
        let guard = symbols.entry("u-guard").expect("guard");
        let special = SpecialCases {
            stat_bonuses: vec![StatBonus {
                profile_id: "p-shield".into(),
                name: None,
                stat: "w".into(),
                operation: StatOperation::Add,
                value: 1,
            }],
            ..SpecialCases::default()
        };
        let unit = extract_unit(guard, &symbols, &special).expect("extracted");

        let shield = unit
            .weapons
            .iter()
            .find(|w| w.weapon.kind == WeaponType::Equipment)
            .expect("shield extracted");
        assert_eq!(shield.weapon.id, "praesidium-shield-equipment");
        assert_eq!(shield.variant, Some(1));
        assert_eq!(shield.weapon.stats, WeaponStats::default());
        assert_eq!(shield.weapon.abilities, vec!["The bearer has +1 Wounds."]);
        let stats: Vec<_> = shield
            .weapon
            .modifiers
            .iter()
            .map(|m| (m.stat.as_str(), m.operation, m.value))
            .collect();
        assert_eq!(stats, vec![("t", StatOperation::Add, 1), ("w", StatOperation::Add, 1)]);
    }

    #[test]
    fn enhancements_are_priced_shared_upgrades() {
        let loaded = loaded();
        let enhancements = collect_enhancements(&loaded.catalogue);
        assert_eq!(enhancements.len(), 1);
        assert_eq!(enhancements[0].id, "auric-mantle");
        assert_eq!(enhancements[0].points, 15);
        assert_eq!(enhancements[0].description, "Add 2 to the bearer's Wounds.");
    }

    #[test]
    fn dashes_read_as_zero() {
        assert_eq!(dash_as_zero("-"), StatValue::Number(0));
        assert_eq!(dash_as_zero("–"), StatValue::Number(0));
        assert_eq!(dash_as_zero("8"), StatValue::Number(8));
    }
}
