//! Model variants of a unit and their classification into loadout groups.

use std::collections::HashSet;

use crate::bsdata::schema::{
    selections_bound, Constraint, ConstraintKind, EntryKind, EntryLink, SelectionEntry,
    SelectionEntryGroup,
};
use crate::bsdata::symbols::SymbolTable;
use crate::bsdata::text::{slugify, trailing_parenthetical};
use crate::config::SpecialCases;

/// Choice id reserved for the synthetic "take nothing" choice.
pub const NONE_CHOICE_ID: &str = "none";
const FALLBACK_GROUP_ID: &str = "default";

/// Nesting limit when following groups and links; catalogues are shallow.
const MAX_DEPTH: usize = 8;

/// A `type="model"` entry reachable from a unit, before classification.
#[derive(Debug, Clone, Copy)]
pub struct ModelVariant<'a> {
    pub entry: &'a SelectionEntry,
    /// Id of the entry link the variant was reached through, if any.
    pub link_id: Option<&'a str>,
    /// Constraints that apply to this variant: the link's when it has any.
    pub constraints: &'a [Constraint],
    /// Selection entry group that directly owns the variant.
    pub owner: Option<&'a SelectionEntryGroup>,
}

impl ModelVariant<'_> {
    pub fn min_models(&self) -> Option<u32> {
        selections_bound(self.constraints, ConstraintKind::Min)
    }

    pub fn max_models(&self) -> Option<u32> {
        selections_bound(self.constraints, ConstraintKind::Max)
    }
}

/// Model variants of `unit`, found directly, inside selection entry groups,
/// or behind entry links. A top-level `model` entry has none of its own.
pub fn discover<'a>(unit: &'a SelectionEntry, symbols: &SymbolTable<'a>) -> Vec<ModelVariant<'a>> {
    let mut variants = Vec::new();
    if unit.kind != EntryKind::Unit {
        return variants;
    }
    collect(
        &unit.selection_entries,
        &unit.selection_entry_groups,
        &unit.entry_links,
        None,
        symbols,
        0,
        &mut variants,
    );
    variants
}

fn collect<'a>(
    entries: &'a [SelectionEntry],
    groups: &'a [SelectionEntryGroup],
    links: &'a [EntryLink],
    owner: Option<&'a SelectionEntryGroup>,
    symbols: &SymbolTable<'a>,
    depth: usize,
    out: &mut Vec<ModelVariant<'a>>,
) {
    if depth > MAX_DEPTH {
        return;
    }
    for entry in entries.iter().filter(|e| e.kind == EntryKind::Model) {
        out.push(ModelVariant {
            entry,
            link_id: None,
            constraints: &entry.constraints,
            owner,
        });
    }
    for link in links {
        if link.link_type == "selectionEntryGroup" {
            if let Some(group) = symbols.group(&link.target_id) {
                collect_group(group, symbols, depth + 1, out);
            }
            continue;
        }
        let Some(target) = symbols.entry(&link.target_id) else {
            continue;
        };
        if target.kind != EntryKind::Model {
            continue;
        }
        let constraints = if link.constraints.is_empty() {
            target.constraints.as_slice()
        } else {
            link.constraints.as_slice()
        };
        out.push(ModelVariant {
            entry: target,
            link_id: Some(link.id.as_str()),
            constraints,
            owner,
        });
    }
    for group in groups {
        collect_group(group, symbols, depth + 1, out);
    }
}

fn collect_group<'a>(
    group: &'a SelectionEntryGroup,
    symbols: &SymbolTable<'a>,
    depth: usize,
    out: &mut Vec<ModelVariant<'a>>,
) {
    collect(
        &group.selection_entries,
        &group.selection_entry_groups,
        &group.entry_links,
        Some(group),
        symbols,
        depth,
        out,
    );
}

/// A variant with its synthesized loadout group id and partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedVariant {
    pub index: usize,
    pub entry_id: String,
    pub name: String,
    /// Loadout group id, unique within the unit and never [`NONE_CHOICE_ID`].
    pub group_id: String,
    pub choice_name: String,
    /// Explicitly capped at one model: an addition rather than a replacement.
    pub capped: bool,
    /// Matches the owning group's `defaultSelectionEntryId`.
    pub is_default: bool,
    /// Listed in the configured leader-model table.
    pub leader: bool,
    pub min_models: Option<u32>,
    pub max_models: Option<u32>,
}

pub fn classify(
    unit_name: &str,
    variants: &[ModelVariant<'_>],
    special: &SpecialCases,
) -> Vec<ClassifiedVariant> {
    let mut used: HashSet<String> = HashSet::new();
    used.insert(NONE_CHOICE_ID.to_string());

    variants
        .iter()
        .enumerate()
        .map(|(index, variant)| {
            let (base_id, choice_name) = group_identity(unit_name, &variant.entry.name);
            let group_id = unique_id(base_id, &mut used);
            let max_models = variant.max_models();
            let default_id = variant
                .owner
                .and_then(|group| group.default_selection_entry_id.as_deref());
            let is_default = default_id.map_or(false, |id| {
                id == variant.entry.id || Some(id) == variant.link_id
            });

            ClassifiedVariant {
                index,
                entry_id: variant.entry.id.clone(),
                name: variant.entry.name.clone(),
                group_id,
                choice_name,
                capped: max_models == Some(1),
                is_default,
                leader: special.is_leader_model(&variant.entry.id),
                min_models: variant.min_models(),
                max_models,
            }
        })
        .collect()
}

/// Group id and display name for a variant: the trailing parenthetical when
/// present, else the name minus the unit's own name, else `default`.
fn group_identity(unit_name: &str, variant_name: &str) -> (String, String) {
    if let Some(inner) = trailing_parenthetical(variant_name) {
        let slug = slugify(inner);
        if !slug.is_empty() {
            return (slug, inner.to_string());
        }
    }
    let stripped = strip_prefix_ignore_case(variant_name.trim(), unit_name.trim())
        .trim_matches(|c: char| c.is_whitespace() || c == '-' || c == ':' || c == ',');
    let slug = slugify(stripped);
    if slug.is_empty() {
        (FALLBACK_GROUP_ID.to_string(), variant_name.trim().to_string())
    } else {
        (slug, stripped.to_string())
    }
}

fn strip_prefix_ignore_case<'s>(name: &'s str, prefix: &str) -> &'s str {
    if prefix.is_empty() {
        return name;
    }
    match name.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &name[prefix.len()..],
        _ => name,
    }
}

fn unique_id(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{base}-{suffix}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdata::loader::LoadedCatalogue;
    use crate::bsdata::schema::Catalogue;
    use crate::config::LeaderModel;

    fn model(id: &str, name: &str, max: Option<f64>) -> SelectionEntry {
        SelectionEntry {
            id: id.into(),
            name: name.into(),
            kind: EntryKind::Model,
            constraints: max
                .map(|value| {
                    vec![Constraint {
                        kind: ConstraintKind::Max,
                        field: "selections".into(),
                        scope: "parent".into(),
                        value,
                    }]
                })
                .unwrap_or_default(),
            ..SelectionEntry::default()
        }
    }

    #[test]
    fn discovers_direct_grouped_and_linked_variants() {
        let shared_model = model("m-linked", "Guard (Axe)", None);
        let unit = SelectionEntry {
            id: "u".into(),
            name: "Guard".into(),
            kind: EntryKind::Unit,
            selection_entries: vec![model("m-direct", "Guard (Spear)", None)],
            selection_entry_groups: vec![SelectionEntryGroup {
                id: "g".into(),
                name: "Wargear".into(),
                default_selection_entry_id: Some("m-grouped".into()),
                selection_entries: vec![model("m-grouped", "Guard (Blade)", None)],
                ..SelectionEntryGroup::default()
            }],
            entry_links: vec![EntryLink {
                id: "l-1".into(),
                name: "Guard (Axe)".into(),
                target_id: "m-linked".into(),
                link_type: "selectionEntry".into(),
                constraints: Vec::new(),
            }],
            ..SelectionEntry::default()
        };
        let loaded = LoadedCatalogue::standalone(Catalogue {
            shared_selection_entries: vec![shared_model],
            ..Catalogue::default()
        });
        let symbols = SymbolTable::build(&loaded);

        let variants = discover(&unit, &symbols);
        let ids: Vec<_> = variants.iter().map(|v| v.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["m-direct", "m-linked", "m-grouped"]);
        assert_eq!(variants[1].link_id, Some("l-1"));
        assert_eq!(variants[2].owner.map(|g| g.id.as_str()), Some("g"));

        let classified = classify("Guard", &variants, &SpecialCases::default());
        assert_eq!(classified[0].group_id, "spear");
        assert_eq!(classified[2].group_id, "blade");
        assert!(classified[2].is_default);
        assert!(!classified[0].is_default);
    }

    #[test]
    fn top_level_model_has_no_variants() {
        let character = model("c", "Shield-Captain", Some(1.0));
        let loaded = LoadedCatalogue::standalone(Catalogue::default());
        let symbols = SymbolTable::build(&loaded);
        assert!(discover(&character, &symbols).is_empty());
    }

    #[test]
    fn group_ids_fall_back_to_stripped_name_then_default() {
        let a = model("a", "Intercessor Sergeant", Some(1.0));
        let b = model("b", "Intercessor", None);
        let c = model("c", "Intercessor", None);
        let variants: Vec<ModelVariant> = [&a, &b, &c]
            .into_iter()
            .map(|entry| ModelVariant {
                entry,
                link_id: None,
                constraints: &entry.constraints,
                owner: None,
            })
            .collect();
        let classified = classify("Intercessor", &variants, &SpecialCases::default());
        assert_eq!(classified[0].group_id, "sergeant");
        assert!(classified[0].capped);
        assert_eq!(classified[1].group_id, "default");
        assert_eq!(classified[2].group_id, "default-2");
        assert!(!classified[1].capped);
    }

    #[test]
    fn parenthetical_named_none_does_not_collide_with_none_choice() {
        let a = model("a", "Squad (None)", None);
        let variants = vec![ModelVariant {
            entry: &a,
            link_id: None,
            constraints: &a.constraints,
            owner: None,
        }];
        let classified = classify("Squad", &variants, &SpecialCases::default());
        assert_eq!(classified[0].group_id, "none-2");
    }

    #[test]
    fn leader_models_come_from_the_id_table() {
        let a = model("lead-1", "Squad Champion", Some(1.0));
        let variants = vec![ModelVariant {
            entry: &a,
            link_id: None,
            constraints: &a.constraints,
            owner: None,
        }];
        let special = SpecialCases {
            leader_models: vec![LeaderModel {
                entry_id: "lead-1".into(),
                name: None,
            }],
            ..SpecialCases::default()
        };
        assert!(classify("Squad", &variants, &special)[0].leader);
        assert!(!classify("Squad", &variants, &SpecialCases::default())[0].leader);
    }
}
