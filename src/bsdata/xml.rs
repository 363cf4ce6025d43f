//! XML ingestion: parse catalogue markup with `roxmltree` and promote it to
//! the typed records in [`super::schema`].
//!
//! This is the only module that touches XML nodes. Tags are matched by local
//! name, so the BattleScribe namespace declaration is irrelevant.

use std::path::Path;

use roxmltree::{Document, Node};

use crate::bsdata::schema::{
    CatalogueLink, CategoryLink, Catalogue, Characteristic, Condition, Constraint,
    ConstraintKind, Cost, EntryKind, EntryLink, InfoLink, Modifier, ModifierGroup, ModifierKind,
    Profile, Rule, SelectionEntry, SelectionEntryGroup,
};
use crate::error::{Result, WarboardError};

/// Parse a whole catalogue document. `path` is only used for error context.
pub fn parse_catalogue(source: &str, path: &Path) -> Result<Catalogue> {
    let doc = Document::parse(source).map_err(|source| WarboardError::Xml {
        path: path.to_path_buf(),
        source,
    })?;
    let root = doc.root_element();
    let tag = root.tag_name().name();
    if tag != "catalogue" && tag != "gameSystem" {
        log::warn!(
            "{}: unexpected root element <{tag}>, reading it as a catalogue",
            path.display()
        );
    }

    Ok(Catalogue {
        id: attr(root, "id"),
        name: attr(root, "name"),
        revision: attr(root, "revision"),
        catalogue_links: repeated(root, "catalogueLinks", "catalogueLink")
            .map(parse_catalogue_link)
            .collect(),
        shared_profiles: repeated(root, "sharedProfiles", "profile")
            .map(parse_profile)
            .collect(),
        shared_selection_entries: repeated(root, "sharedSelectionEntries", "selectionEntry")
            .map(parse_selection_entry)
            .collect(),
        shared_selection_entry_groups: repeated(
            root,
            "sharedSelectionEntryGroups",
            "selectionEntryGroup",
        )
        .map(parse_selection_entry_group)
        .collect(),
        selection_entries: repeated(root, "selectionEntries", "selectionEntry")
            .map(parse_selection_entry)
            .collect(),
        entry_links: repeated(root, "entryLinks", "entryLink")
            .map(parse_entry_link)
            .collect(),
    })
}

/// Every `item` element inside the `container` children of `node`.
///
/// Repeating children always come back as a sequence: an absent container
/// yields nothing, a single item yields one element.
pub(crate) fn repeated<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    container: &'static str,
    item: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| is_element_named(child, container))
        .flat_map(move |list| {
            list.children()
                .filter(move |child| is_element_named(child, item))
        })
}

fn is_element_named(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

/// Attribute value, or an empty string when absent.
fn attr(node: Node, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}

fn opt_attr(node: Node, name: &str) -> Option<String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn num_attr(node: Node, name: &str) -> f64 {
    node.attribute(name)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn bool_attr(node: Node, name: &str) -> bool {
    node.attribute(name)
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn text(node: Node) -> String {
    node.text().unwrap_or_default().trim().to_string()
}

fn parse_catalogue_link(node: Node) -> CatalogueLink {
    CatalogueLink {
        id: attr(node, "id"),
        name: attr(node, "name"),
        target_id: attr(node, "targetId"),
        import_root_entries: bool_attr(node, "importRootEntries"),
    }
}

fn parse_profile(node: Node) -> Profile {
    Profile {
        id: attr(node, "id"),
        name: attr(node, "name"),
        type_name: attr(node, "typeName"),
        characteristics: repeated(node, "characteristics", "characteristic")
            .map(|c| Characteristic {
                name: attr(c, "name"),
                type_id: attr(c, "typeId"),
                value: text(c),
            })
            .collect(),
    }
}

fn parse_selection_entry(node: Node) -> SelectionEntry {
    SelectionEntry {
        id: attr(node, "id"),
        name: attr(node, "name"),
        kind: EntryKind::from_attr(node.attribute("type").unwrap_or_default()),
        profiles: repeated(node, "profiles", "profile")
            .map(parse_profile)
            .collect(),
        selection_entries: repeated(node, "selectionEntries", "selectionEntry")
            .map(parse_selection_entry)
            .collect(),
        selection_entry_groups: repeated(node, "selectionEntryGroups", "selectionEntryGroup")
            .map(parse_selection_entry_group)
            .collect(),
        entry_links: repeated(node, "entryLinks", "entryLink")
            .map(parse_entry_link)
            .collect(),
        info_links: repeated(node, "infoLinks", "infoLink")
            .map(parse_info_link)
            .collect(),
        category_links: repeated(node, "categoryLinks", "categoryLink")
            .map(parse_category_link)
            .collect(),
        costs: repeated(node, "costs", "cost")
            .map(|c| Cost {
                name: attr(c, "name"),
                type_id: attr(c, "typeId"),
                value: num_attr(c, "value"),
            })
            .collect(),
        constraints: parse_constraints(node),
        modifiers: repeated(node, "modifiers", "modifier")
            .map(parse_modifier)
            .collect(),
        modifier_groups: repeated(node, "modifierGroups", "modifierGroup")
            .map(parse_modifier_group)
            .collect(),
        rules: repeated(node, "rules", "rule").map(parse_rule).collect(),
    }
}

fn parse_rule(node: Node) -> Rule {
    let description = node
        .children()
        .find(|child| is_element_named(child, "description"))
        .map(text)
        .unwrap_or_default();
    Rule {
        id: attr(node, "id"),
        name: attr(node, "name"),
        description,
    }
}

fn parse_selection_entry_group(node: Node) -> SelectionEntryGroup {
    SelectionEntryGroup {
        id: attr(node, "id"),
        name: attr(node, "name"),
        default_selection_entry_id: opt_attr(node, "defaultSelectionEntryId"),
        selection_entries: repeated(node, "selectionEntries", "selectionEntry")
            .map(parse_selection_entry)
            .collect(),
        selection_entry_groups: repeated(node, "selectionEntryGroups", "selectionEntryGroup")
            .map(parse_selection_entry_group)
            .collect(),
        entry_links: repeated(node, "entryLinks", "entryLink")
            .map(parse_entry_link)
            .collect(),
        constraints: parse_constraints(node),
    }
}

fn parse_entry_link(node: Node) -> EntryLink {
    EntryLink {
        id: attr(node, "id"),
        name: attr(node, "name"),
        target_id: attr(node, "targetId"),
        link_type: attr(node, "type"),
        constraints: parse_constraints(node),
    }
}

fn parse_info_link(node: Node) -> InfoLink {
    InfoLink {
        id: attr(node, "id"),
        name: attr(node, "name"),
        target_id: attr(node, "targetId"),
        link_type: attr(node, "type"),
    }
}

fn parse_category_link(node: Node) -> CategoryLink {
    CategoryLink {
        id: attr(node, "id"),
        name: attr(node, "name"),
        target_id: attr(node, "targetId"),
        primary: bool_attr(node, "primary"),
    }
}

fn parse_constraints(node: Node) -> Vec<Constraint> {
    repeated(node, "constraints", "constraint")
        .map(|c| Constraint {
            kind: match c.attribute("type") {
                Some("min") => ConstraintKind::Min,
                Some("max") => ConstraintKind::Max,
                _ => ConstraintKind::Other,
            },
            field: attr(c, "field"),
            scope: attr(c, "scope"),
            value: num_attr(c, "value"),
        })
        .collect()
}

fn parse_modifier(node: Node) -> Modifier {
    Modifier {
        kind: ModifierKind::from_attr(node.attribute("type").unwrap_or_default()),
        field: attr(node, "field"),
        value: attr(node, "value"),
        conditions: parse_conditions(node),
    }
}

fn parse_modifier_group(node: Node) -> ModifierGroup {
    ModifierGroup {
        conditions: parse_conditions(node),
        modifiers: repeated(node, "modifiers", "modifier")
            .map(parse_modifier)
            .collect(),
        modifier_groups: repeated(node, "modifierGroups", "modifierGroup")
            .map(parse_modifier_group)
            .collect(),
    }
}

/// Direct conditions plus those nested in condition groups, flattened.
fn parse_conditions(node: Node) -> Vec<Condition> {
    let mut conditions: Vec<Condition> = repeated(node, "conditions", "condition")
        .map(parse_condition)
        .collect();
    for group in repeated(node, "conditionGroups", "conditionGroup") {
        conditions.extend(parse_conditions(group));
    }
    conditions
}

fn parse_condition(node: Node) -> Condition {
    Condition {
        kind: attr(node, "type"),
        field: attr(node, "field"),
        scope: attr(node, "scope"),
        child_id: attr(node, "childId"),
        value: num_attr(node, "value"),
    }
}
