//! Detachments: the upgrades under a catalogue's detachment container that
//! carry a rule, each with the priced upgrades nested beneath it.

use std::collections::HashSet;

use crate::bsdata::extract::enhancement;
use crate::bsdata::output::{Detachment, Enhancement};
use crate::bsdata::schema::{
    Catalogue, EntryKind, EntryLink, Rule, SelectionEntry, SelectionEntryGroup,
};
use crate::bsdata::symbols::SymbolTable;
use crate::bsdata::text::{clean_text, slugify};

const CONTAINER_NAMES: &[&str] = &["Detachments", "Detachment"];
const MAX_DEPTH: usize = 8;

pub fn is_detachment_container(name: &str) -> bool {
    let name = name.trim();
    CONTAINER_NAMES
        .iter()
        .any(|container| name.eq_ignore_ascii_case(container))
}

/// Detachments of the primary catalogue in document order.
///
/// Containers are upgrade entries (root or shared) or shared groups named
/// `Detachments`. The first upgrade on each path below a container that
/// carries a named rule is a detachment; the upgrades beneath it are its
/// enhancements, never detachments of their own.
pub fn collect_detachments<'a>(
    catalogue: &'a Catalogue,
    symbols: &SymbolTable<'a>,
) -> Vec<Detachment> {
    let walker = UpgradeWalker {
        symbols,
        stop_at_rules: true,
    };
    let mut candidates = Vec::new();
    for container in catalogue
        .selection_entries
        .iter()
        .chain(&catalogue.shared_selection_entries)
        .filter(|entry| {
            entry.kind == EntryKind::Upgrade && is_detachment_container(&entry.name)
        })
    {
        walker.children(container, 0, &mut candidates);
    }
    for group in catalogue
        .shared_selection_entry_groups
        .iter()
        .filter(|group| is_detachment_container(&group.name))
    {
        walker.group(group, 0, &mut candidates);
    }

    let mut seen = HashSet::new();
    let mut detachments = Vec::new();
    for entry in candidates {
        let Some(rule) = first_rule(entry, 0) else {
            continue;
        };
        let id = slugify(&entry.name);
        if !seen.insert(id.clone()) {
            log::debug!("detachment '{}' ({}) listed twice", entry.name, entry.id);
            continue;
        }
        detachments.push(Detachment {
            id,
            bsdata_id: entry.id.clone(),
            name: entry.name.trim().to_string(),
            rule_name: rule.name.trim().to_string(),
            rule_description: clean_text(&rule.description),
            enhancements: enhancements_of(entry, symbols),
        });
    }
    detachments
}

fn enhancements_of<'a>(
    detachment: &'a SelectionEntry,
    symbols: &SymbolTable<'a>,
) -> Vec<Enhancement> {
    let walker = UpgradeWalker {
        symbols,
        stop_at_rules: false,
    };
    let mut upgrades = Vec::new();
    walker.children(detachment, 0, &mut upgrades);
    let mut seen = HashSet::new();
    upgrades
        .into_iter()
        .filter_map(enhancement)
        .filter(|found| seen.insert(found.id.clone()))
        .collect()
}

/// Collects upgrades in pre-order, following entry and group links through
/// the symbol table.
struct UpgradeWalker<'s, 'a> {
    symbols: &'s SymbolTable<'a>,
    /// Do not descend below an upgrade that carries a rule.
    stop_at_rules: bool,
}

impl<'s, 'a> UpgradeWalker<'s, 'a> {
    fn children(
        &self,
        entry: &'a SelectionEntry,
        depth: usize,
        out: &mut Vec<&'a SelectionEntry>,
    ) {
        self.level(
            &entry.selection_entries,
            &entry.selection_entry_groups,
            &entry.entry_links,
            depth,
            out,
        );
    }

    fn group(
        &self,
        group: &'a SelectionEntryGroup,
        depth: usize,
        out: &mut Vec<&'a SelectionEntry>,
    ) {
        self.level(
            &group.selection_entries,
            &group.selection_entry_groups,
            &group.entry_links,
            depth,
            out,
        );
    }

    fn level(
        &self,
        entries: &'a [SelectionEntry],
        groups: &'a [SelectionEntryGroup],
        links: &'a [EntryLink],
        depth: usize,
        out: &mut Vec<&'a SelectionEntry>,
    ) {
        if depth > MAX_DEPTH {
            return;
        }
        for entry in entries {
            self.visit(entry, depth, out);
        }
        for group in groups {
            self.group(group, depth + 1, out);
        }
        for link in links {
            if link.link_type == "selectionEntryGroup" {
                if let Some(group) = self.symbols.group(&link.target_id) {
                    self.group(group, depth + 1, out);
                }
            } else if let Some(entry) = self.symbols.entry(&link.target_id) {
                self.visit(entry, depth, out);
            } else {
                log::debug!("link '{}' -> {} does not resolve", link.name, link.target_id);
            }
        }
    }

    fn visit(
        &self,
        entry: &'a SelectionEntry,
        depth: usize,
        out: &mut Vec<&'a SelectionEntry>,
    ) {
        if entry.kind == EntryKind::Upgrade {
            out.push(entry);
            if self.stop_at_rules && first_rule(entry, 0).is_some() {
                return;
            }
        }
        self.children(entry, depth + 1, out);
    }
}

/// The entry's own first named rule, else the first one found in its inline
/// children.
fn first_rule(entry: &SelectionEntry, depth: usize) -> Option<&Rule> {
    if depth > MAX_DEPTH {
        return None;
    }
    if let Some(rule) = entry.rules.iter().find(|rule| !rule.name.trim().is_empty()) {
        return Some(rule);
    }
    entry
        .selection_entries
        .iter()
        .chain(entry.selection_entry_groups.iter().flat_map(|g| g.selection_entries.iter()))
        .find_map(|child| first_rule(child, depth + 1))
}
