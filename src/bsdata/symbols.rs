//! Symbol resolver: id lookup over shared profiles and shared selection
//! entries, with child-over-parent override.
//!
//! A table borrows from one [`LoadedCatalogue`] and lives only as long as that
//! parse; nothing is cached between catalogues.

use std::collections::HashMap;

use crate::bsdata::loader::LoadedCatalogue;
use crate::bsdata::schema::{Profile, SelectionEntry, SelectionEntryGroup};

#[derive(Debug, Default)]
pub struct SymbolTable<'a> {
    profiles: HashMap<&'a str, &'a Profile>,
    entries: HashMap<&'a str, &'a SelectionEntry>,
    /// Shared selection entry groups, reachable from `selectionEntryGroup` links.
    groups: HashMap<&'a str, &'a SelectionEntryGroup>,
}

impl<'a> SymbolTable<'a> {
    /// Insert parents first and the primary catalogue last so that an id
    /// collision resolves to the child's definition.
    pub fn build(loaded: &'a LoadedCatalogue) -> Self {
        let mut table = SymbolTable::default();
        for catalogue in loaded.in_override_order() {
            for profile in &catalogue.shared_profiles {
                table.profiles.insert(profile.id.as_str(), profile);
            }
            for entry in &catalogue.shared_selection_entries {
                table.entries.insert(entry.id.as_str(), entry);
            }
            for group in &catalogue.shared_selection_entry_groups {
                table.groups.insert(group.id.as_str(), group);
            }
        }
        table
    }

    pub fn profile(&self, id: &str) -> Option<&'a Profile> {
        self.profiles.get(id).copied()
    }

    pub fn entry(&self, id: &str) -> Option<&'a SelectionEntry> {
        self.entries.get(id).copied()
    }

    pub fn group(&self, id: &str) -> Option<&'a SelectionEntryGroup> {
        self.groups.get(id).copied()
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
