//! Typed intermediate records for the BSData catalogue schema.
//!
//! These are promoted from the XML tree by [`super::xml`] and are the only
//! shape the rest of the engine sees. Characteristic values stay verbatim here;
//! numeric promotion happens during extraction.

/// Characteristic/cost type id for points.
pub const POINTS_TYPE_ID: &str = "51b2-306e-1021-d207";

pub const MOVEMENT_TYPE_ID: &str = "e703-ecb6-5ce7-aec1";
pub const TOUGHNESS_TYPE_ID: &str = "d29d-cf75-fc2d-34a4";
pub const SAVE_TYPE_ID: &str = "450-a17e-9d5e-29da";
pub const WOUNDS_TYPE_ID: &str = "750a-a2ec-90d3-21fe";
pub const LEADERSHIP_TYPE_ID: &str = "58d2-b879-49c7-43bc";
pub const OBJECTIVE_CONTROL_TYPE_ID: &str = "bef7-942a-1a23-59f8";

pub const RANGE_TYPE_ID: &str = "914c-b413-91e3-a132";
pub const ATTACKS_TYPE_ID: &str = "2337-daa1-6682-b110";
pub const BALLISTIC_SKILL_TYPE_ID: &str = "94d-8a98-cf90-183d";
pub const WEAPON_SKILL_TYPE_ID: &str = "95d1-95f-45b4-11d6";
pub const STRENGTH_TYPE_ID: &str = "ab33-d393-96ce-ccba";
pub const ARMOUR_PENETRATION_TYPE_ID: &str = "41a0-1301-112a-e2f2";
pub const DAMAGE_TYPE_ID: &str = "3254-9fe6-d824-513e";

pub const UNIT_PROFILE: &str = "Unit";
pub const ABILITIES_PROFILE: &str = "Abilities";
pub const MELEE_WEAPONS_PROFILE: &str = "Melee Weapons";
pub const RANGED_WEAPONS_PROFILE: &str = "Ranged Weapons";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    pub id: String,
    pub name: String,
    pub revision: String,
    pub catalogue_links: Vec<CatalogueLink>,
    pub shared_profiles: Vec<Profile>,
    pub shared_selection_entries: Vec<SelectionEntry>,
    pub shared_selection_entry_groups: Vec<SelectionEntryGroup>,
    pub selection_entries: Vec<SelectionEntry>,
    /// Root entry links: the publicly instantiable entries of this catalogue.
    pub entry_links: Vec<EntryLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogueLink {
    pub id: String,
    pub name: String,
    pub target_id: String,
    pub import_root_entries: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Characteristic {
    pub name: String,
    pub type_id: String,
    pub value: String,
}

/// A named rule with free text, as carried by detachment entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub type_name: String,
    pub characteristics: Vec<Characteristic>,
}

impl Profile {
    pub fn characteristic_by_type(&self, type_id: &str) -> Option<&str> {
        self.characteristics
            .iter()
            .find(|c| c.type_id == type_id)
            .map(|c| c.value.as_str())
    }

    pub fn characteristic_named(&self, name: &str) -> Option<&str> {
        self.characteristics
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    pub fn is_weapon(&self) -> bool {
        self.type_name == MELEE_WEAPONS_PROFILE || self.type_name == RANGED_WEAPONS_PROFILE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EntryKind {
    Unit,
    Model,
    Upgrade,
    #[default]
    Unknown,
}

impl EntryKind {
    pub fn from_attr(raw: &str) -> Self {
        match raw {
            "unit" => EntryKind::Unit,
            "model" => EntryKind::Model,
            "upgrade" => EntryKind::Upgrade,
            _ => EntryKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionEntry {
    pub id: String,
    pub name: String,
    pub kind: EntryKind,
    pub profiles: Vec<Profile>,
    pub selection_entries: Vec<SelectionEntry>,
    pub selection_entry_groups: Vec<SelectionEntryGroup>,
    pub entry_links: Vec<EntryLink>,
    pub info_links: Vec<InfoLink>,
    pub category_links: Vec<CategoryLink>,
    pub costs: Vec<Cost>,
    pub constraints: Vec<Constraint>,
    pub modifiers: Vec<Modifier>,
    pub modifier_groups: Vec<ModifierGroup>,
    pub rules: Vec<Rule>,
}

impl SelectionEntry {
    /// Base points cost, matched by the points type id or the `pts` cost name.
    pub fn base_points(&self) -> Option<f64> {
        self.costs
            .iter()
            .find(|cost| cost.type_id == POINTS_TYPE_ID || cost.name == "pts")
            .map(|cost| cost.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionEntryGroup {
    pub id: String,
    pub name: String,
    pub default_selection_entry_id: Option<String>,
    pub selection_entries: Vec<SelectionEntry>,
    pub selection_entry_groups: Vec<SelectionEntryGroup>,
    pub entry_links: Vec<EntryLink>,
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryLink {
    pub id: String,
    pub name: String,
    pub target_id: String,
    /// `selectionEntry` or `selectionEntryGroup`.
    pub link_type: String,
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoLink {
    pub id: String,
    pub name: String,
    pub target_id: String,
    /// `profile`, `rule` or `infoGroup`.
    pub link_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryLink {
    pub id: String,
    pub name: String,
    pub target_id: String,
    pub primary: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cost {
    pub name: String,
    pub type_id: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConstraintKind {
    Min,
    Max,
    #[default]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub field: String,
    pub scope: String,
    pub value: f64,
}

/// Selection-count bound from constraints on `selections`, if declared.
pub fn selections_bound(constraints: &[Constraint], kind: ConstraintKind) -> Option<u32> {
    constraints
        .iter()
        .find(|c| c.kind == kind && c.field == "selections" && c.value >= 0.0)
        .map(|c| c.value.round() as u32)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModifierKind {
    Set,
    Increment,
    Decrement,
    #[default]
    Other,
}

impl ModifierKind {
    pub fn from_attr(raw: &str) -> Self {
        match raw {
            "set" => ModifierKind::Set,
            "increment" => ModifierKind::Increment,
            "decrement" => ModifierKind::Decrement,
            _ => ModifierKind::Other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    /// `atLeast`, `equalTo`, `lessThan`, ...
    pub kind: String,
    pub field: String,
    pub scope: String,
    pub child_id: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub field: String,
    pub value: String,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierGroup {
    pub conditions: Vec<Condition>,
    pub modifiers: Vec<Modifier>,
    pub modifier_groups: Vec<ModifierGroup>,
}
