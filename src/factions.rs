//! Faction registry: which catalogue each faction is read from and which
//! document it is written to.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Faction {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Primary catalogue file under the BSData checkout.
    pub source_filename: &'static str,
    /// Document name shared by the parsed, manual and app data directories.
    pub output_filename: &'static str,
}

pub const FACTIONS: &[Faction] = &[
    Faction {
        id: "custodes",
        display_name: "Adeptus Custodes",
        source_filename: "Imperium - Adeptus Custodes.cat",
        output_filename: "custodes.json",
    },
    Faction {
        id: "space-marines",
        display_name: "Space Marines",
        source_filename: "Imperium - Space Marines.cat",
        output_filename: "space-marines.json",
    },
    Faction {
        id: "blood-angels",
        display_name: "Blood Angels",
        source_filename: "Imperium - Blood Angels.cat",
        output_filename: "blood-angels.json",
    },
    Faction {
        id: "dark-angels",
        display_name: "Dark Angels",
        source_filename: "Imperium - Dark Angels.cat",
        output_filename: "dark-angels.json",
    },
    Faction {
        id: "grey-knights",
        display_name: "Grey Knights",
        source_filename: "Imperium - Grey Knights.cat",
        output_filename: "grey-knights.json",
    },
    Faction {
        id: "astra-militarum",
        display_name: "Astra Militarum",
        source_filename: "Imperium - Astra Militarum.cat",
        output_filename: "astra-militarum.json",
    },
    Faction {
        id: "necrons",
        display_name: "Necrons",
        source_filename: "Necrons.cat",
        output_filename: "necrons.json",
    },
    Faction {
        id: "tyranids",
        display_name: "Tyranids",
        source_filename: "Tyranids.cat",
        output_filename: "tyranids.json",
    },
];

pub fn find_faction(id: &str) -> Option<&'static Faction> {
    FACTIONS.iter().find(|faction| faction.id == id)
}

pub fn known_ids() -> Vec<&'static str> {
    FACTIONS.iter().map(|faction| faction.id).collect()
}

/// `--all` selects every faction in registry order; anything else must be a
/// registered id.
pub fn select_factions(target: &str) -> Option<Vec<&'static Faction>> {
    if target == "--all" {
        return Some(FACTIONS.iter().collect());
    }
    find_faction(target).map(|faction| vec![faction])
}
