//! BSData catalogue resolution engine.
//!
//! `xml` promotes a `.cat` document to typed records, `loader` resolves parent
//! catalogues, `symbols` indexes shared definitions, and the per-unit stages
//! (`extract`, `variants`, `loadout`, `cost`) produce the records in `output`.
//! `detachments` reads the faction-wide detachment container.

pub mod cost;
pub mod detachments;
pub mod extract;
pub mod loader;
pub mod loadout;
pub mod output;
pub mod schema;
pub mod symbols;
pub mod text;
pub mod variants;
pub mod xml;

use std::collections::HashSet;

use crate::bsdata::extract::RawUnit;
use crate::bsdata::loader::{load_catalogue, LoadedCatalogue};
use crate::bsdata::output::{FactionDocument, ModelType, Unit, SOURCE_TAG};
use crate::bsdata::symbols::SymbolTable;
use crate::bsdata::text::slugify;
use crate::config::{Settings, SpecialCases};
use crate::error::Result;
use crate::factions::Faction;
use crate::files::write_json;

/// Date stamp for `lastUpdated`.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// Resolve every exposed unit of `loaded` into the faction document.
///
/// Units that cannot be resolved are logged and left out. Output order is by
/// name then BSData id, and a unit id appears once.
pub fn transform_catalogue(
    loaded: &LoadedCatalogue,
    faction: &Faction,
    special: &SpecialCases,
    last_updated: &str,
) -> FactionDocument {
    let symbols = SymbolTable::build(loaded);
    log::debug!(
        "{}: {} profiles, {} entries, {} groups in scope",
        faction.id,
        symbols.profile_count(),
        symbols.entry_count(),
        symbols.group_count()
    );

    let mut units: Vec<Unit> = extract::exposed_entries(&loaded.catalogue, &symbols)
        .into_iter()
        .filter_map(|entry| extract::extract_unit(entry, &symbols, special))
        .map(|raw| build_unit(raw, special))
        .collect();
    units.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.bsdata_id.cmp(&b.bsdata_id)));

    let mut seen = HashSet::new();
    units.retain(|unit| {
        let fresh = seen.insert(unit.id.clone());
        if !fresh {
            log::warn!("{}: duplicate unit id '{}' skipped", faction.id, unit.id);
        }
        fresh
    });

    let detachments = detachments::collect_detachments(&loaded.catalogue, &symbols);
    let offered: HashSet<&str> = detachments
        .iter()
        .flat_map(|detachment| detachment.enhancements.iter())
        .map(|enhancement| enhancement.bsdata_id.as_str())
        .collect();
    let mut enhancements = extract::collect_enhancements(&loaded.catalogue);
    enhancements.retain(|enhancement| !offered.contains(enhancement.bsdata_id.as_str()));

    FactionDocument {
        faction: faction.display_name.to_string(),
        faction_id: faction.id.to_string(),
        source: SOURCE_TAG.to_string(),
        catalogue_id: loaded.catalogue.id.clone(),
        catalogue_revision: loaded.catalogue.revision.clone(),
        last_updated: last_updated.to_string(),
        units,
        enhancements,
        detachments,
    }
}

fn build_unit(raw: RawUnit<'_>, special: &SpecialCases) -> Unit {
    let classified = variants::classify(&raw.name, &raw.variants, special);
    let loadout = loadout::synthesize(&classified);
    let weapons = loadout::assign_weapons(raw.weapons, &loadout.groups, classified.len());
    let loadout_options = loadout::retain_referenced_choices(loadout.options, &weapons);
    let bounds = cost::model_bounds(raw.entry, &raw.variants);
    let points = cost::resolve_points(raw.entry, bounds);

    let model_types = if classified.len() >= 2 {
        classified
            .iter()
            .map(|variant| ModelType {
                id: variant.group_id.clone(),
                bsdata_id: variant.entry_id.clone(),
                name: variant.name.clone(),
                min_models: variant.min_models,
                max_models: variant.max_models,
                leader: variant.leader,
            })
            .collect()
    } else {
        Vec::new()
    };

    Unit {
        id: slugify(&raw.name),
        bsdata_id: raw.entry.id.clone(),
        name: raw.name,
        points,
        stats: raw.stats,
        invuln: raw.invuln,
        weapons,
        loadout_options,
        abilities: raw.abilities,
        keywords: raw.keywords,
        model_types,
    }
}

/// Load, transform and write one faction to `<parsed_dir>/<output file>`.
pub fn parse_faction(
    settings: &Settings,
    faction: &Faction,
    special: &SpecialCases,
) -> Result<FactionDocument> {
    let loaded = load_catalogue(&settings.bsdata_dir, faction.source_filename)?;
    let document = transform_catalogue(&loaded, faction, special, &today());
    let path = settings.parsed_dir.join(faction.output_filename);
    write_json(&path, &document)?;
    log::info!(
        "{}: wrote {} units, {} enhancements, {} detachments to {}",
        faction.id,
        document.units.len(),
        document.all_enhancements().count(),
        document.detachments.len(),
        path.display()
    );
    Ok(document)
}
