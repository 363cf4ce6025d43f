//! Inspect a BSData .cat file: identity, parent links, symbol counts and the
//! entries it exposes.
//! Usage: cargo run --bin inspect_catalogue -- "path/to/Imperium - Adeptus Custodes.cat"

use std::path::Path;

use warboard::bsdata::extract::{exposed_entries, extract_unit};
use warboard::bsdata::loader::load_catalogue;
use warboard::bsdata::symbols::SymbolTable;
use warboard::bsdata::variants::discover;
use warboard::config::{Settings, SpecialCases};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let path = std::env::args()
        .nth(1)
        .ok_or("Usage: inspect_catalogue <path-to.cat>")?;
    let path = Path::new(&path);
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("Not a file path: {}", path.display()))?;

    let loaded = load_catalogue(dir, file_name)?;
    let catalogue = &loaded.catalogue;
    println!(
        "Catalogue: {} (id={}, revision={})",
        catalogue.name, catalogue.id, catalogue.revision
    );

    println!("\nCatalogue links ({}):", catalogue.catalogue_links.len());
    for link in &catalogue.catalogue_links {
        let resolved = loaded.parents.iter().any(|parent| parent.id == link.target_id);
        println!(
            "  {} -> {} importRootEntries={} {}",
            link.name,
            link.target_id,
            link.import_root_entries,
            if resolved { "[loaded]" } else { "[not loaded]" }
        );
    }

    let symbols = SymbolTable::build(&loaded);
    println!(
        "\nSymbols: {} profiles, {} entries, {} groups (across {} parent(s))",
        symbols.profile_count(),
        symbols.entry_count(),
        symbols.group_count(),
        loaded.parents.len()
    );

    let special = SpecialCases::load(&Settings::from_env().special_cases_path)?;
    let exposed = exposed_entries(catalogue, &symbols);
    println!("\nExposed entries ({}):", exposed.len());
    for entry in exposed {
        let variants = discover(entry, &symbols).len();
        let status = match extract_unit(entry, &symbols, &special) {
            Some(unit) => format!("ok, {} weapon(s)", unit.weapons.len()),
            None => "dropped".to_string(),
        };
        println!(
            "  {} [{}] {:?}, {} variant(s), {}",
            entry.name, entry.id, entry.kind, variants, status
        );
    }
    Ok(())
}
