use serde_json::Value;

use crate::bsdata::output::FactionDocument;
use crate::bsdata::parse_faction;
use crate::config::{Settings, SpecialCases};
use crate::error::Result;
use crate::factions::{known_ids, select_factions, Faction, FACTIONS};
use crate::files::{read_json, write_json};
use crate::generate::generate_faction;
use crate::report::write_report;
use crate::sync::{compare_documents, sync_points, Comparison};
use crate::validate::{validate_faction_file, ValidationSeverity};

const USAGE: &str =
    "usage: warboard <parse|generate|validate|compare|sync|report|list> <faction-id|--all> [--write]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Parse,
    Generate,
    Validate,
    Compare,
    Sync,
    Report,
    List,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("parse") => Some(Command::Parse),
        Some("generate") => Some(Command::Generate),
        Some("validate") => Some(Command::Validate),
        Some("compare") => Some(Command::Compare),
        Some("sync") => Some(Command::Sync),
        Some("report") => Some(Command::Report),
        Some("list") => Some(Command::List),
        _ => None,
    }
}

/// Run one command over the targeted factions.
///
/// Returns 0 on success, 1 when any faction failed (including validator
/// errors), 2 on a usage error.
pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    if command == Command::List {
        return handle_list();
    }

    let Some(target) = args.get(2).filter(|arg| !arg.starts_with("--") || *arg == "--all") else {
        eprintln!("{USAGE}");
        return 2;
    };
    let Some(factions) = select_factions(target) else {
        eprintln!("unknown faction '{target}'; known: {}", known_ids().join(", "));
        return 2;
    };
    let write = args.iter().skip(2).any(|arg| arg == "--write");

    let settings = Settings::from_env();
    let special = if command == Command::Parse {
        match SpecialCases::load(&settings.special_cases_path) {
            Ok(special) => special,
            Err(err) => {
                eprintln!("special cases: {err}");
                return 1;
            }
        }
    } else {
        SpecialCases::default()
    };

    let mut failed = 0usize;
    for faction in &factions {
        let outcome = match command {
            Command::Parse => handle_parse(&settings, faction, &special),
            Command::Generate => handle_generate(&settings, faction),
            Command::Validate => handle_validate(&settings, faction),
            Command::Compare => handle_compare(&settings, faction),
            Command::Sync => handle_sync(&settings, faction, write),
            Command::Report => handle_report(&settings, faction),
            Command::List => Ok(true),
        };
        match outcome {
            Ok(true) => {}
            Ok(false) => failed += 1,
            Err(err) => {
                log::error!("{}: {err}", faction.id);
                eprintln!("{}: failed: {err}", faction.id);
                failed += 1;
            }
        }
    }

    if factions.len() > 1 {
        println!(
            "{} of {} factions succeeded",
            factions.len() - failed,
            factions.len()
        );
    }
    if failed > 0 {
        1
    } else {
        0
    }
}

fn handle_list() -> i32 {
    println!("id\tfaction\tcatalogue\toutput");
    for faction in FACTIONS {
        println!(
            "{}\t{}\t{}\t{}",
            faction.id, faction.display_name, faction.source_filename, faction.output_filename
        );
    }
    0
}

fn handle_parse(settings: &Settings, faction: &Faction, special: &SpecialCases) -> Result<bool> {
    let document = parse_faction(settings, faction, special)?;
    println!(
        "{}: parsed {} units, {} enhancements, {} detachments (catalogue revision {})",
        faction.id,
        document.units.len(),
        document.all_enhancements().count(),
        document.detachments.len(),
        document.catalogue_revision
    );
    Ok(true)
}

fn handle_generate(settings: &Settings, faction: &Faction) -> Result<bool> {
    let merged = generate_faction(settings, faction)?;
    let units = merged
        .get("units")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    println!(
        "{}: generated {} with {units} units",
        faction.id,
        settings.output_dir.join(faction.output_filename).display()
    );
    Ok(true)
}

fn handle_validate(settings: &Settings, faction: &Faction) -> Result<bool> {
    let path = settings.output_dir.join(faction.output_filename);
    let report = validate_faction_file(&path)?;
    for diagnostic in &report.diagnostics {
        eprintln!("- {}: {diagnostic}", faction.id);
    }
    let errors = report.count(ValidationSeverity::Error);
    let warnings = report.count(ValidationSeverity::Warning);
    if report.has_errors() {
        eprintln!(
            "{}: validation failed: {errors} error(s), {warnings} warning(s)",
            faction.id
        );
        return Ok(false);
    }
    println!(
        "{}: validation passed: {} ({warnings} warning(s))",
        faction.id,
        path.display()
    );
    Ok(true)
}

fn load_parsed(settings: &Settings, faction: &Faction) -> Result<FactionDocument> {
    read_json(&settings.parsed_dir.join(faction.output_filename))
}

fn load_app(settings: &Settings, faction: &Faction) -> Result<Value> {
    read_json(&settings.output_dir.join(faction.output_filename))
}

fn handle_compare(settings: &Settings, faction: &Faction) -> Result<bool> {
    let parsed = load_parsed(settings, faction)?;
    let app = load_app(settings, faction)?;
    let comparison = compare_documents(&parsed, &app);
    print_comparison(faction, &comparison);
    Ok(true)
}

fn print_comparison(faction: &Faction, comparison: &Comparison) {
    println!(
        "{}: matching {} units, {} enhancements",
        faction.id, comparison.matching_units, comparison.matching_enhancements
    );
    if comparison.is_clean() {
        println!("{}: app data is in sync with BSData", faction.id);
        return;
    }
    for diff in &comparison.unit_differences {
        println!("  unit {}: app {} -> BSData {}", diff.name, diff.app, diff.bsdata);
    }
    for diff in &comparison.enhancement_differences {
        println!(
            "  enhancement {}: app {} -> BSData {}",
            diff.name, diff.app, diff.bsdata
        );
    }
    for entry in &comparison.missing_in_app {
        println!("  missing in app: {} ({})", entry.name, entry.kind.as_str());
    }
    for entry in &comparison.missing_in_bsdata {
        println!("  missing in BSData: {} ({})", entry.name, entry.kind.as_str());
    }
}

fn handle_sync(settings: &Settings, faction: &Faction, write: bool) -> Result<bool> {
    let parsed = load_parsed(settings, faction)?;
    let app = load_app(settings, faction)?;
    let outcome = sync_points(&parsed, app);

    if outcome.changes.is_empty() {
        println!("{}: all points match, no changes needed", faction.id);
        return Ok(true);
    }
    println!("{}: {} change(s)", faction.id, outcome.changes.len());
    for change in &outcome.changes {
        println!("  {change}");
    }
    if write {
        let path = settings.output_dir.join(faction.output_filename);
        write_json(&path, &outcome.document)?;
        println!("{}: updated {}", faction.id, path.display());
    } else {
        println!("{}: dry run, pass --write to apply", faction.id);
    }
    Ok(true)
}

fn handle_report(settings: &Settings, faction: &Faction) -> Result<bool> {
    let parsed = load_parsed(settings, faction)?;
    let app_path = settings.output_dir.join(faction.output_filename);
    let comparison = if app_path.is_file() {
        let app: Value = read_json(&app_path)?;
        Some(compare_documents(&parsed, &app))
    } else {
        None
    };
    let path = write_report(
        &settings.parsed_dir,
        faction.output_filename,
        &parsed,
        comparison.as_ref(),
    )?;
    println!("{}: report written to {}", faction.id, path.display());
    Ok(true)
}
