use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const CATALOGUE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalogue id="custodes-cat" name="Imperium - Adeptus Custodes" revision="7" xmlns="http://www.battlescribe.net/schema/catalogueSchema">
  <sharedSelectionEntries>
    <selectionEntry id="u-guard" name="Custodian Guard" type="unit">
      <profiles>
        <profile id="p-guard" name="Custodian Guard" typeName="Unit">
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
      <costs><cost name="pts" typeId="51b2-306e-1021-d207" value="170"/></costs>
    </selectionEntry>
  </sharedSelectionEntries>
  <entryLinks>
    <entryLink id="r-1" name="Custodian Guard" targetId="u-guard" type="selectionEntry"/>
  </entryLinks>
</catalogue>"#;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_warboard")
}

/// Temporary data layout with every `WARBOARD_*` directory inside it.
struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Workspace {
            root: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn dir(&self, name: &str) -> std::path::PathBuf {
        self.root.path().join(name)
    }

    fn write(&self, dir: &str, file: &str, contents: &str) {
        let dir = self.dir(dir);
        fs::create_dir_all(&dir).expect("fixture dir");
        fs::write(dir.join(file), contents).expect("fixture should be written");
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(bin())
            .args(args)
            .env("WARBOARD_BSDATA_DIR", self.dir("bsdata"))
            .env("WARBOARD_PARSED_DIR", self.dir("parsed"))
            .env("WARBOARD_MANUAL_DIR", self.dir("manual"))
            .env("WARBOARD_OUTPUT_DIR", self.dir("public"))
            .env("WARBOARD_SPECIAL_CASES", self.dir("special_cases.yaml"))
            .env("RUST_LOG", "off")
            .output()
            .expect("warboard should run")
    }
}

fn read(path: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(path).expect("output should exist");
    serde_json::from_str(&raw).expect("output should be json")
}

#[test]
fn missing_command_prints_usage() {
    let output = Workspace::new().run(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: warboard"));
}

#[test]
fn missing_faction_argument_is_a_usage_error() {
    let output = Workspace::new().run(&["parse"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: warboard"));
}

#[test]
fn unknown_faction_lists_known_ids() {
    let output = Workspace::new().run(&["parse", "orks"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown faction 'orks'"));
    assert!(stderr.contains("custodes"));
}

#[test]
fn list_command_prints_the_registry() {
    let output = Workspace::new().run(&["list"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("custodes\tAdeptus Custodes\tImperium - Adeptus Custodes.cat"));
    assert!(stdout.contains("tyranids"));
}

#[test]
fn parse_fails_when_the_primary_catalogue_is_missing() {
    let output = Workspace::new().run(&["parse", "custodes"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("custodes: failed"));
}

#[test]
fn parse_then_generate_then_validate() {
    let workspace = Workspace::new();
    workspace.write("bsdata", "Imperium - Adeptus Custodes.cat", CATALOGUE);

    let output = workspace.run(&["parse", "custodes"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("parsed 1 units"));
    let parsed = read(&workspace.dir("parsed").join("custodes.json"));
    assert_eq!(parsed["factionId"], "custodes");
    assert_eq!(parsed["catalogueRevision"], "7");
    assert_eq!(parsed["units"][0]["points"]["1"], 170);

    workspace.write(
        "manual",
        "custodes.json",
        r#"{"detachments": {"shield-host": {"name": "Shield Host", "rules": [], "stratagems": [], "enhancements": []}}}"#,
    );
    let output = workspace.run(&["generate", "custodes"]);
    assert_eq!(output.status.code(), Some(0));
    let merged = read(&workspace.dir("public").join("custodes.json"));
    assert_eq!(merged["detachments"]["shield-host"]["name"], "Shield Host");

    let output = workspace.run(&["validate", "custodes"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("validation passed"));
}

#[test]
fn validate_returns_non_zero_on_invalid_data() {
    let workspace = Workspace::new();
    workspace.write(
        "public",
        "custodes.json",
        r#"{"units": [{"id": "", "name": "Broken", "stats": {"w": 0}, "points": {}}]}"#,
    );

    let output = workspace.run(&["validate", "custodes"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation failed"));
    assert!(stderr.contains("missing stat 't'"));
}

#[test]
fn sync_is_a_dry_run_until_write_is_passed() {
    let workspace = Workspace::new();
    workspace.write("bsdata", "Imperium - Adeptus Custodes.cat", CATALOGUE);
    assert_eq!(workspace.run(&["parse", "custodes"]).status.code(), Some(0));
    let app = r#"{"units": [{"id": "custodian-guard", "name": "Custodian Guard", "points": {"1": 150}}]}"#;
    workspace.write("public", "custodes.json", app);
    let app_path = workspace.dir("public").join("custodes.json");

    let output = workspace.run(&["sync", "custodes"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("150 -> 170"));
    assert!(stdout.contains("dry run"));
    assert_eq!(read(&app_path)["units"][0]["points"]["1"], 150);

    let output = workspace.run(&["sync", "custodes", "--write"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(read(&app_path)["units"][0]["points"]["1"], 170);

    let output = workspace.run(&["sync", "custodes"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("no changes needed"));
}

#[test]
fn report_is_written_next_to_the_parsed_document() {
    let workspace = Workspace::new();
    workspace.write("bsdata", "Imperium - Adeptus Custodes.cat", CATALOGUE);
    assert_eq!(workspace.run(&["parse", "custodes"]).status.code(), Some(0));

    let output = workspace.run(&["report", "custodes"]);
    assert_eq!(output.status.code(), Some(0));
    let report = fs::read_to_string(workspace.dir("parsed").join("custodes.md"))
        .expect("report should exist");
    assert!(report.contains("Custodian Guard"));
}
