//! Command-line wrapper: output files, exit codes and the scrubbed copy.

mod common;

use common::{remove, tables_bundle, v3_house};
use serde_json::{json, Value};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Temp dir holding the table bundle and `house.json`.
fn workspace(house: &Value) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_json(&dir.path().join("tables.json"), &tables_bundle());
    write_json(&dir.path().join("house.json"), house);
    dir
}

fn run(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hpxml2hescore"))
        .current_dir(dir.path())
        .env_remove("HESCORE_TABLES")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run hpxml2hescore")
}

fn with_customer(mut house: Value) -> Value {
    house["HPXML"]["Customer"] = json!({"CustomerDetails": {"Person": {
        "SystemIdentifier": {"@id": "person1"},
        "Name": {"FirstName": "Pat", "LastName": "Doe"}
    }}});
    house["HPXML"]["Utility"] = json!({"UtilitiesorFuelProviders": {}});
    house
}

#[test]
fn test_translation_written_to_output_file() {
    let dir = workspace(&v3_house());
    let output = run(&dir, &["house.json", "--tables", "tables.json", "-o", "out.json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let text = std::fs::read_to_string(dir.path().join("out.json")).unwrap();
    let out: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(out["building_address"]["zip_code"], "80302");
    assert_eq!(out["building"]["systems"]["hvac"][0]["hvac_fraction"], 1.0);
}

#[test]
fn test_translation_printed_to_stdout() {
    let dir = workspace(&v3_house());
    let output = Command::new(env!("CARGO_BIN_EXE_hpxml2hescore"))
        .current_dir(dir.path())
        .env("HESCORE_TABLES", "tables.json")
        .arg("house.json")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let out: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(out["building"]["about"]["year_built"], 1975);
}

#[test]
fn test_translation_error_exits_one() {
    let mut house = v3_house();
    remove(&mut house, "/Building/BuildingDetails/Enclosure/Walls/Wall/Siding");
    let dir = workspace(&house);
    let output = run(&dir, &["house.json", "--tables", "tables.json", "-o", "out.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Exterior finish"));
    assert!(!dir.path().join("out.json").exists());
}

#[test]
fn test_unreadable_input_exits_two() {
    let dir = workspace(&v3_house());
    let output = run(&dir, &["missing.json", "--tables", "tables.json"]);
    assert_eq!(output.status.code(), Some(2));

    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    let output = run(&dir, &["broken.json", "--tables", "tables.json"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_scrubbed_copy_survives_failed_translation() {
    let mut house = with_customer(v3_house());
    remove(&mut house, "/Building/BuildingDetails/Enclosure/Walls/Wall/Siding");
    let dir = workspace(&house);
    let output = run(
        &dir,
        &["house.json", "--tables", "tables.json", "--scrubbed-hpxml", "scrubbed.json"],
    );
    assert_eq!(output.status.code(), Some(1));

    let text = std::fs::read_to_string(dir.path().join("scrubbed.json")).unwrap();
    let scrubbed: Value = serde_json::from_str(&text).unwrap();
    let root = &scrubbed["HPXML"];
    assert_eq!(
        root["Customer"],
        json!({"CustomerDetails": {"Person": {"SystemIdentifier": {"@id": "person1"}}}})
    );
    assert!(root.get("Utility").is_none());
    assert!(!text.contains("Pat"));
}

#[test]
fn test_stale_scrubbed_copy_removed_when_input_fails_to_load() {
    let dir = workspace(&v3_house());
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    std::fs::write(dir.path().join("scrubbed.json"), "old").unwrap();
    let output = run(
        &dir,
        &["broken.json", "--tables", "tables.json", "--scrubbed-hpxml", "scrubbed.json"],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("scrubbed.json").exists());
}

#[test]
fn test_building_selector() {
    let mut house = v3_house();
    let first = house["HPXML"]["Building"].clone();
    let mut second = first.clone();
    second["BuildingID"]["@id"] = json!("bldg2");
    second["BuildingDetails"]["BuildingSummary"]["BuildingConstruction"]["NumberofBedrooms"] = json!(5);
    house["HPXML"]["Building"] = json!([first, second]);
    let dir = workspace(&house);

    let output = run(&dir, &["house.json", "--tables", "tables.json", "--bldgid", "bldg2"]);
    assert_eq!(output.status.code(), Some(0));
    let out: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(out["building"]["about"]["number_bedrooms"], 5);

    let output = run(&dir, &["house.json", "--tables", "tables.json", "--bldgid", "bldg9"]);
    assert_eq!(output.status.code(), Some(1));
}
