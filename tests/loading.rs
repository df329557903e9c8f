//! Loading documents and lookup tables from disk.

mod common;

use common::{tables, tables_bundle, translator, v3_house};
use hescore_hpxml::{AssemblyTables, Construction, Document, TranslateError, TranslateOptions};
use tempfile::TempDir;

#[test]
fn test_yaml_and_json_documents_translate_alike() {
    let dir = TempDir::new().unwrap();
    let house = v3_house();
    let json_path = dir.path().join("house.json");
    let yaml_path = dir.path().join("house.yaml");
    std::fs::write(&json_path, serde_json::to_string(&house).unwrap()).unwrap();
    std::fs::write(&yaml_path, serde_yaml::to_string(&house).unwrap()).unwrap();

    let from_json = Document::load(&json_path).unwrap();
    let from_yaml = Document::load(&yaml_path).unwrap();
    assert_eq!(from_json.value(), from_yaml.value());

    let translator = translator();
    let options = TranslateOptions::new();
    assert_eq!(
        translator.translate(&from_json, &options).unwrap(),
        translator.translate(&from_yaml, &options).unwrap()
    );
}

#[test]
fn test_tables_from_csv_directory() {
    let dir = TempDir::new().unwrap();
    let bundle = tables_bundle();
    for construction in Construction::ALL {
        let mut csv = String::from("doe2code,Eff-R-value,Notes\n");
        for (code, r) in bundle[construction.key()].as_object().unwrap() {
            csv.push_str(&format!("\"{}\",{},x\n", code, r));
        }
        std::fs::write(dir.path().join(construction.file_name()), csv).unwrap();
    }

    let loaded = AssemblyTables::load(dir.path()).unwrap();
    assert_eq!(loaded, tables());
    assert_eq!(loaded.table(Construction::Ceiling).get("ecwf30"), Some(30.9));
}

#[test]
fn test_tables_from_yaml_bundle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tables.yml");
    std::fs::write(&path, serde_yaml::to_string(&tables_bundle()).unwrap()).unwrap();
    assert_eq!(AssemblyTables::load(&path).unwrap(), tables());
}

#[test]
fn test_missing_table_file_is_not_a_translation_error() {
    let dir = TempDir::new().unwrap();
    let err = AssemblyTables::load(dir.path()).unwrap_err();
    assert!(matches!(err, TranslateError::Table(_)));
    assert!(!err.is_translation_error());
}
