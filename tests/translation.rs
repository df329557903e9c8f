//! End-to-end translation of whole documents.
//!
//! Covers both schema versions, building selection, the four worked
//! scenarios from the business rules (missing siding, floor-area weighted
//! boilers, rigid sheathing credit, duct location fallback) and
//! determinism of the output.

mod common;

use common::{document, remove, set, translator, v2_house, v3_house};
use hescore_hpxml::{NoValidation, TranslateError, TranslateOptions, Translator};
use serde_json::{json, Value};
use std::sync::Arc;

const ENCLOSURE: &str = "/Building/BuildingDetails/Enclosure";
const HVAC: &str = "/Building/BuildingDetails/Systems/HVAC";

fn translate(value: Value) -> Result<Value, TranslateError> {
    let inputs = translator().translate(&document(value), &TranslateOptions::new())?;
    Ok(serde_json::to_value(&inputs).expect("inputs serialize"))
}

fn boiler(id: &str, floor_area: f64) -> Value {
    json!({
        "SystemIdentifier": {"@id": id},
        "HeatingSystemType": {"Boiler": null},
        "HeatingSystemFuel": "natural gas",
        "AnnualHeatingEfficiency": {"Units": "AFUE", "Value": 0.85},
        "FloorAreaServed": floor_area
    })
}

#[test]
fn test_v3_house_translates() {
    let out = translate(v3_house()).expect("translation succeeds");

    assert_eq!(out["building_address"]["address"], "123 Main St");
    assert_eq!(out["building_address"]["zip_code"], "80302");
    assert_eq!(out["building_address"]["assessment_type"], "initial");
    assert!(out.get("hpwes").is_none());

    let about = &out["building"]["about"];
    assert_eq!(about["assessment_date"], "2024-05-20");
    assert_eq!(about["shape"], "rectangle");
    assert_eq!(about["conditioned_floor_area"], 1500);
    assert_eq!(about["floor_to_ceiling_height"], 8);
    assert_eq!(about["orientation"], "north");
    assert_eq!(about["blower_door_test"], true);
    assert_eq!(about["envelope_leakage"], 2400);

    let zone = &out["building"]["zone"];
    let roof = &zone["zone_roof"][0];
    assert_eq!(zone["zone_roof"].as_array().map(Vec::len), Some(1));
    assert_eq!(roof["roof_type"], "vented_attic");
    assert_eq!(roof["roof_assembly_code"], "rfwf00co");
    assert_eq!(roof["ceiling_assembly_code"], "ecwf30");
    assert_eq!(roof["ceiling_area"], 1500.0);

    let floor = &zone["zone_floor"][0];
    assert_eq!(floor["foundation_type"], "slab_on_grade");
    assert_eq!(floor["foundation_insulation_level"], 0);
    assert!(floor.get("floor_assembly_code").is_none());

    let walls = zone["zone_wall"].as_array().expect("wall zones");
    assert_eq!(walls.len(), 4);
    assert!(walls.iter().all(|w| w["wall_assembly_code"] == "ewwf13vi"));
    let front = walls.iter().find(|w| w["side"] == "front").expect("front wall");
    assert_eq!(front["zone_window"]["window_area"], 60.0);
    let back = walls.iter().find(|w| w["side"] == "back").expect("back wall");
    assert_eq!(back["zone_window"]["window_area"], 40.0);

    let hvac = out["building"]["systems"]["hvac"].as_array().expect("hvac systems");
    assert_eq!(hvac.len(), 1);
    assert_eq!(hvac[0]["hvac_fraction"], 1.0);
    assert_eq!(hvac[0]["heating"]["type"], "central_furnace");
    assert_eq!(hvac[0]["heating"]["fuel_primary"], "natural_gas");
    assert_eq!(hvac[0]["cooling"]["type"], "split_dx");
    let ducts = hvac[0]["hvac_distribution"]["duct"].as_array().expect("ducts");
    assert_eq!(ducts[0]["location"], "uncond_attic");
    assert_eq!(ducts[0]["insulated"], true);
    assert_eq!(ducts[1]["location"], "cond_space");

    let dhw = &out["building"]["systems"]["domestic_hot_water"];
    assert_eq!(dhw["type"], "storage");
    assert_eq!(dhw["energy_factor"], 0.62);
    assert!(out["building"]["systems"].get("generation").is_none());
}

#[test]
fn test_both_schema_versions_agree() {
    let v2 = translate(v2_house()).expect("2.x translation");
    let v3 = translate(v3_house()).expect("3.x translation");
    assert_eq!(v2["building"]["zone"], v3["building"]["zone"]);
    assert_eq!(v2["building"]["systems"], v3["building"]["systems"]);
    assert_eq!(v2["building"]["about"], v3["building"]["about"]);
}

#[test]
fn test_translation_is_deterministic() {
    let translator = translator();
    let doc = document(v3_house());
    let first = translator.translate_to_json(&doc, &TranslateOptions::new()).unwrap();
    let second = translator.translate_to_json(&doc, &TranslateOptions::new()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_siding_fails() {
    let mut house = v3_house();
    remove(&mut house, &format!("{}/Walls/Wall/Siding", ENCLOSURE));
    let err = translate(house).unwrap_err();
    assert!(matches!(err, TranslateError::Translation(_)));
    assert!(err.to_string().to_lowercase().contains("exterior finish"));
}

#[test]
fn test_boilers_weighted_by_floor_area() {
    let mut house = v3_house();
    set(
        &mut house,
        HVAC,
        json!({"HVACPlant": {"HeatingSystem": [boiler("boiler1", 1600.0), boiler("boiler2", 800.0)]}}),
    );
    let out = translate(house).expect("translation succeeds");
    let hvac = out["building"]["systems"]["hvac"].as_array().expect("hvac systems");
    assert_eq!(hvac.len(), 2);
    let fractions: Vec<f64> = hvac.iter().map(|s| s["hvac_fraction"].as_f64().unwrap()).collect();
    assert!((fractions[0] - 0.667).abs() < 1e-3);
    assert!((fractions[1] - 0.333).abs() < 1e-3);
    assert!(hvac.iter().all(|s| s["cooling"]["type"] == "none"));
    assert!(hvac.iter().all(|s| s.get("hvac_distribution").is_none()));
}

#[test]
fn test_furnace_efficiency_under_alternate_element() {
    let mut house = v3_house();
    let furnace = house["HPXML"]["Building"]["BuildingDetails"]["Systems"]["HVAC"]["HVACPlant"]["HeatingSystem"]
        .as_object_mut()
        .unwrap();
    let rating = furnace.remove("AnnualHeatingEfficiency").unwrap();
    furnace.insert("AnnualHeatEfficiency".into(), rating);
    let out = translate(house).expect("translation succeeds");
    let heating = &out["building"]["systems"]["hvac"][0]["heating"];
    assert_eq!(heating["efficiency_method"], "user");
    assert_eq!(heating["efficiency"], 0.92);
}

#[test]
fn test_rigid_sheathing_credit() {
    let mut house = v3_house();
    set(
        &mut house,
        &format!("{}/Walls/Wall/Insulation", ENCLOSURE),
        json!({"Layer": [
            {"InstallationType": "cavity", "NominalRValue": 3},
            {"InstallationType": "continuous", "NominalRValue": 5, "InsulationMaterial": {"Rigid": "eps"}}
        ]}),
    );
    let out = translate(house).expect("translation succeeds");
    let walls = out["building"]["zone"]["zone_wall"].as_array().expect("wall zones");
    assert!(walls.iter().all(|w| w["wall_assembly_code"] == "ewps03vi"));
}

#[test]
fn test_duct_location_falls_back_to_general_entry() {
    let mut house = v3_house();
    set(
        &mut house,
        &format!("{}/HVACDistribution/DistributionSystemType/AirDistribution/Ducts/0/DuctLocation", HVAC),
        json!("crawlspace - unconditioned"),
    );

    // no crawlspace on a slab house: the bounds check reports it
    let err = translate(house.clone()).unwrap_err();
    assert!(err.to_string().contains("not exists in zone_roof/floor types"));

    let unchecked = Translator::new(common::tables())
        .with_today(common::today())
        .with_validator(Arc::new(NoValidation));
    let inputs = unchecked.translate(&document(house), &TranslateOptions::new()).unwrap();
    let out = serde_json::to_value(&inputs).unwrap();
    assert_eq!(
        out["building"]["systems"]["hvac"][0]["hvac_distribution"]["duct"][0]["location"],
        "vented_crawl"
    );
}

#[test]
fn test_out_of_bounds_output_is_rejected() {
    let mut house = v3_house();
    set(
        &mut house,
        "/Building/BuildingDetails/BuildingSummary/BuildingConstruction/NumberofBedrooms",
        json!(12),
    );
    let err = translate(house).unwrap_err();
    assert!(matches!(err, TranslateError::InputOutOfBounds { ref name, .. } if name == "number_bedrooms"));
}

#[test]
fn test_unsupported_schema_version() {
    let mut house = v3_house();
    set(&mut house, "/@schemaVersion", json!("4.0"));
    let err = translate(house).unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedSchemaVersion(_)));
    assert!(err.is_translation_error());
}

#[test]
fn test_building_selection() {
    let mut house = v3_house();
    let first = house["HPXML"]["Building"].clone();
    let mut second = first.clone();
    second["BuildingID"]["@id"] = json!("bldg2");
    second["BuildingDetails"]["BuildingSummary"]["BuildingConstruction"]["YearBuilt"] = json!(1990);
    set(&mut house, "/Building", json!([first, second]));

    let translator = translator();
    let doc = document(house);
    let default = translator.translate(&doc, &TranslateOptions::new()).unwrap();
    assert_eq!(default.building.about.year_built, 1975);

    let chosen = translator
        .translate(&doc, &TranslateOptions::new().with_building_id("bldg2"))
        .unwrap();
    assert_eq!(chosen.building.about.year_built, 1990);

    let err = translator
        .translate(&doc, &TranslateOptions::new().with_building_id("nope"))
        .unwrap_err();
    assert!(matches!(err, TranslateError::ElementNotFound { .. }));
}

#[test]
fn test_energy_star_certified_house() {
    let mut house = v3_house();
    house["HPXML"]["Building"]["BuildingDetails"]["GreenBuildingVerifications"] = json!({
        "GreenBuildingVerification": {"Type": "Home Performance with ENERGY STAR"}
    });
    let err = translate(house.clone()).unwrap_err();
    assert!(err.to_string().contains("Contractor/ContractorDetails/BusinessInfo/BusinessName"));

    house["HPXML"]["Project"] = json!({
        "ProjectID": {"@id": "project1"},
        "ProjectDetails": {"StartDate": "2024-04-01", "CompleteDateActual": "2024-05-01"}
    });
    house["HPXML"]["Contractor"] = json!({"ContractorDetails": {
        "SystemIdentifier": {"@id": "contractor1"},
        "BusinessInfo": {"BusinessName": "Efficient Homes", "extension": {"ZipCode": "80301"}}
    }});
    let out = translate(house).expect("translation succeeds");
    assert_eq!(out["hpwes"]["contractor_business_name"], "Efficient Homes");
    assert_eq!(out["hpwes"]["improvement_installation_completion_date"], "2024-05-01");
}
