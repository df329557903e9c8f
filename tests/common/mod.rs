//! Common test utilities: whole-document fixtures and lookup tables.
//!
//! `v3_house()` and `v2_house()` describe the same one-story slab house
//! (1500 sq ft, vented attic, gas furnace and central air on one duct
//! system, gas storage water heater). Tests start from one and edit it
//! through JSON pointers with [`set`] and [`remove`].
#![allow(dead_code)]

use chrono::NaiveDate;
use hescore_hpxml::{AssemblyTables, BoundsValidator, Document, Translator};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
}

/// Lookup tables as a JSON bundle.
pub fn tables_bundle() -> Value {
    json!({
        "wall": {
            "ewwf00vi": 4.1, "ewwf03vi": 6.9, "ewwf11vi": 11.8, "ewwf13vi": 13.2,
            "ewwf13wo": 13.6, "ewwf19vi": 17.9, "ewps03vi": 10.4, "ewps13vi": 17.3
        },
        "roof": {"rfwf00co": 2.8, "rfwf19co": 21.3, "rfwf30co": 31.6},
        "ceiling": {"ecwf00": 2.2, "ecwf19": 19.6, "ecwf30": 30.9, "ecwf38": 39.3},
        "floor": {"efwf00ca": 4.0, "efwf19ca": 18.9},
        "knee_wall": {"kwwf00": 2.0, "kwwf11": 9.5}
    })
}

pub fn tables() -> AssemblyTables {
    AssemblyTables::from_bundle(&tables_bundle()).expect("fixture tables")
}

/// A translator with the fixture tables and a pinned date.
pub fn translator() -> Translator {
    Translator::new(tables())
        .with_today(today())
        .with_validator(Arc::new(BoundsValidator::new().with_today(today())))
}

fn header_and_address() -> (Value, Value) {
    let header = json!({"Transaction": "create"});
    let site = json!({"Address": {
        "AddressType": "street",
        "Address1": "123 Main St",
        "CityMunicipality": "Boulder",
        "StateCode": "CO",
        "ZipCode": "80302"
    }});
    (header, site)
}

fn summary() -> Value {
    json!({
        "Site": {"AzimuthOfFrontOfHome": 0},
        "BuildingConstruction": {
            "YearBuilt": 1975,
            "ResidentialFacilityType": "single-family detached",
            "NumberofConditionedFloorsAboveGrade": 1,
            "NumberofBedrooms": 3,
            "AverageCeilingHeight": 8,
            "ConditionedFloorArea": 1500
        }
    })
}

fn water_heating() -> Value {
    json!({"WaterHeatingSystem": {
        "SystemIdentifier": {"@id": "dhw1"},
        "FuelType": "natural gas",
        "WaterHeaterType": "storage water heater",
        "FractionDHWLoadServed": 1.0,
        "EnergyFactor": 0.62
    }})
}

fn plant() -> Value {
    json!({
        "HeatingSystem": {
            "SystemIdentifier": {"@id": "furnace1"},
            "DistributionSystem": {"@idref": "ducts1"},
            "HeatingSystemType": {"Furnace": null},
            "HeatingSystemFuel": "natural gas",
            "AnnualHeatingEfficiency": {"Units": "AFUE", "Value": 0.92},
            "FractionHeatLoadServed": 1.0
        },
        "CoolingSystem": {
            "SystemIdentifier": {"@id": "ac1"},
            "DistributionSystem": {"@idref": "ducts1"},
            "CoolingSystemType": "central air conditioner",
            "AnnualCoolingEfficiency": {"Units": "SEER", "Value": 13},
            "FractionCoolLoadServed": 1.0
        }
    })
}

fn ducts(attic: &str, living: &str) -> Value {
    json!({
        "SystemIdentifier": {"@id": "ducts1"},
        "DistributionSystemType": {"AirDistribution": {
            "DuctLeakageMeasurement": {"LeakinessObservedVisualInspection": "connections sealed w mastic"},
            "Ducts": [
                {"DuctLocation": attic, "FractionDuctArea": 0.8, "DuctInsulationRValue": 6},
                {"DuctLocation": living, "FractionDuctArea": 0.2}
            ]
        }}
    })
}

/// 3.x document for the fixture house.
pub fn v3_house() -> Value {
    let (header, site) = header_and_address();
    json!({"HPXML": {
        "@schemaVersion": "3.0",
        "XMLTransactionHeaderInformation": header,
        "Building": {
            "BuildingID": {"@id": "bldg1"},
            "Site": site,
            "ProjectStatus": {"EventType": "audit", "Date": "2024-05-20"},
            "BuildingDetails": {
                "BuildingSummary": summary(),
                "Enclosure": {
                    "AirInfiltration": {"AirInfiltrationMeasurement": {
                        "TypeOfInfiltrationMeasurement": "blower door",
                        "HousePressure": 50,
                        "BuildingAirLeakage": {"UnitofMeasure": "CFM", "AirLeakage": 2400}
                    }},
                    "Attics": {"Attic": {
                        "SystemIdentifier": {"@id": "attic1"},
                        "AtticType": {"Attic": {"Vented": true}},
                        "AttachedToRoof": {"@idref": "roof1"},
                        "AttachedToFrameFloor": {"@idref": "ceiling1"}
                    }},
                    "Roofs": {"Roof": {
                        "SystemIdentifier": {"@id": "roof1"},
                        "Area": 1650,
                        "RoofType": "asphalt or fiberglass shingles",
                        "RoofColor": "medium",
                        "Insulation": {"Layer": {"InstallationType": "cavity", "NominalRValue": 0}}
                    }},
                    "Walls": {"Wall": {
                        "SystemIdentifier": {"@id": "wall1"},
                        "ExteriorAdjacentTo": "outside",
                        "WallType": {"WoodStud": null},
                        "Siding": "vinyl siding",
                        "Insulation": {"Layer": {"InstallationType": "cavity", "NominalRValue": 13}}
                    }},
                    "FrameFloors": {"FrameFloor": {
                        "SystemIdentifier": {"@id": "ceiling1"},
                        "Area": 1500,
                        "Insulation": {"Layer": {"InstallationType": "cavity", "NominalRValue": 30}}
                    }},
                    "Foundations": {"Foundation": {
                        "SystemIdentifier": {"@id": "slabfnd"},
                        "FoundationType": {"SlabOnGrade": null},
                        "AttachedToSlab": {"@idref": "slab1"}
                    }},
                    "Slabs": {"Slab": {
                        "SystemIdentifier": {"@id": "slab1"},
                        "Area": 1500,
                        "ExposedPerimeter": 160,
                        "PerimeterInsulation": {"Layer": {"NominalRValue": 0}}
                    }},
                    "Windows": {"Window": [
                        {"SystemIdentifier": {"@id": "win1"}, "Area": 60, "Orientation": "north",
                         "UFactor": 0.35, "SHGC": 0.4},
                        {"SystemIdentifier": {"@id": "win2"}, "Area": 40, "Orientation": "south",
                         "UFactor": 0.35, "SHGC": 0.4}
                    ]}
                },
                "Systems": {
                    "HVAC": {
                        "HVACPlant": plant(),
                        "HVACDistribution": ducts("attic - vented", "living space")
                    },
                    "WaterHeating": water_heating()
                }
            }
        }
    }})
}

/// 2.x document for the same house.
pub fn v2_house() -> Value {
    let (header, site) = header_and_address();
    json!({"HPXML": {
        "@schemaVersion": "2.3",
        "XMLTransactionHeaderInformation": header,
        "Building": {
            "BuildingID": {"@id": "bldg1"},
            "Site": site,
            "ProjectStatus": {"EventType": "audit", "Date": "2024-05-20"},
            "BuildingDetails": {
                "BuildingSummary": summary(),
                "Enclosure": {
                    "AirInfiltration": {"AirInfiltrationMeasurement": {
                        "TypeOfInfiltrationMeasurement": "blower door",
                        "HousePressure": 50,
                        "BuildingAirLeakage": {"UnitofMeasure": "CFM", "AirLeakage": 2400}
                    }},
                    "AtticAndRoof": {
                        "Roofs": {"Roof": {
                            "SystemIdentifier": {"@id": "roof1"},
                            "RoofArea": 1650,
                            "RoofType": "asphalt or fiberglass shingles",
                            "RoofColor": "medium"
                        }},
                        "Attics": {"Attic": {
                            "SystemIdentifier": {"@id": "attic1"},
                            "AtticType": "vented attic",
                            "Area": 1500,
                            "AtticFloorInsulation": {"Layer": {"InstallationType": "cavity", "NominalRValue": 30}},
                            "AtticRoofInsulation": {"Layer": {"InstallationType": "cavity", "NominalRValue": 0}}
                        }}
                    },
                    "Walls": {"Wall": {
                        "SystemIdentifier": {"@id": "wall1"},
                        "ExteriorAdjacentTo": "ambient",
                        "WallType": {"WoodStud": null},
                        "Siding": "vinyl siding",
                        "Insulation": {"Layer": {"InstallationType": "cavity", "NominalRValue": 13}}
                    }},
                    "Foundations": {"Foundation": {
                        "SystemIdentifier": {"@id": "slabfnd"},
                        "FoundationType": {"SlabOnGrade": null},
                        "Slab": {
                            "SystemIdentifier": {"@id": "slab1"},
                            "Area": 1500,
                            "ExposedPerimeter": 160,
                            "PerimeterInsulation": {"Layer": {"NominalRValue": 0}}
                        }
                    }},
                    "Windows": {"Window": [
                        {"SystemIdentifier": {"@id": "win1"}, "Area": 60, "Orientation": "north",
                         "UFactor": 0.35, "SHGC": 0.4},
                        {"SystemIdentifier": {"@id": "win2"}, "Area": 40, "Orientation": "south",
                         "UFactor": 0.35, "SHGC": 0.4}
                    ]}
                },
                "Systems": {
                    "HVAC": {
                        "HVACPlant": plant(),
                        "HVACDistribution": ducts("unconditioned attic", "conditioned space")
                    },
                    "WaterHeating": water_heating()
                }
            }
        }
    }})
}

/// Replace the value at a JSON pointer below the `HPXML` element.
pub fn set(document: &mut Value, pointer: &str, value: Value) {
    let target = document
        .pointer_mut(&format!("/HPXML{}", pointer))
        .unwrap_or_else(|| panic!("no element at {}", pointer));
    *target = value;
}

/// Remove the member at a JSON pointer below the `HPXML` element.
pub fn remove(document: &mut Value, pointer: &str) {
    let (parent, key) = pointer.rsplit_once('/').expect("pointer has a parent");
    document
        .pointer_mut(&format!("/HPXML{}", parent))
        .and_then(Value::as_object_mut)
        .unwrap_or_else(|| panic!("no element at {}", parent))
        .remove(key);
}

pub fn document(value: Value) -> Document {
    Document::from_value(value)
}
