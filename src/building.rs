//! Building-level output sections: address, `about`, domestic hot water,
//! PV generation and Home Performance with ENERGY STAR details.
//!
//! These read the document directly; both schema versions place the
//! elements involved in the same spots.

use crate::document::Node;
use crate::error::{TranslateError, TranslateResult};
use crate::hescore::{
    About, ArrayTilt, AssessmentType, BuildingAddress, EfficiencyMethod, Fuel, Generation, HotWater,
    HotWaterCategory, HotWaterType, Hpwes, Orientation, Shape, SolarElectric, TownHouseWalls,
};
use crate::hvac;
use crate::zone::{compass_azimuth, snap_azimuth};
use chrono::NaiveDate;
use regex_lite::Regex;
use tracing::debug;

/// Oldest year the shipment-weighted water heater defaults cover.
const DHW_MIN_YEAR: i64 = 1972;

/// Collector area of one panel, square feet.
const PANEL_AREA: f64 = 17.6;

const CONSTRUCTION: &str = "BuildingDetails/BuildingSummary/BuildingConstruction";
const SITE: &str = "BuildingDetails/BuildingSummary/Site";

/// Street address and assessment type.
///
/// `root` is the document root, consulted for the transaction type.
pub fn address(root: &Node<'_>, building: &Node<'_>) -> TranslateResult<BuildingAddress> {
    let street = building
        .find_all("Site/Address")
        .into_iter()
        .find(|a| a.text_at("AddressType").as_deref() == Some("street"))
        .ok_or_else(|| building.missing("Site/Address[AddressType=\"street\"]"))?;
    let address = ["Address1", "Address2"]
        .iter()
        .filter_map(|p| street.text_at(p))
        .collect::<Vec<_>>()
        .join(" ");
    if address.trim().is_empty() {
        return Err(street.missing("Address1"));
    }

    let raw_zip = building.require_text("Site/Address/ZipCode")?;
    let zip_code = zip5(&raw_zip)
        .ok_or_else(|| TranslateError::translation(format!("Invalid zip code: {}", raw_zip)))?;

    let assessment_type = if building.exists("ProjectStatus/extension/HEScoreMentorAssessment") {
        AssessmentType::Mentor
    } else {
        match root.text_at("XMLTransactionHeaderInformation/Transaction").as_deref() {
            Some("update") => AssessmentType::Corrected,
            Some("create") | None => event_assessment(&building.require_text("ProjectStatus/EventType")?)?,
            Some(other) => {
                return Err(TranslateError::translation(format!(
                    "Unknown transaction type: {}",
                    other
                )))
            }
        }
    };

    Ok(BuildingAddress {
        address,
        city: building.require_text("Site/Address/CityMunicipality")?,
        state: building.require_text("Site/Address/StateCode")?,
        zip_code,
        assessment_type,
        external_building_id: building
            .text_at("extension/HESExternalID")
            .or_else(|| building.text_at("BuildingID/SendingSystemIdentifierValue")),
    })
}

/// Five-digit zip code, optionally followed by a `-NNNN` extension.
fn zip5(raw: &str) -> Option<String> {
    let pattern = Regex::new(r"^([0-9]{5})(-[0-9]{4})?").ok()?;
    pattern
        .captures(raw.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn event_assessment(event: &str) -> TranslateResult<AssessmentType> {
    Ok(match event {
        "audit" => AssessmentType::Initial,
        "proposed workscope" | "approved workscope" => AssessmentType::Alternative,
        "construction-period testing/daily test out" => AssessmentType::Test,
        "job completion testing/final inspection" => AssessmentType::Final,
        "quality assurance/monitoring" => AssessmentType::Qa,
        "preconstruction" => AssessmentType::Preconstruction,
        other => {
            return Err(TranslateError::translation(format!(
                "HEScore does not have an assessment type for the HPXML event type {}",
                other
            )))
        }
    })
}

/// Snapped azimuth the front of the house faces.
pub fn front_azimuth(building: &Node<'_>) -> TranslateResult<u32> {
    let site = building.find(SITE).ok_or_else(|| building.missing(SITE))?;
    if let Some(azimuth) = site.float_at("AzimuthOfFrontOfHome")? {
        return Ok(snap_azimuth(azimuth));
    }
    site.text_at("OrientationOfFrontOfHome")
        .and_then(|o| compass_azimuth(&o))
        .ok_or_else(|| {
            TranslateError::translation("Either AzimuthOfFrontOfHome or OrientationOfFrontOfHome is required.")
        })
}

fn shape(building: &Node<'_>) -> TranslateResult<(Shape, Option<TownHouseWalls>)> {
    let facility = building
        .text_at(&format!("{}/ResidentialFacilityType", CONSTRUCTION))
        .ok_or_else(|| TranslateError::translation("ResidentialFacilityType is required in the HPXML document"))?;
    let shape = match facility.as_str() {
        "single-family detached" => Shape::Rectangle,
        "single-family attached" | "multi-family - town homes" => Shape::TownHouse,
        other => {
            return Err(TranslateError::translation(format!(
                "Cannot translate HPXML ResidentialFacilityType of {} into HEScore building shape",
                other
            )))
        }
    };
    if shape == Shape::Rectangle {
        return Ok((shape, None));
    }

    let surroundings = building
        .text_at(&format!("{}/Surroundings", SITE))
        .ok_or_else(|| {
            TranslateError::translation("Site/Surroundings element is required in the HPXML document for town houses")
        })?;
    let walls = match surroundings.as_str() {
        "attached on one side" => TownHouseWalls::BackRightFront,
        "attached on two sides" => TownHouseWalls::BackFront,
        other => {
            return Err(TranslateError::translation(format!(
                "Cannot translate HPXML Site/Surroundings element value of {} into HEScore town_house_walls",
                other
            )))
        }
    };
    Ok((shape, Some(walls)))
}

/// Round half away from zero.
fn rounded(value: f64) -> i64 {
    value.round() as i64
}

/// The `about` section.
///
/// `today` stands in for a missing assessment date.
pub fn about(building: &Node<'_>, project: Option<&Node<'_>>, today: NaiveDate) -> TranslateResult<About> {
    let assessment_date = match building.text_at("ProjectStatus/Date") {
        Some(date) => NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
            TranslateError::translation(format!("ProjectStatus/Date is not a date: {}", date))
        })?,
        None => today,
    };
    let (shape, town_house_walls) = shape(building)?;

    let construction = building
        .find(CONSTRUCTION)
        .ok_or_else(|| building.missing(CONSTRUCTION))?;
    let conditioned_floor_area = construction.require_float("ConditionedFloorArea")?;
    let ceiling_height = match construction.float_at("AverageCeilingHeight")? {
        Some(height) => height,
        None => match (
            construction.float_at("ConditionedBuildingVolume")?,
            construction.float_at("ConditionedFloorArea")?,
        ) {
            (Some(volume), Some(area)) if area > 0.0 => volume / area,
            _ => {
                return Err(TranslateError::translation(
                    "Either AverageCeilingHeight or both ConditionedBuildingVolume and ConditionedFloorArea are \
                     required.",
                ))
            }
        },
    };
    let floor_to_ceiling_height = rounded(ceiling_height);
    let conditioned_floor_area = rounded(conditioned_floor_area);

    let front = front_azimuth(building)?;
    let orientation = Orientation::from_snapped_azimuth(front)
        .ok_or_else(|| TranslateError::out_of_bounds("orientation", front))?;

    let (blower_door_test, envelope_leakage, air_sealing_present) =
        match blower_door_leakage(building, floor_to_ceiling_height, conditioned_floor_area)? {
            Some(cfm50) => (true, Some(cfm50), None),
            None => (false, None, Some(air_sealing_present(building))),
        };

    let comments = building
        .text_at("extension/Comments")
        .or_else(|| project.and_then(|p| p.text_at("ProjectDetails/Notes")));

    Ok(About {
        assessment_date,
        shape,
        town_house_walls,
        year_built: construction.require_int("YearBuilt")?,
        number_bedrooms: construction.require_int("NumberofBedrooms")?,
        num_floor_above_grade: construction
            .require_float("NumberofConditionedFloorsAboveGrade")?
            .ceil() as i64,
        floor_to_ceiling_height,
        conditioned_floor_area,
        orientation,
        blower_door_test,
        envelope_leakage,
        air_sealing_present,
        comments,
    })
}

/// Envelope leakage in CFM50 from the last CFM50 blower door test, or an
/// ACH50 test when no CFM50 one exists.
fn blower_door_leakage(building: &Node<'_>, height: i64, area: i64) -> TranslateResult<Option<i64>> {
    let mut chosen: Option<(Node<'_>, String)> = None;
    for measurement in building.find_all("BuildingDetails/Enclosure/AirInfiltration/AirInfiltrationMeasurement") {
        if measurement.text_at("TypeOfInfiltrationMeasurement").as_deref() != Some("blower door") {
            continue;
        }
        if measurement.float_at("HousePressure")? != Some(50.0) {
            continue;
        }
        let units = measurement.text_at("BuildingAirLeakage/UnitofMeasure").unwrap_or_default();
        let take = match units.as_str() {
            "CFM" => true,
            "ACH" => chosen.is_none(),
            _ => false,
        };
        if take {
            chosen = Some((measurement, units));
        }
    }

    let Some((test, units)) = chosen else {
        return Ok(None);
    };
    let leakage = test.require_float("BuildingAirLeakage/AirLeakage")?;
    let cfm50 = match units.as_str() {
        "CFM" => leakage,
        _ => height as f64 * area as f64 * leakage / 60.0,
    };
    debug!(units = %units, cfm50, "blower door test");
    Ok(Some(rounded(cfm50)))
}

fn air_sealing_present(building: &Node<'_>) -> bool {
    if building.exists("BuildingDetails/Enclosure/AirInfiltration/AirSealing") {
        return true;
    }
    building
        .find_all("BuildingDetails/Enclosure/AirInfiltration/AirInfiltrationMeasurement")
        .iter()
        .filter(|m| m.text_at("TypeOfInfiltrationMeasurement").as_deref() == Some("estimate"))
        .last()
        .and_then(|m| m.text_at("LeakinessDescription"))
        .map_or(false, |d| d == "tight" || d == "very tight")
}

/// Whether every item states a value.
fn all_known<T: Copy>(values: &[Option<T>]) -> Option<Vec<T>> {
    values.iter().copied().collect()
}

/// The water heater serving the largest fraction of the load, or the first
/// one when any fraction is missing.
pub fn hot_water(building: &Node<'_>) -> TranslateResult<HotWater> {
    let heaters = building.descendants("WaterHeatingSystem");
    if heaters.is_empty() {
        return Err(TranslateError::translation("No water heating systems found."));
    }
    let fractions = heaters
        .iter()
        .map(|h| h.float_at("FractionDHWLoadServed"))
        .collect::<TranslateResult<Vec<_>>>()?;
    let primary = match all_known(&fractions) {
        Some(fractions) => {
            let mut best = 0;
            for (i, fraction) in fractions.iter().enumerate() {
                if *fraction > fractions[best] {
                    best = i;
                }
            }
            &heaters[best]
        }
        None => &heaters[0],
    };

    let heater_type = primary.require_text("WaterHeaterType")?;
    let stated_fuel = || -> TranslateResult<Fuel> { hvac::fuel(&primary.require_text("FuelType")?) };
    let (category, kind, fuel_primary) = match heater_type.as_str() {
        "storage water heater" | "dedicated boiler with storage tank" => {
            (HotWaterCategory::Unit, HotWaterType::Storage, Some(stated_fuel()?))
        }
        "space-heating boiler with storage tank" => (HotWaterCategory::Combined, HotWaterType::Indirect, None),
        "space-heating boiler with tankless coil" => (HotWaterCategory::Combined, HotWaterType::TanklessCoil, None),
        "heat pump water heater" => (HotWaterCategory::Unit, HotWaterType::HeatPump, Some(Fuel::Electric)),
        "instantaneous water heater" => (HotWaterCategory::Unit, HotWaterType::Tankless, Some(stated_fuel()?)),
        other => {
            return Err(TranslateError::translation(format!(
                "HEScore cannot model the water heater type: {}",
                other
            )))
        }
    };

    let mut dhw = HotWater {
        category,
        kind,
        fuel_primary,
        efficiency_method: None,
        energy_factor: None,
        year: None,
    };
    if category == HotWaterCategory::Combined {
        return Ok(dhw);
    }

    if let Some(uef) = primary.float_at("UniformEnergyFactor")? {
        dhw.efficiency_method = Some(EfficiencyMethod::Uef);
        dhw.energy_factor = Some(uef);
    } else if let Some(ef) = primary.float_at("EnergyFactor")? {
        dhw.efficiency_method = Some(EfficiencyMethod::User);
        dhw.energy_factor = Some(ef);
    } else if kind == HotWaterType::Tankless {
        return Err(TranslateError::translation(
            "Tankless water heater efficiency cannot be estimated by shipment weighted method.",
        ));
    } else {
        let year = match primary.int_at("YearInstalled")? {
            Some(year) => year,
            None => primary.require_int("ModelYear")?,
        };
        dhw.efficiency_method = Some(EfficiencyMethod::ShipmentWeighted);
        dhw.year = Some(year.max(DHW_MIN_YEAR) as i32);
    }
    Ok(dhw)
}

/// Tilt class of an array tilt in degrees.
pub fn tilt_class(tilt: f64) -> ArrayTilt {
    if tilt <= 7.0 {
        ArrayTilt::Flat
    } else if tilt <= 22.0 {
        ArrayTilt::LowSlope
    } else if tilt <= 37.0 {
        ArrayTilt::MediumSlope
    } else {
        ArrayTilt::SteepSlope
    }
}

fn weighted_average(values: &[f64], weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / total
}

/// One PV system as stated in the document.
struct PvArray {
    capacity: Option<f64>,
    collector_area: Option<f64>,
    panels: Option<i64>,
    year: f64,
    azimuth: f64,
    tilt: f64,
}

fn pv_array(system: &Node<'_>) -> TranslateResult<PvArray> {
    let capacity = system.float_at("MaxPowerOutput")?.filter(|v| *v != 0.0);
    let collector_area = system.float_at("CollectorArea")?.filter(|v| *v != 0.0);
    let panels = system.int_at("NumberOfPanels")?.filter(|v| *v != 0);
    if capacity.is_none() && collector_area.is_none() && panels.is_none() {
        return Err(TranslateError::translation(
            "MaxPowerOutput, NumberOfPanels, or CollectorArea is required for every PVSystem.",
        ));
    }

    let mut year = None;
    for path in ["YearInverterManufactured", "YearModulesManufactured"] {
        if let Some(y) = system.int_at(path)? {
            year = Some(year.map_or(y, |prev: i64| prev.max(y)));
        }
    }
    let year = year.ok_or_else(|| {
        TranslateError::translation(
            "Either YearInverterManufactured or YearModulesManufactured is required for every PVSystem.",
        )
    })?;

    let azimuth = match system.float_at("ArrayAzimuth")? {
        Some(azimuth) => azimuth,
        None => system
            .text_at("ArrayOrientation")
            .and_then(|o| compass_azimuth(&o))
            .map(f64::from)
            .ok_or_else(|| {
                TranslateError::translation("ArrayAzimuth or ArrayOrientation is required for every PVSystem.")
            })?,
    };
    let tilt = system
        .float_at("ArrayTilt")?
        .ok_or_else(|| TranslateError::translation("ArrayTilt is required for every PVSystem."))?;

    Ok(PvArray {
        capacity,
        collector_area,
        panels,
        year: year as f64,
        azimuth,
        tilt,
    })
}

/// Solar generation, `None` without PV systems.
///
/// Arrays are weighted by capacity when every array states one, else by
/// panel count, else by collector area.
pub fn generation(building: &Node<'_>) -> TranslateResult<Option<Generation>> {
    let systems = building.descendants("PVSystem");
    if systems.is_empty() {
        return Ok(None);
    }
    let arrays = systems.iter().map(pv_array).collect::<TranslateResult<Vec<_>>>()?;

    let capacities: Vec<Option<f64>> = arrays.iter().map(|a| a.capacity).collect();
    let panels: Vec<Option<i64>> = arrays.iter().map(|a| a.panels).collect();
    let areas: Vec<Option<f64>> = arrays.iter().map(|a| a.collector_area).collect();

    let (capacity_known, system_capacity, num_panels, weights) = if let Some(watts) = all_known(&capacities) {
        let total: f64 = watts.iter().sum();
        (true, Some(total / 1000.0), None, watts)
    } else if let Some(counts) = all_known(&panels) {
        let weights: Vec<f64> = counts.iter().map(|c| *c as f64).collect();
        (false, None, Some(counts.iter().sum::<i64>()), weights)
    } else if let Some(areas) = all_known(&areas) {
        let total: f64 = areas.iter().sum();
        (false, None, Some((total / PANEL_AREA).round() as i64), areas)
    } else {
        return Err(TranslateError::translation(
            "Either a MaxPowerOutput or NumberOfPanels or CollectorArea must be specified for every PVSystem.",
        ));
    };

    let years: Vec<f64> = arrays.iter().map(|a| a.year).collect();
    let azimuths: Vec<f64> = arrays.iter().map(|a| a.azimuth).collect();
    let tilts: Vec<f64> = arrays.iter().map(|a| a.tilt).collect();

    let azimuth = snap_azimuth(weighted_average(&azimuths, &weights));
    let array_azimuth = Orientation::from_snapped_azimuth(azimuth)
        .ok_or_else(|| TranslateError::out_of_bounds("array_azimuth", azimuth))?;
    debug!(arrays = arrays.len(), capacity_known, "resolved pv generation");

    Ok(Some(Generation {
        solar_electric: SolarElectric {
            capacity_known,
            system_capacity,
            num_panels,
            year: weighted_average(&years, &weights).round() as i32,
            array_azimuth,
            array_tilt: tilt_class(weighted_average(&tilts, &weights)),
        },
    }))
}

/// Project and contractor details of a certified project. Every field is
/// required.
pub fn hpwes(project: Option<&Node<'_>>, contractor: Option<&Node<'_>>) -> TranslateResult<Hpwes> {
    let project_text = |path: &str| project.and_then(|p| p.text_at(path));
    let contractor_text = |path: &str| contractor.and_then(|c| c.text_at(path));

    let fields = [
        ("Project/ProjectDetails/StartDate", project_text("ProjectDetails/StartDate")),
        (
            "Project/ProjectDetails/CompleteDateActual",
            project_text("ProjectDetails/CompleteDateActual"),
        ),
        (
            "Contractor/ContractorDetails/BusinessInfo/BusinessName",
            contractor_text("ContractorDetails/BusinessInfo/BusinessName"),
        ),
        (
            "Contractor/ContractorDetails/BusinessInfo/extension/ZipCode",
            contractor_text("ContractorDetails/BusinessInfo/extension/ZipCode"),
        ),
    ];
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(path, _)| *path)
        .collect();
    if !missing.is_empty() {
        return Err(TranslateError::translation(format!(
            "The following elements are required for Home Performance with Energy Star, but were not provided: {}",
            missing.join(", ")
        )));
    }

    let [start, completion, name, zip] = fields.map(|(_, value)| value.unwrap_or_default());
    Ok(Hpwes {
        improvement_installation_start_date: start,
        improvement_installation_completion_date: completion,
        contractor_business_name: name,
        contractor_zip_code: zip,
    })
}
