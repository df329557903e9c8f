//! Heating and cooling equipment typing.

use crate::error::{TranslateError, TranslateResult};
use crate::hescore::{Cooling, CoolingType, EfficiencyMethod, Fuel, Heating, HeatingType};
use crate::model::{EfficiencyRating, PlantRecord};

/// Fuel for a fuel description.
pub fn fuel(description: &str) -> TranslateResult<Fuel> {
    Ok(match description {
        "electricity" | "renewable electricity" => Fuel::Electric,
        "natural gas" | "renewable natural gas" => Fuel::NaturalGas,
        "fuel oil" | "fuel oil 1" | "fuel oil 2" | "fuel oil 4" | "fuel oil 5/6" => Fuel::FuelOil,
        "propane" => Fuel::Lpg,
        "wood" => Fuel::CordWood,
        "wood pellets" => Fuel::PelletWood,
        other => {
            return Err(TranslateError::translation(format!(
                "HEScore does not support the HPXML fuel type {}",
                other
            )))
        }
    })
}

/// Heat pump family for a `HeatPumpType`; a missing type is air source.
fn heat_pump_kind(heat_pump_type: Option<&str>) -> TranslateResult<HeatingType> {
    Ok(match heat_pump_type {
        None | Some("air-to-air" | "air-to-water") => HeatingType::HeatPump,
        Some("water-to-air" | "water-to-water" | "ground-to-air" | "ground-to-water") => HeatingType::Gchp,
        Some("mini-split") => HeatingType::MiniSplit,
        Some(other) => {
            return Err(TranslateError::translation(format!(
                "HEScore does not support the HPXML HeatPumpType {}",
                other
            )))
        }
    })
}

fn allowed_fuels(kind: HeatingType) -> &'static [Fuel] {
    match kind {
        HeatingType::HeatPump | HeatingType::MiniSplit | HeatingType::Gchp | HeatingType::Baseboard => {
            &[Fuel::Electric]
        }
        HeatingType::CentralFurnace => &[Fuel::NaturalGas, Fuel::Lpg, Fuel::FuelOil, Fuel::Electric],
        HeatingType::WallFurnace => &[Fuel::NaturalGas, Fuel::Lpg],
        HeatingType::Boiler => &[Fuel::NaturalGas, Fuel::Lpg, Fuel::FuelOil],
        HeatingType::WoodStove => &[Fuel::CordWood, Fuel::PelletWood],
        HeatingType::None => &[],
    }
}

/// Efficiency units reported for a heating type, `None` when the type
/// carries no efficiency.
fn heating_units(kind: HeatingType, fuel: Fuel) -> Option<&'static str> {
    match kind {
        HeatingType::CentralFurnace | HeatingType::Baseboard if fuel == Fuel::Electric => None,
        HeatingType::WoodStove | HeatingType::None => None,
        HeatingType::HeatPump | HeatingType::MiniSplit => Some("HSPF"),
        HeatingType::CentralFurnace | HeatingType::WallFurnace | HeatingType::Boiler => Some("AFUE"),
        HeatingType::Gchp => Some("COP"),
        HeatingType::Baseboard => None,
    }
}

fn cooling_units(kind: CoolingType) -> Option<&'static str> {
    match kind {
        CoolingType::SplitDx | CoolingType::HeatPump | CoolingType::MiniSplit => Some("SEER"),
        CoolingType::PackagedDx | CoolingType::Gchp => Some("EER"),
        CoolingType::Dec | CoolingType::None => None,
    }
}

fn first_rating(ratings: &[EfficiencyRating], units: &str) -> Option<f64> {
    ratings.iter().find(|r| r.units == units).map(|r| r.value)
}

/// Stated efficiency, or the installation year for a shipment-weighted
/// default.
fn efficiency_or_year(
    plant: &PlantRecord,
    units: &str,
    role: &str,
    kind: &str,
) -> TranslateResult<(EfficiencyMethod, Option<f64>, Option<i32>)> {
    if let Some(value) = first_rating(&plant.efficiencies, units) {
        return Ok((EfficiencyMethod::User, Some(value), None));
    }
    match plant.year {
        Some(year) => Ok((EfficiencyMethod::ShipmentWeighted, None, Some(year))),
        None => Err(TranslateError::translation(format!(
            "{} efficiency could not be determined. {} must have a {} efficiency with units of {} \
             or YearInstalled or ModelYear.",
            role,
            kind,
            role.to_lowercase(),
            units
        ))),
    }
}

/// Scored heating description of a heating plant record.
pub fn heating(plant: &PlantRecord) -> TranslateResult<Heating> {
    let (kind, fuel_primary) = if plant.heat_pump {
        (heat_pump_kind(plant.system_type.as_deref())?, Fuel::Electric)
    } else {
        let variant = plant
            .system_type
            .as_deref()
            .ok_or_else(|| TranslateError::not_found("HeatingSystemType/*"))?;
        let kind = match variant {
            "Furnace" => HeatingType::CentralFurnace,
            "WallFurnace" | "FloorFurnace" => HeatingType::WallFurnace,
            "Boiler" => HeatingType::Boiler,
            "ElectricResistance" => HeatingType::Baseboard,
            "Stove" => HeatingType::WoodStove,
            other => {
                return Err(TranslateError::translation(format!(
                    "HEScore does not support the HPXML HeatingSystemType {}",
                    other
                )))
            }
        };
        let description = plant
            .fuel
            .as_deref()
            .ok_or_else(|| TranslateError::not_found("HeatingSystemFuel"))?;
        (kind, fuel(description)?)
    };

    if !allowed_fuels(kind).contains(&fuel_primary) {
        return Err(TranslateError::translation(format!(
            "Heating system {} cannot be used with fuel {}",
            kind, fuel_primary
        )));
    }

    let mut heating = Heating {
        kind,
        fuel_primary: Some(fuel_primary),
        efficiency_method: None,
        efficiency: None,
        year: None,
    };
    if let Some(units) = heating_units(kind, fuel_primary) {
        let (method, efficiency, year) = efficiency_or_year(plant, units, "Heating", kind.as_str())?;
        heating.efficiency_method = Some(method);
        heating.efficiency = efficiency;
        heating.year = year;
    }
    Ok(heating)
}

/// Scored cooling description of a cooling plant record.
pub fn cooling(plant: &PlantRecord) -> TranslateResult<Cooling> {
    let kind = if plant.heat_pump {
        match heat_pump_kind(plant.system_type.as_deref())? {
            HeatingType::Gchp => CoolingType::Gchp,
            HeatingType::MiniSplit => CoolingType::MiniSplit,
            _ => CoolingType::HeatPump,
        }
    } else {
        match plant.system_type.as_deref() {
            Some("central air conditioning" | "central air conditioner") => CoolingType::SplitDx,
            Some("room air conditioner") => CoolingType::PackagedDx,
            Some("mini-split") => CoolingType::MiniSplit,
            Some("evaporative cooler") => CoolingType::Dec,
            Some(other) => {
                return Err(TranslateError::translation(format!(
                    "HEScore does not support the HPXML CoolingSystemType {}",
                    other
                )))
            }
            None => return Err(TranslateError::not_found("CoolingSystemType")),
        }
    };

    let mut cooling = Cooling {
        kind,
        efficiency_method: None,
        efficiency: None,
        year: None,
    };
    if let Some(units) = cooling_units(kind) {
        let (method, efficiency, year) = efficiency_or_year(plant, units, "Cooling", kind.as_str())?;
        cooling.efficiency_method = Some(method);
        cooling.efficiency = efficiency;
        cooling.year = year;
    }
    Ok(cooling)
}
