//! Output validator trait: the hand-off point for translated records
//!
//! Translation ends by passing the finished record to an
//! [`OutputValidator`]. [`BoundsValidator`] implements the numeric range
//! checks of the scoring engine; structural schema validation is left to
//! whoever consumes the serialized output.

use crate::error::{TranslateError, TranslateResult};
use crate::hescore::{
    CoolingType, DuctLocation, EfficiencyMethod, Fuel, GlazingMethod, HeatingType, HescoreInputs, HotWater,
    HotWaterCategory, HotWaterType, HvacSystem,
};
use crate::schema::PresentZones;
use chrono::{Datelike, Local, NaiveDate};

/// Checks a finished record before it is handed out.
pub trait OutputValidator: Send + Sync {
    fn validate(&self, inputs: &HescoreInputs) -> TranslateResult<()>;
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl OutputValidator for NoValidation {
    fn validate(&self, _inputs: &HescoreInputs) -> TranslateResult<()> {
        Ok(())
    }
}

const EARLIEST_ASSESSMENT: (i32, u32, u32) = (2010, 1, 1);
const EARLIEST_EQUIPMENT_YEAR: i32 = 1970;
const EARLIEST_DHW_YEAR: i32 = 1972;

fn check<T>(name: &str, value: T, min: T, max: T) -> TranslateResult<()>
where
    T: PartialOrd + ToString,
{
    // written so that NaN fails
    if !(min <= value && value <= max) {
        return Err(TranslateError::out_of_bounds(name, value));
    }
    Ok(())
}

/// Numeric range checks of the scoring engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsValidator {
    today: Option<NaiveDate>,
}

impl BoundsValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the date that bounds assessment dates and years (defaults to
    /// the local date at validation time).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    fn check_hvac(&self, system: &HvacSystem, zones: &PresentZones, this_year: i32) -> TranslateResult<()> {
        let heating = &system.heating;
        if !matches!(heating.kind, HeatingType::None | HeatingType::Baseboard | HeatingType::WoodStove) {
            match heating.efficiency_method {
                Some(EfficiencyMethod::ShipmentWeighted) => {
                    check("heating_year", heating.year.unwrap_or(0), EARLIEST_EQUIPMENT_YEAR, this_year)?
                }
                Some(_) => {
                    let (min, max) = match heating.kind {
                        HeatingType::CentralFurnace | HeatingType::WallFurnace | HeatingType::Boiler => (0.6, 1.0),
                        HeatingType::HeatPump | HeatingType::MiniSplit => (6.0, 20.0),
                        _ => (2.0, 5.0),
                    };
                    check("heating_efficiency", heating.efficiency.unwrap_or(f64::NAN), min, max)?;
                }
                None => {
                    let electric_furnace = heating.kind == HeatingType::CentralFurnace
                        && heating.fuel_primary == Some(Fuel::Electric);
                    if !electric_furnace {
                        return Err(TranslateError::translation(format!(
                            "Heating system {} {} needs an efficiency value.",
                            heating.fuel_primary.map(|f| f.to_string()).unwrap_or_default(),
                            heating.kind
                        )));
                    }
                }
            }
        }

        let cooling = &system.cooling;
        if !matches!(cooling.kind, CoolingType::None | CoolingType::Dec) {
            match cooling.efficiency_method {
                Some(EfficiencyMethod::ShipmentWeighted) => {
                    check("cooling_year", cooling.year.unwrap_or(0), EARLIEST_EQUIPMENT_YEAR, this_year)?
                }
                _ => check("cooling_efficiency", cooling.efficiency.unwrap_or(f64::NAN), 8.0, 40.0)?,
            }
        }

        if let Some(distribution) = &system.hvac_distribution {
            for duct in &distribution.duct {
                check("hvac_distribution_fraction", duct.fraction, 0.0, 1.0)?;
                let present = match duct.location {
                    DuctLocation::CondSpace | DuctLocation::Outside => true,
                    other => zones.contains(other),
                };
                if !present {
                    return Err(TranslateError::translation(format!(
                        "HVAC distribution: {} location: {} not exists in zone_roof/floor types.",
                        duct.name, duct.location
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_hot_water(&self, dhw: &HotWater, hvac: &[HvacSystem], this_year: i32) -> TranslateResult<()> {
        if dhw.category == HotWaterCategory::Combined {
            if !hvac.iter().any(|s| s.heating.kind == HeatingType::Boiler) {
                let kind = match dhw.kind {
                    HotWaterType::Indirect => "indirect",
                    _ => "tankless_coil",
                };
                return Err(TranslateError::translation(format!(
                    "Cannot have water heater type {} if there is no boiler heating system.",
                    kind
                )));
            }
            return Ok(());
        }
        match dhw.efficiency_method {
            Some(EfficiencyMethod::ShipmentWeighted) => check(
                "domestic_hot_water_year",
                dhw.year.unwrap_or(0),
                EARLIEST_DHW_YEAR,
                this_year,
            ),
            _ => {
                let (min, max) = match dhw.kind {
                    HotWaterType::HeatPump => (1.0, 4.0),
                    _ => (0.45, 1.0),
                };
                check(
                    "domestic_hot_water_energy_factor",
                    dhw.energy_factor.unwrap_or(f64::NAN),
                    min,
                    max,
                )
            }
        }
    }
}

impl OutputValidator for BoundsValidator {
    fn validate(&self, inputs: &HescoreInputs) -> TranslateResult<()> {
        let today = self.today();
        let this_year = today.year();
        let about = &inputs.building.about;
        let (y, m, d) = EARLIEST_ASSESSMENT;
        let earliest = NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);

        check("assessment_date", about.assessment_date, earliest, today)?;
        check("year_built", about.year_built, 1600, i64::from(this_year))?;
        check("number_bedrooms", about.number_bedrooms, 1, 10)?;
        check("num_floor_above_grade", about.num_floor_above_grade, 1, 4)?;
        check("floor_to_ceiling_height", about.floor_to_ceiling_height, 6, 12)?;
        check("conditioned_floor_area", about.conditioned_floor_area, 250, 25000)?;
        if about.blower_door_test {
            check("envelope_leakage", about.envelope_leakage.unwrap_or(-1), 0, 25000)?;
        }

        let zone = &inputs.building.zone;
        for roof in &zone.zone_roof {
            let skylight = &roof.zone_skylight;
            check("skylight_area", skylight.skylight_area, 0.0, 300.0)?;
            if skylight.skylight_area > 0.0 && skylight.skylight_method == Some(GlazingMethod::Custom) {
                check("skylight_u_value", skylight.skylight_u_value.unwrap_or(f64::NAN), 0.01, 5.0)?;
                check("skylight_shgc", skylight.skylight_shgc.unwrap_or(f64::NAN), 0.0, 1.0)?;
            }
        }
        for floor in &zone.zone_floor {
            check("foundation_insulation_level", floor.foundation_insulation_level, 0, 19)?;
        }
        for wall in &zone.zone_wall {
            let window = &wall.zone_window;
            check("window_area", window.window_area, 0.0, 999.0)?;
            if window.window_area > 0.0 && window.window_method == GlazingMethod::Custom {
                check("window_u_value", window.window_u_value.unwrap_or(f64::NAN), 0.01, 5.0)?;
                check("window_shgc", window.window_shgc.unwrap_or(f64::NAN), 0.0, 1.0)?;
            }
        }

        let systems = &inputs.building.systems;
        let zones = PresentZones::from_zone(zone);
        for system in &systems.hvac {
            self.check_hvac(system, &zones, this_year)?;
        }
        self.check_hot_water(&systems.domestic_hot_water, &systems.hvac, this_year)
    }
}
