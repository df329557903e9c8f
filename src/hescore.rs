//! Home Energy Score input record.
//!
//! Field order follows the scoring API; optional fields are omitted from
//! the serialized output when absent.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HescoreInputs {
    pub building_address: BuildingAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hpwes: Option<Hpwes>,
    pub building: Building,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub assessment_type: AssessmentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_building_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    Initial,
    Final,
    Qa,
    Alternative,
    Test,
    Corrected,
    Mentor,
    Preconstruction,
}

/// Home Performance with ENERGY STAR project details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hpwes {
    pub improvement_installation_start_date: String,
    pub improvement_installation_completion_date: String,
    pub contractor_business_name: String,
    pub contractor_zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Building {
    pub about: About,
    pub zone: Zone,
    pub systems: Systems,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct About {
    pub assessment_date: NaiveDate,
    pub shape: Shape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town_house_walls: Option<TownHouseWalls>,
    pub year_built: i64,
    pub number_bedrooms: i64,
    pub num_floor_above_grade: i64,
    pub floor_to_ceiling_height: i64,
    pub conditioned_floor_area: i64,
    pub orientation: Orientation,
    pub blower_door_test: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope_leakage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_sealing_present: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Rectangle,
    TownHouse,
}

/// Exposed (unshared) walls of a town house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TownHouseWalls {
    BackRightFront,
    BackFrontLeft,
    BackFront,
}

impl TownHouseWalls {
    pub fn exposed(&self) -> &'static [Side] {
        match self {
            TownHouseWalls::BackRightFront => &[Side::Back, Side::Right, Side::Front],
            TownHouseWalls::BackFrontLeft => &[Side::Back, Side::Front, Side::Left],
            TownHouseWalls::BackFront => &[Side::Back, Side::Front],
        }
    }

    pub fn shared(&self) -> Vec<Side> {
        Side::ALL
            .into_iter()
            .filter(|s| !self.exposed().contains(s))
            .collect()
    }
}

/// Eight-point compass orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Orientation {
    /// Orientation of an azimuth already snapped to a multiple of 45.
    pub fn from_snapped_azimuth(azimuth: u32) -> Option<Self> {
        Some(match azimuth {
            0 => Orientation::North,
            45 => Orientation::NorthEast,
            90 => Orientation::East,
            135 => Orientation::SouthEast,
            180 => Orientation::South,
            225 => Orientation::SouthWest,
            270 => Orientation::West,
            315 => Orientation::NorthWest,
            _ => return None,
        })
    }
}

/// Canonical side of the house, relative to its front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Front,
    Back,
    Right,
    Left,
}

impl Side {
    /// Output order of wall zones.
    pub const ALL: [Side; 4] = [Side::Front, Side::Right, Side::Back, Side::Left];

    /// Clockwise offset from the front azimuth.
    pub fn offset(&self) -> u32 {
        match self {
            Side::Front => 0,
            Side::Right => 90,
            Side::Back => 180,
            Side::Left => 270,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Front => "front",
            Side::Back => "back",
            Side::Right => "right",
            Side::Left => "left",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    pub zone_roof: Vec<RoofZone>,
    pub zone_floor: Vec<FloorZone>,
    pub wall_construction_same: bool,
    pub window_construction_same: bool,
    pub zone_wall: Vec<WallZone>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoofType {
    VentedAttic,
    CathCeiling,
    CondAttic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoofColor {
    White,
    Light,
    Medium,
    MediumDark,
    Dark,
    CoolColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoofZone {
    pub roof_name: String,
    pub roof_assembly_code: String,
    pub roof_color: RoofColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roof_absorptance: Option<f64>,
    pub roof_type: RoofType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ceiling_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ceiling_assembly_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roof_area: Option<f64>,
    pub zone_skylight: SkylightZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GlazingMethod {
    Code,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SkylightZone {
    pub skylight_area: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skylight_method: Option<GlazingMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skylight_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skylight_u_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skylight_shgc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solar_screen: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FoundationType {
    UncondBasement,
    CondBasement,
    VentedCrawl,
    UnventedCrawl,
    SlabOnGrade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorZone {
    pub floor_name: String,
    pub floor_area: f64,
    pub foundation_type: FoundationType,
    pub foundation_insulation_level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_assembly_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallZone {
    pub side: Side,
    pub wall_assembly_code: String,
    pub zone_window: WindowZone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowZone {
    pub window_area: f64,
    pub window_method: GlazingMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_u_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_shgc: Option<f64>,
    pub solar_screen: bool,
}

impl WindowZone {
    /// A side with no windows.
    pub fn empty() -> Self {
        Self {
            window_area: 0.0,
            window_method: GlazingMethod::Code,
            window_code: Some("scna".to_string()),
            window_u_value: None,
            window_shgc: None,
            solar_screen: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Systems {
    pub hvac: Vec<HvacSystem>,
    pub domestic_hot_water: HotWater,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<Generation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HvacSystem {
    pub hvac_name: String,
    pub hvac_fraction: f64,
    pub heating: Heating,
    pub cooling: Cooling,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hvac_distribution: Option<HvacDistribution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingType {
    HeatPump,
    CentralFurnace,
    WallFurnace,
    Baseboard,
    Boiler,
    Gchp,
    MiniSplit,
    WoodStove,
    None,
}

impl HeatingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeatingType::HeatPump => "heat_pump",
            HeatingType::CentralFurnace => "central_furnace",
            HeatingType::WallFurnace => "wall_furnace",
            HeatingType::Baseboard => "baseboard",
            HeatingType::Boiler => "boiler",
            HeatingType::Gchp => "gchp",
            HeatingType::MiniSplit => "mini_split",
            HeatingType::WoodStove => "wood_stove",
            HeatingType::None => "none",
        }
    }

    pub fn is_heat_pump_family(&self) -> bool {
        matches!(self, HeatingType::HeatPump | HeatingType::Gchp | HeatingType::MiniSplit)
    }

    pub fn requires_ducts(&self) -> bool {
        matches!(
            self,
            HeatingType::Gchp | HeatingType::HeatPump | HeatingType::CentralFurnace
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoolingType {
    SplitDx,
    PackagedDx,
    HeatPump,
    Gchp,
    Dec,
    MiniSplit,
    None,
}

impl CoolingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoolingType::SplitDx => "split_dx",
            CoolingType::PackagedDx => "packaged_dx",
            CoolingType::HeatPump => "heat_pump",
            CoolingType::Gchp => "gchp",
            CoolingType::Dec => "dec",
            CoolingType::MiniSplit => "mini_split",
            CoolingType::None => "none",
        }
    }

    pub fn is_heat_pump_family(&self) -> bool {
        matches!(self, CoolingType::HeatPump | CoolingType::Gchp | CoolingType::MiniSplit)
    }

    pub fn requires_ducts(&self) -> bool {
        matches!(self, CoolingType::SplitDx | CoolingType::HeatPump | CoolingType::Gchp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fuel {
    NaturalGas,
    Lpg,
    FuelOil,
    Electric,
    CordWood,
    PelletWood,
}

impl fmt::Display for HeatingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CoolingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Fuel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fuel::NaturalGas => "natural_gas",
            Fuel::Lpg => "lpg",
            Fuel::FuelOil => "fuel_oil",
            Fuel::Electric => "electric",
            Fuel::CordWood => "cord_wood",
            Fuel::PelletWood => "pellet_wood",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyMethod {
    User,
    ShipmentWeighted,
    Uef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heating {
    #[serde(rename = "type")]
    pub kind: HeatingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_primary: Option<Fuel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_method: Option<EfficiencyMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl Heating {
    pub fn none() -> Self {
        Self {
            kind: HeatingType::None,
            fuel_primary: None,
            efficiency_method: None,
            efficiency: None,
            year: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cooling {
    #[serde(rename = "type")]
    pub kind: CoolingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_method: Option<EfficiencyMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl Cooling {
    pub fn none() -> Self {
        Self {
            kind: CoolingType::None,
            efficiency_method: None,
            efficiency: None,
            year: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakageMethod {
    Qualitative,
    Quantitative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuctLocation {
    CondSpace,
    UncondBasement,
    VentedCrawl,
    UnventedCrawl,
    UncondAttic,
    Outside,
}

impl fmt::Display for DuctLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DuctLocation::CondSpace => "cond_space",
            DuctLocation::UncondBasement => "uncond_basement",
            DuctLocation::VentedCrawl => "vented_crawl",
            DuctLocation::UnventedCrawl => "unvented_crawl",
            DuctLocation::UncondAttic => "uncond_attic",
            DuctLocation::Outside => "outside",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HvacDistribution {
    pub leakage_method: LeakageMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leakage_to_outside: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sealed: Option<bool>,
    pub duct: Vec<Duct>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Duct {
    pub name: String,
    pub location: DuctLocation,
    pub fraction: f64,
    pub insulated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HotWaterCategory {
    Unit,
    Combined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HotWaterType {
    Storage,
    Indirect,
    TanklessCoil,
    HeatPump,
    Tankless,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotWater {
    pub category: HotWaterCategory,
    #[serde(rename = "type")]
    pub kind: HotWaterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_primary: Option<Fuel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_method: Option<EfficiencyMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub solar_electric: SolarElectric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayTilt {
    Flat,
    LowSlope,
    MediumSlope,
    SteepSlope,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarElectric {
    pub capacity_known: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_capacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_panels: Option<i64>,
    pub year: i32,
    pub array_azimuth: Orientation,
    pub array_tilt: ArrayTilt,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enums_serialize_snake_case() {
        assert_eq!(serde_json::to_value(Orientation::NorthWest).unwrap(), json!("north_west"));
        assert_eq!(serde_json::to_value(RoofColor::MediumDark).unwrap(), json!("medium_dark"));
        assert_eq!(serde_json::to_value(TownHouseWalls::BackRightFront).unwrap(), json!("back_right_front"));
        assert_eq!(serde_json::to_value(HeatingType::None).unwrap(), json!("none"));
    }

    #[test]
    fn heating_type_key_is_renamed_and_empty_fields_skipped() {
        let value = serde_json::to_value(Heating::none()).unwrap();
        assert_eq!(value, json!({"type": "none"}));
    }

    #[test]
    fn town_house_shared_sides() {
        assert_eq!(TownHouseWalls::BackRightFront.shared(), vec![Side::Left]);
        assert_eq!(TownHouseWalls::BackFront.shared(), vec![Side::Right, Side::Left]);
    }

    #[test]
    fn assessment_date_serializes_as_iso_date() {
        let date = NaiveDate::from_ymd_opt(2023, 5, 17).unwrap();
        assert_eq!(serde_json::to_value(date).unwrap(), json!("2023-05-17"));
    }
}
