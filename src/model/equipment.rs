//! HVAC and distribution records extracted from the input document.

/// Which load a plant record serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Heating,
    Cooling,
}

/// A stated annual efficiency.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyRating {
    pub units: String,
    pub value: f64,
}

/// A heating system, cooling system, or one role of a heat pump.
///
/// A heat pump yields one record per role, sharing the same `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantRecord {
    pub id: String,
    pub role: Role,
    pub heat_pump: bool,
    /// `HeatPumpType` text, the `HeatingSystemType` variant name, or
    /// `CoolingSystemType` text.
    pub system_type: Option<String>,
    /// Heating fuel (non heat pump heating only).
    pub fuel: Option<String>,
    pub efficiencies: Vec<EfficiencyRating>,
    pub year: Option<i32>,
    pub capacity: Option<f64>,
    /// Heat pump heating capacity at 17F.
    pub capacity_17f: Option<f64>,
    pub fraction_load: Option<f64>,
    pub floor_area: Option<f64>,
    /// `DistributionSystem` references (more than one is an input error).
    pub distribution: Vec<String>,
}

impl PlantRecord {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            heat_pump: false,
            system_type: None,
            fuel: None,
            efficiencies: Vec::new(),
            year: None,
            capacity: None,
            capacity_17f: None,
            fraction_load: None,
            floor_area: None,
            distribution: Vec::new(),
        }
    }

    /// Serves none of the load: a zero fraction or a zero capacity.
    pub fn serves_no_load(&self) -> bool {
        [self.fraction_load, self.capacity, self.capacity_17f]
            .iter()
            .any(|v| *v == Some(0.0))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DuctRecord {
    pub location: Option<String>,
    pub fraction: f64,
    pub insulated: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DistributionRecord {
    pub id: String,
    /// Air distribution (the only ducted kind).
    pub ducted: bool,
    /// Mastic-sealed connections observed, or a sealing improvement.
    pub sealed: bool,
    /// Total leakage to outside in CFM25, when measured.
    pub leakage_to_outside: Option<f64>,
    pub ducts: Vec<DuctRecord>,
}
