//! Envelope element records extracted from the input document.

/// One insulation layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsulationLayer {
    /// `InstallationType` is `continuous` (as opposed to cavity).
    pub continuous: bool,
    /// The layer material is rigid board.
    pub rigid: bool,
    pub nominal_r: Option<f64>,
}

impl InsulationLayer {
    pub fn cavity(nominal_r: f64) -> Self {
        Self {
            continuous: false,
            rigid: false,
            nominal_r: Some(nominal_r),
        }
    }

    pub fn rigid_continuous(nominal_r: f64) -> Self {
        Self {
            continuous: true,
            rigid: true,
            nominal_r: Some(nominal_r),
        }
    }
}

/// Where an element's thermal resistance comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RValueSource {
    /// A directly stated assembly-effective R-value.
    Assembly(f64),
    /// Material layers (possibly none).
    Layers(Vec<InsulationLayer>),
}

impl RValueSource {
    /// Sum of nominal R-values, or `None` when some layer lacks one.
    pub fn nominal_sum(&self) -> Option<f64> {
        match self {
            RValueSource::Assembly(_) => None,
            RValueSource::Layers(layers) => layers.iter().map(|l| l.nominal_r).sum(),
        }
    }

    /// A continuous rigid layer with positive nominal R-value is present.
    pub fn has_rigid_continuous(&self) -> bool {
        match self {
            RValueSource::Assembly(_) => false,
            RValueSource::Layers(layers) => layers
                .iter()
                .any(|l| l.continuous && l.rigid && l.nominal_r.unwrap_or(0.0) > 0.0),
        }
    }
}

impl Default for RValueSource {
    fn default() -> Self {
        RValueSource::Layers(Vec::new())
    }
}

/// Orientation information as stated on an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Facing {
    Azimuth(f64),
    /// Compass word (`north`, `southwest`, ...).
    Compass(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WallRecord {
    pub id: String,
    pub area: Option<f64>,
    pub facing: Option<Facing>,
    /// Name of the `WallType` variant (`WoodStud`, `StructuralBrick`, ...).
    pub wall_type: String,
    pub siding: Option<String>,
    pub polystyrene_sheathing: bool,
    pub optimum_value_engineering: bool,
    pub insulation: RValueSource,
}

/// A window or skylight.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlazingRecord {
    pub id: Option<String>,
    pub area: Option<f64>,
    pub facing: Option<Facing>,
    /// `AttachedToWall` / `AttachedToRoof` reference.
    pub attached_to: Option<String>,
    pub u_factor: Option<f64>,
    pub shgc: Option<f64>,
    pub solar_screen: bool,
    /// Name of the `FrameType` variant (`Aluminum`, `Wood`, ...).
    pub frame: Option<String>,
    pub thermal_break: bool,
    pub glass_layers: Option<String>,
    pub glass_type: Option<String>,
    pub gas_fill: Option<String>,
    /// Counts as double pane (including single pane with a storm window).
    pub double_pane: bool,
    /// Single pane with a low-e storm window.
    pub storm_low_e: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoofRecord {
    pub id: String,
    pub area: Option<f64>,
    pub roof_type: Option<String>,
    pub color: Option<String>,
    pub solar_absorptance: Option<f64>,
    pub radiant_barrier: bool,
    pub insulation: RValueSource,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct KneeWallRecord {
    pub id: String,
    pub area: f64,
    pub insulation: RValueSource,
}

/// Attic classification, before output mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AtticKind {
    VentedAttic,
    CathedralCeiling,
    ConditionedAttic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtticRecord {
    pub id: String,
    pub kind: AtticKind,
    pub roofs: Vec<RoofRecord>,
    /// Ceiling area (vented) or roof area (cathedral/conditioned); `None`
    /// falls back to the footprint when this is the only attic.
    pub area: Option<f64>,
    pub floor_insulation: RValueSource,
    pub knee_walls: Vec<KneeWallRecord>,
}

/// Foundation classification from the `FoundationType` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoundationKind {
    Basement { conditioned: bool },
    Crawlspace { vented: bool },
    SlabOnGrade,
    Garage,
    Ambient,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FoundationWallRecord {
    pub id: String,
    pub area: Option<f64>,
    pub length: Option<f64>,
    pub height: Option<f64>,
    pub insulation: RValueSource,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlabRecord {
    pub id: String,
    pub exposed_perimeter: Option<f64>,
    pub perimeter_insulation: RValueSource,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameFloorRecord {
    pub id: String,
    pub area: Option<f64>,
    pub insulation: RValueSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoundationRecord {
    pub id: Option<String>,
    pub kind: FoundationKind,
    /// Larger of the attached slab area and frame floor area (0 if unknown).
    pub area: f64,
    pub walls: Vec<FoundationWallRecord>,
    pub slabs: Vec<SlabRecord>,
    pub frame_floors: Vec<FrameFloorRecord>,
}
