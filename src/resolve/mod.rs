//! Assembly code resolution.
//!
//! Given either a directly stated assembly-effective R-value or a set of
//! insulation layers, find the nearest construction code in the lookup
//! table and its catalog R-value.
//!
//! - Direct R-values match the table entry with the smallest absolute
//!   difference among entries whose subtype/finish tokens pass the filter.
//! - Layers are summed (every layer must have a nominal R-value), credited
//!   for rigid sheathing where the construction has it, snapped to the
//!   construction's ladder of accepted values, and composed into a code.

use crate::error::{TranslateError, TranslateResult};
use crate::model::{RValueSource, WallRecord};
use crate::tables::{code_finish, code_subtype, AssemblyTables, Construction};

/// Out-of-range tolerance below the lowest ladder value.
pub const TAIL_TOLERANCE: f64 = 3.0;

/// Nominal R-value credited to rigid foam sheathing.
pub const SHEATHING_CREDIT: f64 = 5.0;

const WOOD_FRAME_WALL_LADDER: &[u32] = &[0, 3, 7, 11, 13, 15, 19, 21];
const ENGINEERED_WALL_LADDER: &[u32] = &[19, 21, 27, 33, 38];
const BRICK_WALL_LADDER: &[u32] = &[0, 5, 10];
const MASONRY_WALL_LADDER: &[u32] = &[0, 3, 6];
const WOOD_FRAME_ROOF_LADDER: &[u32] = &[0, 11, 13, 15, 19, 21, 27, 30];
const SHEATHED_ROOF_LADDER: &[u32] = &[0, 11, 13, 15, 19, 21];
const CEILING_LADDER: &[u32] = &[0, 3, 6, 9, 11, 19, 21, 25, 30, 38, 44, 49, 60];
const FLOOR_LADDER: &[u32] = &[0, 11, 13, 15, 19, 21, 25, 30, 38];

/// Snap `value` to the nearest ladder entry (first entry wins a tie).
///
/// Values below the lowest entry fail when they are further than
/// `tail_tolerance` from it; values above the highest entry always snap.
pub fn round_to_nearest(value: f64, ladder: &[u32], tail_tolerance: Option<f64>) -> Option<u32> {
    let nearest = ladder
        .iter()
        .copied()
        .min_by(|a, b| (value - *a as f64).abs().total_cmp(&(value - *b as f64).abs()))?;
    if let (Some(tolerance), Some(lowest)) = (tail_tolerance, ladder.iter().min()) {
        if value < *lowest as f64 && (value - nearest as f64).abs() > tolerance {
            return None;
        }
    }
    Some(nearest)
}

/// Wall construction family, from the `WallType` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallConstruction {
    WoodStud,
    StructuralBrick,
    /// Concrete masonry unit or stone.
    Masonry,
    StrawBale,
}

/// Roof deck construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoofConstruction {
    WoodFrame,
    RigidSheathing,
    RadiantBarrier,
}

impl RoofConstruction {
    pub fn token(&self) -> &'static str {
        match self {
            RoofConstruction::WoodFrame => "wf",
            RoofConstruction::RigidSheathing => "ps",
            RoofConstruction::RadiantBarrier => "rb",
        }
    }
}

/// Category plus the subtype/finish constraints a code must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblySpec {
    Wall {
        construction: WallConstruction,
        /// Siding token (`wo`, `st`, `vi`, `al`, `br`, `nn`).
        siding: &'static str,
        polystyrene_sheathing: bool,
        optimum_value_engineering: bool,
    },
    Roof {
        construction: RoofConstruction,
        /// Roofing token (`co`, `rc`, `wo`, `tg`, `lc`).
        finish: &'static str,
    },
    Ceiling,
    Floor,
    KneeWall,
}

impl AssemblySpec {
    pub fn construction(&self) -> Construction {
        match self {
            AssemblySpec::Wall { .. } => Construction::Wall,
            AssemblySpec::Roof { .. } => Construction::Roof,
            AssemblySpec::Ceiling => Construction::Ceiling,
            AssemblySpec::Floor => Construction::Floor,
            AssemblySpec::KneeWall => Construction::KneeWall,
        }
    }

    /// Subtype tokens accepted when matching a direct R-value (empty: any).
    fn subtypes(&self) -> &'static [&'static str] {
        match self {
            AssemblySpec::Wall { construction, .. } => match construction {
                WallConstruction::WoodStud => &["ps", "ov", "wf"],
                WallConstruction::StructuralBrick => &["br"],
                WallConstruction::Masonry => &["cb"],
                WallConstruction::StrawBale => &["sb"],
            },
            // A radiant barrier is modelled downstream; match it as wood frame.
            AssemblySpec::Roof { construction, .. } => match construction {
                RoofConstruction::WoodFrame | RoofConstruction::RadiantBarrier => &["wf"],
                RoofConstruction::RigidSheathing => &["ps"],
            },
            _ => &[],
        }
    }

    fn finish(&self) -> Option<&'static str> {
        match self {
            AssemblySpec::Wall { siding, .. } => Some(siding),
            AssemblySpec::Roof { finish, .. } => Some(finish),
            _ => None,
        }
    }
}

/// A resolved construction code and its catalog R-value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAssembly {
    pub code: String,
    pub rvalue: f64,
}

/// Resolves R-value sources to construction codes against injected tables.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyCodeResolver<'t> {
    tables: &'t AssemblyTables,
}

impl<'t> AssemblyCodeResolver<'t> {
    pub fn new(tables: &'t AssemblyTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &'t AssemblyTables {
        self.tables
    }

    /// Resolve one element. `id` names the element in error messages.
    pub fn resolve(
        &self,
        spec: &AssemblySpec,
        source: &RValueSource,
        id: &str,
    ) -> TranslateResult<ResolvedAssembly> {
        match source {
            RValueSource::Assembly(rvalue) => {
                let subtypes = spec.subtypes();
                self.nearest(spec.construction(), *rvalue, |code| {
                    (subtypes.is_empty() || subtypes.contains(&code_subtype(code)))
                        && spec.finish().map_or(true, |f| code_finish(code) == f)
                })
            }
            RValueSource::Layers(_) => {
                let construction = spec.construction();
                let nominal = source.nominal_sum().ok_or_else(|| TranslateError::MissingRValue {
                    construction: construction.to_string(),
                    id: id.to_string(),
                })?;
                self.resolve_nominal(spec, source, nominal, id)
            }
        }
    }

    fn resolve_nominal(
        &self,
        spec: &AssemblySpec,
        source: &RValueSource,
        nominal: f64,
        id: &str,
    ) -> TranslateResult<ResolvedAssembly> {
        let construction = spec.construction();
        let snap = |value: f64, ladder: &[u32]| {
            round_to_nearest(value, ladder, Some(TAIL_TOLERANCE)).ok_or_else(|| {
                TranslateError::RoundOutOfBounds {
                    construction: construction.to_string(),
                    id: id.to_string(),
                    value,
                }
            })
        };

        let code = match spec {
            AssemblySpec::Wall {
                construction: wall,
                siding,
                polystyrene_sheathing,
                optimum_value_engineering,
            } => {
                let (token, r) = match wall {
                    WallConstruction::WoodStud => {
                        if source.has_rigid_continuous() || *polystyrene_sheathing {
                            let credited = (nominal - SHEATHING_CREDIT).max(0.0);
                            ("ps", snap(credited, WOOD_FRAME_WALL_LADDER)?)
                        } else if *optimum_value_engineering {
                            ("ov", snap(nominal, ENGINEERED_WALL_LADDER)?)
                        } else {
                            ("wf", snap(nominal, WOOD_FRAME_WALL_LADDER)?)
                        }
                    }
                    WallConstruction::StructuralBrick => ("br", snap(nominal, BRICK_WALL_LADDER)?),
                    WallConstruction::Masonry => ("cb", snap(nominal, MASONRY_WALL_LADDER)?),
                    WallConstruction::StrawBale => ("sb", 0),
                };
                format!("ew{}{:02}{}", token, r, siding)
            }
            AssemblySpec::Roof {
                construction: roof,
                finish,
            } => match roof {
                RoofConstruction::RigidSheathing => {
                    let credited = (nominal - SHEATHING_CREDIT).max(0.0);
                    format!("rfps{:02}{}", snap(credited, SHEATHED_ROOF_LADDER)?, finish)
                }
                RoofConstruction::WoodFrame | RoofConstruction::RadiantBarrier => {
                    format!("rfwf{:02}{}", snap(nominal, WOOD_FRAME_ROOF_LADDER)?, finish)
                }
            },
            AssemblySpec::Ceiling => format!("ecwf{:02}", snap(nominal, CEILING_LADDER)?),
            AssemblySpec::Floor => format!("efwf{:02}ca", snap(nominal, FLOOR_LADDER)?),
            AssemblySpec::KneeWall => {
                let (code, rvalue) = self
                    .tables
                    .knee_wall
                    .nearest_by_nominal(nominal)
                    .ok_or_else(|| TranslateError::Table("knee wall table is empty".into()))?;
                return Ok(ResolvedAssembly {
                    code: code.to_string(),
                    rvalue,
                });
            }
        };

        self.lookup(construction, code)
    }

    /// Nearest table entry to `rvalue` among codes passing `filter`.
    pub fn nearest<F>(&self, construction: Construction, rvalue: f64, filter: F) -> TranslateResult<ResolvedAssembly>
    where
        F: Fn(&str) -> bool,
    {
        self.tables
            .table(construction)
            .nearest(rvalue, filter)
            .map(|(code, r)| ResolvedAssembly {
                code: code.to_string(),
                rvalue: r,
            })
            .ok_or_else(|| {
                TranslateError::translation(format!(
                    "No {} assembly code matches an effective R-value of {}",
                    construction, rvalue
                ))
            })
    }

    /// Nearest code sharing a subtype and finish, for re-resolving blended
    /// R-values.
    pub fn nearest_with_tokens(
        &self,
        construction: Construction,
        rvalue: f64,
        subtype: &str,
        finish: &str,
    ) -> TranslateResult<ResolvedAssembly> {
        self.nearest(construction, rvalue, |code| {
            code_subtype(code) == subtype && code_finish(code) == finish
        })
    }

    fn lookup(&self, construction: Construction, code: String) -> TranslateResult<ResolvedAssembly> {
        let rvalue = self.tables.table(construction).get(&code).ok_or_else(|| {
            TranslateError::Table(format!("{} is missing from the {} table", code, construction))
        })?;
        Ok(ResolvedAssembly { code, rvalue })
    }
}

/// Wall siding token for a siding description.
fn siding_token(siding: &str) -> Option<&'static str> {
    Some(match siding {
        "wood siding" | "asbestos siding" | "fiber cement siding" | "composite shingle siding"
        | "masonite siding" => "wo",
        "stucco" | "synthetic stucco" => "st",
        "vinyl siding" => "vi",
        "aluminum siding" => "al",
        "brick veneer" => "br",
        _ => return None,
    })
}

/// Roofing token for a roof type description.
pub fn roof_finish_token(roof_type: &str) -> Option<&'static str> {
    Some(match roof_type {
        "shingles" | "asphalt or fiberglass shingles" | "metal surfacing" => "co",
        "slate or tile shingles" => "rc",
        "wood shingles or shakes" => "wo",
        "plastic/rubber/synthetic sheeting" => "tg",
        "concrete" => "lc",
        _ => return None,
    })
}

/// Classify a wall and pick its siding token.
pub fn wall_spec(wall: &WallRecord) -> TranslateResult<AssemblySpec> {
    let id = &wall.id;
    let (construction, siding) = match wall.wall_type.as_str() {
        "WoodStud" => {
            let siding = match wall.siding.as_deref() {
                Some(s) => match siding_token(s) {
                    Some(token) => token,
                    None if s == "other" => {
                        return Err(TranslateError::translation(format!(
                            "Wall {}: There is no HEScore wall siding equivalent for the HPXML option: {}",
                            id, s
                        )))
                    }
                    None => return Err(missing_finish(id)),
                },
                None => return Err(missing_finish(id)),
            };
            (WallConstruction::WoodStud, siding)
        }
        "StructuralBrick" => (WallConstruction::StructuralBrick, "nn"),
        "ConcreteMasonryUnit" | "Stone" => {
            let siding = match wall.siding.as_deref() {
                None => "nn",
                Some(s) => match siding_token(s) {
                    Some(token @ ("st" | "br")) => token,
                    _ => {
                        return Err(TranslateError::translation(format!(
                            "Wall {}: is a CMU and needs a siding of stucco, brick, or none to \
                             translate to HEScore. It has a siding type of {}",
                            id, s
                        )))
                    }
                },
            };
            (WallConstruction::Masonry, siding)
        }
        "StrawBale" => (WallConstruction::StrawBale, "st"),
        other => {
            return Err(TranslateError::translation(format!(
                "Wall type {} not supported, wall id: {}",
                other, id
            )))
        }
    };
    Ok(AssemblySpec::Wall {
        construction,
        siding,
        polystyrene_sheathing: wall.polystyrene_sheathing,
        optimum_value_engineering: wall.optimum_value_engineering,
    })
}

fn missing_finish(id: &str) -> TranslateError {
    TranslateError::translation(format!("Wall {}: Exterior finish information is missing", id))
}
