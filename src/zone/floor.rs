//! Foundations to floor zones.

use super::harmonic_blend;
use crate::error::{TranslateError, TranslateResult};
use crate::hescore::{FloorZone, FoundationType};
use crate::model::{FoundationKind, FoundationRecord, RValueSource};
use crate::resolve::{AssemblyCodeResolver, AssemblySpec};
use crate::tables::Construction;
use tracing::{debug, warn};

/// Areas below this are treated as unknown.
const SMALL_AREA: f64 = 0.01;

/// Nominal level to effective R-value, foundation walls.
const WALL_LEVELS: &[(u32, f64)] = &[(0, 4.0), (11, 11.6), (19, 19.6)];

/// Nominal level to effective R-value, slab perimeter.
const SLAB_LEVELS: &[(u32, f64)] = &[(0, 4.0), (5, 7.9)];

/// Effective R-value of the interior and exterior air films, excluded
/// from the reported insulation level.
const FILM_RVALUE: f64 = 4.0;

fn nearest_level(value: f64, levels: &[(u32, f64)]) -> (u32, f64) {
    levels
        .iter()
        .copied()
        .min_by(|(a, _), (b, _)| (value - *a as f64).abs().total_cmp(&(value - *b as f64).abs()))
        .unwrap_or((0, FILM_RVALUE))
}

/// Footprint of the conditioned space above grade.
pub fn footprint_area(conditioned_floor_area: f64, stories: i64, floors: &[FloorZone]) -> f64 {
    let basement: f64 = floors
        .iter()
        .filter(|f| f.foundation_type == FoundationType::CondBasement)
        .map(|f| f.floor_area)
        .sum();
    ((conditioned_floor_area - basement) / stories.max(1) as f64).floor()
}

fn foundation_type(kind: &FoundationKind) -> TranslateResult<FoundationType> {
    Ok(match kind {
        FoundationKind::Basement { conditioned: true } => FoundationType::CondBasement,
        FoundationKind::Basement { conditioned: false } => FoundationType::UncondBasement,
        FoundationKind::Crawlspace { vented: true } => FoundationType::VentedCrawl,
        FoundationKind::Crawlspace { vented: false } => FoundationType::UnventedCrawl,
        FoundationKind::SlabOnGrade => FoundationType::SlabOnGrade,
        FoundationKind::Garage => FoundationType::UnventedCrawl,
        FoundationKind::Ambient => FoundationType::VentedCrawl,
        FoundationKind::Other(other) => {
            return Err(TranslateError::translation(format!(
                "HEScore does not have a foundation type analogous to: {}",
                other
            )))
        }
    })
}

/// Nominal R-value of layered insulation; a stated assembly value is not
/// accepted for foundation walls and slabs.
fn layered_nominal(source: &RValueSource, element: &str, id_label: &str, id: &str) -> TranslateResult<f64> {
    match source {
        RValueSource::Assembly(_) => Err(TranslateError::translation(format!(
            "Every {} insulation layer needs a NominalRValue, {}_id = {}",
            element, id_label, id
        ))),
        RValueSource::Layers(_) => source.nominal_sum().ok_or_else(|| TranslateError::MissingRValue {
            construction: element.to_string(),
            id: id.to_string(),
        }),
    }
}

fn insulation_level(foundation: &FoundationRecord, foundation_type: FoundationType) -> TranslateResult<u32> {
    if !foundation.walls.is_empty() {
        if foundation_type == FoundationType::SlabOnGrade {
            return Err(TranslateError::translation(
                "The house is a slab on grade foundation, but has foundation walls.",
            ));
        }
        let mut parts = Vec::with_capacity(foundation.walls.len());
        for wall in &foundation.walls {
            let area = match (wall.area, wall.length, wall.height) {
                (Some(area), _, _) => area,
                (None, Some(length), Some(height)) => length * height,
                _ if foundation.walls.len() == 1 => 1.0,
                _ => {
                    return Err(TranslateError::translation(
                        "If there is more than one FoundationWall, an Area is required for each.",
                    ))
                }
            };
            let nominal = layered_nominal(&wall.insulation, "foundation wall", "fwall", &wall.id)?;
            parts.push((area, nearest_level(nominal, WALL_LEVELS).1));
        }
        let level = harmonic_blend(parts) - FILM_RVALUE;
        return Ok(nearest_level(level, WALL_LEVELS).0);
    }

    if foundation_type == FoundationType::SlabOnGrade {
        let mut parts = Vec::with_capacity(foundation.slabs.len());
        for slab in &foundation.slabs {
            let perimeter = match slab.exposed_perimeter {
                Some(perimeter) => perimeter,
                None if foundation.slabs.len() == 1 => 1.0,
                None => {
                    return Err(TranslateError::translation(
                        "If there is more than one Slab, an ExposedPerimeter is required for each.",
                    ))
                }
            };
            let nominal = layered_nominal(&slab.perimeter_insulation, "slab", "slab", &slab.id)?;
            parts.push((perimeter, nearest_level(nominal, SLAB_LEVELS).1));
        }
        if parts.is_empty() {
            return Ok(0);
        }
        let level = harmonic_blend(parts) - FILM_RVALUE;
        return Ok(nearest_level(level, SLAB_LEVELS).0);
    }

    Ok(0)
}

fn floor_code(resolver: &AssemblyCodeResolver<'_>, foundation: &FoundationRecord) -> TranslateResult<String> {
    let floors = &foundation.frame_floors;
    if floors.is_empty() {
        return Ok("efwf00ca".to_string());
    }
    let mut parts = Vec::with_capacity(floors.len());
    for floor in floors {
        let area = match floor.area {
            Some(area) => area,
            None if floors.len() == 1 => 1.0,
            None => {
                return Err(TranslateError::translation(
                    "If there is more than one FrameFloor, an Area is required for each.",
                ))
            }
        };
        let rvalue = match floor.insulation {
            RValueSource::Assembly(rvalue) => rvalue,
            RValueSource::Layers(_) => {
                resolver
                    .resolve(&AssemblySpec::Floor, &floor.insulation, &floor.id)?
                    .rvalue
            }
        };
        parts.push((area, rvalue));
    }
    let blended = harmonic_blend(parts);
    Ok(resolver.nearest(Construction::Floor, blended, |_| true)?.code)
}

pub(super) fn assign(
    resolver: &AssemblyCodeResolver<'_>,
    foundations: &[FoundationRecord],
    conditioned_floor_area: f64,
    stories: i64,
) -> TranslateResult<Vec<FloorZone>> {
    let mut ranked: Vec<&FoundationRecord> = foundations.iter().collect();
    ranked.sort_by(|a, b| b.area.total_cmp(&a.area));

    if ranked.len() > 1 && ranked.iter().any(|f| f.area.abs() < SMALL_AREA) {
        return Err(TranslateError::translation(
            "If there is more than one foundation, each needs an area specified on either \"Slab\" or \
             \"FrameFloor\" attached.",
        ));
    }
    let total: f64 = ranked.iter().map(|f| f.area).sum();
    let kept: f64 = ranked.iter().take(2).map(|f| f.area).sum();
    let area_mult = if kept == 0.0 { 0.0 } else { total / kept };
    if ranked.len() > 2 {
        warn!(discarded = ranked.len() - 2, area_mult, "keeping the two largest foundations");
    }

    let mut zones = Vec::with_capacity(ranked.len().min(2));
    for (i, foundation) in ranked.into_iter().take(2).enumerate() {
        let foundation_type = foundation_type(&foundation.kind)?;

        let mut floor_area = foundation.area * area_mult;
        if foundation.area.abs() < SMALL_AREA {
            let mut floors_above = stories;
            if foundation_type == FoundationType::CondBasement {
                floors_above += 1;
            }
            floor_area = (conditioned_floor_area / floors_above.max(1) as f64).floor();
            debug!(floor_area, "foundation area from conditioned floor area");
        }

        let foundation_insulation_level = insulation_level(foundation, foundation_type)?;
        let floor_assembly_code = if foundation_type == FoundationType::SlabOnGrade {
            None
        } else {
            Some(floor_code(resolver, foundation)?)
        };

        zones.push(FloorZone {
            floor_name: format!("floor{}", i + 1),
            floor_area,
            foundation_type,
            foundation_insulation_level,
            floor_assembly_code,
        });
    }
    Ok(zones)
}
