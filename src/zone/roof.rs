//! Attics to roof zones, knee walls and skylights included.

use super::window::GlazingSummary;
use super::{harmonic_blend, plurality};
use crate::error::{TranslateError, TranslateResult};
use crate::hescore::{RoofColor, RoofType, RoofZone, SkylightZone};
use crate::model::{AtticKind, AtticRecord, GlazingRecord, RoofRecord};
use crate::resolve::{roof_finish_token, AssemblyCodeResolver, AssemblySpec, RoofConstruction};
use crate::tables::{code_nominal, Construction};
use tracing::{debug, warn};

/// Air film resistance added to both sides of the attic floor and knee
/// walls before they are combined in parallel.
pub(crate) const AIR_FILM_OFFSET: f64 = 0.5;

/// An attic (or a group of attics) ready to become a roof zone.
#[derive(Debug, Clone)]
struct AtticZone {
    roof_type: RoofType,
    /// Ceiling area for vented attics, roof area otherwise.
    area: f64,
    construction: RoofConstruction,
    finish: &'static str,
    color: RoofColor,
    absorptance: Option<f64>,
    roof_rvalue: f64,
    floor_rvalue: f64,
    roof_ids: Vec<String>,
}

/// One roof surface after classification.
struct RoofPart {
    area: f64,
    construction: RoofConstruction,
    finish: &'static str,
    color: RoofColor,
    absorptance: Option<f64>,
    rvalue: f64,
}

fn roof_type(kind: AtticKind) -> RoofType {
    match kind {
        AtticKind::VentedAttic => RoofType::VentedAttic,
        AtticKind::CathedralCeiling => RoofType::CathCeiling,
        AtticKind::ConditionedAttic => RoofType::CondAttic,
    }
}

fn roof_color(attic_id: &str, roof: &RoofRecord) -> TranslateResult<RoofColor> {
    if roof.solar_absorptance.is_some() {
        return Ok(RoofColor::CoolColor);
    }
    match roof.color.as_deref() {
        Some("light") => Ok(RoofColor::Light),
        Some("medium") => Ok(RoofColor::Medium),
        Some("medium dark") => Ok(RoofColor::MediumDark),
        Some("dark") => Ok(RoofColor::Dark),
        Some("reflective") => Ok(RoofColor::White),
        _ => Err(TranslateError::translation(format!(
            "Attic {}: Invalid or missing RoofColor in Roof: {}",
            attic_id, roof.id
        ))),
    }
}

fn roof_part(
    resolver: &AssemblyCodeResolver<'_>,
    attic_id: &str,
    roof: &RoofRecord,
    only_roof: bool,
) -> TranslateResult<RoofPart> {
    let area = match roof.area {
        Some(area) => area,
        None if only_roof => 1.0,
        None => {
            return Err(TranslateError::not_found(format!(
                "Roof[SystemIdentifier/@id=\"{}\"]/Area",
                roof.id
            )))
        }
    };
    let color = roof_color(attic_id, roof)?;
    let finish = roof.roof_type.as_deref().and_then(roof_finish_token).ok_or_else(|| {
        TranslateError::translation(format!(
            "Attic {}: HEScore does not have an analogy to the HPXML roof type: {} for Roof : {}",
            attic_id,
            roof.roof_type.as_deref().unwrap_or("None"),
            roof.id
        ))
    })?;

    let mut construction = if roof.radiant_barrier {
        RoofConstruction::RadiantBarrier
    } else if roof.insulation.has_rigid_continuous() {
        RoofConstruction::RigidSheathing
    } else {
        RoofConstruction::WoodFrame
    };

    let resolved = resolver.resolve(
        &AssemblySpec::Roof { construction, finish },
        &roof.insulation,
        &roof.id,
    )?;
    // A radiant barrier only survives on an uninsulated deck.
    if construction == RoofConstruction::RadiantBarrier && code_nominal(&resolved.code).unwrap_or(0) > 0 {
        construction = RoofConstruction::WoodFrame;
    }

    Ok(RoofPart {
        area,
        construction,
        finish,
        color,
        absorptance: roof.solar_absorptance,
        rvalue: resolved.rvalue,
    })
}

/// Attic floor R-value with knee walls folded in through the air-film
/// offset model.
fn fold_knee_walls(floor_r: f64, ceiling_area: f64, knee_walls: &[(f64, f64)]) -> f64 {
    if knee_walls.is_empty() {
        return floor_r;
    }
    let area = ceiling_area + knee_walls.iter().map(|(a, _)| a).sum::<f64>();
    let ua = ceiling_area / (floor_r + AIR_FILM_OFFSET)
        + knee_walls
            .iter()
            .map(|(a, r)| a / (r + AIR_FILM_OFFSET))
            .sum::<f64>();
    area / ua - AIR_FILM_OFFSET
}

fn attic_zone(
    resolver: &AssemblyCodeResolver<'_>,
    attic: &AtticRecord,
    footprint_area: f64,
    single_attic: bool,
) -> TranslateResult<AtticZone> {
    let parts = attic
        .roofs
        .iter()
        .map(|roof| roof_part(resolver, &attic.id, roof, attic.roofs.len() == 1))
        .collect::<TranslateResult<Vec<_>>>()?;

    let area = match attic.area {
        Some(area) => area,
        None if single_attic => footprint_area,
        None => {
            return Err(TranslateError::translation(
                "If there are more than one Attic elements, each needs an area. Please specify under its \
                 attached FrameFloor/Roof element.",
            ))
        }
    };

    let construction = plurality(parts.iter().map(|p| (p.construction, p.area)));
    let finish = plurality(parts.iter().map(|p| (p.finish, p.area)));
    let color = plurality(parts.iter().map(|p| (p.color, p.area)));
    let (Some(construction), Some(finish), Some(color)) = (construction, finish, color) else {
        return Err(TranslateError::translation(format!(
            "Attic {} does not have a roof associated with it.",
            attic.id
        )));
    };

    let absorptance = if color == RoofColor::CoolColor {
        let cool: Vec<(f64, f64)> = parts
            .iter()
            .filter_map(|p| Some((p.area, p.absorptance?)))
            .collect();
        let cool_area: f64 = cool.iter().map(|(a, _)| a).sum();
        Some(cool.iter().map(|(a, s)| a * s).sum::<f64>() / cool_area)
    } else {
        None
    };

    let roof_rvalue = harmonic_blend(parts.iter().map(|p| (p.area, p.rvalue)));

    let mut floor_rvalue = resolver
        .resolve(&AssemblySpec::Ceiling, &attic.floor_insulation, &attic.id)?
        .rvalue;
    if !attic.knee_walls.is_empty() {
        let knee_walls = attic
            .knee_walls
            .iter()
            .map(|kw| {
                let resolved = resolver.resolve(&AssemblySpec::KneeWall, &kw.insulation, &kw.id)?;
                Ok((kw.area, resolved.rvalue))
            })
            .collect::<TranslateResult<Vec<_>>>()?;
        let folded = fold_knee_walls(floor_rvalue, area, &knee_walls);
        debug!(attic = %attic.id, knee_walls = knee_walls.len(), floor_rvalue, folded, "folded knee walls");
        floor_rvalue = folded;
    }

    Ok(AtticZone {
        roof_type: roof_type(attic.kind),
        area,
        construction,
        finish,
        color,
        absorptance,
        roof_rvalue,
        floor_rvalue,
        roof_ids: attic.roofs.iter().map(|r| r.id.clone()).collect(),
    })
}

/// Collapse attics sharing a roof type into one zone each.
fn combine_by_roof_type(zones: Vec<AtticZone>) -> Vec<AtticZone> {
    let mut groups: Vec<(RoofType, Vec<AtticZone>)> = Vec::new();
    for zone in zones {
        match groups.iter_mut().find(|(t, _)| *t == zone.roof_type) {
            Some((_, members)) => members.push(zone),
            None => groups.push((zone.roof_type, vec![zone])),
        }
    }

    let mut combined = Vec::with_capacity(groups.len());
    for (roof_type, members) in groups {
        let (Some(construction), Some(finish), Some(color)) = (
            plurality(members.iter().map(|z| (z.construction, z.area))),
            plurality(members.iter().map(|z| (z.finish, z.area))),
            plurality(members.iter().map(|z| (z.color, z.area))),
        ) else {
            continue;
        };
        let area: f64 = members.iter().map(|z| z.area).sum();
        let absorptance = (color == RoofColor::CoolColor).then(|| {
            let cool: Vec<(f64, f64)> = members
                .iter()
                .filter_map(|z| Some((z.area, z.absorptance?)))
                .collect();
            cool.iter().map(|(a, s)| a * s).sum::<f64>() / cool.iter().map(|(a, _)| a).sum::<f64>()
        });
        let mut roof_ids: Vec<String> = Vec::new();
        for id in members.iter().flat_map(|z| z.roof_ids.iter()) {
            if !roof_ids.contains(id) {
                roof_ids.push(id.clone());
            }
        }
        debug!(?roof_type, attics = members.len(), area, "combined attics by roof type");
        combined.push(AtticZone {
            roof_type,
            area,
            construction,
            finish,
            color,
            absorptance,
            roof_rvalue: harmonic_blend(members.iter().map(|z| (z.area, z.roof_rvalue))),
            floor_rvalue: harmonic_blend(members.iter().map(|z| (z.area, z.floor_rvalue))),
            roof_ids,
        });
    }
    combined
}

pub(super) fn assign(
    resolver: &AssemblyCodeResolver<'_>,
    attics: &[AtticRecord],
    skylights: &[GlazingRecord],
    footprint_area: f64,
) -> TranslateResult<Vec<RoofZone>> {
    if attics.is_empty() {
        return Err(TranslateError::translation("There are no Attic elements in this building."));
    }

    let mut zones = attics
        .iter()
        .map(|attic| attic_zone(resolver, attic, footprint_area, attics.len() == 1))
        .collect::<TranslateResult<Vec<_>>>()?;

    if zones.len() > 2 {
        zones = combine_by_roof_type(zones);
    }
    zones.sort_by(|a, b| b.area.total_cmp(&a.area));
    if zones.len() > 2 {
        warn!(discarded = zones.len() - 2, "keeping the two largest roof zones");
        zones.truncate(2);
    }

    // Skylights by zone index; unattached ones join the first zone.
    let mut pieces: Vec<Vec<(f64, &GlazingRecord)>> = vec![Vec::new(); zones.len()];
    for skylight in skylights {
        let area = skylight
            .area
            .ok_or_else(|| TranslateError::translation("Every skylight needs an area."))?;
        let index = match &skylight.attached_to {
            None => Some(0),
            Some(roof_id) => zones.iter().position(|z| z.roof_ids.contains(roof_id)),
        };
        match index {
            Some(i) => pieces[i].push((area, skylight)),
            None => warn!(
                skylight = skylight.id.as_deref().unwrap_or("unnamed"),
                "skylight is attached to a roof that is not modeled, dropping it"
            ),
        }
    }

    let mut roof_zones = Vec::with_capacity(zones.len());
    for (i, (zone, skylight_pieces)) in zones.into_iter().zip(pieces).enumerate() {
        let roof_assembly_code = if zone.construction == RoofConstruction::RadiantBarrier {
            format!("rfrb00{}", zone.finish)
        } else {
            resolver
                .nearest_with_tokens(Construction::Roof, zone.roof_rvalue, zone.construction.token(), zone.finish)?
                .code
        };

        let zone_skylight = match GlazingSummary::of(&skylight_pieces)? {
            Some(summary) => summary.into_skylight_zone(),
            None => SkylightZone::default(),
        };

        let vented = zone.roof_type == RoofType::VentedAttic;
        let ceiling_assembly_code = if vented {
            Some(resolver.nearest(Construction::Ceiling, zone.floor_rvalue, |_| true)?.code)
        } else {
            None
        };

        roof_zones.push(RoofZone {
            roof_name: format!("roof{}", i + 1),
            roof_assembly_code,
            roof_color: zone.color,
            roof_absorptance: zone.absorptance,
            roof_type: zone.roof_type,
            ceiling_area: vented.then_some(zone.area),
            ceiling_assembly_code,
            roof_area: (!vented).then_some(zone.area),
            zone_skylight,
        });
    }
    Ok(roof_zones)
}
