//! Wall sides and their windows.

use super::window::GlazingSummary;
use super::{facing_azimuth, harmonic_blend, plurality, sides_for};
use crate::error::{TranslateError, TranslateResult};
use crate::hescore::{Shape, Side, TownHouseWalls, WallZone, WindowZone};
use crate::model::{GlazingRecord, WallRecord};
use crate::resolve::{wall_spec, AssemblyCodeResolver};
use crate::tables::{code_finish, code_subtype, Construction};
use std::collections::BTreeMap;
use tracing::debug;

/// Wall zones plus the town house exposure they ended up with.
#[derive(Debug, Clone, PartialEq)]
pub struct WallZones {
    pub zones: Vec<WallZone>,
    pub town_house_walls: Option<TownHouseWalls>,
}

/// One wall's share of a side.
#[derive(Debug, Clone)]
struct Placed {
    id: String,
    code: String,
    rvalue: f64,
    area: Option<f64>,
}

pub(super) fn assign(
    resolver: &AssemblyCodeResolver<'_>,
    walls: &[WallRecord],
    windows: &[GlazingRecord],
    front: u32,
    shape: Shape,
    town_house_walls: Option<TownHouseWalls>,
) -> TranslateResult<WallZones> {
    let mut by_side: BTreeMap<Side, Vec<Placed>> = BTreeMap::new();
    let mut no_side = Vec::new();

    for wall in walls {
        let resolved = resolver.resolve(&wall_spec(wall)?, &wall.insulation, &wall.id)?;
        let placed = Placed {
            id: wall.id.clone(),
            code: resolved.code,
            rvalue: resolved.rvalue,
            area: wall.area,
        };
        let Some(facing) = &wall.facing else {
            no_side.push(placed);
            continue;
        };
        let sides = sides_for(front, facing_azimuth(facing)?);
        if sides.len() > 1 {
            debug!(wall = %wall.id, "wall between sides, splitting area");
        }
        for side in &sides {
            let mut share = placed.clone();
            share.area = placed.area.map(|a| a / sides.len() as f64);
            by_side.entry(*side).or_default().push(share);
        }
    }

    let all_walls_same = !no_side.is_empty() && by_side.is_empty();
    if all_walls_same {
        for side in Side::ALL {
            by_side.insert(side, no_side.clone());
        }
    } else if !no_side.is_empty() {
        return Err(TranslateError::translation(
            "Some of the HPXML walls have orientation information and others do not.",
        ));
    }

    let mut codes: Vec<(Side, String)> = Vec::new();
    for side in Side::ALL {
        let Some(placed) = by_side.get(&side) else {
            continue;
        };
        codes.push((side, combine_side(resolver, side, placed)?));
    }

    let mut window_sides: BTreeMap<Side, Vec<(f64, &GlazingRecord)>> = BTreeMap::new();
    for window in windows {
        let label = window.id.as_deref().unwrap_or("None");
        let area = window.area.ok_or_else(|| {
            TranslateError::not_found(format!("Window[SystemIdentifier/@id=\"{}\"]/Area", label))
        })?;
        let sides = match (&window.facing, &window.attached_to) {
            (Some(facing), _) => sides_for(front, facing_azimuth(facing)?),
            (None, Some(wall_id)) => {
                let sides: Vec<Side> = Side::ALL
                    .into_iter()
                    .filter(|s| by_side.get(s).map_or(false, |ws| ws.iter().any(|w| &w.id == wall_id)))
                    .collect();
                if sides.is_empty() {
                    return Err(TranslateError::translation(format!(
                        "The Window[SystemIdentifier/@id=\"{}\"] has no Azimuth or Orientation, and the \
                         Window/AttachedToWall/@idref of \"{}\" didn't reference a Wall element.",
                        label, wall_id
                    )));
                }
                sides
            }
            (None, None) => {
                return Err(TranslateError::translation(format!(
                    "Window[SystemIdentifier/@id=\"{}\"] doesn't have Azimuth, Orientation, or AttachedToWall. \
                     At least one is required.",
                    label
                )))
            }
        };
        let share = area / sides.len() as f64;
        for side in sides {
            window_sides.entry(side).or_default().push((share, window));
        }
    }

    let mut exposure = town_house_walls;
    if shape == Shape::TownHouse {
        let walls_exposed = exposure.unwrap_or(TownHouseWalls::BackRightFront);
        let windows_on_shared =
            |t: TownHouseWalls| t.shared().iter().any(|s| window_sides.contains_key(s));

        if all_walls_same {
            let mut fits = !windows_on_shared(walls_exposed);
            let mut chosen = walls_exposed;
            if !fits && walls_exposed == TownHouseWalls::BackRightFront {
                chosen = TownHouseWalls::BackFrontLeft;
                fits = !windows_on_shared(chosen);
            }
            if !fits {
                return Err(TranslateError::translation("The house has windows on shared walls."));
            }
            let shared = chosen.shared();
            codes.retain(|(side, _)| !shared.contains(side));
            exposure = Some(chosen);
        } else {
            let defined: Vec<Side> = codes.iter().map(|(s, _)| *s).collect();
            let matches = |t: TownHouseWalls| {
                let shared = t.shared();
                Side::ALL
                    .into_iter()
                    .all(|s| defined.contains(&s) != shared.contains(&s))
            };
            let mut chosen = walls_exposed;
            if !matches(chosen) && chosen == TownHouseWalls::BackRightFront {
                chosen = TownHouseWalls::BackFrontLeft;
            }
            if !matches(chosen) {
                let names = |sides: &[Side]| sides.iter().map(Side::to_string).collect::<Vec<_>>().join(", ");
                return Err(TranslateError::translation(format!(
                    "The house has walls defined for sides {} and shared walls on sides {}.",
                    names(&defined),
                    names(&chosen.shared())
                )));
            }
            if windows_on_shared(chosen) {
                return Err(TranslateError::translation("The house has windows on shared walls."));
            }
            exposure = Some(chosen);
        }
    }

    let mut zones = Vec::with_capacity(codes.len());
    for (side, code) in codes {
        let pieces = window_sides.remove(&side).unwrap_or_default();
        let zone_window = match GlazingSummary::of_windows(&pieces)? {
            Some(summary) => summary.into_window_zone(),
            None => WindowZone::empty(),
        };
        zones.push(WallZone {
            side,
            wall_assembly_code: code,
            zone_window,
        });
    }

    Ok(WallZones {
        zones,
        town_house_walls: exposure,
    })
}

/// Blend the walls on one side into a single construction code.
fn combine_side(resolver: &AssemblyCodeResolver<'_>, side: Side, placed: &[Placed]) -> TranslateResult<String> {
    let areas: Vec<f64> = match placed {
        [only] => vec![only.area.unwrap_or(1.0)],
        many => many
            .iter()
            .map(|w| {
                w.area.ok_or_else(|| {
                    TranslateError::translation(format!(
                        "The {} side of the house has {} walls and they do not all have areas.",
                        side,
                        many.len()
                    ))
                })
            })
            .collect::<TranslateResult<_>>()?,
    };

    let (subtype, finish) = plurality(
        placed
            .iter()
            .zip(&areas)
            .map(|(w, a)| ((code_subtype(&w.code), code_finish(&w.code)), *a)),
    )
    .ok_or_else(|| TranslateError::translation(format!("No walls on the {} side", side)))?;

    let blended = harmonic_blend(areas.iter().copied().zip(placed.iter().map(|w| w.rvalue)));
    let resolved = resolver.nearest_with_tokens(Construction::Wall, blended, subtype, finish)?;
    debug!(side = %side, walls = placed.len(), rvalue = blended, code = %resolved.code, "combined wall side");
    Ok(resolved.code)
}
