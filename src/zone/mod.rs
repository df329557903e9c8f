//! Zone assignment: envelope records to scored zones.
//!
//! Walls and windows land on the four canonical sides of the house, attics
//! collapse into at most two roof zones (with their skylights), and
//! foundations into at most two floor zones. Every combination blends
//! catalog R-values harmonically by area and re-resolves the blend to a
//! construction code.

mod floor;
mod roof;
mod wall;
mod window;

pub use floor::footprint_area;
pub use wall::WallZones;
pub use window::window_code;

use crate::error::{TranslateError, TranslateResult};
use crate::hescore::{FloorZone, RoofZone, Shape, Side, TownHouseWalls};
use crate::model::{AtticRecord, Facing, FoundationRecord, GlazingRecord, WallRecord};
use crate::resolve::AssemblyCodeResolver;

/// Azimuth of each compass word.
const COMPASS: &[(&str, u32)] = &[
    ("north", 0),
    ("northeast", 45),
    ("east", 90),
    ("southeast", 135),
    ("south", 180),
    ("southwest", 225),
    ("west", 270),
    ("northwest", 315),
];

/// Snap a freeform azimuth to the nearest multiple of 45 degrees.
pub fn snap_azimuth(azimuth: f64) -> u32 {
    // f64::round rounds half away from zero
    ((azimuth / 45.0).round() as i64).rem_euclid(8) as u32 * 45
}

pub fn compass_azimuth(orientation: &str) -> Option<u32> {
    COMPASS
        .iter()
        .find(|(word, _)| *word == orientation)
        .map(|(_, azimuth)| *azimuth)
}

/// Snapped azimuth of a stated facing.
pub fn facing_azimuth(facing: &Facing) -> TranslateResult<u32> {
    match facing {
        Facing::Azimuth(azimuth) => Ok(snap_azimuth(*azimuth)),
        Facing::Compass(word) => compass_azimuth(word)
            .ok_or_else(|| TranslateError::translation(format!("Unknown orientation: {}", word))),
    }
}

/// Sides an element facing `azimuth` belongs to, for a house whose front
/// faces `front`. Both azimuths are multiples of 45.
///
/// An element on a canonical side belongs to it alone; one halfway between
/// two sides belongs to both.
pub fn sides_for(front: u32, azimuth: u32) -> Vec<Side> {
    let side_at = |az: u32| Side::ALL.into_iter().find(|s| (front + s.offset()) % 360 == az % 360);
    match side_at(azimuth) {
        Some(side) => vec![side],
        None => [azimuth + 315, azimuth + 45]
            .into_iter()
            .filter_map(side_at)
            .collect(),
    }
}

/// Area-weighted harmonic mean of `(area, rvalue)` pairs.
pub(crate) fn harmonic_blend<I>(items: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (area, ua) = items
        .into_iter()
        .fold((0.0, 0.0), |(a, u), (area, r)| (a + area, u + area / r));
    area / ua
}

/// Key with the largest total weight. Ties go to the key seen first.
pub(crate) fn plurality<K, I>(items: I) -> Option<K>
where
    K: PartialEq,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut totals: Vec<(K, f64)> = Vec::new();
    for (key, weight) in items {
        match totals.iter_mut().find(|(k, _)| *k == key) {
            Some((_, total)) => *total += weight,
            None => totals.push((key, weight)),
        }
    }
    let mut best: Option<(K, f64)> = None;
    for (key, total) in totals {
        if best.as_ref().map_or(true, |(_, b)| total > *b) {
            best = Some((key, total));
        }
    }
    best.map(|(key, _)| key)
}

/// Assigns envelope records to zones, resolving codes through the
/// injected resolver.
#[derive(Debug, Clone, Copy)]
pub struct ZoneAssigner<'t> {
    resolver: AssemblyCodeResolver<'t>,
}

impl<'t> ZoneAssigner<'t> {
    pub fn new(resolver: AssemblyCodeResolver<'t>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &AssemblyCodeResolver<'t> {
        &self.resolver
    }

    /// Wall zones with their windows.
    ///
    /// A town house may have its exposed walls flipped from
    /// `back_right_front` to `back_front_left` when that is the only way
    /// its windows fit; the returned [`WallZones`] carries the final value.
    pub fn walls(
        &self,
        walls: &[WallRecord],
        windows: &[GlazingRecord],
        front_azimuth: u32,
        shape: Shape,
        town_house_walls: Option<TownHouseWalls>,
    ) -> TranslateResult<WallZones> {
        wall::assign(&self.resolver, walls, windows, front_azimuth, shape, town_house_walls)
    }

    /// The two largest foundations as floor zones.
    pub fn floors(
        &self,
        foundations: &[FoundationRecord],
        conditioned_floor_area: f64,
        stories: i64,
    ) -> TranslateResult<Vec<FloorZone>> {
        floor::assign(&self.resolver, foundations, conditioned_floor_area, stories)
    }

    /// The two largest attics as roof zones, skylights attached.
    pub fn roofs(
        &self,
        attics: &[AtticRecord],
        skylights: &[GlazingRecord],
        footprint_area: f64,
    ) -> TranslateResult<Vec<RoofZone>> {
        roof::assign(&self.resolver, attics, skylights, footprint_area)
    }
}
