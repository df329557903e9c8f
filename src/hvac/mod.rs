//! HVAC resolution: heating, cooling and duct records to at most two
//! combined systems.
//!
//! Every piece of equipment gets a weight (the floor area it serves, or
//! the fraction of the load) chosen once for the whole house. Equipment
//! sharing a duct system is grouped; the rest is paired heating to cooling
//! by [`merge::merge_singletons`]. The two heaviest combinations are kept
//! and their fractions normalized to one.

mod distribution;
mod equipment;
mod merge;

pub use distribution::{distribution, MAX_DUCTS};
pub use equipment::{cooling, fuel, heating};
pub use merge::{merge_singletons, rank, Candidate, MAX_SYSTEMS};

use crate::error::{TranslateError, TranslateResult};
use crate::hescore::{Cooling, Heating, HvacDistribution, HvacSystem};
use crate::model::{DistributionRecord, PlantRecord};
use crate::schema::{PresentZones, SchemaAdapter};
use tracing::{debug, info};

/// Largest allowed difference between the normalized weights of heating
/// and cooling equipment sharing a duct system.
pub const SHARED_DUCT_TOLERANCE: f64 = 0.051;

/// The attribute every piece of equipment is weighted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    FloorArea,
    FractionOfLoad,
}

/// One scored piece of equipment with its weighting attributes.
#[derive(Debug, Clone)]
struct Equipment<T> {
    id: String,
    scored: T,
    floor_area: Option<f64>,
    fraction: Option<f64>,
    distribution: Option<usize>,
}

impl<T> Equipment<T> {
    fn weight(&self, weighting: Weighting) -> f64 {
        match weighting {
            Weighting::FloorArea => self.floor_area.unwrap_or(0.0),
            Weighting::FractionOfLoad => self.fraction.unwrap_or(0.0),
        }
    }
}

/// A lone piece of equipment stating neither weight serves everything.
fn default_lone<T>(list: &mut [Equipment<T>], conditioned_floor_area: f64) {
    if let [only] = list {
        if only.floor_area.is_none() && only.fraction.is_none() {
            only.fraction = Some(1.0);
            only.floor_area = Some(conditioned_floor_area);
        }
    }
}

/// Resolves equipment records into combined HVAC systems.
#[derive(Clone, Copy)]
pub struct HvacResolver<'s> {
    adapter: &'s dyn SchemaAdapter,
    zones: &'s PresentZones,
}

impl<'s> HvacResolver<'s> {
    /// `zones` are the roof and floor zone types already assigned, used to
    /// place ducts.
    pub fn new(adapter: &'s dyn SchemaAdapter, zones: &'s PresentZones) -> Self {
        Self { adapter, zones }
    }

    pub fn resolve(
        &self,
        heating_plants: &[PlantRecord],
        cooling_plants: &[PlantRecord],
        distributions: &[DistributionRecord],
        conditioned_floor_area: f64,
    ) -> TranslateResult<Vec<HvacSystem>> {
        let heating_plants: Vec<&PlantRecord> = heating_plants.iter().filter(|p| !p.serves_no_load()).collect();
        let cooling_plants: Vec<&PlantRecord> = cooling_plants.iter().filter(|p| !p.serves_no_load()).collect();

        let heating_links = link_distributions(&heating_plants, distributions)?;
        let cooling_links = link_distributions(&cooling_plants, distributions)?;

        // Unreferenced distribution systems are never resolved.
        let mut scored_dists: Vec<Option<HvacDistribution>> = Vec::with_capacity(distributions.len());
        for (i, record) in distributions.iter().enumerate() {
            let referenced = heating_links.contains(&Some(i)) || cooling_links.contains(&Some(i));
            scored_dists.push(if referenced {
                distribution(record, self.adapter, self.zones)?
            } else {
                None
            });
        }
        let ducted = |d: usize| scored_dists.get(d).map_or(false, Option::is_some);

        let mut heaters = heating_plants
            .iter()
            .zip(&heating_links)
            .map(|(plant, link)| Ok(equipment(plant, *link, heating(plant)?)))
            .collect::<TranslateResult<Vec<Equipment<Heating>>>>()?;
        let mut coolers = cooling_plants
            .iter()
            .zip(&cooling_links)
            .map(|(plant, link)| Ok(equipment(plant, *link, cooling(plant)?)))
            .collect::<TranslateResult<Vec<Equipment<Cooling>>>>()?;

        if heaters.is_empty() && coolers.is_empty() {
            return Err(TranslateError::NoHvacSystem);
        }

        default_lone(&mut heaters, conditioned_floor_area);
        default_lone(&mut coolers, conditioned_floor_area);

        let weighting = choose_weighting(&heaters, &coolers)?;
        let weight_sum = heaters
            .iter()
            .map(|h| h.weight(weighting))
            .sum::<f64>()
            .max(coolers.iter().map(|c| c.weight(weighting)).sum());
        if weight_sum <= 0.0 {
            return Err(TranslateError::translation(
                "The heating and cooling systems do not serve any floor area or load.",
            ));
        }
        debug!(?weighting, weight_sum, heating = heaters.len(), cooling = coolers.len(), "weighting hvac equipment");
        let heat_weight = |h: usize| heaters[h].weight(weighting) / weight_sum;
        let cool_weight = |c: usize| coolers[c].weight(weighting) / weight_sum;

        // Equipment sharing one duct system, in distribution order.
        let shared: Vec<(usize, Option<usize>, Option<usize>)> = (0..distributions.len())
            .filter_map(|d| {
                let h = heaters.iter().position(|e| e.distribution == Some(d));
                let c = coolers.iter().position(|e| e.distribution == Some(d));
                (h.is_some() || c.is_some()).then_some((d, h, c))
            })
            .collect();

        for &(d, h, c) in &shared {
            if let (Some(h), Some(c)) = (h, c) {
                if (heat_weight(h) - cool_weight(c)).abs() > SHARED_DUCT_TOLERANCE {
                    return Err(TranslateError::InconsistentHvacWeight {
                        heating: heaters[h].id.clone(),
                        cooling: coolers[c].id.clone(),
                        distribution: distributions[d].id.clone(),
                    });
                }
            }
        }

        for heater in &heaters {
            check_ducts(&heater.id, "Heating", heater.scored.kind.requires_ducts(), heater.distribution, &ducted)?;
        }
        for cooler in &coolers {
            check_ducts(&cooler.id, "Cooling", cooler.scored.kind.requires_ducts(), cooler.distribution, &ducted)?;
        }

        let mut combined = Vec::new();
        let mut heating_only = Vec::new();
        let mut cooling_only = Vec::new();
        for &(d, h, c) in &shared {
            match (h, c) {
                (Some(h), Some(c)) => combined.push(Candidate {
                    heating: Some(h),
                    cooling: Some(c),
                    distribution: Some(d),
                    weight: (heat_weight(h) + cool_weight(c)) / 2.0,
                }),
                (Some(h), None) => heating_only.push(Candidate::heating(h, Some(d), heat_weight(h))),
                (None, Some(c)) => cooling_only.push(Candidate::cooling(c, Some(d), cool_weight(c))),
                (None, None) => {}
            }
        }

        // Equipment on no duct system. The two roles of one heat pump stay
        // together when they agree on its type.
        let mut paired_coolers = vec![false; coolers.len()];
        for (h, heater) in heaters.iter().enumerate().filter(|(_, e)| e.distribution.is_none()) {
            let weight = heat_weight(h);
            let same_unit = coolers.iter().position(|c| {
                c.distribution.is_none() && c.id == heater.id && c.scored.kind.as_str() == heater.scored.kind.as_str()
            });
            match same_unit {
                Some(c) => {
                    paired_coolers[c] = true;
                    combined.push(Candidate {
                        heating: Some(h),
                        cooling: Some(c),
                        distribution: None,
                        weight,
                    });
                }
                None => heating_only.push(Candidate::heating(h, None, weight)),
            }
        }
        for (c, cooler) in coolers.iter().enumerate() {
            if cooler.distribution.is_none() && !paired_coolers[c] {
                cooling_only.push(Candidate::cooling(c, None, cool_weight(c)));
            }
        }

        combined.extend(merge_singletons(heating_only, cooling_only, ducted));
        if combined.is_empty() {
            return Err(TranslateError::NoHvacSystem);
        }

        let mut systems = Vec::with_capacity(MAX_SYSTEMS);
        for (i, (candidate, fraction)) in rank(combined).into_iter().enumerate() {
            let heating = candidate
                .heating
                .map_or_else(Heating::none, |h| heaters[h].scored.clone());
            let cooling = candidate
                .cooling
                .map_or_else(Cooling::none, |c| coolers[c].scored.clone());
            if heating.kind.is_heat_pump_family()
                && cooling.kind.is_heat_pump_family()
                && heating.kind.as_str() != cooling.kind.as_str()
            {
                return Err(TranslateError::translation(format!(
                    "Two different heat pump systems: {} for heating, and {} for cooling are not supported \
                     in one hvac system.",
                    heating.kind, cooling.kind
                )));
            }
            systems.push(HvacSystem {
                hvac_name: format!("hvac{}", i + 1),
                hvac_fraction: fraction,
                heating,
                cooling,
                hvac_distribution: candidate.distribution.and_then(|d| scored_dists[d].clone()),
            });
        }
        info!(systems = systems.len(), "resolved hvac systems");
        Ok(systems)
    }
}

fn equipment<T>(plant: &PlantRecord, distribution: Option<usize>, scored: T) -> Equipment<T> {
    Equipment {
        id: plant.id.clone(),
        scored,
        floor_area: plant.floor_area,
        fraction: plant.fraction_load,
        distribution,
    }
}

/// Distribution index referenced by each plant, validating references.
fn link_distributions(
    plants: &[&PlantRecord],
    distributions: &[DistributionRecord],
) -> TranslateResult<Vec<Option<usize>>> {
    let mut links: Vec<Option<usize>> = Vec::with_capacity(plants.len());
    for plant in plants {
        let dist_id = match plant.distribution.as_slice() {
            [] => {
                links.push(None);
                continue;
            }
            [one] => one,
            _ => {
                return Err(TranslateError::translation(format!(
                    "Each HVAC plant is only allowed to specify one duct system. {} references more than one.",
                    plant.id
                )))
            }
        };
        let Some(index) = distributions.iter().position(|d| &d.id == dist_id) else {
            return Err(TranslateError::translation(format!(
                "HVAC plant {} specifies an HPXML distribution system of {}, which does not exist.",
                plant.id, dist_id
            )));
        };
        if links.contains(&Some(index)) {
            return Err(TranslateError::translation(format!(
                "Each duct system is only allowed to serve one heating and one cooling system. {} serves \
                 more than one.",
                dist_id
            )));
        }
        links.push(Some(index));
    }
    Ok(links)
}

/// Floor area when every piece of equipment states it, otherwise the
/// fraction of load when every piece states that.
fn choose_weighting(heaters: &[Equipment<Heating>], coolers: &[Equipment<Cooling>]) -> TranslateResult<Weighting> {
    let weights = || {
        heaters
            .iter()
            .map(|e| (e.floor_area, e.fraction))
            .chain(coolers.iter().map(|e| (e.floor_area, e.fraction)))
    };
    if weights().all(|(area, _)| area.is_some()) {
        Ok(Weighting::FloorArea)
    } else if weights().all(|(_, fraction)| fraction.is_some()) {
        Ok(Weighting::FractionOfLoad)
    } else {
        Err(TranslateError::translation(
            "Every heating/cooling system needs to have either FloorAreaServed or \
             FracHeatLoadServed/FracCoolLoadServed.",
        ))
    }
}

/// Equipment that needs ducts must have a ducted distribution; equipment
/// that cannot use ducts must not.
fn check_ducts(
    id: &str,
    role: &str,
    requires_ducts: bool,
    distribution: Option<usize>,
    ducted: &dyn Fn(usize) -> bool,
) -> TranslateResult<()> {
    let has_ducts = distribution.map_or(false, ducted);
    if requires_ducts && !has_ducts {
        return Err(TranslateError::translation(format!(
            "{} system {} is not associated with an air distribution system.",
            role, id
        )));
    }
    if !requires_ducts && has_ducts {
        return Err(TranslateError::translation(format!(
            "Ducts are not allowed for {} system {}.",
            role.to_lowercase(),
            id
        )));
    }
    Ok(())
}
