//! Duct distribution systems.

use crate::error::{TranslateError, TranslateResult};
use crate::hescore::{Duct, DuctLocation, HvacDistribution, LeakageMethod};
use crate::model::DistributionRecord;
use crate::schema::{PresentZones, SchemaAdapter};
use tracing::{debug, warn};

/// Ducts kept per distribution system.
pub const MAX_DUCTS: usize = 3;

/// Scored distribution of a ducted system; `None` for hydronic and other
/// non-air distribution.
///
/// Duct fractions are accumulated per canonical location and
/// renormalized, and only the largest [`MAX_DUCTS`] locations are kept.
pub fn distribution(
    record: &DistributionRecord,
    adapter: &dyn SchemaAdapter,
    zones: &PresentZones,
) -> TranslateResult<Option<HvacDistribution>> {
    if !record.ducted {
        return Ok(None);
    }

    let (leakage_method, leakage_to_outside, sealed) = match record.leakage_to_outside {
        Some(cfm25) => (LeakageMethod::Quantitative, Some(cfm25), None),
        None => (LeakageMethod::Qualitative, None, Some(record.sealed)),
    };

    // (location, fraction, insulated) in first-seen order
    let mut by_location: Vec<(DuctLocation, f64, bool)> = Vec::new();
    for duct in &record.ducts {
        let raw = duct.location.as_deref();
        let location = raw
            .and_then(|raw| adapter.duct_location(raw, zones))
            .ok_or_else(|| {
                TranslateError::translation(format!(
                    "No comparable duct location in HEScore: {}",
                    raw.unwrap_or("None")
                ))
            })?;
        match by_location.iter_mut().find(|(loc, _, _)| *loc == location) {
            Some(entry) => {
                entry.1 += duct.fraction;
                entry.2 |= duct.insulated;
            }
            None => by_location.push((location, duct.fraction, duct.insulated)),
        }
    }

    let total: f64 = by_location.iter().map(|(_, f, _)| f).sum();
    if by_location.is_empty() || total <= 0.0 {
        return Err(TranslateError::translation(format!(
            "The air distribution system {} needs at least one duct with a FractionDuctArea.",
            record.id
        )));
    }
    for entry in &mut by_location {
        entry.1 /= total;
    }

    // largest first; equal fractions order by location name, descending
    by_location.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then_with(|| b.0.to_string().cmp(&a.0.to_string()))
    });
    if by_location.len() > MAX_DUCTS {
        warn!(
            distribution = %record.id,
            dropped = by_location.len() - MAX_DUCTS,
            "keeping the three largest duct locations"
        );
        by_location.truncate(MAX_DUCTS);
    }

    let kept: f64 = by_location.iter().map(|(_, f, _)| f).sum();
    let mut duct: Vec<Duct> = by_location
        .into_iter()
        .enumerate()
        .map(|(i, (location, fraction, insulated))| Duct {
            name: format!("duct{}", i + 1),
            location,
            fraction: fraction / kept,
            insulated,
        })
        .collect();
    let remainder = 1.0 - duct.iter().map(|d| d.fraction).sum::<f64>();
    if let Some(first) = duct.first_mut() {
        first.fraction += remainder;
    }
    debug!(distribution = %record.id, ducts = duct.len(), "resolved duct locations");

    Ok(Some(HvacDistribution {
        leakage_method,
        leakage_to_outside,
        sealed,
        duct,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hescore::{FoundationType, RoofType};
    use crate::model::DuctRecord;
    use crate::schema::{V2Adapter, V3Adapter};
    use proptest::prelude::*;

    fn duct(location: &str, fraction: f64, insulated: bool) -> DuctRecord {
        DuctRecord {
            location: Some(location.into()),
            fraction,
            insulated,
        }
    }

    fn ducted(ducts: Vec<DuctRecord>) -> DistributionRecord {
        DistributionRecord {
            id: "dist1".into(),
            ducted: true,
            ducts,
            ..Default::default()
        }
    }

    #[test]
    fn hydronic_distribution_has_no_ducts() {
        let record = DistributionRecord {
            id: "hydronic".into(),
            ..Default::default()
        };
        let zones = PresentZones::default();
        assert_eq!(distribution(&record, &V2Adapter, &zones).unwrap(), None);
    }

    #[test]
    fn supply_and_return_fractions_merge_by_location() {
        let record = ducted(vec![
            duct("unconditioned attic", 0.3, true),
            duct("conditioned space", 0.2, false),
            duct("unconditioned attic", 0.3, false),
            duct("conditioned space", 0.2, false),
        ]);
        let zones = PresentZones::default();
        let dist = distribution(&record, &V2Adapter, &zones).unwrap().unwrap();
        assert_eq!(dist.leakage_method, LeakageMethod::Qualitative);
        assert_eq!(dist.sealed, Some(false));
        assert_eq!(dist.duct.len(), 2);
        assert_eq!(dist.duct[0].location, DuctLocation::UncondAttic);
        assert!((dist.duct[0].fraction - 0.6).abs() < 1e-12);
        assert!(dist.duct[0].insulated);
        assert!(!dist.duct[1].insulated);
    }

    #[test]
    fn measured_leakage_is_quantitative() {
        let mut record = ducted(vec![duct("conditioned space", 1.0, false)]);
        record.leakage_to_outside = Some(65.0);
        record.sealed = true;
        let dist = distribution(&record, &V2Adapter, &PresentZones::default())
            .unwrap()
            .unwrap();
        assert_eq!(dist.leakage_method, LeakageMethod::Quantitative);
        assert_eq!(dist.leakage_to_outside, Some(65.0));
        assert_eq!(dist.sealed, None);
    }

    #[test]
    fn unknown_location_fails() {
        let record = ducted(vec![duct("interstitial space", 1.0, false)]);
        let err = distribution(&record, &V2Adapter, &PresentZones::default()).unwrap_err();
        assert_eq!(err.to_string(), "No comparable duct location in HEScore: interstitial space");
    }

    #[test]
    fn unmatched_zone_falls_back_to_first_hierarchy_entry() {
        let zones = PresentZones {
            foundations: vec![FoundationType::SlabOnGrade],
            roofs: vec![RoofType::CathCeiling],
        };
        let record = ducted(vec![duct("unconditioned space", 1.0, true)]);
        let dist = distribution(&record, &V3Adapter, &zones).unwrap().unwrap();
        assert_eq!(dist.duct[0].location, DuctLocation::UncondBasement);
    }

    #[test]
    fn only_three_locations_survive() {
        let record = ducted(vec![
            duct("conditioned space", 0.4, false),
            duct("unconditioned attic", 0.3, false),
            duct("vented crawlspace", 0.2, false),
            duct("unconditioned basement", 0.1, false),
        ]);
        let dist = distribution(&record, &V2Adapter, &PresentZones::default())
            .unwrap()
            .unwrap();
        let names: Vec<&str> = dist.duct.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["duct1", "duct2", "duct3"]);
        assert_eq!(dist.duct[2].location, DuctLocation::VentedCrawl);
        let total: f64 = dist.duct.iter().map(|d| d.fraction).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ducted_system_without_ducts_fails() {
        assert!(distribution(&ducted(Vec::new()), &V2Adapter, &PresentZones::default()).is_err());
    }

    const LOCATIONS: [&str; 6] = [
        "conditioned space",
        "unconditioned basement",
        "unvented crawlspace",
        "vented crawlspace",
        "unconditioned attic",
        "outside",
    ];

    proptest! {
        #[test]
        fn duct_fractions_sum_to_one(
            ducts in prop::collection::vec((0usize..6, 0.01f64..1.0, any::<bool>()), 1..10)
        ) {
            let record = ducted(
                ducts
                    .into_iter()
                    .map(|(loc, fraction, insulated)| duct(LOCATIONS[loc], fraction, insulated))
                    .collect(),
            );
            let dist = distribution(&record, &V2Adapter, &PresentZones::default()).unwrap().unwrap();
            prop_assert!(dist.duct.len() <= MAX_DUCTS);
            let total: f64 = dist.duct.iter().map(|d| d.fraction).sum();
            prop_assert!((total - 1.0).abs() < 1e-6);
        }
    }
}
