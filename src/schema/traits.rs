//! Schema adapter trait: the contract each document version implements
//!
//! An adapter answers the handful of questions whose answer depends on
//! the document's major schema version: where an element lives, which
//! vocabulary a value uses, and which fallbacks apply. Everything else is
//! shared extraction in [`super::Extractor`].

use crate::document::Node;
use crate::error::TranslateResult;
use crate::hescore::{DuctLocation, FoundationType, RoofType, Zone};
use crate::model::{AtticKind, RValueSource};

/// Roof and floor zone types that survived zone assignment.
///
/// Duct location mapping consults these to pick a location the scoring
/// engine can actually model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentZones {
    pub foundations: Vec<FoundationType>,
    pub roofs: Vec<RoofType>,
}

impl PresentZones {
    pub fn from_zone(zone: &Zone) -> Self {
        Self {
            foundations: zone.zone_floor.iter().map(|f| f.foundation_type).collect(),
            roofs: zone.zone_roof.iter().map(|r| r.roof_type).collect(),
        }
    }

    /// Whether ducts at `location` have a zone to live in. Conditioned
    /// space always does.
    pub fn contains(&self, location: DuctLocation) -> bool {
        match location {
            DuctLocation::CondSpace => true,
            DuctLocation::UncondBasement => self.foundations.contains(&FoundationType::UncondBasement),
            DuctLocation::VentedCrawl => self.foundations.contains(&FoundationType::VentedCrawl),
            DuctLocation::UnventedCrawl => self.foundations.contains(&FoundationType::UnventedCrawl),
            DuctLocation::UncondAttic => self.roofs.contains(&RoofType::VentedAttic),
            DuctLocation::Outside => false,
        }
    }
}

/// The contract schema adapters implement.
///
/// Every method receives the element it is asked about plus, where the
/// schema links elements by reference, the enclosing `Building`.
pub trait SchemaAdapter: Send + Sync {
    /// Unique identifier for this adapter
    fn id(&self) -> &str;

    /// Major schema version this adapter reads (matched by the router)
    fn major_version(&self) -> u32;

    /// Walls that separate conditioned space from outside.
    fn exterior_walls<'a>(&self, building: &Node<'a>) -> Vec<Node<'a>>;

    fn attic_type(&self, attic: &Node<'_>, attic_id: &str) -> TranslateResult<AtticKind>;

    /// Knee walls bounding a vented attic.
    fn attic_knee_walls<'a>(&self, attic: &Node<'a>, building: &Node<'a>) -> TranslateResult<Vec<Node<'a>>>;

    /// Ceiling area (vented) or roof area (cathedral and conditioned).
    ///
    /// `Ok(None)` means no area was stated; the caller may fall back to the
    /// footprint area when this is the only attic.
    fn attic_area(
        &self,
        attic: &Node<'_>,
        kind: AtticKind,
        roofs: &[Node<'_>],
        building: &Node<'_>,
    ) -> TranslateResult<Option<f64>>;

    /// Insulation between the attic and conditioned space.
    fn attic_floor_insulation(&self, attic: &Node<'_>, building: &Node<'_>) -> TranslateResult<RValueSource>;

    /// Insulation of one roof deck above the attic.
    fn roof_insulation(&self, attic: &Node<'_>, roof: &Node<'_>) -> TranslateResult<RValueSource>;

    fn roof_area(&self, roof: &Node<'_>) -> TranslateResult<Option<f64>>;

    /// Larger of the slab area and the frame floor area of a foundation.
    fn foundation_area(&self, foundation: &Node<'_>, building: &Node<'_>) -> TranslateResult<f64>;

    fn foundation_walls<'a>(&self, foundation: &Node<'a>, building: &Node<'a>) -> Vec<Node<'a>>;

    fn foundation_slabs<'a>(&self, foundation: &Node<'a>, building: &Node<'a>) -> Vec<Node<'a>>;

    fn foundation_frame_floors<'a>(&self, foundation: &Node<'a>, building: &Node<'a>) -> Vec<Node<'a>>;

    /// Counts as double pane, including a single pane with a storm window.
    fn is_double_pane(&self, glazing: &Node<'_>, glass_layers: Option<&str>) -> bool;

    /// Single pane glazing with a low-e storm window.
    fn is_storm_low_e(&self, glazing: &Node<'_>, glass_layers: Option<&str>) -> bool;

    fn solar_screen(&self, glazing: &Node<'_>) -> bool;

    /// Canonical location for a duct location description, or `None` when
    /// the scoring engine has no comparable location.
    fn duct_location(&self, raw: &str, zones: &PresentZones) -> Option<DuctLocation>;

    /// The project is certified Home Performance with ENERGY STAR.
    fn hpwes_certified(&self, project: Option<&Node<'_>>, building: &Node<'_>) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditioned_space_is_always_present() {
        let zones = PresentZones::default();
        assert!(zones.contains(DuctLocation::CondSpace));
        assert!(!zones.contains(DuctLocation::UncondAttic));
    }

    #[test]
    fn unconditioned_attic_needs_a_vented_attic() {
        let zones = PresentZones {
            foundations: vec![FoundationType::SlabOnGrade],
            roofs: vec![RoofType::CathCeiling, RoofType::VentedAttic],
        };
        assert!(zones.contains(DuctLocation::UncondAttic));
        assert!(!zones.contains(DuctLocation::VentedCrawl));
    }
}
