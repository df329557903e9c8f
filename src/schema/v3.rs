//! Adapter for 3.x documents.
//!
//! 3.x keeps slabs, frame floors, foundation walls and knee walls as
//! building-level enclosure elements linked by `AttachedTo*` references,
//! and moves roof deck insulation onto the roof itself.

use super::extract::insulation_at;
use super::traits::{PresentZones, SchemaAdapter};
use super::v2::sum_areas;
use crate::document::Node;
use crate::error::{TranslateError, TranslateResult};
use crate::hescore::DuctLocation;
use crate::model::{AtticKind, InsulationLayer, RValueSource};

use DuctLocation::*;

#[derive(Debug, Clone, Copy, Default)]
pub struct V3Adapter;

impl V3Adapter {
    pub fn new() -> Self {
        Self
    }

    /// Candidate locations for a duct location description, most general
    /// first. `None` for descriptions with no comparable location.
    fn location_hierarchy(raw: &str) -> Option<&'static [DuctLocation]> {
        Some(match raw {
            "living space" => &[CondSpace],
            "unconditioned space" => &[UncondBasement, VentedCrawl, UnventedCrawl, UncondAttic],
            "under slab" => &[VentedCrawl],
            "basement" => &[UncondBasement, CondSpace],
            "basement - unconditioned" => &[UncondBasement],
            "basement - conditioned" => &[CondSpace],
            "crawlspace - unvented" => &[UnventedCrawl],
            "crawlspace - vented" => &[VentedCrawl],
            "crawlspace - unconditioned" => &[VentedCrawl, UnventedCrawl],
            "crawlspace - conditioned" => &[CondSpace],
            "crawlspace" => &[VentedCrawl, UnventedCrawl, CondSpace],
            "garage - conditioned" => &[CondSpace],
            "garage - unconditioned" | "garage" => &[UnventedCrawl],
            "roof deck" | "outside" => &[VentedCrawl],
            "attic" => &[UncondAttic, CondSpace],
            "attic - unconditioned" | "attic - unvented" | "attic - vented" => &[UncondAttic],
            _ => return None,
        })
    }

    /// Building elements named `element` whose id is referenced by the
    /// `reference` children of `owner`.
    fn attached<'a>(owner: &Node<'a>, reference: &str, building: &Node<'a>, element: &str) -> Vec<Node<'a>> {
        let ids = owner.idrefs(reference);
        if ids.is_empty() {
            return Vec::new();
        }
        building
            .descendants(element)
            .into_iter()
            .filter(|node| node.id().map_or(false, |id| ids.contains(&id)))
            .collect()
    }

    fn attic_floors<'a>(attic: &Node<'a>, building: &Node<'a>) -> Vec<Node<'a>> {
        Self::attached(attic, "AttachedToFrameFloor", building, "FrameFloor")
    }
}

impl SchemaAdapter for V3Adapter {
    fn id(&self) -> &str {
        "hpxml-3"
    }

    fn major_version(&self) -> u32 {
        3
    }

    fn exterior_walls<'a>(&self, building: &Node<'a>) -> Vec<Node<'a>> {
        building
            .find_all("BuildingDetails/Enclosure/Walls/Wall")
            .into_iter()
            .filter(|wall| matches!(wall.text_at("ExteriorAdjacentTo").as_deref(), None | Some("outside")))
            .collect()
    }

    fn attic_type(&self, attic: &Node<'_>, attic_id: &str) -> TranslateResult<AtticKind> {
        if attic.exists("AtticType/Attic/CapeCod")
            || attic.exists("AtticType/FlatRoof")
            || attic.exists("AtticType/CathedralCeiling")
        {
            Ok(AtticKind::CathedralCeiling)
        } else if attic.is_true("AtticType/Attic/Conditioned") {
            Ok(AtticKind::ConditionedAttic)
        } else if attic.exists("AtticType/Attic") {
            Ok(AtticKind::VentedAttic)
        } else {
            Err(TranslateError::translation(format!(
                "Attic {}: Cannot translate HPXML AtticType to HEScore rooftype.",
                attic_id
            )))
        }
    }

    fn attic_knee_walls<'a>(&self, attic: &Node<'a>, building: &Node<'a>) -> TranslateResult<Vec<Node<'a>>> {
        Ok(Self::attached(attic, "AttachedToWall", building, "Wall")
            .into_iter()
            .filter(|wall| wall.text_at("AtticWallType").as_deref() == Some("knee wall"))
            .collect())
    }

    fn attic_area(
        &self,
        attic: &Node<'_>,
        _kind: AtticKind,
        roofs: &[Node<'_>],
        building: &Node<'_>,
    ) -> TranslateResult<Option<f64>> {
        let floors = Self::attic_floors(attic, building);
        if !floors.is_empty() {
            let areas = floors
                .iter()
                .map(|f| f.float_at("Area"))
                .collect::<TranslateResult<Vec<_>>>()?;
            return sum_areas(areas, "FrameFloor");
        }
        let areas = roofs
            .iter()
            .map(|r| self.roof_area(r))
            .collect::<TranslateResult<Vec<_>>>()?;
        sum_areas(areas, "Roof")
    }

    /// One attached floor keeps its own insulation; several are blended by
    /// area into a single nominal layer.
    fn attic_floor_insulation(&self, attic: &Node<'_>, building: &Node<'_>) -> TranslateResult<RValueSource> {
        let floors = Self::attic_floors(attic, building);
        match floors.as_slice() {
            [] => Ok(RValueSource::default()),
            [single] => insulation_at(single, "Insulation"),
            many => {
                let mut area_total = 0.0;
                let mut conductance = 0.0;
                for floor in many {
                    let id = floor.require_id()?;
                    let area = floor.float_at("Area")?.ok_or_else(|| {
                        TranslateError::translation(
                            "If there are more than one FrameFloor elements attached to attic, each needs an area.",
                        )
                    })?;
                    let rvalue = insulation_at(floor, "Insulation")?.nominal_sum().ok_or_else(|| {
                        TranslateError::MissingRValue {
                            construction: "attic floor".into(),
                            id,
                        }
                    })?;
                    area_total += area;
                    conductance += area / rvalue;
                }
                let blended = if conductance.is_finite() && conductance > 0.0 {
                    area_total / conductance
                } else {
                    0.0
                };
                Ok(RValueSource::Layers(vec![InsulationLayer::cavity(blended)]))
            }
        }
    }

    fn roof_insulation(&self, _attic: &Node<'_>, roof: &Node<'_>) -> TranslateResult<RValueSource> {
        insulation_at(roof, "Insulation")
    }

    fn roof_area(&self, roof: &Node<'_>) -> TranslateResult<Option<f64>> {
        roof.float_at("Area")
    }

    fn foundation_area(&self, foundation: &Node<'_>, building: &Node<'_>) -> TranslateResult<f64> {
        let mut largest: f64 = 0.0;
        for (reference, element) in [("AttachedToSlab", "Slab"), ("AttachedToFrameFloor", "FrameFloor")] {
            let mut total = 0.0;
            for node in Self::attached(foundation, reference, building, element) {
                total += node.float_at("Area")?.unwrap_or(0.0);
            }
            largest = largest.max(total);
        }
        Ok(largest)
    }

    fn foundation_walls<'a>(&self, foundation: &Node<'a>, building: &Node<'a>) -> Vec<Node<'a>> {
        Self::attached(foundation, "AttachedToFoundationWall", building, "FoundationWall")
    }

    fn foundation_slabs<'a>(&self, foundation: &Node<'a>, building: &Node<'a>) -> Vec<Node<'a>> {
        Self::attached(foundation, "AttachedToSlab", building, "Slab")
    }

    fn foundation_frame_floors<'a>(&self, foundation: &Node<'a>, building: &Node<'a>) -> Vec<Node<'a>> {
        Self::attached(foundation, "AttachedToFrameFloor", building, "FrameFloor")
    }

    fn is_double_pane(&self, glazing: &Node<'_>, glass_layers: Option<&str>) -> bool {
        (glazing.exists("StormWindow") && glass_layers == Some("single-pane")) || glass_layers == Some("double-pane")
    }

    fn is_storm_low_e(&self, glazing: &Node<'_>, glass_layers: Option<&str>) -> bool {
        glazing.text_at("StormWindow/GlassType").as_deref() == Some("low-e") && glass_layers == Some("single-pane")
    }

    fn solar_screen(&self, glazing: &Node<'_>) -> bool {
        glazing.text_at("ExteriorShading/Type").as_deref() == Some("solar screens")
    }

    /// First hierarchy entry with a zone to live in, else the most general
    /// entry; the bounds validator reports a location without a zone.
    fn duct_location(&self, raw: &str, zones: &PresentZones) -> Option<DuctLocation> {
        let hierarchy = Self::location_hierarchy(raw)?;
        hierarchy
            .iter()
            .copied()
            .find(|loc| zones.contains(*loc))
            .or_else(|| hierarchy.first().copied())
    }

    fn hpwes_certified(&self, _project: Option<&Node<'_>>, building: &Node<'_>) -> bool {
        building
            .texts_at("BuildingDetails/GreenBuildingVerifications/GreenBuildingVerification/Type")
            .iter()
            .any(|t| t == "Home Performance with ENERGY STAR")
    }
}
