//! Adapter for 2.x documents.
//!
//! 2.x nests slabs, frame floors and foundation walls inside their
//! foundation and keeps roof deck insulation on the attic.

use super::extract::insulation_at;
use super::traits::{PresentZones, SchemaAdapter};
use crate::document::Node;
use crate::error::{TranslateError, TranslateResult};
use crate::hescore::DuctLocation;
use crate::model::{AtticKind, RValueSource};

#[derive(Debug, Clone, Copy, Default)]
pub struct V2Adapter;

impl V2Adapter {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaAdapter for V2Adapter {
    fn id(&self) -> &str {
        "hpxml-2"
    }

    fn major_version(&self) -> u32 {
        2
    }

    fn exterior_walls<'a>(&self, building: &Node<'a>) -> Vec<Node<'a>> {
        building
            .find_all("BuildingDetails/Enclosure/Walls/Wall")
            .into_iter()
            .filter(|wall| {
                let exterior = wall.text_at("ExteriorAdjacentTo");
                let interior = wall.text_at("InteriorAdjacentTo").unwrap_or_default();
                matches!(exterior.as_deref(), None | Some("ambient")) && !interior.contains("attic")
            })
            .collect()
    }

    fn attic_type(&self, attic: &Node<'_>, attic_id: &str) -> TranslateResult<AtticKind> {
        let raw = attic.text_at("AtticType");
        match raw.as_deref() {
            Some("cape cod") | Some("cathedral ceiling") | Some("flat roof") => Ok(AtticKind::CathedralCeiling),
            Some("unvented attic") | Some("vented attic") | Some("venting unknown attic") => {
                Ok(AtticKind::VentedAttic)
            }
            other => Err(TranslateError::translation(format!(
                "Attic {}: Cannot translate HPXML AtticType {} to HEScore rooftype.",
                attic_id,
                other.unwrap_or("(missing)")
            ))),
        }
    }

    fn attic_knee_walls<'a>(&self, attic: &Node<'a>, building: &Node<'a>) -> TranslateResult<Vec<Node<'a>>> {
        let walls = building.descendants("Wall");
        attic
            .idrefs("AtticKneeWall")
            .into_iter()
            .map(|idref| {
                walls
                    .iter()
                    .find(|wall| wall.id().as_deref() == Some(idref.as_str()))
                    .cloned()
                    .ok_or_else(|| {
                        building.missing(&format!("BuildingDetails//Wall[SystemIdentifier/@id=\"{}\"]", idref))
                    })
            })
            .collect()
    }

    fn attic_area(
        &self,
        attic: &Node<'_>,
        kind: AtticKind,
        roofs: &[Node<'_>],
        _building: &Node<'_>,
    ) -> TranslateResult<Option<f64>> {
        match kind {
            AtticKind::VentedAttic => attic.float_at("Area"),
            AtticKind::CathedralCeiling | AtticKind::ConditionedAttic => {
                let areas = roofs
                    .iter()
                    .map(|roof| self.roof_area(roof))
                    .collect::<TranslateResult<Vec<_>>>()?;
                sum_areas(areas, "Roof")
            }
        }
    }

    fn attic_floor_insulation(&self, attic: &Node<'_>, _building: &Node<'_>) -> TranslateResult<RValueSource> {
        insulation_at(attic, "AtticFloorInsulation")
    }

    fn roof_insulation(&self, attic: &Node<'_>, _roof: &Node<'_>) -> TranslateResult<RValueSource> {
        insulation_at(attic, "AtticRoofInsulation")
    }

    fn roof_area(&self, roof: &Node<'_>) -> TranslateResult<Option<f64>> {
        roof.float_at("RoofArea")
    }

    fn foundation_area(&self, foundation: &Node<'_>, _building: &Node<'_>) -> TranslateResult<f64> {
        Ok(foundation.sum_at("Slab/Area")?.max(foundation.sum_at("FrameFloor/Area")?))
    }

    fn foundation_walls<'a>(&self, foundation: &Node<'a>, _building: &Node<'a>) -> Vec<Node<'a>> {
        foundation.children("FoundationWall")
    }

    fn foundation_slabs<'a>(&self, foundation: &Node<'a>, _building: &Node<'a>) -> Vec<Node<'a>> {
        foundation.children("Slab")
    }

    fn foundation_frame_floors<'a>(&self, foundation: &Node<'a>, _building: &Node<'a>) -> Vec<Node<'a>> {
        foundation.children("FrameFloor")
    }

    fn is_double_pane(&self, _glazing: &Node<'_>, glass_layers: Option<&str>) -> bool {
        matches!(
            glass_layers,
            Some("double-pane") | Some("single-paned with storms") | Some("single-paned with low-e storms")
        )
    }

    fn is_storm_low_e(&self, _glazing: &Node<'_>, glass_layers: Option<&str>) -> bool {
        glass_layers == Some("single-paned with low-e storms")
    }

    fn solar_screen(&self, glazing: &Node<'_>) -> bool {
        glazing.text_at("Treatments").as_deref() == Some("solar screen")
            || glazing.text_at("ExteriorShading").as_deref() == Some("solar screens")
    }

    fn duct_location(&self, raw: &str, _zones: &PresentZones) -> Option<DuctLocation> {
        match raw {
            "conditioned space" => Some(DuctLocation::CondSpace),
            "unconditioned basement" => Some(DuctLocation::UncondBasement),
            "unvented crawlspace" => Some(DuctLocation::UnventedCrawl),
            "vented crawlspace" => Some(DuctLocation::VentedCrawl),
            "unconditioned attic" => Some(DuctLocation::UncondAttic),
            "garage" => Some(DuctLocation::VentedCrawl),
            "outside" => Some(DuctLocation::Outside),
            _ => None,
        }
    }

    fn hpwes_certified(&self, project: Option<&Node<'_>>, _building: &Node<'_>) -> bool {
        project.map_or(false, |p| {
            p.texts_at("ProjectDetails/ProgramCertificate")
                .iter()
                .any(|c| c == "Home Performance with Energy Star")
        })
    }
}

/// Total of stated areas. A lone element may omit its area; with several,
/// every one needs it.
pub(crate) fn sum_areas(areas: Vec<Option<f64>>, element: &str) -> TranslateResult<Option<f64>> {
    match areas.as_slice() {
        [] => Ok(None),
        [single] => Ok(*single),
        many => many
            .iter()
            .map(|a| {
                a.ok_or_else(|| {
                    TranslateError::translation(format!(
                        "If there are more than one {} elements attached to attic, each needs an area.",
                        element
                    ))
                })
            })
            .sum::<TranslateResult<f64>>()
            .map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    fn building(doc: &Document) -> Node<'_> {
        doc.root().find("Building").unwrap()
    }

    #[test]
    fn exterior_walls_skip_attic_and_garage_walls() {
        let doc = Document::from_value(json!({
            "@schemaVersion": "2.3",
            "Building": {"BuildingDetails": {"Enclosure": {"Walls": {"Wall": [
                {"SystemIdentifier": {"@id": "w1"}, "ExteriorAdjacentTo": "ambient"},
                {"SystemIdentifier": {"@id": "w2"}},
                {"SystemIdentifier": {"@id": "w3"}, "ExteriorAdjacentTo": "garage"},
                {"SystemIdentifier": {"@id": "w4"}, "InteriorAdjacentTo": "attic"}
            ]}}}}
        }));
        let ids: Vec<String> = V2Adapter
            .exterior_walls(&building(&doc))
            .iter()
            .filter_map(|w| w.id())
            .collect();
        assert_eq!(ids, vec!["w1", "w2"]);
    }

    #[test]
    fn attic_type_vocabulary() {
        let doc = Document::from_value(json!({"Attic": {"AtticType": "venting unknown attic"}}));
        let attic = doc.root().find("Attic").unwrap();
        assert_eq!(V2Adapter.attic_type(&attic, "a1").unwrap(), AtticKind::VentedAttic);

        let doc = Document::from_value(json!({"Attic": {"AtticType": "other"}}));
        let attic = doc.root().find("Attic").unwrap();
        let err = V2Adapter.attic_type(&attic, "a1").unwrap_err();
        assert!(err.to_string().contains("Cannot translate HPXML AtticType other"));
    }

    #[test]
    fn foundation_area_is_larger_of_slab_and_floor() {
        let doc = Document::from_value(json!({"Foundation": {
            "Slab": [{"Area": 600}, {"Area": 300}],
            "FrameFloor": {"Area": 800}
        }}));
        let foundation = doc.root().find("Foundation").unwrap();
        assert_eq!(V2Adapter.foundation_area(&foundation, &doc.root()).unwrap(), 900.0);
    }

    #[test]
    fn storm_windows_count_as_double_pane() {
        let doc = Document::from_value(json!({"Window": {}}));
        let window = doc.root().find("Window").unwrap();
        assert!(V2Adapter.is_double_pane(&window, Some("single-paned with storms")));
        assert!(!V2Adapter.is_storm_low_e(&window, Some("single-paned with storms")));
        assert!(V2Adapter.is_storm_low_e(&window, Some("single-paned with low-e storms")));
        assert!(!V2Adapter.is_double_pane(&window, Some("single-pane")));
    }

    #[test]
    fn duct_locations_are_a_static_table() {
        let zones = PresentZones::default();
        assert_eq!(V2Adapter.duct_location("garage", &zones), Some(DuctLocation::VentedCrawl));
        assert_eq!(V2Adapter.duct_location("crawlspace", &zones), None);
        assert_eq!(V2Adapter.duct_location("unconditioned attic", &zones), Some(DuctLocation::UncondAttic));
    }

    #[test]
    fn several_roofs_each_need_an_area() {
        assert_eq!(sum_areas(vec![None], "Roof").unwrap(), None);
        assert_eq!(sum_areas(vec![Some(1.0), Some(2.5)], "Roof").unwrap(), Some(3.5));
        assert!(sum_areas(vec![Some(1.0), None], "Roof").is_err());
    }
}
