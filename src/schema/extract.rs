//! Shared extraction of typed records from a building element.
//!
//! The extractor walks the parts of the document both schema versions
//! agree on and defers every version-specific question to the adapter.

use super::traits::SchemaAdapter;
use crate::document::Node;
use crate::error::{TranslateError, TranslateResult};
use crate::model::{
    AtticKind, AtticRecord, DistributionRecord, DuctRecord, EfficiencyRating, Facing, FoundationKind,
    FoundationRecord, FoundationWallRecord, FrameFloorRecord, GlazingRecord, InsulationLayer,
    KneeWallRecord, PlantRecord, RValueSource, Role, RoofRecord, SlabRecord, WallRecord,
};

/// Insulation described by the element at `path` below `element`.
///
/// A stated assembly-effective R-value wins over layers; a missing
/// insulation element reads as no layers.
pub(crate) fn insulation_at(element: &Node<'_>, path: &str) -> TranslateResult<RValueSource> {
    let Some(insulation) = element.find(path) else {
        return Ok(RValueSource::default());
    };
    if let Some(rvalue) = insulation.float_at("AssemblyEffectiveRValue")? {
        return Ok(RValueSource::Assembly(rvalue));
    }
    let layers = insulation
        .children("Layer")
        .iter()
        .map(|layer| {
            Ok(InsulationLayer {
                continuous: layer.text_at("InstallationType").as_deref() == Some("continuous"),
                rigid: layer.exists("InsulationMaterial/Rigid"),
                nominal_r: layer.float_at("NominalRValue")?,
            })
        })
        .collect::<TranslateResult<Vec<_>>>()?;
    Ok(RValueSource::Layers(layers))
}

fn facing(element: &Node<'_>) -> TranslateResult<Option<Facing>> {
    if let Some(azimuth) = element.float_at("Azimuth")? {
        return Ok(Some(Facing::Azimuth(azimuth)));
    }
    Ok(element.text_at("Orientation").map(Facing::Compass))
}

fn year(element: &Node<'_>) -> TranslateResult<Option<i32>> {
    for path in ["YearInstalled", "ModelYear"] {
        if let Some(year) = element.int_at(path)? {
            return i32::try_from(year)
                .map(Some)
                .map_err(|_| TranslateError::out_of_bounds(path, year));
        }
    }
    Ok(None)
}

fn efficiencies(element: &Node<'_>, names: &[&str]) -> TranslateResult<Vec<EfficiencyRating>> {
    let mut ratings = Vec::new();
    for name in names {
        for rating in element.children(name) {
            if let (Some(units), Some(value)) = (rating.text_at("Units"), rating.float_at("Value")?) {
                ratings.push(EfficiencyRating { units, value });
            }
        }
    }
    Ok(ratings)
}

/// Extracts records from one `Building` element through a schema adapter.
pub struct Extractor<'s, 'a> {
    adapter: &'s dyn SchemaAdapter,
    building: Node<'a>,
}

impl<'s, 'a> Extractor<'s, 'a> {
    pub fn new(adapter: &'s dyn SchemaAdapter, building: Node<'a>) -> Self {
        Self { adapter, building }
    }

    pub fn adapter(&self) -> &'s dyn SchemaAdapter {
        self.adapter
    }

    pub fn building(&self) -> &Node<'a> {
        &self.building
    }

    pub fn walls(&self) -> TranslateResult<Vec<WallRecord>> {
        self.adapter
            .exterior_walls(&self.building)
            .iter()
            .map(|wall| {
                Ok(WallRecord {
                    id: wall.require_id()?,
                    area: wall.float_at("Area")?,
                    facing: facing(wall)?,
                    wall_type: wall
                        .first_child_name("WallType")
                        .ok_or_else(|| wall.missing("WallType/*"))?
                        .to_string(),
                    siding: wall.text_at("Siding"),
                    polystyrene_sheathing: wall.flag_at("WallType/WoodStud/ExpandedPolystyreneSheathing")?
                        == Some(true),
                    optimum_value_engineering: wall.flag_at("WallType/WoodStud/OptimumValueEngineering")?
                        == Some(true),
                    insulation: insulation_at(wall, "Insulation")?,
                })
            })
            .collect()
    }

    fn glazing(&self, element: &Node<'_>, attachment: &str) -> TranslateResult<GlazingRecord> {
        let glass_layers = element.text_at("GlassLayers");
        Ok(GlazingRecord {
            id: element.id(),
            area: element.float_at("Area")?,
            facing: facing(element)?,
            attached_to: element.text_at(&format!("{}/@idref", attachment)),
            u_factor: element.float_at("UFactor")?,
            shgc: element.float_at("SHGC")?,
            solar_screen: self.adapter.solar_screen(element),
            frame: element.first_child_name("FrameType").map(str::to_string),
            thermal_break: element.flag_at("FrameType/*/ThermalBreak")? == Some(true),
            double_pane: self.adapter.is_double_pane(element, glass_layers.as_deref()),
            storm_low_e: self.adapter.is_storm_low_e(element, glass_layers.as_deref()),
            glass_layers,
            glass_type: element.text_at("GlassType"),
            gas_fill: element.text_at("GasFill"),
        })
    }

    pub fn windows(&self) -> TranslateResult<Vec<GlazingRecord>> {
        self.building
            .find_all("BuildingDetails/Enclosure/Windows/Window")
            .iter()
            .map(|w| self.glazing(w, "AttachedToWall"))
            .collect()
    }

    pub fn skylights(&self) -> TranslateResult<Vec<GlazingRecord>> {
        self.building
            .descendants("Skylight")
            .iter()
            .map(|s| self.glazing(s, "AttachedToRoof"))
            .collect()
    }

    pub fn attics(&self) -> TranslateResult<Vec<AtticRecord>> {
        let attics = self.building.find_all("//Attics/Attic");
        if attics.is_empty() {
            return Err(TranslateError::translation("There are no Attic elements in this building."));
        }
        let roofs = self.building.descendants("Roof");

        let mut records = Vec::with_capacity(attics.len());
        for attic in &attics {
            let id = attic.require_id()?;
            let mut roof_ids = attic.idrefs("AttachedToRoof");
            if roof_ids.is_empty() {
                match roofs.as_slice() {
                    [only] => roof_ids.push(only.require_id()?),
                    _ => {
                        return Err(TranslateError::translation(format!(
                            "Attic {} does not have a roof associated with it.",
                            id
                        )))
                    }
                }
            }
            let attached = roof_ids
                .iter()
                .map(|roof_id| {
                    roofs
                        .iter()
                        .find(|r| r.id().as_deref() == Some(roof_id.as_str()))
                        .cloned()
                        .ok_or_else(|| TranslateError::translation(format!("There is no roof with id: {}", roof_id)))
                })
                .collect::<TranslateResult<Vec<_>>>()?;

            let kind = self.adapter.attic_type(attic, &id)?;
            let area = self.adapter.attic_area(attic, kind, &attached, &self.building)?;

            let mut roof_records = Vec::with_capacity(attached.len());
            for roof in &attached {
                roof_records.push(RoofRecord {
                    id: roof.require_id()?,
                    area: self.adapter.roof_area(roof)?,
                    roof_type: roof.text_at("RoofType"),
                    color: roof.text_at("RoofColor"),
                    solar_absorptance: roof.float_at("SolarAbsorptance")?,
                    radiant_barrier: roof.flag_at("RadiantBarrier")? == Some(true),
                    insulation: self.adapter.roof_insulation(attic, roof)?,
                });
            }

            let mut knee_walls = Vec::new();
            if kind == AtticKind::VentedAttic {
                for wall in self.adapter.attic_knee_walls(attic, &self.building)? {
                    knee_walls.push(KneeWallRecord {
                        id: wall.require_id()?,
                        area: wall.require_float("Area")?,
                        insulation: insulation_at(&wall, "Insulation")?,
                    });
                }
            }

            records.push(AtticRecord {
                id,
                kind,
                roofs: roof_records,
                area,
                floor_insulation: self.adapter.attic_floor_insulation(attic, &self.building)?,
                knee_walls,
            });
        }
        Ok(records)
    }

    pub fn foundations(&self) -> TranslateResult<Vec<FoundationRecord>> {
        let mut records = Vec::new();
        for foundation in self.building.find_all("//Foundations/Foundation") {
            let variant = foundation
                .first_child_name("FoundationType")
                .ok_or_else(|| foundation.missing("FoundationType/*"))?;
            let kind = match variant {
                "Basement" => FoundationKind::Basement {
                    conditioned: foundation.is_true("FoundationType/Basement/Conditioned"),
                },
                "Crawlspace" => FoundationKind::Crawlspace {
                    vented: foundation.is_true("FoundationType/Crawlspace/Vented"),
                },
                "SlabOnGrade" => FoundationKind::SlabOnGrade,
                "Garage" => FoundationKind::Garage,
                "Ambient" => FoundationKind::Ambient,
                other => FoundationKind::Other(other.to_string()),
            };

            let walls = self
                .adapter
                .foundation_walls(&foundation, &self.building)
                .iter()
                .map(|wall| {
                    Ok(FoundationWallRecord {
                        id: wall.require_id()?,
                        area: wall.float_at("Area")?,
                        length: wall.float_at("Length")?,
                        height: wall.float_at("Height")?,
                        insulation: insulation_at(wall, "Insulation")?,
                    })
                })
                .collect::<TranslateResult<Vec<_>>>()?;

            let mut slabs = Vec::new();
            if kind == FoundationKind::SlabOnGrade {
                let nodes = self.adapter.foundation_slabs(&foundation, &self.building);
                if nodes.is_empty() {
                    return Err(foundation.missing("Slab"));
                }
                for slab in &nodes {
                    slabs.push(SlabRecord {
                        id: slab.require_id()?,
                        exposed_perimeter: slab.float_at("ExposedPerimeter")?,
                        perimeter_insulation: insulation_at(slab, "PerimeterInsulation")?,
                    });
                }
            }

            let frame_floors = self
                .adapter
                .foundation_frame_floors(&foundation, &self.building)
                .iter()
                .map(|floor| {
                    Ok(FrameFloorRecord {
                        id: floor.require_id()?,
                        area: floor.float_at("Area")?,
                        insulation: insulation_at(floor, "Insulation")?,
                    })
                })
                .collect::<TranslateResult<Vec<_>>>()?;

            records.push(FoundationRecord {
                id: foundation.id(),
                area: self.adapter.foundation_area(&foundation, &self.building)?,
                kind,
                walls,
                slabs,
                frame_floors,
            });
        }
        Ok(records)
    }

    /// Heating records from heating systems and heat pumps, in document order.
    pub fn heating_plants(&self) -> TranslateResult<Vec<PlantRecord>> {
        let mut plants = Vec::new();
        for plant in self.building.descendants("HVACPlant") {
            for system in plant.element_children() {
                let record = match system.name() {
                    "HeatingSystem" => {
                        let mut rec = self.plant(&system, Role::Heating, false)?;
                        rec.system_type = Some(
                            system
                                .first_child_name("HeatingSystemType")
                                .ok_or_else(|| system.missing("HeatingSystemType/*"))?
                                .to_string(),
                        );
                        rec.fuel = Some(system.require_text("HeatingSystemFuel")?);
                        rec.efficiencies =
                            efficiencies(&system, &["AnnualHeatingEfficiency", "AnnualHeatEfficiency"])?;
                        rec.capacity = system.float_at("HeatingCapacity")?;
                        rec.fraction_load = system.float_at("FractionHeatLoadServed")?;
                        rec
                    }
                    "HeatPump" => {
                        let mut rec = self.plant(&system, Role::Heating, true)?;
                        rec.system_type = system.text_at("HeatPumpType");
                        rec.efficiencies =
                            efficiencies(&system, &["AnnualHeatingEfficiency", "AnnualHeatEfficiency"])?;
                        rec.capacity = system.float_at("HeatingCapacity")?;
                        rec.capacity_17f = system.float_at("HeatingCapacity17F")?;
                        rec.fraction_load = system.float_at("FractionHeatLoadServed")?;
                        rec
                    }
                    _ => continue,
                };
                plants.push(record);
            }
        }
        Ok(plants)
    }

    /// Cooling records from cooling systems and heat pumps, in document order.
    pub fn cooling_plants(&self) -> TranslateResult<Vec<PlantRecord>> {
        let mut plants = Vec::new();
        for plant in self.building.descendants("HVACPlant") {
            for system in plant.element_children() {
                let mut rec = match system.name() {
                    "CoolingSystem" => {
                        let mut rec = self.plant(&system, Role::Cooling, false)?;
                        rec.system_type = Some(system.require_text("CoolingSystemType")?);
                        rec
                    }
                    "HeatPump" => {
                        let mut rec = self.plant(&system, Role::Cooling, true)?;
                        rec.system_type = system.text_at("HeatPumpType");
                        rec
                    }
                    _ => continue,
                };
                rec.efficiencies = efficiencies(&system, &["AnnualCoolingEfficiency", "AnnualCoolEfficiency"])?;
                rec.capacity = system.float_at("CoolingCapacity")?;
                rec.fraction_load = system.float_at("FractionCoolLoadServed")?;
                plants.push(rec);
            }
        }
        Ok(plants)
    }

    fn plant(&self, system: &Node<'_>, role: Role, heat_pump: bool) -> TranslateResult<PlantRecord> {
        let mut rec = PlantRecord::new(system.require_id()?, role);
        rec.heat_pump = heat_pump;
        rec.year = year(system)?;
        rec.floor_area = system.float_at("FloorAreaServed")?;
        rec.distribution = system.idrefs("DistributionSystem");
        Ok(rec)
    }

    pub fn distributions(&self) -> TranslateResult<Vec<DistributionRecord>> {
        let mut records = Vec::new();
        for dist in self.building.descendants("HVACDistribution") {
            let id = dist.require_id()?;
            let Some(air) = dist.find("DistributionSystemType/AirDistribution") else {
                records.push(DistributionRecord {
                    id,
                    ..Default::default()
                });
                continue;
            };

            let sealed = air
                .texts_at("DuctLeakageMeasurement/LeakinessObservedVisualInspection")
                .iter()
                .any(|t| t == "connections sealed w mastic")
                || dist.is_true("HVACDistributionImprovement/DuctSystemSealed");

            let mut ducts = Vec::new();
            for duct in air.children("Ducts") {
                let material_present = duct
                    .children("DuctInsulationMaterial")
                    .iter()
                    .any(|m| !m.exists("None"));
                ducts.push(DuctRecord {
                    location: duct.text_at("DuctLocation"),
                    fraction: duct.require_float("FractionDuctArea")?,
                    insulated: duct.float_at("DuctInsulationRValue")?.unwrap_or(0.0) > 0.0
                        || duct.float_at("DuctInsulationThickness")?.unwrap_or(0.0) > 0.0
                        || material_present,
                });
            }

            records.push(DistributionRecord {
                id,
                ducted: true,
                sealed,
                leakage_to_outside: leakage_to_outside(&air)?,
                ducts,
            });
        }
        Ok(records)
    }
}

/// Measured CFM25 leakage to outside: a whole-system measurement, or the
/// sum of supply and return measurements when both exist.
fn leakage_to_outside(air: &Node<'_>) -> TranslateResult<Option<f64>> {
    let mut whole = None;
    let mut supply = None;
    let mut ret = None;
    for measurement in air.children("DuctLeakageMeasurement") {
        let Some(leak) = measurement.children("DuctLeakage").into_iter().find(|l| {
            l.text_at("TotalOrToOutside").as_deref() == Some("to outside")
                && l.text_at("Units").as_deref() == Some("CFM25")
        }) else {
            continue;
        };
        let Some(value) = leak.float_at("Value")? else {
            continue;
        };
        let slot = match measurement.text_at("DuctType").as_deref() {
            None => &mut whole,
            Some("supply") => &mut supply,
            Some("return") => &mut ret,
            Some(_) => continue,
        };
        slot.get_or_insert(value);
    }
    Ok(whole.or(match (supply, ret) {
        (Some(s), Some(r)) => Some(s + r),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::schema::{V2Adapter, V3Adapter};
    use serde_json::json;

    #[test]
    fn insulation_prefers_assembly_rvalue() {
        let doc = Document::from_value(json!({"Wall": {"Insulation": {
            "AssemblyEffectiveRValue": 12.5,
            "Layer": {"NominalRValue": 13}
        }}}));
        let wall = doc.root().find("Wall").unwrap();
        assert_eq!(insulation_at(&wall, "Insulation").unwrap(), RValueSource::Assembly(12.5));
    }

    #[test]
    fn insulation_layers_keep_rigid_flags() {
        let doc = Document::from_value(json!({"Wall": {"Insulation": {"Layer": [
            {"InstallationType": "cavity", "NominalRValue": 3},
            {"InstallationType": "continuous", "NominalRValue": 5, "InsulationMaterial": {"Rigid": "eps"}}
        ]}}}));
        let wall = doc.root().find("Wall").unwrap();
        let source = insulation_at(&wall, "Insulation").unwrap();
        assert_eq!(source.nominal_sum(), Some(8.0));
        assert!(source.has_rigid_continuous());
        assert_eq!(insulation_at(&wall, "Missing").unwrap(), RValueSource::default());
    }

    #[test]
    fn walls_read_type_siding_and_facing() {
        let doc = Document::from_value(json!({"@schemaVersion": "3.0", "Building": {"BuildingDetails": {"Enclosure": {"Walls": {"Wall": {
            "SystemIdentifier": {"@id": "wall1"},
            "WallType": {"WoodStud": {"OptimumValueEngineering": true}},
            "Orientation": "south",
            "Area": 350,
            "Siding": "vinyl siding"
        }}}}}}));
        let building = doc.root().find("Building").unwrap();
        let walls = Extractor::new(&V3Adapter, building).walls().unwrap();
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].wall_type, "WoodStud");
        assert!(walls[0].optimum_value_engineering);
        assert_eq!(walls[0].facing, Some(Facing::Compass("south".into())));
        assert_eq!(walls[0].area, Some(350.0));
    }

    #[test]
    fn attic_without_roof_reference_uses_the_only_roof() {
        let doc = Document::from_value(json!({"Building": {"BuildingDetails": {"Enclosure": {"AtticAndRoof": {
            "Roofs": {"Roof": {"SystemIdentifier": {"@id": "roof1"}, "RoofArea": 900, "RoofColor": "dark"}},
            "Attics": {"Attic": {"SystemIdentifier": {"@id": "attic1"}, "AtticType": "vented attic", "Area": 800,
                "AtticFloorInsulation": {"Layer": {"NominalRValue": 30}}}}
        }}}}}));
        let building = doc.root().find("Building").unwrap();
        let attics = Extractor::new(&V2Adapter, building).attics().unwrap();
        assert_eq!(attics[0].roofs[0].id, "roof1");
        assert_eq!(attics[0].roofs[0].area, Some(900.0));
        assert_eq!(attics[0].area, Some(800.0));
        assert_eq!(attics[0].floor_insulation.nominal_sum(), Some(30.0));
    }

    #[test]
    fn missing_attics_fail() {
        let doc = Document::from_value(json!({"Building": {"BuildingDetails": {}}}));
        let building = doc.root().find("Building").unwrap();
        assert!(Extractor::new(&V2Adapter, building).attics().is_err());
    }

    #[test]
    fn slab_foundation_needs_a_slab() {
        let doc = Document::from_value(json!({"Building": {"BuildingDetails": {"Enclosure": {"Foundations": {"Foundation": {
            "FoundationType": {"SlabOnGrade": null}
        }}}}}}));
        let building = doc.root().find("Building").unwrap();
        let err = Extractor::new(&V2Adapter, building).foundations().unwrap_err();
        assert!(matches!(err, TranslateError::ElementNotFound { .. }));
    }

    #[test]
    fn heat_pumps_yield_one_record_per_role() {
        let doc = Document::from_value(json!({"Building": {"BuildingDetails": {"Systems": {"HVAC": {"HVACPlant": {
            "HeatPump": {
                "SystemIdentifier": {"@id": "hp1"},
                "HeatPumpType": "mini-split",
                "AnnualHeatingEfficiency": {"Units": "HSPF", "Value": 9.5},
                "AnnualCoolingEfficiency": {"Units": "SEER", "Value": 18},
                "FractionHeatLoadServed": 1.0,
                "FractionCoolLoadServed": 0.5
            },
            "HeatingSystem": {
                "SystemIdentifier": {"@id": "boiler1"},
                "HeatingSystemType": {"Boiler": null},
                "HeatingSystemFuel": "natural gas",
                "YearInstalled": 2001
            }
        }}}}}}));
        let building = doc.root().find("Building").unwrap();
        let extractor = Extractor::new(&V3Adapter, building);
        let heating = extractor.heating_plants().unwrap();
        let cooling = extractor.cooling_plants().unwrap();
        assert_eq!(heating.len(), 2);
        assert_eq!(heating[0].efficiencies[0].units, "HSPF");
        assert_eq!(heating[1].system_type.as_deref(), Some("Boiler"));
        assert_eq!(heating[1].year, Some(2001));
        assert_eq!(cooling.len(), 1);
        assert_eq!(cooling[0].fraction_load, Some(0.5));
        assert!(cooling[0].heat_pump);
    }

    #[test]
    fn furnace_efficiency_under_either_element_name() {
        let doc = Document::from_value(json!({"Building": {"HVACPlant": {"HeatingSystem": {
            "SystemIdentifier": {"@id": "furnace1"},
            "HeatingSystemType": {"Furnace": null},
            "HeatingSystemFuel": "natural gas",
            "AnnualHeatEfficiency": {"Units": "AFUE", "Value": 0.95}
        }}}}));
        let building = doc.root().find("Building").unwrap();
        let heating = Extractor::new(&V3Adapter, building).heating_plants().unwrap();
        assert_eq!(heating[0].efficiencies, vec![EfficiencyRating { units: "AFUE".into(), value: 0.95 }]);
    }

    #[test]
    fn duct_leakage_supply_plus_return() {
        let doc = Document::from_value(json!({"Building": {"HVACDistribution": {
            "SystemIdentifier": {"@id": "d1"},
            "DistributionSystemType": {"AirDistribution": {
                "DuctLeakageMeasurement": [
                    {"DuctType": "supply", "DuctLeakage": {"Units": "CFM25", "Value": 40, "TotalOrToOutside": "to outside"}},
                    {"DuctType": "return", "DuctLeakage": {"Units": "CFM25", "Value": 25, "TotalOrToOutside": "to outside"}}
                ],
                "Ducts": [
                    {"DuctLocation": "attic", "FractionDuctArea": 0.6, "DuctInsulationMaterial": {"None": null}},
                    {"DuctLocation": "living space", "FractionDuctArea": 0.4, "DuctInsulationRValue": 6}
                ]
            }}
        }}}));
        let building = doc.root().find("Building").unwrap();
        let dists = Extractor::new(&V3Adapter, building).distributions().unwrap();
        assert_eq!(dists[0].leakage_to_outside, Some(65.0));
        assert!(!dists[0].ducts[0].insulated);
        assert!(dists[0].ducts[1].insulated);
    }
}
