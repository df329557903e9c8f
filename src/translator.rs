//! Translation pipeline.
//!
//! `Translator` owns the lookup tables, the schema router and the output
//! validator, and runs one document through extraction, zone assignment,
//! HVAC resolution and validation. Nothing is cached between calls.

use crate::building;
use crate::document::{Document, Node};
use crate::error::TranslateResult;
use crate::hescore::{Building, HescoreInputs, Systems, Zone};
use crate::hvac::HvacResolver;
use crate::resolve::AssemblyCodeResolver;
use crate::schema::{Extractor, PresentZones, SchemaRouter};
use crate::tables::AssemblyTables;
use crate::validate::{BoundsValidator, OutputValidator};
use crate::zone::{footprint_area, ZoneAssigner};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info};

/// Which building, project and contractor to translate when a document
/// holds more than one of each. Unset selectors pick the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    pub building_id: Option<String>,
    pub project_id: Option<String>,
    pub contractor_id: Option<String>,
}

impl TranslateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_building_id(mut self, id: impl Into<String>) -> Self {
        self.building_id = Some(id.into());
        self
    }

    pub fn with_project_id(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    pub fn with_contractor_id(mut self, id: impl Into<String>) -> Self {
        self.contractor_id = Some(id.into());
        self
    }
}

/// The elements one translation reads from.
struct Selection<'a> {
    building: Node<'a>,
    project: Option<Node<'a>>,
    contractor: Option<Node<'a>>,
}

fn select<'a>(root: &Node<'a>, options: &TranslateOptions) -> TranslateResult<Selection<'a>> {
    let buildings = root.children("Building");
    let building = match &options.building_id {
        Some(id) => buildings
            .into_iter()
            .find(|b| b.text_at("BuildingID/@id").as_deref() == Some(id.as_str()))
            .ok_or_else(|| root.missing(&format!("Building[BuildingID/@id=\"{}\"]", id)))?,
        None => buildings.into_iter().next().ok_or_else(|| root.missing("Building"))?,
    };

    let projects = root.children("Project");
    let project = match &options.project_id {
        Some(id) => Some(
            projects
                .into_iter()
                .find(|p| p.text_at("ProjectID/@id").as_deref() == Some(id.as_str()))
                .ok_or_else(|| root.missing(&format!("Project[ProjectID/@id=\"{}\"]", id)))?,
        ),
        None => projects.into_iter().next(),
    };

    let contractors = root.children("Contractor");
    let contractor_id = |c: &Node<'_>| c.text_at("ContractorDetails/SystemIdentifier/@id");
    let contractor = match &options.contractor_id {
        Some(id) => Some(
            contractors
                .into_iter()
                .find(|c| contractor_id(c).as_deref() == Some(id.as_str()))
                .ok_or_else(|| {
                    root.missing(&format!("Contractor[ContractorDetails/SystemIdentifier/@id=\"{}\"]", id))
                })?,
        ),
        None => {
            // the building's own contractor, else the first one
            let wanted = building.text_at("ContractorID/@id");
            let position = wanted
                .and_then(|id| contractors.iter().position(|c| contractor_id(c).as_deref() == Some(id.as_str())))
                .unwrap_or(0);
            contractors.into_iter().nth(position)
        }
    };

    Ok(Selection {
        building,
        project,
        contractor,
    })
}

/// Translates documents into scoring inputs.
pub struct Translator {
    tables: AssemblyTables,
    router: SchemaRouter,
    validator: Arc<dyn OutputValidator>,
    today: Option<NaiveDate>,
}

impl Translator {
    /// A translator with the built-in schema adapters and bounds checks.
    pub fn new(tables: AssemblyTables) -> Self {
        Self {
            tables,
            router: SchemaRouter::default(),
            validator: Arc::new(BoundsValidator::new()),
            today: None,
        }
    }

    pub fn with_router(mut self, router: SchemaRouter) -> Self {
        self.router = router;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn OutputValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Pin the date used when the document states no assessment date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn tables(&self) -> &AssemblyTables {
        &self.tables
    }

    pub fn translate(&self, document: &Document, options: &TranslateOptions) -> TranslateResult<HescoreInputs> {
        let version = document.schema_version()?;
        let adapter = self.router.adapter_for(&version)?;
        let root = document.root();
        let Selection {
            building,
            project,
            contractor,
        } = select(&root, options)?;
        info!(version = %version, adapter = adapter.id(), "translating building");

        let building_address = building::address(&root, &building)?;
        let hpwes = if adapter.hpwes_certified(project.as_ref(), &building) {
            Some(building::hpwes(project.as_ref(), contractor.as_ref())?)
        } else {
            None
        };

        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let mut about = building::about(&building, project.as_ref(), today)?;
        let front = building::front_azimuth(&building)?;

        let extractor = Extractor::new(adapter.as_ref(), building.clone());
        let zones = ZoneAssigner::new(AssemblyCodeResolver::new(&self.tables));

        let cfa = about.conditioned_floor_area as f64;
        let stories = about.num_floor_above_grade;
        let zone_floor = zones.floors(&extractor.foundations()?, cfa, stories)?;
        let footprint = footprint_area(cfa, stories, &zone_floor);
        debug!(footprint, floors = zone_floor.len(), "resolved floor zones");
        let zone_roof = zones.roofs(&extractor.attics()?, &extractor.skylights()?, footprint)?;
        let walls = zones.walls(
            &extractor.walls()?,
            &extractor.windows()?,
            front,
            about.shape,
            about.town_house_walls,
        )?;
        about.town_house_walls = walls.town_house_walls;

        let zone = Zone {
            zone_roof,
            zone_floor,
            wall_construction_same: false,
            window_construction_same: false,
            zone_wall: walls.zones,
        };

        let present = PresentZones::from_zone(&zone);
        let hvac = HvacResolver::new(adapter.as_ref(), &present).resolve(
            &extractor.heating_plants()?,
            &extractor.cooling_plants()?,
            &extractor.distributions()?,
            cfa,
        )?;
        let systems = Systems {
            hvac,
            domestic_hot_water: building::hot_water(&building)?,
            generation: building::generation(&building)?,
        };

        let inputs = HescoreInputs {
            building_address,
            hpwes,
            building: Building { about, zone, systems },
        };
        self.validator.validate(&inputs)?;
        info!(
            roofs = inputs.building.zone.zone_roof.len(),
            floors = inputs.building.zone.zone_floor.len(),
            hvac = inputs.building.systems.hvac.len(),
            "translation complete"
        );
        Ok(inputs)
    }

    /// Translate and serialize as pretty-printed JSON.
    pub fn translate_to_json(&self, document: &Document, options: &TranslateOptions) -> TranslateResult<String> {
        let inputs = self.translate(document, options)?;
        Ok(serde_json::to_string_pretty(&inputs)?)
    }
}
