//! HPXML to Home Energy Score translation
//!
//! Reads a detailed building energy-audit document (HPXML, schema 2.x or
//! 3.x, as a JSON or YAML element tree) and produces the much smaller input
//! record the Home Energy Score engine accepts.
//!
//! # Core Concepts
//!
//! - **Assembly codes**: discrete construction codes picked by nearest
//!   catalog R-value
//! - **Zones**: four wall sides, up to two roof zones and up to two floor zones,
//!   each combining any number of physical elements
//! - **HVAC systems**: any number of heating, cooling and duct records merged
//!   by weight into at most two systems whose fractions sum to one
//!
//! # Example
//!
//! ```no_run
//! use hescore_hpxml::{AssemblyTables, Document, TranslateOptions, Translator};
//! use std::path::Path;
//!
//! let tables = AssemblyTables::load(Path::new("lookups"))?;
//! let document = Document::load(Path::new("house.json"))?;
//! let inputs = Translator::new(tables).translate(&document, &TranslateOptions::new())?;
//! println!("{}", serde_json::to_string_pretty(&inputs)?);
//! # Ok::<(), hescore_hpxml::TranslateError>(())
//! ```

pub mod building;
pub mod document;
pub mod error;
pub mod hescore;
pub mod hvac;
pub mod model;
pub mod resolve;
pub mod schema;
pub mod tables;
pub mod translator;
pub mod validate;
pub mod zone;

pub use document::{scrub, Document, ElementPath, Node, SchemaVersion};
pub use error::{TranslateError, TranslateResult};
pub use hescore::HescoreInputs;
pub use hvac::HvacResolver;
pub use resolve::AssemblyCodeResolver;
pub use schema::{SchemaAdapter, SchemaRouter, V2Adapter, V3Adapter};
pub use tables::{AssemblyCodeTable, AssemblyTables, Construction};
pub use translator::{TranslateOptions, Translator};
pub use validate::{BoundsValidator, NoValidation, OutputValidator};
pub use zone::ZoneAssigner;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
