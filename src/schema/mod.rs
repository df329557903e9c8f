//! Schema adapters for the supported document versions.
//!
//! The 2.x and 3.x schemas describe the same building with different
//! element placement, reference styles and vocabularies. Adapters hide
//! those differences behind [`SchemaAdapter`]; [`Extractor`] turns a
//! `Building` element into typed records through whichever adapter the
//! [`SchemaRouter`] picks.

mod extract;
mod router;
mod traits;
mod v2;
mod v3;

pub use extract::Extractor;
pub use router::SchemaRouter;
pub use traits::{PresentZones, SchemaAdapter};
pub use v2::V2Adapter;
pub use v3::V3Adapter;
