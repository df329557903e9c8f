//! Typed input records.
//!
//! The schema adapters turn version-specific document shapes into these
//! records; the resolvers downstream only ever see records.

mod envelope;
mod equipment;

pub use envelope::{
    AtticKind, AtticRecord, Facing, FoundationKind, FoundationRecord, FoundationWallRecord,
    FrameFloorRecord, GlazingRecord, InsulationLayer, KneeWallRecord, RValueSource, RoofRecord,
    SlabRecord, WallRecord,
};
pub use equipment::{DistributionRecord, DuctRecord, EfficiencyRating, PlantRecord, Role};
