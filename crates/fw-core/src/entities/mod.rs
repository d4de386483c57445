//! Snapshots of the workflow entities flightwatch tracks.
//!
//! Entities are owned and mutated by the external entity store; flightwatch
//! only ever reads them. All structs derive `Serialize`, `Deserialize`, and
//! `JsonSchema` for JSON roundtrip and schema validation.

mod phase;
mod record;
mod report;

pub use phase::ReportPhase;
pub use record::{TrackedEntity, TrackedRecord};
pub use report::Report;
