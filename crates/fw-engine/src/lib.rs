//! # fw-engine
//!
//! SLA deadline tracking and proactive alerting for flight reports and their
//! processing phases.
//!
//! A scan is a stateless read-evaluate-alert pass:
//!
//! ```text
//! report ─► scan_kind (per kind, concurrent)
//!              └─► resolver ─► ratio ─► severity ─► (breach) dispatcher
//! ```
//!
//! The engine never mutates entities. Entity access and alert delivery are
//! collaborator traits ([`EntityStore`], [`AlertDispatcher`]); budgets live in
//! an engine-owned [`ConfigStore`] that supports snapshot reads and validated
//! partial merges.

pub mod alerts;
pub mod clock;
pub mod config_store;
pub mod dispatch;
mod engine;
pub mod error;
pub mod ratio;
mod report;
pub mod resolver;
pub mod scan;
pub mod severity;
pub mod store;

pub use alerts::AlertComposer;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config_store::ConfigStore;
pub use dispatch::{AlertDispatcher, JsonlDispatcher, LogDispatcher};
pub use engine::{DEFAULT_MAX_CONCURRENCY, SlaEngine, SlaEngineBuilder};
pub use error::{DispatchError, EngineError, StoreError};
pub use resolver::{Anchor, ResolverTable, StageRule};
pub use scan::{DispatchStatus, EntityScanResult};
pub use store::{EntityStore, MemoryEntityStore, StoreSnapshot};
pub use tokio_util::sync::CancellationToken;
