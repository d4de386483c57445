//! Entity store collaborator.
//!
//! The engine only reads entities. Production deployments implement
//! [`EntityStore`] over their persistence layer; [`MemoryEntityStore`] serves
//! the CLI (from a JSON snapshot file) and tests.

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use fw_core::entities::{Report, ReportPhase, TrackedEntity, TrackedRecord};
use fw_core::enums::EntityKind;

use crate::error::StoreError;

/// Read access to tracked entities.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch one entity, or `None` if it does not exist.
    async fn fetch_by_id(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Option<TrackedRecord>, StoreError>;

    /// Fetch every entity of `kind` whose status is not terminal.
    async fn fetch_active_by_kind(&self, kind: EntityKind)
    -> Result<Vec<TrackedRecord>, StoreError>;
}

/// On-disk shape of an entity snapshot.
///
/// ```json
/// { "reports": [ ... ], "phases": [ ... ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub reports: Vec<Report>,
    #[serde(default)]
    pub phases: Vec<ReportPhase>,
}

/// In-memory entity store.
#[derive(Debug, Default)]
pub struct MemoryEntityStore {
    records: RwLock<Vec<TrackedRecord>>,
}

impl MemoryEntityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let records = snapshot
            .reports
            .into_iter()
            .map(TrackedRecord::from)
            .chain(snapshot.phases.into_iter().map(TrackedRecord::from))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Load a [`StoreSnapshot`] JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read or decoded.
    pub fn load_json(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            reports = snapshot.reports.len(),
            phases = snapshot.phases.len(),
            "loaded entity snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Insert or replace an entity by kind and ID.
    pub fn upsert(&self, record: impl Into<TrackedRecord>) {
        let record = record.into();
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = records
            .iter_mut()
            .find(|existing| existing.kind() == record.kind() && existing.id() == record.id())
        {
            *existing = record;
        } else {
            records.push(record);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn fetch_by_id(
        &self,
        kind: EntityKind,
        id: &str,
    ) -> Result<Option<TrackedRecord>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .find(|record| record.kind() == kind && record.id() == id)
            .cloned())
    }

    async fn fetch_active_by_kind(
        &self,
        kind: EntityKind,
    ) -> Result<Vec<TrackedRecord>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .filter(|record| record.kind() == kind && !kind.is_terminal_status(record.status_key()))
            .cloned()
            .collect())
    }
}
