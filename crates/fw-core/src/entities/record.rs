use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Report, ReportPhase};
use crate::enums::EntityKind;

/// Read-only view the SLA engine needs from any tracked entity.
pub trait TrackedEntity {
    fn id(&self) -> &str;
    fn kind(&self) -> EntityKind;
    /// Current status as its `snake_case` name.
    fn status_key(&self) -> &'static str;
    fn created_at(&self) -> DateTime<Utc>;
    fn status_changed_at(&self) -> DateTime<Utc>;
    fn owner_id(&self) -> Option<&str>;
}

impl TrackedEntity for Report {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Report
    }

    fn status_key(&self) -> &'static str {
        self.status.as_str()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn status_changed_at(&self) -> DateTime<Utc> {
        self.status_changed_at
    }

    fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }
}

impl TrackedEntity for ReportPhase {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::ReportPhase
    }

    fn status_key(&self) -> &'static str {
        self.status.as_str()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn status_changed_at(&self) -> DateTime<Utc> {
        self.status_changed_at
    }

    fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }
}

/// Either kind of tracked entity, as returned by the entity store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackedRecord {
    Report(Report),
    ReportPhase(ReportPhase),
}

impl TrackedRecord {
    fn inner(&self) -> &dyn TrackedEntity {
        match self {
            Self::Report(report) => report,
            Self::ReportPhase(phase) => phase,
        }
    }

    /// Parent report ID for phases; the report's own ID for reports.
    #[must_use]
    pub fn report_id(&self) -> &str {
        match self {
            Self::Report(report) => &report.id,
            Self::ReportPhase(phase) => &phase.report_id,
        }
    }

    /// Human-readable name used in alert titles.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Report(report) => &report.title,
            Self::ReportPhase(phase) => &phase.name,
        }
    }
}

impl TrackedEntity for TrackedRecord {
    fn id(&self) -> &str {
        self.inner().id()
    }

    fn kind(&self) -> EntityKind {
        self.inner().kind()
    }

    fn status_key(&self) -> &'static str {
        self.inner().status_key()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.inner().created_at()
    }

    fn status_changed_at(&self) -> DateTime<Utc> {
        self.inner().status_changed_at()
    }

    fn owner_id(&self) -> Option<&str> {
        self.inner().owner_id()
    }
}

impl From<Report> for TrackedRecord {
    fn from(report: Report) -> Self {
        Self::Report(report)
    }
}

impl From<ReportPhase> for TrackedRecord {
    fn from(phase: ReportPhase) -> Self {
        Self::ReportPhase(phase)
    }
}
