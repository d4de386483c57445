use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::PhaseStatus;

/// A processing phase of a report, with its own statuses and budgets.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReportPhase {
    pub id: String,
    pub report_id: String,
    pub name: String,
    pub status: PhaseStatus,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status_changed_at: DateTime<Utc>,
}
