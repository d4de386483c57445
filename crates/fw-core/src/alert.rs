//! Alert payload handed to the notification channel.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EntityKind, Priority, Severity};

/// Everything a recipient needs to act on an SLA breach.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AlertPayload {
    pub title: String,
    pub message: String,
    /// Deep link to the entity in the reporting application.
    pub link: String,
    pub priority: Priority,
    pub severity: Severity,
    pub stage: String,
    pub elapsed_ratio: f64,
    pub remaining_hours: f64,
    pub entity_id: String,
    pub kind: EntityKind,
}
