//! Evaluation, scan and report types returned by the SLA engine.
//!
//! These structs define the JSON shape of `fwatch evaluate`, `fwatch scan`,
//! `fwatch report` and `fwatch config show`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EntityKind, Priority, Severity};
use crate::sla::{BudgetTable, THRESHOLDS, Threshold};

/// Round to two decimals for display.
#[must_use]
pub fn round_for_display(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// SLA position of one entity at one instant. Derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Evaluation {
    pub entity_id: String,
    pub kind: EntityKind,
    pub status: String,
    pub stage: String,
    pub budget_hours: f64,
    /// Instant elapsed time is measured from.
    pub reference_at: DateTime<Utc>,
    pub elapsed_hours: f64,
    /// Negative once the deadline has passed.
    pub remaining_hours: f64,
    /// Unrounded elapsed / budget.
    pub elapsed_ratio: f64,
    pub ratio_display: f64,
    pub severity: Option<Severity>,
    pub priority: Option<Priority>,
    /// Hours since creation over the kind's global budget.
    pub lifecycle_ratio: Option<f64>,
    pub evaluated_at: DateTime<Utc>,
}

impl Evaluation {
    #[must_use]
    pub const fn is_in_alert(&self) -> bool {
        self.severity.is_some()
    }
}

/// Result of evaluating a single entity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    Evaluated(Evaluation),
    /// Terminal status: no SLA applies.
    NoActiveSla {
        entity_id: String,
        kind: EntityKind,
        status: String,
    },
    /// Status has no rule or no budget; skipped, not an error.
    Unclassified {
        entity_id: String,
        kind: EntityKind,
        status: String,
    },
}

impl EvaluationOutcome {
    #[must_use]
    pub const fn evaluation(&self) -> Option<&Evaluation> {
        match self {
            Self::Evaluated(evaluation) => Some(evaluation),
            Self::NoActiveSla { .. } | Self::Unclassified { .. } => None,
        }
    }

    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.evaluation().and_then(|evaluation| evaluation.severity)
    }

    #[must_use]
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Evaluated(evaluation) => &evaluation.entity_id,
            Self::NoActiveSla { entity_id, .. } | Self::Unclassified { entity_id, .. } => {
                entity_id
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Count of in-alert entities per severity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SeverityBreakdown {
    pub warning: u32,
    pub critical: u32,
    pub exceeded: u32,
}

impl SeverityBreakdown {
    pub const fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Warning => self.warning += 1,
            Severity::Critical => self.critical += 1,
            Severity::Exceeded => self.exceeded += 1,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.warning + self.critical + self.exceeded
    }
}

/// Tallies for one scan of one entity kind.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ScanStatistics {
    pub kind: EntityKind,
    pub total: u32,
    pub in_alert: u32,
    pub by_severity: SeverityBreakdown,
    pub alerts_dispatched: u32,
    pub dispatch_failures: u32,
    /// In alert but no owner to notify.
    pub no_recipient: u32,
    pub no_active_sla: u32,
    pub unclassified: u32,
}

impl ScanStatistics {
    #[must_use]
    pub const fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            total: 0,
            in_alert: 0,
            by_severity: SeverityBreakdown {
                warning: 0,
                critical: 0,
                exceeded: 0,
            },
            alerts_dispatched: 0,
            dispatch_failures: 0,
            no_recipient: 0,
            no_active_sla: 0,
            unclassified: 0,
        }
    }

    #[must_use]
    pub const fn not_in_alert(&self) -> u32 {
        self.total - self.in_alert
    }
}

/// Statistics plus every per-entity evaluation from one kind's scan.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ScanOutcome {
    pub statistics: ScanStatistics,
    pub evaluations: Vec<EvaluationOutcome>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Grand totals across every kind in a report.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReportTotals {
    pub total: u32,
    pub in_alert: u32,
    pub alerts_dispatched: u32,
    pub dispatch_failures: u32,
}

impl ReportTotals {
    pub const fn add(&mut self, statistics: &ScanStatistics) {
        self.total += statistics.total;
        self.in_alert += statistics.in_alert;
        self.alerts_dispatched += statistics.alerts_dispatched;
        self.dispatch_failures += statistics.dispatch_failures;
    }
}

/// Combined multi-kind SLA report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SlaReport {
    pub generated_at: DateTime<Utc>,
    pub kinds: BTreeMap<EntityKind, ScanStatistics>,
    pub totals: ReportTotals,
}

// ---------------------------------------------------------------------------
// Configuration snapshot
// ---------------------------------------------------------------------------

/// Immutable view of the active budgets and the fixed thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SlaSnapshot {
    pub budgets: BudgetTable,
    pub thresholds: Vec<Threshold>,
}

impl SlaSnapshot {
    #[must_use]
    pub fn new(budgets: BudgetTable) -> Self {
        Self {
            budgets,
            thresholds: THRESHOLDS.to_vec(),
        }
    }
}
