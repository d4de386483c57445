//! Ratio to severity classification.

use fw_core::enums::{Priority, Severity};
use fw_core::sla::Threshold;

/// Severity and priority of a breach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub severity: Severity,
    pub priority: Priority,
}

/// Highest threshold whose bound is at or below `ratio`, if any.
///
/// `thresholds` need not be sorted.
#[must_use]
pub fn classify(ratio: f64, thresholds: &[Threshold]) -> Option<Classification> {
    thresholds
        .iter()
        .filter(|threshold| threshold.ratio <= ratio)
        .max_by(|a, b| a.ratio.total_cmp(&b.ratio))
        .map(|threshold| Classification {
            severity: threshold.severity,
            priority: threshold.priority,
        })
}
