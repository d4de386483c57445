//! SLA budget tables, budget overrides, and the fixed severity thresholds.
//!
//! Budgets are expressed in hours and keyed per entity kind by status name.
//! The reserved key [`GLOBAL_BUDGET_KEY`] holds the whole-lifecycle budget,
//! measured from creation. Every other key must be one that a stage rule
//! reads; which keys those are is supplied by the caller.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EntityKind, Priority, Severity};
use crate::errors::CoreError;

/// Budget key for the overall deadline across a kind's whole lifecycle.
pub const GLOBAL_BUDGET_KEY: &str = "global";

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// One row of the severity threshold table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Threshold {
    /// Minimum elapsed ratio at which this severity applies.
    pub ratio: f64,
    pub severity: Severity,
    pub priority: Priority,
}

/// Severity thresholds in ascending ratio order. Not overridable at runtime.
pub const THRESHOLDS: [Threshold; 3] = [
    Threshold {
        ratio: 0.75,
        severity: Severity::Warning,
        priority: Priority::High,
    },
    Threshold {
        ratio: 0.90,
        severity: Severity::Critical,
        priority: Priority::High,
    },
    Threshold {
        ratio: 1.00,
        severity: Severity::Exceeded,
        priority: Priority::Urgent,
    },
];

// ---------------------------------------------------------------------------
// KindBudgets
// ---------------------------------------------------------------------------

/// Budget hours for one entity kind, keyed by status name or `global`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct KindBudgets(BTreeMap<String, f64>);

impl KindBudgets {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// The whole-lifecycle budget, if configured.
    #[must_use]
    pub fn global(&self) -> Option<f64> {
        self.get(GLOBAL_BUDGET_KEY)
    }

    pub fn insert(&mut self, key: impl Into<String>, hours: f64) {
        self.0.insert(key.into(), hours);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(key, hours)| (key.as_str(), *hours))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for KindBudgets {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ---------------------------------------------------------------------------
// BudgetTable
// ---------------------------------------------------------------------------

/// SLA budget table for every entity kind.
///
/// Missing kinds fall back to the built-in defaults when deserialized, so a
/// TOML file only needs to name the budgets it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BudgetTable {
    pub report: KindBudgets,
    pub report_phase: KindBudgets,
}

impl Default for BudgetTable {
    fn default() -> Self {
        Self {
            report: [
                (GLOBAL_BUDGET_KEY, 168.0),
                ("in_progress", 72.0),
                ("completed", 48.0),
                ("validated", 24.0),
            ]
            .into_iter()
            .collect(),
            report_phase: [
                (GLOBAL_BUDGET_KEY, 72.0),
                ("pending", 2.0),
                ("in_progress", 24.0),
                ("submitted", 8.0),
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl BudgetTable {
    #[must_use]
    pub const fn for_kind(&self, kind: EntityKind) -> &KindBudgets {
        match kind {
            EntityKind::Report => &self.report,
            EntityKind::ReportPhase => &self.report_phase,
        }
    }

    const fn for_kind_mut(&mut self, kind: EntityKind) -> &mut KindBudgets {
        match kind {
            EntityKind::Report => &mut self.report,
            EntityKind::ReportPhase => &mut self.report_phase,
        }
    }

    /// Budget hours for `(kind, key)`, if configured.
    #[must_use]
    pub fn hours(&self, kind: EntityKind, key: &str) -> Option<f64> {
        self.for_kind(kind).get(key)
    }

    /// Shallow per-kind merge: each supplied key replaces that key only.
    ///
    /// Does not validate; call [`BudgetOverrides::validate`] first.
    pub fn merge(&mut self, overrides: &BudgetOverrides) {
        for (kind, entries) in &overrides.0 {
            let budgets = self.for_kind_mut(*kind);
            for (key, hours) in entries {
                budgets.insert(key.clone(), *hours);
            }
        }
    }

    /// Check that every entry has finite, positive hours.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidBudget`] for the first offending entry.
    pub fn validate_hours(&self) -> Result<(), CoreError> {
        self.validate(|_, _| true)
    }

    /// Check every entry against `is_budget_key` and the hours rules.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidBudget`] for the first entry whose key is
    /// neither [`GLOBAL_BUDGET_KEY`] nor accepted by `is_budget_key`, or whose
    /// hours are not finite and positive.
    pub fn validate(
        &self,
        is_budget_key: impl Fn(EntityKind, &str) -> bool,
    ) -> Result<(), CoreError> {
        for kind in EntityKind::ALL {
            for (key, hours) in self.for_kind(kind).iter() {
                validate_entry(kind, key, hours, &is_budget_key)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// BudgetOverrides
// ---------------------------------------------------------------------------

/// Partial budget update: per kind, the keys to replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct BudgetOverrides(BTreeMap<EntityKind, BTreeMap<String, f64>>);

impl BudgetOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, kind: EntityKind, key: impl Into<String>, hours: f64) -> Self {
        self.set(kind, key, hours);
        self
    }

    pub fn set(&mut self, kind: EntityKind, key: impl Into<String>, hours: f64) {
        self.0.entry(kind).or_default().insert(key.into(), hours);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }

    /// Every `(kind, key, hours)` entry, in kind then key order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &str, f64)> {
        self.0.iter().flat_map(|(kind, entries)| {
            entries
                .iter()
                .map(move |(key, hours)| (*kind, key.as_str(), *hours))
        })
    }

    /// Validate every supplied entry without applying anything.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidBudget`] for the first invalid entry.
    pub fn validate(
        &self,
        is_budget_key: impl Fn(EntityKind, &str) -> bool,
    ) -> Result<(), CoreError> {
        for (kind, entries) in &self.0 {
            for (key, hours) in entries {
                validate_entry(*kind, key, *hours, &is_budget_key)?;
            }
        }
        Ok(())
    }
}

fn validate_entry(
    kind: EntityKind,
    key: &str,
    hours: f64,
    is_budget_key: &impl Fn(EntityKind, &str) -> bool,
) -> Result<(), CoreError> {
    let invalid = |reason: &str| CoreError::InvalidBudget {
        kind,
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key != GLOBAL_BUDGET_KEY && !is_budget_key(kind, key) {
        return Err(invalid("no stage rule reads this budget"));
    }
    if !hours.is_finite() {
        return Err(invalid("hours must be a finite number"));
    }
    if hours <= 0.0 {
        return Err(invalid("hours must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    /// Budget keys read by the built-in stage rules.
    fn builtin_key(kind: EntityKind, key: &str) -> bool {
        let keys: &[&str] = match kind {
            EntityKind::Report => &["in_progress", "completed", "validated"],
            EntityKind::ReportPhase => &["pending", "in_progress", "submitted"],
        };
        keys.contains(&key)
    }

    #[test]
    fn default_table_is_valid() {
        BudgetTable::default()
            .validate(builtin_key)
            .expect("defaults should validate");
    }

    #[test]
    fn default_table_has_no_terminal_entries() {
        let table = BudgetTable::default();
        for kind in EntityKind::ALL {
            for (key, _) in table.for_kind(kind).iter() {
                assert!(!kind.is_terminal_status(key), "{kind}.{key} is terminal");
            }
        }
    }

    #[test]
    fn thresholds_ascend() {
        assert!(THRESHOLDS.windows(2).all(|pair| pair[0].ratio < pair[1].ratio));
        assert_eq!(THRESHOLDS[0].priority, THRESHOLDS[1].priority);
    }

    #[test]
    fn merge_replaces_only_supplied_keys() {
        let mut table = BudgetTable::default();
        let overrides = BudgetOverrides::new().with(EntityKind::Report, "in_progress", 10.0);
        table.merge(&overrides);

        assert_eq!(table.hours(EntityKind::Report, "in_progress"), Some(10.0));
        assert_eq!(table.hours(EntityKind::Report, "completed"), Some(48.0));
        assert_eq!(table.hours(EntityKind::Report, GLOBAL_BUDGET_KEY), Some(168.0));
        assert_eq!(table.report_phase, BudgetTable::default().report_phase);
    }

    #[rstest]
    #[case(EntityKind::Report, "in_progress", 0.0)]
    #[case(EntityKind::Report, "in_progress", -4.0)]
    #[case(EntityKind::Report, "global", f64::NAN)]
    #[case(EntityKind::ReportPhase, "pending", f64::INFINITY)]
    #[case(EntityKind::Report, "locked", 12.0)]
    #[case(EntityKind::Report, "draft", 12.0)]
    #[case(EntityKind::ReportPhase, "archived", 12.0)]
    fn invalid_overrides_are_rejected(
        #[case] kind: EntityKind,
        #[case] key: &str,
        #[case] hours: f64,
    ) {
        let overrides = BudgetOverrides::new().with(kind, key, hours);
        let err = overrides.validate(builtin_key).expect_err("should reject");
        assert!(matches!(err, CoreError::InvalidBudget { .. }), "{err}");
    }

    #[test]
    fn global_key_is_always_accepted() {
        let overrides =
            BudgetOverrides::new().with(EntityKind::ReportPhase, GLOBAL_BUDGET_KEY, 48.0);
        overrides
            .validate(|_, _| false)
            .expect("global is measured for every kind");
    }

    #[test]
    fn hours_check_ignores_keys() {
        let mut table = BudgetTable::default();
        table.report.insert("review_window", 6.0);
        table.validate_hours().expect("key set is checked elsewhere");
        assert!(table.validate(builtin_key).is_err());

        table.report.insert("review_window", -1.0);
        assert!(table.validate_hours().is_err());
    }

    #[test]
    fn overrides_deserialize_from_json() {
        let overrides: BudgetOverrides =
            serde_json::from_str(r#"{"report_phase": {"submitted": 6}}"#).unwrap();
        assert_eq!(
            overrides,
            BudgetOverrides::new().with(EntityKind::ReportPhase, "submitted", 6.0)
        );
    }

    #[test]
    fn partial_table_deserializes_over_defaults() {
        let table: BudgetTable = serde_json::from_str(r#"{"report": {"global": 100}}"#).unwrap();
        assert_eq!(table.hours(EntityKind::Report, GLOBAL_BUDGET_KEY), Some(100.0));
        assert_eq!(table.hours(EntityKind::Report, "in_progress"), None);
        assert_eq!(table.report_phase, BudgetTable::default().report_phase);
    }
}
