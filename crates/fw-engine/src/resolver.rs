//! Deadline resolution: which budget applies to an entity and from when.
//!
//! The mapping from (kind, status) to a budget key and a reference timestamp
//! is data, held in a [`ResolverTable`]. Supporting a new status means adding
//! a [`StageRule`] and a budget entry; the resolution algorithm stays the same.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fw_core::enums::EntityKind;
use fw_core::sla::{BudgetTable, GLOBAL_BUDGET_KEY};

/// Which entity timestamp elapsed time is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    CreatedAt,
    StatusChangedAt,
}

/// How one non-terminal status is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRule {
    pub kind: EntityKind,
    pub status: &'static str,
    /// Human-readable stage name carried in evaluations and alerts.
    pub stage: &'static str,
    /// Key into the kind's budget table.
    pub budget_key: &'static str,
    pub anchor: Anchor,
}

impl StageRule {
    #[must_use]
    pub const fn new(
        kind: EntityKind,
        status: &'static str,
        stage: &'static str,
        budget_key: &'static str,
        anchor: Anchor,
    ) -> Self {
        Self {
            kind,
            status,
            stage,
            budget_key,
            anchor,
        }
    }
}

/// Built-in stage rules for reports and report phases.
pub const DEFAULT_RULES: [StageRule; 7] = [
    StageRule::new(
        EntityKind::Report,
        "draft",
        "Report drafting",
        GLOBAL_BUDGET_KEY,
        Anchor::CreatedAt,
    ),
    StageRule::new(
        EntityKind::Report,
        "in_progress",
        "Report in progress",
        "in_progress",
        Anchor::StatusChangedAt,
    ),
    StageRule::new(
        EntityKind::Report,
        "completed",
        "Awaiting validation",
        "completed",
        Anchor::StatusChangedAt,
    ),
    StageRule::new(
        EntityKind::Report,
        "validated",
        "Awaiting lock",
        "validated",
        Anchor::StatusChangedAt,
    ),
    StageRule::new(
        EntityKind::ReportPhase,
        "pending",
        "Phase pending start",
        "pending",
        Anchor::CreatedAt,
    ),
    StageRule::new(
        EntityKind::ReportPhase,
        "in_progress",
        "Phase in progress",
        "in_progress",
        Anchor::StatusChangedAt,
    ),
    StageRule::new(
        EntityKind::ReportPhase,
        "submitted",
        "Phase awaiting review",
        "submitted",
        Anchor::StatusChangedAt,
    ),
];

/// Budget and reference instant for a measurable status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deadline {
    pub budget_hours: f64,
    pub reference_at: DateTime<Utc>,
    pub stage: &'static str,
}

/// Result of resolving an entity's current status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Terminal status; nothing to measure.
    NoActiveSla,
    /// No rule, or no budget for the rule's key.
    Unclassified,
    Resolved(Deadline),
}

/// Stage rules plus the terminal statuses per kind.
#[derive(Debug, Clone)]
pub struct ResolverTable {
    rules: Vec<StageRule>,
    terminal: Vec<(EntityKind, &'static str)>,
}

impl Default for ResolverTable {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

impl ResolverTable {
    /// Build a table from `rules`; terminal statuses come from the kinds' lifecycles.
    #[must_use]
    pub fn new(rules: Vec<StageRule>) -> Self {
        let terminal = EntityKind::ALL
            .into_iter()
            .flat_map(|kind| {
                kind.statuses()
                    .iter()
                    .filter(move |status| kind.is_terminal_status(status))
                    .map(move |status| (kind, *status))
            })
            .collect();
        Self { rules, terminal }
    }

    #[must_use]
    pub fn rules(&self) -> &[StageRule] {
        &self.rules
    }

    /// Budget keys the rules read, per kind, plus [`GLOBAL_BUDGET_KEY`] for
    /// every kind. These are the only keys a budget table may carry.
    #[must_use]
    pub fn budget_keys(&self) -> Vec<(EntityKind, &'static str)> {
        let mut keys: Vec<(EntityKind, &'static str)> = EntityKind::ALL
            .into_iter()
            .map(|kind| (kind, GLOBAL_BUDGET_KEY))
            .chain(self.rules.iter().map(|rule| (rule.kind, rule.budget_key)))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    #[must_use]
    pub fn rule(&self, kind: EntityKind, status: &str) -> Option<&StageRule> {
        self.rules
            .iter()
            .find(|rule| rule.kind == kind && rule.status == status)
    }

    #[must_use]
    pub fn is_terminal(&self, kind: EntityKind, status: &str) -> bool {
        self.terminal
            .iter()
            .any(|(terminal_kind, terminal_status)| {
                *terminal_kind == kind && *terminal_status == status
            })
    }

    /// Resolve the applicable budget and reference instant.
    #[must_use]
    pub fn resolve(
        &self,
        kind: EntityKind,
        status: &str,
        created_at: DateTime<Utc>,
        status_changed_at: DateTime<Utc>,
        budgets: &BudgetTable,
    ) -> Resolution {
        if self.is_terminal(kind, status) {
            return Resolution::NoActiveSla;
        }

        let Some(rule) = self.rule(kind, status) else {
            return Resolution::Unclassified;
        };
        let Some(budget_hours) = budgets.hours(kind, rule.budget_key) else {
            return Resolution::Unclassified;
        };

        let reference_at = match rule.anchor {
            Anchor::CreatedAt => created_at,
            Anchor::StatusChangedAt => status_changed_at,
        };

        Resolution::Resolved(Deadline {
            budget_hours,
            reference_at,
            stage: rule.stage,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn instants() -> (DateTime<Utc>, DateTime<Utc>) {
        let changed = Utc::now();
        (changed - Duration::hours(30), changed)
    }

    #[test]
    fn every_default_rule_has_a_default_budget() {
        let budgets = BudgetTable::default();
        for rule in &DEFAULT_RULES {
            assert!(
                budgets.hours(rule.kind, rule.budget_key).is_some(),
                "{}.{} has no budget",
                rule.kind,
                rule.status
            );
        }
    }

    #[test]
    fn default_budget_keys_match_default_budgets() {
        let keys = ResolverTable::default().budget_keys();
        let budgets = BudgetTable::default();
        let configured: Vec<(EntityKind, &str)> = EntityKind::ALL
            .into_iter()
            .flat_map(|kind| budgets.for_kind(kind).iter().map(move |(key, _)| (kind, key)))
            .collect();

        assert_eq!(keys.len(), configured.len());
        for entry in configured {
            assert!(keys.contains(&entry), "{entry:?} is read by no rule");
        }
        assert!(!keys.contains(&(EntityKind::Report, "draft")));
    }

    #[test]
    fn no_default_rule_targets_a_terminal_status() {
        let table = ResolverTable::default();
        for rule in table.rules() {
            assert!(!table.is_terminal(rule.kind, rule.status));
        }
    }

    #[rstest]
    #[case(EntityKind::Report, "locked")]
    #[case(EntityKind::Report, "cancelled")]
    #[case(EntityKind::ReportPhase, "finalized")]
    #[case(EntityKind::ReportPhase, "cancelled")]
    fn terminal_statuses_have_no_active_sla(#[case] kind: EntityKind, #[case] status: &str) {
        let (created, changed) = instants();
        let resolution =
            ResolverTable::default().resolve(kind, status, created, changed, &BudgetTable::default());
        assert_eq!(resolution, Resolution::NoActiveSla);
    }

    #[test]
    fn initial_report_status_uses_global_budget_from_creation() {
        let (created, changed) = instants();
        let resolution = ResolverTable::default().resolve(
            EntityKind::Report,
            "draft",
            created,
            changed,
            &BudgetTable::default(),
        );
        assert_eq!(
            resolution,
            Resolution::Resolved(Deadline {
                budget_hours: 168.0,
                reference_at: created,
                stage: "Report drafting",
            })
        );
    }

    #[test]
    fn initial_phase_status_is_measured_from_creation() {
        let (created, changed) = instants();
        let Resolution::Resolved(deadline) = ResolverTable::default().resolve(
            EntityKind::ReportPhase,
            "pending",
            created,
            changed,
            &BudgetTable::default(),
        ) else {
            panic!("pending should resolve");
        };
        assert_eq!(deadline.budget_hours, 2.0);
        assert_eq!(deadline.reference_at, created);
    }

    #[test]
    fn transitional_status_is_measured_from_last_change() {
        let (created, changed) = instants();
        let Resolution::Resolved(deadline) = ResolverTable::default().resolve(
            EntityKind::Report,
            "completed",
            created,
            changed,
            &BudgetTable::default(),
        ) else {
            panic!("completed should resolve");
        };
        assert_eq!(deadline.budget_hours, 48.0);
        assert_eq!(deadline.reference_at, changed);
        assert_eq!(deadline.stage, "Awaiting validation");
    }

    #[test]
    fn status_without_rule_is_unclassified() {
        let (created, changed) = instants();
        let resolution = ResolverTable::default().resolve(
            EntityKind::Report,
            "archived",
            created,
            changed,
            &BudgetTable::default(),
        );
        assert_eq!(resolution, Resolution::Unclassified);
    }

    #[test]
    fn rule_without_budget_is_unclassified() {
        let (created, changed) = instants();
        let budgets: BudgetTable =
            serde_json::from_str(r#"{"report": {"global": 100}}"#).unwrap();
        let resolution = ResolverTable::default().resolve(
            EntityKind::Report,
            "validated",
            created,
            changed,
            &budgets,
        );
        assert_eq!(resolution, Resolution::Unclassified);
    }

    #[test]
    fn custom_rule_is_pure_data() {
        let (created, changed) = instants();
        let mut rules = DEFAULT_RULES.to_vec();
        rules.retain(|rule| !(rule.kind == EntityKind::ReportPhase && rule.status == "submitted"));
        rules.push(StageRule::new(
            EntityKind::ReportPhase,
            "submitted",
            "Phase review window",
            GLOBAL_BUDGET_KEY,
            Anchor::CreatedAt,
        ));

        let Resolution::Resolved(deadline) = ResolverTable::new(rules).resolve(
            EntityKind::ReportPhase,
            "submitted",
            created,
            changed,
            &BudgetTable::default(),
        ) else {
            panic!("submitted should resolve");
        };
        assert_eq!(deadline.budget_hours, 72.0);
        assert_eq!(deadline.reference_at, created);
        assert_eq!(deadline.stage, "Phase review window");
    }
}
