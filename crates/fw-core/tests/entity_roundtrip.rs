//! Serde roundtrip and JsonSchema validation tests for entity and response types.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use schemars::schema_for;
use fw_core::alert::AlertPayload;
use fw_core::entities::*;
use fw_core::enums::*;
use fw_core::responses::*;
use fw_core::sla::{BudgetOverrides, BudgetTable};

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            // Serde roundtrip
            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            // Schema validation
            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn sample_evaluation() -> Evaluation {
    let now = Utc::now();
    Evaluation {
        entity_id: "rpt-a3f8b2c1".into(),
        kind: EntityKind::Report,
        status: "draft".into(),
        stage: "Report drafting".into(),
        budget_hours: 160.0,
        reference_at: now - Duration::hours(200),
        elapsed_hours: 200.0,
        remaining_hours: -40.0,
        elapsed_ratio: 1.25,
        ratio_display: 1.25,
        severity: Some(Severity::Exceeded),
        priority: Some(Priority::Urgent),
        lifecycle_ratio: Some(1.25),
        evaluated_at: now,
    }
}

roundtrip_and_validate!(
    report_roundtrip,
    Report,
    Report {
        id: "rpt-a3f8b2c1".into(),
        title: "A350 delivery flight".into(),
        status: ReportStatus::Completed,
        owner_id: Some("usr-19".into()),
        created_at: Utc::now() - Duration::days(3),
        status_changed_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    phase_record_roundtrip,
    TrackedRecord,
    TrackedRecord::ReportPhase(ReportPhase {
        id: "phs-0c11d9e2".into(),
        report_id: "rpt-a3f8b2c1".into(),
        name: "Maintenance sign-off".into(),
        status: PhaseStatus::Pending,
        owner_id: None,
        created_at: Utc::now(),
        status_changed_at: Utc::now(),
    })
);

roundtrip_and_validate!(
    evaluated_outcome_roundtrip,
    EvaluationOutcome,
    EvaluationOutcome::Evaluated(sample_evaluation())
);

roundtrip_and_validate!(
    unclassified_outcome_roundtrip,
    EvaluationOutcome,
    EvaluationOutcome::Unclassified {
        entity_id: "phs-0c11d9e2".into(),
        kind: EntityKind::ReportPhase,
        status: "submitted".into(),
    }
);

roundtrip_and_validate!(
    scan_outcome_roundtrip,
    ScanOutcome,
    ScanOutcome {
        statistics: ScanStatistics {
            kind: EntityKind::Report,
            total: 3,
            in_alert: 1,
            by_severity: SeverityBreakdown {
                warning: 0,
                critical: 0,
                exceeded: 1,
            },
            alerts_dispatched: 1,
            dispatch_failures: 0,
            no_recipient: 0,
            no_active_sla: 1,
            unclassified: 1,
        },
        evaluations: vec![
            EvaluationOutcome::Evaluated(sample_evaluation()),
            EvaluationOutcome::NoActiveSla {
                entity_id: "rpt-77".into(),
                kind: EntityKind::Report,
                status: "locked".into(),
            },
        ],
    }
);

roundtrip_and_validate!(
    sla_report_roundtrip,
    SlaReport,
    SlaReport {
        generated_at: Utc::now(),
        kinds: BTreeMap::from([
            (EntityKind::Report, ScanStatistics::new(EntityKind::Report)),
            (
                EntityKind::ReportPhase,
                ScanStatistics::new(EntityKind::ReportPhase)
            ),
        ]),
        totals: ReportTotals::default(),
    }
);

roundtrip_and_validate!(
    alert_payload_roundtrip,
    AlertPayload,
    AlertPayload {
        title: "SLA exceeded: A350 delivery flight".into(),
        message: "Report drafting has used 125% of its 160h budget".into(),
        link: "https://reports.example.com/reports/rpt-a3f8b2c1".into(),
        priority: Priority::Urgent,
        severity: Severity::Exceeded,
        stage: "Report drafting".into(),
        elapsed_ratio: 1.25,
        remaining_hours: -40.0,
        entity_id: "rpt-a3f8b2c1".into(),
        kind: EntityKind::Report,
    }
);

roundtrip_and_validate!(
    sla_snapshot_roundtrip,
    SlaSnapshot,
    SlaSnapshot::new(BudgetTable::default())
);

roundtrip_and_validate!(
    budget_overrides_roundtrip,
    BudgetOverrides,
    BudgetOverrides::new()
        .with(EntityKind::Report, "in_progress", 10.0)
        .with(EntityKind::ReportPhase, "global", 96.0)
);
