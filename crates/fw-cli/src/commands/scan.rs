use fw_core::enums::EntityKind;
use fw_core::responses::{EvaluationOutcome, ScanOutcome};
use fw_engine::CancellationToken;
use serde::Serialize;

use crate::cli::root_commands::ScanArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// One line of the `--format table` scan listing.
#[derive(Debug, Serialize)]
struct EvaluationRow<'a> {
    entity_id: &'a str,
    outcome: &'static str,
    stage: &'a str,
    ratio: Option<f64>,
    remaining_hours: Option<f64>,
    severity: Option<String>,
}

impl<'a> From<&'a EvaluationOutcome> for EvaluationRow<'a> {
    fn from(outcome: &'a EvaluationOutcome) -> Self {
        match outcome {
            EvaluationOutcome::Evaluated(evaluation) => Self {
                entity_id: &evaluation.entity_id,
                outcome: "evaluated",
                stage: &evaluation.stage,
                ratio: Some(evaluation.ratio_display),
                remaining_hours: Some((evaluation.remaining_hours * 10.0).round() / 10.0),
                severity: evaluation.severity.map(|severity| severity.to_string()),
            },
            EvaluationOutcome::NoActiveSla {
                entity_id, status, ..
            } => Self {
                entity_id,
                outcome: "no_active_sla",
                stage: status,
                ratio: None,
                remaining_hours: None,
                severity: None,
            },
            EvaluationOutcome::Unclassified {
                entity_id, status, ..
            } => Self {
                entity_id,
                outcome: "unclassified",
                stage: status,
                ratio: None,
                remaining_hours: None,
                severity: None,
            },
        }
    }
}

/// Handle `fwatch scan`.
pub async fn handle(args: &ScanArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let kind: EntityKind = parse_enum(&args.kind, "kind")?;
    let mut outcome = ctx.engine.scan_kind(kind, &CancellationToken::new()).await?;
    trim_evaluations(&mut outcome, args.alerts_only, flags.limit);

    if flags.format == OutputFormat::Table {
        let rows: Vec<EvaluationRow<'_>> = outcome.evaluations.iter().map(EvaluationRow::from).collect();
        output(&rows, flags.format)?;
        return output(&outcome.statistics, flags.format);
    }
    output(&outcome, flags.format)
}

/// Apply `--alerts-only` and `--limit` to the printed evaluations.
/// Statistics always cover the whole scan.
fn trim_evaluations(outcome: &mut ScanOutcome, alerts_only: bool, limit: Option<u32>) {
    if alerts_only {
        outcome
            .evaluations
            .retain(|evaluation| evaluation.severity().is_some());
    }
    if let Some(limit) = limit {
        outcome
            .evaluations
            .truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
}

#[cfg(test)]
mod tests {
    use fw_core::responses::ScanStatistics;

    use super::*;

    fn outcome() -> ScanOutcome {
        let evaluations = ["a", "b", "c"]
            .into_iter()
            .map(|id| EvaluationOutcome::Unclassified {
                entity_id: id.into(),
                kind: EntityKind::Report,
                status: "archived".into(),
            })
            .collect();
        ScanOutcome {
            statistics: ScanStatistics::new(EntityKind::Report),
            evaluations,
        }
    }

    #[test]
    fn limit_truncates_printed_evaluations() {
        let mut scan = outcome();
        trim_evaluations(&mut scan, false, Some(2));
        assert_eq!(scan.evaluations.len(), 2);
    }

    #[test]
    fn alerts_only_drops_entities_without_severity() {
        let mut scan = outcome();
        trim_evaluations(&mut scan, true, None);
        assert!(scan.evaluations.is_empty());
    }

    #[test]
    fn row_for_unclassified_carries_status() {
        let scan = outcome();
        let row = EvaluationRow::from(&scan.evaluations[0]);
        assert_eq!(row.outcome, "unclassified");
        assert_eq!(row.stage, "archived");
        assert!(row.ratio.is_none());
    }
}
