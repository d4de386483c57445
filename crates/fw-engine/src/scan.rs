//! Per-kind scan orchestration.
//!
//! A scan fetches every active entity of one kind, evaluates each in a bounded
//! worker pool and dispatches an alert for every breach with an owner. Each
//! worker returns an [`EntityScanResult`]; the results are folded into
//! [`ScanStatistics`] once all workers finish.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use fw_core::entities::{TrackedEntity, TrackedRecord};
use fw_core::enums::EntityKind;
use fw_core::responses::{EvaluationOutcome, ScanOutcome, ScanStatistics};

use crate::engine::{EngineInner, SlaEngine};
use crate::error::EngineError;
use crate::severity::Classification;

/// What happened to a breached entity's alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dispatch", rename_all = "snake_case")]
pub enum DispatchStatus {
    /// Not in alert.
    NotRequired,
    /// In alert but the entity has no owner.
    NoRecipient,
    Sent,
    Failed { error: String },
}

/// Outcome of scanning one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityScanResult {
    pub outcome: EvaluationOutcome,
    pub dispatch: DispatchStatus,
}

impl SlaEngine {
    /// Evaluate every active entity of `kind` and alert on breaches.
    ///
    /// Dispatch failures are counted, never returned.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the active entities cannot be fetched,
    /// or [`EngineError::Cancelled`] if `cancel` fires first.
    pub async fn scan_kind(
        &self,
        kind: EntityKind,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, EngineError> {
        let records = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(EngineError::Cancelled),
            fetched = self.inner.store.fetch_active_by_kind(kind) => fetched?,
        };
        let count = records.len();

        let mut set = JoinSet::new();
        let semaphore = Arc::new(Semaphore::new(self.inner.max_concurrency));
        let mut results: Vec<Option<EntityScanResult>> = (0..count).map(|_| None).collect();

        // A task is spawned only once it holds a permit, so at most
        // `max_concurrency` workers exist at a time.
        for (idx, record) in records.into_iter().enumerate() {
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(cancelled(&mut set, kind)),
                permit = Arc::clone(&semaphore).acquire_owned() => permit,
            };
            let Ok(permit) = permit else {
                tracing::error!(%kind, "scan worker pool closed");
                break;
            };
            let inner = Arc::clone(&self.inner);
            set.spawn(async move {
                let result = scan_entity(&inner, &record).await;
                drop(permit);
                (idx, result)
            });
        }

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(cancelled(&mut set, kind)),
                joined = set.join_next() => match joined {
                    Some(Ok((idx, result))) => results[idx] = Some(result),
                    Some(Err(error)) => {
                        tracing::error!(%kind, %error, "scan worker failed");
                    }
                    None => break,
                },
            }
        }

        let outcome = fold_results(kind, results);
        let stats = &outcome.statistics;
        tracing::info!(
            %kind,
            total = stats.total,
            in_alert = stats.in_alert,
            dispatched = stats.alerts_dispatched,
            failures = stats.dispatch_failures,
            "scan complete"
        );
        Ok(outcome)
    }
}

fn cancelled(set: &mut JoinSet<(usize, EntityScanResult)>, kind: EntityKind) -> EngineError {
    set.abort_all();
    tracing::info!(%kind, "scan cancelled");
    EngineError::Cancelled
}

/// Evaluate one entity and dispatch its alert if it is in breach.
async fn scan_entity(inner: &EngineInner, record: &TrackedRecord) -> EntityScanResult {
    let outcome = match inner.evaluate_record(record, inner.clock.now()) {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::warn!(kind = %record.kind(), id = record.id(), %error, "evaluation failed");
            return unclassified(record);
        }
    };

    let breach = outcome.evaluation().and_then(|evaluation| {
        evaluation
            .severity
            .zip(evaluation.priority)
            .map(|(severity, priority)| (evaluation, Classification { severity, priority }))
    });
    let Some((evaluation, classification)) = breach else {
        return EntityScanResult {
            outcome,
            dispatch: DispatchStatus::NotRequired,
        };
    };

    let Some(recipient) = record.owner_id() else {
        tracing::debug!(kind = %record.kind(), id = record.id(), "breach has no recipient");
        return EntityScanResult {
            outcome,
            dispatch: DispatchStatus::NoRecipient,
        };
    };

    let alert = inner.composer.compose(record, evaluation, classification);
    let dispatch = match inner.dispatcher.send_alert(recipient, &alert).await {
        Ok(()) => DispatchStatus::Sent,
        Err(error) => {
            tracing::warn!(
                kind = %record.kind(),
                id = record.id(),
                recipient,
                %error,
                "alert dispatch failed"
            );
            DispatchStatus::Failed {
                error: error.to_string(),
            }
        }
    };

    EntityScanResult { outcome, dispatch }
}

fn unclassified(record: &TrackedRecord) -> EntityScanResult {
    EntityScanResult {
        outcome: EvaluationOutcome::Unclassified {
            entity_id: record.id().to_string(),
            kind: record.kind(),
            status: record.status_key().to_string(),
        },
        dispatch: DispatchStatus::NotRequired,
    }
}

/// Fold per-entity results, in store order, into scan statistics.
///
/// A `None` slot is a worker that never reported back; it counts towards
/// `total` and `unclassified` and contributes no evaluation.
#[must_use]
pub fn fold_results(kind: EntityKind, results: Vec<Option<EntityScanResult>>) -> ScanOutcome {
    let mut statistics = ScanStatistics::new(kind);
    let mut evaluations = Vec::with_capacity(results.len());

    for result in results {
        statistics.total += 1;
        let Some(result) = result else {
            statistics.unclassified += 1;
            continue;
        };

        match &result.outcome {
            EvaluationOutcome::Evaluated(evaluation) => {
                if let Some(severity) = evaluation.severity {
                    statistics.in_alert += 1;
                    statistics.by_severity.record(severity);
                }
            }
            EvaluationOutcome::NoActiveSla { .. } => statistics.no_active_sla += 1,
            EvaluationOutcome::Unclassified { .. } => statistics.unclassified += 1,
        }

        match result.dispatch {
            DispatchStatus::NotRequired => {}
            DispatchStatus::NoRecipient => statistics.no_recipient += 1,
            DispatchStatus::Sent => statistics.alerts_dispatched += 1,
            DispatchStatus::Failed { .. } => statistics.dispatch_failures += 1,
        }

        evaluations.push(result.outcome);
    }

    ScanOutcome {
        statistics,
        evaluations,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fw_core::enums::{Priority, Severity};
    use fw_core::responses::Evaluation;
    use pretty_assertions::assert_eq;

    use super::*;

    fn evaluated(id: &str, severity: Option<Severity>) -> EvaluationOutcome {
        let now = Utc::now();
        EvaluationOutcome::Evaluated(Evaluation {
            entity_id: id.into(),
            kind: EntityKind::Report,
            status: "in_progress".into(),
            stage: "Report in progress".into(),
            budget_hours: 72.0,
            reference_at: now,
            elapsed_hours: 0.0,
            remaining_hours: 72.0,
            elapsed_ratio: 0.0,
            ratio_display: 0.0,
            severity,
            priority: severity.map(|s| {
                if s == Severity::Exceeded {
                    Priority::Urgent
                } else {
                    Priority::High
                }
            }),
            lifecycle_ratio: None,
            evaluated_at: now,
        })
    }

    fn result(outcome: EvaluationOutcome, dispatch: DispatchStatus) -> Option<EntityScanResult> {
        Some(EntityScanResult { outcome, dispatch })
    }

    #[test]
    fn fold_counts_every_outcome() {
        let outcome = fold_results(
            EntityKind::Report,
            vec![
                result(evaluated("a", None), DispatchStatus::NotRequired),
                result(evaluated("b", Some(Severity::Warning)), DispatchStatus::Sent),
                result(
                    evaluated("c", Some(Severity::Exceeded)),
                    DispatchStatus::Failed {
                        error: "smtp down".into(),
                    },
                ),
                result(
                    evaluated("d", Some(Severity::Critical)),
                    DispatchStatus::NoRecipient,
                ),
                result(
                    EvaluationOutcome::NoActiveSla {
                        entity_id: "e".into(),
                        kind: EntityKind::Report,
                        status: "locked".into(),
                    },
                    DispatchStatus::NotRequired,
                ),
                None,
            ],
        );

        let stats = &outcome.statistics;
        assert_eq!(stats.total, 6);
        assert_eq!(stats.in_alert, 3);
        assert_eq!(stats.by_severity.warning, 1);
        assert_eq!(stats.by_severity.critical, 1);
        assert_eq!(stats.by_severity.exceeded, 1);
        assert_eq!(stats.alerts_dispatched, 1);
        assert_eq!(stats.dispatch_failures, 1);
        assert_eq!(stats.no_recipient, 1);
        assert_eq!(stats.no_active_sla, 1);
        assert_eq!(stats.unclassified, 1);
        assert_eq!(stats.not_in_alert(), 3);

        let ids: Vec<&str> = outcome.evaluations.iter().map(EvaluationOutcome::entity_id).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn fold_of_nothing_is_empty() {
        let outcome = fold_results(EntityKind::ReportPhase, Vec::new());
        assert_eq!(outcome.statistics, ScanStatistics::new(EntityKind::ReportPhase));
        assert!(outcome.evaluations.is_empty());
    }
}
