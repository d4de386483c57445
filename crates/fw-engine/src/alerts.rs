//! Alert payload composition.

use fw_config::AlertsConfig;
use fw_core::alert::AlertPayload;
use fw_core::entities::{TrackedEntity, TrackedRecord};
use fw_core::responses::Evaluation;

use crate::severity::Classification;

/// Builds [`AlertPayload`]s for breached entities.
#[derive(Debug, Clone)]
pub struct AlertComposer {
    link_base: String,
    title_prefix: String,
}

impl Default for AlertComposer {
    fn default() -> Self {
        Self::from_config(&AlertsConfig::default())
    }
}

impl AlertComposer {
    #[must_use]
    pub fn new(link_base: impl Into<String>, title_prefix: impl Into<String>) -> Self {
        let link_base: String = link_base.into();
        Self {
            link_base: link_base.trim_end_matches('/').to_string(),
            title_prefix: title_prefix.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AlertsConfig) -> Self {
        Self::new(config.link_base.as_str(), config.title_prefix.as_str())
    }

    /// Deep link to the entity in the reporting application.
    #[must_use]
    pub fn link(&self, record: &TrackedRecord) -> String {
        match record {
            TrackedRecord::Report(report) => format!("{}/reports/{}", self.link_base, report.id),
            TrackedRecord::ReportPhase(phase) => format!(
                "{}/reports/{}/phases/{}",
                self.link_base, phase.report_id, phase.id
            ),
        }
    }

    #[must_use]
    pub fn compose(
        &self,
        record: &TrackedRecord,
        evaluation: &Evaluation,
        classification: Classification,
    ) -> AlertPayload {
        let percent = evaluation.elapsed_ratio * 100.0;
        let tail = if evaluation.remaining_hours >= 0.0 {
            format!("{:.1}h remaining", evaluation.remaining_hours)
        } else {
            format!("deadline passed {:.1}h ago", -evaluation.remaining_hours)
        };

        AlertPayload {
            title: format!(
                "{} {}: {}",
                self.title_prefix,
                classification.severity,
                record.display_name()
            ),
            message: format!(
                "{} has used {percent:.0}% of its {}h budget; {tail}",
                evaluation.stage, evaluation.budget_hours
            ),
            link: self.link(record),
            priority: classification.priority,
            severity: classification.severity,
            stage: evaluation.stage.clone(),
            elapsed_ratio: evaluation.elapsed_ratio,
            remaining_hours: evaluation.remaining_hours,
            entity_id: record.id().to_string(),
            kind: record.kind(),
        }
    }
}
