use std::sync::Arc;

use chrono::{DateTime, Utc};

use fw_config::{AlertsConfig, FwConfig};
use fw_core::entities::{TrackedEntity, TrackedRecord};
use fw_core::enums::EntityKind;
use fw_core::responses::{Evaluation, EvaluationOutcome, SlaSnapshot, round_for_display};
use fw_core::sla::{BudgetOverrides, BudgetTable};

use crate::alerts::AlertComposer;
use crate::clock::{Clock, SystemClock};
use crate::config_store::ConfigStore;
use crate::dispatch::AlertDispatcher;
use crate::error::EngineError;
use crate::ratio::ElapsedRatio;
use crate::resolver::{DEFAULT_RULES, Resolution, ResolverTable, StageRule};
use crate::severity::classify;
use crate::store::EntityStore;

/// Default bound on concurrent evaluations per kind.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// The SLA engine. Cheap to clone; clones share configuration and collaborators.
#[derive(Clone)]
pub struct SlaEngine {
    pub(crate) inner: Arc<EngineInner>,
}

pub(crate) struct EngineInner {
    pub(crate) store: Arc<dyn EntityStore>,
    pub(crate) dispatcher: Arc<dyn AlertDispatcher>,
    pub(crate) config: ConfigStore,
    pub(crate) resolver: ResolverTable,
    pub(crate) composer: AlertComposer,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) max_concurrency: usize,
}

impl std::fmt::Debug for SlaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlaEngine")
            .field("config", &self.inner.config)
            .field("resolver", &self.inner.resolver)
            .field("clock", &self.inner.clock)
            .field("max_concurrency", &self.inner.max_concurrency)
            .finish_non_exhaustive()
    }
}

/// Assembles an [`SlaEngine`] from its collaborators and settings.
pub struct SlaEngineBuilder {
    store: Arc<dyn EntityStore>,
    dispatcher: Arc<dyn AlertDispatcher>,
    budgets: BudgetTable,
    rules: Vec<StageRule>,
    composer: AlertComposer,
    clock: Arc<dyn Clock>,
    max_concurrency: usize,
}

impl SlaEngineBuilder {
    #[must_use]
    pub fn budgets(mut self, budgets: BudgetTable) -> Self {
        self.budgets = budgets;
        self
    }

    #[must_use]
    pub fn rules(mut self, rules: Vec<StageRule>) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn alerts(mut self, config: &AlertsConfig) -> Self {
        self.composer = AlertComposer::from_config(config);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Validate the settings and build the engine.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] for an invalid budget entry,
    /// a budget key no stage rule reads, or a zero concurrency bound.
    pub fn build(self) -> Result<SlaEngine, EngineError> {
        if self.max_concurrency == 0 {
            return Err(EngineError::InvalidConfiguration {
                field: "scan.max_concurrency".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let resolver = ResolverTable::new(self.rules);
        let config = ConfigStore::new(self.budgets, &resolver)?;

        Ok(SlaEngine {
            inner: Arc::new(EngineInner {
                store: self.store,
                dispatcher: self.dispatcher,
                config,
                resolver,
                composer: self.composer,
                clock: self.clock,
                max_concurrency: self.max_concurrency,
            }),
        })
    }
}

impl SlaEngine {
    /// Start building an engine over `store` and `dispatcher` with default settings.
    #[must_use]
    pub fn builder(
        store: Arc<dyn EntityStore>,
        dispatcher: Arc<dyn AlertDispatcher>,
    ) -> SlaEngineBuilder {
        SlaEngineBuilder {
            store,
            dispatcher,
            budgets: BudgetTable::default(),
            rules: DEFAULT_RULES.to_vec(),
            composer: AlertComposer::default(),
            clock: Arc::new(SystemClock),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Build an engine from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] if the configuration is unusable.
    pub fn from_config(
        config: &FwConfig,
        store: Arc<dyn EntityStore>,
        dispatcher: Arc<dyn AlertDispatcher>,
    ) -> Result<Self, EngineError> {
        Self::builder(store, dispatcher)
            .budgets(config.sla.budgets.clone())
            .max_concurrency(config.scan.max_concurrency)
            .alerts(&config.alerts)
            .build()
    }

    /// Evaluate one entity's SLA position now. Has no side effects.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the entity does not exist, or
    /// [`EngineError::Store`] if the store fails.
    pub async fn evaluate(&self, kind: EntityKind, id: &str) -> Result<EvaluationOutcome, EngineError> {
        let record = self
            .inner
            .store
            .fetch_by_id(kind, id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                kind,
                id: id.to_string(),
            })?;
        self.inner.evaluate_record(&record, self.inner.clock.now())
    }

    /// Current budgets and thresholds.
    #[must_use]
    pub fn configuration(&self) -> Arc<SlaSnapshot> {
        self.inner.config.snapshot()
    }

    /// Merge budget overrides into the active configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] and applies nothing if any
    /// entry is invalid.
    pub fn set_configuration(
        &self,
        overrides: &BudgetOverrides,
    ) -> Result<Arc<SlaSnapshot>, EngineError> {
        self.inner.config.merge(overrides)
    }

    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.inner.max_concurrency
    }
}

impl EngineInner {
    /// Resolve, measure and classify `record` at `now`.
    pub(crate) fn evaluate_record(
        &self,
        record: &TrackedRecord,
        now: DateTime<Utc>,
    ) -> Result<EvaluationOutcome, EngineError> {
        let snapshot = self.config.snapshot();
        let kind = record.kind();
        let status = record.status_key();

        let deadline = match self.resolver.resolve(
            kind,
            status,
            record.created_at(),
            record.status_changed_at(),
            &snapshot.budgets,
        ) {
            Resolution::Resolved(deadline) => deadline,
            Resolution::NoActiveSla => {
                return Ok(EvaluationOutcome::NoActiveSla {
                    entity_id: record.id().to_string(),
                    kind,
                    status: status.to_string(),
                });
            }
            Resolution::Unclassified => {
                tracing::debug!(%kind, id = record.id(), status, "no SLA rule or budget for status");
                return Ok(EvaluationOutcome::Unclassified {
                    entity_id: record.id().to_string(),
                    kind,
                    status: status.to_string(),
                });
            }
        };

        let measured = ElapsedRatio::compute(deadline.reference_at, now, deadline.budget_hours)?;
        let classification = classify(measured.ratio, &snapshot.thresholds);
        let lifecycle_ratio = snapshot
            .budgets
            .for_kind(kind)
            .global()
            .and_then(|global| ElapsedRatio::compute(record.created_at(), now, global).ok())
            .map(|lifecycle| lifecycle.ratio);

        tracing::debug!(
            %kind,
            id = record.id(),
            status,
            ratio = measured.ratio,
            severity = ?classification.map(|c| c.severity),
            "evaluated"
        );

        Ok(EvaluationOutcome::Evaluated(Evaluation {
            entity_id: record.id().to_string(),
            kind,
            status: status.to_string(),
            stage: deadline.stage.to_string(),
            budget_hours: deadline.budget_hours,
            reference_at: deadline.reference_at,
            elapsed_hours: measured.elapsed_hours,
            remaining_hours: measured.remaining_hours,
            elapsed_ratio: measured.ratio,
            ratio_display: round_for_display(measured.ratio),
            severity: classification.map(|c| c.severity),
            priority: classification.map(|c| c.priority),
            lifecycle_ratio,
            evaluated_at: now,
        }))
    }
}
