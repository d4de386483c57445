//! Engine-owned SLA configuration.
//!
//! Readers take a cheap `Arc` snapshot; the administrative override path
//! validates, merges and swaps the snapshot under one write lock. Updates are
//! last-writer-wins and not versioned: an evaluation uses whichever snapshot
//! it read when it started.

use std::sync::{Arc, PoisonError, RwLock};

use fw_core::enums::EntityKind;
use fw_core::responses::SlaSnapshot;
use fw_core::sla::{BudgetOverrides, BudgetTable};

use crate::error::EngineError;
use crate::resolver::ResolverTable;

#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<Arc<SlaSnapshot>>,
    /// Budget keys read by the resolver's stage rules.
    budget_keys: Vec<(EntityKind, &'static str)>,
}

impl ConfigStore {
    /// Create a store holding `budgets` and the fixed thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] if any budget entry has
    /// a key no rule in `resolver` reads, or invalid hours.
    pub fn new(budgets: BudgetTable, resolver: &ResolverTable) -> Result<Self, EngineError> {
        let budget_keys = resolver.budget_keys();
        budgets.validate(|kind, key| contains_key(&budget_keys, kind, key))?;
        Ok(Self {
            current: RwLock::new(Arc::new(SlaSnapshot::new(budgets))),
            budget_keys,
        })
    }

    /// Current budgets and thresholds.
    #[must_use]
    pub fn snapshot(&self) -> Arc<SlaSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Merge `overrides` into the budgets, per kind and key.
    ///
    /// Either every entry is applied or none is. Thresholds are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] for the first entry with
    /// a key no stage rule reads or with non-positive hours.
    pub fn merge(&self, overrides: &BudgetOverrides) -> Result<Arc<SlaSnapshot>, EngineError> {
        overrides.validate(|kind, key| contains_key(&self.budget_keys, kind, key))?;

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut budgets = guard.budgets.clone();
        budgets.merge(overrides);
        let next = Arc::new(SlaSnapshot::new(budgets));
        *guard = Arc::clone(&next);
        drop(guard);

        tracing::info!(?overrides, "SLA budgets updated");
        Ok(next)
    }
}

fn contains_key(keys: &[(EntityKind, &'static str)], kind: EntityKind, key: &str) -> bool {
    keys.iter()
        .any(|(known_kind, known_key)| *known_kind == kind && *known_key == key)
}
