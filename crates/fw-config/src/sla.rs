//! SLA budget configuration.

use fw_core::errors::CoreError;
use fw_core::sla::BudgetTable;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Budget hours per entity kind and status.
///
/// ```toml
/// [sla.budgets.report]
/// global = 168
/// in_progress = 72
///
/// [sla.budgets.report_phase]
/// pending = 2
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SlaConfig {
    #[serde(default)]
    pub budgets: BudgetTable,
}

impl SlaConfig {
    /// Reject non-finite and non-positive budget entries.
    ///
    /// Keys are checked when the engine is built, against its stage rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.budgets.validate_hours().map_err(|error| match error {
            CoreError::InvalidBudget { kind, key, reason } => ConfigError::InvalidValue {
                field: format!("sla.budgets.{kind}.{key}"),
                reason,
            },
            other => ConfigError::InvalidValue {
                field: "sla.budgets".to_string(),
                reason: other.to_string(),
            },
        })
    }
}
