//! Engine and collaborator error types for fw-engine.

use fw_core::enums::EntityKind;
use fw_core::errors::CoreError;
use thiserror::Error;

/// Errors surfaced by [`crate::SlaEngine`] operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested entity does not exist.
    #[error("Entity not found: {kind} {id}")]
    NotFound { kind: EntityKind, id: String },

    /// A budget or engine setting is unusable.
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// The entity store failed as a whole; aborts the enclosing scan.
    #[error("Entity store error: {0}")]
    Store(#[from] StoreError),

    /// The scan was cancelled before it completed.
    #[error("Scan cancelled")]
    Cancelled,

    #[error(transparent)]
    Core(CoreError),
}

impl From<CoreError> for EngineError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            CoreError::InvalidBudget { kind, key, reason } => Self::InvalidConfiguration {
                field: format!("{kind}.{key}"),
                reason,
            },
            other => Self::Core(other),
        }
    }
}

/// Errors from an [`crate::EntityStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store cannot be reached.
    #[error("Entity store unavailable: {0}")]
    Unavailable(String),

    #[error("Entity store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A stored snapshot could not be decoded.
    #[error("Entity snapshot is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from an [`crate::AlertDispatcher`] implementation.
///
/// Never escapes a scan: the orchestrator logs and counts it per entity.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The channel refused the alert (unknown recipient, quota, ...).
    #[error("Alert rejected: {0}")]
    Rejected(String),

    #[error("Alert transport failed: {0}")]
    Transport(String),

    #[error("Alert sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_budget_maps_to_invalid_configuration() {
        let err = EngineError::from(CoreError::InvalidBudget {
            kind: EntityKind::Report,
            key: "in_progress".into(),
            reason: "hours must be greater than zero".into(),
        });
        assert!(matches!(
            &err,
            EngineError::InvalidConfiguration { field, .. } if field == "report.in_progress"
        ));
    }

    #[test]
    fn core_not_found_keeps_identity() {
        let err = EngineError::from(CoreError::NotFound {
            kind: EntityKind::ReportPhase,
            id: "phs-9".into(),
        });
        assert_eq!(err.to_string(), "Entity not found: report_phase phs-9");
    }
}
