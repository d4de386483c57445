//! Cross-cutting error types for flightwatch.
//!
//! Domain-specific errors (`ConfigError`, `EngineError`) are defined in their
//! respective crates. The `fwatch` binary converges everything into `anyhow`.

use thiserror::Error;

use crate::enums::EntityKind;

/// Errors that can be raised by any flightwatch crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {kind} {id}")]
    NotFound { kind: EntityKind, id: String },

    /// An SLA budget entry is unusable (unknown key, non-positive or non-finite hours).
    #[error("Invalid SLA budget {kind}.{key}: {reason}")]
    InvalidBudget {
        kind: EntityKind,
        key: String,
        reason: String,
    },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
