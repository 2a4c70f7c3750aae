//! Error taxonomy shared across the engine.

use serde::Serialize;
use thiserror::Error;

/// Coarse classification of every error the engine reports.
///
/// Callers translate these into protocol-specific outcomes, for example
/// a 422-style response for [`ErrorKind::BusinessRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request itself was unusable, e.g. no orders or no vehicles.
    Input,
    /// Capacity could not absorb the requested load.
    Capacity,
    /// A status transition, sequencing or time-window rule was broken.
    BusinessRule,
    /// A referenced entity does not exist.
    NotFound,
    /// A deadline or cancellation signal was observed.
    Cancelled,
    /// A repository collaborator failed.
    Persistence,
}

/// Opaque failure reported by a repository or unit of work.
///
/// Any persistence failure aborts the surrounding unit of work; no partial
/// mutation becomes visible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("persistence failure during {operation}: {message}")]
pub struct PersistenceError {
    /// Repository operation that failed.
    pub operation: &'static str,
    /// Backend-provided description.
    pub message: String,
}

impl PersistenceError {
    /// Construct an error for `operation`.
    #[must_use]
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Persistence
    }
}
