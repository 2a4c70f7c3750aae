//! Route stop lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::EntityKind;

use super::{StatusMachine, TransitionError, validate_transition};

/// Lifecycle status of a route stop.
///
/// ```text
/// pending -> in_progress -> completed
/// pending -> failed
/// in_progress -> failed -> pending (retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    /// Not yet visited.
    #[default]
    Pending,
    /// Driver has arrived.
    InProgress,
    /// Visit finished. Terminal.
    Completed,
    /// Visit abandoned.
    Failed,
}

impl StopStatus {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether the stop still claims its order.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Whether the stop no longer blocks later stops from completing.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether the stop may be moved to another route or position.
    #[must_use]
    pub const fn is_movable(self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }
}

impl fmt::Display for StopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StatusMachine for StopStatus {
    const ENTITY: EntityKind = EntityKind::Stop;

    fn allowed_targets(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::InProgress, Self::Failed],
            Self::InProgress => &[Self::Completed, Self::Failed],
            Self::Completed => &[],
            Self::Failed => &[Self::Pending],
        }
    }
}

/// Validate a stop status change.
///
/// # Errors
///
/// Returns [`TransitionError::InvalidTransition`] for edges outside the
/// table above.
pub fn validate_stop_transition(from: StopStatus, to: StopStatus) -> Result<(), TransitionError> {
    validate_transition(from, to)
}

/// Reopen a completed stop, returning it to `in_progress`.
///
/// # Errors
///
/// Returns [`TransitionError::NotReopenable`] unless `from` is
/// [`StopStatus::Completed`].
pub fn reopen_stop(from: StopStatus) -> Result<StopStatus, TransitionError> {
    match from {
        StopStatus::Completed => Ok(StopStatus::InProgress),
        other => Err(TransitionError::NotReopenable {
            entity: EntityKind::Stop,
            from: other.to_string(),
        }),
    }
}
