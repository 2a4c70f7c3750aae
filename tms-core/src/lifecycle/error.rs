use chrono::NaiveTime;
use thiserror::Error;

use crate::{EntityKind, ErrorKind, StopId};

/// Business-rule violations raised by the status machines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The requested edge is not in the allowed set.
    #[error("{entity} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Entity whose status was changing.
        entity: EntityKind,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },
    /// A reopen was requested for a status that is not terminal.
    #[error("{entity} in status {from} cannot be reopened")]
    NotReopenable {
        /// Entity being reopened.
        entity: EntityKind,
        /// Current status.
        from: String,
    },
    /// A stop was completed while an earlier stop is still open.
    #[error(
        "stop {stop_id} at sequence {sequence} cannot complete before stop {blocking_stop} at sequence {blocking_sequence}"
    )]
    SequenceViolation {
        /// Stop being completed.
        stop_id: StopId,
        /// Its sequence number.
        sequence: u32,
        /// Earliest stop that is neither completed nor failed.
        blocking_stop: StopId,
        /// Sequence number of the blocking stop.
        blocking_sequence: u32,
    },
    /// Delivery fell outside the customer's receiving window.
    #[error("delivery at {at} falls outside the window {start}-{end}")]
    TimeWindowViolation {
        /// Time of delivery.
        at: NaiveTime,
        /// Window opening.
        start: NaiveTime,
        /// Window closing.
        end: NaiveTime,
    },
    /// The stop under validation is not among the supplied route stops.
    #[error("stop {stop_id} is not part of the supplied route")]
    UnknownStop {
        /// Missing stop.
        stop_id: StopId,
    },
}

impl TransitionError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownStop { .. } => ErrorKind::NotFound,
            Self::InvalidTransition { .. }
            | Self::NotReopenable { .. }
            | Self::SequenceViolation { .. }
            | Self::TimeWindowViolation { .. } => ErrorKind::BusinessRule,
        }
    }
}
