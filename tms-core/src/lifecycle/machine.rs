//! Generic transition table lookup.

use std::fmt;

use crate::EntityKind;

use super::TransitionError;

/// A finite status set with a fixed table of allowed edges.
pub trait StatusMachine: Copy + Eq + fmt::Display + 'static {
    /// Entity the statuses belong to, used in error reports.
    const ENTITY: EntityKind;

    /// Statuses reachable from `self` in one step.
    fn allowed_targets(self) -> &'static [Self];

    /// Whether `self -> to` is an allowed edge.
    fn can_transition(self, to: Self) -> bool {
        self.allowed_targets().contains(&to)
    }

    /// Whether no ordinary edge leaves this status.
    fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }
}

/// Reject `from -> to` unless it is an allowed edge.
///
/// # Errors
///
/// Returns [`TransitionError::InvalidTransition`] naming both statuses.
pub fn validate_transition<S: StatusMachine>(from: S, to: S) -> Result<(), TransitionError> {
    if from.can_transition(to) {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition {
            entity: S::ENTITY,
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
