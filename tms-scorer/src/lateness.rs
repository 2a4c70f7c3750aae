//! Deadline-based lateness judgement.

use chrono::{DateTime, TimeDelta, Utc};
use tms_core::LatenessClassifier;

use crate::ScoringConfigError;

/// Late when the observed time exceeds the expected time by more than a
/// grace period. The reported lateness is measured from the expected time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineLatenessClassifier {
    grace: TimeDelta,
}

impl DeadlineLatenessClassifier {
    /// Classifier with the given grace period.
    ///
    /// # Errors
    /// Returns [`ScoringConfigError::NegativeTolerance`] for a negative grace.
    pub fn new(grace: TimeDelta) -> Result<Self, ScoringConfigError> {
        if grace < TimeDelta::zero() {
            return Err(ScoringConfigError::NegativeTolerance { name: "grace" });
        }
        Ok(Self { grace })
    }

    /// Grace period in use.
    #[must_use]
    pub const fn grace(&self) -> TimeDelta {
        self.grace
    }
}

impl Default for DeadlineLatenessClassifier {
    fn default() -> Self {
        Self {
            grace: TimeDelta::zero(),
        }
    }
}

impl LatenessClassifier for DeadlineLatenessClassifier {
    fn lateness(&self, expected: DateTime<Utc>, observed: DateTime<Utc>) -> Option<TimeDelta> {
        let delay = observed - expected;
        (delay > self.grace).then_some(delay)
    }
}
