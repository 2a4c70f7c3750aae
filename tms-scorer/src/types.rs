//! Weights and normalisation ceilings for alternative scoring.

use serde::{Deserialize, Serialize};

use crate::ScoringConfigError;

/// Relative importance of each score term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Multiplier applied to normalised cost.
    pub cost: f64,
    /// Multiplier applied to the normalised late count.
    pub late: f64,
    /// Multiplier applied to normalised changed stops.
    pub changes: f64,
}

impl ScoreWeights {
    /// Validate the weights and return a copy.
    ///
    /// # Errors
    /// Returns [`ScoringConfigError::InvalidWeights`] when any value is
    /// negative or not finite, or the weights sum to zero.
    pub fn validate(self) -> Result<Self, ScoringConfigError> {
        if self.has_finite_values() && self.has_non_negative_values() && self.has_non_zero_total()
        {
            Ok(self)
        } else {
            Err(ScoringConfigError::InvalidWeights)
        }
    }

    const fn has_finite_values(self) -> bool {
        self.cost.is_finite() && self.late.is_finite() && self.changes.is_finite()
    }

    const fn has_non_negative_values(self) -> bool {
        self.cost >= 0.0 && self.late >= 0.0 && self.changes >= 0.0
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "validation sums weights to ensure a non-zero total"
    )]
    const fn has_non_zero_total(self) -> bool {
        (self.cost + self.late + self.changes) > 0.0
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            cost: 0.3,
            late: 0.5,
            changes: 0.2,
        }
    }
}

/// Reference values that bring each term onto a comparable scale.
///
/// A term equal to its ceiling contributes its full weight. Values above
/// the ceiling are not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCeilings {
    /// Cost at which the cost term reaches 1.
    pub cost: f64,
    /// Late count at which the lateness term reaches 1.
    pub late_count: f64,
    /// Changed stops at which the disruption term reaches 1.
    pub changed_stops: f64,
}

impl ScoreCeilings {
    /// Validate the ceilings and return a copy.
    ///
    /// # Errors
    /// Returns [`ScoringConfigError::InvalidCeiling`] naming the first
    /// ceiling that is not a positive finite number.
    pub fn validate(self) -> Result<Self, ScoringConfigError> {
        for (term, value) in [
            ("cost", self.cost),
            ("late count", self.late_count),
            ("changed stops", self.changed_stops),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ScoringConfigError::InvalidCeiling { term, value });
            }
        }
        Ok(self)
    }
}

impl Default for ScoreCeilings {
    fn default() -> Self {
        Self {
            cost: 10_000.0,
            late_count: 10.0,
            changed_stops: 50.0,
        }
    }
}
