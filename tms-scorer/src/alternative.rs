//! Weighted ranking of re-planning alternatives.

use tms_core::{AlternativeKpis, AlternativeScorer};

use crate::{ScoreCeilings, ScoreWeights, ScoringConfigError};

/// Scores alternatives as a weighted sum of normalised cost, lateness and
/// disruption. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightedAlternativeScorer {
    weights: ScoreWeights,
    ceilings: ScoreCeilings,
}

impl WeightedAlternativeScorer {
    /// Build a scorer from validated weights and ceilings.
    ///
    /// # Errors
    /// Returns [`ScoringConfigError`] when either set fails validation.
    pub fn new(weights: ScoreWeights, ceilings: ScoreCeilings) -> Result<Self, ScoringConfigError> {
        Ok(Self {
            weights: weights.validate()?,
            ceilings: ceilings.validate()?,
        })
    }

    /// Weights in use.
    #[must_use]
    pub const fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// Ceilings in use.
    #[must_use]
    pub const fn ceilings(&self) -> ScoreCeilings {
        self.ceilings
    }
}

impl AlternativeScorer for WeightedAlternativeScorer {
    #[expect(
        clippy::float_arithmetic,
        reason = "scoring is a weighted sum of normalised terms"
    )]
    fn score(&self, kpis: &AlternativeKpis) -> f64 {
        let cost = kpis.total_cost / self.ceilings.cost;
        let late = count_as_f64(kpis.late_count) / self.ceilings.late_count;
        let changes = count_as_f64(kpis.changed_stops) / self.ceilings.changed_stops;
        self.weights.cost * cost + self.weights.late * late + self.weights.changes * changes
    }
}

pub(crate) fn count_as_f64(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}
