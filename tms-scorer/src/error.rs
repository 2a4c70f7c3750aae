//! Errors raised while configuring scorers and classifiers.

use thiserror::Error;

/// Rejected scoring configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringConfigError {
    /// A weight was negative or not finite, or all weights were zero.
    #[error("score weights must be finite, non-negative and not all zero")]
    InvalidWeights,
    /// A normalisation ceiling was not a positive finite number.
    #[error("ceiling for {term} must be positive and finite, got {value}")]
    InvalidCeiling {
        /// Score term the ceiling normalises.
        term: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A tolerance or grace period was negative.
    #[error("{name} must not be negative")]
    NegativeTolerance {
        /// Name of the rejected setting.
        name: &'static str,
    },
}
