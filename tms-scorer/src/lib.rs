//! Scoring and delay attribution for the transport management engine.
//!
//! The crate provides the default implementations of the judgement traits
//! declared in `tms-core`:
//! - [`WeightedAlternativeScorer`] ranks re-planning alternatives by a
//!   weighted sum of normalised cost, late count and changed stops.
//! - [`DeadlineLatenessClassifier`] decides whether an arrival misses its
//!   deadline, with an optional grace period.
//! - [`ThresholdDelayCauseClassifier`] attributes delays to a cause, and
//!   [`DelayAnalyzer`] summarises planned against actual stop timings.
//!
//! # Examples
//!
//! ```
//! use tms_core::{AlternativeKpis, AlternativeScorer};
//! use tms_scorer::WeightedAlternativeScorer;
//!
//! let scorer = WeightedAlternativeScorer::default();
//! let kpis = AlternativeKpis {
//!     total_cost: 5_000.0,
//!     late_count: 5,
//!     changed_stops: 25,
//!     ..AlternativeKpis::default()
//! };
//! assert!((scorer.score(&kpis) - 0.5).abs() < 1e-9);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod alternative;
mod delay;
mod error;
mod lateness;
mod types;

pub use alternative::WeightedAlternativeScorer;
pub use delay::{CauseBreakdown, DelayAnalyzer, DelayReport, LateStop, ThresholdDelayCauseClassifier};
pub use error::ScoringConfigError;
pub use lateness::DeadlineLatenessClassifier;
pub use types::{ScoreCeilings, ScoreWeights};
