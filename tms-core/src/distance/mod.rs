//! Distances between addressable points.
//!
//! The `DistanceProvider` trait abstracts straight-line and road-network
//! distance sources. Callers supply coordinates (longitude as `x`,
//! latitude as `y`) and receive kilometres. Providers must be
//! deterministic for a fixed pair of inputs within one planning run.
//!
//! Unreachable pairs are reported as `f64::INFINITY` rather than as errors
//! so a single bad pair does not abort a whole matrix.

mod error;
mod provider;

pub use error::DistanceError;
pub use provider::{DistanceMatrix, DistanceProvider, validate_matrix};
