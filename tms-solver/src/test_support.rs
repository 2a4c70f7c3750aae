//! Test-only utilities for `tms-solver`.
//!
//! The helpers in this module are available to unit tests and behavioural
//! tests. They are gated behind the `test-support` feature (and `cfg(test)`).

use geo::Coord;
use tms_core::{DistanceError, DistanceProvider};

/// Wraps a provider and reports every leg touching a blocked point as
/// unreachable.
///
/// # Examples
/// ```rust
/// use geo::Coord;
/// use tms_core::DistanceProvider;
/// use tms_core::test_support::PlanarDistanceProvider;
/// use tms_solver::test_support::UnreachableDistanceProvider;
///
/// let island = Coord { x: 9.0, y: 9.0 };
/// let provider = UnreachableDistanceProvider::new(PlanarDistanceProvider, vec![island]);
/// let leg = provider.distance_km(Coord { x: 0.0, y: 0.0 }, island)?;
/// assert!(leg.is_infinite());
/// # Ok::<(), tms_core::DistanceError>(())
/// ```
#[derive(Debug, Clone)]
pub struct UnreachableDistanceProvider<D> {
    inner: D,
    blocked: Vec<Coord<f64>>,
}

impl<D> UnreachableDistanceProvider<D> {
    /// Block `blocked` on top of `inner`.
    #[must_use]
    pub const fn new(inner: D, blocked: Vec<Coord<f64>>) -> Self {
        Self { inner, blocked }
    }
}

impl<D: DistanceProvider> DistanceProvider for UnreachableDistanceProvider<D> {
    fn distance_km(&self, from: Coord<f64>, to: Coord<f64>) -> Result<f64, DistanceError> {
        if from != to && (self.blocked.contains(&from) || self.blocked.contains(&to)) {
            return Ok(f64::INFINITY);
        }
        self.inner.distance_km(from, to)
    }
}

/// A [`DistanceProvider`] that always fails with the configured error.
#[derive(Debug, Clone)]
pub struct FailingDistanceProvider {
    error: DistanceError,
}

impl FailingDistanceProvider {
    /// Fail every lookup with `error`.
    #[must_use]
    pub const fn new(error: DistanceError) -> Self {
        Self { error }
    }
}

impl Default for FailingDistanceProvider {
    fn default() -> Self {
        Self::new(DistanceError::NetworkError {
            url: "http://routing.invalid".to_owned(),
            message: "connection refused".to_owned(),
        })
    }
}

impl DistanceProvider for FailingDistanceProvider {
    fn distance_km(&self, _from: Coord<f64>, _to: Coord<f64>) -> Result<f64, DistanceError> {
        Err(self.error.clone())
    }
}
