//! Test utilities for distance providers.
//!
//! [`StubDistanceProvider`] returns pre-configured matrices without making
//! HTTP requests.

use geo::Coord;
use tms_core::{DistanceError, DistanceMatrix, DistanceProvider};

/// Stub `DistanceProvider` for testing.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use tms_core::DistanceProvider;
/// use tms_data::routing::test_support::StubDistanceProvider;
///
/// let provider = StubDistanceProvider::with_matrix(vec![
///     vec![0.0, 4.0],
///     vec![5.0, 0.0],
/// ]);
/// let points = [Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }];
///
/// assert_eq!(provider.distance_km(points[0], points[1])?, 4.0);
/// assert!(provider.distance_matrix(&points).is_ok());
/// # Ok::<(), tms_core::DistanceError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StubDistanceProvider {
    response: StubResponse,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Matrix(DistanceMatrix),
    Error(DistanceError),
}

impl StubDistanceProvider {
    /// Create a provider that returns the given matrix for any non-empty
    /// input.
    #[must_use]
    pub const fn with_matrix(matrix: DistanceMatrix) -> Self {
        Self {
            response: StubResponse::Matrix(matrix),
        }
    }

    /// Create a provider that fails non-empty input with `error`.
    ///
    /// Empty input still returns `DistanceError::EmptyInput`.
    #[must_use]
    pub const fn with_error(error: DistanceError) -> Self {
        Self {
            response: StubResponse::Error(error),
        }
    }

    /// Create a provider returning zero on the diagonal and one kilometre
    /// elsewhere.
    #[must_use]
    pub fn with_unit_matrix(size: usize) -> Self {
        Self::with_matrix(
            (0..size)
                .map(|row| {
                    (0..size)
                        .map(|col| if row == col { 0.0 } else { 1.0 })
                        .collect()
                })
                .collect(),
        )
    }
}

impl DistanceProvider for StubDistanceProvider {
    /// The `[0][1]` cell of the configured matrix.
    fn distance_km(&self, _from: Coord<f64>, _to: Coord<f64>) -> Result<f64, DistanceError> {
        match &self.response {
            StubResponse::Matrix(matrix) => matrix
                .first()
                .and_then(|row| row.get(1))
                .copied()
                .ok_or(DistanceError::MalformedMatrix { expected: 2 }),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }

    fn distance_matrix(&self, points: &[Coord<f64>]) -> Result<DistanceMatrix, DistanceError> {
        if points.is_empty() {
            return Err(DistanceError::EmptyInput);
        }

        match &self.response {
            StubResponse::Matrix(matrix) => Ok(matrix.clone()),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_points(count: usize) -> Vec<Coord<f64>> {
        (0..count).map(|_| Coord { x: 0.0, y: 0.0 }).collect()
    }

    #[rstest]
    fn with_matrix_returns_configured_matrix() {
        let matrix = vec![vec![0.0, 2.5], vec![2.5, 0.0]];
        let provider = StubDistanceProvider::with_matrix(matrix.clone());

        let result = provider
            .distance_matrix(&sample_points(2))
            .expect("should succeed");

        assert_eq!(result, matrix);
    }

    #[rstest]
    fn with_error_returns_configured_error() {
        let provider = StubDistanceProvider::with_error(DistanceError::NetworkError {
            url: "http://example.com".to_owned(),
            message: "connection refused".to_owned(),
        });

        let err = provider
            .distance_matrix(&sample_points(2))
            .expect_err("should fail");

        assert!(matches!(err, DistanceError::NetworkError { .. }));
    }

    #[rstest]
    fn empty_input_returns_empty_input_error() {
        let provider = StubDistanceProvider::with_unit_matrix(2);

        let err = provider.distance_matrix(&[]).expect_err("should fail");

        assert_eq!(err, DistanceError::EmptyInput);
    }

    #[rstest]
    #[expect(clippy::float_cmp, reason = "unit cells are exact")]
    fn with_unit_matrix_creates_correct_pattern() {
        let matrix = StubDistanceProvider::with_unit_matrix(3)
            .distance_matrix(&sample_points(3))
            .expect("should succeed");

        assert_eq!(matrix.len(), 3);
        for (i, row) in matrix.iter().enumerate() {
            assert_eq!(row.len(), 3);
            for (j, &cell) in row.iter().enumerate() {
                assert_eq!(cell, if i == j { 0.0 } else { 1.0 });
            }
        }
    }
}
