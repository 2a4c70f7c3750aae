//! Distance provider trait and matrix alias.

use geo::Coord;

use super::error::DistanceError;

/// Square matrix of distances in kilometres.
///
/// `matrix[i][j]` is the distance from point `i` to point `j`.
pub type DistanceMatrix = Vec<Vec<f64>>;

/// Supply distances between coordinates.
///
/// Implementers provide [`DistanceProvider::distance_km`]; the default
/// [`DistanceProvider::distance_matrix`] calls it pairwise. Providers
/// backed by a batch service should override the matrix method.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use tms_core::{DistanceError, DistanceProvider};
///
/// struct Manhattan;
///
/// impl DistanceProvider for Manhattan {
///     fn distance_km(&self, from: Coord<f64>, to: Coord<f64>) -> Result<f64, DistanceError> {
///         Ok((from.x - to.x).abs() + (from.y - to.y).abs())
///     }
/// }
///
/// let points = [Coord { x: 0.0, y: 0.0 }, Coord { x: 3.0, y: 4.0 }];
/// let matrix = Manhattan.distance_matrix(&points)?;
/// assert_eq!(matrix[0][1], 7.0);
/// # Ok::<(), DistanceError>(())
/// ```
pub trait DistanceProvider {
    /// Distance in kilometres from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError`] when the distance cannot be determined.
    fn distance_km(&self, from: Coord<f64>, to: Coord<f64>) -> Result<f64, DistanceError>;

    /// Square matrix of distances between `points`.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError::EmptyInput`] when `points` is empty, or the
    /// first error from [`DistanceProvider::distance_km`].
    fn distance_matrix(&self, points: &[Coord<f64>]) -> Result<DistanceMatrix, DistanceError> {
        if points.is_empty() {
            return Err(DistanceError::EmptyInput);
        }
        points
            .iter()
            .map(|&from| {
                points
                    .iter()
                    .map(|&to| {
                        if from == to {
                            Ok(0.0)
                        } else {
                            self.distance_km(from, to)
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl<D: DistanceProvider + ?Sized> DistanceProvider for &D {
    fn distance_km(&self, from: Coord<f64>, to: Coord<f64>) -> Result<f64, DistanceError> {
        (**self).distance_km(from, to)
    }

    fn distance_matrix(&self, points: &[Coord<f64>]) -> Result<DistanceMatrix, DistanceError> {
        (**self).distance_matrix(points)
    }
}

impl<D: DistanceProvider + ?Sized> DistanceProvider for Box<D> {
    fn distance_km(&self, from: Coord<f64>, to: Coord<f64>) -> Result<f64, DistanceError> {
        (**self).distance_km(from, to)
    }

    fn distance_matrix(&self, points: &[Coord<f64>]) -> Result<DistanceMatrix, DistanceError> {
        (**self).distance_matrix(points)
    }
}

/// Check that `matrix` is `n x n`.
///
/// # Errors
///
/// Returns [`DistanceError::MalformedMatrix`] otherwise.
pub fn validate_matrix(matrix: &DistanceMatrix, n: usize) -> Result<(), DistanceError> {
    if matrix.len() == n && matrix.iter().all(|row| row.len() == n) {
        Ok(())
    } else {
        Err(DistanceError::MalformedMatrix { expected: n })
    }
}
