//! Great-circle distances.

use geo::{Distance, Haversine, Point};
use tms_core::{DistanceError, DistanceProvider};

/// Straight-line distance over the Earth's surface.
///
/// Coordinates are longitude (`x`) and latitude (`y`) in degrees.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use tms_core::DistanceProvider;
/// use tms_data::HaversineDistanceProvider;
///
/// // Bangkok to Chiang Mai, roughly 580 km as the crow flies.
/// let km = HaversineDistanceProvider
///     .distance_km(Coord { x: 100.50, y: 13.75 }, Coord { x: 98.98, y: 18.79 })?;
/// assert!((570.0..590.0).contains(&km));
/// # Ok::<(), tms_core::DistanceError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineDistanceProvider;

impl DistanceProvider for HaversineDistanceProvider {
    #[expect(clippy::float_arithmetic, reason = "metres are converted to kilometres")]
    fn distance_km(
        &self,
        from: geo::Coord<f64>,
        to: geo::Coord<f64>,
    ) -> Result<f64, DistanceError> {
        check_coordinate(from)?;
        check_coordinate(to)?;
        let metres = Haversine.distance(Point::from(from), Point::from(to));
        Ok(metres / 1_000.0)
    }
}

fn check_coordinate(coord: geo::Coord<f64>) -> Result<(), DistanceError> {
    let valid = coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y);
    if valid {
        Ok(())
    } else {
        Err(DistanceError::InvalidCoordinate {
            x: coord.x,
            y: coord.y,
        })
    }
}
