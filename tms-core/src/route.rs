//! Persisted routes and their stops.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{DepotId, DriverId, OrderId, RouteId, StopId, StopStatus, VehicleId};

/// One vehicle's planned work for a service day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Unique identifier.
    pub id: RouteId,
    /// Vehicle driving the route.
    pub vehicle_id: VehicleId,
    /// Driver assigned, if any.
    #[serde(default)]
    pub driver_id: Option<DriverId>,
    /// Depot the route starts from and returns to.
    pub depot_id: DepotId,
    /// Operating day.
    pub service_date: NaiveDate,
}

/// A single order's visit within a route.
///
/// A stop belongs to exactly one route at a time; `route_id` is the only
/// link between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    /// Unique identifier.
    pub id: StopId,
    /// Owning route.
    pub route_id: RouteId,
    /// Order served by this visit.
    pub order_id: OrderId,
    /// One-based position within the route.
    pub sequence: u32,
    /// Planned arrival.
    #[serde(default)]
    pub planned_arrival: Option<DateTime<Utc>>,
    /// Planned departure.
    #[serde(default)]
    pub planned_departure: Option<DateTime<Utc>>,
    /// Recorded arrival.
    #[serde(default)]
    pub actual_arrival: Option<DateTime<Utc>>,
    /// Recorded departure.
    #[serde(default)]
    pub actual_departure: Option<DateTime<Utc>>,
    /// Distance driven from the previous stop or the depot.
    #[serde(default)]
    pub distance_from_previous_km: f64,
    /// Lifecycle status.
    #[serde(default)]
    pub status: StopStatus,
    /// Driver-supplied reason when the visit failed.
    #[serde(default)]
    pub failure_reason: Option<String>,
}

impl RouteStop {
    /// A pending stop with no timing information.
    #[must_use]
    pub const fn pending(id: StopId, route_id: RouteId, order_id: OrderId, sequence: u32) -> Self {
        Self {
            id,
            route_id,
            order_id,
            sequence,
            planned_arrival: None,
            planned_departure: None,
            actual_arrival: None,
            actual_departure: None,
            distance_from_previous_km: 0.0,
            status: StopStatus::Pending,
            failure_reason: None,
        }
    }
}

/// Renumber `stops` to `1..=N` in their current slice order.
///
/// Returns the ids of stops whose sequence changed.
///
/// # Examples
///
/// ```
/// use tms_core::{OrderId, RouteId, RouteStop, StopId, is_contiguous, resequence};
///
/// let route = RouteId::random();
/// let mut stops: Vec<_> = [1, 3, 4]
///     .into_iter()
///     .map(|seq| RouteStop::pending(StopId::random(), route, OrderId::random(), seq))
///     .collect();
/// resequence(&mut stops);
/// assert!(is_contiguous(&stops));
/// ```
pub fn resequence(stops: &mut [RouteStop]) -> Vec<StopId> {
    let mut changed = Vec::new();
    for (stop, sequence) in stops.iter_mut().zip(1_u32..) {
        if stop.sequence != sequence {
            stop.sequence = sequence;
            changed.push(stop.id);
        }
    }
    changed
}

/// Whether the sequence numbers of `stops` are exactly `1..=N` in any order.
#[must_use]
pub fn is_contiguous(stops: &[RouteStop]) -> bool {
    let mut sequences: Vec<u32> = stops.iter().map(|stop| stop.sequence).collect();
    sequences.sort_unstable();
    sequences.into_iter().zip(1_u32..).all(|(seq, expected)| seq == expected)
}
