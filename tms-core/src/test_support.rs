//! Test helpers shared across crates.
//!
//! Identifiers built here are deterministic: `order_id(3)` always yields
//! the same UUID, so fixtures can refer to entities by number.

use chrono::{DateTime, TimeZone, Utc};
use geo::Coord;
use uuid::Uuid;

use crate::{
    Address, Clock, Depot, DepotId, DistanceError, DistanceProvider, DriverId, Order, OrderId,
    OrderStatus, Priority, RouteId, RouteStop, StopId, StopStatus, Vehicle, VehicleId,
    VehicleStatus,
};

macro_rules! numbered_id {
    ($fn_name:ident, $ty:ident, $tag:literal) => {
        #[doc = concat!("Deterministic [`", stringify!($ty), "`] numbered `n`.")]
        #[must_use]
        pub const fn $fn_name(n: u128) -> $ty {
            $ty::from_uuid(Uuid::from_u128(($tag << 64) | n))
        }
    };
}

numbered_id!(order_id, OrderId, 1);
numbered_id!(vehicle_id, VehicleId, 2);
numbered_id!(route_id, RouteId, 3);
numbered_id!(stop_id, StopId, 4);
numbered_id!(depot_id, DepotId, 5);
numbered_id!(driver_id, DriverId, 6);

/// Fixed reference instant, 2025-01-06 08:00 UTC.
///
/// # Panics
///
/// Never; the timestamp is valid.
#[must_use]
#[expect(clippy::expect_used, reason = "constant timestamp is always valid")]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 8, 0, 0)
        .single()
        .expect("valid base time")
}

/// Treats coordinates as kilometres on a plane.
///
/// Distances are exact for integer grids, which keeps expectations in
/// tests readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarDistanceProvider;

impl DistanceProvider for PlanarDistanceProvider {
    fn distance_km(&self, from: Coord<f64>, to: Coord<f64>) -> Result<f64, DistanceError> {
        Ok((from.x - to.x).hypot(from.y - to.y))
    }
}

/// [`Clock`] frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(base_time())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A pending, normal-priority order delivered to `(x, y)`.
#[must_use]
pub fn order(n: u128, x: f64, y: f64, weight_kg: f64) -> Order {
    Order {
        id: order_id(n),
        reference: format!("ORD-{n:04}"),
        origin: Address {
            label: "depot".to_owned(),
            location: Coord { x: 0.0, y: 0.0 },
        },
        destination: Address {
            label: format!("customer {n}"),
            location: Coord { x, y },
        },
        weight_kg,
        volume_m3: 0.0,
        priority: Priority::Normal,
        required_by: None,
        time_window: None,
        status: OrderStatus::Pending,
        created_at: base_time(),
    }
}

/// An available vehicle with ample volume and unit cost per kilometre.
#[must_use]
pub fn vehicle(n: u128, capacity_kg: f64) -> Vehicle {
    Vehicle {
        id: vehicle_id(n),
        name: format!("van-{n}"),
        capacity_kg,
        capacity_m3: 100.0,
        cost_per_km: 1.0,
        status: VehicleStatus::Available,
    }
}

/// Depot at the origin departing at [`base_time`].
#[must_use]
pub fn depot() -> Depot {
    Depot {
        id: depot_id(1),
        name: "main".to_owned(),
        location: Coord { x: 0.0, y: 0.0 },
        departure_at: base_time(),
    }
}

/// Stops on route 1 with sequences `1..=N`, stop `n` serving order `n`.
#[must_use]
pub fn route_stops(statuses: &[StopStatus]) -> Vec<RouteStop> {
    statuses
        .iter()
        .zip(1_u32..)
        .map(|(&status, sequence)| {
            let n = u128::from(sequence);
            RouteStop {
                status,
                ..RouteStop::pending(stop_id(n), route_id(1), order_id(n), sequence)
            }
        })
        .collect()
}
