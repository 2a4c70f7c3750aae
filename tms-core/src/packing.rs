//! Capacity packing contract and its result types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Cancellation, Cancelled, Depot, DistanceError, ErrorKind, Load, Order, OrderId,
    OrderValidationError, Vehicle, VehicleId,
};

/// How the packer picks the next order for a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    /// Closest feasible order; ties by earlier deadline, then lower volume.
    #[default]
    NearestNeighbor,
    /// Feasible order with the earliest deadline; ties by distance, then
    /// lower volume. Orders without a deadline come last.
    EarliestDeadline,
}

/// Per-call packing options.
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    /// Order selection rule.
    pub selection: SelectionRule,
    /// Deadline or cancellation signal checked while packing.
    pub cancellation: Cancellation,
}

/// Inputs to a packing run, as exchanged with external callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackRequest {
    /// Orders to assign.
    pub orders: Vec<Order>,
    /// Candidate vehicles, in priority order.
    pub vehicles: Vec<Vehicle>,
    /// Origin and return point.
    pub depot: Depot,
    /// Order selection rule.
    #[serde(default)]
    pub selection: SelectionRule,
}

/// One planned visit within a [`RouteResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedStop {
    /// Order delivered at this stop.
    pub order_id: OrderId,
    /// One-based position in the route.
    pub sequence: u32,
    /// Delivery coordinate.
    pub location: Coord<f64>,
    /// Estimated arrival.
    pub arrival: DateTime<Utc>,
    /// Estimated departure after service.
    pub departure: DateTime<Utc>,
    /// Distance from the previous stop or the depot.
    pub distance_from_previous_km: f64,
    /// Service time spent up to and including this stop.
    pub cumulative_service_time: Duration,
}

/// A vehicle's planned route produced by a [`CapacityPacker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Vehicle driving the route.
    pub vehicle_id: VehicleId,
    /// Stops in visiting order.
    pub stops: Vec<PlannedStop>,
    /// Distance including the return to the depot.
    pub total_distance_km: f64,
    /// Driving plus service time including the return to the depot.
    pub total_duration: Duration,
    /// Distance multiplied by the vehicle's cost per kilometre.
    pub total_cost: f64,
    /// Load carried.
    pub load: Load,
    /// Load as a fraction of capacity; see [`Vehicle::utilization`].
    pub utilization: f64,
}

impl RouteResult {
    /// Orders on this route in visiting order.
    pub fn order_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.stops.iter().map(|stop| stop.order_id)
    }
}

/// Outcome of a packing run.
///
/// Orders that no vehicle could absorb are listed in `unassigned`; every
/// input order appears in exactly one route or in `unassigned`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PackOutcome {
    /// Routes with at least one stop.
    pub routes: Vec<RouteResult>,
    /// Orders left over after every vehicle was filled.
    pub unassigned: Vec<OrderId>,
}

impl PackOutcome {
    /// Whether every order was assigned.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }

    /// Sum of route costs.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.routes.iter().map(|route| route.total_cost).sum()
    }

    /// Sum of route distances.
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        self.routes.iter().map(|route| route.total_distance_km).sum()
    }

    /// Treat partial assignment as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`PartialAssignment`] carrying the routes built so far when
    /// any order is unassigned.
    pub fn into_result(self) -> Result<Vec<RouteResult>, PartialAssignment> {
        if self.unassigned.is_empty() {
            Ok(self.routes)
        } else {
            Err(PartialAssignment {
                routes: self.routes,
                unassigned: self.unassigned,
            })
        }
    }
}

/// Some orders could not be placed on any vehicle.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} order(s) could not be assigned to any vehicle", unassigned.len())]
pub struct PartialAssignment {
    /// Routes built before capacity ran out.
    pub routes: Vec<RouteResult>,
    /// Orders left over.
    pub unassigned: Vec<OrderId>,
}

impl PartialAssignment {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Capacity
    }
}

/// Errors returned by [`CapacityPacker`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackError {
    /// The order set was empty.
    #[error("no orders to pack")]
    NoOrders,
    /// No dispatchable vehicle was supplied.
    #[error("no vehicles available for packing")]
    NoVehicles,
    /// The same order appeared twice.
    #[error("order {order_id} appears more than once")]
    DuplicateOrder {
        /// Repeated order.
        order_id: OrderId,
    },
    /// An order failed admission checks.
    #[error("order {order_id} is invalid: {source}")]
    InvalidOrder {
        /// Offending order.
        order_id: OrderId,
        /// Broken rule.
        #[source]
        source: OrderValidationError,
    },
    /// Distances could not be obtained.
    #[error("distance lookup failed: {0}")]
    Distance(#[from] DistanceError),
    /// The caller's deadline passed or cancellation was requested.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl PackError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoOrders
            | Self::NoVehicles
            | Self::DuplicateOrder { .. }
            | Self::InvalidOrder { .. }
            | Self::Distance(_) => ErrorKind::Input,
            Self::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}

/// Assign orders to vehicles respecting weight and volume capacity.
///
/// Implementations are pure over their inputs and must be deterministic for
/// a deterministic [`crate::DistanceProvider`].
pub trait CapacityPacker: Send + Sync {
    /// Build routes for `orders` over `vehicles`, starting at `depot`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::NoOrders`] or [`PackError::NoVehicles`] for empty
    /// inputs and [`PackError::Cancelled`] when `options.cancellation` fires;
    /// a cancelled run yields no routes. Unassignable orders are reported in
    /// [`PackOutcome::unassigned`], not as an error.
    fn pack(
        &self,
        orders: &[Order],
        vehicles: &[Vehicle],
        depot: &Depot,
        options: &PackOptions,
    ) -> Result<PackOutcome, PackError>;

    /// Measure a fixed visiting sequence for `vehicle` without reordering.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::NoOrders`] when `orders` is empty or a
    /// [`PackError::Distance`] failure.
    fn evaluate(
        &self,
        vehicle: &Vehicle,
        orders: &[Order],
        depot: &Depot,
    ) -> Result<RouteResult, PackError>;
}
