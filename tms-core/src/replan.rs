//! Re-planning contract: disruption events, alternatives and their KPIs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Cancellation, Depot, ErrorKind, Order, OrderId, PackError, Route, RouteId, RouteResult,
    RouteStop, Vehicle, VehicleId,
};

/// Category of a disruptive event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisruptionKind {
    /// A vehicle can no longer drive.
    VehicleBreakdown,
    /// A driver can no longer work.
    DriverUnavailable,
    /// Traffic has invalidated timings.
    TrafficDelay,
    /// A customer changed or added an order.
    CustomerRequest,
    /// Anything else.
    Other,
}

impl DisruptionKind {
    /// Whether the event takes its vehicle out of service.
    #[must_use]
    pub const fn removes_vehicle(self) -> bool {
        matches!(self, Self::VehicleBreakdown | Self::DriverUnavailable)
    }
}

/// An event that triggers re-planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisruptionEvent {
    /// Event category.
    pub kind: DisruptionKind,
    /// Route the event affects, if known.
    #[serde(default)]
    pub route_id: Option<RouteId>,
    /// Vehicle the event affects, if known.
    #[serde(default)]
    pub vehicle_id: Option<VehicleId>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// When the event happened.
    pub occurred_at: DateTime<Utc>,
}

/// A route of the plan currently in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentRoute {
    /// Persisted route identifier.
    pub route_id: RouteId,
    /// Vehicle driving it.
    pub vehicle_id: VehicleId,
    /// Orders in visiting order.
    pub orders: Vec<OrderId>,
}

impl CurrentRoute {
    /// Build the current plan entry from persisted stops.
    ///
    /// Stops are taken in sequence order; failed stops are skipped since
    /// they no longer claim their order.
    #[must_use]
    pub fn from_stops(route: &Route, stops: &[RouteStop]) -> Self {
        let mut active: Vec<&RouteStop> = stops
            .iter()
            .filter(|stop| stop.route_id == route.id && stop.status.is_active())
            .collect();
        active.sort_by_key(|stop| stop.sequence);
        Self {
            route_id: route.id,
            vehicle_id: route.vehicle_id,
            orders: active.into_iter().map(|stop| stop.order_id).collect(),
        }
    }
}

/// Objective behind an alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Pack by ascending deadline to protect service levels.
    MinimizeLateness,
    /// Pack in arrival order for the shortest distance.
    MinimizeCost,
    /// Re-pack only orders the event touched.
    MinimizeDisruption,
}

impl Strategy {
    /// All strategies in ranking tie-break order.
    pub const ALL: [Self; 3] = [
        Self::MinimizeLateness,
        Self::MinimizeCost,
        Self::MinimizeDisruption,
    ];

    /// Stable identifier of the alternative.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::MinimizeLateness => "alt_minimize_late",
            Self::MinimizeCost => "alt_minimize_cost",
            Self::MinimizeDisruption => "alt_minimize_changes",
        }
    }

    /// Short human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MinimizeLateness => "Minimize late deliveries",
            Self::MinimizeCost => "Minimize cost",
            Self::MinimizeDisruption => "Minimize changes",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Aggregate measures of an alternative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlternativeKpis {
    /// Sum of route costs.
    pub total_cost: f64,
    /// Sum of route distances.
    pub total_distance_km: f64,
    /// Stops estimated to miss their deadline, plus unassigned orders.
    pub late_count: usize,
    /// Orders whose vehicle or position differs from the current plan.
    pub changed_stops: usize,
    /// Orders the alternative could not place.
    pub unassigned: usize,
}

/// One candidate re-plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    /// Objective used to build it.
    pub strategy: Strategy,
    /// Routes after re-planning.
    pub routes: Vec<RouteResult>,
    /// Orders left without a vehicle.
    pub unassigned: Vec<OrderId>,
    /// Aggregate measures.
    pub kpis: AlternativeKpis,
    /// Weighted score; lower is better.
    pub score: f64,
}

/// Inputs to re-planning, as exchanged with external callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplanRequest {
    /// Triggering event.
    pub event: DisruptionEvent,
    /// Plan currently in force.
    #[serde(default)]
    pub current_routes: Vec<CurrentRoute>,
    /// Known orders; only plannable ones are re-packed.
    pub orders: Vec<Order>,
    /// Fleet.
    pub vehicles: Vec<Vehicle>,
    /// Origin and return point.
    pub depot: Depot,
}

/// Ranked alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplanOutcome {
    /// One alternative per [`Strategy`], in [`Strategy::ALL`] order.
    pub alternatives: Vec<Alternative>,
    /// Index of the lowest-scoring alternative.
    pub recommended: usize,
}

impl ReplanOutcome {
    /// The default recommendation.
    #[must_use]
    pub fn recommended(&self) -> Option<&Alternative> {
        self.alternatives.get(self.recommended)
    }

    /// Alternative built with `strategy`, for dispatcher overrides.
    #[must_use]
    pub fn by_strategy(&self, strategy: Strategy) -> Option<&Alternative> {
        self.alternatives
            .iter()
            .find(|alternative| alternative.strategy == strategy)
    }
}

/// Errors returned by [`AlternativeGenerator`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplanError {
    /// No plannable orders remained for any strategy.
    #[error("no plannable orders for any strategy")]
    NoOrders,
    /// No vehicle remained for any strategy.
    #[error("no vehicles available for any strategy")]
    NoVehicles,
    /// A strategy failed for a reason other than empty input.
    #[error("strategy {strategy} failed: {source}")]
    Strategy {
        /// Failing strategy.
        strategy: Strategy,
        /// Packer error.
        #[source]
        source: PackError,
    },
    /// The caller's deadline passed or cancellation was requested.
    #[error("re-planning cancelled")]
    Cancelled,
}

impl ReplanError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoOrders | Self::NoVehicles => ErrorKind::Input,
            Self::Strategy { source, .. } => source.kind(),
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Produce competing re-plans after a disruption.
pub trait AlternativeGenerator: Send + Sync {
    /// Build exactly one alternative per [`Strategy`] and rank them.
    ///
    /// # Errors
    ///
    /// Fails only when every strategy lacks orders or vehicles, when a
    /// strategy fails for another reason, or on cancellation.
    fn generate_alternatives(
        &self,
        request: &ReplanRequest,
        cancellation: &Cancellation,
    ) -> Result<ReplanOutcome, ReplanError>;
}
