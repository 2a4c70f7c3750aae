//! Errors reported by dispatch operations.

use thiserror::Error;
use tms_core::{
    CapacityError, ErrorKind, OrderId, OrderStatus, PersistenceError, RouteId, StopId,
    StopStatus, TransitionError, VehicleId, VehicleStatus,
};

/// Why a dispatch operation was rejected.
///
/// Every variant is terminal for the request: nothing the operation staged
/// is committed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// The route named by the request does not exist.
    #[error("route {route_id} not found")]
    RouteNotFound {
        /// Missing route.
        route_id: RouteId,
    },
    /// The route a stop should move to does not exist.
    #[error("target route {route_id} not found")]
    TargetRouteNotFound {
        /// Missing target route.
        route_id: RouteId,
    },
    /// The stop named by the request does not exist.
    #[error("stop {stop_id} not found")]
    StopNotFound {
        /// Missing stop.
        stop_id: StopId,
    },
    /// The order named by the request does not exist.
    #[error("order {order_id} not found")]
    OrderNotFound {
        /// Missing order.
        order_id: OrderId,
    },
    /// The vehicle named by the request does not exist.
    #[error("vehicle {vehicle_id} not found")]
    VehicleNotFound {
        /// Missing vehicle.
        vehicle_id: VehicleId,
    },
    /// The stop is not on the route the request says it is on.
    #[error("stop {stop_id} is not on route {route_id}")]
    StopNotOnRoute {
        /// Stop named by the request.
        stop_id: StopId,
        /// Route the request expected.
        route_id: RouteId,
    },
    /// The request's "from" driver or vehicle does not match the route.
    #[error("route {route_id} {field} no longer matches the request")]
    StaleAssignment {
        /// Route being reassigned.
        route_id: RouteId,
        /// `"driver"` or `"vehicle"`.
        field: &'static str,
    },
    /// A route reassignment would leave both driver and vehicle unchanged.
    #[error("reassignment of route {route_id} changes nothing")]
    EmptyReassignment {
        /// Route named by the request.
        route_id: RouteId,
    },
    /// The new vehicle is not in service.
    #[error("vehicle {vehicle_id} is {status:?} and cannot be dispatched")]
    VehicleNotDispatchable {
        /// Vehicle named by the request.
        vehicle_id: VehicleId,
        /// Its current status.
        status: VehicleStatus,
    },
    /// The vehicle cannot carry the route's load.
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    /// Only pending or failed stops may be moved or removed.
    #[error("stop {stop_id} is {status} and cannot be moved")]
    StopNotMovable {
        /// Stop named by the request.
        stop_id: StopId,
        /// Its current status.
        status: StopStatus,
    },
    /// The requested position lies outside `1..=max`.
    #[error("sequence {sequence} is outside 1..={max}")]
    SequenceOutOfRange {
        /// Requested position.
        sequence: u32,
        /// Largest valid position.
        max: u32,
    },
    /// The requested position lies before a stop already in progress or
    /// completed.
    #[error("sequence {sequence} precedes a started stop; the earliest open position is {min}")]
    SequenceBeforeStartedStop {
        /// Requested position.
        sequence: u32,
        /// Smallest valid position.
        min: u32,
    },
    /// The order already has an active stop.
    #[error("order {order_id} is already served by stop {stop_id}")]
    OrderAlreadyRouted {
        /// Order named by the request.
        order_id: OrderId,
        /// Stop currently claiming it.
        stop_id: StopId,
    },
    /// The order's status does not allow it onto a route.
    #[error("order {order_id} is {status} and cannot be routed")]
    OrderNotRoutable {
        /// Order named by the request.
        order_id: OrderId,
        /// Its current status.
        status: OrderStatus,
    },
    /// Reopening a terminal status needs a stated reason.
    #[error("a reason is required to reopen a {entity}")]
    MissingReason {
        /// `"stop"` or `"order"`.
        entity: &'static str,
    },
    /// The stop kept moving between routes while its lock was awaited.
    #[error("stop {stop_id} changed route while waiting for its lock")]
    ConcurrentModification {
        /// Stop named by the request.
        stop_id: StopId,
    },
    /// A status machine, sequencing or time-window rule was broken.
    #[error(transparent)]
    Transition(#[from] TransitionError),
    /// The store failed; the unit of work was rolled back.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl DispatchError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RouteNotFound { .. }
            | Self::TargetRouteNotFound { .. }
            | Self::StopNotFound { .. }
            | Self::OrderNotFound { .. }
            | Self::VehicleNotFound { .. } => ErrorKind::NotFound,
            Self::EmptyReassignment { .. }
            | Self::SequenceOutOfRange { .. }
            | Self::MissingReason { .. } => ErrorKind::Input,
            Self::Capacity(err) => err.kind(),
            Self::Transition(err) => err.kind(),
            Self::Persistence(err) => err.kind(),
            Self::StopNotOnRoute { .. }
            | Self::StaleAssignment { .. }
            | Self::VehicleNotDispatchable { .. }
            | Self::StopNotMovable { .. }
            | Self::SequenceBeforeStartedStop { .. }
            | Self::OrderAlreadyRouted { .. }
            | Self::OrderNotRoutable { .. }
            | Self::ConcurrentModification { .. } => ErrorKind::BusinessRule,
        }
    }
}
