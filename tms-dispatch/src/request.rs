//! Inputs to dispatch operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tms_core::{
    Actor, DriverId, OrderId, OrderStatus, ReasonCode, RouteId, StopId, StopStatus, VehicleId,
};

/// Hand a route to a different driver, vehicle or both.
///
/// `from_*` fields state the assignment the caller believes is current.
/// When given, they must match the stored route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignRouteRequest {
    /// Route to reassign.
    pub route_id: RouteId,
    /// Driver the caller expects to replace.
    #[serde(default)]
    pub from_driver_id: Option<DriverId>,
    /// New driver.
    #[serde(default)]
    pub to_driver_id: Option<DriverId>,
    /// Vehicle the caller expects to replace.
    #[serde(default)]
    pub from_vehicle_id: Option<VehicleId>,
    /// New vehicle.
    #[serde(default)]
    pub to_vehicle_id: Option<VehicleId>,
    /// Stated reason.
    pub reason: ReasonCode,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Who is reassigning.
    pub actor: Actor,
}

/// Move a stop to another route, or to another position on its own route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignStopRequest {
    /// Stop to move.
    pub stop_id: StopId,
    /// Route the stop is on now.
    pub from_route_id: RouteId,
    /// Route the stop moves to. May equal `from_route_id`.
    pub to_route_id: RouteId,
    /// One-based position on the target route; the end when absent.
    #[serde(default)]
    pub new_sequence: Option<u32>,
    /// Stated reason.
    pub reason: ReasonCode,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Who is reassigning.
    pub actor: Actor,
}

/// Put an order onto a route as a new pending stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddStopRequest {
    /// Route receiving the stop.
    pub route_id: RouteId,
    /// Order to serve.
    pub order_id: OrderId,
    /// One-based position; the end when absent.
    #[serde(default)]
    pub sequence: Option<u32>,
    /// Who is adding the stop.
    pub actor: Actor,
}

/// Whether a delivery outside the customer's window is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindowPolicy {
    /// Reject the update with `TimeWindowViolation`.
    #[default]
    Enforce,
    /// Accept the update, log a warning and flag the audit entry.
    Override,
}

/// Report progress on a stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopStatusUpdate {
    /// Stop being updated.
    pub stop_id: StopId,
    /// Requested status.
    pub status: StopStatus,
    /// When the change happened; the service clock when absent.
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    /// Driver-supplied reason for a failed visit.
    #[serde(default)]
    pub failure_reason: Option<String>,
    /// Handling of deliveries outside the customer's window.
    #[serde(default)]
    pub time_window: TimeWindowPolicy,
    /// Who reported the change.
    pub actor: Actor,
}

/// Change an order's status directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    /// Order being updated.
    pub order_id: OrderId,
    /// Requested status.
    pub status: OrderStatus,
    /// Who made the change.
    pub actor: Actor,
}
