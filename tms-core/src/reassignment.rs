//! Reassignment reasons and the append-only reassignment log.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Actor, DriverId, ReassignmentId, RouteId, StopId, VehicleId};

/// Why a route or stop was reassigned.
///
/// The set is open: codes outside the conventional list are kept verbatim
/// in [`ReasonCode::Unrecognized`] and treated like [`ReasonCode::Other`].
///
/// # Examples
///
/// ```
/// use tms_core::ReasonCode;
///
/// assert_eq!(ReasonCode::parse("vehicle_breakdown"), ReasonCode::VehicleBreakdown);
/// let custom = ReasonCode::parse("flat tyre");
/// assert!(custom.is_other());
/// assert_eq!(custom.as_str(), "flat tyre");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReasonCode {
    /// The vehicle broke down.
    VehicleBreakdown,
    /// The driver cannot work.
    DriverUnavailable,
    /// The customer asked for a change.
    CustomerRequest,
    /// Traffic made the plan infeasible.
    TrafficDelay,
    /// Loads were rebalanced.
    CapacityOptimization,
    /// Urgent operational intervention.
    Emergency,
    /// Any other reason.
    Other,
    /// A code outside the conventional set, stored as given.
    Unrecognized(String),
}

impl ReasonCode {
    /// Parse a reason code, keeping unknown text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "vehicle_breakdown" => Self::VehicleBreakdown,
            "driver_unavailable" => Self::DriverUnavailable,
            "customer_request" => Self::CustomerRequest,
            "traffic_delay" => Self::TrafficDelay,
            "capacity_optimization" => Self::CapacityOptimization,
            "emergency" => Self::Emergency,
            "other" | "" => Self::Other,
            text => Self::Unrecognized(text.to_owned()),
        }
    }

    /// The stored text of this code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::VehicleBreakdown => "vehicle_breakdown",
            Self::DriverUnavailable => "driver_unavailable",
            Self::CustomerRequest => "customer_request",
            Self::TrafficDelay => "traffic_delay",
            Self::CapacityOptimization => "capacity_optimization",
            Self::Emergency => "emergency",
            Self::Other => "other",
            Self::Unrecognized(text) => text,
        }
    }

    /// Whether this code carries `other` semantics.
    #[must_use]
    pub const fn is_other(&self) -> bool {
        matches!(self, Self::Other | Self::Unrecognized(_))
    }
}

impl From<String> for ReasonCode {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ReasonCode> for String {
    fn from(code: ReasonCode) -> Self {
        match code {
            ReasonCode::Unrecognized(text) => text,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one reassignment.
///
/// Entries are appended once and never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignmentLog {
    /// Unique identifier.
    pub id: ReassignmentId,
    /// Route the change was made against. For stop moves, the source route.
    pub route_id: RouteId,
    /// Stop that moved, for stop reassignments.
    pub stop_id: Option<StopId>,
    /// Source route of a stop move.
    pub from_route_id: Option<RouteId>,
    /// Target route of a stop move.
    pub to_route_id: Option<RouteId>,
    /// Sequence before the move.
    pub from_sequence: Option<u32>,
    /// Sequence after the move.
    pub to_sequence: Option<u32>,
    /// Driver before the change.
    pub from_driver_id: Option<DriverId>,
    /// Driver after the change.
    pub to_driver_id: Option<DriverId>,
    /// Vehicle before the change.
    pub from_vehicle_id: Option<VehicleId>,
    /// Vehicle after the change.
    pub to_vehicle_id: Option<VehicleId>,
    /// Stated reason.
    pub reason: ReasonCode,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Who made the change.
    pub actor: Actor,
    /// When the change was recorded.
    pub created_at: DateTime<Utc>,
}
