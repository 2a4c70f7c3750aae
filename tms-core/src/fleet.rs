//! Vehicles, depots and capacity accounting.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use chrono::{DateTime, Utc};
use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DepotId, ErrorKind, VehicleId};

/// Weight and volume carried, or able to be carried, by a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Load {
    /// Mass in kilograms.
    pub weight_kg: f64,
    /// Volume in cubic metres.
    pub volume_m3: f64,
}

impl Load {
    /// An empty load.
    pub const ZERO: Self = Self {
        weight_kg: 0.0,
        volume_m3: 0.0,
    };

    /// Construct a load.
    #[must_use]
    pub const fn new(weight_kg: f64, volume_m3: f64) -> Self {
        Self {
            weight_kg,
            volume_m3,
        }
    }
}

impl Add for Load {
    type Output = Self;

    #[expect(clippy::float_arithmetic, reason = "loads are summed in floating point")]
    fn add(self, rhs: Self) -> Self {
        Self {
            weight_kg: self.weight_kg + rhs.weight_kg,
            volume_m3: self.volume_m3 + rhs.volume_m3,
        }
    }
}

impl AddAssign for Load {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Load {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Operational status of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    /// Idle and ready for work.
    #[default]
    Available,
    /// Currently serving a route.
    InUse,
    /// Off the road for servicing.
    Maintenance,
    /// Permanently withdrawn.
    Retired,
}

impl VehicleStatus {
    /// Whether a vehicle in this status may be given work.
    #[must_use]
    pub const fn is_dispatchable(self) -> bool {
        matches!(self, Self::Available | Self::InUse)
    }
}

/// A vehicle available to the planner.
///
/// Vehicles are read-only inputs; nothing in the engine mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique identifier.
    pub id: VehicleId,
    /// Registration plate or fleet name.
    #[serde(default)]
    pub name: String,
    /// Maximum payload mass in kilograms.
    pub capacity_kg: f64,
    /// Maximum payload volume in cubic metres.
    pub capacity_m3: f64,
    /// Operating cost per kilometre driven.
    pub cost_per_km: f64,
    /// Operational status.
    #[serde(default)]
    pub status: VehicleStatus,
}

impl Vehicle {
    /// Capacity expressed as a [`Load`].
    #[must_use]
    pub const fn capacity(&self) -> Load {
        Load::new(self.capacity_kg, self.capacity_m3)
    }

    /// Whether `load` fits within this vehicle's weight and volume limits.
    #[must_use]
    pub fn can_carry(&self, load: Load) -> bool {
        load.weight_kg <= self.capacity_kg && load.volume_m3 <= self.capacity_m3
    }

    /// Fraction of capacity used by `load`.
    ///
    /// Weight and volume are measured separately and the larger ratio is
    /// returned. A dimension with zero capacity contributes nothing.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "utilization is a ratio")]
    pub fn utilization(&self, load: Load) -> f64 {
        let ratio = |used: f64, capacity: f64| {
            if capacity > 0.0 {
                used / capacity
            } else {
                0.0
            }
        };
        ratio(load.weight_kg, self.capacity_kg).max(ratio(load.volume_m3, self.capacity_m3))
    }
}

/// The fixed origin and return point of a routing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    /// Unique identifier.
    pub id: DepotId,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Position as longitude (`x`) and latitude (`y`).
    pub location: Coord<f64>,
    /// Time vehicles leave the depot; starts the simulated clock.
    pub departure_at: DateTime<Utc>,
}

/// Raised when a load exceeds a vehicle's capacity.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapacityError {
    /// Total weight exceeds the vehicle's weight limit.
    #[error("vehicle {vehicle_id} carries at most {capacity_kg} kg but {required_kg} kg is required")]
    WeightExceeded {
        /// Vehicle that cannot carry the load.
        vehicle_id: VehicleId,
        /// Weight that must be carried.
        required_kg: f64,
        /// Weight limit.
        capacity_kg: f64,
    },
    /// Total volume exceeds the vehicle's volume limit.
    #[error(
        "vehicle {vehicle_id} carries at most {capacity_m3} m3 but {required_m3} m3 is required"
    )]
    VolumeExceeded {
        /// Vehicle that cannot carry the load.
        vehicle_id: VehicleId,
        /// Volume that must be carried.
        required_m3: f64,
        /// Volume limit.
        capacity_m3: f64,
    },
}

impl CapacityError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Capacity
    }
}

/// Check that `load` fits on `vehicle`.
///
/// # Errors
///
/// Returns [`CapacityError`] naming the first exceeded dimension, weight
/// before volume.
///
/// # Examples
///
/// ```
/// use tms_core::{Load, Vehicle, VehicleId, VehicleStatus, validate_route_capacity};
///
/// let vehicle = Vehicle {
///     id: VehicleId::random(),
///     name: "van-1".into(),
///     capacity_kg: 300.0,
///     capacity_m3: 10.0,
///     cost_per_km: 1.5,
///     status: VehicleStatus::Available,
/// };
/// assert!(validate_route_capacity(&vehicle, Load::new(150.0, 2.0)).is_ok());
/// assert!(validate_route_capacity(&vehicle, Load::new(400.0, 2.0)).is_err());
/// ```
pub fn validate_route_capacity(vehicle: &Vehicle, load: Load) -> Result<(), CapacityError> {
    if load.weight_kg > vehicle.capacity_kg {
        return Err(CapacityError::WeightExceeded {
            vehicle_id: vehicle.id,
            required_kg: load.weight_kg,
            capacity_kg: vehicle.capacity_kg,
        });
    }
    if load.volume_m3 > vehicle.capacity_m3 {
        return Err(CapacityError::VolumeExceeded {
            vehicle_id: vehicle.id,
            required_m3: load.volume_m3,
            capacity_m3: vehicle.capacity_m3,
        });
    }
    Ok(())
}
