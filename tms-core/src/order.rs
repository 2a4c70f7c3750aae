//! Delivery orders and their admission rules.

use chrono::{DateTime, Utc};
use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ErrorKind, Load, OrderId, OrderStatus, TimeWindow};

/// Urgency tier of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Deliver when convenient.
    Low,
    /// Standard service.
    #[default]
    Normal,
    /// Time-sensitive; a deadline is mandatory.
    High,
    /// Must not slip; a deadline is mandatory.
    Critical,
}

impl Priority {
    /// Whether orders at this tier must carry a `required_by` deadline.
    #[must_use]
    pub const fn requires_deadline(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// A geocoded address. The engine never geocodes; callers supply the
/// coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Free-form address text.
    #[serde(default)]
    pub label: String,
    /// Longitude (`x`) and latitude (`y`).
    pub location: Coord<f64>,
}

/// A delivery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier.
    pub id: OrderId,
    /// Customer-facing order number.
    #[serde(default)]
    pub reference: String,
    /// Pickup address.
    pub origin: Address,
    /// Delivery address; the planner routes to this point.
    pub destination: Address,
    /// Mass in kilograms.
    pub weight_kg: f64,
    /// Volume in cubic metres.
    #[serde(default)]
    pub volume_m3: f64,
    /// Urgency tier.
    #[serde(default)]
    pub priority: Priority,
    /// Latest acceptable delivery time.
    #[serde(default)]
    pub required_by: Option<DateTime<Utc>>,
    /// Customer's receiving window.
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: OrderStatus,
    /// When the order entered the system.
    pub created_at: DateTime<Utc>,
}

/// Reasons an order is refused before planning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderValidationError {
    /// Weight was zero, negative or not finite.
    #[error("order weight must be a positive number of kilograms, got {value}")]
    InvalidWeight {
        /// Offending value.
        value: f64,
    },
    /// Volume was negative or not finite.
    #[error("order volume must be a non-negative number of cubic metres, got {value}")]
    InvalidVolume {
        /// Offending value.
        value: f64,
    },
    /// A high or critical order carried no deadline.
    #[error("{priority:?} priority orders require a required_by deadline")]
    MissingDeadline {
        /// Priority of the order.
        priority: Priority,
    },
}

impl OrderValidationError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Input
    }
}

impl Order {
    /// Check the order is fit for planning.
    ///
    /// # Errors
    ///
    /// Returns the first rule the order breaks.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(OrderValidationError::InvalidWeight {
                value: self.weight_kg,
            });
        }
        if !(self.volume_m3.is_finite() && self.volume_m3 >= 0.0) {
            return Err(OrderValidationError::InvalidVolume {
                value: self.volume_m3,
            });
        }
        if self.priority.requires_deadline() && self.required_by.is_none() {
            return Err(OrderValidationError::MissingDeadline {
                priority: self.priority,
            });
        }
        Ok(())
    }

    /// Weight and volume of this order.
    #[must_use]
    pub const fn load(&self) -> Load {
        Load::new(self.weight_kg, self.volume_m3)
    }

    /// Delivery coordinate.
    #[must_use]
    pub const fn location(&self) -> Coord<f64> {
        self.destination.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::order;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(Priority::High)]
    #[case(Priority::Critical)]
    fn urgent_orders_need_a_deadline(#[case] priority: Priority) {
        let mut urgent = order(1, 0.0, 0.0, 10.0);
        urgent.priority = priority;
        urgent.required_by = None;
        assert_eq!(
            urgent.validate(),
            Err(OrderValidationError::MissingDeadline { priority })
        );
    }

    #[rstest]
    fn critical_order_with_deadline_is_accepted() {
        let mut urgent = order(1, 0.0, 0.0, 10.0);
        urgent.priority = Priority::Critical;
        urgent.required_by = Utc.with_ymd_and_hms(2025, 1, 1, 17, 0, 0).single();
        assert!(urgent.validate().is_ok());
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn non_positive_weight_is_rejected(#[case] weight: f64) {
        let bad = order(1, 0.0, 0.0, weight);
        assert!(matches!(
            bad.validate(),
            Err(OrderValidationError::InvalidWeight { .. })
        ));
    }

    #[rstest]
    fn negative_volume_is_rejected() {
        let mut bad = order(1, 0.0, 0.0, 5.0);
        bad.volume_m3 = -0.5;
        assert!(matches!(
            bad.validate(),
            Err(OrderValidationError::InvalidVolume { .. })
        ));
    }

    #[rstest]
    fn low_priority_orders_may_omit_deadline() {
        let mut relaxed = order(1, 0.0, 0.0, 5.0);
        relaxed.priority = Priority::Low;
        assert!(relaxed.validate().is_ok());
    }
}
