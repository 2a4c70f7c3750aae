//! Order lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::EntityKind;

use super::{StatusMachine, TransitionError, validate_transition};

/// Lifecycle status of an order.
///
/// ```text
/// pending -> assigned -> picked_up -> delivered
/// pending <-> cancelled
/// assigned -> pending      (unassign)
/// assigned -> cancelled
/// picked_up -> failed -> pending (retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted but not yet on a route.
    #[default]
    Pending,
    /// Scheduled on a route.
    Assigned,
    /// Collected by the driver.
    PickedUp,
    /// Handed to the customer. Terminal.
    Delivered,
    /// Withdrawn before pickup.
    Cancelled,
    /// Delivery attempt failed.
    Failed,
}

impl OrderStatus {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::PickedUp => "picked_up",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Whether an order in this status still awaits delivery and so takes
    /// part in re-planning. Orders already on board count.
    #[must_use]
    pub const fn is_plannable(self) -> bool {
        !matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StatusMachine for OrderStatus {
    const ENTITY: EntityKind = EntityKind::Order;

    fn allowed_targets(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Assigned, Self::Cancelled],
            Self::Assigned => &[Self::PickedUp, Self::Pending, Self::Cancelled],
            Self::PickedUp => &[Self::Delivered, Self::Failed],
            Self::Delivered => &[],
            Self::Cancelled | Self::Failed => &[Self::Pending],
        }
    }
}

/// Validate an order status change.
///
/// # Errors
///
/// Returns [`TransitionError::InvalidTransition`] for edges outside the
/// table above.
///
/// # Examples
///
/// ```
/// use tms_core::{OrderStatus, validate_order_transition};
///
/// assert!(validate_order_transition(OrderStatus::Pending, OrderStatus::Assigned).is_ok());
/// assert!(validate_order_transition(OrderStatus::Delivered, OrderStatus::Pending).is_err());
/// ```
pub fn validate_order_transition(
    from: OrderStatus,
    to: OrderStatus,
) -> Result<(), TransitionError> {
    validate_transition(from, to)
}

/// Reopen a delivered order, returning it to `picked_up`.
///
/// # Errors
///
/// Returns [`TransitionError::NotReopenable`] unless `from` is
/// [`OrderStatus::Delivered`].
pub fn reopen_order(from: OrderStatus) -> Result<OrderStatus, TransitionError> {
    match from {
        OrderStatus::Delivered => Ok(OrderStatus::PickedUp),
        other => Err(TransitionError::NotReopenable {
            entity: EntityKind::Order,
            from: other.to_string(),
        }),
    }
}
