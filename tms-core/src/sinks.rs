//! Audit and real-time event sinks.
//!
//! Both sinks are notified only after a mutation commits. A sink failure
//! never fails the operation that produced the record.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::EntityKind;

/// The person or system responsible for a change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Wrap an actor name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Actor name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Route driver or vehicle changed.
    ReassignRoute,
    /// Stop moved between or within routes.
    ReassignStop,
    /// Stop appended to a route.
    AddStop,
    /// Stop removed from a route.
    RemoveStop,
    /// Stop status changed.
    UpdateStopStatus,
    /// Order status changed.
    UpdateOrderStatus,
    /// Completed stop reopened.
    ReopenStop,
    /// Delivered order reopened.
    ReopenOrder,
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Who acted.
    pub actor: Actor,
    /// What was done.
    pub action: AuditAction,
    /// Kind of entity changed.
    pub entity_type: EntityKind,
    /// Identifier of the entity changed.
    pub entity_id: String,
    /// Before/after values and context.
    pub changes: Value,
    /// When the change committed.
    pub recorded_at: DateTime<Utc>,
}

/// Real-time event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Vehicle position changed.
    LocationUpdate,
    /// Stop or order status changed.
    StatusUpdate,
    /// Alert raised or cleared.
    AlertUpdate,
    /// Route driver or vehicle changed.
    RouteReassigned,
    /// Stop moved.
    StopReassigned,
    /// Stop appended.
    StopAdded,
    /// Stop removed.
    StopRemoved,
}

/// A notification for real-time clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchEvent {
    /// Event category.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Event body.
    pub payload: Value,
    /// When the event was emitted.
    pub emitted_at: DateTime<Utc>,
}

/// Errors reported by sinks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The sink no longer accepts records.
    #[error("sink is closed")]
    Closed,
    /// The sink refused the record.
    #[error("sink rejected record: {message}")]
    Rejected {
        /// Reason given by the sink.
        message: String,
    },
}

/// Receives audit records.
pub trait AuditSink: Send + Sync {
    /// Record `entry`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the record could not be stored.
    fn record(&self, entry: AuditEntry) -> Result<(), SinkError>;
}

/// Receives real-time events. Delivery is fire-and-forget.
pub trait EventSink: Send + Sync {
    /// Publish `event`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the event could not be queued.
    fn publish(&self, event: DispatchEvent) -> Result<(), SinkError>;
}

impl<T: AuditSink + ?Sized> AuditSink for Arc<T> {
    fn record(&self, entry: AuditEntry) -> Result<(), SinkError> {
        (**self).record(entry)
    }
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn publish(&self, event: DispatchEvent) -> Result<(), SinkError> {
        (**self).publish(event)
    }
}
