//! `DispatchService`: reassignment and status operations.

mod reassign;
mod status;
mod stops;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tms_core::{
    Actor, AuditAction, AuditEntry, AuditSink, Clock, DispatchEvent, EntityKind, EventKind,
    EventSink, Load, OrderId, OrderRepository, PersistenceError, ReassignmentLog,
    ReassignmentLogRepository, RouteId, RouteRepository, RouteStop, StopId, SystemClock,
    TransactionalStore, UnitOfWork,
};

use crate::DispatchError;
use crate::locks::{KeyGuard, KeyedLocks};

/// Attempts to pin a stop to its route before giving up.
const LOCK_ATTEMPTS: usize = 3;

/// Applies dispatch operations to a [`TransactionalStore`].
///
/// The service is `Sync` when its collaborators are, so one instance can be
/// shared across request handlers. Operations on the same route or order
/// run one at a time; operations on disjoint routes run concurrently.
#[derive(Debug)]
pub struct DispatchService<S, A, E, C = SystemClock> {
    store: S,
    audit: A,
    events: E,
    clock: C,
    route_locks: KeyedLocks<RouteId>,
    order_locks: KeyedLocks<OrderId>,
}

/// A committed change and the records announcing it.
struct Committed<T> {
    value: T,
    audit: AuditEntry,
    event: DispatchEvent,
}

/// Locks held for the lifetime of one operation.
struct Held {
    _routes: KeyGuard,
    _orders: Option<KeyGuard>,
}

impl<S, A, E> DispatchService<S, A, E>
where
    S: TransactionalStore,
    A: AuditSink,
    E: EventSink,
{
    /// Create a service stamping records with the system clock.
    pub fn new(store: S, audit: A, events: E) -> Self {
        Self::with_clock(store, audit, events, SystemClock)
    }
}

impl<S, A, E, C> DispatchService<S, A, E, C>
where
    S: TransactionalStore,
    A: AuditSink,
    E: EventSink,
    C: Clock,
{
    /// Create a service with an explicit clock.
    pub fn with_clock(store: S, audit: A, events: E, clock: C) -> Self {
        Self {
            store,
            audit,
            events,
            clock,
            route_locks: KeyedLocks::default(),
            order_locks: KeyedLocks::default(),
        }
    }

    /// Store the service writes to.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Reassignments recorded against `route_id`, newest first.
    ///
    /// Stop moves appear in the history of both their source and target
    /// routes.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::RouteNotFound`] for an unknown route, or
    /// [`DispatchError::Persistence`] when the store fails.
    pub fn reassignment_history(
        &self,
        route_id: RouteId,
    ) -> Result<Vec<ReassignmentLog>, DispatchError> {
        let unit = self.store.begin()?;
        if unit.route(route_id)?.is_none() {
            return Err(DispatchError::RouteNotFound { route_id });
        }
        Ok(unit.reassignments_for_route(route_id)?)
    }

    /// Lock the route holding `stop_id` and, optionally, its order, then
    /// open a unit of work in which the stop is known to still be on that
    /// route.
    fn lock_stop(
        &self,
        stop_id: StopId,
        lock_order: bool,
    ) -> Result<(Held, S::Unit<'_>, RouteStop), DispatchError> {
        for attempt in 1..=LOCK_ATTEMPTS {
            let peeked = self
                .store
                .begin()?
                .stop(stop_id)?
                .ok_or(DispatchError::StopNotFound { stop_id })?;
            let held = Held {
                _routes: self.route_locks.lock([peeked.route_id]),
                _orders: lock_order.then(|| self.order_locks.lock([peeked.order_id])),
            };
            let unit = self.store.begin()?;
            let stop = unit
                .stop(stop_id)?
                .ok_or(DispatchError::StopNotFound { stop_id })?;
            if stop.route_id == peeked.route_id {
                return Ok((held, unit, stop));
            }
            log::debug!("stop {stop_id} changed route during lock attempt {attempt}");
        }
        Err(DispatchError::ConcurrentModification { stop_id })
    }

    /// Deliver the records of a committed change, logging sink failures.
    fn announce<T>(&self, committed: Committed<T>) -> T {
        let Committed {
            value,
            audit,
            event,
        } = committed;
        let action = audit.action;
        if let Err(err) = self.audit.record(audit) {
            log::warn!("audit sink rejected {action:?} entry: {err}");
        }
        let kind = event.kind;
        if let Err(err) = self.events.publish(event) {
            log::warn!("event sink rejected {kind:?} event: {err}");
        }
        value
    }
}

/// Build an audit entry.
fn audit_entry(
    actor: &Actor,
    action: AuditAction,
    entity_type: EntityKind,
    entity_id: String,
    changes: Value,
    at: DateTime<Utc>,
) -> AuditEntry {
    AuditEntry {
        actor: actor.clone(),
        action,
        entity_type,
        entity_id,
        changes,
        recorded_at: at,
    }
}

/// Build an event.
const fn event(kind: EventKind, payload: Value, at: DateTime<Utc>) -> DispatchEvent {
    DispatchEvent {
        kind,
        payload,
        emitted_at: at,
    }
}

/// Zero-based insertion index and one-based sequence for a `requested`
/// position on a route whose stops are `lane`. Absent means the end.
///
/// A pending stop may not land before a stop that is already in progress
/// or completed.
fn insertion_point(
    requested: Option<u32>,
    lane: &[RouteStop],
) -> Result<(usize, u32), DispatchError> {
    let len = lane.len();
    let max = u32::try_from(len).map_or(u32::MAX, |count| count.saturating_add(1));
    let sequence = requested.unwrap_or(max);
    if sequence == 0 || sequence > max {
        return Err(DispatchError::SequenceOutOfRange { sequence, max });
    }
    let started = lane
        .iter()
        .rposition(|stop| !stop.status.is_movable())
        .map_or(0, |index| index.saturating_add(1));
    let min = u32::try_from(started).map_or(u32::MAX, |count| count.saturating_add(1));
    if sequence < min {
        return Err(DispatchError::SequenceBeforeStartedStop { sequence, min });
    }
    Ok((usize::try_from(sequence - 1).unwrap_or(len), sequence))
}

/// Stage every stop in `stops` whose id is in `changed`.
fn save_changed<U: UnitOfWork>(
    unit: &mut U,
    stops: &[RouteStop],
    changed: &[StopId],
) -> Result<(), PersistenceError> {
    for stop in stops.iter().filter(|stop| changed.contains(&stop.id)) {
        unit.save_stop(stop)?;
    }
    Ok(())
}

/// Weight and volume still to be delivered by `stops`.
fn open_load<U: OrderRepository>(unit: &U, stops: &[RouteStop]) -> Result<Load, DispatchError> {
    let mut load = Load::ZERO;
    for stop in stops.iter().filter(|stop| !stop.status.is_settled()) {
        let order = unit
            .order(stop.order_id)?
            .ok_or(DispatchError::OrderNotFound {
                order_id: stop.order_id,
            })?;
        load += order.load();
    }
    Ok(load)
}
