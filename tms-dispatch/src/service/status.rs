//! Stop and order status changes.

use chrono::{DateTime, Utc};
use serde_json::json;
use tms_core::{
    Actor, AuditAction, AuditSink, Clock, DispatchEvent, EntityKind, EventKind, EventSink, Order,
    OrderId, OrderRepository, RouteRepository, RouteStop, StopId, StopStatus, TransactionalStore,
    UnitOfWork, check_sequence, validate_order_transition, validate_stop_transition,
};

use super::{Committed, DispatchService, audit_entry, event};
use crate::{DispatchError, OrderStatusUpdate, StopStatusUpdate, TimeWindowPolicy};

impl<S, A, E, C> DispatchService<S, A, E, C>
where
    S: TransactionalStore,
    A: AuditSink,
    E: EventSink,
    C: Clock,
{
    /// Move a stop through its lifecycle.
    ///
    /// Completing a stop requires every earlier stop on the route to be
    /// completed or failed, and the completion time to fall inside the
    /// order's time window unless the update overrides it. Arrival and
    /// departure times are stamped from `at`, or the service clock. A failed
    /// stop is only retried while no other stop has claimed its order.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::StopNotFound`] or [`DispatchError::OrderNotFound`]
    ///   for unknown ids.
    /// - [`DispatchError::OrderAlreadyRouted`] when retrying a failed stop
    ///   whose order is now served by another stop.
    /// - [`DispatchError::Transition`] for a forbidden edge, an open earlier
    ///   stop, or an enforced time-window violation.
    pub fn update_stop_status(&self, update: &StopStatusUpdate) -> Result<RouteStop, DispatchError> {
        let committed = self.commit_stop_status(update)?;
        Ok(self.announce(committed))
    }

    fn commit_stop_status(
        &self,
        update: &StopStatusUpdate,
    ) -> Result<Committed<RouteStop>, DispatchError> {
        let (_held, mut unit, mut stop) = self.lock_stop(update.stop_id, true)?;
        let previous = stop.status;
        validate_stop_transition(previous, update.status)?;
        if update.status.is_active()
            && !previous.is_active()
            && let Some(existing) = unit.active_stop_for_order(stop.order_id)?
            && existing.id != stop.id
        {
            return Err(DispatchError::OrderAlreadyRouted {
                order_id: stop.order_id,
                stop_id: existing.id,
            });
        }
        let at = update.at.unwrap_or_else(|| self.clock.now());

        let mut window_overridden = false;
        if update.status == StopStatus::Completed {
            check_sequence(stop.id, &unit.stops_for_route(stop.route_id)?)?;
            let order = unit
                .order(stop.order_id)?
                .ok_or(DispatchError::OrderNotFound {
                    order_id: stop.order_id,
                })?;
            if let Some(window) = order.time_window
                && let Err(violation) = window.check(at.time())
            {
                match update.time_window {
                    TimeWindowPolicy::Enforce => return Err(violation.into()),
                    TimeWindowPolicy::Override => {
                        log::warn!("stop {} completed outside its window: {violation}", stop.id);
                        window_overridden = true;
                    }
                }
            }
        }

        stop.status = update.status;
        match update.status {
            StopStatus::InProgress => stop.actual_arrival = Some(at),
            StopStatus::Completed => {
                stop.actual_arrival = stop.actual_arrival.or(Some(at));
                stop.actual_departure = Some(at);
            }
            StopStatus::Failed => stop.failure_reason.clone_from(&update.failure_reason),
            StopStatus::Pending => stop.failure_reason = None,
        }
        unit.save_stop(&stop)?;
        unit.commit()?;
        log::info!("stop {} moved from {previous} to {}", stop.id, stop.status);

        let now = self.clock.now();
        let audit = audit_entry(
            &update.actor,
            AuditAction::UpdateStopStatus,
            EntityKind::Stop,
            stop.id.to_string(),
            json!({
                "old_status": previous,
                "new_status": stop.status,
                "at": at,
                "failure_reason": stop.failure_reason,
                "time_window_override": window_overridden,
            }),
            now,
        );
        let notice = stop_status_event(&stop, now);
        Ok(Committed {
            value: stop,
            audit,
            event: notice,
        })
    }

    /// Move an order through its lifecycle.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::OrderNotFound`] for an unknown order.
    /// - [`DispatchError::Transition`] for a forbidden edge.
    pub fn update_order_status(&self, update: &OrderStatusUpdate) -> Result<Order, DispatchError> {
        let committed = self.commit_order_status(update)?;
        Ok(self.announce(committed))
    }

    fn commit_order_status(
        &self,
        update: &OrderStatusUpdate,
    ) -> Result<Committed<Order>, DispatchError> {
        let order_id = update.order_id;
        let _held = self.order_locks.lock([order_id]);
        let mut unit = self.store.begin()?;
        let mut order = unit
            .order(order_id)?
            .ok_or(DispatchError::OrderNotFound { order_id })?;
        let previous = order.status;
        validate_order_transition(previous, update.status)?;
        order.status = update.status;
        unit.save_order(&order)?;
        unit.commit()?;
        log::info!("order {order_id} moved from {previous} to {}", order.status);

        let now = self.clock.now();
        let audit = audit_entry(
            &update.actor,
            AuditAction::UpdateOrderStatus,
            EntityKind::Order,
            order_id.to_string(),
            json!({ "old_status": previous, "new_status": order.status }),
            now,
        );
        let notice = order_status_event(&order, now);
        Ok(Committed {
            value: order,
            audit,
            event: notice,
        })
    }

    /// Return a completed stop to `in_progress`.
    ///
    /// The recorded departure is cleared; the arrival is kept.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::MissingReason`] when `reason` is blank.
    /// - [`DispatchError::StopNotFound`] for an unknown stop.
    /// - [`DispatchError::Transition`] unless the stop is completed.
    pub fn reopen_stop(
        &self,
        stop_id: StopId,
        reason: &str,
        actor: &Actor,
    ) -> Result<RouteStop, DispatchError> {
        let committed = self.commit_reopened_stop(stop_id, reason, actor)?;
        Ok(self.announce(committed))
    }

    fn commit_reopened_stop(
        &self,
        stop_id: StopId,
        reason: &str,
        actor: &Actor,
    ) -> Result<Committed<RouteStop>, DispatchError> {
        let stated = required_reason(reason, "stop")?;
        let (_held, mut unit, mut stop) = self.lock_stop(stop_id, false)?;
        let previous = stop.status;
        stop.status = tms_core::reopen_stop(previous)?;
        stop.actual_departure = None;
        unit.save_stop(&stop)?;
        unit.commit()?;
        log::info!("stop {stop_id} reopened: {stated}");

        let now = self.clock.now();
        let audit = audit_entry(
            actor,
            AuditAction::ReopenStop,
            EntityKind::Stop,
            stop_id.to_string(),
            json!({ "old_status": previous, "new_status": stop.status, "reason": stated }),
            now,
        );
        let notice = stop_status_event(&stop, now);
        Ok(Committed {
            value: stop,
            audit,
            event: notice,
        })
    }

    /// Return a delivered order to `picked_up`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::MissingReason`] when `reason` is blank.
    /// - [`DispatchError::OrderNotFound`] for an unknown order.
    /// - [`DispatchError::Transition`] unless the order is delivered.
    pub fn reopen_order(
        &self,
        order_id: OrderId,
        reason: &str,
        actor: &Actor,
    ) -> Result<Order, DispatchError> {
        let committed = self.commit_reopened_order(order_id, reason, actor)?;
        Ok(self.announce(committed))
    }

    fn commit_reopened_order(
        &self,
        order_id: OrderId,
        reason: &str,
        actor: &Actor,
    ) -> Result<Committed<Order>, DispatchError> {
        let stated = required_reason(reason, "order")?;
        let _held = self.order_locks.lock([order_id]);
        let mut unit = self.store.begin()?;
        let mut order = unit
            .order(order_id)?
            .ok_or(DispatchError::OrderNotFound { order_id })?;
        let previous = order.status;
        order.status = tms_core::reopen_order(previous)?;
        unit.save_order(&order)?;
        unit.commit()?;
        log::info!("order {order_id} reopened: {stated}");

        let now = self.clock.now();
        let audit = audit_entry(
            actor,
            AuditAction::ReopenOrder,
            EntityKind::Order,
            order_id.to_string(),
            json!({ "old_status": previous, "new_status": order.status, "reason": stated }),
            now,
        );
        let notice = order_status_event(&order, now);
        Ok(Committed {
            value: order,
            audit,
            event: notice,
        })
    }
}

fn required_reason<'a>(reason: &'a str, entity: &'static str) -> Result<&'a str, DispatchError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(DispatchError::MissingReason { entity });
    }
    Ok(trimmed)
}

fn stop_status_event(stop: &RouteStop, at: DateTime<Utc>) -> DispatchEvent {
    event(
        EventKind::StatusUpdate,
        json!({
            "entity_type": EntityKind::Stop,
            "stop_id": stop.id,
            "route_id": stop.route_id,
            "order_id": stop.order_id,
            "status": stop.status,
        }),
        at,
    )
}

fn order_status_event(order: &Order, at: DateTime<Utc>) -> DispatchEvent {
    event(
        EventKind::StatusUpdate,
        json!({
            "entity_type": EntityKind::Order,
            "order_id": order.id,
            "status": order.status,
        }),
        at,
    )
}
