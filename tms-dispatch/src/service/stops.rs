//! Adding stops to and removing stops from a route.

use serde_json::json;
use tms_core::{
    Actor, AuditAction, AuditSink, Clock, EntityKind, EventKind, EventSink, OrderRepository,
    OrderStatus, RouteRepository, RouteStop, StopId, TransactionalStore, UnitOfWork,
    VehicleRepository, resequence, validate_order_transition, validate_route_capacity,
};

use super::{
    Committed, DispatchService, audit_entry, event, insertion_point, open_load, save_changed,
};
use crate::{AddStopRequest, DispatchError};

impl<S, A, E, C> DispatchService<S, A, E, C>
where
    S: TransactionalStore,
    A: AuditSink,
    E: EventSink,
    C: Clock,
{
    /// Put an order onto a route as a new pending stop.
    ///
    /// The stop is inserted at `sequence` (the end when absent) and later
    /// stops shift down by one. A pending order becomes assigned.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::RouteNotFound`], [`DispatchError::OrderNotFound`]
    ///   or [`DispatchError::VehicleNotFound`] for unknown ids.
    /// - [`DispatchError::OrderNotRoutable`] unless the order is pending or
    ///   assigned.
    /// - [`DispatchError::OrderAlreadyRouted`] when another active stop
    ///   serves the order.
    /// - [`DispatchError::Capacity`] when the route's vehicle cannot take
    ///   the extra load.
    /// - [`DispatchError::SequenceOutOfRange`] for a position outside
    ///   `1..=N+1`.
    /// - [`DispatchError::SequenceBeforeStartedStop`] for a position ahead of
    ///   a stop already in progress or completed.
    pub fn add_stop(&self, request: &AddStopRequest) -> Result<RouteStop, DispatchError> {
        let committed = self.commit_added_stop(request)?;
        Ok(self.announce(committed))
    }

    fn commit_added_stop(
        &self,
        request: &AddStopRequest,
    ) -> Result<Committed<RouteStop>, DispatchError> {
        let route_id = request.route_id;
        let order_id = request.order_id;
        let _routes = self.route_locks.lock([route_id]);
        let _orders = self.order_locks.lock([order_id]);
        let mut unit = self.store.begin()?;

        let route = unit
            .route(route_id)?
            .ok_or(DispatchError::RouteNotFound { route_id })?;
        let mut order = unit
            .order(order_id)?
            .ok_or(DispatchError::OrderNotFound { order_id })?;
        if !matches!(order.status, OrderStatus::Pending | OrderStatus::Assigned) {
            return Err(DispatchError::OrderNotRoutable {
                order_id,
                status: order.status,
            });
        }
        if let Some(existing) = unit.active_stop_for_order(order_id)? {
            return Err(DispatchError::OrderAlreadyRouted {
                order_id,
                stop_id: existing.id,
            });
        }

        let vehicle = unit
            .vehicle(route.vehicle_id)?
            .ok_or(DispatchError::VehicleNotFound {
                vehicle_id: route.vehicle_id,
            })?;
        let mut stops = unit.stops_for_route(route_id)?;
        let mut load = open_load(&unit, &stops)?;
        load += order.load();
        validate_route_capacity(&vehicle, load)?;

        let (index, sequence) = insertion_point(request.sequence, &stops)?;
        let stop_id = StopId::random();
        stops.insert(
            index,
            RouteStop::pending(stop_id, route_id, order_id, sequence),
        );
        let mut changed = resequence(&mut stops);
        let resequenced = changed.clone();
        changed.push(stop_id);
        save_changed(&mut unit, &stops, &changed)?;

        let previous = order.status;
        if previous == OrderStatus::Pending {
            validate_order_transition(previous, OrderStatus::Assigned)?;
            order.status = OrderStatus::Assigned;
            unit.save_order(&order)?;
        }
        let added = stops
            .into_iter()
            .find(|stop| stop.id == stop_id)
            .ok_or(DispatchError::StopNotFound { stop_id })?;
        unit.commit()?;
        log::info!(
            "order {order_id} added to route {route_id} at #{}",
            added.sequence
        );

        let now = self.clock.now();
        let audit = audit_entry(
            &request.actor,
            AuditAction::AddStop,
            EntityKind::Stop,
            stop_id.to_string(),
            json!({
                "route_id": route_id,
                "order_id": order_id,
                "sequence": added.sequence,
                "resequenced": resequenced,
                "old_order_status": previous,
                "new_order_status": order.status,
            }),
            now,
        );
        let notice = event(
            EventKind::StopAdded,
            json!({
                "stop_id": stop_id,
                "route_id": route_id,
                "order_id": order_id,
                "sequence": added.sequence,
            }),
            now,
        );
        Ok(Committed {
            value: added,
            audit,
            event: notice,
        })
    }

    /// Take a pending or failed stop off its route.
    ///
    /// Remaining stops close up to `1..=N`. An assigned order left without
    /// any active stop returns to pending.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::StopNotFound`] for an unknown stop.
    /// - [`DispatchError::StopNotMovable`] unless the stop is pending or
    ///   failed.
    /// - [`DispatchError::Persistence`] when the store fails.
    pub fn remove_stop(&self, stop_id: StopId, actor: &Actor) -> Result<RouteStop, DispatchError> {
        let committed = self.commit_removed_stop(stop_id, actor)?;
        Ok(self.announce(committed))
    }

    fn commit_removed_stop(
        &self,
        stop_id: StopId,
        actor: &Actor,
    ) -> Result<Committed<RouteStop>, DispatchError> {
        let (_held, mut unit, stop) = self.lock_stop(stop_id, true)?;
        if !stop.status.is_movable() {
            return Err(DispatchError::StopNotMovable {
                stop_id,
                status: stop.status,
            });
        }

        unit.delete_stop(stop_id)?;
        let mut remaining = unit.stops_for_route(stop.route_id)?;
        let resequenced = resequence(&mut remaining);
        save_changed(&mut unit, &remaining, &resequenced)?;

        let mut released = false;
        if let Some(mut order) = unit.order(stop.order_id)?
            && order.status == OrderStatus::Assigned
            && unit.active_stop_for_order(order.id)?.is_none()
        {
            validate_order_transition(order.status, OrderStatus::Pending)?;
            order.status = OrderStatus::Pending;
            unit.save_order(&order)?;
            released = true;
        }
        unit.commit()?;
        log::info!(
            "stop {stop_id} removed from route {}; {} stops renumbered",
            stop.route_id,
            resequenced.len()
        );

        let now = self.clock.now();
        let audit = audit_entry(
            actor,
            AuditAction::RemoveStop,
            EntityKind::Stop,
            stop_id.to_string(),
            json!({
                "route_id": stop.route_id,
                "order_id": stop.order_id,
                "old_sequence": stop.sequence,
                "resequenced": resequenced,
                "order_released": released,
            }),
            now,
        );
        let notice = event(
            EventKind::StopRemoved,
            json!({
                "stop_id": stop_id,
                "route_id": stop.route_id,
                "order_id": stop.order_id,
            }),
            now,
        );
        Ok(Committed {
            value: stop,
            audit,
            event: notice,
        })
    }
}
