//! Route and stop reassignment.

use serde_json::json;
use tms_core::{
    AuditAction, AuditSink, Clock, EntityKind, EventKind, EventSink, OrderRepository,
    ReassignmentId, ReassignmentLog, ReassignmentLogRepository, RouteRepository, RouteStop,
    TransactionalStore, UnitOfWork, VehicleRepository, is_contiguous, resequence,
    validate_route_capacity,
};

use super::{Committed, DispatchService, audit_entry, event, insertion_point, open_load};
use crate::{DispatchError, ReassignRouteRequest, ReassignStopRequest};

impl<S, A, E, C> DispatchService<S, A, E, C>
where
    S: TransactionalStore,
    A: AuditSink,
    E: EventSink,
    C: Clock,
{
    /// Hand a route to a new driver, vehicle or both.
    ///
    /// A new vehicle must exist, be dispatchable and have room for every
    /// stop still open on the route. One reassignment log entry and one
    /// audit entry record the before and after assignment.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::RouteNotFound`] or [`DispatchError::VehicleNotFound`]
    ///   for unknown ids.
    /// - [`DispatchError::StaleAssignment`] when a stated `from_*` value no
    ///   longer matches the route.
    /// - [`DispatchError::EmptyReassignment`] when the request names no new
    ///   driver or vehicle, or only the ones the route already has.
    /// - [`DispatchError::VehicleNotDispatchable`] or
    ///   [`DispatchError::Capacity`] when the vehicle cannot take the route.
    /// - [`DispatchError::Persistence`] when the store fails.
    pub fn reassign_route(
        &self,
        request: &ReassignRouteRequest,
    ) -> Result<ReassignmentLog, DispatchError> {
        let committed = self.commit_route_reassignment(request)?;
        Ok(self.announce(committed))
    }

    fn commit_route_reassignment(
        &self,
        request: &ReassignRouteRequest,
    ) -> Result<Committed<ReassignmentLog>, DispatchError> {
        let route_id = request.route_id;
        let _held = self.route_locks.lock([route_id]);
        let mut unit = self.store.begin()?;
        let route = unit
            .route(route_id)?
            .ok_or(DispatchError::RouteNotFound { route_id })?;

        if request
            .from_driver_id
            .is_some_and(|driver| route.driver_id != Some(driver))
        {
            return Err(DispatchError::StaleAssignment {
                route_id,
                field: "driver",
            });
        }
        if request
            .from_vehicle_id
            .is_some_and(|vehicle| vehicle != route.vehicle_id)
        {
            return Err(DispatchError::StaleAssignment {
                route_id,
                field: "vehicle",
            });
        }
        let new_driver = request
            .to_driver_id
            .is_some_and(|driver| route.driver_id != Some(driver));
        let new_vehicle = request
            .to_vehicle_id
            .is_some_and(|vehicle| vehicle != route.vehicle_id);
        if !new_driver && !new_vehicle {
            return Err(DispatchError::EmptyReassignment { route_id });
        }

        let mut updated = route.clone();
        if let Some(driver) = request.to_driver_id {
            updated.driver_id = Some(driver);
        }
        if let Some(vehicle_id) = request
            .to_vehicle_id
            .filter(|vehicle_id| *vehicle_id != route.vehicle_id)
        {
            let vehicle = unit
                .vehicle(vehicle_id)?
                .ok_or(DispatchError::VehicleNotFound { vehicle_id })?;
            if !vehicle.status.is_dispatchable() {
                return Err(DispatchError::VehicleNotDispatchable {
                    vehicle_id,
                    status: vehicle.status,
                });
            }
            let stops = unit.stops_for_route(route_id)?;
            validate_route_capacity(&vehicle, open_load(&unit, &stops)?)?;
            updated.vehicle_id = vehicle_id;
        }
        unit.save_route(&updated)?;

        let now = self.clock.now();
        let entry = ReassignmentLog {
            id: ReassignmentId::random(),
            route_id,
            stop_id: None,
            from_route_id: None,
            to_route_id: None,
            from_sequence: None,
            to_sequence: None,
            from_driver_id: route.driver_id,
            to_driver_id: updated.driver_id,
            from_vehicle_id: Some(route.vehicle_id),
            to_vehicle_id: Some(updated.vehicle_id),
            reason: request.reason.clone(),
            notes: request.notes.clone(),
            actor: request.actor.clone(),
            created_at: now,
        };
        unit.append_reassignment(&entry)?;
        unit.commit()?;
        log::info!(
            "route {route_id} reassigned to vehicle {} ({})",
            updated.vehicle_id,
            request.reason
        );

        let audit = audit_entry(
            &request.actor,
            AuditAction::ReassignRoute,
            EntityKind::Route,
            route_id.to_string(),
            json!({
                "old_driver_id": route.driver_id,
                "new_driver_id": updated.driver_id,
                "old_vehicle_id": route.vehicle_id,
                "new_vehicle_id": updated.vehicle_id,
                "reason": request.reason,
                "notes": request.notes,
            }),
            now,
        );
        let notice = event(
            EventKind::RouteReassigned,
            json!({
                "route_id": route_id,
                "driver_id": updated.driver_id,
                "vehicle_id": updated.vehicle_id,
                "reason": request.reason,
            }),
            now,
        );
        Ok(Committed {
            value: entry,
            audit,
            event: notice,
        })
    }

    /// Move a stop to another route, or to another position on its own.
    ///
    /// Both routes are locked for the whole operation. A stop moving to
    /// another route counts against that route's vehicle capacity, whatever
    /// its status. The stop lands at
    /// `new_sequence` (the end of the target route when absent) and every
    /// stop on both routes is renumbered to a contiguous `1..=N` within the
    /// same unit of work, so no reader ever sees a gap or a duplicate.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::StopNotFound`], [`DispatchError::RouteNotFound`]
    ///   or [`DispatchError::TargetRouteNotFound`] for unknown ids.
    /// - [`DispatchError::StopNotOnRoute`] when the stop is not on
    ///   `from_route_id`.
    /// - [`DispatchError::StopNotMovable`] unless the stop is pending or
    ///   failed.
    /// - [`DispatchError::Capacity`] when the target route's vehicle cannot
    ///   take the stop's order.
    /// - [`DispatchError::SequenceOutOfRange`] for a position outside
    ///   `1..=N+1`.
    /// - [`DispatchError::SequenceBeforeStartedStop`] for a position ahead of
    ///   a stop already in progress or completed.
    /// - [`DispatchError::Persistence`] when the store fails.
    pub fn reassign_stop(
        &self,
        request: &ReassignStopRequest,
    ) -> Result<ReassignmentLog, DispatchError> {
        let committed = self.commit_stop_reassignment(request)?;
        Ok(self.announce(committed))
    }

    fn commit_stop_reassignment(
        &self,
        request: &ReassignStopRequest,
    ) -> Result<Committed<ReassignmentLog>, DispatchError> {
        let stop_id = request.stop_id;
        let from = request.from_route_id;
        let to = request.to_route_id;
        let _held = self.route_locks.lock([from, to]);
        let mut unit = self.store.begin()?;

        let stop = unit
            .stop(stop_id)?
            .ok_or(DispatchError::StopNotFound { stop_id })?;
        if unit.route(from)?.is_none() {
            return Err(DispatchError::RouteNotFound { route_id: from });
        }
        let target_route = unit
            .route(to)?
            .ok_or(DispatchError::TargetRouteNotFound { route_id: to })?;
        if stop.route_id != from {
            return Err(DispatchError::StopNotOnRoute {
                stop_id,
                route_id: from,
            });
        }
        if !stop.status.is_movable() {
            return Err(DispatchError::StopNotMovable {
                stop_id,
                status: stop.status,
            });
        }

        let mut source: Vec<RouteStop> = unit
            .stops_for_route(from)?
            .into_iter()
            .filter(|other| other.id != stop_id)
            .collect();
        let mut target = if from == to {
            Vec::new()
        } else {
            unit.stops_for_route(to)?
        };
        if from != to {
            let vehicle_id = target_route.vehicle_id;
            let vehicle = unit
                .vehicle(vehicle_id)?
                .ok_or(DispatchError::VehicleNotFound { vehicle_id })?;
            let order = unit
                .order(stop.order_id)?
                .ok_or(DispatchError::OrderNotFound {
                    order_id: stop.order_id,
                })?;
            let mut load = open_load(&unit, &target)?;
            load += order.load();
            validate_route_capacity(&vehicle, load)?;
        }
        let lane = if from == to { &mut source } else { &mut target };
        let (index, new_sequence) = insertion_point(request.new_sequence, lane)?;
        lane.insert(
            index,
            RouteStop {
                route_id: to,
                ..stop.clone()
            },
        );

        let mut resequenced = resequence(&mut source);
        resequenced.extend(resequence(&mut target));
        resequenced.retain(|id| *id != stop_id);
        debug_assert!(
            is_contiguous(&source) && is_contiguous(&target),
            "resequencing leaves both routes contiguous"
        );
        for changed in source
            .iter()
            .chain(&target)
            .filter(|other| other.id == stop_id || resequenced.contains(&other.id))
        {
            unit.save_stop(changed)?;
        }

        let now = self.clock.now();
        let entry = ReassignmentLog {
            id: ReassignmentId::random(),
            route_id: from,
            stop_id: Some(stop_id),
            from_route_id: Some(from),
            to_route_id: Some(to),
            from_sequence: Some(stop.sequence),
            to_sequence: Some(new_sequence),
            from_driver_id: None,
            to_driver_id: None,
            from_vehicle_id: None,
            to_vehicle_id: None,
            reason: request.reason.clone(),
            notes: request.notes.clone(),
            actor: request.actor.clone(),
            created_at: now,
        };
        unit.append_reassignment(&entry)?;
        unit.commit()?;
        log::info!(
            "stop {stop_id} moved from route {from} #{} to route {to} #{new_sequence}; {} stops renumbered",
            stop.sequence,
            resequenced.len()
        );

        let audit = audit_entry(
            &request.actor,
            AuditAction::ReassignStop,
            EntityKind::Stop,
            stop_id.to_string(),
            json!({
                "old_route_id": from,
                "new_route_id": to,
                "old_sequence": stop.sequence,
                "new_sequence": new_sequence,
                "resequenced": resequenced,
                "reason": request.reason,
                "notes": request.notes,
            }),
            now,
        );
        let notice = event(
            EventKind::StopReassigned,
            json!({
                "stop_id": stop_id,
                "order_id": stop.order_id,
                "from_route_id": from,
                "to_route_id": to,
                "sequence": new_sequence,
            }),
            now,
        );
        Ok(Committed {
            value: entry,
            audit,
            event: notice,
        })
    }
}
