//! What a disruption touches: plannable orders, the remaining fleet and the
//! routes left alone by a minimal re-plan.

use std::collections::{HashMap, HashSet};

use tms_core::{CurrentRoute, Order, OrderId, ReplanRequest, RouteResult, Vehicle, VehicleId};

/// Inputs shared by every strategy of one re-planning run.
pub(crate) struct Scope<'a> {
    pub(crate) request: &'a ReplanRequest,
    /// Orders eligible for re-packing, in input order.
    pub(crate) plannable: Vec<&'a Order>,
    /// Vehicles still in service after the event.
    pub(crate) fleet: Vec<&'a Vehicle>,
    removed: Option<VehicleId>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(request: &'a ReplanRequest) -> Self {
        let removed = removed_vehicle(request);
        if let Some(vehicle_id) = removed {
            log::info!(
                "{:?} event takes vehicle {vehicle_id} out of service",
                request.event.kind
            );
        }
        Self {
            request,
            plannable: request
                .orders
                .iter()
                .filter(|order| order.status.is_plannable())
                .collect(),
            fleet: request
                .vehicles
                .iter()
                .filter(|vehicle| Some(vehicle.id) != removed && vehicle.status.is_dispatchable())
                .collect(),
            removed,
        }
    }

    pub(crate) fn plannable_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.plannable.iter().map(|order| order.id)
    }

    pub(crate) fn plannable_order(&self, id: OrderId) -> Option<&'a Order> {
        self.plannable.iter().copied().find(|order| order.id == id)
    }

    fn in_fleet(&self, vehicle_id: VehicleId) -> bool {
        self.fleet.iter().any(|vehicle| vehicle.id == vehicle_id)
    }

    /// Whether a minimal re-plan must rebuild `route`.
    ///
    /// With neither a route nor a vehicle on the event every route is
    /// affected.
    fn is_affected(&self, route: &CurrentRoute) -> bool {
        let event = &self.request.event;
        if event.route_id.is_none() && event.vehicle_id.is_none() && self.removed.is_none() {
            return true;
        }
        event.route_id == Some(route.route_id)
            || event.vehicle_id == Some(route.vehicle_id)
            || self.removed == Some(route.vehicle_id)
            || !self.in_fleet(route.vehicle_id)
    }

    /// Current routes a minimal re-plan carries over unchanged.
    pub(crate) fn untouched_routes(&self) -> Vec<&'a CurrentRoute> {
        self.request
            .current_routes
            .iter()
            .filter(|route| !self.is_affected(route))
            .collect()
    }
}

fn removed_vehicle(request: &ReplanRequest) -> Option<VehicleId> {
    let event = &request.event;
    if !event.kind.removes_vehicle() {
        return None;
    }
    event.vehicle_id.or_else(|| {
        let route_id = event.route_id?;
        request
            .current_routes
            .iter()
            .find(|route| route.route_id == route_id)
            .map(|route| route.vehicle_id)
    })
}

/// Vehicle and one-based position of each plannable order.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Placement(HashMap<OrderId, (VehicleId, usize)>);

impl Placement {
    /// Placement in the plan currently in force, counting only plannable
    /// orders so positions compare with a re-pack.
    pub(crate) fn current(scope: &Scope<'_>) -> Self {
        let plannable: HashSet<OrderId> = scope.plannable_ids().collect();
        let mut placement = HashMap::new();
        for route in &scope.request.current_routes {
            let visits = route
                .orders
                .iter()
                .filter(|order_id| plannable.contains(*order_id));
            for (position, order_id) in visits.enumerate() {
                placement.insert(*order_id, (route.vehicle_id, position + 1));
            }
        }
        Self(placement)
    }

    /// Placement in a set of planned routes.
    pub(crate) fn planned(routes: &[RouteResult]) -> Self {
        let mut placement = HashMap::new();
        for route in routes {
            for (position, order_id) in route.order_ids().enumerate() {
                placement.insert(order_id, (route.vehicle_id, position + 1));
            }
        }
        Self(placement)
    }

    /// Orders among `orders` whose vehicle or position differs.
    pub(crate) fn changed(&self, other: &Self, orders: impl Iterator<Item = OrderId>) -> usize {
        orders
            .filter(|order_id| self.0.get(order_id) != other.0.get(order_id))
            .count()
    }
}
