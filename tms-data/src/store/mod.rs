//! In-memory [`TransactionalStore`].
//!
//! A [`MemoryUnit`] stages writes in an overlay over the shared tables.
//! Reads inside the unit see the overlay first. [`UnitOfWork::commit`]
//! applies the overlay under one write lock, so other readers observe all
//! of a unit's writes or none of them. Dropping a unit discards it.

use std::collections::HashMap;

use parking_lot::RwLock;
use tms_core::{
    Order, OrderId, OrderRepository, PersistenceError, ReassignmentLog,
    ReassignmentLogRepository, Route, RouteId, RouteRepository, RouteStop, StopId,
    TransactionalStore, UnitOfWork, Vehicle, VehicleId, VehicleRepository,
};

#[derive(Debug, Default, Clone)]
struct Tables {
    orders: HashMap<OrderId, Order>,
    vehicles: HashMap<VehicleId, Vehicle>,
    routes: HashMap<RouteId, Route>,
    stops: HashMap<StopId, RouteStop>,
    reassignments: Vec<ReassignmentLog>,
}

/// Thread-safe in-memory store.
///
/// # Examples
///
/// ```
/// use tms_core::{OrderRepository, TransactionalStore, UnitOfWork};
/// use tms_core::test_support::{order, order_id};
/// use tms_data::MemoryStore;
///
/// let store = MemoryStore::new().with_orders([order(1, 1.0, 0.0, 10.0)]);
/// let unit = store.begin()?;
/// assert!(unit.order(order_id(1))?.is_some());
/// unit.commit()?;
/// # Ok::<(), tms_core::PersistenceError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed orders.
    #[must_use]
    pub fn with_orders(mut self, orders: impl IntoIterator<Item = Order>) -> Self {
        let tables = self.tables.get_mut();
        tables
            .orders
            .extend(orders.into_iter().map(|order| (order.id, order)));
        self
    }

    /// Seed vehicles.
    #[must_use]
    pub fn with_vehicles(mut self, vehicles: impl IntoIterator<Item = Vehicle>) -> Self {
        let tables = self.tables.get_mut();
        tables
            .vehicles
            .extend(vehicles.into_iter().map(|vehicle| (vehicle.id, vehicle)));
        self
    }

    /// Seed routes.
    #[must_use]
    pub fn with_routes(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        let tables = self.tables.get_mut();
        tables
            .routes
            .extend(routes.into_iter().map(|route| (route.id, route)));
        self
    }

    /// Seed stops.
    #[must_use]
    pub fn with_stops(mut self, stops: impl IntoIterator<Item = RouteStop>) -> Self {
        let tables = self.tables.get_mut();
        tables
            .stops
            .extend(stops.into_iter().map(|stop| (stop.id, stop)));
        self
    }

    /// Insert or replace a vehicle outside any unit of work.
    pub fn put_vehicle(&self, vehicle: Vehicle) {
        self.tables.write().vehicles.insert(vehicle.id, vehicle);
    }

    /// Committed copy of an order.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.tables.read().orders.get(&id).cloned()
    }

    /// Committed copy of a route.
    #[must_use]
    pub fn route(&self, id: RouteId) -> Option<Route> {
        self.tables.read().routes.get(&id).cloned()
    }

    /// Committed copy of a stop.
    #[must_use]
    pub fn stop(&self, id: StopId) -> Option<RouteStop> {
        self.tables.read().stops.get(&id).cloned()
    }

    /// Committed stops of `route_id` ordered by sequence.
    #[must_use]
    pub fn stops_for_route(&self, route_id: RouteId) -> Vec<RouteStop> {
        let tables = self.tables.read();
        sorted_by_sequence(
            tables
                .stops
                .values()
                .filter(|stop| stop.route_id == route_id)
                .cloned(),
        )
    }

    /// Every committed reassignment in append order.
    #[must_use]
    pub fn reassignments(&self) -> Vec<ReassignmentLog> {
        self.tables.read().reassignments.clone()
    }
}

impl TransactionalStore for MemoryStore {
    type Unit<'a> = MemoryUnit<'a>;

    fn begin(&self) -> Result<Self::Unit<'_>, PersistenceError> {
        Ok(MemoryUnit {
            store: self,
            orders: HashMap::new(),
            routes: HashMap::new(),
            stops: HashMap::new(),
            reassignments: Vec::new(),
        })
    }
}

/// Unit of work over a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryUnit<'a> {
    store: &'a MemoryStore,
    orders: HashMap<OrderId, Order>,
    routes: HashMap<RouteId, Route>,
    /// `None` marks a staged deletion.
    stops: HashMap<StopId, Option<RouteStop>>,
    reassignments: Vec<ReassignmentLog>,
}

impl MemoryUnit<'_> {
    /// Whether the unit has staged any write.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !(self.orders.is_empty()
            && self.routes.is_empty()
            && self.stops.is_empty()
            && self.reassignments.is_empty())
    }

    /// Committed stops merged with staged ones, keeping those matching
    /// `keep`.
    fn merged_stops(&self, keep: impl Fn(&RouteStop) -> bool) -> Vec<RouteStop> {
        let tables = self.store.tables.read();
        let committed = tables
            .stops
            .values()
            .filter(|stop| !self.stops.contains_key(&stop.id));
        let staged = self.stops.values().flatten();
        committed
            .chain(staged)
            .filter(|&stop| keep(stop))
            .cloned()
            .collect()
    }
}

impl OrderRepository for MemoryUnit<'_> {
    fn order(&self, id: OrderId) -> Result<Option<Order>, PersistenceError> {
        if let Some(order) = self.orders.get(&id) {
            return Ok(Some(order.clone()));
        }
        Ok(self.store.order(id))
    }

    fn save_order(&mut self, order: &Order) -> Result<(), PersistenceError> {
        self.orders.insert(order.id, order.clone());
        Ok(())
    }
}

impl VehicleRepository for MemoryUnit<'_> {
    fn vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, PersistenceError> {
        Ok(self.store.tables.read().vehicles.get(&id).cloned())
    }
}

impl RouteRepository for MemoryUnit<'_> {
    fn route(&self, id: RouteId) -> Result<Option<Route>, PersistenceError> {
        if let Some(route) = self.routes.get(&id) {
            return Ok(Some(route.clone()));
        }
        Ok(self.store.route(id))
    }

    fn save_route(&mut self, route: &Route) -> Result<(), PersistenceError> {
        self.routes.insert(route.id, route.clone());
        Ok(())
    }

    fn stop(&self, id: StopId) -> Result<Option<RouteStop>, PersistenceError> {
        match self.stops.get(&id) {
            Some(staged) => Ok(staged.clone()),
            None => Ok(self.store.stop(id)),
        }
    }

    fn stops_for_route(&self, route_id: RouteId) -> Result<Vec<RouteStop>, PersistenceError> {
        Ok(sorted_by_sequence(
            self.merged_stops(|stop| stop.route_id == route_id),
        ))
    }

    fn active_stop_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<RouteStop>, PersistenceError> {
        Ok(self
            .merged_stops(|stop| stop.order_id == order_id && stop.status.is_active())
            .into_iter()
            .next())
    }

    fn save_stop(&mut self, stop: &RouteStop) -> Result<(), PersistenceError> {
        self.stops.insert(stop.id, Some(stop.clone()));
        Ok(())
    }

    fn delete_stop(&mut self, id: StopId) -> Result<(), PersistenceError> {
        self.stops.insert(id, None);
        Ok(())
    }
}

impl ReassignmentLogRepository for MemoryUnit<'_> {
    fn append_reassignment(&mut self, entry: &ReassignmentLog) -> Result<(), PersistenceError> {
        self.reassignments.push(entry.clone());
        Ok(())
    }

    fn reassignments_for_route(
        &self,
        route_id: RouteId,
    ) -> Result<Vec<ReassignmentLog>, PersistenceError> {
        let tables = self.store.tables.read();
        let mut entries: Vec<ReassignmentLog> = tables
            .reassignments
            .iter()
            .chain(&self.reassignments)
            .filter(|entry| entry.route_id == route_id || entry.to_route_id == Some(route_id))
            .rev()
            .cloned()
            .collect();
        // Stable: entries stamped at the same instant stay newest first.
        entries.sort_by(|lhs, rhs| rhs.created_at.cmp(&lhs.created_at));
        Ok(entries)
    }
}

impl UnitOfWork for MemoryUnit<'_> {
    fn commit(self) -> Result<(), PersistenceError> {
        let Self {
            store,
            orders,
            routes,
            stops,
            reassignments,
        } = self;
        let mut tables = store.tables.write();
        log::debug!(
            "committing {} orders, {} routes, {} stops and {} reassignments",
            orders.len(),
            routes.len(),
            stops.len(),
            reassignments.len()
        );
        tables.orders.extend(orders);
        tables.routes.extend(routes);
        for (id, staged) in stops {
            match staged {
                Some(stop) => {
                    tables.stops.insert(id, stop);
                }
                None => {
                    tables.stops.remove(&id);
                }
            }
        }
        tables.reassignments.extend(reassignments);
        Ok(())
    }
}

fn sorted_by_sequence(unordered: impl IntoIterator<Item = RouteStop>) -> Vec<RouteStop> {
    let mut stops: Vec<RouteStop> = unordered.into_iter().collect();
    stops.sort_by_key(|stop| (stop.sequence, stop.id));
    stops
}
