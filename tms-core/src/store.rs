//! Repository interfaces and the transactional unit of work.
//!
//! The engine never persists state itself. Dispatch operations open a unit
//! of work with [`TransactionalStore::begin`], read and stage writes through
//! the repository traits, then call [`UnitOfWork::commit`]. Dropping a unit
//! of work without committing discards every staged write, so an error or
//! early return rolls back.

use crate::{
    Order, OrderId, PersistenceError, ReassignmentLog, Route, RouteId, RouteStop, StopId, Vehicle,
    VehicleId,
};

/// Read and write orders.
pub trait OrderRepository {
    /// Look up an order.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the backend fails.
    fn order(&self, id: OrderId) -> Result<Option<Order>, PersistenceError>;

    /// Stage an insert or update.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the backend fails.
    fn save_order(&mut self, order: &Order) -> Result<(), PersistenceError>;
}

/// Read vehicles.
pub trait VehicleRepository {
    /// Look up a vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the backend fails.
    fn vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, PersistenceError>;
}

/// Read and write routes and their stops.
pub trait RouteRepository {
    /// Look up a route.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the backend fails.
    fn route(&self, id: RouteId) -> Result<Option<Route>, PersistenceError>;

    /// Stage an insert or update.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the backend fails.
    fn save_route(&mut self, route: &Route) -> Result<(), PersistenceError>;

    /// Look up a stop.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the backend fails.
    fn stop(&self, id: StopId) -> Result<Option<RouteStop>, PersistenceError>;

    /// Stops of `route_id` ordered by sequence.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the backend fails.
    fn stops_for_route(&self, route_id: RouteId) -> Result<Vec<RouteStop>, PersistenceError>;

    /// The stop currently claiming `order_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the backend fails.
    fn active_stop_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<RouteStop>, PersistenceError>;

    /// Stage an insert or update.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the backend fails.
    fn save_stop(&mut self, stop: &RouteStop) -> Result<(), PersistenceError>;

    /// Stage a deletion.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the backend fails.
    fn delete_stop(&mut self, id: StopId) -> Result<(), PersistenceError>;
}

/// Append and read reassignment records.
pub trait ReassignmentLogRepository {
    /// Stage an append. Entries are never updated.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the backend fails.
    fn append_reassignment(&mut self, entry: &ReassignmentLog) -> Result<(), PersistenceError>;

    /// Entries recorded against `route_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the backend fails.
    fn reassignments_for_route(
        &self,
        route_id: RouteId,
    ) -> Result<Vec<ReassignmentLog>, PersistenceError>;
}

/// A scoped transaction over every repository.
///
/// Reads observe writes staged earlier in the same unit. Nothing is
/// visible to other readers until [`UnitOfWork::commit`] succeeds.
pub trait UnitOfWork:
    OrderRepository + VehicleRepository + RouteRepository + ReassignmentLogRepository
{
    /// Apply every staged write atomically.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the writes could not be applied; in
    /// that case none of them are.
    fn commit(self) -> Result<(), PersistenceError>;
}

/// Opens units of work.
pub trait TransactionalStore: Send + Sync {
    /// Unit of work type borrowed from the store.
    type Unit<'a>: UnitOfWork
    where
        Self: 'a;

    /// Begin a unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when no transaction could be opened.
    fn begin(&self) -> Result<Self::Unit<'_>, PersistenceError>;
}
