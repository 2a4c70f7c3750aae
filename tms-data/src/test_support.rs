//! Test doubles for stores and sinks.
//!
//! Available to unit tests and, through the `test-support` feature, to
//! other crates' tests.

use tms_core::{
    AuditEntry, AuditSink, DispatchEvent, EventSink, Order, OrderId, OrderRepository,
    PersistenceError, ReassignmentLog, ReassignmentLogRepository, Route, RouteId,
    RouteRepository, RouteStop, SinkError, StopId, TransactionalStore, UnitOfWork, Vehicle,
    VehicleId, VehicleRepository,
};

use crate::{MemoryStore, MemoryUnit};

/// A [`MemoryStore`] that fails one named operation.
///
/// Operation names match the repository method names plus `"begin"` and
/// `"commit"`.
///
/// # Examples
///
/// ```
/// use tms_core::{TransactionalStore, UnitOfWork};
/// use tms_data::MemoryStore;
/// use tms_data::test_support::FaultyStore;
///
/// let store = FaultyStore::new(MemoryStore::new()).fail_on("commit");
/// let unit = store.begin()?;
/// assert!(unit.commit().is_err());
/// # Ok::<(), tms_core::PersistenceError>(())
/// ```
#[derive(Debug)]
pub struct FaultyStore {
    inner: MemoryStore,
    fail_on: Option<&'static str>,
}

impl FaultyStore {
    /// Wrap `inner` without any fault.
    #[must_use]
    pub const fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_on: None,
        }
    }

    /// Fail every call to `operation`.
    #[must_use]
    pub const fn fail_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    /// The wrapped store, for inspecting committed state.
    #[must_use]
    pub const fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

fn inject(fail_on: Option<&'static str>, operation: &'static str) -> Result<(), PersistenceError> {
    if fail_on == Some(operation) {
        return Err(PersistenceError::new(operation, "injected failure"));
    }
    Ok(())
}

impl TransactionalStore for FaultyStore {
    type Unit<'a> = FaultyUnit<'a>;

    fn begin(&self) -> Result<Self::Unit<'_>, PersistenceError> {
        inject(self.fail_on, "begin")?;
        Ok(FaultyUnit {
            inner: self.inner.begin()?,
            fail_on: self.fail_on,
        })
    }
}

/// Unit of work handed out by [`FaultyStore`].
#[derive(Debug)]
pub struct FaultyUnit<'a> {
    inner: MemoryUnit<'a>,
    fail_on: Option<&'static str>,
}

impl OrderRepository for FaultyUnit<'_> {
    fn order(&self, id: OrderId) -> Result<Option<Order>, PersistenceError> {
        inject(self.fail_on, "order")?;
        self.inner.order(id)
    }

    fn save_order(&mut self, order: &Order) -> Result<(), PersistenceError> {
        inject(self.fail_on, "save_order")?;
        self.inner.save_order(order)
    }
}

impl VehicleRepository for FaultyUnit<'_> {
    fn vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, PersistenceError> {
        inject(self.fail_on, "vehicle")?;
        self.inner.vehicle(id)
    }
}

impl RouteRepository for FaultyUnit<'_> {
    fn route(&self, id: RouteId) -> Result<Option<Route>, PersistenceError> {
        inject(self.fail_on, "route")?;
        self.inner.route(id)
    }

    fn save_route(&mut self, route: &Route) -> Result<(), PersistenceError> {
        inject(self.fail_on, "save_route")?;
        self.inner.save_route(route)
    }

    fn stop(&self, id: StopId) -> Result<Option<RouteStop>, PersistenceError> {
        inject(self.fail_on, "stop")?;
        self.inner.stop(id)
    }

    fn stops_for_route(&self, route_id: RouteId) -> Result<Vec<RouteStop>, PersistenceError> {
        inject(self.fail_on, "stops_for_route")?;
        self.inner.stops_for_route(route_id)
    }

    fn active_stop_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<RouteStop>, PersistenceError> {
        inject(self.fail_on, "active_stop_for_order")?;
        self.inner.active_stop_for_order(order_id)
    }

    fn save_stop(&mut self, stop: &RouteStop) -> Result<(), PersistenceError> {
        inject(self.fail_on, "save_stop")?;
        self.inner.save_stop(stop)
    }

    fn delete_stop(&mut self, id: StopId) -> Result<(), PersistenceError> {
        inject(self.fail_on, "delete_stop")?;
        self.inner.delete_stop(id)
    }
}

impl ReassignmentLogRepository for FaultyUnit<'_> {
    fn append_reassignment(&mut self, entry: &ReassignmentLog) -> Result<(), PersistenceError> {
        inject(self.fail_on, "append_reassignment")?;
        self.inner.append_reassignment(entry)
    }

    fn reassignments_for_route(
        &self,
        route_id: RouteId,
    ) -> Result<Vec<ReassignmentLog>, PersistenceError> {
        inject(self.fail_on, "reassignments_for_route")?;
        self.inner.reassignments_for_route(route_id)
    }
}

impl UnitOfWork for FaultyUnit<'_> {
    fn commit(self) -> Result<(), PersistenceError> {
        inject(self.fail_on, "commit")?;
        self.inner.commit()
    }
}

/// Audit and event sink that rejects everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingSink;

impl AuditSink for FailingSink {
    fn record(&self, _entry: AuditEntry) -> Result<(), SinkError> {
        Err(SinkError::Closed)
    }
}

impl EventSink for FailingSink {
    fn publish(&self, _event: DispatchEvent) -> Result<(), SinkError> {
        Err(SinkError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tms_core::StopStatus;
    use tms_core::test_support::{route_id, route_stops, stop_id};

    #[rstest]
    fn injected_commit_failure_leaves_store_untouched() {
        let store = FaultyStore::new(
            MemoryStore::new().with_stops(route_stops(&[StopStatus::Pending])),
        )
        .fail_on("commit");
        let mut unit = store.begin().expect("begin");
        unit.delete_stop(stop_id(1)).expect("delete");

        let err = unit.commit().expect_err("injected");

        assert_eq!(err.operation, "commit");
        assert_eq!(store.inner().stops_for_route(route_id(1)).len(), 1);
    }

    #[rstest]
    fn other_operations_pass_through() {
        let store = FaultyStore::new(MemoryStore::new()).fail_on("save_stop");
        let unit = store.begin().expect("begin");
        assert!(unit.stop(stop_id(1)).expect("read").is_none());
    }
}
