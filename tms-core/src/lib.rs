//! Core domain types and traits for the transport management engine.
//!
//! This crate models orders, vehicles, routes and stops, the status
//! machines that govern them, and the narrow interfaces the planning and
//! dispatch crates are written against:
//!
//! - [`DistanceProvider`] supplies distances between coordinates.
//! - [`CapacityPacker`] assigns orders to vehicles under capacity limits.
//! - [`AlternativeGenerator`] produces ranked re-plans after a disruption.
//! - [`TransactionalStore`] and the repository traits expose persisted
//!   state through a scoped unit of work.
//! - [`AuditSink`] and [`EventSink`] receive records after a mutation
//!   commits.
//!
//! Nothing here performs I/O. Adapters live in `tms-data`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod cancel;
mod clock;
pub mod distance;
mod error;
mod fleet;
mod ids;
pub mod lifecycle;
mod order;
mod packing;
mod reassignment;
mod replan;
mod route;
mod scoring;
mod sinks;
mod store;

pub use cancel::{CancelToken, Cancellation, Cancelled};
pub use clock::{Clock, SystemClock};
pub use distance::{DistanceError, DistanceMatrix, DistanceProvider};
pub use error::{ErrorKind, PersistenceError};
pub use fleet::{CapacityError, Depot, Load, Vehicle, VehicleStatus, validate_route_capacity};
pub use ids::{DepotId, DriverId, EntityKind, OrderId, ReassignmentId, RouteId, StopId, VehicleId};
pub use lifecycle::{
    OrderStatus, StatusMachine, StopStatus, TimeWindow, TransitionError, check_sequence,
    reopen_order, reopen_stop, validate_order_transition, validate_stop_transition,
    validate_transition,
};
pub use order::{Address, Order, OrderValidationError, Priority};
pub use packing::{
    CapacityPacker, PackError, PackOptions, PackOutcome, PackRequest, PartialAssignment,
    PlannedStop, RouteResult, SelectionRule,
};
pub use reassignment::{ReasonCode, ReassignmentLog};
pub use replan::{
    Alternative, AlternativeGenerator, AlternativeKpis, CurrentRoute, DisruptionEvent,
    DisruptionKind, ReplanError, ReplanOutcome, ReplanRequest, Strategy,
};
pub use route::{Route, RouteStop, is_contiguous, resequence};
pub use scoring::{
    AlternativeScorer, DelayCause, DelayCauseClassifier, LatenessClassifier, StopObservation,
};
pub use sinks::{
    Actor, AuditAction, AuditEntry, AuditSink, DispatchEvent, EventKind, EventSink, SinkError,
};
pub use store::{
    OrderRepository, ReassignmentLogRepository, RouteRepository, TransactionalStore, UnitOfWork,
    VehicleRepository,
};

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
