//! Facade crate for the transport management engine.
//!
//! This crate re-exports the core domain types and exposes the planning,
//! dispatch and adapter crates behind feature flags.

#![forbid(unsafe_code)]

pub use tms_core::{
    Actor, Alternative, AlternativeGenerator, AlternativeKpis, AlternativeScorer, AuditEntry,
    AuditSink, Cancellation, CapacityPacker, Clock, CurrentRoute, Depot, DisruptionEvent,
    DisruptionKind, DistanceError, DistanceProvider, DispatchEvent, ErrorKind, EventSink,
    LatenessClassifier, Order, OrderId, OrderStatus, PackError, PackOptions, PackOutcome,
    PackRequest, PersistenceError, ReasonCode, ReassignmentLog, ReplanError, ReplanOutcome,
    ReplanRequest, Route, RouteId, RouteResult, RouteStop, SelectionRule, StopId, StopStatus,
    Strategy, TransactionalStore, Vehicle, VehicleId,
};

#[cfg(feature = "solver")]
pub use tms_scorer::{DeadlineLatenessClassifier, DelayAnalyzer, WeightedAlternativeScorer};
#[cfg(feature = "solver")]
pub use tms_solver::{GreedyPacker, PackerConfig, Replanner};

#[cfg(feature = "dispatch")]
pub use tms_dispatch::{DispatchError, DispatchService};

#[cfg(feature = "data")]
pub use tms_data::{
    EventHub, HaversineDistanceProvider, LogAuditSink, MemoryAuditLog, MemoryStore,
    OsrmDistanceProvider,
};
