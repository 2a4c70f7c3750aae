//! Adapters behind the engine's collaborator traits.
//!
//! Responsibilities:
//! - Distance providers: great-circle and OSRM road-network distances.
//! - An in-memory [`tms_core::TransactionalStore`] with staged, atomic
//!   units of work.
//! - Sinks: a bounded fan-out [`EventHub`] and audit sinks.
//!
//! Boundaries:
//! - Do not encode domain rules (they live in `tms-core`).
//! - Keep blocking I/O off async executors.
//!
//! Invariants:
//! - Thread-safe by default.
//! - No global mutable state.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod audit;
mod events;
pub mod routing;
mod store;

pub use audit::{LogAuditSink, MemoryAuditLog};
pub use events::{Backpressure, EventHub, EventHubConfig, Subscription};
pub use routing::{
    DEFAULT_USER_AGENT, HaversineDistanceProvider, OsrmDistanceProvider,
    OsrmDistanceProviderConfig, ProviderBuildError,
};
pub use store::{MemoryStore, MemoryUnit};

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
