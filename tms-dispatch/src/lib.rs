//! Dispatch operations over persisted routes, stops and orders.
//!
//! [`DispatchService`] moves work between routes and drivers after
//! planning, and applies stop and order status changes. Every operation:
//!
//! - serialises against other operations on the same routes and orders
//!   through an in-process lock table,
//! - runs as one [`tms_core::UnitOfWork`], so a failure at any step leaves
//!   nothing visible,
//! - keeps the stops of every route it touches numbered `1..=N`,
//! - records an audit entry and publishes an event only after the unit
//!   commits. Sink failures are logged and never fail the operation.
//!
//! # Examples
//!
//! ```
//! use tms_core::test_support::{route_id, stop_id};
//! use tms_core::{Actor, ReasonCode, StopStatus};
//! use tms_data::{EventHub, MemoryAuditLog, MemoryStore};
//! use tms_dispatch::{DispatchService, ReassignStopRequest};
//!
//! # fn main() -> Result<(), tms_dispatch::DispatchError> {
//! # use chrono::NaiveDate;
//! # use tms_core::Route;
//! # use tms_core::test_support::{depot_id, route_stops, vehicle_id};
//! # let route = |n| Route {
//! #     id: route_id(n),
//! #     vehicle_id: vehicle_id(n),
//! #     driver_id: None,
//! #     depot_id: depot_id(1),
//! #     service_date: NaiveDate::from_ymd_opt(2025, 1, 6).expect("valid date"),
//! # };
//! let store = MemoryStore::new()
//!     .with_routes([route(1), route(2)])
//!     .with_stops(route_stops(&[StopStatus::Pending; 3]));
//! let audit = MemoryAuditLog::new();
//! let service = DispatchService::new(store, audit.clone(), EventHub::default());
//!
//! service.reassign_stop(&ReassignStopRequest {
//!     stop_id: stop_id(2),
//!     from_route_id: route_id(1),
//!     to_route_id: route_id(2),
//!     new_sequence: None,
//!     reason: ReasonCode::CustomerRequest,
//!     notes: None,
//!     actor: Actor::new("dispatcher"),
//! })?;
//! assert_eq!(audit.len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod locks;
mod request;
mod service;

pub use error::DispatchError;
pub use request::{
    AddStopRequest, OrderStatusUpdate, ReassignRouteRequest, ReassignStopRequest,
    StopStatusUpdate, TimeWindowPolicy,
};
pub use service::DispatchService;
