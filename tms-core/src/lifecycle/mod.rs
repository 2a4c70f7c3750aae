//! Status machines and business rules for orders and stops.
//!
//! Transition tables are pure lookups: [`validate_transition`] has no side
//! effects and returns the same answer for the same arguments. Every
//! status-changing operation must call it before persisting a mutation.
//!
//! Terminal statuses (`delivered`, `completed`) have no outgoing edges.
//! They may only be left through the named [`reopen_order`] and
//! [`reopen_stop`] transitions.

mod error;
mod machine;
mod order_status;
mod rules;
mod stop_status;
mod time_window;

pub use error::TransitionError;
pub use machine::{StatusMachine, validate_transition};
pub use order_status::{OrderStatus, reopen_order, validate_order_transition};
pub use rules::check_sequence;
pub use stop_status::{StopStatus, reopen_stop, validate_stop_transition};
pub use time_window::TimeWindow;
