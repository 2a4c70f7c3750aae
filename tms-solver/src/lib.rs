//! Route construction and re-planning for the transport management engine.
//!
//! - [`GreedyPacker`] implements [`tms_core::CapacityPacker`] with a
//!   capacitated nearest-neighbour heuristic over any
//!   [`tms_core::DistanceProvider`].
//! - [`Replanner`] implements [`tms_core::AlternativeGenerator`] by
//!   re-invoking a packer under three strategies and ranking the results
//!   with an [`tms_core::AlternativeScorer`].
//!
//! # Examples
//!
//! ```
//! use tms_core::test_support::{PlanarDistanceProvider, depot, order, vehicle};
//! use tms_core::{CapacityPacker, PackOptions};
//! use tms_solver::GreedyPacker;
//!
//! let packer = GreedyPacker::new(PlanarDistanceProvider);
//! let outcome = packer.pack(
//!     &[order(1, 1.0, 0.0, 150.0), order(2, 2.0, 0.0, 250.0)],
//!     &[vehicle(1, 300.0)],
//!     &depot(),
//!     &PackOptions::default(),
//! )?;
//! assert_eq!(outcome.routes.len(), 1);
//! assert_eq!(outcome.unassigned.len(), 1);
//! # Ok::<(), tms_core::PackError>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod packer;
mod replan;

pub use packer::{GreedyPacker, PackerConfig};
pub use replan::Replanner;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
