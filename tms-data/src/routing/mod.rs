//! Distance providers for routing.
//!
//! [`HaversineDistanceProvider`] measures great-circle distance and needs
//! no network. [`OsrmDistanceProvider`] fetches road-network distance
//! matrices from an OSRM service. Both implement the synchronous
//! [`tms_core::DistanceProvider`] trait.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use geo::Coord;
//! use tms_core::DistanceProvider;
//! use tms_data::routing::{OsrmDistanceProvider, OsrmDistanceProviderConfig};
//!
//! let config = OsrmDistanceProviderConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(60))
//!     .with_profile("driving");
//! let provider = OsrmDistanceProvider::with_config(config)?;
//!
//! let points = [Coord { x: 100.52, y: 13.73 }, Coord { x: 100.60, y: 13.80 }];
//! let matrix = provider.distance_matrix(&points)?;
//! println!("Distance: {} km", matrix[0][1]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod haversine;
mod osrm;
mod provider;
pub mod test_support;

pub use haversine::HaversineDistanceProvider;
pub use provider::{
    DEFAULT_USER_AGENT, OsrmDistanceProvider, OsrmDistanceProviderConfig, ProviderBuildError,
};
