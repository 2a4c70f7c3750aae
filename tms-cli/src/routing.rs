//! Distance source and travel model shared by the planning commands.

use std::time::Duration;

use tms_core::DistanceProvider;
use tms_data::{HaversineDistanceProvider, OsrmDistanceProvider};
use tms_solver::PackerConfig;

use crate::{ARG_AVERAGE_SPEED, ARG_SERVICE_MINUTES, CliError};

/// Distance provider chosen at run time.
pub(crate) type BoxedDistanceProvider = Box<dyn DistanceProvider + Send + Sync>;

/// Resolved routing options.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RoutingConfig {
    /// OSRM server; great-circle distances are used when absent.
    pub(crate) osrm_base_url: Option<String>,
    /// Travel model handed to the packer.
    pub(crate) packer: PackerConfig,
}

impl RoutingConfig {
    /// Apply option overrides to the packer defaults.
    pub(crate) fn resolve(
        osrm_base_url: Option<String>,
        speed_kmh: Option<f64>,
        service_minutes: Option<u64>,
    ) -> Result<Self, CliError> {
        let defaults = PackerConfig::default();
        let average_speed_kmh = match speed_kmh {
            Some(speed) if !speed.is_finite() || speed <= 0.0 => {
                return Err(CliError::InvalidSetting {
                    field: ARG_AVERAGE_SPEED,
                    reason: format!("expected a positive speed, got {speed}"),
                });
            }
            Some(speed) => speed,
            None => defaults.average_speed_kmh,
        };
        let service_time = match service_minutes {
            Some(minutes) => minutes
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or_else(|| CliError::InvalidSetting {
                    field: ARG_SERVICE_MINUTES,
                    reason: format!("{minutes} minutes is out of range"),
                })?,
            None => defaults.service_time,
        };
        Ok(Self {
            osrm_base_url: osrm_base_url.filter(|url| !url.trim().is_empty()),
            packer: PackerConfig {
                average_speed_kmh,
                service_time,
            },
        })
    }
}

/// Builds the distance provider for one command invocation.
pub(crate) trait DistanceProviderBuilder {
    fn build(&self, config: &RoutingConfig) -> Result<BoxedDistanceProvider, CliError>;
}

/// Uses OSRM when a base URL is configured and great-circle distance
/// otherwise.
pub(crate) struct DefaultDistanceProviderBuilder;

impl DistanceProviderBuilder for DefaultDistanceProviderBuilder {
    fn build(&self, config: &RoutingConfig) -> Result<BoxedDistanceProvider, CliError> {
        let Some(base_url) = config.osrm_base_url.as_deref() else {
            log::debug!("no OSRM base URL configured; using great-circle distances");
            return Ok(Box::new(HaversineDistanceProvider));
        };
        log::debug!("using OSRM distances from {base_url}");
        let provider =
            OsrmDistanceProvider::new(base_url).map_err(|source| CliError::BuildDistanceProvider {
                base_url: base_url.to_owned(),
                source,
            })?;
        Ok(Box::new(provider))
    }
}
