//! Road-network `DistanceProvider` using OSRM's Table API.
//!
//! The [`DistanceProvider`] trait is synchronous to keep the engine
//! embeddable in synchronous contexts. This provider bridges the async
//! HTTP call to the sync interface by blocking on a Tokio runtime
//! internally. One Table request covers a whole matrix.

use std::time::Duration;

use geo::Coord;
use reqwest::Client;
use thiserror::Error;
use tms_core::distance::validate_matrix;
use tms_core::{DistanceError, DistanceMatrix, DistanceProvider};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::osrm::TableResponse;

/// Error type for [`OsrmDistanceProvider`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "tms-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`OsrmDistanceProvider`].
#[derive(Debug, Clone)]
pub struct OsrmDistanceProviderConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile segment of the URL, e.g. `"driving"`.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OsrmDistanceProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            profile: "driving".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OsrmDistanceProviderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Distance provider backed by the OSRM Table API.
///
/// The provider owns a current-thread Tokio runtime reused across calls.
/// When called from inside a multi-threaded Tokio runtime it borrows that
/// runtime's handle through [`tokio::task::block_in_place`] instead, to
/// avoid nested runtime panics. Inside a `current_thread` runtime it falls
/// back to its own runtime, which blocks the caller's executor for the
/// duration of the request.
///
/// Unreachable pairs (`null` cells) are reported as `f64::INFINITY`.
pub struct OsrmDistanceProvider {
    client: Client,
    config: OsrmDistanceProviderConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OsrmDistanceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmDistanceProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl OsrmDistanceProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OsrmDistanceProviderConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OsrmDistanceProviderConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &OsrmDistanceProviderConfig {
        &self.config
    }

    /// Build the Table API URL: `{base}/table/v1/{profile}/{lon,lat;...}`.
    fn build_table_url(&self, points: &[Coord<f64>]) -> String {
        let coords = points
            .iter()
            .map(|point| format!("{},{}", point.x, point.y))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/table/v1/{}/{}?annotations=distance",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }

    async fn fetch_matrix_async(
        &self,
        points: &[Coord<f64>],
    ) -> Result<DistanceMatrix, DistanceError> {
        let url = self.build_table_url(points);
        log::debug!("requesting {}x{} distance table", points.len(), points.len());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let table: TableResponse =
            response
                .json()
                .await
                .map_err(|err| DistanceError::ParseError {
                    message: err.to_string(),
                })?;

        let matrix = convert_response(table)?;
        validate_matrix(&matrix, points.len())?;
        Ok(matrix)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> DistanceError {
        if error.is_timeout() {
            return DistanceError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return DistanceError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        DistanceError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Convert an OSRM response in metres to a kilometre matrix.
///
/// `null` cells are unreachable. Negative or non-finite cells are logged
/// and treated as unreachable too.
#[expect(clippy::float_arithmetic, reason = "metres are converted to kilometres")]
fn convert_response(response: TableResponse) -> Result<DistanceMatrix, DistanceError> {
    if !response.is_ok() {
        return Err(DistanceError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let distances = response
        .distances
        .ok_or_else(|| DistanceError::ParseError {
            message: "OSRM response missing distances array".to_owned(),
        })?;

    Ok(distances
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    Some(metres) if metres >= 0.0 && metres.is_finite() => metres / 1_000.0,
                    Some(metres) => {
                        log::warn!("malformed OSRM distance cell {metres}; treating as unreachable");
                        f64::INFINITY
                    }
                    None => f64::INFINITY,
                })
                .collect()
        })
        .collect())
}

fn check_coordinates(points: &[Coord<f64>]) -> Result<(), DistanceError> {
    match points
        .iter()
        .find(|point| !(point.x.is_finite() && point.y.is_finite()))
    {
        Some(point) => Err(DistanceError::InvalidCoordinate {
            x: point.x,
            y: point.y,
        }),
        None => Ok(()),
    }
}

impl DistanceProvider for OsrmDistanceProvider {
    fn distance_km(&self, from: Coord<f64>, to: Coord<f64>) -> Result<f64, DistanceError> {
        let matrix = self.distance_matrix(&[from, to])?;
        matrix
            .first()
            .and_then(|row| row.get(1))
            .copied()
            .ok_or(DistanceError::MalformedMatrix { expected: 2 })
    }

    /// Fetch the distance matrix for `points` in one request.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime should
    /// be multi-threaded. Inside a `current_thread` runtime the provider
    /// blocks on its own runtime instead.
    fn distance_matrix(&self, points: &[Coord<f64>]) -> Result<DistanceMatrix, DistanceError> {
        if points.is_empty() {
            return Err(DistanceError::EmptyInput);
        }
        check_coordinates(points)?;

        let future = self.fetch_matrix_async(points);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
