//! Log output for the `tms` binary.

use tracing_subscriber::{EnvFilter, fmt};

use crate::CliError;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "TMS_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install a formatted subscriber on standard error.
///
/// The filter comes from [`LOG_ENV`] (for example `TMS_LOG=tms_solver=debug`)
/// and defaults to `warn`. Records emitted through the `log` facade by the
/// engine crates are forwarded to the subscriber.
///
/// # Errors
///
/// Returns [`CliError::Logging`] when a global subscriber is already
/// installed.
pub fn init() -> Result<(), CliError> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(CliError::Logging)
}
