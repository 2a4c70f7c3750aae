//! Command-line interface for the transport management engine.
//!
//! `tms pack` builds routes for a JSON [`tms_core::PackRequest`] and `tms
//! replan` ranks re-planning alternatives for a JSON
//! [`tms_core::ReplanRequest`]. Both print their outcome as JSON on
//! standard output. Options layer from flags, `TMS_*` environment
//! variables and configuration files.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fs;
pub mod logging;
mod pack;
mod replan;
mod routing;

pub use error::CliError;

use pack::{PackArgs, run_pack};
use replan::{ReplanArgs, run_replan};

pub(crate) const ARG_REQUEST: &str = "request";
pub(crate) const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_AVERAGE_SPEED: &str = "average-speed-kmh";
pub(crate) const ARG_SERVICE_MINUTES: &str = "service-minutes";
pub(crate) const ARG_STRICT: &str = "strict";
pub(crate) const ARG_TIMEOUT_SECONDS: &str = "timeout-seconds";
pub(crate) const ENV_PACK_REQUEST: &str = "TMS_CMDS_PACK_REQUEST_PATH";
pub(crate) const ENV_REPLAN_REQUEST: &str = "TMS_CMDS_REPLAN_REQUEST_PATH";

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// request cannot be read, planning fails, or the output cannot be
/// written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse()?;
    match cli.command {
        Command::Pack(args) => run_pack(args),
        Command::Replan(args) => run_replan(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tms",
    about = "Route planning and re-planning for delivery fleets",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assign orders to vehicles and sequence their stops.
    Pack(PackArgs),
    /// Rank alternative plans after a disruption.
    Replan(ReplanArgs),
}

#[cfg(test)]
mod tests;
