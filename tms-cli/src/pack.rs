//! `pack` command: initial route construction.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tms_core::{CapacityPacker, PackOptions, PackOutcome, PackRequest};
use tms_solver::GreedyPacker;

use crate::fs::{load_json, require_existing, write_json};
use crate::routing::{DefaultDistanceProviderBuilder, DistanceProviderBuilder, RoutingConfig};
use crate::{
    ARG_AVERAGE_SPEED, ARG_OSRM_BASE_URL, ARG_REQUEST, ARG_SERVICE_MINUTES, ARG_STRICT, CliError,
    ENV_PACK_REQUEST,
};

/// CLI arguments for the `pack` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Assign orders to vehicles by weight and volume, sequence each \
                 vehicle's stops, and print the routes with distance, cost and \
                 arrival estimates. The request is a JSON-encoded PackRequest.",
    about = "Build routes for a set of orders"
)]
#[ortho_config(prefix = "TMS")]
pub(crate) struct PackArgs {
    /// Path to a JSON file containing a `PackRequest`.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Base URL for an OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Average driving speed used for arrival estimates.
    #[arg(long = ARG_AVERAGE_SPEED, value_name = "km/h")]
    #[serde(default)]
    pub(crate) average_speed_kmh: Option<f64>,
    /// Time spent at each stop.
    #[arg(long = ARG_SERVICE_MINUTES, value_name = "minutes")]
    #[serde(default)]
    pub(crate) service_minutes: Option<u64>,
    /// Fail when any order is left unassigned.
    #[arg(long = ARG_STRICT)]
    #[serde(default)]
    pub(crate) strict: bool,
}

impl PackArgs {
    pub(crate) fn into_config(self) -> Result<PackConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PackConfig::try_from(merged)
    }
}

/// Resolved `pack` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PackConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) routing: RoutingConfig,
    pub(crate) strict: bool,
}

impl TryFrom<PackArgs> for PackConfig {
    type Error = CliError;

    fn try_from(args: PackArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_PACK_REQUEST,
        })?;
        let routing = RoutingConfig::resolve(
            args.osrm_base_url,
            args.average_speed_kmh,
            args.service_minutes,
        )?;
        Ok(Self {
            request_path,
            routing,
            strict: args.strict,
        })
    }
}

pub(crate) fn run_pack(args: PackArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_pack_with(args, &DefaultDistanceProviderBuilder, &mut stdout)
}

pub(crate) fn run_pack_with(
    args: PackArgs,
    builder: &dyn DistanceProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.request_path, ARG_REQUEST)?;
    let outcome = execute_pack(&config, builder)?;
    if config.strict && !outcome.is_complete() {
        return Err(CliError::PartialAssignment {
            unassigned: outcome.unassigned.len(),
        });
    }
    write_json(writer, &outcome)
}

fn execute_pack(
    config: &PackConfig,
    builder: &dyn DistanceProviderBuilder,
) -> Result<PackOutcome, CliError> {
    let request: PackRequest = load_json(&config.request_path)?;
    let provider = builder.build(&config.routing)?;
    let packer = GreedyPacker::with_config(provider, config.routing.packer);
    let options = PackOptions {
        selection: request.selection,
        ..PackOptions::default()
    };
    let outcome = packer
        .pack(&request.orders, &request.vehicles, &request.depot, &options)
        .map_err(|source| CliError::Pack { source })?;
    log::info!(
        "packed {} orders onto {} routes; {} unassigned",
        request.orders.len(),
        outcome.routes.len(),
        outcome.unassigned.len()
    );
    Ok(outcome)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PackConfig, CliError> {
    let merged = PackArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PackConfig::try_from(merged)
}
