//! `replan` command: ranked alternatives after a disruption.

use std::io::Write;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tms_core::{AlternativeGenerator, Cancellation, ReplanOutcome, ReplanRequest};
use tms_scorer::{DeadlineLatenessClassifier, WeightedAlternativeScorer};
use tms_solver::{GreedyPacker, Replanner};

use crate::fs::{load_json, require_existing, write_json};
use crate::routing::{DefaultDistanceProviderBuilder, DistanceProviderBuilder, RoutingConfig};
use crate::{
    ARG_AVERAGE_SPEED, ARG_OSRM_BASE_URL, ARG_REQUEST, ARG_SERVICE_MINUTES, ARG_TIMEOUT_SECONDS,
    CliError, ENV_REPLAN_REQUEST,
};

/// CLI arguments for the `replan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Generate one alternative plan per strategy (minimise lateness, \
                 cost, or disruption) for the current plan and a disruption event, \
                 score them and print them with the recommended alternative. The \
                 request is a JSON-encoded ReplanRequest.",
    about = "Rank alternative plans after a disruption"
)]
#[ortho_config(prefix = "TMS")]
pub(crate) struct ReplanArgs {
    /// Path to a JSON file containing a `ReplanRequest`.
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
    /// Abandon re-planning after this many seconds.
    #[arg(long = ARG_TIMEOUT_SECONDS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_seconds: Option<u64>,
}

impl ReplanArgs {
    pub(crate) fn into_config(self) -> Result<ReplanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ReplanConfig::try_from(merged)
    }
}

/// Resolved `replan` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReplanConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) routing: RoutingConfig,
    /// No deadline when absent.
    pub(crate) timeout: Option<Duration>,
}

impl ReplanConfig {
    fn cancellation(&self) -> Cancellation {
        self.timeout.map_or_else(Cancellation::default, Cancellation::after)
    }
}

impl TryFrom<ReplanArgs> for ReplanConfig {
    type Error = CliError;

    fn try_from(args: ReplanArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_REPLAN_REQUEST,
        })?;
        let timeout = match args.timeout_seconds {
            Some(0) => {
                return Err(CliError::InvalidSetting {
                    field: ARG_TIMEOUT_SECONDS,
                    reason: "timeout must be at least one second".to_owned(),
                });
            }
            seconds => seconds.map(Duration::from_secs),
        };
        let routing = RoutingConfig::resolve(
            args.osrm_base_url,
            args.average_speed_kmh,
            args.service_minutes,
        )?;
        Ok(Self {
            request_path,
            routing,
            timeout,
        })
    }
}

pub(crate) fn run_replan(args: ReplanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_replan_with(args, &DefaultDistanceProviderBuilder, &mut stdout)
}

pub(crate) fn run_replan_with(
    args: ReplanArgs,
    builder: &dyn DistanceProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.request_path, ARG_REQUEST)?;
    let outcome = execute_replan(&config, builder)?;
    write_json(writer, &outcome)
}

fn execute_replan(
    config: &ReplanConfig,
    builder: &dyn DistanceProviderBuilder,
) -> Result<ReplanOutcome, CliError> {
    let request: ReplanRequest = load_json(&config.request_path)?;
    let provider = builder.build(&config.routing)?;
    let replanner = Replanner::new(
        GreedyPacker::with_config(provider, config.routing.packer),
        DeadlineLatenessClassifier::default(),
        WeightedAlternativeScorer::default(),
    );
    replanner
        .generate_alternatives(&request, &config.cancellation())
        .map_err(|source| CliError::Replan { source })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ReplanConfig, CliError> {
    let merged = ReplanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ReplanConfig::try_from(merged)
}
