//! Focused unit tests covering `pack` configuration and execution.

use super::helpers::{
    PlanarProviderBuilder, Workspace, oversized_pack_request, pack_request, write_json, write_utf8,
};
use super::*;
use camino::Utf8PathBuf;
use crate::pack::{PackArgs, PackConfig, config_from_layers_for_test, run_pack_with};
use rstest::rstest;
use std::time::Duration;
use tms_core::PackOutcome;
use tms_core::test_support::{order_id, vehicle_id};

fn args_for(request_path: Utf8PathBuf) -> PackArgs {
    PackArgs {
        request_path: Some(request_path),
        ..PackArgs::default()
    }
}

fn run(args: PackArgs) -> (Result<(), CliError>, Vec<u8>) {
    let mut stdout = Vec::new();
    let result = run_pack_with(args, &PlanarProviderBuilder, &mut stdout);
    (result, stdout)
}

#[rstest]
fn converting_pack_without_request_errors() {
    let err = PackConfig::try_from(PackArgs::default()).expect_err("missing request should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_REQUEST);
            assert_eq!(env, ENV_PACK_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn pack_config_applies_travel_overrides() {
    let args = PackArgs {
        average_speed_kmh: Some(25.0),
        service_minutes: Some(5),
        strict: true,
        ..args_for(Utf8PathBuf::from("request.json"))
    };
    let config = PackConfig::try_from(args).expect("config should build");
    assert_eq!(config.routing.packer.average_speed_kmh, 25.0);
    assert_eq!(config.routing.packer.service_time, Duration::from_secs(300));
    assert_eq!(config.routing.osrm_base_url, None);
    assert!(config.strict);
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "request_path": "from-file.json",
            "osrm_base_url": "http://from-file:5000",
            "service_minutes": 20,
        }),
        None,
    );
    composer.push_environment(json!({
        "request_path": "from-env.json",
        "service_minutes": 10,
    }));
    composer.push_cli(json!({ "service_minutes": 2 }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.request_path, Utf8PathBuf::from("from-env.json"));
    assert_eq!(
        config.routing.osrm_base_url.as_deref(),
        Some("http://from-file:5000")
    );
    assert_eq!(config.routing.packer.service_time, Duration::from_secs(120));
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "request_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn pack_reports_missing_request_file() {
    let workspace = Workspace::new();
    let path = workspace.path("absent.json");
    let (result, stdout) = run(args_for(path.clone()));
    match result.expect_err("missing file should error") {
        CliError::MissingSourceFile { field, path: missing } => {
            assert_eq!(field, ARG_REQUEST);
            assert_eq!(missing, path);
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
    assert!(stdout.is_empty());
}

#[rstest]
fn pack_rejects_directory_as_request() {
    let workspace = Workspace::new();
    let dir = workspace.path("requests");
    std::fs::create_dir(dir.as_std_path()).expect("create dir");
    let (result, _) = run(args_for(dir));
    assert!(matches!(result, Err(CliError::SourcePathNotFile { .. })));
}

#[rstest]
fn pack_rejects_malformed_json() {
    let workspace = Workspace::new();
    let path = workspace.path("request.json");
    write_utf8(&path, b"{ \"orders\": [");
    let (result, _) = run(args_for(path));
    assert!(matches!(result, Err(CliError::ParseRequest { .. })));
}

#[rstest]
fn pack_prints_routes_as_json() {
    let workspace = Workspace::new();
    let path = workspace.path("request.json");
    write_json(&path, &pack_request());
    let (result, stdout) = run(args_for(path));
    result.expect("pack should succeed");

    let outcome: PackOutcome = serde_json::from_slice(&stdout).expect("JSON pack outcome");
    assert!(outcome.is_complete());
    let assigned: usize = outcome.routes.iter().map(|route| route.stops.len()).sum();
    assert_eq!(assigned, 3);
    let heavy_route = outcome
        .routes
        .iter()
        .find(|route| route.order_ids().any(|id| id == order_id(3)))
        .expect("order 3 routed");
    assert_eq!(heavy_route.vehicle_id, vehicle_id(2));
    assert!(stdout.ends_with(b"\n"));
}

#[rstest]
fn pack_reports_leftovers_unless_strict() {
    let workspace = Workspace::new();
    let path = workspace.path("request.json");
    write_json(&path, &oversized_pack_request());

    let (lenient, stdout) = run(args_for(path.clone()));
    lenient.expect("lenient pack should succeed");
    let outcome: PackOutcome = serde_json::from_slice(&stdout).expect("JSON pack outcome");
    assert_eq!(outcome.unassigned, vec![order_id(4)]);

    let (strict, strict_stdout) = run(PackArgs {
        strict: true,
        ..args_for(path)
    });
    match strict.expect_err("strict pack should fail") {
        CliError::PartialAssignment { unassigned } => assert_eq!(unassigned, 1),
        other => panic!("expected PartialAssignment, found {other:?}"),
    }
    assert!(strict_stdout.is_empty());
}

#[rstest]
fn pack_surfaces_empty_fleet() {
    let workspace = Workspace::new();
    let path = workspace.path("request.json");
    let mut request = pack_request();
    request.vehicles.clear();
    write_json(&path, &request);
    let (result, _) = run(args_for(path));
    assert!(matches!(
        result,
        Err(CliError::Pack {
            source: tms_core::PackError::NoVehicles
        })
    ));
}
