//! Behaviour steps specific to the `pack` command.

use super::command_steps::CommandWorld;
use super::helpers::{oversized_pack_request, pack_request, write_json};
use super::*;
use rstest_bdd_macros::{given, then};
use tms_core::PackOutcome;

fn printed_outcome(world: &CommandWorld) -> PackOutcome {
    serde_json::from_slice(&world.stdout.borrow()).expect("output should be a JSON pack outcome")
}

#[given("a pack request that fits the fleet")]
fn pack_request_fits(#[from(world)] world: &CommandWorld) {
    write_json(&world.request_path(), &pack_request());
}

#[given("a pack request with an order no vehicle can carry")]
fn pack_request_with_oversized_order(#[from(world)] world: &CommandWorld) {
    write_json(&world.request_path(), &oversized_pack_request());
}

#[given("strict packing is requested")]
fn strict_packing(#[from(world)] world: &CommandWorld) {
    world.push_flag(ARG_STRICT);
}

#[given("an average speed of {speed} km/h")]
fn average_speed(#[from(world)] world: &CommandWorld, speed: String) {
    world.push_option(ARG_AVERAGE_SPEED, &speed);
}

#[then("every order appears on a route")]
fn every_order_routed(#[from(world)] world: &CommandWorld) {
    let outcome = printed_outcome(world);
    assert!(outcome.is_complete());
    let routed: usize = outcome.routes.iter().map(|route| route.stops.len()).sum();
    assert_eq!(routed, pack_request().orders.len());
}

#[then("{count} order is reported unassigned")]
fn orders_reported_unassigned(#[from(world)] world: &CommandWorld, count: usize) {
    assert_eq!(printed_outcome(world).unassigned.len(), count);
}

#[then("the command fails because {count} order is unassigned")]
fn command_fails_partial(#[from(world)] world: &CommandWorld, count: usize) {
    match &*world.error() {
        CliError::PartialAssignment { unassigned } => assert_eq!(*unassigned, count),
        other => panic!("expected PartialAssignment, found {other:?}"),
    }
    assert!(world.stdout.borrow().is_empty());
}
