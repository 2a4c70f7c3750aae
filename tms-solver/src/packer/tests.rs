//! Tests for the `GreedyPacker`.

use super::*;
use chrono::TimeDelta;
use rstest::rstest;
use tms_core::test_support::{
    PlanarDistanceProvider, base_time, depot, order, order_id, vehicle, vehicle_id,
};
use tms_core::{CancelToken, Cancellation, Cancelled, OrderValidationError, Priority, VehicleStatus};

use crate::test_support::UnreachableDistanceProvider;

fn packer() -> GreedyPacker<PlanarDistanceProvider> {
    GreedyPacker::new(PlanarDistanceProvider)
}

fn ids(route: &RouteResult) -> Vec<tms_core::OrderId> {
    route.order_ids().collect()
}

#[rstest]
fn heavy_pair_splits_across_single_vehicle() {
    let orders = vec![order(1, 1.0, 0.0, 150.0), order(2, 2.0, 0.0, 250.0)];
    let outcome = packer()
        .pack(&orders, &[vehicle(1, 300.0)], &depot(), &PackOptions::default())
        .expect("pack succeeds");

    assert_eq!(outcome.routes.len(), 1);
    assert_eq!(outcome.unassigned.len(), 1);
    let route = outcome.routes.first().expect("one route");
    assert_eq!(ids(route), vec![order_id(1)]);
    assert_eq!(outcome.unassigned, vec![order_id(2)]);
}

#[rstest]
fn nearest_order_is_visited_first() {
    let orders = vec![
        order(1, 5.0, 0.0, 10.0),
        order(2, 1.0, 0.0, 10.0),
        order(3, 3.0, 0.0, 10.0),
    ];
    let outcome = packer()
        .pack(&orders, &[vehicle(1, 100.0)], &depot(), &PackOptions::default())
        .expect("pack succeeds");
    let route = outcome.routes.first().expect("one route");
    assert_eq!(ids(route), vec![order_id(2), order_id(3), order_id(1)]);
    let sequences: Vec<u32> = route.stops.iter().map(|stop| stop.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
}

#[rstest]
#[expect(clippy::float_cmp, reason = "planar distances on a grid are exact")]
fn totals_include_return_leg_and_service_time() {
    let orders = vec![order(1, 3.0, 4.0, 10.0)];
    let mut van = vehicle(1, 100.0);
    van.cost_per_km = 2.0;
    let config = PackerConfig {
        average_speed_kmh: 10.0,
        service_time: Duration::from_secs(600),
    };
    let outcome = GreedyPacker::with_config(PlanarDistanceProvider, config)
        .pack(&orders, &[van], &depot(), &PackOptions::default())
        .expect("pack succeeds");
    let route = outcome.routes.first().expect("one route");
    let stop = route.stops.first().expect("one stop");

    assert_eq!(route.total_distance_km, 10.0);
    assert_eq!(route.total_cost, 20.0);
    assert_eq!(stop.distance_from_previous_km, 5.0);
    assert_eq!(stop.arrival, base_time() + TimeDelta::minutes(30));
    assert_eq!(stop.departure, base_time() + TimeDelta::minutes(40));
    assert_eq!(stop.cumulative_service_time, Duration::from_secs(600));
    assert_eq!(route.total_duration, Duration::from_secs(70 * 60));
    assert_eq!(route.utilization, 0.1);
}

#[rstest]
fn equidistant_orders_prefer_earlier_deadline_then_lower_volume() {
    let mut late = order(1, 0.0, 2.0, 10.0);
    late.required_by = Some(base_time() + TimeDelta::hours(6));
    let mut early = order(2, 2.0, 0.0, 10.0);
    early.required_by = Some(base_time() + TimeDelta::hours(2));
    let mut bulky = order(3, 0.0, -2.0, 10.0);
    bulky.volume_m3 = 2.0;
    let mut compact = order(4, -2.0, 0.0, 10.0);
    compact.volume_m3 = 1.0;

    let fleet: Vec<Vehicle> = (1..=4).map(|n| vehicle(n, 15.0)).collect();
    let outcome = packer()
        .pack(
            &[late, early, bulky, compact],
            &fleet,
            &depot(),
            &PackOptions::default(),
        )
        .expect("pack succeeds");

    let firsts: Vec<_> = outcome
        .routes
        .iter()
        .filter_map(|route| route.stops.first().map(|stop| stop.order_id))
        .collect();
    assert_eq!(
        firsts,
        vec![order_id(2), order_id(1), order_id(4), order_id(3)]
    );
}

#[rstest]
fn earliest_deadline_rule_overrides_distance() {
    let near = order(1, 1.0, 0.0, 10.0);
    let mut urgent = order(2, 9.0, 0.0, 10.0);
    urgent.required_by = Some(base_time() + TimeDelta::hours(1));
    let options = PackOptions {
        selection: SelectionRule::EarliestDeadline,
        ..PackOptions::default()
    };
    let outcome = packer()
        .pack(&[near, urgent], &[vehicle(1, 100.0)], &depot(), &options)
        .expect("pack succeeds");
    let route = outcome.routes.first().expect("one route");
    assert_eq!(ids(route), vec![order_id(2), order_id(1)]);
}

#[rstest]
fn undispatchable_vehicles_are_skipped() {
    let mut broken = vehicle(1, 100.0);
    broken.status = VehicleStatus::Maintenance;
    let outcome = packer()
        .pack(
            &[order(1, 1.0, 0.0, 10.0)],
            &[broken, vehicle(2, 100.0)],
            &depot(),
            &PackOptions::default(),
        )
        .expect("pack succeeds");
    let route = outcome.routes.first().expect("one route");
    assert_eq!(route.vehicle_id, vehicle_id(2));
}

#[rstest]
fn empty_routes_are_not_emitted() {
    let outcome = packer()
        .pack(
            &[order(1, 1.0, 0.0, 10.0)],
            &[vehicle(1, 5.0), vehicle(2, 100.0)],
            &depot(),
            &PackOptions::default(),
        )
        .expect("pack succeeds");
    assert_eq!(outcome.routes.len(), 1);
    assert!(outcome.is_complete());
}

#[rstest]
fn empty_inputs_are_rejected() {
    let err = packer()
        .pack(&[], &[vehicle(1, 100.0)], &depot(), &PackOptions::default())
        .expect_err("no orders");
    assert_eq!(err, PackError::NoOrders);

    let mut retired = vehicle(1, 100.0);
    retired.status = VehicleStatus::Retired;
    let err = packer()
        .pack(
            &[order(1, 1.0, 0.0, 10.0)],
            &[retired],
            &depot(),
            &PackOptions::default(),
        )
        .expect_err("no vehicles");
    assert_eq!(err, PackError::NoVehicles);
}

#[rstest]
fn critical_order_without_deadline_is_rejected() {
    let mut critical = order(1, 1.0, 0.0, 10.0);
    critical.priority = Priority::Critical;
    let err = packer()
        .pack(&[critical], &[vehicle(1, 100.0)], &depot(), &PackOptions::default())
        .expect_err("missing deadline");
    assert_eq!(
        err,
        PackError::InvalidOrder {
            order_id: order_id(1),
            source: OrderValidationError::MissingDeadline {
                priority: Priority::Critical
            },
        }
    );
}

#[rstest]
fn duplicate_orders_are_rejected() {
    let orders = vec![order(1, 1.0, 0.0, 10.0), order(1, 2.0, 0.0, 10.0)];
    let err = packer()
        .pack(&orders, &[vehicle(1, 100.0)], &depot(), &PackOptions::default())
        .expect_err("duplicate");
    assert_eq!(
        err,
        PackError::DuplicateOrder {
            order_id: order_id(1)
        }
    );
}

#[rstest]
fn cancelled_run_yields_no_routes() {
    let token = CancelToken::new();
    token.cancel();
    let options = PackOptions {
        cancellation: Cancellation::default().with_token(token),
        ..PackOptions::default()
    };
    let err = packer()
        .pack(
            &[order(1, 1.0, 0.0, 10.0)],
            &[vehicle(1, 100.0)],
            &depot(),
            &options,
        )
        .expect_err("cancelled");
    assert_eq!(err, PackError::Cancelled(Cancelled));
}

#[rstest]
fn unreachable_orders_stay_unassigned() {
    let blocked = GreedyPacker::new(UnreachableDistanceProvider::new(
        PlanarDistanceProvider,
        vec![Coord { x: 50.0, y: 50.0 }],
    ));
    let orders = vec![order(1, 1.0, 0.0, 10.0), order(2, 50.0, 50.0, 10.0)];
    let outcome = blocked
        .pack(&orders, &[vehicle(1, 100.0)], &depot(), &PackOptions::default())
        .expect("pack succeeds");
    assert_eq!(outcome.unassigned, vec![order_id(2)]);
}

#[rstest]
#[expect(clippy::float_cmp, reason = "planar distances on a grid are exact")]
fn evaluate_keeps_the_given_sequence() {
    let orders = vec![order(1, 3.0, 0.0, 10.0), order(2, 1.0, 0.0, 10.0)];
    let route = packer()
        .evaluate(&vehicle(1, 100.0), &orders, &depot())
        .expect("evaluate succeeds");
    assert_eq!(ids(&route), vec![order_id(1), order_id(2)]);
    assert_eq!(route.total_distance_km, 6.0);
}

#[rstest]
fn evaluate_requires_orders() {
    let err = packer()
        .evaluate(&vehicle(1, 100.0), &[], &depot())
        .expect_err("no orders");
    assert_eq!(err, PackError::NoOrders);
}
