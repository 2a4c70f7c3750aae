//! Tests for the `Replanner`.

use super::*;
use chrono::TimeDelta;
use geo::Coord;
use rstest::{fixture, rstest};
use tms_core::test_support::{
    PlanarDistanceProvider, base_time, depot, order, order_id, route_id, vehicle, vehicle_id,
};
use tms_core::{
    CancelToken, CurrentRoute, DisruptionEvent, DisruptionKind, OrderStatus, RouteId, VehicleId,
};
use tms_scorer::{DeadlineLatenessClassifier, WeightedAlternativeScorer};

use crate::GreedyPacker;
use crate::test_support::{FailingDistanceProvider, UnreachableDistanceProvider};

type PlanarReplanner = Replanner<
    GreedyPacker<PlanarDistanceProvider>,
    DeadlineLatenessClassifier,
    WeightedAlternativeScorer,
>;

#[fixture]
fn replanner() -> PlanarReplanner {
    Replanner::new(
        GreedyPacker::new(PlanarDistanceProvider),
        DeadlineLatenessClassifier::default(),
        WeightedAlternativeScorer::default(),
    )
}

fn event(
    kind: DisruptionKind,
    route: Option<RouteId>,
    vehicle: Option<VehicleId>,
) -> DisruptionEvent {
    DisruptionEvent {
        kind,
        route_id: route,
        vehicle_id: vehicle,
        description: String::new(),
        occurred_at: base_time(),
    }
}

fn current(route: u128, vehicle: u128, orders: &[u128]) -> CurrentRoute {
    CurrentRoute {
        route_id: route_id(route),
        vehicle_id: vehicle_id(vehicle),
        orders: orders.iter().copied().map(order_id).collect(),
    }
}

/// Four 10 kg orders: 1 and 2 east of the depot on route 1, 3 and 4 north
/// of it on route 2.
fn two_route_request(event: DisruptionEvent, vehicles: Vec<Vehicle>) -> ReplanRequest {
    ReplanRequest {
        event,
        current_routes: vec![current(1, 1, &[1, 2]), current(2, 2, &[3, 4])],
        orders: vec![
            order(1, 1.0, 0.0, 10.0),
            order(2, 2.0, 0.0, 10.0),
            order(3, 0.0, 1.0, 10.0),
            order(4, 0.0, 2.0, 10.0),
        ],
        vehicles,
        depot: depot(),
    }
}

fn route_of(alternative: &Alternative, vehicle: VehicleId) -> Option<Vec<OrderId>> {
    alternative
        .routes
        .iter()
        .find(|route| route.vehicle_id == vehicle)
        .map(|route| route.order_ids().collect())
}

#[rstest]
fn one_alternative_per_strategy_with_lowest_score_recommended(replanner: PlanarReplanner) {
    let request = two_route_request(
        event(DisruptionKind::TrafficDelay, None, None),
        vec![vehicle(1, 100.0), vehicle(2, 100.0)],
    );
    let outcome = replanner
        .generate_alternatives(&request, &Cancellation::default())
        .expect("re-plan succeeds");

    let strategies: Vec<Strategy> = outcome
        .alternatives
        .iter()
        .map(|alternative| alternative.strategy)
        .collect();
    assert_eq!(strategies, Strategy::ALL.to_vec());
    let best = outcome.recommended().expect("recommendation").score;
    assert!(outcome
        .alternatives
        .iter()
        .all(|alternative| best <= alternative.score));
}

#[rstest]
fn broken_down_vehicle_receives_no_route(replanner: PlanarReplanner) {
    let request = two_route_request(
        event(DisruptionKind::VehicleBreakdown, None, Some(vehicle_id(1))),
        vec![vehicle(1, 100.0), vehicle(2, 100.0)],
    );
    let outcome = replanner
        .generate_alternatives(&request, &Cancellation::default())
        .expect("re-plan succeeds");

    for alternative in &outcome.alternatives {
        assert!(route_of(alternative, vehicle_id(1)).is_none());
    }
    for strategy in [Strategy::MinimizeLateness, Strategy::MinimizeCost] {
        let alternative = outcome.by_strategy(strategy).expect("alternative");
        assert_eq!(alternative.kpis.unassigned, 0);
    }
    // Vehicle 2 keeps its own route, so nothing is free for orders 1 and 2.
    let minimal = outcome
        .by_strategy(Strategy::MinimizeDisruption)
        .expect("minimal alternative");
    assert_eq!(minimal.unassigned, vec![order_id(1), order_id(2)]);
}

#[rstest]
fn breakdown_found_through_its_route(replanner: PlanarReplanner) {
    let request = two_route_request(
        event(DisruptionKind::DriverUnavailable, Some(route_id(2)), None),
        vec![vehicle(1, 100.0), vehicle(2, 100.0)],
    );
    let outcome = replanner
        .generate_alternatives(&request, &Cancellation::default())
        .expect("re-plan succeeds");

    for alternative in &outcome.alternatives {
        assert!(route_of(alternative, vehicle_id(2)).is_none());
    }
}

#[rstest]
fn minimal_disruption_keeps_untouched_routes(replanner: PlanarReplanner) {
    let request = two_route_request(
        event(DisruptionKind::VehicleBreakdown, None, Some(vehicle_id(1))),
        vec![vehicle(1, 100.0), vehicle(2, 100.0), vehicle(3, 100.0)],
    );
    let outcome = replanner
        .generate_alternatives(&request, &Cancellation::default())
        .expect("re-plan succeeds");
    let minimal = outcome
        .by_strategy(Strategy::MinimizeDisruption)
        .expect("minimal alternative");

    assert_eq!(
        route_of(minimal, vehicle_id(2)),
        Some(vec![order_id(3), order_id(4)])
    );
    assert_eq!(
        route_of(minimal, vehicle_id(3)),
        Some(vec![order_id(1), order_id(2)])
    );
    assert_eq!(minimal.kpis.changed_stops, 2);
}

#[rstest]
fn matching_plan_counts_no_changes(replanner: PlanarReplanner) {
    let request = ReplanRequest {
        event: event(DisruptionKind::Other, None, None),
        current_routes: vec![current(1, 1, &[1, 2])],
        orders: vec![order(1, 1.0, 0.0, 10.0), order(2, 2.0, 0.0, 10.0)],
        vehicles: vec![vehicle(1, 100.0)],
        depot: depot(),
    };
    let outcome = replanner
        .generate_alternatives(&request, &Cancellation::default())
        .expect("re-plan succeeds");
    let cheapest = outcome
        .by_strategy(Strategy::MinimizeCost)
        .expect("cost alternative");
    assert_eq!(cheapest.kpis.changed_stops, 0);
}

#[rstest]
fn unassigned_orders_count_as_late(replanner: PlanarReplanner) {
    let request = ReplanRequest {
        event: event(DisruptionKind::CustomerRequest, None, None),
        current_routes: Vec::new(),
        orders: vec![order(1, 1.0, 0.0, 10.0), order(2, 2.0, 0.0, 10.0)],
        vehicles: vec![vehicle(1, 15.0)],
        depot: depot(),
    };
    let outcome = replanner
        .generate_alternatives(&request, &Cancellation::default())
        .expect("re-plan succeeds");
    for alternative in &outcome.alternatives {
        assert_eq!(alternative.kpis.unassigned, 1);
        assert_eq!(alternative.kpis.late_count, 1);
    }
}

#[rstest]
fn stops_arriving_after_their_deadline_are_late(replanner: PlanarReplanner) {
    let mut distant = order(1, 40.0, 0.0, 10.0);
    distant.required_by = Some(base_time() + TimeDelta::minutes(30));
    let request = ReplanRequest {
        event: event(DisruptionKind::TrafficDelay, None, None),
        current_routes: Vec::new(),
        orders: vec![distant],
        vehicles: vec![vehicle(1, 100.0)],
        depot: depot(),
    };
    let outcome = replanner
        .generate_alternatives(&request, &Cancellation::default())
        .expect("re-plan succeeds");
    for alternative in &outcome.alternatives {
        assert_eq!(alternative.kpis.late_count, 1);
        assert_eq!(alternative.kpis.unassigned, 0);
    }
}

#[rstest]
fn settled_orders_are_not_replanned(replanner: PlanarReplanner) {
    let mut delivered = order(1, 1.0, 0.0, 10.0);
    delivered.status = OrderStatus::Delivered;
    let mut cancelled = order(2, 2.0, 0.0, 10.0);
    cancelled.status = OrderStatus::Cancelled;
    let request = ReplanRequest {
        event: event(DisruptionKind::Other, None, None),
        current_routes: Vec::new(),
        orders: vec![delivered, cancelled],
        vehicles: vec![vehicle(1, 100.0)],
        depot: depot(),
    };
    let err = replanner
        .generate_alternatives(&request, &Cancellation::default())
        .expect_err("nothing to plan");
    assert_eq!(err, ReplanError::NoOrders);
}

#[rstest]
fn picked_up_orders_on_a_broken_down_vehicle_are_replanned(replanner: PlanarReplanner) {
    let mut request = two_route_request(
        event(DisruptionKind::VehicleBreakdown, Some(route_id(1)), None),
        vec![vehicle(1, 100.0), vehicle(2, 100.0), vehicle(3, 100.0)],
    );
    request.orders.first_mut().expect("order 1").status = OrderStatus::PickedUp;
    let outcome = replanner
        .generate_alternatives(&request, &Cancellation::default())
        .expect("re-plan succeeds");

    for alternative in &outcome.alternatives {
        let routed = alternative
            .routes
            .iter()
            .flat_map(|route| route.order_ids())
            .any(|id| id == order_id(1));
        let unassigned = alternative.unassigned.contains(&order_id(1));
        assert!(
            routed || unassigned,
            "{} dropped the picked-up order",
            alternative.strategy
        );
    }
    let minimal = outcome
        .by_strategy(Strategy::MinimizeDisruption)
        .expect("minimal alternative");
    assert_eq!(
        route_of(minimal, vehicle_id(3)),
        Some(vec![order_id(1), order_id(2)])
    );
}

#[rstest]
fn unreachable_carried_route_is_repacked_instead_of_failing() {
    let blocked = Replanner::new(
        GreedyPacker::new(UnreachableDistanceProvider::new(
            PlanarDistanceProvider,
            vec![Coord { x: 0.0, y: 1.0 }],
        )),
        DeadlineLatenessClassifier::default(),
        WeightedAlternativeScorer::default(),
    );
    let request = two_route_request(
        event(DisruptionKind::VehicleBreakdown, None, Some(vehicle_id(1))),
        vec![vehicle(1, 100.0), vehicle(2, 100.0), vehicle(3, 100.0)],
    );
    let outcome = blocked
        .generate_alternatives(&request, &Cancellation::default())
        .expect("an unreachable stop does not abort the run");

    let minimal = outcome
        .by_strategy(Strategy::MinimizeDisruption)
        .expect("minimal alternative");
    assert_eq!(minimal.unassigned, vec![order_id(3)]);
    let routed: HashSet<OrderId> = minimal
        .routes
        .iter()
        .flat_map(|route| route.order_ids())
        .collect();
    assert_eq!(
        routed,
        HashSet::from([order_id(1), order_id(2), order_id(4)])
    );
    assert!(route_of(minimal, vehicle_id(1)).is_none());
}

#[rstest]
fn losing_the_only_vehicle_leaves_nothing_to_plan_with(replanner: PlanarReplanner) {
    let request = two_route_request(
        event(DisruptionKind::VehicleBreakdown, None, Some(vehicle_id(1))),
        vec![vehicle(1, 100.0)],
    );
    let err = replanner
        .generate_alternatives(&request, &Cancellation::default())
        .expect_err("no fleet");
    assert_eq!(err, ReplanError::NoVehicles);
}

#[rstest]
fn cancelled_run_returns_no_alternatives(replanner: PlanarReplanner) {
    let token = CancelToken::new();
    token.cancel();
    let request = two_route_request(
        event(DisruptionKind::TrafficDelay, None, None),
        vec![vehicle(1, 100.0)],
    );
    let err = replanner
        .generate_alternatives(&request, &Cancellation::default().with_token(token))
        .expect_err("cancelled");
    assert_eq!(err, ReplanError::Cancelled);
}

#[rstest]
fn distance_failures_name_the_failing_strategy() {
    let failing = Replanner::new(
        GreedyPacker::new(FailingDistanceProvider::default()),
        DeadlineLatenessClassifier::default(),
        WeightedAlternativeScorer::default(),
    );
    let request = two_route_request(
        event(DisruptionKind::TrafficDelay, None, None),
        vec![vehicle(1, 100.0)],
    );
    let err = failing
        .generate_alternatives(&request, &Cancellation::default())
        .expect_err("distance failure");
    assert!(matches!(
        err,
        ReplanError::Strategy {
            strategy: Strategy::MinimizeLateness,
            source: PackError::Distance(_),
        }
    ));
}

#[rstest]
fn score_ties_keep_the_earliest_alternative() {
    let alternatives: Vec<Alternative> = [0.5, 0.2, 0.2]
        .into_iter()
        .zip(Strategy::ALL)
        .map(|(score, strategy)| Alternative {
            strategy,
            routes: Vec::new(),
            unassigned: Vec::new(),
            kpis: AlternativeKpis::default(),
            score,
        })
        .collect();
    assert_eq!(lowest_score(&alternatives), 1);
}
