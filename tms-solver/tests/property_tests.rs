//! Property-based tests for the packer and re-planner.
//!
//! # Invariants tested
//!
//! - **Capacity:** no route exceeds its vehicle's weight or volume limit.
//! - **Coverage:** every order is routed exactly once or left unassigned.
//! - **Sequencing:** stop sequences run 1..=N without gaps.
//! - **Ranking:** re-planning yields three alternatives and recommends the
//!   lowest score.

mod proptest_support;

use proptest::prelude::*;
use tms_core::test_support::{PlanarDistanceProvider, base_time, depot};
use tms_core::{
    AlternativeGenerator, Cancellation, CapacityPacker, DisruptionEvent, DisruptionKind,
    PackOptions, ReplanRequest, SelectionRule, Strategy,
};
use tms_scorer::{DeadlineLatenessClassifier, WeightedAlternativeScorer};
use tms_solver::{GreedyPacker, Replanner};

use proptest_support::{assert_orders_accounted_for, fleet_strategy, order_set_strategy};

fn selection_strategy() -> impl proptest::strategy::Strategy<Value = SelectionRule> {
    prop_oneof![
        Just(SelectionRule::NearestNeighbor),
        Just(SelectionRule::EarliestDeadline),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: a route's load never exceeds its vehicle's capacity.
    #[test]
    fn routes_respect_vehicle_capacity(
        orders in order_set_strategy(1, 25),
        vehicles in fleet_strategy(4),
        selection in selection_strategy(),
    ) {
        let packer = GreedyPacker::new(PlanarDistanceProvider);
        let options = PackOptions { selection, ..PackOptions::default() };
        let outcome = packer
            .pack(&orders, &vehicles, &depot(), &options)
            .expect("pack should succeed");

        for route in &outcome.routes {
            let vehicle = vehicles
                .iter()
                .find(|vehicle| vehicle.id == route.vehicle_id)
                .expect("route vehicle comes from the fleet");
            prop_assert!(
                vehicle.can_carry(route.load),
                "route load {:?} exceeds capacity of {}",
                route.load,
                vehicle.name
            );
            prop_assert!(route.utilization <= 1.0);
        }
    }

    /// Property: no order is lost or duplicated.
    #[test]
    fn every_order_is_accounted_for(
        orders in order_set_strategy(1, 25),
        vehicles in fleet_strategy(4),
    ) {
        let packer = GreedyPacker::new(PlanarDistanceProvider);
        let outcome = packer
            .pack(&orders, &vehicles, &depot(), &PackOptions::default())
            .expect("pack should succeed");

        assert_orders_accounted_for(&orders, &outcome)?;
    }

    /// Property: stop sequences are contiguous from one and routes are never
    /// empty.
    #[test]
    fn stop_sequences_are_contiguous(
        orders in order_set_strategy(1, 25),
        vehicles in fleet_strategy(4),
    ) {
        let packer = GreedyPacker::new(PlanarDistanceProvider);
        let outcome = packer
            .pack(&orders, &vehicles, &depot(), &PackOptions::default())
            .expect("pack should succeed");

        for route in &outcome.routes {
            prop_assert!(!route.stops.is_empty());
            let sequences: Vec<u32> = route.stops.iter().map(|stop| stop.sequence).collect();
            let expected: Vec<u32> = (1..).take(route.stops.len()).collect();
            prop_assert_eq!(sequences, expected);
        }
    }

    /// Property: re-planning ranks exactly one alternative per strategy and
    /// recommends the minimum score.
    #[test]
    fn replanning_recommends_the_lowest_score(
        orders in order_set_strategy(1, 15),
        vehicles in fleet_strategy(3),
    ) {
        let replanner = Replanner::new(
            GreedyPacker::new(PlanarDistanceProvider),
            DeadlineLatenessClassifier::default(),
            WeightedAlternativeScorer::default(),
        );
        let request = ReplanRequest {
            event: DisruptionEvent {
                kind: DisruptionKind::TrafficDelay,
                route_id: None,
                vehicle_id: None,
                description: String::new(),
                occurred_at: base_time(),
            },
            current_routes: Vec::new(),
            orders,
            vehicles,
            depot: depot(),
        };
        let outcome = replanner
            .generate_alternatives(&request, &Cancellation::default())
            .expect("re-plan should succeed");

        prop_assert_eq!(outcome.alternatives.len(), Strategy::ALL.len());
        let best = outcome.recommended().expect("recommendation").score;
        for alternative in &outcome.alternatives {
            prop_assert!(alternative.score.is_finite());
            prop_assert!(best <= alternative.score);
        }
    }
}
