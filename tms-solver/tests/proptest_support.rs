//! Proptest strategies for packer and re-planner property tests.
//!
//! Orders and vehicles are generated on a small planar grid so distances
//! stay finite and every generated input passes admission checks.

use std::collections::HashSet;

use proptest::prelude::*;
use tms_core::test_support::{order, order_id, vehicle};
use tms_core::{Order, PackOutcome, Vehicle};

/// Strategy for `min_count..=max_count` orders with unique identifiers.
pub fn order_set_strategy(
    min_count: usize,
    max_count: usize,
) -> impl Strategy<Value = Vec<Order>> {
    (min_count..=max_count).prop_flat_map(|count| {
        proptest::collection::vec(order_strategy(), count).prop_map(|orders| {
            orders
                .into_iter()
                .zip(1_u128..)
                .map(|(generated, n)| Order {
                    id: order_id(n),
                    ..generated
                })
                .collect()
        })
    })
}

/// Strategy for a single order with weight, volume and a grid destination.
fn order_strategy() -> impl Strategy<Value = Order> {
    (-20_i32..=20, -20_i32..=20, 1_u16..=120, 0_u8..=4).prop_map(|(x, y, weight, volume)| {
        let mut generated = order(0, f64::from(x), f64::from(y), f64::from(weight));
        generated.volume_m3 = f64::from(volume);
        generated
    })
}

/// Strategy for `1..=max_count` vehicles with varied capacity.
pub fn fleet_strategy(max_count: usize) -> impl Strategy<Value = Vec<Vehicle>> {
    proptest::collection::vec((50_u16..=400, 2_u8..=20), 1..=max_count).prop_map(|specs| {
        specs
            .into_iter()
            .zip(1_u128..)
            .map(|((weight, volume), n)| {
                let mut generated = vehicle(n, f64::from(weight));
                generated.capacity_m3 = f64::from(volume);
                generated
            })
            .collect()
    })
}

/// Assert every order is either routed exactly once or reported unassigned.
///
/// # Errors
///
/// Returns an error naming the first order placed twice, missing, or
/// unknown to the input.
pub fn assert_orders_accounted_for(
    orders: &[Order],
    outcome: &PackOutcome,
) -> Result<(), proptest::test_runner::TestCaseError> {
    let expected: HashSet<_> = orders.iter().map(|order| order.id).collect();
    let mut seen = HashSet::new();
    let placed = outcome
        .routes
        .iter()
        .flat_map(|route| route.order_ids())
        .chain(outcome.unassigned.iter().copied());
    for order_id in placed {
        prop_assert!(seen.insert(order_id), "order {} placed twice", order_id);
        prop_assert!(expected.contains(&order_id), "order {} was not requested", order_id);
    }
    prop_assert_eq!(seen.len(), expected.len(), "some orders were dropped");
    Ok(())
}
