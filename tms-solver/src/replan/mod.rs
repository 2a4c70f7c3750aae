//! `Replanner`: competing re-plans after a disruption.
//!
//! Each [`Strategy`] re-invokes the packer over the plannable orders with a
//! different objective. The resulting routes are measured against the plan
//! in force, scored, and ranked lowest score first.

mod scope;

use std::cmp::Ordering;
use std::collections::HashSet;

use tms_core::{
    Alternative, AlternativeGenerator, AlternativeKpis, AlternativeScorer, Cancellation,
    CapacityPacker, LatenessClassifier, Order, OrderId, PackError, PackOptions, ReplanError,
    ReplanOutcome, ReplanRequest, RouteResult, SelectionRule, Strategy, Vehicle,
};

use crate::packer::compare_deadlines;
use scope::{Placement, Scope};

/// Routes and leftovers produced by one strategy before measurement.
#[derive(Debug)]
struct Draft {
    routes: Vec<RouteResult>,
    unassigned: Vec<OrderId>,
    /// The packer had no orders or no vehicles to work with.
    degenerate: bool,
}

/// Default [`AlternativeGenerator`].
///
/// The generator is generic over the engine boundaries: a capacity packer,
/// a lateness classifier used to estimate late stops, and a scorer that
/// ranks the alternatives.
#[derive(Debug, Clone)]
pub struct Replanner<P, L, S>
where
    P: CapacityPacker,
    L: LatenessClassifier,
    S: AlternativeScorer,
{
    packer: P,
    lateness: L,
    scorer: S,
}

impl<P, L, S> Replanner<P, L, S>
where
    P: CapacityPacker,
    L: LatenessClassifier,
    S: AlternativeScorer,
{
    /// Construct a re-planner from its collaborators.
    pub const fn new(packer: P, lateness: L, scorer: S) -> Self {
        Self {
            packer,
            lateness,
            scorer,
        }
    }

    /// Packer used for every strategy.
    #[must_use]
    pub const fn packer(&self) -> &P {
        &self.packer
    }

    fn draft(
        &self,
        strategy: Strategy,
        scope: &Scope<'_>,
        cancellation: &Cancellation,
    ) -> Result<Draft, PackError> {
        match strategy {
            Strategy::MinimizeLateness => {
                let mut orders = owned(&scope.plannable);
                orders.sort_by(|lhs, rhs| compare_deadlines(lhs.required_by, rhs.required_by));
                self.pack(
                    &orders,
                    &scope.fleet,
                    scope,
                    SelectionRule::EarliestDeadline,
                    cancellation,
                )
            }
            Strategy::MinimizeCost => {
                let mut orders = owned(&scope.plannable);
                orders.sort_by_key(|order| order.created_at);
                self.pack(
                    &orders,
                    &scope.fleet,
                    scope,
                    SelectionRule::NearestNeighbor,
                    cancellation,
                )
            }
            Strategy::MinimizeDisruption => self.minimize_disruption(scope, cancellation),
        }
    }

    fn pack(
        &self,
        orders: &[Order],
        fleet: &[&Vehicle],
        scope: &Scope<'_>,
        selection: SelectionRule,
        cancellation: &Cancellation,
    ) -> Result<Draft, PackError> {
        let vehicles = owned(fleet);
        let options = PackOptions {
            selection,
            cancellation: cancellation.clone(),
        };
        match self
            .packer
            .pack(orders, &vehicles, &scope.request.depot, &options)
        {
            Ok(outcome) => Ok(Draft {
                routes: outcome.routes,
                unassigned: outcome.unassigned,
                degenerate: false,
            }),
            Err(PackError::NoOrders | PackError::NoVehicles) => Ok(Draft {
                routes: Vec::new(),
                unassigned: orders.iter().map(|order| order.id).collect(),
                degenerate: true,
            }),
            Err(err) => Err(err),
        }
    }

    /// Carry untouched routes over and re-pack only what the event touched.
    ///
    /// An untouched route whose fixed sequence no longer evaluates joins
    /// the re-pack.
    fn minimize_disruption(
        &self,
        scope: &Scope<'_>,
        cancellation: &Cancellation,
    ) -> Result<Draft, PackError> {
        let untouched = scope.untouched_routes();
        let mut carried = Vec::with_capacity(untouched.len());
        let mut busy = Vec::with_capacity(untouched.len());
        let mut kept_orders = HashSet::new();
        for current in untouched {
            let Some(vehicle) = scope
                .fleet
                .iter()
                .find(|vehicle| vehicle.id == current.vehicle_id)
            else {
                continue;
            };
            let orders: Vec<Order> = current
                .orders
                .iter()
                .filter_map(|order_id| scope.plannable_order(*order_id))
                .cloned()
                .collect();
            if orders.is_empty() {
                busy.push(vehicle.id);
                continue;
            }
            match self.packer.evaluate(vehicle, &orders, &scope.request.depot) {
                Ok(route) => {
                    busy.push(vehicle.id);
                    kept_orders.extend(orders.iter().map(|order| order.id));
                    carried.push(route);
                }
                Err(err @ PackError::Cancelled(_)) => return Err(err),
                // Its orders and vehicle fall through to the re-pack below.
                Err(err) => log::warn!(
                    "route {} cannot be carried over, re-packing it: {err}",
                    current.route_id
                ),
            }
        }
        log::debug!(
            "carrying {} routes over unchanged with {} orders",
            carried.len(),
            kept_orders.len()
        );

        let affected: Vec<Order> = scope
            .plannable
            .iter()
            .filter(|order| !kept_orders.contains(&order.id))
            .map(|order| (*order).clone())
            .collect();
        let free: Vec<&Vehicle> = scope
            .fleet
            .iter()
            .copied()
            .filter(|vehicle| !busy.contains(&vehicle.id))
            .collect();
        let mut draft = self.pack(
            &affected,
            &free,
            scope,
            SelectionRule::NearestNeighbor,
            cancellation,
        )?;
        carried.append(&mut draft.routes);
        draft.routes = carried;
        Ok(draft)
    }

    fn measure(&self, draft: &Draft, scope: &Scope<'_>, baseline: &Placement) -> AlternativeKpis {
        let late_stops = draft
            .routes
            .iter()
            .flat_map(|route| route.stops.iter())
            .filter(|stop| {
                scope
                    .plannable_order(stop.order_id)
                    .and_then(|order| order.required_by)
                    .is_some_and(|deadline| self.lateness.is_late(deadline, stop.arrival))
            })
            .count();
        let planned = Placement::planned(&draft.routes);
        AlternativeKpis {
            total_cost: draft.routes.iter().map(|route| route.total_cost).sum(),
            total_distance_km: draft.routes.iter().map(|route| route.total_distance_km).sum(),
            late_count: late_stops + draft.unassigned.len(),
            changed_stops: baseline.changed(&planned, scope.plannable_ids()),
            unassigned: draft.unassigned.len(),
        }
    }
}

impl<P, L, S> AlternativeGenerator for Replanner<P, L, S>
where
    P: CapacityPacker,
    L: LatenessClassifier,
    S: AlternativeScorer,
{
    fn generate_alternatives(
        &self,
        request: &ReplanRequest,
        cancellation: &Cancellation,
    ) -> Result<ReplanOutcome, ReplanError> {
        let scope = Scope::new(request);
        let baseline = Placement::current(&scope);
        let mut alternatives = Vec::with_capacity(Strategy::ALL.len());
        let mut degenerate = 0_usize;
        for strategy in Strategy::ALL {
            cancellation.check().map_err(|_| ReplanError::Cancelled)?;
            let draft = match self.draft(strategy, &scope, cancellation) {
                Ok(draft) => draft,
                Err(PackError::Cancelled(_)) => return Err(ReplanError::Cancelled),
                Err(source) => return Err(ReplanError::Strategy { strategy, source }),
            };
            if draft.degenerate {
                degenerate += 1;
            }
            let kpis = self.measure(&draft, &scope, &baseline);
            let score = self.scorer.score(&kpis);
            log::debug!(
                "{strategy}: cost {:.2}, late {}, changed {}, score {score:.4}",
                kpis.total_cost,
                kpis.late_count,
                kpis.changed_stops
            );
            alternatives.push(Alternative {
                strategy,
                routes: draft.routes,
                unassigned: draft.unassigned,
                kpis,
                score,
            });
        }

        if degenerate == Strategy::ALL.len() {
            return Err(if scope.plannable.is_empty() {
                ReplanError::NoOrders
            } else {
                ReplanError::NoVehicles
            });
        }

        let recommended = lowest_score(&alternatives);
        log::info!(
            "generated {} alternatives; recommending {}",
            alternatives.len(),
            alternatives
                .get(recommended)
                .map_or("none", |alternative| alternative.strategy.id())
        );
        Ok(ReplanOutcome {
            alternatives,
            recommended,
        })
    }
}

fn owned<T: Clone>(items: &[&T]) -> Vec<T> {
    items.iter().map(|item| (*item).clone()).collect()
}

/// Index of the lowest score; ties keep the earliest alternative.
fn lowest_score(alternatives: &[Alternative]) -> usize {
    alternatives
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (index, alternative)| {
            match best {
                Some((_, score)) if score.total_cmp(&alternative.score) != Ordering::Greater => {
                    best
                }
                _ => Some((index, alternative.score)),
            }
        })
        .map_or(0, |(index, _)| index)
}

#[cfg(test)]
mod tests;
