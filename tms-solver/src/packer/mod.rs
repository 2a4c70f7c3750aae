//! `GreedyPacker`: capacitated nearest-neighbour route construction.
//!
//! Vehicles are filled one at a time in input order. Each vehicle starts at
//! the depot and repeatedly takes the best remaining order that still fits
//! its residual weight and volume, until nothing fits. The route then
//! returns to the depot.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use geo::Coord;
use tms_core::distance::validate_matrix;
use tms_core::{
    CapacityPacker, Depot, DistanceError, DistanceMatrix, DistanceProvider, Load, Order,
    PackError, PackOptions, PackOutcome, PlannedStop, RouteResult, SelectionRule, Vehicle,
};

/// Configuration for [`GreedyPacker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackerConfig {
    /// Assumed average driving speed used to turn distance into time.
    pub average_speed_kmh: f64,
    /// Fixed time spent at every stop.
    pub service_time: Duration,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: 40.0,
            service_time: Duration::from_secs(15 * 60),
        }
    }
}

/// Greedy capacity packer over a [`DistanceProvider`].
///
/// Distances are fetched once per call as a single matrix covering the
/// depot and every order destination, so providers backed by a routing
/// service make one request per packing run.
#[derive(Debug, Clone)]
pub struct GreedyPacker<D>
where
    D: DistanceProvider,
{
    distances: D,
    config: PackerConfig,
}

impl<D> GreedyPacker<D>
where
    D: DistanceProvider,
{
    /// Construct a packer using default configuration.
    pub fn new(distances: D) -> Self {
        Self::with_config(distances, PackerConfig::default())
    }

    /// Construct a packer with explicit configuration.
    pub const fn with_config(distances: D, config: PackerConfig) -> Self {
        Self { distances, config }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &PackerConfig {
        &self.config
    }

    /// Matrix over the depot (index 0) followed by each order's destination.
    fn matrix(&self, depot: &Depot, orders: &[&Order]) -> Result<DistanceMatrix, DistanceError> {
        let points: Vec<Coord<f64>> = std::iter::once(depot.location)
            .chain(orders.iter().map(|order| order.location()))
            .collect();
        let matrix = self.distances.distance_matrix(&points)?;
        validate_matrix(&matrix, points.len())?;
        Ok(matrix)
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "travel time derives from distance and speed"
    )]
    fn travel_time(&self, distance_km: f64) -> Duration {
        let hours = distance_km / self.config.average_speed_kmh;
        Duration::try_from_secs_f64(hours * 3600.0).unwrap_or_else(|_| {
            log::warn!(
                "travel time for {distance_km} km at {} km/h is not representable; saturating",
                self.config.average_speed_kmh
            );
            Duration::MAX
        })
    }

    /// Pick the order indices one vehicle serves, in visiting order.
    fn fill_vehicle(
        &self,
        vehicle: &Vehicle,
        orders: &[&Order],
        matrix: &DistanceMatrix,
        assigned: &mut [bool],
        options: &PackOptions,
    ) -> Result<Vec<usize>, PackError> {
        let mut sequence = Vec::new();
        let mut load = Load::ZERO;
        let mut position = 0_usize;
        loop {
            options.cancellation.check()?;
            let candidates = orders
                .iter()
                .zip(assigned.iter())
                .enumerate()
                .filter(|(_, (order, taken))| !**taken && vehicle.can_carry(load + order.load()))
                .filter_map(|(index, (order, _))| {
                    let node = index + 1;
                    let outbound = leg(matrix, position, node);
                    let inbound = leg(matrix, node, 0);
                    (outbound.is_finite() && inbound.is_finite()).then_some(Candidate {
                        index,
                        distance_km: outbound,
                        order,
                    })
                });
            let Some(next) = candidates.min_by(|lhs, rhs| compare(options.selection, lhs, rhs))
            else {
                break;
            };
            if let Some(taken) = assigned.get_mut(next.index) {
                *taken = true;
            }
            load += next.order.load();
            position = next.index + 1;
            sequence.push(next.index);
        }
        Ok(sequence)
    }

    /// Measure a visiting sequence of matrix nodes for `vehicle`.
    #[expect(
        clippy::float_arithmetic,
        reason = "route totals accumulate floating-point distances"
    )]
    fn build_route(
        &self,
        vehicle: &Vehicle,
        orders: &[&Order],
        sequence: &[usize],
        matrix: &DistanceMatrix,
        depot: &Depot,
    ) -> Result<RouteResult, PackError> {
        let mut stops = Vec::with_capacity(sequence.len());
        let mut elapsed = Duration::ZERO;
        let mut service = Duration::ZERO;
        let mut distance_km = 0.0_f64;
        let mut load = Load::ZERO;
        let mut position = 0_usize;
        for (index, order_number) in sequence.iter().copied().zip(1_u32..) {
            let Some(order) = orders.get(index) else {
                log::warn!("order index {index} outside packing input; skipping");
                debug_assert!(false, "order index {index} outside packing input");
                continue;
            };
            let node = index + 1;
            let hop = finite_leg(matrix, position, node)?;
            distance_km += hop;
            elapsed = elapsed.saturating_add(self.travel_time(hop));
            let arrival = offset(depot.departure_at, elapsed);
            elapsed = elapsed.saturating_add(self.config.service_time);
            service = service.saturating_add(self.config.service_time);
            stops.push(PlannedStop {
                order_id: order.id,
                sequence: order_number,
                location: order.location(),
                arrival,
                departure: offset(depot.departure_at, elapsed),
                distance_from_previous_km: hop,
                cumulative_service_time: service,
            });
            load += order.load();
            position = node;
        }
        let home = finite_leg(matrix, position, 0)?;
        distance_km += home;
        elapsed = elapsed.saturating_add(self.travel_time(home));
        Ok(RouteResult {
            vehicle_id: vehicle.id,
            stops,
            total_distance_km: distance_km,
            total_duration: elapsed,
            total_cost: distance_km * vehicle.cost_per_km,
            load,
            utilization: vehicle.utilization(load),
        })
    }
}

impl<D> CapacityPacker for GreedyPacker<D>
where
    D: DistanceProvider + Send + Sync,
{
    fn pack(
        &self,
        orders: &[Order],
        vehicles: &[Vehicle],
        depot: &Depot,
        options: &PackOptions,
    ) -> Result<PackOutcome, PackError> {
        if orders.is_empty() {
            return Err(PackError::NoOrders);
        }
        validate_orders(orders)?;
        let fleet: Vec<&Vehicle> = vehicles
            .iter()
            .filter(|vehicle| vehicle.status.is_dispatchable())
            .collect();
        if fleet.is_empty() {
            return Err(PackError::NoVehicles);
        }
        options.cancellation.check()?;

        let inputs: Vec<&Order> = orders.iter().collect();
        let matrix = self.matrix(depot, &inputs)?;
        let mut assigned = vec![false; inputs.len()];
        let mut routes = Vec::new();
        for vehicle in fleet {
            if assigned.iter().all(|taken| *taken) {
                break;
            }
            let sequence = self.fill_vehicle(vehicle, &inputs, &matrix, &mut assigned, options)?;
            if sequence.is_empty() {
                continue;
            }
            routes.push(self.build_route(vehicle, &inputs, &sequence, &matrix, depot)?);
        }

        let unassigned: Vec<_> = inputs
            .iter()
            .zip(&assigned)
            .filter(|(_, taken)| !**taken)
            .map(|(order, _)| order.id)
            .collect();
        if !unassigned.is_empty() {
            log::info!(
                "{} of {} orders left unassigned after {} routes",
                unassigned.len(),
                inputs.len(),
                routes.len()
            );
        }
        Ok(PackOutcome { routes, unassigned })
    }

    fn evaluate(
        &self,
        vehicle: &Vehicle,
        orders: &[Order],
        depot: &Depot,
    ) -> Result<RouteResult, PackError> {
        if orders.is_empty() {
            return Err(PackError::NoOrders);
        }
        let inputs: Vec<&Order> = orders.iter().collect();
        let matrix = self.matrix(depot, &inputs)?;
        let sequence: Vec<usize> = (0..inputs.len()).collect();
        self.build_route(vehicle, &inputs, &sequence, &matrix, depot)
    }
}

fn validate_orders(orders: &[Order]) -> Result<(), PackError> {
    let mut seen = HashSet::with_capacity(orders.len());
    for order in orders {
        order
            .validate()
            .map_err(|source| PackError::InvalidOrder {
                order_id: order.id,
                source,
            })?;
        if !seen.insert(order.id) {
            return Err(PackError::DuplicateOrder { order_id: order.id });
        }
    }
    Ok(())
}

struct Candidate<'a> {
    index: usize,
    distance_km: f64,
    order: &'a Order,
}

fn compare(rule: SelectionRule, lhs: &Candidate<'_>, rhs: &Candidate<'_>) -> Ordering {
    let distance = lhs.distance_km.total_cmp(&rhs.distance_km);
    let deadline = compare_deadlines(lhs.order.required_by, rhs.order.required_by);
    let volume = lhs.order.volume_m3.total_cmp(&rhs.order.volume_m3);
    let primary = match rule {
        SelectionRule::NearestNeighbor => distance.then(deadline),
        SelectionRule::EarliestDeadline => deadline.then(distance),
    };
    primary
        .then(volume)
        .then_with(|| lhs.index.cmp(&rhs.index))
}

/// Earlier deadlines first; orders without a deadline last.
pub(crate) fn compare_deadlines(
    lhs: Option<DateTime<Utc>>,
    rhs: Option<DateTime<Utc>>,
) -> Ordering {
    match (lhs, rhs) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn leg(matrix: &DistanceMatrix, from: usize, to: usize) -> f64 {
    matrix
        .get(from)
        .and_then(|row| row.get(to))
        .copied()
        .unwrap_or_else(|| {
            log::warn!("matrix access failed for leg {from} -> {to}; treating as unreachable");
            debug_assert!(false, "matrix access failed for leg {from} -> {to}");
            f64::INFINITY
        })
}

fn finite_leg(matrix: &DistanceMatrix, from: usize, to: usize) -> Result<f64, DistanceError> {
    let distance = leg(matrix, from, to);
    if distance.is_finite() {
        Ok(distance)
    } else {
        Err(DistanceError::Unreachable { from, to })
    }
}

fn offset(start: DateTime<Utc>, elapsed: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(elapsed)
        .ok()
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests;
