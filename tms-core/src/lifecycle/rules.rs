//! Ordering rule for completing stops.

use crate::{RouteStop, StopId};

use super::TransitionError;

/// Check that `stop_id` may complete given the other stops on its route.
///
/// Every stop with a lower sequence number must already be completed or
/// failed. The earliest open stop is reported.
///
/// # Errors
///
/// Returns [`TransitionError::SequenceViolation`] when an earlier stop is
/// still open, or [`TransitionError::UnknownStop`] when `stop_id` is not in
/// `route_stops`.
pub fn check_sequence(stop_id: StopId, route_stops: &[RouteStop]) -> Result<(), TransitionError> {
    let target = route_stops
        .iter()
        .find(|stop| stop.id == stop_id)
        .ok_or(TransitionError::UnknownStop { stop_id })?;

    let blocking = route_stops
        .iter()
        .filter(|stop| stop.sequence < target.sequence && !stop.status.is_settled())
        .min_by_key(|stop| stop.sequence);

    match blocking {
        Some(open) => Err(TransitionError::SequenceViolation {
            stop_id,
            sequence: target.sequence,
            blocking_stop: open.id,
            blocking_sequence: open.sequence,
        }),
        None => Ok(()),
    }
}
