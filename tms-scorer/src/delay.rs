//! Delay attribution and summary reporting over observed stops.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use tms_core::{DelayCause, DelayCauseClassifier, LatenessClassifier, StopId, StopObservation};

use crate::{DeadlineLatenessClassifier, ScoringConfigError};

/// Attributes delays from recorded facts.
///
/// A cause reported by the driver wins. Otherwise a dwell time that
/// overran its plan by more than the tolerance points at loading, and any
/// remaining late arrival is put down to traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdDelayCauseClassifier {
    dwell_tolerance: TimeDelta,
}

impl ThresholdDelayCauseClassifier {
    /// Classifier with the given dwell overrun tolerance.
    ///
    /// # Errors
    /// Returns [`ScoringConfigError::NegativeTolerance`] for a negative
    /// tolerance.
    pub fn new(dwell_tolerance: TimeDelta) -> Result<Self, ScoringConfigError> {
        if dwell_tolerance < TimeDelta::zero() {
            return Err(ScoringConfigError::NegativeTolerance {
                name: "dwell tolerance",
            });
        }
        Ok(Self { dwell_tolerance })
    }
}

impl Default for ThresholdDelayCauseClassifier {
    fn default() -> Self {
        Self {
            dwell_tolerance: TimeDelta::minutes(5),
        }
    }
}

impl DelayCauseClassifier for ThresholdDelayCauseClassifier {
    fn classify(&self, observation: &StopObservation, delay: TimeDelta) -> DelayCause {
        if let Some(cause) = observation.reported_cause {
            return cause;
        }
        let dwell_overrun = observation
            .actual_dwell()
            .map(|actual| actual - observation.planned_dwell());
        if dwell_overrun.is_some_and(|overrun| overrun > self.dwell_tolerance) {
            return DelayCause::LoadingDelay;
        }
        let arrived_late = observation
            .actual_arrival
            .is_some_and(|arrival| arrival > observation.planned_arrival);
        if arrived_late || delay > TimeDelta::zero() {
            DelayCause::TrafficJam
        } else {
            DelayCause::Other
        }
    }
}

/// One late stop in a [`DelayReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LateStop {
    /// Stop that ran late.
    pub stop_id: StopId,
    /// How late it departed, or arrived when no departure is recorded.
    pub delay: TimeDelta,
    /// Attributed cause.
    pub cause: DelayCause,
}

/// Aggregate delay attributed to one cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CauseBreakdown {
    /// Number of late stops with this cause.
    pub count: usize,
    /// Sum of their delays.
    pub total_delay: TimeDelta,
}

impl CauseBreakdown {
    /// Mean delay of stops with this cause.
    #[must_use]
    pub fn mean_delay(&self) -> Option<TimeDelta> {
        mean(self.total_delay, self.count)
    }
}

/// Summary of delays across a set of observed stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayReport {
    /// Stops with a recorded arrival.
    pub observed: usize,
    /// Stops without a recorded arrival, excluded from every other figure.
    pub unobserved: usize,
    /// Observed stops judged on time.
    pub on_time: usize,
    /// Late stops in input order.
    pub late: Vec<LateStop>,
    /// Sum of all delays.
    pub total_delay: TimeDelta,
    /// Late stops grouped by cause.
    pub by_cause: BTreeMap<DelayCause, CauseBreakdown>,
}

impl DelayReport {
    /// Number of late stops.
    #[must_use]
    pub fn late_count(&self) -> usize {
        self.late.len()
    }

    /// Mean delay across late stops.
    #[must_use]
    pub fn mean_delay(&self) -> Option<TimeDelta> {
        mean(self.total_delay, self.late.len())
    }

    /// The cause with the most late stops; ties go to the larger total
    /// delay, then to declaration order.
    #[must_use]
    pub fn dominant_cause(&self) -> Option<DelayCause> {
        self.by_cause
            .iter()
            .max_by(|(lhs_cause, lhs), (rhs_cause, rhs)| {
                lhs.count
                    .cmp(&rhs.count)
                    .then_with(|| lhs.total_delay.cmp(&rhs.total_delay))
                    .then_with(|| rhs_cause.cmp(lhs_cause))
            })
            .map(|(cause, _)| *cause)
    }
}

/// Compares recorded stop timings against plan and attributes the delays.
#[derive(Debug, Clone, Default)]
pub struct DelayAnalyzer<L = DeadlineLatenessClassifier, C = ThresholdDelayCauseClassifier> {
    lateness: L,
    causes: C,
}

impl<L, C> DelayAnalyzer<L, C>
where
    L: LatenessClassifier,
    C: DelayCauseClassifier,
{
    /// Analyzer using the given classifiers.
    pub const fn new(lateness: L, causes: C) -> Self {
        Self { lateness, causes }
    }

    /// Summarise `observations`.
    ///
    /// Departure lateness is judged when a departure is recorded, since it
    /// includes any dwell overrun; otherwise arrival lateness is used.
    #[must_use]
    pub fn analyze(&self, observations: &[StopObservation]) -> DelayReport {
        let mut report = DelayReport {
            observed: 0,
            unobserved: 0,
            on_time: 0,
            late: Vec::new(),
            total_delay: TimeDelta::zero(),
            by_cause: BTreeMap::new(),
        };
        for observation in observations {
            let Some(arrival) = observation.actual_arrival else {
                report.unobserved += 1;
                continue;
            };
            report.observed += 1;
            let lateness = match observation.actual_departure {
                Some(departure) => self
                    .lateness
                    .lateness(observation.planned_departure, departure),
                None => self.lateness.lateness(observation.planned_arrival, arrival),
            };
            let Some(delay) = lateness else {
                report.on_time += 1;
                continue;
            };
            let cause = self.causes.classify(observation, delay);
            log::debug!("stop {} late by {delay} ({cause})", observation.stop_id);
            report.total_delay += delay;
            let entry = report.by_cause.entry(cause).or_insert(CauseBreakdown {
                count: 0,
                total_delay: TimeDelta::zero(),
            });
            entry.count += 1;
            entry.total_delay += delay;
            report.late.push(LateStop {
                stop_id: observation.stop_id,
                delay,
                cause,
            });
        }
        report
    }
}

fn mean(total: TimeDelta, count: usize) -> Option<TimeDelta> {
    let divisor = i32::try_from(count).ok().filter(|value| *value > 0)?;
    total.checked_div(divisor)
}
