//! Pluggable judgements: lateness, delay causes and alternative scores.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{AlternativeKpis, StopId};

/// Decide whether an observed time misses an expected one.
pub trait LatenessClassifier: Send + Sync {
    /// How late `observed` is against `expected`, or `None` when on time.
    fn lateness(&self, expected: DateTime<Utc>, observed: DateTime<Utc>) -> Option<TimeDelta>;

    /// Whether `observed` misses `expected`.
    fn is_late(&self, expected: DateTime<Utc>, observed: DateTime<Utc>) -> bool {
        self.lateness(expected, observed).is_some()
    }
}

/// Reduce an alternative's KPIs to one rankable number; lower is better.
pub trait AlternativeScorer: Send + Sync {
    /// Score the KPIs.
    fn score(&self, kpis: &AlternativeKpis) -> f64;
}

/// Why a stop ran late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayCause {
    /// Congestion on the way.
    TrafficJam,
    /// Nobody to receive the delivery.
    CustomerNotAvailable,
    /// Mechanical or vehicle problem.
    VehicleIssue,
    /// Weather conditions.
    Weather,
    /// Address could not be found.
    WrongAddress,
    /// Loading or unloading overran.
    LoadingDelay,
    /// Driver-related delay.
    DriverDelay,
    /// Anything else.
    Other,
}

impl fmt::Display for DelayCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TrafficJam => "Traffic Jam",
            Self::CustomerNotAvailable => "Customer Not Available",
            Self::VehicleIssue => "Vehicle Issue",
            Self::Weather => "Weather",
            Self::WrongAddress => "Wrong Address",
            Self::LoadingDelay => "Loading Delay",
            Self::DriverDelay => "Driver Delay",
            Self::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Planned and recorded timings of one stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopObservation {
    /// Stop observed.
    pub stop_id: StopId,
    /// Planned arrival.
    pub planned_arrival: DateTime<Utc>,
    /// Recorded arrival, if the driver has arrived.
    #[serde(default)]
    pub actual_arrival: Option<DateTime<Utc>>,
    /// Planned departure.
    pub planned_departure: DateTime<Utc>,
    /// Recorded departure, if the driver has left.
    #[serde(default)]
    pub actual_departure: Option<DateTime<Utc>>,
    /// Cause reported by the driver, if any.
    #[serde(default)]
    pub reported_cause: Option<DelayCause>,
}

impl StopObservation {
    /// Planned dwell time.
    #[must_use]
    pub fn planned_dwell(&self) -> TimeDelta {
        self.planned_departure - self.planned_arrival
    }

    /// Recorded dwell time, when both timestamps exist.
    #[must_use]
    pub fn actual_dwell(&self) -> Option<TimeDelta> {
        self.actual_arrival
            .zip(self.actual_departure)
            .map(|(arrival, departure)| departure - arrival)
    }
}

/// Attribute a delay to a cause using recorded facts.
pub trait DelayCauseClassifier: Send + Sync {
    /// Cause of `delay` at the observed stop.
    fn classify(&self, observation: &StopObservation, delay: TimeDelta) -> DelayCause;
}
