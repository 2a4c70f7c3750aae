//! Customer receiving windows.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::TransitionError;

/// A daily window during which a customer accepts deliveries.
///
/// Windows are written as `"HH:MM"` pairs. When `end` precedes `start` the
/// window wraps past midnight.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use tms_core::TimeWindow;
///
/// let window = TimeWindow::parse("09:00", "17:30")?;
/// assert!(window.contains(NaiveTime::from_hms_opt(12, 0, 0).expect("valid time")));
/// assert!(window.check(NaiveTime::from_hms_opt(18, 0, 0).expect("valid time")).is_err());
/// # Ok::<(), chrono::ParseError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Opening time.
    #[serde(with = "hh_mm")]
    pub start: NaiveTime,
    /// Closing time, inclusive.
    #[serde(with = "hh_mm")]
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Construct a window.
    #[must_use]
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parse a window from `"HH:MM"` strings.
    ///
    /// # Errors
    ///
    /// Returns the `chrono` parse error for malformed input.
    pub fn parse(start: &str, end: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self {
            start: hh_mm::parse(start)?,
            end: hh_mm::parse(end)?,
        })
    }

    /// Whether `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= at && at <= self.end
        } else {
            at >= self.start || at <= self.end
        }
    }

    /// Report deliveries outside the window without adjusting them.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::TimeWindowViolation`] when `at` lies
    /// outside the window.
    pub fn check(&self, at: NaiveTime) -> Result<(), TransitionError> {
        if self.contains(at) {
            Ok(())
        } else {
            Err(TransitionError::TimeWindowViolation {
                at,
                start: self.start,
                end: self.end,
            })
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format(hh_mm::FORMAT),
            self.end.format(hh_mm::FORMAT)
        )
    }
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub(super) const FORMAT: &str = "%H:%M";

    pub(super) fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        let trimmed = raw.trim();
        NaiveTime::parse_from_str(trimmed, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
    }

    pub(super) fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }
}
