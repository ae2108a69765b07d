//! Closure windows: date ranges the store is not operating.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unit a closure duration is expressed in.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    #[strum(serialize = "day", to_string = "days")]
    Days,
    #[strum(serialize = "week", to_string = "weeks")]
    Weeks,
}

/// Exclusive end of a closure window starting at `start`.
///
/// The window is half-open: a one-day closure covers only its start
/// date, a one-week closure covers seven dates.
pub fn window_end(start: NaiveDate, value: i32, unit: DurationUnit) -> NaiveDate {
    let days = match unit {
        DurationUnit::Days => i64::from(value),
        DurationUnit::Weeks => i64::from(value) * 7,
    };
    start + Duration::days(days.max(0))
}

/// A resolved closure window the engine checks dates against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClosureWindow {
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
    pub reason: String,
}

impl ClosureWindow {
    pub fn new(start: NaiveDate, value: i32, unit: DurationUnit, reason: impl Into<String>) -> Self {
        Self {
            start,
            end: window_end(start, value, unit),
            reason: reason.into(),
        }
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// First window covering `date`, earliest start wins when several overlap.
pub fn first_covering(windows: &[ClosureWindow], date: NaiveDate) -> Option<&ClosureWindow> {
    windows
        .iter()
        .filter(|w| w.covers(date))
        .min_by_key(|w| w.start)
}
