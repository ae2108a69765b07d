use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Day-of-week key used throughout the planning tables.
///
/// Stored lowercase in the database (`"monday"` .. `"sunday"`) and
/// serialized the same way over the wire, matching the keys the board
/// clients send.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    ToSchema,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Monday-first ordering, the order board rows render in.
pub const WEEK: [DayOfWeek; 7] = [
    DayOfWeek::Monday,
    DayOfWeek::Tuesday,
    DayOfWeek::Wednesday,
    DayOfWeek::Thursday,
    DayOfWeek::Friday,
    DayOfWeek::Saturday,
    DayOfWeek::Sunday,
];

impl DayOfWeek {
    /// Offset from Monday in days (0..=6).
    pub fn offset(self) -> i64 {
        match self {
            DayOfWeek::Monday => 0,
            DayOfWeek::Tuesday => 1,
            DayOfWeek::Wednesday => 2,
            DayOfWeek::Thursday => 3,
            DayOfWeek::Friday => 4,
            DayOfWeek::Saturday => 5,
            DayOfWeek::Sunday => 6,
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_weekday(date.weekday())
    }

    /// Parses the lowercase/any-case names the clients send.
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }
}

/// Monday of the week being planned: the Monday of `today`'s week,
/// shifted forward seven days when the boards are set to plan ahead.
pub fn week_start(today: NaiveDate, plan_next_week: bool) -> NaiveDate {
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    if plan_next_week {
        monday + Duration::days(7)
    } else {
        monday
    }
}

/// Calendar date a weekday falls on inside the planned week.
pub fn date_in_week(week_start: NaiveDate, day: DayOfWeek) -> NaiveDate {
    week_start + Duration::days(day.offset())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_start_is_monday_of_current_week() {
        // 2025-06-18 is a Wednesday.
        assert_eq!(week_start(date(2025, 6, 18), false), date(2025, 6, 16));
        // A Monday maps to itself.
        assert_eq!(week_start(date(2025, 6, 16), false), date(2025, 6, 16));
        // Sunday still belongs to the week that began the previous Monday.
        assert_eq!(week_start(date(2025, 6, 22), false), date(2025, 6, 16));
    }

    #[test]
    fn planning_next_week_shifts_forward_seven_days() {
        assert_eq!(week_start(date(2025, 6, 18), true), date(2025, 6, 23));
    }

    #[test]
    fn dates_fall_in_order_across_the_week() {
        let monday = date(2025, 6, 16);
        assert_eq!(date_in_week(monday, DayOfWeek::Monday), date(2025, 6, 16));
        assert_eq!(date_in_week(monday, DayOfWeek::Thursday), date(2025, 6, 19));
        assert_eq!(date_in_week(monday, DayOfWeek::Sunday), date(2025, 6, 22));
    }

    #[test]
    fn parses_case_insensitive_day_names() {
        assert_eq!(DayOfWeek::parse("monday"), Some(DayOfWeek::Monday));
        assert_eq!(DayOfWeek::parse("  Friday "), Some(DayOfWeek::Friday));
        assert_eq!(DayOfWeek::parse("SUNDAY"), Some(DayOfWeek::Sunday));
        assert_eq!(DayOfWeek::parse("someday"), None);
    }

    #[test]
    fn renders_lowercase() {
        assert_eq!(DayOfWeek::Wednesday.to_string(), "wednesday");
        let json = serde_json::to_string(&DayOfWeek::Saturday).unwrap();
        assert_eq!(json, "\"saturday\"");
    }
}
