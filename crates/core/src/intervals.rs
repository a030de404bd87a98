//! Calendar interval generation.
//!
//! All intervals run Sunday through Saturday. A "monthly" interval is four
//! consecutive weekly intervals, not a calendar month. Generation is a pure
//! function of `(anchor, today)` so two calls within the same calendar week
//! always agree, regardless of time of day.

use chrono::{Datelike, Duration, NaiveDate};

/// Weeks per monthly grouping.
pub const WEEKS_PER_MONTH: usize = 4;

/// A closed calendar interval. `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Interval {
    /// Row key identity: the start date as `YYYY-MM-DD`.
    pub fn key(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_key(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    /// Human label for digest headings.
    pub fn label(&self) -> String {
        format!("{} to {}", self.key(), self.end_key())
    }
}

/// Snap a date forward to the next Sunday (identity if already a Sunday).
fn snap_to_sunday(date: NaiveDate) -> NaiveDate {
    let days_past = date.weekday().num_days_from_sunday() as i64;
    if days_past == 0 {
        date
    } else {
        date + Duration::days(7 - days_past)
    }
}

/// Start of the latest fully-elapsed week relative to `today`.
///
/// The current week's Sunday is `today - days_from_sunday(today)`; the latest
/// complete week ends the day before that Sunday and starts 7 days before it.
pub fn latest_complete_week_start(today: NaiveDate) -> NaiveDate {
    let current_week_sunday = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
    current_week_sunday - Duration::days(7)
}

/// Weekly Sunday..Saturday intervals from `anchor` (snapped forward to a
/// Sunday) up to and including the latest complete week before `today`.
pub fn weekly_intervals(anchor: NaiveDate, today: NaiveDate) -> Vec<Interval> {
    let latest_start = latest_complete_week_start(today);
    let mut intervals = Vec::new();
    let mut start = snap_to_sunday(anchor);
    while start <= latest_start {
        intervals.push(Interval {
            start,
            end: start + Duration::days(6),
        });
        start += Duration::days(7);
    }
    intervals
}

/// Groups weekly intervals into runs of four, spanning the first week's start
/// to the fourth week's end. A trailing run of fewer than four weeks is
/// dropped.
pub fn monthly_intervals(anchor: NaiveDate, today: NaiveDate) -> Vec<Interval> {
    weekly_intervals(anchor, today)
        .chunks_exact(WEEKS_PER_MONTH)
        .map(|weeks| Interval {
            start: weeks[0].start,
            end: weeks[WEEKS_PER_MONTH - 1].end,
        })
        .collect()
}
