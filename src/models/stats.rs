// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Derived workout statistics for dashboard and history views.
//!
//! Everything here is a pure function over dated records. Calendar days
//! are UTC days.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::ProgressEntry;

/// Length of the "this week" window.
pub const WEEK_WINDOW_DAYS: i64 = 7;
/// Length of the "this month" window.
pub const MONTH_WINDOW_DAYS: i64 = 30;

/// Count of consecutive days with activity, ending today.
///
/// Dates may arrive in any order and several sessions may share a day;
/// both are normalized before counting. Position `i` of the descending
/// list of distinct days must be exactly `i` days before `today`, so a
/// list whose newest day is yesterday yields 0.
pub fn current_streak(dates: &[DateTime<Utc>], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = dates.iter().map(|d| d.date_naive()).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let mut streak = 0u32;
    for day in days {
        let diff = (today - day).num_days();
        if diff == i64::from(streak) {
            streak += 1;
        } else if diff < 0 {
            // Scheduled sessions in the future don't count and don't break it.
            continue;
        } else {
            break;
        }
    }
    streak
}

/// Session counts over rolling windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WindowCounts {
    pub total: u32,
    pub this_week: u32,
    pub this_month: u32,
}

/// Number of dates at or after `boundary`.
pub fn count_since(dates: &[DateTime<Utc>], boundary: DateTime<Utc>) -> u32 {
    dates.iter().filter(|d| **d >= boundary).count() as u32
}

/// Totals plus counts for the last 7 and 30 days relative to `now`.
pub fn window_counts(dates: &[DateTime<Utc>], now: DateTime<Utc>) -> WindowCounts {
    WindowCounts {
        total: dates.len() as u32,
        this_week: count_since(dates, now - Duration::days(WEEK_WINDOW_DAYS)),
        this_month: count_since(dates, now - Duration::days(MONTH_WINDOW_DAYS)),
    }
}

/// A single point of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SeriesPoint {
    /// `YYYY-MM-DD`
    pub date: String,
    pub value: f64,
}

/// Sessions per day for the seven days ending `today`, oldest first.
pub fn weekly_frequency(dates: &[DateTime<Utc>], today: NaiveDate) -> Vec<SeriesPoint> {
    (0..WEEK_WINDOW_DAYS)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(offset);
            let count = dates.iter().filter(|d| d.date_naive() == day).count();
            SeriesPoint {
                date: day.format("%Y-%m-%d").to_string(),
                value: count as f64,
            }
        })
        .collect()
}

/// Weight series from newest-first progress entries, returned oldest
/// first. Entries without a weight are skipped.
pub fn weight_trend(entries: &[ProgressEntry]) -> Vec<SeriesPoint> {
    entries
        .iter()
        .rev()
        .filter_map(|e| {
            e.weight_kg.map(|w| SeriesPoint {
                date: e.date.format("%Y-%m-%d").to_string(),
                value: w,
            })
        })
        .collect()
}
