use chrono::{DateTime, Days, NaiveDate};

use crate::github::WeeklyActivityBucket;

/// One calendar day of commit history, derived from a weekly bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyActivityPoint {
    pub date: NaiveDate,
    pub commits: u64,
}

/// Flattens weekly buckets into a chronological per-day series. Malformed
/// buckets (no week marker, day list absent or not exactly seven entries,
/// marker outside the calendar) contribute nothing and are dropped silently.
pub fn daily_series(buckets: &[WeeklyActivityBucket]) -> Vec<DailyActivityPoint> {
    buckets
        .iter()
        .filter_map(first_day_and_counts)
        .flat_map(|(first_day, days)| {
            days.iter()
                .copied()
                .enumerate()
                .filter_map(move |(offset, commits)| {
                    let date = first_day.checked_add_days(Days::new(offset as u64))?;
                    Some(DailyActivityPoint { date, commits })
                })
        })
        .collect()
}

// The week marker anchors the *end* of the Sunday-first day list, so day
// index `i` falls on `week_start - (6 - i)` days.
fn first_day_and_counts(bucket: &WeeklyActivityBucket) -> Option<(NaiveDate, &[u64])> {
    let days = bucket.days.as_deref()?;
    if days.len() != 7 {
        return None;
    }
    let week_start = DateTime::from_timestamp(bucket.week?, 0)?.date_naive();
    let first_day = week_start.checked_sub_days(Days::new(6))?;
    Some((first_day, days))
}
