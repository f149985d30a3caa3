//! Fragmentation: how much of a day is chopped into gaps too short for focused work.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{NaiveDate, TimeZone};

use super::occurrence::{Occurrence, minutes_between};

/// Gaps in this range (minutes) fragment the day. Zero and negative gaps (back-to-back
/// or overlapping meetings) and gaps of an hour or more do not.
pub const SHORT_GAP_MINUTES: RangeInclusive<i64> = 1..=59;

/// Mean of the per-day scores over all days with meetings; 0.0 without any.
pub fn fragmentation_score<Tz: TimeZone>(days: &BTreeMap<NaiveDate, Vec<&Occurrence<Tz>>>) -> f64 {
    if days.is_empty() {
        return 0.0;
    }

    let total: f64 = days.values().map(|meetings| day_score(meetings)).sum();
    total / days.len() as f64
}

/// Share of short gaps among all gaps between consecutive meetings (sorted by start).
/// A day with a single meeting has no gaps and scores 0.0.
pub fn day_score<Tz: TimeZone>(meetings: &[&Occurrence<Tz>]) -> f64 {
    let gaps: Vec<i64> = meetings
        .windows(2)
        .map(|pair| minutes_between(&pair[0].end, &pair[1].start))
        .collect();

    if gaps.is_empty() {
        return 0.0;
    }

    let short = gaps.iter().filter(|&&gap| SHORT_GAP_MINUTES.contains(&gap)).count();
    short as f64 / gaps.len() as f64
}
