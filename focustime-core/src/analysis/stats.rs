//! Duration statistics and per-day meeting counts.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};

use super::occurrence::Occurrence;

/// Arithmetic mean of the durations; 0.0 when there are none.
pub fn mean(durations: &[i64]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().map(|&d| d as f64).sum::<f64>() / durations.len() as f64
}

/// Median of the durations; 0 when there are none.
///
/// With an even count the two middle values are averaged with floor division,
/// so [10, 21, 30, 40] has median 25.
pub fn median(durations: &[i64]) -> i64 {
    let mut sorted = durations.to_vec();
    sorted.sort_unstable();

    let n = sorted.len();
    match n {
        0 => 0,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]).div_euclid(2),
    }
}

/// Number of occurrences per start date. Dates without occurrences are absent.
pub fn meetings_per_day<Tz: TimeZone>(occurrences: &[Occurrence<Tz>]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for occurrence in occurrences {
        *counts.entry(occurrence.date()).or_insert(0) += 1;
    }
    counts
}
