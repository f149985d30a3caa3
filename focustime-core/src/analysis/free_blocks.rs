//! Longest free intervals within working hours.
//!
//! Only days with at least one occurrence are considered: an empty day yields no block.
//! Overlapping meetings are not merged, they simply produce non-positive gaps which are
//! dropped.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};

use super::occurrence::{Occurrence, minutes_between};
use crate::event::localize;

/// Maximum number of free blocks reported.
pub const MAX_FREE_BLOCKS: usize = 10;

/// A contiguous free span on one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeBlock<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub duration_minutes: i64,
}

impl<Tz: TimeZone> FreeBlock<Tz> {
    /// Block from `start` to `end`, if it lasts at least a whole minute.
    fn between(start: &DateTime<Tz>, end: &DateTime<Tz>) -> Option<Self> {
        let duration_minutes = minutes_between(start, end);
        (duration_minutes > 0).then(|| FreeBlock {
            start: start.clone(),
            end: end.clone(),
            duration_minutes,
        })
    }
}

/// `date` at `hour`:00 in `zone`. Hour 24 is midnight of the following day.
pub fn at_hour<Tz: TimeZone>(zone: &Tz, date: NaiveDate, hour: u32) -> Option<DateTime<Tz>> {
    localize(zone, date.and_time(NaiveTime::MIN) + Duration::hours(hour.into()))
}

/// Free blocks of every day, longest first, at most `MAX_FREE_BLOCKS`.
///
/// Equal durations keep the order they were found in: days ascending, then the
/// start-of-day gap, the gaps between meetings, and the end-of-day gap.
pub fn longest_free_blocks<Tz: TimeZone>(
    days: &BTreeMap<NaiveDate, Vec<&Occurrence<Tz>>>,
    zone: &Tz,
    work_day_start: u32,
    work_day_end: u32,
) -> Vec<FreeBlock<Tz>> {
    let mut blocks: Vec<FreeBlock<Tz>> = days
        .iter()
        .flat_map(|(date, meetings)| {
            day_free_blocks(*date, meetings, zone, work_day_start, work_day_end)
        })
        .collect();

    blocks.sort_by(|a, b| b.duration_minutes.cmp(&a.duration_minutes));
    blocks.truncate(MAX_FREE_BLOCKS);
    blocks
}

/// Gaps of a single day. `meetings` must be sorted by start.
fn day_free_blocks<Tz: TimeZone>(
    date: NaiveDate,
    meetings: &[&Occurrence<Tz>],
    zone: &Tz,
    work_day_start: u32,
    work_day_end: u32,
) -> Vec<FreeBlock<Tz>> {
    let (Some(first), Some(last)) = (meetings.first(), meetings.last()) else {
        return Vec::new();
    };

    let mut blocks = Vec::new();

    if let Some(work_start) = at_hour(zone, date, work_day_start) {
        if first.start > work_start {
            blocks.extend(FreeBlock::between(&work_start, &first.start));
        }
    }

    blocks.extend(
        meetings
            .windows(2)
            .filter_map(|pair| FreeBlock::between(&pair[0].end, &pair[1].start)),
    );

    // The day closes after the meeting that starts last, even if an earlier one ends later.
    if let Some(work_end) = at_hour(zone, date, work_day_end) {
        if last.end < work_end {
            blocks.extend(FreeBlock::between(&last.end, &work_end));
        }
    }

    blocks
}
