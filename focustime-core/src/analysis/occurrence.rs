//! Normalized, timed meeting occurrences and per-day grouping.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::event::Event;

/// A single concrete, timed calendar entry in the analysis zone.
///
/// `start < end` is assumed but not checked; inverted entries yield negative durations.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence<Tz: TimeZone> {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    /// Declared attendees, not counting the organizer
    pub attendee_count: usize,
}

impl<Tz: TimeZone> Occurrence<Tz> {
    /// Build an occurrence from a raw event. Events without a timed start and end
    /// (all-day or malformed) have no occurrence.
    pub fn from_event(event: &Event, zone: &Tz) -> Option<Self> {
        let start = event.start.as_ref()?.to_zone(zone)?;
        let end = event.end.as_ref()?.to_zone(zone)?;

        Some(Occurrence {
            uid: event.uid.clone(),
            summary: event.summary.clone(),
            location: event.location.clone(),
            description: event.description.clone(),
            start,
            end,
            attendee_count: event.attendees.len(),
        })
    }

    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or("Untitled")
    }

    /// Whole minutes between start and end, truncated.
    pub fn duration_minutes(&self) -> i64 {
        minutes_between(&self.start, &self.end)
    }

    /// Everyone in the meeting: declared attendees plus the organizer.
    pub fn participant_count(&self) -> usize {
        self.attendee_count + 1
    }

    /// Local calendar date the occurrence is attributed to (its start date).
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }
}

/// Keep the events that have a timed start and end, in input order.
pub fn normalize<Tz: TimeZone>(events: &[Event], zone: &Tz) -> Vec<Occurrence<Tz>> {
    events
        .iter()
        .filter_map(|event| Occurrence::from_event(event, zone))
        .collect()
}

/// Group occurrences by start date, dates ascending, each day sorted by start.
///
/// The sort is stable, so occurrences starting at the same instant keep input order.
pub fn group_by_day<Tz: TimeZone>(
    occurrences: &[Occurrence<Tz>],
) -> BTreeMap<NaiveDate, Vec<&Occurrence<Tz>>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Occurrence<Tz>>> = BTreeMap::new();

    for occurrence in occurrences {
        days.entry(occurrence.date()).or_default().push(occurrence);
    }

    for day in days.values_mut() {
        day.sort_by(|a, b| a.start.cmp(&b.start));
    }

    days
}

/// Signed whole minutes from `from` to `to`, truncated toward zero.
pub fn minutes_between<Tz: TimeZone>(from: &DateTime<Tz>, to: &DateTime<Tz>) -> i64 {
    to.clone().signed_duration_since(from.clone()).num_minutes()
}
