//! Provider-neutral event types.
//!
//! These are the raw events handed to the analysis engine. Any field may be missing:
//! the engine decides what it can use (see `analysis::occurrence`).

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event as loaded from a calendar source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Identity key (UID); matched exactly against the never-move list
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,

    // Recurrence fields
    /// RRULE + EXDATEs for master events
    pub recurrence: Option<Recurrence>,
    /// Original start time for an expanded or overridden instance (RECURRENCE-ID)
    pub recurrence_id: Option<EventTime>,

    // Meeting Data
    /// Event organizer
    pub organizer: Option<Attendee>,
    /// Event attendees (the organizer is not included)
    pub attendees: Vec<Attendee>,
}

impl Event {
    /// Title for display, falling back to "Untitled".
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or("Untitled")
    }

    /// Whether the event has a timed (non all-day) start.
    pub fn is_timed(&self) -> bool {
        self.start.as_ref().is_some_and(EventTime::is_timed)
    }
}

/// An event attendee (also used for organizer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    /// Display name
    pub name: Option<String>,
    /// Email address
    pub email: String,
}

/// Recurrence rule of a master event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    /// RRULE value, e.g. "FREQ=WEEKLY;BYDAY=MO"
    pub rrule: String,
    pub exdates: Vec<EventTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    /// All-day date
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    /// Wall-clock time without a zone, read in whatever zone the caller analyzes in
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned {
        datetime: NaiveDateTime,
        tzid: String,
    },
}

impl EventTime {
    pub fn is_timed(&self) -> bool {
        !matches!(self, EventTime::Date(_))
    }

    /// Convert a timed value to an instant in `zone`. All-day dates have no instant.
    pub fn to_zone<Tz: TimeZone>(&self, zone: &Tz) -> Option<DateTime<Tz>> {
        match self {
            EventTime::Date(_) => None,
            EventTime::DateTimeUtc(dt) => Some(dt.with_timezone(zone)),
            EventTime::DateTimeFloating(naive) => localize(zone, *naive),
            EventTime::DateTimeZoned { datetime, tzid } => match tzid.parse::<chrono_tz::Tz>() {
                Ok(tz) => localize(&tz, *datetime).map(|dt| dt.with_timezone(zone)),
                Err(_) => {
                    log::warn!("Unknown TZID '{}', reading {} as local time", tzid, datetime);
                    localize(zone, *datetime)
                }
            },
        }
    }

    /// Calendar date of this value as seen in `zone` (all-day dates are returned as-is).
    pub fn date_in<Tz: TimeZone>(&self, zone: &Tz) -> Option<NaiveDate> {
        match self {
            EventTime::Date(d) => Some(*d),
            other => other.to_zone(zone).map(|dt| dt.date_naive()),
        }
    }

    /// ICS-style key, used to match RECURRENCE-ID overrides against expanded instances.
    pub fn to_ics_string(&self) -> String {
        match self {
            EventTime::Date(d) => d.format("%Y%m%d").to_string(),
            EventTime::DateTimeUtc(dt) => dt.format("%Y%m%dT%H%M%SZ").to_string(),
            EventTime::DateTimeFloating(dt) => dt.format("%Y%m%dT%H%M%S").to_string(),
            EventTime::DateTimeZoned { datetime, tzid } => {
                format!("TZID={}:{}", tzid, datetime.format("%Y%m%dT%H%M%S"))
            }
        }
    }
}

/// Attach `zone` to a wall-clock time.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times inside a gap
/// (clocks going forward) are shifted forward by an hour.
pub fn localize<Tz: TimeZone>(zone: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => zone
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    #[test]
    fn test_all_day_has_no_instant() {
        let date = EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 20).unwrap());
        assert!(date.to_zone(&Utc).is_none());
        assert!(!date.is_timed());
    }

    #[test]
    fn test_zoned_time_converts_to_analysis_zone() {
        let time = EventTime::DateTimeZoned {
            datetime: naive("2025-01-15T10:00"),
            tzid: "America/New_York".to_string(),
        };

        let utc = time.to_zone(&Utc).expect("timed");
        assert_eq!(utc.hour(), 15);
    }

    #[test]
    fn test_floating_time_is_read_in_analysis_zone() {
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let time = EventTime::DateTimeFloating(naive("2025-01-15T10:00"));

        let dt = time.to_zone(&zone).expect("timed");
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.with_timezone(&Utc).hour(), 8);
    }

    #[test]
    fn test_unknown_tzid_falls_back_to_floating() {
        let time = EventTime::DateTimeZoned {
            datetime: naive("2025-01-15T10:00"),
            tzid: "Mars/Olympus_Mons".to_string(),
        };

        assert_eq!(time.to_zone(&Utc).map(|dt| dt.hour()), Some(10));
    }

    #[test]
    fn test_localize_skips_forward_over_dst_gap() {
        let berlin = chrono_tz::Europe::Berlin;
        // 02:30 does not exist on 2025-03-30 in Berlin
        let dt = localize(&berlin, naive("2025-03-30T02:30")).expect("resolved");
        assert_eq!(dt.hour(), 3);
        assert_eq!(dt.minute(), 30);
    }
}
