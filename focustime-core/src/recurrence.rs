//! RRULE expansion for recurring events.
//!
//! The analysis engine only understands concrete occurrences, so recurring masters are
//! expanded into instances within the requested window before analysis, respecting
//! EXDATEs and instance overrides from disk.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rrule::RRuleSet;

use crate::error::{FocusError, FocusResult};
use crate::event::{Event, EventTime, Recurrence};

/// Upper bound on instances generated for a single master.
const MAX_INSTANCES: u16 = 365;

/// Build an iCalendar-format RRULE string for the rrule crate parser.
fn build_rrule_string(start: &EventTime, recurrence: &Recurrence) -> String {
    let mut lines = vec![format!("DTSTART{}", rrule_time(start))];

    lines.push(format!("RRULE:{}", recurrence.rrule));

    for exdate in &recurrence.exdates {
        lines.push(format!("EXDATE{}", rrule_time(exdate)));
    }

    lines.join("\n")
}

/// Property suffix (params + value) for a DTSTART/EXDATE line.
/// The rrule crate needs a datetime, so all-day dates become midnight UTC.
fn rrule_time(time: &EventTime) -> String {
    match time {
        EventTime::Date(d) => format!(":{}T000000Z", d.format("%Y%m%d")),
        EventTime::DateTimeUtc(dt) => format!(":{}", dt.format("%Y%m%dT%H%M%SZ")),
        EventTime::DateTimeFloating(dt) => format!(":{}Z", dt.format("%Y%m%dT%H%M%S")),
        EventTime::DateTimeZoned { datetime, tzid } => {
            format!(";TZID={}:{}", tzid, datetime.format("%Y%m%dT%H%M%S"))
        }
    }
}

/// Convert an rrule occurrence datetime back to an EventTime matching the master's variant.
fn occurrence_to_event_time(dt: &DateTime<rrule::Tz>, master_start: &EventTime) -> EventTime {
    match master_start {
        EventTime::Date(_) => EventTime::Date(dt.date_naive()),
        EventTime::DateTimeUtc(_) => EventTime::DateTimeUtc(dt.with_timezone(&Utc)),
        EventTime::DateTimeFloating(_) => EventTime::DateTimeFloating(dt.naive_utc()),
        EventTime::DateTimeZoned { tzid, .. } => EventTime::DateTimeZoned {
            datetime: dt.naive_local(),
            tzid: tzid.clone(),
        },
    }
}

/// End of an instance starting at `occ_dt`, keeping the master's duration and EventTime variant.
fn instance_end(master: &Event, occ_dt: &DateTime<rrule::Tz>) -> Option<EventTime> {
    let (start, end) = (master.start.as_ref()?, master.end.as_ref()?);

    if let (EventTime::Date(d_start), EventTime::Date(d_end)) = (start, end) {
        let day_diff = (*d_end - *d_start).num_days();
        return Some(EventTime::Date(occ_dt.date_naive() + Duration::days(day_diff)));
    }

    let duration = match (start.to_zone(&Utc), end.to_zone(&Utc)) {
        (Some(s), Some(e)) => e - s,
        _ => Duration::zero(),
    };

    Some(match start {
        EventTime::DateTimeFloating(_) => EventTime::DateTimeFloating(occ_dt.naive_utc() + duration),
        EventTime::DateTimeZoned { tzid, .. } => EventTime::DateTimeZoned {
            datetime: occ_dt.naive_local() + duration,
            tzid: tzid.clone(),
        },
        _ => EventTime::DateTimeUtc(occ_dt.with_timezone(&Utc) + duration),
    })
}

/// Expand a recurring master event into individual instances within [range_start, range_end].
///
/// - `overrides` maps recurrence-id ICS strings to override Events (instance exceptions from disk).
///   If an override exists for a given occurrence, it replaces the generated instance.
/// - The master event itself is NOT included; only expanded instances with `recurrence_id` set.
pub fn expand_recurring_event(
    master: &Event,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    overrides: &HashMap<String, Event>,
) -> FocusResult<Vec<Event>> {
    let (Some(recurrence), Some(start)) = (&master.recurrence, &master.start) else {
        return Ok(Vec::new());
    };

    let rrule_str = build_rrule_string(start, recurrence);

    let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
        FocusError::Recurrence(format!(
            "Failed to parse RRULE for event '{}': {}",
            master.uid.as_deref().unwrap_or(master.title()),
            e
        ))
    })?;

    // after/before are exclusive; widen by a second to make the range inclusive.
    let tz: rrule::Tz = Utc.into();
    let after = (range_start - Duration::seconds(1)).with_timezone(&tz);
    let before = (range_end + Duration::seconds(1)).with_timezone(&tz);

    let result = rrule_set.after(after).before(before).all(MAX_INSTANCES);

    let events = result
        .dates
        .iter()
        .map(|occ_dt| {
            let occ_event_time = occurrence_to_event_time(occ_dt, start);

            if let Some(override_event) = overrides.get(&occ_event_time.to_ics_string()) {
                return override_event.clone();
            }

            Event {
                start: Some(occ_event_time.clone()),
                end: instance_end(master, occ_dt),
                recurrence: None,
                recurrence_id: Some(occ_event_time),
                ..master.clone()
            }
        })
        .collect();

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn weekly_standup() -> Event {
        Event {
            uid: Some("standup".to_string()),
            summary: Some("Standup".to_string()),
            start: Some(EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap(),
            )),
            end: Some(EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2025, 1, 6, 9, 15, 0).unwrap(),
            )),
            recurrence: Some(Recurrence {
                rrule: "FREQ=WEEKLY;BYDAY=MO".to_string(),
                exdates: vec![EventTime::DateTimeUtc(
                    Utc.with_ymd_and_hms(2025, 1, 13, 9, 0, 0).unwrap(),
                )],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_expand_respects_range_and_exdates() {
        let master = weekly_standup();
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();

        let instances = expand_recurring_event(&master, from, to, &HashMap::new()).unwrap();

        // Mondays in January 2025: 6, 13 (excluded), 20, 27
        assert_eq!(instances.len(), 3);
        assert!(instances.iter().all(|e| e.recurrence.is_none()));
        assert!(instances.iter().all(|e| e.recurrence_id.is_some()));
        assert_eq!(
            instances[1].end,
            Some(EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2025, 1, 20, 9, 15, 0).unwrap()
            )),
            "Instances keep the master's duration"
        );
    }

    #[test]
    fn test_expand_uses_override_for_matching_instance() {
        let master = weekly_standup();
        let moved = Event {
            start: Some(EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2025, 1, 20, 14, 0, 0).unwrap(),
            )),
            end: Some(EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2025, 1, 20, 14, 15, 0).unwrap(),
            )),
            recurrence: None,
            recurrence_id: Some(EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2025, 1, 20, 9, 0, 0).unwrap(),
            )),
            ..weekly_standup()
        };
        let overrides = HashMap::from([(
            moved.recurrence_id.as_ref().unwrap().to_ics_string(),
            moved.clone(),
        )]);

        let from = Utc.with_ymd_and_hms(2025, 1, 19, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 1, 21, 0, 0, 0).unwrap();
        let instances = expand_recurring_event(&master, from, to, &overrides).unwrap();

        assert_eq!(instances, vec![moved]);
    }

    #[test]
    fn test_non_recurring_event_expands_to_nothing() {
        let event = Event {
            recurrence: None,
            ..weekly_standup()
        };
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

        assert!(expand_recurring_event(&event, from, to, &HashMap::new())
            .unwrap()
            .is_empty());
    }
}
