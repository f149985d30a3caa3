//! VEVENT to `Event` conversion on top of the icalendar crate's parser.

use chrono::{NaiveDate, NaiveDateTime};
use icalendar::parser::{Component, Property, read_calendar, unfold};
use icalendar::{CalendarDateTime, DatePerhapsTime};

use crate::event::{Attendee, Event, EventTime, Recurrence};

const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";

/// Parse the first VEVENT of an ICS document
pub fn parse_event(content: &str) -> Option<Event> {
    parse_events(content).into_iter().next()
}

/// Parse every VEVENT of an ICS document. Unreadable documents yield no events.
pub fn parse_events(content: &str) -> Vec<Event> {
    let unfolded = unfold(content);
    match read_calendar(&unfolded) {
        Ok(calendar) => calendar
            .components
            .iter()
            .filter(|c| c.name == "VEVENT")
            .map(|c| VEvent(c).into_event())
            .collect(),
        Err(e) => {
            log::debug!("Not a readable calendar: {}", e);
            Vec::new()
        }
    }
}

/// Property lookups on a single VEVENT component.
struct VEvent<'a>(&'a Component<'a>);

impl<'a> VEvent<'a> {
    fn all(&self, name: &'a str) -> impl Iterator<Item = &'a Property<'a>> {
        self.0.properties.iter().filter(move |p| p.name == name)
    }

    fn text(&self, name: &str) -> Option<String> {
        self.0
            .find_prop(name)
            .map(|p| p.val.to_string())
            .filter(|s| !s.is_empty())
    }

    fn time(&self, name: &str) -> Option<EventTime> {
        let prop = self.0.find_prop(name)?;
        DatePerhapsTime::try_from(prop).ok().map(|value| match value {
            DatePerhapsTime::Date(d) => EventTime::Date(d),
            DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => EventTime::DateTimeUtc(dt),
            DatePerhapsTime::DateTime(CalendarDateTime::Floating(dt)) => {
                EventTime::DateTimeFloating(dt)
            }
            DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
                EventTime::DateTimeZoned {
                    datetime: date_time,
                    tzid,
                }
            }
        })
    }

    fn into_event(self) -> Event {
        let recurrence = self.text("RRULE").map(|rrule| Recurrence {
            rrule,
            exdates: self.all("EXDATE").flat_map(exdates).collect(),
        });

        Event {
            uid: self.text("UID"),
            summary: self.text("SUMMARY"),
            description: self.text("DESCRIPTION"),
            location: self.text("LOCATION"),
            start: self.time("DTSTART"),
            end: self.time("DTEND"),
            recurrence,
            recurrence_id: self.time("RECURRENCE-ID"),
            organizer: self.0.find_prop("ORGANIZER").map(attendee),
            attendees: self.all("ATTENDEE").map(attendee).collect(),
        }
    }
}

fn param<'p>(prop: &'p Property, key: &str) -> Option<&'p str> {
    prop.params
        .iter()
        .find(|p| p.key == key)
        .and_then(|p| p.val.as_ref())
        .map(|v| v.as_ref())
}

/// EXDATE values, which may be a comma-separated list sharing one TZID or VALUE=DATE.
fn exdates(prop: &Property) -> Vec<EventTime> {
    let tzid = param(prop, "TZID");
    let all_day = param(prop, "VALUE") == Some("DATE");

    prop.val
        .as_ref()
        .split(',')
        .map(str::trim)
        .filter_map(|value| {
            if all_day {
                return NaiveDate::parse_from_str(value, DATE_FORMAT)
                    .ok()
                    .map(EventTime::Date);
            }
            let (value, utc) = match value.strip_suffix('Z') {
                Some(v) => (v, true),
                None => (value, false),
            };
            let datetime = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).ok()?;
            Some(match (utc, tzid) {
                (true, _) => EventTime::DateTimeUtc(datetime.and_utc()),
                (false, Some(tzid)) => EventTime::DateTimeZoned {
                    datetime,
                    tzid: tzid.to_string(),
                },
                (false, None) => EventTime::DateTimeFloating(datetime),
            })
        })
        .collect()
}

/// ATTENDEE or ORGANIZER
fn attendee(prop: &Property) -> Attendee {
    let value: &str = prop.val.as_ref();
    Attendee {
        name: param(prop, "CN").map(String::from),
        email: value.strip_prefix("mailto:").unwrap_or(value).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn calendar(vevents: &str) -> String {
        format!("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\n{vevents}END:VCALENDAR\r\n")
    }

    #[test]
    fn test_parse_timed_event_with_attendees() {
        let ics = calendar(
            "BEGIN:VEVENT\r\n\
UID:team-sync-1\r\n\
SUMMARY:Team Sync\r\n\
DTSTART:20250320T150000Z\r\n\
DTEND:20250320T160000Z\r\n\
LOCATION:Room 4\r\n\
ORGANIZER;CN=Alice:mailto:alice@example.com\r\n\
ATTENDEE;CN=Bob:mailto:bob@example.com\r\n\
ATTENDEE:mailto:carol@example.com\r\n\
END:VEVENT\r\n",
        );

        let event = parse_event(&ics).unwrap();

        assert_eq!(event.uid.as_deref(), Some("team-sync-1"));
        assert_eq!(event.title(), "Team Sync");
        assert_eq!(event.location.as_deref(), Some("Room 4"));
        assert_eq!(
            event.start,
            Some(EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap()
            ))
        );
        assert_eq!(event.attendees.len(), 2);
        assert_eq!(event.attendees[0].name.as_deref(), Some("Bob"));
        assert_eq!(event.attendees[1].email, "carol@example.com");
        assert_eq!(event.organizer.and_then(|o| o.name).as_deref(), Some("Alice"));
    }

    #[test]
    fn test_parse_zoned_and_all_day_times() {
        let ics = calendar(
            "BEGIN:VEVENT\r\n\
UID:review\r\n\
DTSTART;TZID=Europe/Berlin:20250320T100000\r\n\
DTEND;TZID=Europe/Berlin:20250320T110000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:holiday\r\n\
DTSTART;VALUE=DATE:20250321\r\n\
END:VEVENT\r\n",
        );

        let events = parse_events(&ics);

        assert_eq!(events.len(), 2);
        match &events[0].start {
            Some(EventTime::DateTimeZoned { tzid, datetime }) => {
                assert_eq!(tzid, "Europe/Berlin");
                assert_eq!(datetime.to_string(), "2025-03-20 10:00:00");
            }
            other => panic!("expected a zoned start, got {:?}", other),
        }
        assert_eq!(events[0].title(), "Untitled");
        assert!(matches!(events[1].start, Some(EventTime::Date(_))));
        assert!(events[1].end.is_none());
        assert!(!events[1].is_timed());
    }

    #[test]
    fn test_recurrence_with_mixed_exdates() {
        let ics = calendar(
            "BEGIN:VEVENT\r\n\
UID:standup\r\n\
DTSTART;TZID=Europe/Berlin:20250303T093000\r\n\
DTEND;TZID=Europe/Berlin:20250303T094500\r\n\
RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR\r\n\
EXDATE;TZID=Europe/Berlin:20250305T093000,20250307T093000\r\n\
EXDATE:20250310T083000Z\r\n\
EXDATE;VALUE=DATE:20250312\r\n\
END:VEVENT\r\n",
        );

        let recurrence = parse_event(&ics).unwrap().recurrence.unwrap();

        assert_eq!(recurrence.rrule, "FREQ=WEEKLY;BYDAY=MO,WE,FR");
        assert_eq!(recurrence.exdates.len(), 4);
        assert!(matches!(
            &recurrence.exdates[0],
            EventTime::DateTimeZoned { tzid, .. } if tzid == "Europe/Berlin"
        ));
        assert!(matches!(recurrence.exdates[2], EventTime::DateTimeUtc(_)));
        assert!(matches!(recurrence.exdates[3], EventTime::Date(_)));
    }

    #[test]
    fn test_override_has_recurrence_id() {
        let ics = calendar(
            "BEGIN:VEVENT\r\n\
UID:standup\r\n\
RECURRENCE-ID:20250305T083000Z\r\n\
DTSTART:20250305T140000Z\r\n\
DTEND:20250305T141500Z\r\n\
END:VEVENT\r\n",
        );

        let event = parse_event(&ics).unwrap();

        assert!(event.recurrence.is_none());
        assert!(matches!(event.recurrence_id, Some(EventTime::DateTimeUtc(_))));
    }

    #[test]
    fn test_folded_description_is_unfolded() {
        let ics = calendar(
            "BEGIN:VEVENT\r\n\
UID:planning\r\n\
DTSTART:20250320T090000Z\r\n\
DESCRIPTION:Quarterly planning \r\n for the platform \r\n team\r\n\
END:VEVENT\r\n",
        );

        let event = parse_event(&ics).unwrap();

        assert_eq!(
            event.description.as_deref(),
            Some("Quarterly planning for the platform team")
        );
    }

    #[test]
    fn test_garbage_yields_no_events() {
        assert!(parse_events("not an ics file").is_empty());
        assert!(parse_events(&calendar("")).is_empty());
    }
}
