//! Event sources: where the events to analyze come from.
//!
//! `IcsDirectory` reads a local calendar directory in the caldir layout:
//!
//! ```text
//! ~/calendar/
//!   work/
//!     2025-03-20T1500__team-sync.ics
//!     _recurring__standup.ics
//!   personal/
//!     ...
//! ```
//!
//! Recurring masters are expanded into concrete instances, since the analysis only
//! understands individual occurrences.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};

use crate::error::{FocusError, FocusResult};
use crate::event::{Event, EventTime, localize};
use crate::ics::parse_events;
use crate::recurrence::expand_recurring_event;
use crate::time_range::TimeWindow;

/// Supplies raw events for a resolved time window.
pub trait EventSource {
    fn events(&self, window: &TimeWindow) -> FocusResult<Vec<Event>>;
}

/// Local directory of .ics files, optionally restricted to one calendar subdirectory.
///
/// All-day and floating times are placed in `zone` when filtering by window.
#[derive(Debug, Clone)]
pub struct IcsDirectory<Tz: TimeZone> {
    root: PathBuf,
    calendar: Option<String>,
    zone: Tz,
}

impl<Tz: TimeZone> IcsDirectory<Tz> {
    pub fn new(root: impl Into<PathBuf>, zone: Tz) -> Self {
        IcsDirectory {
            root: root.into(),
            calendar: None,
            zone,
        }
    }

    /// Only read the calendar stored in the `slug` subdirectory.
    pub fn with_calendar(mut self, slug: impl Into<String>) -> Self {
        self.calendar = Some(slug.into());
        self
    }

    /// Calendar subdirectories, sorted by name.
    pub fn calendars(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut slugs: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(String::from))
            .filter(|name| !name.starts_with('.'))
            .collect();

        slugs.sort();
        slugs
    }

    /// Every event stored on disk, before recurrence expansion or window filtering.
    pub fn load_all(&self) -> FocusResult<Vec<Event>> {
        let dirs = match &self.calendar {
            Some(slug) => {
                let dir = self.root.join(slug);
                if !dir.is_dir() {
                    return Err(FocusError::CalendarNotFound(format!(
                        "'{}' (available: {})",
                        slug,
                        self.calendars().join(", ")
                    )));
                }
                vec![dir]
            }
            None => {
                let mut dirs = vec![self.root.clone()];
                dirs.extend(self.calendars().iter().map(|slug| self.root.join(slug)));
                dirs
            }
        };

        let mut events = Vec::new();
        for dir in dirs {
            events.extend(read_ics_dir(&dir)?);
        }

        log::debug!("Read {} events from {}", events.len(), self.root.display());
        Ok(events)
    }
}

impl<Tz: TimeZone> EventSource for IcsDirectory<Tz> {
    fn events(&self, window: &TimeWindow) -> FocusResult<Vec<Event>> {
        let stored = self.load_all()?;

        // Instance overrides (RECURRENCE-ID) replace generated instances of their master
        let mut overrides: HashMap<Option<String>, HashMap<String, Event>> = HashMap::new();
        let mut singles = Vec::new();
        let mut masters = Vec::new();

        for event in stored {
            if let Some(recurrence_id) = &event.recurrence_id {
                overrides
                    .entry(event.uid.clone())
                    .or_default()
                    .insert(recurrence_id.to_ics_string(), event);
            } else if event.recurrence.is_some() {
                masters.push(event);
            } else {
                singles.push(event);
            }
        }

        let no_overrides = HashMap::new();
        let mut events = singles;
        for master in &masters {
            let instance_overrides = overrides.get(&master.uid).unwrap_or(&no_overrides);
            match expand_recurring_event(master, window.start, window.end, instance_overrides) {
                Ok(instances) => events.extend(instances),
                Err(e) => log::warn!("Skipping recurring event: {}", e),
            }
        }

        // Overrides whose master is missing still describe a real occurrence
        for (uid, instance_overrides) in overrides {
            if !masters.iter().any(|m| m.uid == uid) {
                events.extend(instance_overrides.into_values());
            }
        }

        let mut in_window: Vec<Event> = events
            .into_iter()
            .filter(|event| overlaps_window(event, window, &self.zone))
            .collect();
        in_window.sort_by_key(|event| start_key(event, &self.zone));

        Ok(in_window)
    }
}

fn read_ics_dir(dir: &Path) -> FocusResult<Vec<Event>> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        log::debug!("Calendar directory {} does not exist", dir.display());
        return Ok(Vec::new());
    };

    let mut events = Vec::new();
    for path in entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == "ics"))
    {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Skipping unreadable {}: {}", path.display(), e);
                continue;
            }
        };
        let parsed = parse_events(&content);
        if parsed.is_empty() {
            log::warn!("No events could be parsed from {}", path.display());
        }
        events.extend(parsed);
    }

    Ok(events)
}

/// Instant bounds of an event read in `zone`. All-day events cover whole days
/// (DTEND is exclusive); a missing end means a one-day event or a zero-length meeting.
fn bounds<Tz: TimeZone>(event: &Event, zone: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = event.start.as_ref()?;
    let end = match (start, event.end.as_ref()) {
        (_, Some(end)) => end.clone(),
        (EventTime::Date(d), None) => EventTime::Date(*d + Days::new(1)),
        (timed, None) => timed.clone(),
    };
    Some((instant(start, zone)?, instant(&end, zone)?))
}

fn instant<Tz: TimeZone>(time: &EventTime, zone: &Tz) -> Option<DateTime<Utc>> {
    let dt = match time {
        EventTime::Date(d) => localize(zone, d.and_time(NaiveTime::MIN))?,
        timed => timed.to_zone(zone)?,
    };
    Some(dt.with_timezone(&Utc))
}

/// Zero-length events count when they start inside the window.
fn overlaps_window<Tz: TimeZone>(event: &Event, window: &TimeWindow, zone: &Tz) -> bool {
    match bounds(event, zone) {
        Some((start, end)) if end <= start => start >= window.start && start < window.end,
        Some((start, end)) => window.overlaps(start, end),
        None => false,
    }
}

fn start_key<Tz: TimeZone>(event: &Event, zone: &Tz) -> Option<DateTime<Utc>> {
    bounds(event, zone).map(|(start, _)| start)
}
