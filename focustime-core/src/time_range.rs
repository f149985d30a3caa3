//! Symbolic time ranges ("tomorrow", "next week") and their concrete windows.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};

use crate::event::localize;

/// Half-open window [start, end) of instants to load events for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window covering whole local days `[from, to)`.
    pub fn from_dates<Tz: TimeZone>(from: NaiveDate, to: NaiveDate, zone: &Tz) -> Self {
        TimeWindow {
            start: start_of_day(from, zone),
            end: start_of_day(to, zone),
        }
    }

    /// Whether `[start, end)` intersects the window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Tomorrow,
    CurrentWeek,
    NextWeek,
}

impl TimeRange {
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Tomorrow => "Tomorrow",
            TimeRange::CurrentWeek => "Current Week",
            TimeRange::NextWeek => "Next Week",
        }
    }

    /// Resolve into a concrete window of local days, relative to `today`.
    ///
    /// Weeks start on Monday. "Next week" always starts on the first Monday strictly after
    /// `today`, so on a Monday it is seven days away.
    pub fn resolve<Tz: TimeZone>(&self, today: NaiveDate, zone: &Tz) -> TimeWindow {
        let (from, to) = match self {
            TimeRange::Tomorrow => {
                let tomorrow = today + Days::new(1);
                (tomorrow, tomorrow + Days::new(1))
            }
            TimeRange::CurrentWeek => {
                let monday = today - Days::new(today.weekday().num_days_from_monday().into());
                (monday, monday + Days::new(7))
            }
            TimeRange::NextWeek => {
                let until_monday = 7 - today.weekday().num_days_from_monday();
                let monday = today + Days::new(until_monday.into());
                (monday, monday + Days::new(7))
            }
        };

        TimeWindow::from_dates(from, to, zone)
    }
}

fn start_of_day<Tz: TimeZone>(date: NaiveDate, zone: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    localize(zone, midnight)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_tomorrow_is_single_day() {
        // Wednesday
        let window = TimeRange::Tomorrow.resolve(date(2025, 3, 19), &Utc);
        assert_eq!(window.start, utc(2025, 3, 20));
        assert_eq!(window.end, utc(2025, 3, 21));
    }

    #[test]
    fn test_current_week_starts_on_monday() {
        let window = TimeRange::CurrentWeek.resolve(date(2025, 3, 19), &Utc);
        assert_eq!(window.start, utc(2025, 3, 17));
        assert_eq!(window.end, utc(2025, 3, 24));

        let on_monday = TimeRange::CurrentWeek.resolve(date(2025, 3, 17), &Utc);
        assert_eq!(on_monday.start, utc(2025, 3, 17));
    }

    #[test]
    fn test_next_week_on_monday_skips_a_full_week() {
        let window = TimeRange::NextWeek.resolve(date(2025, 3, 17), &Utc);
        assert_eq!(window.start, utc(2025, 3, 24));
        assert_eq!(window.end, utc(2025, 3, 31));

        let on_sunday = TimeRange::NextWeek.resolve(date(2025, 3, 23), &Utc);
        assert_eq!(on_sunday.start, utc(2025, 3, 24));
    }

    #[test]
    fn test_window_uses_local_midnight() {
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let window = TimeRange::Tomorrow.resolve(date(2025, 3, 19), &zone);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2025, 3, 19, 22, 0, 0).unwrap()
        );
    }
}
