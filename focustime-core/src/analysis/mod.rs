//! Meeting analysis engine.
//!
//! Turns an unordered list of events into a `MeetingStats` summary: meeting counts and
//! durations, the longest free blocks inside working hours, a fragmentation score, and the
//! split between meetings that can and cannot be moved.
//!
//! The analysis is a pure function of the events, the `AnalysisSettings` and the zone the
//! analyzer was built with. It never fails: untimed events are dropped, and inverted or
//! overlapping meetings flow through the arithmetic as documented in each submodule.

pub mod classify;
pub mod fragmentation;
pub mod free_blocks;
pub mod occurrence;
pub mod stats;

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, TimeZone};

pub use classify::{Classifier, Meeting, MeetingClass};
pub use free_blocks::{FreeBlock, MAX_FREE_BLOCKS};
pub use occurrence::Occurrence;

use crate::event::Event;

/// Settings the analysis depends on, passed explicitly for every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Local hour the working day starts (inclusive)
    pub work_day_start: u32,
    /// Local hour the working day ends; 24 means midnight
    pub work_day_end: u32,
    /// Meetings with more participants than this are fixed
    pub reschedulable_threshold: usize,
    /// UIDs of meetings that are always fixed
    pub never_move_ids: HashSet<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            work_day_start: 9,
            work_day_end: 18,
            reschedulable_threshold: 3,
            never_move_ids: HashSet::new(),
        }
    }
}

/// Summary of how time is spent across the analyzed events.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingStats<Tz: TimeZone> {
    pub total_meetings: usize,
    pub average_duration_minutes: f64,
    pub median_duration_minutes: i64,
    /// Only dates with at least one meeting are present
    pub meetings_per_day: BTreeMap<NaiveDate, usize>,
    /// Longest first, at most `MAX_FREE_BLOCKS`
    pub longest_free_blocks: Vec<FreeBlock<Tz>>,
    /// In [0, 1]
    pub fragmentation_score: f64,
    pub reschedulable_meetings: Vec<Meeting<Tz>>,
    pub fixed_meetings: Vec<Meeting<Tz>>,
}

impl<Tz: TimeZone> MeetingStats<Tz> {
    /// Result for a range without any timed meetings.
    pub fn empty() -> Self {
        MeetingStats {
            total_meetings: 0,
            average_duration_minutes: 0.0,
            median_duration_minutes: 0,
            meetings_per_day: BTreeMap::new(),
            longest_free_blocks: Vec::new(),
            fragmentation_score: 0.0,
            reschedulable_meetings: Vec::new(),
            fixed_meetings: Vec::new(),
        }
    }
}

/// Runs the analysis in a fixed time zone (usually `chrono::Local`).
#[derive(Debug, Clone)]
pub struct MeetingAnalyzer<Tz: TimeZone> {
    settings: AnalysisSettings,
    zone: Tz,
}

impl<Tz: TimeZone> MeetingAnalyzer<Tz> {
    pub fn new(settings: AnalysisSettings, zone: Tz) -> Self {
        MeetingAnalyzer { settings, zone }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn analyze(&self, events: &[Event]) -> MeetingStats<Tz> {
        let occurrences = occurrence::normalize(events, &self.zone);
        log::debug!(
            "Analyzing {} timed meetings ({} events skipped)",
            occurrences.len(),
            events.len() - occurrences.len()
        );
        self.analyze_occurrences(&occurrences)
    }

    /// Analyze already-normalized occurrences, in any order.
    pub fn analyze_occurrences(&self, occurrences: &[Occurrence<Tz>]) -> MeetingStats<Tz> {
        if occurrences.is_empty() {
            return MeetingStats::empty();
        }

        let durations: Vec<i64> = occurrences.iter().map(Occurrence::duration_minutes).collect();
        let days = occurrence::group_by_day(occurrences);

        let classifier = Classifier {
            reschedulable_threshold: self.settings.reschedulable_threshold,
            never_move_ids: &self.settings.never_move_ids,
        };
        let (reschedulable_meetings, fixed_meetings) = classifier.partition(occurrences);

        let result = MeetingStats {
            total_meetings: occurrences.len(),
            average_duration_minutes: stats::mean(&durations),
            median_duration_minutes: stats::median(&durations),
            meetings_per_day: stats::meetings_per_day(occurrences),
            longest_free_blocks: free_blocks::longest_free_blocks(
                &days,
                &self.zone,
                self.settings.work_day_start,
                self.settings.work_day_end,
            ),
            fragmentation_score: fragmentation::fragmentation_score(&days),
            reschedulable_meetings,
            fixed_meetings,
        };

        log::debug!(
            "{} days with meetings, {} free blocks, fragmentation {:.2}",
            days.len(),
            result.longest_free_blocks.len(),
            result.fragmentation_score
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::occurrence::tests::{meeting, with_attendees};
    use crate::event::EventTime;
    use chrono::{Datelike, Utc};

    fn analyzer() -> MeetingAnalyzer<Utc> {
        MeetingAnalyzer::new(AnalysisSettings::default(), Utc)
    }

    fn busy_week() -> Vec<Event> {
        vec![
            with_attendees(meeting("planning", 18, (9, 0), (10, 30)), 6),
            meeting("1on1", 18, (11, 0), (11, 30)),
            meeting("review", 18, (11, 45), (12, 45)),
            with_attendees(meeting("standup", 19, (9, 30), (9, 45)), 2),
            meeting("lunch", 19, (12, 0), (13, 0)),
            meeting("overlap", 19, (12, 30), (13, 30)),
            meeting("late", 20, (17, 30), (19, 0)),
            Event {
                uid: Some("offsite".to_string()),
                start: Some(EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 21).unwrap())),
                end: Some(EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 22).unwrap())),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_empty_input_gives_empty_stats() {
        let stats = analyzer().analyze(&[]);
        assert_eq!(stats, MeetingStats::empty());
        assert_eq!(stats.average_duration_minutes, 0.0);
        assert_eq!(stats.median_duration_minutes, 0);
    }

    #[test]
    fn test_only_untimed_events_gives_empty_stats() {
        let all_day = busy_week().pop().unwrap();
        assert_eq!(analyzer().analyze(&[all_day]), MeetingStats::empty());
    }

    #[test]
    fn test_busy_week_summary() {
        let stats = analyzer().analyze(&busy_week());

        assert_eq!(stats.total_meetings, 7);
        // 90, 30, 60, 15, 60, 60, 90
        assert!((stats.average_duration_minutes - 405.0 / 7.0).abs() < 1e-9);
        assert_eq!(stats.median_duration_minutes, 60);

        let date = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
        assert_eq!(
            stats.meetings_per_day,
            BTreeMap::from([(date(18), 3), (date(19), 3), (date(20), 1)])
        );

        // Day 18 gaps: 30, 15 (both short); day 19: 135, -30; day 20: none
        assert!((stats.fragmentation_score - 1.0 / 3.0).abs() < 1e-9);

        let fixed: Vec<&str> = stats.fixed_meetings.iter().map(|m| m.title()).collect();
        assert_eq!(fixed, vec!["planning"]);
        assert_eq!(stats.reschedulable_meetings.len(), 6);
    }

    #[test]
    fn test_free_blocks_of_busy_week() {
        let stats = analyzer().analyze(&busy_week());

        let durations: Vec<i64> = stats
            .longest_free_blocks
            .iter()
            .map(|b| b.duration_minutes)
            .collect();
        // 20th 09:00-17:30, 18th 12:45-18:00, 19th 13:30-18:00 (after "overlap", which starts
        // last), 19th 09:45-12:00, 18th 10:30-11:00, 19th 09:00-09:30, 18th 11:30-11:45
        assert_eq!(durations, vec![510, 315, 270, 135, 30, 30, 15]);

        let ties: Vec<u32> = stats.longest_free_blocks[4..6]
            .iter()
            .map(|b| b.start.day())
            .collect();
        assert_eq!(ties, vec![18, 19]);
    }

    #[test]
    fn test_never_move_list_from_settings() {
        let settings = AnalysisSettings {
            never_move_ids: HashSet::from(["1on1".to_string()]),
            ..Default::default()
        };
        let stats = MeetingAnalyzer::new(settings, Utc).analyze(&busy_week());

        let fixed: Vec<&str> = stats.fixed_meetings.iter().map(|m| m.title()).collect();
        assert_eq!(fixed, vec!["planning", "1on1"]);
    }

    #[test]
    fn test_analysis_is_deterministic_and_order_independent() {
        let events = busy_week();
        let mut reversed = events.clone();
        reversed.reverse();

        let first = analyzer().analyze(&events);
        let second = analyzer().analyze(&events);
        let from_reversed = analyzer().analyze(&reversed);

        assert_eq!(first, second);
        assert_eq!(first.longest_free_blocks, from_reversed.longest_free_blocks);
        assert_eq!(first.fragmentation_score, from_reversed.fragmentation_score);
        assert_eq!(first.median_duration_minutes, from_reversed.median_duration_minutes);
    }

    #[test]
    fn test_invariants_hold_on_varied_inputs() {
        let inputs = vec![
            busy_week(),
            vec![meeting("inverted", 20, (12, 0), (11, 0))],
            (0..30)
                .map(|i| meeting("m", 17 + i % 5, (8 + i % 9, 10 * (i % 6)), (9 + i % 9, 0)))
                .collect(),
        ];

        for events in inputs {
            let stats = analyzer().analyze(&events);
            assert_eq!(
                stats.reschedulable_meetings.len() + stats.fixed_meetings.len(),
                stats.total_meetings
            );
            assert!(stats.longest_free_blocks.len() <= MAX_FREE_BLOCKS);
            assert!(
                stats
                    .longest_free_blocks
                    .windows(2)
                    .all(|w| w[0].duration_minutes >= w[1].duration_minutes)
            );
            assert!((0.0..=1.0).contains(&stats.fragmentation_score));
        }
    }
}
