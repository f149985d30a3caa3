//! Reschedulable vs. fixed meetings.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone};

use super::occurrence::Occurrence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingClass {
    Reschedulable,
    Fixed,
}

/// An occurrence with the figures it was classified by.
#[derive(Debug, Clone, PartialEq)]
pub struct Meeting<Tz: TimeZone> {
    pub occurrence: Occurrence<Tz>,
    pub duration_minutes: i64,
    pub participant_count: usize,
}

impl<Tz: TimeZone> Meeting<Tz> {
    pub fn new(occurrence: Occurrence<Tz>) -> Self {
        Meeting {
            duration_minutes: occurrence.duration_minutes(),
            participant_count: occurrence.participant_count(),
            occurrence,
        }
    }

    pub fn title(&self) -> &str {
        self.occurrence.title()
    }

    pub fn start(&self) -> &DateTime<Tz> {
        &self.occurrence.start
    }

    pub fn end(&self) -> &DateTime<Tz> {
        &self.occurrence.end
    }
}

/// Rules deciding which meetings may be moved.
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    /// Largest participant count (organizer included) a movable meeting may have
    pub reschedulable_threshold: usize,
    pub never_move_ids: &'a HashSet<String>,
}

impl Classifier<'_> {
    /// Fixed when the UID is on the never-move list or too many people attend.
    /// Occurrences without a UID can only be fixed by size.
    pub fn classify<Tz: TimeZone>(&self, occurrence: &Occurrence<Tz>) -> MeetingClass {
        let never_move = occurrence
            .uid
            .as_ref()
            .is_some_and(|uid| self.never_move_ids.contains(uid));

        if never_move || occurrence.participant_count() > self.reschedulable_threshold {
            MeetingClass::Fixed
        } else {
            MeetingClass::Reschedulable
        }
    }

    /// Split occurrences into (reschedulable, fixed), keeping input order in both.
    pub fn partition<Tz: TimeZone>(
        &self,
        occurrences: &[Occurrence<Tz>],
    ) -> (Vec<Meeting<Tz>>, Vec<Meeting<Tz>>) {
        let mut reschedulable = Vec::new();
        let mut fixed = Vec::new();

        for occurrence in occurrences {
            let meeting = Meeting::new(occurrence.clone());
            match self.classify(occurrence) {
                MeetingClass::Reschedulable => reschedulable.push(meeting),
                MeetingClass::Fixed => fixed.push(meeting),
            }
        }

        (reschedulable, fixed)
    }
}
