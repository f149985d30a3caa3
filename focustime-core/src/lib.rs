//! Core of focustime.
//!
//! - `event`, `ics`, `recurrence` and `source` load calendar events from a local calendar directory
//! - `time_range` resolves symbolic ranges ("tomorrow", "next week") into concrete windows
//! - `analysis` is the meeting analysis engine: a pure function from events + settings to `MeetingStats`
//! - `recommend` builds the language-model context from an analysis and parses its answer
//! - `config` persists user settings

pub mod analysis;
pub mod config;
pub mod error;
pub mod event;
pub mod ics;
pub mod recommend;
pub mod recurrence;
pub mod source;
pub mod time_range;

pub use analysis::{AnalysisSettings, MeetingAnalyzer, MeetingStats};
pub use error::{FocusError, FocusResult};
pub use event::*;
