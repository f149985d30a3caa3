pub mod analyze;
pub mod config;
pub mod list;

use anyhow::Result;
use chrono::Local;
use focustime_core::config::FocusConfig;
use focustime_core::event::Event;
use focustime_core::source::{EventSource, IcsDirectory};
use focustime_core::time_range::TimeRange;

use crate::utils::tui;

/// Events of `range` (relative to today) from the configured calendar directory.
fn load_events(config: &FocusConfig, range: TimeRange, calendar: Option<String>) -> Result<Vec<Event>> {
    let mut source = IcsDirectory::new(config.calendar_path(), Local);
    if let Some(slug) = calendar {
        source = source.with_calendar(slug);
    }

    let window = range.resolve(Local::now().date_naive(), &Local);
    log::debug!("Loading events from {} to {}", window.start, window.end);

    let spinner = tui::create_spinner(format!("Loading events for {}", range.label().to_lowercase()));
    let events = source.events(&window);
    spinner.finish_and_clear();

    Ok(events?)
}
