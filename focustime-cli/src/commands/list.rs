use anyhow::Result;
use chrono::Local;
use focustime_core::config::FocusConfig;
use focustime_core::time_range::TimeRange;

use crate::render::render_event_list;

pub fn run(range: TimeRange, calendar: Option<String>) -> Result<()> {
    let config = FocusConfig::load()?;
    let events = super::load_events(&config, range, calendar)?;

    println!("{}", render_event_list(&events, range.label(), &Local));

    Ok(())
}
