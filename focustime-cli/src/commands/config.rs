use anyhow::Result;
use focustime_core::config::{API_KEY_ENV, FocusConfig};
use owo_colors::OwoColorize;

pub fn show() -> Result<()> {
    let config_path = FocusConfig::config_path()?;
    let config = FocusConfig::load()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Calendars:  {}", config.calendar_path().display());

    println!();
    println!("{}", "Analysis".bold());
    println!(
        "  Working hours:           {:02}:00-{:02}:00",
        config.work_day_start, config.work_day_end
    );
    println!(
        "  Reschedulable up to:     {} participants",
        config.reschedulable_threshold
    );
    println!(
        "  Focus block goal:        {}-{} minutes",
        config.min_focus_block_minutes, config.max_focus_block_minutes
    );

    println!();
    println!("{}", "Language model".bold());
    println!("  Model:     {}", config.llm_model);
    println!("  Base URL:  {}", config.llm_base_url);
    let key_status = match (&config.api_key, std::env::var(API_KEY_ENV).is_ok()) {
        (Some(_), _) => "set in config".green().to_string(),
        (None, true) => format!("set via {}", API_KEY_ENV).green().to_string(),
        (None, false) => "not set".yellow().to_string(),
    };
    println!("  API key:   {}", key_status);

    println!();
    println!("{}", "Never move".bold());
    if config.never_move_event_ids.is_empty() {
        println!("  {}", "(none)".dimmed());
    } else {
        for id in &config.never_move_event_ids {
            println!("  {}", id);
        }
    }

    Ok(())
}

pub fn never_move(event_id: &str) -> Result<()> {
    let mut config = FocusConfig::load()?;

    if !config.add_never_move(event_id) {
        println!("{}", format!("{} is already marked as never move", event_id).dimmed());
        return Ok(());
    }

    config.save()?;
    println!("{} {} marked as never move", "✓".green(), event_id.bold());

    Ok(())
}

pub fn allow_move(event_id: &str) -> Result<()> {
    let mut config = FocusConfig::load()?;

    if !config.remove_never_move(event_id) {
        anyhow::bail!(
            "{} is not marked as never move.\n\n\
            See marked meetings with:\n  \
            focustime config show",
            event_id
        );
    }

    config.save()?;
    println!("{} {} can be rescheduled again", "✓".green(), event_id.bold());

    Ok(())
}
