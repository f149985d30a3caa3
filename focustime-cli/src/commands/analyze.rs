use anyhow::Result;
use chrono::Local;
use focustime_core::MeetingAnalyzer;
use focustime_core::config::FocusConfig;
use focustime_core::time_range::TimeRange;
use owo_colors::OwoColorize;

use crate::llm::FocusTimeOptimizer;
use crate::render::{render_reschedulable, render_stats, render_suggestions};
use crate::utils::tui;

pub struct AnalyzeOptions {
    pub range: TimeRange,
    pub optimize: bool,
    pub show_reschedulable: bool,
    pub calendar: Option<String>,
}

pub async fn run(options: AnalyzeOptions) -> Result<()> {
    let config = FocusConfig::load()?;
    let events = super::load_events(&config, options.range, options.calendar)?;

    if events.is_empty() {
        println!("{}", "No events found for this time range".dimmed());
        return Ok(());
    }

    let analyzer = MeetingAnalyzer::new(config.analysis_settings(), Local);
    let stats = analyzer.analyze(&events);

    println!(
        "{}",
        render_stats(&stats, options.range.label(), config.reschedulable_threshold)
    );

    if options.show_reschedulable {
        println!();
        println!("{}", render_reschedulable(&stats.reschedulable_meetings));
    }

    if options.optimize {
        let optimizer = FocusTimeOptimizer::from_config(&config)?;

        println!();
        let spinner = tui::create_spinner("Generating focus time recommendations");
        let suggestion = optimizer.generate_suggestions(&stats).await;
        spinner.finish_and_clear();

        println!("{}", render_suggestions(&suggestion?));
    }

    Ok(())
}
