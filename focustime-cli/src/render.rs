//! Terminal rendering of analysis results, suggestions and event lists.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use focustime_core::MeetingStats;
use focustime_core::analysis::Meeting;
use focustime_core::event::Event;
use focustime_core::recommend::OptimizationSuggestion;
use owo_colors::OwoColorize;

/// Free blocks shown in the summary
const TOP_FREE_BLOCKS: usize = 5;
const DESCRIPTION_PREVIEW_CHARS: usize = 100;

const DATE_FORMAT: &str = "%a %b %d";
const DATE_TIME_FORMAT: &str = "%a %b %d %H:%M";
const TIME_FORMAT: &str = "%H:%M";

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// "2h 15m", or "45m" under an hour
pub fn format_duration(minutes: i64) -> String {
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn format_span<Tz: TimeZone>(start: &DateTime<Tz>, end: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("{} - {}", start.format(DATE_TIME_FORMAT), end.format(TIME_FORMAT))
}

fn heading(lines: &mut Vec<String>, title: &str) {
    lines.push(title.bold().to_string());
}

pub fn render_stats<Tz: TimeZone>(
    stats: &MeetingStats<Tz>,
    range_label: &str,
    reschedulable_threshold: usize,
) -> String
where
    Tz::Offset: Display,
{
    let mut lines = Vec::new();

    lines.push(format!("📊 Calendar analysis: {}", range_label).bold().to_string());
    lines.push(String::new());

    heading(&mut lines, "Overview");
    lines.push(format!("  Total meetings:       {}", stats.total_meetings));
    lines.push(format!(
        "  Average duration:     {} minutes",
        stats.average_duration_minutes as i64
    ));
    lines.push(format!(
        "  Median duration:      {} minutes",
        stats.median_duration_minutes
    ));
    lines.push(format!(
        "  Fragmentation score:  {:.1}%",
        stats.fragmentation_score * 100.0
    ));

    if !stats.meetings_per_day.is_empty() {
        lines.push(String::new());
        heading(&mut lines, "Meetings per day");
        for (date, count) in &stats.meetings_per_day {
            lines.push(format!(
                "  {}: {} {}",
                date.format(DATE_FORMAT),
                count,
                pluralize("meeting", *count)
            ));
        }
    }

    if !stats.longest_free_blocks.is_empty() {
        lines.push(String::new());
        heading(&mut lines, "Longest free blocks");
        for block in stats.longest_free_blocks.iter().take(TOP_FREE_BLOCKS) {
            lines.push(format!(
                "  {} {}",
                format_span(&block.start, &block.end),
                format!("({})", format_duration(block.duration_minutes)).dimmed()
            ));
        }
    }

    lines.push(String::new());
    heading(&mut lines, "Meeting categorization");
    lines.push(format!(
        "  Reschedulable (≤ {} participants): {}",
        reschedulable_threshold,
        stats.reschedulable_meetings.len().green()
    ));
    lines.push(format!(
        "  Fixed (> {} participants):         {}",
        reschedulable_threshold,
        stats.fixed_meetings.len().yellow()
    ));

    lines.join("\n")
}

pub fn render_suggestions(suggestion: &OptimizationSuggestion) -> String {
    let mut lines = Vec::new();
    heading(&mut lines, "💡 Focus time recommendations");
    lines.push(String::new());

    if suggestion.suggestions.is_empty() {
        lines.push("No optimization suggestions available.".dimmed().to_string());
        lines.push(
            "Your calendar may already be well-optimized for focus time."
                .dimmed()
                .to_string(),
        );
    } else {
        for (i, s) in suggestion.suggestions.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, s));
        }
    }

    lines.join("\n")
}

pub fn render_reschedulable<Tz: TimeZone>(meetings: &[Meeting<Tz>]) -> String
where
    Tz::Offset: Display,
{
    let mut lines = Vec::new();
    heading(&mut lines, "Reschedulable meetings");
    lines.push(String::new());

    if meetings.is_empty() {
        lines.push("No reschedulable meetings found.".dimmed().to_string());
        return lines.join("\n");
    }

    let mut sorted: Vec<&Meeting<Tz>> = meetings.iter().collect();
    sorted.sort_by(|a, b| a.start().cmp(b.start()));

    for meeting in sorted {
        lines.push(format!("• {}", meeting.title()));
        lines.push(format!("  {}", format_span(meeting.start(), meeting.end())));
        lines.push(
            format!(
                "  Duration: {} min | Participants: {}",
                meeting.duration_minutes, meeting.participant_count
            )
            .dimmed()
            .to_string(),
        );
        lines.push(String::new());
    }

    lines.join("\n")
}

/// `description` cut to its first 100 characters, with an ellipsis when shortened
fn preview(description: &str) -> String {
    let mut chars = description.chars();
    let head: String = chars.by_ref().take(DESCRIPTION_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

pub fn render_event_list<Tz: TimeZone>(events: &[Event], range_label: &str, zone: &Tz) -> String
where
    Tz::Offset: Display,
{
    let mut lines = Vec::new();
    lines.push(format!("📅 Calendar events: {}", range_label).bold().to_string());
    lines.push(String::new());

    if events.is_empty() {
        lines.push("No events found for this time range.".dimmed().to_string());
        return lines.join("\n");
    }

    lines.push(format!(
        "Total {}: {}",
        pluralize("event", events.len()),
        events.len()
    ));
    lines.push(String::new());

    for event in events {
        lines.push(format!("• {}", event.title().bold()));

        let start = event.start.as_ref().and_then(|t| t.to_zone(zone));
        let end = event.end.as_ref().and_then(|t| t.to_zone(zone));

        let mut details = match (start, end) {
            (Some(start), Some(end)) => {
                lines.push(format!("  {}", format_span(&start, &end)));
                format!("  Duration: {} min", (end - start).num_minutes())
            }
            _ => match event.start.as_ref().and_then(|t| t.date_in(zone)) {
                Some(date) => format!("  All-day event on {}", date),
                None => "  All-day event".to_string(),
            },
        };

        if !event.attendees.is_empty() {
            details.push_str(&format!(" | Attendees: {}", event.attendees.len()));
        }
        lines.push(details.dimmed().to_string());

        if let Some(location) = &event.location {
            lines.push(format!("  📍 {}", location));
        }

        if let Some(description) = event.description.as_deref().filter(|d| !d.trim().is_empty()) {
            lines.push(format!("  💬 {}", preview(description)));
        }

        lines.push(String::new());
    }

    lines.join("\n")
}
