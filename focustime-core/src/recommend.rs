//! Language-model recommendations for creating focus time.
//!
//! This module only prepares the request (a JSON summary of the analysis plus prompts)
//! and parses the answer. Talking to the model is up to the caller.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::analysis::{FreeBlock, Meeting, MeetingStats};
use crate::error::{FocusError, FocusResult};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// What the model gets to see of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationContext {
    pub reschedulable_meetings: Vec<MeetingInfo>,
    pub fixed_meetings: Vec<MeetingInfo>,
    pub free_blocks: Vec<FreeBlockInfo>,
    pub fragmentation_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingInfo {
    pub summary: String,
    pub start: String,
    pub end: String,
    pub duration_minutes: i64,
    pub participants: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeBlockInfo {
    pub start: String,
    pub end: String,
    pub duration_minutes: i64,
}

/// Suggestions extracted from a model answer, with the answer itself.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationSuggestion {
    pub suggestions: Vec<String>,
    pub raw_response: String,
}

impl OptimizationSuggestion {
    pub fn from_response(raw_response: String) -> Self {
        OptimizationSuggestion {
            suggestions: parse_suggestions(&raw_response),
            raw_response,
        }
    }
}

fn format_time<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    dt.format(TIME_FORMAT).to_string()
}

impl<Tz: TimeZone> From<&Meeting<Tz>> for MeetingInfo
where
    Tz::Offset: Display,
{
    fn from(meeting: &Meeting<Tz>) -> Self {
        MeetingInfo {
            summary: meeting.title().to_string(),
            start: format_time(meeting.start()),
            end: format_time(meeting.end()),
            duration_minutes: meeting.duration_minutes,
            participants: meeting.participant_count,
        }
    }
}

impl<Tz: TimeZone> From<&FreeBlock<Tz>> for FreeBlockInfo
where
    Tz::Offset: Display,
{
    fn from(block: &FreeBlock<Tz>) -> Self {
        FreeBlockInfo {
            start: format_time(&block.start),
            end: format_time(&block.end),
            duration_minutes: block.duration_minutes,
        }
    }
}

impl OptimizationContext {
    pub fn from_stats<Tz: TimeZone>(stats: &MeetingStats<Tz>) -> Self
    where
        Tz::Offset: Display,
    {
        OptimizationContext {
            reschedulable_meetings: stats.reschedulable_meetings.iter().map(Into::into).collect(),
            fixed_meetings: stats.fixed_meetings.iter().map(Into::into).collect(),
            free_blocks: stats.longest_free_blocks.iter().map(Into::into).collect(),
            fragmentation_score: stats.fragmentation_score,
        }
    }

    pub fn to_json(&self) -> FocusResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FocusError::Serialization(e.to_string()))
    }
}

/// Focus block bounds and movability rules the prompts are written around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusGoal {
    pub min_block_minutes: i64,
    pub max_block_minutes: i64,
    pub reschedulable_threshold: usize,
}

impl FocusGoal {
    pub fn system_prompt(&self) -> String {
        format!(
            "\
You are a calendar optimization assistant. Your goal is to help create focus time blocks of {min}-{max} minutes.

Rules:
1. Only suggest moving reschedulable meetings (at most {threshold} participants)
2. Fixed meetings (more than {threshold} participants or marked as \"never move\") CANNOT be moved
3. Provide specific, actionable suggestions with exact times
4. Format each suggestion on a new line starting with \"• \"
5. Each suggestion should specify: meeting name, current time, proposed time, and the focus block it creates
6. Consider the fragmentation score - higher scores mean more short gaps that reduce productivity
7. Prioritize creating longer contiguous free blocks over reducing fragmentation
8. Be concise and direct

Example format:
• Move \"Team Sync\" from Tuesday 10:00 to Tuesday 15:00 to create a 10:00-13:30 focus block
• Combine \"1:1 with Alice\" (Monday 11:00) and \"Project Review\" (Monday 14:00) to Monday 16:00-17:00 to create a 09:00-12:00 focus block",
            min = self.min_block_minutes,
            max = self.max_block_minutes,
            threshold = self.reschedulable_threshold,
        )
    }

    pub fn user_message(&self, context: &OptimizationContext) -> FocusResult<String> {
        Ok(format!(
            "\
Analyze this calendar and suggest specific meeting reschedules to create {min}-{max} minute focus blocks.

Calendar data:
{json}

Provide 3-5 concrete, actionable suggestions. Each suggestion should specify exactly which meeting to move, from when, to when, and what focus block this creates.",
            min = self.min_block_minutes,
            max = self.max_block_minutes,
            json = context.to_json()?,
        ))
    }
}

/// Bullet lines of a model answer (`•`, `-` or `*`), without their marker.
pub fn parse_suggestions(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            line.strip_prefix('•')
                .or_else(|| line.strip_prefix('-'))
                .or_else(|| line.strip_prefix('*'))
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::occurrence::tests::{meeting, with_attendees};
    use crate::analysis::{AnalysisSettings, MeetingAnalyzer};
    use chrono::Utc;

    fn goal() -> FocusGoal {
        FocusGoal {
            min_block_minutes: 180,
            max_block_minutes: 240,
            reschedulable_threshold: 3,
        }
    }

    #[test]
    fn test_parse_suggestions_keeps_bullets_only() {
        let response = "Here are my suggestions:\n\
            • Move \"Sync\" to 15:00\n\
            - Cancel the review\n\
            *   Merge the 1:1s  \n\
            •\n\
            Good luck!";

        assert_eq!(
            parse_suggestions(response),
            vec!["Move \"Sync\" to 15:00", "Cancel the review", "Merge the 1:1s"]
        );
    }

    #[test]
    fn test_context_from_stats() {
        let events = vec![
            meeting("1on1", 20, (10, 0), (10, 30)),
            with_attendees(meeting("all-hands", 20, (14, 0), (15, 0)), 20),
        ];
        let stats = MeetingAnalyzer::new(AnalysisSettings::default(), Utc).analyze(&events);

        let context = OptimizationContext::from_stats(&stats);

        assert_eq!(
            context.reschedulable_meetings,
            vec![MeetingInfo {
                summary: "1on1".to_string(),
                start: "2025-03-20 10:00".to_string(),
                end: "2025-03-20 10:30".to_string(),
                duration_minutes: 30,
                participants: 1,
            }]
        );
        assert_eq!(context.fixed_meetings[0].participants, 21);
        // 10:30-14:00 is the longest gap
        assert_eq!(context.free_blocks[0].start, "2025-03-20 10:30");
        assert_eq!(context.free_blocks[0].duration_minutes, 210);
    }

    #[test]
    fn test_prompts_mention_goal() {
        let context = OptimizationContext::from_stats(&MeetingStats::<Utc>::empty());

        let system = goal().system_prompt();
        let user = goal().user_message(&context).unwrap();

        assert!(system.contains("180-240 minutes"));
        assert!(system.contains("at most 3 participants"));
        assert!(user.contains("\"fragmentation_score\": 0.0"));
    }
}
