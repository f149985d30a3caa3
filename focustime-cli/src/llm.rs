//! HTTP client for an OpenAI-compatible chat completions API

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use chrono::TimeZone;
use focustime_core::MeetingStats;
use focustime_core::config::FocusConfig;
use focustime_core::recommend::{FocusGoal, OptimizationContext, OptimizationSuggestion};

const REQUEST_TIMEOUT_SECS: u64 = 120;

pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        ChatMessage {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ChatClient {
    pub fn new(base_url: &str, api_key: String, model: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    pub fn request(&self, system: &str, user: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::new("system", system),
                ChatMessage::new("user", user),
            ],
        }
    }

    /// POST /chat/completions, returning the first choice's content
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        log::debug!("Requesting completion from {} ({})", self.base_url, self.model);

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request(system, user))
            .send()
            .await
            .context("Failed to connect to the language model API")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|err| err.error.message)
                .unwrap_or(body);
            anyhow::bail!("Language model API returned {}: {}", status, message);
        }

        let response: ChatResponse = resp
            .json()
            .await
            .context("Unexpected response from the language model API")?;

        first_choice(response)
    }
}

fn first_choice(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .context("Language model API returned no choices")
}

/// Turns an analysis into focus time suggestions.
pub struct FocusTimeOptimizer {
    client: ChatClient,
    goal: FocusGoal,
}

impl FocusTimeOptimizer {
    pub fn from_config(config: &FocusConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        let client = ChatClient::new(&config.llm_base_url, api_key, config.llm_model.clone())?;

        Ok(Self {
            client,
            goal: FocusGoal {
                min_block_minutes: config.min_focus_block_minutes,
                max_block_minutes: config.max_focus_block_minutes,
                reschedulable_threshold: config.reschedulable_threshold,
            },
        })
    }

    pub async fn generate_suggestions<Tz: TimeZone>(
        &self,
        stats: &MeetingStats<Tz>,
    ) -> Result<OptimizationSuggestion>
    where
        Tz::Offset: std::fmt::Display,
    {
        let context = OptimizationContext::from_stats(stats);
        let system = self.goal.system_prompt();
        let user = self.goal.user_message(&context)?;

        let response = self.client.complete(&system, &user).await?;
        Ok(OptimizationSuggestion::from_response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let client = ChatClient::new(
            "https://api.example.com/v1/",
            "key".to_string(),
            "gpt-5".to_string(),
        )
        .unwrap();

        let body = serde_json::to_value(client.request("be brief", "help")).unwrap();

        assert_eq!(client.base_url, "https://api.example.com/v1");
        assert_eq!(
            body,
            serde_json::json!({
                "model": "gpt-5",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "help"},
                ]
            })
        );
    }

    #[test]
    fn test_first_choice_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"• Move it"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice(response).unwrap(), "• Move it");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(first_choice(empty).is_err());
    }
}
