//! User configuration at ~/.config/focustime/config.toml

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisSettings;
use crate::error::{FocusError, FocusResult};

static DEFAULT_CALENDAR_DIR: &str = "~/calendar";
static DEFAULT_LLM_MODEL: &str = "gpt-5";
static DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "FOCUSTIME_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Local calendar directory (one subdirectory of .ics files per calendar)
    pub calendar_dir: PathBuf,

    /// UIDs of meetings that must never be suggested for rescheduling
    pub never_move_event_ids: BTreeSet<String>,

    pub work_day_start: u32,
    pub work_day_end: u32,

    /// Meetings with at most this many participants (organizer included) may be moved
    pub reschedulable_threshold: usize,

    /// Focus block size the recommendations aim for
    pub min_focus_block_minutes: i64,
    pub max_focus_block_minutes: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub llm_model: String,
    pub llm_base_url: String,
}

impl Default for FocusConfig {
    fn default() -> Self {
        FocusConfig {
            calendar_dir: PathBuf::from(DEFAULT_CALENDAR_DIR),
            never_move_event_ids: BTreeSet::new(),
            work_day_start: 9,
            work_day_end: 18,
            reschedulable_threshold: 3,
            min_focus_block_minutes: 180,
            max_focus_block_minutes: 240,
            api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
        }
    }
}

impl FocusConfig {
    pub fn config_path() -> FocusResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FocusError::Config("Could not determine config directory".into()))?
            .join("focustime");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user's config, creating a commented default file on first use.
    pub fn load() -> FocusResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
        }

        Self::load_from(&path)
    }

    /// Load and validate a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> FocusResult<Self> {
        let config: FocusConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| FocusError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| FocusError::Config(e.to_string()))?;

        config.validate()?;
        log::debug!("Loaded config from {}", path.display());

        Ok(config)
    }

    pub fn save(&self) -> FocusResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> FocusResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| FocusError::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)
            .map_err(|e| FocusError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    fn validate(&self) -> FocusResult<()> {
        if self.work_day_start >= self.work_day_end || self.work_day_end > 24 {
            return Err(FocusError::Config(format!(
                "Invalid working hours {}:00-{}:00 (start must be before end, end at most 24)",
                self.work_day_start, self.work_day_end
            )));
        }

        if self.min_focus_block_minutes > self.max_focus_block_minutes {
            return Err(FocusError::Config(format!(
                "min_focus_block_minutes ({}) is larger than max_focus_block_minutes ({})",
                self.min_focus_block_minutes, self.max_focus_block_minutes
            )));
        }

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> FocusResult<()> {
        let defaults = FocusConfig::default();
        let contents = format!(
            "\
# focustime configuration

# Where your calendars live (one folder of .ics files per calendar):
# calendar_dir = \"{}\"

# Working hours (local time) used to find free blocks:
# work_day_start = {}
# work_day_end = {}

# Meetings with at most this many participants (you included) can be moved:
# reschedulable_threshold = {}

# Focus block size to aim for, in minutes:
# min_focus_block_minutes = {}
# max_focus_block_minutes = {}

# Language model used by `focustime analyze --optimize`
# (the key can also be set with {}):
# api_key = \"sk-...\"
# llm_model = \"{}\"
# llm_base_url = \"{}\"
",
            DEFAULT_CALENDAR_DIR,
            defaults.work_day_start,
            defaults.work_day_end,
            defaults.reschedulable_threshold,
            defaults.min_focus_block_minutes,
            defaults.max_focus_block_minutes,
            API_KEY_ENV,
            DEFAULT_LLM_MODEL,
            DEFAULT_LLM_BASE_URL,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FocusError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| FocusError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Calendar directory with `~` expanded.
    pub fn calendar_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.calendar_dir.to_string_lossy()).into_owned())
    }

    /// The engine's view of this config.
    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            work_day_start: self.work_day_start,
            work_day_end: self.work_day_end,
            reschedulable_threshold: self.reschedulable_threshold,
            never_move_ids: self.never_move_event_ids.iter().cloned().collect(),
        }
    }

    /// Returns false if the event was already marked.
    pub fn add_never_move(&mut self, event_id: &str) -> bool {
        self.never_move_event_ids.insert(event_id.to_string())
    }

    /// Returns false if the event was not marked.
    pub fn remove_never_move(&mut self, event_id: &str) -> bool {
        self.never_move_event_ids.remove(event_id)
    }

    /// API key for the language model: config first, then `FOCUSTIME_API_KEY`.
    pub fn api_key(&self) -> FocusResult<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key(&self, from_env: Option<String>) -> FocusResult<String> {
        self.api_key
            .clone()
            .or(from_env)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                let location = Self::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "config.toml".to_string());
                FocusError::MissingApiKey(format!(
                    "No API key found. Please either:\n  \
                    1. Set the {} environment variable, or\n  \
                    2. Add api_key to {}",
                    API_KEY_ENV, location
                ))
            })
    }
}
