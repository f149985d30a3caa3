//! Error types for focustime.

use thiserror::Error;

/// Errors that can occur outside the analysis engine (config, event loading, recommendations).
#[derive(Error, Debug)]
pub enum FocusError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("{0}")]
    MissingApiKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for focustime operations.
pub type FocusResult<T> = Result<T, FocusError>;
