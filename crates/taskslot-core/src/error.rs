//! Core error types for taskslot-core.
//!
//! Per-task scheduling failures are not errors: they are recorded in the
//! [`ScheduleReport`](crate::scheduler::ScheduleReport). The types here cover
//! everything that can stop an operation outright.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for taskslot-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Calendar collaborator errors
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors raised by a [`CalendarProvider`](crate::integrations::CalendarProvider).
#[derive(Error, Debug)]
pub enum CalendarError {
    /// Transport-level failure talking to the calendar service
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error payload
    #[error("Calendar API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// An event in a listing could not be interpreted
    #[error("Malformed event '{summary}': {message}")]
    MalformedEvent { summary: String, message: String },

    /// No usable access token was supplied
    #[error("Not authenticated with {service}")]
    NotAuthenticated { service: String },

    /// The collaborator refused to create an event
    #[error("Event '{title}' was rejected: {message}")]
    WriteRejected { title: String, message: String },

    /// The configured endpoint is not a usable URL
    #[error("Invalid calendar endpoint '{0}'")]
    InvalidEndpoint(String),

    /// The blocking runtime could not be created
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be greater than start ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::FixedOffset>,
        end: chrono::DateTime<chrono::FixedOffset>,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
