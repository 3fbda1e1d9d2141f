use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("weekday {weekday} is out of range (expected 0=Sunday..6=Saturday)")]
    InvalidWeekday { weekday: u32 },

    #[error("collaborator `{source_name}` failed: {message}")]
    Collaborator {
        source_name: String,
        message: String,
    },

    #[error("visible week changed while fetching: expected {expected}, found {actual}")]
    WeekMismatch { expected: String, actual: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation {
            message,
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, details = %details, "validation error with details");
        AppError::Validation {
            message,
            details: Some(details),
        }
    }

    pub fn invalid_weekday(weekday: u32) -> Self {
        error!(target: "app::capacity", weekday, "weekday outside 0..=6");
        AppError::InvalidWeekday { weekday }
    }

    pub fn collaborator(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        let source_name = source_name.into();
        let message = message.into();
        error!(target: "app::collaborator", %source_name, %message, "collaborator failed");
        AppError::Collaborator {
            source_name,
            message,
        }
    }

    pub fn week_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        warn!(target: "app::recommendation", %expected, %actual, "week changed mid-fetch");
        AppError::WeekMismatch { expected, actual }
    }

    pub fn config(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::settings", %message, "configuration error");
        AppError::Config { message }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation { .. } | AppError::InvalidWeekday { .. })
    }

    pub fn details(&self) -> Option<&JsonValue> {
        match self {
            AppError::Validation { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}
