//! Error types for tempo
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown category, missing task)
//! - 4: Operation failed (io, serialization)

use thiserror::Error;

/// Exit codes for the tempo CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tempo operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Sub-task not found on {task}: {subtask}")]
    SubtaskNotFound { task: String, subtask: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::UnknownCategory(_)
            | Error::TaskNotFound(_)
            | Error::SubtaskNotFound { .. }
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::InvalidDate(_) => exit_codes::USER_ERROR,

            // Operation failures
            Error::Io(_)
            | Error::Csv(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured detail payload for JSON error envelopes
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::SubtaskNotFound { task, subtask } => Some(serde_json::json!({
                "task": task,
                "subtask": subtask,
            })),
            _ => None,
        }
    }
}

/// Result type alias for tempo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
