//! Error types shared by the planner core, the stores and the CLI.

use thiserror::Error;

/// Everything that can go wrong while loading, validating or mutating
/// planner data.
#[derive(Error, Debug)]
pub enum GanttError {
    /// A task row could not be turned into a typed [`crate::model::Task`].
    #[error("Invalid task data for '{task_id}': field '{field}' has value '{value}'")]
    InvalidTaskData {
        task_id: String,
        field: &'static str,
        value: String,
    },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Permission denied: {action}")]
    PermissionDenied { action: String },

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Authentication failed: {reason}")]
    Authentication { reason: String },

    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl GanttError {
    pub fn invalid_task(task_id: impl Into<String>, field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidTaskData {
            task_id: task_id.into(),
            field,
            value: value.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn denied(action: impl Into<String>) -> Self {
        Self::PermissionDenied {
            action: action.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GanttError>;
