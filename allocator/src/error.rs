//! Allocator-specific error types

use shared::{AssignmentId, AssignmentStatus, RunId, SharedError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocatorError {
    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Cannot {action} assignment {assignment_id} while {status}: {reason}")]
    InvalidTransition {
        assignment_id: AssignmentId,
        action: String,
        status: AssignmentStatus,
        reason: String,
    },

    #[error("Assignment not found: {assignment_id}")]
    AssignmentNotFound { assignment_id: AssignmentId },

    #[error("Assignment belongs to run {found}, current run is {expected}")]
    StaleRun { expected: RunId, found: RunId },

    #[error("No allocation run has been stored yet")]
    NoActiveRun,

    #[error("CSV error at line {line}: {message}")]
    CsvError { line: usize, message: String },

    #[error("File system operation failed: {operation} on {path}")]
    FileSystemError {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid record: {0}")]
    Shared(#[from] SharedError),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AllocatorError {
    pub fn config(field: impl Into<String>) -> Self {
        Self::ConfigurationError { field: field.into() }
    }

    pub fn fs(operation: &str, path: &std::path::Path, source: std::io::Error) -> Self {
        Self::FileSystemError {
            operation: operation.to_string(),
            path: path.display().to_string(),
            source,
        }
    }

    /// True for errors caused by the shape of caller-supplied input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AllocatorError::ConfigurationError { .. }
                | AllocatorError::Shared(_)
                | AllocatorError::CsvError { .. }
        )
    }
}

pub type AllocatorResult<T> = Result<T, AllocatorError>;
