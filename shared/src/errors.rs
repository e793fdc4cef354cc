//! Shared error types for stocktake records

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SharedError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidField { field: String, value: String },

    #[error("Duplicate {field}: {value}")]
    DuplicateKey { field: String, value: String },

    #[error("Unknown priority: {input}")]
    UnknownPriority { input: String },

    #[error("Invalid UUID: {input}")]
    InvalidUuid { input: String },
}

impl SharedError {
    pub fn invalid(field: &str, value: impl ToString) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Name of the offending field, if the error is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            SharedError::MissingField { field }
            | SharedError::InvalidField { field, .. }
            | SharedError::DuplicateKey { field, .. } => Some(field),
            SharedError::UnknownPriority { .. } => Some("priority"),
            SharedError::InvalidUuid { .. } => None,
        }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
