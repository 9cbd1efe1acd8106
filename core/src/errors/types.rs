//! Field-level validation errors for token requests

use thiserror::Error;

/// Validation errors raised before any store I/O happens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field required: {field}")]
    RequiredField { field: String },

    #[error("Invalid format for field: {field}")]
    InvalidFormat { field: String },

    #[error("Malformed token: {reason}")]
    MalformedToken { reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::RequiredField { field: field.into() }
    }

    pub fn invalid_format(field: impl Into<String>) -> Self {
        ValidationError::InvalidFormat { field: field.into() }
    }

    pub fn malformed_token(reason: impl Into<String>) -> Self {
        ValidationError::MalformedToken { reason: reason.into() }
    }
}
