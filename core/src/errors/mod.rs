//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

// Re-export all error types and utilities
pub use types::ValidationError;

use thiserror::Error;

/// Core domain errors
///
/// "Not found" is deliberately absent: lookups resolve to `Ok(None)`.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to field-level validation errors
    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    /// Stable machine-readable code for the error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } | DomainError::ValidationErr(_) => "VALIDATION_ERROR",
            DomainError::Storage { .. } => "STORAGE_ERROR",
            DomainError::Encode { .. } => "ENCODE_ERROR",
            DomainError::Decode { .. } => "DECODE_ERROR",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Whether the error was caused by caller input
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation { .. } | DomainError::ValidationErr(_))
    }

    /// Whether the error originates from the backing store
    pub fn is_storage(&self) -> bool {
        matches!(self, DomainError::Storage { .. })
    }

    /// Whether the error means a persisted record could not be read back
    pub fn is_decode(&self) -> bool {
        matches!(self, DomainError::Decode { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
