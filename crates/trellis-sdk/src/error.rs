//! SDK Error Types
//!
//! Defines error types for the Trellis SDK.

use thiserror::Error;

/// SDK Result type alias
pub type SdkResult<T> = Result<T, SdkError>;

/// SDK errors
#[derive(Debug, Error)]
pub enum SdkError {
    /// Registry or context error from the core crate
    #[error("core error: {0}")]
    Core(#[from] trellis_core::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigValidationError),

    /// Container builder error
    #[error("builder error: {0}")]
    Builder(#[from] crate::container::BuilderError),

    /// Invalid operation
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl SdkError {
    /// Create an invalid operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Check if this error is an invalid operation error
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation { .. })
    }
}
