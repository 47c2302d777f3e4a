//! Core error types and utilities

use thiserror::Error;

/// Core-specific error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// The route plan file could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The merged route plan breaks a field constraint
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Logging or the HTTP client could not be set up
    #[error("Initialization error: {0}")]
    InitializationError(String),
}

impl CoreError {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::ConfigurationError(_) => "CORE001",
            CoreError::ValidationError(_) => "CORE002",
            CoreError::InitializationError(_) => "CORE003",
        }
    }
}

/// Core-specific result type
pub type Result<T> = std::result::Result<T, CoreError>;
