//! CLI error types

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// A flag value was rejected
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The route plan file is missing
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Route plan resolution or startup failed in the core
    #[error("Core error: {0}")]
    CoreError(#[from] routeprobe_core::CoreError),

    /// Writing the report failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CliError {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            CliError::InvalidArgument(_) => "CLI002",
            CliError::ConfigError(_) => "CLI003",
            CliError::CoreError(_) => "CLI006",
            CliError::IoError(_) => "CLI008",
        }
    }
}

/// CLI-specific result type
pub type Result<T> = std::result::Result<T, CliError>;
