//! CLI error types

use council_runtime::EventLogError;
use council_types::CouncilError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Rejected council operation
    #[error("Council error: {0}")]
    Council(#[from] CouncilError),

    #[error("Event log error: {0}")]
    EventLog(#[from] EventLogError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
