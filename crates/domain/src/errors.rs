//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for ThreadPilot
///
/// Only a missing primary record (`NotFound`) or a malformed identifier
/// (`InvalidInput`) reach API callers in normal operation. Failures of the
/// vehicle lookup are absorbed into [`crate::Enrichment::Unavailable`] and
/// never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ThreadPilotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for ThreadPilot operations
pub type Result<T> = std::result::Result<T, ThreadPilotError>;
