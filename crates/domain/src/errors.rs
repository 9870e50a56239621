//! Error types used by the lower layers of the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for transport and configuration plumbing
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PingdomError {
    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// No usable response from the remote side
    #[error("Network error: {0}")]
    Network(String),

    /// A request could not be built from the given input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Pingdom operations
pub type Result<T> = std::result::Result<T, PingdomError>;
