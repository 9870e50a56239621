//! API-specific error types
//!
//! Every failure reaching a caller carries a string message. Error responses
//! use the response body, re-serialised as compact JSON, as that message.

use pingdom_domain::PingdomError;
use serde_json::Value;
use thiserror::Error;

/// Categories of API errors, for logging and caller-side policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403)
    Authentication,
    /// Client errors (4xx except auth)
    Client,
    /// Server errors (5xx) and success bodies of the wrong shape
    Server,
    /// No response received
    Network,
    /// Configuration or input errors raised before dispatch
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP response was received
    #[error("{0}")]
    Transport(String),

    /// An HTTP error response was received; `message` is the serialised body
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Serialised response body
        message: String,
    },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request could not be built from the given input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Body did not match the expected type
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build the error for a non-success response
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::Api { status, message: serialize_error_body(status, body) }
    }

    /// HTTP status of an error response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Api { status: 401 | 403, .. } => ApiErrorCategory::Authentication,
            Self::Api { status: 400..=499, .. } => ApiErrorCategory::Client,
            Self::Api { .. } | Self::Decode(_) => ApiErrorCategory::Server,
            Self::Transport(_) => ApiErrorCategory::Network,
            Self::Config(_) | Self::InvalidInput(_) => ApiErrorCategory::Config,
        }
    }
}

/// Message for an error response
///
/// JSON bodies are re-serialised compactly, other text becomes a JSON string
/// literal, and an empty body falls back to a generic status message.
pub fn serialize_error_body(status: u16, body: &str) -> String {
    if body.trim().is_empty() {
        return format!("Request failed with status code {status}");
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => value.to_string(),
        Err(_) => Value::String(body.to_string()).to_string(),
    }
}

/// Convert from the transport's PingdomError to ApiError
impl From<PingdomError> for ApiError {
    fn from(err: PingdomError) -> Self {
        match err {
            PingdomError::Network(message) => Self::Transport(message),
            PingdomError::Config(message) => Self::Config(message),
            PingdomError::InvalidInput(message) => Self::InvalidInput(message),
        }
    }
}
