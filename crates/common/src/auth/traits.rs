//! Traits for OAuth token operations
//!
//! Abstracts the token endpoint so the token manager stays transport-agnostic
//! and can be tested with mock implementations.

use async_trait::async_trait;

use super::types::TokenResponse;

/// Trait for OAuth client operations
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Failure reported by the token endpoint or the transport reaching it
    type Error: std::error::Error + Send + Sync + 'static;

    /// Request a new access token from the token endpoint
    ///
    /// # Errors
    /// Returns error if the request fails, the endpoint answers with a
    /// non-success status, or the response cannot be parsed
    async fn request_token(&self) -> Result<TokenResponse, Self::Error>;
}
