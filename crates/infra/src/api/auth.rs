//! Access-token strategies for API requests
//!
//! The client never reads credentials directly. It asks an
//! [`AccessTokenProvider`] for the bearer token to attach, and asks again,
//! naming the rejected token, after the API answers 403.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use pingdom_common::auth::{
    OAuthClientTrait, OAuthConfig, TokenManager, TokenResponse, TokenState,
};
use pingdom_domain::constants::TOKEN_EXPIRY_MARGIN_SECS;
use tracing::{debug, instrument};

use super::dispatch::RequestDispatcher;
use super::errors::ApiError;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token
    ///
    /// This method should handle token refresh if needed.
    async fn access_token(&self) -> Result<String, ApiError>;

    /// Get a token to replace `rejected`, which the API refused
    ///
    /// Providers that cannot refresh hand back their current token.
    async fn refresh_access_token(&self, rejected: &str) -> Result<String, ApiError> {
        let _ = rejected;
        self.access_token().await
    }

    /// Fetch a fresh token from the token endpoint, unconditionally
    async fn fetch_access_token(&self) -> Result<String, ApiError> {
        Err(ApiError::Config("access token fetch requires OAuth client credentials".to_string()))
    }

    /// Stored token and expiry, for providers that keep one
    async fn token_state(&self) -> Option<TokenState> {
        None
    }
}

/// Pre-issued API token, sent as-is on every request
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Provider that always hands out `token`
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, ApiError> {
        Ok(self.token.clone())
    }
}

/// Token endpoint reached through the shared dispatcher
///
/// The token request gets the same debug logging and 403 handling as API
/// calls. It carries no bearer token, so a 403 resends it unchanged.
pub struct TokenEndpoint {
    dispatcher: Arc<RequestDispatcher>,
    config: OAuthConfig,
}

impl TokenEndpoint {
    /// Endpoint described by `config`, sent through `dispatcher`
    pub fn new(config: OAuthConfig, dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { dispatcher, config }
    }
}

#[async_trait]
impl OAuthClientTrait for TokenEndpoint {
    type Error = ApiError;

    #[instrument(skip(self), fields(auth_url = %self.config.auth_url))]
    async fn request_token(&self) -> Result<TokenResponse, ApiError> {
        let body = self.dispatcher.send(self.config.token_request(), None).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// OAuth client-credentials tokens with expiry-driven refresh
pub struct ClientCredentialsProvider {
    manager: TokenManager<TokenEndpoint>,
}

impl ClientCredentialsProvider {
    /// Create a provider for `config`
    ///
    /// # Arguments
    ///
    /// * `config` - Client id, secret, token endpoint and scope
    /// * `dispatcher` - Transport shared with the API client; its timeout
    ///   and debug setting apply to token requests
    pub fn new(config: OAuthConfig, dispatcher: Arc<RequestDispatcher>) -> Self {
        let endpoint = TokenEndpoint::new(config, dispatcher);
        Self { manager: TokenManager::new(endpoint, TOKEN_EXPIRY_MARGIN_SECS) }
    }
}

#[async_trait]
impl AccessTokenProvider for ClientCredentialsProvider {
    async fn access_token(&self) -> Result<String, ApiError> {
        self.manager.get_access_token().await
    }

    async fn refresh_access_token(&self, rejected: &str) -> Result<String, ApiError> {
        debug!("Refreshing rejected access token");
        self.manager.refresh_rejected(rejected).await
    }

    async fn fetch_access_token(&self) -> Result<String, ApiError> {
        self.manager.fetch_access_token().await
    }

    async fn token_state(&self) -> Option<TokenState> {
        Some(self.manager.token_state().await)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::HttpClient;

    fn oauth_config(server: &MockServer) -> OAuthConfig {
        OAuthConfig::new("id", "secret", format!("{}/oauth/token", server.uri()), "checks")
    }

    fn provider_for(server: &MockServer) -> ClientCredentialsProvider {
        let dispatcher = Arc::new(RequestDispatcher::new(HttpClient::new().unwrap(), false));
        ClientCredentialsProvider::new(oauth_config(server), dispatcher)
    }

    #[tokio::test]
    async fn test_static_provider_returns_token() {
        let provider = StaticTokenProvider::new("abc123");

        assert_eq!(provider.access_token().await.unwrap(), "abc123");
        assert_eq!(provider.refresh_access_token("abc123").await.unwrap(), "abc123");
        assert!(provider.token_state().await.is_none());
    }

    #[tokio::test]
    async fn test_static_provider_cannot_fetch() {
        let provider = StaticTokenProvider::new("abc123");

        let result = provider.fetch_access_token().await;
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_static_provider_debug_hides_token() {
        let rendered = format!("{:?}", StaticTokenProvider::new("abc123"));
        assert!(!rendered.contains("abc123"));
    }

    #[tokio::test]
    async fn test_client_credentials_provider_caches_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "T", "expires_in": 3600})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);

        assert_eq!(provider.access_token().await.unwrap(), "T");
        assert_eq!(provider.access_token().await.unwrap(), "T");

        let state = provider.token_state().await.unwrap();
        assert_eq!(state.access_token.as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn test_client_credentials_provider_maps_endpoint_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);

        let err = provider.fetch_access_token().await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), r#"{"error":"invalid_client"}"#);
    }

    #[tokio::test]
    async fn test_token_endpoint_text_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);

        let result = provider.fetch_access_token().await;
        assert!(matches!(result, Err(ApiError::Decode(_))));
        assert_eq!(provider.token_state().await.unwrap(), TokenState::default());
    }

    #[tokio::test]
    async fn test_token_endpoint_accepts_string_lifetime() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "T", "expires_in": "3600"})),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);

        assert_eq!(provider.fetch_access_token().await.unwrap(), "T");
        let state = provider.token_state().await.unwrap();
        assert!(state.access_token_expired_at.is_some());
    }
}
