//! Token manager with single-flight refresh
//!
//! Owns the access token state for the client-credentials flow:
//! - Lazy fetch on first use
//! - Refresh once the token is within the expiry margin
//! - Forced refresh after the API rejects a token
//!
//! All reads and writes of the token state go through one async mutex. A fetch
//! holds the lock until the token endpoint answers, so concurrent callers wait
//! for the in-flight fetch and reuse its result instead of issuing their own.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::traits::OAuthClientTrait;
use super::types::{now_millis, TokenState};

/// Token manager with single-flight refresh
pub struct TokenManager<C: OAuthClientTrait + 'static> {
    oauth_client: Arc<C>,
    state: Mutex<TokenState>,
    expiry_margin_seconds: i64,
}

impl<C: OAuthClientTrait + 'static> TokenManager<C> {
    /// Create a new token manager
    ///
    /// # Arguments
    /// * `oauth_client` - Client used to reach the token endpoint
    /// * `expiry_margin_seconds` - Treat tokens as expired this many seconds
    ///   before their actual expiry
    #[must_use]
    pub fn new(oauth_client: C, expiry_margin_seconds: i64) -> Self {
        Self {
            oauth_client: Arc::new(oauth_client),
            state: Mutex::new(TokenState::default()),
            expiry_margin_seconds,
        }
    }

    /// Fetch a new access token unconditionally and store it
    ///
    /// # Errors
    /// Returns the token endpoint error; the previous state is kept on failure
    pub async fn fetch_access_token(&self) -> Result<String, C::Error> {
        let mut state = self.state.lock().await;
        self.fetch_locked(&mut state).await
    }

    /// Get a usable access token, fetching one if none is stored or the stored
    /// one is expired
    ///
    /// # Errors
    /// Returns the token endpoint error if a fetch was needed and failed
    pub async fn get_access_token(&self) -> Result<String, C::Error> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.valid_token(now_millis(), self.expiry_margin_seconds) {
            return Ok(token.to_string());
        }

        self.fetch_locked(&mut state).await
    }

    /// Replace a token the API rejected
    ///
    /// If another caller already replaced `rejected` with a still-valid token,
    /// that token is returned without contacting the token endpoint.
    ///
    /// # Errors
    /// Returns the token endpoint error if a fetch was needed and failed
    pub async fn refresh_rejected(&self, rejected: &str) -> Result<String, C::Error> {
        let mut state = self.state.lock().await;

        if let Some(current) = state.valid_token(now_millis(), self.expiry_margin_seconds) {
            if current != rejected {
                debug!("Rejected token already replaced by a concurrent refresh");
                return Ok(current.to_string());
            }
        }

        self.fetch_locked(&mut state).await
    }

    async fn fetch_locked(&self, state: &mut TokenState) -> Result<String, C::Error> {
        let response = self.oauth_client.request_token().await?;
        *state = TokenState::from_response(&response, now_millis());

        info!(expires_in = ?response.expires_in, "Fetched client-credentials access token");

        Ok(response.access_token)
    }

    /// Snapshot of the current token state
    pub async fn token_state(&self) -> TokenState {
        self.state.lock().await.clone()
    }
}
