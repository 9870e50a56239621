//! API client with bounded authorization retry
//!
//! Builds versioned URLs, attaches bearer credentials and hands requests to
//! the shared [`RequestDispatcher`]. A 403 response is retried with freshly
//! built headers up to `MAX_AUTH_RETRIES` times; every other failure is final.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use pingdom_common::auth::{OAuthConfig, TokenState};
use pingdom_domain::constants::{DEFAULT_API_URL, DEFAULT_API_VERSION};
use pingdom_domain::RequestSpec;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use super::auth::{AccessTokenProvider, ClientCredentialsProvider, StaticTokenProvider};
use super::dispatch::{bearer_headers, RequestDispatcher};
use super::errors::ApiError;
use crate::http::HttpClient;

/// Configuration for API client
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiClientConfig {
    /// API version segment (e.g., "3.1")
    pub version: String,
    /// Base URL without version (e.g., "https://api.pingdom.com/api")
    pub api_url: String,
    /// Pre-issued bearer token
    pub api_token: Option<String>,
    /// Emit request payloads and error bodies through [`ApiClient::log`]
    pub debug: bool,
    /// Client-credentials settings, used instead of `api_token`
    pub oauth: Option<OAuthConfig>,
    /// Per-request timeout in seconds; unbounded when unset
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_API_VERSION.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            debug: false,
            oauth: None,
            timeout_seconds: None,
        }
    }
}

impl fmt::Debug for ApiClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClientConfig")
            .field("version", &self.version)
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("debug", &self.debug)
            .field("oauth", &self.oauth)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ApiClientConfig {
    /// Default configuration authenticating with a pre-issued token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { api_token: Some(token.into()), ..Self::default() }
    }

    /// Default configuration authenticating through client credentials
    pub fn with_client_credentials(oauth: OAuthConfig) -> Self {
        Self { oauth: Some(oauth), ..Self::default() }
    }

    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Validate endpoint and credential settings
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` describing the first problem found
    pub fn validate(&self) -> Result<(), ApiError> {
        self.validate_endpoint()?;
        self.validate_credentials()
    }

    /// Check that `api_url` is an absolute http(s) URL and `version` is set
    pub fn validate_endpoint(&self) -> Result<(), ApiError> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| ApiError::Config(format!("invalid api_url '{}': {}", self.api_url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "api_url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.version.trim().is_empty() {
            return Err(ApiError::Config("version must not be empty".to_string()));
        }

        if self.timeout_seconds == Some(0) {
            return Err(ApiError::Config("timeout_seconds must be greater than zero".to_string()));
        }

        Ok(())
    }

    /// Exactly one credential source must be configured
    pub fn validate_credentials(&self) -> Result<(), ApiError> {
        match (&self.api_token, &self.oauth) {
            (Some(_), Some(_)) => Err(ApiError::Config(
                "configure either api_token or oauth client credentials, not both".to_string(),
            )),
            (None, None) => Err(ApiError::Config(
                "no credentials configured: set api_token or oauth client credentials"
                    .to_string(),
            )),
            (Some(token), None) if token.trim().is_empty() => {
                Err(ApiError::Config("api_token must not be empty".to_string()))
            }
            (None, Some(oauth)) => {
                if oauth.client_id.trim().is_empty() || oauth.client_secret.trim().is_empty() {
                    return Err(ApiError::Config(
                        "oauth client_id and client_secret must not be empty".to_string(),
                    ));
                }
                Url::parse(&oauth.auth_url).map_err(|e| {
                    ApiError::Config(format!("invalid auth_url '{}': {}", oauth.auth_url, e))
                })?;
                Ok(())
            }
            (Some(_), None) => Ok(()),
        }
    }

    fn token_provider(
        &self,
        dispatcher: &Arc<RequestDispatcher>,
    ) -> Result<Arc<dyn AccessTokenProvider>, ApiError> {
        self.validate_credentials()?;

        match (&self.api_token, &self.oauth) {
            (Some(token), None) => Ok(Arc::new(StaticTokenProvider::new(token.clone()))),
            (None, Some(oauth)) => {
                Ok(Arc::new(ClientCredentialsProvider::new(oauth.clone(), dispatcher.clone())))
            }
            _ => Err(ApiError::Config("no usable credential source".to_string())),
        }
    }
}

/// Pingdom API client
pub struct ApiClient {
    dispatcher: Arc<RequestDispatcher>,
    auth: Arc<dyn AccessTokenProvider>,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Create a new API client, deriving credentials from `config`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the configuration is invalid or the
    /// HTTP client cannot be built
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        config.validate_endpoint()?;
        let dispatcher = Self::dispatcher(&config)?;
        let auth = config.token_provider(&dispatcher)?;
        Ok(Self::assemble(config, dispatcher, auth))
    }

    /// Create a client with an injected token provider
    ///
    /// Credential fields of `config` are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the endpoint settings are invalid or the
    /// HTTP client cannot be built
    pub fn with_auth(
        config: ApiClientConfig,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ApiError> {
        config.validate_endpoint()?;
        let dispatcher = Self::dispatcher(&config)?;
        Ok(Self::assemble(config, dispatcher, auth))
    }

    fn dispatcher(config: &ApiClientConfig) -> Result<Arc<RequestDispatcher>, ApiError> {
        let http_client = HttpClient::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))?;

        Ok(Arc::new(RequestDispatcher::new(http_client, config.debug)))
    }

    fn assemble(
        config: ApiClientConfig,
        dispatcher: Arc<RequestDispatcher>,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        debug!(config = ?config, "API client created");
        Self { dispatcher, auth, config }
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Configuration the client was built with
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Full URL for `path`: `{api_url}/{version}{path}`
    ///
    /// Plain concatenation; `path` is expected to start with `/`.
    pub fn get_api_url(&self, path: &str) -> String {
        format!("{}/{}{}", self.config.api_url, self.config.version, path)
    }

    /// Headers carrying the current bearer token
    ///
    /// # Errors
    ///
    /// Returns the token provider's error if no token can be obtained
    pub async fn get_api_headers(&self) -> Result<BTreeMap<String, String>, ApiError> {
        let token = self.auth.access_token().await?;
        Ok(bearer_headers(&token))
    }

    /// Emit `data` on the `pingdom::debug` target when debug output is
    /// enabled
    pub fn log<T: fmt::Debug + ?Sized>(&self, data: &T) {
        self.dispatcher.log(data);
    }

    /// Fetch a new OAuth access token and store it with its expiry
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` when the client uses a static token, or the
    /// token endpoint failure classified like any API failure
    #[instrument(skip(self))]
    pub async fn get_access_token(&self) -> Result<String, ApiError> {
        let token = self.auth.fetch_access_token().await?;
        info!("Access token fetched");
        Ok(token)
    }

    /// Stored token and expiry, when the client manages its own token
    pub async fn token_state(&self) -> Option<TokenState> {
        self.auth.token_state().await
    }

    /// Dispatch `spec`, retrying a 403 with refreshed headers
    ///
    /// Returns the parsed JSON body of the first successful response. An
    /// empty body is `Value::Null` and a body that is not JSON is returned
    /// as `Value::String`.
    ///
    /// # Errors
    ///
    /// - `ApiError::Transport` if no response was received (never retried)
    /// - `ApiError::Api` for any other error response, or the last 403
    #[instrument(skip(self, spec), fields(method = %spec.method, url = %spec.url))]
    pub async fn request(&self, spec: RequestSpec) -> Result<Value, ApiError> {
        self.dispatcher.send(spec, Some(self.auth.as_ref())).await
    }

    /// [`request`](Self::request), deserialising the body into `T`
    ///
    /// # Errors
    ///
    /// As [`request`](Self::request), plus `ApiError::Decode` when the body
    /// does not fit `T`
    pub async fn request_as<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, ApiError> {
        let value = self.request(spec).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the authentication provider, overriding configured credentials
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or provides no
    /// credentials and no provider was set
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();

        match self.auth {
            Some(auth) => ApiClient::with_auth(config, auth),
            None => ApiClient::new(config),
        }
    }
}
