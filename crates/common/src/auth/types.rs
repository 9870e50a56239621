//! OAuth 2.0 client-credentials types
//!
//! Configuration for the token endpoint, the token endpoint's response, and
//! the in-memory token state derived from it.

use std::fmt;

use chrono::Utc;
use pingdom_domain::constants::{CLIENT_CREDENTIALS_GRANT, FORM_CONTENT_TYPE};
use pingdom_domain::RequestSpec;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Client-credentials configuration for the token endpoint
///
/// The secret is skipped by `Debug` so configs can be logged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Token endpoint URL (full URL, e.g. `https://auth.example.com/oauth/token`)
    pub auth_url: String,

    /// Requested scope (sent verbatim)
    pub scope: String,
}

impl OAuthConfig {
    /// Create a new client-credentials configuration
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        auth_url: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: auth_url.into(),
            scope: scope.into(),
        }
    }

    /// Form fields of the token request, in the order they are sent
    #[must_use]
    pub fn token_form(&self) -> Vec<(String, String)> {
        vec![
            ("grant_type".to_string(), CLIENT_CREDENTIALS_GRANT.to_string()),
            ("client_id".to_string(), self.client_id.clone()),
            ("client_secret".to_string(), self.client_secret.clone()),
            ("scope".to_string(), self.scope.clone()),
        ]
    }

    /// The token request: form-encoded `POST auth_url`
    #[must_use]
    pub fn token_request(&self) -> RequestSpec {
        RequestSpec::post(self.auth_url.clone())
            .header("Content-Type", FORM_CONTENT_TYPE)
            .form(self.token_form())
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_url", &self.auth_url)
            .field("scope", &self.scope)
            .finish()
    }
}

/// OAuth token response from the token endpoint
///
/// Standard OAuth 2.0 token response format (RFC 6749 §5.1). Only
/// `access_token` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer token to attach to API requests
    pub access_token: String,

    /// Access token lifetime in seconds; numeric strings and fractions are
    /// accepted
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub expires_in: Option<f64>,

    /// Token type, usually `Bearer`
    #[serde(default)]
    pub token_type: Option<String>,

    /// Granted scope
    #[serde(default)]
    pub scope: Option<String>,
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(other) => return Err(D::Error::custom(format!("invalid expires_in: {other}"))),
    };

    match seconds {
        Some(seconds) if seconds.is_finite() => Ok(Some(seconds)),
        _ => Err(D::Error::custom("expires_in is not a finite number")),
    }
}

/// Current access token and its absolute expiry
///
/// `access_token_expired_at` is in milliseconds since the Unix epoch. Both
/// fields are `None` until the first successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    /// Last token issued by the token endpoint
    pub access_token: Option<String>,
    /// Expiry of `access_token`, ms since the Unix epoch
    pub access_token_expired_at: Option<i64>,
}

impl TokenState {
    /// Build state from a token response received at `now_ms`
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_response(response: &TokenResponse, now_ms: i64) -> Self {
        Self {
            access_token: Some(response.access_token.clone()),
            access_token_expired_at: response
                .expires_in
                .map(|seconds| now_ms.saturating_add((seconds * 1000.0).round() as i64)),
        }
    }

    /// Check if the token is missing, expired, or expires within
    /// `margin_seconds` of `now_ms`
    ///
    /// A token without an expiry never expires.
    #[must_use]
    pub fn is_expired(&self, now_ms: i64, margin_seconds: i64) -> bool {
        if self.access_token.is_none() {
            return true;
        }
        match self.access_token_expired_at {
            Some(expired_at) => {
                now_ms.saturating_add(margin_seconds.saturating_mul(1000)) >= expired_at
            }
            None => false,
        }
    }

    /// The stored token, if it is still usable at `now_ms`
    #[must_use]
    pub fn valid_token(&self, now_ms: i64, margin_seconds: i64) -> Option<&str> {
        if self.is_expired(now_ms, margin_seconds) {
            None
        } else {
            self.access_token.as_deref()
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
