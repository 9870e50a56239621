//! Request dispatch with bounded 403 retry
//!
//! Every outgoing request, API call or token fetch, goes through
//! [`RequestDispatcher::send`]: debug logging of the redacted request, a
//! single transport attempt per loop turn, and up to [`MAX_AUTH_RETRIES`]
//! resends after a 403.

use std::collections::BTreeMap;
use std::fmt;

use pingdom_domain::constants::MAX_AUTH_RETRIES;
use pingdom_domain::RequestSpec;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::auth::AccessTokenProvider;
use super::errors::ApiError;
use crate::http::{HttpClient, HttpResponse};
use crate::logging::error_label;

const BEARER_PREFIX: &str = "Bearer ";

/// Target of the debug-gated payload log
pub const DEBUG_LOG_TARGET: &str = "pingdom::debug";

/// Shared transport, debug switch and retry loop
pub struct RequestDispatcher {
    http_client: HttpClient,
    debug: bool,
}

impl RequestDispatcher {
    /// Wrap `http_client`; `debug` enables [`log`](Self::log) output
    pub fn new(http_client: HttpClient, debug: bool) -> Self {
        Self { http_client, debug }
    }

    /// Emit `data` on the debug target when debug output is enabled
    pub fn log<T: fmt::Debug + ?Sized>(&self, data: &T) {
        if self.debug {
            info!(target: DEBUG_LOG_TARGET, "{:?}", data);
        }
    }

    /// Send `spec`, resending after a 403 at most [`MAX_AUTH_RETRIES`] times
    ///
    /// With an `auth` provider the `Authorization` header is rebuilt from a
    /// refreshed token before each resend; without one the request is resent
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - `ApiError::Transport` if no response was received (never retried)
    /// - `ApiError::Api` for any other error response, or the last 403
    /// - the provider's error if a refreshed token cannot be obtained
    pub async fn send(
        &self,
        mut spec: RequestSpec,
        auth: Option<&dyn AccessTokenProvider>,
    ) -> Result<Value, ApiError> {
        let mut attempt: u32 = 0;

        loop {
            self.log(&spec.redacted());

            let response = self.http_client.execute(&spec).await.map_err(|err| {
                let err = ApiError::from(err);
                warn!(
                    error = %err,
                    category = error_label(&err),
                    "Request failed without a response"
                );
                err
            })?;

            if response.is_success() {
                debug!(status = response.status, attempt, "Request successful");
                return Ok(parse_body(&response));
            }

            if response.status == 403 && attempt < MAX_AUTH_RETRIES {
                attempt += 1;
                self.log("Retry for 403");
                warn!(attempt, max_retries = MAX_AUTH_RETRIES, "Got 403, retrying");
                if let Some(auth) = auth {
                    refresh_authorization(&mut spec, auth).await?;
                }
                continue;
            }

            self.log(&response.body);
            let err = ApiError::from_response(response.status, &response.body);
            warn!(
                status = response.status,
                attempt,
                category = error_label(&err),
                "Request returned error status"
            );
            return Err(err);
        }
    }
}

/// `Authorization: Bearer <token>` as a header map
pub(crate) fn bearer_headers(token: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("Authorization".to_string(), format!("{BEARER_PREFIX}{token}"))])
}

async fn refresh_authorization(
    spec: &mut RequestSpec,
    auth: &dyn AccessTokenProvider,
) -> Result<(), ApiError> {
    let rejected = spec
        .headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(AUTHORIZATION.as_str()))
        .and_then(|(_, value)| value.strip_prefix(BEARER_PREFIX))
        .unwrap_or_default()
        .to_string();

    let token = auth.refresh_access_token(&rejected).await?;

    let mut headers: BTreeMap<String, String> = spec
        .headers
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case(AUTHORIZATION.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    headers.extend(bearer_headers(&token));
    spec.replace_headers(headers);

    Ok(())
}

/// JSON when the body parses, `Null` when empty, the raw text otherwise
fn parse_body(response: &HttpResponse) -> Value {
    if response.body.trim().is_empty() {
        return Value::Null;
    }

    serde_json::from_str(&response.body).unwrap_or_else(|_| Value::String(response.body.clone()))
}
