//! Outgoing request description
//!
//! A [`RequestSpec`] is built per call by the API layer and handed to the
//! transport. It is never persisted. Retries reuse the same spec with fresh
//! headers, so method, URL and body stay identical across attempts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const AUTHORIZATION: &str = "Authorization";
const REDACTED: &str = "<redacted>";

/// HTTP methods used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
}

impl HttpMethod {
    /// Method name as sent on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RequestBody {
    /// Sent as `application/json`
    Json(Value),
    /// Sent as `application/x-www-form-urlencoded`, fields in order
    Form(Vec<(String, String)>),
}

/// Method, URL, headers and optional body of a single API call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// Header names and values, sent as-is
    pub headers: BTreeMap<String, String>,
    /// Optional payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
}

impl RequestSpec {
    /// Request without headers or body
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: BTreeMap::new(), body: None }
    }

    /// `GET url`
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// `POST url`
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// `PUT url`
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    /// Replace all headers.
    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Add or overwrite a single header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Set a form body, fields sent in order
    #[must_use]
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }

    /// Swap in a fresh header set, leaving method, URL and body untouched.
    pub fn replace_headers(&mut self, headers: BTreeMap<String, String>) {
        self.headers = headers;
    }

    /// Copy of this spec that is safe to log: the `Authorization` header and
    /// the `client_secret` form field are masked.
    pub fn redacted(&self) -> Self {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(AUTHORIZATION) {
                    (name.clone(), REDACTED.to_string())
                } else {
                    (name.clone(), value.clone())
                }
            })
            .collect();

        let body = self.body.as_ref().map(|body| match body {
            RequestBody::Form(fields) => RequestBody::Form(
                fields
                    .iter()
                    .map(|(key, value)| {
                        if key == "client_secret" {
                            (key.clone(), REDACTED.to_string())
                        } else {
                            (key.clone(), value.clone())
                        }
                    })
                    .collect(),
            ),
            RequestBody::Json(value) => RequestBody::Json(value.clone()),
        });

        Self { method: self.method, url: self.url.clone(), headers, body }
    }
}

impl fmt::Display for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
