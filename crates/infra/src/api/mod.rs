//! Pingdom API client
//!
//! Authenticated access to the Pingdom REST API.
//!
//! # Architecture
//!
//! - All HTTP, token fetches included, goes through [`RequestDispatcher`]
//!   on top of the single-attempt [`HttpClient`](crate::http::HttpClient)
//! - Bearer token from an [`AccessTokenProvider`]: static token or OAuth
//!   client credentials with expiry-driven refresh
//! - 403 responses retried with refreshed headers, bounded by
//!   `MAX_AUTH_RETRIES`
//! - Check CRUD on top of the generic `request`

pub mod auth;
mod checks;
pub mod client;
pub mod dispatch;
pub mod errors;

pub use auth::{
    AccessTokenProvider, ClientCredentialsProvider, StaticTokenProvider, TokenEndpoint,
};
pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use dispatch::RequestDispatcher;
pub use errors::{ApiError, ApiErrorCategory};
