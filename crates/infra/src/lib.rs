//! # Pingdom Infrastructure
//!
//! I/O side of the Pingdom client.
//!
//! This crate contains:
//! - The HTTP transport (`reqwest`)
//! - The authenticated API client and check operations
//! - Access token providers (static token, OAuth client credentials)
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Depends on `pingdom-domain` and `pingdom-common`
//! - Contains all "impure" code (network, environment, files)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod logging;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientConfig, ApiError};
pub use http::{HttpClient, HttpResponse};
