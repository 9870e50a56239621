//! OAuth 2.0 client-credentials infrastructure
//!
//! Obtains bearer tokens for service-to-service access and keeps one current
//! token per client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenManager   │  Token state + single-flight refresh
//! └────────┬────────┘
//!          │
//!          └──► OAuthClientTrait  (token endpoint transport, supplied by the caller)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use pingdom_common::auth::{OAuthClientTrait, TokenManager};
//!
//! # async fn example<C: OAuthClientTrait + 'static>(endpoint: C) -> Result<(), C::Error> {
//! let manager = TokenManager::new(endpoint, 30);
//!
//! // Fetched on first use, reused until it nears expiry
//! let token = manager.get_access_token().await?;
//! println!("Bearer {token}");
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: `OAuthConfig`, `TokenResponse`, `TokenState`
//! - **[`token_manager`]**: Token lifecycle with single-flight refresh
//! - **[`traits`]**: Seam for mocking the token endpoint

pub mod token_manager;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use token_manager::TokenManager;
pub use traits::OAuthClientTrait;
pub use types::{now_millis, OAuthConfig, TokenResponse, TokenState};
