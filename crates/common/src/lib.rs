//! # Pingdom Common
//!
//! Shared runtime plumbing for the Pingdom client.
//!
//! - **[`auth`]**: OAuth 2.0 client-credentials flow and access token
//!   lifecycle

pub mod auth;
