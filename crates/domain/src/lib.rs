//! # Pingdom Domain
//!
//! Pure domain types for the Pingdom API client.
//!
//! This crate contains:
//! - The lower-layer error type and Result alias
//! - API defaults (base URL, version, retry ceiling)
//! - Request descriptions passed to the transport
//! - Check identifiers
//!
//! ## Architecture
//! - No dependencies on other Pingdom crates
//! - No I/O

pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use errors::*;
pub use types::*;
