//! API constants
//!
//! Defaults and fixed limits shared by every layer of the client.

/// Base URL, without the version segment
pub const DEFAULT_API_URL: &str = "https://api.pingdom.com/api";
/// Version segment inserted after the base URL
pub const DEFAULT_API_VERSION: &str = "3.1";

/// A 403 is retried this many times (3 attempts total)
pub const MAX_AUTH_RETRIES: u32 = 2;

/// `grant_type` of the token request
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";
/// Content type of the token request
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Seconds before expiry at which a cached access token is treated as stale
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;

/// Collection path of checks
pub const CHECKS_PATH: &str = "/checks";
