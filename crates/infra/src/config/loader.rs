//! Configuration loader
//!
//! Loads API client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the environment, if one exists
//! 2. Attempts to load from environment variables
//! 3. If no credential variable is set at all, falls back to loading from
//!    file; otherwise environment errors are returned as-is
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PINGDOM_API_URL`: Base URL (default `https://api.pingdom.com/api`)
//! - `PINGDOM_API_VERSION`: Version segment (default `3.1`)
//! - `PINGDOM_API_TOKEN`: Pre-issued bearer token
//! - `PINGDOM_DEBUG`: Debug output (true/false)
//! - `PINGDOM_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `PINGDOM_CLIENT_ID`, `PINGDOM_CLIENT_SECRET`, `PINGDOM_AUTH_URL`,
//!   `PINGDOM_SCOPE`: OAuth client credentials (all four or none)
//!
//! ## File Locations
//! The loader checks the following paths (in order):
//! 1. `./pingdom.json` or `./pingdom.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use pingdom_common::auth::OAuthConfig;
use pingdom_domain::{PingdomError, Result};

use crate::api::ApiClientConfig;

const OAUTH_VARS: [&str; 4] =
    ["PINGDOM_CLIENT_ID", "PINGDOM_CLIENT_SECRET", "PINGDOM_AUTH_URL", "PINGDOM_SCOPE"];

const CONFIG_FILE_NAMES: [&str; 4] = ["pingdom.json", "pingdom.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `PingdomError::Config` if:
/// - Credential variables are set but invalid or incomplete
/// - No credential variable is set and no usable config file exists
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<ApiClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    if !credentials_in_env() {
        tracing::debug!("No credentials in environment, trying file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Whether any credential variable is set
fn credentials_in_env() -> bool {
    std::iter::once("PINGDOM_API_TOKEN").chain(OAUTH_VARS).any(|key| env_opt(key).is_some())
}

/// Load configuration from environment variables
///
/// Either `PINGDOM_API_TOKEN` or the full OAuth group must be present;
/// everything else falls back to its default.
///
/// # Errors
/// Returns `PingdomError::Config` if no credentials are set, the OAuth group
/// is incomplete, or a value is invalid.
pub fn load_from_env() -> Result<ApiClientConfig> {
    let defaults = ApiClientConfig::default();

    let api_url = env_opt("PINGDOM_API_URL").unwrap_or(defaults.api_url);
    let version = env_opt("PINGDOM_API_VERSION").unwrap_or(defaults.version);
    let api_token = env_opt("PINGDOM_API_TOKEN");
    let debug = env_bool("PINGDOM_DEBUG", false);

    let timeout_seconds = env_opt("PINGDOM_TIMEOUT_SECS")
        .map(|s| {
            s.parse::<u64>()
                .map_err(|e| PingdomError::Config(format!("Invalid timeout seconds: {}", e)))
        })
        .transpose()?;

    let oauth = oauth_from_env()?;

    if api_token.is_none() && oauth.is_none() {
        return Err(PingdomError::Config(format!(
            "Missing required environment variable: PINGDOM_API_TOKEN or {}",
            OAUTH_VARS.join(", ")
        )));
    }

    let config = ApiClientConfig { version, api_url, api_token, debug, oauth, timeout_seconds };
    validated(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `PingdomError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ApiClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PingdomError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            PingdomError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PingdomError::Config(format!("Failed to read config file: {}", e)))?;

    validated(parse_config(&contents, &config_path)?)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ApiClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PingdomError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PingdomError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(PingdomError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Search the standard paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn validated(config: ApiClientConfig) -> Result<ApiClientConfig> {
    config.validate().map_err(|e| PingdomError::Config(e.to_string()))?;
    Ok(config)
}

/// OAuth group from the environment: all four variables, or none
fn oauth_from_env() -> Result<Option<OAuthConfig>> {
    let values: Vec<Option<String>> = OAUTH_VARS.iter().map(|key| env_opt(key)).collect();

    match values.as_slice() {
        [Some(client_id), Some(client_secret), Some(auth_url), Some(scope)] => {
            Ok(Some(OAuthConfig::new(client_id, client_secret, auth_url, scope)))
        }
        [None, None, None, None] => Ok(None),
        _ => {
            let missing: Vec<&str> = OAUTH_VARS
                .iter()
                .zip(&values)
                .filter(|(_, value)| value.is_none())
                .map(|(key, _)| *key)
                .collect();
            Err(PingdomError::Config(format!(
                "Incomplete OAuth configuration, missing: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Optional environment variable; empty values count as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 9] = [
        "PINGDOM_API_URL",
        "PINGDOM_API_VERSION",
        "PINGDOM_API_TOKEN",
        "PINGDOM_DEBUG",
        "PINGDOM_TIMEOUT_SECS",
        "PINGDOM_CLIENT_ID",
        "PINGDOM_CLIENT_SECRET",
        "PINGDOM_AUTH_URL",
        "PINGDOM_SCOPE",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("TEST_PINGDOM_BOOL_ON", "on");
        std::env::set_var("TEST_PINGDOM_BOOL_UPPER", "TRUE");
        std::env::set_var("TEST_PINGDOM_BOOL_OFF", "off");

        assert!(env_bool("TEST_PINGDOM_BOOL_ON", false));
        assert!(env_bool("TEST_PINGDOM_BOOL_UPPER", false));
        assert!(!env_bool("TEST_PINGDOM_BOOL_OFF", true));

        std::env::remove_var("TEST_PINGDOM_BOOL_MISSING");
        assert!(env_bool("TEST_PINGDOM_BOOL_MISSING", true));

        std::env::remove_var("TEST_PINGDOM_BOOL_ON");
        std::env::remove_var("TEST_PINGDOM_BOOL_UPPER");
        std::env::remove_var("TEST_PINGDOM_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_with_token() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PINGDOM_API_TOKEN", "abc123");
        std::env::set_var("PINGDOM_DEBUG", "yes");
        std::env::set_var("PINGDOM_TIMEOUT_SECS", "15");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.api_token.as_deref(), Some("abc123"));
        assert_eq!(config.api_url, "https://api.pingdom.com/api");
        assert_eq!(config.version, "3.1");
        assert!(config.debug);
        assert_eq!(config.timeout_seconds, Some(15));
        assert!(config.oauth.is_none());
    }

    #[test]
    fn test_load_from_env_with_oauth_group() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PINGDOM_CLIENT_ID", "id");
        std::env::set_var("PINGDOM_CLIENT_SECRET", "secret");
        std::env::set_var("PINGDOM_AUTH_URL", "https://auth.example.com/oauth/token");
        std::env::set_var("PINGDOM_SCOPE", "checks");

        let result = load_from_env();
        clear_env();

        let oauth = result.expect("config from env").oauth.expect("oauth group");
        assert_eq!(oauth.client_id, "id");
        assert_eq!(oauth.auth_url, "https://auth.example.com/oauth/token");
        assert_eq!(oauth.scope, "checks");
    }

    #[test]
    fn test_load_from_env_partial_oauth_group() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PINGDOM_CLIENT_ID", "id");
        std::env::set_var("PINGDOM_SCOPE", "checks");

        let result = load_from_env();
        clear_env();

        match result {
            Err(PingdomError::Config(msg)) => {
                assert!(msg.contains("PINGDOM_CLIENT_SECRET"));
                assert!(msg.contains("PINGDOM_AUTH_URL"));
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_surfaces_env_errors_when_credentials_are_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PINGDOM_CLIENT_ID", "id");

        let result = load();
        clear_env();

        match result {
            Err(PingdomError::Config(msg)) => assert!(msg.contains("Incomplete OAuth"), "{msg}"),
            other => panic!("expected env config error, got {:?}", other),
        }
    }

    #[test]
    fn test_credentials_in_env() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        assert!(!credentials_in_env());
        std::env::set_var("PINGDOM_DEBUG", "true");
        assert!(!credentials_in_env());
        std::env::set_var("PINGDOM_AUTH_URL", "https://auth.example.com");
        assert!(credentials_in_env());

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_credentials() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let result = load_from_env();
        assert!(matches!(result, Err(PingdomError::Config(_))));
    }

    #[test]
    fn test_load_from_env_invalid_timeout() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("PINGDOM_API_TOKEN", "abc123");
        std::env::set_var("PINGDOM_TIMEOUT_SECS", "soon");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(PingdomError::Config(_))));
    }

    #[test]
    fn test_parse_config_json() {
        let json_content = r#"{ "api_token": "abc123", "version": "3.0" }"#;

        let config = parse_config(json_content, Path::new("pingdom.json")).unwrap();
        assert_eq!(config.api_token.as_deref(), Some("abc123"));
        assert_eq!(config.version, "3.0");
        assert_eq!(config.api_url, "https://api.pingdom.com/api");
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_content = r#"
debug = true

[oauth]
client_id = "id"
client_secret = "secret"
auth_url = "https://auth.example.com/oauth/token"
scope = "checks"
"#;

        let config = parse_config(toml_content, Path::new("pingdom.toml")).unwrap();
        assert!(config.debug);
        assert_eq!(config.oauth.map(|o| o.client_id).as_deref(), Some("id"));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("api_token: abc", Path::new("pingdom.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/pingdom.json")));
        assert!(matches!(result, Err(PingdomError::Config(_))));
    }
}
