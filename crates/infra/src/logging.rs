//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence; otherwise the level is `info`, or `debug`
//! when the client's debug flag is set. Installing a subscriber when one is
//! already set is a no-op.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api::{ApiError, ApiErrorCategory};

fn env_filter(debug: bool) -> EnvFilter {
    let default_level = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install a human-readable console subscriber
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(debug: bool) -> bool {
    let console_layer = fmt::layer().with_target(true).with_line_number(debug);

    tracing_subscriber::registry().with(env_filter(debug)).with(console_layer).try_init().is_ok()
}

/// Install a JSON subscriber, one object per event
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_json_tracing(debug: bool) -> bool {
    let json_layer = fmt::layer().json().with_current_span(true);

    tracing_subscriber::registry().with(env_filter(debug)).with(json_layer).try_init().is_ok()
}

/// Short label for an error's category, for log fields
pub fn error_label(err: &ApiError) -> &'static str {
    match err.category() {
        ApiErrorCategory::Authentication => "authentication",
        ApiErrorCategory::Client => "client",
        ApiErrorCategory::Server => "server",
        ApiErrorCategory::Network => "network",
        ApiErrorCategory::Config => "config",
    }
}
