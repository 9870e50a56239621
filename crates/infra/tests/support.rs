#![allow(dead_code)]

use pingdom_common::auth::OAuthConfig;
use pingdom_infra::{ApiClient, ApiClientConfig};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_TOKEN: &str = "abc123";
pub const TOKEN_PATH: &str = "/oauth/token";

/// Client using a static token against `server`.
pub fn token_client(server: &MockServer) -> ApiClient {
    let config =
        ApiClientConfig { api_url: server.uri(), ..ApiClientConfig::with_token(API_TOKEN) };
    ApiClient::new(config).expect("api client should be created")
}

/// Client using client credentials, with both the API and the token
/// endpoint served by `server`.
pub fn oauth_client(server: &MockServer) -> ApiClient {
    let oauth = OAuthConfig::new("id", "secret", format!("{}{TOKEN_PATH}", server.uri()), "checks");
    let config =
        ApiClientConfig { api_url: server.uri(), ..ApiClientConfig::with_client_credentials(oauth) };
    ApiClient::new(config).expect("api client should be created")
}

/// Mount a token endpoint issuing `token` for `expires_in` seconds.
pub async fn mount_token(server: &MockServer, token: &str, expires_in: i64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": token, "expires_in": expires_in})),
        )
        .mount(server)
        .await;
}
