use std::time::Duration;

use pingdom_domain::{HttpMethod, PingdomError, RequestBody, RequestSpec};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder};
use tracing::debug;

use crate::errors::InfraError;

const DEFAULT_USER_AGENT: &str = concat!("pingdom-client/", env!("CARGO_PKG_VERSION"));

/// Status and raw body of a received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Body text, possibly empty
    pub body: String,
}

impl HttpResponse {
    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Single-attempt HTTP transport.
///
/// Any received response, whatever its status, is returned as
/// [`HttpResponse`]. Only failures without a response (connect, DNS, timeout,
/// unreadable body) are errors. Retry policy belongs to the caller.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, PingdomError> {
        Self::builder().build()
    }

    /// Dispatch the described request once.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<HttpResponse, PingdomError> {
        let request = self.request_builder(spec).build().map_err(|err| {
            let infra: InfraError = err.into();
            PingdomError::from(infra)
        })?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            let infra: InfraError = err.into();
            PingdomError::from(infra)
        })?;

        let status = response.status();
        debug!(%method, %url, %status, "received HTTP response");

        let body = response.text().await.map_err(|err| {
            let infra: InfraError = err.into();
            PingdomError::from(infra)
        })?;

        Ok(HttpResponse { status: status.as_u16(), body })
    }

    fn request_builder(&self, spec: &RequestSpec) -> RequestBuilder {
        let method = match spec.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
        };

        let mut builder = self.client.request(method, spec.url.as_str());
        for (name, value) in &spec.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        match &spec.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
}

impl HttpClientBuilder {
    /// Bound each request by `timeout`; `None` leaves requests unbounded.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client. Proxies are never used.
    pub fn build(self) -> Result<HttpClient, PingdomError> {
        let mut builder = ReqwestClient::builder().no_proxy().user_agent(DEFAULT_USER_AGENT);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            PingdomError::from(infra)
        })?;

        Ok(HttpClient { client })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn sends_client_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let response = client.execute(&RequestSpec::get(server.uri())).await.expect("response");

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn returns_successful_response_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/checks"))
            .and(header("Authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let spec = RequestSpec::get(format!("{}/checks", server.uri()))
            .header("Authorization", "Bearer abc");
        let response = client.execute(&spec).await.expect("response");

        assert_eq!(response, HttpResponse { status: 200, body: "ok".to_string() });
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn error_statuses_are_responses_not_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let response = client.execute(&RequestSpec::get(server.uri())).await.expect("response");

        assert_eq!(response.status, 500);
        assert_eq!(response.body, "boom");
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"name": "site"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let spec = RequestSpec::put(server.uri()).json(json!({"name": "site"}));
        let response = client.execute(&spec).await.expect("response");

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn sends_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let spec = RequestSpec::post(server.uri())
            .form(vec![("grant_type".to_string(), "client_credentials".to_string())]);
        let response = client.execute(&spec).await.expect("response");

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn network_failure_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let client = HttpClient::new().expect("http client");
        let result = client.execute(&RequestSpec::get(format!("http://{addr}"))).await;

        match result {
            Err(PingdomError::Network(msg)) => {
                assert!(msg.to_lowercase().contains("http"));
            }
            other => panic!("expected network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn timeout_is_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = HttpClient::builder()
            .timeout(Some(Duration::from_millis(50)))
            .build()
            .expect("http client");
        let result = client.execute(&RequestSpec::get(server.uri())).await;

        assert_eq!(result, Err(PingdomError::Network("HTTP request timed out".into())));
    }
}
