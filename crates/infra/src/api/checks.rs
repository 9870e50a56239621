//! Check operations
//!
//! Thin wrappers over [`ApiClient::request`]: each builds the URL and
//! headers for one endpoint and returns the parsed response body.

use pingdom_domain::constants::CHECKS_PATH;
use pingdom_domain::{CheckId, RequestSpec};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::client::ApiClient;
use super::errors::ApiError;

impl ApiClient {
    /// `GET /checks`
    #[instrument(skip(self))]
    pub async fn list_checks(&self) -> Result<Value, ApiError> {
        let spec = RequestSpec::get(self.get_api_url(CHECKS_PATH))
            .with_headers(self.get_api_headers().await?);

        debug!(request = %spec, "Listing checks");
        self.request(spec).await
    }

    /// `GET /checks/{check_id}`
    #[instrument(skip(self, check_id))]
    pub async fn get_check(&self, check_id: impl Into<CheckId>) -> Result<Value, ApiError> {
        let check_id = check_id.into();
        let spec = RequestSpec::get(self.get_api_url(&check_id.path()))
            .with_headers(self.get_api_headers().await?);

        debug!(request = %spec, %check_id, "Fetching check");
        self.request(spec).await
    }

    /// `POST /checks` with `data` as the JSON body
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if `data` cannot be serialised, or
    /// any [`request`](ApiClient::request) error
    #[instrument(skip(self, data))]
    pub async fn create_check<T>(&self, data: &T) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized,
    {
        let body = to_json_body(data)?;
        let spec = RequestSpec::post(self.get_api_url(CHECKS_PATH))
            .with_headers(self.get_api_headers().await?)
            .json(body);

        debug!(request = %spec, "Creating check");
        self.request(spec).await
    }

    /// `PUT /checks/{check_id}` with `data` as the JSON body
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if `data` cannot be serialised, or
    /// any [`request`](ApiClient::request) error
    #[instrument(skip(self, check_id, data))]
    pub async fn update_check<T>(
        &self,
        check_id: impl Into<CheckId>,
        data: &T,
    ) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized,
    {
        let check_id = check_id.into();
        let body = to_json_body(data)?;
        let spec = RequestSpec::put(self.get_api_url(&check_id.path()))
            .with_headers(self.get_api_headers().await?)
            .json(body);

        debug!(request = %spec, %check_id, "Updating check");
        self.request(spec).await
    }
}

fn to_json_body<T: Serialize + ?Sized>(data: &T) -> Result<Value, ApiError> {
    serde_json::to_value(data)
        .map_err(|e| ApiError::InvalidInput(format!("Failed to serialize body: {}", e)))
}
