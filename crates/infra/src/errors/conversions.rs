//! Conversions from external infrastructure errors into domain errors.

use pingdom_domain::PingdomError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and
/// unwraps into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PingdomError);

impl From<InfraError> for PingdomError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoPingdomError {
    fn into_pingdom(self) -> PingdomError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PingdomError */
/* -------------------------------------------------------------------------- */

impl IntoPingdomError for HttpError {
    fn into_pingdom(self) -> PingdomError {
        if self.is_builder() {
            return PingdomError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if self.is_timeout() {
            return PingdomError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return PingdomError::Network("HTTP connection failure".into());
        }

        PingdomError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_pingdom())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
