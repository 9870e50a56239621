//! Domain types passed between the API layer and the transport

pub mod check;
pub mod request;

pub use check::CheckId;
pub use request::{HttpMethod, RequestBody, RequestSpec};
