//! HTTP inbound adapter.
//!
//! Route handlers, the response envelope, the bearer-token extractor, and
//! the shared [`HttpState`] bundle. Handlers contain request/response
//! mapping only; behaviour lives behind the driving ports.

pub mod auth;
pub mod envelope;
pub mod error;
pub mod health;
pub mod information;
pub mod membership;
pub mod state;
pub mod transaction;

pub use auth::AuthenticatedUser;
pub use error::ApiResult;
pub use state::HttpState;

use actix_web::web;

use crate::domain::Error;

/// JSON extractor configuration producing envelope errors for malformed
/// bodies instead of Actix's plain-text default.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "rejected request body");
        Error::invalid_request("request body is invalid").into()
    })
}

/// Query extractor configuration producing envelope errors for malformed
/// query strings.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "rejected query string");
        Error::invalid_request("query parameters are invalid").into()
    })
}
