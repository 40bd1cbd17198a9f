//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers
//! bubble failures with `?`. The mapping renders the stable envelope and
//! never leaks store diagnostics: internal and store-failure categories
//! collapse to a generic message here.

use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::TRACE_ID_HEADER;

use super::envelope;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest
        | ErrorCode::NotFound
        | ErrorCode::ServiceNotFound
        | ErrorCode::InsufficientFunds
        | ErrorCode::EmailTaken => StatusCode::BAD_REQUEST,
        ErrorCode::InvalidCredentials | ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::OperationFailed | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn envelope_status_for(code: ErrorCode) -> u16 {
    match code {
        ErrorCode::InvalidCredentials => envelope::STATUS_INVALID_CREDENTIALS,
        ErrorCode::Unauthorized => envelope::STATUS_UNAUTHORIZED,
        // Not-found, insufficient-funds, and store failures share the
        // generic failure family the callers already pattern-match on.
        _ => envelope::STATUS_INVALID_PARAMETER,
    }
}

fn public_message(error: &Error) -> &str {
    match error.code() {
        ErrorCode::Internal => "internal server error",
        _ => error.message(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = envelope::failure(
            self.status_code(),
            envelope_status_for(self.code()),
            public_message(self),
        );
        if let Some(Ok(value)) = self.trace_id().map(HeaderValue::from_str) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        response
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak framework details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::Value;

    async fn rendered(error: Error) -> (StatusCode, Value) {
        let response = error.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.expect("body bytes");
        (status, serde_json::from_slice(&bytes).expect("valid JSON"))
    }

    #[rstest]
    #[case(Error::invalid_request("amount must be a number greater than zero"), StatusCode::BAD_REQUEST, 102)]
    #[case(Error::not_found("balance not found"), StatusCode::BAD_REQUEST, 102)]
    #[case(Error::service_not_found("service not found"), StatusCode::BAD_REQUEST, 102)]
    #[case(Error::insufficient_funds("balance is not sufficient"), StatusCode::BAD_REQUEST, 102)]
    #[case(Error::email_taken("email already registered"), StatusCode::BAD_REQUEST, 102)]
    #[case(Error::invalid_credentials("email or password is incorrect"), StatusCode::UNAUTHORIZED, 103)]
    #[case(Error::unauthorized("token is invalid or expired"), StatusCode::UNAUTHORIZED, 108)]
    #[case(Error::operation_failed("balance operation failed"), StatusCode::INTERNAL_SERVER_ERROR, 102)]
    #[case(Error::service_unavailable("ledger store unavailable"), StatusCode::SERVICE_UNAVAILABLE, 102)]
    #[tokio::test]
    async fn maps_codes_to_http_and_envelope_statuses(
        #[case] error: Error,
        #[case] http: StatusCode,
        #[case] envelope_status: u16,
    ) {
        let expected_message = error.message().to_owned();
        let (status, body) = rendered(error).await;
        assert_eq!(status, http);
        assert_eq!(body["status"], u64::from(envelope_status));
        assert_eq!(body["message"], expected_message);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn internal_messages_are_redacted() {
        let (status, body) = rendered(Error::internal("connection string leaked")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "internal server error");
    }
}
