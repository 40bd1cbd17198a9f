//! The stable response envelope.
//!
//! Every JSON response carries `{ "status": n, "message": m, "data": d }`.
//! Callers rely on the status convention: `0` for success, `102` for the
//! invalid-parameter/generic-failure family, `103` for rejected
//! credentials, and `108` for a missing or invalid bearer token.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

/// Envelope status for successful responses.
pub const STATUS_SUCCESS: u16 = 0;
/// Envelope status for the invalid-parameter/generic-failure family.
pub const STATUS_INVALID_PARAMETER: u16 = 102;
/// Envelope status for rejected login credentials.
pub const STATUS_INVALID_CREDENTIALS: u16 = 103;
/// Envelope status for missing/invalid/expired bearer tokens.
pub const STATUS_UNAUTHORIZED: u16 = 108;

/// Response envelope shared by every JSON endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    /// Caller-visible status code (not the HTTP status).
    pub status: u16,
    /// Stable human-readable message.
    pub message: String,
    /// Payload; `null` for failures and data-free successes.
    pub data: Option<T>,
}

/// A `200 OK` success envelope wrapping `data`.
pub fn success<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        status: STATUS_SUCCESS,
        message: message.to_owned(),
        data: Some(data),
    })
}

/// A `200 OK` success envelope with `data: null`.
pub fn success_empty(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::<()> {
        status: STATUS_SUCCESS,
        message: message.to_owned(),
        data: None,
    })
}

/// A failure envelope with the given HTTP and envelope status codes.
pub fn failure(http_status: StatusCode, status: u16, message: &str) -> HttpResponse {
    HttpResponse::build(http_status).json(Envelope::<()> {
        status,
        message: message.to_owned(),
        data: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::{Value, json};

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.expect("body bytes");
        serde_json::from_slice(&bytes).expect("valid JSON body")
    }

    #[tokio::test]
    async fn success_wraps_data_with_status_zero() {
        let response = success("balance retrieved", json!({ "balance": 40000.0 }));
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], 0);
        assert_eq!(body["message"], "balance retrieved");
        assert_eq!(body["data"]["balance"], 40000.0);
    }

    #[tokio::test]
    async fn empty_success_serialises_null_data() {
        let body = body_json(success_empty("registration successful")).await;
        assert_eq!(body["status"], 0);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn failure_carries_the_family_status() {
        let response = failure(
            StatusCode::BAD_REQUEST,
            STATUS_INVALID_PARAMETER,
            "service not found",
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["status"], 102);
        assert!(body["data"].is_null());
    }
}
