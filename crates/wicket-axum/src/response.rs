//! Translation of denied decisions into HTTP responses.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use wicket_auth::DenyReason;

/// Challenge scheme advertised on 401 responses.
const CHALLENGE: &str = "AccessToken";

/// JSON envelope for denied requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// The error payload.
    pub error: ErrorBody,
}

/// Status class and client-visible message of a denial.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable class.
    pub code: &'static str,
    /// Short human-readable reason.
    pub message: String,
}

fn error_response(status: StatusCode, code: &'static str, message: String) -> Response {
    let body = ErrorResponse {
        error: ErrorBody { code, message },
    };
    (status, Json(body)).into_response()
}

pub(crate) fn unauthorized(reason: DenyReason, credentials: Option<&Value>) -> Response {
    if let Some(credentials) = credentials {
        // Partial identity data from the resolver is log-only diagnostics.
        tracing::warn!(%credentials, "token rejected by identity resolution");
    }

    let mut response = error_response(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        reason.message().to_string(),
    );
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
    response
}

pub(crate) fn bad_request(message: &'static str) -> Response {
    error_response(StatusCode::BAD_REQUEST, "bad_request", message.to_string())
}

pub(crate) fn internal_error(cause: &str, credentials: Option<&Value>) -> Response {
    // The cause stays on the server; clients get the generic message.
    tracing::error!(cause = %cause, credentials = ?credentials, "authentication failed server-side");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_server_error",
        "An internal server error occurred".to_string(),
    )
}
