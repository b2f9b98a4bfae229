//! Request-level error taxonomy.
//!
//! Every failure is local to one request. The diagnostic is logged and
//! returned verbatim as the response body so test clients can assert on it.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors produced while handling a single upstream request.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// A base64 directive could not be decoded.
    #[error("failed to decode {directive} directive: {source}")]
    Decode {
        directive: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    /// A directive decoded but its content is malformed.
    #[error("invalid {directive} directive: {reason}")]
    Malformed {
        directive: &'static str,
        reason: String,
    },

    #[error("unexpected host: got {got}, expected {expected}")]
    Host { got: String, expected: String },

    #[error("unexpected header {name:?}: got {got:?}, expected {expected:?}")]
    Header {
        name: String,
        got: String,
        expected: String,
    },

    #[error("unexpected header {name:?} presence with value {got:?}")]
    HeaderPresent { name: String, got: String },

    /// The request reached a different upstream instance than intended.
    #[error("unexpected testupstream-id: received by {got:?}, expected {expected:?}")]
    Identity { got: String, expected: String },

    #[error("unexpected path: got {got}, expected {expected}")]
    Path { got: String, expected: String },

    #[error("unexpected request body: got {got}, expected {expected}")]
    Body { got: String, expected: String },

    #[error("no fake response available for path {0}")]
    UnknownFakePath(String),

    #[error("{0} responses require a response-body directive")]
    MissingResponseBody(&'static str),

    #[error("failed to read request body: {0}")]
    BodyRead(String),
}

/// Result type for request handling.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

impl UpstreamError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            UpstreamError::BodyRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %message, "Request rejected");
        }

        (
            status,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            format!("{message}\n"),
        )
            .into_response()
    }
}
