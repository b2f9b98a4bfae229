//! Plain JSON passthrough: the whole body in one write.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::Bytes;

pub const CONTENT_TYPE: &str = "application/json";

/// Build a response carrying `body` unchanged.
pub fn respond(status: StatusCode, mut headers: HeaderMap, body: Bytes) -> Response {
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE));

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
