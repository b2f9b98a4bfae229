//! Response synthesis.
//!
//! Turns validated directives into a status, a header set and a body, then
//! hands them to the selected wire encoding.

use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use bytes::Bytes;

use crate::directive::RequestDirectives;
use crate::encoding::ResponseType;
use crate::error::{UpstreamError, UpstreamResult};
use crate::http::fake::fake_response;

/// Everything needed to write the response.
#[derive(Debug, Clone)]
pub struct ResponsePlan {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub response_type: ResponseType,
}

impl ResponsePlan {
    /// Build the plan for a request to `path`.
    ///
    /// Without a `response-body` directive a plain response falls back to a
    /// canned body; streaming responses have no fallback.
    pub fn build(directives: RequestDirectives, path: &str) -> UpstreamResult<Self> {
        let response_type = directives.response_type;

        let body = match directives.response_body {
            Some(body) => body,
            None if response_type.is_streaming() => {
                return Err(UpstreamError::MissingResponseBody(response_type.as_str()));
            }
            None => fake_response(path)?,
        };

        let mut headers = HeaderMap::with_capacity(directives.response_headers.len());
        for (name, value) in directives.response_headers {
            headers.insert(name, value);
        }

        Ok(Self {
            status: directives.response_status,
            headers,
            body,
            response_type,
        })
    }

    /// Write the plan in its wire encoding.
    pub async fn into_response(self, streaming_interval: Duration) -> Response {
        self.response_type
            .respond(self.status, self.headers, self.body, streaming_interval)
            .await
    }
}
