//! Response wire encodings.
//!
//! # Data Flow
//! ```text
//! ResponsePlan (status, headers, body)
//!     → ResponseType::respond
//!         Plain          → plain.rs (single write, application/json)
//!         Sse            → stream.rs + sse.rs (data: <line>\n\n per line)
//!         AwsEventStream → stream.rs + eventstream.rs (binary message per line + end message)
//! ```
//!
//! # Stream states
//! ```text
//! not-started → headers-sent → frame-emitted* → terminated
//! ```
//! Each frame follows the configured interval. The `Response` is only
//! returned once frame 1 (or the terminal frame) is ready, so headers leave
//! together with the first frame. A closed client connection ends the
//! stream early.

pub mod eventstream;
pub mod plain;
pub mod sse;
pub mod stream;

use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::Bytes;

use crate::directive::keys;
use crate::error::{UpstreamError, UpstreamResult};

pub use eventstream::{EventStreamEncoder, FrameError, Message};
pub use sse::SseEncoder;

/// Selected by the `response-type` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    #[default]
    Plain,
    Sse,
    AwsEventStream,
}

impl ResponseType {
    /// Parse the directive value; `None` selects `Plain`.
    pub fn from_directive(value: Option<&str>) -> UpstreamResult<Self> {
        match value {
            None => Ok(ResponseType::Plain),
            Some("sse") => Ok(ResponseType::Sse),
            Some("aws-event-stream") => Ok(ResponseType::AwsEventStream),
            Some(other) => Err(UpstreamError::Malformed {
                directive: keys::RESPONSE_TYPE,
                reason: format!("unknown response type {other:?}"),
            }),
        }
    }

    /// The directive value selecting this type (`None` for plain).
    pub fn directive_value(self) -> Option<&'static str> {
        match self {
            ResponseType::Plain => None,
            ResponseType::Sse => Some("sse"),
            ResponseType::AwsEventStream => Some("aws-event-stream"),
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        self.directive_value().unwrap_or("plain")
    }

    pub fn is_streaming(self) -> bool {
        self != ResponseType::Plain
    }

    /// Write `body` in this encoding. Streaming types resolve once the first
    /// frame is ready.
    pub async fn respond(
        self,
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        interval: Duration,
    ) -> Response {
        match self {
            ResponseType::Plain => plain::respond(status, headers, body),
            ResponseType::Sse => {
                streaming(SseEncoder, self, status, headers, body, interval).await
            }
            ResponseType::AwsEventStream => {
                streaming(EventStreamEncoder, self, status, headers, body, interval).await
            }
        }
    }
}

/// Encoding of one payload line into one wire frame.
pub trait StreamEncoder: Send + Sync + 'static {
    fn content_type(&self) -> &'static str;

    fn encode_frame(&self, line: &[u8]) -> Result<Bytes, FrameError>;

    /// Frame appended after the last payload line, if the format has one.
    fn terminal_frame(&self) -> Option<Result<Bytes, FrameError>> {
        None
    }
}

async fn streaming<E: StreamEncoder>(
    encoder: E,
    response_type: ResponseType,
    status: StatusCode,
    mut headers: HeaderMap,
    body: Bytes,
    interval: Duration,
) -> Response {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(encoder.content_type()),
    );

    let body = stream::spawn_frame_stream(encoder, response_type, body, interval).await;

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
