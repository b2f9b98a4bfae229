//! Canned responses for requests that carry no `response-body` directive.
//!
//! Only known endpoints have a template; anything else is rejected so a
//! test never silently receives a body it did not ask for.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::json;

use crate::error::{UpstreamError, UpstreamResult};

/// Candidate message contents; one is picked per fallback response.
pub const FAKE_MESSAGES: &[&str] = &[
    "This is a test.",
    "The quick brown fox jumps over the lazy dog.",
    "Hello from the test upstream.",
    "All systems nominal.",
    "Streaming is not enabled for this request.",
    "The answer depends on what you meant by the question.",
    "I am a mock upstream and cannot help with that.",
    "Request received and processed.",
    "Ship it.",
    "Nothing to see here, move along.",
];

/// Endpoints with a fallback template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeEndpoint {
    ChatCompletions,
    Completions,
}

impl FakeEndpoint {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/v1/chat/completions" => Some(FakeEndpoint::ChatCompletions),
            "/v1/completions" => Some(FakeEndpoint::Completions),
            _ => None,
        }
    }

    fn render(self, message: &str) -> String {
        match self {
            FakeEndpoint::ChatCompletions => {
                json!({ "choices": [{ "message": { "content": message } }] }).to_string()
            }
            FakeEndpoint::Completions => json!({ "choices": [{ "text": message }] }).to_string(),
        }
    }
}

/// Random canned body for `path`, or an error if the path has no template.
pub fn fake_response(path: &str) -> UpstreamResult<Bytes> {
    let endpoint =
        FakeEndpoint::from_path(path).ok_or_else(|| UpstreamError::UnknownFakePath(path.to_string()))?;

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let mut rng = StdRng::seed_from_u64(seed);
    let message = FAKE_MESSAGES.choose(&mut rng).copied().unwrap_or(FAKE_MESSAGES[0]);

    tracing::debug!(path = %path, message = %message, "Serving fake response");
    Ok(Bytes::from(endpoint.render(message)))
}
