//! Client-side directive encoding.
//!
//! Builds the header set understood by [`RequestDirectives::from_headers`](super::RequestDirectives::from_headers).

use axum::http::header::InvalidHeaderValue;
use axum::http::{HeaderMap, HeaderValue};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::directive::keys;
use crate::encoding::ResponseType;

/// Builder for directive headers.
///
/// ```
/// use testupstream::directive::DirectiveBuilder;
///
/// let headers = DirectiveBuilder::new()
///     .expected_path("/v1/chat/completions")
///     .response_status(404)
///     .response_header("x", "y")
///     .into_headers()
///     .unwrap();
/// assert_eq!(headers["response-status"], "404");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DirectiveBuilder {
    entries: Vec<(&'static str, String)>,
    expected_headers: Vec<(String, String)>,
    absent_headers: Vec<String>,
    response_headers: Vec<(String, String)>,
}

impl DirectiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expected_host(self, host: impl Into<String>) -> Self {
        self.plain(keys::EXPECTED_HOST, host.into())
    }

    pub fn expected_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.expected_headers.push((name.into(), value.into()));
        self
    }

    pub fn absent_header(mut self, name: impl Into<String>) -> Self {
        self.absent_headers.push(name.into());
        self
    }

    pub fn expected_upstream_id(self, id: impl Into<String>) -> Self {
        self.plain(keys::EXPECTED_TESTUPSTREAM_ID, id.into())
    }

    pub fn expected_path(self, path: impl AsRef<[u8]>) -> Self {
        self.encoded(keys::EXPECTED_PATH, path)
    }

    pub fn expected_request_body(self, body: impl AsRef<[u8]>) -> Self {
        self.encoded(keys::EXPECTED_REQUEST_BODY, body)
    }

    pub fn response_status(self, status: u16) -> Self {
        self.plain(keys::RESPONSE_STATUS, status.to_string())
    }

    pub fn response_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.response_headers.push((name.into(), value.into()));
        self
    }

    pub fn response_body(self, body: impl AsRef<[u8]>) -> Self {
        self.encoded(keys::RESPONSE_BODY, body)
    }

    /// Select the wire encoding. `Plain` removes any previous selection.
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.entries.retain(|(key, _)| *key != keys::RESPONSE_TYPE);
        match response_type.directive_value() {
            Some(value) => self.plain(keys::RESPONSE_TYPE, value.to_string()),
            None => self,
        }
    }

    /// Render the directives as request headers.
    pub fn into_headers(self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut entries = self.entries;

        if !self.expected_headers.is_empty() {
            entries.push((keys::EXPECTED_HEADERS, STANDARD.encode(join_pairs(&self.expected_headers))));
        }
        if !self.absent_headers.is_empty() {
            entries.push((keys::NON_EXPECTED_HEADERS, STANDARD.encode(self.absent_headers.join(","))));
        }
        if !self.response_headers.is_empty() {
            entries.push((keys::RESPONSE_HEADERS, STANDARD.encode(join_pairs(&self.response_headers))));
        }

        let mut headers = HeaderMap::with_capacity(entries.len());
        for (key, value) in entries {
            headers.insert(key, HeaderValue::from_str(&value)?);
        }
        Ok(headers)
    }

    fn plain(mut self, key: &'static str, value: String) -> Self {
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, value));
        self
    }

    fn encoded(self, key: &'static str, value: impl AsRef<[u8]>) -> Self {
        let value = STANDARD.encode(value);
        self.plain(key, value)
    }
}

fn join_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}:{v}"))
        .collect::<Vec<_>>()
        .join(",")
}
