//! Typed decoding of directive headers.
//!
//! Everything downstream of this file works on [`RequestDirectives`] and
//! never looks at raw directive header strings.

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;

use crate::directive::keys;
use crate::encoding::ResponseType;
use crate::error::{UpstreamError, UpstreamResult};

/// Per-request expectations and response instructions.
///
/// An unset field means "no check" (or "use the default"), never "expect empty".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDirectives {
    pub expected_host: Option<String>,
    pub expected_headers: Vec<(HeaderName, String)>,
    pub absent_headers: Vec<HeaderName>,
    pub expected_upstream_id: Option<String>,
    pub expected_path: Option<String>,
    pub expected_body: Option<Bytes>,
    pub response_status: StatusCode,
    pub response_headers: Vec<(HeaderName, HeaderValue)>,
    pub response_body: Option<Bytes>,
    pub response_type: ResponseType,
}

impl Default for RequestDirectives {
    fn default() -> Self {
        Self {
            expected_host: None,
            expected_headers: Vec::new(),
            absent_headers: Vec::new(),
            expected_upstream_id: None,
            expected_path: None,
            expected_body: None,
            response_status: StatusCode::OK,
            response_headers: Vec::new(),
            response_body: None,
            response_type: ResponseType::Plain,
        }
    }
}

impl RequestDirectives {
    /// Decode every recognized directive present in `headers`.
    pub fn from_headers(headers: &HeaderMap) -> UpstreamResult<Self> {
        let mut directives = Self {
            expected_host: plain(headers, keys::EXPECTED_HOST),
            expected_upstream_id: plain(headers, keys::EXPECTED_TESTUPSTREAM_ID),
            ..Self::default()
        };

        if let Some(raw) = decoded_text(headers, keys::EXPECTED_HEADERS)? {
            directives.expected_headers = split_pairs(keys::EXPECTED_HEADERS, &raw)?
                .into_iter()
                .map(|(name, value)| (name, value.to_string()))
                .collect();
        }

        if let Some(raw) = decoded_text(headers, keys::NON_EXPECTED_HEADERS)? {
            directives.absent_headers = raw
                .split(',')
                .filter(|name| !name.is_empty())
                .map(|name| header_name(keys::NON_EXPECTED_HEADERS, name))
                .collect::<UpstreamResult<_>>()?;
        }

        directives.expected_path = decoded_text(headers, keys::EXPECTED_PATH)?;
        directives.expected_body = decoded(headers, keys::EXPECTED_REQUEST_BODY)?;

        if let Some(raw) = plain(headers, keys::RESPONSE_STATUS) {
            directives.response_status = parse_status(&raw)?;
        }

        if let Some(raw) = decoded_text(headers, keys::RESPONSE_HEADERS)? {
            directives.response_headers = split_pairs(keys::RESPONSE_HEADERS, &raw)?
                .into_iter()
                .map(|(name, value)| {
                    HeaderValue::from_str(value)
                        .map(|value| (name, value))
                        .map_err(|e| UpstreamError::Malformed {
                            directive: keys::RESPONSE_HEADERS,
                            reason: format!("bad value {value:?}: {e}"),
                        })
                })
                .collect::<UpstreamResult<_>>()?;
        }

        directives.response_body = decoded(headers, keys::RESPONSE_BODY)?;
        directives.response_type =
            ResponseType::from_directive(plain(headers, keys::RESPONSE_TYPE).as_deref())?;

        Ok(directives)
    }
}

/// Directive header value, if present and non-empty. An empty value reads
/// the same as a missing header.
fn raw<'h>(headers: &'h HeaderMap, key: &str) -> Option<&'h HeaderValue> {
    headers.get(key).filter(|value| !value.is_empty())
}

/// Raw directive value as a string, if set.
fn plain(headers: &HeaderMap, key: &str) -> Option<String> {
    raw(headers, key)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

/// Base64-decoded directive payload, if set.
fn decoded(headers: &HeaderMap, key: &'static str) -> UpstreamResult<Option<Bytes>> {
    raw(headers, key)
        .map(|value| {
            STANDARD
                .decode(value.as_bytes())
                .map(Bytes::from)
                .map_err(|source| UpstreamError::Decode { directive: key, source })
        })
        .transpose()
}

fn decoded_text(headers: &HeaderMap, key: &'static str) -> UpstreamResult<Option<String>> {
    decoded(headers, key)?
        .map(|bytes| {
            String::from_utf8(bytes.to_vec()).map_err(|_| UpstreamError::Malformed {
                directive: key,
                reason: "payload is not valid UTF-8".to_string(),
            })
        })
        .transpose()
}

/// Split `k1:v1,k2:v2` on `,` then on the first `:` of each pair.
fn split_pairs<'a>(directive: &'static str, raw: &'a str) -> UpstreamResult<Vec<(HeaderName, &'a str)>> {
    raw.split(',')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once(':').ok_or_else(|| UpstreamError::Malformed {
                directive,
                reason: format!("pair {pair:?} is missing ':'"),
            })?;
            Ok((header_name(directive, name)?, value))
        })
        .collect()
}

fn header_name(directive: &'static str, name: &str) -> UpstreamResult<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| UpstreamError::Malformed {
        directive,
        reason: format!("bad header name {name:?}"),
    })
}

fn parse_status(raw: &str) -> UpstreamResult<StatusCode> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| UpstreamError::Malformed {
            directive: keys::RESPONSE_STATUS,
            reason: format!("{raw:?} is not a status code"),
        })
}
