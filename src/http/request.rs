//! Request validation against decoded directives.
//!
//! # Check order
//! 1. host
//! 2. expected header values
//! 3. headers that must be absent
//! 4. upstream identity
//! 5. path
//! 6. body (read once, only when an expectation is set)
//!
//! The first failing check wins. Unset expectations are skipped.

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{header, Request};

use crate::directive::RequestDirectives;
use crate::error::{UpstreamError, UpstreamResult};

/// Run every check in order, consuming the request body if needed.
pub async fn validate(
    directives: &RequestDirectives,
    request: Request<Body>,
    identity: &str,
    max_body_size: usize,
) -> UpstreamResult<()> {
    let (parts, body) = request.into_parts();
    check_head(directives, &parts, identity)?;
    check_body(directives, body, max_body_size).await
}

/// Checks 1-5, which only need the request head.
pub fn check_head(directives: &RequestDirectives, parts: &Parts, identity: &str) -> UpstreamResult<()> {
    if let Some(expected) = &directives.expected_host {
        let got = observed_host(parts);
        if got != *expected {
            return Err(UpstreamError::Host {
                got,
                expected: expected.clone(),
            });
        }
    }

    for (name, expected) in &directives.expected_headers {
        let got = header_text(parts, name);
        if got != *expected {
            return Err(UpstreamError::Header {
                name: name.as_str().to_string(),
                got,
                expected: expected.clone(),
            });
        }
    }

    for name in &directives.absent_headers {
        let got = header_text(parts, name);
        if !got.is_empty() {
            return Err(UpstreamError::HeaderPresent {
                name: name.as_str().to_string(),
                got,
            });
        }
    }

    if let Some(expected) = &directives.expected_upstream_id {
        if expected != identity {
            return Err(UpstreamError::Identity {
                got: identity.to_string(),
                expected: expected.clone(),
            });
        }
    }

    if let Some(expected) = &directives.expected_path {
        let got = parts.uri.path();
        if got != expected {
            return Err(UpstreamError::Path {
                got: got.to_string(),
                expected: expected.clone(),
            });
        }
    }

    Ok(())
}

/// Check 6. The body is read to completion only when an expectation exists.
pub async fn check_body(
    directives: &RequestDirectives,
    body: Body,
    max_body_size: usize,
) -> UpstreamResult<()> {
    let Some(expected) = &directives.expected_body else {
        return Ok(());
    };

    let got = axum::body::to_bytes(body, max_body_size)
        .await
        .map_err(|e| UpstreamError::BodyRead(e.to_string()))?;

    if got != *expected {
        return Err(UpstreamError::Body {
            got: String::from_utf8_lossy(&got).into_owned(),
            expected: String::from_utf8_lossy(expected).into_owned(),
        });
    }

    Ok(())
}

/// `Host` as seen on the wire; HTTP/2 carries it in the URI authority.
fn observed_host(parts: &Parts) -> String {
    parts
        .headers
        .get(header::HOST)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .or_else(|| parts.uri.authority().map(|a| a.as_str().to_string()))
        .unwrap_or_default()
}

/// Header value as text; a missing header reads as empty.
fn header_text(parts: &Parts, name: &header::HeaderName) -> String {
    parts
        .headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default()
}
