//! Directive header names.
//!
//! Values marked (b64) carry a standard base64 payload; the rest are sent as-is.

/// Required `Host` of the inbound request.
pub const EXPECTED_HOST: &str = "expected-host";

/// (b64) `k1:v1,k2:v2` pairs the request must carry.
pub const EXPECTED_HEADERS: &str = "expected-headers";

/// (b64) `k1,k2` header names the request must not carry.
pub const NON_EXPECTED_HEADERS: &str = "non-expected-headers";

/// Identity of the upstream instance the request must reach.
pub const EXPECTED_TESTUPSTREAM_ID: &str = "expected-testupstream-id";

/// (b64) Exact request path.
pub const EXPECTED_PATH: &str = "expected-path";

/// (b64) Exact request body.
pub const EXPECTED_REQUEST_BODY: &str = "expected-request-body";

/// Decimal status code of the response.
pub const RESPONSE_STATUS: &str = "response-status";

/// (b64) `k1:v1,k2:v2` pairs set on the response.
pub const RESPONSE_HEADERS: &str = "response-headers";

/// (b64) Response payload. Newline-split into frames in streaming modes.
pub const RESPONSE_BODY: &str = "response-body";

/// Wire encoding: `sse`, `aws-event-stream`, or absent for plain JSON.
pub const RESPONSE_TYPE: &str = "response-type";
