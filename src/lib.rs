//! Mock upstream server for gateway end-to-end tests.
//!
//! Requests carry directive headers describing what the server should expect
//! (host, headers, path, body, which instance should answer) and how it should
//! reply (status, headers, body, and wire encoding: plain JSON, SSE, or AWS
//! event-stream).

pub mod config;
pub mod directive;
pub mod encoding;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::UpstreamConfig;
pub use directive::{DirectiveBuilder, RequestDirectives};
pub use encoding::ResponseType;
pub use error::UpstreamError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
