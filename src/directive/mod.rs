//! Per-request directives.
//!
//! # Data Flow
//! ```text
//! inbound request headers
//!     → keys.rs (directive header names)
//!     → decode.rs (base64 + pair parsing → RequestDirectives)
//!     → http::request (validation) / http::response (synthesis)
//!
//! test clients:
//!     builder.rs (DirectiveBuilder → HeaderMap)
//! ```
//!
//! # Design Decisions
//! - Headers act as the RPC channel between a test and this server
//! - Decoding happens once, up front; a bad directive fails the request with 400
//! - Absent or empty directive = unset

pub mod builder;
pub mod decode;
pub mod keys;

pub use builder::DirectiveBuilder;
pub use decode::RequestDirectives;
