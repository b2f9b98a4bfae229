//! HTTP request pipeline.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router: /health, catch-all)
//!     → directive::decode (headers → RequestDirectives)
//!     → request.rs (host, headers, identity, path, body checks)
//!     → fake.rs (canned body when none was requested)
//!     → response.rs (status + headers + body → ResponsePlan)
//!     → encoding (plain / sse / aws-event-stream)
//!     → Send to client
//! ```

pub mod fake;
pub mod request;
pub mod response;
pub mod server;

pub use response::ResponsePlan;
pub use server::{build_router, AppState, HttpServer};
