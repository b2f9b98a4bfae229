//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Request ID (`x-request-id`) is attached by tower-http and shows up in trace spans
//! - Metrics are cheap and silently dropped when no exporter is installed

pub mod logging;
pub mod metrics;
