//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (TESTUPSTREAM_ID, STREAMING_INTERVAL)
//!     → validation.rs (semantic checks)
//!     → UpstreamConfig (validated)
//!     → frozen into http::AppState at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once at boot; there is no reload path
//! - All fields have defaults so the server runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ListenerConfig, LogFormat, ObservabilityConfig, UpstreamConfig, UpstreamSettings};
