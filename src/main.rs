//! testupstream: directive-driven mock upstream.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────────────┐
//!                 │                        TESTUPSTREAM                          │
//!   Request       │  ┌────────┐   ┌───────────┐   ┌───────────┐   ┌───────────┐  │
//!   (directive ───┼─▶│ server │──▶│ directive │──▶│ validator │──▶│ response  │  │
//!    headers)     │  │ router │   │  decode   │   │           │   │   plan    │  │
//!                 │  └────────┘   └───────────┘   └───────────┘   └─────┬─────┘  │
//!                 │                                                     │        │
//!   Response      │          ┌───────────────────────────────────┐      │        │
//!   ◀─────────────┼──────────│ encoding: plain | sse | eventstream│◀─────┘        │
//!                 │          └───────────────────────────────────┘               │
//!                 │   config (file + env) · observability · lifecycle            │
//!                 └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use testupstream::config::{self, validation::validate_config, ConfigError};
use testupstream::lifecycle::startup;
use testupstream::observability::logging;

#[derive(Parser)]
#[command(name = "testupstream")]
#[command(about = "Mock upstream that validates requests and replies as instructed by directive headers", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overriding the config file.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.observability);

    tracing::info!("testupstream v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_id = %config.upstream.id,
        streaming_interval_ms = config.upstream.streaming_interval_ms,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
