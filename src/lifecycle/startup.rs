//! Startup orchestration.
//!
//! Config is already loaded and logging installed by the time we get here.
//! Order: metrics exporter, listener, signal wiring, serve.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::UpstreamConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Bind and serve until SIGINT/SIGTERM.
pub async fn run(config: UpstreamConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    Ok(())
}
