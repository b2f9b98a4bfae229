//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use testupstream::config::UpstreamConfig;
use testupstream::{HttpServer, Shutdown};

/// A running upstream bound to an ephemeral local port.
pub struct TestUpstream {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestUpstream {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// `Host` header value reqwest sends to this server.
    #[allow(dead_code)]
    pub fn host(&self) -> String {
        self.addr.to_string()
    }
}

impl Drop for TestUpstream {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start an upstream with the given identity and streaming interval.
pub async fn spawn_upstream(id: &str, interval: Duration) -> TestUpstream {
    let mut config = UpstreamConfig::default();
    config.upstream.id = id.to_string();
    config.upstream.streaming_interval_ms = interval.as_millis() as u64;
    config.listener.bind_address = "127.0.0.1:0".to_string();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestUpstream { addr, shutdown }
}

/// HTTP client without pooling or proxies, so each test sees a fresh connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
