//! HTTP server setup and request pipeline.
//!
//! # Responsibilities
//! - Create the Axum router (`/health` + catch-all)
//! - Wire up middleware (tracing, request ID)
//! - Run each request through decode → validate → synthesize → encode
//! - Serve until the shutdown trigger fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{UpstreamConfig, UpstreamSettings};
use crate::directive::RequestDirectives;
use crate::encoding::ResponseType;
use crate::error::UpstreamResult;
use crate::http::request::validate;
use crate::http::response::ResponsePlan;
use crate::lifecycle::shutdown;
use crate::observability::metrics;

/// Process-wide values, fixed at startup and shared read-only by all requests.
#[derive(Clone, Debug)]
pub struct AppState {
    pub identity: Arc<str>,
    pub streaming_interval: Duration,
    pub max_body_size: usize,
}

impl AppState {
    pub fn new(settings: &UpstreamSettings) -> Self {
        Self {
            identity: Arc::from(settings.id.as_str()),
            streaming_interval: settings.streaming_interval(),
            max_body_size: settings.max_body_size,
        }
    }
}

/// HTTP server for the mock upstream.
pub struct HttpServer {
    router: Router,
    config: UpstreamConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: UpstreamConfig) -> Self {
        let state = AppState::new(&config.upstream);
        let router = build_router(state);
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream_id = %self.config.upstream.id,
            streaming_interval_ms = self.config.upstream.streaming_interval_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler).post(health_handler))
        .fallback(upstream_handler)
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn health_handler() -> StatusCode {
    StatusCode::OK
}

/// Catch-all handler: every directive-driven request lands here.
async fn upstream_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();

    let (response_type, response) = match handle(&state, request).await {
        Ok((response_type, response)) => (response_type, response),
        Err(e) => (ResponseType::Plain, e.into_response()),
    };

    metrics::record_request(response.status().as_u16(), response_type, start);
    response
}

async fn handle(state: &AppState, request: Request<Body>) -> UpstreamResult<(ResponseType, Response)> {
    let directives = RequestDirectives::from_headers(request.headers())?;
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    validate(&directives, request, &state.identity, state.max_body_size).await?;

    let plan = ResponsePlan::build(directives, &path)?;
    let response_type = plan.response_type;

    tracing::debug!(
        method = %method,
        path = %path,
        status = plan.status.as_u16(),
        response_type = response_type.as_str(),
        body_len = plan.body.len(),
        "Responding"
    );

    Ok((response_type, plan.into_response(state.streaming_interval).await))
}
