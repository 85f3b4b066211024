//! Axum-based HTTP gateway for the chat engine.
//!
//! - `GET /health` liveness check
//! - `POST /api/chat` one mood-adaptive turn
//!
//! Request bodies are capped and every request carries a timeout that covers
//! the generation timeout plus a fixed margin.

mod handlers;

use handlers::{handle_chat, handle_health};

use crate::chat::TurnOrchestrator;
use crate::config::Config;
use crate::mood::random_source;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Default maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;
/// Added on top of the generation timeout for the whole request.
pub const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<TurnOrchestrator>,
}

/// Request timeout for a given generation timeout.
pub fn request_timeout(generation_timeout: Duration) -> Duration {
    generation_timeout + Duration::from_secs(REQUEST_TIMEOUT_MARGIN_SECS)
}

/// Build the router with its body limit and timeout layers.
pub fn build_router(state: AppState, body_limit: usize, timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/chat", post(handle_chat))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
}

/// Run the HTTP gateway using axum.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid gateway address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind gateway on {addr}"))?;
    run_gateway_with_listener(host, listener, config).await
}

/// Run the gateway on an already-bound listener with the configured provider.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let orchestrator = TurnOrchestrator::from_config(&config, random_source(config.chat.seed))?;

    let actual_port = listener.local_addr()?.port();
    println!("◆ moodline gateway listening on http://{host}:{actual_port}");
    println!("  GET  /health");
    println!("  POST /api/chat");
    println!("  Press Ctrl+C to stop.\n");

    run_gateway_with_orchestrator(listener, Arc::new(orchestrator), &config).await
}

/// Serve a prepared orchestrator. Integration tests inject scripted providers
/// through this entry point.
pub async fn run_gateway_with_orchestrator(
    listener: tokio::net::TcpListener,
    orchestrator: Arc<TurnOrchestrator>,
    config: &Config,
) -> Result<()> {
    let timeout = request_timeout(orchestrator.settings().generation_timeout);
    let body_limit = config.gateway.max_body_bytes;
    tracing::info!(
        addr = %listener.local_addr()?,
        body_limit,
        timeout_secs = timeout.as_secs(),
        model = %orchestrator.settings().model,
        "Gateway started"
    );

    let app = build_router(AppState { orchestrator }, body_limit, timeout);
    axum::serve(listener, app).await?;

    Ok(())
}
