//! HTTP gateway exposing the research engine.
//!
//! POST /research streams newline-delimited JSON progress events;
//! POST /research/sync blocks and returns the finished report;
//! GET /history/* serves previously persisted reports.

mod handlers;
mod streaming;

use crate::config::GatewayConfig;
use crate::engine::Dispatcher;
use crate::store::ReportStore;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

const MAX_BODY_SIZE: usize = 65_536;
/// Deep-research runs chain several model calls; the sync endpoint has to
/// wait for all of them.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub store: Arc<dyn ReportStore>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/research", post(handlers::research_stream))
        .route("/research/sync", post(handlers::research_sync))
        .route("/history/reports", get(handlers::list_reports))
        .route("/history/reports/{id}", get(handlers::get_report))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(config: &GatewayConfig, state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "gateway listening");
    serve_with_listener(listener, state).await
}

/// Serve on an already-bound listener. Tests bind to an ephemeral port and
/// pass it in here.
pub async fn serve_with_listener(
    listener: tokio::net::TcpListener,
    state: AppState,
) -> anyhow::Result<()> {
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
