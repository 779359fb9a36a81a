use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::StatusCode;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

use crate::api;
use crate::config::WebConfig;
use crate::controller::ViewStateController;

/// Longest a single request to the HTTP surface may take
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn app(config: &WebConfig, controller: Arc<ViewStateController>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(controller))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(cors)
}

pub async fn run(
    config: &WebConfig,
    controller: Arc<ViewStateController>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", config.port);

    axum::serve(listener, app(config, controller))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Web server failed")
}
