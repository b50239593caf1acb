use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Json, Router, routing::get};
use serde_json::json;

use super::handlers;

pub struct AppState {
    /// Store queried when a request carries no `db` override.
    pub db_path: PathBuf,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/repos", get(handlers::list_repos))
        .route("/assets", get(handlers::list_assets))
        .route("/assets/{id}", get(handlers::get_asset))
        .route("/modules", get(handlers::list_modules))
        .route("/modules/{id}/files", get(handlers::list_module_files))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
