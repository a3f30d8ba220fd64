//! HTTP API: router, shared state, and handlers.

pub mod compose;
pub mod error;
pub mod recommend;
pub mod types;
pub mod validation;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use nexus_core::engine::{Engine, GenerateOptions};

/// Maximum accepted request-body size.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// State shared by every handler: the process-wide engine and the
/// generation options configured at startup.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub generate: GenerateOptions,
}

impl AppState {
    pub fn new(engine: Arc<Engine>, generate: GenerateOptions) -> Self {
        Self { engine, generate }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/compose", post(compose::compose))
        .route("/api/recommend", post(recommend::recommend))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}
