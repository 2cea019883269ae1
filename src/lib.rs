//! Posture Monitor
//!
//! Scores posture from body landmarks (eye line vs. shoulder line) and keeps a
//! JSON-backed history of reference postures and checks behind a small REST API.

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod overlay;
pub mod scoring;
pub mod session;
pub mod store;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use config::Config;
use store::HistoryStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<HistoryStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: Arc::new(HistoryStore::new(config.data_path.clone())),
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/save-posture", post(api::save_posture))
        .route("/good-posture", get(api::get_good_posture))
        .route("/posture-history", get(api::get_posture_history))
        .route("/analyze", post(api::analyze_posture));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    let mut router = Router::new()
        .nest("/api", api_routes)
        .merge(health_routes);

    // Front-end assets for everything that is not an API route
    if let Some(dir) = &state.config.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
