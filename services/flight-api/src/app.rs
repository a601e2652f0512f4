//! Router assembly.

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Build the service router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Flight data
        .route("/query", get(handlers::query::query_handler))
        .route("/clusters", get(handlers::clusters::clusters_handler))
        // Map view defaults
        .route("/map", get(handlers::map::map_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
