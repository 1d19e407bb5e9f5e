//! Terradat Service Library
//!
//! HTTP handlers and types for the terrain height service.
//! This library is used by both the terradat-service binary and
//! integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use terradat::TerrainService;

/// Application state shared across handlers.
pub struct AppState {
    /// Terrain service for height queries.
    pub terrain: TerrainService,
}

/// Build the API router over the shared state.
///
/// Middleware and the OpenAPI documentation routes are layered on by the
/// binary; tests drive this router directly.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/heights",
            get(handlers::get_height).post(handlers::post_heights),
        )
        .route("/path", get(handlers::get_path))
        .route("/carpet", get(handlers::get_carpet))
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{
    BatchHeightsRequest, BatchHeightsResponse, CoordinateParam, ErrorResponse, HealthResponse,
    HeightQuery, HeightResponse, PathQuery, PathResponse, StatsResponse,
};
