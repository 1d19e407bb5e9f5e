//! HTTP request handlers for the height service.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use terradat::{Coordinate, TerrainError};
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Query parameters for the single-coordinate height endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct HeightQuery {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

/// Successful single-coordinate height response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HeightResponse {
    /// Ground elevation in meters.
    pub altitude: f64,
    /// Latitude queried.
    pub lat: f64,
    /// Longitude queried.
    pub lon: f64,
}

/// One coordinate of a batch request.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct CoordinateParam {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

/// Body of the batch height endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchHeightsRequest {
    /// Coordinates to resolve, in order.
    pub coordinates: Vec<CoordinateParam>,
}

/// Successful batch height response.
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchHeightsResponse {
    /// One altitude per input coordinate, in input order.
    pub altitudes: Vec<f64>,
    /// Number of altitudes returned.
    pub count: usize,
}

/// Query parameters for the path endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PathQuery {
    /// Start latitude in decimal degrees.
    pub from_lat: f64,
    /// Start longitude in decimal degrees.
    pub from_lon: f64,
    /// End latitude in decimal degrees.
    pub to_lat: f64,
    /// End longitude in decimal degrees.
    pub to_lon: f64,
}

/// Successful path height response.
#[derive(Debug, Serialize, ToSchema)]
pub struct PathResponse {
    /// One altitude per sampled coordinate, in path order.
    pub altitudes: Vec<f64>,
    /// Great-circle length of the whole path in meters.
    pub total_distance: f64,
    /// Distance from the last intermediate sample to the end point.
    pub final_segment_distance: f64,
}

/// Query parameters for the carpet endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CarpetQuery {
    /// South-west corner latitude.
    pub sw_lat: f64,
    /// South-west corner longitude.
    pub sw_lon: f64,
    /// North-east corner latitude.
    pub ne_lat: f64,
    /// North-east corner longitude.
    pub ne_lon: f64,
    /// Whether only statistics were requested.
    #[serde(default)]
    pub stats_only: bool,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Block cache statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of decoded blocks in cache.
    pub cached_blocks: u64,
    /// Cache hit count.
    pub cache_hits: u64,
    /// Cache miss count.
    pub cache_misses: u64,
    /// Cache hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}

/// Get the ground elevation at one coordinate.
#[utoipa::path(
    get,
    path = "/heights",
    params(HeightQuery),
    responses(
        (status = 200, description = "Height found", body = HeightResponse),
        (status = 404, description = "Tile not available", body = ErrorResponse),
        (status = 500, description = "Tile data unreadable", body = ErrorResponse),
    ),
    tag = "heights"
)]
#[axum::debug_handler]
pub async fn get_height(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HeightQuery>,
) -> impl IntoResponse {
    tracing::debug!(lat = query.lat, lon = query.lon, "Height query");

    let coordinate = Coordinate::new(query.lat, query.lon);
    match state.terrain.coordinate_heights(&[coordinate]) {
        Ok(altitudes) => {
            tracing::info!(
                lat = query.lat,
                lon = query.lon,
                altitude = altitudes[0],
                "Height found"
            );
            (
                StatusCode::OK,
                Json(HeightResponse {
                    altitude: altitudes[0],
                    lat: query.lat,
                    lon: query.lon,
                }),
            )
                .into_response()
        }
        Err(abort) => error_response(abort.error),
    }
}

/// Get ground elevations for a batch of coordinates.
///
/// The batch stops at the first coordinate that fails; a failure response
/// carries no altitudes.
#[utoipa::path(
    post,
    path = "/heights",
    request_body = BatchHeightsRequest,
    responses(
        (status = 200, description = "All heights resolved", body = BatchHeightsResponse),
        (status = 404, description = "Tile not available", body = ErrorResponse),
    ),
    tag = "heights"
)]
#[axum::debug_handler]
pub async fn post_heights(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchHeightsRequest>,
) -> impl IntoResponse {
    tracing::debug!(count = request.coordinates.len(), "Batch height query");

    let coordinates: Vec<Coordinate> = request
        .coordinates
        .iter()
        .map(|c| Coordinate::new(c.lat, c.lon))
        .collect();

    match state.terrain.coordinate_heights(&coordinates) {
        Ok(altitudes) => {
            let count = altitudes.len();
            (
                StatusCode::OK,
                Json(BatchHeightsResponse { altitudes, count }),
            )
                .into_response()
        }
        Err(abort) => {
            tracing::warn!(
                resolved = abort.partial.len(),
                requested = coordinates.len(),
                error = %abort.error,
                "Batch height query aborted"
            );
            error_response(abort.error)
        }
    }
}

/// Get ground elevations along the path between two coordinates.
#[utoipa::path(
    get,
    path = "/path",
    params(PathQuery),
    responses(
        (status = 200, description = "Path heights resolved", body = PathResponse),
        (status = 404, description = "Tile not available", body = ErrorResponse),
    ),
    tag = "heights"
)]
#[axum::debug_handler]
pub async fn get_path(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
) -> impl IntoResponse {
    let from = Coordinate::new(query.from_lat, query.from_lon);
    let to = Coordinate::new(query.to_lat, query.to_lon);

    match state.terrain.path_heights(from, to) {
        Ok(heights) => (
            StatusCode::OK,
            Json(PathResponse {
                altitudes: heights.altitudes,
                total_distance: heights.total_distance,
                final_segment_distance: heights.final_segment_distance,
            }),
        )
            .into_response(),
        Err(abort) => {
            tracing::warn!(error = %abort.error, "Path height query failed");
            error_response(abort.error)
        }
    }
}

/// Carpet (area) queries are not served by this data source.
///
/// Always answers `501 Not Implemented` without touching the tile store.
#[utoipa::path(
    get,
    path = "/carpet",
    params(CarpetQuery),
    responses(
        (status = 501, description = "Carpet queries are unsupported", body = ErrorResponse),
    ),
    tag = "heights"
)]
#[axum::debug_handler]
pub async fn get_carpet(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CarpetQuery>,
) -> impl IntoResponse {
    let sw = Coordinate::new(query.sw_lat, query.sw_lon);
    let ne = Coordinate::new(query.ne_lat, query.ne_lon);

    match state.terrain.carpet_heights(sw, ne, query.stats_only) {
        Ok(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "carpet queries unexpectedly succeeded".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Create an error response for height queries.
fn error_response(e: TerrainError) -> axum::response::Response {
    let (status, message) = match &e {
        TerrainError::MissingTile { .. } => (StatusCode::NOT_FOUND, e.to_string()),
        TerrainError::Unsupported { .. } => (StatusCode::NOT_IMPLEMENTED, e.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    tracing::warn!(error = %e, "Height query failed");

    (status, Json(ErrorResponse { error: message })).into_response()
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get block cache statistics.
#[utoipa::path(
    get,
    path = "/stats",
    responses((status = 200, description = "Cache statistics", body = StatsResponse)),
    tag = "system"
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.terrain.cache_stats();

    Json(StatsResponse {
        cached_blocks: stats.entry_count,
        cache_hits: stats.hit_count,
        cache_misses: stats.miss_count,
        hit_rate: stats.hit_rate(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_query_deserialize() {
        let query: HeightQuery = serde_json::from_str(r#"{"lat": 47.3, "lon": 8.5}"#).unwrap();
        assert_eq!(query.lat, 47.3);
        assert_eq!(query.lon, 8.5);
    }

    #[test]
    fn test_batch_request_deserialize() {
        let body = r#"{"coordinates": [{"lat": 47.3, "lon": 8.5}, {"lat": -33.9, "lon": 18.4}]}"#;
        let request: BatchHeightsRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.coordinates.len(), 2);
        assert_eq!(request.coordinates[1].lat, -33.9);
    }

    #[test]
    fn test_height_response_serialize() {
        let response = HeightResponse {
            altitude: 432.0,
            lat: 47.3,
            lon: 8.5,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("432"));
        assert!(json.contains("47.3"));
    }

    #[test]
    fn test_health_response_serialize() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }
}
