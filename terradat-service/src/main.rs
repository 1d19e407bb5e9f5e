//! Terradat Service - HTTP microservice for terrain height queries.
//!
//! A REST API for querying ground elevation from block-oriented terrain
//! grid tiles.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TERRADAT_DATA_DIR` | Directory containing .DAT tiles | Required |
//! | `TERRADAT_CACHE_SIZE` | Maximum decoded blocks in cache | 64 |
//! | `TERRADAT_GRID_SPACING` | Sample spacing in meters | 30 |
//! | `TERRADAT_PORT` | HTTP server port | 8080 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /heights?lat=X&lon=Y` - Height at one coordinate
//! - `POST /heights` - Batch height query
//! - `GET /path?from_lat=..&from_lon=..&to_lat=..&to_lon=..` - Path heights
//! - `GET /carpet` - Always 501; carpet queries are unsupported
//! - `GET /health` - Health check
//! - `GET /stats` - Cache statistics
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use terradat::TerrainServiceBuilder;
use terradat_service::{handlers, router, AppState};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the terradat service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Terradat Height Service",
        version = "0.1.0",
        description = "REST API for querying ground elevation from terrain grid tiles.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::get_height,
        handlers::post_heights,
        handlers::get_path,
        handlers::get_carpet,
        handlers::health_check,
        handlers::get_stats,
    ),
    components(
        schemas(
            handlers::HeightResponse,
            handlers::CoordinateParam,
            handlers::BatchHeightsRequest,
            handlers::BatchHeightsResponse,
            handlers::PathResponse,
            handlers::ErrorResponse,
            handlers::HealthResponse,
            handlers::StatsResponse,
        )
    ),
    tags(
        (name = "heights", description = "Height query endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "terradat_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load port from environment (service-specific config)
    let port: u16 = std::env::var("TERRADAT_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    // Build the terrain service from environment variables; the library
    // handles TERRADAT_DATA_DIR, TERRADAT_CACHE_SIZE, TERRADAT_GRID_SPACING
    let terrain = match TerrainServiceBuilder::from_env() {
        Ok(builder) => builder.build()?,
        Err(_) => {
            tracing::warn!("TERRADAT_DATA_DIR not set, using current directory");
            TerrainServiceBuilder::new(".").build()?
        }
    };

    tracing::info!(
        data_dir = %terrain.data_dir().display(),
        grid_spacing = terrain.grid_spacing(),
        cache_capacity = terrain.cache_capacity(),
        port = port,
        "Starting terradat service"
    );

    let state = Arc::new(AppState { terrain });

    // Build router
    let app = router(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
