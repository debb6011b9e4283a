//! HTTP server exposing the SOC map layer.
//!
//! Provides endpoints for:
//! - `GET /api/map/h3-soc` - GeoJSON hex layer for a CSV in the data directory
//! - `GET /health` - Health check

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::grid::GridIndexer;
use crate::pipeline::{MapQuery, run_file};

/// Settings for `serve`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub data_dir: PathBuf,
    pub cors_origin: String,
}

/// Shared state for the HTTP server. Read-only after startup.
pub struct AppState {
    /// Directory CSV sources are resolved against
    pub data_dir: PathBuf,
    /// Grid used for every request
    pub grid: Arc<dyn GridIndexer + Send + Sync>,
}

/// The `file` query parameter; the map parameters are read separately.
#[derive(Debug, Deserialize)]
pub struct SourceParams {
    pub file: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Builds the router with CORS restricted to `cors_origin`.
pub fn router(state: Arc<AppState>, cors_origin: &str) -> Result<Router> {
    let origin: HeaderValue = cors_origin
        .parse()
        .with_context(|| format!("invalid CORS origin '{cors_origin}'"))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Ok(Router::new()
        .route("/api/map/h3-soc", get(hex_map_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors))
}

/// Binds `config.listen` and serves until the process exits.
pub async fn serve(config: ServerConfig, grid: Arc<dyn GridIndexer + Send + Sync>) -> Result<()> {
    let state = Arc::new(AppState {
        data_dir: config.data_dir.clone(),
        grid,
    });
    let app = router(state, &config.cors_origin)?;

    info!(
        addr = %config.listen,
        data_dir = %config.data_dir.display(),
        cors_origin = %config.cors_origin,
        "SOC map server listening"
    );

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /api/map/h3-soc - Aggregated SOC hex layer as a GeoJSON FeatureCollection
pub async fn hex_map_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(source): Query<SourceParams>,
    Query(query): Query<MapQuery>,
) -> Response {
    if !is_plain_file_name(&source.file) {
        warn!(file = %source.file, "Rejected file name");
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid file name {}.", source.file),
        );
    }

    let path = state.data_dir.join(&source.file);
    let grid = state.grid.clone();

    let result = tokio::task::spawn_blocking(move || run_file(&path, &query, &*grid)).await;

    match result {
        Ok(Ok(collection)) => Json(collection).into_response(),
        Ok(Err(e)) => pipeline_error_response(&source.file, e),
        Err(e) => {
            error!(error = %e, "Pipeline task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
        }
    }
}

/// Accepts a single normal path component, nothing that walks out of the data directory.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn pipeline_error_response(file: &str, err: PipelineError) -> Response {
    match err {
        PipelineError::SourceNotFound(_) => {
            info!(file, "Source not found");
            error_response(StatusCode::NOT_FOUND, format!("File {file} not found."))
        }
        PipelineError::MissingColumns(_) => {
            warn!(file, error = %err, "Source failed schema check");
            error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        PipelineError::Grid(_) => {
            warn!(file, error = %err, "Grid rejected request");
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        PipelineError::Csv(_) | PipelineError::Io(_) => {
            error!(file, error = %err, "Failed to read source");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
