//! Student Score Predictor API Server
//!
//! Serves the input form description, runs submissions through the loaded
//! preprocessor and model, and returns the prediction with its diagnostics.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use anyhow::Context;
use feature_assembler::FeatureAssembler;
use inference_engine::{ArtifactInfo, InferenceEngine};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
mod routes;

pub use crate::config::{AppConfig, LogFormat, LoggingConfig};
pub use crate::error::ApiError;

/// Application state shared across handlers. Read-only once built.
pub struct AppState {
    /// Loaded preprocessor and model
    pub engine: InferenceEngine,
    /// Range-checking assembler for incoming submissions
    pub assembler: FeatureAssembler,
    /// Prometheus handle, when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: InferenceEngine, assembler: FeatureAssembler) -> Self {
        Self {
            engine,
            assembler,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Attach a Prometheus handle for the `/metrics` route
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub artifacts: ArtifactInfo,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/form", get(routes::form::get_form))
        .route("/api/v1/predict", post(routes::predict::predict))
        .route("/metrics", get(routes::prometheus::render))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        artifacts: state.engine.artifacts().info().clone(),
    })
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid log level '{}'", config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {}", e))
}

/// Load artifacts, then serve until the listener fails.
///
/// Artifact loading happens before binding; a load failure means no request
/// is ever served.
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let engine = InferenceEngine::load(
        &config.artifacts.preprocessor_path,
        &config.artifacts.model_path,
    )
    .context("Failed to load model artifacts")?;

    let assembler = FeatureAssembler::new((&config.validation).into());
    let mut state = AppState::new(engine, assembler);

    if config.server.metrics {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        state = state.with_metrics(handle);
    }

    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.server.addr);

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
