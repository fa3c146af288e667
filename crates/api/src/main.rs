//! Student Score Predictor - Main Entry Point

use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("=== Student Score Predictor v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        preprocessor = %config.artifacts.preprocessor_path.display(),
        model = %config.artifacts.model_path.display(),
        "Loading trained artifacts"
    );

    run_server(config).await
}
