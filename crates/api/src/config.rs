//! Configuration management for the predictor service

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use feature_assembler::{ValidationConfig, SCORE_MAX, SCORE_MIN};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Prefix for environment overrides, e.g. `STUDENT_SCORE__SERVER__ADDR`
pub const ENV_PREFIX: &str = "STUDENT_SCORE";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub validation: ValidationSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Expose Prometheus metrics on `/metrics`
    #[serde(default = "default_true")]
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            metrics: true,
        }
    }
}

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_true() -> bool {
    true
}

/// Locations of the trained artifacts
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_preprocessor_path")]
    pub preprocessor_path: PathBuf,
    /// `.json` linear model or `.onnx` graph
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            preprocessor_path: default_preprocessor_path(),
            model_path: default_model_path(),
        }
    }
}

fn default_preprocessor_path() -> PathBuf {
    PathBuf::from("artifacts/preprocessor.json")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("artifacts/final_score_model.json")
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or a full EnvFilter string)
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Score bounds enforced on incoming requests
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationSettings {
    #[serde(default = "default_score_min")]
    pub score_min: f64,
    #[serde(default = "default_score_max")]
    pub score_max: f64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            score_min: SCORE_MIN,
            score_max: SCORE_MAX,
        }
    }
}

fn default_score_min() -> f64 {
    SCORE_MIN
}

fn default_score_max() -> f64 {
    SCORE_MAX
}

impl From<&ValidationSettings> for ValidationConfig {
    fn from(settings: &ValidationSettings) -> Self {
        ValidationConfig {
            score_range: (settings.score_min, settings.score_max),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file (optional) overlaid by environment variables
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env<P: AsRef<Path>>(path: P, environment: Environment) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(environment.separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if config.validation.score_min > config.validation.score_max {
            anyhow::bail!(
                "validation.score_min ({}) is greater than validation.score_max ({})",
                config.validation.score_min,
                config.validation.score_max
            );
        }
        Ok(config)
    }
}
