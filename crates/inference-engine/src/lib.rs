//! Score Inference Engine
//!
//! Wraps the trained preprocessor and regression model behind the
//! [`Transformer`] and [`Predictor`] capabilities and normalizes their
//! failures into [`InferenceError`].

mod engine;
mod loader;
mod model;
mod onnx;
mod pipeline;
mod preprocessor;

pub use engine::{
    infer, infer_detailed, round_to, InferenceEngine, InferenceReport, PredictionResult,
    DISPLAY_DECIMALS,
};
pub use loader::{load_artifacts, ArtifactInfo, LoadedArtifacts};
pub use model::LinearRegressor;
pub use onnx::OnnxRegressor;
pub use pipeline::{Predictor, ProcessedFeatureVector, Transformer};
pub use preprocessor::{ColumnPreprocessor, HandleUnknown, Step};

use std::path::PathBuf;
use thiserror::Error;

/// Per-submission inference failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// The preprocessor could not map the record (unseen label, missing column, wrong dtype)
    #[error("Preprocessing failed: {message}")]
    PreprocessingFailed { message: String },
    /// The model failed on an already preprocessed vector
    #[error("Prediction failed: {message}")]
    PredictionFailed { message: String },
}

impl InferenceError {
    /// Short tag used in responses and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::PreprocessingFailed { .. } => "preprocessing",
            InferenceError::PredictionFailed { .. } => "prediction",
        }
    }

    /// The underlying diagnostic, unmodified
    pub fn message(&self) -> &str {
        match self {
            InferenceError::PreprocessingFailed { message }
            | InferenceError::PredictionFailed { message } => message,
        }
    }
}

/// Errors raised from inside an artifact's `transform` or `predict`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArtifactError {
    #[error("columns are missing: {{{}}}", quoted(.0))]
    MissingColumns(Vec<String>),
    #[error("Found unknown categories [{}] in column {index} during transform", quoted(.values))]
    UnknownCategories {
        index: usize,
        column: String,
        values: Vec<String>,
    },
    #[error("column '{column}' has dtype {actual}, expected {expected}")]
    DtypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("X has {actual} features, but {estimator} is expecting {expected} features as input")]
    FeatureCountMismatch {
        estimator: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{0}")]
    Backend(String),
}

fn quoted(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Startup failures while loading artifacts
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to load ONNX model {path}: {message}")]
    Onnx { path: PathBuf, message: String },
    #[error("unsupported artifact format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("incompatible artifacts: {0}")]
    Incompatible(String),
}
