//! Regression model exported to ONNX, run with tract

use crate::pipeline::{Predictor, ProcessedFeatureVector};
use crate::{ArtifactError, LoadError};
use std::fmt::Display;
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::info;

/// ONNX regression graph with a fixed `f32[1, width]` input
pub struct OnnxRegressor {
    plan: TypedRunnableModel<TypedModel>,
    input_width: usize,
}

fn load_error(path: &Path, err: impl Display) -> LoadError {
    LoadError::Onnx {
        path: path.to_path_buf(),
        message: format!("{:#}", err),
    }
}

fn backend(err: impl Display) -> ArtifactError {
    ArtifactError::Backend(format!("{:#}", err))
}

impl OnnxRegressor {
    /// Load and optimize the graph for a single row of `input_width` features
    pub fn load(path: &Path, input_width: usize) -> Result<Self, LoadError> {
        info!(path = %path.display(), input_width, "Loading ONNX model");

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| load_error(path, e))?
            .with_input_fact(0, f32::fact([1, input_width]).into())
            .map_err(|e| load_error(path, e))?
            .into_optimized()
            .map_err(|e| load_error(path, e))?
            .into_runnable()
            .map_err(|e| load_error(path, e))?;

        Ok(Self { plan, input_width })
    }
}

impl Predictor for OnnxRegressor {
    fn predict(&self, features: &ProcessedFeatureVector) -> Result<Vec<f64>, ArtifactError> {
        if features.width() != self.input_width {
            return Err(ArtifactError::FeatureCountMismatch {
                estimator: "OnnxRegressor",
                expected: self.input_width,
                actual: features.width(),
            });
        }

        let row: Vec<f32> = features.row().iter().map(|v| *v as f32).collect();
        let input = tract_ndarray::Array2::from_shape_vec((1, self.input_width), row)
            .map_err(backend)?;
        let outputs = self
            .plan
            .run(tvec!(Tensor::from(input).into()))
            .map_err(backend)?;

        let output = outputs
            .first()
            .ok_or_else(|| ArtifactError::Backend("model produced no outputs".to_string()))?;
        let output = output.cast_to::<f64>().map_err(backend)?;
        let view = output.to_array_view::<f64>().map_err(backend)?;
        Ok(view.iter().copied().collect())
    }
}
