//! Capability traits for the trained artifacts

use crate::ArtifactError;
use feature_assembler::FeatureFrame;
use ndarray::{Array2, ArrayView1, Axis};

/// Output of a [`Transformer`]: a single-row matrix with named columns.
///
/// The engine never inspects it; it is handed verbatim to the [`Predictor`]
/// and exposed for diagnostic display.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFeatureVector {
    feature_names: Vec<String>,
    values: Array2<f64>,
}

impl ProcessedFeatureVector {
    /// Build a one-row vector. Names and values must have the same length.
    pub fn new(feature_names: Vec<String>, values: Vec<f64>) -> Result<Self, ArtifactError> {
        if feature_names.len() != values.len() {
            return Err(ArtifactError::Backend(format!(
                "{} feature names for {} values",
                feature_names.len(),
                values.len()
            )));
        }
        let values = Array2::from_shape_vec((1, feature_names.len()), values)
            .map_err(|e| ArtifactError::Backend(e.to_string()))?;
        Ok(Self {
            feature_names,
            values,
        })
    }

    /// Number of output features
    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    /// Output feature names, e.g. `num__math_score` or `cat__gender_Male`
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The full `(1, width)` matrix
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// The single row
    pub fn row(&self) -> ArrayView1<'_, f64> {
        self.values.index_axis(Axis(0), 0)
    }

    /// `(name, value)` pairs
    pub fn named(&self) -> impl Iterator<Item = (&str, f64)> {
        self.feature_names
            .iter()
            .map(String::as_str)
            .zip(self.row().into_iter().copied())
    }
}

/// Maps a raw input frame to the model's feature representation
pub trait Transformer: Send + Sync {
    fn transform(&self, frame: &FeatureFrame) -> Result<ProcessedFeatureVector, ArtifactError>;
}

/// Maps a processed vector to one prediction per row
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &ProcessedFeatureVector) -> Result<Vec<f64>, ArtifactError>;
}
