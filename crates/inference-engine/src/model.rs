//! Linear regression model exported as JSON

use crate::pipeline::{Predictor, ProcessedFeatureVector};
use crate::ArtifactError;
use ndarray::Array1;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct LinearExport {
    intercept: f64,
    coefficients: Vec<f64>,
}

/// `y = intercept + coefficients · x`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressor {
    intercept: f64,
    coefficients: Array1<f64>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients: Array1::from(coefficients),
        }
    }

    /// Parse the JSON export
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let export: LinearExport = serde_json::from_str(json)?;
        Ok(Self::new(export.intercept, export.coefficients))
    }

    /// Number of features the model was fitted on
    pub fn n_features_in(&self) -> usize {
        self.coefficients.len()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Predictor for LinearRegressor {
    fn predict(&self, features: &ProcessedFeatureVector) -> Result<Vec<f64>, ArtifactError> {
        if features.width() != self.n_features_in() {
            return Err(ArtifactError::FeatureCountMismatch {
                estimator: "LinearRegression",
                expected: self.n_features_in(),
                actual: features.width(),
            });
        }
        let scores = features.values().dot(&self.coefficients) + self.intercept;
        Ok(scores.to_vec())
    }
}
