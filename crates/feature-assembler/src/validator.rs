//! Range checking for untrusted score input

use crate::error::ValidationError;
use crate::record::SubjectScores;
use crate::domain::{SCORE_MAX, SCORE_MIN};
use serde::{Deserialize, Serialize};

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Accepted subject score range, inclusive
    pub score_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            score_range: (SCORE_MIN, SCORE_MAX),
        }
    }
}

/// Score validator
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field, value });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate one subject score
    pub fn validate_score(&self, field: &'static str, value: f64) -> Result<(), ValidationError> {
        self.validate_range(field, value, self.config.score_range)
    }

    /// Validate all seven scores, stopping at the first failure
    pub fn validate_scores(&self, scores: &SubjectScores) -> Result<(), ValidationError> {
        scores
            .named()
            .into_iter()
            .try_for_each(|(field, value)| self.validate_score(field, value))
    }
}
