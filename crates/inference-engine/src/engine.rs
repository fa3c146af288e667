//! Inference Adapter

use crate::loader::{load_artifacts, LoadedArtifacts};
use crate::pipeline::ProcessedFeatureVector;
use crate::{InferenceError, LoadError};
use feature_assembler::RawInputRecord;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Decimal places used when a prediction is shown
pub const DISPLAY_DECIMALS: u32 = 3;

/// Round half away from zero (`f64::round`) to `decimals` places.
///
/// Values too large to scale are already integral and returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// The model's output for one record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    value: f64,
}

impl PredictionResult {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    /// Unrounded prediction
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Prediction rounded for display
    pub fn rounded(&self) -> f64 {
        round_to(self.value, DISPLAY_DECIMALS)
    }
}

/// Prediction plus the intermediate data behind it
#[derive(Debug, Clone)]
pub struct InferenceReport {
    pub record: RawInputRecord,
    pub processed: ProcessedFeatureVector,
    pub prediction: PredictionResult,
    pub latency_ms: u64,
}

/// Run preprocessing then prediction for one record.
///
/// A single attempt: failures are returned, never retried.
pub fn infer(
    record: &RawInputRecord,
    artifacts: &LoadedArtifacts,
) -> Result<PredictionResult, InferenceError> {
    infer_detailed(record, artifacts).map(|report| report.prediction)
}

/// Like [`infer`], keeping the processed vector and timing for display
pub fn infer_detailed(
    record: &RawInputRecord,
    artifacts: &LoadedArtifacts,
) -> Result<InferenceReport, InferenceError> {
    let start = Instant::now();

    let processed = artifacts
        .preprocessor()
        .transform(&record.to_frame())
        .map_err(|e| {
            warn!(error = %e, "Preprocessing failed");
            InferenceError::PreprocessingFailed {
                message: e.to_string(),
            }
        })?;

    let outputs = artifacts.model().predict(&processed).map_err(|e| {
        warn!(error = %e, "Prediction failed");
        InferenceError::PredictionFailed {
            message: e.to_string(),
        }
    })?;

    let value = match outputs.first() {
        Some(v) if v.is_finite() => *v,
        Some(v) => {
            return Err(InferenceError::PredictionFailed {
                message: format!("model returned a non-finite prediction ({})", v),
            })
        }
        None => {
            return Err(InferenceError::PredictionFailed {
                message: "model returned no predictions".to_string(),
            })
        }
    };

    let latency_ms = start.elapsed().as_millis() as u64;
    debug!(prediction = value, latency_ms, "Inference completed");

    Ok(InferenceReport {
        record: record.clone(),
        processed,
        prediction: PredictionResult::new(value),
        latency_ms,
    })
}

/// Shared handle to the loaded artifacts
#[derive(Clone)]
pub struct InferenceEngine {
    artifacts: Arc<LoadedArtifacts>,
}

impl InferenceEngine {
    /// Wrap artifacts that are already loaded
    pub fn new(artifacts: LoadedArtifacts) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
        }
    }

    /// Load artifacts from disk; failure here means the service cannot start
    pub fn load(
        preprocessor_path: impl AsRef<Path>,
        model_path: impl AsRef<Path>,
    ) -> Result<Self, LoadError> {
        let artifacts = load_artifacts(preprocessor_path, model_path)?;
        info!("Inference engine ready");
        Ok(Self::new(artifacts))
    }

    /// Run inference on one record
    pub fn predict(&self, record: &RawInputRecord) -> Result<InferenceReport, InferenceError> {
        infer_detailed(record, &self.artifacts)
    }

    pub fn artifacts(&self) -> &LoadedArtifacts {
        &self.artifacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearRegressor;
    use crate::pipeline::{Predictor, Transformer};
    use crate::preprocessor::{ColumnPreprocessor, HandleUnknown, Step};
    use crate::{ArtifactError, ArtifactInfo};
    use feature_assembler::{
        assemble, Categories, FeatureFrame, StudentFlags, SubjectScores, CAREER_ASPIRATION_OPTIONS,
        COLUMNS, GENDER_OPTIONS,
    };
    use proptest::prelude::*;

    fn preprocessor() -> ColumnPreprocessor {
        ColumnPreprocessor::new(vec![
            Step::StandardScaler {
                name: "num".into(),
                columns: COLUMNS[..7].iter().map(|c| c.to_string()).collect(),
                mean: vec![72.0, 68.0, 70.0, 68.0, 66.0, 74.0, 65.0],
                scale: vec![14.0, 15.0, 14.0, 15.0, 16.0, 13.0, 15.0],
            },
            Step::OneHot {
                name: "cat".into(),
                columns: vec!["gender".into(), "career_aspiration".into()],
                categories: vec![
                    vec!["Female".into(), "Male".into()],
                    CAREER_ASPIRATION_OPTIONS.iter().map(|c| c.to_string()).collect(),
                ],
                handle_unknown: HandleUnknown::Error,
                drop_first: false,
            },
            Step::Passthrough {
                name: "remainder".into(),
                columns: vec!["part_time_job".into(), "extracurricular_activities".into()],
            },
        ])
        .unwrap()
    }

    fn artifacts() -> LoadedArtifacts {
        let pre = preprocessor();
        let mut coefficients = vec![2.9, 1.4, 2.4, 2.0, 1.9, 2.6, 1.2];
        coefficients.extend([0.4, -0.3]);
        coefficients.extend([0.7, 0.6, 0.2, 0.3, -0.2]);
        coefficients.extend([-1.4, 1.1]);
        assert_eq!(coefficients.len(), pre.output_width());
        LoadedArtifacts::new(
            pre,
            LinearRegressor::new(70.0, coefficients),
            ArtifactInfo::default(),
        )
    }

    fn record(scores: SubjectScores, gender: &str, career: &str) -> RawInputRecord {
        assemble(scores, StudentFlags::default(), Categories::new(gender, career))
    }

    struct FailingModel;

    impl Predictor for FailingModel {
        fn predict(&self, _: &ProcessedFeatureVector) -> Result<Vec<f64>, ArtifactError> {
            Err(ArtifactError::Backend("model exploded".into()))
        }
    }

    struct ConstantModel(Vec<f64>);

    impl Predictor for ConstantModel {
        fn predict(&self, _: &ProcessedFeatureVector) -> Result<Vec<f64>, ArtifactError> {
            Ok(self.0.clone())
        }
    }

    struct SingleFeature;

    impl Transformer for SingleFeature {
        fn transform(&self, _: &FeatureFrame) -> Result<ProcessedFeatureVector, ArtifactError> {
            ProcessedFeatureVector::new(vec!["x".into()], vec![1.0])
        }
    }

    #[test]
    fn test_default_form_predicts() {
        let result = infer(
            &record(SubjectScores::default(), "Male", "Engineering"),
            &artifacts(),
        )
        .unwrap();
        assert!(result.value().is_finite());
        assert!((0.0..=100.0).contains(&result.value()));
    }

    #[test]
    fn test_unknown_gender_fails_preprocessing() {
        let err = infer(
            &record(SubjectScores::default(), "NotAGender", "Engineering"),
            &artifacts(),
        )
        .unwrap_err();
        match err {
            InferenceError::PreprocessingFailed { message } => {
                assert!(!message.is_empty());
                assert!(message.contains("NotAGender"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_label_outside_fitted_vocabulary() {
        // "Other" is offered by the form but this preprocessor never saw it
        assert!(GENDER_OPTIONS.contains(&"Other"));
        let err = infer(&record(SubjectScores::uniform(0.0), "Other", "Others"), &artifacts())
            .unwrap_err();
        assert_eq!(err.kind(), "preprocessing");
    }

    #[test]
    fn test_all_zero_scores_accepted() {
        let r = record(SubjectScores::uniform(0.0), "Female", "Others");
        assert_eq!(r.math_score, 0.0);
        let result = infer(&r, &artifacts()).unwrap();
        assert!(result.value().is_finite());
    }

    #[test]
    fn test_prediction_failure_is_tagged() {
        let artifacts = LoadedArtifacts::new(preprocessor(), FailingModel, ArtifactInfo::default());
        let err = infer(
            &record(SubjectScores::default(), "Male", "Engineering"),
            &artifacts,
        )
        .unwrap_err();
        assert_eq!(
            err,
            InferenceError::PredictionFailed {
                message: "model exploded".into()
            }
        );
    }

    #[test]
    fn test_empty_and_nan_outputs_rejected() {
        let r = record(SubjectScores::default(), "Male", "Engineering");
        for outputs in [vec![], vec![f64::NAN]] {
            let artifacts = LoadedArtifacts::new(
                SingleFeature,
                ConstantModel(outputs),
                ArtifactInfo::default(),
            );
            assert_eq!(infer(&r, &artifacts).unwrap_err().kind(), "prediction");
        }
    }

    #[test]
    fn test_first_output_taken() {
        let artifacts = LoadedArtifacts::new(
            SingleFeature,
            ConstantModel(vec![42.5, 13.0]),
            ArtifactInfo::default(),
        );
        let r = record(SubjectScores::default(), "Male", "Engineering");
        assert_eq!(infer(&r, &artifacts).unwrap().value(), 42.5);
    }

    #[test]
    fn test_report_carries_intermediates() {
        let engine = InferenceEngine::new(artifacts());
        let r = record(SubjectScores::default(), "Female", "Arts");
        let report = engine.predict(&r).unwrap();
        assert_eq!(report.record, r);
        assert_eq!(report.processed.width(), 16);
        assert_eq!(report.processed.feature_names()[7], "cat__gender_Female");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(71.23456, 3), 71.235);
        assert_eq!(round_to(-2.0004, 3), -2.0);
        assert_eq!(PredictionResult::new(64.99999).rounded(), 65.0);
        assert_eq!(PredictionResult::new(12.5).rounded(), 12.5);
    }

    #[test]
    fn test_rounding_huge_values_stays_finite() {
        let huge = 1.0e306;
        assert_eq!(round_to(huge, 3), huge);
        assert_eq!(PredictionResult::new(-f64::MAX).rounded(), -f64::MAX);
        assert!(PredictionResult::new(1.7e308).rounded().is_finite());
    }

    proptest! {
        #[test]
        fn prop_valid_records_never_panic(
            math in 0.0f64..=100.0,
            english in 0.0f64..=100.0,
            gender in prop::sample::select(GENDER_OPTIONS.to_vec()),
            career in prop::sample::select(CAREER_ASPIRATION_OPTIONS.to_vec()),
            part_time in any::<bool>(),
        ) {
            let r = assemble(
                SubjectScores { math, english, ..Default::default() },
                StudentFlags { part_time_job: part_time, extracurricular_activities: false },
                Categories::new(gender, career),
            );
            match infer(&r, &artifacts()) {
                Ok(result) => prop_assert!(result.value().is_finite()),
                Err(e) => prop_assert!(!e.message().is_empty()),
            }
        }

        #[test]
        fn prop_inference_is_deterministic(score in 0.0f64..=100.0) {
            let artifacts = artifacts();
            let r = record(SubjectScores::uniform(score), "Male", "Medicine");
            let first = infer(&r, &artifacts).unwrap();
            let second = infer(&r, &artifacts).unwrap();
            prop_assert_eq!(first.value().to_bits(), second.value().to_bits());
        }

        #[test]
        fn prop_rounded_has_three_decimals(value in -1.0e4f64..1.0e4) {
            let rounded = round_to(value, 3);
            prop_assert!((rounded - value).abs() <= 0.0005 + 1e-9);
            prop_assert!(((rounded * 1000.0).round() - rounded * 1000.0).abs() < 1e-6);
        }
    }
}
