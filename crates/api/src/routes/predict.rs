//! Prediction Route

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use feature_assembler::{Categories, FeatureFrame, StudentFlags, SubjectScores};
use inference_engine::InferenceReport;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

/// One form submission. Omitted fields take the form defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictRequest {
    pub math_score: f64,
    pub history_score: f64,
    pub physics_score: f64,
    pub chemistry_score: f64,
    pub biology_score: f64,
    pub english_score: f64,
    pub geography_score: f64,
    pub part_time_job: bool,
    pub extracurricular_activities: bool,
    pub gender: String,
    pub career_aspiration: String,
}

impl Default for PredictRequest {
    fn default() -> Self {
        let scores = SubjectScores::default();
        let categories = Categories::default();
        Self {
            math_score: scores.math,
            history_score: scores.history,
            physics_score: scores.physics,
            chemistry_score: scores.chemistry,
            biology_score: scores.biology,
            english_score: scores.english,
            geography_score: scores.geography,
            part_time_job: false,
            extracurricular_activities: false,
            gender: categories.gender,
            career_aspiration: categories.career_aspiration,
        }
    }
}

impl PredictRequest {
    fn into_parts(self) -> (SubjectScores, StudentFlags, Categories) {
        (
            SubjectScores {
                math: self.math_score,
                history: self.history_score,
                physics: self.physics_score,
                chemistry: self.chemistry_score,
                biology: self.biology_score,
                english: self.english_score,
                geography: self.geography_score,
            },
            StudentFlags {
                part_time_job: self.part_time_job,
                extracurricular_activities: self.extracurricular_activities,
            },
            Categories::new(self.gender, self.career_aspiration),
        )
    }
}

/// Preprocessed vector as shown to the user
#[derive(Debug, Serialize)]
pub struct ProcessedView {
    pub feature_names: Vec<String>,
    pub values: Vec<f64>,
}

/// Successful prediction with its diagnostic views
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Predicted final score, rounded to three decimals
    pub prediction: f64,
    pub raw_input: FeatureFrame,
    pub processed: ProcessedView,
    pub latency_ms: u64,
}

impl From<InferenceReport> for PredictResponse {
    fn from(report: InferenceReport) -> Self {
        Self {
            prediction: report.prediction.rounded(),
            raw_input: report.record.to_frame(),
            processed: ProcessedView {
                feature_names: report.processed.feature_names().to_vec(),
                values: report.processed.row().to_vec(),
            },
            latency_ms: report.latency_ms,
        }
    }
}

/// Assemble the submission and run it through the loaded artifacts
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (scores, flags, categories) = request.into_parts();

    let record = state
        .assembler
        .assemble_checked(scores, flags, categories)
        .inspect_err(|_| {
            counter!("prediction_failures_total", "kind" => "validation").increment(1)
        })?;

    let start = Instant::now();
    let result = state.engine.predict(&record);
    histogram!("inference_latency_seconds").record(start.elapsed().as_secs_f64());

    match result {
        Ok(report) => {
            counter!("predictions_total").increment(1);
            info!(
                prediction = report.prediction.value(),
                latency_ms = report.latency_ms,
                "Prediction complete"
            );
            Ok(Json(PredictResponse::from(report)))
        }
        Err(e) => {
            counter!("prediction_failures_total", "kind" => e.kind()).increment(1);
            Err(e.into())
        }
    }
}
