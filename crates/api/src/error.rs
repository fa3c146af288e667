//! Request-level errors and their HTTP rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feature_assembler::ValidationError;
use inference_engine::InferenceError;
use serde::Serialize;
use thiserror::Error;

const PREPROCESSING_SUMMARY: &str = "Preprocessing failed. This usually means the input column \
     names or categorical labels do not match the training data.";

const UNSEEN_CATEGORY_HINT: &str = "If the model reports unseen categories, update the form \
     options to match the training labels or retrain the preprocessor with more categories.";

/// Errors returned from API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) | ApiError::Inference(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::BadRequest(detail) => ErrorBody {
                error: "Invalid request body.".to_string(),
                kind: "bad_request",
                detail: detail.clone(),
                hint: None,
            },
            ApiError::Validation(e) => ErrorBody {
                error: "Invalid input.".to_string(),
                kind: "validation",
                detail: e.to_string(),
                hint: None,
            },
            ApiError::Inference(e @ InferenceError::PreprocessingFailed { .. }) => ErrorBody {
                error: PREPROCESSING_SUMMARY.to_string(),
                kind: e.kind(),
                detail: e.message().to_string(),
                hint: Some(UNSEEN_CATEGORY_HINT),
            },
            ApiError::Inference(e @ InferenceError::PredictionFailed { .. }) => ErrorBody {
                error: "Prediction failed.".to_string(),
                kind: e.kind(),
                detail: e.message().to_string(),
                hint: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
