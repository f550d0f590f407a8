//! HTTP mapping for triage failures.
//!
//! Client bodies carry a fixed human-readable `error`; internal detail goes to the log only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mindcare_core::TriageError;
use serde_json::json;

pub const MODELS_NOT_LOADED: &str = "Models not loaded. Please check server logs.";
pub const SYMPTOM_SERVICE_UNAVAILABLE: &str =
    "The prediction service is temporarily unavailable. Please try again later.";
pub const ANALYZER_UNAVAILABLE: &str =
    "Emotion detection service is temporarily unavailable. Please try again later.";
pub const FACE_DETECTION_FAILED: &str =
    "Face detection failed. Please ensure your face is clearly visible.";
pub const INTERNAL_ERROR: &str = "An unexpected error occurred. Please try again later.";

#[derive(Debug)]
pub struct ApiError(pub TriageError);

impl From<TriageError> for ApiError {
    fn from(err: TriageError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            TriageError::Input(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": msg, "message": msg }),
            ),
            TriageError::ModelUnavailable(which) => {
                tracing::error!("[SYSTEM] Request needs the {} model, which is not loaded", which);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": MODELS_NOT_LOADED }),
                )
            }
            TriageError::AnalyzerUnavailable(detail) => {
                tracing::error!("[SYSTEM] Emotion analyzer unavailable: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": ANALYZER_UNAVAILABLE }),
                )
            }
            TriageError::FaceDetection(detail) => {
                tracing::warn!("[SYSTEM] Face detection failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": FACE_DETECTION_FAILED }),
                )
            }
            TriageError::Internal(detail) => {
                tracing::error!("[SYSTEM] Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": INTERNAL_ERROR }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// The symptom checker answers an unloaded model with a full, safe prediction shape.
pub fn symptom_service_unavailable() -> Response {
    tracing::error!("[SYSTEM] Symptom prediction requested but models are not loaded");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "error": MODELS_NOT_LOADED,
            "prediction": "Unknown",
            "ai_description": SYMPTOM_SERVICE_UNAVAILABLE,
        })),
    )
        .into_response()
}
