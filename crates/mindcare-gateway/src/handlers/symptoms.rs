use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use mindcare_core::TriageError;
use std::sync::Arc;

use crate::app::AppState;
use crate::error::{symptom_service_unavailable, ApiError};
use crate::extract::LenientJson;

/// POST /predict_symptoms
pub async fn predict(State(state): State<Arc<AppState>>, LenientJson(body): LenientJson) -> Response {
    match state.triage.predict_symptoms(body).await {
        Ok(prediction) => Json(prediction).into_response(),
        Err(TriageError::ModelUnavailable(_)) => symptom_service_unavailable(),
        Err(e) => ApiError(e).into_response(),
    }
}
