use axum::{extract::State, Json};
use mindcare_core::MultimodalPrediction;
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extract::Statement;

/// POST /predict_multimodal
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Statement(statement): Statement,
) -> Result<Json<MultimodalPrediction>, ApiError> {
    Ok(Json(state.triage.predict_multimodal(&statement).await?))
}
