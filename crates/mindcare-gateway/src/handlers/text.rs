use axum::{extract::State, Json};
use mindcare_core::TextPrediction;
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extract::Statement;

/// POST /predict_text
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Statement(statement): Statement,
) -> Result<Json<TextPrediction>, ApiError> {
    Ok(Json(state.triage.predict_text(&statement).await?))
}
