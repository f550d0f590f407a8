use axum::{extract::State, Json};
use mindcare_core::EmotionOutcome;
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extract::ImageUpload;

/// POST /predict_emotion: multipart upload with an `image` field.
///
/// "No face" and "could not read an emotion" are 200 responses carrying `error`.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    ImageUpload(image): ImageUpload,
) -> Result<Json<EmotionOutcome>, ApiError> {
    tracing::info!(
        "[SYSTEM] /predict_emotion received {} bytes",
        image.as_ref().map_or(0, Vec::len)
    );
    Ok(Json(state.triage.predict_emotion(image).await?))
}
