use axum::{extract::State, Json};
use mindcare_core::ChatReply;
use std::sync::Arc;

use crate::app::AppState;
use crate::extract::LenientJson;

/// POST /chat. A malformed body is an empty message; the reply is never empty.
pub async fn chat(State(state): State<Arc<AppState>>, LenientJson(body): LenientJson) -> Json<ChatReply> {
    let message = body
        .as_ref()
        .and_then(|b| b.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or_default();
    Json(state.triage.chat(message).await)
}
