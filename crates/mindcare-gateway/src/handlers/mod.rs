//! Route handlers. Each one only adapts HTTP to a `Triage` operation.

pub mod chat;
pub mod emotion;
pub mod multimodal;
pub mod symptoms;
pub mod text;

use axum::Json;
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "MindCare triage backend is running" }))
}

pub async fn health() -> &'static str {
    "OK"
}
