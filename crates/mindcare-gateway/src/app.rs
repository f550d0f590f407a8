//! Router assembly: routes, CORS, upload limit and request logging.

use axum::{
    body::Body,
    extract::{ConnectInfo, DefaultBodyLimit},
    http::Request,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use mindcare_core::Triage;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;

/// Camera frames and phone photos routinely exceed axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub struct AppState {
    pub triage: Triage,
}

/// The CORS layer answers every OPTIONS request, `/predict_emotion` preflights included.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/predict_symptoms", post(handlers::symptoms::predict))
        .route("/predict_text", post(handlers::text::predict))
        .route("/predict_emotion", post(handlers::emotion::predict))
        .route("/predict_multimodal", post(handlers::multimodal::predict))
        .route("/chat", post(handlers::chat::chat))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(axum::middleware::from_fn(log_request))
        .layer(cors)
}

async fn log_request(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let peer = connect_info
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".into());
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        "[SYSTEM] {} {} from {} -> {} ({} ms)",
        method,
        path,
        peer,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
