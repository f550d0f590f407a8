//! MindCare Gateway: HTTP surface for symptom, text, emotion and multimodal triage.

mod app;
mod error;
mod extract;
mod handlers;

use mindcare_core::{
    gemini_api_key, AppConfig, GeminiExplainer, HttpEmotionAnalyzer, ModelRegistry, Triage,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    tracing::info!("[SYSTEM] MindCare gateway v{}", mindcare_core::version());

    let models = ModelRegistry::load(Path::new(&config.model_dir));

    let api_key = gemini_api_key();
    if api_key.is_none() {
        tracing::warn!("[SYSTEM] GEMINI_API_KEY not set; explanations will use static templates");
    }
    let explainer = GeminiExplainer::from_config(&config, api_key);

    if config.emotion_analyzer_url.is_none() {
        tracing::warn!("[SYSTEM] emotion_analyzer_url not set; /predict_emotion will answer 503");
    }
    let analyzer = HttpEmotionAnalyzer::from_config(&config);

    let state = Arc::new(AppState {
        triage: Triage::new(Arc::new(models), Arc::new(explainer), Arc::new(analyzer)),
    });
    let app = app::router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("[SYSTEM] Listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
