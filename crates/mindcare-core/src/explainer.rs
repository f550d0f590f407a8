//! Generative explainer: empathetic text from the Gemini `generateContent` API.
//!
//! Best-effort enrichment. One attempt per request, bounded by a client timeout, and
//! every failure comes back as a [`GenerationError`] for the fallback resolver to absorb.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{AppConfig, DEFAULT_GEMINI_BASE_URL};
use crate::error::GenerationError;

/// Harm categories relaxed for every request: mental-health disclosures routinely trip them.
pub const RELAXED_HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
pub const BLOCK_THRESHOLD: &str = "BLOCK_NONE";

/// Credential travels in a header so it never appears in a request URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Runs the explainer and turns any failure into `None`, logging why.
pub async fn explain_or_log(explainer: &dyn Explainer, prompt: &str) -> Option<String> {
    match explainer.explain(prompt).await {
        Ok(text) => {
            let preview: String = text.chars().take(100).collect();
            tracing::info!("[GENERATION] Response received: {}...", preview);
            Some(text)
        }
        Err(GenerationError::MissingCredential) => {
            tracing::debug!("[GENERATION] Skipped: no credential configured");
            None
        }
        Err(e) => {
            tracing::warn!("[GENERATION] Unavailable: {}", e);
            None
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<PartOut<'a>>,
}

#[derive(Serialize)]
struct PartOut<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartIn>,
}

#[derive(Debug, Deserialize)]
struct PartIn {
    text: Option<String>,
}

fn safety_settings() -> Vec<SafetySetting> {
    RELAXED_HARM_CATEGORIES
        .iter()
        .map(|&category| SafetySetting {
            category,
            threshold: BLOCK_THRESHOLD,
        })
        .collect()
}

/// Concatenated text of the first candidate, trimmed. Empty or absent -> `Empty`.
fn extract_text(body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Decode(e.to_string()))?;
    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        Err(GenerationError::Empty)
    } else {
        Ok(text.to_string())
    }
}

/// Gemini REST client. Without an API key every call returns `MissingCredential`.
pub struct GeminiExplainer {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiExplainer {
    pub fn new(api_key: Option<String>, model: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            model: model.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            client,
        }
    }

    pub fn from_config(config: &AppConfig, api_key: Option<String>) -> Self {
        Self::new(
            api_key,
            &config.gemini_model,
            Duration::from_secs(config.generation_timeout_secs),
        )
        .with_base_url(&config.gemini_base_url)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl Explainer for GeminiExplainer {
    async fn explain(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredential)?;

        tracing::info!("[GENERATION] Calling Gemini ({})...", self.model);
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![PartOut { text: prompt }],
            }],
            safety_settings: safety_settings(),
        };

        let res = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Status(status.as_u16(), text));
        }
        extract_text(&text)
    }
}
