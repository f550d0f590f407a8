//! MindCare triage core.
//! Symptom, free-text and facial-emotion triage with supportive explanations.

pub mod config;
pub mod emotion;
pub mod error;
pub mod explainer;
pub mod fallback;
pub mod features;
pub mod keywords;
pub mod model;
pub mod prompts;
pub mod triage;

pub use config::{gemini_api_key, AppConfig};
pub use emotion::{dominant_emotion, DominantEmotion, EmotionAnalyzer, HttpEmotionAnalyzer};
pub use error::{AnalyzerError, GenerationError, ModelError, TriageError, TriageResult};
pub use explainer::{Explainer, GeminiExplainer};
pub use fallback::{Explanation, ExplanationSource, FallbackTable};
pub use features::FeatureVector;
pub use model::ModelRegistry;
pub use triage::{
    ChatReply, EmotionOutcome, MultimodalPrediction, SymptomPrediction, TextPrediction, Triage,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
