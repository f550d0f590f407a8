//! Process-wide model registry: loaded once at startup, read-only afterwards.

use std::path::Path;

use super::{SymptomClassifier, TextStatusModel};
use crate::error::{TriageError, TriageResult};

pub const SYMPTOM_MODEL_FILE: &str = "symptom_model.json";
pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";
pub const TEXT_MODEL_FILE: &str = "text_model.json";
pub const TFIDF_VECTORIZER_FILE: &str = "tfidf_vectorizer.json";

/// Loaded classifiers. An empty slot means that artifact pair failed to load;
/// requests needing it get [`TriageError::ModelUnavailable`].
#[derive(Debug, Default)]
pub struct ModelRegistry {
    symptom: Option<SymptomClassifier>,
    text: Option<TextStatusModel>,
}

impl ModelRegistry {
    pub fn new(symptom: Option<SymptomClassifier>, text: Option<TextStatusModel>) -> Self {
        Self { symptom, text }
    }

    /// Load both artifact pairs from `dir`. Each pair loads independently so a broken
    /// text model does not take the symptom checker down with it.
    pub fn load(dir: &Path) -> Self {
        let symptom = match SymptomClassifier::load(
            &dir.join(SYMPTOM_MODEL_FILE),
            &dir.join(LABEL_ENCODER_FILE),
        ) {
            Ok(clf) => {
                tracing::info!(
                    features = clf.feature_names().len(),
                    "[MODELS] Symptom classifier loaded"
                );
                Some(clf)
            }
            Err(e) => {
                tracing::warn!("[MODELS] Symptom classifier unavailable: {}", e);
                None
            }
        };

        let text = match TextStatusModel::load(
            &dir.join(TEXT_MODEL_FILE),
            &dir.join(TFIDF_VECTORIZER_FILE),
        ) {
            Ok(model) => {
                tracing::info!("[MODELS] Text status model loaded");
                Some(model)
            }
            Err(e) => {
                tracing::warn!("[MODELS] Text status model unavailable: {}", e);
                None
            }
        };

        Self { symptom, text }
    }

    pub fn symptom(&self) -> TriageResult<&SymptomClassifier> {
        self.symptom
            .as_ref()
            .ok_or(TriageError::ModelUnavailable("symptom"))
    }

    pub fn text(&self) -> TriageResult<&TextStatusModel> {
        self.text.as_ref().ok_or(TriageError::ModelUnavailable("text"))
    }
}
