//! Classifier adapters over exported scikit-learn artifacts.
//!
//! Artifacts are JSON exports of the fitted estimators (coefficients, vocabularies,
//! class lists). They are loaded once into a [`ModelRegistry`] and only read afterwards.

mod logistic;
mod registry;
mod tfidf;

pub use logistic::LogisticModel;
pub use registry::{
    ModelRegistry, LABEL_ENCODER_FILE, SYMPTOM_MODEL_FILE, TEXT_MODEL_FILE, TFIDF_VECTORIZER_FILE,
};
pub use tfidf::TfidfVectorizer;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use crate::error::ModelError;
use crate::features::FeatureVector;

/// Maps encoded class codes back to human-readable labels.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn inverse_transform(&self, code: i64) -> Result<&str, ModelError> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(String::as_str)
            .ok_or(ModelError::UnknownClass(code))
    }
}

#[derive(Debug, Deserialize)]
struct SymptomArtifact {
    feature_names: Vec<String>,
    classes: Vec<i64>,
    #[serde(flatten)]
    logistic: LogisticModel,
}

/// Symptom classifier: training-order feature names, encoded classes, label decoder.
#[derive(Debug, Clone)]
pub struct SymptomClassifier {
    feature_names: Arc<[String]>,
    classes: Vec<i64>,
    logistic: LogisticModel,
    encoder: LabelEncoder,
}

impl SymptomClassifier {
    pub fn new(
        feature_names: Vec<String>,
        classes: Vec<i64>,
        logistic: LogisticModel,
        encoder: LabelEncoder,
    ) -> Result<Self, ModelError> {
        if feature_names.is_empty() {
            return Err(ModelError::Shape("symptom model has no feature names".into()));
        }
        if feature_names.len() != logistic.n_features() {
            return Err(ModelError::Shape(format!(
                "{} feature names for {} coefficients",
                feature_names.len(),
                logistic.n_features()
            )));
        }
        if classes.len() != logistic.n_classes() {
            return Err(ModelError::Shape(format!(
                "{} classes for a {}-class model",
                classes.len(),
                logistic.n_classes()
            )));
        }
        Ok(Self {
            feature_names: feature_names.into(),
            classes,
            logistic,
            encoder,
        })
    }

    pub fn load(model_path: &Path, encoder_path: &Path) -> Result<Self, ModelError> {
        let artifact: SymptomArtifact = read_artifact(model_path)?;
        let encoder: LabelEncoder = read_artifact(encoder_path)?;
        Self::new(
            artifact.feature_names,
            artifact.classes,
            artifact.logistic,
            encoder,
        )
    }

    /// Canonical features in training order.
    pub fn feature_names(&self) -> Arc<[String]> {
        Arc::clone(&self.feature_names)
    }

    pub fn predict(&self, vector: &FeatureVector) -> Result<String, ModelError> {
        if vector.names() != &self.feature_names[..] {
            return Err(ModelError::Shape(
                "feature vector was not built from this model's feature names".into(),
            ));
        }
        let idx = self.logistic.predict_index(vector.values())?;
        let code = self.classes[idx];
        Ok(self.encoder.inverse_transform(code)?.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TextArtifact {
    classes: Vec<String>,
    #[serde(flatten)]
    logistic: LogisticModel,
}

/// Free-text status classifier: TF-IDF vectorizer + logistic regression over status labels.
#[derive(Debug, Clone)]
pub struct TextStatusModel {
    vectorizer: TfidfVectorizer,
    classes: Vec<String>,
    logistic: LogisticModel,
}

impl TextStatusModel {
    pub fn new(
        vectorizer: TfidfVectorizer,
        classes: Vec<String>,
        logistic: LogisticModel,
    ) -> Result<Self, ModelError> {
        if vectorizer.n_features() != logistic.n_features() {
            return Err(ModelError::Shape(format!(
                "vectorizer emits {} features, model expects {}",
                vectorizer.n_features(),
                logistic.n_features()
            )));
        }
        if classes.len() != logistic.n_classes() {
            return Err(ModelError::Shape(format!(
                "{} classes for a {}-class model",
                classes.len(),
                logistic.n_classes()
            )));
        }
        Ok(Self {
            vectorizer,
            classes,
            logistic,
        })
    }

    pub fn load(model_path: &Path, vectorizer_path: &Path) -> Result<Self, ModelError> {
        let artifact: TextArtifact = read_artifact(model_path)?;
        let vectorizer: TfidfVectorizer = read_artifact(vectorizer_path)?;
        Self::new(vectorizer, artifact.classes, artifact.logistic)
    }

    /// Predicted status and the probability of that status.
    pub fn predict(&self, text: &str) -> Result<(String, f64), ModelError> {
        let row = self.vectorizer.transform(text);
        let idx = self.logistic.predict_index(&row)?;
        let proba = self.logistic.predict_proba(&row)?;
        let confidence = proba.iter().cloned().fold(0.0, f64::max);
        Ok((self.classes[idx].clone(), confidence))
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ModelError::Parse {
        path: path.display().to_string(),
        source,
    })
}
