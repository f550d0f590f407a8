//! TF-IDF text vectorizer matching the exported scikit-learn vocabulary.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::ModelError;

/// Default scikit-learn token pattern: runs of two or more word characters.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern"));

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawTfidf")]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

#[derive(Deserialize)]
struct RawTfidf {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TryFrom<RawTfidf> for TfidfVectorizer {
    type Error = ModelError;

    fn try_from(raw: RawTfidf) -> Result<Self, Self::Error> {
        TfidfVectorizer::new(raw.vocabulary, raw.idf)
    }
}

impl TfidfVectorizer {
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Result<Self, ModelError> {
        if let Some((term, idx)) = vocabulary.iter().find(|(_, idx)| **idx >= idf.len()) {
            return Err(ModelError::Shape(format!(
                "term {term:?} maps to column {idx}, idf has {} entries",
                idf.len()
            )));
        }
        Ok(Self { vocabulary, idf })
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    /// Raw counts x idf, L2-normalized. Text is lowercased before tokenizing.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let lower = text.to_lowercase();
        let mut row = vec![0.0; self.idf.len()];
        for token in TOKEN_PATTERN.find_iter(&lower) {
            if let Some(&col) = self.vocabulary.get(token.as_str()) {
                row[col] += 1.0;
            }
        }
        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }
        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in row.iter_mut() {
                *value /= norm;
            }
        }
        row
    }
}
