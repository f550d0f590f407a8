//! Feature normalizer: loosely-keyed client symptom payloads -> the classifier's ordered feature vector.
//!
//! The symptom checker UI sends ten checkbox keys; the classifier was trained on the
//! columns of the symptom dataset. [`SYMPTOM_ALIASES`] bridges the two.

use serde_json::Value;
use std::sync::Arc;

use crate::error::{TriageError, TriageResult};

/// Client-facing symptom key -> canonical training columns.
///
/// Column names are matched byte-for-byte; `"trouble_concentrating "` carries the
/// trailing space of the dataset header.
pub const SYMPTOM_ALIASES: &[(&str, &[&str])] = &[
    ("sadness", &["sadness", "depressive_symptoms", "low_mood"]),
    ("anxiety", &["severe_anxiety", "excessive_worry", "feeling_on_edge"]),
    (
        "sleep_disturbance",
        &[
            "sleep_disturbance",
            "sleep_problem_from_obsessive_thinking",
            "decreased_need_for_sleep",
        ],
    ),
    (
        "loss_of_interest",
        &["loss_of_interest", "loss_of_pleasure", "inability_to_feel_pleasure"],
    ),
    ("fatigue", &["fatigue", "feeling_easily_tired"]),
    (
        "difficulty_concentrating",
        &["difficulty_concentrating", "trouble_concentrating ", "mind_going_blank"],
    ),
    (
        "social_isolation",
        &["social_isolation", "social_withdrawal", "avoidance_of_social_activity"],
    ),
    ("irritability", &["irritability", "irritable_mood", "intense_anger"]),
    ("excessive_worry", &["excessive_worry", "excessive_fear_of_mistakes"]),
    ("low_energy", &["low_energy", "lack_of_motivation"]),
];

const TRUTHY: &[&str] = &["1", "true", "on", "yes"];

/// Ordered numeric slots, one per canonical feature, in training order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// All-zero vector over `names`.
    pub fn zeros(names: Arc<[String]>) -> Self {
        let values = vec![0.0; names.len()];
        Self { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.position(name).map(|i| self.values[i])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn set(&mut self, name: &str, value: f64) -> bool {
        match self.position(name) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }
}

/// Truthiness test applied to every payload value, whatever its JSON type.
///
/// `true` is positive. Everything else is rendered to text first (numbers by their JSON
/// spelling, `null` as `None`) and compared, trimmed and lowercased, against `1`/`true`/`on`/`yes`.
pub fn is_positive(value: &Value) -> bool {
    let rendered = match value {
        Value::Bool(b) => return *b,
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Null => "None".to_string(),
        Value::Array(_) | Value::Object(_) => return false,
    };
    let norm = rendered.trim().to_lowercase();
    TRUTHY.contains(&norm.as_str())
}

/// Canonical features a client key resolves to.
///
/// Aliased keys fan out through the table; an unaliased key is used directly when it
/// names a known feature; anything else resolves to nothing.
pub fn resolve_key<'a>(
    key: &'a str,
    known: &[String],
    aliases: &'a [(&'a str, &'a [&'a str])],
) -> Vec<&'a str> {
    if let Some((_, targets)) = aliases.iter().find(|(alias, _)| *alias == key) {
        return targets.to_vec();
    }
    if known.iter().any(|k| k == key) {
        vec![key]
    } else {
        Vec::new()
    }
}

/// Builds the classifier input from a symptom payload.
pub fn normalize(
    payload: &Value,
    known: Arc<[String]>,
    aliases: &[(&str, &[&str])],
) -> TriageResult<FeatureVector> {
    let entries = payload
        .as_object()
        .ok_or_else(|| TriageError::input("Symptom payload must be an object"))?;

    let mut vector = FeatureVector::zeros(known);
    for (key, value) in entries {
        let flag = if is_positive(value) { 1.0 } else { 0.0 };
        for feature in resolve_key(key, vector.names(), aliases) {
            vector.set(feature, flag);
        }
    }
    Ok(vector)
}

/// Client-facing keys the user marked positive, in payload order.
pub fn selected_symptoms(payload: &Value) -> Vec<String> {
    payload
        .as_object()
        .map(|entries| {
            entries
                .iter()
                .filter(|(_, v)| is_positive(v))
                .map(|(k, _)| k.clone())
                .collect()
        })
        .unwrap_or_default()
}
