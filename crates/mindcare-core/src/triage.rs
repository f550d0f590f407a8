//! Request orchestrators: validate, score or classify, explain, resolve.
//!
//! Each operation ends in either a prediction with a non-empty explanation or a
//! [`TriageError`]. A generation failure never ends a request; it only swaps the
//! explanation for a static template.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::emotion::{capitalize, dominant_emotion, prepare_image, DominantEmotion, EmotionAnalyzer};
use crate::error::{TriageError, TriageResult};
use crate::explainer::{explain_or_log, Explainer};
use crate::fallback::{
    CHAT_FALLBACK, EMOTION_FALLBACKS, STATUS_FALLBACKS, SYMPTOM_FALLBACKS, TONE_FALLBACKS,
};
use crate::features::{normalize, selected_symptoms, SYMPTOM_ALIASES};
use crate::keywords::{score, STATUS_KEYWORDS, TONE_KEYWORDS};
use crate::model::ModelRegistry;
use crate::prompts;

pub const NO_FACE_MESSAGE: &str = "No face detected. Please ensure your face is visible and well-lit.";
pub const UNDETECTED_MESSAGE: &str =
    "Unable to detect emotion. Try turning on lights and face the camera.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomPrediction {
    pub prediction: String,
    pub ai_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPrediction {
    pub prediction: String,
    pub ai_description: String,
}

/// Face analysis outcome. "No face" is an answer, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EmotionOutcome {
    Detected {
        emotion: String,
        gemini_output: String,
    },
    NoFace {
        error: String,
    },
    Undetected {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultimodalPrediction {
    pub text_prediction: String,
    pub emotion_detected: String,
    pub combined_result: String,
    pub gemini_output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Shared handle to loaded models and external services. Cheap to clone.
#[derive(Clone)]
pub struct Triage {
    models: Arc<ModelRegistry>,
    explainer: Arc<dyn Explainer>,
    analyzer: Arc<dyn EmotionAnalyzer>,
}

impl Triage {
    pub fn new(
        models: Arc<ModelRegistry>,
        explainer: Arc<dyn Explainer>,
        analyzer: Arc<dyn EmotionAnalyzer>,
    ) -> Self {
        Self {
            models,
            explainer,
            analyzer,
        }
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Classifies a symptom checklist, either `{"symptoms": {...}}` or the flat mapping.
    ///
    /// The model check runs before any validation, so an unloaded model answers
    /// `ModelUnavailable` even for an empty body.
    pub async fn predict_symptoms(&self, body: Option<Value>) -> TriageResult<SymptomPrediction> {
        let classifier = self.models.symptom()?;

        let body = body
            .filter(|b| !is_empty_body(b))
            .ok_or_else(|| TriageError::input("No input data provided"))?;
        let payload = match body {
            Value::Object(mut map) if map.contains_key("symptoms") => {
                map.remove("symptoms").unwrap_or(Value::Null)
            }
            other => other,
        };

        let vector = normalize(&payload, classifier.feature_names(), SYMPTOM_ALIASES)?;
        let prediction = classifier.predict(&vector)?;
        tracing::info!("[TRIAGE] Symptom prediction: {}", prediction);

        let prompt = prompts::symptom_summary_prompt(&prediction, &selected_symptoms(&payload));
        let generated = explain_or_log(self.explainer.as_ref(), &prompt).await;
        let explanation = SYMPTOM_FALLBACKS.resolve(&prediction, generated);

        Ok(SymptomPrediction {
            prediction,
            ai_description: explanation.text,
        })
    }

    /// Keyword-scored status for a free-text statement.
    pub async fn predict_text(&self, statement: &str) -> TriageResult<TextPrediction> {
        if statement.trim().is_empty() {
            return Err(TriageError::input("No statement provided"));
        }

        let prediction = score(statement, &STATUS_KEYWORDS);
        tracing::info!("[TRIAGE] Text prediction: {}", prediction);

        let prompt = prompts::text_response_prompt(statement, prediction);
        let generated = explain_or_log(self.explainer.as_ref(), &prompt).await;
        let explanation = STATUS_FALLBACKS.resolve(prediction, generated);

        Ok(TextPrediction {
            prediction: prediction.to_string(),
            ai_description: explanation.text,
        })
    }

    pub async fn predict_emotion(&self, image: Option<Vec<u8>>) -> TriageResult<EmotionOutcome> {
        let image = image
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| TriageError::input("No image provided"))?;
        let jpeg = prepare_image(&image)?;

        let result = self.analyzer.analyze(&jpeg).await?;
        let emotion = match dominant_emotion(&result) {
            DominantEmotion::Found(emotion) => emotion,
            DominantEmotion::NoFace => {
                tracing::info!("[TRIAGE] Analyzer found no face");
                return Ok(EmotionOutcome::NoFace {
                    error: NO_FACE_MESSAGE.to_string(),
                });
            }
            DominantEmotion::Undetected => {
                tracing::warn!("[TRIAGE] Could not extract emotion from analyzer result");
                return Ok(EmotionOutcome::Undetected {
                    error: UNDETECTED_MESSAGE.to_string(),
                });
            }
        };
        tracing::info!("[TRIAGE] Detected emotion: {}", emotion);

        let prompt = prompts::emotion_support_prompt(&emotion);
        let generated = explain_or_log(self.explainer.as_ref(), &prompt).await;
        let explanation = EMOTION_FALLBACKS.resolve(&emotion.to_lowercase(), generated);

        Ok(EmotionOutcome::Detected {
            emotion: capitalize(&emotion),
            gemini_output: explanation.text,
        })
    }

    /// Text classifier status plus keyword tone, with the classifier's confidence.
    pub async fn predict_multimodal(&self, statement: &str) -> TriageResult<MultimodalPrediction> {
        let statement = statement.trim();
        if statement.is_empty() {
            return Err(TriageError::input("No statement provided"));
        }
        let model = self.models.text()?;

        let (status, confidence) = model.predict(&statement.to_lowercase())?;
        let tone = score(statement, &TONE_KEYWORDS);
        let combined_result = format!(
            "{} with a {} tone ({:.1}% confidence)",
            status,
            tone,
            confidence * 100.0
        );
        tracing::info!("[TRIAGE] Multimodal prediction: {}", combined_result);

        let prompt = prompts::multimodal_response_prompt(statement, &status, tone);
        let generated = explain_or_log(self.explainer.as_ref(), &prompt).await;
        let explanation = TONE_FALLBACKS.resolve_keyed(tone, &status.to_lowercase(), generated);

        Ok(MultimodalPrediction {
            text_prediction: status,
            emotion_detected: tone.to_string(),
            combined_result,
            gemini_output: explanation.text,
        })
    }

    /// Free conversation. Always answers.
    pub async fn chat(&self, message: &str) -> ChatReply {
        let prompt = prompts::chat_prompt(message);
        let generated = explain_or_log(self.explainer.as_ref(), &prompt).await;
        ChatReply {
            reply: CHAT_FALLBACK.resolve("chat", generated).text,
        }
    }
}

fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalyzerError, GenerationError};
    use crate::model::{LabelEncoder, LogisticModel, SymptomClassifier, TextStatusModel, TfidfVectorizer};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records prompts; answers with `reply` or fails when it is `None`.
    struct StubExplainer {
        reply: Option<&'static str>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubExplainer {
        fn answering(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Explainer for StubExplainer {
        async fn explain(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .map(str::to_string)
                .ok_or_else(|| GenerationError::Status(503, "overloaded".into()))
        }
    }

    struct StubAnalyzer(Result<Value, fn() -> AnalyzerError>);

    #[async_trait]
    impl EmotionAnalyzer for StubAnalyzer {
        async fn analyze(&self, _image: &[u8]) -> Result<Value, AnalyzerError> {
            match &self.0 {
                Ok(v) => Ok(v.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn symptom_classifier() -> SymptomClassifier {
        let names = ["sadness", "depressive_symptoms", "low_mood", "severe_anxiety"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let logistic = LogisticModel::new(
            vec![vec![1.0, 1.0, 1.0, 0.0], vec![0.0, 0.0, 0.0, 3.0], vec![-1.0, -1.0, -1.0, -1.0]],
            vec![0.0, 0.0, 0.5],
        )
        .unwrap();
        let encoder = LabelEncoder::new(vec!["Depression".into(), "Anxiety".into(), "Normal".into()]);
        SymptomClassifier::new(names, vec![0, 1, 2], logistic, encoder).unwrap()
    }

    fn text_model() -> TextStatusModel {
        let vocab = [("panic", 0), ("tired", 1), ("pressure", 2)]
            .into_iter()
            .map(|(t, i)| (t.to_string(), i))
            .collect();
        let vectorizer = TfidfVectorizer::new(vocab, vec![1.0, 1.0, 1.0]).unwrap();
        let logistic = LogisticModel::new(
            vec![vec![4.0, 0.0, 0.0], vec![0.0, 4.0, 0.0], vec![0.0, 0.0, 4.0]],
            vec![0.0, 0.0, 0.0],
        )
        .unwrap();
        TextStatusModel::new(
            vectorizer,
            vec!["Anxiety".into(), "Depression".into(), "Stress".into()],
            logistic,
        )
        .unwrap()
    }

    fn loaded() -> Arc<ModelRegistry> {
        Arc::new(ModelRegistry::new(Some(symptom_classifier()), Some(text_model())))
    }

    fn triage(explainer: Arc<StubExplainer>, analyzer: StubAnalyzer) -> Triage {
        Triage::new(loaded(), explainer, Arc::new(analyzer))
    }

    fn no_analyzer() -> StubAnalyzer {
        StubAnalyzer(Err(|| AnalyzerError::Unavailable("not configured".into())))
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::new(2, 2);
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn symptoms_without_generation_use_exact_template() {
        let t = triage(StubExplainer::failing(), no_analyzer());
        let out = t
            .predict_symptoms(Some(json!({"sadness": "yes", "anxiety": 0})))
            .await
            .unwrap();
        assert_eq!(out.prediction, "Depression");
        assert_eq!(out.ai_description, SYMPTOM_FALLBACKS.template("Depression"));
    }

    #[tokio::test]
    async fn symptoms_envelope_and_generated_text() {
        let explainer = StubExplainer::answering("You are not alone.");
        let t = triage(explainer.clone(), no_analyzer());
        let out = t
            .predict_symptoms(Some(json!({"symptoms": {"anxiety": "on", "fatigue": "no"}})))
            .await
            .unwrap();
        assert_eq!(out.prediction, "Anxiety");
        assert_eq!(out.ai_description, "You are not alone.");
        let calls = explainer.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("Symptoms reported: anxiety"));
    }

    #[tokio::test]
    async fn unloaded_symptom_model_wins_over_validation() {
        let explainer = StubExplainer::answering("unused");
        let t = Triage::new(
            Arc::new(ModelRegistry::default()),
            explainer.clone(),
            Arc::new(no_analyzer()),
        );
        for body in [None, Some(json!({})), Some(json!({"sadness": "yes"}))] {
            assert!(matches!(
                t.predict_symptoms(body).await,
                Err(TriageError::ModelUnavailable("symptom"))
            ));
        }
        assert!(explainer.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_symptom_body_is_an_input_error() {
        let t = triage(StubExplainer::failing(), no_analyzer());
        for body in [None, Some(json!({})), Some(Value::Null)] {
            let err = t.predict_symptoms(body).await.unwrap_err();
            assert!(matches!(err, TriageError::Input(ref m) if m == "No input data provided"));
        }
        let err = t.predict_symptoms(Some(json!(["sadness"]))).await.unwrap_err();
        assert!(matches!(err, TriageError::Input(_)));
    }

    #[tokio::test]
    async fn text_scenario_picks_anxiety() {
        let t = triage(StubExplainer::failing(), no_analyzer());
        let out = t.predict_text("I feel so anxious and full of panic").await.unwrap();
        assert_eq!(out.prediction, "Anxiety");
        assert_eq!(out.ai_description, STATUS_FALLBACKS.template("Anxiety"));
    }

    #[tokio::test]
    async fn empty_statement_never_reaches_generation() {
        let explainer = StubExplainer::answering("unused");
        let t = triage(explainer.clone(), no_analyzer());
        for statement in ["", "   \n"] {
            let err = t.predict_text(statement).await.unwrap_err();
            assert!(matches!(err, TriageError::Input(ref m) if m == "No statement provided"));
        }
        assert!(explainer.calls().is_empty());
    }

    #[tokio::test]
    async fn unmatched_statement_gets_default_status() {
        let t = triage(StubExplainer::failing(), no_analyzer());
        let out = t.predict_text("The weather is nice").await.unwrap();
        assert_eq!(out.prediction, "General Mental Health Concern");
        assert_eq!(out.ai_description, STATUS_FALLBACKS.default);
    }

    #[tokio::test]
    async fn empty_analyzer_result_is_no_face() {
        let t = triage(StubExplainer::failing(), StubAnalyzer(Ok(json!([]))));
        let out = t.predict_emotion(Some(png_bytes())).await.unwrap();
        assert_eq!(
            out,
            EmotionOutcome::NoFace {
                error: NO_FACE_MESSAGE.into()
            }
        );
        let body = serde_json::to_value(&out).unwrap();
        assert_eq!(body, json!({"error": NO_FACE_MESSAGE}));
    }

    #[tokio::test]
    async fn detected_emotion_is_capitalized_with_lowercase_fallback() {
        let t = triage(
            StubExplainer::failing(),
            StubAnalyzer(Ok(json!([{"emotion": {"sad": 70.0, "happy": 5.0}}]))),
        );
        let out = t.predict_emotion(Some(png_bytes())).await.unwrap();
        assert_eq!(
            out,
            EmotionOutcome::Detected {
                emotion: "Sad".into(),
                gemini_output: EMOTION_FALLBACKS.template("sad"),
            }
        );
    }

    #[tokio::test]
    async fn unreadable_result_is_undetected() {
        let t = triage(StubExplainer::failing(), StubAnalyzer(Ok(json!({"region": {}}))));
        let out = t.predict_emotion(Some(png_bytes())).await.unwrap();
        assert!(matches!(out, EmotionOutcome::Undetected { .. }));
    }

    #[tokio::test]
    async fn image_validation_precedes_analysis() {
        let t = triage(StubExplainer::failing(), StubAnalyzer(Ok(json!([]))));
        let err = t.predict_emotion(None).await.unwrap_err();
        assert!(matches!(err, TriageError::Input(ref m) if m == "No image provided"));
        let err = t.predict_emotion(Some(b"not an image".to_vec())).await.unwrap_err();
        assert!(matches!(err, TriageError::Input(ref m) if m == "Invalid image format"));
    }

    /// Keeps the bytes it was handed.
    struct CapturingAnalyzer(Mutex<Vec<u8>>);

    #[async_trait]
    impl EmotionAnalyzer for CapturingAnalyzer {
        async fn analyze(&self, image: &[u8]) -> Result<Value, AnalyzerError> {
            *self.0.lock().unwrap() = image.to_vec();
            Ok(json!({"dominant_emotion": "neutral"}))
        }
    }

    #[tokio::test]
    async fn analyzer_receives_jpeg_whatever_the_upload_format() {
        let analyzer = Arc::new(CapturingAnalyzer(Mutex::new(Vec::new())));
        let t = Triage::new(loaded(), StubExplainer::failing(), analyzer.clone());
        let out = t.predict_emotion(Some(png_bytes())).await.unwrap();
        assert!(matches!(out, EmotionOutcome::Detected { ref emotion, .. } if emotion == "Neutral"));
        let sent = analyzer.0.lock().unwrap().clone();
        assert_eq!(image::guess_format(&sent).unwrap(), image::ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn analyzer_failures_map_to_triage_errors() {
        let t = triage(StubExplainer::failing(), no_analyzer());
        assert!(matches!(
            t.predict_emotion(Some(png_bytes())).await,
            Err(TriageError::AnalyzerUnavailable(_))
        ));
        let t = triage(
            StubExplainer::failing(),
            StubAnalyzer(Err(|| AnalyzerError::Rejected("Face could not be detected".into()))),
        );
        assert!(matches!(
            t.predict_emotion(Some(png_bytes())).await,
            Err(TriageError::FaceDetection(_))
        ));
    }

    #[tokio::test]
    async fn multimodal_combines_status_tone_and_confidence() {
        let t = triage(StubExplainer::failing(), no_analyzer());
        let out = t.predict_multimodal("  so much pressure and stress  ").await.unwrap();
        assert_eq!(out.text_prediction, "Stress");
        assert_eq!(out.emotion_detected, "Stressed");
        assert!(out.combined_result.starts_with("Stress with a Stressed tone ("));
        assert!(out.combined_result.ends_with("% confidence)"));
        assert_eq!(out.gemini_output, TONE_FALLBACKS.template("Stressed"));
    }

    #[tokio::test]
    async fn multimodal_neutral_tone_fallback() {
        let t = triage(StubExplainer::failing(), no_analyzer());
        let out = t.predict_multimodal("I feel tired today").await.unwrap();
        assert_eq!(out.emotion_detected, "Neutral");
        assert_eq!(out.gemini_output, TONE_FALLBACKS.template("Neutral"));
    }

    #[tokio::test]
    async fn multimodal_requires_text_model() {
        let t = Triage::new(
            Arc::new(ModelRegistry::new(Some(symptom_classifier()), None)),
            StubExplainer::failing(),
            Arc::new(no_analyzer()),
        );
        assert!(matches!(
            t.predict_multimodal("hello").await,
            Err(TriageError::ModelUnavailable("text"))
        ));
        assert!(matches!(t.predict_multimodal("  ").await, Err(TriageError::Input(_))));
    }

    #[tokio::test]
    async fn chat_always_replies() {
        let t = triage(StubExplainer::failing(), no_analyzer());
        assert_eq!(t.chat("hi").await.reply, CHAT_FALLBACK.default);
        let explainer = StubExplainer::answering("Hello there.");
        let t = triage(explainer.clone(), no_analyzer());
        assert_eq!(t.chat("hi").await.reply, "Hello there.");
        assert!(explainer.calls()[0].ends_with("Respond to: hi"));
    }
}
