//! Facial-emotion analysis through a DeepFace-compatible HTTP sidecar.
//!
//! The analyzer is a black box; this module only ships the image to it and reads a
//! dominant emotion back out of whichever result shape it returns.

use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;
use std::io::Cursor;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::{AnalyzerError, TriageError, TriageResult};

#[async_trait]
pub trait EmotionAnalyzer: Send + Sync {
    /// Raw analyzer result for one image.
    async fn analyze(&self, image: &[u8]) -> Result<Value, AnalyzerError>;
}

/// What could be read from an analyzer result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DominantEmotion {
    Found(String),
    /// The analyzer returned an empty result list.
    NoFace,
    /// A result came back but carried no usable emotion.
    Undetected,
}

/// Extracts the dominant emotion.
///
/// Accepts a list (first element used, empty -> `NoFace`), an object with a
/// `dominant_emotion` string, or an object whose `emotion` is either a string or a
/// per-emotion score map (argmax; first maximum wins).
pub fn dominant_emotion(result: &Value) -> DominantEmotion {
    let result = match result {
        Value::Array(items) => match items.first() {
            Some(first) => first,
            None => return DominantEmotion::NoFace,
        },
        other => other,
    };

    let found = match result.get("dominant_emotion") {
        Some(v) => v.as_str().map(str::to_string),
        None => match result.get("emotion") {
            Some(Value::Object(scores)) => argmax_label(scores),
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        },
    };

    match found.filter(|s| !s.trim().is_empty()) {
        Some(emotion) => DominantEmotion::Found(emotion),
        None => DominantEmotion::Undetected,
    }
}

fn argmax_label(scores: &serde_json::Map<String, Value>) -> Option<String> {
    let mut best: Option<(&String, f64)> = None;
    for (label, score) in scores {
        let Some(score) = score.as_f64() else {
            continue;
        };
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((label, score));
        }
    }
    best.map(|(label, _)| label.clone())
}

/// "happy" -> "Happy", "SAD" -> "Sad".
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Decodes the upload and re-encodes it as baseline JPEG, the format the analyzer
/// request declares. Undecodable input is `Input("Invalid image format")`.
pub fn prepare_image(bytes: &[u8]) -> TriageResult<Vec<u8>> {
    if bytes.is_empty() {
        return Err(TriageError::input("No image provided"));
    }
    let decoded = image::load_from_memory(bytes).map_err(|e| {
        tracing::warn!("[EMOTION] Failed to decode image: {}", e);
        TriageError::input("Invalid image format")
    })?;

    // JPEG has no alpha channel.
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, image::ImageFormat::Jpeg)
        .map_err(|e| TriageError::Internal(format!("jpeg encode: {}", e)))?;
    Ok(out.into_inner())
}

/// Client for a DeepFace-style `POST /analyze` endpoint.
pub struct HttpEmotionAnalyzer {
    base_url: Option<String>,
    client: reqwest::Client,
}

impl HttpEmotionAnalyzer {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            client,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.emotion_analyzer_url.clone(),
            Duration::from_secs(config.analyzer_timeout_secs),
        )
    }

    fn request_body(image: &[u8]) -> Value {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        serde_json::json!({
            "img": format!("data:image/jpeg;base64,{}", encoded),
            "actions": ["emotion"],
            "enforce_detection": false,
            "detector_backend": "opencv",
        })
    }
}

/// DeepFace's API wraps results as `{"results": [...]}`.
fn unwrap_results(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("results") => {
            map.remove("results").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[async_trait]
impl EmotionAnalyzer for HttpEmotionAnalyzer {
    async fn analyze(&self, image: &[u8]) -> Result<Value, AnalyzerError> {
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| AnalyzerError::Unavailable("no analyzer URL configured".into()))?;

        let res = self
            .client
            .post(format!("{}/analyze", base))
            .json(&Self::request_body(image))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    AnalyzerError::Unavailable(e.to_string())
                } else {
                    AnalyzerError::Failed(e.to_string())
                }
            })?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| AnalyzerError::Failed(e.to_string()))?;
        if status.is_client_error() {
            return Err(AnalyzerError::Rejected(text));
        }
        if !status.is_success() {
            return Err(AnalyzerError::Failed(format!("{}: {}", status.as_u16(), text)));
        }
        let body: Value =
            serde_json::from_str(&text).map_err(|e| AnalyzerError::Failed(e.to_string()))?;
        Ok(unwrap_results(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_list_means_no_face() {
        assert_eq!(dominant_emotion(&json!([])), DominantEmotion::NoFace);
    }

    #[test]
    fn list_uses_first_result() {
        let r = json!([{"dominant_emotion": "sad"}, {"dominant_emotion": "happy"}]);
        assert_eq!(dominant_emotion(&r), DominantEmotion::Found("sad".into()));
    }

    #[test]
    fn single_object_with_dominant_field() {
        assert_eq!(
            dominant_emotion(&json!({"dominant_emotion": "fear", "emotion": {"happy": 99.0}})),
            DominantEmotion::Found("fear".into())
        );
    }

    #[test]
    fn score_map_takes_argmax() {
        let r = json!({"emotion": {"angry": 1.5, "happy": 80.25, "neutral": 18.0}});
        assert_eq!(dominant_emotion(&r), DominantEmotion::Found("happy".into()));
        let tie = json!({"emotion": {"sad": 50, "fear": 50}});
        assert_eq!(dominant_emotion(&tie), DominantEmotion::Found("sad".into()));
    }

    #[test]
    fn emotion_string_is_accepted() {
        assert_eq!(
            dominant_emotion(&json!([{"emotion": "surprise"}])),
            DominantEmotion::Found("surprise".into())
        );
    }

    #[test]
    fn unusable_results_are_undetected() {
        for r in [
            json!({}),
            json!({"region": {"x": 0}}),
            json!({"emotion": {}}),
            json!({"emotion": 3}),
            json!({"dominant_emotion": ""}),
            json!({"dominant_emotion": null}),
            json!("happy"),
        ] {
            assert_eq!(dominant_emotion(&r), DominantEmotion::Undetected, "{r}");
        }
    }

    #[test]
    fn capitalize_matches_title_style() {
        assert_eq!(capitalize("happy"), "Happy");
        assert_eq!(capitalize("SAD"), "Sad");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn results_envelope_is_unwrapped() {
        let body = json!({"results": [{"dominant_emotion": "neutral"}]});
        assert_eq!(
            dominant_emotion(&unwrap_results(body)),
            DominantEmotion::Found("neutral".into())
        );
    }

    #[test]
    fn request_disables_face_enforcement() {
        let body = HttpEmotionAnalyzer::request_body(&[1, 2, 3]);
        assert_eq!(body["enforce_detection"], false);
        assert_eq!(body["actions"], json!(["emotion"]));
        assert_eq!(body["img"], "data:image/jpeg;base64,AQID");
    }

    #[test]
    fn garbage_bytes_are_an_invalid_image() {
        let err = prepare_image(b"definitely not a jpeg").unwrap_err();
        assert!(matches!(err, TriageError::Input(ref m) if m == "Invalid image format"));
        assert!(matches!(prepare_image(&[]), Err(TriageError::Input(_))));
    }

    fn encode(img: image::DynamicImage, format: image::ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn non_jpeg_uploads_are_reencoded_as_jpeg() {
        let rgba = image::DynamicImage::ImageRgba8(image::RgbaImage::new(4, 3));
        for format in [image::ImageFormat::Png, image::ImageFormat::Bmp] {
            let jpeg = prepare_image(&encode(rgba.clone(), format)).unwrap();
            assert_eq!(&jpeg[..3], &[0xFF, 0xD8, 0xFF], "{format:?}");
            assert_eq!(
                image::guess_format(&jpeg).unwrap(),
                image::ImageFormat::Jpeg
            );
            let back = image::load_from_memory(&jpeg).unwrap();
            assert_eq!((back.width(), back.height()), (4, 3));
        }
    }

    #[tokio::test]
    async fn unconfigured_analyzer_is_unavailable() {
        let analyzer = HttpEmotionAnalyzer::new(None, Duration::from_secs(1));
        assert!(matches!(
            analyzer.analyze(&[0u8; 4]).await,
            Err(AnalyzerError::Unavailable(_))
        ));
    }
}
