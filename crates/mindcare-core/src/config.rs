//! Gateway configuration.
//!
//! | Source | Precedence |
//! |--------|------------|
//! | `MINDCARE_*` env (e.g. `MINDCARE_PORT`, `MINDCARE_MODEL_DIR`) | highest |
//! | `MINDCARE_CONFIG` path, else `config/mindcare.toml` (if present) | |
//! | built-in defaults | lowest |
//!
//! The generation credential is never read from the config file: `GEMINI_API_KEY` only.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/mindcare.toml";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_model_dir() -> String {
    "./models".to_string()
}

fn default_gemini_model() -> String {
    "gemini-pro".to_string()
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_generation_timeout_secs() -> u64 {
    10
}

fn default_analyzer_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the exported classifier artifacts (`symptom_model.json`, ...).
    #[serde(default = "default_model_dir")]
    pub model_dir: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
    /// Base URL of the DeepFace-compatible analyzer sidecar. Unset disables `/predict_emotion`.
    #[serde(default)]
    pub emotion_analyzer_url: Option<String>,
    #[serde(default = "default_analyzer_timeout_secs")]
    pub analyzer_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            model_dir: default_model_dir(),
            gemini_model: default_gemini_model(),
            gemini_base_url: default_gemini_base_url(),
            generation_timeout_secs: default_generation_timeout_secs(),
            emotion_analyzer_url: None,
            analyzer_timeout_secs: default_analyzer_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load config from file and environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("MINDCARE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&config_path))
    }

    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(
        path: &Path,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("host", default_host())?
            .set_default("port", i64::from(default_port()))?
            .set_default("model_dir", default_model_dir())?
            .set_default("gemini_model", default_gemini_model())?
            .set_default("gemini_base_url", default_gemini_base_url())?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let mut loaded: AppConfig = builder
            .add_source(env)
            .build()?
            .try_deserialize()?;

        loaded.emotion_analyzer_url = loaded
            .emotion_analyzer_url
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());
        Ok(loaded)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `MINDCARE_PORT`, `MINDCARE_MODEL_DIR`, ...; `__` separates nested keys.
fn environment() -> config::Environment {
    config::Environment::with_prefix("MINDCARE")
        .prefix_separator("_")
        .separator("__")
}

/// `GEMINI_API_KEY`, trimmed; `None` when unset or blank.
pub fn gemini_api_key() -> Option<String> {
    env_opt_string("GEMINI_API_KEY")
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = AppConfig::load_from(Path::new("./does/not/exist.toml")).unwrap();
        assert_eq!(cfg.model_dir, "./models");
        assert_eq!(cfg.gemini_model, "gemini-pro");
        assert_eq!(cfg.generation_timeout_secs, 10);
        assert!(cfg.emotion_analyzer_url.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mindcare.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "port = 7100").unwrap();
        writeln!(f, "model_dir = \"/srv/models\"").unwrap();
        writeln!(f, "emotion_analyzer_url = \"http://127.0.0.1:5005/\"").unwrap();
        drop(f);

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.port, 7100);
        assert_eq!(cfg.model_dir, "/srv/models");
        assert_eq!(cfg.emotion_analyzer_url.as_deref(), Some("http://127.0.0.1:5005"));
        assert_eq!(cfg.host, "0.0.0.0");
    }

    fn env_from(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn single_underscore_env_vars_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mindcare.toml");
        std::fs::write(&path, "port = 7100\nmodel_dir = \"/srv/models\"\n").unwrap();

        let cfg = AppConfig::load_with_env(
            &path,
            env_from(&[
                ("MINDCARE_PORT", "8123"),
                ("MINDCARE_MODEL_DIR", "/data/models"),
                ("MINDCARE_EMOTION_ANALYZER_URL", " http://analyzer:5005/ "),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.port, 8123);
        assert_eq!(cfg.model_dir, "/data/models");
        assert_eq!(cfg.emotion_analyzer_url.as_deref(), Some("http://analyzer:5005"));
    }

    #[test]
    fn unprefixed_env_vars_are_ignored() {
        let cfg = AppConfig::load_with_env(
            Path::new("./does/not/exist.toml"),
            env_from(&[("PORT", "9999"), ("MINDCAREPORT", "9998")]),
        )
        .unwrap();
        assert_eq!(cfg.port, 5000);
    }
}
