//! Error types for the triage core.

use thiserror::Error;

/// Result type alias for triage operations
pub type TriageResult<T> = Result<T, TriageError>;

/// Failures an orchestrator can end in. The gateway maps each variant to one HTTP status.
#[derive(Error, Debug)]
pub enum TriageError {
    /// User-correctable input problem (missing statement, bad image, non-object payload).
    #[error("{0}")]
    Input(String),

    /// A classifier slot in the model registry is empty.
    #[error("{0} model is not loaded")]
    ModelUnavailable(&'static str),

    #[error("emotion analyzer is unavailable: {0}")]
    AnalyzerUnavailable(String),

    #[error("face detection failed: {0}")]
    FaceDetection(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl TriageError {
    pub fn input(msg: impl Into<String>) -> Self {
        TriageError::Input(msg.into())
    }
}

impl From<ModelError> for TriageError {
    fn from(err: ModelError) -> Self {
        TriageError::Internal(err.to_string())
    }
}

/// Errors raised while loading or evaluating model artifacts.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact shape mismatch: {0}")]
    Shape(String),

    #[error("feature vector has {got} slots, model expects {expected}")]
    Dimension { expected: usize, got: usize },

    #[error("class code {0} is not known to the label encoder")]
    UnknownClass(i64),
}

/// Why the generative explainer produced nothing. Never surfaced to clients.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("GEMINI_API_KEY is not set")]
    MissingCredential,

    /// Built through `From`, which strips the request URL.
    #[error("generation request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("generation service returned {0}: {1}")]
    Status(u16, String),

    #[error("generation response parse: {0}")]
    Decode(String),

    #[error("generation service returned an empty response")]
    Empty,
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Request(err.without_url())
    }
}

/// Failures talking to the facial-emotion analyzer sidecar.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Not configured, or the sidecar could not be reached.
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),

    /// The analyzer refused the image (face detection failure).
    #[error("analyzer rejected image: {0}")]
    Rejected(String),

    #[error("analyzer failed: {0}")]
    Failed(String),
}

impl From<AnalyzerError> for TriageError {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::Unavailable(msg) => TriageError::AnalyzerUnavailable(msg),
            AnalyzerError::Rejected(msg) => TriageError::FaceDetection(msg),
            AnalyzerError::Failed(msg) => TriageError::Internal(msg),
        }
    }
}
