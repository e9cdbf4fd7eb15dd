//! Error types for logtriage.

/// Top-level error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Generative backend error: {0}")]
    Generative(#[from] GenerativeError),
}

/// Errors from the embedding model and classifier-head artifacts.
///
/// Load-time failures are fatal for the whole engine: the statistical tier
/// has no degraded mode without its artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model artifact not found: {path}")]
    ArtifactMissing { path: String },

    #[error("Failed to load model from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Inference backend error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Classifier head has {weights} outputs but {labels} labels")]
    LabelMismatch { weights: usize, labels: usize },

    #[error("Embedding dimension {embedding} does not match classifier input {head}")]
    DimensionMismatch { embedding: usize, head: usize },

    #[error("Classifier artifact shape error: {0}")]
    Shape(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Generative endpoint errors.
///
/// Recovered inside the generative classifier — they surface to callers as
/// the "Unknown" label, never as an `Err`.
#[derive(Debug, thiserror::Error)]
pub enum GenerativeError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Endpoint returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response from endpoint: {0}")]
    InvalidResponse(String),
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
