//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding the sentence-embedding model
    /// (config.json, tokenizer.json, model.safetensors).
    pub embedding_dir: PathBuf,
    /// Directory holding the trained classifier head
    /// (classifier.safetensors, labels.json).
    pub classifier_dir: PathBuf,
    /// Base URL of the generative endpoint.
    pub generative_url: String,
    /// Model name on the generative endpoint.
    pub generative_model: String,
    /// Per-request timeout for generate calls.
    pub generative_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            embedding_dir: PathBuf::from("./models/all-MiniLM-L6-v2"),
            classifier_dir: PathBuf::from("./models/log-classifier"),
            generative_url: "http://localhost:11434".to_string(),
            generative_model: "llama3.1:8b".to_string(),
            generative_timeout: Duration::from_secs(30),
        }
    }
}
