//! Local BERT sentence embedding.
//!
//! Loads a sentence-transformer checkpoint from a local directory and
//! encodes one message at a time into a fixed-dimension vector: mean pooling
//! over the token embeddings, L2 normalized.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use tokenizers::{Tokenizer, TruncationDirection, TruncationParams, TruncationStrategy};
use tracing::info;

use crate::error::ModelError;

/// Maximum token length per message; longer inputs are truncated.
const MAX_TOKENS: usize = 512;

/// Sentence-transformer BERT encoder producing fixed-dimension embeddings.
///
/// Loaded once at startup and read-only afterwards — expensive to reload,
/// safe to share across threads.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
}

impl BertEmbedder {
    /// Load model weights and tokenizer from a local directory containing
    /// `config.json`, `tokenizer.json`, and `model.safetensors` (or
    /// `pytorch_model.bin`).
    pub fn load(dir: &Path) -> Result<Self, ModelError> {
        let config_path = dir.join("config.json");
        let tokenizer_path = dir.join("tokenizer.json");

        if !config_path.exists() {
            return Err(ModelError::ArtifactMissing {
                path: config_path.display().to_string(),
            });
        }
        if !tokenizer_path.exists() {
            return Err(ModelError::ArtifactMissing {
                path: tokenizer_path.display().to_string(),
            });
        }

        let raw_config = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&raw_config)?;
        let dimension = serde_json::from_str::<serde_json::Value>(&raw_config)?
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ModelError::LoadFailed {
                path: config_path.display().to_string(),
                reason: "config.json has no hidden_size".to_string(),
            })? as usize;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| ModelError::Tokenizer(e.to_string()))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                strategy: TruncationStrategy::LongestFirst,
                stride: 0,
                direction: TruncationDirection::Right,
            }))
            .map_err(|e| ModelError::Tokenizer(e.to_string()))?;

        let device = Device::Cpu;
        let safetensors_path = dir.join("model.safetensors");
        let vb = if safetensors_path.exists() {
            unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors_path], DType::F32, &device)? }
        } else {
            let pth_path = dir.join("pytorch_model.bin");
            if !pth_path.exists() {
                return Err(ModelError::ArtifactMissing {
                    path: safetensors_path.display().to_string(),
                });
            }
            VarBuilder::from_pth(&pth_path, DType::F32, &device)?
        };

        let model = BertModel::load(vb, &config)?;

        info!(dir = %dir.display(), dimension, "Embedding model loaded");

        Ok(Self {
            model,
            tokenizer,
            device,
            dimension,
        })
    }

    /// Embedding width — the classifier head's expected input dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Encode one message into a `[1, dimension]` embedding tensor.
    pub fn embed(&self, text: &str) -> Result<Tensor, ModelError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ModelError::Tokenizer(e.to_string()))?;

        let ids = encoding.get_ids().to_vec();
        let mask = encoding.get_attention_mask().to_vec();

        let token_ids = Tensor::new(&ids[..], &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(&mask[..], &self.device)?.unsqueeze(0)?;
        let token_type_ids = token_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;

        // Mean pooling weighted by the attention mask, then L2 normalization
        // so downstream dot products behave like cosine similarity.
        let summed = hidden.sum(1)?;
        let counts = attention_mask.sum(1)?.to_dtype(hidden.dtype())?;
        let pooled = summed.broadcast_div(&counts)?.to_dtype(DType::F32)?;

        let norm = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
        Ok(pooled.broadcast_div(&norm)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifact_directory_is_fatal() {
        let result = BertEmbedder::load(Path::new("/nonexistent/model-dir"));
        assert!(matches!(result, Err(ModelError::ArtifactMissing { .. })));
    }

    #[test]
    fn empty_artifact_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = BertEmbedder::load(dir.path());
        assert!(matches!(result, Err(ModelError::ArtifactMissing { .. })));
    }

    #[test]
    fn corrupt_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "not json").unwrap();
        std::fs::write(dir.path().join("tokenizer.json"), "{}").unwrap();

        let result = BertEmbedder::load(dir.path());
        assert!(matches!(result, Err(ModelError::Json(_))));
    }
}
