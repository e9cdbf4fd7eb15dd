//! Pre-trained linear probability head over embedding vectors.
//!
//! The head is an external training artifact: a weight matrix and bias in a
//! safetensors file plus the ordered label names the rows correspond to.
//! Opaque and immutable once loaded.

use std::path::Path;

use candle_core::{D, Device, Tensor};
use tracing::info;

use crate::error::ModelError;
use crate::pipeline::types::Label;

/// Weight/bias artifact file inside the classifier directory.
const WEIGHTS_FILE: &str = "classifier.safetensors";
/// Ordered label names matching the weight rows.
const LABELS_FILE: &str = "labels.json";

/// Linear classifier head: `softmax(W · e + b)` over a closed label set
/// learned at training time.
pub struct LinearHead {
    weight: Tensor,
    bias: Tensor,
    labels: Vec<Label>,
    dimension: usize,
}

impl LinearHead {
    /// Load weights and the ordered label list from a local directory.
    pub fn load(dir: &Path) -> Result<Self, ModelError> {
        let weights_path = dir.join(WEIGHTS_FILE);
        let labels_path = dir.join(LABELS_FILE);

        if !weights_path.exists() {
            return Err(ModelError::ArtifactMissing {
                path: weights_path.display().to_string(),
            });
        }
        if !labels_path.exists() {
            return Err(ModelError::ArtifactMissing {
                path: labels_path.display().to_string(),
            });
        }

        let tensors = candle_core::safetensors::load(&weights_path, &Device::Cpu)?;
        let weight = tensors
            .get("weight")
            .cloned()
            .ok_or_else(|| ModelError::LoadFailed {
                path: weights_path.display().to_string(),
                reason: "missing tensor 'weight'".to_string(),
            })?;
        let bias = tensors
            .get("bias")
            .cloned()
            .ok_or_else(|| ModelError::LoadFailed {
                path: weights_path.display().to_string(),
                reason: "missing tensor 'bias'".to_string(),
            })?;

        let names: Vec<String> = serde_json::from_str(&std::fs::read_to_string(&labels_path)?)?;
        let labels = names.iter().map(|n| Label::from_name(n)).collect();

        let head = Self::from_parts(weight, bias, labels)?;
        info!(
            dir = %dir.display(),
            labels = head.num_labels(),
            dimension = head.dimension,
            "Classifier head loaded"
        );
        Ok(head)
    }

    /// Build a head from in-memory tensors (used by tests and tooling).
    ///
    /// `weight` must be `[num_labels, dimension]`, `bias` `[num_labels]`,
    /// and `labels` one name per weight row, in row order.
    pub fn from_parts(weight: Tensor, bias: Tensor, labels: Vec<Label>) -> Result<Self, ModelError> {
        let (num_labels, dimension) = weight.dims2()?;

        if bias.dims1()? != num_labels {
            return Err(ModelError::Shape(format!(
                "bias has {} entries for {} weight rows",
                bias.dims1()?,
                num_labels
            )));
        }
        if labels.len() != num_labels {
            return Err(ModelError::LabelMismatch {
                weights: num_labels,
                labels: labels.len(),
            });
        }

        Ok(Self {
            weight,
            bias,
            labels,
            dimension,
        })
    }

    /// Trained labels, in weight-row order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    /// Expected embedding dimension.
    pub fn input_dimension(&self) -> usize {
        self.dimension
    }

    /// Probability distribution over the trained labels for one `[1, dim]`
    /// embedding.
    pub fn predict(&self, embedding: &Tensor) -> Result<Vec<f32>, ModelError> {
        let logits = embedding
            .matmul(&self.weight.t()?)?
            .broadcast_add(&self.bias)?;
        let probabilities = candle_nn::ops::softmax(&logits, D::Minus1)?;
        Ok(probabilities.squeeze(0)?.to_vec1::<f32>()?)
    }
}
