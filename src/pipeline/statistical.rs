//! Statistical classification tier: sentence embedding + trained linear head.
//!
//! Messages with no fixed structural form are embedded locally and scored by
//! a pre-trained probability head. The tier commits to a label only above the
//! confidence floor; anything at or below it is "Unknown", not a best guess.

use std::path::Path;

use tracing::{debug, info};

use crate::embedding::{BertEmbedder, LinearHead};
use crate::error::ModelError;
use crate::pipeline::types::{Label, StatisticalClassify};

/// Maximum-probability threshold at or below which classification refuses to
/// commit. The boundary itself fails: exactly 0.5 yields "Unknown".
pub const CONFIDENCE_FLOOR: f32 = 0.5;

/// Embedding + probability-head classifier over a closed trained label set.
///
/// Both artifacts are loaded once at startup and read-only afterwards, so
/// instances can be shared across threads without locking.
pub struct StatisticalClassifier {
    embedder: BertEmbedder,
    head: LinearHead,
}

impl StatisticalClassifier {
    /// Load the embedding model and classifier head from local directories.
    ///
    /// A missing or corrupt artifact is a fatal initialization error for the
    /// whole engine — there is no lazy or degraded fallback.
    pub fn load(embedding_dir: &Path, classifier_dir: &Path) -> Result<Self, ModelError> {
        let embedder = BertEmbedder::load(embedding_dir)?;
        let head = LinearHead::load(classifier_dir)?;

        if embedder.dimension() != head.input_dimension() {
            return Err(ModelError::DimensionMismatch {
                embedding: embedder.dimension(),
                head: head.input_dimension(),
            });
        }

        info!(
            labels = head.num_labels(),
            dimension = embedder.dimension(),
            "Statistical classifier ready"
        );

        Ok(Self { embedder, head })
    }
}

impl StatisticalClassify for StatisticalClassifier {
    fn classify(&self, message: &str) -> Result<Label, ModelError> {
        let embedding = self.embedder.embed(message)?;
        let probabilities = self.head.predict(&embedding)?;
        Ok(select_label(&probabilities, self.head.labels()))
    }
}

/// Pick the argmax label, or "Unknown" when the distribution's maximum is at
/// or below the confidence floor.
pub(crate) fn select_label(probabilities: &[f32], labels: &[Label]) -> Label {
    let mut best = 0usize;
    let mut best_prob = f32::MIN;
    for (i, &p) in probabilities.iter().enumerate() {
        if p > best_prob {
            best = i;
            best_prob = p;
        }
    }

    if best_prob <= CONFIDENCE_FLOOR {
        debug!(max_probability = best_prob, "Below confidence floor");
        return Label::Unknown;
    }

    labels.get(best).cloned().unwrap_or(Label::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<Label> {
        vec![Label::UserAction, Label::SecurityAlert, Label::Error]
    }

    #[test]
    fn picks_argmax_above_floor() {
        let label = select_label(&[0.1, 0.7, 0.2], &labels());
        assert_eq!(label, Label::SecurityAlert);
    }

    #[test]
    fn floor_boundary_is_inclusive_of_the_failing_side() {
        // Exactly 0.5 must refuse to commit.
        let label = select_label(&[0.5, 0.3, 0.2], &labels());
        assert_eq!(label, Label::Unknown);
    }

    #[test]
    fn just_above_floor_commits() {
        let label = select_label(&[0.51, 0.29, 0.2], &labels());
        assert_eq!(label, Label::UserAction);
    }

    #[test]
    fn low_confidence_distribution_is_unknown() {
        let label = select_label(&[0.3, 0.35, 0.35], &labels());
        assert_eq!(label, Label::Unknown);
    }

    #[test]
    fn empty_distribution_is_unknown() {
        assert_eq!(select_label(&[], &labels()), Label::Unknown);
    }
}
