//! Classification router — per-record tier selection.
//!
//! Flow for each record:
//! 1. "LegacyCRM" source → generative tier exclusively
//! 2. otherwise rule matcher (fast, no inference) → may short-circuit
//! 3. no rule fired → statistical tier, result taken unconditionally

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::llm::OllamaClient;
use crate::pipeline::generative::GenerativeClassifier;
use crate::pipeline::rules::RuleMatcher;
use crate::pipeline::statistical::StatisticalClassifier;
use crate::pipeline::types::{GenerativeClassify, Label, LogRecord, StatisticalClassify};

/// Source sentinel whose messages are free-form/semi-structured and not
/// amenable to rules.
pub const LEGACY_SOURCE: &str = "LegacyCRM";

/// Routes each record to the tier that produces its label.
///
/// Holds no cross-record state: records are classified independently, so
/// batch order never affects individual results.
pub struct ClassificationRouter {
    rules: RuleMatcher,
    statistical: Arc<dyn StatisticalClassify>,
    generative: Arc<dyn GenerativeClassify>,
}

impl ClassificationRouter {
    /// Create a router over explicit classifier handles.
    pub fn new(
        rules: RuleMatcher,
        statistical: Arc<dyn StatisticalClassify>,
        generative: Arc<dyn GenerativeClassify>,
    ) -> Self {
        Self {
            rules,
            statistical,
            generative,
        }
    }

    /// Construct the full three-tier engine from configuration.
    ///
    /// Loads the statistical artifacts (fatal on failure) and probes the
    /// generative endpoint (never fatal).
    pub async fn from_config(config: &EngineConfig) -> crate::error::Result<Self> {
        let statistical =
            StatisticalClassifier::load(&config.embedding_dir, &config.classifier_dir)?;

        let client = OllamaClient::with_timeout(
            config.generative_url.clone(),
            config.generative_model.clone(),
            config.generative_timeout,
        )?;
        let generative = GenerativeClassifier::connect(client).await;

        Ok(Self::new(
            RuleMatcher::default_rules(),
            Arc::new(statistical),
            Arc::new(generative),
        ))
    }

    /// Classify a single record.
    pub async fn classify(&self, record: &LogRecord) -> Label {
        if record.source == LEGACY_SOURCE {
            debug!(source = %record.source, "Routing to generative tier");
            return self.generative.classify(&record.message).await;
        }

        if let Some(label) = self.rules.find_match(&record.message) {
            debug!(
                source = %record.source,
                label = %label,
                "Rule matched — skipping statistical tier"
            );
            return label;
        }

        match self.statistical.classify(&record.message) {
            Ok(label) => label,
            Err(e) => {
                // An inference failure must not abort the batch; the record
                // still yields exactly one label.
                warn!(
                    source = %record.source,
                    error = %e,
                    "Statistical inference failed, returning Unknown"
                );
                Label::Unknown
            }
        }
    }

    /// Classify a batch, preserving input order.
    ///
    /// A pure per-element map: element `i`'s label depends only on
    /// `records[i]`, and no record-level failure aborts the rest.
    pub async fn classify_all(&self, records: &[LogRecord]) -> Vec<Label> {
        info!(count = records.len(), "Classifying batch");

        let mut labels = Vec::with_capacity(records.len());
        for record in records {
            labels.push(self.classify(record).await);
        }
        labels
    }
}
