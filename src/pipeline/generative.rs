//! Generative classification tier for legacy free-form sources.
//!
//! Delegates to a text-generation endpoint constrained to a two-category
//! vocabulary. This tier never fails past its boundary: endpoint errors,
//! timeouts, and unparseable replies all surface as "Unknown" and the batch
//! moves on.

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::llm::{GenerateOptions, OllamaClient};
use crate::pipeline::types::{GenerativeClassify, Label};

/// Near-deterministic decoding: the reply parser depends on short, literal
/// category names, so sampling variance is kept minimal.
const TEMPERATURE: f32 = 0.1;
const TOP_P: f32 = 0.9;
/// Response length bound in tokens — a category name needs no more.
const NUM_PREDICT: u32 = 20;

/// Valid categories in tie-break order: when a reply contains both names,
/// the first containment wins.
const CATEGORIES: [Label; 2] = [Label::WorkflowError, Label::DeprecationWarning];

/// Replies at or above this length with no category match are junk, not a
/// free-form label.
const MAX_FREEFORM_LEN: usize = 50;

/// Text-generation-backed classifier for sources whose messages have no
/// structural form.
pub struct GenerativeClassifier {
    client: OllamaClient,
    reply_prefix: Regex,
}

impl GenerativeClassifier {
    /// Wrap an endpoint client, probing its model listing once.
    ///
    /// The probe only logs: an unreachable endpoint or a missing model is
    /// not fatal, because every classify call handles its own failures.
    pub async fn connect(client: OllamaClient) -> Self {
        client.probe_model().await;
        Self::new(client)
    }

    /// Wrap a client without probing (construction does no I/O).
    pub fn new(client: OllamaClient) -> Self {
        Self {
            client,
            reply_prefix: Regex::new(r"(?i)^(category|classification|answer):\s*").unwrap(),
        }
    }

    /// Build the fixed instructional prompt with the message embedded
    /// verbatim.
    fn build_prompt(message: &str) -> String {
        format!(
            "You are a log analysis expert. Classify this log message into one of these categories:\n\
             \n\
             Categories:\n\
             - Workflow Error: business process failures\n\
             - Deprecation Warning: deprecated feature usage notices\n\
             If you can't classify, respond with \"Unknown\".\n\
             Respond with ONLY the category name, no explanation.\n\
             \n\
             Log message: \"{message}\"\n"
        )
    }

    /// Parse a raw endpoint reply into a label.
    ///
    /// Strips surrounding quotes and whitespace, drops a leading label-prefix
    /// token, then tests case-insensitive containment against the category
    /// set. A short non-matching reply is kept as a free-form label; anything
    /// longer is "Unknown".
    fn parse_reply(&self, raw: &str) -> Label {
        let unquoted = strip_quotes(raw.trim());
        let cleaned = self.reply_prefix.replace(unquoted, "").trim().to_string();

        let lowered = cleaned.to_lowercase();
        for category in &CATEGORIES {
            if lowered.contains(&category.as_str().to_lowercase()) {
                return category.clone();
            }
        }

        if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("unknown") {
            Label::Unknown
        } else if cleaned.chars().count() < MAX_FREEFORM_LEN {
            Label::Other(cleaned)
        } else {
            Label::Unknown
        }
    }
}

#[async_trait]
impl GenerativeClassify for GenerativeClassifier {
    async fn classify(&self, message: &str) -> Label {
        let prompt = Self::build_prompt(message);
        let options = GenerateOptions {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            num_predict: NUM_PREDICT,
        };

        match self.client.generate(&prompt, options).await {
            Ok(reply) => {
                let label = self.parse_reply(&reply);
                debug!(raw = %reply.trim(), label = %label, "Generative reply parsed");
                label
            }
            Err(e) => {
                warn!(error = %e, "Generative classification failed, returning Unknown");
                Label::Unknown
            }
        }
    }
}

/// Strip one leading and one trailing quote character (single or double),
/// each independently of the other.
fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}
