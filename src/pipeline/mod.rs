//! Tiered log classification pipeline.
//!
//! Three strategies behind one router: ordered regex rules (fast path),
//! a local embedding classifier with a confidence floor, and a generative
//! endpoint for legacy free-form sources.

pub mod generative;
pub mod router;
pub mod rules;
pub mod statistical;
pub mod types;

pub use generative::GenerativeClassifier;
pub use router::{ClassificationRouter, LEGACY_SOURCE};
pub use rules::RuleMatcher;
pub use statistical::{CONFIDENCE_FLOOR, StatisticalClassifier};
pub use types::{GenerativeClassify, Label, LogRecord, StatisticalClassify};
