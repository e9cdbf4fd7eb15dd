//! Shared types for the classification pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

// ── Log record ──────────────────────────────────────────────────────

/// A single log line with its declared origin system.
///
/// Callers build one per input row; the router consumes it once and never
/// retains it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Logical source system ("LegacyCRM", "ModernHR", ...).
    pub source: String,
    /// Raw log message text.
    pub message: String,
}

impl LogRecord {
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
        }
    }
}

// ── Label ───────────────────────────────────────────────────────────

/// Classification label assigned to one log message.
///
/// Known categories are explicit variants so routing and tests stay
/// exhaustive; `Other` carries the generative tier's occasional short
/// free-form replies and any trained label outside the known set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    UserAction,
    SystemNotification,
    SecurityAlert,
    Error,
    WorkflowError,
    DeprecationWarning,
    Unknown,
    Other(String),
}

impl Label {
    /// Canonical display name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::UserAction => "User Action",
            Self::SystemNotification => "System Notification",
            Self::SecurityAlert => "Security Alert",
            Self::Error => "Error",
            Self::WorkflowError => "Workflow Error",
            Self::DeprecationWarning => "Deprecation Warning",
            Self::Unknown => "Unknown",
            Self::Other(name) => name,
        }
    }

    /// Map a label name (e.g. from a trained artifact) back to a variant.
    ///
    /// Unrecognized names are preserved as `Other`, not rejected — the
    /// trained label set is open from the engine's perspective.
    pub fn from_name(name: &str) -> Self {
        match name {
            "User Action" => Self::UserAction,
            "System Notification" => Self::SystemNotification,
            "Security Alert" => Self::SecurityAlert,
            "Error" => Self::Error,
            "Workflow Error" => Self::WorkflowError,
            "Deprecation Warning" => Self::DeprecationWarning,
            "Unknown" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Label {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ── Classifier seams ────────────────────────────────────────────────

/// Statistical (embedding + probability head) classification tier.
///
/// Implementations must be read-only after construction so concurrent
/// classification needs no locking.
pub trait StatisticalClassify: Send + Sync {
    /// Classify one message.
    ///
    /// Low confidence is not an error — it surfaces as `Label::Unknown`.
    /// An `Err` means inference itself failed.
    fn classify(&self, message: &str) -> Result<Label, ModelError>;
}

/// Generative (text-generation endpoint) classification tier.
///
/// Infallible at this boundary: implementations convert transport and parse
/// failures into `Label::Unknown` internally.
#[async_trait]
pub trait GenerativeClassify: Send + Sync {
    async fn classify(&self, message: &str) -> Label;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_round_trips_known_names() {
        for name in [
            "User Action",
            "System Notification",
            "Security Alert",
            "Error",
            "Workflow Error",
            "Deprecation Warning",
            "Unknown",
        ] {
            let label = Label::from_name(name);
            assert!(!matches!(label, Label::Other(_)), "{name} should be known");
            assert_eq!(label.as_str(), name);
        }
    }

    #[test]
    fn unrecognized_name_becomes_other() {
        let label = Label::from_name("Resource Usage");
        assert_eq!(label, Label::Other("Resource Usage".to_string()));
        assert_eq!(label.as_str(), "Resource Usage");
    }

    #[test]
    fn label_serializes_as_plain_string() {
        let json = serde_json::to_value(Label::DeprecationWarning).unwrap();
        assert_eq!(json, "Deprecation Warning");

        let json = serde_json::to_value(Label::Other("HTTP Status".into())).unwrap();
        assert_eq!(json, "HTTP Status");
    }

    #[test]
    fn record_construction() {
        let record = LogRecord::new("ModernHR", "Backup completed successfully.");
        assert_eq!(record.source, "ModernHR");
        assert_eq!(record.message, "Backup completed successfully.");
    }
}
