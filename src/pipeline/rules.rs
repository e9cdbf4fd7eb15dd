//! Deterministic fast-path classification via ordered regex rules.
//!
//! Runs before the statistical tier for every non-legacy source. A match
//! short-circuits the pipeline: no embedding inference for messages with an
//! exact structural form. Rule order is load-bearing — patterns overlap and
//! the first match in definition order wins.

use regex::Regex;
use tracing::debug;

use crate::pipeline::types::Label;

/// A single pattern → label rule.
#[derive(Debug, Clone)]
struct Rule {
    regex: Regex,
    label: Label,
}

/// Ordered, first-match-wins rule matcher.
///
/// Pure and synchronous: no I/O, no external calls, no state beyond the
/// rules compiled at construction.
pub struct RuleMatcher {
    rules: Vec<Rule>,
}

impl RuleMatcher {
    /// Build the fixed rule set for structured log sources.
    ///
    /// Patterns are anchored at the start of the normalized message and
    /// matched case-insensitively; they do not need to consume the whole
    /// message.
    pub fn default_rules() -> Self {
        Self::from_patterns(&[
            (r"User User\d+ logged (in|out).", Label::UserAction),
            (r"Backup (started|ended) at .*", Label::SystemNotification),
            (r"Backup completed successfully.", Label::SystemNotification),
            (r"System updated to version .*", Label::SystemNotification),
            (
                r"File .* uploaded successfully by user .*",
                Label::SystemNotification,
            ),
            (r"Disk cleanup completed successfully.", Label::SystemNotification),
            (r"System reboot initiated by user .*", Label::SystemNotification),
            (r"Account with ID .* created by .*", Label::UserAction),
            (
                r"User \d+ made multiple incorrect login attempts",
                Label::SecurityAlert,
            ),
            (r"Data replication task (for|failed) .*", Label::Error),
            (r"Account Account(\d+).*login.*", Label::SecurityAlert),
            (
                r"Server \d+ experienced potential security incident, review required",
                Label::SecurityAlert,
            ),
        ])
    }

    /// Create an empty matcher (for testing).
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Compile an ordered (pattern, label) list into a matcher.
    fn from_patterns(patterns: &[(&str, Label)]) -> Self {
        let rules = patterns
            .iter()
            .map(|(pattern, label)| Rule {
                regex: Regex::new(&format!("(?i)^{pattern}")).unwrap(),
                label: label.clone(),
            })
            .collect();
        Self { rules }
    }

    /// Evaluate the ordered rule set against a message.
    ///
    /// Returns the label of the first matching rule, or `None` when no rule
    /// fires — a normal outcome that falls through to the statistical tier,
    /// distinct from an input error.
    pub fn find_match(&self, message: &str) -> Option<Label> {
        let cleaned = normalize(message);

        for rule in &self.rules {
            if rule.regex.is_match(cleaned) {
                debug!(label = %rule.label, pattern = %rule.regex, "Rule matched");
                return Some(rule.label.clone());
            }
        }

        None
    }
}

/// Strip surrounding whitespace, then one layer of surrounding double quotes
/// (for logs originally emitted with quoting), then whitespace again.
fn normalize(message: &str) -> &str {
    let trimmed = message.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_user_actions() {
        let matcher = RuleMatcher::default_rules();
        assert_eq!(
            matcher.find_match("User User123 logged in."),
            Some(Label::UserAction)
        );
        assert_eq!(
            matcher.find_match("User User7 logged out."),
            Some(Label::UserAction)
        );
        assert_eq!(
            matcher.find_match("Account with ID 456 created by Admin."),
            Some(Label::UserAction)
        );
    }

    #[test]
    fn classifies_system_notifications() {
        let matcher = RuleMatcher::default_rules();
        for message in [
            "Backup started at 2023-10-01 02:00:00.",
            "Backup completed successfully.",
            "System updated to version 1.2.3.",
            "File report.pdf uploaded successfully by user Alice.",
            "Disk cleanup completed successfully.",
            "System reboot initiated by user Admin.",
        ] {
            assert_eq!(
                matcher.find_match(message),
                Some(Label::SystemNotification),
                "message: {message}"
            );
        }
    }

    #[test]
    fn classifies_security_alerts() {
        let matcher = RuleMatcher::default_rules();
        for message in [
            "User 789 made multiple incorrect login attempts",
            "Account Account42 had a failed login attempt from IP 192.168.1.1",
            "Server 12 experienced potential security incident, review required",
        ] {
            assert_eq!(
                matcher.find_match(message),
                Some(Label::SecurityAlert),
                "message: {message}"
            );
        }
    }

    #[test]
    fn classifies_replication_errors() {
        let matcher = RuleMatcher::default_rules();
        assert_eq!(
            matcher.find_match("Data replication task for database XYZ failed due to timeout."),
            Some(Label::Error)
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let matcher = RuleMatcher::default_rules();
        assert_eq!(
            matcher.find_match("backup completed successfully."),
            Some(Label::SystemNotification)
        );
    }

    #[test]
    fn matching_is_anchored_at_start() {
        let matcher = RuleMatcher::default_rules();
        // Pattern text present mid-message must not match.
        assert_eq!(
            matcher.find_match("note: Backup completed successfully."),
            None
        );
    }

    #[test]
    fn strips_quotes_and_whitespace_before_matching() {
        let matcher = RuleMatcher::default_rules();
        assert_eq!(
            matcher.find_match("  \"System reboot initiated by user Admin.\"  "),
            Some(Label::SystemNotification)
        );
    }

    #[test]
    fn unquoted_after_trim_passes_through() {
        // A lone leading quote is not a quote layer and stays in place.
        let matcher = RuleMatcher::default_rules();
        assert_eq!(
            matcher.find_match("\"Backup completed successfully."),
            None
        );
    }

    #[test]
    fn no_rule_fired_returns_none() {
        let matcher = RuleMatcher::default_rules();
        assert_eq!(matcher.find_match("Hi, the weather is nice today"), None);
        assert_eq!(matcher.find_match(""), None);
    }

    #[test]
    fn empty_matcher_never_fires() {
        let matcher = RuleMatcher::empty();
        assert_eq!(matcher.find_match("User User123 logged in."), None);
    }

    #[test]
    fn first_match_wins_on_overlapping_patterns() {
        let matcher = RuleMatcher::from_patterns(&[
            (r"Backup .*", Label::SystemNotification),
            (r"Backup completed successfully.", Label::UserAction),
        ]);
        assert_eq!(
            matcher.find_match("Backup completed successfully."),
            Some(Label::SystemNotification)
        );
    }

    #[test]
    fn matching_is_deterministic_across_calls() {
        let matcher = RuleMatcher::default_rules();
        let first = matcher.find_match("User User55 logged in.");
        for _ in 0..10 {
            assert_eq!(matcher.find_match("User User55 logged in."), first);
        }
    }
}
