//! Status classification
//!
//! Platform status strings are kept verbatim and classified into a small
//! set of boolean predicates. Unknown tokens classify as "nothing" so newer
//! platform versions do not break older readers.

use serde::{Deserialize, Serialize};

/// Status tokens used by one platform schema version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTokens {
    pub pending: String,
    pub running: String,
    pub succeeded: String,
    pub failed: String,
    pub skipped: String,
}

impl StatusTokens {
    /// Workflow engine phases, used by v1 run manifests and raw workflows
    pub fn argo() -> Self {
        Self {
            pending: "Pending".to_string(),
            running: "Running".to_string(),
            succeeded: "Succeeded".to_string(),
            failed: "Failed".to_string(),
            skipped: "Skipped".to_string(),
        }
    }

    /// Run and task states reported by the v2 API
    pub fn kfp_v2() -> Self {
        Self {
            pending: "PENDING".to_string(),
            running: "RUNNING".to_string(),
            succeeded: "SUCCEEDED".to_string(),
            failed: "FAILED".to_string(),
            skipped: "SKIPPED".to_string(),
        }
    }
}

impl Default for StatusTokens {
    fn default() -> Self {
        Self::argo()
    }
}

/// Classified status predicates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFlags {
    pub pending: bool,
    pub running: bool,
    pub succeeded: bool,
    pub failed: bool,
    pub skipped: bool,
}

impl StatusFlags {
    /// Terminal: succeeded, failed or skipped
    pub fn finished(&self) -> bool {
        self.succeeded || self.failed || self.skipped
    }
}

/// Classify a status string against a token set
///
/// Matching is exact and case-sensitive. An absent or unrecognized status
/// yields all predicates false.
pub fn classify(status: Option<&str>, tokens: &StatusTokens) -> StatusFlags {
    let Some(status) = status else {
        return StatusFlags::default();
    };

    StatusFlags {
        pending: status == tokens.pending,
        running: status == tokens.running,
        succeeded: status == tokens.succeeded,
        failed: status == tokens.failed,
        skipped: status == tokens.skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_tokens_are_finished() {
        let tokens = StatusTokens::argo();
        for status in ["Succeeded", "Failed", "Skipped"] {
            assert!(classify(Some(status), &tokens).finished(), "{status}");
        }
    }

    #[test]
    fn test_non_terminal_tokens_are_not_finished() {
        let tokens = StatusTokens::argo();
        for status in ["Pending", "Running", "Error", "Omitted", "", "succeeded"] {
            assert!(!classify(Some(status), &tokens).finished(), "{status}");
        }
        assert!(!classify(None, &tokens).finished());
    }

    #[test]
    fn test_single_predicate_per_known_token() {
        let tokens = StatusTokens::argo();
        let flags = classify(Some("Running"), &tokens);
        assert!(flags.running);
        assert!(!flags.pending && !flags.succeeded && !flags.failed && !flags.skipped);

        let flags = classify(Some("Pending"), &tokens);
        assert!(flags.pending);
        assert!(!flags.finished());
    }

    #[test]
    fn test_unknown_token_is_all_false() {
        let flags = classify(Some("Terminating"), &StatusTokens::argo());
        assert_eq!(flags, StatusFlags::default());
    }

    #[test]
    fn test_case_sensitive_per_schema() {
        let v2 = StatusTokens::kfp_v2();
        assert!(classify(Some("SUCCEEDED"), &v2).succeeded);
        assert!(!classify(Some("Succeeded"), &v2).succeeded);
        assert!(!classify(Some("SUCCEEDED"), &StatusTokens::argo()).succeeded);
    }
}
