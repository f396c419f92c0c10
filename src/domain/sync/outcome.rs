//! Mutation outcome taxonomy.

use serde::Serialize;

use super::MembershipAction;
use crate::domain::foundation::ErrorCode;

/// How a provider failure should be treated by the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Token invalid or expired: refresh and retry once.
    CredentialExpired,

    /// The list addressed by the mutation does not exist.
    ListNotFound,

    /// Anything else: surfaced, not retried.
    Other,
}

/// Result of one membership mutation attempt.
///
/// Expected provider failures are values of this type rather than errors, so
/// callers can report them per operation without unwinding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    Success,

    /// Credential was rejected on the original call and again after refresh.
    CredentialExpired { detail: String },

    /// Target list could not be resolved or was reported missing.
    ListNotFound { detail: String },

    /// Network failure or unclassified provider error.
    TransportError { detail: String },

    /// Identity refused before any request was made.
    Rejected { detail: String },

    /// Bulk only: some identities failed; each failure listed individually.
    PartialSuccess { failures: Vec<IdentityOutcome> },
}

impl MutationOutcome {
    pub fn transport(detail: impl Into<String>) -> Self {
        MutationOutcome::TransportError {
            detail: detail.into(),
        }
    }

    pub fn rejected(detail: impl Into<String>) -> Self {
        MutationOutcome::Rejected {
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MutationOutcome::Success)
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            MutationOutcome::Success => "success",
            MutationOutcome::CredentialExpired { .. } => "credential_expired",
            MutationOutcome::ListNotFound { .. } => "list_not_found",
            MutationOutcome::TransportError { .. } => "transport_error",
            MutationOutcome::Rejected { .. } => "rejected",
            MutationOutcome::PartialSuccess { .. } => "partial_success",
        }
    }

    /// Error code for non-success outcomes.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            MutationOutcome::Success | MutationOutcome::PartialSuccess { .. } => None,
            MutationOutcome::CredentialExpired { .. } => Some(ErrorCode::CredentialExpired),
            MutationOutcome::ListNotFound { .. } => Some(ErrorCode::ListNotFound),
            MutationOutcome::TransportError { .. } => Some(ErrorCode::TargetSystemError),
            MutationOutcome::Rejected { .. } => Some(ErrorCode::IdentityRejected),
        }
    }
}

/// Outcome of one identity within a batched operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityOutcome {
    pub email: String,
    pub action: MembershipAction,
    #[serde(flatten)]
    pub outcome: MutationOutcome,
}

impl IdentityOutcome {
    pub fn new(email: impl Into<String>, action: MembershipAction, outcome: MutationOutcome) -> Self {
        Self {
            email: email.into(),
            action,
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Success/failure counts for one action type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionTally {
    pub succeeded: usize,
    pub failed: usize,
}

impl ActionTally {
    pub fn record(&mut self, outcome: &MutationOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(MutationOutcome::ListNotFound {
            detail: "#7".into(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "list_not_found");
        assert_eq!(json["detail"], "#7");
    }

    #[test]
    fn identity_outcome_flattens_outcome() {
        let item = IdentityOutcome::new(
            "a@x.com",
            MembershipAction::Remove,
            MutationOutcome::rejected("missing @ symbol"),
        );
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["action"], "remove");
        assert_eq!(json["outcome"], "rejected");
    }

    #[test]
    fn tally_counts_success_and_failure() {
        let mut tally = ActionTally::default();
        tally.record(&MutationOutcome::Success);
        tally.record(&MutationOutcome::Success);
        tally.record(&MutationOutcome::transport("boom"));
        assert_eq!(tally.succeeded, 2);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn error_code_only_for_failures() {
        assert!(MutationOutcome::Success.error_code().is_none());
        assert_eq!(
            MutationOutcome::rejected("x").error_code(),
            Some(ErrorCode::IdentityRejected)
        );
    }
}
