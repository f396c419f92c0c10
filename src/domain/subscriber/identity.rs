//! SubscriberIdentity value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SubscriberStatus;
use crate::domain::foundation::ValidationError;

/// A subscriber as seen by the sync engine.
///
/// The email address is the unique key for every target-system operation.
/// It is carried exactly as received; case folding or other normalisation is
/// the caller's job. `validate` only checks the address is structurally usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberIdentity {
    /// Email address, the unique key.
    pub email: String,

    /// Display name (source "full name").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// When the subscription was created in the source system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Source-side subscription status.
    #[serde(default)]
    pub status: SubscriberStatus,

    /// Archived subscribers are never list members, whatever their status.
    #[serde(default)]
    pub archived: bool,
}

impl SubscriberIdentity {
    /// Creates an active, unarchived identity for the given email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: None,
            created_at: None,
            status: SubscriberStatus::Active,
            archived: false,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_status(mut self, status: SubscriberStatus) -> Self {
        self.status = status;
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    /// Returns true if this subscriber should be a member of the target list.
    pub fn should_be_member(&self) -> bool {
        self.status.is_active() && !self.archived
    }

    /// Checks the email is structurally usable as a target-system key.
    ///
    /// Requires exactly one `@` with a non-empty local part and domain, and no
    /// whitespace. No case folding is applied.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if self.email.chars().any(char::is_whitespace) {
            return Err(ValidationError::invalid_format("email", "contains whitespace"));
        }

        let mut parts = self.email.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
                Ok(())
            }
            (_, _, Some(_)) => Err(ValidationError::invalid_format(
                "email",
                "more than one @ symbol",
            )),
            (_, None, _) => Err(ValidationError::invalid_format("email", "missing @ symbol")),
            _ => Err(ValidationError::invalid_format(
                "email",
                "empty local part or domain",
            )),
        }
    }

    /// Splits the display name into (first, last) on the first space.
    pub fn name_parts(&self) -> (Option<&str>, Option<&str>) {
        match self.display_name.as_deref().map(str::trim) {
            None | Some("") => (None, None),
            Some(name) => match name.split_once(' ') {
                Some((first, last)) => (Some(first), Some(last.trim())),
                None => (Some(name), None),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_identity_is_active_member() {
        let identity = SubscriberIdentity::new("a@x.com");
        assert!(identity.should_be_member());
        assert!(identity.validate().is_ok());
    }

    #[test]
    fn archived_identity_is_not_a_member() {
        let identity = SubscriberIdentity::new("a@x.com").archived(true);
        assert!(!identity.should_be_member());
    }

    #[test]
    fn unsubscribed_identity_is_not_a_member() {
        let identity =
            SubscriberIdentity::new("a@x.com").with_status(SubscriberStatus::Unsubscribed);
        assert!(!identity.should_be_member());
    }

    #[test]
    fn validate_rejects_malformed_emails() {
        for bad in ["", "   ", "no-at-sign", "@x.com", "a@", "a@@x.com", "a b@x.com"] {
            assert!(
                SubscriberIdentity::new(bad).validate().is_err(),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn validate_does_not_normalise_case() {
        let identity = SubscriberIdentity::new("Mixed.Case@Example.COM");
        assert!(identity.validate().is_ok());
        assert_eq!(identity.email, "Mixed.Case@Example.COM");
    }

    #[test]
    fn name_parts_splits_on_first_space() {
        let identity = SubscriberIdentity::new("a@x.com").with_display_name("Ada Byron King");
        assert_eq!(identity.name_parts(), (Some("Ada"), Some("Byron King")));

        let single = SubscriberIdentity::new("a@x.com").with_display_name("Ada");
        assert_eq!(single.name_parts(), (Some("Ada"), None));

        assert_eq!(SubscriberIdentity::new("a@x.com").name_parts(), (None, None));
    }

    #[test]
    fn deserializes_with_defaults() {
        let identity: SubscriberIdentity =
            serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert_eq!(identity.status, SubscriberStatus::Active);
        assert!(!identity.archived);
        assert!(identity.display_name.is_none());
    }
}
