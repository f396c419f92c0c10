//! Subscriber status as reported by the source system.

use serde::{Deserialize, Serialize};

/// Subscription status of a subscriber in the source system.
///
/// Raw provider values are matched case-insensitively. Anything the sync
/// engine does not recognise is kept verbatim in `Unknown` so it can be
/// logged, and is treated as "should be absent".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberStatus {
    /// Confirmed, receiving notifications.
    #[default]
    Active,

    /// Opted out.
    Unsubscribed,

    /// Signed up but not yet confirmed.
    Pending,

    /// Status string the engine does not recognise.
    Unknown(String),
}

impl SubscriberStatus {
    /// Parses a raw status string from the source system.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" | "subscribed" | "confirmed" => SubscriberStatus::Active,
            "unsubscribed" | "inactive" | "cancelled" | "canceled" => {
                SubscriberStatus::Unsubscribed
            }
            "pending" | "unconfirmed" => SubscriberStatus::Pending,
            _ => SubscriberStatus::Unknown(raw.to_string()),
        }
    }

    /// Returns true if this status means the subscriber belongs on the target list.
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriberStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses_case_insensitively() {
        assert_eq!(SubscriberStatus::from_raw("SUBSCRIBED"), SubscriberStatus::Active);
        assert_eq!(SubscriberStatus::from_raw("active"), SubscriberStatus::Active);
        assert_eq!(
            SubscriberStatus::from_raw("Unsubscribed"),
            SubscriberStatus::Unsubscribed
        );
        assert_eq!(SubscriberStatus::from_raw(" pending "), SubscriberStatus::Pending);
    }

    #[test]
    fn keeps_unrecognised_status_verbatim() {
        assert_eq!(
            SubscriberStatus::from_raw("BOUNCED"),
            SubscriberStatus::Unknown("BOUNCED".to_string())
        );
    }

    #[test]
    fn only_active_counts_as_active() {
        assert!(SubscriberStatus::Active.is_active());
        assert!(!SubscriberStatus::Unsubscribed.is_active());
        assert!(!SubscriberStatus::Pending.is_active());
        assert!(!SubscriberStatus::Unknown("x".into()).is_active());
    }
}
