//! Lifecycle events delivered by the source system.
//!
//! The receiver parses the wire payload into one of these typed events
//! before handing it to the application layer.

use serde::{Deserialize, Serialize};

use super::SubscriberIdentity;

/// Event kinds the sync engine understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEventKind {
    /// `subscriber.created`
    SubscriberCreated,

    /// `subscriber.deleted`
    SubscriberDeleted,

    /// `post.published`
    PostPublished,

    /// Any other event type string.
    Unknown(String),
}

impl LifecycleEventKind {
    /// Maps a wire event type to a kind.
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "subscriber.created" => LifecycleEventKind::SubscriberCreated,
            "subscriber.deleted" => LifecycleEventKind::SubscriberDeleted,
            "post.published" => LifecycleEventKind::PostPublished,
            other => LifecycleEventKind::Unknown(other.to_string()),
        }
    }

    /// Returns the wire event type string.
    pub fn as_type(&self) -> &str {
        match self {
            LifecycleEventKind::SubscriberCreated => "subscriber.created",
            LifecycleEventKind::SubscriberDeleted => "subscriber.deleted",
            LifecycleEventKind::PostPublished => "post.published",
            LifecycleEventKind::Unknown(other) => other,
        }
    }
}

/// A content publication (release notes post) to mirror into the target system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedContent {
    /// Post title, if the source supplied one.
    #[serde(default)]
    pub title: Option<String>,

    /// Rendered post content.
    pub content: String,
}

/// A typed lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    SubscriberCreated(SubscriberIdentity),
    SubscriberDeleted(SubscriberIdentity),
    ContentPublished(PublishedContent),
}

impl LifecycleEvent {
    /// The kind of this event.
    pub fn kind(&self) -> LifecycleEventKind {
        match self {
            LifecycleEvent::SubscriberCreated(_) => LifecycleEventKind::SubscriberCreated,
            LifecycleEvent::SubscriberDeleted(_) => LifecycleEventKind::SubscriberDeleted,
            LifecycleEvent::ContentPublished(_) => LifecycleEventKind::PostPublished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_event_types() {
        assert_eq!(
            LifecycleEventKind::from_type("subscriber.created"),
            LifecycleEventKind::SubscriberCreated
        );
        assert_eq!(
            LifecycleEventKind::from_type("subscriber.deleted"),
            LifecycleEventKind::SubscriberDeleted
        );
        assert_eq!(
            LifecycleEventKind::from_type("post.published"),
            LifecycleEventKind::PostPublished
        );
    }

    #[test]
    fn unknown_event_type_is_preserved() {
        let kind = LifecycleEventKind::from_type("subscriber.updated");
        assert_eq!(kind, LifecycleEventKind::Unknown("subscriber.updated".into()));
        assert_eq!(kind.as_type(), "subscriber.updated");
    }

    #[test]
    fn event_reports_its_kind() {
        let event = LifecycleEvent::SubscriberDeleted(SubscriberIdentity::new("a@x.com"));
        assert_eq!(event.kind(), LifecycleEventKind::SubscriberDeleted);
        assert_eq!(event.kind().as_type(), "subscriber.deleted");
    }
}
