//! Data Transfer Objects for the webhook receiver.
//!
//! Inbound payloads follow the Noticeable webhook format:
//! `{"type": "subscriber.created", "data": {"email": "...", ...}}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::subscriber::{
    LifecycleEvent, LifecycleEventKind, PublishedContent, SubscriberIdentity,
};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Raw lifecycle event as delivered by the source system.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default)]
    pub data: serde_json::Value,
}

/// `data` of subscriber events.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberData {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub full_name: Option<String>,

    /// Kept as text; an unparseable timestamp is dropped, not rejected.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `data` of content publication events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostData {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

/// Why a webhook payload could not be turned into a lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventParseError {
    #[error("Malformed webhook body: {0}")]
    Malformed(String),

    #[error("Unknown event type '{0}'")]
    UnknownEventType(String),

    #[error("Event '{0}' carries no email")]
    MissingEmail(String),

    #[error("Event '{0}' carries no content")]
    MissingContent(String),
}

impl TryFrom<WebhookPayload> for LifecycleEvent {
    type Error = EventParseError;

    fn try_from(payload: WebhookPayload) -> Result<Self, Self::Error> {
        let kind = LifecycleEventKind::from_type(&payload.event_type);
        match kind {
            LifecycleEventKind::SubscriberCreated => {
                Ok(LifecycleEvent::SubscriberCreated(subscriber(&payload)?))
            }
            LifecycleEventKind::SubscriberDeleted => {
                Ok(LifecycleEvent::SubscriberDeleted(subscriber(&payload)?))
            }
            LifecycleEventKind::PostPublished => {
                let data: PostData = serde_json::from_value(payload.data.clone())
                    .map_err(|e| EventParseError::Malformed(e.to_string()))?;
                let content = data
                    .content
                    .ok_or_else(|| EventParseError::MissingContent(payload.event_type.clone()))?;
                Ok(LifecycleEvent::ContentPublished(PublishedContent {
                    title: data.title,
                    content,
                }))
            }
            LifecycleEventKind::Unknown(event_type) => {
                Err(EventParseError::UnknownEventType(event_type))
            }
        }
    }
}

fn subscriber(payload: &WebhookPayload) -> Result<SubscriberIdentity, EventParseError> {
    let data: SubscriberData = serde_json::from_value(payload.data.clone())
        .map_err(|e| EventParseError::Malformed(e.to_string()))?;

    let email = data
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| EventParseError::MissingEmail(payload.event_type.clone()))?;

    let mut identity = SubscriberIdentity::new(email);
    if let Some(name) = data.full_name.filter(|n| !n.trim().is_empty()) {
        identity = identity.with_display_name(name);
    }
    if let Some(created_at) = data
        .created_at
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
    {
        identity = identity.with_created_at(created_at.with_timezone(&Utc));
    }
    Ok(identity)
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Acknowledgement for a processed webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub received: bool,
    pub event_type: String,

    /// Downstream outcome label; informational only.
    pub outcome: String,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn created_event_parses_identity() {
        let event = LifecycleEvent::try_from(payload(json!({
            "type": "subscriber.created",
            "data": {"email": "a@x.com", "fullName": "Ada Lovelace", "createdAt": "2024-03-01T10:00:00Z"}
        })))
        .unwrap();

        match event {
            LifecycleEvent::SubscriberCreated(identity) => {
                assert_eq!(identity.email, "a@x.com");
                assert_eq!(identity.display_name.as_deref(), Some("Ada Lovelace"));
                assert!(identity.created_at.is_some());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn bad_timestamp_is_dropped() {
        let event = LifecycleEvent::try_from(payload(json!({
            "type": "subscriber.deleted",
            "data": {"email": "a@x.com", "createdAt": "yesterday"}
        })))
        .unwrap();

        match event {
            LifecycleEvent::SubscriberDeleted(identity) => assert!(identity.created_at.is_none()),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn missing_email_is_rejected() {
        let err = LifecycleEvent::try_from(payload(json!({
            "type": "subscriber.created",
            "data": {"fullName": "Nobody"}
        })))
        .unwrap_err();

        assert_eq!(err, EventParseError::MissingEmail("subscriber.created".into()));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = LifecycleEvent::try_from(payload(json!({
            "type": "subscriber.updated",
            "data": {"email": "a@x.com"}
        })))
        .unwrap_err();

        assert_eq!(err, EventParseError::UnknownEventType("subscriber.updated".into()));
    }

    #[test]
    fn post_published_carries_content() {
        let event = LifecycleEvent::try_from(payload(json!({
            "type": "post.published",
            "data": {"title": "v2", "content": "<p>notes</p>"}
        })))
        .unwrap();

        assert_eq!(
            event,
            LifecycleEvent::ContentPublished(PublishedContent {
                title: Some("v2".into()),
                content: "<p>notes</p>".into(),
            })
        );
    }
}
