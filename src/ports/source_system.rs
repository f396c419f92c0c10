//! Source system port for reading the subscriber base.
//!
//! The source system (e.g., Noticeable) owns subscriber lifecycle; the sync
//! engine only reads from it.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::subscriber::SubscriberIdentity;

/// Port for source-system integrations.
#[async_trait]
pub trait SourceSystemClient: Send + Sync {
    /// Fetch every subscriber in the project, following pagination.
    async fn list_subscribers(&self) -> Result<Vec<SubscriberIdentity>, SourceError>;

    /// Fetch one subscriber by email.
    async fn get_subscriber(&self, email: &str) -> Result<Option<SubscriberIdentity>, SourceError>;
}

/// Errors from source-system calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Query accepted but the response carried errors.
    #[error("query failed: {0}")]
    Query(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_system_client_is_object_safe() {
        fn _accepts_dyn(_client: &dyn SourceSystemClient) {}
    }

    #[test]
    fn http_error_display_includes_status() {
        let err = SourceError::Http {
            status: 403,
            body: "forbidden".into(),
        };
        assert_eq!(err.to_string(), "HTTP 403: forbidden");
    }
}
