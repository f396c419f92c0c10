//! HTTP handlers for the webhook receiver and operator endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::application::handlers::lifecycle::{
    HandleLifecycleEventCommand, HandleLifecycleEventHandler, RunFullSyncHandler,
};
use crate::domain::foundation::ErrorCode;
use crate::domain::subscriber::LifecycleEvent;
use crate::domain::sync::SyncError;

use super::dto::{ErrorResponse, EventParseError, WebhookPayload, WebhookResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for webhook routes.
#[derive(Clone)]
pub struct WebhookAppState {
    pub lifecycle: Arc<HandleLifecycleEventHandler>,
    pub full_sync: Arc<RunFullSyncHandler>,

    /// Bearer token for operator endpoints. `None` disables them.
    pub admin_token: Option<SecretString>,

    /// How long a webhook waits for its outcome before acknowledging anyway.
    pub ack_budget: Duration,

    /// Timeout for every route except the full sync.
    pub request_timeout: Duration,
}

/// Outcome label for events still being processed when acknowledged.
pub const ACCEPTED: &str = "accepted";

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET / - Liveness check
pub async fn health() -> &'static str {
    "subscriber-sync is running"
}

/// POST /webhooks/noticeable - Receive a lifecycle event
///
/// Any well-formed event is acknowledged with 200 whatever the downstream
/// outcome, so the source system never redelivers because of a target-side
/// failure. Unparseable or unsupported events get 400.
///
/// Processing runs on its own task. When it outlasts `ack_budget` the event
/// is acknowledged as `accepted` and the task finishes in the background,
/// logging its outcome.
pub async fn receive_webhook(
    State(state): State<WebhookAppState>,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| EventParseError::Malformed(e.to_string()))?;
    let event_type = payload.event_type.clone();
    let event = LifecycleEvent::try_from(payload)?;

    let lifecycle = Arc::clone(&state.lifecycle);
    let task_event_type = event_type.clone();
    let task = tokio::spawn(async move {
        let result = lifecycle.handle(HandleLifecycleEventCommand { event }).await;
        match &result {
            Ok(outcome) => {
                tracing::debug!(event_type = %task_event_type, outcome = outcome.label(), "Webhook processed")
            }
            Err(failure) => {
                tracing::error!(event_type = %task_event_type, payload = %failure.payload, "Authentication with target system failed")
            }
        }
        result
    });

    let outcome = match tokio::time::timeout(state.ack_budget, task).await {
        Ok(Ok(Ok(result))) => result.label().to_string(),
        Ok(Ok(Err(_))) => ErrorCode::AuthFailure.to_string(),
        Ok(Err(join_error)) => {
            tracing::error!(event_type = %event_type, error = %join_error, "Webhook task failed");
            ErrorCode::InternalError.to_string()
        }
        Err(_) => {
            tracing::warn!(
                event_type = %event_type,
                budget_ms = state.ack_budget.as_millis() as u64,
                "Webhook still processing; acknowledging early"
            );
            ACCEPTED.to_string()
        }
    };

    Ok(Json(WebhookResponse {
        received: true,
        event_type,
        outcome,
    }))
}

/// POST /sync/full - Run a full reconciliation (operator only)
pub async fn run_full_sync(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, WebhookApiError> {
    let authorized = state
        .admin_token
        .as_ref()
        .is_some_and(|expected| bearer_matches(&headers, expected));
    if !authorized {
        tracing::warn!("Rejected full sync request without valid admin token");
        return Err(WebhookApiError::Unauthorized);
    }

    let report = state.full_sync.handle().await?;
    Ok(Json(report))
}

fn bearer_matches(headers: &HeaderMap, expected: &SecretString) -> bool {
    let Some(provided) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    else {
        return false;
    };
    provided
        .as_bytes()
        .ct_eq(expected.expose_secret().as_bytes())
        .into()
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts failures to HTTP responses.
#[derive(Debug)]
pub enum WebhookApiError {
    InvalidEvent(EventParseError),
    Unauthorized,
    Sync(SyncError),
}

impl From<EventParseError> for WebhookApiError {
    fn from(err: EventParseError) -> Self {
        Self::InvalidEvent(err)
    }
}

impl From<SyncError> for WebhookApiError {
    fn from(err: SyncError) -> Self {
        Self::Sync(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            WebhookApiError::InvalidEvent(err) => {
                tracing::warn!(error = %err, "Rejected webhook payload");
                let code = match err {
                    EventParseError::UnknownEventType(_) => ErrorCode::UnknownEventType,
                    _ => ErrorCode::ValidationFailed,
                };
                (StatusCode::BAD_REQUEST, code, err.to_string())
            }
            WebhookApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "A valid admin bearer token is required".to_string(),
            ),
            WebhookApiError::Sync(err) => {
                tracing::error!(error = %err, "Full sync failed");
                (StatusCode::BAD_GATEWAY, err.code(), err.to_string())
            }
        };

        let body = ErrorResponse::new(code.to_string(), message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_must_match_exactly() {
        let expected = SecretString::new("s3cret".into());

        assert!(bearer_matches(&headers("Bearer s3cret"), &expected));
        assert!(!bearer_matches(&headers("Bearer s3cre"), &expected));
        assert!(!bearer_matches(&headers("Basic s3cret"), &expected));
        assert!(!bearer_matches(&HeaderMap::new(), &expected));
    }

    #[test]
    fn unknown_event_maps_to_bad_request() {
        let response =
            WebhookApiError::from(EventParseError::UnknownEventType("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn sync_error_maps_to_bad_gateway() {
        let response = WebhookApiError::from(SyncError::source("down")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let response = WebhookApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
