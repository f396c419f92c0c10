//! Axum router configuration for the webhook receiver.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;

use super::handlers::{health, receive_webhook, run_full_sync, WebhookAppState};

/// Create the service router.
///
/// # Routes
///
/// - `GET /` - Liveness text
/// - `POST /webhooks/noticeable` - Lifecycle events from the source system
/// - `POST /sync/full` - Full reconciliation; mounted only when an admin
///   token is configured, and requires `Authorization: Bearer <token>`
///
/// `request_timeout` wraps the first two routes. A full sync runs to
/// completion so it can always return its report.
pub fn webhook_router(state: WebhookAppState) -> Router {
    let mut router = Router::new()
        .route("/", get(health))
        .route("/webhooks/noticeable", post(receive_webhook))
        .layer(TimeoutLayer::new(state.request_timeout));

    if state.admin_token.is_some() {
        router = router.route("/sync/full", post(run_full_sync));
    }

    router.with_state(state)
}
