//! Webhook receiver HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, EventParseError, WebhookPayload, WebhookResponse};
pub use handlers::{WebhookApiError, WebhookAppState, ACCEPTED};
pub use routes::webhook_router;
