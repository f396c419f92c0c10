//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the sync engine to external systems:
//! - `marketo` - Target system REST client plus an in-memory mock
//! - `noticeable` - Source system GraphQL client plus an in-memory mock
//! - `http` - Axum receiver for lifecycle webhooks and operator endpoints

pub mod http;
pub mod marketo;
pub mod noticeable;

pub use marketo::{MarketoClient, MockTargetSystem};
pub use noticeable::{MockSourceSystem, NoticeableClient};
