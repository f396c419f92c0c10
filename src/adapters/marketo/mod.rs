//! Marketo target system adapter.
//!
//! - `MarketoClient` - REST client for production use
//! - `MockTargetSystem` - in-memory implementation for tests

mod marketo_adapter;
mod mock_target_system;
mod wire_types;

pub use marketo_adapter::{MarketoClient, MarketoConfig};
pub use mock_target_system::{MethodCall, MockTargetSystem};
