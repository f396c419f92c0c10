//! Foundation module - Shared domain primitives.
//!
//! Identifiers and error vocabulary used by the subscriber and sync modules.

mod errors;
mod ids;

pub use errors::{ErrorCode, ValidationError};
pub use ids::SyncRunId;
