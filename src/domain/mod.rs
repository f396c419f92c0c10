//! Domain layer containing sync vocabulary and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, error codes, validation errors)
//! - `subscriber` - Source-side subscribers and lifecycle events
//! - `sync` - Target-side credentials, list references and mutation outcomes

pub mod foundation;
pub mod subscriber;
pub mod sync;
