//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the sync engine and the two systems it bridges. Adapters implement these
//! ports.
//!
//! - `SourceSystemClient` - Reads the subscriber base (lifecycle owner)
//! - `TargetSystemClient` - Manages static-list membership and program tokens

mod source_system;
mod target_system;

pub use source_system::{SourceError, SourceSystemClient};
pub use target_system::{
    IssuedToken, ListPage, MemberStatus, MembershipResult, ProviderError, TargetError,
    TargetSystemClient, TextTokenUpdate,
};
