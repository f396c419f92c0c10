//! Sync domain module.
//!
//! Target-side vocabulary for the synchronization engine: credentials, list
//! references, membership actions and the outcome taxonomy.
//!
//! # Module Structure
//!
//! - `credential` - Access token with margin-adjusted expiry
//! - `list` - Logical list references and resolved handles
//! - `action` - Add/remove membership actions
//! - `outcome` - MutationOutcome taxonomy and failure classes
//! - `errors` - AuthFailure and SyncError

mod action;
mod credential;
mod errors;
mod list;
mod outcome;

pub use action::MembershipAction;
pub use credential::{AccessToken, Credential};
pub use errors::{AuthFailure, SyncError};
pub use list::{ListHandle, ListRef, ListRefParseError, StaticList};
pub use outcome::{ActionTally, FailureClass, IdentityOutcome, MutationOutcome};
