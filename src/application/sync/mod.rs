//! Sync engine: credential cache, list resolution, membership mutation and
//! bulk reconciliation.
//!
//! All shared state lives in [`SyncContext`].

mod bulk_reconciler;
mod context;
mod credential_manager;
mod list_resolver;
mod membership_synchronizer;

pub use bulk_reconciler::{plan_phases, BulkReconciler, Phase, ReconcileReport, ReconcilerConfig};
pub use context::{SyncContext, SyncContextConfig};
pub use credential_manager::CredentialManager;
pub use list_resolver::ListResolver;
pub use membership_synchronizer::MembershipSynchronizer;
