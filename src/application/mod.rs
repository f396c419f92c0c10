//! Application layer - Handlers and the sync engine.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
pub mod sync;

pub use handlers::{
    HandleLifecycleEventCommand, HandleLifecycleEventHandler, HandleLifecycleEventResult,
    ProgramTokenConfig, PublishContentCommand, PublishContentHandler, PublishContentResult,
    RunFullSyncHandler,
};
pub use sync::{
    BulkReconciler, MembershipSynchronizer, ReconcileReport, ReconcilerConfig, SyncContext,
    SyncContextConfig,
};
