//! Lifecycle handlers.
//!
//! Command handlers driven by source-system events and operators:
//! - Subscriber created / deleted -> list membership
//! - Content published -> program text token
//! - Full reconciliation of the subscriber base

mod handle_lifecycle_event;
mod publish_content;
mod run_full_sync;

pub use handle_lifecycle_event::{
    HandleLifecycleEventCommand, HandleLifecycleEventHandler, HandleLifecycleEventResult,
};
pub use publish_content::{
    ProgramTokenConfig, PublishContentCommand, PublishContentHandler, PublishContentResult,
};
pub use run_full_sync::RunFullSyncHandler;
