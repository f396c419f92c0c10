//! Application handlers.
//!
//! Command handlers that orchestrate the sync engine.

pub mod lifecycle;

pub use lifecycle::{
    HandleLifecycleEventCommand, HandleLifecycleEventHandler, HandleLifecycleEventResult,
    ProgramTokenConfig, PublishContentCommand, PublishContentHandler, PublishContentResult,
    RunFullSyncHandler,
};
