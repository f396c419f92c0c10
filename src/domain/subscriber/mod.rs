//! Subscriber domain module.
//!
//! Source-side vocabulary: who a subscriber is, whether they should be on the
//! target list, and the lifecycle events that announce changes.
//!
//! # Module Structure
//!
//! - `identity` - SubscriberIdentity value object keyed by email
//! - `status` - SubscriberStatus as reported by the source system
//! - `events` - Lifecycle events handed to the core by the receiver

mod events;
mod identity;
mod status;

pub use events::{LifecycleEvent, LifecycleEventKind, PublishedContent};
pub use identity::SubscriberIdentity;
pub use status::SubscriberStatus;
