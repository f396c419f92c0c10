//! Subscriber Sync - keeps a Marketo static list in step with Noticeable subscribers
//!
//! Lifecycle webhooks add or remove single subscribers; a full sync reconciles
//! the whole subscriber snapshot against the list.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
