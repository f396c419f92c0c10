//! SyncContext - shared state for the sync engine.

use std::sync::Arc;

use chrono::Duration;
use secrecy::SecretString;

use super::{CredentialManager, ListResolver};
use crate::ports::TargetSystemClient;

/// Settings for building a `SyncContext`.
#[derive(Debug, Clone)]
pub struct SyncContextConfig {
    pub client_id: String,
    pub client_secret: SecretString,

    /// Subtracted from the issuer TTL when caching a credential.
    pub refresh_margin: Duration,

    /// Page size for list enumeration.
    pub list_page_size: usize,

    /// Hard cap on list pages fetched per name resolution.
    pub max_list_pages: usize,
}

impl SyncContextConfig {
    pub fn new(client_id: impl Into<String>, client_secret: SecretString) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            refresh_margin: Duration::seconds(60),
            list_page_size: 200,
            max_list_pages: 1000,
        }
    }

    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    pub fn with_list_page_size(mut self, page_size: usize) -> Self {
        self.list_page_size = page_size;
        self
    }

    pub fn with_max_list_pages(mut self, max_pages: usize) -> Self {
        self.max_list_pages = max_pages;
        self
    }
}

/// Owns the target client, the credential cache and the list-handle cache.
///
/// Shared as `Arc<SyncContext>` by the synchronizer, reconciler and handlers.
pub struct SyncContext {
    target: Arc<dyn TargetSystemClient>,
    credentials: Arc<CredentialManager>,
    lists: ListResolver,
}

impl SyncContext {
    pub fn new(target: Arc<dyn TargetSystemClient>, config: SyncContextConfig) -> Self {
        let credentials = Arc::new(CredentialManager::new(
            target.clone(),
            config.client_id,
            config.client_secret,
            config.refresh_margin,
        ));
        let lists = ListResolver::new(
            target.clone(),
            credentials.clone(),
            config.list_page_size,
            config.max_list_pages,
        );
        Self {
            target,
            credentials,
            lists,
        }
    }

    pub fn target(&self) -> &Arc<dyn TargetSystemClient> {
        &self.target
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    pub fn lists(&self) -> &ListResolver {
        &self.lists
    }
}
