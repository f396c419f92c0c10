//! Reconciliation tuning

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Paging, batching and admin settings for list resolution and bulk runs
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_list_page_size")]
    pub list_page_size: usize,

    #[serde(default = "default_max_list_pages")]
    pub max_list_pages: usize,

    /// Identities per membership request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Batches in flight at once during a full sync
    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,

    /// Bearer token guarding `POST /sync/full`; the route is not mounted when unset
    #[serde(default)]
    pub admin_token: Option<SecretString>,
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.list_page_size == 0 || self.list_page_size > 200 {
            return Err(ValidationError::OutOfRange("SYNC__LIST_PAGE_SIZE", 200));
        }
        if self.max_list_pages == 0 {
            return Err(ValidationError::OutOfRange("SYNC__MAX_LIST_PAGES", usize::MAX));
        }
        if self.batch_size == 0 || self.batch_size > 300 {
            return Err(ValidationError::OutOfRange("SYNC__BATCH_SIZE", 300));
        }
        if self.bulk_concurrency == 0 || self.bulk_concurrency > 16 {
            return Err(ValidationError::OutOfRange("SYNC__BULK_CONCURRENCY", 16));
        }
        if let Some(token) = &self.admin_token {
            if token.expose_secret().trim().is_empty() {
                return Err(ValidationError::MissingRequired("SYNC__ADMIN_TOKEN"));
            }
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            list_page_size: default_list_page_size(),
            max_list_pages: default_max_list_pages(),
            batch_size: default_batch_size(),
            bulk_concurrency: default_bulk_concurrency(),
            admin_token: None,
        }
    }
}

fn default_list_page_size() -> usize {
    200
}

fn default_max_list_pages() -> usize {
    1000
}

fn default_batch_size() -> usize {
    300
}

fn default_bulk_concurrency() -> usize {
    1
}
