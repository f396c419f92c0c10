//! Noticeable (source system) configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::marketo::is_http_url;
use crate::adapters::noticeable::DEFAULT_GRAPHQL_ENDPOINT;

/// Noticeable GraphQL API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NoticeableConfig {
    pub api_key: SecretString,

    pub project_id: String,

    #[serde(default = "default_graphql_endpoint")]
    pub graphql_endpoint: String,

    /// Subscriptions requested per GraphQL page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl NoticeableConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("NOTICEABLE__API_KEY"));
        }
        if self.project_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("NOTICEABLE__PROJECT_ID"));
        }
        if !is_http_url(&self.graphql_endpoint) {
            return Err(ValidationError::InvalidBaseUrl("NOTICEABLE__GRAPHQL_ENDPOINT"));
        }
        if self.page_size == 0 || self.page_size > 100 {
            return Err(ValidationError::OutOfRange("NOTICEABLE__PAGE_SIZE", 100));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_graphql_endpoint() -> String {
    DEFAULT_GRAPHQL_ENDPOINT.to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_request_timeout() -> u64 {
    30
}
