//! Marketo (target system) configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::sync::ListRef;

/// Credentials, list reference and text-token settings for Marketo
#[derive(Debug, Clone, Deserialize)]
pub struct MarketoConfig {
    /// Instance base URL, e.g. `https://123-ABC-456.mktorest.com`
    pub base_url: String,

    pub client_id: String,

    pub client_secret: SecretString,

    /// Static list ID (all digits) or list name
    pub list: String,

    /// Seconds subtracted from the reported token TTL
    #[serde(default = "default_refresh_margin")]
    pub token_refresh_margin_secs: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Program owning the release-notes text token; publishing is skipped when unset
    #[serde(default)]
    pub program_id: Option<u64>,

    #[serde(default = "default_text_token_name")]
    pub text_token_name: String,
}

impl MarketoConfig {
    /// Parses the configured list into a [`ListRef`].
    pub fn list_ref(&self) -> Result<ListRef, ValidationError> {
        self.list
            .parse::<ListRef>()
            .map_err(|e| ValidationError::InvalidListRef(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("MARKETO__BASE_URL"));
        }
        if !is_http_url(&self.base_url) {
            return Err(ValidationError::InvalidBaseUrl("MARKETO__BASE_URL"));
        }
        if self.client_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("MARKETO__CLIENT_ID"));
        }
        if self.client_secret.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("MARKETO__CLIENT_SECRET"));
        }
        self.list_ref()?;
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.text_token_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("MARKETO__TEXT_TOKEN_NAME"));
        }
        Ok(())
    }
}

pub(super) fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    ["https://", "http://"]
        .iter()
        .any(|scheme| url.len() > scheme.len() && url.starts_with(scheme))
}

fn default_refresh_margin() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    30
}

fn default_text_token_name() -> String {
    "my.Release-Notes".to_string()
}
