//! Target system port for static-list membership management.
//!
//! Defines the contract for the marketing-automation system whose static
//! lists mirror the subscriber base (e.g., Marketo). Implementations perform
//! the raw HTTP calls; credential caching, retry on expiry and list
//! resolution live in the application layer.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::subscriber::SubscriberIdentity;
use crate::domain::sync::{AccessToken, FailureClass, MembershipAction, StaticList};

/// Provider error codes meaning the presented token is no longer accepted.
const TOKEN_INVALID: &str = "601";
const TOKEN_EXPIRED: &str = "602";

/// Provider error code for a missing asset (list, program).
const OBJECT_NOT_FOUND: &str = "1013";

/// Port for target-system integrations.
///
/// Every call except `exchange_credential` presents a bearer token obtained
/// from a prior exchange.
#[async_trait]
pub trait TargetSystemClient: Send + Sync {
    /// Exchange client credentials for a short-lived access token.
    async fn exchange_credential(
        &self,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<IssuedToken, TargetError>;

    /// Fetch one page of static lists.
    ///
    /// `has_more` is true when the page was full.
    async fn list_page(
        &self,
        token: &AccessToken,
        offset: usize,
        limit: usize,
    ) -> Result<ListPage, TargetError>;

    /// Look up a single static list by numeric ID.
    async fn find_list(
        &self,
        token: &AccessToken,
        list_id: u64,
    ) -> Result<Option<StaticList>, TargetError>;

    /// Add or remove identities from a static list.
    ///
    /// Returns one result per identity the provider reported on. A request
    /// level failure (auth, network, unknown list) is an `Err`.
    async fn mutate_membership(
        &self,
        token: &AccessToken,
        list_id: u64,
        action: MembershipAction,
        identities: &[SubscriberIdentity],
    ) -> Result<Vec<MembershipResult>, TargetError>;

    /// Set a text-type program token.
    async fn update_text_token(
        &self,
        token: &AccessToken,
        update: &TextTokenUpdate,
    ) -> Result<(), TargetError>;
}

/// Token issued by a credential exchange.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: AccessToken,

    /// Issuer-reported lifetime in seconds.
    pub expires_in_secs: i64,
}

/// One page of static lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub items: Vec<StaticList>,
    pub has_more: bool,
}

/// Per-identity membership result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipResult {
    pub email: String,
    pub status: MemberStatus,

    /// Provider reasons attached to a skipped record.
    pub reasons: Vec<ProviderError>,
}

impl MembershipResult {
    pub fn new(email: impl Into<String>, status: MemberStatus) -> Self {
        Self {
            email: email.into(),
            status,
            reasons: Vec::new(),
        }
    }

    pub fn skipped(email: impl Into<String>, reasons: Vec<ProviderError>) -> Self {
        Self {
            email: email.into(),
            status: MemberStatus::Skipped,
            reasons,
        }
    }
}

/// Membership status reported for one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Now a member (including already-a-member).
    Added,

    /// No longer a member.
    Removed,

    /// Was not a member to begin with.
    NotMember,

    /// Provider refused the record; see `reasons`.
    Skipped,
}

/// Text token to write on a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTokenUpdate {
    pub program_id: u64,
    pub name: String,
    pub value: String,
}

/// One error entry from a provider response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn class(&self) -> FailureClass {
        match self.code.as_str() {
            TOKEN_INVALID | TOKEN_EXPIRED => FailureClass::CredentialExpired,
            OBJECT_NOT_FOUND => FailureClass::ListNotFound,
            _ => FailureClass::Other,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Errors from target-system calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// Credential exchange refused; carries the raw issuer payload.
    #[error("credential exchange rejected: {payload}")]
    CredentialRejected { payload: String },

    /// Response envelope reported `success: false`.
    #[error("provider error: {}", join(.errors))]
    Provider { errors: Vec<ProviderError> },

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl TargetError {
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        TargetError::Provider {
            errors: vec![ProviderError::new(code, message)],
        }
    }

    /// Classifies the failure for retry and reporting decisions.
    pub fn class(&self) -> FailureClass {
        match self {
            TargetError::Http { status: 401, .. } => FailureClass::CredentialExpired,
            TargetError::Provider { errors } => {
                let classes: Vec<_> = errors.iter().map(ProviderError::class).collect();
                if classes.contains(&FailureClass::CredentialExpired) {
                    FailureClass::CredentialExpired
                } else if classes.contains(&FailureClass::ListNotFound) {
                    FailureClass::ListNotFound
                } else {
                    FailureClass::Other
                }
            }
            _ => FailureClass::Other,
        }
    }
}

impl FailureClass {
    /// Classifies a target-system error.
    pub fn of(err: &TargetError) -> Self {
        err.class()
    }
}

fn join(errors: &[ProviderError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
