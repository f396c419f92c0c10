//! Marketo REST wire types.
//!
//! Request and response bodies as the Marketo REST and Asset APIs send them.
//! Only the fields the adapter reads are modelled.

use serde::{Deserialize, Serialize};

use crate::ports::{ProviderError, TargetError};

// ════════════════════════════════════════════════════════════════════════════════
// Identity
// ════════════════════════════════════════════════════════════════════════════════

/// `GET /identity/oauth/token` response, success or error.
///
/// Error details stay in the raw payload carried by `CredentialRejected`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub expires_in: Option<i64>,

    #[serde(default)]
    pub error: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response Envelope
// ════════════════════════════════════════════════════════════════════════════════

/// Error code as sent by Marketo: usually a string, occasionally a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireCode {
    Text(String),
    Number(i64),
}

impl WireCode {
    fn into_string(self) -> String {
        match self {
            WireCode::Text(code) => code,
            WireCode::Number(code) => code.to_string(),
        }
    }
}

/// One `errors[]` / `reasons[]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    pub code: WireCode,

    #[serde(default)]
    pub message: String,
}

impl From<WireError> for ProviderError {
    fn from(err: WireError) -> Self {
        ProviderError::new(err.code.into_string(), err.message)
    }
}

/// Standard `{requestId, success, errors, result, warnings}` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(default)]
    pub request_id: Option<String>,

    pub success: bool,

    #[serde(default)]
    pub errors: Vec<WireError>,

    #[serde(default = "Vec::new")]
    pub result: Vec<T>,

    #[serde(default)]
    pub warnings: Vec<serde_json::Value>,
}

impl<T> Envelope<T> {
    /// Returns `result`, or the envelope errors when `success` is false.
    pub fn into_result(self) -> Result<Vec<T>, TargetError> {
        if self.success {
            Ok(self.result)
        } else {
            Err(TargetError::Provider {
                errors: self.errors.into_iter().map(ProviderError::from).collect(),
            })
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Records
// ════════════════════════════════════════════════════════════════════════════════

/// Static list asset.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticListRecord {
    pub id: u64,
    pub name: String,
}

/// Lead record from lead and list-membership endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadRecord {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub email: Option<String>,

    /// `created`, `updated`, `added`, `removed`, `skipped`, ...
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub reasons: Vec<WireError>,
}

impl LeadRecord {
    pub fn is_skipped(&self) -> bool {
        self.status.as_deref() == Some("skipped")
    }

    pub fn reasons(&self) -> Vec<ProviderError> {
        self.reasons.iter().cloned().map(ProviderError::from).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// `POST /rest/v1/leads.json` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertLeadsRequest {
    pub action: &'static str,
    pub lookup_field: &'static str,
    pub input: Vec<LeadInput>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadInput {
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// `POST /rest/v1/lists/{id}/leads.json` body.
#[derive(Debug, Clone, Serialize)]
pub struct ListMembershipRequest {
    pub input: Vec<LeadId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadId {
    pub id: u64,
}
