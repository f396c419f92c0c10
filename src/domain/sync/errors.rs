//! Sync error taxonomy.

use thiserror::Error;

use super::MutationOutcome;
use crate::domain::foundation::ErrorCode;

/// No usable credential could be obtained from the issuer.
///
/// Fatal for the calling operation: escalated to the caller, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Authentication with target system failed: {payload}")]
pub struct AuthFailure {
    /// Raw issuer error payload.
    pub payload: String,
}

impl AuthFailure {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

/// Failures produced while talking to either external system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Auth(#[from] AuthFailure),

    #[error("Credential still rejected after refresh: {detail}")]
    CredentialExpired { detail: String },

    #[error("Target list not found: {detail}")]
    ListNotFound { detail: String },

    #[error("Target system error: {detail}")]
    Transport { detail: String },

    #[error("Source system error: {detail}")]
    Source { detail: String },
}

impl SyncError {
    pub fn credential_expired(detail: impl Into<String>) -> Self {
        SyncError::CredentialExpired {
            detail: detail.into(),
        }
    }

    pub fn list_not_found(detail: impl Into<String>) -> Self {
        SyncError::ListNotFound {
            detail: detail.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        SyncError::Transport {
            detail: detail.into(),
        }
    }

    pub fn source(detail: impl Into<String>) -> Self {
        SyncError::Source {
            detail: detail.into(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SyncError::Auth(_) => ErrorCode::AuthFailure,
            SyncError::CredentialExpired { .. } => ErrorCode::CredentialExpired,
            SyncError::ListNotFound { .. } => ErrorCode::ListNotFound,
            SyncError::Transport { .. } => ErrorCode::TargetSystemError,
            SyncError::Source { .. } => ErrorCode::SourceSystemError,
        }
    }

    /// Converts into a per-operation outcome.
    ///
    /// `AuthFailure` has no outcome form; it is handed back for escalation.
    pub fn into_outcome(self) -> Result<MutationOutcome, AuthFailure> {
        match self {
            SyncError::Auth(failure) => Err(failure),
            SyncError::CredentialExpired { detail } => {
                Ok(MutationOutcome::CredentialExpired { detail })
            }
            SyncError::ListNotFound { detail } => Ok(MutationOutcome::ListNotFound { detail }),
            SyncError::Transport { detail } | SyncError::Source { detail } => {
                Ok(MutationOutcome::TransportError { detail })
            }
        }
    }
}
