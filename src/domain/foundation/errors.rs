//! Error vocabulary shared across the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Stable, machine-readable error codes surfaced over HTTP and in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    UnknownEventType,

    // Synchronization errors
    AuthFailure,
    CredentialExpired,
    ListNotFound,
    TargetSystemError,
    SourceSystemError,
    IdentityRejected,

    // Access errors
    Unauthorized,

    // Infrastructure errors
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::UnknownEventType => "UNKNOWN_EVENT_TYPE",
            ErrorCode::AuthFailure => "AUTH_FAILURE",
            ErrorCode::CredentialExpired => "CREDENTIAL_EXPIRED",
            ErrorCode::ListNotFound => "LIST_NOT_FOUND",
            ErrorCode::TargetSystemError => "TARGET_SYSTEM_ERROR",
            ErrorCode::SourceSystemError => "SOURCE_SYSTEM_ERROR",
            ErrorCode::IdentityRejected => "IDENTITY_REJECTED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}
