//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid server host or port: {0}")]
    InvalidSocketAddr(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Webhook acknowledgement budget must be positive and shorter than the request timeout")]
    InvalidAckBudget,

    #[error("{0} must be an http(s) URL")]
    InvalidBaseUrl(&'static str),

    #[error("Invalid list reference: {0}")]
    InvalidListRef(String),

    #[error("{0} must be between 1 and {1}")]
    OutOfRange(&'static str, usize),
}
