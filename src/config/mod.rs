//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the `config`
//! and `dotenvy` crates. Variables carry the `SUBSCRIBER_SYNC` prefix and nested
//! values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use subscriber_sync::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Receiver listening on {:?}", config.server.socket_addr());
//! ```

mod error;
mod marketo;
mod noticeable;
mod server;
mod sync;

pub use error::{ConfigError, ValidationError};
pub use marketo::MarketoConfig;
pub use noticeable::NoticeableConfig;
pub use server::{Environment, ServerConfig};
pub use sync::SyncConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`], then call [`AppConfig::validate()`] before
/// wiring any adapters.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP receiver (host, port, environment, log filter)
    #[serde(default)]
    pub server: ServerConfig,

    /// Target system credentials and list reference
    pub marketo: MarketoConfig,

    /// Source system API access
    pub noticeable: NoticeableConfig,

    /// Paging and batching for list resolution and full syncs
    #[serde(default)]
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads every `SUBSCRIBER_SYNC__*` variable,
    /// using `__` to descend into sections:
    ///
    /// - `SUBSCRIBER_SYNC__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SUBSCRIBER_SYNC__MARKETO__CLIENT_ID=...` -> `marketo.client_id = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// cannot be parsed into its field type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUBSCRIBER_SYNC")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for missing credentials, non-HTTP(S) base
    /// URLs, an empty list reference or out-of-range tuning values.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.marketo.validate()?;
        self.noticeable.validate()?;
        self.sync.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
