//! Application configuration module.
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `TUTORIA` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use tutoria_webhooks::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Listening on {}", config.server.socket_addr());
//! ```

mod database;
mod error;
mod identity;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use identity::IdentityConfig;
pub use payment::PaymentConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration.
///
/// Load using [`AppConfig::load()`] which reads from environment variables,
/// then call [`AppConfig::validate()`] before serving. Missing required
/// configuration fails at startup, never per request.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, request deadline)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payment provider configuration (API key, webhook signing secret)
    pub payment: PaymentConfig,

    /// Identity provider configuration (admin users API)
    pub identity: IdentityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variable Format
    ///
    /// - `TUTORIA__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TUTORIA__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// A `.env` file is loaded first if present (development).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TUTORIA")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        self.identity.validate()?;
        Ok(())
    }
}
