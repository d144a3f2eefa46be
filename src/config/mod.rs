//! Application configuration module
//!
//! Configuration is read from environment variables with the
//! `TUTOR_SCHEDULER` prefix; nested values use `__` as the separator.
//! A `.env` file is loaded first when present.
//!
//! # Example
//!
//! ```no_run
//! use tutor_scheduler::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod scheduling;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use scheduling::SchedulingConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// - `TUTOR_SCHEDULER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TUTOR_SCHEDULER__DATABASE__URL=...` -> `database.url = ...`
    /// - `TUTOR_SCHEDULER__SCHEDULING__ALLOW_TUTOR_OVERRIDE=false`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// does not parse.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TUTOR_SCHEDULER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.scheduling.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
