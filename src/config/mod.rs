//! Typed configuration loaded from the environment.
//!
//! Settings arrive as `APP`-prefixed environment variables, with `__`
//! separating the section from the key (`APP__SERVER__PORT=8080` lands in
//! `server.port`). A `.env` file is honoured in development. Loading
//! deserializes into the section structs below; [`AppConfig::validate`]
//! then applies the semantic checks deserialization cannot express.
//!
//! ```no_run
//! use chat_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod logging;
mod rate_limit;
mod redis;
mod server;
mod upstream;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use rate_limit::RateLimitConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use upstream::UpstreamConfig;

use serde::Deserialize;

/// Every setting the service reads, grouped by section.
///
/// Sections with sensible defaults deserialize even when absent; the rest
/// (database, redis, upstream, auth) carry required values and fail the
/// load if missing.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bind address, port, and runtime environment.
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL pool settings.
    pub database: DatabaseConfig,

    /// Redis connection for the rate limiter and token cache.
    pub redis: RedisConfig,

    /// Completion API endpoint and credentials.
    pub upstream: UpstreamConfig,

    /// JWT signing secret and token lifetime.
    pub auth: AuthConfig,

    /// Chat admission limits.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Log filtering and output format.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// A `.env` file in the working directory is merged in first when
    /// present. Fails when a required value is absent or a value does not
    /// parse into its field's type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Runs every section's semantic checks.
    ///
    /// Covers what types alone cannot: URL schemes, port and pool bounds,
    /// and the stricter secret rules outside development.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.upstream.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.rate_limit.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// True when running in the production environment.
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Process environment is global state; serialize the tests that touch it.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const REQUIRED: &[(&str, &str)] = &[
        ("APP__DATABASE__URL", "postgresql://cfg@localhost/cfg_test"),
        ("APP__REDIS__URL", "redis://localhost:6379"),
        ("APP__UPSTREAM__API_KEY", "sk-or-cfg-test"),
        ("APP__AUTH__JWT_SECRET", "cfg-test-signing-secret"),
    ];

    /// Loads a config under the required variables plus `extra`, restoring
    /// the environment before returning.
    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_LOCK.lock().unwrap();
        for (key, value) in REQUIRED.iter().chain(extra) {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        for (key, _) in REQUIRED.iter().chain(extra) {
            env::remove_var(key);
        }
        result
    }

    #[test]
    fn test_load_reads_prefixed_sections() {
        let config = load_with(&[]).expect("minimal environment should load");
        assert_eq!(config.database.url(), "postgresql://cfg@localhost/cfg_test");
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert_eq!(config.upstream.api_key(), "sk-or-cfg-test");
    }

    #[test]
    fn test_loaded_config_passes_validation() {
        let config = load_with(&[]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaulted_sections_need_no_variables() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.rate_limit.limit, 10);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert!(config.rate_limit.fail_open);
    }

    #[test]
    fn test_nested_overrides_reach_their_section() {
        let config = load_with(&[
            ("APP__SERVER__PORT", "3000"),
            ("APP__RATE_LIMIT__LIMIT", "25"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.rate_limit.limit, 25);
    }

    #[test]
    fn test_environment_variable_flips_production() {
        let config = load_with(&[("APP__SERVER__ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
    }
}
