//! Failure modes of loading and validating configuration

use thiserror::Error;

/// Why configuration could not be produced at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A semantic check a loaded value failed
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Listen port must be non-zero")]
    InvalidPort,

    #[error("Request timeout out of range")]
    InvalidTimeout,

    #[error("Database URL must use a postgres scheme")]
    InvalidDatabaseUrl,

    #[error("Redis URL must use a redis scheme")]
    InvalidRedisUrl,

    #[error("Database pool size out of range")]
    PoolSizeTooLarge,

    #[error("Upstream base URL must be HTTP(S)")]
    InvalidUpstreamUrl,

    #[error("JWT secret must be at least 32 characters outside development")]
    JwtSecretTooShort,

    #[error("Rate limit must allow at least one request per window")]
    InvalidRateLimit,

    #[error("Rate limit window must be at least one second")]
    InvalidRateLimitWindow,

    #[error("Token validity must be at least 60 seconds")]
    InvalidTokenValidity,
}
