//! Rate limiting configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Rate limiting configuration
///
/// Chat requests are limited per user over a sliding window. When the
/// limiter backend is unreachable, `fail_open` decides whether requests
/// pass (availability first) or are rejected (protection first).
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    #[serde(default = "default_limit")]
    pub limit: u64,

    /// Window length in seconds
    #[serde(default = "default_window")]
    pub window_secs: u64,

    /// Admit requests when the limiter backend is unavailable
    #[serde(default = "default_fail_open")]
    pub fail_open: bool,
}

impl RateLimitConfig {
    /// Validate rate limit configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.limit == 0 {
            return Err(ValidationError::InvalidRateLimit);
        }
        if self.window_secs == 0 {
            return Err(ValidationError::InvalidRateLimitWindow);
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window_secs: default_window(),
            fail_open: default_fail_open(),
        }
    }
}

fn default_limit() -> u64 {
    10
}

fn default_window() -> u64 {
    60
}

fn default_fail_open() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.limit, 10);
        assert_eq!(config.window_secs, 60);
        assert!(config.fail_open);
    }

    #[test]
    fn test_validation_zero_limit() {
        let config = RateLimitConfig {
            limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_window() {
        let config = RateLimitConfig {
            window_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        let config = RateLimitConfig {
            limit: 100,
            window_secs: 300,
            fail_open: false,
        };
        assert!(config.validate().is_ok());
    }
}
