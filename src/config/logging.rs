//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter directive (same syntax as `RUST_LOG`)
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON-formatted log lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.filter.is_empty() {
            return Err(ValidationError::MissingRequired("LOGGING_FILTER"));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

fn default_filter() -> String {
    "info,chat_relay=debug,sqlx=warn".to_string()
}
