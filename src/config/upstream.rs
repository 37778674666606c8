//! Upstream completion API configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upstream completion API configuration (OpenRouter)
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// API key for the completion provider
    api_key: Secret<String>,

    /// Base URL of the completion API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used when a request names none
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Attribution referer header value
    pub referer: Option<String>,

    /// Attribution title header value
    pub title: Option<String>,

    /// Timeout for non-streaming requests in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    /// Get the API key
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate upstream configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key().is_empty() {
            return Err(ValidationError::MissingRequired("UPSTREAM_API_KEY"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidUpstreamUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: Secret::new(String::new()),
            base_url: default_base_url(),
            default_model: default_model(),
            referer: None,
            title: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "meta-llama/llama-3.2-3b-instruct:free".to_string()
}

fn default_timeout() -> u64 {
    60
}
