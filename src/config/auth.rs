//! JWT signing and token lifetime configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum JWT secret length enforced outside development.
const MIN_SECRET_CHARS_PRODUCTION: usize = 32;

/// Authentication configuration (JWT signing and token lifetime)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing JWTs
    jwt_secret: Secret<String>,

    /// Token validity in seconds
    #[serde(default = "default_token_validity")]
    pub token_validity_secs: u64,
}

impl AuthConfig {
    /// Get the JWT signing secret
    pub fn jwt_secret(&self) -> Secret<String> {
        self.jwt_secret.clone()
    }

    /// Get token validity as Duration
    pub fn token_validity(&self) -> Duration {
        Duration::from_secs(self.token_validity_secs)
    }

    /// Checks the signing secret against the runtime environment.
    ///
    /// Production and staging require at least 32 characters; development
    /// accepts any non-empty secret.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH_JWT_SECRET"));
        }
        if *environment != Environment::Development
            && secret.chars().count() < MIN_SECRET_CHARS_PRODUCTION
        {
            return Err(ValidationError::JwtSecretTooShort);
        }
        if self.token_validity_secs < 60 {
            return Err(ValidationError::InvalidTokenValidity);
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Secret::new(String::new()),
            token_validity_secs: default_token_validity(),
        }
    }
}

fn default_token_validity() -> u64 {
    86_400
}
