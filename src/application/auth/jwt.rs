//! Session token issuance and verification (HS256).

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChatError, Timestamp, UserId};

/// Claims carried inside a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User identifier (subject).
    pub sub: String,

    /// Email at issuance time.
    pub email: String,

    /// Expiry as Unix seconds.
    pub exp: i64,

    /// Issued-at as Unix seconds.
    pub iat: i64,
}

impl Claims {
    /// Parses the subject back into a typed user id.
    pub fn user_id(&self) -> Result<UserId, ChatError> {
        self.sub
            .parse()
            .map_err(|_| ChatError::unauthorized("Invalid token subject"))
    }
}

/// Signs and validates session tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtCodec {
    secret: Secret<String>,
    validity_secs: u64,
}

impl JwtCodec {
    /// Creates a codec with the given signing secret and token lifetime.
    pub fn new(secret: Secret<String>, validity_secs: u64) -> Self {
        Self {
            secret,
            validity_secs,
        }
    }

    /// Token lifetime in seconds, also used as the revocation-cache TTL.
    pub fn validity_secs(&self) -> u64 {
        self.validity_secs
    }

    /// Issues a signed token for the given user.
    pub fn issue(&self, user_id: UserId, email: &str) -> Result<String, ChatError> {
        let now = Timestamp::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: now.plus_secs(self.validity_secs).as_unix_secs() as i64,
            iat: now.as_unix_secs() as i64,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| ChatError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Validates signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, ChatError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());

        match decode::<Claims>(token, &key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(
                e.kind(),
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
            ) =>
            {
                tracing::debug!("Token validation failed: expired signature");
                Err(ChatError::unauthorized("Token expired"))
            }
            Err(e) => {
                tracing::debug!(error = %e, "Token validation failed");
                Err(ChatError::unauthorized("Invalid token"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> JwtCodec {
        JwtCodec::new(Secret::new("test-secret-key".to_string()), 3600)
    }

    #[test]
    fn issued_token_verifies_and_roundtrips_claims() {
        let codec = codec();
        let user_id = UserId::new();

        let token = codec.issue(user_id, "ada@example.com").unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_different_secret_is_rejected() {
        let issuer = JwtCodec::new(Secret::new("secret-one".to_string()), 3600);
        let verifier = JwtCodec::new(Secret::new("secret-two".to_string()), 3600);

        let token = issuer.issue(UserId::new(), "ada@example.com").unwrap();
        let err = verifier.verify(&token).unwrap_err();

        assert!(matches!(err, ChatError::Unauthorized { .. }));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let now = Timestamp::now();
        // Past the default 60s leeway.
        let claims = Claims {
            sub: UserId::new().to_string(),
            email: "ada@example.com".to_string(),
            exp: now.minus_secs(120).as_unix_secs() as i64,
            iat: now.minus_secs(3600).as_unix_secs() as i64,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        let err = codec.verify(&token).unwrap_err();
        assert_eq!(format!("{}", err), "Unauthorized: Token expired");
    }

    #[test]
    fn garbage_token_is_rejected() {
        let err = codec().verify("not-a-token").unwrap_err();
        assert_eq!(format!("{}", err), "Unauthorized: Invalid token");
    }

    #[test]
    fn claims_with_malformed_subject_fail_user_id_parse() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            email: "ada@example.com".to_string(),
            exp: 2_000_000_000,
            iat: 1_000_000_000,
        };
        assert!(claims.user_id().is_err());
    }
}
