//! Password hashing with salted HMAC-SHA256.
//!
//! Each user gets a random salt generated at registration. The salt keys
//! the HMAC so identical passwords produce distinct digests across users.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Generates a fresh random salt for a new credential.
pub fn generate_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Derives the hex-encoded digest for a password under the given salt.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(password.as_bytes());
    format!("{:x}", mac.finalize().into_bytes())
}

/// Checks a candidate password against a stored digest in constant time.
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    let computed = hash_password(password, salt);
    computed.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}
