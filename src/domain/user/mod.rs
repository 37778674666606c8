//! User module - registered accounts and stored credentials.

use crate::domain::foundation::{Timestamp, UserId, ValidationError};
use serde::{Deserialize, Serialize};

/// A registered user.
///
/// Credentials are stored as an opaque hash plus the salt it was derived
/// with; hashing itself is an application concern.
///
/// # Invariants
///
/// - `email` is unique across all users (enforced by the store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    name: String,
    password_hash: String,
    password_salt: String,
    created_at: Timestamp,
}

impl User {
    /// Creates a new user with pre-hashed credentials.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the email has no `@`
    /// - `EmptyField` if the name is empty
    pub fn register(
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
        password_salt: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let email = email.into();
        if !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing @ symbol"));
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        Ok(Self {
            id: UserId::new(),
            email,
            name,
            password_hash: password_hash.into(),
            password_salt: password_salt.into(),
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitutes a user from persistence.
    pub fn reconstitute(
        id: UserId,
        email: String,
        name: String,
        password_hash: String,
        password_salt: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            email,
            name,
            password_hash,
            password_salt,
            created_at,
        }
    }

    // === Accessors ===

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn password_salt(&self) -> &str {
        &self.password_salt
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
