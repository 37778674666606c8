//! Authenticated caller identity.

use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// The verified identity attached to a request after token validation.
///
/// Carries only what the session token itself asserts; fuller profile data
/// lives on the `User` entity and is loaded on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// The unique user identifier from the token subject.
    pub id: UserId,

    /// Email address asserted by the token claims.
    pub email: String,
}

impl AuthenticatedUser {
    /// Pairs an id with the email its token asserted.
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_id_and_email() {
        let id = UserId::new();
        let user = AuthenticatedUser::new(id, "ada@example.com");
        assert_eq!(user.id, id);
        assert_eq!(user.email, "ada@example.com");
    }
}
