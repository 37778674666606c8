//! User store port.

use crate::domain::foundation::UserId;
use crate::domain::user::User;
use async_trait::async_trait;

use super::conversation_store::StoreError;

/// Repository port for registered users.
///
/// Implementations must enforce email uniqueness.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Save a new user.
    ///
    /// # Errors
    ///
    /// - `Duplicate` if the email is already registered
    /// - `Database` on persistence failure
    async fn create(&self, user: &User) -> Result<(), StoreError>;

    /// Find a user by email.
    ///
    /// Returns `None` if no user has that email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Find a user by ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn user_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn UserStore) {}
    }
}
