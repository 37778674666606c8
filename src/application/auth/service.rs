//! Account registration, login, logout, and request authentication.
//!
//! Issued tokens are mirrored into the token cache for the token's own
//! lifetime so logout can revoke them before expiry. The cache is an
//! availability optimization, not the source of truth: when it cannot be
//! reached, a cryptographically valid token still admits the caller.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, ChatError, ValidationError};
use crate::domain::user::User;
use crate::ports::{StoreError, TokenCache, UserStore};

use super::jwt::JwtCodec;
use super::password::{generate_salt, hash_password, verify_password};

/// Minimum password length in characters.
pub const PASSWORD_MIN_CHARS: i32 = 8;

/// Maximum password length in characters.
pub const PASSWORD_MAX_CHARS: i32 = 72;

/// Command to register a new account.
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Command to log in with existing credentials.
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

/// A successfully opened session: the signed token plus its user.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Application service for account and session management.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenCache>,
    jwt: JwtCodec,
}

impl AuthService {
    /// Creates the service over its collaborating ports.
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<dyn TokenCache>, jwt: JwtCodec) -> Self {
        Self { users, tokens, jwt }
    }

    /// Registers a new account and opens a session for it.
    ///
    /// # Errors
    ///
    /// - `Validation` if the password length is out of range, the email is
    ///   already registered, or the entity fields are invalid
    /// - `Internal` on persistence failure
    pub async fn register(&self, cmd: RegisterCommand) -> Result<AuthSession, ChatError> {
        let password_chars = cmd.password.chars().count() as i32;
        if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&password_chars) {
            return Err(ValidationError::out_of_range(
                "password",
                PASSWORD_MIN_CHARS,
                PASSWORD_MAX_CHARS,
                password_chars,
            )
            .into());
        }

        if self.users.find_by_email(&cmd.email).await?.is_some() {
            return Err(ValidationError::invalid_format("email", "already registered").into());
        }

        let salt = generate_salt();
        let hash = hash_password(&cmd.password, &salt);
        let user = User::register(cmd.email, cmd.name, hash, salt)?;

        match self.users.create(&user).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration for the same email.
            Err(StoreError::Duplicate { .. }) => {
                return Err(
                    ValidationError::invalid_format("email", "already registered").into(),
                );
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %user.id(), "Registered new user");
        self.issue_session(user).await
    }

    /// Authenticates credentials and opens a session.
    ///
    /// Unknown email and wrong password return the same error so callers
    /// cannot probe for registered addresses.
    pub async fn login(&self, cmd: LoginCommand) -> Result<AuthSession, ChatError> {
        let user = self
            .users
            .find_by_email(&cmd.email)
            .await?
            .ok_or_else(|| ChatError::unauthorized("Invalid email or password"))?;

        if !verify_password(&cmd.password, user.password_salt(), user.password_hash()) {
            return Err(ChatError::unauthorized("Invalid email or password"));
        }

        self.issue_session(user).await
    }

    /// Revokes a token by removing its cache entry.
    ///
    /// Always succeeds from the caller's perspective; a cache failure is
    /// logged and the token ages out at its natural expiry instead.
    pub async fn logout(&self, token: &str) -> Result<(), ChatError> {
        if let Err(e) = self.tokens.remove(token).await {
            tracing::warn!(error = %e, "Failed to revoke token in cache");
        }
        Ok(())
    }

    /// Verifies a bearer token and resolves the caller's identity.
    ///
    /// A token must be cryptographically valid and still present in the
    /// cache. A missing entry means it was revoked; an unreachable cache
    /// admits on signature validity alone.
    pub async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, ChatError> {
        let claims = self.jwt.verify(token)?;

        match self.tokens.contains(token).await {
            Ok(true) => {}
            Ok(false) => return Err(ChatError::unauthorized("Token revoked")),
            Err(e) => {
                tracing::warn!(error = %e, "Token cache unavailable; admitting on JWT validity");
            }
        }

        Ok(AuthenticatedUser::new(claims.user_id()?, claims.email))
    }

    async fn issue_session(&self, user: User) -> Result<AuthSession, ChatError> {
        let token = self.jwt.issue(user.id(), user.email())?;

        if let Err(e) = self.tokens.store(&token, self.jwt.validity_secs()).await {
            tracing::warn!(error = %e, "Failed to cache issued token");
        }

        Ok(AuthSession { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use secrecy::Secret;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use crate::domain::foundation::UserId;
    use crate::ports::{token_key, CacheError};

    struct RecordingUserStore {
        users: Mutex<Vec<User>>,
    }

    impl RecordingUserStore {
        fn new() -> Self {
            Self {
                users: Mutex::new(Vec::new()),
            }
        }

        fn stored(&self) -> Vec<User> {
            self.users.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserStore for RecordingUserStore {
        async fn create(&self, user: &User) -> Result<(), StoreError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email() == user.email()) {
                return Err(StoreError::duplicate("User"));
            }
            users.push(user.clone());
            Ok(())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email() == email)
                .cloned())
        }

        async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id() == *id)
                .cloned())
        }
    }

    struct RecordingTokenCache {
        keys: Mutex<HashSet<String>>,
        fail: bool,
    }

    impl RecordingTokenCache {
        fn new() -> Self {
            Self {
                keys: Mutex::new(HashSet::new()),
                fail: false,
            }
        }

        fn unavailable() -> Self {
            Self {
                keys: Mutex::new(HashSet::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl TokenCache for RecordingTokenCache {
        async fn store(&self, token: &str, _ttl_secs: u64) -> Result<(), CacheError> {
            if self.fail {
                return Err(CacheError::unavailable("connection refused"));
            }
            self.keys.lock().unwrap().insert(token_key(token));
            Ok(())
        }

        async fn contains(&self, token: &str) -> Result<bool, CacheError> {
            if self.fail {
                return Err(CacheError::unavailable("connection refused"));
            }
            Ok(self.keys.lock().unwrap().contains(&token_key(token)))
        }

        async fn remove(&self, token: &str) -> Result<(), CacheError> {
            if self.fail {
                return Err(CacheError::unavailable("connection refused"));
            }
            self.keys.lock().unwrap().remove(&token_key(token));
            Ok(())
        }
    }

    fn service_with(store: Arc<RecordingUserStore>, cache: Arc<RecordingTokenCache>) -> AuthService {
        let jwt = JwtCodec::new(Secret::new("test-signing-secret".to_string()), 3600);
        AuthService::new(store, cache, jwt)
    }

    fn register_cmd() -> RegisterCommand {
        RegisterCommand {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            password: "correct horse".to_string(),
        }
    }

    mod register {
        use super::*;

        #[tokio::test]
        async fn creates_user_and_opens_session() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::new());
            let service = service_with(store.clone(), cache);

            let session = service.register(register_cmd()).await.unwrap();

            assert_eq!(session.user.email(), "ada@example.com");
            assert!(!session.token.is_empty());

            let stored = store.stored();
            assert_eq!(stored.len(), 1);
            assert_eq!(stored[0].name(), "Ada");
        }

        #[tokio::test]
        async fn stores_a_hash_never_the_password() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::new());
            let service = service_with(store.clone(), cache);

            service.register(register_cmd()).await.unwrap();

            let stored = store.stored();
            assert_ne!(stored[0].password_hash(), "correct horse");
            assert_eq!(stored[0].password_hash().len(), 64);
            assert!(!stored[0].password_salt().is_empty());
        }

        #[tokio::test]
        async fn rejects_a_short_password() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::new());
            let service = service_with(store.clone(), cache);

            let err = service
                .register(RegisterCommand {
                    password: "short".to_string(),
                    ..register_cmd()
                })
                .await
                .unwrap_err();

            assert_eq!(err.code(), "VALIDATION_ERROR");
            assert!(store.stored().is_empty());
        }

        #[tokio::test]
        async fn rejects_an_overlong_password() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::new());
            let service = service_with(store, cache);

            let err = service
                .register(RegisterCommand {
                    password: "x".repeat(73),
                    ..register_cmd()
                })
                .await
                .unwrap_err();

            assert_eq!(err.code(), "VALIDATION_ERROR");
        }

        #[tokio::test]
        async fn rejects_an_already_registered_email() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::new());
            let service = service_with(store.clone(), cache);

            service.register(register_cmd()).await.unwrap();
            let err = service.register(register_cmd()).await.unwrap_err();

            assert!(format!("{}", err).contains("already registered"));
            assert_eq!(store.stored().len(), 1);
        }

        #[tokio::test]
        async fn session_survives_a_token_cache_outage() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::unavailable());
            let service = service_with(store, cache);

            let session = service.register(register_cmd()).await.unwrap();
            assert!(!session.token.is_empty());
        }
    }

    mod login {
        use super::*;

        #[tokio::test]
        async fn accepts_correct_credentials() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::new());
            let service = service_with(store, cache);

            service.register(register_cmd()).await.unwrap();
            let session = service
                .login(LoginCommand {
                    email: "ada@example.com".to_string(),
                    password: "correct horse".to_string(),
                })
                .await
                .unwrap();

            assert_eq!(session.user.email(), "ada@example.com");
        }

        #[tokio::test]
        async fn rejects_a_wrong_password() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::new());
            let service = service_with(store, cache);

            service.register(register_cmd()).await.unwrap();
            let err = service
                .login(LoginCommand {
                    email: "ada@example.com".to_string(),
                    password: "battery staple".to_string(),
                })
                .await
                .unwrap_err();

            assert_eq!(format!("{}", err), "Unauthorized: Invalid email or password");
        }

        #[tokio::test]
        async fn unknown_email_is_indistinguishable_from_wrong_password() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::new());
            let service = service_with(store, cache);

            let err = service
                .login(LoginCommand {
                    email: "nobody@example.com".to_string(),
                    password: "whatever!".to_string(),
                })
                .await
                .unwrap_err();

            assert_eq!(format!("{}", err), "Unauthorized: Invalid email or password");
        }
    }

    mod verification {
        use super::*;

        #[tokio::test]
        async fn issued_token_verifies_to_the_registered_identity() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::new());
            let service = service_with(store, cache);

            let session = service.register(register_cmd()).await.unwrap();
            let caller = service.verify_token(&session.token).await.unwrap();

            assert_eq!(caller.id, session.user.id());
            assert_eq!(caller.email, "ada@example.com");
        }

        #[tokio::test]
        async fn logout_revokes_the_token() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::new());
            let service = service_with(store, cache);

            let session = service.register(register_cmd()).await.unwrap();
            service.logout(&session.token).await.unwrap();

            let err = service.verify_token(&session.token).await.unwrap_err();
            assert_eq!(format!("{}", err), "Unauthorized: Token revoked");
        }

        #[tokio::test]
        async fn cache_outage_admits_a_valid_token() {
            let store = Arc::new(RecordingUserStore::new());
            let available = Arc::new(RecordingTokenCache::new());
            let service = service_with(store.clone(), available);

            let session = service.register(register_cmd()).await.unwrap();

            // Same signing secret, cache now unreachable.
            let degraded = service_with(store, Arc::new(RecordingTokenCache::unavailable()));
            let caller = degraded.verify_token(&session.token).await.unwrap();

            assert_eq!(caller.email, "ada@example.com");
        }

        #[tokio::test]
        async fn logout_tolerates_a_cache_outage() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::unavailable());
            let service = service_with(store, cache);

            assert!(service.logout("some-token").await.is_ok());
        }

        #[tokio::test]
        async fn forged_token_is_rejected() {
            let store = Arc::new(RecordingUserStore::new());
            let cache = Arc::new(RecordingTokenCache::new());
            let service = service_with(store, cache);

            let err = service.verify_token("forged.token.here").await.unwrap_err();
            assert_eq!(err.code(), "UNAUTHORIZED");
        }
    }
}
