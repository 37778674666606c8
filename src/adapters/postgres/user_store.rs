//! PostgreSQL implementation of UserStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::user::User;
use crate::ports::{StoreError, UserStore};

/// PostgreSQL implementation of UserStore.
///
/// Email uniqueness is enforced by the `users_email_key` constraint;
/// violations surface as `StoreError::Duplicate`.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Creates a new PgUserStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, password_salt, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email())
        .bind(user.name())
        .bind(user.password_hash())
        .bind(user.password_salt())
        .bind(user.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                StoreError::duplicate("User")
            }
            _ => StoreError::database(format!("Failed to insert user: {}", e)),
        })?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, password_hash, password_salt, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to fetch user by email: {}", e)))?;

        Ok(row.map(row_to_user))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, password_hash, password_salt, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to fetch user by id: {}", e)))?;

        Ok(row.map(row_to_user))
    }
}

// === Helper Functions ===

fn row_to_user(row: sqlx::postgres::PgRow) -> User {
    let id: uuid::Uuid = row.get("id");
    let email: String = row.get("email");
    let name: String = row.get("name");
    let password_hash: String = row.get("password_hash");
    let password_salt: String = row.get("password_salt");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

    User::reconstitute(
        UserId::from_uuid(id),
        email,
        name,
        password_hash,
        password_salt,
        Timestamp::from_datetime(created_at),
    )
}
