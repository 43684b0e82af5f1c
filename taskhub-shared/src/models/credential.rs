/// User credential model
///
/// Holds the Argon2 password hash for a user, 1:1 with [`User`](super::user::User).
/// Never serialized to clients.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Stored credential (password hash) for a user
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Credential {
    pub id: Uuid,
    pub password_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Creates the credential row for a user
    pub async fn create<'e, E>(
        executor: E,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO user_credentials (password_hash, user_id)
            VALUES ($1, $2)
            RETURNING id, password_hash, user_id, created_at
            "#,
        )
        .bind(password_hash)
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, password_hash, user_id, created_at
            FROM user_credentials
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_by_user_id<'e, E>(
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, password_hash, user_id, created_at
            FROM user_credentials
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }
}
