/// Auth token model and database operations
///
/// Each user owns at most one token. Authentication reuses the existing
/// token rather than rotating it, and tokens do not expire.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE auth_tokens (
///     key VARCHAR(40) PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT auth_tokens_user_id_key UNIQUE (user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::user::User;
use crate::auth::token::generate_token_key;

/// Bearer token bound to a user
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuthToken {
    /// Opaque token key (40 hex chars)
    pub key: String,

    /// Owning user
    pub user_id: Uuid,

    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// Finds the token owned by a user
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AuthToken>(
            r#"
            SELECT key, user_id, created_at
            FROM auth_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Returns the user's token, creating one if none exists
    ///
    /// Two concurrent first logins race on `auth_tokens_user_id_key`; the
    /// insert is a no-op for the loser, which then reads the winner's row.
    pub async fn get_or_create(pool: &PgPool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        if let Some(token) = Self::find_by_user(pool, user_id).await? {
            return Ok(token);
        }

        let inserted = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING key, user_id, created_at
            "#,
        )
        .bind(generate_token_key())
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(token) => Ok(token),
            None => Self::find_by_user(pool, user_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    /// Resolves a token key to its owning user
    pub async fn find_user(pool: &PgPool, key: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.name, u.password_hash, u.is_active, u.is_staff,
                   u.is_superuser, u.created_at, u.updated_at
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await
    }
}
