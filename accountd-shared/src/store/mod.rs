/// Persistence seam for the credential manager
///
/// The credential manager only talks to a [`CredentialStore`]. Production
/// uses [`postgres::PgCredentialStore`]; tests can use the in-memory store
/// behind the `test-utils` feature.
///
/// Uniqueness (email, token key, one token per user) is the store's job.
/// A violated constraint comes back as [`StoreError::Conflict`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::readiness::is_connection_error,
    models::{
        auth_token::AuthToken,
        user::{CreateUser, UpdateUser, User},
    },
};

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// The backing database could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return StoreError::Conflict(constraint);
            }
        }

        if is_connection_error(&err) {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Database(err.to_string())
        }
    }
}

/// Durable storage for users and their tokens
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a user; a taken email yields `StoreError::Conflict`
    async fn insert_user(&self, data: CreateUser) -> Result<User, StoreError>;

    /// Looks a user up by exact (normalized) email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Applies a partial update; `None` if the user does not exist
    async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<Option<User>, StoreError>;

    /// Returns the user's token, creating it on first use
    async fn get_or_create_token(&self, user_id: Uuid) -> Result<AuthToken, StoreError>;

    /// Resolves a token key to its owner
    async fn find_user_by_token(&self, key: &str) -> Result<Option<User>, StoreError>;

    /// Verifies the store is reachable
    async fn ping(&self) -> Result<(), StoreError>;
}
