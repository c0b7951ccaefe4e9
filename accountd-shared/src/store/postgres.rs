/// PostgreSQL-backed credential store

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CredentialStore, StoreError};
use crate::{
    db::pool::health_check,
    models::{
        auth_token::AuthToken,
        user::{CreateUser, UpdateUser, User},
    },
};

/// Credential store over a sqlx connection pool
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert_user(&self, data: CreateUser) -> Result<User, StoreError> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<Option<User>, StoreError> {
        Ok(User::update(&self.pool, id, data).await?)
    }

    async fn get_or_create_token(&self, user_id: Uuid) -> Result<AuthToken, StoreError> {
        Ok(AuthToken::get_or_create(&self.pool, user_id).await?)
    }

    async fn find_user_by_token(&self, key: &str) -> Result<Option<User>, StoreError> {
        Ok(AuthToken::find_user(&self.pool, key).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(health_check(&self.pool).await?)
    }
}
