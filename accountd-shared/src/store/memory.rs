/// In-memory credential store for tests
///
/// Enforces the same uniqueness rules as the PostgreSQL schema. Enable the
/// `test-utils` feature to use it from other crates:
///
/// ```toml
/// [dev-dependencies]
/// accountd-shared = { path = "../accountd-shared", features = ["test-utils"] }
/// ```

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{CredentialStore, StoreError};
use crate::{
    auth::token::{constant_time_compare, generate_token_key},
    models::{
        auth_token::AuthToken,
        user::{CreateUser, UpdateUser, User},
    },
};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    tokens: Vec<AuthToken>,
}

#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    state: Arc<Mutex<MemoryState>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of all stored users
    pub fn users(&self) -> Vec<User> {
        self.state.lock().unwrap().users.clone()
    }

    /// Snapshot of all stored tokens
    pub fn tokens(&self) -> Vec<AuthToken> {
        self.state.lock().unwrap().tokens.clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert_user(&self, data: CreateUser) -> Result<User, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();

        if state.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            name: data.name,
            password_hash: data.password_hash,
            is_active: true,
            is_staff: data.is_staff,
            is_superuser: data.is_superuser,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();

        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();

        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(name) = data.name {
            user.name = name;
        }
        if let Some(password_hash) = data.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(is_active) = data.is_active {
            user.is_active = is_active;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn get_or_create_token(&self, user_id: Uuid) -> Result<AuthToken, StoreError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();

        if let Some(token) = state.tokens.iter().find(|t| t.user_id == user_id) {
            return Ok(token.clone());
        }

        let token = AuthToken {
            key: generate_token_key(),
            user_id,
            created_at: Utc::now(),
        };
        state.tokens.push(token.clone());

        Ok(token)
    }

    async fn find_user_by_token(&self, key: &str) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();

        let Some(token) = state.tokens.iter().find(|t| constant_time_compare(&t.key, key)) else {
            return Ok(None);
        };

        Ok(state.users.iter().find(|u| u.id == token.user_id).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}
