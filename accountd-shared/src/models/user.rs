/// User model and database operations
///
/// Users are keyed by email. The email is normalized on the way in (domain
/// lower-cased, local part kept verbatim) and uniqueness is enforced by the
/// `users_email_key` constraint.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(50) NOT NULL,
///     name VARCHAR(50) NOT NULL DEFAULT '',
///     password_hash VARCHAR(255) NOT NULL,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     is_staff BOOLEAN NOT NULL DEFAULT FALSE,
///     is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT users_email_key UNIQUE (email)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use accountd_shared::models::user::{CreateUser, User};
/// use accountd_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser::new("user@example.com", "$argon2id$...", "Jane")).await?;
/// let found = User::find_by_email(&pool, "user@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{self, PasswordError};

const USER_COLUMNS: &str = "id, email, name, password_hash, is_active, is_staff, is_superuser, created_at, updated_at";

/// User account
///
/// `password_hash` is skipped by serde so a `User` can never leak it through
/// a serialized response.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Normalized email address, unique across all users
    pub email: String,

    /// Display name (may be empty)
    pub name: String,

    /// Argon2id PHC string
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Inactive users cannot authenticate
    pub is_active: bool,

    /// Staff users may use operator tooling
    pub is_staff: bool,

    /// Superusers hold every permission
    pub is_superuser: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Normalized email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub name: String,

    pub is_staff: bool,

    pub is_superuser: bool,
}

impl CreateUser {
    /// Creates input for a regular (non-staff) user
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            name: name.into(),
            is_staff: false,
            is_superuser: false,
        }
    }
}

/// Input for updating an existing user
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,

    pub is_active: Option<bool>,
}

impl UpdateUser {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password_hash.is_none() && self.is_active.is_none()
    }
}

/// Outward-facing view of a user: `{email, name}` and nothing else
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

/// Something that can log in with an identifier and a password
pub trait CredentialHolder {
    /// The identifier used at login
    fn login_identifier(&self) -> &str;

    /// The stored password hash
    fn password_hash(&self) -> &str;

    /// Checks a plaintext password against the stored hash
    ///
    /// A stored value that is not a valid hash never matches.
    fn check_password(&self, candidate: &str) -> Result<bool, PasswordError> {
        match password::verify_password(candidate, self.password_hash()) {
            Err(PasswordError::InvalidHash(_)) => Ok(false),
            other => other,
        }
    }
}

/// Something that carries account flags and permissions
pub trait PermissionHolder {
    fn is_active(&self) -> bool;

    fn is_staff(&self) -> bool;

    fn is_superuser(&self) -> bool;

    /// Whether the holder has the named permission
    ///
    /// No per-permission grants are stored, so only active superusers pass.
    fn has_perm(&self, _perm: &str) -> bool {
        self.is_active() && self.is_superuser()
    }
}

impl CredentialHolder for User {
    fn login_identifier(&self) -> &str {
        &self.email
    }

    fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl PermissionHolder for User {
    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_staff(&self) -> bool {
        self.is_staff
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }
}

/// Normalizes an email address
///
/// Surrounding whitespace is trimmed and the part after the last `@` is
/// lower-cased; the local part is kept exactly as given. Input without an
/// `@` is only trimmed.
///
/// ```
/// use accountd_shared::models::user::normalize_email;
///
/// assert_eq!(normalize_email("Test2@Example.Com"), "Test2@example.com");
/// assert_eq!(normalize_email(" TEST3@EXAMPLE.COM "), "TEST3@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();

    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns a database error on a `users_email_key` violation (duplicate
    /// email) or when the connection fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, name, is_staff, is_superuser)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.name)
            .bind(data.is_staff)
            .bind(data.is_superuser)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by (already normalized) email
    ///
    /// The match is exact: the local part of an email is case-sensitive.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Updates an existing user
    ///
    /// Only `Some` fields in `data` are written; `updated_at` is always bumped.
    /// Returns `None` if no user has the given ID.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", USER_COLUMNS));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        q.fetch_optional(pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(password_hash: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            name: "user-test".to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        let samples = [
            ("test1@EXAMPLE.com", "test1@example.com"),
            ("Test2@Example.Com", "Test2@example.com"),
            ("TEST3@EXAMPLE.COM", "TEST3@example.com"),
            ("test4@example.COM", "test4@example.com"),
        ];

        for (input, expected) in samples {
            assert_eq!(normalize_email(input), expected);
        }
    }

    #[test]
    fn test_normalize_email_edge_cases() {
        assert_eq!(normalize_email(""), "");
        assert_eq!(normalize_email("   "), "");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
        assert_eq!(normalize_email("\"a@b\"@EXAMPLE.com"), "\"a@b\"@example.com");
    }

    #[test]
    fn test_user_serialization_omits_password_hash() {
        let user = sample_user("$argon2id$secret");
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "user@example.com");
    }

    #[test]
    fn test_user_profile_has_only_email_and_name() {
        let profile = UserProfile::from(sample_user("hash"));
        let json = serde_json::to_value(&profile).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), 2);
        assert_eq!(obj["email"], "user@example.com");
        assert_eq!(obj["name"], "user-test");
    }

    #[test]
    fn test_check_password() {
        let hash = password::hash_password("Whatever!").unwrap();
        let user = sample_user(&hash);

        assert!(user.check_password("Whatever!").unwrap());
        assert!(!user.check_password("whatever!").unwrap());
        assert_eq!(user.login_identifier(), "user@example.com");
    }

    #[test]
    fn test_check_password_with_unusable_hash() {
        let user = sample_user("not-a-hash");
        assert!(!user.check_password("anything").unwrap());
    }

    #[test]
    fn test_permissions() {
        let mut user = sample_user("hash");
        assert!(!user.has_perm("users.change_user"));

        user.is_superuser = true;
        assert!(user.has_perm("users.change_user"));

        user.is_active = false;
        assert!(!user.has_perm("users.change_user"));
    }

    #[test]
    fn test_update_user_default_is_empty() {
        assert!(UpdateUser::default().is_empty());
        assert!(!UpdateUser {
            name: Some("x".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
