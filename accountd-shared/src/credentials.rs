/// Credential manager
///
/// Owns the user lifecycle: registration, password authentication with
/// token issuance, token resolution and profile updates. All durable state
/// goes through a [`CredentialStore`]; the manager itself holds none.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use accountd_shared::credentials::{CredentialManager, Registration};
/// use accountd_shared::store::postgres::PgCredentialStore;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let manager = CredentialManager::new(Arc::new(PgCredentialStore::new(pool)));
///
/// let user = manager
///     .register(Registration::new("user@EXAMPLE.com", "Whatever!", "Jane"))
///     .await?;
/// assert_eq!(user.email, "user@example.com");
///
/// let token = manager.authenticate("user@example.com", "Whatever!").await?;
/// let profile = manager.get_or_update_profile(Some(&token.key), None).await?;
/// assert_eq!(profile.name, "Jane");
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::{
    auth::{
        password::{self, PasswordError},
        token::validate_token_format,
    },
    models::{
        auth_token::AuthToken,
        user::{normalize_email, CreateUser, CredentialHolder, UpdateUser, User, UserProfile},
    },
    store::{CredentialStore, StoreError},
};

/// Maximum length of the email and name fields, in characters
pub const MAX_FIELD_LENGTH: u64 = 50;

const BLANK_FIELD: &str = "This field may not be blank.";

/// One rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Malformed or missing input
    #[error("Validation failed: {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// The email is already registered
    #[error("A user with this email already exists")]
    Conflict,

    /// Unknown identity, wrong password, or missing/invalid token
    ///
    /// Deliberately carries no detail about which of these happened.
    #[error("Unable to authenticate with provided credentials")]
    Authentication,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CredentialError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => CredentialError::Conflict,
            other => CredentialError::Store(other),
        }
    }
}

/// Registration input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[serde(default)]
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "Ensure this field has at least 8 characters."))]
    pub password: String,

    #[serde(default)]
    #[validate(length(max = 50, message = "Ensure this field has no more than 50 characters."))]
    pub name: String,
}

impl Registration {
    pub fn new(email: impl Into<String>, password: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
        }
    }
}

/// Partial profile update
///
/// Absent fields are left unchanged. The email cannot be changed here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password.is_none()
    }
}

/// Registration, authentication and profile management
#[derive(Clone)]
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,
}

impl CredentialManager {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Registers a regular user
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank or malformed email, a blank name, a password
    ///   shorter than 8 characters, or an overlong email/name (all failures
    ///   reported together)
    /// - `Conflict` if the normalized email is already registered
    pub async fn register(&self, registration: Registration) -> Result<User, CredentialError> {
        self.create_user(registration, false).await
    }

    /// Registers a user with staff and superuser flags set
    ///
    /// Same rules as [`register`](Self::register) except that the name may
    /// be left blank.
    pub async fn create_superuser(&self, registration: Registration) -> Result<User, CredentialError> {
        self.create_user(registration, true).await
    }

    async fn create_user(&self, registration: Registration, superuser: bool) -> Result<User, CredentialError> {
        let registration = Registration {
            email: normalize_email(&registration.email),
            name: registration.name.trim().to_string(),
            ..registration
        };
        validate_registration(&registration, !superuser)?;

        let password_hash = password::hash_password(&registration.password)?;

        let data = CreateUser {
            email: registration.email,
            password_hash,
            name: registration.name,
            is_staff: superuser,
            is_superuser: superuser,
        };

        let user = self.store.insert_user(data).await.map_err(|e| {
            if matches!(e, StoreError::Conflict(_)) {
                debug!("Registration rejected: email already registered");
            }
            CredentialError::from(e)
        })?;

        info!(user_id = %user.id, superuser, "User registered");
        Ok(user)
    }

    /// Exchanges email and password for the user's bearer token
    ///
    /// The existing token is reused; one is created on first login. An
    /// unknown email still costs one password verification so the two
    /// failure cases cannot be told apart by timing.
    ///
    /// # Errors
    ///
    /// `Authentication` for an unknown email, a wrong password or an
    /// inactive account.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthToken, CredentialError> {
        let email = normalize_email(email);

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            password::verify_dummy(password);
            warn!("Authentication failed");
            return Err(CredentialError::Authentication);
        };

        if !user.check_password(password)? || !user.is_active {
            warn!(user_id = %user.id, "Authentication failed");
            return Err(CredentialError::Authentication);
        }

        let token = self.store.get_or_create_token(user.id).await?;

        info!(user_id = %user.id, "Token issued");
        Ok(token)
    }

    /// Resolves a bearer token to an active user
    ///
    /// # Errors
    ///
    /// `Authentication` if the token is missing, malformed, unknown, or
    /// belongs to an inactive user.
    pub async fn resolve_token(&self, key: Option<&str>) -> Result<User, CredentialError> {
        let key = key
            .filter(|k| validate_token_format(k))
            .ok_or(CredentialError::Authentication)?;

        match self.store.find_user_by_token(key).await? {
            Some(user) if user.is_active => Ok(user),
            _ => {
                debug!("Rejected unknown or inactive token");
                Err(CredentialError::Authentication)
            }
        }
    }

    /// Applies a profile patch to an already authenticated user
    ///
    /// The name is replaced as given; a new password is validated and
    /// re-hashed. An empty patch returns the current profile unchanged.
    pub async fn update_profile(&self, user: &User, patch: ProfilePatch) -> Result<UserProfile, CredentialError> {
        validate_patch(&patch)?;

        if patch.is_empty() {
            return Ok(UserProfile::from(user));
        }

        let password_hash = match patch.password.as_deref() {
            Some(new_password) => Some(password::hash_password(new_password)?),
            None => None,
        };
        let changed_password = password_hash.is_some();

        let update = UpdateUser {
            name: patch.name.map(|name| name.trim().to_string()),
            password_hash,
            ..Default::default()
        };

        let updated = self
            .store
            .update_user(user.id, update)
            .await?
            .ok_or(CredentialError::Authentication)?;

        info!(user_id = %updated.id, changed_password, "Profile updated");
        Ok(UserProfile::from(updated))
    }

    /// Returns the token owner's profile, applying `patch` first if given
    pub async fn get_or_update_profile(
        &self,
        token: Option<&str>,
        patch: Option<ProfilePatch>,
    ) -> Result<UserProfile, CredentialError> {
        let user = self.resolve_token(token).await?;

        match patch {
            Some(patch) => self.update_profile(&user, patch).await,
            None => Ok(UserProfile::from(user)),
        }
    }

    /// Verifies the backing store is reachable
    pub async fn ping(&self) -> Result<(), CredentialError> {
        Ok(self.store.ping().await?)
    }
}

/// Checks registration input, collecting every failing field
///
/// Expects the email and name to be normalized already.
fn validate_registration(registration: &Registration, require_name: bool) -> Result<(), CredentialError> {
    let mut errors = Vec::new();
    let blank_email = registration.email.is_empty();

    if blank_email {
        errors.push(FieldError::new("email", BLANK_FIELD));
    }
    if require_name && registration.name.is_empty() {
        errors.push(FieldError::new("name", BLANK_FIELD));
    }

    if let Err(validation) = registration.validate() {
        for (field, field_errors) in validation.field_errors() {
            if blank_email && field == "email" {
                continue;
            }
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value.".to_string());
                errors.push(FieldError::new(field.to_string(), message));
            }
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    errors.sort_by(|a, b| a.field.cmp(&b.field));
    Err(CredentialError::Validation(errors))
}

fn validate_patch(patch: &ProfilePatch) -> Result<(), CredentialError> {
    let mut errors = Vec::new();

    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            errors.push(FieldError::new("name", BLANK_FIELD));
        } else if name.chars().count() as u64 > MAX_FIELD_LENGTH {
            errors.push(FieldError::new(
                "name",
                "Ensure this field has no more than 50 characters.",
            ));
        }
    }

    if let Some(new_password) = &patch.password {
        if let Err(message) = password::validate_password_length(new_password) {
            errors.push(FieldError::new("password", message));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CredentialError::Validation(errors))
    }
}
