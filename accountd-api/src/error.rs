/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which converts to the matching
/// status code and a JSON body:
///
/// ```json
/// {
///   "error": "validation_error",
///   "message": "Request validation failed",
///   "details": [{ "field": "password", "message": "Ensure this field has at least 8 characters." }]
/// }
/// ```
///
/// # Example
///
/// ```
/// use accountd_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(name: Option<String>) -> ApiResult<Json<serde_json::Value>> {
///     let name = name.ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;
///     Ok(Json(json!({ "name": name })))
/// }
/// ```

use accountd_shared::{
    credentials::{CredentialError, FieldError},
    store::StoreError,
};
use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned for every failed login
pub const INVALID_CREDENTIALS: &str = "Unable to authenticate with provided credentials";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Login rejected (400)
    ///
    /// Always carries the same message whatever the cause.
    InvalidCredentials,

    /// Missing or invalid bearer token (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Method not allowed (405)
    MethodNotAllowed(String),

    /// Duplicate email (400)
    Conflict(String),

    /// Field validation failed (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl From<FieldError> for ValidationErrorDetail {
    fn from(err: FieldError) -> Self {
        Self {
            field: err.field,
            message: err.message,
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional per-field errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::InvalidCredentials => write!(f, "{}", INVALID_CREDENTIALS),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::MethodNotAllowed(msg) => write!(f, "Method not allowed: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "invalid_credentials",
                INVALID_CREDENTIALS.to_string(),
                None,
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::MethodNotAllowed(msg) => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                msg,
                None,
            ),
            ApiError::Conflict(msg) => (
                StatusCode::BAD_REQUEST,
                "conflict",
                msg.clone(),
                Some(vec![ValidationErrorDetail {
                    field: "email".to_string(),
                    message: msg,
                }]),
            ),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Convert credential errors to API errors
///
/// `Authentication` maps to 401 here; the login handler maps it to
/// `InvalidCredentials` itself.
impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Validation(errors) => {
                ApiError::ValidationError(errors.into_iter().map(Into::into).collect())
            }
            CredentialError::Conflict => {
                ApiError::Conflict("A user with this email already exists.".to_string())
            }
            CredentialError::Authentication => {
                ApiError::Unauthorized("Invalid or missing token".to_string())
            }
            CredentialError::Password(e) => {
                ApiError::InternalError(format!("Password operation failed: {}", e))
            }
            CredentialError::Store(e) => ApiError::from(e),
        }
    }
}

/// Convert store errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) => {
                ApiError::Conflict(format!("Constraint violation: {}", constraint))
            }
            other => ApiError::InternalError(format!("Store error: {}", other)),
        }
    }
}

/// Convert JSON body rejections to API errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
