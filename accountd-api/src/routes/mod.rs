/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Registration
/// - `auth`: Token issuance
/// - `me`: Profile of the authenticated user

pub mod auth;
pub mod health;
pub mod me;
pub mod users;

use crate::error::ApiError;
use axum::http::{Method, Uri};

/// Fallback for a known path hit with an unsupported method
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(format!("Method \"{}\" not allowed.", method))
}

/// Fallback for unknown paths
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
