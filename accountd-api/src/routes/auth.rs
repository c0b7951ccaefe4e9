/// Token issuance endpoint
///
/// Exchanges email and password for the user's bearer token. The same token
/// is returned on every successful login until it is removed.
///
/// # Endpoint
///
/// ```text
/// POST /api/tokens
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "Whatever!"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing fields, or credentials rejected. A rejected
///   login always has the same body, whatever the cause.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use accountd_shared::credentials::CredentialError;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

/// Token request
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// 40-character hex bearer key
    pub token: String,
}

/// Obtain the caller's bearer token
pub async fn obtain_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(req) = payload?;

    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Must include \"email\" and \"password\".".to_string(),
        ));
    }

    let token = state
        .credentials
        .authenticate(&req.email, &req.password)
        .await
        .map_err(|e| match e {
            CredentialError::Authentication => ApiError::InvalidCredentials,
            other => ApiError::from(other),
        })?;

    Ok(Json(TokenResponse { token: token.key }))
}
