/// User registration endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/users
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "Whatever!",
///   "name": "Jane"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "email": "user@example.com",
///   "name": "Jane"
/// }
/// ```
///
/// The password is never echoed back.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed or the email is already registered

use crate::{app::AppState, error::ApiResult};
use accountd_shared::{credentials::Registration, models::user::UserProfile};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let Json(registration) = payload?;

    let user = state.credentials.register(registration).await?;

    Ok((StatusCode::CREATED, Json(UserProfile::from(user))))
}
