/// Profile of the authenticated user
///
/// # Endpoints
///
/// - `GET /api/me` - returns `{name, email}`
/// - `PATCH /api/me` - updates `name` and/or `password`, returns `{name, email}`
///
/// Both require a bearer token (see [`crate::middleware::auth`]). Other
/// methods answer 405. An `email` key in a patch is ignored.

use crate::{app::AppState, error::ApiResult, middleware::auth::AuthContext};
use accountd_shared::{credentials::ProfilePatch, models::user::UserProfile};
use axum::{body::Bytes, extract::State, Extension, Json};

/// Return the caller's profile
pub async fn get_profile(Extension(auth): Extension<AuthContext>) -> Json<UserProfile> {
    Json(UserProfile::from(auth.user))
}

/// Update the caller's name and/or password
///
/// An empty body is an empty patch and returns the profile unchanged.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    body: Bytes,
) -> ApiResult<Json<UserProfile>> {
    let patch = if body.iter().all(u8::is_ascii_whitespace) {
        ProfilePatch::default()
    } else {
        Json::<ProfilePatch>::from_bytes(&body)?.0
    };

    let profile = state.credentials.update_profile(&auth.user, patch).await?;

    Ok(Json(profile))
}
