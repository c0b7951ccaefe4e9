/// Bearer token authentication
///
/// Reads `Authorization: Bearer <key>` (or `Token <key>`), resolves the key
/// to an active user and stores an [`AuthContext`] in the request
/// extensions. Requests without a usable token are rejected with 401 before
/// reaching the handler.

use accountd_shared::{auth::token::parse_authorization_header, models::user::User};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{app::AppState, error::ApiError};

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
}

/// Token authentication middleware layer
pub async fn token_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_authorization_header);

    let user = state.credentials.resolve_token(key).await?;

    tracing::debug!(user_id = %user.id, "Request authenticated");
    req.extensions_mut().insert(AuthContext { user });

    Ok(next.run(req).await)
}
