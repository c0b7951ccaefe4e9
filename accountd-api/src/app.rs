/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use accountd_api::{app::{build_router, AppState}, config::Config};
/// use accountd_shared::{
///     credentials::CredentialManager,
///     db::pool::create_pool,
///     store::postgres::PgCredentialStore,
/// };
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let credentials = CredentialManager::new(Arc::new(PgCredentialStore::new(pool)));
///
/// let app = build_router(AppState::new(credentials, config));
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::auth::token_auth_layer, routes};
use accountd_shared::credentials::CredentialManager;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Registration, login and profile operations
    pub credentials: CredentialManager,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(credentials: CredentialManager, config: Config) -> Self {
        Self {
            credentials,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET   /health             # Health check (public)
/// └── /api/
///     ├── POST  /users          # Register (public)
///     ├── POST  /tokens         # Obtain token (public)
///     └── /me                   # Profile (bearer token)
///         ├── GET
///         └── PATCH
/// ```
///
/// Any other method on a known path answers 405. On `/api/me` the token is
/// checked first, so an unauthenticated POST gets 401.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route(
        "/health",
        get(routes::health::health_check).fallback(routes::method_not_allowed),
    );

    let api_routes = Router::new()
        .route(
            "/users",
            post(routes::users::register).fallback(routes::method_not_allowed),
        )
        .route(
            "/tokens",
            post(routes::auth::obtain_token).fallback(routes::method_not_allowed),
        )
        .route(
            "/me",
            get(routes::me::get_profile)
                .patch(routes::me::update_profile)
                .fallback(routes::method_not_allowed)
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    token_auth_layer,
                )),
        );

    let cors = if state.config.allows_any_origin() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .fallback(routes::not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
