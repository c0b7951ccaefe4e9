/// Common test utilities for API tests
///
/// Builds the full router over an in-memory credential store, so the tests
/// need no database.

use std::sync::Arc;

use accountd_api::{
    app::{build_router, AppState},
    config::Config,
};
use accountd_shared::{credentials::CredentialManager, store::memory::InMemoryCredentialStore};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const EMAIL: &str = "user@example.com";
pub const PASSWORD: &str = "Whatever!";
pub const NAME: &str = "user-test";

/// Test context containing the router and its backing store
pub struct TestContext {
    pub app: Router,
    pub store: InMemoryCredentialStore,
}

/// A decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgresql://unused/accountd".to_string()),
            _ => None,
        })
        .expect("test config");

        let store = InMemoryCredentialStore::new();
        let credentials = CredentialManager::new(Arc::new(store.clone()));
        let app = build_router(AppState::new(credentials, config));

        Self { app, store }
    }

    /// Sends a request, with an optional bearer token and JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Registers the default test user through the API
    pub async fn register_default_user(&self) {
        let response = self
            .send(
                Method::POST,
                "/api/users",
                None,
                Some(json!({ "email": EMAIL, "password": PASSWORD, "name": NAME })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    }

    /// Registers the default test user and returns its token
    pub async fn login_default_user(&self) -> String {
        self.register_default_user().await;

        let response = self
            .send(
                Method::POST,
                "/api/tokens",
                None,
                Some(json!({ "email": EMAIL, "password": PASSWORD })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);

        response.body["token"].as_str().unwrap().to_string()
    }
}
