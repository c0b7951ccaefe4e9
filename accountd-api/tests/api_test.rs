/// API tests for accountd
///
/// These drive the full router (routing, auth middleware, error mapping)
/// over an in-memory credential store:
/// - Registration
/// - Token issuance
/// - Profile retrieval and update
/// - Health check

mod common;

use accountd_shared::models::user::CredentialHolder;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{TestContext, EMAIL, NAME, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_create_user_success() {
    let ctx = TestContext::new();

    let response = ctx
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "email": "Test@EXAMPLE.com", "password": PASSWORD, "name": NAME })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body, json!({ "email": "Test@example.com", "name": NAME }));
    assert!(response.body.get("password").is_none());

    let users = ctx.store.users();
    assert_eq!(users.len(), 1);
    assert!(users[0].check_password(PASSWORD).unwrap());
}

#[tokio::test]
async fn test_create_user_with_existing_email_fails() {
    let ctx = TestContext::new();
    ctx.register_default_user().await;

    let response = ctx
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "email": "user@EXAMPLE.COM", "password": PASSWORD, "name": "other" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "conflict");
    assert_eq!(response.body["details"][0]["field"], "email");
    assert_eq!(ctx.store.users().len(), 1);
}

#[tokio::test]
async fn test_password_too_short_fails() {
    let ctx = TestContext::new();

    let response = ctx
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "email": EMAIL, "password": "pw", "name": NAME })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "validation_error");
    assert_eq!(response.body["details"][0]["field"], "password");
    assert!(ctx.store.users().is_empty());
}

#[tokio::test]
async fn test_create_user_missing_email_fails() {
    let ctx = TestContext::new();

    let response = ctx
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "password": PASSWORD, "name": NAME })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["details"][0]["field"], "email");
    assert_eq!(response.body["details"][0]["message"], "This field may not be blank.");
}

#[tokio::test]
async fn test_create_user_missing_name_fails() {
    let ctx = TestContext::new();

    let response = ctx
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "email": EMAIL, "password": PASSWORD })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["details"][0]["field"], "name");
    assert_eq!(response.body["details"][0]["message"], "This field may not be blank.");
    assert!(ctx.store.users().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = ctx.send_request(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "bad_request");
}

#[tokio::test]
async fn test_create_token_for_user() {
    let ctx = TestContext::new();
    let token = ctx.login_default_user().await;

    assert_eq!(token.len(), 40);

    // Logging in again returns the same token
    let response = ctx
        .send(
            Method::POST,
            "/api/tokens",
            None,
            Some(json!({ "email": EMAIL, "password": PASSWORD })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["token"], token.as_str());
}

#[tokio::test]
async fn test_create_token_bad_credentials() {
    let ctx = TestContext::new();
    ctx.register_default_user().await;

    let wrong_password = ctx
        .send(
            Method::POST,
            "/api/tokens",
            None,
            Some(json!({ "email": EMAIL, "password": "badpass123" })),
        )
        .await;
    let unknown_email = ctx
        .send(
            Method::POST,
            "/api/tokens",
            None,
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
        )
        .await;

    for response in [&wrong_password, &unknown_email] {
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.get("token").is_none());
    }
    assert_eq!(wrong_password.body, unknown_email.body);
    assert!(ctx.store.tokens().is_empty());
}

#[tokio::test]
async fn test_create_token_blank_password() {
    let ctx = TestContext::new();
    ctx.register_default_user().await;

    let response = ctx
        .send(
            Method::POST,
            "/api/tokens",
            None,
            Some(json!({ "email": EMAIL, "password": "" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.get("token").is_none());
}

#[tokio::test]
async fn test_retrieve_user_unauthorized() {
    let ctx = TestContext::new();

    let response = ctx.send(Method::GET, "/api/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers[header::WWW_AUTHENTICATE], "Bearer");

    let response = ctx
        .send(Method::GET, "/api/me", Some(&"0".repeat(40)), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_retrieve_profile_success() {
    let ctx = TestContext::new();
    let token = ctx.login_default_user().await;

    let response = ctx.send(Method::GET, "/api/me", Some(&token), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "name": NAME, "email": EMAIL }));
}

#[tokio::test]
async fn test_token_scheme_is_accepted() {
    let ctx = TestContext::new();
    let token = ctx.login_default_user().await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/me")
        .header(header::AUTHORIZATION, format!("Token {}", token))
        .body(Body::empty())
        .unwrap();
    let response = ctx.send_request(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["email"], EMAIL);
}

#[tokio::test]
async fn test_post_me_not_allowed() {
    let ctx = TestContext::new();
    let token = ctx.login_default_user().await;

    for method in [Method::POST, Method::PUT, Method::DELETE] {
        let response = ctx
            .send(method.clone(), "/api/me", Some(&token), Some(json!({})))
            .await;
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        assert_eq!(response.body["error"], "method_not_allowed");
    }
}

#[tokio::test]
async fn test_post_me_without_token_is_unauthorized() {
    let ctx = TestContext::new();

    let response = ctx.send(Method::POST, "/api/me", None, Some(json!({}))).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_user_profile() {
    let ctx = TestContext::new();
    let token = ctx.login_default_user().await;

    let response = ctx
        .send(
            Method::PATCH,
            "/api/me",
            Some(&token),
            Some(json!({ "name": "New Name", "password": "AnotherPass!" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "name": "New Name", "email": EMAIL }));

    let user = &ctx.store.users()[0];
    assert_eq!(user.name, "New Name");
    assert!(user.check_password("AnotherPass!").unwrap());

    // The old password no longer logs in, the new one does
    let old = ctx
        .send(
            Method::POST,
            "/api/tokens",
            None,
            Some(json!({ "email": EMAIL, "password": PASSWORD })),
        )
        .await;
    assert_eq!(old.status, StatusCode::BAD_REQUEST);

    let new = ctx
        .send(
            Method::POST,
            "/api/tokens",
            None,
            Some(json!({ "email": EMAIL, "password": "AnotherPass!" })),
        )
        .await;
    assert_eq!(new.status, StatusCode::OK);
    assert_eq!(new.body["token"], token.as_str());
}

#[tokio::test]
async fn test_update_profile_ignores_email() {
    let ctx = TestContext::new();
    let token = ctx.login_default_user().await;

    let response = ctx
        .send(
            Method::PATCH,
            "/api/me",
            Some(&token),
            Some(json!({ "email": "other@example.com" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["email"], EMAIL);
}

#[tokio::test]
async fn test_update_profile_with_empty_body() {
    let ctx = TestContext::new();
    let token = ctx.login_default_user().await;

    let response = ctx.send(Method::PATCH, "/api/me", Some(&token), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "name": NAME, "email": EMAIL }));
}

#[tokio::test]
async fn test_update_profile_malformed_json_fails() {
    let ctx = TestContext::new();
    let token = ctx.login_default_user().await;

    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/api/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();
    let response = ctx.send_request(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "bad_request");
}

#[tokio::test]
async fn test_update_profile_short_password_fails() {
    let ctx = TestContext::new();
    let token = ctx.login_default_user().await;

    let response = ctx
        .send(
            Method::PATCH,
            "/api/me",
            Some(&token),
            Some(json!({ "password": "short" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["details"][0]["field"], "password");
    assert!(ctx.store.users()[0].check_password(PASSWORD).unwrap());
}

#[tokio::test]
async fn test_health_reports_database_state() {
    let ctx = TestContext::new();

    let response = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["database"], "connected");

    ctx.store.set_unavailable(true);
    let response = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "degraded");
    assert_eq!(response.body["database"], "disconnected");
}

#[tokio::test]
async fn test_store_outage_is_internal_error() {
    let ctx = TestContext::new();
    ctx.store.set_unavailable(true);

    let response = ctx
        .send(
            Method::POST,
            "/api/tokens",
            None,
            Some(json!({ "email": EMAIL, "password": PASSWORD })),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["message"], "An internal error occurred");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx.send(Method::GET, "/api/nothing", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
