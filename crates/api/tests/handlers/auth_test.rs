use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use mockall::predicate::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use padelup_client::SessionStore;
use padelup_core::errors::BookingError;
use padelup_core::models::account::{LoginRequest, RegisterRequest, Session, UserProfile};

use crate::test_utils::{profile, session, TestContext, TOKEN};

#[tokio::test]
async fn test_register_forwards_trimmed_form() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_register()
        .with(eq(RegisterRequest {
            username: "12345678A".to_string(),
            password: "secreto".to_string(),
            first_name: "Lucía".to_string(),
            last_name: "García".to_string(),
        }))
        .times(1)
        .returning(|_| Ok(()));
    let server = ctx.server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "first_name": " Lucía ",
            "last_name": "García",
            "username": "12345678A ",
            "password": "secreto",
            "confirm_password": "secreto"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["message"], "Account created");
}

#[tokio::test]
async fn test_register_reports_every_field_error() {
    let mut ctx = TestContext::new();
    ctx.api.expect_register().never();
    let server = ctx.server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "first_name": "",
            "last_name": "García",
            "username": "12345678A",
            "password": "corta",
            "confirm_password": "distinta"
        }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let message = response.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(message.contains("first_name"));
    assert!(message.contains("password"));
    assert!(message.contains("confirm_password"));
}

#[tokio::test]
async fn test_register_existing_user_conflicts() {
    let mut ctx = TestContext::new();
    ctx.api.expect_register().returning(|_| {
        Err(BookingError::SubmissionConflict(
            "User already exists".to_string(),
        ))
    });
    let server = ctx.server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "first_name": "Lucía",
            "last_name": "García",
            "username": "12345678A",
            "password": "secreto",
            "confirm_password": "secreto"
        }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_returns_and_stores_session() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_login()
        .with(eq(LoginRequest {
            username: "12345678A".to_string(),
            password: "secreto".to_string(),
        }))
        .times(1)
        .returning(|_| {
            Ok(Session {
                token: TOKEN.to_string(),
                user: profile(),
            })
        });
    let sessions = ctx.sessions.clone();
    let server = ctx.server();

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "12345678A", "password": "secreto" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(sessions.get(), Some(session()));
    assert_eq!(
        response.json::<Session>(),
        Session {
            token: TOKEN.to_string(),
            user: profile(),
        }
    );
}

#[tokio::test]
async fn test_login_rejected_by_service() {
    let mut ctx = TestContext::new();
    ctx.api.expect_login().returning(|_| {
        Err(BookingError::Authentication(
            "Invalid credentials".to_string(),
        ))
    });
    let sessions = ctx.sessions.clone();
    let server = ctx.server();

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "12345678A", "password": "incorrecta" }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(sessions.get(), None);
}

#[tokio::test]
async fn test_profile_uses_bearer_token() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_profile()
        .with(eq(TOKEN))
        .times(1)
        .returning(|_| Ok(profile()));
    let server = ctx.server();

    let response = server
        .get("/api/auth/profile")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer jwt-token"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<UserProfile>(), profile());
}

#[tokio::test]
async fn test_profile_without_token() {
    let mut ctx = TestContext::new();
    ctx.api.expect_profile().never();
    let server = ctx.server();

    let response = server.get("/api/auth/profile").expect_failure().await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_falls_back_to_stored_session() {
    let mut ctx = TestContext::new();
    ctx.sessions.set(session()).unwrap();
    ctx.api
        .expect_profile()
        .with(eq(TOKEN))
        .times(1)
        .returning(|_| Ok(profile()));
    let server = ctx.server();

    let response = server.get("/api/auth/profile").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<UserProfile>(), profile());
}

#[tokio::test]
async fn test_bearer_token_wins_over_stored_session() {
    let mut ctx = TestContext::new();
    ctx.sessions.set(session()).unwrap();
    ctx.api
        .expect_profile()
        .with(eq("other-token"))
        .times(1)
        .returning(|_| Ok(profile()));
    let server = ctx.server();

    let response = server
        .get("/api/auth/profile")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer other-token"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_forgets_session() {
    let mut ctx = TestContext::new();
    ctx.sessions.set(session()).unwrap();
    ctx.api.expect_profile().never();
    let sessions = ctx.sessions.clone();
    let server = ctx.server();

    let response = server.post("/api/auth/logout").await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(sessions.get(), None);

    let response = server.get("/api/auth/profile").expect_failure().await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
