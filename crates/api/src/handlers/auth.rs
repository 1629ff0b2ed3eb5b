//! # Account Handlers
//!
//! Forms are validated before anything reaches the booking service, so the
//! browser gets every field error at once. A successful login is also kept
//! in the service's session store; requests that send no bearer token act
//! for that session until logout.

use axum::{extract::State, http::StatusCode, Json};
use padelup_core::models::account::{LoginForm, RegistrationForm, Session, UserProfile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::{
    middleware::{
        auth::{BearerToken, Caller},
        error_handling::AppError,
    },
    ApiState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Registers a new account
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// ```
///
/// # Responses
///
/// * `201 Created` - Account created
/// * `400 Bad Request` - One or more form fields are invalid
/// * `409 Conflict` - The username is already registered
#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(form): Json<RegistrationForm>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    state.sessions.register(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Account created".to_string(),
        }),
    ))
}

/// Logs in, stores the session and returns it to the browser
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// ```
#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(form): Json<LoginForm>,
) -> Result<Json<Session>, AppError> {
    let session = state.sessions.login(form).await?;
    Ok(Json(session))
}

/// Forgets the stored session
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/logout
/// ```
///
/// Answers `204 No Content` whether or not a session was stored.
#[axum::debug_handler]
pub async fn logout(State(state): State<Arc<ApiState>>) -> Result<StatusCode, AppError> {
    state.sessions.logout()?;

    info!("Session ended");
    Ok(StatusCode::NO_CONTENT)
}

/// Profile of the caller
///
/// # Endpoint
///
/// ```text
/// GET /api/auth/profile
/// Authorization: Bearer <token>
/// ```
///
/// Without the header the stored session's token is used.
#[axum::debug_handler]
pub async fn profile(
    State(state): State<Arc<ApiState>>,
    bearer: Option<BearerToken>,
) -> Result<Json<UserProfile>, AppError> {
    let token = match Caller::resolve(bearer, &state.sessions)? {
        Caller::Token(token) => token,
        Caller::Stored(session) => session.token,
    };

    let profile = state.api.profile(&token).await?;
    Ok(Json(profile))
}
