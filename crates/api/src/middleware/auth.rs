//! # Authentication Module
//!
//! Tokens are issued by the booking service. This service never inspects
//! them; it takes the bearer token from the browser's request and forwards
//! it upstream. Requests without a token act for the session stored at
//! login, when there is one.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use padelup_client::{PadelApi, SessionClient, SessionStore};
use padelup_core::{
    errors::{BookingError, BookingResult},
    models::account::Session,
};

use crate::middleware::error_handling::AppError;

/// Bearer token taken from the `Authorization` header
///
/// Rejects the request with `401 Unauthorized` when the header is missing
/// or is not a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError(BookingError::Authentication(
                    "Missing Authorization header".to_string(),
                ))
            })?;

        parse_bearer(header).map(BearerToken).ok_or_else(|| {
            AppError(BookingError::Authentication(
                "Authorization header must be a bearer token".to_string(),
            ))
        })
    }
}

/// Extracts the token from a `Bearer <token>` header value
pub fn parse_bearer(header: &str) -> Option<String> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// Who a request acts for
#[derive(Debug, Clone, PartialEq)]
pub enum Caller {
    /// The request sent its own bearer token
    Token(String),
    /// No token was sent; the session stored at login is used
    Stored(Session),
}

impl Caller {
    /// Picks the bearer token when present, the stored session otherwise.
    /// Fails with an authentication error when there is neither.
    pub fn resolve<S: SessionStore>(
        bearer: Option<BearerToken>,
        sessions: &SessionClient<S>,
    ) -> BookingResult<Self> {
        match bearer {
            Some(BearerToken(token)) => Ok(Self::Token(token)),
            None => sessions.session().map(Self::Stored),
        }
    }

    /// The full session, asking the booking service for the profile of a bare token
    pub async fn session(self, api: &dyn PadelApi) -> BookingResult<Session> {
        match self {
            Self::Token(token) => {
                let user = api.profile(&token).await?;
                Ok(Session { token, user })
            }
            Self::Stored(session) => Ok(session),
        }
    }
}
