//! # HTTP Booking Service Client
//!
//! [`HttpPadelApi`] talks JSON to the booking service. Status codes map onto
//! [`BookingError`] variants as follows:
//!
//! - `400` → `Validation`
//! - `401`, `403` → `Authentication`
//! - `404` → `NotFound`
//! - `409` → `SubmissionConflict`
//! - anything else, including network failures → `SubmissionFailure`

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::{eyre, WrapErr};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use padelup_core::errors::{BookingError, BookingResult};
use padelup_core::models::{
    account::{LoginRequest, RegisterRequest, Session, UserProfile},
    booking::{BookingConfirmation, BookingRequest},
    club::{Club, ClubDay},
};

use crate::config::ClientConfig;
use crate::gateway::PadelApi;
use crate::records::{
    BookingBody, BookingResponse, ClubRecord, ErrorBody, LoginBody, LoginResponse, RegisterBody,
    UserRecord,
};

#[derive(Debug, Clone)]
pub struct HttpPadelApi {
    client: Client,
    config: ClientConfig,
}

impl HttpPadelApi {
    pub fn new(config: ClientConfig) -> eyre::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .wrap_err("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> BookingResult<Response> {
        let response = request
            .send()
            .await
            .wrap_err_with(|| format!("Failed to reach booking service at {}", url))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response, url).await)
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> BookingResult<T> {
        let value = response
            .json::<T>()
            .await
            .wrap_err_with(|| format!("Invalid response from {}", url))?;
        Ok(value)
    }
}

/// Turns a non-success response into the matching error, keeping the
/// service's own message when it sends one.
async fn error_from_response(response: Response, url: &str) -> BookingError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            if text.trim().is_empty() {
                status.to_string()
            } else {
                text.trim().to_string()
            }
        });

    warn!(%status, url, %message, "Booking service returned an error");

    match status {
        StatusCode::BAD_REQUEST => BookingError::Validation(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BookingError::Authentication(message),
        StatusCode::NOT_FOUND => BookingError::NotFound(message),
        StatusCode::CONFLICT => BookingError::SubmissionConflict(message),
        _ => BookingError::SubmissionFailure(eyre!(
            "{} responded with {}: {}",
            url,
            status,
            message
        )),
    }
}

#[async_trait]
impl PadelApi for HttpPadelApi {
    async fn register(&self, request: &RegisterRequest) -> BookingResult<()> {
        let url = self.config.url("register");
        let body = RegisterBody::from(request);
        self.send(self.client.post(&url).json(&body), &url).await?;

        info!(username = %request.username, "Registered new user");
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> BookingResult<Session> {
        let url = self.config.url("login");
        let body = LoginBody::from(request);
        let response = self.send(self.client.post(&url).json(&body), &url).await?;
        let login: LoginResponse = Self::read_json(response, &url).await?;

        debug!(username = %login.user.udni, "Logged in");
        Ok(login.into())
    }

    async fn profile(&self, token: &str) -> BookingResult<UserProfile> {
        let url = self.config.url("api/profile");
        let response = self
            .send(self.client.get(&url).bearer_auth(token), &url)
            .await?;
        let user: UserRecord = Self::read_json(response, &url).await?;
        Ok(user.into())
    }

    async fn list_clubs(&self, date: NaiveDate) -> BookingResult<Vec<Club>> {
        let url = self.config.url("empresas");
        let response = self.send(self.client.get(&url), &url).await?;
        let records: Vec<ClubRecord> = Self::read_json(response, &url).await?;

        debug!(clubs = records.len(), "Fetched club directory");
        records
            .into_iter()
            .map(|record| record.into_club(date))
            .collect()
    }

    async fn club_day(&self, name: &str, date: NaiveDate) -> BookingResult<ClubDay> {
        let url = format!(
            "{}?fecha={}",
            self.config
                .url(&format!("empresa/{}", urlencoding::encode(name))),
            date.format("%Y-%m-%d")
        );
        let response = self.send(self.client.get(&url), &url).await?;
        let record: ClubRecord = Self::read_json(response, &url).await?;

        Ok(ClubDay {
            date,
            club: record.into_club(date)?,
        })
    }

    async fn submit_booking(
        &self,
        session: &Session,
        request: &BookingRequest,
    ) -> BookingResult<BookingConfirmation> {
        let url = self.config.url("reservar");
        let body = BookingBody::new(&session.user.username, request);

        info!(
            court = %request.court_id,
            start = %body.hora_inicio,
            duration = request.duration_minutes,
            "Submitting booking"
        );

        let response = self
            .send(
                self.client
                    .post(&url)
                    .bearer_auth(&session.token)
                    .json(&body),
                &url,
            )
            .await?;

        // Some deployments answer with an empty body.
        let text = response
            .text()
            .await
            .wrap_err("Failed to read booking confirmation")?;
        let confirmation = serde_json::from_str::<BookingResponse>(&text)
            .map(|body| BookingConfirmation {
                reservation_id: body.rid,
                message: body.message,
            })
            .unwrap_or_default();

        Ok(confirmation)
    }
}
