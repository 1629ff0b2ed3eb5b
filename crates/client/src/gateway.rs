use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;

use padelup_core::errors::BookingResult;
use padelup_core::models::{
    account::{LoginRequest, RegisterRequest, Session, UserProfile},
    booking::{BookingConfirmation, BookingRequest},
    club::{Club, ClubDay},
};

/// Operations offered by the external booking service.
///
/// Every call is a single request. Failures are reported, never retried.
#[automock]
#[async_trait]
pub trait PadelApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> BookingResult<()>;

    async fn login(&self, request: &LoginRequest) -> BookingResult<Session>;

    async fn profile(&self, token: &str) -> BookingResult<UserProfile>;

    /// Every club, with court free sets derived from opening hours on `date`.
    async fn list_clubs(&self, date: NaiveDate) -> BookingResult<Vec<Club>>;

    /// One club with the reservations already made on `date`.
    async fn club_day(&self, name: &str, date: NaiveDate) -> BookingResult<ClubDay>;

    async fn submit_booking(
        &self,
        session: &Session,
        request: &BookingRequest,
    ) -> BookingResult<BookingConfirmation>;
}
