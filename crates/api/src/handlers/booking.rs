//! # Booking Handler
//!
//! Confirms a selection and submits it to the booking service.
//!
//! The selection posted by the browser is never trusted on its own: the club
//! is read again and the selection is rebuilt from the clicked cell, so a
//! slot taken since the grid was loaded is answered with `409 Conflict`.
//!
//! The booking is made for the bearer token's owner, or for the stored
//! session when the request carries no token.

use axum::{extract::State, Json};
use padelup_core::{
    availability::AvailabilityIndex,
    errors::BookingError,
    models::{
        booking::{BookingConfirmation, BookingRequest, BookingType},
        price::Price,
    },
    resolver::Pricing,
    selection::{SelectionState, SlotEvent, SlotInteraction},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    middleware::{
        auth::{BearerToken, Caller},
        error_handling::AppError,
    },
    ApiState,
};

/// Request body for confirming a booking
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfirmBookingRequest {
    /// Club name as used in the club's URL
    pub club: String,
    pub selection: SelectionState,
    pub booking_type: BookingType,
}

/// Response for a submitted booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingResponse {
    pub booking: BookingRequest,
    pub confirmation: BookingConfirmation,
    /// Price of the court for the booked duration
    pub price: Price,
    /// What the booker pays for this booking type
    pub charged: Price,
}

fn stale(err: BookingError) -> BookingError {
    match err {
        BookingError::Validation(message) | BookingError::PolicyViolation(message) => {
            BookingError::SubmissionConflict(message)
        }
        other => other,
    }
}

/// Confirms a selection and submits the booking
///
/// # Endpoint
///
/// ```text
/// POST /api/bookings
/// Authorization: Bearer <token>
/// ```
///
/// # Request Body
///
/// ```json
/// {
///   "club": "Padel Norte",
///   "selection": { "court_id": "1", "date": "2025-06-02", "clicked_time": "10:00", ... },
///   "booking_type": "complete"
/// }
/// ```
///
/// # Responses
///
/// * `200 OK` - Booking accepted by the booking service
/// * `401 Unauthorized` - No token and no stored session, or the token was rejected
/// * `409 Conflict` - The slot is no longer available; reload the grid
/// * `422 Unprocessable Entity` - The slot is in the past or the selection was altered
/// * `502 Bad Gateway` - The booking service failed
#[axum::debug_handler]
pub async fn confirm_booking(
    State(state): State<Arc<ApiState>>,
    bearer: Option<BearerToken>,
    Json(payload): Json<ConfirmBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let caller = Caller::resolve(bearer, &state.sessions)?;
    let posted = payload.selection;
    let now = state.now();

    // Reject altered selections before touching the booking service
    posted.booking_request(payload.booking_type)?;

    let day = state.api.club_day(&payload.club, posted.date).await?;
    let index = AvailabilityIndex::from_club_day(&day);
    let pricing = Pricing::for_club(&day.club, state.fallback_hourly_rate);

    let fresh = SelectionState::open(
        &index,
        &posted.court_id,
        posted.clicked_time,
        now,
        pricing,
        state.recommended_duration,
    )
    .map_err(stale)?;

    let phase = SlotInteraction::default()
        .apply(SlotEvent::Open(fresh))
        .and_then(|phase| phase.apply(SlotEvent::ChooseDuration(posted.selected_duration)))
        .map_err(stale)?;

    let price = phase
        .selection()
        .and_then(SelectionState::selected_price)
        .ok_or_else(|| {
            BookingError::PolicyViolation("Selection has no price for its duration".to_string())
        })?;

    let booking = match phase.apply(SlotEvent::Confirm(payload.booking_type))? {
        SlotInteraction::Confirmed(booking) => booking,
        other => {
            return Err(AppError(BookingError::PolicyViolation(format!(
                "Confirming a selection ended in {:?}",
                other
            ))))
        }
    };

    if booking.start_time != posted.start_time {
        return Err(AppError(BookingError::SubmissionConflict(format!(
            "Availability around {} changed, the booking would now start at {}",
            posted.clicked_time, booking.start_time
        ))));
    }

    let session = caller.session(state.api.as_ref()).await?;

    let confirmation = match state.sessions.submit_as(&session, &booking).await {
        Ok(confirmation) => confirmation,
        Err(err) => {
            warn!(
                club = %payload.club,
                court = %booking.court_id,
                start = %booking.starts_at(),
                error = %err,
                "Booking submission failed"
            );
            return Err(AppError(err));
        }
    };

    let charged = booking.booking_type.charge(price);
    info!(
        club = %payload.club,
        court = %booking.court_id,
        start = %booking.starts_at(),
        duration = booking.duration_minutes,
        user = %session.user.username,
        "Booking submitted"
    );

    Ok(Json(BookingResponse {
        booking,
        confirmation,
        price,
        charged,
    }))
}
