use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use mockall::predicate::*;
use pretty_assertions::assert_eq;
use serde_json::json;

use padelup_api::handlers::booking::BookingResponse;
use padelup_client::SessionStore;
use padelup_core::availability::AvailabilityIndex;
use padelup_core::errors::BookingError;
use padelup_core::models::account::Session;
use padelup_core::models::booking::{BookingConfirmation, BookingRequest, BookingType};
use padelup_core::models::price::Price;
use padelup_core::resolver::Pricing;
use padelup_core::selection::SelectionState;

use crate::test_utils::{
    at, club, club_day, day, profile, session, t, TestContext, CLUB, TOKEN,
};

fn bearer() -> HeaderValue {
    HeaderValue::from_static("Bearer jwt-token")
}

fn selection(duration: u16) -> SelectionState {
    let index = AvailabilityIndex::from_club(&club(), day());
    SelectionState::open(
        &index,
        "1",
        t("10:00"),
        at(7, 0),
        Pricing::new(Price::from_cents(1560)),
        90,
    )
    .unwrap()
    .with_duration(duration)
    .unwrap()
}

fn expected_booking(booking_type: BookingType) -> BookingRequest {
    BookingRequest {
        court_id: "1".to_string(),
        date: day(),
        start_time: t("10:00"),
        duration_minutes: 90,
        booking_type,
    }
}

fn confirmation() -> BookingConfirmation {
    BookingConfirmation {
        reservation_id: Some(42),
        message: Some("Reserva creada".to_string()),
    }
}

#[tokio::test]
async fn test_confirm_submits_booking() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_club_day()
        .with(eq(CLUB), eq(day()))
        .times(1)
        .returning(|_, _| Ok(club_day(club())));
    ctx.api
        .expect_profile()
        .with(eq(TOKEN))
        .times(1)
        .returning(|_| Ok(profile()));
    ctx.api
        .expect_submit_booking()
        .with(
            eq(Session {
                token: TOKEN.to_string(),
                user: profile(),
            }),
            eq(expected_booking(BookingType::Complete)),
        )
        .times(1)
        .returning(|_, _| Ok(confirmation()));
    let server = ctx.server();

    let response = server
        .post("/api/bookings")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({
            "club": CLUB,
            "selection": selection(90),
            "booking_type": "complete"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<BookingResponse>(),
        BookingResponse {
            booking: expected_booking(BookingType::Complete),
            confirmation: confirmation(),
            price: Price::from_cents(2340),
            charged: Price::from_cents(2340),
        }
    );
}

#[tokio::test]
async fn test_open_match_charges_one_share() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_club_day()
        .returning(|_, _| Ok(club_day(club())));
    ctx.api.expect_profile().returning(|_| Ok(profile()));
    ctx.api
        .expect_submit_booking()
        .returning(|_, _| Ok(BookingConfirmation::default()));
    let server = ctx.server();

    let response = server
        .post("/api/bookings")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({
            "club": CLUB,
            "selection": selection(90),
            "booking_type": "open_match"
        }))
        .await;

    let body = response.json::<BookingResponse>();
    assert_eq!(body.booking.booking_type, BookingType::OpenMatch);
    assert_eq!(body.price, Price::from_cents(2340));
    assert_eq!(body.charged, Price::from_cents(585));
}

#[tokio::test]
async fn test_confirm_requires_token() {
    let mut ctx = TestContext::new();
    ctx.api.expect_club_day().never();
    ctx.api.expect_submit_booking().never();
    let server = ctx.server();

    let response = server
        .post("/api/bookings")
        .json(&json!({
            "club": CLUB,
            "selection": selection(90),
            "booking_type": "complete"
        }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tampered_selection_is_rejected() {
    let mut ctx = TestContext::new();
    ctx.api.expect_club_day().never();
    ctx.api.expect_submit_booking().never();
    let server = ctx.server();

    let mut tampered = selection(90);
    tampered.start_time = t("09:00");

    let response = server
        .post("/api/bookings")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({
            "club": CLUB,
            "selection": tampered,
            "booking_type": "complete"
        }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_clicked_slot_taken_since_grid_load() {
    let mut ctx = TestContext::new();
    ctx.api.expect_club_day().returning(|_, _| {
        let mut taken = club();
        taken.courts[0].free = [t("09:00"), t("09:30")].into_iter().collect();
        Ok(club_day(taken))
    });
    ctx.api.expect_submit_booking().never();
    let server = ctx.server();

    let response = server
        .post("/api/bookings")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({
            "club": CLUB,
            "selection": selection(90),
            "booking_type": "complete"
        }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_shrunk_envelope_would_move_start() {
    let mut ctx = TestContext::new();
    ctx.api.expect_club_day().returning(|_, _| {
        // 11:00 was booked by someone else, 90 minutes now have to start at 09:30
        let mut shrunk = club();
        shrunk.courts[0].free = [t("09:00"), t("09:30"), t("10:00"), t("10:30")]
            .into_iter()
            .collect();
        Ok(club_day(shrunk))
    });
    ctx.api.expect_submit_booking().never();
    let server = ctx.server();

    let response = server
        .post("/api/bookings")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({
            "club": CLUB,
            "selection": selection(90),
            "booking_type": "complete"
        }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_service_conflict_is_reported() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_club_day()
        .returning(|_, _| Ok(club_day(club())));
    ctx.api.expect_profile().returning(|_| Ok(profile()));
    ctx.api.expect_submit_booking().times(1).returning(|_, _| {
        Err(BookingError::SubmissionConflict(
            "La pista ya está reservada".to_string(),
        ))
    });
    let server = ctx.server();

    let response = server
        .post("/api/bookings")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({
            "club": CLUB,
            "selection": selection(120),
            "booking_type": "complete"
        }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_service_failure_is_bad_gateway() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_club_day()
        .returning(|_, _| Ok(club_day(club())));
    ctx.api.expect_profile().returning(|_| Ok(profile()));
    ctx.api
        .expect_submit_booking()
        .times(1)
        .returning(|_, _| Err(BookingError::SubmissionFailure(eyre::eyre!("timed out"))));
    let server = ctx.server();

    let response = server
        .post("/api/bookings")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({
            "club": CLUB,
            "selection": selection(90),
            "booking_type": "complete"
        }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_expired_token_stops_before_submission() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_club_day()
        .returning(|_, _| Ok(club_day(club())));
    ctx.api
        .expect_profile()
        .returning(|_| Err(BookingError::Authentication("Token expired".to_string())));
    ctx.api.expect_submit_booking().never();
    let server = ctx.server();

    let response = server
        .post("/api/bookings")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({
            "club": CLUB,
            "selection": selection(90),
            "booking_type": "complete"
        }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[rstest::rstest]
#[case(31, 60)]
#[case(65520, 60)]
#[tokio::test]
async fn test_posted_envelope_is_rejected(#[case] backward: u16, #[case] forward: u16) {
    let mut ctx = TestContext::new();
    ctx.api.expect_club_day().never();
    ctx.api.expect_submit_booking().never();
    let server = ctx.server();

    let mut tampered = selection(90);
    tampered.backward_minutes = backward;
    tampered.forward_minutes = forward;

    let response = server
        .post("/api/bookings")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({
            "club": CLUB,
            "selection": tampered,
            "booking_type": "complete"
        }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_confirm_with_stored_session() {
    let mut ctx = TestContext::new();
    ctx.sessions.set(session()).unwrap();
    ctx.api
        .expect_club_day()
        .returning(|_, _| Ok(club_day(club())));
    ctx.api.expect_profile().never();
    ctx.api
        .expect_submit_booking()
        .with(eq(session()), eq(expected_booking(BookingType::Complete)))
        .times(1)
        .returning(|_, _| Ok(confirmation()));
    let server = ctx.server();

    let response = server
        .post("/api/bookings")
        .json(&json!({
            "club": CLUB,
            "selection": selection(90),
            "booking_type": "complete"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<BookingResponse>().confirmation, confirmation());
}

#[tokio::test]
async fn test_rejected_stored_session_is_forgotten() {
    let mut ctx = TestContext::new();
    ctx.sessions.set(session()).unwrap();
    ctx.api
        .expect_club_day()
        .returning(|_, _| Ok(club_day(club())));
    ctx.api
        .expect_submit_booking()
        .times(1)
        .returning(|_, _| Err(BookingError::Authentication("Token expired".to_string())));
    let sessions = ctx.sessions.clone();
    let server = ctx.server();

    let response = server
        .post("/api/bookings")
        .json(&json!({
            "club": CLUB,
            "selection": selection(90),
            "booking_type": "complete"
        }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(sessions.get(), None);
}
