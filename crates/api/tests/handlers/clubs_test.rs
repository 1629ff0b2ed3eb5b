use axum::http::StatusCode;
use mockall::predicate::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use padelup_api::handlers::clubs::{ClubSummary, GridResponse, PreviewResponse};
use padelup_core::errors::BookingError;
use padelup_core::models::club::{Club, Level, Surface};
use padelup_core::models::price::Price;
use padelup_core::resolver::{DurationOption, Highlight};
use padelup_core::selection::SelectionState;

use crate::test_utils::{at, club, club_day, court, day, t, TestContext, CLUB};

fn far_club() -> Club {
    Club {
        id: "2".to_string(),
        name: "Club Sur".to_string(),
        distance_km: Some(8.0),
        hourly_rate: Some(Price::from_cents(1200)),
        level: Some(Level::Beginner),
        courts: vec![court("1", Surface::Glass, Default::default())],
        ..club()
    }
}

fn option(duration: u16, cents: u32) -> DurationOption {
    DurationOption {
        duration,
        price: Price::from_cents(cents),
    }
}

fn opened() -> SelectionState {
    SelectionState {
        court_id: "1".to_string(),
        date: day(),
        clicked_time: t("10:00"),
        forward_minutes: 60,
        backward_minutes: 60,
        options: vec![option(60, 1560), option(90, 2340), option(120, 3120)],
        selected_duration: 90,
        start_time: t("10:00"),
    }
}

#[tokio::test]
async fn test_search_sorts_by_price() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_list_clubs()
        .with(eq(day()))
        .returning(|_| Ok(vec![club(), far_club()]));
    ctx.api.expect_club_day().never();
    let server = ctx.server();

    let response = server
        .get("/api/clubs")
        .add_query_param("sort", "price")
        .add_query_param("date", "2025-06-02")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let names: Vec<String> = response
        .json::<Vec<ClubSummary>>()
        .into_iter()
        .map(|summary| summary.name)
        .collect();
    assert_eq!(names, vec!["Club Sur".to_string(), CLUB.to_string()]);
}

#[tokio::test]
async fn test_search_filters_by_name_and_surface() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_list_clubs()
        .returning(|_| Ok(vec![club(), far_club()]));
    let server = ctx.server();

    let response = server
        .get("/api/clubs")
        .add_query_param("q", "norte")
        .add_query_param("surface", "wall")
        .await;

    let summaries = response.json::<Vec<ClubSummary>>();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, CLUB);
    assert_eq!(summaries[0].surfaces, vec![Surface::Glass, Surface::Wall]);
    assert_eq!(summaries[0].bookable_times.first(), Some(&t("08:00")));
    assert_eq!(summaries[0].bookable_times.last(), Some(&t("21:30")));
}

#[tokio::test]
async fn test_search_window_reads_reservations() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_list_clubs()
        .returning(|_| Ok(vec![club(), far_club()]));
    ctx.api
        .expect_club_day()
        .with(eq(CLUB), eq(day()))
        .times(1)
        .returning(|_, _| {
            let mut booked = club();
            booked.courts[1].free = Default::default();
            Ok(club_day(booked))
        });
    ctx.api
        .expect_club_day()
        .with(eq("Club Sur"), eq(day()))
        .times(1)
        .returning(|_, _| Ok(club_day(far_club())));
    let server = ctx.server();

    // Only court "2" of the first club was free in the evening, and it is now booked
    let response = server
        .get("/api/clubs")
        .add_query_param("from", "18:00")
        .add_query_param("to", "19:00")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Vec<ClubSummary>>(), Vec::<ClubSummary>::new());
}

#[tokio::test]
async fn test_search_window_skips_unreadable_club() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_list_clubs()
        .returning(|_| Ok(vec![club(), far_club()]));
    ctx.api
        .expect_club_day()
        .with(eq(CLUB), eq(day()))
        .times(1)
        .returning(|_, _| Ok(club_day(club())));
    ctx.api
        .expect_club_day()
        .with(eq("Club Sur"), eq(day()))
        .times(1)
        .returning(|_, _| {
            Err(BookingError::SubmissionFailure(eyre::eyre!(
                "Service unavailable"
            )))
        });
    let server = ctx.server();

    let response = server
        .get("/api/clubs")
        .add_query_param("from", "18:00")
        .add_query_param("to", "19:00")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let names: Vec<String> = response
        .json::<Vec<ClubSummary>>()
        .into_iter()
        .map(|summary| summary.name)
        .collect();
    assert_eq!(names, vec![CLUB.to_string()]);
}

#[tokio::test]
async fn test_search_rejects_inverted_window() {
    let mut ctx = TestContext::new();
    ctx.api.expect_list_clubs().never();
    let server = ctx.server();

    let response = server
        .get("/api/clubs")
        .add_query_param("from", "20:00")
        .add_query_param("to", "18:00")
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommended_clubs_are_closest_first() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_list_clubs()
        .returning(|_| Ok(vec![far_club(), club()]));
    let server = ctx.server();

    let response = server
        .get("/api/clubs/recommended")
        .add_query_param("limit", "1")
        .await;

    let summaries = response.json::<Vec<ClubSummary>>();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, CLUB);
}

#[tokio::test]
async fn test_grid_marks_free_and_bookable_cells() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_club_day()
        .with(eq(CLUB), eq(day()))
        .returning(|_, _| Ok(club_day(club())));
    let server = ctx.server();

    let response = server
        .get("/api/clubs/Padel%20Norte/grid")
        .add_query_param("date", "2025-06-02")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let grid = response.json::<GridResponse>();
    assert_eq!(grid.opening, t("08:00"));
    assert_eq!(grid.closing, t("22:00"));
    assert_eq!(grid.hourly_rate, Price::from_cents(1560));
    assert_eq!(grid.rows.len(), 2);

    let first = &grid.rows[0];
    assert_eq!(first.court_id, "1");
    assert_eq!(first.cells.len(), 28);
    let cell = |label: &str| {
        first
            .cells
            .iter()
            .find(|cell| cell.time == t(label))
            .copied()
            .unwrap()
    };
    assert!(!cell("08:30").free);
    assert!(cell("10:00").free && cell("10:00").bookable);
    assert!(!cell("12:00").bookable);
}

#[tokio::test]
async fn test_grid_uses_fallback_rate() {
    let mut ctx = TestContext::new();
    ctx.api.expect_club_day().returning(|_, _| {
        Ok(club_day(Club {
            hourly_rate: None,
            ..club()
        }))
    });
    let server = ctx.server();

    let grid = server
        .get("/api/clubs/Padel%20Norte/grid")
        .await
        .json::<GridResponse>();

    assert_eq!(grid.hourly_rate, Price::from_cents(1560));
}

#[tokio::test]
async fn test_grid_unknown_club() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_club_day()
        .returning(|name, _| Err(BookingError::NotFound(format!("Club {} not found", name))));
    let server = ctx.server();

    let response = server
        .get("/api/clubs/Nadie/grid")
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preview_highlights_recommended_duration() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_club_day()
        .returning(|_, _| Ok(club_day(club())));
    let server = ctx.server();

    let response = server
        .get("/api/clubs/Padel%20Norte/preview")
        .add_query_param("date", "2025-06-02")
        .add_query_param("court", "1")
        .add_query_param("time", "10:00")
        .await;

    assert_eq!(
        response.json::<PreviewResponse>(),
        PreviewResponse {
            highlight: Some(Highlight {
                start: t("10:00"),
                end: t("11:30"),
                duration: 90,
            }),
        }
    );
}

#[tokio::test]
async fn test_preview_of_taken_cell_is_empty() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_club_day()
        .returning(|_, _| Ok(club_day(club())));
    let server = ctx.server();

    let response = server
        .get("/api/clubs/Padel%20Norte/preview")
        .add_query_param("court", "1")
        .add_query_param("time", "08:00")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<PreviewResponse>().highlight, None);
}

#[tokio::test]
async fn test_preview_unknown_court() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_club_day()
        .returning(|_, _| Ok(club_day(club())));
    let server = ctx.server();

    let response = server
        .get("/api/clubs/Padel%20Norte/preview")
        .add_query_param("court", "9")
        .add_query_param("time", "10:00")
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_open_selection() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_club_day()
        .with(eq(CLUB), eq(day()))
        .returning(|_, _| Ok(club_day(club())));
    let server = ctx.server();

    let response = server
        .post("/api/clubs/Padel%20Norte/selection")
        .json(&json!({ "date": "2025-06-02", "court_id": "1", "time": "10:00" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<SelectionState>(), opened());
}

#[tokio::test]
async fn test_open_selection_in_the_past() {
    let mut ctx = TestContext::new();
    ctx.now = at(12, 0);
    ctx.api
        .expect_club_day()
        .returning(|_, _| Ok(club_day(club())));
    let server = ctx.server();

    let response = server
        .post("/api/clubs/Padel%20Norte/selection")
        .json(&json!({ "date": "2025-06-02", "court_id": "1", "time": "10:00" }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_open_selection_on_taken_cell() {
    let mut ctx = TestContext::new();
    ctx.api
        .expect_club_day()
        .returning(|_, _| Ok(club_day(club())));
    let server = ctx.server();

    let response = server
        .post("/api/clubs/Padel%20Norte/selection")
        .json(&json!({ "date": "2025-06-02", "court_id": "1", "time": "12:00" }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_choose_longer_duration_moves_start_back() {
    let server = TestContext::new().server();

    let response = server
        .post("/api/selection/duration")
        .json(&json!({ "selection": opened(), "duration": 120 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let selection = response.json::<SelectionState>();
    assert_eq!(selection.selected_duration, 120);
    assert_eq!(selection.start_time, t("09:30"));
    assert_eq!(selection.end_time(), Some(t("11:30")));
}

#[tokio::test]
async fn test_choose_unoffered_duration() {
    let server = TestContext::new().server();

    let response = server
        .post("/api/selection/duration")
        .json(&json!({ "selection": opened(), "duration": 150 }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let message = response.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(message.contains("150"));
}

#[rstest::rstest]
#[case(31, 60)]
#[case(65520, 60)]
#[tokio::test]
async fn test_choose_duration_rejects_posted_envelope(#[case] backward: u16, #[case] forward: u16) {
    let server = TestContext::new().server();
    let mut selection = opened();
    selection.backward_minutes = backward;
    selection.forward_minutes = forward;

    let response = server
        .post("/api/selection/duration")
        .json(&json!({ "selection": selection, "duration": 60 }))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
