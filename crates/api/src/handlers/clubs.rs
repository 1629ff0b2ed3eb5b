//! # Club Handlers
//!
//! Club search, the per-club booking grid, hover previews and slot clicks.
//!
//! Every request reads a fresh copy of the club from the booking service and
//! builds its own availability snapshot, so the grid, the preview and the
//! selection agree on what is free at the moment they are computed.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use padelup_core::{
    availability::AvailabilityIndex,
    browse::{self, ClubFilter, GridRow, SortBy},
    errors::{BookingError, BookingResult},
    models::{
        club::{BookingPolicy, Club, Level, Surface},
        price::Price,
    },
    resolver::{self, Highlight, Pricing},
    selection::{SelectionState, SlotEvent, SlotInteraction},
    slot::SlotTime,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{middleware::error_handling::AppError, ApiState};

/// Number of clubs shown as recommendations by default
pub const DEFAULT_RECOMMENDED_CLUBS: usize = 3;

/// Query parameters for the club search endpoint
///
/// `from` and `to` bound an inclusive window in which a club must still have
/// a free half hour; either bound may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct ClubSearchQuery {
    pub q: Option<String>,
    pub surface: Option<Surface>,
    pub from: Option<SlotTime>,
    pub to: Option<SlotTime>,
    pub sort: Option<SortBy>,
    pub level: Option<Level>,
    pub date: Option<NaiveDate>,
}

impl ClubSearchQuery {
    fn filter(&self) -> BookingResult<ClubFilter> {
        let window = match (self.from, self.to) {
            (None, None) => None,
            (from, to) => {
                let from = from.unwrap_or(SlotTime::MIDNIGHT);
                let to = to.unwrap_or(SlotTime::END_OF_DAY);
                if from > to {
                    return Err(BookingError::Validation(format!(
                        "Time window start {} is after its end {}",
                        from, to
                    )));
                }
                Some((from, to))
            }
        };

        Ok(ClubFilter {
            query: self.q.clone(),
            surface: self.surface,
            window,
            sort: self.sort.unwrap_or_default(),
            user_level: self.level,
        })
    }
}

/// A club as listed on the search page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubSummary {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub distance_km: Option<f64>,
    pub hourly_rate: Option<Price>,
    pub level: Option<Level>,
    pub surfaces: Vec<Surface>,
    /// Times at which at least one court can be booked
    pub bookable_times: Vec<SlotTime>,
}

impl ClubSummary {
    fn new(club: &Club, date: NaiveDate, state: &ApiState) -> Self {
        let mut surfaces: Vec<Surface> = Vec::new();
        for court in &club.courts {
            if !surfaces.contains(&court.surface) {
                surfaces.push(court.surface);
            }
        }

        Self {
            id: club.id.clone(),
            name: club.name.clone(),
            location: club.location.clone(),
            distance_km: club.distance_km,
            hourly_rate: club.hourly_rate,
            level: club.level,
            surfaces,
            bookable_times: browse::bookable_start_times(club, date, state.now()),
        }
    }
}

fn date_or_today(date: Option<NaiveDate>, state: &ApiState) -> NaiveDate {
    date.unwrap_or_else(|| state.now().date())
}

/// Searches clubs
///
/// # Endpoint
///
/// ```text
/// GET /api/clubs?q=norte&surface=glass&from=18:00&to=20:00&sort=price&level=intermediate&date=2025-06-02
/// ```
///
/// When a time window is given, each club's reservations for the date are
/// read so the window is checked against real availability. A club whose
/// day cannot be read is left out of the results.
#[axum::debug_handler]
pub async fn search_clubs(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ClubSearchQuery>,
) -> Result<Json<Vec<ClubSummary>>, AppError> {
    let filter = query.filter()?;
    let date = date_or_today(query.date, &state);

    let mut clubs = state.api.list_clubs(date).await?;
    if filter.window.is_some() {
        let mut with_reservations = Vec::with_capacity(clubs.len());
        for club in &clubs {
            match state.api.club_day(&club.name, date).await {
                Ok(day) => with_reservations.push(day.club),
                Err(err) => {
                    warn!(
                        club = %club.name,
                        %date,
                        error = %err,
                        "Skipping club without a readable day"
                    );
                }
            }
        }
        clubs = with_reservations;
    }

    let summaries = browse::filter_clubs(&clubs, &filter)
        .into_iter()
        .map(|club| ClubSummary::new(club, date, &state))
        .collect::<Vec<_>>();

    debug!(total = clubs.len(), matching = summaries.len(), "Club search");
    Ok(Json(summaries))
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendedQuery {
    pub limit: Option<usize>,
    pub date: Option<NaiveDate>,
}

/// Closest clubs, for the home page
///
/// # Endpoint
///
/// ```text
/// GET /api/clubs/recommended?limit=3
/// ```
#[axum::debug_handler]
pub async fn recommended_clubs(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<RecommendedQuery>,
) -> Result<Json<Vec<ClubSummary>>, AppError> {
    let date = date_or_today(query.date, &state);
    let clubs = state.api.list_clubs(date).await?;
    let limit = query.limit.unwrap_or(DEFAULT_RECOMMENDED_CLUBS);

    let summaries = browse::recommended_clubs(&clubs, limit)
        .into_iter()
        .map(|club| ClubSummary::new(club, date, &state))
        .collect();

    Ok(Json(summaries))
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

/// Everything the booking grid page needs for one club and date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridResponse {
    pub club: String,
    pub date: NaiveDate,
    pub opening: SlotTime,
    pub closing: SlotTime,
    pub policy: BookingPolicy,
    /// Rate used for every price on this grid
    pub hourly_rate: Price,
    pub rows: Vec<GridRow>,
}

/// Booking grid of a club
///
/// # Endpoint
///
/// ```text
/// GET /api/clubs/:name/grid?date=2025-06-02
/// ```
#[axum::debug_handler]
pub async fn club_grid(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<GridResponse>, AppError> {
    let date = date_or_today(query.date, &state);
    let day = state.api.club_day(&name, date).await?;
    let hours = day.club.hours_on(date);

    Ok(Json(GridResponse {
        club: day.club.name.clone(),
        date,
        opening: hours.opening,
        closing: hours.closing,
        policy: day.club.policy,
        hourly_rate: Pricing::for_club(&day.club, state.fallback_hourly_rate).hourly_rate,
        rows: browse::day_grid(&day.club, date, state.now()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub date: Option<NaiveDate>,
    pub court: String,
    pub time: SlotTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    /// Cells the recommended booking would cover, absent when the slot is not bookable
    pub highlight: Option<Highlight>,
}

/// Hover preview for a grid cell
///
/// # Endpoint
///
/// ```text
/// GET /api/clubs/:name/preview?date=2025-06-02&court=1&time=18:30
/// ```
#[axum::debug_handler]
pub async fn preview_slot(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<PreviewResponse>, AppError> {
    let date = date_or_today(query.date, &state);
    let day = state.api.club_day(&name, date).await?;
    let index = AvailabilityIndex::from_club_day(&day);
    let scanner = index.scanner(&query.court)?;

    let highlight = resolver::preview(
        &scanner,
        date,
        query.time,
        state.now(),
        state.recommended_duration,
    );

    Ok(Json(PreviewResponse { highlight }))
}

/// Request body for opening a selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenSelectionRequest {
    pub date: Option<NaiveDate>,
    pub court_id: String,
    pub time: SlotTime,
}

/// Opens a selection for a clicked cell
///
/// # Endpoint
///
/// ```text
/// POST /api/clubs/:name/selection
/// ```
///
/// # Responses
///
/// * `200 OK` - The selection with its duration options and preselected duration
/// * `400 Bad Request` - The slot cannot be booked
/// * `404 Not Found` - Unknown club or court
/// * `422 Unprocessable Entity` - The slot is in the past
#[axum::debug_handler]
pub async fn open_selection(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    Json(payload): Json<OpenSelectionRequest>,
) -> Result<Json<SelectionState>, AppError> {
    let date = date_or_today(payload.date, &state);
    let day = state.api.club_day(&name, date).await?;
    let index = AvailabilityIndex::from_club_day(&day);

    let selection = SelectionState::open(
        &index,
        &payload.court_id,
        payload.time,
        state.now(),
        Pricing::for_club(&day.club, state.fallback_hourly_rate),
        state.recommended_duration,
    )?;

    match SlotInteraction::default().apply(SlotEvent::Open(selection))? {
        SlotInteraction::Selected(selection) => Ok(Json(selection)),
        other => Err(AppError(BookingError::PolicyViolation(format!(
            "Opening a selection ended in {:?}",
            other
        )))),
    }
}

/// Request body for choosing another duration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChooseDurationRequest {
    pub selection: SelectionState,
    pub duration: u16,
}

/// Replaces the selected duration, moving only the start time
///
/// # Endpoint
///
/// ```text
/// POST /api/selection/duration
/// ```
#[axum::debug_handler]
pub async fn choose_duration(
    Json(payload): Json<ChooseDurationRequest>,
) -> Result<Json<SelectionState>, AppError> {
    let phase = SlotInteraction::Selected(payload.selection)
        .apply(SlotEvent::ChooseDuration(payload.duration))?;

    match phase {
        SlotInteraction::Selected(selection) => Ok(Json(selection)),
        other => Err(AppError(BookingError::PolicyViolation(format!(
            "Choosing a duration ended in {:?}",
            other
        )))),
    }
}
