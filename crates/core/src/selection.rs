//! # Selection
//!
//! A click on the booking grid opens a [`SelectionState`]. Choosing another
//! duration replaces it with a new value; confirming turns it into a
//! [`BookingRequest`]; closing drops it. The envelope is captured at click
//! time and never re-scanned, so only the start time moves when the duration
//! changes.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::availability::AvailabilityIndex;
use crate::errors::{BookingError, BookingResult};
use crate::models::booking::{BookingRequest, BookingType};
use crate::models::price::Price;
use crate::resolver::{self, DurationOption, Pricing};
use crate::scanner::{is_past, Envelope};
use crate::slot::{SlotTime, SLOT_MINUTES};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub court_id: String,
    pub date: NaiveDate,
    pub clicked_time: SlotTime,
    pub forward_minutes: u16,
    pub backward_minutes: u16,
    pub options: Vec<DurationOption>,
    pub selected_duration: u16,
    pub start_time: SlotTime,
}

impl SelectionState {
    /// Opens a selection for a click on `clicked` in `court_id`.
    pub fn open(
        index: &AvailabilityIndex,
        court_id: &str,
        clicked: SlotTime,
        now: NaiveDateTime,
        pricing: Pricing,
        recommended: u16,
    ) -> BookingResult<Self> {
        let date = index.date();
        if is_past(date, clicked, now) {
            return Err(BookingError::PastSlot(clicked));
        }

        let scanner = index.scanner(court_id)?;
        let envelope = scanner
            .bookable_envelope(date, clicked, now)
            .ok_or_else(|| {
                BookingError::Validation(format!(
                    "Slot {} on court {} is not bookable",
                    clicked, court_id
                ))
            })?;

        let options = resolver::duration_options(envelope, scanner.policy(), pricing);
        let durations: Vec<u16> = options.iter().map(|option| option.duration).collect();
        let selected_duration =
            resolver::default_duration(&durations, recommended).ok_or_else(|| {
                BookingError::PolicyViolation(format!(
                    "No duration fits around {} on court {}",
                    clicked, court_id
                ))
            })?;

        debug!(
            court = %court_id,
            clicked = %clicked,
            backward = envelope.backward_minutes,
            forward = envelope.forward_minutes,
            duration = selected_duration,
            "Opened selection"
        );

        Ok(Self {
            court_id: court_id.to_string(),
            date,
            clicked_time: clicked,
            forward_minutes: envelope.forward_minutes,
            backward_minutes: envelope.backward_minutes,
            options,
            selected_duration,
            start_time: resolver::start_time(clicked, envelope, selected_duration),
        })
    }

    /// The envelope captured at click time. A state coming back from a
    /// browser may carry anything, so the envelope must be whole slots and
    /// stay inside the day around the clicked cell.
    pub fn envelope(&self) -> BookingResult<Envelope> {
        let envelope = Envelope::checked(self.backward_minutes, self.forward_minutes)?;
        let within_day = self.clicked_time.is_aligned()
            && self.clicked_time.checked_sub(envelope.backward_minutes).is_some()
            && self
                .clicked_time
                .checked_add(SLOT_MINUTES)
                .and_then(|end| end.checked_add(envelope.forward_minutes))
                .is_some();
        if !within_day {
            return Err(BookingError::Validation(format!(
                "Envelope around {} leaves the day",
                self.clicked_time
            )));
        }
        Ok(envelope)
    }

    pub fn end_time(&self) -> Option<SlotTime> {
        self.start_time.checked_add(self.selected_duration)
    }

    pub fn selected_price(&self) -> Option<Price> {
        self.options
            .iter()
            .find(|option| option.duration == self.selected_duration)
            .map(|option| option.price)
    }

    /// The same selection with another offered duration.
    pub fn with_duration(&self, duration: u16) -> BookingResult<Self> {
        let envelope = self.envelope()?;
        if !self.options.iter().any(|option| option.duration == duration) {
            return Err(BookingError::Validation(format!(
                "Duration {} minutes is not available for this slot",
                duration
            )));
        }

        Ok(Self {
            selected_duration: duration,
            start_time: resolver::start_time(self.clicked_time, envelope, duration),
            ..self.clone()
        })
    }

    /// The request sent to the booking service on confirmation.
    pub fn booking_request(&self, booking_type: BookingType) -> BookingResult<BookingRequest> {
        let envelope = self.envelope().map_err(|err| match err {
            BookingError::Validation(message) => BookingError::PolicyViolation(message),
            other => other,
        })?;
        let expected_start = resolver::start_time(self.clicked_time, envelope, self.selected_duration);
        let offered = self
            .options
            .iter()
            .any(|option| option.duration == self.selected_duration);

        if !offered
            || self.selected_duration > envelope.total()
            || self.start_time != expected_start
            || self.end_time().is_none()
        {
            return Err(BookingError::PolicyViolation(format!(
                "Selection at {} for {} minutes is inconsistent with its envelope",
                self.start_time, self.selected_duration
            )));
        }

        Ok(BookingRequest {
            court_id: self.court_id.clone(),
            date: self.date,
            start_time: self.start_time,
            duration_minutes: self.selected_duration,
            booking_type,
        })
    }
}

/// Phase of the booking interaction on one grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "data", rename_all = "snake_case")]
pub enum SlotInteraction {
    #[default]
    Unselected,
    Selected(SelectionState),
    Confirmed(BookingRequest),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SlotEvent {
    Open(SelectionState),
    ChooseDuration(u16),
    Confirm(BookingType),
    Close,
}

impl SlotInteraction {
    /// Applies one event. A click is accepted from any phase and replaces the
    /// current selection.
    pub fn apply(self, event: SlotEvent) -> BookingResult<Self> {
        match (self, event) {
            (_, SlotEvent::Open(state)) => Ok(SlotInteraction::Selected(state)),
            (SlotInteraction::Selected(state), SlotEvent::ChooseDuration(duration)) => {
                Ok(SlotInteraction::Selected(state.with_duration(duration)?))
            }
            (SlotInteraction::Selected(state), SlotEvent::Confirm(booking_type)) => Ok(
                SlotInteraction::Confirmed(state.booking_request(booking_type)?),
            ),
            (SlotInteraction::Selected(_), SlotEvent::Close) => Ok(SlotInteraction::Closed),
            (phase, event) => Err(BookingError::Validation(format!(
                "Cannot apply {:?} while {}",
                event,
                phase.name()
            ))),
        }
    }

    pub fn selection(&self) -> Option<&SelectionState> {
        match self {
            SlotInteraction::Selected(state) => Some(state),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SlotInteraction::Unselected => "unselected",
            SlotInteraction::Selected(_) => "selected",
            SlotInteraction::Confirmed(_) => "confirmed",
            SlotInteraction::Closed => "closed",
        }
    }
}
