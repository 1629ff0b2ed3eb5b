use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::price::Price;
use crate::slot::SlotTime;

/// Players sharing a court in an open match.
pub const OPEN_MATCH_PLAYERS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    /// The booker reserves the whole court and pays for it.
    Complete,
    /// The booker opens the court to other players and pays one seat.
    OpenMatch,
}

impl BookingType {
    /// What the booker pays at submission for a court costing `court_price`.
    pub fn charge(self, court_price: Price) -> Price {
        match self {
            BookingType::Complete => court_price,
            BookingType::OpenMatch => court_price.share(OPEN_MATCH_PLAYERS),
        }
    }
}

/// What is sent to the booking service once a selection is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub court_id: String,
    pub date: NaiveDate,
    pub start_time: SlotTime,
    pub duration_minutes: u16,
    pub booking_type: BookingType,
}

impl BookingRequest {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.start_time.on(self.date)
    }

    pub fn end_time(&self) -> Option<SlotTime> {
        self.start_time.checked_add(self.duration_minutes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub reservation_id: Option<u64>,
    pub message: Option<String>,
}
