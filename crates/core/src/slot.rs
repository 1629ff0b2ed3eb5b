//! Half-hour slot labels.
//!
//! A [`SlotTime`] is a wall-clock time of day stored as minutes since midnight
//! and rendered as `"HH:MM"`. Every label in a booking grid sits on a
//! 30-minute boundary; opening and closing times may be anywhere up to and
//! including `24:00`.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{BookingError, BookingResult};

/// Length of one grid cell in minutes.
pub const SLOT_MINUTES: u16 = 30;

const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(u16);

impl SlotTime {
    pub const MIDNIGHT: SlotTime = SlotTime(0);
    pub const END_OF_DAY: SlotTime = SlotTime(MINUTES_PER_DAY);

    pub(crate) const fn at(hours: u16, minutes: u16) -> Self {
        Self(hours * 60 + minutes)
    }

    /// Builds a time from hours and minutes; `24:00` is the only accepted
    /// value past `23:59`.
    pub fn from_hm(hours: u16, minutes: u16) -> BookingResult<Self> {
        if minutes >= 60 {
            return Err(BookingError::Validation(format!(
                "Invalid minutes in time: {}",
                minutes
            )));
        }
        Self::from_minutes(hours * 60 + minutes)
    }

    pub fn from_minutes(minutes: u16) -> BookingResult<Self> {
        if minutes > MINUTES_PER_DAY {
            return Err(BookingError::Validation(format!(
                "Time out of range: {} minutes after midnight",
                minutes
            )));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    pub fn is_aligned(self) -> bool {
        self.0 % SLOT_MINUTES == 0
    }

    /// Rounds down to the enclosing half-hour boundary.
    pub fn floor_to_slot(self) -> Self {
        Self(self.0 - self.0 % SLOT_MINUTES)
    }

    /// Adds minutes, returning `None` past `24:00`.
    pub fn checked_add(self, minutes: u16) -> Option<Self> {
        let total = self.0.checked_add(minutes)?;
        (total <= MINUTES_PER_DAY).then_some(Self(total))
    }

    /// Subtracts minutes, returning `None` before `00:00`.
    pub fn checked_sub(self, minutes: u16) -> Option<Self> {
        self.0.checked_sub(minutes).map(Self)
    }

    pub fn next_slot(self) -> Option<Self> {
        self.checked_add(SLOT_MINUTES)
    }

    pub fn previous_slot(self) -> Option<Self> {
        self.checked_sub(SLOT_MINUTES)
    }

    /// Iterates the half-hour labels in `[from, to)`.
    pub fn range(from: SlotTime, to: SlotTime) -> impl Iterator<Item = SlotTime> {
        (from.0..to.0)
            .step_by(SLOT_MINUTES as usize)
            .map(SlotTime)
    }

    /// The instant this label denotes on `date`. `24:00` maps to the next
    /// midnight.
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN) + chrono::Duration::minutes(i64::from(self.0))
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for SlotTime {
    type Err = BookingError;

    /// Accepts `HH:MM`, `H:MM` and `H:MM:SS`; seconds are dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BookingError::Validation(format!("Invalid time label: {:?}", s));

        let mut parts = s.trim().split(':');
        let hours = parts.next().ok_or_else(invalid)?;
        let minutes = parts.next().ok_or_else(invalid)?;
        if let Some(seconds) = parts.next() {
            seconds.parse::<u16>().map_err(|_| invalid())?;
        }
        if parts.next().is_some() || hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
            return Err(invalid());
        }

        let hours = hours.parse::<u16>().map_err(|_| invalid())?;
        let minutes = minutes.parse::<u16>().map_err(|_| invalid())?;
        Self::from_hm(hours, minutes)
    }
}

impl From<NaiveTime> for SlotTime {
    fn from(time: NaiveTime) -> Self {
        use chrono::Timelike;
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
