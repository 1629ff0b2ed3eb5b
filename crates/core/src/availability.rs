//! # Availability Index
//!
//! Derives, per court and date, the half-hour cells that are still free. A cell
//! `[t, t + 30)` is taken when it overlaps any existing reservation, so a
//! reservation that is shorter than a cell or starts off the grid still blocks
//! every cell it touches.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{BookingError, BookingResult};
use crate::models::club::{BookingPolicy, Club, ClubDay, DayHours, Reservation};
use crate::scanner::Scanner;
use crate::slot::SlotTime;

/// Ordered set of free half-hour labels for one court on one date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FreeSet(BTreeSet<SlotTime>);

impl FreeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, slot: SlotTime) -> bool {
        self.0.contains(&slot)
    }

    pub fn insert(&mut self, slot: SlotTime) -> bool {
        self.0.insert(slot)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SlotTime> + '_ {
        self.0.iter().copied()
    }

    /// Labels in the inclusive window `[from, to]`.
    pub fn within(&self, from: SlotTime, to: SlotTime) -> impl Iterator<Item = SlotTime> + '_ {
        self.0.range(from..=to).copied()
    }
}

impl FromIterator<SlotTime> for FreeSet {
    fn from_iter<I: IntoIterator<Item = SlotTime>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Free cells between opening and closing that no reservation overlaps.
pub fn free_slots(hours: DayHours, reservations: &[Reservation]) -> FreeSet {
    hours
        .slots()
        .filter(|slot| !reservations.iter().any(|r| r.blocks(*slot)))
        .collect()
}

/// Immutable snapshot of every court's free set for one club and date.
///
/// Clicks, hovers and bookability checks all read from the same snapshot; a
/// fresh one is built whenever the directory is re-read.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityIndex {
    date: NaiveDate,
    hours: DayHours,
    policy: BookingPolicy,
    courts: BTreeMap<String, FreeSet>,
}

impl AvailabilityIndex {
    /// Builds the index from raw reservations per court.
    pub fn build<I>(date: NaiveDate, hours: DayHours, policy: BookingPolicy, courts: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<Reservation>)>,
    {
        let courts = courts
            .into_iter()
            .map(|(court_id, reservations)| {
                let free = free_slots(hours, &reservations);
                debug!(
                    court = %court_id,
                    reservations = reservations.len(),
                    free = free.len(),
                    "Indexed court availability"
                );
                (court_id, free)
            })
            .collect();

        Self {
            date,
            hours,
            policy,
            courts,
        }
    }

    /// Snapshot of a club whose courts already carry their free sets.
    pub fn from_club(club: &Club, date: NaiveDate) -> Self {
        Self {
            date,
            hours: club.hours_on(date),
            policy: club.policy,
            courts: club
                .courts
                .iter()
                .map(|court| (court.id.clone(), court.free.clone()))
                .collect(),
        }
    }

    pub fn from_club_day(day: &ClubDay) -> Self {
        Self::from_club(&day.club, day.date)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn hours(&self) -> DayHours {
        self.hours
    }

    pub fn policy(&self) -> BookingPolicy {
        self.policy
    }

    pub fn court_ids(&self) -> impl Iterator<Item = &str> {
        self.courts.keys().map(String::as_str)
    }

    pub fn free_set(&self, court_id: &str) -> BookingResult<&FreeSet> {
        self.courts
            .get(court_id)
            .ok_or_else(|| BookingError::NotFound(format!("Court {} not found", court_id)))
    }

    /// The contiguity scanner for one court of this snapshot.
    pub fn scanner(&self, court_id: &str) -> BookingResult<Scanner<'_>> {
        Ok(Scanner::new(self.free_set(court_id)?, self.policy, self.hours))
    }
}
