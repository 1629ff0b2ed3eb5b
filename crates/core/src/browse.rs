//! Club search and the per-club booking grid.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityIndex;
use crate::models::club::{Club, Level, Surface};
use crate::slot::SlotTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Distance,
    Price,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubFilter {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub surface: Option<Surface>,
    /// Inclusive window `[from, to]` in which a club needs a free label.
    #[serde(default)]
    pub window: Option<(SlotTime, SlotTime)>,
    #[serde(default)]
    pub sort: SortBy,
    #[serde(default)]
    pub user_level: Option<Level>,
}

impl ClubFilter {
    pub fn matches(&self, club: &Club) -> bool {
        if let Some(query) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            if !club.name.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }
        if let Some(surface) = self.surface {
            if !club.has_surface(surface) {
                return false;
            }
        }
        if let Some((from, to)) = self.window {
            let open_in_window = club
                .courts
                .iter()
                .any(|court| court.free.within(from, to).next().is_some());
            if !open_in_window {
                return false;
            }
        }
        true
    }

    fn compare(&self, a: &Club, b: &Club) -> Ordering {
        let by_level = match self.user_level {
            Some(user) => level_gap(a, user).cmp(&level_gap(b, user)),
            None => Ordering::Equal,
        };

        by_level.then_with(|| match self.sort {
            SortBy::Distance => compare_distance(a, b),
            SortBy::Price => a
                .hourly_rate
                .map_or(u32::MAX, |price| price.cents())
                .cmp(&b.hourly_rate.map_or(u32::MAX, |price| price.cents())),
        })
    }
}

/// Clubs without a level sort after every club with one.
fn level_gap(club: &Club, user: Level) -> u8 {
    club.level.map_or(u8::MAX, |level| level.distance(user))
}

fn compare_distance(a: &Club, b: &Club) -> Ordering {
    let a = a.distance_km.unwrap_or(f64::INFINITY);
    let b = b.distance_km.unwrap_or(f64::INFINITY);
    a.total_cmp(&b)
}

/// Clubs matching `filter`, best first.
pub fn filter_clubs<'a>(clubs: &'a [Club], filter: &ClubFilter) -> Vec<&'a Club> {
    let mut matching: Vec<&Club> = clubs.iter().filter(|club| filter.matches(club)).collect();
    matching.sort_by(|a, b| filter.compare(a, b));
    matching
}

/// The `n` closest clubs.
pub fn recommended_clubs(clubs: &[Club], n: usize) -> Vec<&Club> {
    let mut closest: Vec<&Club> = clubs.iter().collect();
    closest.sort_by(|a, b| compare_distance(a, b));
    closest.truncate(n);
    closest
}

/// Every time at which some court of `club` can be booked on `date`.
pub fn bookable_start_times(club: &Club, date: NaiveDate, now: NaiveDateTime) -> Vec<SlotTime> {
    let index = AvailabilityIndex::from_club(club, date);
    let times: BTreeSet<SlotTime> = index
        .court_ids()
        .filter_map(|court_id| index.scanner(court_id).ok())
        .flat_map(|scanner| scanner.bookable_slots(date, now))
        .collect();
    times.into_iter().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub time: SlotTime,
    pub free: bool,
    pub bookable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRow {
    pub court_id: String,
    pub court_name: String,
    pub surface: Surface,
    pub cells: Vec<GridCell>,
}

/// One row per court with every half-hour cell between opening and closing.
pub fn day_grid(club: &Club, date: NaiveDate, now: NaiveDateTime) -> Vec<GridRow> {
    let index = AvailabilityIndex::from_club(club, date);
    let hours = index.hours();

    let rows = club
        .courts
        .iter()
        .filter_map(|court| {
            let scanner = index.scanner(&court.id).ok()?;
            let cells = hours
                .slots()
                .map(|time| GridCell {
                    time,
                    free: scanner.is_free(time),
                    bookable: scanner.check_bookability(date, time, now),
                })
                .collect();
            Some(GridRow {
                court_id: court.id.clone(),
                court_name: court.name.clone(),
                surface: court.surface,
                cells,
            })
        })
        .collect();
    rows
}
