//! # Duration Resolver
//!
//! Turns the envelope around a clicked slot into the durations a player may
//! choose, what each costs, and where the booking actually starts. Forward
//! time after the clicked slot is always used before any time before it.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::club::{BookingPolicy, Club};
use crate::models::price::Price;
use crate::scanner::{Envelope, Scanner};
use crate::slot::{SlotTime, SLOT_MINUTES};

/// Hourly court rate used to price each duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub hourly_rate: Price,
}

impl Pricing {
    pub fn new(hourly_rate: Price) -> Self {
        Self { hourly_rate }
    }

    /// The club's own rate, or `fallback` when the club does not publish one.
    pub fn for_club(club: &Club, fallback: Price) -> Self {
        Self::new(club.hourly_rate.unwrap_or(fallback))
    }

    pub fn price_for(&self, minutes: u16) -> Price {
        self.hourly_rate.for_minutes(minutes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationOption {
    pub duration: u16,
    pub price: Price,
}

/// Policy durations that fit in the envelope, ascending.
pub fn valid_durations(envelope: Envelope, policy: BookingPolicy) -> Vec<u16> {
    let available = envelope.total();
    (policy.min_duration..=policy.max_duration)
        .step_by(SLOT_MINUTES as usize)
        .take_while(|duration| *duration <= available)
        .collect()
}

pub fn duration_options(
    envelope: Envelope,
    policy: BookingPolicy,
    pricing: Pricing,
) -> Vec<DurationOption> {
    valid_durations(envelope, policy)
        .into_iter()
        .map(|duration| DurationOption {
            duration,
            price: pricing.price_for(duration),
        })
        .collect()
}

/// How a duration is split around the clicked slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub forward_minutes: u16,
    pub backward_minutes: u16,
}

pub fn allocate(envelope: Envelope, duration: u16) -> Allocation {
    let extra = duration.saturating_sub(SLOT_MINUTES);
    let forward_minutes = envelope.forward_minutes.min(extra);
    let remaining = extra - forward_minutes;
    let backward_minutes = if remaining > 0 {
        envelope.backward_minutes.min(remaining)
    } else {
        0
    };

    debug_assert!(
        forward_minutes + backward_minutes + SLOT_MINUTES >= duration
            || duration > envelope.total(),
        "allocation must cover the duration when it fits the envelope"
    );

    Allocation {
        forward_minutes,
        backward_minutes,
    }
}

/// Where a booking of `duration` starts when the player clicked `clicked`.
pub fn start_time(clicked: SlotTime, envelope: Envelope, duration: u16) -> SlotTime {
    let allocation = allocate(envelope, duration);
    let start = clicked.checked_sub(allocation.backward_minutes);
    debug_assert!(start.is_some(), "backward scan never crosses midnight");
    start.unwrap_or(SlotTime::MIDNIGHT)
}

/// The recommended duration when offered, else the shortest option.
pub fn default_duration(options: &[u16], recommended: u16) -> Option<u16> {
    if options.contains(&recommended) {
        Some(recommended)
    } else {
        options.iter().min().copied()
    }
}

/// Range a hover highlights: the cells the default duration would occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub start: SlotTime,
    pub end: SlotTime,
    pub duration: u16,
}

pub fn preview(
    scanner: &Scanner<'_>,
    date: NaiveDate,
    slot: SlotTime,
    now: NaiveDateTime,
    recommended: u16,
) -> Option<Highlight> {
    let envelope = scanner.bookable_envelope(date, slot, now)?;
    let durations = valid_durations(envelope, scanner.policy());
    let duration = default_duration(&durations, recommended)?;
    let start = start_time(slot, envelope, duration);
    let end = start.checked_add(duration)?;

    Some(Highlight {
        start,
        end,
        duration,
    })
}
