//! # Contiguity Scanner
//!
//! Measures how much free time surrounds a slot. The same scanner answers
//! clicks, hover previews and the bookability check, so the grid never offers
//! a slot that the booking math would then refuse.
//!
//! Each direction is capped at `max_duration - 30`. Scanning backward stops at
//! the first taken cell or at opening time; scanning forward stops at the first
//! taken cell or when the next cell would end after closing time, whether or
//! not that cell is listed as free. For booking, backward time that has
//! already begun is dropped, so a booking never starts before now.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::availability::FreeSet;
use crate::errors::{BookingError, BookingResult};
use crate::models::club::{BookingPolicy, DayHours};
use crate::slot::{SlotTime, SLOT_MINUTES};

/// Free minutes immediately before and after a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub backward_minutes: u16,
    pub forward_minutes: u16,
}

impl Envelope {
    pub fn new(backward_minutes: u16, forward_minutes: u16) -> Self {
        debug_assert!(backward_minutes % SLOT_MINUTES == 0);
        debug_assert!(forward_minutes % SLOT_MINUTES == 0);
        Self {
            backward_minutes,
            forward_minutes,
        }
    }

    /// An envelope that did not come from a scan, such as one posted back by
    /// a browser. Both sides must be whole slots and the run must fit a `u16`.
    pub fn checked(backward_minutes: u16, forward_minutes: u16) -> BookingResult<Self> {
        if backward_minutes % SLOT_MINUTES != 0 || forward_minutes % SLOT_MINUTES != 0 {
            return Err(BookingError::Validation(format!(
                "Envelope of {} minutes before and {} after is not made of {}-minute slots",
                backward_minutes, forward_minutes, SLOT_MINUTES
            )));
        }
        backward_minutes
            .checked_add(forward_minutes)
            .and_then(|minutes| minutes.checked_add(SLOT_MINUTES))
            .ok_or_else(|| {
                BookingError::Validation(format!(
                    "Envelope of {} minutes before and {} after is too long",
                    backward_minutes, forward_minutes
                ))
            })?;

        Ok(Self {
            backward_minutes,
            forward_minutes,
        })
    }

    /// Length of the run including the slot itself.
    pub fn total(&self) -> u16 {
        self.backward_minutes
            .saturating_add(self.forward_minutes)
            .saturating_add(SLOT_MINUTES)
    }
}

/// Whether `slot` on `date` starts before `now`.
pub fn is_past(date: NaiveDate, slot: SlotTime, now: NaiveDateTime) -> bool {
    slot.on(date) < now
}

#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    free: &'a FreeSet,
    policy: BookingPolicy,
    hours: DayHours,
}

impl<'a> Scanner<'a> {
    pub fn new(free: &'a FreeSet, policy: BookingPolicy, hours: DayHours) -> Self {
        Self {
            free,
            policy,
            hours,
        }
    }

    pub fn policy(&self) -> BookingPolicy {
        self.policy
    }

    pub fn hours(&self) -> DayHours {
        self.hours
    }

    pub fn is_free(&self, slot: SlotTime) -> bool {
        self.free.contains(slot)
    }

    /// Free minutes directly before `slot`.
    pub fn scan_backward(&self, slot: SlotTime) -> u16 {
        let reach = self.policy.reach();
        let mut minutes = 0;
        let mut cursor = slot;

        while minutes < reach {
            let Some(previous) = cursor.previous_slot() else {
                break;
            };
            if previous < self.hours.opening || !self.free.contains(previous) {
                break;
            }
            minutes += SLOT_MINUTES;
            cursor = previous;
        }

        minutes
    }

    /// Free minutes directly after `slot`, never running past closing time.
    pub fn scan_forward(&self, slot: SlotTime) -> u16 {
        let reach = self.policy.reach();
        let mut minutes = 0;
        let mut cursor = slot;

        while minutes < reach {
            let Some(next) = cursor.next_slot() else {
                break;
            };
            let ends_by_closing = next
                .checked_add(SLOT_MINUTES)
                .is_some_and(|end| end <= self.hours.closing);
            if !ends_by_closing || !self.free.contains(next) {
                break;
            }
            minutes += SLOT_MINUTES;
            cursor = next;
        }

        minutes
    }

    pub fn envelope(&self, slot: SlotTime) -> Envelope {
        Envelope::new(self.scan_backward(slot), self.scan_forward(slot))
    }

    /// A slot is bookable when it is free, not in the past, fits inside the
    /// day, and the run around it reaches the club's minimum duration. Only
    /// the part of the run that has not started yet counts.
    pub fn check_bookability(&self, date: NaiveDate, slot: SlotTime, now: NaiveDateTime) -> bool {
        self.bookable_envelope(date, slot, now).is_some()
    }

    /// The envelope of `slot` when it is bookable.
    pub fn bookable_envelope(
        &self,
        date: NaiveDate,
        slot: SlotTime,
        now: NaiveDateTime,
    ) -> Option<Envelope> {
        if !slot.is_aligned()
            || !self.free.contains(slot)
            || !self.hours.contains(slot, SLOT_MINUTES)
            || is_past(date, slot, now)
        {
            return None;
        }

        let envelope = self.envelope(slot);
        let envelope = Envelope::new(
            self.future_backward(date, slot, envelope.backward_minutes, now),
            envelope.forward_minutes,
        );
        (envelope.total() >= self.policy.min_duration).then_some(envelope)
    }

    /// Backward minutes that still start at or after `now`. Free cells that
    /// already began cannot hold the start of a booking.
    fn future_backward(
        &self,
        date: NaiveDate,
        slot: SlotTime,
        backward: u16,
        now: NaiveDateTime,
    ) -> u16 {
        let mut minutes = backward;
        while minutes > 0
            && slot
                .checked_sub(minutes)
                .is_none_or(|start| is_past(date, start, now))
        {
            minutes -= SLOT_MINUTES;
        }
        minutes
    }

    /// Every bookable label of this court, in order.
    pub fn bookable_slots(&self, date: NaiveDate, now: NaiveDateTime) -> Vec<SlotTime> {
        self.free
            .iter()
            .filter(|slot| self.check_bookability(date, *slot, now))
            .collect()
    }
}
