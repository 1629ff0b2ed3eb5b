use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::availability::FreeSet;
use crate::errors::{BookingError, BookingResult};
use crate::models::price::Price;
use crate::slot::{SlotTime, SLOT_MINUTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    #[serde(alias = "muro", alias = "Muro")]
    Wall,
    #[serde(alias = "cristal", alias = "Cristal")]
    Glass,
}

impl FromStr for Surface {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wall" | "muro" => Ok(Surface::Wall),
            "glass" | "cristal" => Ok(Surface::Glass),
            other => Err(BookingError::Validation(format!(
                "Unknown court surface: {}",
                other
            ))),
        }
    }
}

/// Playing level advertised by a club and chosen by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[serde(alias = "Principiante", alias = "principiante")]
    Beginner,
    #[serde(alias = "Intermedio", alias = "intermedio")]
    Intermediate,
    #[serde(alias = "Avanzado", alias = "avanzado")]
    Advanced,
}

impl Level {
    pub fn rank(self) -> u8 {
        match self {
            Level::Beginner => 1,
            Level::Intermediate => 2,
            Level::Advanced => 3,
        }
    }

    pub fn distance(self, other: Level) -> u8 {
        self.rank().abs_diff(other.rank())
    }
}

/// Club-level constraint on how long a single booking may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPolicy {
    #[serde(alias = "minDuration", alias = "min")]
    pub min_duration: u16,
    #[serde(alias = "maxDuration", alias = "max")]
    pub max_duration: u16,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            min_duration: 60,
            max_duration: 120,
        }
    }
}

impl BookingPolicy {
    pub fn new(min_duration: u16, max_duration: u16) -> BookingResult<Self> {
        let policy = Self {
            min_duration,
            max_duration,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> BookingResult<()> {
        if self.min_duration < SLOT_MINUTES
            || self.min_duration % SLOT_MINUTES != 0
            || self.max_duration % SLOT_MINUTES != 0
        {
            return Err(BookingError::Validation(format!(
                "Booking durations must be positive multiples of {} minutes",
                SLOT_MINUTES
            )));
        }
        if self.min_duration > self.max_duration {
            return Err(BookingError::Validation(format!(
                "Minimum duration {} exceeds maximum duration {}",
                self.min_duration, self.max_duration
            )));
        }
        Ok(())
    }

    /// How far a scan may reach in either direction from the clicked cell.
    pub fn reach(&self) -> u16 {
        self.max_duration.saturating_sub(SLOT_MINUTES)
    }
}

/// Opening and closing time for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub opening: SlotTime,
    pub closing: SlotTime,
}

impl Default for DayHours {
    fn default() -> Self {
        Self {
            opening: SlotTime::at(8, 0),
            closing: SlotTime::at(22, 0),
        }
    }
}

impl DayHours {
    pub fn new(opening: SlotTime, closing: SlotTime) -> BookingResult<Self> {
        if opening >= closing {
            return Err(BookingError::Validation(format!(
                "Opening time {} must be before closing time {}",
                opening, closing
            )));
        }
        Ok(Self { opening, closing })
    }

    /// First grid cell: the opening time rounded up to a half-hour boundary.
    pub fn first_slot(&self) -> SlotTime {
        if self.opening.is_aligned() {
            self.opening
        } else {
            self.opening
                .floor_to_slot()
                .next_slot()
                .unwrap_or(SlotTime::END_OF_DAY)
        }
    }

    /// Every half-hour cell that starts at or after opening and ends by
    /// closing.
    pub fn slots(&self) -> impl Iterator<Item = SlotTime> + use<> {
        let closing = self.closing;
        std::iter::successors(Some(self.first_slot()), |slot| slot.next_slot()).take_while(
            move |slot| {
                slot.checked_add(SLOT_MINUTES)
                    .is_some_and(|end| end <= closing)
            },
        )
    }

    /// Whether a booking `[start, start + minutes)` fits inside the day.
    pub fn contains(&self, start: SlotTime, minutes: u16) -> bool {
        start >= self.opening
            && start
                .checked_add(minutes)
                .is_some_and(|end| end <= self.closing)
    }
}

impl FromStr for DayHours {
    type Err = BookingError;

    /// Parses `"09:00 - 23:00"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (opening, closing) = s.split_once('-').ok_or_else(|| {
            BookingError::Validation(format!("Invalid opening hours: {:?}", s))
        })?;
        Self::new(opening.trim().parse()?, closing.trim().parse()?)
    }
}

/// Weekly opening hours.
///
/// Days are keyed by lowercase English name (`"monday"`). A `"weekend"` entry
/// covers Saturday and Sunday when they are not listed individually, and
/// `fallback` covers everything else. Without any of these the club is open
/// `08:00 - 22:00`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub days: BTreeMap<String, DayHours>,
    #[serde(default)]
    pub fallback: Option<DayHours>,
}

impl OpeningHours {
    pub fn uniform(hours: DayHours) -> Self {
        Self {
            days: BTreeMap::new(),
            fallback: Some(hours),
        }
    }

    /// Builds the weekly table from `{"monday": "09:00 - 23:00", ...}`.
    pub fn from_labels<'a, I>(labels: I, fallback: Option<DayHours>) -> BookingResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let days = labels
            .into_iter()
            .map(|(day, hours)| -> BookingResult<(String, DayHours)> {
                Ok((day.trim().to_lowercase(), hours.parse()?))
            })
            .collect::<BookingResult<BTreeMap<_, _>>>()?;
        Ok(Self { days, fallback })
    }

    pub fn for_date(&self, date: NaiveDate) -> DayHours {
        let weekday = date.weekday();
        self.days
            .get(day_key(weekday))
            .or_else(|| match weekday {
                Weekday::Sat | Weekday::Sun => self.days.get("weekend"),
                _ => None,
            })
            .copied()
            .or(self.fallback)
            .unwrap_or_default()
    }
}

fn day_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// An existing booking on a court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub start: SlotTime,
    pub duration_minutes: u16,
}

impl Reservation {
    pub fn end_minutes(&self) -> u16 {
        self.start.minutes().saturating_add(self.duration_minutes)
    }

    /// Whether this reservation overlaps the half-hour cell starting at `slot`.
    pub fn blocks(&self, slot: SlotTime) -> bool {
        let cell_start = slot.minutes();
        let cell_end = cell_start + SLOT_MINUTES;
        self.start.minutes() < cell_end && cell_start < self.end_minutes()
    }
}

/// A court and its free half-hour labels for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: String,
    pub name: String,
    pub surface: Surface,
    #[serde(default)]
    pub free: FreeSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    /// Price of one hour of court time.
    #[serde(default)]
    pub hourly_rate: Option<Price>,
    #[serde(default)]
    pub level: Option<Level>,
    #[serde(default)]
    pub policy: BookingPolicy,
    #[serde(default)]
    pub opening_hours: OpeningHours,
    #[serde(default)]
    pub courts: Vec<Court>,
}

impl Club {
    pub fn court(&self, court_id: &str) -> BookingResult<&Court> {
        self.courts
            .iter()
            .find(|court| court.id == court_id)
            .ok_or_else(|| {
                BookingError::NotFound(format!(
                    "Court {} not found in club {}",
                    court_id, self.name
                ))
            })
    }

    pub fn hours_on(&self, date: NaiveDate) -> DayHours {
        self.opening_hours.for_date(date)
    }

    pub fn has_surface(&self, surface: Surface) -> bool {
        self.courts.iter().any(|court| court.surface == surface)
    }
}

/// A club together with the date its court availability describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubDay {
    pub date: NaiveDate,
    pub club: Club,
}
