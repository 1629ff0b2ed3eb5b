//! Wire records of the booking service and their conversion into domain types.
//!
//! The service speaks Spanish field names and renders SQL times loosely
//! (`"9:00:00"`, `"2025-06-02 10:30:00"`), so every record here is lenient on
//! input and strict once converted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use padelup_core::availability::{free_slots, FreeSet};
use padelup_core::errors::{BookingError, BookingResult};
use padelup_core::models::{
    account::{LoginRequest, RegisterRequest, Session, UserProfile},
    booking::{BookingRequest, BookingType},
    club::{BookingPolicy, Club, Court, DayHours, Level, OpeningHours, Reservation, Surface},
    price::Price,
};
use padelup_core::slot::SlotTime;

/// Reservation states that no longer hold the court.
const RELEASED_STATES: [&str; 3] = ["cancelada", "cancelled", "anulada"];

/// An identifier the service sends either as a number or as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub udni: String,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellidos: Option<String>,
    #[serde(default)]
    pub monedero: Option<f64>,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        UserProfile {
            username: record.udni,
            first_name: record.nombre,
            last_name: record.apellidos,
            wallet: record.monedero.map(Price::from_euros),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserRecord,
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Session {
            token: response.token,
            user: response.user.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterBody {
    pub udni: String,
    pub password: String,
    pub nombre: String,
    pub apellidos: String,
}

impl From<&RegisterRequest> for RegisterBody {
    fn from(request: &RegisterRequest) -> Self {
        Self {
            udni: request.username.clone(),
            password: request.password.clone(),
            nombre: request.first_name.clone(),
            apellidos: request.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginBody {
    pub udni: String,
    pub password: String,
}

impl From<&LoginRequest> for LoginBody {
    fn from(request: &LoginRequest) -> Self {
        Self {
            udni: request.username.clone(),
            password: request.password.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingBody {
    pub udni: String,
    pub pista: String,
    /// `"YYYY-MM-DD HH:MM:SS"`
    pub hora_inicio: String,
    pub duracion: u16,
    pub tipo: String,
}

impl BookingBody {
    pub fn new(username: &str, request: &BookingRequest) -> Self {
        Self {
            udni: username.to_string(),
            pista: request.court_id.clone(),
            hora_inicio: request.starts_at().format("%Y-%m-%d %H:%M:%S").to_string(),
            duracion: request.duration_minutes,
            tipo: match request.booking_type {
                BookingType::Complete => "completa".to_string(),
                BookingType::OpenMatch => "abierta".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookingResponse {
    #[serde(default)]
    pub rid: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReservationRecord {
    pub hora_inicio: String,
    pub duracion: u16,
    #[serde(default)]
    pub estado: Option<String>,
}

impl ReservationRecord {
    /// Whether this reservation still occupies the court.
    pub fn is_active(&self) -> bool {
        self.estado
            .as_deref()
            .map(|state| !RELEASED_STATES.contains(&state.trim().to_lowercase().as_str()))
            .unwrap_or(true)
    }

    pub fn to_reservation(&self) -> BookingResult<Reservation> {
        // Either a bare time or a date followed by a time.
        let time = self
            .hora_inicio
            .rsplit([' ', 'T'])
            .next()
            .unwrap_or(self.hora_inicio.as_str());
        Ok(Reservation {
            start: parse_service_time(time)?,
            duration_minutes: self.duracion,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourtRecord {
    pub pid: RecordId,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub reservas: Vec<ReservationRecord>,
}

impl CourtRecord {
    fn surface(&self) -> Surface {
        match self.tipo.as_deref().map(str::parse::<Surface>) {
            Some(Ok(surface)) => surface,
            Some(Err(e)) => {
                warn!(court = %self.pid, error = %e, "Unknown court type, assuming wall");
                Surface::Wall
            }
            None => Surface::Wall,
        }
    }

    fn reservations(&self) -> BookingResult<Vec<Reservation>> {
        self.reservas
            .iter()
            .filter(|record| record.is_active())
            .map(ReservationRecord::to_reservation)
            .collect()
    }

    fn into_court(self, hours: DayHours) -> BookingResult<Court> {
        let free: FreeSet = free_slots(hours, &self.reservations()?);
        let surface = self.surface();
        let id = self.pid.to_string();
        Ok(Court {
            name: self.nombre.unwrap_or_else(|| format!("Pista {}", id)),
            id,
            surface,
            free,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClubRecord {
    pub nombre: String,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub hora_apertura: Option<String>,
    #[serde(default)]
    pub hora_cierre: Option<String>,
    /// Weekly hours, `{"monday": "09:00 - 23:00", "weekend": ...}`
    #[serde(default)]
    pub horario: Option<BTreeMap<String, String>>,
    /// Hourly court rate in euros
    #[serde(default)]
    pub precio: Option<f64>,
    #[serde(default)]
    pub distancia: Option<f64>,
    #[serde(default)]
    pub nivel: Option<Level>,
    #[serde(default)]
    pub politica: Option<BookingPolicy>,
    #[serde(default)]
    pub pistas: Vec<CourtRecord>,
}

impl ClubRecord {
    fn opening_hours(&self) -> BookingResult<OpeningHours> {
        let fallback = match (&self.hora_apertura, &self.hora_cierre) {
            (Some(opening), Some(closing)) => {
                Some(DayHours::new(
                    parse_service_time(opening)?,
                    parse_service_time(closing)?,
                )?)
            }
            _ => None,
        };

        match &self.horario {
            Some(days) => OpeningHours::from_labels(
                days.iter().map(|(day, hours)| (day.as_str(), hours.as_str())),
                fallback,
            ),
            None => Ok(OpeningHours {
                days: BTreeMap::new(),
                fallback,
            }),
        }
    }

    /// Converts the record into a club whose courts carry their free cells on
    /// `date`.
    pub fn into_club(self, date: NaiveDate) -> BookingResult<Club> {
        let opening_hours = self.opening_hours()?;
        let policy = self.politica.unwrap_or_default();
        policy.validate()?;
        let hours = opening_hours.for_date(date);

        let courts = self
            .pistas
            .into_iter()
            .map(|court| court.into_court(hours))
            .collect::<BookingResult<Vec<_>>>()?;

        Ok(Club {
            id: self.nombre.clone(),
            name: self.nombre,
            location: self.direccion,
            distance_km: self.distancia,
            hourly_rate: self.precio.map(Price::from_euros),
            level: self.nivel,
            policy,
            opening_hours,
            courts,
        })
    }
}

fn parse_service_time(raw: &str) -> BookingResult<SlotTime> {
    raw.parse().map_err(|_| {
        BookingError::Validation(format!("Booking service sent an invalid time: {:?}", raw))
    })
}
