use std::sync::Arc;

use axum_test::TestServer;
use chrono::{NaiveDate, NaiveDateTime};

use padelup_api::{build_router, config::ApiConfig, ApiState, FixedClock};
use padelup_client::{mock::MockPadelApi, MemorySessionStore};
use padelup_core::{
    availability::{free_slots, FreeSet},
    models::{
        account::{Session, UserProfile},
        club::{BookingPolicy, Club, ClubDay, Court, DayHours, Level, OpeningHours, Surface},
        price::Price,
    },
    slot::SlotTime,
};

pub const CLUB: &str = "Padel Norte";
pub const TOKEN: &str = "jwt-token";

pub fn t(label: &str) -> SlotTime {
    label.parse().unwrap()
}

/// A Monday
pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    day().and_hms_opt(hour, minute, 0).unwrap()
}

pub fn hours() -> DayHours {
    DayHours::new(t("08:00"), t("22:00")).unwrap()
}

pub fn court(id: &str, surface: Surface, free: FreeSet) -> Court {
    Court {
        id: id.to_string(),
        name: format!("Pista {}", id),
        surface,
        free,
    }
}

/// Court "1" is free 09:00-11:30, court "2" all day.
pub fn club() -> Club {
    Club {
        id: "1".to_string(),
        name: CLUB.to_string(),
        location: Some("Calle Mayor 1".to_string()),
        distance_km: Some(2.5),
        hourly_rate: Some(Price::from_cents(1560)),
        level: Some(Level::Intermediate),
        policy: BookingPolicy::default(),
        opening_hours: OpeningHours::uniform(hours()),
        courts: vec![
            court(
                "1",
                Surface::Glass,
                SlotTime::range(t("09:00"), t("11:30")).collect(),
            ),
            court("2", Surface::Wall, free_slots(hours(), &[])),
        ],
    }
}

pub fn club_day(club: Club) -> ClubDay {
    ClubDay { date: day(), club }
}

pub fn profile() -> UserProfile {
    UserProfile {
        username: "12345678A".to_string(),
        first_name: Some("Lucía".to_string()),
        last_name: Some("García".to_string()),
        wallet: Some(Price::from_cents(5000)),
    }
}

pub fn session() -> Session {
    Session {
        token: TOKEN.to_string(),
        user: profile(),
    }
}

pub struct TestContext {
    pub api: MockPadelApi,
    /// Shared with the server so tests can look at it afterwards
    pub sessions: Arc<MemorySessionStore>,
    pub now: NaiveDateTime,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            api: MockPadelApi::new(),
            sessions: Arc::new(MemorySessionStore::new()),
            now: at(7, 0),
        }
    }

    pub fn server(self) -> TestServer {
        let state = ApiState::new(
            Arc::new(self.api),
            Box::new(self.sessions),
            &ApiConfig::default(),
        )
        .with_clock(FixedClock(self.now));
        TestServer::new(build_router(Arc::new(state))).unwrap()
    }
}
