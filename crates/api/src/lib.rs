//! # PadelUp API
//!
//! Front-end service for PadelUp. The browser's Home, Auth and Dashboard
//! pages talk to these JSON endpoints; clubs, reservations and accounts live
//! in the external booking service reached through `padelup-client`.
//!
//! ## Layout
//!
//! - **routes**: URL structure, one `routes()` per area
//! - **handlers**: request processing on top of `padelup-core`
//! - **middleware**: bearer token extraction and error responses
//! - **config**: environment settings

/// Environment settings
pub mod config;
/// Request processing
pub mod handlers;
/// Bearer tokens and error responses
pub mod middleware;
/// URL structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{http::HeaderValue, Router};
use chrono::{Local, NaiveDateTime};
use eyre::Result;
use padelup_client::{PadelApi, SessionClient, SessionStore};
use padelup_core::models::price::Price;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

/// Source of the current local time
///
/// Slots are compared against wall-clock time in the club's local zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// State shared by every handler
///
/// # Example
///
/// ```rust,ignore
/// let client_config = ClientConfig::from_env()?;
/// let sessions = padelup_client::session_store(&client_config);
/// let api = padelup_client::connect(client_config)?;
/// let state = Arc::new(ApiState::new(api, sessions, &config));
/// let app = build_router(state);
/// ```
pub struct ApiState {
    /// Client for the external booking service
    pub api: Arc<dyn PadelApi>,

    /// Session kept from the last login, used when a request sends no token
    pub sessions: SessionClient<Box<dyn SessionStore>>,

    /// Clock used for past-slot checks
    pub clock: Arc<dyn Clock>,

    /// Duration preselected on click
    pub recommended_duration: u16,

    /// Hourly rate for clubs without a published price
    pub fallback_hourly_rate: Price,
}

impl ApiState {
    pub fn new(
        api: Arc<dyn PadelApi>,
        sessions: Box<dyn SessionStore>,
        config: &config::ApiConfig,
    ) -> Self {
        Self {
            sessions: SessionClient::new(api.clone(), sessions),
            api,
            clock: Arc::new(SystemClock),
            recommended_duration: config.recommended_duration,
            fallback_hourly_rate: config.fallback_hourly_rate,
        }
    }

    pub fn with_clock(self, clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            ..self
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }
}

/// Builds the application router with every route and request tracing
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::auth::routes())
        .merge(routes::clubs::routes())
        .merge(routes::booking::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_origin(origins)
        .allow_credentials(true)
}

/// Starts the API server with the provided configuration, booking service client and session store
///
/// Installs the log subscriber, then serves HTTP until the process stops.
///
/// # Example
///
/// ```rust,ignore
/// let config = ApiConfig::from_env()?;
/// let client_config = ClientConfig::from_env()?;
/// let sessions = padelup_client::session_store(&client_config);
/// let api = padelup_client::connect(client_config)?;
/// start_server(config, api, sessions).await?;
/// ```
pub async fn start_server(
    config: config::ApiConfig,
    api: Arc<dyn PadelApi>,
    sessions: Box<dyn SessionStore>,
) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState::new(api, sessions, &config));
    let app = build_router(state);

    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    let app = app.layer(
        ServiceBuilder::new().layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
