//! # Service Configuration
//!
//! Settings for the PadelUp front-end service, read from the process
//! environment (a `.env` file is loaded by the binary first). Every value
//! has a default, so an empty environment starts a working local server.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `API_HOST` | `0.0.0.0` | Bind address |
//! | `API_PORT` | `3000` | Listen port |
//! | `LOG_LEVEL` | `info` | `trace`, `debug`, `info`, `warn` or `error` |
//! | `API_CORS_ORIGINS` | unset | Comma-separated browser origins allowed to call the service |
//! | `API_REQUEST_TIMEOUT_SECONDS` | `30` | Time limit for one request |
//! | `RECOMMENDED_DURATION_MINUTES` | `90` | Duration preselected on click |
//! | `FALLBACK_HOURLY_RATE` | `15.60` | Hourly court rate in euros for clubs without one |

use std::{env, fmt::Display, str::FromStr};

use eyre::{Result, WrapErr};
use padelup_core::models::price::Price;
use tracing::Level;

/// Duration preselected when a slot is clicked, in minutes
pub const DEFAULT_RECOMMENDED_DURATION: u16 = 90;

/// Hourly rate in euro cents used when a club does not publish one
pub const DEFAULT_FALLBACK_RATE_CENTS: u32 = 1560;

/// Settings of the front-end service
///
/// # Example
///
/// ```
/// use padelup_api::config::ApiConfig;
///
/// fn listen_address() -> eyre::Result<String> {
///     let config = ApiConfig::from_env()?;
///     Ok(config.server_addr())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub log_level: Level,

    /// Browser origins allowed by CORS; `None` disables the CORS layer
    pub cors_origins: Option<Vec<String>>,

    /// Per-request time limit in seconds
    pub request_timeout: u64,

    /// Duration preselected on click when it is one of the options
    pub recommended_duration: u16,

    /// Hourly rate for clubs that do not publish a price
    pub fallback_hourly_rate: Price,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: Level::INFO,
            cors_origins: None,
            request_timeout: 30,
            recommended_duration: DEFAULT_RECOMMENDED_DURATION,
            fallback_hourly_rate: Price::from_cents(DEFAULT_FALLBACK_RATE_CENTS),
        }
    }
}

/// Reads `name` and parses it, keeping `default` when the variable is unset
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|err| eyre::eyre!("{}", err))
            .wrap_err_with(|| format!("Invalid {} value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

impl ApiConfig {
    /// Builds the configuration from environment variables
    ///
    /// # Errors
    ///
    /// Fails when a variable is set but cannot be parsed, such as a
    /// non-numeric `API_PORT` or a negative `FALLBACK_HOURLY_RATE`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let log_level = env::var("LOG_LEVEL")
            .map(|raw| parse_log_level(&raw))
            .unwrap_or(defaults.log_level);

        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect()
        });

        let fallback_hourly_rate = match env::var("FALLBACK_HOURLY_RATE") {
            Ok(raw) => parse_rate(&raw)?,
            Err(_) => defaults.fallback_hourly_rate,
        };

        Ok(Self {
            host: env::var("API_HOST").unwrap_or(defaults.host),
            port: env_or("API_PORT", defaults.port)?,
            log_level,
            cors_origins,
            request_timeout: env_or("API_REQUEST_TIMEOUT_SECONDS", defaults.request_timeout)?,
            recommended_duration: env_or(
                "RECOMMENDED_DURATION_MINUTES",
                defaults.recommended_duration,
            )?,
            fallback_hourly_rate,
        })
    }

    /// `host:port` for the listener
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Maps a `LOG_LEVEL` value to a tracing level, defaulting to `INFO`
pub fn parse_log_level(raw: &str) -> Level {
    raw.trim().parse().unwrap_or(Level::INFO)
}

/// Parses a euro amount such as `"15.60"` or `"15,60"`
pub fn parse_rate(raw: &str) -> Result<Price> {
    let euros: f64 = raw
        .trim()
        .replace(',', ".")
        .parse()
        .wrap_err_with(|| format!("Invalid FALLBACK_HOURLY_RATE value: {}", raw))?;
    if !euros.is_finite() || euros < 0.0 {
        return Err(eyre::eyre!("FALLBACK_HOURLY_RATE must be a positive amount"));
    }
    Ok(Price::from_euros(euros))
}
